//! Liquidity grades.
//!
//! Grades are population-relative: the A/B/C/D cutoffs are the 80th,
//! 60th, 40th, and 20th percentiles of every race's liquidity score in
//! the snapshot, so a grade says "how liquid relative to today's
//! field", not "how liquid in absolute terms".

use std::fmt;

use serde::{Deserialize, Serialize};

/// Confidence grade derived from the liquidity-score distribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Grade {
    A,
    B,
    C,
    D,
    F,
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
            Grade::F => "F",
        };
        f.write_str(label)
    }
}

/// Percentile cutoffs over the pooled liquidity scores.
#[derive(Debug, Clone, Copy)]
pub struct GradeThresholds {
    pub p80: f64,
    pub p60: f64,
    pub p40: f64,
    pub p20: f64,
}

/// Linearly interpolated percentile of an ascending-sorted slice
/// (non-empty).
fn percentile(sorted: &[f64], q: f64) -> f64 {
    let pos = q / 100.0 * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    if lo == hi {
        sorted[lo]
    } else {
        sorted[lo] + (pos - lo as f64) * (sorted[hi] - sorted[lo])
    }
}

/// Compute grade cutoffs from every defined liquidity score in the
/// population. An empty population falls back to fixed cutoffs so the
/// classifier still partitions [0, 1].
pub fn compute_thresholds(scores: &[f64]) -> GradeThresholds {
    let mut sorted: Vec<f64> = scores.to_vec();
    sorted.sort_by(f64::total_cmp);
    if sorted.is_empty() {
        return GradeThresholds {
            p80: 1.0,
            p60: 0.8,
            p40: 0.6,
            p20: 0.4,
        };
    }
    GradeThresholds {
        p80: percentile(&sorted, 80.0),
        p60: percentile(&sorted, 60.0),
        p40: percentile(&sorted, 40.0),
        p20: percentile(&sorted, 20.0),
    }
}

/// Grade a liquidity score against the population cutoffs. An undefined
/// score is always F.
pub fn grade_for(score: Option<f64>, t: &GradeThresholds) -> Grade {
    let Some(score) = score else {
        return Grade::F;
    };
    if score >= t.p80 {
        Grade::A
    } else if score >= t.p60 {
        Grade::B
    } else if score >= t.p40 {
        Grade::C
    } else if score >= t.p20 {
        Grade::D
    } else {
        Grade::F
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_population_fixed_cutoffs() {
        let t = compute_thresholds(&[]);
        assert_eq!(t.p80, 1.0);
        assert_eq!(t.p20, 0.4);
        assert_eq!(grade_for(Some(1.0), &t), Grade::A);
        assert_eq!(grade_for(Some(0.5), &t), Grade::D);
        assert_eq!(grade_for(Some(0.1), &t), Grade::F);
    }

    #[test]
    fn test_undefined_score_is_f() {
        let t = compute_thresholds(&[0.1, 0.5, 0.9]);
        assert_eq!(grade_for(None, &t), Grade::F);
    }

    #[test]
    fn test_percentile_interpolation() {
        // Matches linear interpolation over [10, 20, 30, 40, 50]:
        // the 80th percentile sits at position 3.2.
        let sorted = [10.0, 20.0, 30.0, 40.0, 50.0];
        assert!((percentile(&sorted, 80.0) - 42.0).abs() < 1e-9);
        assert!((percentile(&sorted, 50.0) - 30.0).abs() < 1e-9);
        assert_eq!(percentile(&sorted, 0.0), 10.0);
        assert_eq!(percentile(&sorted, 100.0), 50.0);
    }

    #[test]
    fn test_grades_partition_population() {
        let scores: Vec<f64> = (1..=10).map(|i| i as f64 / 10.0).collect();
        let t = compute_thresholds(&scores);
        let grades: Vec<Grade> = scores.iter().map(|&s| grade_for(Some(s), &t)).collect();

        // Every grade appears, and grades never improve as scores drop.
        for want in [Grade::A, Grade::B, Grade::C, Grade::D, Grade::F] {
            assert!(
                grades.contains(&want),
                "grade {:?} missing from {:?}",
                want,
                grades
            );
        }
        for pair in grades.windows(2) {
            let rank = |g: Grade| match g {
                Grade::A => 4,
                Grade::B => 3,
                Grade::C => 2,
                Grade::D => 1,
                Grade::F => 0,
            };
            assert!(
                rank(pair[1]) >= rank(pair[0]),
                "higher score graded worse: {:?}",
                grades
            );
        }
    }

    #[test]
    fn test_top_score_is_a() {
        let scores = [0.2, 0.4, 0.6, 0.8];
        let t = compute_thresholds(&scores);
        assert_eq!(grade_for(Some(0.8), &t), Grade::A);
        assert_eq!(grade_for(Some(0.95), &t), Grade::A);
    }
}
