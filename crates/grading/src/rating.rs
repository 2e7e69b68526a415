//! Margin-to-rating classification and the thin-market fallback.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The seven-step rating scale, most R-favorable first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rating {
    #[serde(rename = "Solid R")]
    SolidR,
    #[serde(rename = "Likely R")]
    LikelyR,
    #[serde(rename = "Lean R")]
    LeanR,
    #[serde(rename = "Tossup")]
    Tossup,
    #[serde(rename = "Lean D")]
    LeanD,
    #[serde(rename = "Likely D")]
    LikelyD,
    #[serde(rename = "Solid D")]
    SolidD,
}

impl Rating {
    /// Position on the shared ordinal scale: Solid D = −3 … Solid R = +3.
    pub fn ordinal(&self) -> i8 {
        match self {
            Rating::SolidR => 3,
            Rating::LikelyR => 2,
            Rating::LeanR => 1,
            Rating::Tossup => 0,
            Rating::LeanD => -1,
            Rating::LikelyD => -2,
            Rating::SolidD => -3,
        }
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Rating::SolidR => "Solid R",
            Rating::LikelyR => "Likely R",
            Rating::LeanR => "Lean R",
            Rating::Tossup => "Tossup",
            Rating::LeanD => "Lean D",
            Rating::LikelyD => "Likely D",
            Rating::SolidD => "Solid D",
        };
        f.write_str(label)
    }
}

/// Inclusive lower bounds, scanned most-R-favorable first; anything
/// below the last break is Solid D.
const RATING_BREAKS: [(i64, Rating); 6] = [
    (17, Rating::SolidR),
    (9, Rating::LikelyR),
    (4, Rating::LeanR),
    (-4, Rating::Tossup),
    (-9, Rating::LeanD),
    (-17, Rating::LikelyD),
];

/// Map an implied margin to a rating. Boundary margins land in the more
/// competitive bucket because the scan is descending with inclusive
/// bounds.
pub fn classify_margin(margin: i64) -> Rating {
    for (threshold, rating) in RATING_BREAKS {
        if margin >= threshold {
            return rating;
        }
    }
    Rating::SolidD
}

/// Coarse fallback for unrated races: claim only the blowouts, leave
/// the ambiguous middle alone.
pub fn auto_label(raw_r_pct: f64, solid_threshold: f64) -> Option<Rating> {
    if raw_r_pct >= solid_threshold {
        Some(Rating::SolidR)
    } else if raw_r_pct <= 100.0 - solid_threshold {
        Some(Rating::SolidD)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boundary_inclusivity() {
        assert_eq!(classify_margin(17), Rating::SolidR);
        assert_eq!(classify_margin(16), Rating::LikelyR);
        assert_eq!(classify_margin(9), Rating::LikelyR);
        assert_eq!(classify_margin(4), Rating::LeanR);
        assert_eq!(classify_margin(-4), Rating::Tossup, "−4 is still Tossup");
        assert_eq!(classify_margin(-5), Rating::LeanD);
        assert_eq!(classify_margin(-17), Rating::LikelyD);
        assert_eq!(classify_margin(-18), Rating::SolidD);
    }

    #[test]
    fn test_zero_margin_is_tossup() {
        assert_eq!(classify_margin(0), Rating::Tossup);
    }

    #[test]
    fn test_extremes() {
        assert_eq!(classify_margin(60), Rating::SolidR);
        assert_eq!(classify_margin(-60), Rating::SolidD);
    }

    #[test]
    fn test_ordinal_scale() {
        assert_eq!(Rating::SolidR.ordinal(), 3);
        assert_eq!(Rating::Tossup.ordinal(), 0);
        assert_eq!(Rating::SolidD.ordinal(), -3);
    }

    #[test]
    fn test_rating_serializes_as_display_label() {
        let json = serde_json::to_string(&Rating::LeanD).expect("serialize");
        assert_eq!(json, "\"Lean D\"");
        let back: Rating = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, Rating::LeanD);
    }

    #[test]
    fn test_auto_label_thresholds() {
        assert_eq!(auto_label(85.0, 80.0), Some(Rating::SolidR));
        assert_eq!(auto_label(80.0, 80.0), Some(Rating::SolidR), "inclusive");
        assert_eq!(auto_label(20.0, 80.0), Some(Rating::SolidD), "inclusive");
        assert_eq!(auto_label(15.0, 80.0), Some(Rating::SolidD));
        assert_eq!(auto_label(50.0, 80.0), None, "ambiguous middle stays unrated");
        assert_eq!(auto_label(79.9, 80.0), None);
    }
}
