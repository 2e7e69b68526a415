//! Diagnostic comparison against a third-party rating sheet.
//!
//! Matches House races by label and measures how far our ratings sit
//! from a reference scale (e.g. Cook Political Report) on the shared
//! ordinal axis Solid D = −3 … Solid R = +3. Purely a consumer of the
//! grades output; nothing here feeds back into the engine.

use std::collections::HashMap;
use std::path::Path;

use common::Error;
use grading::Rating;

use crate::output::{read_snapshot, RaceRecord};

/// Ordinal position for a rating label. Accepts both our "Tossup" and
/// the common third-party "Toss Up" spelling.
pub fn ordinal_for(label: &str) -> Option<i8> {
    match label {
        "Solid D" => Some(-3),
        "Likely D" => Some(-2),
        "Lean D" => Some(-1),
        "Tossup" | "Toss Up" => Some(0),
        "Lean R" => Some(1),
        "Likely R" => Some(2),
        "Solid R" => Some(3),
        _ => None,
    }
}

/// One race where the two scales disagree.
#[derive(Debug, Clone)]
pub struct Deviation {
    pub label: String,
    pub reference: String,
    pub ours: Option<Rating>,
    pub grade: String,
    pub margin: Option<i64>,
    /// Absolute ordinal distance between the two ratings.
    pub diff: u8,
}

/// Aggregate comparison result.
#[derive(Debug, Clone)]
pub struct ComparisonReport {
    pub total: usize,
    pub matches: usize,
    pub deviations: Vec<Deviation>,
    pub distribution: HashMap<String, usize>,
}

/// Compare our House ratings against the reference map
/// (rating label → race labels).
pub fn compare_house_ratings(
    races: &[RaceRecord],
    reference: &HashMap<String, Vec<String>>,
) -> ComparisonReport {
    // Flatten the reference into label → rating.
    let mut reference_by_race: HashMap<&str, &str> = HashMap::new();
    for (rating, labels) in reference {
        for label in labels {
            reference_by_race.insert(label.as_str(), rating.as_str());
        }
    }

    let ours_by_race: HashMap<&str, &RaceRecord> = races
        .iter()
        .filter(|r| r.chamber == "House")
        .map(|r| (r.label.as_str(), r))
        .collect();

    let mut shared: Vec<&str> = reference_by_race
        .keys()
        .filter(|label| ours_by_race.contains_key(**label))
        .copied()
        .collect();
    shared.sort_unstable();

    let mut matches = 0;
    let mut deviations = Vec::new();
    let mut distribution: HashMap<String, usize> = HashMap::new();

    for label in &shared {
        let record = ours_by_race[label];
        let reference_label = reference_by_race[label];
        let ref_val = ordinal_for(reference_label).unwrap_or(0);
        let our_val = record.rating.map(|r| r.ordinal()).unwrap_or(0);
        let diff = ref_val.abs_diff(our_val);

        if let Some(rating) = record.rating {
            *distribution.entry(rating.to_string()).or_insert(0) += 1;
        }

        if diff == 0 {
            matches += 1;
        } else {
            deviations.push(Deviation {
                label: (*label).to_string(),
                reference: reference_label.to_string(),
                ours: record.rating,
                grade: record.grade.to_string(),
                margin: record.margin,
                diff,
            });
        }
    }

    deviations.sort_by(|a, b| b.diff.cmp(&a.diff).then_with(|| a.label.cmp(&b.label)));

    ComparisonReport {
        total: shared.len(),
        matches,
        deviations,
        distribution,
    }
}

fn print_deviation(d: &Deviation) {
    let ours = d
        .ours
        .map(|r| r.to_string())
        .unwrap_or_else(|| "N/A".into());
    let direction = {
        let our_val = d.ours.map(|r| r.ordinal()).unwrap_or(0);
        let ref_val = ordinal_for(&d.reference).unwrap_or(0);
        if our_val > ref_val {
            "more R"
        } else {
            "more D"
        }
    };
    println!(
        "  {:8}  ref: {:10}  ours: {:10}  (grade {}, margin {:+})  [{}]",
        d.label,
        d.reference,
        ours,
        d.grade,
        d.margin.unwrap_or(0),
        direction
    );
}

fn print_report(report: &ComparisonReport) {
    println!("=== REFERENCE vs MARKET GRADES (House only) ===");
    println!();
    println!("Total compared: {}", report.total);
    if report.total > 0 {
        println!(
            "Exact match:    {} ({:.1}%)",
            report.matches,
            100.0 * report.matches as f64 / report.total as f64
        );
    }
    println!("Deviations:     {}", report.deviations.len());

    println!();
    println!("--- BIG DEVIATIONS (2+ categories off) ---");
    for d in report.deviations.iter().filter(|d| d.diff >= 2) {
        print_deviation(d);
    }

    println!();
    println!("--- SMALL DEVIATIONS (1 category off) ---");
    for d in report.deviations.iter().filter(|d| d.diff == 1) {
        print_deviation(d);
    }

    println!();
    println!("--- OUR RATING DISTRIBUTION (House) ---");
    for rating in [
        "Solid D", "Likely D", "Lean D", "Tossup", "Lean R", "Likely R", "Solid R",
    ] {
        println!(
            "  {:10}: {}",
            rating,
            report.distribution.get(rating).copied().unwrap_or(0)
        );
    }
}

/// Load both files, compare, and print the report.
pub fn run(grades_path: &Path, reference_path: &Path) -> Result<(), Error> {
    let snapshot = read_snapshot(grades_path)?;
    let contents = std::fs::read_to_string(reference_path)?;
    let reference: HashMap<String, Vec<String>> = serde_json::from_str(&contents)?;

    let report = compare_house_ratings(&snapshot.races, &reference);
    print_report(&report);
    Ok(())
}
