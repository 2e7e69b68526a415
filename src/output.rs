//! Grades snapshot output.
//!
//! Serializes the graded races to `<out_dir>/<date>.json` plus a
//! `latest.json` copy, the shape the site reads.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use common::Error;
use grading::{Grade, RaceReport, Rating};
use serde::{Deserialize, Serialize};

/// Display links for a race, resolved from the Kalshi series API.
#[derive(Debug, Clone, Default)]
pub struct RaceLinks {
    pub event_ticker: Option<String>,
    pub kalshi_url: Option<String>,
}

/// One race as written to the grades JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RaceRecord {
    pub race_id: String,
    pub event_ticker: Option<String>,
    pub kalshi_url: Option<String>,
    pub chamber: String,
    pub state: String,
    pub state_name: String,
    pub label: String,
    pub grade: Grade,
    pub liquidity_score: f64,
    pub volume_pct: f64,
    pub spread_pct: f64,
    pub oi_pct: f64,
    pub rating: Option<Rating>,
    pub margin: Option<i64>,
}

/// The full grades document for one snapshot date.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub date: String,
    pub total_races: usize,
    pub races: Vec<RaceRecord>,
}

/// Merge engine reports with display links into the output document.
pub fn build_snapshot(
    date: &str,
    reports: Vec<RaceReport>,
    links: &HashMap<String, RaceLinks>,
) -> Snapshot {
    let races: Vec<RaceRecord> = reports
        .into_iter()
        .map(|r| {
            let link = links.get(&r.race_id).cloned().unwrap_or_default();
            RaceRecord {
                race_id: r.race_id,
                event_ticker: link.event_ticker,
                kalshi_url: link.kalshi_url,
                chamber: r.chamber,
                state: r.state,
                state_name: r.state_name,
                label: r.label,
                grade: r.grade,
                liquidity_score: r.liquidity_score,
                volume_pct: r.volume_pct,
                spread_pct: r.spread_pct,
                oi_pct: r.oi_pct,
                rating: r.rating,
                margin: r.margin,
            }
        })
        .collect();

    Snapshot {
        date: date.to_string(),
        total_races: races.len(),
        races,
    }
}

/// Write the snapshot to its dated file and refresh `latest.json`.
pub fn write_snapshot(out_dir: &Path, snapshot: &Snapshot) -> Result<(), Error> {
    fs::create_dir_all(out_dir)?;
    let json = serde_json::to_string_pretty(snapshot)?;

    let dated = out_dir.join(format!("{}.json", snapshot.date));
    fs::write(&dated, &json)?;
    fs::write(out_dir.join("latest.json"), &json)?;
    Ok(())
}

/// Read a snapshot back from disk (used by the compare subcommand).
pub fn read_snapshot(path: &Path) -> Result<Snapshot, Error> {
    let contents = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_report(race_id: &str) -> RaceReport {
        RaceReport {
            race_id: race_id.into(),
            chamber: "House".into(),
            state: "AL".into(),
            state_name: "Alabama".into(),
            label: "AL-1".into(),
            grade: Grade::B,
            liquidity_score: 0.612,
            volume_pct: 0.5,
            spread_pct: 0.7,
            oi_pct: 0.6,
            rating: Some(Rating::LeanR),
            margin: Some(5),
        }
    }

    #[test]
    fn test_build_snapshot_merges_links() {
        let mut links = HashMap::new();
        links.insert(
            "H2026AL01".to_string(),
            RaceLinks {
                event_ticker: Some("KXHOUSEAL01-26".into()),
                kalshi_url: Some("https://kalshi.com/markets/x/y/z".into()),
            },
        );
        let snapshot = build_snapshot("2026-08-07", vec![make_report("H2026AL01")], &links);

        assert_eq!(snapshot.total_races, 1);
        let race = &snapshot.races[0];
        assert_eq!(race.event_ticker.as_deref(), Some("KXHOUSEAL01-26"));
        assert!(race.kalshi_url.is_some());
    }

    #[test]
    fn test_missing_links_are_null_not_error() {
        let snapshot = build_snapshot("2026-08-07", vec![make_report("H2026AL01")], &HashMap::new());
        assert_eq!(snapshot.races[0].event_ticker, None);
        assert_eq!(snapshot.races[0].kalshi_url, None);
    }

    #[test]
    fn test_write_and_read_round_trip() {
        let out_dir = std::env::temp_dir().join("race_grades_output_test");
        let snapshot = build_snapshot("2026-08-07", vec![make_report("H2026AL01")], &HashMap::new());
        write_snapshot(&out_dir, &snapshot).expect("write");

        let latest = read_snapshot(&out_dir.join("latest.json")).expect("read latest");
        assert_eq!(latest.date, "2026-08-07");
        assert_eq!(latest.races[0].rating, Some(Rating::LeanR));
        assert_eq!(latest.races[0].margin, Some(5));

        let dated = read_snapshot(&out_dir.join("2026-08-07.json")).expect("read dated");
        assert_eq!(dated.total_races, latest.total_races);

        std::fs::remove_dir_all(&out_dir).ok();
    }

    #[test]
    fn test_json_uses_display_labels() {
        let snapshot = build_snapshot("2026-08-07", vec![make_report("H2026AL01")], &HashMap::new());
        let json = serde_json::to_string(&snapshot).expect("serialize");
        assert!(json.contains("\"Lean R\""), "rating serializes as its label");
        assert!(json.contains("\"grade\":\"B\""));
    }
}
