//! Race-id ↔ event-ticker mapping input.
//!
//! A hand-maintained CSV links each race id to the Kalshi event that
//! trades it. Extra columns are ignored; rows missing either field are
//! skipped; duplicate pairs collapse to the first occurrence.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use common::Error;
use serde::Deserialize;

/// One row of the mapping file.
#[derive(Debug, Clone, Deserialize)]
pub struct RaceMapping {
    pub race_id: String,
    pub event_ticker: String,
}

/// Load and deduplicate the mapping CSV.
pub fn load_race_mappings(path: &Path) -> Result<Vec<RaceMapping>, Error> {
    let mut reader = csv::Reader::from_path(path).map_err(|e| Error::Csv(e.to_string()))?;

    let mut seen: HashSet<(String, String)> = HashSet::new();
    let mut mappings = Vec::new();
    for row in reader.deserialize::<RaceMapping>() {
        let mapping = row.map_err(|e| Error::Csv(e.to_string()))?;
        if mapping.race_id.trim().is_empty() || mapping.event_ticker.trim().is_empty() {
            continue;
        }
        if seen.insert((mapping.race_id.clone(), mapping.event_ticker.clone())) {
            mappings.push(mapping);
        }
    }
    Ok(mappings)
}

/// Unique event tickers in first-seen order.
pub fn unique_event_tickers(mappings: &[RaceMapping]) -> Vec<String> {
    let mut seen = HashSet::new();
    mappings
        .iter()
        .filter(|m| seen.insert(m.event_ticker.clone()))
        .map(|m| m.event_ticker.clone())
        .collect()
}

/// Event ticker → race id lookup (first mapping wins).
pub fn race_id_by_event(mappings: &[RaceMapping]) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for m in mappings {
        map.entry(m.event_ticker.clone())
            .or_insert_with(|| m.race_id.clone());
    }
    map
}
