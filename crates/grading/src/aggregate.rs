//! Race aggregation.
//!
//! Groups scored contracts by race, normalizes their blended
//! probabilities so each race's contracts sum to 100, and extracts the
//! Republican win percentage. Races with no usable probability keep a
//! raw fallback price so the auto-labeler can still claim the obvious
//! blowouts.

use std::collections::BTreeMap;

use common::{Party, RaceId, RaceType};

use crate::liquidity::LiquidityScore;
use crate::normalize::Contract;

/// A contract with its liquidity score and blended probability attached.
#[derive(Debug, Clone)]
pub struct ScoredContract {
    pub contract: Contract,
    pub liquidity: LiquidityScore,
    /// Blended win probability in (0, 100), if the contract had enough
    /// evidence to price.
    pub probability: Option<f64>,
}

/// Per-race aggregate: the target-party win percentage plus mean
/// liquidity attributes over the contracts that priced.
#[derive(Debug, Clone)]
pub struct RaceRollup {
    pub race_id: String,
    pub race_type: RaceType,
    /// Normalized Republican win percentage; `None` marks the race
    /// unrated.
    pub probability: Option<f64>,
    pub liquidity_score: Option<f64>,
    pub volume_pct: Option<f64>,
    pub spread_pct: Option<f64>,
    pub oi_pct: Option<f64>,
    /// Raw Republican percentage straight off the tape, kept for the
    /// auto-label fallback on unrated races.
    pub raw_r_pct: Option<f64>,
}

/// Price straight off the tape: the last trade, or the bid when the
/// contract never traded.
fn raw_price(contract: &Contract) -> f64 {
    if contract.last_price > 0.0 {
        contract.last_price
    } else {
        contract.yes_bid
    }
}

/// Raw Republican percentage for a race: the first R contract's tape
/// price, else 100 minus the first D contract's.
fn raw_republican_pct(group: &[&ScoredContract]) -> Option<f64> {
    if let Some(r) = group.iter().find(|s| s.contract.party == Party::Republican) {
        return Some(raw_price(&r.contract));
    }
    group
        .iter()
        .find(|s| s.contract.party == Party::Democratic)
        .map(|d| 100.0 - raw_price(&d.contract))
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let mut sum = 0.0;
    let mut n = 0usize;
    for v in values {
        sum += v;
        n += 1;
    }
    (n > 0).then(|| sum / n as f64)
}

/// Aggregate scored contracts into one rollup per race.
///
/// Races are keyed and emitted in race-id order, keeping the whole
/// pipeline deterministic for identical input.
pub fn aggregate_races(scored: &[ScoredContract]) -> Vec<RaceRollup> {
    let mut groups: BTreeMap<&str, Vec<&ScoredContract>> = BTreeMap::new();
    for s in scored {
        groups.entry(s.contract.race_id.as_str()).or_default().push(s);
    }

    let mut rollups = Vec::with_capacity(groups.len());
    for (race_id, group) in groups {
        let race_type = RaceId::new(race_id.to_string()).race_type();
        let raw_r_pct = raw_republican_pct(&group);

        let valid: Vec<&ScoredContract> =
            group.iter().copied().filter(|s| s.probability.is_some()).collect();

        let unrated = RaceRollup {
            race_id: race_id.to_string(),
            race_type,
            probability: None,
            liquidity_score: None,
            volume_pct: None,
            spread_pct: None,
            oi_pct: None,
            raw_r_pct,
        };

        if valid.is_empty() {
            rollups.push(unrated);
            continue;
        }

        let total: f64 = valid.iter().filter_map(|s| s.probability).sum();
        if total <= 0.0 {
            rollups.push(unrated);
            continue;
        }

        // Normalize so the race's contracts sum to 100.
        let normalized: Vec<(Party, f64)> = valid
            .iter()
            .filter_map(|s| s.probability.map(|p| (s.contract.party, p / total * 100.0)))
            .collect();

        let rep_pct = match normalized.iter().find(|(party, _)| *party == Party::Republican) {
            Some((_, p)) => *p,
            // No direct R contract: whatever the others leave on the
            // table belongs to the Republican side.
            None => {
                100.0
                    - normalized
                        .iter()
                        .filter(|(party, _)| *party != Party::Republican)
                        .map(|(_, p)| p)
                        .sum::<f64>()
            }
        };

        rollups.push(RaceRollup {
            race_id: race_id.to_string(),
            race_type,
            probability: Some(rep_pct),
            liquidity_score: mean(valid.iter().map(|s| s.liquidity.composite)),
            volume_pct: mean(valid.iter().map(|s| s.liquidity.volume_pct)),
            spread_pct: mean(valid.iter().map(|s| s.liquidity.spread_pct)),
            oi_pct: mean(valid.iter().map(|s| s.liquidity.oi_pct)),
            raw_r_pct,
        });
    }

    rollups
}
