//! Quote normalization.
//!
//! Turns raw quote records into `Contract`s: infers the party from the
//! contract title, derives book attributes (two-sidedness, spread,
//! midpoint), and flags stale last trades. Contracts whose party cannot
//! be inferred are dropped from scoring; the race itself survives via
//! the aggregation fallback.

use common::config::{EngineConfig, PartyOverride};
use common::{Party, QuoteRecord, RaceId, RaceType};

/// A normalized contract: one tradable side of a race market.
#[derive(Debug, Clone)]
pub struct Contract {
    pub race_id: String,
    pub race_type: RaceType,
    pub party: Party,
    pub yes_bid: f64,
    pub yes_ask: f64,
    pub last_price: f64,
    pub volume: f64,
    pub open_interest: f64,
    /// Both bid and ask strictly positive.
    pub has_two_sided: bool,
    /// Ask minus bid, defined only for two-sided books.
    pub spread: Option<f64>,
    /// Bid/ask midpoint, defined only for two-sided books.
    pub midpoint: Option<f64>,
    /// Two-sided and last trade printed outside the quoted band.
    pub is_stale: bool,
}

/// Infer the party from a contract title.
///
/// Candidate-name overrides are checked first so ambiguous titles (an
/// independent running against a same-state namesake, say) resolve
/// correctly; otherwise a "republican"/"democratic" keyword decides.
pub fn extract_party(yes_sub_title: &str, overrides: &[PartyOverride]) -> Option<Party> {
    let title = yes_sub_title.to_lowercase();
    for or in overrides {
        if title.contains(or.name.as_str()) {
            return Some(or.party);
        }
    }
    if title.contains("republican") {
        Some(Party::Republican)
    } else if title.contains("democratic") {
        Some(Party::Democratic)
    } else {
        None
    }
}

/// Normalize a snapshot of quote records, dropping contracts with no
/// inferable party.
pub fn normalize(records: &[QuoteRecord], cfg: &EngineConfig) -> Vec<Contract> {
    records
        .iter()
        .filter_map(|rec| {
            let party = extract_party(&rec.yes_sub_title, &cfg.party_overrides)?;
            let has_two_sided = rec.yes_bid > 0.0 && rec.yes_ask > 0.0;
            let spread = has_two_sided.then(|| rec.yes_ask - rec.yes_bid);
            let midpoint = has_two_sided.then(|| (rec.yes_bid + rec.yes_ask) / 2.0);
            let is_stale =
                has_two_sided && (rec.last_price < rec.yes_bid || rec.last_price > rec.yes_ask);

            Some(Contract {
                race_id: rec.race_id.clone(),
                race_type: RaceId::new(rec.race_id.clone()).race_type(),
                party,
                yes_bid: rec.yes_bid,
                yes_ask: rec.yes_ask,
                last_price: rec.last_price,
                volume: rec.volume,
                open_interest: rec.open_interest,
                has_two_sided,
                spread,
                midpoint,
                is_stale,
            })
        })
        .collect()
}
