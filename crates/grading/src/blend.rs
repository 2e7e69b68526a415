//! Probability blending.
//!
//! Estimates a contract's win probability as a weighted blend of its
//! last trade and its bid/ask midpoint. How much the last trade is
//! trusted scales with the composite liquidity score; a stale print is
//! distrusted outright and first clamped back into the quoted band.

use common::EngineConfig;

use crate::normalize::Contract;

/// Blend the last trade with the midpoint into a win probability in
/// (0, 100), or `None` when the contract carries no usable evidence
/// (never traded with an empty tape, or no two-sided book).
pub fn blend_probability(
    contract: &Contract,
    composite: f64,
    cfg: &EngineConfig,
) -> Option<f64> {
    if contract.last_price == 0.0 && contract.volume == 0.0 {
        return None;
    }
    let midpoint = contract.midpoint?;

    let weight_range = cfg.last_trade_weight_max - cfg.last_trade_weight_min;
    let ltw = cfg.last_trade_weight_min + weight_range * composite;

    if contract.is_stale {
        // The print is outside the live band: fall back to the minimum
        // last-trade weight and substitute the band edge nearest the
        // print for the print itself.
        let ltw = cfg.last_trade_weight_min;
        let dist_bid = (contract.last_price - contract.yes_bid).abs();
        let dist_ask = (contract.last_price - contract.yes_ask).abs();
        let nearest = if dist_bid < dist_ask {
            contract.yes_bid
        } else {
            contract.yes_ask
        };
        Some(ltw * nearest + (1.0 - ltw) * midpoint)
    } else {
        Some(ltw * contract.last_price + (1.0 - ltw) * midpoint)
    }
}
