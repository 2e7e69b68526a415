//! Liquidity scoring.
//!
//! Ranks each contract's volume, inverse spread, and open interest
//! against its race-type cohort (House vs House, Senate vs Senate, ...)
//! and blends the three percentile ranks into one composite score in
//! [0, 1]. Cohorts are sorted once; each rank is then a binary search.

use std::collections::HashMap;

use common::{EngineConfig, RaceType};

use crate::normalize::Contract;

/// Per-contract percentile ranks and their weighted composite.
#[derive(Debug, Clone, Copy)]
pub struct LiquidityScore {
    pub volume_pct: f64,
    pub spread_pct: f64,
    pub oi_pct: f64,
    pub composite: f64,
}

/// A value cohort prepared for repeated percentile-rank queries.
struct RankedCohort {
    sorted: Vec<f64>,
}

impl RankedCohort {
    fn new(mut values: Vec<f64>) -> Self {
        values.sort_by(f64::total_cmp);
        Self { sorted: values }
    }

    /// Fraction of cohort values <= `v`. Empty cohorts return the
    /// neutral rank 0.5.
    fn rank(&self, v: f64) -> f64 {
        if self.sorted.is_empty() {
            return 0.5;
        }
        let at_or_below = self.sorted.partition_point(|x| *x <= v);
        at_or_below as f64 / self.sorted.len() as f64
    }
}

/// Spread quality expressed so that tighter books rank higher. A missing
/// or zero spread gets 0, the worst possible rank.
fn inverse_spread(contract: &Contract) -> f64 {
    match contract.spread {
        Some(s) if s > 0.0 => 1.0 / s,
        _ => 0.0,
    }
}

/// Score every contract against its race-type cohort.
///
/// Output is index-aligned with the input slice.
pub fn score_contracts(contracts: &[Contract], cfg: &EngineConfig) -> Vec<LiquidityScore> {
    // Group contract indexes by cohort.
    let mut cohorts: HashMap<RaceType, Vec<usize>> = HashMap::new();
    for (i, c) in contracts.iter().enumerate() {
        cohorts.entry(c.race_type).or_default().push(i);
    }

    let mut scores = vec![
        LiquidityScore {
            volume_pct: 0.0,
            spread_pct: 0.0,
            oi_pct: 0.0,
            composite: 0.0,
        };
        contracts.len()
    ];

    for members in cohorts.values() {
        let volumes = RankedCohort::new(members.iter().map(|&i| contracts[i].volume).collect());
        let inv_spreads =
            RankedCohort::new(members.iter().map(|&i| inverse_spread(&contracts[i])).collect());
        let ois =
            RankedCohort::new(members.iter().map(|&i| contracts[i].open_interest).collect());

        for &i in members {
            let c = &contracts[i];
            let volume_pct = volumes.rank(c.volume);
            let spread_pct = inv_spreads.rank(inverse_spread(c));
            let oi_pct = ois.rank(c.open_interest);
            let composite = cfg.weight_volume * volume_pct
                + cfg.weight_spread * spread_pct
                + cfg.weight_oi * oi_pct;
            scores[i] = LiquidityScore {
                volume_pct,
                spread_pct,
                oi_pct,
                composite,
            };
        }
    }

    scores
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::Party;

    fn make_contract(race_id: &str, volume: f64, spread: Option<f64>, oi: f64) -> Contract {
        let (bid, ask) = match spread {
            Some(s) => (40.0, 40.0 + s),
            None => (0.0, 44.0),
        };
        Contract {
            race_id: race_id.into(),
            race_type: common::RaceId::new(race_id.to_string()).race_type(),
            party: Party::Republican,
            yes_bid: bid,
            yes_ask: ask,
            last_price: 41.0,
            volume,
            open_interest: oi,
            has_two_sided: spread.is_some(),
            spread,
            midpoint: spread.map(|s| 40.0 + s / 2.0),
            is_stale: false,
        }
    }

    #[test]
    fn test_rank_bounds() {
        let cohort = RankedCohort::new(vec![1.0, 2.0, 3.0, 4.0]);
        assert_eq!(cohort.rank(1.0), 0.25, "minimum ranks 1/N");
        assert_eq!(cohort.rank(4.0), 1.0, "maximum ranks 1.0");
        assert_eq!(cohort.rank(0.5), 0.0, "below the cohort ranks 0");
    }

    #[test]
    fn test_rank_monotonic() {
        let cohort = RankedCohort::new(vec![5.0, 1.0, 3.0, 3.0, 9.0]);
        let mut prev = 0.0;
        for v in [0.0, 1.0, 2.0, 3.0, 5.0, 9.0, 100.0] {
            let r = cohort.rank(v);
            assert!(r >= prev, "rank({}) = {} regressed below {}", v, r, prev);
            assert!((0.0..=1.0).contains(&r));
            prev = r;
        }
    }

    #[test]
    fn test_rank_ties_counted_inclusively() {
        let cohort = RankedCohort::new(vec![3.0, 3.0, 3.0, 7.0]);
        assert_eq!(cohort.rank(3.0), 0.75, "all tied values count");
    }

    #[test]
    fn test_empty_cohort_is_neutral() {
        let cohort = RankedCohort::new(vec![]);
        assert_eq!(cohort.rank(42.0), 0.5);
    }

    #[test]
    fn test_composite_in_unit_interval() {
        let cfg = EngineConfig::default();
        let contracts = vec![
            make_contract("H2026AL01", 1000.0, Some(1.0), 500.0),
            make_contract("H2026AL02", 10.0, Some(9.0), 5.0),
            make_contract("H2026AL03", 0.0, None, 0.0),
        ];
        for s in score_contracts(&contracts, &cfg) {
            assert!(
                (0.0..=1.0).contains(&s.composite),
                "composite {} escaped [0,1]",
                s.composite
            );
        }
    }

    #[test]
    fn test_tighter_spread_ranks_higher() {
        let cfg = EngineConfig::default();
        let contracts = vec![
            make_contract("H2026AL01", 100.0, Some(1.0), 50.0),
            make_contract("H2026AL02", 100.0, Some(8.0), 50.0),
            make_contract("H2026AL03", 100.0, None, 50.0),
        ];
        let scores = score_contracts(&contracts, &cfg);
        assert!(
            scores[0].spread_pct > scores[1].spread_pct,
            "1c spread must outrank 8c spread"
        );
        assert!(
            scores[1].spread_pct > scores[2].spread_pct,
            "any live spread must outrank a one-sided book"
        );
    }

    #[test]
    fn test_cohorts_are_independent() {
        let cfg = EngineConfig::default();
        // A lone Senate contract ranks only against itself: every
        // percentile is 1.0 regardless of how deep House books are.
        let contracts = vec![
            make_contract("H2026AL01", 1_000_000.0, Some(1.0), 500_000.0),
            make_contract("S2026OH", 1.0, Some(30.0), 1.0),
        ];
        let scores = score_contracts(&contracts, &cfg);
        assert_eq!(scores[1].volume_pct, 1.0);
        assert_eq!(scores[1].spread_pct, 1.0);
        assert_eq!(scores[1].oi_pct, 1.0);
        assert!((scores[1].composite - 1.0).abs() < 1e-12);
    }
}
