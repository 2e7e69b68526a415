//! The full grading pipeline.
//!
//! One pure batch transform over a snapshot of quote records:
//! normalize → score liquidity → blend probabilities → aggregate by
//! race → project margins → classify → grade. Unrated races either get
//! the auto-Solid fallback or drop out of the snapshot entirely.

use tracing::debug;

use common::{EngineConfig, QuoteRecord, RaceId};

use crate::aggregate::{aggregate_races, RaceRollup, ScoredContract};
use crate::blend::blend_probability;
use crate::grade::{compute_thresholds, grade_for, Grade, GradeThresholds};
use crate::liquidity::score_contracts;
use crate::margin::implied_margin;
use crate::normalize::normalize;
use crate::rating::{auto_label, classify_margin, Rating};

/// One fully graded race, ready for output.
#[derive(Debug, Clone)]
pub struct RaceReport {
    pub race_id: String,
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

/// Snapshot result: graded races plus run statistics.
#[derive(Debug, Clone)]
pub struct PipelineReport {
    pub races: Vec<RaceReport>,
    pub thresholds: GradeThresholds,
    pub rated_count: usize,
    pub unrated_count: usize,
    pub auto_labeled_count: usize,
}

fn round3(x: f64) -> f64 {
    (x * 1000.0).round() / 1000.0
}

fn identity_fields(race_id: &str) -> (String, String, String, String) {
    let rid = RaceId::new(race_id.to_string());
    (
        rid.chamber(),
        rid.state().to_string(),
        rid.state_name(),
        rid.label(),
    )
}

fn rated_report(
    rollup: &RaceRollup,
    days_to_election: i64,
    thresholds: &GradeThresholds,
    cfg: &EngineConfig,
) -> Option<RaceReport> {
    let probability = rollup.probability?;
    let margin = implied_margin(probability, rollup.race_type, days_to_election, cfg);
    let rating = margin.map(classify_margin);
    let (chamber, state, state_name, label) = identity_fields(&rollup.race_id);

    Some(RaceReport {
        race_id: rollup.race_id.clone(),
        chamber,
        state,
        state_name,
        label,
        grade: grade_for(rollup.liquidity_score, thresholds),
        liquidity_score: round3(rollup.liquidity_score.unwrap_or(0.0)),
        volume_pct: round3(rollup.volume_pct.unwrap_or(0.0)),
        spread_pct: round3(rollup.spread_pct.unwrap_or(0.0)),
        oi_pct: round3(rollup.oi_pct.unwrap_or(0.0)),
        rating,
        margin,
    })
}

fn fallback_report(
    rollup: &RaceRollup,
    thresholds: &GradeThresholds,
    cfg: &EngineConfig,
) -> Option<RaceReport> {
    let raw_r_pct = rollup.raw_r_pct?;
    let rating = auto_label(raw_r_pct, cfg.auto_solid_threshold)?;
    let (chamber, state, state_name, label) = identity_fields(&rollup.race_id);
    let liquidity = rollup.liquidity_score.unwrap_or(0.0);

    Some(RaceReport {
        race_id: rollup.race_id.clone(),
        chamber,
        state,
        state_name,
        label,
        grade: grade_for(Some(liquidity), thresholds),
        liquidity_score: round3(liquidity),
        volume_pct: 0.0,
        spread_pct: 0.0,
        oi_pct: 0.0,
        rating: Some(rating),
        margin: None,
    })
}

/// Competitive races first: Senate, then Governor, then House, closest
/// margins leading within each chamber. Unrated margins sort last.
fn sort_competitive_first(races: &mut [RaceReport]) {
    fn chamber_rank(chamber: &str) -> u8 {
        match chamber {
            "Senate" => 0,
            "Governor" => 1,
            "House" => 2,
            _ => 9,
        }
    }
    races.sort_by_key(|r| {
        (
            chamber_rank(&r.chamber),
            r.margin.map(|m| m.abs()).unwrap_or(999),
        )
    });
}

/// Run the whole engine over one snapshot.
///
/// Deterministic in (records, days_to_election, cfg): no clocks, no
/// randomness, no state across calls.
pub fn run_pipeline(
    records: &[QuoteRecord],
    days_to_election: i64,
    cfg: &EngineConfig,
) -> PipelineReport {
    let contracts = normalize(records, cfg);
    let scores = score_contracts(&contracts, cfg);

    let scored: Vec<ScoredContract> = contracts
        .into_iter()
        .zip(scores)
        .map(|(contract, liquidity)| {
            let probability = blend_probability(&contract, liquidity.composite, cfg);
            ScoredContract {
                contract,
                liquidity,
                probability,
            }
        })
        .collect();

    let rollups = aggregate_races(&scored);
    debug!(
        "aggregated {} contracts into {} races",
        scored.len(),
        rollups.len()
    );

    // Grade cutoffs come from the whole population, rated or not,
    // wherever a score exists.
    let pooled: Vec<f64> = rollups.iter().filter_map(|r| r.liquidity_score).collect();
    let thresholds = compute_thresholds(&pooled);

    let mut races = Vec::with_capacity(rollups.len());
    let mut rated_count = 0;
    let mut unrated_count = 0;
    let mut auto_labeled_count = 0;

    for rollup in &rollups {
        if rollup.probability.is_some() {
            if let Some(report) = rated_report(rollup, days_to_election, &thresholds, cfg) {
                races.push(report);
                rated_count += 1;
            }
        } else {
            unrated_count += 1;
            if let Some(report) = fallback_report(rollup, &thresholds, cfg) {
                races.push(report);
                auto_labeled_count += 1;
            }
        }
    }

    sort_competitive_first(&mut races);

    PipelineReport {
        races,
        thresholds,
        rated_count,
        unrated_count,
        auto_labeled_count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_quote(
        race_id: &str,
        title: &str,
        bid: f64,
        ask: f64,
        last: f64,
        volume: f64,
        oi: f64,
    ) -> QuoteRecord {
        QuoteRecord {
            race_id: race_id.into(),
            yes_sub_title: title.into(),
            yes_bid: bid,
            yes_ask: ask,
            last_price: last,
            volume,
            open_interest: oi,
        }
    }

    /// The two-contract race from the worked scenario: R at 40/44 last
    /// 41, D at 54/58 last 56, identical liquidity.
    fn worked_race() -> Vec<QuoteRecord> {
        vec![
            make_quote("H2026AL01", "Republican candidate", 40.0, 44.0, 41.0, 100.0, 50.0),
            make_quote("H2026AL01", "Democratic candidate", 54.0, 58.0, 56.0, 100.0, 50.0),
        ]
    }

    #[test]
    fn test_worked_scenario_rates_tossup_leaning_d() {
        let cfg = EngineConfig::default();
        let report = run_pipeline(&worked_race(), 0, &cfg);

        assert_eq!(report.rated_count, 1);
        assert_eq!(report.races.len(), 1);
        let race = &report.races[0];
        assert_eq!(race.label, "AL-1");
        assert_eq!(race.chamber, "House");
        // Both contracts tie on every cohort percentile, so both blend
        // at composite 1.0 (weight 0.75): R = 41.25, D = 56.5; the
        // normalized R share sits just above 42%, a mild D lean that
        // shrinkage and a day-zero sigma keep inside Tossup.
        let margin = race.margin.expect("margin defined");
        assert!(
            (-4..0).contains(&margin),
            "expected a small D-leaning margin, got {}",
            margin
        );
        assert_eq!(race.rating, Some(Rating::Tossup));
        assert_eq!(race.grade, Grade::A, "the only race tops its own population");
    }

    #[test]
    fn test_thin_blowout_auto_labeled() {
        let cfg = EngineConfig::default();
        // One-sided book, never mind the tape: unratable but obviously
        // Republican at 85.
        let quotes = vec![make_quote(
            "H2026WY00",
            "Republican candidate",
            0.0,
            0.0,
            85.0,
            3.0,
            0.0,
        )];
        let report = run_pipeline(&quotes, 100, &cfg);

        assert_eq!(report.rated_count, 0);
        assert_eq!(report.unrated_count, 1);
        assert_eq!(report.auto_labeled_count, 1);
        let race = &report.races[0];
        assert_eq!(race.rating, Some(Rating::SolidR));
        assert_eq!(race.margin, None);
        assert_eq!(race.grade, Grade::F, "no liquidity score grades F");
        assert_eq!(race.liquidity_score, 0.0);
    }

    #[test]
    fn test_ambiguous_thin_race_omitted() {
        let cfg = EngineConfig::default();
        let quotes = vec![make_quote(
            "H2026WY00",
            "Republican candidate",
            0.0,
            0.0,
            50.0,
            3.0,
            0.0,
        )];
        let report = run_pipeline(&quotes, 100, &cfg);

        assert_eq!(report.unrated_count, 1);
        assert_eq!(report.auto_labeled_count, 0);
        assert!(
            report.races.is_empty(),
            "a 50/50 thin market is not worth a guess"
        );
    }

    #[test]
    fn test_rating_comes_from_exactly_one_source() {
        let cfg = EngineConfig::default();
        let mut quotes = worked_race();
        quotes.push(make_quote(
            "H2026WY00",
            "Republican candidate",
            0.0,
            0.0,
            85.0,
            3.0,
            0.0,
        ));
        let report = run_pipeline(&quotes, 0, &cfg);

        for race in &report.races {
            if race.margin.is_some() {
                assert!(race.rating.is_some(), "defined margin must be classified");
            } else {
                // Fallback-labeled races never carry a margin.
                assert_eq!(race.race_id, "H2026WY00");
                assert_eq!(race.rating, Some(Rating::SolidR));
            }
        }
    }

    #[test]
    fn test_competitive_sort_order() {
        let cfg = EngineConfig::default();
        let quotes = vec![
            // Safe House race: R at ~90.
            make_quote("H2026AL01", "Republican candidate", 88.0, 92.0, 90.0, 500.0, 200.0),
            make_quote("H2026AL01", "Democratic candidate", 8.0, 12.0, 10.0, 500.0, 200.0),
            // Close Senate race.
            make_quote("S2026OH", "Republican candidate", 48.0, 52.0, 50.0, 500.0, 200.0),
            make_quote("S2026OH", "Democratic candidate", 48.0, 52.0, 50.0, 500.0, 200.0),
        ];
        let report = run_pipeline(&quotes, 200, &cfg);

        assert_eq!(report.races.len(), 2);
        assert_eq!(
            report.races[0].chamber, "Senate",
            "Senate races lead the board"
        );
        assert_eq!(report.races[1].chamber, "House");
    }

    #[test]
    fn test_deterministic_across_runs() {
        let cfg = EngineConfig::default();
        let mut quotes = worked_race();
        quotes.extend(vec![
            make_quote("S2026OH", "Republican candidate", 30.0, 34.0, 31.0, 50.0, 20.0),
            make_quote("S2026OH", "Democratic candidate", 64.0, 68.0, 66.0, 50.0, 20.0),
        ]);
        let a = run_pipeline(&quotes, 120, &cfg);
        let b = run_pipeline(&quotes, 120, &cfg);

        assert_eq!(a.races.len(), b.races.len());
        for (x, y) in a.races.iter().zip(&b.races) {
            assert_eq!(x.race_id, y.race_id);
            assert_eq!(x.margin, y.margin);
            assert_eq!(x.rating, y.rating);
            assert_eq!(x.grade, y.grade);
            assert_eq!(x.liquidity_score, y.liquidity_score);
        }
    }

    #[test]
    fn test_degenerate_normalized_probability_left_unclassified() {
        let cfg = EngineConfig::default();
        // A lone priced contract normalizes to exactly 100, which
        // shrinkage collapses: the race stays in the output but carries
        // neither margin nor rating.
        let quotes = vec![make_quote(
            "G2026TX",
            "Republican candidate",
            40.0,
            44.0,
            41.0,
            100.0,
            50.0,
        )];
        let report = run_pipeline(&quotes, 90, &cfg);

        assert_eq!(report.rated_count, 1);
        let race = &report.races[0];
        assert_eq!(race.margin, None);
        assert_eq!(race.rating, None);
        assert_eq!(race.label, "Texas");
    }
}
