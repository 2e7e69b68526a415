//! Race grading engine.
//!
//! Pure, synchronous batch transform: market quote records in, rated and
//! graded races out. No I/O, no clocks, no shared state — identical
//! inputs always produce identical output.

pub mod aggregate;
pub mod blend;
pub mod grade;
pub mod liquidity;
pub mod margin;
pub mod normalize;
pub mod pipeline;
pub mod rating;

pub use aggregate::{aggregate_races, RaceRollup, ScoredContract};
pub use blend::blend_probability;
pub use grade::{compute_thresholds, grade_for, Grade, GradeThresholds};
pub use liquidity::{score_contracts, LiquidityScore};
pub use margin::{implied_margin, sigma};
pub use normalize::{extract_party, normalize, Contract};
pub use pipeline::{run_pipeline, PipelineReport, RaceReport};
pub use rating::{auto_label, classify_margin, Rating};
