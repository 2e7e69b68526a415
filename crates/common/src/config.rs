//! Engine configuration types.
//!
//! Every tuned constant of the rating engine lives here so calibration
//! changes never require touching engine code. Defaults reproduce the
//! production calibration.

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::types::Party;

/// A candidate-name safety net for contracts whose titles don't name a
/// party (e.g. independents, or famous-name-only contracts).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartyOverride {
    /// Lowercased substring matched against the contract title.
    pub name: String,
    pub party: Party,
}

/// Tunable parameters of the rating engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Composite liquidity score weight for the volume percentile.
    #[serde(default = "default_weight_volume")]
    pub weight_volume: f64,

    /// Composite liquidity score weight for the inverse-spread percentile.
    #[serde(default = "default_weight_spread")]
    pub weight_spread: f64,

    /// Composite liquidity score weight for the open-interest percentile.
    #[serde(default = "default_weight_oi")]
    pub weight_oi: f64,

    /// Last-trade blend weight at composite score 0 (least liquid).
    #[serde(default = "default_ltw_min")]
    pub last_trade_weight_min: f64,

    /// Last-trade blend weight at composite score 1 (most liquid).
    #[serde(default = "default_ltw_max")]
    pub last_trade_weight_max: f64,

    /// Shrinkage exponent pulling extreme probabilities toward 50%.
    #[serde(default = "default_shrinkage_alpha")]
    pub shrinkage_alpha: f64,

    /// Exponent in the volatility base `days^exp / divisor + offset`.
    #[serde(default = "default_sigma_exponent")]
    pub sigma_exponent: f64,

    /// Divisor in the volatility base.
    #[serde(default = "default_sigma_divisor")]
    pub sigma_divisor: f64,

    /// Additive floor of the volatility base.
    #[serde(default = "default_sigma_offset")]
    pub sigma_offset: f64,

    /// Clamp applied to the shrunk probability before the inverse-normal
    /// transform, keeping it inside (0, 1).
    #[serde(default = "default_clamp_epsilon")]
    pub clamp_epsilon: f64,

    /// Raw price at or above which a thin, unratable market is
    /// auto-labeled Solid (and at or below 100 minus it, Solid for the
    /// other party).
    #[serde(default = "default_auto_solid_threshold")]
    pub auto_solid_threshold: f64,

    /// Candidate-name party overrides, checked before title keywords.
    #[serde(default = "default_party_overrides")]
    pub party_overrides: Vec<PartyOverride>,
}

impl EngineConfig {
    /// Check internal consistency, reporting every issue at once.
    pub fn validate(&self) -> Result<(), Error> {
        let mut issues: Vec<String> = Vec::new();

        let weight_sum = self.weight_volume + self.weight_spread + self.weight_oi;
        if (weight_sum - 1.0).abs() > 1e-9 {
            issues.push(format!(
                "composite weights must sum to 1.0 (got {})",
                weight_sum
            ));
        }
        if self.weight_volume < 0.0 || self.weight_spread < 0.0 || self.weight_oi < 0.0 {
            issues.push("composite weights must be >= 0".into());
        }
        if !(0.0..=1.0).contains(&self.last_trade_weight_min)
            || !(0.0..=1.0).contains(&self.last_trade_weight_max)
        {
            issues.push("last-trade weights must be in [0,1]".into());
        }
        if self.last_trade_weight_min > self.last_trade_weight_max {
            issues.push("last_trade_weight_min must be <= last_trade_weight_max".into());
        }
        if self.shrinkage_alpha <= 0.0 {
            issues.push("shrinkage_alpha must be > 0".into());
        }
        if self.sigma_divisor <= 0.0 {
            issues.push("sigma_divisor must be > 0".into());
        }
        if self.sigma_offset < 0.0 {
            issues.push("sigma_offset must be >= 0".into());
        }
        if self.clamp_epsilon <= 0.0 || self.clamp_epsilon >= 0.5 {
            issues.push("clamp_epsilon must be in (0, 0.5)".into());
        }
        if !(50.0..=100.0).contains(&self.auto_solid_threshold) {
            issues.push("auto_solid_threshold must be in [50,100]".into());
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(Error::Config(format!(
                "Invalid engine config:\n - {}",
                issues.join("\n - ")
            )))
        }
    }
}

// ── Defaults ──────────────────────────────────────────────────────────

fn default_weight_volume() -> f64 {
    0.35
}
fn default_weight_spread() -> f64 {
    0.45
}
fn default_weight_oi() -> f64 {
    0.20
}
fn default_ltw_min() -> f64 {
    0.35
}
fn default_ltw_max() -> f64 {
    0.75
}
fn default_shrinkage_alpha() -> f64 {
    1.25
}
fn default_sigma_exponent() -> f64 {
    0.6
}
fn default_sigma_divisor() -> f64 {
    3200.0
}
fn default_sigma_offset() -> f64 {
    0.036
}
fn default_clamp_epsilon() -> f64 {
    1e-4
}
fn default_auto_solid_threshold() -> f64 {
    80.0
}

fn default_party_overrides() -> Vec<PartyOverride> {
    vec![
        PartyOverride {
            name: "osborn".into(),
            party: Party::Independent,
        },
        PartyOverride {
            name: "fischer".into(),
            party: Party::Republican,
        },
    ]
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            weight_volume: default_weight_volume(),
            weight_spread: default_weight_spread(),
            weight_oi: default_weight_oi(),
            last_trade_weight_min: default_ltw_min(),
            last_trade_weight_max: default_ltw_max(),
            shrinkage_alpha: default_shrinkage_alpha(),
            sigma_exponent: default_sigma_exponent(),
            sigma_divisor: default_sigma_divisor(),
            sigma_offset: default_sigma_offset(),
            clamp_epsilon: default_clamp_epsilon(),
            auto_solid_threshold: default_auto_solid_threshold(),
            party_overrides: default_party_overrides(),
        }
    }
}
