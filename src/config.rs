//! Configuration loader — merges defaults, optional config.toml, and
//! environment variables.

use std::path::Path;

use chrono::NaiveDate;
use common::{EngineConfig, Error};
use serde::{Deserialize, Serialize};

/// Top-level pipeline configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Kalshi public API base, including the trade-api prefix.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Client-side read budget (the public cap is 20/s).
    #[serde(default = "default_requests_per_second")]
    pub requests_per_second: u32,

    /// Election day; quoted ISO date in config.toml.
    #[serde(default = "default_election_day")]
    pub election_day: NaiveDate,

    /// Rating engine parameters.
    #[serde(default)]
    pub engine: EngineConfig,
}

// ── Defaults ──────────────────────────────────────────────────────────

fn default_base_url() -> String {
    "https://api.elections.kalshi.com/trade-api/v2".into()
}

fn default_requests_per_second() -> u32 {
    10
}

fn default_election_day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 11, 3).expect("valid date")
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            requests_per_second: default_requests_per_second(),
            election_day: default_election_day(),
            engine: EngineConfig::default(),
        }
    }
}

fn validate_config(config: &PipelineConfig) -> Result<(), Error> {
    if config.base_url.trim().is_empty() {
        return Err(Error::Config("base_url must not be empty".into()));
    }
    if config.requests_per_second == 0 {
        return Err(Error::Config("requests_per_second must be > 0".into()));
    }
    config.engine.validate()
}

/// Load pipeline configuration from defaults, optional `config.toml`,
/// and environment overrides (highest priority).
pub fn load_config() -> Result<PipelineConfig, Error> {
    if let Err(e) = dotenvy::dotenv() {
        tracing::debug!("No .env file loaded: {}", e);
    }

    let mut config = PipelineConfig::default();

    let config_path = Path::new("config.toml");
    if config_path.exists() {
        let contents = std::fs::read_to_string(config_path)
            .map_err(|e| Error::Config(format!("Failed to read config.toml: {}", e)))?;
        config = toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse config.toml: {}", e)))?;
    }

    if let Ok(url) = std::env::var("KALSHI_BASE_URL") {
        config.base_url = url;
    }
    if let Ok(raw) = std::env::var("KALSHI_REQUESTS_PER_SECOND") {
        config.requests_per_second = raw
            .trim()
            .parse::<u32>()
            .map_err(|_| Error::Config("KALSHI_REQUESTS_PER_SECOND must be an integer".into()))?;
    }
    if let Ok(raw) = std::env::var("ELECTION_DAY") {
        config.election_day = raw
            .trim()
            .parse::<NaiveDate>()
            .map_err(|_| Error::Config("ELECTION_DAY must be a YYYY-MM-DD date".into()))?;
    }

    validate_config(&config)?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        validate_config(&PipelineConfig::default()).expect("defaults must validate");
    }

    #[test]
    fn test_zero_rate_rejected() {
        let cfg = PipelineConfig {
            requests_per_second: 0,
            ..PipelineConfig::default()
        };
        assert!(validate_config(&cfg).is_err());
    }

    #[test]
    fn test_toml_round_trip() {
        let toml_src = r#"
            base_url = "https://demo-api.kalshi.co/trade-api/v2"
            requests_per_second = 5
            election_day = "2028-11-07"

            [engine]
            shrinkage_alpha = 1.5
        "#;
        let cfg: PipelineConfig = toml::from_str(toml_src).expect("parse");
        assert_eq!(cfg.requests_per_second, 5);
        assert_eq!(
            cfg.election_day,
            NaiveDate::from_ymd_opt(2028, 11, 7).expect("valid date")
        );
        assert_eq!(cfg.engine.shrinkage_alpha, 1.5);
        assert_eq!(cfg.engine.weight_volume, 0.35, "unset fields keep defaults");
    }
}
