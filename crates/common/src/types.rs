//! Domain types shared across the pipeline.

use serde::{Deserialize, Deserializer, Serialize};

// ── Kalshi Market Types ───────────────────────────────────────────────

/// A Kalshi market as returned by GET /trade-api/v2/markets.
///
/// Price and size fields deserialize leniently: a JSON number is taken as
/// is, a numeric string is parsed, and anything else (null, missing,
/// garbage) becomes 0. Thin election markets routinely omit fields, and a
/// zero reads the same as "never traded" downstream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketInfo {
    #[serde(default)]
    pub ticker: String,
    #[serde(default)]
    pub event_ticker: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub yes_sub_title: String,
    #[serde(default)]
    pub status: String,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub yes_bid: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub yes_ask: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub last_price: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub volume: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub open_interest: f64,
}

/// Paginated response from GET /trade-api/v2/markets.
#[derive(Debug, Clone, Deserialize)]
pub struct MarketsResponse {
    #[serde(default)]
    pub markets: Vec<MarketInfo>,
    #[serde(default)]
    pub cursor: Option<String>,
}

/// Series info from GET /trade-api/v2/series/{ticker}.
#[derive(Debug, Clone, Deserialize)]
pub struct SeriesInfo {
    #[serde(default)]
    pub ticker: String,
    #[serde(default)]
    pub title: String,
}

/// Response wrapper for the series endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct SeriesResponse {
    pub series: SeriesInfo,
}

fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Number(n) => n.as_f64().unwrap_or(0.0),
        serde_json::Value::String(s) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    })
}

// ── Quote Records ─────────────────────────────────────────────────────

/// One market contract tagged with the race it belongs to — the input
/// unit of the grading engine.
#[derive(Debug, Clone)]
pub struct QuoteRecord {
    pub race_id: String,
    /// Contract side description (e.g. "Republican candidate").
    pub yes_sub_title: String,
    pub yes_bid: f64,
    pub yes_ask: f64,
    pub last_price: f64,
    pub volume: f64,
    pub open_interest: f64,
}

impl QuoteRecord {
    pub fn from_market(race_id: String, market: &MarketInfo) -> Self {
        Self {
            race_id,
            yes_sub_title: market.yes_sub_title.clone(),
            yes_bid: market.yes_bid,
            yes_ask: market.yes_ask,
            last_price: market.last_price,
            volume: market.volume,
            open_interest: market.open_interest,
        }
    }
}

// ── Party / Race Classification ───────────────────────────────────────

/// Party affiliation of one contract side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Party {
    #[serde(rename = "R")]
    Republican,
    #[serde(rename = "D")]
    Democratic,
    #[serde(rename = "I")]
    Independent,
}

/// Race-type cohort, derived from the leading letter of a race id.
///
/// Percentile ranks are computed within a cohort: House volume is only
/// comparable to House volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RaceType {
    House,
    Senate,
    Governor,
    Presidential,
    Other(char),
}

impl RaceType {
    pub fn from_code(code: char) -> Self {
        match code {
            'H' => RaceType::House,
            'S' => RaceType::Senate,
            'G' => RaceType::Governor,
            'P' => RaceType::Presidential,
            other => RaceType::Other(other),
        }
    }

    /// Display name of the chamber ("House", "Senate", ...). Unknown
    /// codes echo the raw letter, matching the race-id convention.
    pub fn chamber_name(&self) -> String {
        match self {
            RaceType::House => "House".into(),
            RaceType::Senate => "Senate".into(),
            RaceType::Governor => "Governor".into(),
            RaceType::Presidential => "Presidential".into(),
            RaceType::Other(c) => c.to_string(),
        }
    }

    /// Race-type multiplier applied to the margin-conversion volatility.
    pub fn margin_multiplier(&self) -> f64 {
        match self {
            RaceType::House => 1.01,
            RaceType::Governor => 0.98,
            RaceType::Senate => 0.88,
            RaceType::Presidential => 0.83,
            RaceType::Other(_) => 1.0,
        }
    }
}

// ── Race Ids ──────────────────────────────────────────────────────────

/// A fixed-width race identifier like `H2026AL01` or `S2026NE`:
/// chamber letter, four-digit year, two-letter state, district/seat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RaceId(String);

impl RaceId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn race_type(&self) -> RaceType {
        RaceType::from_code(self.0.chars().next().unwrap_or('?'))
    }

    /// Two-letter state abbreviation (empty for malformed ids).
    pub fn state(&self) -> &str {
        self.0.get(5..7).unwrap_or("")
    }

    /// District or seat suffix (empty for statewide races).
    pub fn district(&self) -> &str {
        self.0.get(7..).unwrap_or("")
    }

    pub fn chamber(&self) -> String {
        self.race_type().chamber_name()
    }

    pub fn state_name(&self) -> String {
        state_name(self.state())
            .map(str::to_string)
            .unwrap_or_else(|| self.state().to_string())
    }

    /// Human-readable label: `AL-2` for House districts (at-large seats
    /// keep their `AL` suffix), the state name otherwise.
    pub fn label(&self) -> String {
        if self.race_type() == RaceType::House {
            let district = self.district().trim_start_matches('0');
            let district = if district.is_empty() { "AL" } else { district };
            format!("{}-{}", self.state(), district)
        } else {
            self.state_name()
        }
    }
}

/// Full state name for a USPS abbreviation.
pub fn state_name(abbr: &str) -> Option<&'static str> {
    let name = match abbr {
        "AL" => "Alabama",
        "AK" => "Alaska",
        "AZ" => "Arizona",
        "AR" => "Arkansas",
        "CA" => "California",
        "CO" => "Colorado",
        "CT" => "Connecticut",
        "DE" => "Delaware",
        "FL" => "Florida",
        "GA" => "Georgia",
        "HI" => "Hawaii",
        "ID" => "Idaho",
        "IL" => "Illinois",
        "IN" => "Indiana",
        "IA" => "Iowa",
        "KS" => "Kansas",
        "KY" => "Kentucky",
        "LA" => "Louisiana",
        "ME" => "Maine",
        "MD" => "Maryland",
        "MA" => "Massachusetts",
        "MI" => "Michigan",
        "MN" => "Minnesota",
        "MS" => "Mississippi",
        "MO" => "Missouri",
        "MT" => "Montana",
        "NE" => "Nebraska",
        "NV" => "Nevada",
        "NH" => "New Hampshire",
        "NJ" => "New Jersey",
        "NM" => "New Mexico",
        "NY" => "New York",
        "NC" => "North Carolina",
        "ND" => "North Dakota",
        "OH" => "Ohio",
        "OK" => "Oklahoma",
        "OR" => "Oregon",
        "PA" => "Pennsylvania",
        "RI" => "Rhode Island",
        "SC" => "South Carolina",
        "SD" => "South Dakota",
        "TN" => "Tennessee",
        "TX" => "Texas",
        "UT" => "Utah",
        "VT" => "Vermont",
        "VA" => "Virginia",
        "WA" => "Washington",
        "WV" => "West Virginia",
        "WI" => "Wisconsin",
        "WY" => "Wyoming",
        _ => return None,
    };
    Some(name)
}
