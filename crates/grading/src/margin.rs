//! Probability-to-margin projection.
//!
//! Shrinks the win percentage toward 50% (raw prices in thin contracts
//! overstate certainty), maps it through the inverse standard-normal
//! CDF, and scales the z-score by a volatility that widens with time to
//! the election and varies by race type.
//!
//! The inverse CDF uses Acklam's rational approximation (relative error
//! < 1.15e-9 over the open unit interval).

use common::{EngineConfig, RaceType};

/// Power-law shrinkage toward 0.5: `p^α / (p^α + (1−p)^α)`.
///
/// Fixed point at p = 0.5; monotonic in p for α > 0.
pub fn shrink(p: f64, alpha: f64) -> f64 {
    let num = p.powf(alpha);
    let den = num + (1.0 - p).powf(alpha);
    num / den
}

/// Volatility for a race: `(days^exp / divisor + offset)` scaled by the
/// race-type multiplier. `days_to_election` is an explicit input so the
/// engine never touches the wall clock.
pub fn sigma(race_type: RaceType, days_to_election: i64, cfg: &EngineConfig) -> f64 {
    let days = days_to_election.max(0) as f64;
    let base = days.powf(cfg.sigma_exponent) / cfg.sigma_divisor + cfg.sigma_offset;
    base * race_type.margin_multiplier()
}

/// Project a win percentage onto a signed implied margin in percentage
/// points (positive favors the Republican side). Returns `None` when
/// shrinkage collapses the probability to an exact 0 or 100.
pub fn project_margin(probability_pct: f64, sigma: f64, cfg: &EngineConfig) -> Option<f64> {
    let shrunk_pct = shrink(probability_pct / 100.0, cfg.shrinkage_alpha) * 100.0;
    if shrunk_pct <= 0.0 || shrunk_pct >= 100.0 {
        return None;
    }
    let p = (shrunk_pct / 100.0).clamp(cfg.clamp_epsilon, 1.0 - cfg.clamp_epsilon);
    let z = inverse_normal_cdf(p);
    Some((z * sigma * 200.0).round())
}

/// Margin for a race, rounded to a whole percentage point.
pub fn implied_margin(
    probability_pct: f64,
    race_type: RaceType,
    days_to_election: i64,
    cfg: &EngineConfig,
) -> Option<i64> {
    project_margin(probability_pct, sigma(race_type, days_to_election, cfg), cfg)
        .map(|m| m as i64)
}

// ── Inverse Normal CDF (Acklam) ───────────────────────────────────────

/// Quantile function of the standard normal distribution.
///
/// Rational approximation with two tail regions and a central region;
/// coefficients from Acklam (2003). Inputs at or beyond the unit
/// interval saturate to infinities, mirroring the CDF's tails.
pub fn inverse_normal_cdf(p: f64) -> f64 {
    const A: [f64; 6] = [
        -3.969683028665376e+01,
        2.209460984245205e+02,
        -2.759285104469687e+02,
        1.383577518672690e+02,
        -3.066479806614716e+01,
        2.506628277459239e+00,
    ];
    const B: [f64; 5] = [
        -5.447609879822406e+01,
        1.615858368580409e+02,
        -1.556989798598866e+02,
        6.680131188771972e+01,
        -1.328068155288572e+01,
    ];
    const C: [f64; 6] = [
        -7.784894002430293e-03,
        -3.223964580411365e-01,
        -2.400758277161838e+00,
        -2.549732539343734e+00,
        4.374664141464968e+00,
        2.938163982698783e+00,
    ];
    const D: [f64; 4] = [
        7.784695709041462e-03,
        3.224671290700398e-01,
        2.445134137142996e+00,
        3.754408661907416e+00,
    ];
    const P_LOW: f64 = 0.02425;

    if p <= 0.0 {
        return f64::NEG_INFINITY;
    }
    if p >= 1.0 {
        return f64::INFINITY;
    }

    if p < P_LOW {
        // Lower tail.
        let q = (-2.0 * p.ln()).sqrt();
        (((((C[0] * q + C[1]) * q + C[2]) * q + C[3]) * q + C[4]) * q + C[5])
            / ((((D[0] * q + D[1]) * q + D[2]) * q + D[3]) * q + 1.0)
    } else if p > 1.0 - P_LOW {
        // Upper tail, by symmetry.
        let q = (-2.0 * (1.0 - p).ln()).sqrt();
        -((((((C[0] * q + C[1]) * q + C[2]) * q + C[3]) * q + C[4]) * q + C[5])
            / ((((D[0] * q + D[1]) * q + D[2]) * q + D[3]) * q + 1.0))
    } else {
        // Central region.
        let q = p - 0.5;
        let r = q * q;
        (((((A[0] * r + A[1]) * r + A[2]) * r + A[3]) * r + A[4]) * r + A[5]) * q
            / (((((B[0] * r + B[1]) * r + B[2]) * r + B[3]) * r + B[4]) * r + 1.0)
    }
}
