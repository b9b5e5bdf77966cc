//! Freshness-decay and risk-scoring models.
//!
//! Both models are pure functions of their scalar inputs and are used by the
//! optimizer for every candidate as well as exposed directly over the API.
//!
//! # Freshness
//!
//! `F(t) = F0 * exp(-λ t)` with a base decay of 1.5% per hour. An active cold
//! chain cuts the decay rate by 70%.
//!
//! # Risk
//!
//! Three capped sub-scores summed into `[0, 100]`:
//!
//! - **Distance** (0-40): linear up to 500 km
//! - **Cold chain** (0 or 30): flat penalty without refrigeration
//! - **Freshness** (0-30): shrinks as the remaining-life fraction grows

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Base freshness decay, percent per hour.
pub const BASE_DECAY_PERCENT_PER_HOUR: f64 = 1.5;

/// Fraction of the base decay rate that remains under cold chain.
pub const COLD_CHAIN_DECAY_FACTOR: f64 = 0.3;

/// Distance at which distance risk saturates.
const DISTANCE_RISK_SATURATION_KM: f64 = 500.0;
const MAX_DISTANCE_RISK: f64 = 40.0;
const COLD_CHAIN_RISK: f64 = 30.0;
const MAX_FRESHNESS_RISK: f64 = 30.0;
const MAX_RISK: f64 = 100.0;

/// Hourly decay percentage for the given cold-chain state.
///
/// ```
/// use perishable_routing::scoring::decay_percent_per_hour;
///
/// assert_eq!(decay_percent_per_hour(false), 1.5);
/// assert!((decay_percent_per_hour(true) - 0.45).abs() < 1e-12);
/// ```
pub fn decay_percent_per_hour(cold_chain: bool) -> f64 {
    if cold_chain {
        BASE_DECAY_PERCENT_PER_HOUR * COLD_CHAIN_DECAY_FACTOR
    } else {
        BASE_DECAY_PERCENT_PER_HOUR
    }
}

/// Expected freshness after `hours` in transit, clamped to `[0, 100]`.
///
/// Negative `hours` are not rejected; they raise freshness above `initial`
/// before the clamp applies.
///
/// # Examples
///
/// ```
/// use perishable_routing::scoring::freshness;
///
/// assert_eq!(freshness(100.0, 0.0, false), 100.0);
///
/// // One day on a plain van loses about 30%
/// let plain = freshness(100.0, 24.0, false);
/// assert!((plain - 69.77).abs() < 0.01);
///
/// // The same day refrigerated loses about 10%
/// let cold = freshness(100.0, 24.0, true);
/// assert!(cold > plain);
/// ```
pub fn freshness(initial: f64, hours: f64, cold_chain: bool) -> f64 {
    let rate = decay_percent_per_hour(cold_chain) / 100.0;
    (initial * (-rate * hours).exp()).clamp(0.0, 100.0)
}

/// Risk level for a shipment leg in `[0, 100]`.
///
/// # Examples
///
/// ```
/// use perishable_routing::scoring::risk;
///
/// // 250 km, refrigerated, 72h life, 5h in transit
/// let r = risk(250.0, true, 72.0, 5.0);
/// assert!((r - (20.0 + 0.0 + 30.0 * 5.0 / 72.0)).abs() < 1e-9);
///
/// // Transit longer than the shelf life maxes out freshness risk
/// assert_eq!(risk(1000.0, false, 10.0, 12.0), 100.0);
/// ```
pub fn risk(distance_km: f64, cold_chain: bool, freshness_life_hours: f64, transit_hours: f64) -> f64 {
    let total = distance_risk(distance_km)
        + cold_chain_risk(cold_chain)
        + freshness_risk(freshness_life_hours, transit_hours);
    total.min(MAX_RISK)
}

fn distance_risk(distance_km: f64) -> f64 {
    (distance_km / DISTANCE_RISK_SATURATION_KM * MAX_DISTANCE_RISK).min(MAX_DISTANCE_RISK)
}

fn cold_chain_risk(cold_chain: bool) -> f64 {
    if cold_chain {
        0.0
    } else {
        COLD_CHAIN_RISK
    }
}

fn freshness_risk(freshness_life_hours: f64, transit_hours: f64) -> f64 {
    let remaining = freshness_life_hours - transit_hours;
    if remaining <= 0.0 {
        return MAX_FRESHNESS_RISK;
    }
    (MAX_FRESHNESS_RISK - remaining / freshness_life_hours * MAX_FRESHNESS_RISK).max(0.0)
}

/// Coarse risk band used in API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum RiskCategory {
    Low,
    Medium,
    High,
}

impl RiskCategory {
    /// Bands a risk score: below 30 is low, below 60 medium, otherwise high.
    ///
    /// ```
    /// use perishable_routing::scoring::RiskCategory;
    ///
    /// assert_eq!(RiskCategory::from_score(12.0), RiskCategory::Low);
    /// assert_eq!(RiskCategory::from_score(30.0), RiskCategory::Medium);
    /// assert_eq!(RiskCategory::from_score(60.0), RiskCategory::High);
    /// ```
    pub fn from_score(score: f64) -> Self {
        if score < 30.0 {
            RiskCategory::Low
        } else if score < 60.0 {
            RiskCategory::Medium
        } else {
            RiskCategory::High
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RiskCategory::Low => "Low",
            RiskCategory::Medium => "Medium",
            RiskCategory::High => "High",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOURS: [f64; 8] = [0.0, 0.5, 1.0, 6.0, 24.0, 72.0, 500.0, 10_000.0];

    #[test]
    fn test_freshness_identity_at_zero_hours() {
        for f0 in [0.0, 12.5, 50.0, 99.9, 100.0] {
            assert_eq!(freshness(f0, 0.0, true), f0);
            assert_eq!(freshness(f0, 0.0, false), f0);
        }
    }

    #[test]
    fn test_cold_chain_never_decays_faster() {
        for h in HOURS {
            assert!(freshness(100.0, h, true) >= freshness(100.0, h, false));
        }
    }

    #[test]
    fn test_freshness_monotonic_in_hours() {
        for cold in [true, false] {
            let mut prev = freshness(100.0, 0.0, cold);
            for h in HOURS.iter().skip(1) {
                let f = freshness(100.0, *h, cold);
                assert!(f <= prev, "freshness rose at {h}h");
                prev = f;
            }
        }
    }

    #[test]
    fn test_freshness_clamped() {
        assert_eq!(freshness(150.0, 0.0, false), 100.0);
        assert_eq!(freshness(-5.0, 1.0, false), 0.0);
        // Negative hours inflate before the clamp
        assert_eq!(freshness(95.0, -100.0, false), 100.0);
        assert!(freshness(50.0, -1.0, false) > 50.0);
    }

    #[test]
    fn test_risk_components() {
        // Zero distance, refrigerated, nothing consumed
        assert_eq!(risk(0.0, true, 72.0, 0.0), 0.0);
        // Distance caps at 40
        assert_eq!(risk(5000.0, true, 72.0, 0.0), 40.0);
        // Missing cold chain adds a flat 30
        assert_eq!(risk(0.0, false, 72.0, 0.0), 30.0);
        // Half the life consumed gives half the freshness risk
        assert!((risk(0.0, true, 72.0, 36.0) - 15.0).abs() < 1e-9);
        // Exhausted life gives the full 30
        assert_eq!(risk(0.0, true, 72.0, 72.0), 30.0);
    }

    #[test]
    fn test_risk_monotonic_in_distance() {
        let mut prev = risk(0.0, false, 48.0, 10.0);
        for d in [10.0, 100.0, 250.0, 499.0, 500.0, 501.0, 2000.0] {
            let r = risk(d, false, 48.0, 10.0);
            assert!(r >= prev);
            prev = r;
        }
    }

    #[test]
    fn test_risk_non_increasing_in_remaining_life() {
        // Shrinking transit grows remaining life
        let mut prev = risk(120.0, true, 48.0, 60.0);
        for transit in [48.0, 40.0, 24.0, 12.0, 1.0, 0.0] {
            let r = risk(120.0, true, 48.0, transit);
            assert!(r <= prev);
            prev = r;
        }
    }

    #[test]
    fn test_risk_bounds() {
        for d in [0.0, 50.0, 800.0] {
            for cold in [true, false] {
                for transit in [-5.0, 0.0, 30.0, 100.0] {
                    let r = risk(d, cold, 48.0, transit);
                    assert!((0.0..=100.0).contains(&r), "risk {r} out of range");
                }
            }
        }
    }

    #[test]
    fn test_risk_category_bands() {
        assert_eq!(RiskCategory::from_score(0.0).as_str(), "Low");
        assert_eq!(RiskCategory::from_score(59.99).as_str(), "Medium");
        assert_eq!(RiskCategory::from_score(100.0).as_str(), "High");
    }
}
