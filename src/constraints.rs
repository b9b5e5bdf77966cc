//! Hard constraints for carrier selection.
//!
//! # Constraints
//!
//! - **Capacity** (hard): carrier capacity must cover the requested quantity
//! - **Cold chain** (hard): a refrigerated request needs a refrigerated carrier
//! - **Freshness buffer** (hard): transit must finish within 70% of the
//!   freshness life, keeping a 30% margin before expiry
//!
//! The same predicates drive the feasibility filter and the
//! [`ConstraintReport`] attached to a selection.

use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{CandidateMetrics, RouteRequest, TransportOption};

/// Share of the freshness life that transit may consume.
pub const FRESHNESS_SAFETY_FACTOR: f64 = 0.7;

/// A violated hard constraint for one carrier.
#[derive(Debug, Clone, PartialEq)]
pub enum ConstraintViolation {
    Capacity { capacity: u32, quantity: u32 },
    ColdChain,
    FreshnessBuffer { transit_hours: f64, limit_hours: f64 },
}

impl std::fmt::Display for ConstraintViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConstraintViolation::Capacity { capacity, quantity } => {
                write!(f, "capacity {} is below quantity {}", capacity, quantity)
            }
            ConstraintViolation::ColdChain => f.write_str("cold chain required but not provided"),
            ConstraintViolation::FreshnessBuffer {
                transit_hours,
                limit_hours,
            } => write!(
                f,
                "transit {:.2}h exceeds freshness buffer limit {:.2}h",
                transit_hours, limit_hours
            ),
        }
    }
}

/// Longest allowed transit for a given freshness life.
pub fn freshness_limit_hours(freshness_life_hours: f64) -> f64 {
    freshness_life_hours * FRESHNESS_SAFETY_FACTOR
}

/// Lists every hard constraint the carrier violates for this request.
///
/// An empty list means the carrier is feasible.
///
/// # Examples
///
/// ```
/// use perishable_routing::constraints::{violations, ConstraintViolation};
/// use perishable_routing::domain::{RouteRequest, TransportOption};
/// use perishable_routing::geometry::Coordinate;
/// use perishable_routing::solver::evaluate_candidate;
///
/// let van = TransportOption::new(2, "FastFlora Logistics", "Van")
///     .with_capacity(1000)
///     .with_cost_per_km(8.0)
///     .with_speed_kmph(60.0)
///     .with_quality(0.8);
/// let request = RouteRequest::new(
///     Coordinate::new(18.5204, 73.8567),
///     Coordinate::new(19.0760, 72.8777),
///     1500,
///     72.0,
/// )
/// .with_cold_chain_required(true);
///
/// let metrics = evaluate_candidate(&request, &van);
/// let found = violations(&request, &van, &metrics);
/// assert_eq!(found.len(), 2);
/// assert!(found.contains(&ConstraintViolation::ColdChain));
/// ```
pub fn violations(
    request: &RouteRequest,
    option: &TransportOption,
    metrics: &CandidateMetrics,
) -> Vec<ConstraintViolation> {
    let mut found = Vec::new();

    if option.capacity < request.quantity {
        found.push(ConstraintViolation::Capacity {
            capacity: option.capacity,
            quantity: request.quantity,
        });
    }

    if request.require_cold_chain && !option.cold_chain {
        found.push(ConstraintViolation::ColdChain);
    }

    let limit_hours = freshness_limit_hours(request.freshness_life_hours);
    if metrics.transit_hours > limit_hours {
        found.push(ConstraintViolation::FreshnessBuffer {
            transit_hours: metrics.transit_hours,
            limit_hours,
        });
    }

    found
}

/// Constraint status of the selected carrier, reported alongside the result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct ConstraintReport {
    pub cold_chain_required: bool,
    pub cold_chain_provided: bool,
    pub capacity_sufficient: bool,
    pub freshness_preserved: bool,
}

impl ConstraintReport {
    /// Recomputes each constraint for the given carrier.
    pub fn evaluate(request: &RouteRequest, option: &TransportOption, metrics: &CandidateMetrics) -> Self {
        Self {
            cold_chain_required: request.require_cold_chain,
            cold_chain_provided: option.cold_chain,
            capacity_sufficient: option.capacity >= request.quantity,
            freshness_preserved: metrics.transit_hours
                <= freshness_limit_hours(request.freshness_life_hours),
        }
    }

    /// True when every hard constraint holds.
    pub fn all_satisfied(&self) -> bool {
        self.capacity_sufficient
            && self.freshness_preserved
            && (!self.cold_chain_required || self.cold_chain_provided)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Coordinate;
    use crate::solver::evaluate_candidate;

    fn request(quantity: u32, life: f64, cold: bool) -> RouteRequest {
        RouteRequest::new(Coordinate::new(0.0, 0.0), Coordinate::new(0.0, 1.0), quantity, life)
            .with_cold_chain_required(cold)
    }

    fn truck(capacity: u32, speed: f64, cold: bool) -> TransportOption {
        TransportOption::new(1, "Truck", "Truck")
            .with_capacity(capacity)
            .with_speed_kmph(speed)
            .with_cost_per_km(10.0)
            .with_quality(0.9)
            .with_cold_chain(cold)
    }

    #[test]
    fn test_feasible_candidate_has_no_violations() {
        let req = request(100, 48.0, true);
        let option = truck(100, 50.0, true);
        let metrics = evaluate_candidate(&req, &option);
        assert!(violations(&req, &option, &metrics).is_empty());
        assert!(ConstraintReport::evaluate(&req, &option, &metrics).all_satisfied());
    }

    #[test]
    fn test_capacity_boundary_is_inclusive() {
        let req = request(500, 48.0, false);
        let exact = truck(500, 50.0, false);
        let short = truck(499, 50.0, false);
        assert!(violations(&req, &exact, &evaluate_candidate(&req, &exact)).is_empty());
        assert_eq!(
            violations(&req, &short, &evaluate_candidate(&req, &short)),
            vec![ConstraintViolation::Capacity {
                capacity: 499,
                quantity: 500
            }]
        );
    }

    #[test]
    fn test_cold_chain_only_matters_when_required() {
        let option = truck(100, 50.0, false);
        let relaxed = request(10, 48.0, false);
        let strict = request(10, 48.0, true);
        assert!(violations(&relaxed, &option, &evaluate_candidate(&relaxed, &option)).is_empty());
        let report = ConstraintReport::evaluate(&strict, &option, &evaluate_candidate(&strict, &option));
        assert!(report.cold_chain_required);
        assert!(!report.cold_chain_provided);
        assert!(!report.all_satisfied());
    }

    #[test]
    fn test_freshness_buffer() {
        // ~111 km at 10 km/h is ~11.1h; 70% of 15h is 10.5h
        let req = request(10, 15.0, false);
        let slow = truck(100, 10.0, false);
        let metrics = evaluate_candidate(&req, &slow);
        let found = violations(&req, &slow, &metrics);
        assert_eq!(found.len(), 1);
        assert!(matches!(found[0], ConstraintViolation::FreshnessBuffer { .. }));
        assert!(!ConstraintReport::evaluate(&req, &slow, &metrics).freshness_preserved);

        // 20h life allows 14h
        let req = request(10, 20.0, false);
        assert!(violations(&req, &slow, &evaluate_candidate(&req, &slow)).is_empty());
    }

    #[test]
    fn test_violation_messages() {
        let msg = ConstraintViolation::Capacity {
            capacity: 1000,
            quantity: 1500,
        }
        .to_string();
        assert_eq!(msg, "capacity 1000 is below quantity 1500");
    }
}
