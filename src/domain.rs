//! Domain model for single-leg transport selection.
//!
//! # Overview
//!
//! - [`TransportOption`]: a carrier with capacity, cost, speed and quality
//! - [`RouteRequest`]: one shipment leg between two coordinates
//! - [`Priority`] / [`Weights`]: the five fixed objective profiles
//! - [`CandidateMetrics`]: per-carrier figures derived for one request
//! - [`OptimizationResult`]: the selection plus full comparison table
//!
//! Every value here is request-scoped. Nothing is cached between calls.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::constraints::ConstraintReport;
use crate::error::RoutingError;
use crate::geometry::Coordinate;

/// Reporting currency for transport costs.
pub const CURRENCY: &str = "INR";

fn default_route_multiplier() -> f64 {
    1.0
}

/// A transport carrier that can be selected for a shipment leg.
///
/// `route_multiplier` scales the straight-line distance to model the
/// carrier's actual road route between the same two points.
///
/// # Examples
///
/// ```
/// use perishable_routing::domain::TransportOption;
///
/// let reefer = TransportOption::new(1, "ColdChain Express", "Refrigerated Truck")
///     .with_cold_chain(true)
///     .with_capacity(2000)
///     .with_cost_per_km(15.0)
///     .with_speed_kmph(50.0)
///     .with_quality(0.95)
///     .with_route_multiplier(0.95);
///
/// assert!(reefer.cold_chain);
/// assert_eq!(reefer.capacity, 2000);
/// assert_eq!(TransportOption::new(2, "Van", "Van").route_multiplier, 1.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TransportOption {
    pub id: u32,
    pub name: String,
    /// Vehicle descriptor, e.g. "Refrigerated Truck".
    pub vehicle: String,
    /// Whether the vehicle keeps goods refrigerated end to end.
    pub cold_chain: bool,
    /// Maximum units per shipment.
    pub capacity: u32,
    pub cost_per_km: f64,
    pub speed_kmph: f64,
    /// Service quality in `[0, 1]`.
    pub quality: f64,
    #[serde(default = "default_route_multiplier")]
    pub route_multiplier: f64,
}

impl TransportOption {
    /// Creates an option with zero capacity, cost and speed; fill in with the builder methods.
    pub fn new(id: u32, name: impl Into<String>, vehicle: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            vehicle: vehicle.into(),
            cold_chain: false,
            capacity: 0,
            cost_per_km: 0.0,
            speed_kmph: 0.0,
            quality: 0.0,
            route_multiplier: default_route_multiplier(),
        }
    }

    pub fn with_cold_chain(mut self, cold_chain: bool) -> Self {
        self.cold_chain = cold_chain;
        self
    }

    pub fn with_capacity(mut self, capacity: u32) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn with_cost_per_km(mut self, cost_per_km: f64) -> Self {
        self.cost_per_km = cost_per_km;
        self
    }

    pub fn with_speed_kmph(mut self, speed_kmph: f64) -> Self {
        self.speed_kmph = speed_kmph;
        self
    }

    pub fn with_quality(mut self, quality: f64) -> Self {
        self.quality = quality;
        self
    }

    pub fn with_route_multiplier(mut self, route_multiplier: f64) -> Self {
        self.route_multiplier = route_multiplier;
        self
    }

    /// Checks the attributes the metric formulas divide by or scale with.
    pub fn validate(&self) -> Result<(), RoutingError> {
        let invalid = |reason: &str| RoutingError::InvalidCandidate {
            id: self.id,
            reason: reason.to_string(),
        };
        if !(self.speed_kmph > 0.0) {
            return Err(invalid("speed must be positive"));
        }
        if !(self.route_multiplier > 0.0) {
            return Err(invalid("route multiplier must be positive"));
        }
        if !(self.cost_per_km >= 0.0) {
            return Err(invalid("cost per km must not be negative"));
        }
        if !(0.0..=1.0).contains(&self.quality) {
            return Err(invalid("quality must lie in [0, 1]"));
        }
        Ok(())
    }
}

/// Objective weights for cost, time and quality. Always sum to 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Weights {
    pub cost: f64,
    pub time: f64,
    pub quality: f64,
}

/// Named business priority selecting one of the fixed weight profiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    #[default]
    Balanced,
    Cost,
    Time,
    Quality,
    Freshness,
}

impl Priority {
    pub const ALL: [Priority; 5] = [
        Priority::Balanced,
        Priority::Cost,
        Priority::Time,
        Priority::Quality,
        Priority::Freshness,
    ];

    /// Resolves a profile name, falling back to [`Priority::Balanced`].
    ///
    /// ```
    /// use perishable_routing::domain::Priority;
    ///
    /// assert_eq!(Priority::from_name("time"), Priority::Time);
    /// assert_eq!(Priority::from_name("cheapest"), Priority::Balanced);
    /// ```
    pub fn from_name(name: &str) -> Self {
        match name {
            "balanced" => Priority::Balanced,
            "cost" => Priority::Cost,
            "time" => Priority::Time,
            "quality" => Priority::Quality,
            "freshness" => Priority::Freshness,
            _ => Priority::Balanced,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Balanced => "balanced",
            Priority::Cost => "cost",
            Priority::Time => "time",
            Priority::Quality => "quality",
            Priority::Freshness => "freshness",
        }
    }

    /// The weight profile for this priority.
    pub fn weights(self) -> Weights {
        let (cost, time, quality) = match self {
            Priority::Balanced => (0.40, 0.30, 0.30),
            Priority::Cost => (0.70, 0.20, 0.10),
            Priority::Time => (0.20, 0.70, 0.10),
            Priority::Quality => (0.20, 0.10, 0.70),
            Priority::Freshness => (0.15, 0.15, 0.70),
        };
        Weights { cost, time, quality }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single shipment leg to be assigned a carrier.
///
/// # Examples
///
/// ```
/// use perishable_routing::domain::{Priority, RouteRequest};
/// use perishable_routing::geometry::Coordinate;
///
/// let request = RouteRequest::new(
///     Coordinate::new(18.5204, 73.8567),
///     Coordinate::new(19.0760, 72.8777),
///     500,
///     72.0,
/// )
/// .with_priority(Priority::Freshness)
/// .with_cold_chain_required(true);
///
/// assert!(request.validate().is_ok());
/// assert!(RouteRequest::new(request.source, request.destination, 0, 72.0).validate().is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteRequest {
    pub source: Coordinate,
    pub destination: Coordinate,
    /// Units to ship. Must be positive.
    pub quantity: u32,
    /// Hours the goods stay sellable. Must be positive.
    pub freshness_life_hours: f64,
    pub priority: Priority,
    pub require_cold_chain: bool,
}

impl RouteRequest {
    /// Creates a balanced-priority request without a cold-chain requirement.
    pub fn new(source: Coordinate, destination: Coordinate, quantity: u32, freshness_life_hours: f64) -> Self {
        Self {
            source,
            destination,
            quantity,
            freshness_life_hours,
            priority: Priority::Balanced,
            require_cold_chain: false,
        }
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_cold_chain_required(mut self, required: bool) -> Self {
        self.require_cold_chain = required;
        self
    }

    pub fn validate(&self) -> Result<(), RoutingError> {
        if self.quantity == 0 {
            return Err(RoutingError::InvalidQuantity(0));
        }
        if !(self.freshness_life_hours > 0.0) {
            return Err(RoutingError::InvalidFreshnessLife(self.freshness_life_hours));
        }
        Ok(())
    }
}

/// Figures derived for one carrier on one request.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct CandidateMetrics {
    pub option_id: u32,
    pub name: String,
    /// Route distance after the carrier's multiplier.
    pub distance_km: f64,
    pub transit_hours: f64,
    pub transport_cost: f64,
    /// Expected freshness on arrival, percent.
    pub arrival_freshness: f64,
    /// Risk score in `[0, 100]`.
    pub risk: f64,
    pub capacity: u32,
    pub cold_chain: bool,
    pub quality: f64,
}

/// Outcome tag of an optimization call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum OptimizationStatus {
    /// A carrier was selected.
    Optimal,
    /// No carrier satisfies every hard constraint.
    Infeasible,
}

impl OptimizationStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            OptimizationStatus::Optimal => "Optimal",
            OptimizationStatus::Infeasible => "Infeasible",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct CostBreakdown {
    pub transport_cost: f64,
    pub cost_per_km: f64,
    pub currency: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct TimeBreakdown {
    pub transit_time_hours: f64,
    pub estimated_speed_kmph: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct QualityMetrics {
    pub transporter_quality: f64,
    pub expected_freshness_on_arrival: f64,
    pub risk_level: f64,
}

/// The chosen carrier with everything reported about it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Selection {
    pub option: TransportOption,
    /// Unrounded metrics of the chosen carrier.
    pub metrics: CandidateMetrics,
    pub cost_breakdown: CostBreakdown,
    pub time_breakdown: TimeBreakdown,
    pub quality_metrics: QualityMetrics,
    pub constraints_satisfied: ConstraintReport,
}

/// One row of the comparison table. Numeric fields are rounded.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ComparisonEntry {
    pub transporter_id: u32,
    pub name: String,
    pub cost: f64,
    pub time_hours: f64,
    pub freshness: f64,
    pub risk: f64,
    pub feasible: bool,
    /// Human-readable hard-constraint violations, empty when feasible.
    pub violations: Vec<String>,
    pub selected: bool,
}

/// Output of [`optimize`](crate::solver::optimize).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptimizationResult {
    pub status: OptimizationStatus,
    /// Explanation when no carrier was selected.
    pub message: Option<String>,
    pub timestamp: DateTime<Local>,
    /// Present exactly when `status` is [`OptimizationStatus::Optimal`].
    pub selection: Option<Selection>,
    pub priority: Priority,
    pub weights: Weights,
    /// Every candidate in declaration order, feasible or not.
    pub comparison: Vec<ComparisonEntry>,
}

impl OptimizationResult {
    pub fn is_optimal(&self) -> bool {
        self.status == OptimizationStatus::Optimal
    }

    pub fn selected_option(&self) -> Option<&TransportOption> {
        self.selection.as_ref().map(|s| &s.option)
    }
}

/// Rounds to a fixed number of decimal places for reporting.
///
/// ```
/// use perishable_routing::domain::round_to;
///
/// assert_eq!(round_to(123.456, 2), 123.46);
/// assert_eq!(round_to(87.04, 1), 87.0);
/// ```
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profiles_sum_to_one() {
        for p in Priority::ALL {
            let w = p.weights();
            assert!((w.cost + w.time + w.quality - 1.0).abs() < 1e-12, "{p}");
            assert!(w.cost >= 0.0 && w.time >= 0.0 && w.quality >= 0.0);
        }
    }

    #[test]
    fn test_priority_names_round_trip() {
        for p in Priority::ALL {
            assert_eq!(Priority::from_name(p.as_str()), p);
        }
        assert_eq!(Priority::from_name(""), Priority::Balanced);
        assert_eq!(Priority::from_name("COST"), Priority::Balanced);
    }

    #[test]
    fn test_option_validation() {
        let base = TransportOption::new(7, "T", "Van")
            .with_speed_kmph(40.0)
            .with_cost_per_km(5.0)
            .with_quality(0.5);
        assert!(base.validate().is_ok());
        assert!(base.clone().with_speed_kmph(0.0).validate().is_err());
        assert!(base.clone().with_route_multiplier(-1.0).validate().is_err());
        assert!(base.clone().with_quality(1.5).validate().is_err());
        assert!(base.with_cost_per_km(f64::NAN).validate().is_err());
    }

    #[test]
    fn test_request_validation() {
        let p = Coordinate::new(0.0, 0.0);
        assert!(RouteRequest::new(p, p, 1, 1.0).validate().is_ok());
        assert!(matches!(
            RouteRequest::new(p, p, 0, 1.0).validate(),
            Err(RoutingError::InvalidQuantity(0))
        ));
        assert!(matches!(
            RouteRequest::new(p, p, 10, 0.0).validate(),
            Err(RoutingError::InvalidFreshnessLife(_))
        ));
        assert!(RouteRequest::new(p, p, 10, f64::NAN).validate().is_err());
    }

    #[test]
    fn test_transport_option_deserialize_default_multiplier() {
        let json = r#"{
            "id": 4, "name": "Night Reefer", "vehicle": "Reefer",
            "cold_chain": true, "capacity": 800, "cost_per_km": 11.0,
            "speed_kmph": 45.0, "quality": 0.9
        }"#;
        let option: TransportOption = serde_json::from_str(json).unwrap();
        assert_eq!(option.route_multiplier, 1.0);
        assert!(option.cold_chain);
    }
}
