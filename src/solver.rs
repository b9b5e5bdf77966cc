//! Carrier selection for a single shipment leg.
//!
//! Evaluates every candidate against the request, filters out carriers that
//! break a hard constraint, and picks the feasible carrier with the lowest
//! weighted objective:
//!
//! ```text
//! w_cost * cost / max_cost + w_time * time / max_time + w_quality * (1 - quality)
//! ```
//!
//! Cost and time are normalized over the full candidate set, so infeasible
//! carriers still shape the scale. Ties go to the earliest candidate.

use chrono::Local;
use tracing::{debug, info};

use crate::constraints::{violations, ConstraintReport, ConstraintViolation};
use crate::domain::{
    round_to, CandidateMetrics, ComparisonEntry, CostBreakdown, OptimizationResult,
    OptimizationStatus, QualityMetrics, RouteRequest, Selection, TimeBreakdown, TransportOption,
    Weights, CURRENCY,
};
use crate::error::RoutingError;
use crate::geometry::distance_km;
use crate::scoring::{freshness, risk};

/// Freshness of goods at dispatch, percent.
const INITIAL_FRESHNESS: f64 = 100.0;

/// Message attached to an infeasible result.
pub const INFEASIBLE_MESSAGE: &str = "No feasible solution found";

/// Derives distance, time, cost, freshness and risk for one carrier.
///
/// # Examples
///
/// ```
/// use perishable_routing::domain::{RouteRequest, TransportOption};
/// use perishable_routing::geometry::Coordinate;
/// use perishable_routing::solver::evaluate_candidate;
///
/// let request = RouteRequest::new(Coordinate::new(0.0, 0.0), Coordinate::new(0.0, 1.0), 10, 48.0);
/// let truck = TransportOption::new(1, "Truck", "Truck")
///     .with_speed_kmph(50.0)
///     .with_cost_per_km(10.0)
///     .with_route_multiplier(1.1);
///
/// let m = evaluate_candidate(&request, &truck);
/// assert!((m.distance_km - 111.19 * 1.1).abs() < 0.1);
/// assert!((m.transit_hours - m.distance_km / 50.0).abs() < 1e-12);
/// assert!((m.transport_cost - m.distance_km * 10.0).abs() < 1e-9);
/// ```
pub fn evaluate_candidate(request: &RouteRequest, option: &TransportOption) -> CandidateMetrics {
    let distance = distance_km(request.source, request.destination) * option.route_multiplier;
    let transit_hours = distance / option.speed_kmph;
    let transport_cost = distance * option.cost_per_km;
    let arrival_freshness = freshness(INITIAL_FRESHNESS, transit_hours, option.cold_chain);
    let risk = risk(
        distance,
        option.cold_chain,
        request.freshness_life_hours,
        transit_hours,
    );

    CandidateMetrics {
        option_id: option.id,
        name: option.name.clone(),
        distance_km: distance,
        transit_hours,
        transport_cost,
        arrival_freshness,
        risk,
        capacity: option.capacity,
        cold_chain: option.cold_chain,
        quality: option.quality,
    }
}

/// Weighted objective of one candidate. Lower is better.
///
/// A zero maximum (source equals destination) contributes nothing instead of
/// dividing by zero.
pub fn objective(metrics: &CandidateMetrics, weights: &Weights, max_cost: f64, max_time: f64) -> f64 {
    let normalized = |value: f64, max: f64| if max > 0.0 { value / max } else { 0.0 };
    weights.cost * normalized(metrics.transport_cost, max_cost)
        + weights.time * normalized(metrics.transit_hours, max_time)
        + weights.quality * (1.0 - metrics.quality)
}

/// One candidate's evaluation during a single optimization call.
struct Evaluated<'a> {
    option: &'a TransportOption,
    metrics: CandidateMetrics,
    violations: Vec<ConstraintViolation>,
    objective: f64,
}

impl Evaluated<'_> {
    fn is_feasible(&self) -> bool {
        self.violations.is_empty()
    }
}

/// Index of the feasible candidate with the lowest objective.
///
/// Scans in declaration order and only replaces the incumbent on a strictly
/// lower value, so the first minimum wins.
fn select(evaluated: &[Evaluated<'_>]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (idx, candidate) in evaluated.iter().enumerate() {
        if !candidate.is_feasible() {
            continue;
        }
        match best {
            Some((_, best_value)) if candidate.objective >= best_value => {}
            _ => best = Some((idx, candidate.objective)),
        }
    }
    best.map(|(idx, _)| idx)
}

/// Selects a carrier for `request` from `candidates`.
///
/// Returns `Err` only for invalid input. A request no carrier can serve comes
/// back as `Ok` with [`OptimizationStatus::Infeasible`].
///
/// # Examples
///
/// ```
/// use perishable_routing::demo_data::reference_catalog;
/// use perishable_routing::domain::{OptimizationStatus, RouteRequest};
/// use perishable_routing::geometry::Coordinate;
/// use perishable_routing::solver::optimize;
///
/// let catalog = reference_catalog();
/// let request = RouteRequest::new(
///     Coordinate::new(18.5204, 73.8567),
///     Coordinate::new(19.0596, 72.8295),
///     500,
///     72.0,
/// )
/// .with_cold_chain_required(true);
///
/// let result = optimize(&request, &catalog.transporters).unwrap();
/// assert_eq!(result.status, OptimizationStatus::Optimal);
/// assert!(result.selected_option().unwrap().cold_chain);
/// assert_eq!(result.comparison.len(), 3);
///
/// // Nobody can carry 10,000 units
/// let too_big = RouteRequest { quantity: 10_000, ..request };
/// let result = optimize(&too_big, &catalog.transporters).unwrap();
/// assert_eq!(result.status, OptimizationStatus::Infeasible);
/// assert!(result.selection.is_none());
/// ```
pub fn optimize(
    request: &RouteRequest,
    candidates: &[TransportOption],
) -> Result<OptimizationResult, RoutingError> {
    RouteOptimizer::new(candidates)?.optimize(request)
}

/// Optimizer bound to a validated candidate set.
///
/// Holds no state beyond the borrowed candidates; the same optimizer can
/// serve any number of requests, from any thread.
#[derive(Debug, Clone, Copy)]
pub struct RouteOptimizer<'a> {
    candidates: &'a [TransportOption],
}

impl<'a> RouteOptimizer<'a> {
    /// Validates the candidate set.
    pub fn new(candidates: &'a [TransportOption]) -> Result<Self, RoutingError> {
        if candidates.is_empty() {
            return Err(RoutingError::NoCandidates);
        }
        for option in candidates {
            option.validate()?;
        }
        Ok(Self { candidates })
    }

    /// Runs one optimization. See [`optimize`].
    pub fn optimize(&self, request: &RouteRequest) -> Result<OptimizationResult, RoutingError> {
        request.validate()?;

        let weights = request.priority.weights();

        let mut evaluated: Vec<Evaluated<'a>> = self
            .candidates
            .iter()
            .map(|option| {
                let metrics = evaluate_candidate(request, option);
                let violations = violations(request, option, &metrics);
                Evaluated {
                    option,
                    metrics,
                    violations,
                    objective: 0.0,
                }
            })
            .collect();

        let max_cost = evaluated
            .iter()
            .map(|e| e.metrics.transport_cost)
            .fold(0.0_f64, f64::max);
        let max_time = evaluated
            .iter()
            .map(|e| e.metrics.transit_hours)
            .fold(0.0_f64, f64::max);

        for e in &mut evaluated {
            e.objective = objective(&e.metrics, &weights, max_cost, max_time);
            debug!(
                option_id = e.option.id,
                distance_km = e.metrics.distance_km,
                transit_hours = e.metrics.transit_hours,
                cost = e.metrics.transport_cost,
                freshness = e.metrics.arrival_freshness,
                risk = e.metrics.risk,
                objective = e.objective,
                feasible = e.is_feasible(),
                "Evaluated candidate"
            );
        }

        let selected = select(&evaluated);
        let comparison = comparison_table(&evaluated, selected);
        let timestamp = Local::now();

        let Some(idx) = selected else {
            info!(
                candidates = evaluated.len(),
                priority = %request.priority,
                quantity = request.quantity,
                "No feasible carrier"
            );
            return Ok(OptimizationResult {
                status: OptimizationStatus::Infeasible,
                message: Some(INFEASIBLE_MESSAGE.to_string()),
                timestamp,
                selection: None,
                priority: request.priority,
                weights,
                comparison,
            });
        };

        let chosen = &evaluated[idx];
        info!(
            selected = chosen.option.id,
            name = %chosen.option.name,
            objective = chosen.objective,
            candidates = evaluated.len(),
            priority = %request.priority,
            "Carrier selected"
        );

        Ok(OptimizationResult {
            status: OptimizationStatus::Optimal,
            message: None,
            timestamp,
            selection: Some(build_selection(request, chosen)),
            priority: request.priority,
            weights,
            comparison,
        })
    }
}

fn build_selection(request: &RouteRequest, chosen: &Evaluated<'_>) -> Selection {
    let option = chosen.option;
    let metrics = &chosen.metrics;

    Selection {
        option: option.clone(),
        metrics: metrics.clone(),
        cost_breakdown: CostBreakdown {
            transport_cost: round_to(metrics.transport_cost, 2),
            cost_per_km: option.cost_per_km,
            currency: CURRENCY.to_string(),
        },
        time_breakdown: TimeBreakdown {
            transit_time_hours: round_to(metrics.transit_hours, 2),
            estimated_speed_kmph: option.speed_kmph,
        },
        quality_metrics: QualityMetrics {
            transporter_quality: option.quality,
            expected_freshness_on_arrival: round_to(metrics.arrival_freshness, 1),
            risk_level: round_to(metrics.risk, 1),
        },
        constraints_satisfied: ConstraintReport::evaluate(request, option, metrics),
    }
}

fn comparison_table(evaluated: &[Evaluated<'_>], selected: Option<usize>) -> Vec<ComparisonEntry> {
    evaluated
        .iter()
        .enumerate()
        .map(|(idx, e)| ComparisonEntry {
            transporter_id: e.option.id,
            name: e.metrics.name.clone(),
            cost: round_to(e.metrics.transport_cost, 2),
            time_hours: round_to(e.metrics.transit_hours, 2),
            freshness: round_to(e.metrics.arrival_freshness, 1),
            risk: round_to(e.metrics.risk, 1),
            feasible: e.is_feasible(),
            violations: e.violations.iter().map(ToString::to_string).collect(),
            selected: selected == Some(idx),
        })
        .collect()
}
