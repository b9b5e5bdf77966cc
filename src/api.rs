//! REST API for perishable shipment transport selection.
//!
//! Provides endpoints for:
//! - Carrier selection for one shipment, by catalog entity
//! - Freshness, risk and distance calculators
//! - Participant catalog listing
//! - Optimized vs. baseline simulation, plain and streamed
//! - Swagger UI at /q/swagger-ui

use axum::{
    body::Body,
    extract::{rejection::JsonRejection, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use futures::Stream;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, info_span, warn};
use utoipa::{OpenApi, ToSchema};
use utoipa_swagger_ui::SwaggerUi;
use uuid::Uuid;

use crate::catalog::{Catalog, CatalogStore, EntityRef};
use crate::config::SimulationDefaults;
use crate::console;
use crate::constraints::ConstraintReport;
use crate::demo_data::{demo_shipment, reference_catalog};
use crate::domain::{
    round_to, ComparisonEntry, CostBreakdown, OptimizationResult, OptimizationStatus, Priority,
    QualityMetrics, RouteRequest, TimeBreakdown, TransportOption, Weights,
};
use crate::error::RoutingError;
use crate::geometry::{distance_km, Coordinate};
use crate::scoring::{decay_percent_per_hour, freshness, risk, RiskCategory};
use crate::simulation::{simulate_with_progress, SimulationConfig, SimulationReport};
use crate::solver::optimize;

/// Application state shared across handlers.
pub struct AppState {
    pub catalog: CatalogStore,
    pub simulation: SimulationDefaults,
    /// Fired on shutdown; streamed simulations stop when it is.
    pub shutdown: CancellationToken,
}

impl AppState {
    pub fn new(catalog: Catalog, simulation: SimulationDefaults, shutdown: CancellationToken) -> Self {
        Self {
            catalog: CatalogStore::new(catalog),
            simulation,
            shutdown,
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(
            reference_catalog(),
            SimulationDefaults::default(),
            CancellationToken::new(),
        )
    }
}

/// Creates the API router with CORS and Swagger UI enabled.
pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health & Info
        .route("/health", get(health))
        .route("/info", get(info))
        // Selection
        .route("/optimize", post(optimize_shipment))
        .route("/optimize/demo", get(optimize_demo))
        .route("/entities", get(list_entities))
        // Calculators
        .route("/freshness/calculate", post(calculate_freshness))
        .route("/risk/calculate", post(calculate_risk))
        .route("/distance/calculate", post(calculate_distance))
        // Simulation
        .route("/simulate", post(run_simulation))
        .route("/simulate/stream", get(stream_simulation))
        // Swagger UI at /q/swagger-ui (Quarkus-style path)
        .merge(SwaggerUi::new("/q/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(ServiceBuilder::new().layer(cors))
        .with_state(state)
}

// ============================================================================
// Errors
// ============================================================================

/// Failure body shared by every endpoint.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub success: bool,
    /// "Invalid" for caller errors, "Error" otherwise.
    pub status: &'static str,
    pub message: String,
}

/// Error returned from handlers.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    kind: &'static str,
    message: String,
}

impl ApiError {
    fn invalid(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            kind: "Invalid",
            message: message.into(),
        }
    }

    fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            kind: "Error",
            message: message.into(),
        }
    }
}

impl From<RoutingError> for ApiError {
    fn from(err: RoutingError) -> Self {
        if err.is_invalid_input() {
            warn!(error = %err, "Rejected request");
            Self::invalid(err.to_string())
        } else {
            tracing::error!(error = %err, "Request failed");
            Self::internal(err.to_string())
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        warn!(error = %rejection.body_text(), "Malformed request body");
        Self::invalid(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            success: false,
            status: self.kind,
            message: self.message,
        };
        (self.status, Json(body)).into_response()
    }
}

// ============================================================================
// Health & Info
// ============================================================================

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// "healthy" while the service is up.
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
    /// RFC 3339 local time.
    pub timestamp: String,
}

/// GET /health - Health check endpoint.
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is healthy", body = HealthResponse))
)]
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
        timestamp: chrono::Local::now().to_rfc3339(),
    })
}

/// Application info response.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InfoResponse {
    pub name: &'static str,
    pub version: &'static str,
    pub optimizer_engine: &'static str,
    pub priorities: Vec<&'static str>,
}

/// GET /info - Application info endpoint.
#[utoipa::path(
    get,
    path = "/info",
    responses((status = 200, description = "Application info", body = InfoResponse))
)]
async fn info() -> Json<InfoResponse> {
    Json(InfoResponse {
        name: "Perishable Routing",
        version: env!("CARGO_PKG_VERSION"),
        optimizer_engine: "Weighted-sum selection",
        priorities: Priority::ALL.iter().map(|p| p.as_str()).collect(),
    })
}

// ============================================================================
// Optimization
// ============================================================================

/// Shipment between two catalog participants.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(default)]
pub struct OptimizeRequest {
    pub source_type: String,
    pub source_id: u32,
    pub destination_type: String,
    pub destination_id: u32,
    pub quantity: i64,
    pub freshness_life_hours: f64,
    /// Profile name; unknown names fall back to "balanced".
    pub priority: String,
    pub require_cold_chain: bool,
}

impl Default for OptimizeRequest {
    fn default() -> Self {
        Self {
            source_type: "harvester".into(),
            source_id: 1,
            destination_type: "distributor".into(),
            destination_id: 1,
            quantity: 1000,
            freshness_life_hours: 72.0,
            priority: Priority::Balanced.as_str().into(),
            require_cold_chain: false,
        }
    }
}

/// A request resolved against the catalog.
struct ResolvedShipment {
    source: EntityRef,
    destination: EntityRef,
    request: RouteRequest,
}

impl OptimizeRequest {
    fn resolve(&self, catalog: &Catalog) -> Result<ResolvedShipment, RoutingError> {
        let source = EntityRef::new(self.source_type.parse()?, self.source_id);
        let destination = EntityRef::new(self.destination_type.parse()?, self.destination_id);
        let request = catalog
            .route_request(source, destination, self.quantity, self.freshness_life_hours)?
            .with_priority(Priority::from_name(&self.priority))
            .with_cold_chain_required(self.require_cold_chain);
        Ok(ResolvedShipment {
            source,
            destination,
            request,
        })
    }
}

/// Endpoints of the shipped leg.
#[derive(Debug, Serialize, ToSchema)]
pub struct RouteEcho {
    pub source: EntityRef,
    pub destination: EntityRef,
    /// Route distance of the selected carrier.
    pub distance_km: f64,
}

/// Every candidate, feasible or not, in declaration order.
#[derive(Debug, Serialize, ToSchema)]
pub struct ComparisonTable {
    pub all_options: Vec<ComparisonEntry>,
}

/// Selection outcome on the wire.
///
/// Infeasible results carry only `success`, `status`, `message` and
/// `optimization_timestamp`.
#[derive(Debug, Serialize, ToSchema)]
pub struct OptimizeResponse {
    pub success: bool,
    pub status: OptimizationStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// RFC 3339 local time.
    pub optimization_timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub route: Option<RouteEcho>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_transporter: Option<TransportOption>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost_breakdown: Option<CostBreakdown>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_breakdown: Option<TimeBreakdown>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality_metrics: Option<QualityMetrics>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub constraints_satisfied: Option<ConstraintReport>,
    /// The profile actually applied after name resolution.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority_used: Option<Priority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weights_applied: Option<Weights>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comparison: Option<ComparisonTable>,
}

impl OptimizeResponse {
    fn from_result(result: OptimizationResult, source: EntityRef, destination: EntityRef) -> Self {
        let optimization_timestamp = result.timestamp.to_rfc3339();
        let Some(selection) = result.selection else {
            return Self {
                success: false,
                status: result.status,
                message: result.message,
                optimization_timestamp,
                route: None,
                selected_transporter: None,
                cost_breakdown: None,
                time_breakdown: None,
                quality_metrics: None,
                constraints_satisfied: None,
                priority_used: None,
                weights_applied: None,
                comparison: None,
            };
        };

        Self {
            success: true,
            status: result.status,
            message: result.message,
            optimization_timestamp,
            route: Some(RouteEcho {
                source,
                destination,
                distance_km: round_to(selection.metrics.distance_km, 2),
            }),
            selected_transporter: Some(selection.option),
            cost_breakdown: Some(selection.cost_breakdown),
            time_breakdown: Some(selection.time_breakdown),
            quality_metrics: Some(selection.quality_metrics),
            constraints_satisfied: Some(selection.constraints_satisfied),
            priority_used: Some(result.priority),
            weights_applied: Some(result.weights),
            comparison: Some(ComparisonTable {
                all_options: result.comparison,
            }),
        }
    }
}

fn run_optimization(state: &AppState, payload: &OptimizeRequest) -> Result<OptimizeResponse, ApiError> {
    let request_id = Uuid::new_v4();
    info_span!("optimize", %request_id).in_scope(|| -> Result<OptimizeResponse, ApiError> {
        let catalog = state.catalog.snapshot();
        let shipment = payload.resolve(&catalog)?;
        info!(
            source = %shipment.source.entity_type,
            source_id = shipment.source.id,
            destination = %shipment.destination.entity_type,
            destination_id = shipment.destination.id,
            quantity = shipment.request.quantity,
            "Optimizing shipment"
        );
        let result = optimize(&shipment.request, &catalog.transporters)?;
        Ok(OptimizeResponse::from_result(result, shipment.source, shipment.destination))
    })
}

/// POST /optimize - Select a carrier for one shipment.
#[utoipa::path(
    post,
    path = "/optimize",
    request_body = OptimizeRequest,
    responses(
        (status = 200, description = "Selection outcome, optimal or infeasible", body = OptimizeResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse)
    )
)]
async fn optimize_shipment(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<OptimizeRequest>, JsonRejection>,
) -> Result<Json<OptimizeResponse>, ApiError> {
    let Json(payload) = payload?;
    run_optimization(&state, &payload).map(Json)
}

/// GET /optimize/demo - Selection for the canned demo shipment.
#[utoipa::path(
    get,
    path = "/optimize/demo",
    responses((status = 200, description = "Demo selection outcome", body = OptimizeResponse))
)]
async fn optimize_demo(State(state): State<Arc<AppState>>) -> Result<Json<OptimizeResponse>, ApiError> {
    let demo = demo_shipment();
    let payload = OptimizeRequest {
        source_type: demo.source.entity_type.to_string(),
        source_id: demo.source.id,
        destination_type: demo.destination.entity_type.to_string(),
        destination_id: demo.destination.id,
        quantity: demo.quantity,
        freshness_life_hours: demo.freshness_life_hours,
        priority: demo.priority.to_string(),
        require_cold_chain: demo.require_cold_chain,
    };
    run_optimization(&state, &payload).map(Json)
}

/// GET /entities - All supply-chain participants grouped by role.
#[utoipa::path(
    get,
    path = "/entities",
    responses((status = 200, description = "Participant catalog", body = Catalog))
)]
async fn list_entities(State(state): State<Arc<AppState>>) -> Json<Catalog> {
    Json(state.catalog.snapshot().as_ref().clone())
}

// ============================================================================
// Calculators
// ============================================================================

#[derive(Debug, Deserialize, ToSchema)]
#[serde(default)]
pub struct FreshnessRequest {
    pub initial_score: f64,
    pub hours_elapsed: f64,
    pub has_cold_chain: bool,
}

impl Default for FreshnessRequest {
    fn default() -> Self {
        Self {
            initial_score: 100.0,
            hours_elapsed: 0.0,
            has_cold_chain: false,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct FreshnessResponse {
    pub freshness_score: f64,
    /// Percent per hour.
    pub decay_rate: f64,
}

/// POST /freshness/calculate - Freshness after a given time in transit.
#[utoipa::path(
    post,
    path = "/freshness/calculate",
    request_body = FreshnessRequest,
    responses((status = 200, description = "Freshness score", body = FreshnessResponse))
)]
async fn calculate_freshness(
    payload: Result<Json<FreshnessRequest>, JsonRejection>,
) -> Result<Json<FreshnessResponse>, ApiError> {
    let Json(req) = payload?;
    Ok(Json(FreshnessResponse {
        freshness_score: round_to(freshness(req.initial_score, req.hours_elapsed, req.has_cold_chain), 2),
        decay_rate: decay_percent_per_hour(req.has_cold_chain),
    }))
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(default)]
pub struct RiskRequest {
    pub distance_km: f64,
    pub has_cold_chain: bool,
    pub freshness_life_hours: f64,
    pub transit_hours: f64,
}

impl Default for RiskRequest {
    fn default() -> Self {
        Self {
            distance_km: 0.0,
            has_cold_chain: false,
            freshness_life_hours: 72.0,
            transit_hours: 0.0,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RiskResponse {
    pub risk_level: f64,
    pub risk_category: RiskCategory,
}

/// POST /risk/calculate - Risk score of a leg.
#[utoipa::path(
    post,
    path = "/risk/calculate",
    request_body = RiskRequest,
    responses(
        (status = 200, description = "Risk score", body = RiskResponse),
        (status = 400, description = "Non-positive freshness life", body = ErrorResponse)
    )
)]
async fn calculate_risk(
    payload: Result<Json<RiskRequest>, JsonRejection>,
) -> Result<Json<RiskResponse>, ApiError> {
    let Json(req) = payload?;
    if !(req.freshness_life_hours > 0.0) {
        return Err(RoutingError::InvalidFreshnessLife(req.freshness_life_hours).into());
    }
    let score = risk(
        req.distance_km,
        req.has_cold_chain,
        req.freshness_life_hours,
        req.transit_hours,
    );
    Ok(Json(RiskResponse {
        risk_level: round_to(score, 2),
        risk_category: RiskCategory::from_score(score),
    }))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct DistanceRequest {
    pub source: Coordinate,
    pub destination: Coordinate,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DistanceResponse {
    pub distance_km: f64,
}

/// POST /distance/calculate - Great-circle distance between two points.
#[utoipa::path(
    post,
    path = "/distance/calculate",
    request_body = DistanceRequest,
    responses((status = 200, description = "Distance in km", body = DistanceResponse))
)]
async fn calculate_distance(
    payload: Result<Json<DistanceRequest>, JsonRejection>,
) -> Result<Json<DistanceResponse>, ApiError> {
    let Json(req) = payload?;
    Ok(Json(DistanceResponse {
        distance_km: round_to(distance_km(req.source, req.destination), 2),
    }))
}

// ============================================================================
// Simulation
// ============================================================================

/// Simulation parameters. Omitted fields use the configured defaults.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct SimulateRequest {
    pub num_orders: Option<usize>,
    pub seed: Option<u64>,
}

/// POST /simulate - Compare optimized selection against the first carrier.
#[utoipa::path(
    post,
    path = "/simulate",
    request_body = SimulateRequest,
    responses(
        (status = 200, description = "Simulation report", body = SimulationReport),
        (status = 400, description = "Invalid order count", body = ErrorResponse)
    )
)]
async fn run_simulation(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SimulateRequest>, JsonRejection>,
) -> Result<Json<SimulationReport>, ApiError> {
    let Json(req) = payload?;
    let config = state.simulation.resolve(req.num_orders, req.seed);
    let catalog = state.catalog.snapshot();

    info!(num_orders = config.num_orders, seed = config.seed, "Simulation started");
    let started = Instant::now();
    let report = tokio::task::spawn_blocking(move || {
        simulate_with_progress(&catalog, &config, |_, _| true)
    })
    .await
    .map_err(|e| ApiError::internal(format!("simulation task failed: {}", e)))??;

    console::print_simulation_summary(&report, started.elapsed());
    Ok(Json(report))
}

/// Server-Sent Event payloads of a streamed simulation.
#[derive(Debug, Serialize)]
#[serde(tag = "event", rename_all = "lowercase")]
enum SimulationEvent {
    Progress { done: usize, total: usize, percent: u32 },
    Complete { report: SimulationReport },
    Error { message: String },
}

fn sse_frame(event: &SimulationEvent) -> String {
    let json = serde_json::to_string(event)
        .unwrap_or_else(|_| r#"{"event":"error","message":"serialization failed"}"#.to_string());
    format!("data: {}\n\n", json)
}

/// Forwards events until the worker finishes or the service shuts down.
///
/// Shutdown wins over queued events.
fn event_stream(
    mut events: mpsc::UnboundedReceiver<SimulationEvent>,
    cancel: CancellationToken,
) -> impl Stream<Item = Result<String, Infallible>> {
    async_stream::stream! {
        loop {
            let event = tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                event = events.recv() => match event {
                    Some(event) => event,
                    None => break,
                },
            };
            yield Ok(sse_frame(&event));
        }
    }
}

/// GET /simulate/stream - Simulation with SSE progress updates.
///
/// Emits a `progress` event per evaluated chunk of orders and a final
/// `complete` event carrying the report. Compatible with EventSource.
async fn stream_simulation(
    State(state): State<Arc<AppState>>,
    Query(req): Query<SimulateRequest>,
) -> Response {
    let config: SimulationConfig = state.simulation.resolve(req.num_orders, req.seed);
    let catalog = state.catalog.snapshot();
    let cancel = state.shutdown.child_token();
    let (tx, rx) = mpsc::unbounded_channel();

    let worker_cancel = cancel.clone();
    tokio::task::spawn_blocking(move || {
        let progress = tx.clone();
        let outcome = simulate_with_progress(&catalog, &config, |done, total| {
            if worker_cancel.is_cancelled() {
                return false;
            }
            let percent = (done * 100 / total.max(1)) as u32;
            // A closed channel means the client went away
            progress
                .send(SimulationEvent::Progress { done, total, percent })
                .is_ok()
        });
        if worker_cancel.is_cancelled() {
            return;
        }
        let event = match outcome {
            Ok(report) => SimulationEvent::Complete { report },
            Err(e) => SimulationEvent::Error {
                message: e.to_string(),
            },
        };
        let _ = tx.send(event);
    });

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/event-stream")
        .header(header::CACHE_CONTROL, "no-cache")
        .header(header::CONNECTION, "keep-alive")
        .body(Body::from_stream(event_stream(rx, cancel)))
        .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
}

// ============================================================================
// OpenAPI
// ============================================================================

#[derive(OpenApi)]
#[openapi(
    info(title = "Perishable Routing API", description = "Cold-chain aware transport selection"),
    paths(
        health,
        info,
        optimize_shipment,
        optimize_demo,
        list_entities,
        calculate_freshness,
        calculate_risk,
        calculate_distance,
        run_simulation,
    ),
    components(schemas(
        HealthResponse,
        InfoResponse,
        ErrorResponse,
        OptimizeRequest,
        OptimizeResponse,
        RouteEcho,
        ComparisonTable,
        FreshnessRequest,
        FreshnessResponse,
        RiskRequest,
        RiskResponse,
        DistanceRequest,
        DistanceResponse,
        SimulateRequest,
    ))
)]
struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::EntityType;

    #[test]
    fn test_optimize_request_defaults() {
        let req: OptimizeRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(req.source_type, "harvester");
        assert_eq!(req.destination_type, "distributor");
        assert_eq!(req.quantity, 1000);
        assert_eq!(req.freshness_life_hours, 72.0);
        assert_eq!(req.priority, "balanced");
        assert!(!req.require_cold_chain);
    }

    #[test]
    fn test_resolve_applies_priority_fallback() {
        let catalog = reference_catalog();
        let req = OptimizeRequest {
            priority: "fastest".into(),
            ..OptimizeRequest::default()
        };
        let shipment = req.resolve(&catalog).unwrap();
        assert_eq!(shipment.request.priority, Priority::Balanced);
        assert_eq!(shipment.destination, EntityRef::new(EntityType::Distributor, 1));
    }

    #[test]
    fn test_resolve_rejects_unknown_type() {
        let catalog = reference_catalog();
        let req = OptimizeRequest {
            source_type: "farm".into(),
            ..OptimizeRequest::default()
        };
        assert!(matches!(
            req.resolve(&catalog),
            Err(RoutingError::UnknownEntityType(_))
        ));
    }

    #[test]
    fn test_sse_frame_format() {
        let frame = sse_frame(&SimulationEvent::Progress {
            done: 25,
            total: 50,
            percent: 50,
        });
        assert_eq!(
            frame,
            "data: {\"event\":\"progress\",\"done\":25,\"total\":50,\"percent\":50}\n\n"
        );
    }

    #[test]
    fn test_infeasible_response_is_trimmed() {
        let req = OptimizeRequest {
            quantity: 50_000,
            ..OptimizeRequest::default()
        };
        let response = run_optimization(&AppState::default(), &req).unwrap();
        assert!(!response.success);
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["status"], "Infeasible");
        assert_eq!(json["message"], "No feasible solution found");
        assert!(json.get("comparison").is_none());
        assert!(json.get("selected_transporter").is_none());
    }
}
