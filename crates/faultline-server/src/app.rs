//! Application router and admin surface
//!
//! Assembles the HTTP surface of the service: the root and work endpoints,
//! the fault-toggle admin endpoints, and the merged health/metrics router.
//! All handlers delegate to injected state; there is no global mutable
//! configuration.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use faultline_core::FaultController;
use faultline_observability::{health_router, HealthState, Metrics};
use faultline_sim::{WorkOutcome, WorkSimulator};

/// Shared application state, injected into every handler.
#[derive(Clone)]
pub struct AppState {
    /// Service name reported by the root endpoint
    pub service_name: String,
    /// Fault parameters mutated by the admin surface
    pub faults: Arc<FaultController>,
    /// The simulated-work core
    pub simulator: Arc<WorkSimulator>,
}

/// Build the full application router, including health and metrics routes.
pub fn app_router(state: AppState, metrics: Arc<Metrics>) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/work", get(work))
        .route("/faults/error", post(set_error_rate))
        .route("/faults/latency", post(set_extra_latency))
        .route("/faults/reset", post(reset_faults))
        .with_state(state)
        .merge(health_router(HealthState::new(metrics)))
}

async fn root(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({ "msg": "ok", "service": state.service_name }))
}

/// Run one unit of simulated work.
///
/// Success reports the elapsed time in whole milliseconds; simulated failure
/// returns 500 with an empty body.
async fn work(State(state): State<AppState>) -> Response {
    match state.simulator.simulate().await {
        WorkOutcome::Completed { latency } => Json(json!({
            "ok": true,
            "latency_ms": latency.as_millis() as u64,
        }))
        .into_response(),
        WorkOutcome::Failed => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    }
}

#[derive(Debug, Deserialize)]
struct ErrorRateParams {
    rate: Option<f64>,
}

/// Set the injected error rate. Calling without `rate` applies 0.5.
async fn set_error_rate(
    State(state): State<AppState>,
    Query(params): Query<ErrorRateParams>,
) -> Json<serde_json::Value> {
    let stored = state.faults.set_error_rate(params.rate.or(Some(0.5)));
    Json(json!({ "ERROR_RATE": stored }))
}

#[derive(Debug, Deserialize)]
struct LatencyParams {
    ms: Option<i64>,
}

/// Set the injected extra latency. Calling without `ms` applies 200.
async fn set_extra_latency(
    State(state): State<AppState>,
    Query(params): Query<LatencyParams>,
) -> Json<serde_json::Value> {
    let stored = state.faults.set_extra_latency_ms(params.ms.or(Some(200)));
    Json(json!({ "EXTRA_LATENCY_MS": stored }))
}

/// Zero both fault parameters.
async fn reset_faults(State(state): State<AppState>) -> Json<serde_json::Value> {
    let (rate, ms) = state.faults.reset();
    Json(json!({ "ERROR_RATE": rate, "EXTRA_LATENCY_MS": ms }))
}
