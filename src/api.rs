//! HTTP surface for location resolution.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use axum::{
    Router,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::clock::{Clock, SystemClock};
use crate::config::PollingIntervals;
use crate::dates::parse_instant;
use crate::presentation::LocationView;
use crate::store::{Store, TravelPlanStore, load_user_with_plans};
use crate::types::{PlanStatus, TravelPlan, User};

/// Application state shared across all requests
#[derive(Clone)]
pub struct AppState {
    store: Store,
    clock: Arc<dyn Clock>,
    polling: PollingIntervals,
    metrics: Arc<Metrics>,
}

impl AppState {
    pub fn new(store: Store, polling: PollingIntervals) -> Self {
        Self::with_clock(store, polling, Arc::new(SystemClock))
    }

    pub fn with_clock(store: Store, polling: PollingIntervals, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            polling,
            metrics: Arc::new(Metrics {
                total_requests: AtomicU64::new(0),
                requests_in_flight: AtomicU64::new(0),
                start_time: Instant::now(),
            }),
        }
    }
}

/// Server metrics
struct Metrics {
    total_requests: AtomicU64,
    requests_in_flight: AtomicU64,
    start_time: Instant,
}

impl Metrics {
    fn track(&self) -> RequestGuard<'_> {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
        self.requests_in_flight.fetch_add(1, Ordering::Relaxed);
        RequestGuard(&self.requests_in_flight)
    }
}

/// RAII guard for tracking in-flight requests
struct RequestGuard<'a>(&'a AtomicU64);

impl<'a> Drop for RequestGuard<'a> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::Relaxed);
    }
}

/// Build the Axum application with routes and middleware
pub fn build_app(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health_check))
        // API routes
        .route("/api/location/resolve", post(resolve))
        .route("/api/users/:user_id/location", get(user_location))
        .route("/api/users/:user_id/travel-plans", get(user_travel_plans))
        .route("/api/config/polling", get(polling_config))
        .route("/api/metrics", get(get_metrics))
        // Middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

/// Resolve a user supplied in the request body
async fn resolve(
    State(state): State<AppState>,
    payload: Result<Json<ResolveRequest>, JsonRejection>,
) -> Result<Json<LocationResponse>, ApiError> {
    let _guard = state.metrics.track();
    let Json(request) = payload?;

    let now = match request.now.as_deref() {
        Some(raw) => parse_instant(raw)
            .ok_or_else(|| ApiError::BadRequest(format!("invalid 'now' timestamp: {}", raw)))?,
        None => state.clock.now(),
    };

    tracing::info!(
        "Resolving user {} against {} travel plans",
        request.user.id,
        request.travel_plans.len()
    );

    let view = LocationView::build(&request.user, &request.travel_plans, now);

    Ok(Json(LocationResponse {
        success: true,
        data: view,
    }))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResolveRequest {
    user: User,
    #[serde(default)]
    travel_plans: Vec<TravelPlan>,
    #[serde(default)]
    now: Option<String>,
}

#[derive(Serialize)]
struct LocationResponse {
    success: bool,
    data: LocationView,
}

/// Resolve a stored user
async fn user_location(
    State(state): State<AppState>,
    user_id: Result<Path<i64>, PathRejection>,
) -> Result<Json<LocationResponse>, ApiError> {
    let _guard = state.metrics.track();
    let Path(user_id) = user_id?;

    let (user, plans) = load_user_with_plans(&state.store, user_id)
        .await
        .map_err(|e| {
            tracing::error!("Failed to load user {}: {:#}", user_id, e);
            ApiError::InternalError(e.to_string())
        })?
        .ok_or_else(|| ApiError::NotFound(format!("user {} not found", user_id)))?;

    let view = LocationView::build(&user, &plans, state.clock.now());
    tracing::debug!(
        "User {} resolved to here_now='{}' traveling={}",
        user_id,
        view.buckets.here_now,
        view.resolved.is_traveling
    );

    Ok(Json(LocationResponse {
        success: true,
        data: view,
    }))
}

/// List a user's travel plans with their derived status
async fn user_travel_plans(
    State(state): State<AppState>,
    user_id: Result<Path<i64>, PathRejection>,
) -> Result<Json<PlansResponse>, ApiError> {
    let _guard = state.metrics.track();
    let Path(user_id) = user_id?;

    let plans = state.store.travel_plans(user_id).await.map_err(|e| {
        tracing::error!("Failed to load travel plans for user {}: {:#}", user_id, e);
        ApiError::InternalError(e.to_string())
    })?;

    let today = state.clock.today();
    let data = plans
        .into_iter()
        .map(|plan| PlanData {
            derived_status: plan.status_on(today),
            plan,
        })
        .collect();

    Ok(Json(PlansResponse {
        success: true,
        data,
    }))
}

#[derive(Serialize)]
struct PlansResponse {
    success: bool,
    data: Vec<PlanData>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PlanData {
    #[serde(flatten)]
    plan: TravelPlan,
    derived_status: PlanStatus,
}

async fn polling_config(State(state): State<AppState>) -> Json<PollingIntervals> {
    Json(state.polling)
}

/// Get server metrics
async fn get_metrics(State(state): State<AppState>) -> Json<MetricsResponse> {
    Json(MetricsResponse {
        total_requests: state.metrics.total_requests.load(Ordering::Relaxed),
        requests_in_flight: state.metrics.requests_in_flight.load(Ordering::Relaxed),
        uptime_seconds: state.metrics.start_time.elapsed().as_secs(),
    })
}

#[derive(Serialize)]
struct MetricsResponse {
    total_requests: u64,
    requests_in_flight: u64,
    uptime_seconds: u64,
}

/// API error types
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    InternalError(String),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::InternalError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(serde_json::json!({
            "success": false,
            "error": message
        }));

        (status, body).into_response()
    }
}
