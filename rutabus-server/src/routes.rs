//! HTTP route handlers.

use axum::{
    BoxError, Json, Router,
    error_handling::HandleErrorLayer,
    extract::{
        Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use rutabus_core::{
    BuildReport, Error, JourneyPlanner, NetworkSnapshot, PlanRequest,
    routing::{JourneyPlan, TransferRoute},
};
use serde::{Deserialize, Serialize};
use tower::{ServiceBuilder, limit::ConcurrencyLimitLayer, timeout::TimeoutLayer};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info, warn};

use crate::config::HttpConfig;
use crate::state::AppState;

/// Create the application router.
pub fn create_router(state: AppState, http: &HttpConfig) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/network", get(network))
        .route("/optimal-route", post(optimal_route))
        .route("/transfer-routes", post(transfer_routes))
        .route("/admin/rebuild", post(rebuild))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(HandleErrorLayer::new(handle_middleware_error))
                .layer(TimeoutLayer::new(http.request_timeout()))
                .layer(ConcurrencyLimitLayer::new(http.concurrency_limit)),
        )
        .layer(CorsLayer::permissive())
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlanQuery {
    /// `geojson` returns the itinerary as a feature collection
    pub format: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct NetworkResponse {
    pub generation: u64,
    pub nodes: usize,
    pub arcs: usize,
    pub walk_arcs: usize,
    pub bus_arcs: usize,
    pub routes: usize,
    pub route_stops: usize,
    pub report: BuildReport,
}

impl NetworkResponse {
    fn from_snapshot(snapshot: &NetworkSnapshot) -> Self {
        Self {
            generation: snapshot.generation,
            nodes: snapshot.graph.node_count(),
            arcs: snapshot.graph.arc_count(),
            walk_arcs: snapshot.graph.walk_arc_count(),
            bus_arcs: snapshot.graph.bus_arc_count(),
            routes: snapshot.routes.len(),
            route_stops: snapshot.stops.len(),
            report: snapshot.report.clone(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Plan a journey between two coordinates.
async fn optimal_route(
    State(state): State<AppState>,
    query: Result<Query<PlanQuery>, QueryRejection>,
    payload: Result<Json<PlanRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let Query(query) = query?;
    let Json(request) = payload?;
    let plan: JourneyPlan = run_blocking(state, move |state| {
        let snapshot = state.service.snapshot()?;
        JourneyPlanner::new(&snapshot, state.service.config()).plan(&request)
    })
    .await?;

    info!(
        direct = plan.direct_route,
        start = plan.start_node,
        end = plan.end_node,
        transfers = plan.summary.total_transfers,
        "journey planned"
    );

    match query.format.as_deref() {
        Some("geojson") => {
            let body = plan.to_geojson_string()?;
            Ok(([(header::CONTENT_TYPE, "application/geo+json")], body).into_response())
        }
        Some("json") | None => Ok(Json(plan).into_response()),
        Some(other) => Err(AppError::BadRequest {
            message: format!("Unknown format: {other}"),
        }),
    }
}

/// Bus-only journeys with a bounded number of route changes.
async fn transfer_routes(
    State(state): State<AppState>,
    payload: Result<Json<PlanRequest>, JsonRejection>,
) -> Result<Json<Vec<TransferRoute>>, AppError> {
    let Json(request) = payload?;
    let routes = run_blocking(state, move |state| {
        let snapshot = state.service.snapshot()?;
        JourneyPlanner::new(&snapshot, state.service.config()).transfer_routes(&request)
    })
    .await?;
    Ok(Json(routes))
}

/// Generation and size of the current network.
async fn network(State(state): State<AppState>) -> Result<Json<NetworkResponse>, AppError> {
    let snapshot = run_blocking(state, |state| state.service.snapshot()).await?;
    Ok(Json(NetworkResponse::from_snapshot(&snapshot)))
}

/// Rebuild the network from the repository.
async fn rebuild(State(state): State<AppState>) -> Result<Json<NetworkResponse>, AppError> {
    let snapshot = run_blocking(state, |state| state.service.rebuild()).await?;
    info!(generation = snapshot.generation, "network rebuilt");
    Ok(Json(NetworkResponse::from_snapshot(&snapshot)))
}

/// Runs CPU-bound planning work off the async executor
async fn run_blocking<T, F>(state: AppState, work: F) -> Result<T, AppError>
where
    T: Send + 'static,
    F: FnOnce(&AppState) -> Result<T, Error> + Send + 'static,
{
    tokio::task::spawn_blocking(move || work(&state))
        .await
        .map_err(|e| AppError::Internal {
            message: format!("planning task failed: {e}"),
        })?
        .map_err(AppError::from)
}

async fn handle_middleware_error(err: BoxError) -> AppError {
    if err.is::<tower::timeout::error::Elapsed>() {
        AppError::Timeout
    } else {
        AppError::Internal {
            message: err.to_string(),
        }
    }
}

#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    NotFound { message: String },
    Timeout,
    Internal { message: String },
}

impl From<Error> for AppError {
    fn from(e: Error) -> Self {
        match e {
            Error::InvalidInput(_) => AppError::BadRequest {
                message: e.to_string(),
            },
            Error::NoNearbyNode { .. } | Error::NoPathFound => AppError::NotFound {
                message: e.to_string(),
            },
            _ => AppError::Internal {
                message: e.to_string(),
            },
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest {
            message: rejection.body_text(),
        }
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::BadRequest {
            message: rejection.body_text(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message),
            AppError::NotFound { message } => (StatusCode::NOT_FOUND, message),
            AppError::Timeout => (StatusCode::REQUEST_TIMEOUT, "Request timed out".to_owned()),
            AppError::Internal { message } => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };

        if status.is_server_error() {
            error!(%status, "{message}");
        } else {
            warn!(%status, "{message}");
        }

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}
