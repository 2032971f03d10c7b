//! Health and metrics endpoints.
//!
//! These endpoints are used by load balancers and monitoring systems.

use crate::error::AppError;
use crate::state::AppState;
use axum::{extract::State, http::StatusCode, http::Uri};

/// Simple health check endpoint (for basic liveness).
///
/// Returns 200 OK to indicate the site is running. Does not call the
/// Base API.
///
/// # Endpoint
///
/// ```text
/// GET /health
/// ```
#[allow(clippy::unused_async)]
pub async fn health_check() -> (StatusCode, &'static str) {
    (StatusCode::OK, "ok")
}

/// Prometheus metrics in text format.
///
/// # Endpoint
///
/// ```text
/// GET /metrics
/// ```
///
/// # Errors
///
/// 404 when no recorder was installed.
#[allow(clippy::unused_async)]
pub async fn metrics<A>(State(state): State<AppState<A>>, uri: Uri) -> Result<String, AppError> {
    state
        .metrics
        .as_ref()
        .map(metrics_exporter_prometheus::PrometheusHandle::render)
        .ok_or_else(|| AppError::not_found(uri.path()))
}

/// Fallback for unknown paths.
#[allow(clippy::unused_async)]
pub async fn not_found(uri: Uri) -> AppError {
    AppError::not_found(uri.path())
}
