//! Host health and diagnostics endpoints.

use std::sync::Arc;

use axum::Json;
use axum::body::Body;
use axum::extract::State;
use axum::http::{StatusCode, header::CONTENT_TYPE};
use axum::response::Response;
use portico_telemetry::build_sha;
use serde::Serialize;
use serde_json::Value;
use tracing::error;
use utoipa::ToSchema;

use crate::error::ApiError;
use crate::state::AppState;

/// Liveness payload reported by the health probe.
#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct HealthStatus {
    /// Fixed marker; the probe only responds when the host is serving.
    pub(crate) status: String,
    /// Environment mode fixed at assembly time.
    pub(crate) environment: String,
    /// Build identifier recorded during logging initialisation.
    pub(crate) build: String,
    /// Plain-HTTP requests redirected to HTTPS since startup.
    pub(crate) https_redirects_total: u64,
    /// Handler panics intercepted by the exception stage since startup.
    pub(crate) panics_recovered_total: u64,
}

/// Report liveness together with a snapshot of the pipeline counters.
#[utoipa::path(
    get,
    path = "/healthz",
    tag = "system",
    responses(
        (status = 200, description = "Host is serving", body = HealthStatus),
    )
)]
pub(crate) async fn healthz(State(state): State<Arc<AppState>>) -> Result<Json<Value>, ApiError> {
    let snapshot = state.metrics.snapshot();
    let payload = HealthStatus {
        status: "ok".to_string(),
        environment: state.environment.to_string(),
        build: build_sha().to_string(),
        https_redirects_total: snapshot.https_redirects_total,
        panics_recovered_total: snapshot.panics_recovered_total,
    };
    let body = state.json.render(&payload).map_err(|err| {
        error!(error = %err, "failed to render health payload");
        ApiError::internal("failed to render health payload")
    })?;
    Ok(Json(body))
}

/// Render the metrics registry in Prometheus text exposition format.
pub(crate) async fn metrics(State(state): State<Arc<AppState>>) -> Result<Response, ApiError> {
    match state.metrics.render() {
        Ok(body) => Response::builder()
            .status(StatusCode::OK)
            .header(CONTENT_TYPE, "text/plain; version=0.0.4")
            .body(Body::from(body))
            .map_err(|err| {
                error!(error = %err, "failed to build metrics response");
                ApiError::internal("failed to build metrics response")
            }),
        Err(err) => {
            error!(error = %err, "failed to render metrics");
            Err(ApiError::internal("failed to render metrics"))
        }
    }
}
