//! Router host and listener.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::http::{Method, Request, header::CONTENT_TYPE};
use axum::middleware as layer;
use axum::response::Response;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{Span, info};

use portico_config::HostProfile;
use portico_telemetry::{
    Metrics, REQUEST_ID_HEADER, build_sha, propagate_request_id_layer, set_request_id_layer,
};

use crate::error::ApiServerError;
use crate::middleware;
use crate::pipeline;
use crate::services::AppServices;
use crate::state::AppState;

/// Axum router wrapper hosting the assembled request pipeline.
pub struct Server {
    router: Router,
}

impl Server {
    /// Register the default services and assemble the pipeline for the
    /// supplied profile.
    #[must_use]
    pub fn build(profile: &HostProfile, metrics: Metrics) -> Self {
        let services = AppServices::register(profile);
        Self::with_services(profile, services, metrics)
    }

    /// Assemble the pipeline around an explicitly supplied service set.
    #[must_use]
    pub fn with_services(profile: &HostProfile, services: AppServices, metrics: Metrics) -> Self {
        let state = Arc::new(AppState::new(profile, &services, metrics));
        let stages = pipeline::assemble(profile);
        info!(
            environment = %profile.environment,
            stages = stages.len(),
            "assembling request pipeline"
        );
        let router = pipeline::apply(stages, services, Arc::clone(&state));

        let cors_layer = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([CONTENT_TYPE]);
        let trace_layer = TraceLayer::new_for_http()
            .make_span_with(|request: &Request<_>| {
                let method = request.method().clone();
                let uri_path = request.uri().path();
                let request_id = request
                    .headers()
                    .get(REQUEST_ID_HEADER)
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or_default()
                    .to_string();

                tracing::info_span!(
                    "http.request",
                    method = %method,
                    route = %uri_path,
                    request_id = %request_id,
                    build_sha = %build_sha(),
                    status_code = tracing::field::Empty,
                    latency_ms = tracing::field::Empty
                )
            })
            .on_response(|response: &Response, latency: Duration, span: &Span| {
                span.record("status_code", response.status().as_u16());
                let latency_ms = u64::try_from(latency.as_millis()).unwrap_or(u64::MAX);
                span.record("latency_ms", latency_ms);
            });
        let layered = ServiceBuilder::new()
            .layer(propagate_request_id_layer())
            .layer(set_request_id_layer())
            .layer(trace_layer)
            .layer(layer::from_fn_with_state(
                state,
                middleware::record_http_metrics,
            ));

        let router = router.layer(cors_layer).layer(layered);
        Self { router }
    }

    /// Serve the assembled pipeline on the supplied address.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener fails to bind or the accept loop
    /// terminates unexpectedly.
    pub async fn serve(self, addr: SocketAddr) -> Result<(), ApiServerError> {
        info!("Starting host on {}", addr);
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| ApiServerError::Bind { addr, source })?;
        axum::serve(listener, self.router.into_make_service())
            .await
            .map_err(|source| ApiServerError::Serve { source })?;
        Ok(())
    }

    /// Surrender the assembled router, e.g. for embedding in another host.
    #[must_use]
    pub fn into_router(self) -> Router {
        self.router
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::StatusCode;
    use portico_config::Settings;
    use tower::ServiceExt;

    #[tokio::test]
    async fn built_server_answers_the_health_probe() -> Result<(), Box<dyn std::error::Error>> {
        let profile = HostProfile::from_settings(&Settings::default())?;
        let server = Server::build(&profile, Metrics::new()?);
        let router = server.into_router();

        let response = router
            .oneshot(
                Request::builder()
                    .uri("/healthz")
                    .header("x-forwarded-proto", "https")
                    .body(Body::empty())?,
            )
            .await?;
        assert_eq!(response.status(), StatusCode::OK);
        Ok(())
    }
}
