//! End-to-end pipeline wiring tests driven through the assembled router.

use std::path::Path;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use axum::routing::get;
use portico_api::{AppServices, AppState, pipeline};
use portico_config::{HostProfile, Settings};
use portico_telemetry::Metrics;
use tower::ServiceExt;

const FORWARDED_PROTO: &str = "x-forwarded-proto";

fn profile(environment: &str, static_root: &Path) -> HostProfile {
    let settings = Settings::from_pairs([
        ("environment", environment.to_string()),
        ("static_root", static_root.display().to_string()),
    ]);
    HostProfile::from_settings(&settings).expect("profile parses")
}

/// Assemble the pipeline with one extra controller route that panics, so the
/// exception stages have something to intercept.
async fn boom() -> axum::response::Response {
    panic!("boom")
}

fn router(profile: &HostProfile) -> axum::Router {
    let metrics = Metrics::new().expect("metrics registry");
    let mut services = AppServices::register(profile);
    services.endpoints = services.endpoints.api("/api/boom", get(boom));
    let state = Arc::new(AppState::new(profile, &services, metrics));
    let stages = pipeline::assemble(profile);
    pipeline::apply(stages, services, state)
}

fn secure_get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(FORWARDED_PROTO, "https")
        .header(header::HOST, "example.com")
        .body(Body::empty())
        .expect("request builds")
}

async fn body_string(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body collects");
    String::from_utf8(bytes.to_vec()).expect("body is utf-8")
}

#[tokio::test]
async fn existing_static_assets_are_served() {
    let root = tempfile::tempdir().expect("tempdir");
    std::fs::write(root.path().join("site.css"), "body { margin: 0; }").expect("asset");
    std::fs::write(root.path().join("index.html"), "<html>shell</html>").expect("index");

    let app = router(&profile("production", root.path()));
    let response = app.oneshot(secure_get("/site.css")).await.expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(content_type.starts_with("text/css"));
    assert_eq!(body_string(response).await, "body { margin: 0; }");
}

#[tokio::test]
async fn plain_http_requests_redirect_in_both_environments() {
    let root = tempfile::tempdir().expect("tempdir");
    for environment in ["development", "production"] {
        let app = router(&profile(environment, root.path()));
        let request = Request::builder()
            .uri("/fetch-data?page=2")
            .header(header::HOST, "example.com")
            .body(Body::empty())
            .expect("request builds");

        let response = app.oneshot(request).await.expect("response");
        assert_eq!(
            response.status(),
            StatusCode::TEMPORARY_REDIRECT,
            "expected redirect in {environment}"
        );
        let location = response
            .headers()
            .get(header::LOCATION)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default();
        assert_eq!(location, "https://example.com:8443/fetch-data?page=2");
    }
}

#[tokio::test]
async fn unmatched_paths_fall_back_to_the_index_document() {
    let root = tempfile::tempdir().expect("tempdir");
    std::fs::write(root.path().join("index.html"), "<html>client shell</html>").expect("index");

    let app = router(&profile("production", root.path()));
    let response = app
        .oneshot(secure_get("/client/route/42"))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "<html>client shell</html>");
}

#[tokio::test]
async fn production_panics_redirect_to_the_error_page() {
    let root = tempfile::tempdir().expect("tempdir");
    let app = router(&profile("production", root.path()));

    let response = app
        .clone()
        .oneshot(secure_get("/api/boom"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let location = response
        .headers()
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    assert_eq!(location, "/Error");

    let page = app.oneshot(secure_get("/Error")).await.expect("response");
    assert_eq!(page.status(), StatusCode::OK);
    let body = body_string(page).await;
    assert!(body.contains("An error occurred"));
    assert!(!body.contains("boom"), "stack detail must not leak");
}

#[tokio::test]
async fn development_panics_surface_diagnostics() {
    let root = tempfile::tempdir().expect("tempdir");
    let app = router(&profile("development", root.path()));

    let response = app.oneshot(secure_get("/api/boom")).await.expect("response");
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_string(response).await;
    assert!(body.contains("boom"));
    assert!(body.contains("/api/boom"));
}

#[tokio::test]
async fn strict_transport_headers_follow_the_environment() {
    let root = tempfile::tempdir().expect("tempdir");

    let production = router(&profile("production", root.path()));
    let hardened = production
        .oneshot(secure_get("/healthz"))
        .await
        .expect("response");
    let hsts = hardened
        .headers()
        .get(header::STRICT_TRANSPORT_SECURITY)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    assert_eq!(hsts, "max-age=2592000");

    let development = router(&profile("development", root.path()));
    let relaxed = development
        .oneshot(secure_get("/healthz"))
        .await
        .expect("response");
    assert!(
        relaxed
            .headers()
            .get(header::STRICT_TRANSPORT_SECURITY)
            .is_none()
    );
}

#[tokio::test]
async fn openapi_document_describes_registered_controllers() {
    let root = tempfile::tempdir().expect("tempdir");
    let app = router(&profile("production", root.path()));

    let response = app
        .oneshot(secure_get("/api-docs/openapi.json"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let document: serde_json::Value =
        serde_json::from_str(&body_string(response).await).expect("valid json document");
    assert!(document.get("openapi").is_some());
    assert!(document["paths"].get("/api/weather").is_some());
    assert!(document["paths"].get("/healthz").is_some());
}

#[tokio::test]
async fn forecast_controller_serves_json() {
    let root = tempfile::tempdir().expect("tempdir");
    let app = router(&profile("production", root.path()));

    let response = app
        .oneshot(secure_get("/api/weather?days=3"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let payload: serde_json::Value =
        serde_json::from_str(&body_string(response).await).expect("valid json payload");
    let entries = payload.as_array().expect("array payload");
    assert_eq!(entries.len(), 3);
    assert!(entries[0].get("temperature_f").is_some());
}

#[tokio::test]
async fn bundle_assets_skip_caching_in_development() {
    let root = tempfile::tempdir().expect("tempdir");
    let bundle_dir = root.path().join("pkg");
    std::fs::create_dir_all(&bundle_dir).expect("bundle dir");
    std::fs::write(bundle_dir.join("app.js"), "export default {};").expect("bundle asset");

    let app = router(&profile("development", root.path()));
    let response = app
        .oneshot(secure_get("/pkg/app.js"))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let cache_control = response
        .headers()
        .get(header::CACHE_CONTROL)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    assert!(cache_control.contains("no-cache"));
}
