//! Request middleware backing the pipeline stages.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use axum::extract::{MatchedPath, Request, State};
use axum::http::{HeaderValue, StatusCode, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use futures_util::FutureExt;
use tracing::{debug, error};

use crate::state::AppState;

/// Header proxies use to carry the original request scheme.
pub(crate) const FORWARDED_PROTO_HEADER: &str = "x-forwarded-proto";

const BUNDLE_CACHE_POLICY: &str = "no-cache, no-store, must-revalidate";

/// Redirect plain-HTTP requests to their HTTPS equivalent.
pub(crate) async fn https_redirect(
    state: Arc<AppState>,
    https_port: u16,
    req: Request,
    next: Next,
) -> Response {
    if request_is_secure(&req) {
        return next.run(req).await;
    }

    let Some(host) = req
        .headers()
        .get(header::HOST)
        .and_then(|value| value.to_str().ok())
    else {
        return StatusCode::BAD_REQUEST.into_response();
    };

    let authority = redirect_authority(host, https_port);
    let path_and_query = req
        .uri()
        .path_and_query()
        .map_or("/", |value| value.as_str());
    let target = format!("https://{authority}{path_and_query}");

    state.metrics.inc_https_redirect();
    debug!(target = %target, "redirecting plain-http request");
    Redirect::temporary(&target).into_response()
}

/// Stamp responses with a strict-transport-security header.
pub(crate) async fn hsts(max_age: u64, req: Request, next: Next) -> Response {
    let mut response = next.run(req).await;
    if !response
        .headers()
        .contains_key(header::STRICT_TRANSPORT_SECURITY)
        && let Ok(value) = HeaderValue::from_str(&format!("max-age={max_age}"))
    {
        response
            .headers_mut()
            .insert(header::STRICT_TRANSPORT_SECURITY, value);
    }
    response
}

/// Intercept handler panics and redirect the failed request to the error
/// page route.
pub(crate) async fn error_redirect(
    state: Arc<AppState>,
    path: String,
    req: Request,
    next: Next,
) -> Response {
    let method = req.method().clone();
    let uri_path = req.uri().path().to_string();
    match AssertUnwindSafe(next.run(req)).catch_unwind().await {
        Ok(response) => response,
        Err(panic) => {
            state.metrics.inc_panic_recovered();
            error!(
                method = %method,
                path = %uri_path,
                panic = %panic_message(panic.as_ref()),
                "request handler panicked"
            );
            Redirect::to(&path).into_response()
        }
    }
}

/// Intercept handler panics and surface the failure detail directly.
pub(crate) async fn dev_diagnostics(state: Arc<AppState>, req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let uri_path = req.uri().path().to_string();
    match AssertUnwindSafe(next.run(req)).catch_unwind().await {
        Ok(response) => response,
        Err(panic) => {
            state.metrics.inc_panic_recovered();
            let message = panic_message(panic.as_ref());
            error!(
                method = %method,
                path = %uri_path,
                panic = %message,
                "request handler panicked"
            );
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Unhandled error while processing {method} {uri_path}\n\n{message}"),
            )
                .into_response()
        }
    }
}

/// Disable caching on client bundle assets so rebuilt bundles load
/// immediately during development.
pub(crate) async fn wasm_debug(bundle_route: String, req: Request, next: Next) -> Response {
    let is_bundle_asset = req.uri().path().starts_with(&bundle_route);
    let mut response = next.run(req).await;
    if is_bundle_asset {
        response.headers_mut().insert(
            header::CACHE_CONTROL,
            HeaderValue::from_static(BUNDLE_CACHE_POLICY),
        );
    }
    response
}

/// Count every handled request by matched route and status code.
pub(crate) async fn record_http_metrics(
    State(state): State<Arc<AppState>>,
    req: Request,
    next: Next,
) -> Response {
    let route = req.extensions().get::<MatchedPath>().map_or_else(
        || req.uri().path().to_string(),
        |matched| matched.as_str().to_string(),
    );
    let response = next.run(req).await;
    state.metrics.inc_http_request(&route, response.status().as_u16());
    response
}

fn request_is_secure(req: &Request) -> bool {
    if req.uri().scheme_str() == Some("https") {
        return true;
    }
    req.headers()
        .get(FORWARDED_PROTO_HEADER)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|proto| proto.eq_ignore_ascii_case("https"))
}

fn redirect_authority(host: &str, https_port: u16) -> String {
    let name = if let Some(bracketed) = host.strip_prefix('[') {
        bracketed
            .split(']')
            .next()
            .map_or_else(|| host.to_string(), |addr| format!("[{addr}]"))
    } else {
        host.split(':').next().unwrap_or(host).to_string()
    };
    if https_port == 443 {
        name
    } else {
        format!("{name}:{https_port}")
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload.downcast_ref::<&str>().map_or_else(
        || {
            payload
                .downcast_ref::<String>()
                .cloned()
                .unwrap_or_else(|| "opaque panic payload".to_string())
        },
        |message| (*message).to_string(),
    )
}
