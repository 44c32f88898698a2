//! Server and handler error types.

use std::io;
use std::net::SocketAddr;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

/// Errors raised while hosting the HTTP surface.
#[derive(Debug, Error)]
pub enum ApiServerError {
    /// Binding the listener socket failed.
    #[error("failed to bind listener")]
    Bind {
        /// Address the listener attempted to bind.
        addr: SocketAddr,
        /// Underlying IO error.
        source: io::Error,
    },
    /// The accept loop terminated unexpectedly.
    #[error("server terminated unexpectedly")]
    Serve {
        /// Underlying IO error.
        source: io::Error,
    },
    /// Serialising the `OpenAPI` document failed.
    #[error("failed to serialize api document")]
    DocumentSerialize {
        /// Underlying serde error.
        source: serde_json::Error,
    },
}

/// Structured body rendered for handler-level failures.
#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct ErrorBody {
    /// Human-readable failure summary.
    pub(crate) error: String,
    /// HTTP status code mirrored into the body.
    pub(crate) status: u16,
}

/// Handler-level error rendered as a structured JSON response.
///
/// These are handled responses; the pipeline's exception stage only
/// intercepts panics.
#[derive(Debug)]
pub(crate) struct ApiError {
    status: StatusCode,
    detail: String,
}

impl ApiError {
    pub(crate) fn internal(detail: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            detail: detail.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.detail,
            status: self.status.as_u16(),
        };
        (self.status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_errors_keep_constant_messages() {
        let bind = ApiServerError::Bind {
            addr: ([127, 0, 0, 1], 8080).into(),
            source: io::Error::other("io"),
        };
        assert_eq!(bind.to_string(), "failed to bind listener");

        let serve = ApiServerError::Serve {
            source: io::Error::other("io"),
        };
        assert_eq!(serve.to_string(), "server terminated unexpectedly");
    }

    #[tokio::test]
    async fn api_error_renders_structured_body() {
        let response = ApiError::internal("boom").into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        let value: serde_json::Value = serde_json::from_slice(&bytes).expect("json body");
        assert_eq!(value["error"], "boom");
        assert_eq!(value["status"], 500);
    }
}
