//! Telemetry primitives shared across the Portico workspace.
//!
//! Centralises logging setup, request-id middleware layers, the Prometheus
//! metrics registry, and `OpenAPI` artifact persistence so the application
//! and delivery surfaces share one observability story.

mod error;
mod init;
mod layers;
mod metrics;
mod openapi;

pub use error::TelemetryError;
pub use init::{DEFAULT_LOG_LEVEL, LogFormat, LoggingConfig, build_sha, init_logging};
pub use layers::{REQUEST_ID_HEADER, propagate_request_id_layer, set_request_id_layer};
pub use metrics::{Metrics, MetricsSnapshot};
pub use openapi::persist_openapi;
