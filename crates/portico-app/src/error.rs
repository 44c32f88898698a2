//! # Design
//!
//! - Centralize application-level errors for the boot sequence.
//! - Keep error messages constant while carrying context fields for
//!   debugging.
//! - Preserve source errors without re-logging at call sites.

use thiserror::Error;

/// Result alias for application operations.
pub type AppResult<T> = Result<T, AppError>;

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration operations failed.
    #[error("configuration operation failed")]
    Config {
        /// Operation identifier.
        operation: &'static str,
        /// Source configuration error.
        source: portico_config::ConfigError,
    },
    /// Server operations failed.
    #[error("server operation failed")]
    Server {
        /// Operation identifier.
        operation: &'static str,
        /// Source server error.
        source: portico_api::ApiServerError,
    },
    /// Telemetry operations failed.
    #[error("telemetry operation failed")]
    Telemetry {
        /// Operation identifier.
        operation: &'static str,
        /// Source telemetry error.
        source: portico_telemetry::TelemetryError,
    },
}

impl AppError {
    pub(crate) const fn config(
        operation: &'static str,
        source: portico_config::ConfigError,
    ) -> Self {
        Self::Config { operation, source }
    }

    pub(crate) const fn server(
        operation: &'static str,
        source: portico_api::ApiServerError,
    ) -> Self {
        Self::Server { operation, source }
    }

    pub(crate) const fn telemetry(
        operation: &'static str,
        source: portico_telemetry::TelemetryError,
    ) -> Self {
        Self::Telemetry { operation, source }
    }
}
