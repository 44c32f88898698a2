//! Shared per-request application state.

use portico_config::{Environment, HostProfile};
use portico_telemetry::Metrics;

use crate::json::JsonPolicy;
use crate::services::AppServices;

/// Capabilities handed to endpoint handlers through router state.
///
/// Constructed once during startup from the registered services; no ambient
/// globals are involved.
pub struct AppState {
    pub(crate) environment: Environment,
    pub(crate) json: JsonPolicy,
    pub(crate) metrics: Metrics,
}

impl AppState {
    /// Snapshot the handler-facing capabilities out of the registered
    /// services.
    #[must_use]
    pub fn new(profile: &HostProfile, services: &AppServices, metrics: Metrics) -> Self {
        Self {
            environment: profile.environment,
            json: services.json,
            metrics,
        }
    }

    /// Environment flag recorded at assembly time.
    #[must_use]
    pub const fn environment(&self) -> Environment {
        self.environment
    }
}
