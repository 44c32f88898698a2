//! Capability registration consumed by the request dispatcher.
//!
//! Mirrors the two-call host lifecycle: [`AppServices::register`] populates
//! the capabilities once at startup, then the pipeline's dispatch loop binds
//! them onto the router. Nothing here is ambient or process-global; the
//! registered value is passed around explicitly.

use std::sync::Arc;

use axum::Router;
use axum::routing::{MethodRouter, get};
use tracing::info;

use portico_config::HostProfile;

use crate::error::ApiServerError;
use crate::handlers::{pages, system, weather};
use crate::json::JsonPolicy;
use crate::openapi;
use crate::state::AppState;

/// Kind of routable destination an endpoint binds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointKind {
    /// Server-rendered page.
    Page,
    /// Controller-style API action.
    Api,
}

struct Endpoint {
    path: String,
    kind: EndpointKind,
    handler: MethodRouter<Arc<AppState>>,
}

/// Explicit, ordered table of page and controller routes.
#[derive(Default)]
pub struct EndpointTable {
    entries: Vec<Endpoint>,
}

impl EndpointTable {
    /// Start an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a page-style route.
    #[must_use]
    pub fn page(mut self, path: impl Into<String>, handler: MethodRouter<Arc<AppState>>) -> Self {
        self.entries.push(Endpoint {
            path: path.into(),
            kind: EndpointKind::Page,
            handler,
        });
        self
    }

    /// Append a controller-style route.
    #[must_use]
    pub fn api(mut self, path: impl Into<String>, handler: MethodRouter<Arc<AppState>>) -> Self {
        self.entries.push(Endpoint {
            path: path.into(),
            kind: EndpointKind::Api,
            handler,
        });
        self
    }

    /// Paths bound for the given endpoint kind, in registration order.
    pub fn paths(&self, kind: EndpointKind) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter(move |entry| entry.kind == kind)
            .map(|entry| entry.path.as_str())
    }

    /// Number of registered endpoints.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table holds no endpoints.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn into_router(self) -> Router<Arc<AppState>> {
        self.entries
            .into_iter()
            .fold(Router::new(), |router, entry| {
                router.route(&entry.path, entry.handler)
            })
    }
}

/// Capabilities populated by the service registration step.
pub struct AppServices {
    /// JSON rendering policy applied by every service-layer producer.
    pub json: JsonPolicy,
    /// `OpenAPI` document bound to the registered endpoints.
    pub openapi: utoipa::openapi::OpenApi,
    /// Page and controller routes handed to the dispatcher.
    pub endpoints: EndpointTable,
}

impl AppServices {
    /// Populate the capability set for the supplied profile.
    ///
    /// The registration itself has no failure modes; misconfiguration is
    /// caught earlier while parsing the profile.
    #[must_use]
    pub fn register(profile: &HostProfile) -> Self {
        let json = JsonPolicy::ignore_cycles();
        let openapi = openapi::document();
        let endpoints = EndpointTable::new()
            .page(profile.error_path.clone(), get(pages::error_page))
            .api("/api/weather", get(weather::list_forecasts))
            .api("/healthz", get(system::healthz))
            .api("/metrics", get(system::metrics));

        info!(
            pages = endpoints.paths(EndpointKind::Page).count(),
            controllers = endpoints.paths(EndpointKind::Api).count(),
            "service registration complete"
        );

        Self {
            json,
            openapi,
            endpoints,
        }
    }

    /// Render the registered `OpenAPI` document as a JSON tree.
    ///
    /// # Errors
    ///
    /// Returns an error when the document cannot be serialised.
    pub fn document_value(&self) -> Result<serde_json::Value, ApiServerError> {
        openapi::document_value(&self.openapi)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use portico_config::Settings;

    #[test]
    fn registration_binds_pages_and_controllers() -> Result<(), Box<dyn std::error::Error>> {
        let profile = HostProfile::from_settings(&Settings::default())?;
        let services = AppServices::register(&profile);

        let pages: Vec<_> = services.endpoints.paths(EndpointKind::Page).collect();
        assert_eq!(pages, vec!["/Error"]);

        let controllers: Vec<_> = services.endpoints.paths(EndpointKind::Api).collect();
        assert!(controllers.contains(&"/api/weather"));
        assert!(controllers.contains(&"/healthz"));
        assert!(controllers.contains(&"/metrics"));
        assert_eq!(services.endpoints.len(), 4);
        Ok(())
    }

    #[test]
    fn registered_document_covers_the_table() -> Result<(), Box<dyn std::error::Error>> {
        let profile = HostProfile::from_settings(&Settings::default())?;
        let services = AppServices::register(&profile);
        let value = services.document_value()?;
        assert!(value["paths"].get("/api/weather").is_some());
        Ok(())
    }
}
