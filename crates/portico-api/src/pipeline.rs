//! Ordered pipeline stages and the dispatch loop that applies them.
//!
//! The pipeline is described as data: [`assemble`] derives the stage list
//! from the host profile (branching once on the environment flag), and
//! [`apply`] walks that list exactly once, mounting routes and collecting
//! middleware wrappers. Wrappers are applied outward-in so the first stage
//! in the list observes every request first. Hidden ordering lives nowhere
//! else; reordering the list is the only way to reorder the pipeline.

use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::Request;
use axum::middleware::Next;
use axum::{Router, middleware as layer};
use tower_http::services::{ServeDir, ServeFile};
use tracing::debug;
use utoipa_swagger_ui::SwaggerUi;

use portico_config::HostProfile;

use crate::middleware;
use crate::services::AppServices;
use crate::state::AppState;

/// Route the interactive API documentation UI is mounted under.
pub const DOCS_UI_PATH: &str = "/docs";
/// Route serving the generated `OpenAPI` document.
pub const OPENAPI_DOCUMENT_PATH: &str = "/api-docs/openapi.json";

/// One unit of request-pipeline behavior, applied in list order to every
/// incoming request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineStage {
    /// Development aid: disable caching on client bundle assets.
    WasmDebug {
        /// Route prefix of the client bundle.
        bundle_route: String,
    },
    /// Development aid: surface handler panics with diagnostic detail.
    DevDiagnostics,
    /// Intercept handler panics and redirect the request to the error page.
    ErrorRedirect {
        /// Route of the error page.
        path: String,
    },
    /// Stamp responses with a strict-transport-security header.
    Hsts {
        /// Header lifetime in seconds.
        max_age: u64,
    },
    /// Redirect plain-HTTP requests to their HTTPS equivalent.
    HttpsRedirect {
        /// Port advertised in redirect targets.
        https_port: u16,
    },
    /// Serve the compiled client bundle under its route prefix.
    BundleAssets {
        /// Route prefix the bundle is mounted under.
        route: String,
        /// Directory holding the bundle files.
        dir: PathBuf,
    },
    /// Serve remaining static files from the content root.
    StaticAssets {
        /// Content root directory.
        dir: PathBuf,
    },
    /// Expose the `OpenAPI` document and the documentation UI.
    ApiDocs,
    /// Bind the endpoint table and the catch-all document fallback.
    Endpoints {
        /// Document served for unmatched paths.
        fallback: PathBuf,
    },
}

impl PipelineStage {
    /// Stable stage identifier used in logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::WasmDebug { .. } => "wasm_debug",
            Self::DevDiagnostics => "dev_diagnostics",
            Self::ErrorRedirect { .. } => "error_redirect",
            Self::Hsts { .. } => "hsts",
            Self::HttpsRedirect { .. } => "https_redirect",
            Self::BundleAssets { .. } => "bundle_assets",
            Self::StaticAssets { .. } => "static_assets",
            Self::ApiDocs => "api_docs",
            Self::Endpoints { .. } => "endpoints",
        }
    }
}

/// Derive the ordered stage list from the host profile.
///
/// The environment flag is read exactly once, here, to pick between the two
/// mutually exclusive leading branches.
#[must_use]
pub fn assemble(profile: &HostProfile) -> Vec<PipelineStage> {
    let mut stages = Vec::with_capacity(8);
    if profile.environment.is_development() {
        stages.push(PipelineStage::WasmDebug {
            bundle_route: profile.bundle_route.clone(),
        });
        stages.push(PipelineStage::DevDiagnostics);
    } else {
        stages.push(PipelineStage::ErrorRedirect {
            path: profile.error_path.clone(),
        });
        stages.push(PipelineStage::Hsts {
            max_age: profile.hsts_max_age,
        });
    }
    stages.push(PipelineStage::HttpsRedirect {
        https_port: profile.https_port,
    });
    stages.push(PipelineStage::BundleAssets {
        route: profile.bundle_route.clone(),
        dir: profile.bundle_dir.clone(),
    });
    stages.push(PipelineStage::StaticAssets {
        dir: profile.static_root.clone(),
    });
    stages.push(PipelineStage::ApiDocs);
    stages.push(PipelineStage::Endpoints {
        fallback: profile.index_path(),
    });
    stages
}

type Wrapper = Box<dyn FnOnce(Router) -> Router>;

/// Apply the stage list onto a router in a single dispatch pass.
///
/// Route-bearing stages mount services as they are visited; middleware
/// stages are collected and wrapped outward in reverse order, so the first
/// stage in the list becomes the outermost layer.
#[must_use]
pub fn apply(stages: Vec<PipelineStage>, services: AppServices, state: Arc<AppState>) -> Router {
    let AppServices {
        openapi, endpoints, ..
    } = services;
    let mut endpoints = Some(endpoints);
    let mut routes: Router<Arc<AppState>> = Router::new();
    let mut wrappers: Vec<Wrapper> = Vec::new();
    let mut static_dir: Option<PathBuf> = None;
    let mut fallback_file: Option<PathBuf> = None;

    for stage in stages {
        debug!(stage = stage.name(), "applying pipeline stage");
        match stage {
            PipelineStage::WasmDebug { bundle_route } => {
                wrappers.push(Box::new(move |router| {
                    router.layer(layer::from_fn(move |req: Request, next: Next| {
                        middleware::wasm_debug(bundle_route.clone(), req, next)
                    }))
                }));
            }
            PipelineStage::DevDiagnostics => {
                let state = Arc::clone(&state);
                wrappers.push(Box::new(move |router| {
                    router.layer(layer::from_fn(move |req: Request, next: Next| {
                        middleware::dev_diagnostics(Arc::clone(&state), req, next)
                    }))
                }));
            }
            PipelineStage::ErrorRedirect { path } => {
                let state = Arc::clone(&state);
                wrappers.push(Box::new(move |router| {
                    router.layer(layer::from_fn(move |req: Request, next: Next| {
                        middleware::error_redirect(Arc::clone(&state), path.clone(), req, next)
                    }))
                }));
            }
            PipelineStage::Hsts { max_age } => {
                wrappers.push(Box::new(move |router| {
                    router.layer(layer::from_fn(move |req: Request, next: Next| {
                        middleware::hsts(max_age, req, next)
                    }))
                }));
            }
            PipelineStage::HttpsRedirect { https_port } => {
                let state = Arc::clone(&state);
                wrappers.push(Box::new(move |router| {
                    router.layer(layer::from_fn(move |req: Request, next: Next| {
                        middleware::https_redirect(Arc::clone(&state), https_port, req, next)
                    }))
                }));
            }
            PipelineStage::BundleAssets { route, dir } => {
                routes = routes.nest_service(&route, ServeDir::new(dir));
            }
            PipelineStage::StaticAssets { dir } => {
                static_dir = Some(dir);
            }
            PipelineStage::ApiDocs => {
                routes = routes.merge(
                    SwaggerUi::new(DOCS_UI_PATH).url(OPENAPI_DOCUMENT_PATH, openapi.clone()),
                );
            }
            PipelineStage::Endpoints { fallback } => {
                if let Some(table) = endpoints.take() {
                    routes = routes.merge(table.into_router());
                }
                fallback_file = Some(fallback);
            }
        }
    }

    // The static root backs every path no endpoint claimed; the fallback
    // document backs everything the static root misses.
    let routes = match (static_dir, fallback_file) {
        (Some(dir), Some(index)) => routes
            .fallback_service(ServeDir::new(dir).not_found_service(ServeFile::new(index))),
        (Some(dir), None) => routes.fallback_service(ServeDir::new(dir)),
        (None, Some(index)) => routes.fallback_service(ServeFile::new(index)),
        (None, None) => routes,
    };

    let mut router = routes.with_state(state);
    for wrapper in wrappers.into_iter().rev() {
        router = wrapper(router);
    }
    router
}

#[cfg(test)]
mod tests {
    use super::*;
    use portico_config::Settings;

    fn profile(environment: &str) -> HostProfile {
        let settings = Settings::from_pairs([("environment", environment)]);
        HostProfile::from_settings(&settings).expect("profile")
    }

    #[test]
    fn production_branch_hardens_the_pipeline() {
        let stages = assemble(&profile("production"));
        assert_eq!(
            stages,
            vec![
                PipelineStage::ErrorRedirect {
                    path: "/Error".to_string()
                },
                PipelineStage::Hsts {
                    max_age: 2_592_000
                },
                PipelineStage::HttpsRedirect { https_port: 8443 },
                PipelineStage::BundleAssets {
                    route: "/pkg".to_string(),
                    dir: PathBuf::from("dist/pkg"),
                },
                PipelineStage::StaticAssets {
                    dir: PathBuf::from("dist"),
                },
                PipelineStage::ApiDocs,
                PipelineStage::Endpoints {
                    fallback: PathBuf::from("dist/index.html"),
                },
            ]
        );
    }

    #[test]
    fn development_branch_swaps_in_diagnostics() {
        let stages = assemble(&profile("development"));
        assert!(matches!(
            stages.first(),
            Some(PipelineStage::WasmDebug { .. })
        ));
        assert!(matches!(stages.get(1), Some(PipelineStage::DevDiagnostics)));
        assert!(
            stages
                .iter()
                .all(|stage| !matches!(stage, PipelineStage::Hsts { .. })),
            "development pipeline must not send strict-transport headers"
        );
        assert!(matches!(
            stages.last(),
            Some(PipelineStage::Endpoints { .. })
        ));
    }

    #[test]
    fn both_branches_share_the_trailing_stages() {
        let development = assemble(&profile("development"));
        let production = assemble(&profile("production"));
        assert_eq!(development[2..], production[2..]);
    }
}
