//! Dependency construction and the two-step boot sequence: capability
//! registration, then pipeline assembly, then the listener launch.

use std::net::SocketAddr;
use std::path::Path;

use tracing::info;

use portico_api::{AppServices, Server};
use portico_config::{HostProfile, Settings};
use portico_telemetry::{LoggingConfig, Metrics};

use crate::error::{AppError, AppResult};

/// Published copy of the generated `OpenAPI` document.
const OPENAPI_ARTIFACT_PATH: &str = "docs/api/openapi.json";

/// Dependencies required to bootstrap the Portico host.
pub(crate) struct BootstrapDependencies {
    logging: LoggingConfig<'static>,
    profile: HostProfile,
    metrics: Metrics,
}

impl BootstrapDependencies {
    /// Construct production dependencies from the environment for the
    /// binary entrypoint.
    pub(crate) fn from_env() -> AppResult<Self> {
        let logging = LoggingConfig::default();
        let settings = Settings::from_env();
        let profile = HostProfile::from_settings(&settings)
            .map_err(|err| AppError::config("host_profile.from_settings", err))?;
        let metrics =
            Metrics::new().map_err(|err| AppError::telemetry("telemetry.metrics", err))?;
        Ok(Self {
            logging,
            profile,
            metrics,
        })
    }
}

/// Entry point for the Portico host boot sequence.
///
/// # Errors
///
/// Returns an error if dependency construction or host startup fails.
pub async fn run_app() -> AppResult<()> {
    run_app_with(BootstrapDependencies::from_env()?).await
}

/// Boot sequence that relies entirely on injected dependencies to simplify
/// testing.
pub(crate) async fn run_app_with(dependencies: BootstrapDependencies) -> AppResult<()> {
    portico_telemetry::init_logging(&dependencies.logging)
        .map_err(|err| AppError::telemetry("telemetry.init", err))?;

    info!("Portico host bootstrap starting");

    let BootstrapDependencies {
        logging: _,
        profile,
        metrics,
    } = dependencies;

    let services = AppServices::register(&profile);
    let document = services
        .document_value()
        .map_err(|err| AppError::server("api_document.serialize", err))?;
    portico_telemetry::persist_openapi(Path::new(OPENAPI_ARTIFACT_PATH), &document)
        .map_err(|err| AppError::telemetry("openapi.persist", err))?;

    let server = Server::with_services(&profile, services, metrics);

    let addr = SocketAddr::new(profile.bind_addr, profile.http_port);
    info!(addr = %addr, environment = %profile.environment, "Launching host listener");

    server
        .serve(addr)
        .await
        .map_err(|err| AppError::server("server.serve", err))?;

    info!("Host shutdown complete");
    Ok(())
}
