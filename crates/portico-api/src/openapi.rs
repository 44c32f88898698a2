//! `OpenAPI` document bound to the registered endpoints.

use utoipa::OpenApi;

use crate::error::ApiServerError;

/// Derived document covering the controller endpoints.
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::weather::list_forecasts,
        crate::handlers::system::healthz,
    ),
    components(schemas(
        crate::handlers::weather::WeatherForecast,
        crate::handlers::system::HealthStatus,
        crate::error::ErrorBody,
    )),
    tags(
        (name = "weather", description = "Sample forecast endpoints"),
        (name = "system", description = "Host health and diagnostics"),
    ),
    info(
        title = "Portico API",
        description = "HTTP surface exposed by the Portico host",
        version = "0.1.0",
    ),
    servers((url = "/", description = "Portico host"))
)]
pub struct ApiDoc;

/// Generate the document for the registered endpoints.
#[must_use]
pub fn document() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

/// Render the document as a JSON tree for persistence and publishing.
///
/// # Errors
///
/// Returns an error when the document cannot be serialised.
pub fn document_value(document: &utoipa::openapi::OpenApi) -> Result<serde_json::Value, ApiServerError> {
    serde_json::to_value(document).map_err(|source| ApiServerError::DocumentSerialize { source })
}
