//! `OpenAPI` persistence helpers.
//!
//! # Design
//! - Artifacts are written with parent directories created as needed.
//! - Returns the canonical JSON string to keep logging consistent.

use std::path::Path;

use serde_json::Value;

use crate::error::TelemetryError;

/// Persist an `OpenAPI` JSON document to disk and return the canonicalised
/// payload.
///
/// # Errors
///
/// Returns an error if the output directory cannot be created, the document
/// cannot be serialised, or the file cannot be written.
pub fn persist_openapi(path: impl AsRef<Path>, document: &Value) -> Result<String, TelemetryError> {
    let json = serde_json::to_string_pretty(document)
        .map_err(|source| TelemetryError::OpenApiSerialize { source })?;
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| TelemetryError::OpenApiCreateDir {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    std::fs::write(path, json.as_bytes()).map_err(|source| TelemetryError::OpenApiWrite {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io;

    #[test]
    fn persist_openapi_writes_document() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("api").join("openapi.json");
        let document = json!({"openapi": "3.1.0"});

        let contents = persist_openapi(&path, &document)?;
        assert!(contents.contains("\"openapi\": \"3.1.0\""));
        let file = std::fs::read_to_string(&path)?;
        assert!(file.contains("\"openapi\": \"3.1.0\""));
        Ok(())
    }

    #[test]
    fn persist_openapi_reports_write_failure() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let document = json!({"openapi": "3.1.0"});

        let Err(err) = persist_openapi(dir.path(), &document) else {
            return Err(io::Error::other("expected write error").into());
        };
        assert!(matches!(err, TelemetryError::OpenApiWrite { .. }));
        Ok(())
    }
}
