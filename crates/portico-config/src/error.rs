//! Error types for configuration operations.

use thiserror::Error;

/// Result alias for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Primary error type for configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Environment flag value was not recognised.
    #[error("invalid environment")]
    InvalidEnvironment {
        /// Environment payload provided by the caller.
        value: String,
    },
    /// Setting contained an invalid value.
    #[error("invalid configuration field")]
    InvalidField {
        /// Setting key that failed validation.
        field: &'static str,
        /// Offending value when available.
        value: Option<String>,
        /// Machine-readable reason for the failure.
        reason: &'static str,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_messages_are_constant() {
        let invalid_env = ConfigError::InvalidEnvironment {
            value: "staging".to_string(),
        };
        assert_eq!(invalid_env.to_string(), "invalid environment");

        let invalid_field = ConfigError::InvalidField {
            field: "http_port",
            value: Some("banana".to_string()),
            reason: "unparseable",
        };
        assert_eq!(invalid_field.to_string(), "invalid configuration field");
    }
}
