//! Opaque key/value settings source captured once at startup.

use std::collections::BTreeMap;

/// Read-only key/value settings source supplied by the host process.
///
/// Keys are normalised to lowercase. The map is captured once during
/// construction and never mutated afterwards.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    values: BTreeMap<String, String>,
}

impl Settings {
    /// Prefix stripped from process environment variables during capture.
    pub const ENV_PREFIX: &'static str = "PORTICO_";

    /// Capture settings from prefixed process environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_pairs(std::env::vars().filter_map(|(key, value)| {
            key.strip_prefix(Self::ENV_PREFIX)
                .map(|stripped| (stripped.to_string(), value))
        }))
    }

    /// Build a settings source from explicit key/value pairs.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let values = pairs
            .into_iter()
            .map(|(key, value)| (key.into().to_ascii_lowercase(), value.into()))
            .collect();
        Self { values }
    }

    /// Look up a setting by its lowercase key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Number of captured settings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the source holds no settings at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_pairs_normalises_keys() {
        let settings = Settings::from_pairs([("HTTP_PORT", "9090"), ("Environment", "dev")]);
        assert_eq!(settings.get("http_port"), Some("9090"));
        assert_eq!(settings.get("environment"), Some("dev"));
        assert_eq!(settings.get("HTTP_PORT"), None);
        assert_eq!(settings.len(), 2);
    }

    #[test]
    fn missing_keys_read_as_none() {
        let settings = Settings::default();
        assert!(settings.is_empty());
        assert_eq!(settings.get("http_port"), None);
    }
}
