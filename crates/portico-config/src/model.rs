//! Typed host profile and environment flag.

use std::fmt;
use std::net::IpAddr;
use std::path::PathBuf;
use std::str::FromStr;

use crate::defaults::{
    DEFAULT_BIND_ADDR, DEFAULT_BUNDLE_ROUTE, DEFAULT_BUNDLE_SUBDIR, DEFAULT_ERROR_PATH,
    DEFAULT_HSTS_MAX_AGE, DEFAULT_HTTP_PORT, DEFAULT_HTTPS_PORT, DEFAULT_INDEX_FILE,
    DEFAULT_STATIC_ROOT,
};
use crate::error::{ConfigError, ConfigResult};
use crate::settings::Settings;

/// Development or production flag, fixed for the process lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    /// Local development mode with diagnostic surfaces enabled.
    Development,
    /// Hardened mode used for every deployment that is not development.
    Production,
}

impl Environment {
    /// Whether the host runs in development mode.
    #[must_use]
    pub const fn is_development(self) -> bool {
        matches!(self, Self::Development)
    }

    /// Render the environment as its lowercase string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
        }
    }
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            other => Err(ConfigError::InvalidEnvironment {
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parsed, validated view of the settings source.
#[derive(Debug, Clone)]
pub struct HostProfile {
    /// Environment flag selecting between the two pipeline branches.
    pub environment: Environment,
    /// Interface the listener binds to.
    pub bind_addr: IpAddr,
    /// Port the plain-HTTP listener binds to.
    pub http_port: u16,
    /// Port advertised in HTTPS redirect targets.
    pub https_port: u16,
    /// Content root holding the client's static assets.
    pub static_root: PathBuf,
    /// Directory holding the compiled client bundle.
    pub bundle_dir: PathBuf,
    /// Route prefix the client bundle is mounted under.
    pub bundle_route: String,
    /// Document served for paths no endpoint or asset matches.
    pub index_file: String,
    /// Route the production exception stage redirects failed requests to.
    pub error_path: String,
    /// Strict-transport-security lifetime in seconds.
    pub hsts_max_age: u64,
}

impl HostProfile {
    /// Parse and validate a profile from the supplied settings source.
    ///
    /// Every key has a fallback; only malformed values fail.
    ///
    /// # Errors
    ///
    /// Returns an error when a supplied value cannot be parsed or fails
    /// validation.
    pub fn from_settings(settings: &Settings) -> ConfigResult<Self> {
        let environment = match settings.get("environment") {
            Some(raw) => raw.parse()?,
            None => Environment::Production,
        };
        let bind_addr = parse_field(settings, "bind_addr", DEFAULT_BIND_ADDR.parse().ok())?;
        let http_port = parse_field(settings, "http_port", Some(DEFAULT_HTTP_PORT))?;
        let https_port = parse_field(settings, "https_port", Some(DEFAULT_HTTPS_PORT))?;
        let static_root = settings
            .get("static_root")
            .map_or_else(|| PathBuf::from(DEFAULT_STATIC_ROOT), PathBuf::from);
        let bundle_dir = settings.get("bundle_dir").map_or_else(
            || static_root.join(DEFAULT_BUNDLE_SUBDIR),
            PathBuf::from,
        );
        let bundle_route = settings
            .get("bundle_route")
            .unwrap_or(DEFAULT_BUNDLE_ROUTE)
            .to_string();
        let index_file = settings
            .get("index_file")
            .unwrap_or(DEFAULT_INDEX_FILE)
            .to_string();
        let error_path = settings
            .get("error_path")
            .unwrap_or(DEFAULT_ERROR_PATH)
            .to_string();
        let hsts_max_age = parse_field(settings, "hsts_max_age", Some(DEFAULT_HSTS_MAX_AGE))?;

        let profile = Self {
            environment,
            bind_addr,
            http_port,
            https_port,
            static_root,
            bundle_dir,
            bundle_route,
            index_file,
            error_path,
            hsts_max_age,
        };
        profile.validate()?;
        Ok(profile)
    }

    /// Absolute fallback document path under the content root.
    #[must_use]
    pub fn index_path(&self) -> PathBuf {
        self.static_root.join(&self.index_file)
    }

    fn validate(&self) -> ConfigResult<()> {
        if self.http_port == 0 {
            return Err(ConfigError::InvalidField {
                field: "http_port",
                value: Some(self.http_port.to_string()),
                reason: "zero",
            });
        }
        if self.https_port == 0 {
            return Err(ConfigError::InvalidField {
                field: "https_port",
                value: Some(self.https_port.to_string()),
                reason: "zero",
            });
        }
        if !self.bundle_route.starts_with('/') || self.bundle_route.len() < 2 {
            return Err(ConfigError::InvalidField {
                field: "bundle_route",
                value: Some(self.bundle_route.clone()),
                reason: "not_rooted",
            });
        }
        if !self.error_path.starts_with('/') {
            return Err(ConfigError::InvalidField {
                field: "error_path",
                value: Some(self.error_path.clone()),
                reason: "not_rooted",
            });
        }
        if self.index_file.is_empty() {
            return Err(ConfigError::InvalidField {
                field: "index_file",
                value: None,
                reason: "empty",
            });
        }
        Ok(())
    }
}

fn parse_field<T: FromStr>(
    settings: &Settings,
    field: &'static str,
    default: Option<T>,
) -> ConfigResult<T> {
    match settings.get(field) {
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidField {
            field,
            value: Some(raw.to_string()),
            reason: "unparseable",
        }),
        None => default.ok_or(ConfigError::InvalidField {
            field,
            value: None,
            reason: "missing",
        }),
    }
}
