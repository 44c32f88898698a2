//! Fallback values applied when a setting is not supplied.

/// Loopback address used when no bind address is configured.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1";
/// Port the plain-HTTP listener binds to.
pub const DEFAULT_HTTP_PORT: u16 = 8080;
/// Port advertised in HTTPS redirect targets.
pub const DEFAULT_HTTPS_PORT: u16 = 8443;
/// Content root holding the client's static assets.
pub const DEFAULT_STATIC_ROOT: &str = "dist";
/// Subdirectory of the content root holding the compiled client bundle.
pub const DEFAULT_BUNDLE_SUBDIR: &str = "pkg";
/// Route prefix the client bundle is mounted under.
pub const DEFAULT_BUNDLE_ROUTE: &str = "/pkg";
/// Document served for paths no endpoint or asset matches.
pub const DEFAULT_INDEX_FILE: &str = "index.html";
/// Route the production exception stage redirects failed requests to.
pub const DEFAULT_ERROR_PATH: &str = "/Error";
/// Strict-transport-security lifetime, thirty days.
pub const DEFAULT_HSTS_MAX_AGE: u64 = 2_592_000;
