#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]

//! Settings source and typed host configuration for the Portico host.
//!
//! Layout: `settings.rs` (opaque key/value source captured at startup),
//! `model.rs` (typed `HostProfile` view and the `Environment` flag),
//! `defaults.rs` (fallback values used when a key is absent).

/// Fallback values applied when a setting is not supplied.
pub mod defaults;
/// Error types for configuration operations.
pub mod error;
/// Typed host profile and environment flag.
pub mod model;
/// Opaque key/value settings source.
pub mod settings;

pub use error::{ConfigError, ConfigResult};
pub use model::{Environment, HostProfile};
pub use settings::Settings;
