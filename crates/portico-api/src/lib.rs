//! HTTP delivery surface for the Portico host.
//!
//! Layout: `services.rs` (explicit capability registration), `pipeline.rs`
//! (ordered middleware stages and the dispatch loop that applies them),
//! `server.rs` (router host and listener), `json.rs` (reference-cycle-aware
//! serialization policy), `handlers/` (page and controller endpoints).

/// Server and handler error types.
pub mod error;
pub(crate) mod handlers;
/// Reference-cycle-aware JSON serialization policy.
pub mod json;
pub(crate) mod middleware;
/// `OpenAPI` document bound to the registered endpoints.
pub mod openapi;
/// Ordered pipeline stages and the dispatch loop.
pub mod pipeline;
/// Router host and listener.
pub mod server;
/// Capability registration consumed by the dispatcher.
pub mod services;
/// Shared per-request application state.
pub mod state;

pub use error::ApiServerError;
pub use json::{JsonPolicy, JsonPolicyError, ReferenceHandling, Shared};
pub use pipeline::PipelineStage;
pub use server::Server;
pub use services::{AppServices, EndpointTable};
pub use state::AppState;
