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
    clippy::cargo,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]

//! HTTP boundary for the relay service.
//!
//! Layout: `router.rs` (server host and middleware stack), `state.rs`
//! (shared handler state), `models.rs` (wire DTOs), `http/` (auth, handlers,
//! problem responses, request metrics), `error.rs` (server errors).

pub mod error;
pub(crate) mod http;
pub mod models;
pub mod router;
pub mod state;

pub use error::{ApiServerError, ApiServerResult};
pub use models::{HealthResponse, ProblemDetails, ProcessAccepted, ProcessPayload};
pub use router::ApiServer;
pub use state::ApiState;
