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

//! Relay service bootstrap wiring.
//!
//! Layout: `bootstrap.rs` (service wiring and shutdown), `pipeline.rs` (one
//! relay run), `worker.rs` (bounded execution and per-run error boundary),
//! `error.rs` (application errors).

/// Application bootstrap and environment loading.
pub mod bootstrap;
/// Application-level error types.
pub mod error;
/// Single-request relay pipeline.
pub mod pipeline;
/// Bounded worker pool that owns relay runs.
pub mod worker;

pub use bootstrap::run_app;
pub use error::{AppError, AppResult};
pub use pipeline::{PipelineError, RelayOutcome, RelayPipeline};
pub use worker::{RelayWorker, WorkerLimits};
