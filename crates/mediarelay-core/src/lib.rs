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

//! Transport-agnostic relay interfaces and DTOs.
//!
//! Layout: `model.rs` (request/result DTOs), `platform.rs` (URL
//! classification), `service.rs` (workflow façade consumed by the API layer),
//! `error.rs` (submission errors).

pub mod error;
pub mod model;
pub mod platform;
pub mod service;

pub use error::{SubmitError, SubmitResult};
pub use model::{DownloadResult, ProcessRequest};
pub use platform::{Platform, classify};
pub use service::{JobId, RelayWorkflow};
