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

//! Environment-sourced configuration for the relay service.
//!
//! Layout: `model.rs` (typed configuration and secrets), `loader.rs`
//! (environment lookup and defaults), `validate.rs` (field parsers),
//! `error.rs` (configuration errors).

pub mod error;
pub mod loader;
pub mod model;
pub mod validate;

pub use error::{ConfigError, ConfigResult};
pub use loader::env_keys;
pub use model::{RelayConfig, Secret};
