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

//! Shared test helpers used across relay test suites.
//! Layout: messenger.rs (recording chat double), runner.rs (scripted downloader double).

pub mod messenger;
pub mod runner;

pub use messenger::{FailPoint, MessengerCall, RecordingMessenger};
pub use runner::{RunnerScript, ScriptedRunner};
