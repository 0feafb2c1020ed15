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

//! Download strategies that turn a source URL into a local file.
//!
//! Layout: `strategy.rs` (contract and platform dispatch), `ytdlp.rs`
//! (external downloader strategies), `direct.rs` (HTTP fetch), `command.rs`
//! (subprocess seam), `temp.rs` (scratch paths), `naming.rs` (display names),
//! `parts.rs` (oversize splitting), `error.rs` (download errors).

pub mod command;
pub mod direct;
pub mod error;
pub mod naming;
pub mod parts;
pub mod strategy;
pub mod temp;
pub mod ytdlp;

pub use command::{CommandOutput, CommandRunner, TokioCommandRunner};
pub use direct::DirectFetchStrategy;
pub use error::{FetchError, FetchResult};
pub use parts::split_into_parts;
pub use strategy::{DownloadContext, DownloadStrategy, StrategySet};
pub use temp::{TempPaths, remove_quietly};
pub use ytdlp::{AudioExtractStrategy, YtDlpSettings, YtDlpStrategy};
