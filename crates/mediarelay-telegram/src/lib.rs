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

//! Telegram delivery for relayed files.
//!
//! Layout: `messenger.rs` (chat operations seam and the teloxide-backed
//! implementation), `relay.rs` (archive-then-forward uploader), `error.rs`
//! (delivery errors).

pub mod error;
pub mod messenger;
pub mod relay;

pub use error::{RelayError, RelayResult, TelegramError, TelegramResult};
pub use messenger::{BotIdentity, MessageRef, Messenger, RemoteFileRef, TeloxideMessenger};
pub use relay::{RelayUploader, backup_caption};
