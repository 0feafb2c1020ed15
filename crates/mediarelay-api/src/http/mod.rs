//! HTTP middleware, handlers, and problem responses.

pub(crate) mod auth;
pub(crate) mod constants;
pub(crate) mod errors;
pub(crate) mod health;
pub(crate) mod process;
pub(crate) mod telemetry;
