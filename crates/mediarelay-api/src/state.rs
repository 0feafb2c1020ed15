//! Shared state handed to every handler.

use std::sync::Arc;

use mediarelay_core::RelayWorkflow;
use mediarelay_telemetry::Metrics;

/// Dependencies shared by the HTTP handlers.
#[derive(Clone)]
pub struct ApiState {
    pub(crate) api_key: Arc<str>,
    pub(crate) workflow: Arc<dyn RelayWorkflow>,
    pub(crate) telemetry: Metrics,
}

impl ApiState {
    /// Bundle the bearer secret, the workflow façade, and the metrics handle.
    #[must_use]
    pub fn new(api_key: &str, workflow: Arc<dyn RelayWorkflow>, telemetry: Metrics) -> Self {
        Self {
            api_key: Arc::from(api_key),
            workflow,
            telemetry,
        }
    }
}
