//! Workflow façade exposed to the API layer.

use uuid::Uuid;

use crate::error::SubmitResult;
use crate::model::ProcessRequest;

/// Identifier assigned to an admitted relay run.
pub type JobId = Uuid;

/// Accepts relay requests for background processing.
///
/// Implementations must return promptly: the caller acknowledges the HTTP
/// request as soon as `submit` returns.
pub trait RelayWorkflow: Send + Sync {
    /// Admit `request` for background processing.
    ///
    /// # Errors
    ///
    /// Returns [`crate::SubmitError`] when the request cannot be admitted.
    fn submit(&self, request: ProcessRequest) -> SubmitResult<JobId>;
}
