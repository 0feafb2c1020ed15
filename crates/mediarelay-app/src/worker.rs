//! Bounded execution of relay runs.
//!
//! # Design
//! - Admission is a non-blocking semaphore sized `max_concurrent + queue_depth`;
//!   a full pool rejects instead of queueing without bound.
//! - At most `max_concurrent` runs execute at once; admitted runs wait for a
//!   slot or for shutdown.
//! - Each run executes in its own task so a panic is contained and reported to
//!   the requester without affecting other runs.
//! - Shutdown closes admission, drains for a grace period, then cancels.

use std::sync::Arc;
use std::time::Duration;

use mediarelay_core::{JobId, ProcessRequest, RelayWorkflow, SubmitError, SubmitResult};
use mediarelay_telemetry::{JobOutcome, Metrics};
use tokio::sync::{Semaphore, TryAcquireError};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{Instrument, error, info, info_span, warn};

use crate::pipeline::RelayPipeline;

pub(crate) const MSG_UNEXPECTED: &str = "⚠️ An unexpected error occurred";
const CANCEL_GRACE: Duration = Duration::from_secs(5);

/// Concurrency limits for the worker pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerLimits {
    /// Runs executing at the same time.
    pub max_concurrent: usize,
    /// Admitted runs allowed to wait for an execution slot.
    pub queue_depth: usize,
}

impl WorkerLimits {
    /// Total number of runs admitted at once.
    #[must_use]
    pub const fn capacity(self) -> usize {
        self.max_concurrent + self.queue_depth
    }
}

/// Worker pool that owns every admitted relay run.
#[derive(Clone)]
pub struct RelayWorker {
    inner: Arc<WorkerInner>,
}

struct WorkerInner {
    pipeline: Arc<RelayPipeline>,
    admission: Arc<Semaphore>,
    execution: Arc<Semaphore>,
    capacity: usize,
    tracker: TaskTracker,
    cancel: CancellationToken,
    metrics: Metrics,
}

impl RelayWorker {
    /// Build a pool that runs `pipeline` within `limits`.
    #[must_use]
    pub fn new(pipeline: RelayPipeline, limits: WorkerLimits, metrics: Metrics) -> Self {
        Self {
            inner: Arc::new(WorkerInner {
                pipeline: Arc::new(pipeline),
                admission: Arc::new(Semaphore::new(limits.capacity())),
                execution: Arc::new(Semaphore::new(limits.max_concurrent)),
                capacity: limits.capacity(),
                tracker: TaskTracker::new(),
                cancel: CancellationToken::new(),
                metrics,
            }),
        }
    }

    /// Stop admitting runs, wait up to `grace` for running ones, then cancel
    /// the rest. Returns `true` when every run finished within the grace period.
    pub async fn shutdown(&self, grace: Duration) -> bool {
        let inner = &self.inner;
        inner.tracker.close();
        inner.admission.close();
        info!(in_flight = inner.tracker.len(), "draining relay runs");

        if tokio::time::timeout(grace, inner.tracker.wait()).await.is_ok() {
            info!("relay runs drained");
            return true;
        }

        warn!(
            remaining = inner.tracker.len(),
            "grace period elapsed; cancelling relay runs"
        );
        inner.cancel.cancel();
        if tokio::time::timeout(CANCEL_GRACE, inner.tracker.wait())
            .await
            .is_err()
        {
            error!(
                remaining = inner.tracker.len(),
                "relay runs still active after cancellation"
            );
        }
        false
    }
}

impl RelayWorkflow for RelayWorker {
    fn submit(&self, request: ProcessRequest) -> SubmitResult<JobId> {
        let inner = &self.inner;
        if inner.tracker.is_closed() || inner.cancel.is_cancelled() {
            return Err(SubmitError::ShuttingDown);
        }
        let admission = Arc::clone(&inner.admission)
            .try_acquire_owned()
            .map_err(|err| match err {
                TryAcquireError::NoPermits => SubmitError::Saturated {
                    capacity: inner.capacity,
                },
                TryAcquireError::Closed => SubmitError::ShuttingDown,
            })?;

        let job_id = JobId::new_v4();
        inner.metrics.job_started();
        let span = info_span!("relay.job", %job_id, chat_id = request.chat_id);
        let run = Arc::clone(inner);
        inner.tracker.spawn(
            async move {
                let _admission = admission;
                let outcome = run.execute(job_id, request).await;
                run.metrics.inc_job(outcome);
                run.metrics.job_finished();
            }
            .instrument(span),
        );
        Ok(job_id)
    }
}

impl WorkerInner {
    async fn execute(&self, job_id: JobId, request: ProcessRequest) -> JobOutcome {
        let slot = tokio::select! {
            slot = Arc::clone(&self.execution).acquire_owned() => slot,
            () = self.cancel.cancelled() => {
                info!("relay run cancelled before it started");
                return JobOutcome::Cancelled;
            }
        };
        let Ok(_slot) = slot else {
            return JobOutcome::Cancelled;
        };

        let chat_id = request.chat_id;
        let pipeline = Arc::clone(&self.pipeline);
        let cancel = self.cancel.child_token();
        let handle = tokio::spawn(
            async move { pipeline.run(job_id, &request, cancel).await }.in_current_span(),
        );

        match handle.await {
            Ok(Ok(outcome)) => {
                info!(
                    file_name = %outcome.file_name,
                    parts = outcome.parts,
                    bytes = outcome.bytes,
                    "relay run finished"
                );
                JobOutcome::Relayed
            }
            Ok(Err(err)) => {
                warn!(error = %err, detail = %err.detail(), "relay run failed");
                err.outcome()
            }
            Err(join) => {
                error!(error = %join, "relay run aborted unexpectedly");
                let messenger = self.pipeline.messenger();
                if let Err(err) = messenger.send_text(chat_id, MSG_UNEXPECTED).await {
                    warn!(error = %err, detail = %err.detail(), "failed to report unexpected error");
                }
                JobOutcome::Panicked
            }
        }
    }
}
