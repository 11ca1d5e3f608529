//! Job completion polling
//!
//! Jobs are polled at a fixed interval until they reach a terminal state.
//! There is no backoff and no retry: a failed or cancelled job is reported
//! as an error. Without `max_attempts` the wait is unbounded.

use log::debug;
use qcchem_backend::{Backend, JobId, JobResult, JobStatus};
use qcchem_core::error::{QcchemError, QcchemResult};
use std::time::Duration;

/// Blocks the calling thread between polls
pub trait Sleeper: Send + Sync {
    /// Sleep for the given duration
    fn sleep(&self, duration: Duration);
}

/// Sleeper backed by `std::thread::sleep`
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Fixed-interval polling policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollingPolicy {
    /// Wait between status checks
    pub interval: Duration,

    /// Status checks before giving up (None = unbounded)
    pub max_attempts: Option<u32>,
}

impl PollingPolicy {
    /// Poll until the job is terminal, then fetch its result
    pub fn wait_for(
        &self,
        backend: &dyn Backend,
        job_id: &JobId,
        sleeper: &dyn Sleeper,
    ) -> QcchemResult<JobResult> {
        let mut attempts = 0u32;

        loop {
            let status = backend.job_status(job_id)?;
            attempts += 1;
            debug!("Job {} poll {}: {}", job_id, attempts, status);

            match status {
                JobStatus::Completed => return backend.job_result(job_id),
                JobStatus::Failed(reason) => {
                    return Err(QcchemError::JobFailed {
                        job_id: job_id.to_string(),
                        reason,
                    })
                }
                JobStatus::Cancelled => return Err(QcchemError::JobCancelled(job_id.to_string())),
                JobStatus::Queued | JobStatus::Validating | JobStatus::Running => {}
            }

            if self.max_attempts.is_some_and(|max| attempts >= max) {
                return Err(QcchemError::PollTimeout {
                    job_id: job_id.to_string(),
                    attempts,
                });
            }

            sleeper.sleep(self.interval);
        }
    }
}

impl Default for PollingPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(qcchem_core::execution::POLL_INTERVAL_MS),
            max_attempts: None,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
