//! Job types: the queued unit of work and its result handle

use thiserror::Error;
use tokio::sync::oneshot;

use crate::reducer::BoxError;

/// Outcome of a posted job, observed through its [`JobHandle`]
#[derive(Debug, Error)]
pub enum JobError {
    /// The operation ran and returned an error
    #[error("job failed: {0}")]
    Failed(#[source] BoxError),

    /// The job never ran: the queue shut down, or dropped it, first
    #[error("job abandoned before execution")]
    Abandoned,
}

impl JobError {
    /// True when the job was dropped without ever executing
    pub fn is_abandoned(&self) -> bool {
        matches!(self, JobError::Abandoned)
    }
}

/// A unit of work owned by its queue until executed
pub(crate) struct Job {
    run: Box<dyn FnOnce() + Send>,
}

impl Job {
    /// Pair an operation with a fresh single-shot result channel
    pub(crate) fn new<T, F>(op: F) -> (Self, JobHandle<T>)
    where
        F: FnOnce() -> Result<T, BoxError> + Send + 'static,
        T: Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        let job = Self {
            // a dropped handle makes delivery a no-op: the result is discarded
            // and the worker moves on
            run: Box::new(move || {
                let _ = tx.send(op());
            }),
        };
        (job, JobHandle { rx })
    }

    /// An empty job used only to wake a parked worker
    pub(crate) fn wake() -> Self {
        Self {
            run: Box::new(|| {}),
        }
    }

    pub(crate) fn execute(self) {
        (self.run)()
    }
}

/// Single-shot handle to a posted job's eventual result
///
/// Dropping the handle abandons interest in the result without affecting the
/// job's execution.
pub struct JobHandle<T> {
    pub(crate) rx: oneshot::Receiver<Result<T, BoxError>>,
}

impl<T> JobHandle<T> {
    /// Await the job's completion
    pub async fn wait(self) -> Result<T, JobError> {
        finish(self.rx.await)
    }

    /// Block the current thread until the job completes.
    ///
    /// Must not be called from an async runtime thread; use [`wait`](Self::wait)
    /// there instead.
    pub fn blocking_wait(self) -> Result<T, JobError> {
        finish(self.rx.blocking_recv())
    }
}

fn finish<T, E>(received: Result<Result<T, BoxError>, E>) -> Result<T, JobError> {
    match received {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(JobError::Failed(e)),
        Err(_) => Err(JobError::Abandoned),
    }
}
