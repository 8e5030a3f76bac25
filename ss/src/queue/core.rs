//! SerialQueue - single-consumer executor with a dedicated worker thread
//!
//! Jobs execute strictly in post order, one at a time. The worker is an OS
//! thread so a slow or blocking job never stalls an async runtime; posters
//! and waiters stay fully async.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use thiserror::Error;
use tokio::sync::mpsc;
use tracing::debug;

use crate::reducer::BoxError;

use super::job::{Job, JobHandle};

/// Queue construction failure
#[derive(Debug, Error)]
pub enum QueueError {
    /// The OS refused to spawn the worker thread
    #[error("failed to spawn the worker thread: {0}")]
    Spawn(#[from] std::io::Error),
}

/// Cloneable posting side of a [`SerialQueue`]
///
/// Clones may outlive the queue itself; jobs posted after shutdown are
/// abandoned rather than executed.
#[derive(Clone)]
pub struct QueueHandle {
    tx: mpsc::UnboundedSender<Job>,
}

impl QueueHandle {
    /// Enqueue `op` and immediately return a handle to its eventual result.
    ///
    /// Never blocks. An operation error is delivered through the handle and
    /// leaves the worker running; the next job executes normally.
    pub fn post<T, F>(&self, op: F) -> JobHandle<T>
    where
        F: FnOnce() -> Result<T, BoxError> + Send + 'static,
        T: Send + 'static,
    {
        let (job, handle) = Job::new(op);
        if self.tx.send(job).is_err() {
            debug!("posted to a stopped queue, job abandoned");
        }
        handle
    }
}

/// Active Object: a FIFO work queue consumed by one dedicated worker thread
pub struct SerialQueue {
    handle: QueueHandle,
    quit: Arc<AtomicBool>,
    worker: Option<thread::JoinHandle<()>>,
}

impl SerialQueue {
    /// Spawn a queue with the default worker thread name
    pub fn spawn() -> Result<Self, QueueError> {
        Self::named("serial-queue")
    }

    /// Spawn a queue whose worker thread carries `name`
    pub fn named(name: &str) -> Result<Self, QueueError> {
        let (tx, rx) = mpsc::unbounded_channel();
        let quit = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&quit);
        let worker = thread::Builder::new()
            .name(name.to_string())
            .spawn(move || worker_loop(rx, &flag))?;

        debug!(name, "serial queue started");
        Ok(Self {
            handle: QueueHandle { tx },
            quit,
            worker: Some(worker),
        })
    }

    /// A cloneable posting handle
    pub fn handle(&self) -> QueueHandle {
        self.handle.clone()
    }

    /// Enqueue `op`; see [`QueueHandle::post`]
    pub fn post<T, F>(&self, op: F) -> JobHandle<T>
    where
        F: FnOnce() -> Result<T, BoxError> + Send + 'static,
        T: Send + 'static,
    {
        self.handle.post(op)
    }

    /// Ask the worker to stop. Idempotent.
    ///
    /// The job currently executing finishes; everything still queued is
    /// abandoned and reports [`super::JobError::Abandoned`].
    pub fn shutdown(&self) {
        if !self.quit.swap(true, Ordering::AcqRel) {
            // wake the worker in case it is parked on an empty queue
            let _ = self.handle.tx.send(Job::wake());
            debug!("serial queue shutdown requested");
        }
    }

    /// Stop the worker and wait for it to exit
    pub fn join(mut self) {
        self.shutdown();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

impl Drop for SerialQueue {
    fn drop(&mut self) {
        self.shutdown();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

fn worker_loop(mut rx: mpsc::UnboundedReceiver<Job>, quit: &AtomicBool) {
    debug!("worker ready");
    while let Some(job) = rx.blocking_recv() {
        if quit.load(Ordering::Acquire) {
            break;
        }
        job.execute();
    }
    // jobs left behind are dropped here and resolve as abandoned
    debug!("worker stopped");
}
