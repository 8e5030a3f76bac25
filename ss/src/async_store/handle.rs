//! SubscriptionHandle - collector for asynchronous subscriber results

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::Notify;
use tokio::time::{self, Instant};

use crate::queue::{JobError, JobHandle};

/// Collects the pending results of an asynchronously subscribed routine.
///
/// The reducer worker adds one entry per state change; any number of
/// consumers can wait on the entries, which are always consumed oldest-first.
/// Waiting re-raises the failure of the consumed entry, if it carried one.
#[derive(Default)]
pub struct SubscriptionHandle {
    pending: Mutex<VecDeque<JobHandle<()>>>,
    ready: Notify,
}

impl SubscriptionHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one pending subscriber invocation
    pub fn add(&self, result: JobHandle<()>) {
        self.pending().push_back(result);
        self.ready.notify_one();
    }

    /// Number of results collected and not yet consumed
    pub fn count(&self) -> usize {
        self.pending().len()
    }

    /// Consume the oldest pending result, waiting for one to exist first.
    ///
    /// Returns that invocation's failure, if any.
    pub async fn wait_one(&self) -> Result<(), JobError> {
        let handle = loop {
            let ready = self.ready.notified();
            if let Some(handle) = self.take_next() {
                break handle;
            }
            ready.await;
        };
        handle.wait().await
    }

    /// Timed [`wait_one`](Self::wait_one): `Ok(false)` when no result became
    /// ready within `timeout`, leaving the entry unconsumed.
    pub async fn wait_one_timeout(&self, timeout: Duration) -> Result<bool, JobError> {
        let deadline = Instant::now() + timeout;
        let Some(mut handle) = self.next_before(deadline).await else {
            return Ok(false);
        };

        match time::timeout_at(deadline, &mut handle.rx).await {
            Ok(received) => match received {
                Ok(Ok(())) => Ok(true),
                Ok(Err(e)) => Err(JobError::Failed(e)),
                Err(_) => Err(JobError::Abandoned),
            },
            Err(_) => {
                // not ready in time: put it back, still the oldest
                self.pending().push_front(handle);
                self.ready.notify_one();
                Ok(false)
            }
        }
    }

    /// Consume pending results, oldest first, until none remain.
    ///
    /// Returns immediately when the collector is already empty; stops at the
    /// first failing entry. Entries added while waiting are consumed too, so
    /// a producer that only makes progress when this consumer drains can
    /// deadlock against it.
    pub async fn wait_all(&self) -> Result<(), JobError> {
        loop {
            let Some(handle) = self.take_next() else {
                return Ok(());
            };
            handle.wait().await?;
        }
    }

    /// Timed [`wait_all`](Self::wait_all): `Ok(false)` once `timeout` elapses
    /// with an entry still unready; that entry stays unconsumed.
    pub async fn wait_all_timeout(&self, timeout: Duration) -> Result<bool, JobError> {
        let deadline = Instant::now() + timeout;
        loop {
            let Some(mut handle) = self.take_next() else {
                return Ok(true);
            };
            match time::timeout_at(deadline, &mut handle.rx).await {
                Ok(Ok(Ok(()))) => continue,
                Ok(Ok(Err(e))) => return Err(JobError::Failed(e)),
                Ok(Err(_)) => return Err(JobError::Abandoned),
                Err(_) => {
                    self.pending().push_front(handle);
                    self.ready.notify_one();
                    return Ok(false);
                }
            }
        }
    }

    /// Pop the oldest entry without holding the lock across any await
    fn take_next(&self) -> Option<JobHandle<()>> {
        self.pending().pop_front()
    }

    async fn next_before(&self, deadline: Instant) -> Option<JobHandle<()>> {
        loop {
            let ready = self.ready.notified();
            if let Some(handle) = self.take_next() {
                return Some(handle);
            }
            if time::timeout_at(deadline, ready).await.is_err() {
                return None;
            }
        }
    }

    fn pending(&self) -> MutexGuard<'_, VecDeque<JobHandle<()>>> {
        // a poisoned lock only means some consumer panicked mid-wait; the
        // queue itself is still coherent
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reducer::BoxError;
    use tokio::sync::oneshot;

    type ResultSender = oneshot::Sender<Result<(), BoxError>>;

    fn completed(result: Result<(), BoxError>) -> JobHandle<()> {
        let (tx, rx) = oneshot::channel();
        tx.send(result).ok();
        JobHandle { rx }
    }

    fn pending() -> (ResultSender, JobHandle<()>) {
        let (tx, rx) = oneshot::channel();
        (tx, JobHandle { rx })
    }

    #[tokio::test]
    async fn test_count_tracks_unconsumed_entries() {
        let collector = SubscriptionHandle::new();
        assert_eq!(collector.count(), 0);

        collector.add(completed(Ok(())));
        collector.add(completed(Ok(())));
        assert_eq!(collector.count(), 2);

        collector.wait_one().await.expect("entry should be ok");
        assert_eq!(collector.count(), 1);
    }

    #[tokio::test]
    async fn test_wait_one_consumes_oldest_first() {
        let collector = SubscriptionHandle::new();
        collector.add(completed(Err("oldest failed".into())));
        collector.add(completed(Ok(())));

        let err = collector
            .wait_one()
            .await
            .expect_err("oldest entry's failure expected");
        assert!(matches!(err, JobError::Failed(_)));

        collector.wait_one().await.expect("second entry is fine");
        assert_eq!(collector.count(), 0);
    }

    #[tokio::test]
    async fn test_wait_one_blocks_until_added() {
        let collector = std::sync::Arc::new(SubscriptionHandle::new());

        let waiter = {
            let collector = std::sync::Arc::clone(&collector);
            tokio::spawn(async move { collector.wait_one().await })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!waiter.is_finished());

        collector.add(completed(Ok(())));

        waiter
            .await
            .expect("waiter should not panic")
            .expect("entry should be ok");
    }

    #[tokio::test]
    async fn test_timed_wait_returns_false_without_consuming() {
        let collector = SubscriptionHandle::new();
        let (tx, handle) = pending();
        collector.add(handle);

        let consumed = collector
            .wait_one_timeout(Duration::from_millis(50))
            .await
            .expect("no failure yet");
        assert!(!consumed);
        assert_eq!(collector.count(), 1);

        // once the job completes, the same entry is consumable
        tx.send(Ok(())).ok();
        let consumed = collector
            .wait_one_timeout(Duration::from_millis(50))
            .await
            .expect("entry should be ok");
        assert!(consumed);
        assert_eq!(collector.count(), 0);
    }

    #[tokio::test]
    async fn test_timed_wait_with_empty_collector_times_out() {
        let collector = SubscriptionHandle::new();

        let consumed = collector
            .wait_one_timeout(Duration::from_millis(20))
            .await
            .expect("nothing to fail");
        assert!(!consumed);
    }

    #[tokio::test]
    async fn test_wait_all_drains_everything() {
        let collector = SubscriptionHandle::new();
        for _ in 0..3 {
            collector.add(completed(Ok(())));
        }

        collector.wait_all().await.expect("all entries ok");
        assert_eq!(collector.count(), 0);

        // empty collector: returns immediately
        collector.wait_all().await.expect("empty is ok");
    }

    #[tokio::test]
    async fn test_wait_all_timeout_leaves_unready_tail() {
        let collector = SubscriptionHandle::new();
        collector.add(completed(Ok(())));
        let (_tx, handle) = pending();
        collector.add(handle);

        let drained = collector
            .wait_all_timeout(Duration::from_millis(50))
            .await
            .expect("no failure");
        assert!(!drained);
        assert_eq!(collector.count(), 1);
    }
}
