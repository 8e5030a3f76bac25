//! AsyncStore - store façade whose mutations run on a dedicated worker

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::debug;

use crate::compose::{Composite, SubstateError};
use crate::queue::{JobHandle, QueueError, SerialQueue};
use crate::reducer::{BoxError, Reducer};
use crate::store::Store;

use super::handle::SubscriptionHandle;

/// Thread-safe store: dispatch from any thread, reduce on one
///
/// All mutation is serialized onto an internal [`SerialQueue`]; a mutex
/// additionally guards the store so the direct [`state`](Self::state) read
/// path can run concurrently with a dispatch in flight.
///
/// Reducers run on the worker, so they must not block on anything that in
/// turn waits for this store.
pub struct AsyncStore<A, R: Reducer<A>> {
    store: Arc<Mutex<Store<A, R>>>,
    reducers: SerialQueue,
}

impl<A, R> AsyncStore<A, R>
where
    A: Send + 'static,
    R: Reducer<A> + Send + 'static,
    R::State: Send + 'static,
{
    /// Create the store, seeded with the default state, and spawn its
    /// reducer worker
    pub fn spawn(reducer: R) -> Result<Self, QueueError>
    where
        R::State: Default,
    {
        Ok(Self {
            store: Arc::new(Mutex::new(Store::new(reducer))),
            reducers: SerialQueue::named("store-reducer")?,
        })
    }

    /// Apply `action` on the reducer worker.
    ///
    /// The returned handle resolves once the reducer and every synchronous
    /// subscriber have run. A rejected action surfaces as
    /// [`JobError::Failed`](crate::queue::JobError::Failed) carrying the
    /// [`StoreError`](crate::store::StoreError), with the state unchanged.
    /// Dropping the handle hides the outcome from the caller but never
    /// corrupts the store.
    pub fn dispatch(&self, action: A) -> JobHandle<()> {
        let store = Arc::clone(&self.store);
        self.reducers.post(move || {
            let mut store = store.lock().unwrap_or_else(PoisonError::into_inner);
            store.dispatch(action).map_err(Into::into)
        })
    }

    /// Snapshot of the current state
    pub fn state(&self) -> R::State
    where
        R::State: Clone,
    {
        self.lock().state().clone()
    }

    /// History length, including the seed entry
    pub fn depth(&self) -> usize {
        self.lock().depth()
    }

    /// Snapshot of the unique sub-state of type `T` from a composite state
    pub fn substate<T>(&self) -> Result<T, SubstateError>
    where
        R::State: Composite,
        T: Clone + 'static,
    {
        self.lock().substate::<T>().cloned()
    }

    /// Register a subscriber that runs on the reducer worker, synchronously
    /// with each state change.
    ///
    /// Keep it fast: it holds up every later dispatch. Move slow work to
    /// [`subscribe_async`](Self::subscribe_async).
    pub fn subscribe_sync<F>(&self, callback: F)
    where
        F: FnMut() -> Result<(), BoxError> + Send + 'static,
    {
        self.lock().subscribe(callback);
    }

    /// Register `op` to run on `subscriber` - a separate queue - after each
    /// state change.
    ///
    /// Every invocation's result lands in the returned collector; drop the
    /// collector if you don't care, and the invocations degrade to
    /// fire-and-forget. If `subscriber` shuts down first, recorded entries
    /// resolve as abandoned.
    pub fn subscribe_async<F>(&self, subscriber: &SerialQueue, op: F) -> Arc<SubscriptionHandle>
    where
        F: Fn() -> Result<(), BoxError> + Send + Clone + 'static,
    {
        let results = Arc::new(SubscriptionHandle::new());
        let collector = Arc::downgrade(&results);
        let subscriber = subscriber.handle();

        self.lock().subscribe(move || {
            let invocation = subscriber.post(op.clone());
            if let Some(collector) = collector.upgrade() {
                collector.add(invocation);
            }
            Ok(())
        });

        results
    }

    /// Stop the reducer worker. Dispatches still queued are abandoned.
    ///
    /// Dropping the store does the same and also joins the worker.
    pub fn shutdown(&self) {
        debug!("async store shutting down");
        self.reducers.shutdown();
    }

    fn lock(&self) -> MutexGuard<'_, Store<A, R>> {
        // a poisoned lock means a subscriber panicked; the history is intact
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
