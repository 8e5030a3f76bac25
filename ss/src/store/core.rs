//! Store - authoritative sequential state machine
//!
//! Holds an append-only history of state snapshots and applies one reducer
//! per dispatch. A dispatch is transactional: a rejected action leaves the
//! history untouched and runs no subscriber.

use std::marker::PhantomData;

use tracing::{debug, warn};

use crate::compose::{self, Composite, SubstateError};
use crate::reducer::{BoxError, Reducer};

use super::error::{StoreError, SubscriberError, SubscriberErrors};

/// Subscriber callback: zero-argument, runs after each committed dispatch
pub type Subscriber = Box<dyn FnMut() -> Result<(), BoxError> + Send>;

/// Single-threaded store driven by one reducer
///
/// The history always holds at least one entry: the default-constructed seed
/// state pushed at creation. Only the newest entry is observable.
pub struct Store<A, R: Reducer<A>> {
    reducer: R,
    history: Vec<R::State>,
    subscribers: Vec<Subscriber>,
    _action: PhantomData<fn(A)>,
}

impl<A, R: Reducer<A>> Store<A, R> {
    /// Create a store seeded with the default state
    ///
    /// `reducer` may be a single [`Reducer`] or a tuple of reducers, in which
    /// case the state is the tuple of their sub-states (see [`crate::compose`]).
    pub fn new(reducer: R) -> Self
    where
        R::State: Default,
    {
        Self {
            reducer,
            history: vec![R::State::default()],
            subscribers: Vec::new(),
            _action: PhantomData,
        }
    }

    /// Current state: the newest history entry
    pub fn state(&self) -> &R::State {
        self.history
            .last()
            .expect("history holds at least the seed state")
    }

    /// History length, including the seed entry
    pub fn depth(&self) -> usize {
        self.history.len()
    }

    /// Apply `action` through the reducer and notify subscribers.
    ///
    /// On a reducer error nothing is committed and no subscriber runs. On
    /// success the new state is committed first; subscriber failures are then
    /// collected over the full pass and reported together as
    /// [`StoreError::Subscribers`] without rolling the commit back.
    pub fn dispatch(&mut self, action: A) -> Result<(), StoreError> {
        let next = self
            .reducer
            .reduce(self.state(), &action)
            .map_err(|e| StoreError::Reducer(Box::new(e)))?;

        self.history.push(next);
        debug!(depth = self.history.len(), "state committed");

        self.notify()
    }

    /// Drop the newest state, back to the previous one.
    ///
    /// Returns `false` (and does nothing) when only the seed entry remains.
    pub fn revert(&mut self) -> bool {
        if self.history.len() == 1 {
            false
        } else {
            self.history.pop();
            debug!(depth = self.history.len(), "state reverted");
            true
        }
    }

    /// Register `callback` to run after every committed dispatch.
    ///
    /// Subscribers run synchronously, in registration order, for the lifetime
    /// of the store; there is no unsubscribe.
    pub fn subscribe<F>(&mut self, callback: F)
    where
        F: FnMut() -> Result<(), BoxError> + Send + 'static,
    {
        self.subscribers.push(Box::new(callback));
    }

    fn notify(&mut self) -> Result<(), StoreError> {
        let mut failures = Vec::new();
        for (index, subscriber) in self.subscribers.iter_mut().enumerate() {
            if let Err(error) = subscriber() {
                warn!(index, %error, "subscriber failed");
                failures.push(SubscriberError { index, error });
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(SubscriberErrors { failures }.into())
        }
    }
}

impl<A, R> Store<A, R>
where
    R: Reducer<A>,
    R::State: Composite,
{
    /// Borrow the unique sub-state of type `T` from a composite state
    pub fn substate<T: 'static>(&self) -> Result<&T, SubstateError> {
        compose::substate(self.state())
    }
}
