//! statestore - Redux-style state container with an active-object dispatch queue
//!
//! A store owns an append-only history of immutable state snapshots and
//! derives each new snapshot by running a pure reducer over the dispatched
//! action. The asynchronous variant serializes every dispatch onto one
//! dedicated worker and reports completion through single-shot handles.
//!
//! # Architecture
//!
//! ```text
//! caller ──dispatch(action)──> Store ──reducer──> history.push(next)
//!                                │                      │
//!                                └── subscribers (sync, in order)
//!
//! caller ──dispatch(action)──> AsyncStore ──post──> SerialQueue worker
//!                                   │                    │
//!                              JobHandle <───result──────┘
//!                                   │
//!                  subscribe_async ──post──> subscriber SerialQueue
//!                                   │
//!                          SubscriptionHandle (collected results)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use statestore::{FnReducer, Store};
//!
//! let balance = FnReducer::new(|state: &i64, op: &Op| -> Result<i64, Overdraw> { ... });
//! let tally = FnReducer::new(|state: &u32, _: &Op| -> Result<u32, Infallible> { Ok(state + 1) });
//!
//! let mut store = Store::new((balance, tally));
//! store.dispatch(Op::Deposit(10))?;
//! assert_eq!(store.state().0, 10);
//! store.revert();
//! ```
//!
//! # Modules
//!
//! - [`reducer`] - the `Reducer` trait and closure adapter
//! - [`compose`] - tuples of reducers over heterogeneous sub-states
//! - [`store`] - the synchronous store: history, dispatch, revert, subscribers
//! - [`queue`] - `SerialQueue`, the Active Object execution primitive
//! - [`async_store`] - thread-safe façade and subscription collector

pub mod async_store;
pub mod cli;
pub mod compose;
pub mod config;
pub mod queue;
pub mod reducer;
pub mod store;

pub use async_store::{AsyncStore, SubscriptionHandle};
pub use compose::{Composite, SlotError, SubstateError};
pub use queue::{JobError, JobHandle, QueueError, QueueHandle, SerialQueue};
pub use reducer::{BoxError, FnReducer, Reducer};
pub use store::{Store, StoreError, SubscriberError, SubscriberErrors};
