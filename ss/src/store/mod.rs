//! Synchronous store: sequential state machine with history and subscribers

mod core;
mod error;

pub use core::{Store, Subscriber};
pub use error::{StoreError, SubscriberError, SubscriberErrors};
