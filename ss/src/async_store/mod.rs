//! Thread-safe store façade
//!
//! `AsyncStore` serializes every mutation onto one dedicated reducer worker
//! and hands back single-shot handles for completion. Slow subscriber work is
//! pushed onto a second queue and observed through a `SubscriptionHandle`.

mod core;
mod handle;

pub use core::AsyncStore;
pub use handle::SubscriptionHandle;
