//! Serial execution queue: the Active Object primitive
//!
//! One dedicated worker thread drains a FIFO of posted jobs; each job carries
//! a single-shot result channel back to the poster.

mod core;
mod job;

pub use core::{QueueError, QueueHandle, SerialQueue};
pub use job::{JobError, JobHandle};
