//! Reducer composition across heterogeneous sub-states
//!
//! A tuple of reducers is itself a [`Reducer`] whose state is the tuple of the
//! sub-states, slot for slot in declaration order. Each sub-reducer only ever
//! sees its own slot, so one dispatch updates every slot independently:
//!
//! ```ignore
//! let store = Store::new((balance, tally));
//! store.dispatch(Op::Deposit(10))?;
//! let (balance, tally) = store.state();
//! ```

use std::any::{self, Any};

use thiserror::Error;

use crate::reducer::{BoxError, Reducer};

/// Failure of one sub-reducer inside a composite reduction
///
/// The store treats this like any other reducer error, so a single failing
/// slot leaves every slot unchanged.
#[derive(Debug, Error)]
#[error("reducer in slot {slot} rejected the action: {source}")]
pub struct SlotError {
    /// Zero-based position of the failing reducer in the tuple
    pub slot: usize,
    #[source]
    source: BoxError,
}

impl SlotError {
    fn new(slot: usize, source: impl Into<BoxError>) -> Self {
        Self {
            slot,
            source: source.into(),
        }
    }

    /// The underlying sub-reducer error
    pub fn inner(&self) -> &BoxError {
        &self.source
    }
}

/// Error from by-type sub-state lookup
#[derive(Debug, Error)]
pub enum SubstateError {
    /// No slot holds the requested type
    #[error("no sub-state of type {0}")]
    Missing(&'static str),

    /// More than one slot holds the requested type; use tuple indexing instead
    #[error("ambiguous sub-state: {count} slots hold a {type_name}")]
    Ambiguous {
        type_name: &'static str,
        count: usize,
    },
}

/// Composite state with runtime-inspectable slots
///
/// Implemented for the tuples produced by composed reducers; backs the
/// by-type accessors on `Store` and `AsyncStore`.
pub trait Composite {
    /// Number of sub-states
    fn arity(&self) -> usize;

    /// Borrow slot `index` as a type-erased value; panics if out of range
    fn slot(&self, index: usize) -> &dyn Any;
}

/// Find the unique slot of `state` holding a `T`
pub fn substate<T, S>(state: &S) -> Result<&T, SubstateError>
where
    T: 'static,
    S: Composite + ?Sized,
{
    let mut first = None;
    let mut count = 0;
    for index in 0..state.arity() {
        if let Some(value) = state.slot(index).downcast_ref::<T>() {
            if first.is_none() {
                first = Some(value);
            }
            count += 1;
        }
    }
    match (first, count) {
        (Some(value), 1) => Ok(value),
        (Some(_), count) => Err(SubstateError::Ambiguous {
            type_name: any::type_name::<T>(),
            count,
        }),
        (None, _) => Err(SubstateError::Missing(any::type_name::<T>())),
    }
}

macro_rules! impl_composite {
    ($len:expr, $( $R:ident => $idx:tt ),+) => {
        impl<A, $($R),+> Reducer<A> for ($($R,)+)
        where
            $($R: Reducer<A>,)+
        {
            type State = ($($R::State,)+);
            type Error = SlotError;

            fn reduce(&self, state: &Self::State, action: &A) -> Result<Self::State, SlotError> {
                Ok((
                    $(
                        self.$idx
                            .reduce(&state.$idx, action)
                            .map_err(|e| SlotError::new($idx, e))?,
                    )+
                ))
            }
        }

        impl<$($R: 'static),+> Composite for ($($R,)+) {
            fn arity(&self) -> usize {
                $len
            }

            fn slot(&self, index: usize) -> &dyn Any {
                match index {
                    $( $idx => &self.$idx, )+
                    _ => panic!("slot index {index} out of range for arity {}", $len),
                }
            }
        }
    };
}

impl_composite!(1, R0 => 0);
impl_composite!(2, R0 => 0, R1 => 1);
impl_composite!(3, R0 => 0, R1 => 1, R2 => 2);
impl_composite!(4, R0 => 0, R1 => 1, R2 => 2, R3 => 3);
impl_composite!(5, R0 => 0, R1 => 1, R2 => 2, R3 => 3, R4 => 4);
impl_composite!(6, R0 => 0, R1 => 1, R2 => 2, R3 => 3, R4 => 4, R5 => 5);
impl_composite!(7, R0 => 0, R1 => 1, R2 => 2, R3 => 3, R4 => 4, R5 => 5, R6 => 6);
impl_composite!(8, R0 => 0, R1 => 1, R2 => 2, R3 => 3, R4 => 4, R5 => 5, R6 => 6, R7 => 7);
impl_composite!(9, R0 => 0, R1 => 1, R2 => 2, R3 => 3, R4 => 4, R5 => 5, R6 => 6, R7 => 7, R8 => 8);
impl_composite!(10, R0 => 0, R1 => 1, R2 => 2, R3 => 3, R4 => 4, R5 => 5, R6 => 6, R7 => 7, R8 => 8, R9 => 9);
impl_composite!(11, R0 => 0, R1 => 1, R2 => 2, R3 => 3, R4 => 4, R5 => 5, R6 => 6, R7 => 7, R8 => 8, R9 => 9, R10 => 10);
impl_composite!(12, R0 => 0, R1 => 1, R2 => 2, R3 => 3, R4 => 4, R5 => 5, R6 => 6, R7 => 7, R8 => 8, R9 => 9, R10 => 10, R11 => 11);
