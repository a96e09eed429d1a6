//! Deferred collection adapters.
//!
//! This module provides [`Deferred`], a collection handle whose backing
//! source may be an already materialized collection, a lazy pull sequence,
//! or a promise another worker completes later — plus the family aliases
//! over the standard collections:
//!
//! - [`DeferredHashSet`]: hash-set family
//! - [`DeferredBTreeSet`]: ordered-set family
//! - [`DeferredVec`]: vector family (preserves duplicates and order)
//! - [`DeferredVecDeque`]: FIFO queue family
//!
//! # Laziness
//!
//! Under the default [`Evaluation::Lazy`] strategy, deriving a collection
//! never pulls from the source; only operations that need a definite answer
//! (size, membership, iteration to exhaustion, conversion) force
//! materialization, exactly once:
//!
//! ```rust
//! use deferra::deferred::{Deferred, DeferredVec};
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! let pulls = Rc::new(Cell::new(0));
//! let observer = Rc::clone(&pulls);
//!
//! let numbers: DeferredVec<i32> = Deferred::from_sequence((0..3).map(move |value| {
//!     observer.set(observer.get() + 1);
//!     value
//! }));
//!
//! let shifted: DeferredVec<i32> = numbers.map(|value| value + 1);
//! assert_eq!(pulls.get(), 0); // deriving pulled nothing
//!
//! assert_eq!(shifted.to_vec().unwrap(), vec![1, 2, 3]);
//! shifted.force().unwrap();
//! assert_eq!(pulls.get(), 3); // materialized exactly once
//! ```
//!
//! # Completable collections
//!
//! A handle can be issued before its contents exist; see
//! [`Deferred::completable`] and the [`pending`](crate::pending) module.

mod collection;
mod evaluation;
mod queue;
mod set;
mod source;
mod vec;

pub use collection::Deferred;
pub use collection::DeferredIntoIterator;
pub use evaluation::Evaluation;
pub use queue::DeferredVecDeque;
pub use set::DeferredBTreeSet;
pub use set::DeferredHashSet;
pub use vec::DeferredVec;

#[cfg(feature = "fxhash")]
pub use set::DeferredFxHashSet;
