//! # deferra
//!
//! Deferred, lazy, and completable collection adapters over standard Rust
//! collections.
//!
//! ## Overview
//!
//! A [`Deferred`](deferred::Deferred) collection presents the full contract
//! of a concrete collection while its contents may still be:
//!
//! - **Concrete**: an already materialized `HashSet`, `BTreeSet`, `Vec`, or
//!   `VecDeque`
//! - **A lazy sequence**: a single-pass pull sequence consumed only when an
//!   operation needs a definite answer
//! - **Pending**: a result another worker delivers later through a
//!   [`Completer`](pending::Completer)
//!
//! Structural operators (`map`, `filter`, `zip`, `grouped`, `sliding`, set
//! algebra, …) chain in O(1) without pulling from the source; forcing is
//! memoized, and a materialization failure is pinned and re-raised on every
//! later access.
//!
//! ## Example
//!
//! ```rust
//! use deferra::prelude::*;
//!
//! let windows: DeferredVec<Vec<i32>> = DeferredVec::of([1, 2, 3]).sliding(2);
//! assert_eq!(windows.to_vec().unwrap(), vec![vec![1, 2], vec![2, 3]]);
//!
//! let union: DeferredHashSet<i32> = DeferredHashSet::of([1, 2, 3]).union(DeferredHashSet::of([2, 3, 4]));
//! assert_eq!(union.len().unwrap(), 4);
//! ```
//!
//! ## Feature Flags
//!
//! - `async`: awaitable materialization (`force_async`) and stream-fed
//!   completion (enabled by default)
//! - `fxhash`: `DeferredFxHashSet` alias over the Fx hasher
//! - `tracing`: trace events at materialization and completion points

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Prelude module for convenient imports.
///
/// Re-exports commonly used types and traits.
///
/// # Usage
///
/// ```rust
/// use deferra::prelude::*;
/// ```
pub mod prelude {
    pub use crate::collector::{Collector, Membership, Reducer, SetAlgebra};
    pub use crate::deferred::{
        Deferred, DeferredBTreeSet, DeferredHashSet, DeferredVec, DeferredVecDeque, Evaluation,
    };
    pub use crate::error::DeferredError;
    pub use crate::pending::Completer;

    #[cfg(feature = "fxhash")]
    pub use crate::deferred::DeferredFxHashSet;
}

pub mod collector;
pub mod deferred;
pub mod error;
pub mod pending;
