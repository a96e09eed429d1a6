//! Collector type classes and the reducer registry.
//!
//! A deferred collection is generic over the concrete family it materializes
//! into. Each family carries its fold specification as a [`Collector`]
//! implementation (identity, singleton, associative merge) and its query
//! hooks as a [`Membership`] implementation. The registry of standard
//! families lives in this module: `HashSet` (with any default-constructible
//! hasher), `BTreeSet`, `Vec`, and `VecDeque`.
//!
//! Value-level folds — reducing a collection into a scalar such as a joined
//! string or a count — use [`reducers::Reducer`] instead.
//!
//! # Laws
//!
//! For all `a`, `b`, `c` of a collector type `C`:
//!
//! ## Identity
//!
//! ```text
//! C::empty().combine(a) == a
//! a.combine(C::empty()) == a
//! ```
//!
//! ## Associativity
//!
//! ```text
//! (a.combine(b)).combine(c) == a.combine(b.combine(c))
//! ```
//!
//! # Examples
//!
//! ```rust
//! use deferra::collector::Collector;
//! use std::collections::HashSet;
//!
//! let left: HashSet<i32> = Collector::collect_seq([1, 2]);
//! let right: HashSet<i32> = Collector::collect_seq([2, 3]);
//!
//! let merged = left.combine(right);
//! assert_eq!(merged.len(), 3);
//! ```

mod families;
pub mod reducers;

pub use reducers::Reducer;

/// A type class for concrete collection families that can be built by an
/// associative fold.
///
/// `Collector` is the algebraic fold specification a deferred collection
/// carries: an identity element ([`empty`](Collector::empty)), a singleton
/// constructor, and an associative merge ([`combine`](Collector::combine)).
/// Materializing a backing sequence folds every element through
/// [`accumulate`](Collector::accumulate) in sequence order.
pub trait Collector<T>: IntoIterator<Item = T> + Sized {
    /// Returns the identity element for this family.
    fn empty() -> Self;

    /// Adds one element to the collection.
    ///
    /// For set families this deduplicates; for sequence families it appends.
    #[must_use]
    fn accumulate(self, element: T) -> Self;

    /// Merges two collections of the same family.
    ///
    /// This operation must be associative.
    #[must_use]
    fn combine(self, other: Self) -> Self;

    /// Builds a collection containing a single element.
    #[must_use]
    fn singleton(element: T) -> Self {
        Self::empty().accumulate(element)
    }

    /// Folds a sequence of elements into a collection, in sequence order.
    #[must_use]
    fn collect_seq<I>(iterator: I) -> Self
    where
        I: IntoIterator<Item = T>,
    {
        iterator.into_iter().fold(Self::empty(), Self::accumulate)
    }
}

/// Query hooks a concrete family supplies to the deferred operators.
pub trait Membership<T> {
    /// Returns the number of elements held.
    fn len(&self) -> usize;

    /// Returns `true` if no elements are held.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `true` if the collection holds the given element.
    fn contains(&self, element: &T) -> bool;

    /// Removes one occurrence of the given element, returning whether
    /// anything was removed.
    fn remove(&mut self, element: &T) -> bool;
}

/// Marker for families with set semantics.
///
/// Set algebra (`union`, `intersection`, `difference`,
/// `symmetric_difference`) is only offered for families where membership is
/// unique, so that the operators have their mathematical meaning.
pub trait SetAlgebra {}
