//! Set families and set algebra.
//!
//! Set algebra is written once, generically over any family marked with
//! [`SetAlgebra`]; the family modules contribute only their aliases. The
//! operators need concrete membership structure on both operands, so they
//! are never pure lazy views: under the lazy strategy both sides
//! materialize at first access, under the eager strategy immediately.

use std::collections::hash_map::RandomState;
use std::collections::{BTreeSet, HashSet};

use crate::collector::{Collector, Membership, SetAlgebra};
use crate::error::DeferredError;

use super::collection::{Deferred, rewrap};

/// A deferred hash set, materializing into `std::collections::HashSet`.
pub type DeferredHashSet<T, S = RandomState> = Deferred<T, HashSet<T, S>>;

/// A deferred ordered set, materializing into `std::collections::BTreeSet`.
pub type DeferredBTreeSet<T> = Deferred<T, BTreeSet<T>>;

/// A deferred hash set over the Fx hasher.
#[cfg(feature = "fxhash")]
pub type DeferredFxHashSet<T> = Deferred<T, rustc_hash::FxHashSet<T>>;

impl<T, C> Deferred<T, C>
where
    T: Clone + 'static,
    C: Collector<T> + Membership<T> + SetAlgebra + 'static,
    for<'a> &'a C: IntoIterator<Item = &'a T>,
{
    /// Returns the union of two sets: the elements in either.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use deferra::deferred::DeferredHashSet;
    ///
    /// let left = DeferredHashSet::of([1, 2, 3]);
    /// let right = DeferredHashSet::of([2, 3, 4]);
    ///
    /// let union: DeferredHashSet<i32> = left.union(right);
    /// assert_eq!(union.len().unwrap(), 4);
    /// ```
    #[must_use]
    pub fn union(self, other: Self) -> Self {
        self.merged_with(other, C::combine)
    }

    /// Returns the intersection of two sets: the elements in both.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use deferra::deferred::DeferredHashSet;
    ///
    /// let left = DeferredHashSet::of([1, 2, 3]);
    /// let right = DeferredHashSet::of([2, 3, 4]);
    ///
    /// let intersection: DeferredHashSet<i32> = left.intersection(right);
    /// assert!(intersection.contains(&2).unwrap());
    /// assert_eq!(intersection.len().unwrap(), 2);
    /// ```
    #[must_use]
    pub fn intersection(self, other: Self) -> Self {
        self.merged_with(other, |left, right| {
            // Iterate over the smaller operand for better performance
            let (smaller, larger) = if left.len() <= right.len() {
                (left, right)
            } else {
                (right, left)
            };
            C::collect_seq(
                smaller
                    .into_iter()
                    .filter(|element| larger.contains(element)),
            )
        })
    }

    /// Returns the difference of two sets: the elements of `self` not in
    /// `other`.
    #[must_use]
    pub fn difference(self, other: Self) -> Self {
        self.merged_with(other, |left, right| {
            C::collect_seq(
                left.into_iter()
                    .filter(|element| !right.contains(element)),
            )
        })
    }

    /// Returns the symmetric difference of two sets: the elements in
    /// exactly one of them.
    #[must_use]
    pub fn symmetric_difference(self, other: Self) -> Self {
        self.merged_with(other, |left, right| {
            let mut result = C::empty();
            for element in &left {
                if !right.contains(element) {
                    result = result.accumulate(element.clone());
                }
            }
            for element in &right {
                if !left.contains(element) {
                    result = result.accumulate(element.clone());
                }
            }
            result
        })
    }

    fn merged_with(self, other: Self, operation: impl FnOnce(C, C) -> C + 'static) -> Self {
        let evaluation = self.evaluation();
        rewrap(
            Box::new(MergedSeq {
                inputs: Some((self, other, operation)),
                output: None,
            }),
            evaluation,
        )
    }
}

/// Sequence that materializes both operands of a binary set operation at
/// first pull, then streams the combined result.
struct MergedSeq<T, C: IntoIterator<Item = T>, F> {
    inputs: Option<(Deferred<T, C>, Deferred<T, C>, F)>,
    output: Option<<C as IntoIterator>::IntoIter>,
}

impl<T, C, F> Iterator for MergedSeq<T, C, F>
where
    T: 'static,
    C: Collector<T> + 'static,
    F: FnOnce(C, C) -> C,
{
    type Item = Result<T, DeferredError>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some((left, right, operation)) = self.inputs.take() {
            let merged = left
                .into_concrete()
                .and_then(|left| right.into_concrete().map(|right| operation(left, right)));
            match merged {
                Ok(collection) => self.output = Some(collection.into_iter()),
                Err(error) => return Some(Err(error)),
            }
        }
        self.output.as_mut()?.next().map(Ok)
    }
}
