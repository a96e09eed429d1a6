//! Collector and membership implementations for the standard families.

use std::collections::{BTreeSet, HashSet, VecDeque};
use std::hash::{BuildHasher, Hash};

use super::{Collector, Membership, SetAlgebra};

// =============================================================================
// HashSet Family
// =============================================================================

/// Covers `std::collections::HashSet` with any default-constructible hasher,
/// which also picks up drop-in replacements such as `rustc_hash::FxHashSet`.
impl<T, S> Collector<T> for HashSet<T, S>
where
    T: Eq + Hash,
    S: BuildHasher + Default,
{
    fn empty() -> Self {
        Self::with_hasher(S::default())
    }

    fn accumulate(mut self, element: T) -> Self {
        self.insert(element);
        self
    }

    fn combine(mut self, other: Self) -> Self {
        self.extend(other);
        self
    }
}

impl<T, S> Membership<T> for HashSet<T, S>
where
    T: Eq + Hash,
    S: BuildHasher,
{
    fn len(&self) -> usize {
        Self::len(self)
    }

    fn contains(&self, element: &T) -> bool {
        Self::contains(self, element)
    }

    fn remove(&mut self, element: &T) -> bool {
        Self::remove(self, element)
    }
}

impl<T, S> SetAlgebra for HashSet<T, S> {}

// =============================================================================
// BTreeSet Family
// =============================================================================

impl<T: Ord> Collector<T> for BTreeSet<T> {
    fn empty() -> Self {
        Self::new()
    }

    fn accumulate(mut self, element: T) -> Self {
        self.insert(element);
        self
    }

    fn combine(mut self, other: Self) -> Self {
        self.extend(other);
        self
    }
}

impl<T: Ord> Membership<T> for BTreeSet<T> {
    fn len(&self) -> usize {
        Self::len(self)
    }

    fn contains(&self, element: &T) -> bool {
        Self::contains(self, element)
    }

    fn remove(&mut self, element: &T) -> bool {
        Self::remove(self, element)
    }
}

impl<T> SetAlgebra for BTreeSet<T> {}

// =============================================================================
// Vec Family
// =============================================================================

impl<T> Collector<T> for Vec<T> {
    fn empty() -> Self {
        Self::new()
    }

    fn accumulate(mut self, element: T) -> Self {
        self.push(element);
        self
    }

    fn combine(mut self, other: Self) -> Self {
        self.extend(other);
        self
    }
}

impl<T: PartialEq> Membership<T> for Vec<T> {
    fn len(&self) -> usize {
        self.as_slice().len()
    }

    fn contains(&self, element: &T) -> bool {
        self.as_slice().contains(element)
    }

    fn remove(&mut self, element: &T) -> bool {
        match self.iter().position(|candidate| candidate == element) {
            Some(position) => {
                Self::remove(self, position);
                true
            }
            None => false,
        }
    }
}

// =============================================================================
// VecDeque Family
// =============================================================================

impl<T> Collector<T> for VecDeque<T> {
    fn empty() -> Self {
        Self::new()
    }

    fn accumulate(mut self, element: T) -> Self {
        self.push_back(element);
        self
    }

    fn combine(mut self, other: Self) -> Self {
        self.extend(other);
        self
    }
}

impl<T: PartialEq> Membership<T> for VecDeque<T> {
    fn len(&self) -> usize {
        Self::len(self)
    }

    fn contains(&self, element: &T) -> bool {
        Self::contains(self, element)
    }

    fn remove(&mut self, element: &T) -> bool {
        match self.iter().position(|candidate| candidate == element) {
            Some(position) => {
                Self::remove(self, position).is_some()
            }
            None => false,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
