//! Value-level fold specifications.
//!
//! A [`Reducer`] is the runtime counterpart of the [`Collector`] type class:
//! an identity value, an associative merge, and a singleton constructor,
//! carried as a value instead of a trait implementation. Reducers are what
//! `fold_with` consumes, and they cover scalar targets (joined strings,
//! counts, totals) that no collection family models.
//!
//! # Examples
//!
//! ```rust
//! use deferra::collector::reducers;
//!
//! let joined = reducers::joining::<i32>(", ").reduce([1, 2, 3]);
//! assert_eq!(joined, "1, 2, 3");
//!
//! let total = reducers::summing::<i32>().reduce([1, 2, 3]);
//! assert_eq!(total, 6);
//! ```

use std::collections::{BTreeSet, HashSet, VecDeque};
use std::fmt;
use std::ops::Add;

use super::Collector;

/// An associative fold specification carried as a value.
///
/// # Type Parameters
///
/// * `T` - The element type consumed by the fold
/// * `R` - The result type produced by the fold
pub struct Reducer<T, R> {
    empty: R,
    merge: Box<dyn Fn(R, R) -> R>,
    singleton: Box<dyn Fn(T) -> R>,
}

impl<T, R: Clone> Reducer<T, R> {
    /// Creates a reducer from its identity value, merge operation, and
    /// singleton constructor.
    ///
    /// The merge operation must be associative and `empty` must be its
    /// identity.
    pub fn of(
        empty: R,
        merge: impl Fn(R, R) -> R + 'static,
        singleton: impl Fn(T) -> R + 'static,
    ) -> Self {
        Self {
            empty,
            merge: Box::new(merge),
            singleton: Box::new(singleton),
        }
    }

    /// Returns a fresh copy of the identity value.
    #[must_use]
    pub fn identity(&self) -> R {
        self.empty.clone()
    }

    /// Merges two partial results.
    #[must_use]
    pub fn combine(&self, left: R, right: R) -> R {
        (self.merge)(left, right)
    }

    /// Lifts a single element into the result type.
    #[must_use]
    pub fn unit(&self, element: T) -> R {
        (self.singleton)(element)
    }

    /// Folds a sequence of elements, in sequence order.
    ///
    /// Returns the identity value for an empty sequence.
    #[must_use]
    pub fn reduce<I>(&self, iterator: I) -> R
    where
        I: IntoIterator<Item = T>,
    {
        iterator
            .into_iter()
            .fold(self.identity(), |accumulator, element| {
                (self.merge)(accumulator, (self.singleton)(element))
            })
    }
}

// =============================================================================
// Family Reducers
// =============================================================================

macro_rules! family_reducer {
    ($($name:ident => $collection:ty, $label:literal;)+) => {
        paste::paste! {
            $(
                #[doc = concat!("Reducer folding elements into a ", $label, ".")]
                #[must_use]
                pub fn [<to_ $name>]<T: 'static>() -> Reducer<T, $collection>
                where
                    $collection: Collector<T> + Clone + 'static,
                {
                    Reducer::of(
                        <$collection as Collector<T>>::empty(),
                        <$collection as Collector<T>>::combine,
                        <$collection as Collector<T>>::singleton,
                    )
                }
            )+
        }
    };
}

family_reducer! {
    hash_set => HashSet<T>, "hash set";
    btree_set => BTreeSet<T>, "B-tree set";
    vec => Vec<T>, "vector";
    vec_deque => VecDeque<T>, "double-ended queue";
}

// =============================================================================
// Scalar Reducers
// =============================================================================

/// Reducer joining the display form of each element with a separator.
#[must_use]
pub fn joining<T: fmt::Display + 'static>(separator: impl Into<String>) -> Reducer<T, String> {
    let separator = separator.into();
    Reducer::of(
        String::new(),
        move |left, right| {
            if left.is_empty() {
                right
            } else if right.is_empty() {
                left
            } else {
                format!("{left}{separator}{right}")
            }
        },
        |element: T| element.to_string(),
    )
}

/// Reducer counting elements.
#[must_use]
pub fn counting<T: 'static>() -> Reducer<T, usize> {
    Reducer::of(0, |left, right| left + right, |_| 1)
}

/// Reducer totalling elements under addition, starting from the default
/// value of `T` (zero for the numeric types).
#[must_use]
pub fn summing<T>() -> Reducer<T, T>
where
    T: Add<Output = T> + Default + Clone + 'static,
{
    Reducer::of(T::default(), |left, right| left + right, |element| element)
}
