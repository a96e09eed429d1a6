//! The deferred collection core.
//!
//! [`Deferred<T, C>`] presents the contract of a concrete collection of
//! family `C` while its contents may still be a lazy pull sequence or a
//! result another worker has not delivered yet. Structural operators chain
//! in O(1) by composing onto the backing sequence; operations that need a
//! definite answer (size, membership, conversion) force materialization,
//! which is memoized.
//!
//! # Examples
//!
//! ```rust
//! use deferra::deferred::DeferredHashSet;
//!
//! let evens: DeferredHashSet<i32> = DeferredHashSet::<i32>::from_sequence(0..10)
//!     .filter(|value| value % 2 == 0)
//!     .map(|value| value * 10);
//!
//! // Nothing has been pulled yet; `contains` forces and memoizes.
//! assert!(evens.contains(&40).unwrap());
//! assert_eq!(evens.len().unwrap(), 5);
//! ```
//!
//! # Single Consumption
//!
//! A sequence-backed collection is single-pass. Structural operators take
//! the receiver by value, so ownership enforces the single-consumption rule
//! at compile time; the remaining dynamic case — a user closure reentering
//! the collection being materialized — fails fast with
//! [`DeferredError::DoubleConsumption`].

use std::cell::RefCell;
use std::cmp::Ordering;
use std::collections::{HashSet, VecDeque};
use std::fmt;
use std::hash::Hash;

use crate::collector::{Collector, Membership, Reducer};
use crate::error::DeferredError;
use crate::pending::Completer;
use crate::pending::promise::Promise;

use super::evaluation::Evaluation;
use super::source::{LazySeq, Source};

// =============================================================================
// Deferred Definition
// =============================================================================

/// A collection handle whose concrete contents may not exist yet.
///
/// The handle pairs a backing source (concrete collection, lazy sequence,
/// or pending promise) with a materialization strategy ([`Evaluation`]) and
/// the family collector that knows how to reduce a sequence into `C`.
///
/// # Type Parameters
///
/// * `T` - The element type
/// * `C` - The concrete family materialized into, e.g. `HashSet<T>` or
///   `Vec<T>`; it supplies the fold through its
///   [`Collector`](crate::collector::Collector) implementation
///
/// # Choosing the target family
///
/// Type-changing operators such as [`map`](Deferred::map) leave the result
/// family to inference, exactly like [`Iterator::collect`]:
///
/// ```rust
/// use deferra::deferred::{DeferredHashSet, DeferredVec};
///
/// let words: DeferredVec<&str> = DeferredVec::of(["a", "bb", "bb"]);
/// let lengths: DeferredHashSet<usize> = words.map(|word| word.len());
///
/// assert_eq!(lengths.len().unwrap(), 2);
/// ```
///
/// # Thread Safety
///
/// A `Deferred` is a single-threaded handle; concurrency enters only
/// through [`completable`](Deferred::completable), whose
/// [`Completer`](crate::pending::Completer) side may live on another
/// thread.
pub struct Deferred<T, C> {
    source: RefCell<Source<T, C>>,
    evaluation: Evaluation,
}

// =============================================================================
// Construction
// =============================================================================

impl<T, C> Deferred<T, C>
where
    T: 'static,
    C: Collector<T> + 'static,
{
    pub(crate) fn from_parts(source: Source<T, C>, evaluation: Evaluation) -> Self {
        Self {
            source: RefCell::new(source),
            evaluation,
        }
    }

    /// Creates an empty collection.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use deferra::deferred::DeferredVec;
    ///
    /// let empty: DeferredVec<i32> = DeferredVec::empty();
    /// assert!(empty.is_empty().unwrap());
    /// ```
    #[must_use]
    pub fn empty() -> Self {
        Self::from_parts(Source::Concrete(C::empty()), Evaluation::default())
    }

    /// Creates a collection over the given elements.
    ///
    /// The elements are wrapped as a lazy sequence; the family fold
    /// (deduplication for sets, ordering for sorted families) runs at
    /// materialization time.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use deferra::deferred::DeferredHashSet;
    ///
    /// let set: DeferredHashSet<i32> = DeferredHashSet::of([1, 1, 2, 3]);
    /// assert_eq!(set.len().unwrap(), 3);
    /// ```
    #[must_use]
    pub fn of<I>(elements: I) -> Self
    where
        I: IntoIterator<Item = T>,
        I::IntoIter: 'static,
    {
        Self::from_parts(
            Source::Sequence(Box::new(elements.into_iter().map(Ok))),
            Evaluation::default(),
        )
    }

    /// Creates a collection containing a single element.
    #[must_use]
    pub fn singleton(element: T) -> Self {
        Self::from_parts(Source::Concrete(C::singleton(element)), Evaluation::default())
    }

    /// Wraps an already materialized collection, without copying.
    #[must_use]
    pub fn from_concrete(collection: C) -> Self {
        Self::from_parts(Source::Concrete(collection), Evaluation::default())
    }

    /// Wraps a pull sequence. The sequence is not touched until an
    /// operation needs concrete contents.
    ///
    /// The sequence may be infinite; callers must bound it (for example
    /// with [`take`](Deferred::take)) before forcing materialization.
    #[must_use]
    pub fn from_sequence(sequence: impl Iterator<Item = T> + 'static) -> Self {
        Self::from_parts(
            Source::Sequence(Box::new(sequence.map(Ok))),
            Evaluation::default(),
        )
    }

    /// Wraps a fallible pull sequence. The first `Err` item aborts
    /// materialization and pins the collection's failed state.
    #[must_use]
    pub fn from_try_sequence(
        sequence: impl Iterator<Item = Result<T, DeferredError>> + 'static,
    ) -> Self {
        Self::from_parts(Source::Sequence(Box::new(sequence)), Evaluation::default())
    }

    /// Defers the construction of an entire collection.
    ///
    /// The supplier runs on first pull, so even deciding *which* collection
    /// to produce is deferred.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use deferra::deferred::DeferredVec;
    ///
    /// let lazy: DeferredVec<i32> = DeferredVec::defer(|| DeferredVec::of([1, 2, 3]));
    /// assert_eq!(lazy.len().unwrap(), 3);
    /// ```
    #[must_use]
    pub fn defer<F>(supplier: F) -> Self
    where
        F: FnOnce() -> Self + 'static,
    {
        let thunk = move || supplier().into_lazy_seq();
        Self::from_parts(
            Source::Sequence(Box::new(DeferSeq {
                supplier: Some(thunk),
                inner: None,
            })),
            Evaluation::default(),
        )
    }

    /// Creates a collection whose contents will be delivered later,
    /// together with the completion handle that delivers them.
    ///
    /// Any operation that needs concrete contents blocks until the
    /// completer fires; see the [`pending`](crate::pending) module.
    #[must_use]
    pub fn completable() -> (Self, Completer<C>) {
        let (promise, completer) = Promise::new();
        (
            Self::from_parts(Source::Pending(promise), Evaluation::default()),
            completer,
        )
    }

    /// Creates a collection by iterative application of a function to a
    /// seed, up to `limit` elements.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use deferra::deferred::DeferredVec;
    ///
    /// let powers: DeferredVec<i32> = DeferredVec::iterate(4, 1, |value| value * 2);
    /// assert_eq!(powers.to_vec().unwrap(), vec![1, 2, 4, 8]);
    /// ```
    #[must_use]
    pub fn iterate(limit: usize, seed: T, function: impl FnMut(&T) -> T + 'static) -> Self
    where
        T: Clone,
    {
        let mut function = function;
        Self::from_sequence(
            std::iter::successors(Some(seed), move |previous| Some(function(previous)))
                .take(limit),
        )
    }

    /// Creates a collection from a supplier, invoked up to `limit` times.
    #[must_use]
    pub fn generate(limit: usize, supplier: impl FnMut() -> T + 'static) -> Self {
        Self::from_sequence(std::iter::repeat_with(supplier).take(limit))
    }

    /// Unfolds a seed into a collection; the step function returns the next
    /// element and the next seed, or `None` to stop.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use deferra::deferred::DeferredVec;
    ///
    /// let countdown: DeferredVec<i32> = DeferredVec::unfold(3, |seed| {
    ///     (seed > 0).then(|| (seed, seed - 1))
    /// });
    /// assert_eq!(countdown.to_vec().unwrap(), vec![3, 2, 1]);
    /// ```
    #[must_use]
    pub fn unfold<U, F>(seed: U, step: F) -> Self
    where
        U: 'static,
        F: FnMut(U) -> Option<(T, U)> + 'static,
    {
        let mut step = step;
        let mut state = Some(seed);
        Self::from_sequence(std::iter::from_fn(move || {
            let current = state.take()?;
            let (element, next) = step(current)?;
            state = Some(next);
            Some(element)
        }))
    }
}

impl<C: Collector<i32> + 'static> Deferred<i32, C> {
    /// Creates a collection of the integers in `start..end`.
    #[must_use]
    pub fn range(start: i32, end: i32) -> Self {
        Self::from_sequence(start..end)
    }
}

impl<C: Collector<i64> + 'static> Deferred<i64, C> {
    /// Creates a collection of the integers in `start..end`.
    #[must_use]
    pub fn range_long(start: i64, end: i64) -> Self {
        Self::from_sequence(start..end)
    }
}

// =============================================================================
// Strategy Control
// =============================================================================

impl<T, C> Deferred<T, C>
where
    T: 'static,
    C: Collector<T> + 'static,
{
    /// Returns the materialization strategy of this collection.
    #[must_use]
    pub const fn evaluation(&self) -> Evaluation {
        self.evaluation
    }

    /// Returns an equivalent collection under the lazy strategy.
    #[must_use]
    pub fn lazy(self) -> Self {
        Self {
            source: self.source,
            evaluation: Evaluation::Lazy,
        }
    }

    /// Returns an equivalent collection under the eager strategy, forcing
    /// materialization now.
    ///
    /// A materialization failure is pinned into the collection and
    /// re-raised by the next query.
    #[must_use]
    pub fn eager(self) -> Self {
        let switched = Self {
            source: self.source,
            evaluation: Evaluation::Eager,
        };
        switched.force_quietly();
        switched
    }

    /// Returns whether the backing source is already a concrete
    /// collection. Never forces.
    #[must_use]
    pub fn is_materialized(&self) -> bool {
        self.source
            .try_borrow()
            .is_ok_and(|state| matches!(&*state, Source::Concrete(_)))
    }

    /// Returns whether the backing source is an undelivered promise.
    /// Never forces.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.source
            .try_borrow()
            .is_ok_and(|state| matches!(&*state, Source::Pending(_)))
    }
}

// =============================================================================
// Materialization
// =============================================================================

impl<T, C> Deferred<T, C>
where
    T: 'static,
    C: Collector<T> + 'static,
{
    /// Forces the backing source into a concrete collection.
    ///
    /// A `Sequence` source is folded through the family collector exactly
    /// once and the result memoized; a `Pending` source blocks until its
    /// completer fires. Forcing an already concrete collection is a no-op,
    /// and forcing a failed one re-raises the original cause.
    ///
    /// # Errors
    ///
    /// [`DeferredError::Materialization`] or [`DeferredError::Cancelled`]
    /// when the backing sequence or promise failed, and
    /// [`DeferredError::DoubleConsumption`] on reentrant forcing.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use deferra::deferred::DeferredVec;
    ///
    /// let numbers: DeferredVec<i32> = DeferredVec::of([1, 2, 3]);
    /// assert!(!numbers.is_materialized());
    ///
    /// numbers.force().unwrap();
    /// assert!(numbers.is_materialized());
    /// ```
    pub fn force(&self) -> Result<(), DeferredError> {
        let mut state = self
            .source
            .try_borrow_mut()
            .map_err(|_| DeferredError::DoubleConsumption)?;
        match &*state {
            Source::Concrete(_) => return Ok(()),
            Source::Failed(error) => return Err(error.clone()),
            Source::Sequence(_) | Source::Pending(_) => {}
        }
        #[cfg(feature = "tracing")]
        tracing::trace!(source = state.tag(), "materializing deferred collection");
        let taken = std::mem::replace(&mut *state, Source::Failed(DeferredError::DoubleConsumption));
        let outcome = match taken {
            Source::Sequence(sequence) => collect_fallible(sequence),
            Source::Pending(promise) => promise.block_take(),
            Source::Concrete(_) | Source::Failed(_) => unreachable!(),
        };
        match outcome {
            Ok(collection) => {
                *state = Source::Concrete(collection);
                Ok(())
            }
            Err(error) => {
                #[cfg(feature = "tracing")]
                tracing::debug!(%error, "materialization failed");
                *state = Source::Failed(error.clone());
                Err(error)
            }
        }
    }

    /// Forces materialization without blocking.
    ///
    /// # Errors
    ///
    /// [`DeferredError::Unsupported`] if the backing promise has not
    /// settled yet, plus everything [`force`](Self::force) can raise.
    pub fn force_now(&self) -> Result<(), DeferredError> {
        {
            let state = self
                .source
                .try_borrow()
                .map_err(|_| DeferredError::DoubleConsumption)?;
            if let Source::Pending(promise) = &*state {
                if !promise.is_settled() {
                    return Err(DeferredError::Unsupported {
                        operation: "force_now",
                    });
                }
            }
        }
        self.force()
    }

    /// Forces materialization, suspending the calling task instead of
    /// blocking the thread while a pending source is unresolved.
    ///
    /// # Errors
    ///
    /// Everything [`force`](Self::force) can raise.
    #[cfg(feature = "async")]
    pub async fn force_async(&self) -> Result<(), DeferredError> {
        let waiter = {
            let state = self
                .source
                .try_borrow()
                .map_err(|_| DeferredError::DoubleConsumption)?;
            match &*state {
                Source::Pending(promise) => Some(promise.settled()),
                _ => None,
            }
        };
        if let Some(waiter) = waiter {
            waiter.await;
        }
        self.force()
    }

    fn force_quietly(&self) {
        // Failures are pinned into the source and re-raised by the next
        // query.
        let _ = self.force();
    }

    pub(crate) fn with_concrete<R>(
        &self,
        operation: impl FnOnce(&C) -> R,
    ) -> Result<R, DeferredError> {
        self.force()?;
        let state = self
            .source
            .try_borrow()
            .map_err(|_| DeferredError::DoubleConsumption)?;
        match &*state {
            Source::Concrete(collection) => Ok(operation(collection)),
            Source::Failed(error) => Err(error.clone()),
            Source::Sequence(_) | Source::Pending(_) => {
                unreachable!("force leaves the source concrete or failed")
            }
        }
    }

    pub(crate) fn with_concrete_mut<R>(
        &mut self,
        operation: impl FnOnce(&mut C) -> R,
    ) -> Result<R, DeferredError> {
        self.force()?;
        let mut state = self
            .source
            .try_borrow_mut()
            .map_err(|_| DeferredError::DoubleConsumption)?;
        match &mut *state {
            Source::Concrete(collection) => Ok(operation(collection)),
            Source::Failed(error) => Err(error.clone()),
            Source::Sequence(_) | Source::Pending(_) => {
                unreachable!("force leaves the source concrete or failed")
            }
        }
    }

    /// Consumes the handle and returns the materialized collection.
    ///
    /// # Errors
    ///
    /// Everything [`force`](Self::force) can raise.
    pub fn into_concrete(self) -> Result<C, DeferredError> {
        self.force()?;
        match self.source.into_inner() {
            Source::Concrete(collection) => Ok(collection),
            Source::Failed(error) => Err(error),
            Source::Sequence(_) | Source::Pending(_) => {
                unreachable!("force leaves the source concrete or failed")
            }
        }
    }

    /// Converts this collection into a collection of another family,
    /// re-targeting the fold without materializing.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use deferra::deferred::{DeferredHashSet, DeferredVec};
    ///
    /// let values: DeferredVec<i32> = DeferredVec::of([1, 1, 2]);
    /// let unique: DeferredHashSet<i32> = values.convert();
    /// assert_eq!(unique.len().unwrap(), 2);
    /// ```
    #[must_use]
    pub fn convert<D>(self) -> Deferred<T, D>
    where
        D: Collector<T> + 'static,
    {
        let evaluation = self.evaluation;
        rewrap(self.into_lazy_seq(), evaluation)
    }

    pub(crate) fn into_lazy_seq(self) -> LazySeq<T> {
        self.source.into_inner().into_seq()
    }

    /// Consumes the handle and returns a lazy, fallible iterator over its
    /// elements. Equivalent to the [`IntoIterator`] impl.
    #[must_use]
    pub fn into_sequence(self) -> DeferredIntoIterator<T> {
        DeferredIntoIterator {
            sequence: self.into_lazy_seq(),
        }
    }
}

// =============================================================================
// Queries
// =============================================================================

impl<T, C> Deferred<T, C>
where
    T: 'static,
    C: Collector<T> + Membership<T> + 'static,
{
    /// Returns the number of elements, forcing materialization.
    ///
    /// # Errors
    ///
    /// Everything [`force`](Self::force) can raise.
    pub fn len(&self) -> Result<usize, DeferredError> {
        self.with_concrete(|collection| collection.len())
    }

    /// Returns the number of elements without blocking.
    ///
    /// # Errors
    ///
    /// [`DeferredError::Unsupported`] if the backing promise has not
    /// settled yet.
    pub fn len_now(&self) -> Result<usize, DeferredError> {
        self.force_now()?;
        self.with_concrete(|collection| collection.len())
    }

    /// Returns `true` if the collection has no elements, forcing
    /// materialization.
    ///
    /// # Errors
    ///
    /// Everything [`force`](Self::force) can raise.
    pub fn is_empty(&self) -> Result<bool, DeferredError> {
        self.with_concrete(|collection| collection.is_empty())
    }

    /// Returns `true` if the collection holds the given element, forcing
    /// materialization.
    ///
    /// # Errors
    ///
    /// Everything [`force`](Self::force) can raise.
    pub fn contains(&self, element: &T) -> Result<bool, DeferredError> {
        self.with_concrete(|collection| collection.contains(element))
    }
}

impl<T, C> Deferred<T, C>
where
    T: 'static,
    C: Collector<T> + 'static,
    for<'a> &'a C: IntoIterator<Item = &'a T>,
{
    /// Copies the materialized elements into a `Vec`, in the family's
    /// iteration order.
    ///
    /// # Errors
    ///
    /// Everything [`force`](Self::force) can raise.
    pub fn to_vec(&self) -> Result<Vec<T>, DeferredError>
    where
        T: Clone,
    {
        self.with_concrete(|collection| collection.into_iter().cloned().collect())
    }

    /// Applies an operation to every materialized element.
    ///
    /// # Errors
    ///
    /// Everything [`force`](Self::force) can raise.
    pub fn for_each(&self, mut operation: impl FnMut(&T)) -> Result<(), DeferredError> {
        self.with_concrete(|collection| {
            for element in collection {
                operation(element);
            }
        })
    }

    /// Returns `true` if any materialized element satisfies the predicate.
    ///
    /// # Errors
    ///
    /// Everything [`force`](Self::force) can raise.
    pub fn any(&self, mut predicate: impl FnMut(&T) -> bool) -> Result<bool, DeferredError> {
        self.with_concrete(|collection| collection.into_iter().any(|element| predicate(element)))
    }

    /// Returns `true` if every materialized element satisfies the
    /// predicate. Vacuously `true` for an empty collection.
    ///
    /// # Errors
    ///
    /// Everything [`force`](Self::force) can raise.
    pub fn all(&self, mut predicate: impl FnMut(&T) -> bool) -> Result<bool, DeferredError> {
        self.with_concrete(|collection| collection.into_iter().all(|element| predicate(element)))
    }

    /// Folds the materialized elements through a value-level reducer.
    ///
    /// # Errors
    ///
    /// Everything [`force`](Self::force) can raise.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use deferra::collector::reducers;
    /// use deferra::deferred::DeferredVec;
    ///
    /// let numbers: DeferredVec<i32> = DeferredVec::of([1, 2, 3]);
    /// let total = numbers.fold_with(&reducers::summing()).unwrap();
    /// assert_eq!(total, 6);
    /// ```
    pub fn fold_with<R: Clone>(&self, reducer: &Reducer<T, R>) -> Result<R, DeferredError>
    where
        T: Clone,
    {
        self.with_concrete(|collection| reducer.reduce(collection.into_iter().cloned()))
    }
}

impl<T, C> Deferred<T, C>
where
    T: 'static,
    C: Collector<T> + 'static,
{
    /// Compares two collections for equality, forcing both.
    ///
    /// # Errors
    ///
    /// Everything [`force`](Self::force) can raise, on either side.
    pub fn try_eq(&self, other: &Self) -> Result<bool, DeferredError>
    where
        C: PartialEq,
    {
        if std::ptr::eq(self, other) {
            self.force()?;
            return Ok(true);
        }
        self.with_concrete(|left| other.with_concrete(|right| left == right))?
    }

    /// Clones the materialized collection into an independent handle.
    ///
    /// # Errors
    ///
    /// Everything [`force`](Self::force) can raise.
    pub fn try_clone(&self) -> Result<Self, DeferredError>
    where
        C: Clone,
    {
        let evaluation = self.evaluation;
        self.with_concrete(|collection| Self {
            source: RefCell::new(Source::Concrete(collection.clone())),
            evaluation,
        })
    }
}

// =============================================================================
// Structural Operators
// =============================================================================

impl<T, C> Deferred<T, C>
where
    T: 'static,
    C: Collector<T> + 'static,
{
    /// Transforms every element, producing a collection of the inferred
    /// target family.
    ///
    /// Under the lazy strategy nothing is pulled until the result is
    /// queried; under the eager strategy the result materializes before
    /// `map` returns.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use deferra::deferred::DeferredVec;
    ///
    /// let doubled: DeferredVec<i32> = DeferredVec::of([1, 2, 3]).map(|value| value * 2);
    /// assert_eq!(doubled.to_vec().unwrap(), vec![2, 4, 6]);
    /// ```
    #[must_use]
    pub fn map<U, D, F>(self, function: F) -> Deferred<U, D>
    where
        U: 'static,
        D: Collector<U> + 'static,
        F: FnMut(T) -> U + 'static,
    {
        let evaluation = self.evaluation;
        let mut function = function;
        rewrap(
            Box::new(
                self.into_lazy_seq()
                    .map(move |item| item.map(&mut function)),
            ),
            evaluation,
        )
    }

    /// Keeps only the elements that satisfy the predicate.
    #[must_use]
    pub fn filter<P>(self, predicate: P) -> Self
    where
        P: FnMut(&T) -> bool + 'static,
    {
        let evaluation = self.evaluation;
        let mut predicate = predicate;
        rewrap(
            Box::new(self.into_lazy_seq().filter(move |item| match item {
                Ok(element) => predicate(element),
                Err(_) => true,
            })),
            evaluation,
        )
    }

    /// Keeps only the elements that do not satisfy the predicate.
    #[must_use]
    pub fn filter_not<P>(self, predicate: P) -> Self
    where
        P: FnMut(&T) -> bool + 'static,
    {
        let mut predicate = predicate;
        self.filter(move |element| !predicate(element))
    }

    /// Transforms every element into a sequence and flattens the results.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use deferra::deferred::DeferredVec;
    ///
    /// let repeated: DeferredVec<i32> =
    ///     DeferredVec::of([1, 2]).flat_map(|value| vec![value, value * 10]);
    /// assert_eq!(repeated.to_vec().unwrap(), vec![1, 10, 2, 20]);
    /// ```
    #[must_use]
    pub fn flat_map<U, D, I, F>(self, function: F) -> Deferred<U, D>
    where
        U: 'static,
        D: Collector<U> + 'static,
        I: IntoIterator<Item = U>,
        I::IntoIter: 'static,
        F: FnMut(T) -> I + 'static,
    {
        let evaluation = self.evaluation;
        let mut function = function;
        rewrap(
            Box::new(self.into_lazy_seq().flat_map(move |item| match item {
                Ok(element) => Either::Left(function(element).into_iter().map(Ok)),
                Err(error) => Either::Right(std::iter::once(Err(error))),
            })),
            evaluation,
        )
    }

    /// Pairs elements with another deferred collection, stopping at the
    /// shorter of the two.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use deferra::deferred::DeferredVec;
    ///
    /// let numbers: DeferredVec<i32> = DeferredVec::of([1, 2, 3]);
    /// let letters: DeferredVec<char> = DeferredVec::of(['a', 'b']);
    ///
    /// let pairs: DeferredVec<(i32, char)> = numbers.zip(letters);
    /// assert_eq!(pairs.to_vec().unwrap(), vec![(1, 'a'), (2, 'b')]);
    /// ```
    #[must_use]
    pub fn zip<U, C2, D>(self, other: Deferred<U, C2>) -> Deferred<(T, U), D>
    where
        U: 'static,
        C2: Collector<U> + 'static,
        D: Collector<(T, U)> + 'static,
    {
        let evaluation = self.evaluation;
        rewrap(
            Box::new(
                self.into_lazy_seq()
                    .zip(other.into_lazy_seq())
                    .map(|(left, right)| Ok((left?, right?))),
            ),
            evaluation,
        )
    }

    /// Triples elements with two other deferred collections.
    #[must_use]
    pub fn zip3<U, V, C2, C3, D>(
        self,
        second: Deferred<U, C2>,
        third: Deferred<V, C3>,
    ) -> Deferred<(T, U, V), D>
    where
        U: 'static,
        V: 'static,
        C2: Collector<U> + 'static,
        C3: Collector<V> + 'static,
        D: Collector<(T, U, V)> + 'static,
    {
        let evaluation = self.evaluation;
        rewrap(
            Box::new(
                self.into_lazy_seq()
                    .zip(second.into_lazy_seq())
                    .zip(third.into_lazy_seq())
                    .map(|((first, second), third)| Ok((first?, second?, third?))),
            ),
            evaluation,
        )
    }

    /// Quadruples elements with three other deferred collections.
    #[must_use]
    pub fn zip4<U, V, W, C2, C3, C4, D>(
        self,
        second: Deferred<U, C2>,
        third: Deferred<V, C3>,
        fourth: Deferred<W, C4>,
    ) -> Deferred<(T, U, V, W), D>
    where
        U: 'static,
        V: 'static,
        W: 'static,
        C2: Collector<U> + 'static,
        C3: Collector<V> + 'static,
        C4: Collector<W> + 'static,
        D: Collector<(T, U, V, W)> + 'static,
    {
        let evaluation = self.evaluation;
        rewrap(
            Box::new(
                self.into_lazy_seq()
                    .zip(second.into_lazy_seq())
                    .zip(third.into_lazy_seq())
                    .zip(fourth.into_lazy_seq())
                    .map(|(((first, second), third), fourth)| {
                        Ok((first?, second?, third?, fourth?))
                    }),
            ),
            evaluation,
        )
    }

    /// Pairs every element with its position in the sequence order.
    #[must_use]
    pub fn zip_with_index<D>(self) -> Deferred<(T, usize), D>
    where
        D: Collector<(T, usize)> + 'static,
    {
        let evaluation = self.evaluation;
        rewrap(
            Box::new(
                self.into_lazy_seq()
                    .enumerate()
                    .map(|(index, item)| item.map(|element| (element, index))),
            ),
            evaluation,
        )
    }

    /// Keeps at most the first `count` elements.
    ///
    /// `take(0)` never pulls from the backing sequence, so it is safe on
    /// an infinite source.
    #[must_use]
    pub fn take(self, count: usize) -> Self {
        let evaluation = self.evaluation;
        rewrap(Box::new(self.into_lazy_seq().take(count)), evaluation)
    }

    /// Skips the first `count` elements.
    #[must_use]
    pub fn skip(self, count: usize) -> Self {
        let evaluation = self.evaluation;
        let mut remaining = count;
        // A plain `Iterator::skip` would swallow buffered failures.
        rewrap(
            Box::new(self.into_lazy_seq().filter(move |item| match item {
                Ok(_) => {
                    if remaining > 0 {
                        remaining -= 1;
                        false
                    } else {
                        true
                    }
                }
                Err(_) => true,
            })),
            evaluation,
        )
    }

    /// Keeps elements while the predicate holds, stopping at the first
    /// element that fails it.
    #[must_use]
    pub fn take_while<P>(self, predicate: P) -> Self
    where
        P: FnMut(&T) -> bool + 'static,
    {
        let evaluation = self.evaluation;
        let mut predicate = predicate;
        rewrap(
            Box::new(self.into_lazy_seq().take_while(move |item| match item {
                Ok(element) => predicate(element),
                Err(_) => true,
            })),
            evaluation,
        )
    }

    /// Keeps elements until the predicate first holds.
    #[must_use]
    pub fn take_until<P>(self, predicate: P) -> Self
    where
        P: FnMut(&T) -> bool + 'static,
    {
        let mut predicate = predicate;
        self.take_while(move |element| !predicate(element))
    }

    /// Skips elements while the predicate holds.
    #[must_use]
    pub fn skip_while<P>(self, predicate: P) -> Self
    where
        P: FnMut(&T) -> bool + 'static,
    {
        let evaluation = self.evaluation;
        let mut predicate = predicate;
        rewrap(
            Box::new(self.into_lazy_seq().skip_while(move |item| match item {
                Ok(element) => predicate(element),
                Err(_) => false,
            })),
            evaluation,
        )
    }

    /// Skips elements until the predicate first holds.
    #[must_use]
    pub fn skip_until<P>(self, predicate: P) -> Self
    where
        P: FnMut(&T) -> bool + 'static,
    {
        let mut predicate = predicate;
        self.skip_while(move |element| !predicate(element))
    }

    /// Removes duplicate elements, keeping the first occurrence in
    /// sequence order.
    #[must_use]
    pub fn distinct(self) -> Self
    where
        T: Clone + Eq + Hash,
    {
        let mut seen = HashSet::new();
        self.filter(move |element| seen.insert(element.clone()))
    }

    /// Sorts the elements. Buffers the sequence at first pull.
    #[must_use]
    pub fn sorted(self) -> Self
    where
        T: Ord,
    {
        let evaluation = self.evaluation;
        rewrap(
            buffered(self.into_lazy_seq(), |mut elements: Vec<T>| {
                elements.sort();
                elements
            }),
            evaluation,
        )
    }

    /// Sorts the elements with a comparator. Buffers the sequence at
    /// first pull.
    #[must_use]
    pub fn sorted_by<F>(self, comparator: F) -> Self
    where
        F: FnMut(&T, &T) -> Ordering + 'static,
    {
        let evaluation = self.evaluation;
        let mut comparator = comparator;
        rewrap(
            buffered(self.into_lazy_seq(), move |mut elements: Vec<T>| {
                elements.sort_by(&mut comparator);
                elements
            }),
            evaluation,
        )
    }

    /// Reverses the sequence order. Buffers the sequence at first pull.
    #[must_use]
    pub fn reverse(self) -> Self {
        let evaluation = self.evaluation;
        rewrap(
            buffered(self.into_lazy_seq(), |mut elements: Vec<T>| {
                elements.reverse();
                elements
            }),
            evaluation,
        )
    }

    /// Produces the running accumulations of a left fold, starting with
    /// the initial value.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use deferra::deferred::DeferredVec;
    ///
    /// let sums: DeferredVec<i32> =
    ///     DeferredVec::of([1, 2, 3]).scan_left(0, |total, value| total + value);
    /// assert_eq!(sums.to_vec().unwrap(), vec![0, 1, 3, 6]);
    /// ```
    #[must_use]
    pub fn scan_left<R, D, F>(self, initial: R, function: F) -> Deferred<R, D>
    where
        R: Clone + 'static,
        D: Collector<R> + 'static,
        F: FnMut(R, T) -> R + 'static,
    {
        let evaluation = self.evaluation;
        let mut function = function;
        let seed = initial.clone();
        let scanned = self
            .into_lazy_seq()
            .scan(initial, move |accumulator, item| match item {
                Ok(element) => {
                    *accumulator = function(accumulator.clone(), element);
                    Some(Ok(accumulator.clone()))
                }
                Err(error) => Some(Err(error)),
            });
        rewrap(
            Box::new(std::iter::once(Ok(seed)).chain(scanned)),
            evaluation,
        )
    }

    /// Produces the accumulations of a right fold, ending with the
    /// initial value. Buffers the sequence at first pull.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use deferra::deferred::DeferredVec;
    ///
    /// let sums: DeferredVec<i32> =
    ///     DeferredVec::of([1, 2, 3]).scan_right(0, |value, total| value + total);
    /// assert_eq!(sums.to_vec().unwrap(), vec![6, 5, 3, 0]);
    /// ```
    #[must_use]
    pub fn scan_right<R, D, F>(self, initial: R, function: F) -> Deferred<R, D>
    where
        R: Clone + 'static,
        D: Collector<R> + 'static,
        F: FnMut(&T, R) -> R + 'static,
    {
        let evaluation = self.evaluation;
        let mut function = function;
        rewrap(
            buffered(self.into_lazy_seq(), move |elements: Vec<T>| {
                let mut accumulator = initial;
                let mut outputs = Vec::with_capacity(elements.len() + 1);
                outputs.push(accumulator.clone());
                for element in elements.iter().rev() {
                    accumulator = function(element, accumulator);
                    outputs.push(accumulator.clone());
                }
                outputs.reverse();
                outputs
            }),
            evaluation,
        )
    }

    /// Splits the sequence into consecutive groups of `size` elements;
    /// the trailing group may be shorter.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use deferra::deferred::DeferredVec;
    ///
    /// let groups: DeferredVec<Vec<i32>> = DeferredVec::of([1, 2, 3, 4, 5]).grouped(2);
    /// assert_eq!(
    ///     groups.to_vec().unwrap(),
    ///     vec![vec![1, 2], vec![3, 4], vec![5]]
    /// );
    /// ```
    #[must_use]
    pub fn grouped<D>(self, size: usize) -> Deferred<Vec<T>, D>
    where
        D: Collector<Vec<T>> + 'static,
    {
        let evaluation = self.evaluation;
        rewrap(
            Box::new(GroupedSeq {
                source: self.into_lazy_seq(),
                size: size.max(1),
                done: false,
            }),
            evaluation,
        )
    }

    /// Groups consecutive elements while the predicate holds; the element
    /// failing it closes its group.
    #[must_use]
    pub fn grouped_while<D, P>(self, predicate: P) -> Deferred<Vec<T>, D>
    where
        D: Collector<Vec<T>> + 'static,
        P: FnMut(&T) -> bool + 'static,
    {
        let mut predicate = predicate;
        self.grouped_until(move |element| !predicate(element))
    }

    /// Groups consecutive elements until the predicate holds; the element
    /// satisfying it closes its group.
    #[must_use]
    pub fn grouped_until<D, P>(self, predicate: P) -> Deferred<Vec<T>, D>
    where
        D: Collector<Vec<T>> + 'static,
        P: FnMut(&T) -> bool + 'static,
    {
        let evaluation = self.evaluation;
        rewrap(
            Box::new(GroupedBySeq {
                source: self.into_lazy_seq(),
                close_after: Box::new(predicate),
                done: false,
            }),
            evaluation,
        )
    }

    /// Produces overlapping windows of `window` elements, advancing by
    /// one element at a time.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use deferra::deferred::DeferredVec;
    ///
    /// let windows: DeferredVec<Vec<i32>> = DeferredVec::of([1, 2, 3]).sliding(2);
    /// assert_eq!(windows.to_vec().unwrap(), vec![vec![1, 2], vec![2, 3]]);
    /// ```
    #[must_use]
    pub fn sliding<D>(self, window: usize) -> Deferred<Vec<T>, D>
    where
        T: Clone,
        D: Collector<Vec<T>> + 'static,
    {
        self.sliding_by(window, 1)
    }

    /// Produces windows of `window` elements, advancing by `step`
    /// elements between windows.
    ///
    /// Trailing elements that cannot fill a window are dropped once a
    /// full window has been produced; a source shorter than one window
    /// yields a single partial window.
    #[must_use]
    pub fn sliding_by<D>(self, window: usize, step: usize) -> Deferred<Vec<T>, D>
    where
        T: Clone,
        D: Collector<Vec<T>> + 'static,
    {
        let evaluation = self.evaluation;
        rewrap(
            Box::new(SlidingSeq {
                source: self.into_lazy_seq(),
                window: window.max(1),
                step: step.max(1),
                buffer: VecDeque::new(),
                emitted: false,
                done: false,
            }),
            evaluation,
        )
    }

    /// Inserts a separator between consecutive elements.
    #[must_use]
    pub fn intersperse(self, separator: T) -> Self
    where
        T: Clone,
    {
        let evaluation = self.evaluation;
        let mut first = true;
        rewrap(
            Box::new(self.into_lazy_seq().flat_map(move |item| match item {
                Ok(element) => {
                    if first {
                        first = false;
                        Either::Left(std::iter::once(Ok(element)))
                    } else {
                        Either::Right([Ok(separator.clone()), Ok(element)].into_iter())
                    }
                }
                Err(error) => Either::Left(std::iter::once(Err(error))),
            })),
            evaluation,
        )
    }

    /// Appends one element after the existing ones.
    #[must_use]
    pub fn append(self, element: T) -> Self {
        let evaluation = self.evaluation;
        rewrap(
            Box::new(self.into_lazy_seq().chain(std::iter::once(Ok(element)))),
            evaluation,
        )
    }

    /// Prepends one element before the existing ones.
    #[must_use]
    pub fn prepend(self, element: T) -> Self {
        let evaluation = self.evaluation;
        rewrap(
            Box::new(std::iter::once(Ok(element)).chain(self.into_lazy_seq())),
            evaluation,
        )
    }

    /// Appends a sequence of elements after the existing ones.
    #[must_use]
    pub fn append_all<I>(self, elements: I) -> Self
    where
        I: IntoIterator<Item = T>,
        I::IntoIter: 'static,
    {
        let evaluation = self.evaluation;
        rewrap(
            Box::new(self.into_lazy_seq().chain(elements.into_iter().map(Ok))),
            evaluation,
        )
    }

    /// Prepends a sequence of elements before the existing ones.
    #[must_use]
    pub fn prepend_all<I>(self, elements: I) -> Self
    where
        I: IntoIterator<Item = T>,
        I::IntoIter: 'static,
    {
        let evaluation = self.evaluation;
        rewrap(
            Box::new(elements.into_iter().map(Ok).chain(self.into_lazy_seq())),
            evaluation,
        )
    }

    /// Supplies a fallback element if the collection materializes empty.
    #[must_use]
    pub fn on_empty(self, element: T) -> Self {
        self.on_empty_get(move || element)
    }

    /// Supplies a computed fallback element if the collection
    /// materializes empty.
    #[must_use]
    pub fn on_empty_get<F>(self, supplier: F) -> Self
    where
        F: FnOnce() -> T + 'static,
    {
        let evaluation = self.evaluation;
        rewrap(
            Box::new(OnEmptySeq {
                source: self.into_lazy_seq(),
                fallback: Some(supplier),
                pulled_any: false,
            }),
            evaluation,
        )
    }

    /// Merges this collection with another of the same family through the
    /// family's associative combine.
    ///
    /// Two concrete backings merge in place; otherwise the merge composes
    /// lazily onto the chained sequences.
    #[must_use]
    pub fn combine(self, other: Self) -> Self {
        let evaluation = self.evaluation;
        match (self.source.into_inner(), other.source.into_inner()) {
            (Source::Concrete(left), Source::Concrete(right)) => {
                Self::from_parts(Source::Concrete(left.combine(right)), evaluation)
            }
            (left, right) => rewrap(
                Box::new(left.into_seq().chain(right.into_seq())),
                evaluation,
            ),
        }
    }

    /// Replaces every failed pull with a recovery element, so that
    /// materialization can no longer fail on the sequence path.
    #[must_use]
    pub fn recover<F>(self, recovery: F) -> Self
    where
        F: FnMut(DeferredError) -> T + 'static,
    {
        let evaluation = self.evaluation;
        let mut recovery = recovery;
        rewrap(
            Box::new(self.into_lazy_seq().map(move |item| match item {
                Ok(element) => Ok(element),
                Err(error) => Ok(recovery(error)),
            })),
            evaluation,
        )
    }

    /// Maps every element through a fallible function, retrying each
    /// element up to `attempts` times before surfacing the last error.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use deferra::deferred::DeferredVec;
    ///
    /// let parsed: DeferredVec<i32> = DeferredVec::of(["1", "2"])
    ///     .retry(|text| text.parse::<i32>(), 3);
    /// assert_eq!(parsed.to_vec().unwrap(), vec![1, 2]);
    /// ```
    #[must_use]
    pub fn retry<U, D, E, F>(self, function: F, attempts: usize) -> Deferred<U, D>
    where
        U: 'static,
        D: Collector<U> + 'static,
        E: std::error::Error + Send + Sync + 'static,
        F: FnMut(&T) -> Result<U, E> + 'static,
    {
        let evaluation = self.evaluation;
        let mut function = function;
        rewrap(
            Box::new(self.into_lazy_seq().map(move |item| {
                let element = item?;
                let mut remaining = attempts.max(1);
                loop {
                    match function(&element) {
                        Ok(output) => return Ok(output),
                        Err(error) => {
                            remaining -= 1;
                            if remaining == 0 {
                                return Err(DeferredError::failed(error));
                            }
                        }
                    }
                }
            })),
            evaluation,
        )
    }
}

// =============================================================================
// Membership Operators
// =============================================================================

impl<T, C> Deferred<T, C>
where
    T: 'static,
    C: Collector<T> + Membership<T> + 'static,
{
    /// Adds one element.
    ///
    /// On a concrete backing the held collection is updated in place and
    /// re-wrapped; on a lazy backing the element chains onto the sequence
    /// and the family fold applies it at materialization.
    #[must_use]
    pub fn plus(self, element: T) -> Self {
        let evaluation = self.evaluation;
        match self.source.into_inner() {
            Source::Concrete(collection) => {
                Self::from_parts(Source::Concrete(collection.accumulate(element)), evaluation)
            }
            other => rewrap(
                Box::new(other.into_seq().chain(std::iter::once(Ok(element)))),
                evaluation,
            ),
        }
    }

    /// Adds every element of a sequence.
    #[must_use]
    pub fn plus_all<I>(self, elements: I) -> Self
    where
        I: IntoIterator<Item = T>,
        I::IntoIter: 'static,
    {
        let evaluation = self.evaluation;
        match self.source.into_inner() {
            Source::Concrete(mut collection) => {
                for element in elements {
                    collection = collection.accumulate(element);
                }
                Self::from_parts(Source::Concrete(collection), evaluation)
            }
            other => rewrap(
                Box::new(other.into_seq().chain(elements.into_iter().map(Ok))),
                evaluation,
            ),
        }
    }

    /// Removes one occurrence of the given element.
    #[must_use]
    pub fn remove_value(self, element: T) -> Self
    where
        T: PartialEq,
    {
        let evaluation = self.evaluation;
        match self.source.into_inner() {
            Source::Concrete(mut collection) => {
                collection.remove(&element);
                Self::from_parts(Source::Concrete(collection), evaluation)
            }
            other => {
                let mut removed = false;
                rewrap(
                    Box::new(other.into_seq().filter(move |item| match item {
                        Ok(candidate) => {
                            if !removed && *candidate == element {
                                removed = true;
                                false
                            } else {
                                true
                            }
                        }
                        Err(_) => true,
                    })),
                    evaluation,
                )
            }
        }
    }

    /// Removes every element that occurs in the given sequence.
    #[must_use]
    pub fn remove_all<I>(self, elements: I) -> Self
    where
        T: PartialEq,
        I: IntoIterator<Item = T>,
    {
        let victims: Vec<T> = elements.into_iter().collect();
        self.filter(move |element| !victims.contains(element))
    }

    /// Keeps only the elements that occur in the given sequence.
    #[must_use]
    pub fn retain_all<I>(self, elements: I) -> Self
    where
        T: PartialEq,
        I: IntoIterator<Item = T>,
    {
        let keep: Vec<T> = elements.into_iter().collect();
        self.filter(move |element| keep.contains(element))
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

impl<T, C> Default for Deferred<T, C>
where
    T: 'static,
    C: Collector<T> + 'static,
{
    fn default() -> Self {
        Self::empty()
    }
}

impl<T, C> From<C> for Deferred<T, C>
where
    T: 'static,
    C: Collector<T> + 'static,
{
    /// Wraps a concrete collection without copying.
    fn from(collection: C) -> Self {
        Self::from_concrete(collection)
    }
}

impl<T, C> FromIterator<T> for Deferred<T, C>
where
    T: 'static,
    C: Collector<T> + 'static,
{
    /// Buffers the iterator's elements and defers the family fold.
    ///
    /// The iterator itself cannot be stored (it is not required to be
    /// `'static`), so its elements are drained into a buffer here; the
    /// collector still runs lazily at materialization.
    fn from_iter<I: IntoIterator<Item = T>>(iterator: I) -> Self {
        let buffered: Vec<T> = iterator.into_iter().collect();
        Self::of(buffered)
    }
}

impl<T, C> IntoIterator for Deferred<T, C>
where
    T: 'static,
    C: Collector<T> + 'static,
{
    type Item = Result<T, DeferredError>;
    type IntoIter = DeferredIntoIterator<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.into_sequence()
    }
}

impl<T, C: fmt::Debug> fmt::Debug for Deferred<T, C> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.source.try_borrow() {
            Ok(state) => match &*state {
                Source::Concrete(collection) => {
                    formatter.debug_tuple("Deferred").field(collection).finish()
                }
                other => formatter.debug_tuple("Deferred").field(&other.tag()).finish(),
            },
            Err(_) => formatter
                .debug_tuple("Deferred")
                .field(&"materializing")
                .finish(),
        }
    }
}

/// Lazy, fallible iterator over a consumed deferred collection.
///
/// Yields `Err` exactly once if the backing source fails, then fuses.
pub struct DeferredIntoIterator<T> {
    sequence: LazySeq<T>,
}

impl<T> Iterator for DeferredIntoIterator<T> {
    type Item = Result<T, DeferredError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.sequence.next()
    }
}

// The handle is deliberately single-threaded; only the completer side of a
// pending source crosses threads.
static_assertions::assert_not_impl_any!(Deferred<i32, Vec<i32>>: Send, Sync);

// =============================================================================
// Sequence Adapters
// =============================================================================

pub(crate) fn rewrap<U, D>(sequence: LazySeq<U>, evaluation: Evaluation) -> Deferred<U, D>
where
    U: 'static,
    D: Collector<U> + 'static,
{
    let derived = Deferred::from_parts(Source::Sequence(sequence), evaluation);
    if evaluation == Evaluation::Eager {
        derived.force_quietly();
    }
    derived
}

fn collect_fallible<T, C: Collector<T>>(sequence: LazySeq<T>) -> Result<C, DeferredError> {
    let mut collection = C::empty();
    for item in sequence {
        collection = collection.accumulate(item?);
    }
    Ok(collection)
}

/// Buffers a sequence at first pull, applies a whole-sequence transform,
/// then streams the result.
fn buffered<T: 'static, U: 'static>(
    sequence: LazySeq<T>,
    transform: impl FnOnce(Vec<T>) -> Vec<U> + 'static,
) -> LazySeq<U> {
    Box::new(BufferedSeq {
        input: Some((sequence, transform)),
        output: None,
    })
}

struct BufferedSeq<T, U, F> {
    input: Option<(LazySeq<T>, F)>,
    output: Option<std::vec::IntoIter<Result<U, DeferredError>>>,
}

impl<T, U, F> Iterator for BufferedSeq<T, U, F>
where
    F: FnOnce(Vec<T>) -> Vec<U>,
{
    type Item = Result<U, DeferredError>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some((sequence, transform)) = self.input.take() {
            let mut elements = Vec::new();
            let mut failure = None;
            for item in sequence {
                match item {
                    Ok(element) => elements.push(element),
                    Err(error) => {
                        failure = Some(error);
                        break;
                    }
                }
            }
            let results: Vec<Result<U, DeferredError>> = match failure {
                Some(error) => vec![Err(error)],
                None => transform(elements).into_iter().map(Ok).collect(),
            };
            self.output = Some(results.into_iter());
        }
        self.output.as_mut()?.next()
    }
}

struct GroupedSeq<T> {
    source: LazySeq<T>,
    size: usize,
    done: bool,
}

impl<T> Iterator for GroupedSeq<T> {
    type Item = Result<Vec<T>, DeferredError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let mut group = Vec::with_capacity(self.size);
        while group.len() < self.size {
            match self.source.next() {
                Some(Ok(element)) => group.push(element),
                Some(Err(error)) => {
                    self.done = true;
                    return Some(Err(error));
                }
                None => {
                    self.done = true;
                    break;
                }
            }
        }
        if group.is_empty() {
            None
        } else {
            Some(Ok(group))
        }
    }
}

struct GroupedBySeq<T> {
    source: LazySeq<T>,
    close_after: Box<dyn FnMut(&T) -> bool>,
    done: bool,
}

impl<T> Iterator for GroupedBySeq<T> {
    type Item = Result<Vec<T>, DeferredError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let mut group = Vec::new();
        loop {
            match self.source.next() {
                Some(Ok(element)) => {
                    let close = (self.close_after)(&element);
                    group.push(element);
                    if close {
                        return Some(Ok(group));
                    }
                }
                Some(Err(error)) => {
                    self.done = true;
                    return Some(Err(error));
                }
                None => {
                    self.done = true;
                    return if group.is_empty() {
                        None
                    } else {
                        Some(Ok(group))
                    };
                }
            }
        }
    }
}

struct SlidingSeq<T> {
    source: LazySeq<T>,
    window: usize,
    step: usize,
    buffer: VecDeque<T>,
    emitted: bool,
    done: bool,
}

impl<T: Clone> Iterator for SlidingSeq<T> {
    type Item = Result<Vec<T>, DeferredError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        while self.buffer.len() < self.window {
            match self.source.next() {
                Some(Ok(element)) => self.buffer.push_back(element),
                Some(Err(error)) => {
                    self.done = true;
                    return Some(Err(error));
                }
                None => {
                    self.done = true;
                    // A source shorter than the window yields one partial
                    // window; an exhausted source after full windows ends
                    // the sequence.
                    if self.emitted || self.buffer.is_empty() {
                        return None;
                    }
                    return Some(Ok(self.buffer.drain(..).collect()));
                }
            }
        }
        self.emitted = true;
        let window: Vec<T> = self.buffer.iter().cloned().collect();
        for _ in 0..self.step.min(self.buffer.len()) {
            self.buffer.pop_front();
        }
        Some(Ok(window))
    }
}

struct OnEmptySeq<T, F> {
    source: LazySeq<T>,
    fallback: Option<F>,
    pulled_any: bool,
}

impl<T, F: FnOnce() -> T> Iterator for OnEmptySeq<T, F> {
    type Item = Result<T, DeferredError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.source.next() {
            Some(item) => {
                self.pulled_any = true;
                self.fallback = None;
                Some(item)
            }
            None => {
                if self.pulled_any {
                    None
                } else {
                    self.fallback.take().map(|supplier| Ok(supplier()))
                }
            }
        }
    }
}

struct DeferSeq<T, F> {
    supplier: Option<F>,
    inner: Option<LazySeq<T>>,
}

impl<T, F: FnOnce() -> LazySeq<T>> Iterator for DeferSeq<T, F> {
    type Item = Result<T, DeferredError>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(supplier) = self.supplier.take() {
            self.inner = Some(supplier());
        }
        self.inner.as_mut()?.next()
    }
}

enum Either<L, R> {
    Left(L),
    Right(R),
}

impl<L, R, Item> Iterator for Either<L, R>
where
    L: Iterator<Item = Item>,
    R: Iterator<Item = Item>,
{
    type Item = Item;

    fn next(&mut self) -> Option<Item> {
        match self {
            Self::Left(left) => left.next(),
            Self::Right(right) => right.next(),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
