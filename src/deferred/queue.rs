//! The deferred queue family.

use std::collections::VecDeque;

use crate::error::DeferredError;

use super::collection::Deferred;

/// A deferred FIFO queue, materializing into `std::collections::VecDeque`.
///
/// # Examples
///
/// ```rust
/// use deferra::deferred::DeferredVecDeque;
///
/// let mut queue: DeferredVecDeque<i32> = DeferredVecDeque::of([1, 2]).append(3);
///
/// assert_eq!(queue.peek_front().unwrap(), Some(1));
/// assert_eq!(queue.pop_front().unwrap(), Some(1));
/// assert_eq!(queue.pop_front().unwrap(), Some(2));
/// ```
pub type DeferredVecDeque<T> = Deferred<T, VecDeque<T>>;

impl<T: 'static> Deferred<T, VecDeque<T>> {
    /// Returns a copy of the element at the head of the queue, forcing
    /// materialization.
    ///
    /// # Errors
    ///
    /// Everything [`force`](Deferred::force) can raise.
    pub fn peek_front(&self) -> Result<Option<T>, DeferredError>
    where
        T: Clone,
    {
        self.with_concrete(|queue| queue.front().cloned())
    }

    /// Removes and returns the element at the head of the queue, forcing
    /// materialization. The dequeue mutates the held concrete backing in
    /// place.
    ///
    /// # Errors
    ///
    /// Everything [`force`](Deferred::force) can raise.
    pub fn pop_front(&mut self) -> Result<Option<T>, DeferredError> {
        self.with_concrete_mut(VecDeque::pop_front)
    }
}
