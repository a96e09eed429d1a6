//! The deferred vector family.

use crate::error::DeferredError;

use super::collection::Deferred;

/// A deferred vector, materializing into `Vec`. Preserves duplicates and
/// sequence order.
pub type DeferredVec<T> = Deferred<T, Vec<T>>;

impl<T: 'static> Deferred<T, Vec<T>> {
    /// Returns a copy of the first element, forcing materialization.
    ///
    /// # Errors
    ///
    /// Everything [`force`](Deferred::force) can raise.
    pub fn first(&self) -> Result<Option<T>, DeferredError>
    where
        T: Clone,
    {
        self.with_concrete(|elements| elements.first().cloned())
    }

    /// Returns a copy of the last element, forcing materialization.
    ///
    /// # Errors
    ///
    /// Everything [`force`](Deferred::force) can raise.
    pub fn last(&self) -> Result<Option<T>, DeferredError>
    where
        T: Clone,
    {
        self.with_concrete(|elements| elements.last().cloned())
    }

    /// Returns a copy of the element at `index`, forcing materialization.
    ///
    /// # Errors
    ///
    /// Everything [`force`](Deferred::force) can raise.
    pub fn get(&self, index: usize) -> Result<Option<T>, DeferredError>
    where
        T: Clone,
    {
        self.with_concrete(|elements| elements.get(index).cloned())
    }
}
