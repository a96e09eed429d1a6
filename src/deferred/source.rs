//! The backing source behind a deferred collection.

use crate::collector::Collector;
use crate::error::DeferredError;
use crate::pending::promise::Promise;

/// Boxed single-pass pull sequence.
///
/// Items are fallible so that a failing source can carry its cause to the
/// materialization site instead of panicking mid-pull.
pub(crate) type LazySeq<T> = Box<dyn Iterator<Item = Result<T, DeferredError>>>;

/// Tagged union over the three ways a collection's contents can exist,
/// plus the terminal failed state.
///
/// At most one variant is active. Transmutation from `Sequence`/`Pending`
/// to `Concrete` happens exactly once, inside
/// [`Deferred::force`](crate::deferred::Deferred::force), and is memoized;
/// a failed transmutation pins the `Failed` variant instead, which re-raises
/// its cause on every later access.
pub(crate) enum Source<T, C> {
    /// A fully realized collection of the target family.
    Concrete(C),
    /// A lazy, possibly side-effecting pull sequence. Consuming it is
    /// destructive.
    Sequence(LazySeq<T>),
    /// A collection that another worker has yet to deliver.
    Pending(Promise<C>),
    /// A previous materialization failed; the error is sticky.
    Failed(DeferredError),
}

impl<T, C> Source<T, C>
where
    T: 'static,
    C: Collector<T> + 'static,
{
    /// Converts any state into a lazy pull sequence without forcing it.
    ///
    /// A pending source becomes a sequence that blocks on its first pull,
    /// so deriving a view over a not-yet-delivered collection stays
    /// non-forcing.
    pub(crate) fn into_seq(self) -> LazySeq<T> {
        match self {
            Self::Concrete(collection) => Box::new(collection.into_iter().map(Ok)),
            Self::Sequence(sequence) => sequence,
            Self::Pending(promise) => Box::new(PendingSeq {
                promise: Some(promise),
                items: None,
            }),
            Self::Failed(error) => Box::new(std::iter::once(Err(error))),
        }
    }
}

impl<T, C> Source<T, C> {
    /// The state tag, for diagnostics.
    pub(crate) const fn tag(&self) -> &'static str {
        match self {
            Self::Concrete(_) => "concrete",
            Self::Sequence(_) => "sequence",
            Self::Pending(_) => "pending",
            Self::Failed(_) => "failed",
        }
    }
}

/// Sequence view over a pending source.
///
/// The first pull claims the promised collection, blocking if it has not
/// settled yet; a settlement failure is yielded once and the sequence then
/// fuses.
struct PendingSeq<T, C: IntoIterator<Item = T>> {
    promise: Option<Promise<C>>,
    items: Option<C::IntoIter>,
}

impl<T, C> Iterator for PendingSeq<T, C>
where
    C: Collector<T>,
{
    type Item = Result<T, DeferredError>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(promise) = self.promise.take() {
            match promise.block_take() {
                Ok(collection) => self.items = Some(collection.into_iter()),
                Err(error) => return Some(Err(error)),
            }
        }
        self.items.as_mut()?.next().map(Ok)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn test_concrete_into_seq_yields_elements() {
        let source: Source<i32, Vec<i32>> = Source::Concrete(vec![1, 2, 3]);
        let items: Result<Vec<i32>, DeferredError> = source.into_seq().collect();
        assert_eq!(items.unwrap(), vec![1, 2, 3]);
    }

    #[rstest]
    fn test_failed_into_seq_yields_error_once() {
        let source: Source<i32, Vec<i32>> = Source::Failed(DeferredError::Cancelled);
        let mut sequence = source.into_seq();
        assert!(matches!(sequence.next(), Some(Err(DeferredError::Cancelled))));
        assert!(sequence.next().is_none());
    }

    #[rstest]
    fn test_pending_into_seq_defers_until_pulled() {
        let (promise, completer) = Promise::<Vec<i32>>::new();
        let source: Source<i32, Vec<i32>> = Source::Pending(promise);
        let mut sequence = source.into_seq();
        completer.complete(vec![7]);
        assert!(matches!(sequence.next(), Some(Ok(7))));
        assert!(sequence.next().is_none());
    }
}
