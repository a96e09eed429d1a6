//! Single-assignment promise backing a pending collection.

use std::sync::Arc;
use std::task::Waker;

use parking_lot::{Condvar, Mutex};

use crate::collector::Collector;
use crate::error::DeferredError;

/// The internal state of a promise.
///
/// Transitions: `Unresolved -> Resolved | Failed` (settled exactly once by
/// the completer, or by cancellation when the completer is dropped), then
/// `Resolved -> Taken` when the owning collection claims the value.
/// `Taken` and `Failed` are terminal.
enum PromiseState<C> {
    /// No result yet. Holds the wakers of suspended async waiters.
    Unresolved { wakers: Vec<Waker> },
    /// The completer delivered a collection that has not been claimed yet.
    Resolved(C),
    /// The delivered collection was claimed by the owning handle.
    Taken,
    /// The completer failed or was dropped; the error is re-raised on
    /// every subsequent access.
    Failed(DeferredError),
}

struct Shared<C> {
    state: Mutex<PromiseState<C>>,
    settled: Condvar,
}

/// Consumer side of the completion slot.
///
/// Owned by the deferred collection whose backing source is pending. The
/// resolved collection can be taken exactly once; the promise is therefore
/// just as single-pass as a sequence source.
pub(crate) struct Promise<C> {
    shared: Arc<Shared<C>>,
}

impl<C> Promise<C> {
    /// Creates an unresolved promise and its completer.
    pub(crate) fn new() -> (Self, Completer<C>) {
        let shared = Arc::new(Shared {
            state: Mutex::new(PromiseState::Unresolved { wakers: Vec::new() }),
            settled: Condvar::new(),
        });
        (
            Self {
                shared: Arc::clone(&shared),
            },
            Completer { shared },
        )
    }

    /// Returns whether the promise has been completed, failed, or cancelled.
    pub(crate) fn is_settled(&self) -> bool {
        !matches!(
            &*self.shared.state.lock(),
            PromiseState::Unresolved { .. }
        )
    }

    /// Blocks the calling thread until the promise settles, then claims the
    /// delivered collection.
    pub(crate) fn block_take(self) -> Result<C, DeferredError> {
        let mut state = self.shared.state.lock();
        loop {
            match &mut *state {
                PromiseState::Unresolved { .. } => {
                    self.shared.settled.wait(&mut state);
                }
                PromiseState::Resolved(_) => {
                    let taken = std::mem::replace(&mut *state, PromiseState::Taken);
                    let PromiseState::Resolved(collection) = taken else {
                        unreachable!()
                    };
                    return Ok(collection);
                }
                PromiseState::Taken => return Err(DeferredError::DoubleConsumption),
                PromiseState::Failed(error) => return Err(error.clone()),
            }
        }
    }

    /// Returns a future that resolves once the promise settles.
    ///
    /// The future only observes readiness; claiming the value still goes
    /// through [`block_take`](Self::block_take), which no longer blocks at
    /// that point.
    #[cfg(feature = "async")]
    pub(crate) fn settled(&self) -> Settled<C> {
        Settled {
            shared: Arc::clone(&self.shared),
        }
    }
}

/// Future resolving when a promise leaves the unresolved state.
#[cfg(feature = "async")]
pub(crate) struct Settled<C> {
    shared: Arc<Shared<C>>,
}

#[cfg(feature = "async")]
impl<C> std::future::Future for Settled<C> {
    type Output = ();

    fn poll(
        self: std::pin::Pin<&mut Self>,
        context: &mut std::task::Context<'_>,
    ) -> std::task::Poll<()> {
        let mut state = self.shared.state.lock();
        match &mut *state {
            PromiseState::Unresolved { wakers } => {
                if !wakers.iter().any(|waker| waker.will_wake(context.waker())) {
                    wakers.push(context.waker().clone());
                }
                std::task::Poll::Pending
            }
            _ => std::task::Poll::Ready(()),
        }
    }
}

/// Producer side of the completion slot.
///
/// Settles the paired promise exactly once, successfully via
/// [`complete`](Completer::complete) or with a failure via
/// [`fail`](Completer::fail). Dropping an unfired completer cancels the
/// promise: every operation forced against the handle afterwards fails with
/// [`DeferredError::Cancelled`].
///
/// # Examples
///
/// ```rust
/// use deferra::deferred::DeferredVec;
///
/// let (handle, completer) = DeferredVec::<i32>::completable();
///
/// assert!(completer.complete(vec![1, 2]));
/// // A second completion has no effect.
/// assert!(!completer.complete(vec![3]));
///
/// assert_eq!(handle.to_vec().unwrap(), vec![1, 2]);
/// ```
pub struct Completer<C> {
    shared: Arc<Shared<C>>,
}

impl<C> Completer<C> {
    /// Completes the promise with a concrete collection.
    ///
    /// Returns `true` if this call settled the promise, `false` if it was
    /// already settled.
    pub fn complete(&self, collection: C) -> bool {
        #[cfg(feature = "tracing")]
        tracing::trace!("completing pending collection");
        self.settle(PromiseState::Resolved(collection))
    }

    /// Completes the promise by folding the given elements through the
    /// family's collector.
    ///
    /// Returns `true` if this call settled the promise.
    pub fn complete_from_iter<T, I>(&self, elements: I) -> bool
    where
        C: Collector<T>,
        I: IntoIterator<Item = T>,
    {
        self.complete(C::collect_seq(elements))
    }

    /// Fails the promise with the given cause.
    ///
    /// Returns `true` if this call settled the promise.
    pub fn fail<E>(&self, error: E) -> bool
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        #[cfg(feature = "tracing")]
        tracing::debug!(cause = %error, "failing pending collection");
        self.settle(PromiseState::Failed(DeferredError::failed(error)))
    }

    /// Completes the promise by draining a stream of elements through the
    /// family's collector.
    ///
    /// Returns `true` if this call settled the promise.
    #[cfg(feature = "async")]
    pub async fn complete_from_stream<T, S>(&self, stream: S) -> bool
    where
        C: Collector<T>,
        S: futures::Stream<Item = T>,
    {
        use futures::StreamExt;

        futures::pin_mut!(stream);
        let mut collection = C::empty();
        while let Some(element) = stream.next().await {
            collection = collection.accumulate(element);
        }
        self.complete(collection)
    }

    fn settle(&self, outcome: PromiseState<C>) -> bool {
        let wakers = {
            let mut state = self.shared.state.lock();
            match &mut *state {
                PromiseState::Unresolved { wakers } => {
                    let wakers = std::mem::take(wakers);
                    *state = outcome;
                    wakers
                }
                _ => return false,
            }
        };
        self.shared.settled.notify_all();
        for waker in wakers {
            waker.wake();
        }
        true
    }
}

impl<C> Drop for Completer<C> {
    fn drop(&mut self) {
        // Cancels the promise if it never settled; a no-op otherwise.
        self.settle(PromiseState::Failed(DeferredError::Cancelled));
    }
}

// A completer crosses to the producer's thread; the promise stays with the
// collection handle.
static_assertions::assert_impl_all!(Completer<Vec<i32>>: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn test_block_take_returns_completed_value() {
        let (promise, completer) = Promise::<Vec<i32>>::new();
        assert!(completer.complete(vec![1, 2]));
        assert_eq!(promise.block_take().unwrap(), vec![1, 2]);
    }

    #[rstest]
    fn test_second_completion_has_no_effect() {
        let (promise, completer) = Promise::<Vec<i32>>::new();
        assert!(completer.complete(vec![1]));
        assert!(!completer.complete(vec![2]));
        assert!(!completer.fail(std::io::Error::other("late")));
        assert_eq!(promise.block_take().unwrap(), vec![1]);
    }

    #[rstest]
    fn test_dropping_completer_cancels() {
        let (promise, completer) = Promise::<Vec<i32>>::new();
        drop(completer);
        assert!(matches!(
            promise.block_take(),
            Err(DeferredError::Cancelled)
        ));
    }

    #[rstest]
    fn test_failure_carries_cause() {
        let (promise, completer) = Promise::<Vec<i32>>::new();
        assert!(completer.fail(std::io::Error::other("upstream broke")));
        let error = promise.block_take().unwrap_err();
        assert!(format!("{error}").contains("upstream broke"));
    }

    #[rstest]
    fn test_is_settled_tracks_state() {
        let (promise, completer) = Promise::<Vec<i32>>::new();
        assert!(!promise.is_settled());
        completer.complete(Vec::new());
        assert!(promise.is_settled());
    }
}
