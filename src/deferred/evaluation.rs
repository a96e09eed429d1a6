//! Materialization strategy.

/// When a deferred collection evaluates its backing source.
///
/// The strategy is attached at construction and inherited by every derived
/// collection. [`Deferred::lazy`](crate::deferred::Deferred::lazy) and
/// [`Deferred::eager`](crate::deferred::Deferred::eager) switch it.
///
/// # Examples
///
/// ```rust
/// use deferra::deferred::{DeferredVec, Evaluation};
///
/// let lazy: DeferredVec<i32> = DeferredVec::of([1, 2, 3]);
/// assert_eq!(lazy.evaluation(), Evaluation::Lazy);
///
/// let eager = lazy.eager();
/// assert_eq!(eager.evaluation(), Evaluation::Eager);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Evaluation {
    /// Every structural operator materializes its result immediately.
    Eager,
    /// Materialization is deferred until an operation needs concrete
    /// contents (size, membership, iteration to exhaustion, conversion).
    #[default]
    Lazy,
}
