//! Error types for deferred collections.
//!
//! All failures surfaced by this crate funnel into [`DeferredError`]. The
//! type is cheaply cloneable so that a collection whose materialization
//! failed can re-raise the same cause on every subsequent access.

use std::error::Error;
use std::fmt;
use std::sync::Arc;

/// Shared handle to the underlying cause of a materialization failure.
///
/// Causes are reference-counted because a failed backing source is terminal:
/// the same cause is attached to every later access.
pub type FailureCause = Arc<dyn Error + Send + Sync + 'static>;

/// The error taxonomy for deferred collections.
///
/// # Examples
///
/// ```rust
/// use deferra::error::DeferredError;
///
/// let error = DeferredError::Cancelled;
/// assert_eq!(
///     format!("{}", error),
///     "deferred source was cancelled before completion"
/// );
/// ```
#[derive(Debug, Clone)]
pub enum DeferredError {
    /// Forcing a sequence or pending source failed. Carries the
    /// underlying cause, also exposed through [`Error::source`].
    Materialization {
        /// The failure raised by the backing sequence or future.
        cause: FailureCause,
    },
    /// The completer backing a pending source was dropped before it
    /// delivered a result.
    Cancelled,
    /// A single-pass backing source was consumed a second time, either
    /// through reentrant materialization or a promise whose value was
    /// already taken.
    DoubleConsumption,
    /// The operation refused to block on an unresolved pending source.
    Unsupported {
        /// The operation that was refused.
        operation: &'static str,
    },
}

impl DeferredError {
    /// Wraps an arbitrary error as a materialization failure.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use deferra::error::DeferredError;
    /// use std::error::Error;
    ///
    /// let parse_failure = "abc".parse::<i32>().unwrap_err();
    /// let error = DeferredError::failed(parse_failure);
    /// assert!(error.source().is_some());
    /// ```
    #[must_use]
    pub fn failed<E>(cause: E) -> Self
    where
        E: Error + Send + Sync + 'static,
    {
        Self::Materialization {
            cause: Arc::new(cause),
        }
    }

    /// Wraps a plain message as a materialization failure.
    #[must_use]
    pub fn message(text: impl Into<String>) -> Self {
        Self::Materialization {
            cause: Arc::new(MessageError(text.into())),
        }
    }
}

impl fmt::Display for DeferredError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Materialization { cause } => {
                write!(formatter, "materialization failed: {cause}")
            }
            Self::Cancelled => {
                write!(formatter, "deferred source was cancelled before completion")
            }
            Self::DoubleConsumption => {
                write!(formatter, "single-pass backing source consumed more than once")
            }
            Self::Unsupported { operation } => {
                write!(
                    formatter,
                    "{operation}: refusing to block on an unresolved pending source"
                )
            }
        }
    }
}

impl Error for DeferredError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Materialization { cause } => Some(cause.as_ref() as &(dyn Error + 'static)),
            _ => None,
        }
    }
}

/// String-only cause used by [`DeferredError::message`].
#[derive(Debug)]
struct MessageError(String);

impl fmt::Display for MessageError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

impl Error for MessageError {}
