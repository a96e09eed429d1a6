//! Pending-value support for deferred collections.
//!
//! A collection handle can be issued before its contents exist. The handle
//! wraps a promise — a single-assignment completion slot — and the producer
//! side holds a [`Completer`]. Any operation that
//! needs concrete contents blocks (or, with the `async` feature, suspends)
//! until the completer fires, then observes the delivered collection.
//!
//! The promise is an explicit tagged state machine
//! (`Unresolved -> Resolved | Failed`), not a dynamic proxy: every access
//! dispatches through a state check, and both terminal states are sticky.
//!
//! # Examples
//!
//! ```rust
//! use deferra::deferred::DeferredHashSet;
//! use std::collections::HashSet;
//! use std::thread;
//!
//! let (handle, completer) = DeferredHashSet::<i32>::completable();
//!
//! let producer = thread::spawn(move || {
//!     completer.complete(HashSet::from([1, 2, 3]))
//! });
//!
//! // Blocks until the producer fires, then observes the result.
//! assert!(handle.contains(&2).unwrap());
//! assert!(producer.join().unwrap());
//! ```

pub(crate) mod promise;

pub use promise::Completer;
