//! Bounded re-execution of fallible operations.
//!
//! Two policies share one shape, an [`AttemptPolicy`] (attempt bound plus a
//! fixed delay) driving an operation that receives the zero-based attempt
//! index:
//!
//! - [`Repeat`]: runs while a continuation predicate accepts the latest
//!   `(value, error)` pair. Operation errors never escape; the result is the
//!   last produced value or a fallback.
//! - [`Retry`]: stops at the first success. On exhaustion it resolves through
//!   a fallback of the last error, or returns that error unchanged.
//!
//! Both run synchronously on the caller's thread. The delay between attempts
//! goes through a [`Sleeper`] and observes a [`CancellationToken`], so a
//! cancelled run never starts another attempt.
//!
//! # Quick Start
//!
//! ```rust
//! use repeatable::{AttemptPolicy, Retry};
//! use std::time::Duration;
//!
//! let policy = AttemptPolicy::attempts(3).with_delay(Duration::from_millis(1));
//!
//! let port = Retry::new(policy, |_attempt| "8080".parse::<u16>())
//!     .or_else(|_err| 80)
//!     .run();
//!
//! assert_eq!(port, Ok(8080));
//! ```
//!
//! # Async
//!
//! With the `async` feature, [`AsyncRepeat`] and [`AsyncRetry`] offer the same
//! semantics for operations returning futures, waiting on the tokio timer.

mod cancel;
mod config;
#[cfg(feature = "async")]
mod future;
mod repeat;
mod retry;

pub use cancel::{CancellationToken, Cancelled, Sleeper, ThreadSleeper};
pub use config::AttemptPolicy;
#[cfg(feature = "async")]
pub use future::{AsyncRepeat, AsyncRetry};
pub use repeat::Repeat;
pub use retry::{Retry, RetryEvent};

#[cfg(test)]
mod tests;
