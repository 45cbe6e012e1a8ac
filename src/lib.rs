//! # Repeatable
//!
//! Small primitives for operations that may fail.
//!
//! - **Policies** re-run a fallible operation a bounded number of times:
//!   [`Repeat`] keeps going while a predicate holds, [`Retry`] stops at the
//!   first success and falls back or fails on exhaustion.
//! - **[`Try`]** captures the outcome of one fallible computation as a value
//!   instead of letting the failure propagate, with chainable accessors.
//!
//! Everything runs synchronously on the caller's thread. The only suspension
//! point is the fixed delay between attempts, which honours a
//! [`CancellationToken`].
//!
//! ## Quick Example
//!
//! ```rust
//! use repeatable::{Repeat, Retry, Try};
//! use std::time::Duration;
//!
//! // Retry a flaky lookup, falling back to a default on exhaustion.
//! let mut calls = 0;
//! let port = Retry::times(3, |_attempt| {
//!     calls += 1;
//!     if calls < 3 { Err("not ready") } else { Ok(8080) }
//! })
//! .with_delay(Duration::from_millis(1))
//! .or_else(|_last_error| 80)
//! .run();
//! assert_eq!(port, Ok(8080));
//!
//! // Poll until a condition is met.
//! let ready = Repeat::times(5, |attempt| Ok::<_, ()>(attempt >= 2))
//!     .repeat_while(|ready, _err| !ready.copied().unwrap_or(false))
//!     .run();
//! assert_eq!(ready, Some(true));
//!
//! // Capture a failure as a value.
//! let parsed = Try::run_catching(|| "42".parse::<i32>());
//! assert_eq!(parsed.get_or_default(0), 42);
//! ```

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod catching;
pub mod outcome;
pub mod policy;
pub mod testing;

// Re-exports
pub use catching::{BoxError, Panicked, Try, TryError};
pub use outcome::Outcome;
#[cfg(feature = "async")]
pub use policy::{AsyncRepeat, AsyncRetry};
pub use policy::{
    AttemptPolicy, CancellationToken, Cancelled, Repeat, Retry, RetryEvent, Sleeper,
    ThreadSleeper,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::catching::{BoxError, Try, TryError};
    pub use crate::outcome::Outcome;
    #[cfg(feature = "async")]
    pub use crate::policy::{AsyncRepeat, AsyncRetry};
    pub use crate::policy::{AttemptPolicy, CancellationToken, Repeat, Retry};
}
