//! Testing utilities and helpers for repeatable
//!
//! This module provides ergonomic utilities for testing code that uses
//! repeat/retry policies and [`Try`](crate::Try). It includes a sleeper that
//! records delays instead of blocking, assertion macros, and property-based
//! testing support.
//!
//! # Examples
//!
//! ## RecordingSleeper
//!
//! ```rust
//! use repeatable::testing::RecordingSleeper;
//! use repeatable::Retry;
//! use std::time::Duration;
//!
//! let sleeper = RecordingSleeper::new();
//!
//! let result = Retry::<(), _>::times(3, |_| Err("down"))
//!     .with_delay(Duration::from_secs(30))
//!     .with_sleeper(sleeper.clone())
//!     .run();
//!
//! assert_eq!(result, Err("down"));
//! assert_eq!(sleeper.delays(), vec![Duration::from_secs(30); 2]);
//! ```
//!
//! ## Assertion Macros
//!
//! ```rust
//! use repeatable::{Try, assert_success, assert_failure};
//!
//! let success = Try::<_, String>::success(42);
//! assert_success!(success);
//!
//! let failure = Try::<i32, _>::failure("error".to_string());
//! assert_failure!(failure);
//! ```

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use crate::policy::{CancellationToken, Cancelled, Sleeper};

/// A [`Sleeper`] that records every requested delay and returns immediately.
///
/// Clones share the same record, so keep a clone to inspect after handing one
/// to a policy. It can also simulate a cancellation arriving mid-run with
/// [`cancel_after`](RecordingSleeper::cancel_after).
#[derive(Debug, Clone, Default)]
pub struct RecordingSleeper {
    delays: Arc<Mutex<Vec<Duration>>>,
    cancel_after: Option<usize>,
}

impl RecordingSleeper {
    /// Create a sleeper with an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel the run's token on the `n`th wait (1-indexed).
    ///
    /// Waits before the `n`th succeed and are recorded; the `n`th cancels the
    /// token and reports [`Cancelled`] without being recorded.
    pub fn cancel_after(mut self, n: usize) -> Self {
        self.cancel_after = Some(n);
        self
    }

    /// Every delay requested so far, in order.
    pub fn delays(&self) -> Vec<Duration> {
        self.delays
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Sum of the recorded delays.
    pub fn total(&self) -> Duration {
        self.delays().iter().sum()
    }
}

impl Sleeper for RecordingSleeper {
    fn sleep(&self, duration: Duration, token: &CancellationToken) -> Result<(), Cancelled> {
        if token.is_cancelled() {
            return Err(Cancelled);
        }

        let mut delays = self.delays.lock().unwrap_or_else(PoisonError::into_inner);
        if self.cancel_after == Some(delays.len() + 1) {
            drop(delays);
            token.cancel();
            return Err(Cancelled);
        }
        delays.push(duration);
        Ok(())
    }
}

/// Assert that a `Try` succeeded.
///
/// This macro will panic if the `Try` is a failure.
///
/// # Example
///
/// ```rust
/// use repeatable::{Try, assert_success};
///
/// let t = Try::run_catching(|| "7".parse::<i32>());
/// assert_success!(t);
/// ```
#[macro_export]
macro_rules! assert_success {
    ($try_value:expr) => {
        match $try_value.into_outcome() {
            $crate::Outcome::Value(_) => {}
            $crate::Outcome::Error(e) => {
                panic!("Expected Success, got Failure: {:?}", e);
            }
        }
    };
}

/// Assert that a `Try` failed.
///
/// This macro will panic if the `Try` is a success.
///
/// # Example
///
/// ```rust
/// use repeatable::{Try, assert_failure};
///
/// let t = Try::run_catching(|| "seven".parse::<i32>());
/// assert_failure!(t);
/// ```
#[macro_export]
macro_rules! assert_failure {
    ($try_value:expr) => {
        match $try_value.into_outcome() {
            $crate::Outcome::Error(_) => {}
            $crate::Outcome::Value(v) => {
                panic!("Expected Failure, got Success: {:?}", v);
            }
        }
    };
}

/// Assert that a `Try` failed with a specific error.
///
/// This macro will panic if the `Try` is a success or if the error doesn't
/// match the expected one.
///
/// # Example
///
/// ```rust
/// use repeatable::{Try, assert_try_error};
///
/// let t = Try::<i32, _>::failure("timeout");
/// assert_try_error!(t, "timeout");
/// ```
#[macro_export]
macro_rules! assert_try_error {
    ($try_value:expr, $expected:expr) => {
        match $try_value.into_outcome() {
            $crate::Outcome::Error(error) => {
                assert_eq!(error, $expected);
            }
            $crate::Outcome::Value(v) => {
                panic!(
                    "Expected Failure with error {:?}, got Success: {:?}",
                    $expected, v
                );
            }
        }
    };
}

#[cfg(feature = "proptest")]
use proptest::prelude::*;

#[cfg(feature = "proptest")]
impl<T, E> Arbitrary for crate::Outcome<T, E>
where
    T: Arbitrary + 'static,
    E: Arbitrary + 'static,
{
    type Parameters = (T::Parameters, E::Parameters);
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(args: Self::Parameters) -> Self::Strategy {
        let (t_params, e_params) = args;
        prop_oneof![
            any_with::<T>(t_params).prop_map(crate::Outcome::Value),
            any_with::<E>(e_params).prop_map(crate::Outcome::Error),
        ]
        .boxed()
    }
}

#[cfg(feature = "proptest")]
impl<T, E> Arbitrary for crate::Try<T, E>
where
    T: Arbitrary + 'static,
    E: Arbitrary + 'static,
{
    type Parameters = (T::Parameters, E::Parameters);
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(args: Self::Parameters) -> Self::Strategy {
        any_with::<crate::Outcome<T, E>>(args)
            .prop_map(|outcome| crate::Try::from(outcome.into_result()))
            .boxed()
    }
}
