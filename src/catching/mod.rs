//! Capture the outcome of a fallible computation as a value.
//!
//! [`Try`] runs a computation once, at construction, and keeps whatever it
//! produced: a value or an error. Nothing is re-run afterwards; every accessor
//! reads the stored [`Outcome`].
//!
//! # Examples
//!
//! ```rust
//! use repeatable::Try;
//!
//! let port = Try::run_catching(|| "8080".parse::<u16>());
//! assert!(port.is_success());
//! assert_eq!(port.get_or_default(80), 8080);
//!
//! let port = Try::run_catching(|| "http".parse::<u16>());
//! assert!(port.is_failure());
//! assert_eq!(port.get_or_null(), None);
//! assert_eq!(port.get_or_default(80), 80);
//! ```
//!
//! The shortcuts skip the wrapper entirely:
//!
//! ```rust
//! use repeatable::Try;
//!
//! let n = Try::run_catching_or_else(|| "x".parse::<i32>(), -1);
//! assert_eq!(n, -1);
//!
//! let err = Try::run_catching_or_throw(|| "x".parse::<i32>(), |e| format!("bad input: {}", e));
//! assert!(err.unwrap_err().starts_with("bad input"));
//! ```

mod error;

pub use error::{BoxError, Panicked, TryError};

use std::panic::{self, AssertUnwindSafe};

use crate::Outcome;

/// An eagerly evaluated, immutable capture of a computation's outcome.
///
/// The error type defaults to [`BoxError`], so any error can be captured
/// with `?`. Use [`downcast_error`](Try::downcast_error) to recover a concrete
/// type with a checked conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "a Try holds the outcome of a computation that already ran"]
pub struct Try<T, E = BoxError> {
    outcome: Outcome<T, E>,
}

impl<T, E> Try<T, E> {
    // ========== Constructors ==========

    /// Run `f` now and capture its outcome.
    ///
    /// For an action with no result, `T` is `()`.
    ///
    /// ```rust
    /// use repeatable::Try;
    ///
    /// let flushed: Try<(), String> = Try::run_catching(|| Err("disk full".to_string()));
    /// assert!(flushed.is_failure());
    /// ```
    pub fn run_catching<F>(f: F) -> Self
    where
        F: FnOnce() -> Result<T, E>,
    {
        Self {
            outcome: Outcome::capture(f),
        }
    }

    /// Run `f` now, capturing panics as well as returned errors.
    ///
    /// A panic becomes a failure holding `E::from(Panicked)`.
    ///
    /// ```rust
    /// use repeatable::{BoxError, Try};
    ///
    /// let t: Try<i32> = Try::run_catching_unwind(|| -> Result<i32, BoxError> {
    ///     panic!("index out of range")
    /// });
    /// assert!(t.is_failure());
    /// ```
    pub fn run_catching_unwind<F>(f: F) -> Self
    where
        F: FnOnce() -> Result<T, E>,
        E: From<Panicked>,
    {
        match panic::catch_unwind(AssertUnwindSafe(f)) {
            Ok(result) => result.into(),
            Err(payload) => Self::failure(Panicked::from_payload(payload).into()),
        }
    }

    /// Run `f` and return its value, or `default` if it failed.
    pub fn run_catching_or_else<F>(f: F, default: T) -> T
    where
        F: FnOnce() -> Result<T, E>,
    {
        f().unwrap_or(default)
    }

    /// Run `f` and return its value, replacing a failure with `mapper(error)`.
    ///
    /// # Errors
    ///
    /// Returns the mapped error, never the original one.
    pub fn run_catching_or_throw<F, M, X>(f: F, mapper: M) -> Result<T, X>
    where
        F: FnOnce() -> Result<T, E>,
        M: FnOnce(E) -> X,
    {
        f().map_err(mapper)
    }

    /// A successful `Try` holding `value`.
    pub fn success(value: T) -> Self {
        Self {
            outcome: Outcome::Value(value),
        }
    }

    /// A failed `Try` holding `error`.
    pub fn failure(error: E) -> Self {
        Self {
            outcome: Outcome::Error(error),
        }
    }

    // ========== Classification ==========

    /// Returns `true` if the computation returned normally.
    #[inline]
    pub fn is_success(&self) -> bool {
        self.outcome.is_value()
    }

    /// Returns `true` if the computation failed.
    #[inline]
    pub fn is_failure(&self) -> bool {
        self.outcome.is_error()
    }

    // ========== Hooks ==========

    /// Call `handler` with the value if this is a success.
    pub fn on_success<F>(self, handler: F) -> Self
    where
        F: FnOnce(&T),
    {
        if let Outcome::Value(v) = &self.outcome {
            handler(v);
        }
        self
    }

    /// Call `handler` with the error if this is a failure.
    pub fn on_failure<F>(self, handler: F) -> Self
    where
        F: FnOnce(&E),
    {
        if let Outcome::Error(e) = &self.outcome {
            handler(e);
        }
        self
    }

    // ========== Accessors ==========

    /// Extract the value.
    ///
    /// # Errors
    ///
    /// Returns [`TryError::NoValue`] if the computation failed.
    pub fn get(self) -> Result<T, TryError> {
        match self.outcome {
            Outcome::Value(v) => Ok(v),
            Outcome::Error(_) => Err(TryError::NoValue),
        }
    }

    /// Borrow the value, or `None` on failure. Never fails.
    pub fn get_or_null(&self) -> Option<&T> {
        self.outcome.value()
    }

    /// Borrow the value, if any. Same as [`get_or_null`](Self::get_or_null).
    pub fn value(&self) -> Option<&T> {
        self.outcome.value()
    }

    /// Borrow the captured error, if any.
    pub fn error(&self) -> Option<&E> {
        self.outcome.error_ref()
    }

    /// The value on success, `default` on failure.
    pub fn get_or_default(self, default: T) -> T {
        self.get_or_else_with(|| default)
    }

    /// The value on success, otherwise a substitute computed from the error.
    pub fn get_or_else<F>(self, f: F) -> T
    where
        F: FnOnce(E) -> T,
    {
        self.outcome.fold(|v| v, f)
    }

    /// The value on success, otherwise a substitute from `supplier`.
    pub fn get_or_else_with<F>(self, supplier: F) -> T
    where
        F: FnOnce() -> T,
    {
        self.outcome.fold(|v| v, |_| supplier())
    }

    /// The value on success; on failure, the error mapped through `mapper`.
    ///
    /// # Errors
    ///
    /// Returns `mapper(error)` if the computation failed.
    pub fn get_or_throw<F, X>(self, mapper: F) -> Result<T, X>
    where
        F: FnOnce(E) -> X,
    {
        self.outcome.into_result().map_err(mapper)
    }

    // ========== Transformations ==========

    /// Transform the value, passing failures through unchanged.
    pub fn map<U, F>(self, f: F) -> Try<U, E>
    where
        F: FnOnce(T) -> U,
    {
        Try {
            outcome: self.outcome.map(f),
        }
    }

    /// Transform the error, passing successes through unchanged.
    pub fn map_err<E2, F>(self, f: F) -> Try<T, E2>
    where
        F: FnOnce(E) -> E2,
    {
        Try {
            outcome: self.outcome.map_err(f),
        }
    }

    /// Chain another fallible computation on success.
    pub fn and_then<U, F>(self, f: F) -> Try<U, E>
    where
        F: FnOnce(T) -> Result<U, E>,
    {
        match self.outcome {
            Outcome::Value(v) => Try::run_catching(|| f(v)),
            Outcome::Error(e) => Try::failure(e),
        }
    }

    /// Borrow the stored outcome.
    pub fn as_outcome(&self) -> &Outcome<T, E> {
        &self.outcome
    }

    /// Unwrap into the stored outcome.
    pub fn into_outcome(self) -> Outcome<T, E> {
        self.outcome
    }

    /// Convert to a standard `Result`.
    pub fn into_result(self) -> Result<T, E> {
        self.outcome.into_result()
    }
}

impl<T, E> Try<Option<T>, E> {
    /// Extract a value that must be both successful and present.
    ///
    /// Treats a success holding `None` the same as a failure.
    ///
    /// # Errors
    ///
    /// Returns [`TryError::NoValue`] on failure or when the value is `None`.
    pub fn get_some(self) -> Result<T, TryError> {
        self.get()?.ok_or(TryError::NoValue)
    }
}

impl<T> Try<T, BoxError> {
    /// Checked conversion of the boxed error to a concrete type.
    ///
    /// Successes convert unconditionally. A failure converts only when the
    /// captured error really is an `X`.
    ///
    /// # Errors
    ///
    /// Returns [`TryError::UnexpectedErrorKind`] carrying the original error
    /// when it is not an `X`.
    ///
    /// ```rust
    /// use repeatable::{BoxError, Try};
    /// use std::num::ParseIntError;
    ///
    /// let t: Try<i32> = Try::run_catching(|| Ok::<_, BoxError>("x".parse::<i32>()?));
    /// let typed: Try<i32, ParseIntError> = t.downcast_error().unwrap();
    /// assert!(typed.is_failure());
    /// ```
    pub fn downcast_error<X>(self) -> Result<Try<T, X>, TryError>
    where
        X: std::error::Error + 'static,
    {
        match self.outcome {
            Outcome::Value(v) => Ok(Try::success(v)),
            Outcome::Error(e) => match e.downcast::<X>() {
                Ok(x) => Ok(Try::failure(*x)),
                Err(source) => Err(TryError::UnexpectedErrorKind {
                    expected: std::any::type_name::<X>(),
                    source,
                }),
            },
        }
    }
}

impl<T, E> From<Result<T, E>> for Try<T, E> {
    fn from(result: Result<T, E>) -> Self {
        Self {
            outcome: result.into(),
        }
    }
}

impl<T, E> From<Try<T, E>> for Result<T, E> {
    fn from(t: Try<T, E>) -> Self {
        t.into_result()
    }
}
