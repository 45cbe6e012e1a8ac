//! The result of a single attempt: a produced value or a captured error.
//!
//! [`Repeat`](crate::Repeat) splits every attempt's `Outcome` into the pair its
//! continuation predicate sees, and [`Try`](crate::Try) persists one. It is a
//! plain two-variant enum: exactly one of `Value` or `Error`, never both,
//! never neither.
//!
//! # Example
//!
//! ```rust
//! use repeatable::Outcome;
//!
//! let ok: Outcome<i32, &str> = "42".parse::<i32>().map_err(|_| "bad").into();
//! assert!(ok.is_value());
//! assert_eq!(ok.value(), Some(&42));
//!
//! let err: Outcome<i32, &str> = Outcome::error("bad");
//! assert_eq!(err.into_result(), Err("bad"));
//! ```

/// A produced value or a captured error.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Outcome<T, E> {
    /// The computation returned normally.
    Value(T),
    /// The computation failed.
    Error(E),
}

impl<T, E> Outcome<T, E> {
    /// Create a `Value` outcome.
    #[inline]
    pub fn value_of(value: T) -> Self {
        Outcome::Value(value)
    }

    /// Create an `Error` outcome.
    #[inline]
    pub fn error(error: E) -> Self {
        Outcome::Error(error)
    }

    /// Run `f` once and capture what it returns.
    #[inline]
    pub fn capture<F>(f: F) -> Self
    where
        F: FnOnce() -> Result<T, E>,
    {
        f().into()
    }

    /// Returns `true` if this is a `Value`.
    #[inline]
    pub fn is_value(&self) -> bool {
        matches!(self, Outcome::Value(_))
    }

    /// Returns `true` if this is an `Error`.
    #[inline]
    pub fn is_error(&self) -> bool {
        matches!(self, Outcome::Error(_))
    }

    /// Borrow the value, if any.
    #[inline]
    pub fn value(&self) -> Option<&T> {
        match self {
            Outcome::Value(v) => Some(v),
            Outcome::Error(_) => None,
        }
    }

    /// Borrow the error, if any.
    #[inline]
    pub fn error_ref(&self) -> Option<&E> {
        match self {
            Outcome::Value(_) => None,
            Outcome::Error(e) => Some(e),
        }
    }

    /// Convert to `Outcome<&T, &E>`.
    #[inline]
    pub fn as_ref(&self) -> Outcome<&T, &E> {
        match self {
            Outcome::Value(v) => Outcome::Value(v),
            Outcome::Error(e) => Outcome::Error(e),
        }
    }

    /// Transform the value, passing errors through unchanged.
    #[inline]
    pub fn map<U, F>(self, f: F) -> Outcome<U, E>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            Outcome::Value(v) => Outcome::Value(f(v)),
            Outcome::Error(e) => Outcome::Error(e),
        }
    }

    /// Transform the error, passing values through unchanged.
    #[inline]
    pub fn map_err<E2, F>(self, f: F) -> Outcome<T, E2>
    where
        F: FnOnce(E) -> E2,
    {
        match self {
            Outcome::Value(v) => Outcome::Value(v),
            Outcome::Error(e) => Outcome::Error(f(e)),
        }
    }

    /// Fold both variants into a single value.
    #[inline]
    pub fn fold<U, F, G>(self, value_fn: F, error_fn: G) -> U
    where
        F: FnOnce(T) -> U,
        G: FnOnce(E) -> U,
    {
        match self {
            Outcome::Value(v) => value_fn(v),
            Outcome::Error(e) => error_fn(e),
        }
    }

    /// Split into a `(value, error)` pair with exactly one side set.
    #[inline]
    pub fn into_parts(self) -> (Option<T>, Option<E>) {
        match self {
            Outcome::Value(v) => (Some(v), None),
            Outcome::Error(e) => (None, Some(e)),
        }
    }

    /// Convert to a standard `Result`.
    #[inline]
    pub fn into_result(self) -> Result<T, E> {
        match self {
            Outcome::Value(v) => Ok(v),
            Outcome::Error(e) => Err(e),
        }
    }
}

impl<T, E> From<Result<T, E>> for Outcome<T, E> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(v) => Outcome::Value(v),
            Err(e) => Outcome::Error(e),
        }
    }
}

impl<T, E> From<Outcome<T, E>> for Result<T, E> {
    fn from(outcome: Outcome<T, E>) -> Self {
        outcome.into_result()
    }
}
