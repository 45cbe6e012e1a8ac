//! Error types raised by [`Try`](super::Try) accessors.

use std::any::Any;
use std::fmt;

/// A type-erased error, the default error type of [`Try`](super::Try).
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Conditions raised by [`Try`](super::Try) itself, as opposed to errors
/// captured from the wrapped computation.
#[derive(Debug)]
pub enum TryError {
    /// A value was requested but the computation failed.
    NoValue,
    /// A boxed error did not have the type the caller asked for.
    UnexpectedErrorKind {
        /// Name of the requested error type.
        expected: &'static str,
        /// The error that was actually captured.
        source: BoxError,
    },
}

impl TryError {
    /// Returns true if this is [`TryError::NoValue`].
    pub fn is_no_value(&self) -> bool {
        matches!(self, Self::NoValue)
    }

    /// Returns true if this is [`TryError::UnexpectedErrorKind`].
    pub fn is_unexpected_kind(&self) -> bool {
        matches!(self, Self::UnexpectedErrorKind { .. })
    }

    /// Recover the captured error from an unexpected-kind condition.
    pub fn into_source(self) -> Option<BoxError> {
        match self {
            Self::NoValue => None,
            Self::UnexpectedErrorKind { source, .. } => Some(source),
        }
    }
}

impl fmt::Display for TryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoValue => write!(f, "no value present"),
            Self::UnexpectedErrorKind { expected, source } => {
                write!(f, "expected error of type {}, got: {}", expected, source)
            }
        }
    }
}

impl std::error::Error for TryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::NoValue => None,
            Self::UnexpectedErrorKind { source, .. } => Some(source.as_ref()),
        }
    }
}

/// A computation panicked while run under
/// [`Try::run_catching_unwind`](super::Try::run_catching_unwind).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Panicked {
    message: String,
}

impl Panicked {
    /// Build from a panic payload, keeping its message when it has one.
    pub fn from_payload(payload: Box<dyn Any + Send>) -> Self {
        let message = match payload.downcast::<String>() {
            Ok(s) => *s,
            Err(payload) => match payload.downcast::<&'static str>() {
                Ok(s) => (*s).to_string(),
                Err(_) => "<non-string panic payload>".to_string(),
            },
        };
        Self { message }
    }

    /// The panic message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for Panicked {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "computation panicked: {}", self.message)
    }
}

impl std::error::Error for Panicked {}
