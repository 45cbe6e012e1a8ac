//! Cancellation and the inter-attempt wait.
//!
//! The only suspension point in a policy run is the delay between attempts.
//! It is expressed through the [`Sleeper`] trait so hosts can choose how to
//! wait, and every wait observes a [`CancellationToken`]. Cancelling the token
//! wakes a waiting run promptly and prevents any further attempt from
//! starting. The token is never reset by this crate: once a caller cancels,
//! the flag stays raised for the caller to inspect afterwards.

use std::fmt;
use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::time::Duration;

/// A shared, cloneable cancellation flag.
///
/// # Example
///
/// ```rust
/// use repeatable::CancellationToken;
///
/// let token = CancellationToken::new();
/// let handle = token.clone();
///
/// assert!(!token.is_cancelled());
/// handle.cancel();
/// assert!(token.is_cancelled());
/// ```
#[derive(Clone, Default)]
pub struct CancellationToken {
    inner: Arc<Inner>,
}

#[derive(Default)]
struct Inner {
    cancelled: Mutex<bool>,
    condvar: Condvar,
    #[cfg(feature = "async")]
    notify: tokio::sync::Notify,
}

impl CancellationToken {
    /// Create a token that has not been cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise the flag and wake every run currently waiting on it.
    pub fn cancel(&self) {
        let mut cancelled = self
            .inner
            .cancelled
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        *cancelled = true;
        drop(cancelled);

        self.inner.condvar.notify_all();
        #[cfg(feature = "async")]
        self.inner.notify.notify_waiters();
    }

    /// Whether [`cancel`](Self::cancel) has been called on this token or a clone.
    pub fn is_cancelled(&self) -> bool {
        *self
            .inner
            .cancelled
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Block the current thread for up to `timeout`, returning early on cancel.
    ///
    /// Returns `true` if the token was cancelled before the timeout elapsed.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let guard = self
            .inner
            .cancelled
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let (guard, _) = self
            .inner
            .condvar
            .wait_timeout_while(guard, timeout, |cancelled| !*cancelled)
            .unwrap_or_else(PoisonError::into_inner);
        *guard
    }

    /// Resolve once the token is cancelled.
    #[cfg(feature = "async")]
    pub async fn cancelled(&self) {
        loop {
            // Registered before the check so a concurrent cancel is not missed.
            let notified = self.inner.notify.notified();
            if self.is_cancelled() {
                return;
            }
            notified.await;
        }
    }
}

impl fmt::Debug for CancellationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CancellationToken")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

/// Returned by a [`Sleeper`] when the wait was cut short by cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cancelled;

impl fmt::Display for Cancelled {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "wait cancelled")
    }
}

impl std::error::Error for Cancelled {}

/// A cancelable wait for a fixed duration.
///
/// Implementations must return `Err(Cancelled)` if the token is already
/// cancelled on entry, or becomes cancelled before the duration elapses.
pub trait Sleeper {
    /// Wait for `duration` unless `token` is cancelled first.
    fn sleep(&self, duration: Duration, token: &CancellationToken) -> Result<(), Cancelled>;
}

impl<S: Sleeper + ?Sized> Sleeper for &S {
    fn sleep(&self, duration: Duration, token: &CancellationToken) -> Result<(), Cancelled> {
        (**self).sleep(duration, token)
    }
}

impl<S: Sleeper + ?Sized> Sleeper for Arc<S> {
    fn sleep(&self, duration: Duration, token: &CancellationToken) -> Result<(), Cancelled> {
        (**self).sleep(duration, token)
    }
}

/// Blocks the calling thread. The default sleeper for [`Repeat`](crate::Repeat)
/// and [`Retry`](crate::Retry).
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration, token: &CancellationToken) -> Result<(), Cancelled> {
        if token.is_cancelled() {
            return Err(Cancelled);
        }
        if duration.is_zero() {
            return Ok(());
        }
        if token.wait_timeout(duration) {
            Err(Cancelled)
        } else {
            Ok(())
        }
    }
}
