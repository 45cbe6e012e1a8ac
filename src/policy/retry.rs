//! Run an operation until it succeeds or the attempt bound is reached.

use std::fmt;
use std::time::{Duration, Instant};

use super::cancel::{CancellationToken, Sleeper, ThreadSleeper};
use super::config::AttemptPolicy;

type Operation<'a, T, E> = Box<dyn FnMut(u32) -> Result<T, E> + 'a>;
type Hook<'a, A> = Box<dyn FnMut(&A) + 'a>;
type RetryHook<'a, E> = Box<dyn FnMut(&RetryEvent<'_, E>) + 'a>;
type Fallback<'a, T, E> = Box<dyn FnOnce(E) -> T + 'a>;

/// Information about a failed attempt that is about to be retried, passed to
/// [`Retry::on_retry`].
#[derive(Debug, Clone)]
pub struct RetryEvent<'a, E> {
    /// Which attempt just failed (1-indexed).
    pub attempt: u32,
    /// The error from the failed attempt.
    pub error: &'a E,
    /// Delay before the next attempt. Always the policy's fixed delay.
    pub next_delay: Duration,
    /// Total elapsed time since first attempt.
    pub elapsed: Duration,
}

/// Retries a fallible operation up to `max_attempts` times.
///
/// The first success ends the run immediately: `on_success` sees the value and
/// it is returned without further attempts or delay. Each failure is reported
/// to `on_failure`. When the final attempt fails, the run resolves through the
/// fallback if one is configured, and otherwise returns that attempt's error
/// as-is.
///
/// A cancelled token aborts the wait between attempts; the run then resolves
/// with the most recent error exactly as if the bound had been reached.
///
/// # Example
///
/// ```rust
/// use repeatable::Retry;
/// use std::time::Duration;
///
/// let result = Retry::times(3, |attempt| {
///     if attempt < 2 {
///         Err(format!("attempt {} failed", attempt))
///     } else {
///         Ok(attempt)
///     }
/// })
/// .with_delay(Duration::from_millis(1))
/// .run();
///
/// assert_eq!(result, Ok(2));
/// ```
pub struct Retry<'a, T, E> {
    policy: AttemptPolicy,
    operation: Operation<'a, T, E>,
    on_success: Hook<'a, T>,
    on_failure: Hook<'a, E>,
    on_retry: RetryHook<'a, E>,
    fallback: Option<Fallback<'a, T, E>>,
    sleeper: Box<dyn Sleeper + 'a>,
    token: CancellationToken,
}

impl<'a, T: 'a, E: 'a> Retry<'a, T, E> {
    /// Retry `operation` under `policy`.
    ///
    /// The operation receives the zero-based attempt index.
    pub fn new<F>(policy: AttemptPolicy, operation: F) -> Self
    where
        F: FnMut(u32) -> Result<T, E> + 'a,
    {
        Self {
            policy,
            operation: Box::new(operation),
            on_success: Box::new(|_| {}),
            on_failure: Box::new(|_| {}),
            on_retry: Box::new(|_| {}),
            fallback: None,
            sleeper: Box::new(ThreadSleeper),
            token: CancellationToken::new(),
        }
    }

    /// Retry `operation` up to `max_attempts` times with no delay.
    pub fn times<F>(max_attempts: u32, operation: F) -> Self
    where
        F: FnMut(u32) -> Result<T, E> + 'a,
    {
        Self::new(AttemptPolicy::attempts(max_attempts), operation)
    }

    /// Wait `delay` between a failed attempt and the next one.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.policy = self.policy.with_delay(delay);
        self
    }

    /// Resolve exhaustion with `fallback(last_error)` instead of failing.
    pub fn or_else<F>(mut self, fallback: F) -> Self
    where
        F: FnOnce(E) -> T + 'a,
    {
        self.fallback = Some(Box::new(fallback));
        self
    }

    /// Called with the value of the successful attempt.
    pub fn on_success<H>(mut self, hook: H) -> Self
    where
        H: FnMut(&T) + 'a,
    {
        self.on_success = Box::new(hook);
        self
    }

    /// Called with the error of every failed attempt, including the last.
    pub fn on_failure<H>(mut self, hook: H) -> Self
    where
        H: FnMut(&E) + 'a,
    {
        self.on_failure = Box::new(hook);
        self
    }

    /// Called after `on_failure` for each failed attempt that will be retried.
    ///
    /// The callback runs before the delay and should not block; use it for
    /// logging or metrics.
    pub fn on_retry<H>(mut self, hook: H) -> Self
    where
        H: FnMut(&RetryEvent<'_, E>) + 'a,
    {
        self.on_retry = Box::new(hook);
        self
    }

    /// Use `sleeper` for the wait between attempts.
    pub fn with_sleeper<S>(mut self, sleeper: S) -> Self
    where
        S: Sleeper + 'a,
    {
        self.sleeper = Box::new(sleeper);
        self
    }

    /// Abort between attempts once `token` is cancelled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.token = token;
        self
    }

    /// The attempt bound and delay this run will use.
    pub fn policy(&self) -> &AttemptPolicy {
        &self.policy
    }

    /// Whether exhaustion resolves through a fallback rather than an error.
    pub fn has_fallback(&self) -> bool {
        self.fallback.is_some()
    }

    /// Drive the attempt loop.
    ///
    /// # Errors
    ///
    /// Returns the final attempt's error when every attempt failed and no
    /// fallback is configured.
    pub fn run(mut self) -> Result<T, E> {
        let start = Instant::now();
        let delay = self.policy.delay();
        let mut attempt = 0u32;

        loop {
            let error = match (self.operation)(attempt) {
                Ok(value) => {
                    (self.on_success)(&value);
                    return Ok(value);
                }
                Err(error) => error,
            };

            (self.on_failure)(&error);

            if self.policy.is_last(attempt) {
                #[cfg(feature = "tracing")]
                tracing::warn!(
                    "retry exhausted after {} attempts ({:?})",
                    attempt + 1,
                    start.elapsed()
                );
                return self.resolve(error);
            }

            (self.on_retry)(&RetryEvent {
                attempt: attempt + 1,
                error: &error,
                next_delay: delay,
                elapsed: start.elapsed(),
            });

            #[cfg(feature = "tracing")]
            tracing::debug!("attempt {} failed, retrying in {:?}", attempt + 1, delay);

            if self.sleeper.sleep(delay, &self.token).is_err() {
                #[cfg(feature = "tracing")]
                tracing::info!("retry cancelled after {} attempts", attempt + 1);
                return self.resolve(error);
            }

            attempt += 1;
        }
    }

    fn resolve(self, error: E) -> Result<T, E> {
        match self.fallback {
            Some(fallback) => Ok(fallback(error)),
            None => Err(error),
        }
    }
}

impl<T, E> fmt::Debug for Retry<'_, T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Retry")
            .field("policy", &self.policy)
            .field("has_fallback", &self.fallback.is_some())
            .field("token", &self.token)
            .finish_non_exhaustive()
    }
}
