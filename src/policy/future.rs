//! Async forms of [`Repeat`](crate::Repeat) and [`Retry`](crate::Retry).
//!
//! Semantics match the blocking forms exactly. Attempts still run one after
//! another; the delay is a tokio timer raced against the cancellation token
//! instead of a blocked thread.

use std::fmt;
use std::future::Future;
use std::time::{Duration, Instant};

use futures::future::{BoxFuture, FutureExt};

use super::cancel::{CancellationToken, Cancelled};
use super::config::AttemptPolicy;
use super::retry::RetryEvent;
use crate::outcome::Outcome;

type Operation<'a, T, E> = Box<dyn FnMut(u32) -> BoxFuture<'a, Result<T, E>> + Send + 'a>;
type Predicate<'a, T, E> = Box<dyn Fn(Option<&T>, Option<&E>) -> bool + Send + 'a>;
type Hook<'a, A> = Box<dyn FnMut(&A) + Send + 'a>;
type RetryHook<'a, E> = Box<dyn FnMut(&RetryEvent<'_, E>) + Send + 'a>;

/// Wait `delay` on the tokio timer unless `token` is cancelled first.
async fn pause(delay: Duration, token: &CancellationToken) -> Result<(), Cancelled> {
    if token.is_cancelled() {
        return Err(Cancelled);
    }
    tokio::select! {
        _ = tokio::time::sleep(delay) => Ok(()),
        _ = token.cancelled() => Err(Cancelled),
    }
}

fn boxed_operation<'a, T, E, F, Fut>(mut operation: F) -> Operation<'a, T, E>
where
    F: FnMut(u32) -> Fut + Send + 'a,
    Fut: Future<Output = Result<T, E>> + Send + 'a,
{
    Box::new(move |attempt| operation(attempt).boxed())
}

/// Async [`Repeat`](crate::Repeat).
///
/// # Example
///
/// ```rust
/// use repeatable::AsyncRepeat;
///
/// # tokio_test::block_on(async {
/// let value = AsyncRepeat::times(5, |attempt| async move { Ok::<_, String>(attempt) })
///     .repeat_while(|value, _| value.map_or(true, |v| *v < 3))
///     .run()
///     .await;
///
/// assert_eq!(value, Some(3));
/// # });
/// ```
pub struct AsyncRepeat<'a, T, E> {
    policy: AttemptPolicy,
    operation: Operation<'a, T, E>,
    condition: Predicate<'a, T, E>,
    fallback: Box<dyn FnOnce() -> Option<T> + Send + 'a>,
    token: CancellationToken,
}

impl<'a, T: Send + 'a, E: Send + 'a> AsyncRepeat<'a, T, E> {
    /// Repeat `operation` under `policy`.
    pub fn new<F, Fut>(policy: AttemptPolicy, operation: F) -> Self
    where
        F: FnMut(u32) -> Fut + Send + 'a,
        Fut: Future<Output = Result<T, E>> + Send + 'a,
    {
        Self {
            policy,
            operation: boxed_operation(operation),
            condition: Box::new(|_, _| true),
            fallback: Box::new(|| None),
            token: CancellationToken::new(),
        }
    }

    /// Repeat `operation` up to `times` times with no delay.
    pub fn times<F, Fut>(times: u32, operation: F) -> Self
    where
        F: FnMut(u32) -> Fut + Send + 'a,
        Fut: Future<Output = Result<T, E>> + Send + 'a,
    {
        Self::new(AttemptPolicy::attempts(times), operation)
    }

    /// Keep going only while `condition` returns `true`.
    pub fn repeat_while<P>(mut self, condition: P) -> Self
    where
        P: Fn(Option<&T>, Option<&E>) -> bool + Send + 'a,
    {
        self.condition = Box::new(condition);
        self
    }

    /// Wait `delay` between attempts.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.policy = self.policy.with_delay(delay);
        self
    }

    /// Produce a value when no attempt produced one.
    pub fn or_else<F>(mut self, fallback: F) -> Self
    where
        F: FnOnce() -> T + Send + 'a,
    {
        self.fallback = Box::new(move || Some(fallback()));
        self
    }

    /// Abort between attempts once `token` is cancelled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.token = token;
        self
    }

    /// Drive the attempt loop.
    pub async fn run(mut self) -> Option<T> {
        let max_attempts = self.policy.max_attempts();
        let delay = self.policy.delay();
        let mut value: Option<T> = None;
        let mut attempt = 0u32;

        while attempt < max_attempts {
            let (produced, error) = Outcome::from((self.operation)(attempt).await).into_parts();
            if produced.is_some() {
                value = produced;
            }

            if !(self.condition)(value.as_ref(), error.as_ref()) {
                #[cfg(feature = "tracing")]
                tracing::debug!("repeat stopped by predicate after attempt {}", attempt + 1);
                break;
            }

            attempt += 1;
            if attempt < max_attempts && pause(delay, &self.token).await.is_err() {
                #[cfg(feature = "tracing")]
                tracing::info!("repeat cancelled after {} attempts", attempt);
                break;
            }
        }

        value.or_else(self.fallback)
    }
}

impl<T, E> fmt::Debug for AsyncRepeat<'_, T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsyncRepeat")
            .field("policy", &self.policy)
            .field("token", &self.token)
            .finish_non_exhaustive()
    }
}

/// Async [`Retry`](crate::Retry).
///
/// # Example
///
/// ```rust
/// use repeatable::AsyncRetry;
/// use std::time::Duration;
///
/// # tokio_test::block_on(async {
/// let result = AsyncRetry::times(3, |attempt| async move {
///     if attempt == 0 { Err("cold cache") } else { Ok(attempt) }
/// })
/// .with_delay(Duration::from_millis(1))
/// .run()
/// .await;
///
/// assert_eq!(result, Ok(1));
/// # });
/// ```
pub struct AsyncRetry<'a, T, E> {
    policy: AttemptPolicy,
    operation: Operation<'a, T, E>,
    on_success: Hook<'a, T>,
    on_failure: Hook<'a, E>,
    on_retry: RetryHook<'a, E>,
    fallback: Option<Box<dyn FnOnce(E) -> T + Send + 'a>>,
    token: CancellationToken,
}

impl<'a, T: Send + 'a, E: Send + 'a> AsyncRetry<'a, T, E> {
    /// Retry `operation` under `policy`.
    pub fn new<F, Fut>(policy: AttemptPolicy, operation: F) -> Self
    where
        F: FnMut(u32) -> Fut + Send + 'a,
        Fut: Future<Output = Result<T, E>> + Send + 'a,
    {
        Self {
            policy,
            operation: boxed_operation(operation),
            on_success: Box::new(|_| {}),
            on_failure: Box::new(|_| {}),
            on_retry: Box::new(|_| {}),
            fallback: None,
            token: CancellationToken::new(),
        }
    }

    /// Retry `operation` up to `max_attempts` times with no delay.
    pub fn times<F, Fut>(max_attempts: u32, operation: F) -> Self
    where
        F: FnMut(u32) -> Fut + Send + 'a,
        Fut: Future<Output = Result<T, E>> + Send + 'a,
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
        F: FnOnce(E) -> T + Send + 'a,
    {
        self.fallback = Some(Box::new(fallback));
        self
    }

    /// Called with the value of the successful attempt.
    pub fn on_success<H>(mut self, hook: H) -> Self
    where
        H: FnMut(&T) + Send + 'a,
    {
        self.on_success = Box::new(hook);
        self
    }

    /// Called with the error of every failed attempt, including the last.
    pub fn on_failure<H>(mut self, hook: H) -> Self
    where
        H: FnMut(&E) + Send + 'a,
    {
        self.on_failure = Box::new(hook);
        self
    }

    /// Called after `on_failure` for each failed attempt that will be retried.
    pub fn on_retry<H>(mut self, hook: H) -> Self
    where
        H: FnMut(&RetryEvent<'_, E>) + Send + 'a,
    {
        self.on_retry = Box::new(hook);
        self
    }

    /// Abort between attempts once `token` is cancelled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.token = token;
        self
    }

    /// Drive the attempt loop.
    ///
    /// # Errors
    ///
    /// Returns the final attempt's error when every attempt failed and no
    /// fallback is configured.
    pub async fn run(mut self) -> Result<T, E> {
        let start = Instant::now();
        let delay = self.policy.delay();
        let mut attempt = 0u32;

        loop {
            let error = match (self.operation)(attempt).await {
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

            if pause(delay, &self.token).await.is_err() {
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

impl<T, E> fmt::Debug for AsyncRetry<'_, T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsyncRetry")
            .field("policy", &self.policy)
            .field("has_fallback", &self.fallback.is_some())
            .field("token", &self.token)
            .finish_non_exhaustive()
    }
}
