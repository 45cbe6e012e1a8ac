//! Run an operation a bounded number of times while a predicate holds.

use std::fmt;
use std::time::Duration;

use super::cancel::{CancellationToken, Sleeper, ThreadSleeper};
use super::config::AttemptPolicy;
use crate::outcome::Outcome;

type Operation<'a, T, E> = Box<dyn FnMut(u32) -> Result<T, E> + 'a>;
type Predicate<'a, T, E> = Box<dyn Fn(Option<&T>, Option<&E>) -> bool + 'a>;
type Fallback<'a, T> = Box<dyn FnOnce() -> Option<T> + 'a>;

/// Repeats an operation up to `max_attempts` times.
///
/// After every attempt the continuation predicate sees the most recently
/// produced value (which may come from an earlier attempt) and the error of
/// the attempt that just ran, if it failed. The loop stops as soon as the
/// predicate returns `false`, when the attempt bound is reached, or when the
/// cancellation token fires during a delay.
///
/// Errors from the operation never escape [`run`](Repeat::run); they are only
/// visible to the predicate.
///
/// # Example
///
/// ```rust
/// use repeatable::Repeat;
///
/// // Poll until a value above 2 shows up.
/// let value = Repeat::times(10, |attempt| Ok::<_, String>(attempt * 2))
///     .repeat_while(|value, _err| value.map_or(true, |v| *v <= 2))
///     .run();
///
/// assert_eq!(value, Some(4));
/// ```
pub struct Repeat<'a, T, E> {
    policy: AttemptPolicy,
    operation: Operation<'a, T, E>,
    condition: Predicate<'a, T, E>,
    fallback: Fallback<'a, T>,
    sleeper: Box<dyn Sleeper + 'a>,
    token: CancellationToken,
}

impl<'a, T: 'a, E: 'a> Repeat<'a, T, E> {
    /// Repeat `operation` under `policy`.
    ///
    /// The operation receives the zero-based attempt index.
    pub fn new<F>(policy: AttemptPolicy, operation: F) -> Self
    where
        F: FnMut(u32) -> Result<T, E> + 'a,
    {
        Self {
            policy,
            operation: Box::new(operation),
            condition: Box::new(|_, _| true),
            fallback: Box::new(|| None),
            sleeper: Box::new(ThreadSleeper),
            token: CancellationToken::new(),
        }
    }

    /// Repeat `operation` up to `times` times with no delay.
    pub fn times<F>(times: u32, operation: F) -> Self
    where
        F: FnMut(u32) -> Result<T, E> + 'a,
    {
        Self::new(AttemptPolicy::attempts(times), operation)
    }

    /// Keep going only while `condition` returns `true`.
    ///
    /// Defaults to always `true`, which runs every allowed attempt.
    pub fn repeat_while<P>(mut self, condition: P) -> Self
    where
        P: Fn(Option<&T>, Option<&E>) -> bool + 'a,
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
        F: FnOnce() -> T + 'a,
    {
        self.fallback = Box::new(move || Some(fallback()));
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

    /// Drive the attempt loop.
    ///
    /// Returns the most recently produced value, or the fallback's value when
    /// no attempt succeeded. Without a fallback that case yields `None`.
    pub fn run(mut self) -> Option<T> {
        let max_attempts = self.policy.max_attempts();
        let delay = self.policy.delay();
        let mut value: Option<T> = None;
        let mut attempt = 0u32;

        while attempt < max_attempts {
            let (produced, error) = Outcome::from((self.operation)(attempt)).into_parts();
            if produced.is_some() {
                value = produced;
            }

            if !(self.condition)(value.as_ref(), error.as_ref()) {
                #[cfg(feature = "tracing")]
                tracing::debug!("repeat stopped by predicate after attempt {}", attempt + 1);
                break;
            }

            attempt += 1;
            if attempt < max_attempts && self.sleeper.sleep(delay, &self.token).is_err() {
                #[cfg(feature = "tracing")]
                tracing::info!("repeat cancelled after {} attempts", attempt);
                break;
            }
        }

        value.or_else(self.fallback)
    }
}

impl<T, E> fmt::Debug for Repeat<'_, T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Repeat")
            .field("policy", &self.policy)
            .field("token", &self.token)
            .finish_non_exhaustive()
    }
}
