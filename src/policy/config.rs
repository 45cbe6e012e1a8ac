//! Attempt bound and delay configuration.

use std::time::Duration;

/// How many times to run an operation and how long to wait in between.
///
/// Policies are pure data: they describe the attempt loop but don't execute it.
/// The same policy can back any number of [`Repeat`](crate::Repeat) or
/// [`Retry`](crate::Retry) runs.
///
/// # Bounds
///
/// `max_attempts` is always at least one. Asking for zero attempts is treated as
/// asking for one, so a policy can never describe a loop that skips the operation
/// entirely.
///
/// # Examples
///
/// ```rust
/// use repeatable::AttemptPolicy;
/// use std::time::Duration;
///
/// let policy = AttemptPolicy::attempts(3).with_delay(Duration::from_millis(50));
///
/// assert_eq!(policy.max_attempts(), 3);
/// assert_eq!(policy.delay_before(0), None); // the first attempt never waits
/// assert_eq!(policy.delay_before(1), Some(Duration::from_millis(50)));
/// assert_eq!(policy.delay_before(3), None); // past the bound
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AttemptPolicy {
    #[cfg_attr(feature = "serde", serde(deserialize_with = "de::at_least_one"))]
    max_attempts: u32,
    #[cfg_attr(feature = "serde", serde(default))]
    delay: Duration,
}

impl AttemptPolicy {
    /// A policy running at most `max_attempts` times with no delay.
    pub fn attempts(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay: Duration::ZERO,
        }
    }

    /// A policy that runs the operation exactly once.
    pub fn once() -> Self {
        Self::attempts(1)
    }

    /// Set the fixed delay applied between attempts.
    ///
    /// The delay is never applied before the first attempt, after the final
    /// attempt, or after an attempt that ends the run.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Change the attempt bound, keeping the delay.
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Maximum number of attempts, including the first.
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Delay between attempts.
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Whether `attempt` (0-indexed) is the final one the policy allows.
    pub fn is_last(&self, attempt: u32) -> bool {
        attempt.saturating_add(1) >= self.max_attempts
    }

    /// The wait before attempt N (0-indexed).
    ///
    /// Returns `None` for the first attempt and for attempts past the bound.
    pub fn delay_before(&self, attempt: u32) -> Option<Duration> {
        if attempt == 0 || attempt >= self.max_attempts {
            None
        } else {
            Some(self.delay)
        }
    }

    /// Worst-case time spent waiting if every attempt runs.
    pub fn total_delay(&self) -> Duration {
        self.delay.saturating_mul(self.max_attempts - 1)
    }
}

impl Default for AttemptPolicy {
    fn default() -> Self {
        Self::once()
    }
}

#[cfg(feature = "serde")]
mod de {
    use serde::{Deserialize, Deserializer};

    pub(super) fn at_least_one<'de, D>(deserializer: D) -> Result<u32, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(u32::deserialize(deserializer)?.max(1))
    }
}
