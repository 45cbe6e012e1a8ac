//! Behavioural tests for the attempt loops.

use super::*;
use crate::testing::RecordingSleeper;
use std::cell::{Cell, RefCell};
use std::time::{Duration, Instant};

// ========== Repeat ==========

#[test]
fn test_repeat_always_failing_runs_every_attempt() {
    for n in 1..=5 {
        let calls = Cell::new(0u32);

        let value = Repeat::times(n, |_| {
            calls.set(calls.get() + 1);
            Err::<i32, _>("nope")
        })
        .or_else(|| -1)
        .run();

        assert_eq!(value, Some(-1));
        assert_eq!(calls.get(), n);
    }
}

#[test]
fn test_repeat_without_fallback_yields_none() {
    let value = Repeat::times(2, |_| Err::<i32, _>("nope")).run();
    assert_eq!(value, None);
}

#[test]
fn test_repeat_passes_attempt_index() {
    let seen = RefCell::new(Vec::new());

    let value = Repeat::times(4, |attempt| {
        seen.borrow_mut().push(attempt);
        Ok::<_, ()>(attempt)
    })
    .run();

    assert_eq!(value, Some(3));
    assert_eq!(*seen.borrow(), vec![0, 1, 2, 3]);
}

#[test]
fn test_repeat_stops_when_predicate_rejects() {
    let calls = Cell::new(0u32);

    let value = Repeat::times(10, |attempt| {
        calls.set(calls.get() + 1);
        Ok::<_, ()>(attempt)
    })
    .repeat_while(|value, _| value.is_some_and(|v| *v < 2))
    .run();

    assert_eq!(value, Some(2));
    assert_eq!(calls.get(), 3);
}

#[test]
fn test_repeat_predicate_sees_latest_value_and_current_error() {
    let seen = RefCell::new(Vec::new());

    let value = Repeat::times(3, |attempt| if attempt == 0 { Ok(7) } else { Err(attempt) })
        .repeat_while(|value, err| {
            seen.borrow_mut().push((value.copied(), err.copied()));
            true
        })
        .or_else(|| 0)
        .run();

    // The value from attempt 0 survives the later failures.
    assert_eq!(value, Some(7));
    assert_eq!(
        *seen.borrow(),
        vec![(Some(7), None), (Some(7), Some(1)), (Some(7), Some(2))]
    );
}

#[test]
fn test_repeat_success_clears_previous_error() {
    let seen = RefCell::new(Vec::new());

    Repeat::times(2, |attempt| if attempt == 0 { Err("cold") } else { Ok(1) })
        .repeat_while(|_, err| {
            seen.borrow_mut().push(err.copied());
            true
        })
        .run();

    assert_eq!(*seen.borrow(), vec![Some("cold"), None]);
}

#[test]
fn test_repeat_errors_never_escape() {
    let value: Option<u8> = Repeat::times(3, |_| "x".parse::<u8>()).run();
    assert!(value.is_none());
}

#[test]
fn test_repeat_delay_not_applied_after_final_attempt() {
    let sleeper = RecordingSleeper::new();

    Repeat::times(4, |_| Ok::<_, ()>(()))
        .with_delay(Duration::from_millis(5))
        .with_sleeper(sleeper.clone())
        .run();

    assert_eq!(sleeper.delays(), vec![Duration::from_millis(5); 3]);
}

#[test]
fn test_repeat_delay_not_applied_after_predicate_stop() {
    let sleeper = RecordingSleeper::new();

    Repeat::times(4, |_| Ok::<_, ()>(()))
        .repeat_while(|_, _| false)
        .with_delay(Duration::from_millis(5))
        .with_sleeper(sleeper.clone())
        .run();

    assert!(sleeper.delays().is_empty());
}

#[test]
fn test_repeat_elapsed_time_is_delay_times_gaps() {
    let start = Instant::now();

    Repeat::times(3, |_| Ok::<_, ()>(()))
        .with_delay(Duration::from_millis(20))
        .run();

    let elapsed = start.elapsed();
    assert!(
        elapsed >= Duration::from_millis(40),
        "Expected at least 40ms, got {:?}",
        elapsed
    );
}

#[test]
fn test_repeat_cancellation_stops_loop_and_keeps_flag() {
    let token = CancellationToken::new();
    let sleeper = RecordingSleeper::new().cancel_after(1);
    let calls = Cell::new(0u32);

    let value = Repeat::times(5, |attempt| {
        calls.set(calls.get() + 1);
        Ok::<_, ()>(attempt)
    })
    .with_sleeper(sleeper.clone())
    .with_cancellation(token.clone())
    .run();

    // Attempt 0 ran, the first delay was cancelled, nothing else started.
    assert_eq!(value, Some(0));
    assert_eq!(calls.get(), 1);
    assert!(token.is_cancelled());
}

#[test]
fn test_repeat_cancelled_before_run_still_makes_first_attempt() {
    let token = CancellationToken::new();
    token.cancel();
    let calls = Cell::new(0u32);

    let value = Repeat::times(3, |_| {
        calls.set(calls.get() + 1);
        Err::<i32, _>(())
    })
    .or_else(|| 9)
    .with_cancellation(token)
    .run();

    assert_eq!(value, Some(9));
    assert_eq!(calls.get(), 1);
}

#[test]
fn test_repeat_debug() {
    let repeat = Repeat::times(2, |_| Ok::<_, ()>(()));
    assert!(format!("{:?}", repeat).contains("Repeat"));
}

// ========== Retry ==========

#[test]
fn test_retry_succeeds_on_last_attempt() {
    for n in 1..=5 {
        let failures = Cell::new(0u32);
        let successes = Cell::new(0u32);
        let fallback_used = Cell::new(false);

        let result = Retry::times(n, |attempt| {
            if attempt < n - 1 {
                Err("transient failure")
            } else {
                Ok("success")
            }
        })
        .on_failure(|_| failures.set(failures.get() + 1))
        .on_success(|_| successes.set(successes.get() + 1))
        .or_else(|_| {
            fallback_used.set(true);
            "fallback"
        })
        .run();

        assert_eq!(result, Ok("success"));
        assert_eq!(failures.get(), n - 1);
        assert_eq!(successes.get(), 1);
        assert!(!fallback_used.get());
    }
}

#[test]
fn test_retry_exhausted_returns_final_error() {
    let result = Retry::<(), _>::times(3, |attempt| Err(format!("failure {}", attempt))).run();
    assert_eq!(result, Err("failure 2".to_string()));
}

#[test]
fn test_retry_fallback_receives_only_final_error() {
    let received = RefCell::new(Vec::new());

    let result = Retry::times(3, |attempt| Err::<u32, _>(attempt))
        .or_else(|last| {
            received.borrow_mut().push(last);
            last + 40
        })
        .run();

    assert_eq!(result, Ok(42));
    assert_eq!(*received.borrow(), vec![2]);
}

#[test]
fn test_retry_stops_at_first_success() {
    let calls = Cell::new(0u32);
    let sleeper = RecordingSleeper::new();

    let result = Retry::times(5, |attempt| {
        calls.set(calls.get() + 1);
        Ok::<_, ()>(attempt)
    })
    .with_delay(Duration::from_millis(10))
    .with_sleeper(sleeper.clone())
    .run();

    assert_eq!(result, Ok(0));
    assert_eq!(calls.get(), 1);
    assert!(sleeper.delays().is_empty());
}

#[test]
fn test_retry_single_attempt_has_no_delay() {
    let sleeper = RecordingSleeper::new();

    let result = Retry::times(1, |_| Err::<(), _>("down"))
        .with_delay(Duration::from_secs(60))
        .with_sleeper(sleeper.clone())
        .run();

    assert_eq!(result, Err("down"));
    assert!(sleeper.delays().is_empty());
}

#[test]
fn test_retry_zero_attempts_behaves_like_one() {
    let calls = Cell::new(0u32);

    let result = Retry::times(0, |_| {
        calls.set(calls.get() + 1);
        Err::<(), _>("down")
    })
    .run();

    assert_eq!(result, Err("down"));
    assert_eq!(calls.get(), 1);
}

#[test]
fn test_retry_hooks_run_in_attempt_order() {
    let log = RefCell::new(Vec::new());

    let result = Retry::times(3, |attempt| {
        log.borrow_mut().push(format!("attempt {}", attempt));
        if attempt < 1 {
            Err(attempt)
        } else {
            Ok(attempt)
        }
    })
    .on_failure(|e| log.borrow_mut().push(format!("failure {}", e)))
    .on_retry(|event| log.borrow_mut().push(format!("retry {}", event.attempt)))
    .on_success(|v| log.borrow_mut().push(format!("success {}", v)))
    .run();

    assert_eq!(result, Ok(1));
    assert_eq!(
        *log.borrow(),
        vec!["attempt 0", "failure 0", "retry 1", "attempt 1", "success 1"]
    );
}

#[test]
fn test_retry_event_not_emitted_for_final_failure() {
    let events = RefCell::new(Vec::new());

    let _ = Retry::<(), _>::times(3, |attempt| Err(attempt))
        .with_delay(Duration::from_millis(2))
        .with_sleeper(RecordingSleeper::new())
        .on_retry(|event| events.borrow_mut().push((event.attempt, *event.error, event.next_delay)))
        .run();

    assert_eq!(
        *events.borrow(),
        vec![
            (1, 0, Duration::from_millis(2)),
            (2, 1, Duration::from_millis(2)),
        ]
    );
}

#[test]
fn test_retry_delay_between_failures_only() {
    let sleeper = RecordingSleeper::new();

    let _ = Retry::<(), _>::times(4, |_| Err(()))
        .with_delay(Duration::from_millis(3))
        .with_sleeper(sleeper.clone())
        .run();

    assert_eq!(sleeper.delays(), vec![Duration::from_millis(3); 3]);
}

#[test]
fn test_retry_cancellation_resolves_with_latest_error() {
    let token = CancellationToken::new();
    let sleeper = RecordingSleeper::new().cancel_after(2);
    let calls = Cell::new(0u32);

    let result = Retry::<(), _>::times(10, |attempt| {
        calls.set(calls.get() + 1);
        Err(attempt)
    })
    .with_sleeper(sleeper)
    .with_cancellation(token.clone())
    .run();

    assert_eq!(result, Err(1));
    assert_eq!(calls.get(), 2);
    assert!(token.is_cancelled());
}

#[test]
fn test_retry_cancellation_uses_fallback() {
    let token = CancellationToken::new();
    token.cancel();

    let result = Retry::times(3, |_| Err::<i32, _>("down"))
        .or_else(|e| e.len() as i32)
        .with_cancellation(token)
        .run();

    assert_eq!(result, Ok(4));
}

#[test]
fn test_retry_cancel_from_another_thread() {
    let token = CancellationToken::new();
    let canceller = token.clone();

    let handle = std::thread::spawn(move || {
        std::thread::sleep(Duration::from_millis(20));
        canceller.cancel();
    });

    let start = Instant::now();
    let result = Retry::<(), _>::times(5, |_| Err("down"))
        .with_delay(Duration::from_secs(10))
        .with_cancellation(token.clone())
        .run();
    handle.join().unwrap();

    assert_eq!(result, Err("down"));
    assert!(start.elapsed() < Duration::from_secs(5));
    assert!(token.is_cancelled());
}

#[test]
fn test_retry_with_policy() {
    let policy = AttemptPolicy::attempts(2).with_delay(Duration::from_millis(1));
    let retry = Retry::new(policy, |_| Ok::<_, ()>(5));

    assert_eq!(retry.policy(), &policy);
    assert!(!retry.has_fallback());
    assert_eq!(retry.run(), Ok(5));
}

#[test]
fn test_retry_debug() {
    let retry = Retry::times(2, |_| Ok::<_, ()>(())).or_else(|_| ());
    let debug = format!("{:?}", retry);
    assert!(debug.contains("Retry"));
    assert!(debug.contains("has_fallback: true"));
}

#[cfg(feature = "tracing")]
mod tracing_tests {
    use super::*;
    use tracing_test::traced_test;

    #[traced_test]
    #[test]
    fn test_retry_logs_exhaustion() {
        let _ = Retry::<(), _>::times(2, |_| Err(()))
            .with_sleeper(RecordingSleeper::new())
            .run();

        assert!(logs_contain("attempt 1 failed, retrying"));
        assert!(logs_contain("retry exhausted after 2 attempts"));
    }

    #[traced_test]
    #[test]
    fn test_repeat_logs_predicate_stop() {
        Repeat::times(3, |_| Ok::<_, ()>(()))
            .repeat_while(|_, _| false)
            .run();

        assert!(logs_contain("repeat stopped by predicate after attempt 1"));
    }
}
