//! Bounded poll-until-ready primitive.
//!
//! Replaces fixed "sleep then hope" waits: the attempt closure is retried
//! with doubling backoff until it reports ready or the overall deadline
//! lapses, at which point the loop fails with [`FlowError::Deadline`].

use crate::config::PollSettings;
use crate::error::FlowError;
use std::time::{Duration, Instant};

/// Outcome of one poll attempt.
pub enum Poll<T> {
    Ready(T),
    NotYet,
}

/// Retry `attempt` until it yields [`Poll::Ready`] or `settings.deadline_ms`
/// elapses. Errors from the attempt itself are fatal immediately; "not found
/// yet" conditions must be mapped to [`Poll::NotYet`] by the caller.
pub fn poll_until<T>(
    what: &str,
    settings: &PollSettings,
    mut attempt: impl FnMut() -> Result<Poll<T>, FlowError>,
) -> Result<T, FlowError> {
    let started = Instant::now();
    let deadline = Duration::from_millis(settings.deadline_ms);
    let max_delay = Duration::from_millis(settings.max_delay_ms);
    let mut delay = Duration::from_millis(settings.initial_delay_ms);
    let mut attempts = 0u32;
    loop {
        attempts += 1;
        match attempt()? {
            Poll::Ready(value) => {
                tracing::debug!(what, attempts, elapsed_ms = started.elapsed().as_millis() as u64, "poll ready");
                return Ok(value);
            }
            Poll::NotYet => {}
        }
        if started.elapsed() + delay > deadline {
            return Err(FlowError::Deadline {
                what: what.to_string(),
                waited: started.elapsed(),
            });
        }
        std::thread::sleep(delay);
        delay = (delay * 2).min(max_delay);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_settings() -> PollSettings {
        PollSettings {
            initial_delay_ms: 1,
            max_delay_ms: 4,
            deadline_ms: 50,
        }
    }

    #[test]
    fn returns_value_once_ready() {
        let mut calls = 0;
        let value = poll_until("thing", &fast_settings(), || {
            calls += 1;
            if calls < 3 {
                Ok(Poll::NotYet)
            } else {
                Ok(Poll::Ready(42))
            }
        })
        .unwrap();
        assert_eq!(value, 42);
        assert_eq!(calls, 3);
    }

    #[test]
    fn deadline_produces_typed_error() {
        let result: Result<(), _> =
            poll_until("receipt", &fast_settings(), || Ok(Poll::<()>::NotYet));
        match result {
            Err(FlowError::Deadline { what, .. }) => assert_eq!(what, "receipt"),
            other => panic!("expected deadline error, got {other:?}"),
        }
    }

    #[test]
    fn attempt_errors_are_fatal_immediately() {
        let mut calls = 0;
        let result: Result<(), _> = poll_until("receipt", &fast_settings(), || {
            calls += 1;
            Err(FlowError::PrerequisiteMissing {
                what: "issuance",
                hint: "run seed-issuance first",
            })
        });
        assert!(matches!(result, Err(FlowError::PrerequisiteMissing { .. })));
        assert_eq!(calls, 1);
    }
}
