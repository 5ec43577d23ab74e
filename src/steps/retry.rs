//! Bounded polling for steps that wait on external state.

use std::thread;
use std::time::Duration;

use tracing::debug;

use crate::error::Result;

/// Call `op` until `done` accepts its value, at most `max_attempts` times.
///
/// Sleeps `delay` between attempts (not after the last one). Returns the
/// accepted value, or `None` once the attempts are exhausted. An error from
/// `op` ends the loop immediately. `op` receives the 1-based attempt number.
pub fn retry_until<T, F, P>(
    max_attempts: u32,
    delay: Duration,
    mut op: F,
    mut done: P,
) -> Result<Option<T>>
where
    F: FnMut(u32) -> Result<T>,
    P: FnMut(&T) -> bool,
{
    let attempts = max_attempts.max(1);

    for attempt in 1..=attempts {
        let value = op(attempt)?;
        if done(&value) {
            return Ok(Some(value));
        }
        debug!("Attempt {}/{} not yet satisfied", attempt, attempts);
        if attempt < attempts {
            thread::sleep(delay);
        }
    }

    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::KickstartError;

    #[test]
    fn stops_on_first_success() {
        let mut calls = 0;
        let result = retry_until(
            5,
            Duration::ZERO,
            |attempt| {
                calls += 1;
                Ok(attempt)
            },
            |value| *value == 3,
        )
        .unwrap();

        assert_eq!(result, Some(3));
        assert_eq!(calls, 3);
    }

    #[test]
    fn gives_up_after_max_attempts() {
        let mut calls = 0;
        let result = retry_until(
            4,
            Duration::from_millis(1),
            |_| {
                calls += 1;
                Ok(false)
            },
            |ready| *ready,
        )
        .unwrap();

        assert_eq!(result, None);
        assert_eq!(calls, 4);
    }

    #[test]
    fn zero_attempts_still_tries_once() {
        let mut calls = 0;
        let _ = retry_until(
            0,
            Duration::ZERO,
            |_| {
                calls += 1;
                Ok(())
            },
            |_| false,
        );
        assert_eq!(calls, 1);
    }

    #[test]
    fn errors_end_the_loop() {
        let mut calls = 0;
        let result: Result<Option<()>> = retry_until(
            3,
            Duration::ZERO,
            |_| {
                calls += 1;
                Err(KickstartError::ConfigValidationError {
                    message: "boom".into(),
                })
            },
            |_| true,
        );

        assert!(result.is_err());
        assert_eq!(calls, 1);
    }
}
