//! Bounded retry with a fixed delay.
//!
//! Exhaustion is a value, not a panic: callers get the attempt count and
//! the last error back and decide for themselves whether to surface it.

use std::fmt;
use std::thread;
use std::time::Duration;

/// Retry policy: at most `max_attempts` tries, sleeping `delay` between
/// consecutive failures.
#[derive(Debug, Clone, Copy)]
pub struct Retry {
    max_attempts: u32,
    delay: Duration,
}

/// All attempts failed.
#[derive(Debug)]
pub struct RetryError<E> {
    /// How many attempts were made.
    pub attempts: u32,
    /// The error from the final attempt.
    pub last: E,
}

impl<E: fmt::Display> fmt::Display for RetryError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed after {} attempts: {}", self.attempts, self.last)
    }
}

impl<E: fmt::Display + fmt::Debug> std::error::Error for RetryError<E> {}

impl Retry {
    /// `max_attempts` is clamped to at least one.
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Run `op` until it succeeds or the attempt budget is spent.
    pub fn run<T, E>(&self, mut op: impl FnMut() -> Result<T, E>) -> Result<T, RetryError<E>> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match op() {
                Ok(value) => return Ok(value),
                Err(err) if attempt >= self.max_attempts => {
                    return Err(RetryError {
                        attempts: attempt,
                        last: err,
                    })
                }
                Err(_) => {
                    if !self.delay.is_zero() {
                        thread::sleep(self.delay);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_success_returns_immediately() {
        let retry = Retry::new(3, Duration::ZERO);
        let mut calls = 0;
        let result: Result<u32, RetryError<&str>> = retry.run(|| {
            calls += 1;
            Ok(7)
        });
        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls, 1);
    }

    #[test]
    fn recovers_within_budget() {
        let retry = Retry::new(3, Duration::ZERO);
        let mut calls = 0;
        let result: Result<u32, RetryError<&str>> = retry.run(|| {
            calls += 1;
            if calls < 3 {
                Err("transient")
            } else {
                Ok(42)
            }
        });
        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls, 3);
    }

    #[test]
    fn exhaustion_reports_attempts_and_last_error() {
        let retry = Retry::new(3, Duration::ZERO);
        let mut calls = 0;
        let result: Result<(), RetryError<String>> = retry.run(|| {
            calls += 1;
            Err(format!("failure {calls}"))
        });
        let err = result.unwrap_err();
        assert_eq!(err.attempts, 3);
        assert_eq!(err.last, "failure 3");
        assert_eq!(calls, 3);
    }

    #[test]
    fn zero_attempts_clamps_to_one() {
        let retry = Retry::new(0, Duration::ZERO);
        assert_eq!(retry.max_attempts(), 1);
        let result: Result<(), RetryError<&str>> = retry.run(|| Err("nope"));
        assert_eq!(result.unwrap_err().attempts, 1);
    }
}
