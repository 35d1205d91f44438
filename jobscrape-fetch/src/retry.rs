//! Bounded retry combinator.
//!
//! Both fetch strategies and the acquisition session retry the same way:
//! run an attempt, stop on success or on an error the caller does not
//! consider retryable, otherwise wait per the backoff and go again until
//! the attempt cap is spent.

use std::fmt;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

// ============================================================================
// Backoff
// ============================================================================

/// Delay schedule between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backoff {
    /// Retry immediately.
    None,
    /// Same delay before every retry.
    Fixed(Duration),
    /// `base * 2^(attempt-1)`, capped at `max`.
    Exponential {
        /// Delay after the first attempt.
        base: Duration,
        /// Upper bound.
        max: Duration,
    },
}

impl Backoff {
    /// Delay to wait after `attempt` (1-based) failed.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        match *self {
            Self::None => Duration::ZERO,
            Self::Fixed(delay) => delay,
            Self::Exponential { base, max } => {
                let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
                base.saturating_mul(factor).min(max)
            }
        }
    }
}

// ============================================================================
// Attempt
// ============================================================================

/// One retryable unit of work.
///
/// Implemented for every `FnMut(u32) -> impl Future<Output = Result<T, E>>`
/// closure. Stateful operations that need `&mut` access across attempts
/// implement it on a small struct instead.
pub trait Attempt {
    /// Success value.
    type Output;
    /// Failure value.
    type Error: fmt::Display;

    /// Runs attempt number `attempt` (1-based).
    fn attempt(
        &mut self,
        attempt: u32,
    ) -> impl Future<Output = Result<Self::Output, Self::Error>> + Send;
}

impl<F, Fut, T, E> Attempt for F
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>> + Send,
    E: fmt::Display,
{
    type Output = T;
    type Error = E;

    fn attempt(&mut self, attempt: u32) -> impl Future<Output = Result<T, E>> + Send {
        self(attempt)
    }
}

// ============================================================================
// Retry Outcome
// ============================================================================

/// Result of a retried operation plus how it got there.
#[derive(Debug)]
pub struct RetryOutcome<T, E> {
    /// Last attempt's result.
    pub result: Result<T, E>,
    /// Attempts made.
    pub attempts: u32,
    /// True if every attempt failed with a retryable error.
    pub exhausted: bool,
}

impl<T, E> RetryOutcome<T, E> {
    /// Returns true if an attempt succeeded.
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

// ============================================================================
// Retry Policy
// ============================================================================

/// Attempt cap plus backoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum attempts, including the first. Values below 1 act as 1.
    pub max_attempts: u32,
    /// Delay schedule.
    pub backoff: Backoff,
}

impl RetryPolicy {
    /// Creates a policy that retries immediately.
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            backoff: Backoff::None,
        }
    }

    /// A single attempt, no retries.
    pub fn no_retry() -> Self {
        Self::new(1)
    }

    /// Sets the backoff.
    #[must_use]
    pub fn with_backoff(mut self, backoff: Backoff) -> Self {
        self.backoff = backoff;
        self
    }

    /// Runs `op` until it succeeds, fails with an error `is_retryable`
    /// rejects, or the attempt cap is reached.
    pub async fn run<A, P>(&self, mut op: A, is_retryable: P) -> RetryOutcome<A::Output, A::Error>
    where
        A: Attempt,
        P: Fn(&A::Error) -> bool,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            debug!(attempt, max_attempts, "Starting attempt");

            match op.attempt(attempt).await {
                Ok(value) => {
                    return RetryOutcome {
                        result: Ok(value),
                        attempts: attempt,
                        exhausted: false,
                    };
                }
                Err(error) => {
                    if !is_retryable(&error) {
                        debug!(attempt, error = %error, "Error is not retryable");
                        return RetryOutcome {
                            result: Err(error),
                            attempts: attempt,
                            exhausted: false,
                        };
                    }

                    if attempt >= max_attempts {
                        warn!(attempts = attempt, error = %error, "Giving up after final attempt");
                        return RetryOutcome {
                            result: Err(error),
                            attempts: attempt,
                            exhausted: true,
                        };
                    }

                    let delay = self.backoff.delay_for_attempt(attempt);
                    warn!(attempt, error = %error, delay = ?delay, "Attempt failed, retrying");
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                    attempt += 1;
                }
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(5)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn test_exponential_backoff() {
        let backoff = Backoff::Exponential {
            base: Duration::from_secs(1),
            max: Duration::from_secs(60),
        };

        assert_eq!(backoff.delay_for_attempt(1), Duration::from_secs(1));
        assert_eq!(backoff.delay_for_attempt(2), Duration::from_secs(2));
        assert_eq!(backoff.delay_for_attempt(3), Duration::from_secs(4));
        assert_eq!(backoff.delay_for_attempt(4), Duration::from_secs(8));
        assert_eq!(backoff.delay_for_attempt(10), Duration::from_secs(60));
    }

    #[test]
    fn test_fixed_and_none_backoff() {
        assert_eq!(Backoff::None.delay_for_attempt(3), Duration::ZERO);
        assert_eq!(
            Backoff::Fixed(Duration::from_millis(250)).delay_for_attempt(3),
            Duration::from_millis(250)
        );
    }

    #[tokio::test]
    async fn test_succeeds_on_later_attempt() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&calls);

        let outcome = RetryPolicy::new(5)
            .run(
                move |attempt| {
                    counter.fetch_add(1, Ordering::SeqCst);
                    async move {
                        if attempt < 3 {
                            Err(format!("failure {attempt}"))
                        } else {
                            Ok(attempt)
                        }
                    }
                },
                |_| true,
            )
            .await;

        assert_eq!(outcome.result.unwrap(), 3);
        assert_eq!(outcome.attempts, 3);
        assert!(!outcome.exhausted);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_exhausts_attempt_cap() {
        let outcome = RetryPolicy::new(5)
            .run(|_| async { Err::<(), _>("down") }, |_| true)
            .await;

        assert!(!outcome.is_success());
        assert_eq!(outcome.attempts, 5);
        assert!(outcome.exhausted);
    }

    #[tokio::test]
    async fn test_stops_on_non_retryable() {
        let outcome = RetryPolicy::new(5)
            .run(|_| async { Err::<(), _>("fatal") }, |e: &&str| *e != "fatal")
            .await;

        assert_eq!(outcome.attempts, 1);
        assert!(!outcome.exhausted);
    }

    #[tokio::test]
    async fn test_zero_cap_still_runs_once() {
        let outcome = RetryPolicy::new(0)
            .run(|_| async { Ok::<_, String>("done") }, |_| true)
            .await;

        assert_eq!(outcome.attempts, 1);
        assert!(outcome.is_success());
    }

    #[tokio::test]
    async fn test_fixed_backoff_waits_between_attempts() {
        let start = std::time::Instant::now();
        let outcome = RetryPolicy::new(3)
            .with_backoff(Backoff::Fixed(Duration::from_millis(40)))
            .run(|_| async { Err::<(), _>("down") }, |_| true)
            .await;

        assert_eq!(outcome.attempts, 3);
        assert!(start.elapsed() >= Duration::from_millis(80));
    }
}
