//! Bounded fixed-delay retry.

use crate::{
    config::settings::SyncSettings,
    errors::{Error, Result},
};
use std::{future::Future, time::Duration};
use tokio::time;
use tracing::{debug, warn};

/// How many times to attempt an operation and how long to wait in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(2))
    }
}

impl RetryPolicy {
    /// `max_attempts` is clamped to at least one.
    #[must_use]
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    #[must_use]
    pub fn from_settings(settings: &SyncSettings) -> Self {
        Self::new(
            settings.max_attempts,
            Duration::from_secs(settings.retry_delay_secs),
        )
    }

    #[must_use]
    pub const fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    #[must_use]
    pub const fn delay(&self) -> Duration {
        self.delay
    }

    /// Runs `attempt` until it succeeds or the budget is spent.
    ///
    /// The closure receives the 1-based attempt number. Every failure is
    /// retried the same way; there is no backoff and no cancellation.
    ///
    /// # Errors
    /// [`Error::RetriesExhausted`] carrying the last failure's message.
    pub async fn run<T, F, Fut>(&self, label: &str, mut attempt: F) -> Result<T>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut number = 1;
        loop {
            match attempt(number).await {
                Ok(value) => {
                    debug!(label, attempt = number, "Attempt succeeded");
                    return Ok(value);
                }
                Err(e) if number < self.max_attempts => {
                    warn!(
                        label,
                        attempt = number,
                        max_attempts = self.max_attempts,
                        "Attempt failed, retrying: {e}"
                    );
                    time::sleep(self.delay).await;
                    number += 1;
                }
                Err(e) => {
                    warn!(label, attempts = number, "Giving up: {e}");
                    return Err(Error::RetriesExhausted {
                        attempts: number,
                        last_error: e.to_string(),
                    });
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn test_defaults_and_clamping() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts(), 3);
        assert_eq!(policy.delay(), Duration::from_secs(2));

        assert_eq!(RetryPolicy::new(0, Duration::ZERO).max_attempts(), 1);

        let configured = RetryPolicy::from_settings(&SyncSettings {
            max_attempts: 5,
            retry_delay_secs: 1,
        });
        assert_eq!(configured, RetryPolicy::new(5, Duration::from_secs(1)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhaustion_waits_between_attempts() {
        let policy = RetryPolicy::default();
        let calls = AtomicU32::new(0);
        let started = time::Instant::now();

        let result: Result<()> = policy
            .run("always fails", |n| {
                calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    Err(Error::Remote {
                        message: format!("status 500 on attempt {n}"),
                    })
                }
            })
            .await;

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        // Two gaps of two seconds, none after the last attempt
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_secs(4) && elapsed < Duration::from_secs(5));
        match result.unwrap_err() {
            Error::RetriesExhausted {
                attempts,
                last_error,
            } => {
                assert_eq!(attempts, 3);
                assert!(last_error.contains("attempt 3"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_stops_at_first_success() {
        let policy = RetryPolicy::default();
        let calls = AtomicU32::new(0);

        let value = policy
            .run("second time lucky", |n| {
                calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n < 2 {
                        Err(Error::Remote {
                            message: "flaky".to_string(),
                        })
                    } else {
                        Ok(n * 10)
                    }
                }
            })
            .await
            .unwrap();

        assert_eq!(value, 20);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
