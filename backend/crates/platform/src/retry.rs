//! Bounded Retry
//!
//! Retries a fallible async operation a fixed number of times and gives up
//! with the last error. Meant for startup dependencies (database
//! connection): the caller decides that exhaustion is fatal.

use std::future::Future;
use std::time::Duration;

use thiserror::Error;

/// Retry policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total number of attempts, including the first one (minimum 1)
    pub max_attempts: u32,
    /// Pause between attempts
    pub delay: Duration,
}

impl RetryPolicy {
    /// `max_attempts` attempts back to back
    pub const fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            delay: Duration::ZERO,
        }
    }
}

/// All attempts failed
#[derive(Debug, Error)]
#[error("{operation} failed after {attempts} attempts: {last_error}")]
pub struct RetryError<E>
where
    E: std::error::Error + 'static,
{
    pub operation: &'static str,
    pub attempts: u32,
    #[source]
    pub last_error: E,
}

/// Run `op` until it succeeds or the policy is exhausted
///
/// `op` receives the 1-based attempt number.
pub async fn retry_bounded<T, E, F, Fut>(
    operation: &'static str,
    policy: RetryPolicy,
    mut op: F,
) -> Result<T, RetryError<E>>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::error::Error + 'static,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        match op(attempt).await {
            Ok(value) => {
                if attempt > 1 {
                    tracing::info!(operation, attempt, "Succeeded after retry");
                }
                return Ok(value);
            }
            Err(e) if attempt >= max_attempts => {
                tracing::error!(
                    operation,
                    attempts = attempt,
                    error = %e,
                    "Giving up"
                );
                return Err(RetryError {
                    operation,
                    attempts: attempt,
                    last_error: e,
                });
            }
            Err(e) => {
                tracing::warn!(
                    operation,
                    attempt,
                    max_attempts,
                    error = %e,
                    "Attempt failed, retrying"
                );
                if !policy.delay.is_zero() {
                    tokio::time::sleep(policy.delay).await;
                }
                attempt += 1;
            }
        }
    }
}
