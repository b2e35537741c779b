//! Bounded retry for transient control-plane failures.
//!
//! The delay is a `tokio::time::sleep`, so the retry loop is an ordinary
//! future: a caller can bound it with `tokio::time::timeout` or drop it to
//! cancel between attempts.

use crate::config::RetryConfig;
use std::time::Duration;
use tracing::{error, info, warn};

/// Result of an operation that failed on every attempt.
#[derive(Debug)]
pub struct Exhausted<E> {
    pub attempts: u32,
    pub last_error: E,
}

/// Runs `operation` up to `config.max_attempts` times.
///
/// The configured delay is awaited before every attempt, the first one
/// included, and multiplied by `backoff_multiplier` after each failure,
/// capped at `max_delay`.
/// On success returns the value together with the number of attempts made.
pub async fn retry_with_backoff<F, Fut, T, E>(
    config: &RetryConfig,
    operation_name: &str,
    mut operation: F,
) -> Result<(T, u32), Exhausted<E>>
where
    F: FnMut(u32) -> Fut,
    Fut: std::future::Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let max_attempts = config.max_attempts.max(1);
    let mut delay = config.delay;
    let mut attempt = 0u32;

    loop {
        attempt += 1;

        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        match operation(attempt).await {
            Ok(value) => {
                info!(
                    operation = %operation_name,
                    attempt = attempt,
                    "Operation succeeded"
                );
                return Ok((value, attempt));
            }
            Err(e) if attempt >= max_attempts => {
                error!(
                    operation = %operation_name,
                    attempt = attempt,
                    error = %e,
                    "Operation failed after max retries"
                );
                return Err(Exhausted {
                    attempts: attempt,
                    last_error: e,
                });
            }
            Err(e) => {
                delay = next_delay(delay, config);
                warn!(
                    operation = %operation_name,
                    attempt = attempt,
                    max_attempts = max_attempts,
                    error = %e,
                    next_delay = ?delay,
                    "Operation failed, retrying"
                );
            }
        }
    }
}

fn next_delay(delay: Duration, config: &RetryConfig) -> Duration {
    let max_delay = config.max_delay.max(config.delay);
    Duration::try_from_secs_f64(delay.as_secs_f64() * config.backoff_multiplier)
        .map_or(max_delay, |next| next.min(max_delay))
}
