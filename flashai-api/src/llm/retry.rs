//! Retry with exponential backoff for model provider calls
//!
//! Each attempt is classified by the caller:
//! - `Transient`: network error, timeout, 429 or 5xx. Retried until
//!   `max_attempts`, then surfaced as `ModelError::Unavailable`.
//! - `Rejected`: 4xx. Returned immediately.
//! - `Schema`: well-formed transport, malformed payload. Returned immediately.
//!
//! **Backoff:** `base_delay * 2^(attempt-1)`, capped at `max_delay`, plus up
//! to 25% random jitter.

use super::ModelError;
use rand::Rng;
use std::future::Future;
use std::time::{Duration, Instant};

/// Retry limits, taken from configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(1000),
            max_delay: Duration::from_millis(8000),
        }
    }
}

impl RetryPolicy {
    /// Delay before the attempt following `attempt` (1-based), without jitter
    pub fn backoff(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(31);
        self.base_delay
            .checked_mul(1u32 << exponent)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }

    fn backoff_with_jitter(&self, attempt: u32) -> Duration {
        let delay = self.backoff(attempt);
        let jitter_cap = delay.as_millis() as u64 / 4;
        if jitter_cap == 0 {
            return delay;
        }
        delay + Duration::from_millis(rand::thread_rng().gen_range(0..=jitter_cap))
    }
}

/// Outcome of one failed attempt
#[derive(Debug)]
pub enum AttemptError {
    Transient(String),
    Rejected { status: u16, message: String },
    Schema(String),
}

/// Run `operation` until it succeeds, fails permanently, or attempts run out
pub async fn retry_with_backoff<F, Fut, T>(
    operation_name: &str,
    policy: &RetryPolicy,
    mut operation: F,
) -> Result<T, ModelError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, AttemptError>>,
{
    let start_time = Instant::now();
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        attempt += 1;

        if attempt > 1 {
            tracing::debug!(operation = operation_name, attempt, "Retrying model request");
        }

        match operation().await {
            Ok(result) => {
                if attempt > 1 {
                    tracing::info!(
                        operation = operation_name,
                        attempt,
                        elapsed_ms = start_time.elapsed().as_millis(),
                        "Model request succeeded after retry"
                    );
                }
                return Ok(result);
            }
            Err(AttemptError::Rejected { status, message }) => {
                tracing::warn!(
                    operation = operation_name,
                    status,
                    error = %message,
                    "Model provider rejected request"
                );
                return Err(ModelError::Rejected { status, message });
            }
            Err(AttemptError::Schema(message)) => {
                tracing::warn!(
                    operation = operation_name,
                    error = %message,
                    "Model response did not match schema"
                );
                return Err(ModelError::SchemaViolation(message));
            }
            Err(AttemptError::Transient(message)) => {
                if attempt >= max_attempts {
                    tracing::error!(
                        operation = operation_name,
                        attempt,
                        elapsed_ms = start_time.elapsed().as_millis(),
                        error = %message,
                        "Model request failed: retries exhausted"
                    );
                    return Err(ModelError::Unavailable {
                        attempts: attempt,
                        last_error: message,
                    });
                }

                let delay = policy.backoff_with_jitter(attempt);
                tracing::warn!(
                    operation = operation_name,
                    attempt,
                    backoff_ms = delay.as_millis(),
                    error = %message,
                    "Transient model error, will retry after backoff"
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
}
