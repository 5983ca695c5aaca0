//! Retry utilities for transient provider failures.
//!
//! Retries happen inside an adapter; the batch orchestrator only ever sees
//! the final outcome.

use crate::error::ProviderError;
use std::future::Future;
use std::time::Duration;

/// Determine whether a provider error is worth retrying.
///
/// Retryable errors: rate limits (429), server errors (5xx), timeouts and
/// connection failures. Non-retryable: auth failures, bad requests, missing
/// models, malformed responses.
pub fn is_retryable(error: &ProviderError) -> bool {
    // Classify by HTTP status code when available (structured)
    if let Some(code) = error.status_code {
        return code == 429 || (500..=599).contains(&code);
    }
    error.transient
}

/// Calculate exponential backoff duration for a given attempt.
///
/// Uses `base_delay * 2^attempt` with a cap at 30 seconds.
pub fn backoff_duration(attempt: u32, base_delay_ms: u64) -> Duration {
    let delay = base_delay_ms.saturating_mul(2u64.saturating_pow(attempt));
    Duration::from_millis(delay.min(30_000))
}

/// Run `op` up to `1 + max_retries` times, backing off between attempts.
///
/// Stops at the first success or non-retryable error and returns the last
/// error otherwise.
pub async fn with_retries<T, F, Fut>(
    label: &str,
    max_retries: u32,
    base_delay_ms: u64,
    mut op: F,
) -> Result<T, ProviderError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ProviderError>>,
{
    let mut attempt = 0;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if attempt < max_retries && is_retryable(&e) => {
                let delay = backoff_duration(attempt, base_delay_ms);
                attempt += 1;
                tracing::debug!(
                    "{label}: retry {attempt}/{max_retries} after {delay:?} ({})",
                    e.message
                );
                tokio::time::sleep(delay).await;
            }
            Err(e) => return Err(e),
        }
    }
}
