//! Retry with exponential back-off and jitter for store requests.
//!
//! Transient conditions (HTTP 429, 5xx, network failures) are retried inside a
//! single retrieval strategy. Anything else is returned at once so the adapter
//! can move on to its next strategy.

use std::future::Future;
use std::time::Duration;

use crate::error::ScraperError;

const MAX_DELAY_MS: u64 = 60_000;

/// Returns `true` if `err` represents a transient condition worth retrying.
///
/// Retriable:
/// - [`ScraperError::RateLimited`]: the store asked us to back off.
/// - [`ScraperError::Http`]: connection reset, timeout, or similar.
/// - [`ScraperError::UnexpectedStatus`] with a 5xx status.
///
/// Everything else (404, 4xx, unparseable bodies, empty payloads) is final for
/// the current strategy.
fn is_retriable(err: &ScraperError) -> bool {
    match err {
        ScraperError::RateLimited { .. } | ScraperError::Http(_) => true,
        ScraperError::UnexpectedStatus { status, .. } => *status >= 500,
        _ => false,
    }
}

/// Sleep before retry number `attempt` (1-based).
///
/// Exponential back-off scaled by `jitter` in `[0, 1)` to ±25 %, raised to
/// the store's `Retry-After` when a 429 carried one, capped at
/// [`MAX_DELAY_MS`].
fn backoff_delay_ms(err: &ScraperError, attempt: u32, backoff_base_ms: u64, jitter: f64) -> u64 {
    let computed = backoff_base_ms
        .saturating_mul(1u64 << attempt.saturating_sub(1).min(10))
        .min(MAX_DELAY_MS);
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    let jittered = (computed as f64 * (jitter * 0.5 + 0.75)) as u64;
    let requested = match err {
        ScraperError::RateLimited {
            retry_after_secs: Some(secs),
            ..
        } => secs.saturating_mul(1_000),
        _ => 0,
    };
    jittered.max(requested).min(MAX_DELAY_MS)
}

/// Executes `operation`, retrying transient failures up to `max_retries` times.
///
/// | Attempt | Sleep before next attempt (`backoff_base_ms = 1_000`) |
/// |---------|-------------------------------------------------------|
/// | 1       | 1 000 ms × 2⁰ ± 25 % jitter                           |
/// | 2       | 1 000 ms × 2¹ ± 25 % jitter                           |
/// | 3       | 1 000 ms × 2² ± 25 % jitter                           |
///
/// A 429's `Retry-After` raises the delay to at least what the store asked
/// for. Delay is capped at 60 s. With `max_retries = 3` the operation runs at most
/// four times. The last error is returned once retries are exhausted.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, ScraperError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ScraperError>>,
{
    let mut attempt = 0u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_retriable(&err) || attempt >= max_retries {
                    return Err(err);
                }
                attempt += 1;
                let delay_ms = backoff_delay_ms(&err, attempt, backoff_base_ms, rand::random());
                tracing::warn!(
                    attempt,
                    max_retries,
                    delay_ms,
                    error = %err,
                    "transient store error, retrying after back-off"
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}
