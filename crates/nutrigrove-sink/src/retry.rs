//! Exponential back-off with jitter for sink requests.
//!
//! Network failures, 5xx answers and 429 are retried; everything else is
//! returned on the first failure.

use std::future::Future;
use std::time::Duration;

use crate::error::SinkError;

const MAX_DELAY_MS: u64 = 60_000;

/// Returns `true` for errors that are worth retrying after a back-off delay.
pub(crate) fn is_retriable(err: &SinkError) -> bool {
    match err {
        SinkError::Http(e) => {
            e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| s.is_server_error())
        }
        SinkError::UnexpectedStatus { status, .. } => *status == 429 || (500..600).contains(status),
        SinkError::Deserialize { .. }
        | SinkError::MissingId { .. }
        | SinkError::Io { .. }
        | SinkError::Serialize { .. }
        | SinkError::Config(_) => false,
    }
}

/// Delay before retry number `attempt` (1-based): `base * 2^(attempt-1)`,
/// capped at 60 s, then scaled by a random factor in `[0.75, 1.25)`.
pub(crate) fn backoff_delay(attempt: u32, backoff_base_ms: u64) -> Duration {
    let computed = backoff_base_ms.saturating_mul(1u64 << attempt.saturating_sub(1).min(10));
    let capped = computed.min(MAX_DELAY_MS);
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    let delay_ms = (capped as f64 * (rand::random::<f64>() * 0.5 + 0.75)) as u64;
    Duration::from_millis(delay_ms)
}

/// Runs `operation` with up to `max_retries` additional attempts on
/// transient errors. Non-retriable errors are returned immediately.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, SinkError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, SinkError>>,
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
                let delay = backoff_delay(attempt, backoff_base_ms);
                tracing::warn!(
                    attempt,
                    max_retries,
                    delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                    error = %err,
                    "sink transient error, retrying after back-off"
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    use super::*;

    fn status(status: u16) -> SinkError {
        SinkError::UnexpectedStatus {
            status,
            url: "http://localhost/rest/v1/cleaned_data".to_owned(),
            body: String::new(),
        }
    }

    #[test]
    fn server_errors_and_rate_limits_are_retriable() {
        assert!(is_retriable(&status(500)));
        assert!(is_retriable(&status(503)));
        assert!(is_retriable(&status(429)));
    }

    #[test]
    fn client_errors_are_not_retriable() {
        assert!(!is_retriable(&status(400)));
        assert!(!is_retriable(&status(401)));
        assert!(!is_retriable(&SinkError::MissingId {
            table: "cleaned_data".to_owned()
        }));
    }

    #[test]
    fn backoff_doubles_within_jitter_bounds() {
        for attempt in 1..=3 {
            let nominal = 1_000u64 << (attempt - 1);
            let delay = backoff_delay(attempt, 1_000).as_millis();
            assert!(delay >= u128::from(nominal * 3 / 4), "attempt {attempt}: {delay}");
            assert!(delay < u128::from(nominal * 5 / 4), "attempt {attempt}: {delay}");
        }
    }

    #[test]
    fn backoff_is_capped() {
        let delay = backoff_delay(30, 10_000);
        assert!(delay <= Duration::from_millis(MAX_DELAY_MS * 5 / 4));
    }

    #[tokio::test]
    async fn retries_then_succeeds() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_with_backoff(3, 0, || {
            let c = Arc::clone(&c);
            async move {
                if c.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(status(502))
                } else {
                    Ok(7)
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn gives_up_after_max_retries() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result: Result<u32, _> = retry_with_backoff(2, 0, || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err(status(503))
            }
        })
        .await;
        assert!(matches!(result, Err(SinkError::UnexpectedStatus { status: 503, .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn does_not_retry_client_errors() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result: Result<u32, _> = retry_with_backoff(3, 0, || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err(status(400))
            }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1, "400 must not be retried");
    }
}
