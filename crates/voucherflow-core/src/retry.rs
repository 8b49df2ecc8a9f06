// ── Bounded retry for idempotent reads ──

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::config::RetryPolicy;

/// Run `op` until it succeeds, fails permanently, or the policy is spent.
///
/// Only errors for which `voucherflow_api::Error::is_transient` holds are
/// retried. A rate-limit response waits at least its `Retry-After`.
pub async fn with_retry<T, F, Fut>(
    policy: &RetryPolicy,
    what: &str,
    mut op: F,
) -> Result<T, voucherflow_api::Error>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, voucherflow_api::Error>>,
{
    let mut attempt = 0;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_transient() && attempt < policy.max_retries => {
                attempt += 1;
                let delay = match &err {
                    voucherflow_api::Error::RateLimited { retry_after_secs } => policy
                        .delay_for(attempt)
                        .max(Duration::from_secs(*retry_after_secs)),
                    _ => policy.delay_for(attempt),
                };
                warn!(
                    error = %err,
                    attempt,
                    max = policy.max_retries,
                    delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                    "{what} failed, retrying"
                );
                tokio::time::sleep(delay).await;
            }
            Err(err) => return Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    fn policy(max_retries: u32) -> RetryPolicy {
        RetryPolicy {
            max_retries,
            initial_delay: Duration::from_millis(10),
            max_delay: Duration::from_millis(40),
        }
    }

    fn gateway_error() -> voucherflow_api::Error {
        voucherflow_api::Error::Api {
            status: 503,
            message: "unavailable".into(),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn transient_errors_are_retried_until_success() {
        let calls = AtomicU32::new(0);
        let counter = &calls;
        let result = with_retry(&policy(3), "list", move || async move {
            if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                Err(gateway_error())
            } else {
                Ok(7)
            }
        })
        .await;
        assert!(matches!(result, Ok(7)));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn retries_are_bounded() {
        let calls = AtomicU32::new(0);
        let counter = &calls;
        let result: Result<(), _> = with_retry(&policy(2), "list", move || async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Err(gateway_error())
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn permanent_errors_fail_fast() {
        let calls = AtomicU32::new(0);
        let counter = &calls;
        let result: Result<(), _> = with_retry(&policy(5), "get", move || async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Err(voucherflow_api::Error::NotFound { path: "/x".into() })
        })
        .await;
        assert!(matches!(result, Err(voucherflow_api::Error::NotFound { .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
