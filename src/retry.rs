use std::{future::Future, time::Duration};

use tokio::time::{sleep, timeout};
use tracing::{error, warn};

use crate::errors::ChainError;

const DEFAULT_RETRY_DELAY: u64 = 10;

/// How remote reads are retried.
///
/// `max_attempts = None` retries until the call succeeds. Every attempt is
/// bounded by `call_timeout` when one is set, and a timed out attempt counts
/// as a failed one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub delay: Duration,
    pub max_attempts: Option<u32>,
    pub call_timeout: Option<Duration>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            delay: Duration::from_secs(DEFAULT_RETRY_DELAY),
            max_attempts: None,
            call_timeout: None,
        }
    }
}

impl RetryPolicy {
    pub fn new(delay: Duration, max_attempts: Option<u32>, call_timeout: Option<Duration>) -> Self {
        Self {
            delay,
            max_attempts,
            call_timeout,
        }
    }
}

/// Runs a single remote call bounded by `policy.call_timeout`, without
/// retrying it.
pub async fn with_timeout<T, Fut>(policy: &RetryPolicy, call: Fut) -> Result<T, ChainError>
where
    Fut: Future<Output = Result<T, ChainError>>,
{
    match policy.call_timeout {
        Some(limit) => timeout(limit, call)
            .await
            .unwrap_or(Err(ChainError::Timeout(limit))),
        None => call.await,
    }
}

/// Runs `op` until it succeeds, sleeping a fixed `policy.delay` between
/// failed attempts.
pub async fn retry_with_delay<T, F, Fut>(
    policy: &RetryPolicy,
    call: &'static str,
    mut op: F,
) -> Result<T, ChainError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ChainError>>,
{
    let mut attempt: u32 = 0;

    loop {
        attempt = attempt.saturating_add(1);

        let err = match with_timeout(policy, op()).await {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };

        if policy.max_attempts.is_some_and(|max| attempt >= max) {
            error!(call, attempt, error = %err, "Giving up on remote call");
            return Err(ChainError::RetriesExhausted {
                call,
                attempts: attempt,
                last: Box::new(err),
            });
        }

        warn!(
            call,
            attempt,
            error = %err,
            "Network error, retrying in {} seconds",
            policy.delay.as_secs()
        );
        sleep(policy.delay).await;
    }
}
