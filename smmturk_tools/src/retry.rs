use std::{future::Future, time::Duration};

use log::*;

use crate::SmmTurkApiError;

const MAX_BACKOFF: Duration = Duration::from_secs(30);

/// Bounded retry with exponential backoff.
///
/// The `n`th retry waits `base_delay * 2^(n-1)`, capped at 30 seconds. After `max_retries` retries the last error is
/// returned unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { max_retries: 3, base_delay: Duration::from_millis(500) }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self { max_retries, base_delay }
    }

    /// A policy that makes exactly one attempt.
    pub fn none() -> Self {
        Self { max_retries: 0, base_delay: Duration::ZERO }
    }

    pub fn delay_for(&self, retry: u32) -> Duration {
        let factor = 2u32.saturating_pow(retry.saturating_sub(1));
        self.base_delay.saturating_mul(factor).min(MAX_BACKOFF)
    }

    /// Runs `f` until it succeeds, `should_retry` rejects the error, or the retry budget is spent.
    pub async fn run<T, F, Fut, P>(&self, label: &str, should_retry: P, mut f: F) -> Result<T, SmmTurkApiError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, SmmTurkApiError>>,
        P: Fn(&SmmTurkApiError) -> bool,
    {
        let mut retry = 0;
        loop {
            match f().await {
                Ok(v) => return Ok(v),
                Err(e) if retry < self.max_retries && should_retry(&e) => {
                    retry += 1;
                    let delay = self.delay_for(retry);
                    warn!("🛰️ {label} failed ({e}). Retry {retry}/{} in {}ms", self.max_retries, delay.as_millis());
                    tokio::time::sleep(delay).await;
                },
                Err(e) => {
                    if retry > 0 {
                        error!("🛰️ {label} failed after {retry} retries. {e}");
                    }
                    return Err(e);
                },
            }
        }
    }
}
