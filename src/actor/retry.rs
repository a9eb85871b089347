//! Retry with exponential backoff for calls made by actors

use std::future::Future;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Retries after the first attempt
    pub max_retries: u32,
    pub initial_delay: Duration,
    /// Cap for the doubled delay
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_secs(2),
            max_delay: Duration::from_secs(30),
        }
    }
}

impl RetryConfig {
    pub fn new(max_retries: u32, initial_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_retries,
            initial_delay,
            max_delay,
        }
    }

    /// Sleep before each retry: initial delay, doubling up to the cap
    pub fn delays(&self) -> impl Iterator<Item = Duration> + use<> {
        let max_delay = self.max_delay;
        std::iter::successors(Some(self.initial_delay.min(max_delay)), move |d| {
            Some((*d * 2).min(max_delay))
        })
        .take(self.max_retries as usize)
    }
}

/// Run `operation`, retrying errors for which `is_retryable` holds.
///
/// Other errors, and the error after the last retry, are returned as is.
pub async fn with_retry<F, Fut, T, E, P>(
    config: &RetryConfig,
    is_retryable: P,
    mut operation: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
    P: Fn(&E) -> bool,
{
    let mut delays = config.delays();
    let mut attempt = 1;

    loop {
        let err = match operation().await {
            Ok(value) => return Ok(value),
            Err(e) => e,
        };

        if !is_retryable(&err) {
            return Err(err);
        }
        let Some(delay) = delays.next() else {
            tracing::warn!("Giving up after {} attempts: {}", attempt, err);
            return Err(err);
        };

        tracing::warn!("Attempt {} failed: {}. Retrying in {:?}", attempt, err, delay);
        tokio::time::sleep(delay).await;
        attempt += 1;
    }
}
