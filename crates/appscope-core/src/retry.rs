//! Bounded retry around a [`Fetcher`].
//!
//! The storefront intermittently answers with rate limits or momentary
//! unavailability. [`RetryingFetcher`] absorbs those with a small, fixed
//! number of attempts separated by a fixed delay. Only fetch failures are
//! retried; anything else is returned straight away.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use appscope_core::retry::{RetryPolicy, RetryingFetcher};
//!
//! # use appscope_core::traits::Fetcher;
//! # #[derive(Clone)] struct MyFetcher;
//! # impl Fetcher for MyFetcher {
//! #     async fn fetch(&self, _: &str) -> Result<String, appscope_core::error::AppError> { todo!() }
//! # }
//! let fetcher = RetryingFetcher::new(MyFetcher, RetryPolicy::new(3, Duration::from_secs(1)));
//! ```

use std::time::Duration;

use crate::error::AppError;
use crate::traits::Fetcher;

/// How many times to try, and how long to wait in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one. Always at least 1.
    pub max_attempts: u32,
    /// Fixed pause between consecutive attempts.
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }
}

impl Default for RetryPolicy {
    /// 3 attempts, 1 second apart.
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_secs(1),
        }
    }
}

/// A [`Fetcher`] wrapper that retries fetch failures under a [`RetryPolicy`].
///
/// The wait is a `tokio` sleep, so it suspends only the calling task.
#[derive(Clone)]
pub struct RetryingFetcher<F> {
    inner: F,
    policy: RetryPolicy,
}

impl<F: Fetcher> RetryingFetcher<F> {
    pub fn new(inner: F, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }
}

impl<F: Fetcher> Fetcher for RetryingFetcher<F> {
    async fn fetch(&self, identifier: &str) -> Result<String, AppError> {
        let mut attempt = 1;
        loop {
            match self.inner.fetch(identifier).await {
                Ok(body) => {
                    if attempt > 1 {
                        tracing::info!(%identifier, attempt, "Fetch succeeded after retry");
                    }
                    return Ok(body);
                }
                Err(e) if e.is_fetch_failure() && attempt < self.policy.max_attempts => {
                    tracing::warn!(
                        %identifier,
                        attempt,
                        max_attempts = self.policy.max_attempts,
                        error = %e,
                        "Fetch failed, retrying"
                    );
                    tokio::time::sleep(self.policy.delay).await;
                    attempt += 1;
                }
                Err(e) => {
                    if e.is_fetch_failure() {
                        tracing::warn!(
                            %identifier,
                            attempts = attempt,
                            error = %e,
                            "Giving up after exhausting retries"
                        );
                    }
                    return Err(e);
                }
            }
        }
    }
}
