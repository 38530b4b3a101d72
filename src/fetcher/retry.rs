//! Retry decorator for fetchers.

use super::PageFetcher;
use crate::console::Console;
use crate::error::FetchError;
use async_trait::async_trait;
use std::time::Duration;

/// Retries a fetcher with exponential backoff.
pub struct RetryingFetcher<F> {
    inner: F,
    attempts: u32,
    base_delay: Duration,
    console: Console,
}

impl<F: PageFetcher> RetryingFetcher<F> {
    /// Wraps `inner`, making at most `attempts` tries per page.
    pub fn new(inner: F, attempts: u32, base_delay: Duration) -> Self {
        Self {
            inner,
            attempts: attempts.max(1),
            base_delay,
            console: Console::new(),
        }
    }

    fn backoff(&self, attempt: u32) -> Duration {
        self.base_delay * 2u32.pow(attempt.saturating_sub(1))
    }
}

#[async_trait]
impl<F: PageFetcher> PageFetcher for RetryingFetcher<F> {
    fn name(&self) -> &'static str {
        self.inner.name()
    }

    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let mut attempt = 0;

        loop {
            attempt += 1;
            match self.inner.fetch(url).await {
                Ok(html) => return Ok(html),
                Err(e) if attempt >= self.attempts => {
                    return Err(FetchError::RetriesExhausted {
                        attempts: attempt,
                        last: Box::new(e),
                    });
                }
                Err(e) => {
                    let delay = self.backoff(attempt);
                    self.console.warning(&format!(
                        "Request failed ({}), retrying in {:?} (attempt {}/{})",
                        e,
                        delay,
                        attempt + 1,
                        self.attempts
                    ));
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}
