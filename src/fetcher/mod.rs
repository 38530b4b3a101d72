//! Page fetcher trait and backends.
//!
//! The resolver and the listing pipeline only see [`PageFetcher`]; whether a
//! page comes straight from the site or through a rendering proxy is decided
//! by configuration.

mod direct;
mod flaresolverr;
mod retry;

pub use direct::DirectFetcher;
pub use flaresolverr::FlareSolverrFetcher;
pub use retry::RetryingFetcher;

use crate::config::{FetchBackend, FetchConfig};
use crate::error::FetchError;
use async_trait::async_trait;
use reqwest::header::HeaderMap;
use std::sync::Arc;
use std::time::Duration;

/// Browser user agent sent with every request.
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/140.0.0.0 Safari/537.36";

/// Retrieves fully rendered HTML for a URL.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Returns the human-readable name of this backend.
    fn name(&self) -> &'static str;

    /// Fetches the page behind `url`.
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

/// Builds the fetcher described by the configuration.
///
/// The backend is wrapped in a [`RetryingFetcher`] when more than one attempt
/// is configured.
pub fn create_fetcher(config: &FetchConfig) -> Result<Arc<dyn PageFetcher>, FetchError> {
    match config.backend {
        FetchBackend::Direct => Ok(with_retries(DirectFetcher::new(config.clone())?, config)),
        FetchBackend::Flaresolverr => Ok(with_retries(
            FlareSolverrFetcher::new(config.clone())?,
            config,
        )),
    }
}

fn with_retries<F: PageFetcher + 'static>(inner: F, config: &FetchConfig) -> Arc<dyn PageFetcher> {
    if config.retries > 1 {
        let base_delay = Duration::from_secs_f64(config.retry_base_delay_sec);
        Arc::new(RetryingFetcher::new(inner, config.retries, base_delay))
    } else {
        Arc::new(inner)
    }
}

/// Common HTTP client configuration for fetchers.
pub fn create_http_client(timeout: Duration, headers: HeaderMap) -> Result<reqwest::Client, FetchError> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .default_headers(headers)
        .cookie_store(true)
        .timeout(timeout)
        .build()
        .map_err(|e| FetchError::Client(e.to_string()))
}

/// Applies rate limiting delay.
pub async fn rate_limit(delay_sec: f64) {
    if delay_sec > 0.0 {
        tokio::time::sleep(Duration::from_secs_f64(delay_sec)).await;
    }
}
