//! Direct HTTP fetcher.

use super::{PageFetcher, create_http_client, rate_limit};
use crate::config::FetchConfig;
use crate::error::FetchError;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use std::time::Duration;

/// Fetches pages with a plain HTTP client and browser-like headers.
pub struct DirectFetcher {
    client: reqwest::Client,
    config: FetchConfig,
}

impl DirectFetcher {
    /// Creates a new direct fetcher with the given configuration.
    pub fn new(config: FetchConfig) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "Accept",
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8",
            ),
        );
        headers.insert(
            "Accept-Language",
            HeaderValue::from_static("en-US,en;q=0.9"),
        );
        headers.insert(
            "Cache-Control",
            HeaderValue::from_static("no-cache, no-store, must-revalidate"),
        );
        headers.insert("Pragma", HeaderValue::from_static("no-cache"));
        headers.insert("Upgrade-Insecure-Requests", HeaderValue::from_static("1"));

        let client = create_http_client(Duration::from_secs(config.timeout_sec), headers)?;

        Ok(Self { client, config })
    }
}

#[async_trait]
impl PageFetcher for DirectFetcher {
    fn name(&self) -> &'static str {
        "direct"
    }

    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        rate_limit(self.config.delay_between_requests_sec).await;

        let response = self.client.get(url).send().await?;
        let status = response.status();

        if !status.is_success() {
            if self.config.debug {
                eprintln!(
                    "[Fetch Debug] Non-success response: url={} status={}",
                    url,
                    status.as_u16()
                );
            }
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        Ok(response.text().await?)
    }
}
