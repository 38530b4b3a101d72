//! FlareSolverr rendering-proxy fetcher.
//!
//! FlareSolverr loads the target in a real browser, which gets past the
//! site's bot checks, and hands back the rendered markup.

use super::{PageFetcher, create_http_client, rate_limit};
use crate::config::FetchConfig;
use crate::error::FetchError;
use async_trait::async_trait;
use reqwest::header::HeaderMap;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Request body for the `request.get` command.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProxyRequest<'a> {
    cmd: &'static str,
    url: &'a str,
    max_timeout: u64,
}

/// Response envelope.
#[derive(Debug, Deserialize)]
struct ProxyResponse {
    status: String,
    #[serde(default)]
    message: String,
    solution: Option<Solution>,
}

/// Rendered page returned by the proxy.
#[derive(Debug, Deserialize)]
struct Solution {
    #[serde(default)]
    status: u16,
    response: String,
}

/// Fetches pages through a FlareSolverr instance.
pub struct FlareSolverrFetcher {
    client: reqwest::Client,
    config: FetchConfig,
}

impl FlareSolverrFetcher {
    /// Creates a new proxy fetcher with the given configuration.
    pub fn new(config: FetchConfig) -> Result<Self, FetchError> {
        // The proxy itself may take up to `max_timeout_ms` to render.
        let timeout = Duration::from_millis(config.max_timeout_ms)
            + Duration::from_secs(config.timeout_sec);
        let client = create_http_client(timeout, HeaderMap::new())?;

        Ok(Self { client, config })
    }

    /// Extracts the rendered HTML from a proxy response body.
    fn parse_response(url: &str, body: &str) -> Result<String, FetchError> {
        let response: ProxyResponse = serde_json::from_str(body)
            .map_err(|e| FetchError::Proxy(format!("unreadable response: {}", e)))?;

        if response.status != "ok" {
            return Err(FetchError::Proxy(format!(
                "{}: {}",
                response.status, response.message
            )));
        }

        let solution = response
            .solution
            .ok_or_else(|| FetchError::Proxy("response has no solution".to_string()))?;

        if solution.status >= 400 {
            return Err(FetchError::Status {
                status: solution.status,
                url: url.to_string(),
            });
        }

        Ok(solution.response)
    }
}

#[async_trait]
impl PageFetcher for FlareSolverrFetcher {
    fn name(&self) -> &'static str {
        "flaresolverr"
    }

    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        rate_limit(self.config.delay_between_requests_sec).await;

        let payload = ProxyRequest {
            cmd: "request.get",
            url,
            max_timeout: self.config.max_timeout_ms,
        };

        let response = self
            .client
            .post(&self.config.flaresolverr_url)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(FetchError::Proxy(format!(
                "proxy answered HTTP {}",
                response.status().as_u16()
            )));
        }

        let body = response.text().await?;
        let html = Self::parse_response(url, &body)?;

        if self.config.debug {
            eprintln!(
                "[Fetch Debug] Rendered {} ({} bytes) via {}",
                url,
                html.len(),
                self.config.flaresolverr_url
            );
        }

        Ok(html)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_shape() {
        let payload = ProxyRequest {
            cmd: "request.get",
            url: "https://www.chrono24.com/rolex/index.htm",
            max_timeout: 60000,
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["cmd"], "request.get");
        assert_eq!(json["maxTimeout"], 60000);
    }

    #[test]
    fn test_parse_ok_response() {
        let body = r#"{"status":"ok","message":"","solution":{"status":200,"response":"<html></html>"}}"#;
        assert_eq!(
            FlareSolverrFetcher::parse_response("https://x", body).unwrap(),
            "<html></html>"
        );
    }

    #[test]
    fn test_parse_error_response() {
        let body = r#"{"status":"error","message":"Timeout after 60.0 seconds."}"#;
        match FlareSolverrFetcher::parse_response("https://x", body) {
            Err(FetchError::Proxy(msg)) => assert!(msg.contains("Timeout")),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_parse_upstream_status() {
        let body = r#"{"status":"ok","solution":{"status":403,"response":"denied"}}"#;
        assert!(matches!(
            FlareSolverrFetcher::parse_response("https://x", body),
            Err(FetchError::Status { status: 403, .. })
        ));
    }
}
