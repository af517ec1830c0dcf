//! Headless-render service client (`POST {base}/content`).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;

use super::PageFetcher;
use crate::error::ScraperError;
use crate::rate_limit::retry_with_backoff;

/// Fetches fully rendered HTML through a Browserless-style `/content`
/// endpoint.
pub struct RenderFetcher {
    client: Client,
    endpoint: String,
    token: Option<String>,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl RenderFetcher {
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        base_url: &str,
        token: Option<&str>,
        timeout_secs: u64,
        max_retries: u32,
        backoff_base_ms: u64,
    ) -> Result<Self, ScraperError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            client,
            endpoint: format!("{}/content", base_url.trim_end_matches('/')),
            token: token.map(str::to_owned),
            max_retries,
            backoff_base_ms,
        })
    }
}

#[async_trait]
impl PageFetcher for RenderFetcher {
    async fn fetch_page(&self, url: &str) -> Result<String, ScraperError> {
        retry_with_backoff(self.max_retries, self.backoff_base_ms, || async move {
            let mut request = self
                .client
                .post(&self.endpoint)
                .header(reqwest::header::CACHE_CONTROL, "no-cache")
                .json(&json!({ "url": url }));
            if let Some(token) = &self.token {
                request = request.query(&[("token", token.as_str())]);
            }

            let response = request.send().await?;
            let status = response.status();
            if status.is_client_error() && status != reqwest::StatusCode::TOO_MANY_REQUESTS {
                return Err(ScraperError::Render {
                    url: url.to_owned(),
                    reason: format!("render service answered {}", status.as_u16()),
                });
            }
            super::check_status(&response, &self.endpoint)?;

            let body = response.text().await?;
            if body.trim().is_empty() {
                return Err(ScraperError::Render {
                    url: url.to_owned(),
                    reason: "empty document".to_owned(),
                });
            }
            Ok(body)
        })
        .await
    }
}
