//! Page fetchers: plain HTTP with browser-like headers, or a headless-render
//! service.
//!
//! Extractors only see [`PageFetcher`], so tests and callers can swap in any
//! implementation.

mod origin;
mod render;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tablescout_core::AppConfig;

use crate::error::ScraperError;
use crate::rate_limit::retry_with_backoff;

pub use origin::{extract_domain, extract_origin};
pub use render::RenderFetcher;

/// Fetches one page and returns its HTML.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// # Errors
    ///
    /// Returns [`ScraperError`] on transport failure or a non-success status
    /// once retries are exhausted.
    async fn fetch_page(&self, url: &str) -> Result<String, ScraperError>;
}

/// Plain HTTP fetcher.
///
/// Transient errors (429, network failures, 5xx) are retried with jittered
/// exponential backoff up to `max_retries` additional attempts.
pub struct HttpFetcher {
    client: Client,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl HttpFetcher {
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        timeout_secs: u64,
        user_agent: &str,
        max_retries: u32,
        backoff_base_ms: u64,
    ) -> Result<Self, ScraperError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            max_retries,
            backoff_base_ms,
        })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch_page(&self, url: &str) -> Result<String, ScraperError> {
        retry_with_backoff(self.max_retries, self.backoff_base_ms, || async move {
            let response = self
                .client
                .get(url)
                .header(
                    reqwest::header::ACCEPT,
                    "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
                )
                .header(reqwest::header::ACCEPT_LANGUAGE, "en-US,en;q=0.9")
                .header(reqwest::header::CACHE_CONTROL, "no-cache")
                .send()
                .await?;
            check_status(&response, url)?;
            Ok(response.text().await?)
        })
        .await
    }
}

/// Maps a non-success response to the matching typed error.
pub(crate) fn check_status(response: &reqwest::Response, url: &str) -> Result<(), ScraperError> {
    let status = response.status();

    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        let retry_after_secs = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(60);
        return Err(ScraperError::RateLimited {
            domain: extract_domain(url),
            retry_after_secs,
        });
    }

    if status == reqwest::StatusCode::NOT_FOUND {
        return Err(ScraperError::NotFound {
            url: url.to_owned(),
        });
    }

    if !status.is_success() {
        return Err(ScraperError::UnexpectedStatus {
            status: status.as_u16(),
            url: url.to_owned(),
        });
    }

    Ok(())
}

/// Builds the fetcher for one run: the render service when one is
/// configured, plain HTTP otherwise.
///
/// # Errors
///
/// Returns [`ScraperError::Http`] if the HTTP client cannot be constructed.
pub fn fetcher_from_config(config: &AppConfig) -> Result<Arc<dyn PageFetcher>, ScraperError> {
    if let Some(render_url) = config.render_url.as_deref() {
        tracing::debug!(render_url, "using render service for page fetches");
        let fetcher = RenderFetcher::new(
            render_url,
            config.render_token.as_deref(),
            config.request_timeout_secs,
            config.max_retries,
            config.retry_backoff_base_ms,
        )?;
        return Ok(Arc::new(fetcher));
    }

    let fetcher = HttpFetcher::new(
        config.request_timeout_secs,
        &config.user_agent,
        config.max_retries,
        config.retry_backoff_base_ms,
    )?;
    Ok(Arc::new(fetcher))
}

#[cfg(test)]
#[path = "../client_test.rs"]
mod tests;
