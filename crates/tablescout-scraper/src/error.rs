use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("rate limited by {domain} (retry after {retry_after_secs}s)")]
    RateLimited {
        domain: String,
        retry_after_secs: u64,
    },

    #[error("page not found: {url}")]
    NotFound { url: String },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("render service error for {url}: {reason}")]
    Render { url: String, reason: String },

    /// A strategy found the page but not the node it looks for.
    #[error("missing {what} in page")]
    MissingNode { what: String },

    #[error("invalid handle \"{handle}\": {reason}")]
    InvalidHandle { handle: String, reason: String },
}

impl ScraperError {
    pub(crate) fn missing(what: impl Into<String>) -> Self {
        ScraperError::MissingNode { what: what.into() }
    }

    pub(crate) fn deserialize(context: impl Into<String>, source: serde_json::Error) -> Self {
        ScraperError::Deserialize {
            context: context.into(),
            source,
        }
    }
}
