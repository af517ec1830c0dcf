use thiserror::Error;

#[derive(Debug, Error)]
pub enum PhotoError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("malformed analysis response: {0}")]
    InvalidResponse(String),

    #[error("content at {url} is not an image")]
    NotAnImage { url: String },

    #[error("could not decode or re-encode image at {url}: {source}")]
    Image {
        url: String,
        #[source]
        source: image::ImageError,
    },

    #[error("image processing task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("image at {url} exceeds {limit} bytes")]
    TooLarge { url: String, limit: usize },

    #[error("failed writing {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
