//! Shared types, value parsers, and configuration for tablescout.

pub mod app_config;
pub mod config;
pub mod parse;
pub mod records;
pub mod requests;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use parse::{parse_compact_count, to_slug};
pub use records::{
    ContentItem, ExtractionStrategy, PhotoFile, PhotoSubject, RestaurantData, Review,
    SocialLink, SocialProfile, SourceKind, WebsiteProfile,
};
pub use requests::{load_requests, ListingQuery, ProfileRequest, RequestsFile};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read requests file {path}: {source}")]
    RequestsFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse requests file: {0}")]
    RequestsFileParse(#[from] serde_yaml::Error),

    #[error("requests file validation failed: {0}")]
    Validation(String),
}
