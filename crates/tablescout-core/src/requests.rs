use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::parse::to_slug;
use crate::ConfigError;

/// Free-form business name plus locality for the listing source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingQuery {
    pub name: String,
    #[serde(default)]
    pub locality: String,
}

impl ListingQuery {
    /// The search string sent to the listing source.
    #[must_use]
    pub fn search_text(&self) -> String {
        let name = self.name.trim();
        let locality = self.locality.trim();
        if locality.is_empty() {
            name.to_string()
        } else {
            format!("{name} {locality}")
        }
    }
}

/// Which sources to query for one business. An absent handle means the
/// source is not queried at all.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileRequest {
    #[serde(default)]
    pub listing: Option<ListingQuery>,
    #[serde(default)]
    pub instagram: Option<String>,
    #[serde(default)]
    pub tiktok: Option<String>,
    #[serde(default)]
    pub youtube: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
}

impl ProfileRequest {
    /// Human-facing label for logs and output file names.
    #[must_use]
    pub fn label(&self) -> String {
        if let Some(listing) = &self.listing {
            return listing.name.trim().to_string();
        }
        [&self.website, &self.instagram, &self.tiktok, &self.youtube]
            .into_iter()
            .flatten()
            .map(|h| h.trim().trim_start_matches('@').to_string())
            .find(|h| !h.is_empty())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.listing.is_none()
            && self.instagram.is_none()
            && self.tiktok.is_none()
            && self.youtube.is_none()
            && self.website.is_none()
    }
}

#[derive(Debug, Deserialize)]
pub struct RequestsFile {
    pub requests: Vec<ProfileRequest>,
}

/// Load and validate a batch of profile requests from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_requests(path: &Path) -> Result<RequestsFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::RequestsFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let requests_file: RequestsFile =
        serde_yaml::from_str(&content).map_err(ConfigError::RequestsFileParse)?;

    validate_requests(&requests_file)?;

    Ok(requests_file)
}

fn validate_requests(requests_file: &RequestsFile) -> Result<(), ConfigError> {
    let mut seen_slugs = HashSet::new();

    for (idx, request) in requests_file.requests.iter().enumerate() {
        if request.is_empty() {
            return Err(ConfigError::Validation(format!(
                "request #{} names no sources",
                idx + 1
            )));
        }

        if let Some(listing) = &request.listing {
            if listing.name.trim().is_empty() {
                return Err(ConfigError::Validation(format!(
                    "request #{} has an empty listing name",
                    idx + 1
                )));
            }
        }

        let slug = to_slug(&request.label());
        if slug.is_empty() {
            return Err(ConfigError::Validation(format!(
                "request #{} produces an empty slug",
                idx + 1
            )));
        }
        if !seen_slugs.insert(slug.clone()) {
            return Err(ConfigError::Validation(format!(
                "duplicate request slug: '{slug}'"
            )));
        }
    }

    Ok(())
}
