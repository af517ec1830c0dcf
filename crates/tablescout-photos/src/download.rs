//! Downloading selected photos to disk as [`PhotoFile`] records.
//!
//! Every saved file is re-encoded as JPEG and downscaled so its longest edge
//! fits the configured maximum, whatever format the source served.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use futures::stream::{self, StreamExt};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use sha2::{Digest, Sha256};
use tablescout_core::{PhotoFile, PhotoSubject};

use crate::error::PhotoError;
use crate::types::{PhotoCandidate, PhotoSelection};

/// Concurrent downloads per `materialize` call.
const DOWNLOAD_CONCURRENCY: usize = 3;

/// Longest edge of a saved photo unless overridden.
pub const DEFAULT_MAX_EDGE: u32 = 1600;

const JPEG_QUALITY: u8 = 85;

/// Extension of every saved file.
const OUTPUT_EXTENSION: &str = "jpg";

/// A fetched image, already normalized to JPEG.
#[derive(Debug)]
struct FetchedImage {
    bytes: Vec<u8>,
}

/// Fetches images and writes them under a fixed output directory.
pub struct PhotoDownloader {
    client: reqwest::Client,
    output_dir: PathBuf,
    max_bytes: usize,
    max_edge: u32,
}

impl PhotoDownloader {
    /// # Errors
    ///
    /// Returns [`PhotoError::Http`] if the HTTP client cannot be built.
    pub fn new(
        output_dir: impl Into<PathBuf>,
        timeout_secs: u64,
        user_agent: &str,
        max_bytes: usize,
    ) -> Result<Self, PhotoError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            output_dir: output_dir.into(),
            max_bytes,
            max_edge: DEFAULT_MAX_EDGE,
        })
    }

    /// Caps the longest edge of saved photos. Zero keeps the default.
    #[must_use]
    pub fn with_max_edge(mut self, max_edge: u32) -> Self {
        if max_edge > 0 {
            self.max_edge = max_edge;
        }
        self
    }

    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Downloads one image to `<output_dir>/<file_stem>.jpg`.
    ///
    /// # Errors
    ///
    /// Returns [`PhotoError`] on transport failure, a non-success status, a
    /// body over the byte cap, content that is not a decodable image, or a
    /// failed write.
    pub async fn download(&self, url: &str, file_stem: &str) -> Result<PathBuf, PhotoError> {
        let image = self.fetch_image(url).await?;
        self.write_image(file_stem, &image).await
    }

    async fn fetch_image(&self, url: &str) -> Result<FetchedImage, PhotoError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(PhotoError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let too_large = || PhotoError::TooLarge {
            url: url.to_string(),
            limit: self.max_bytes,
        };
        if response
            .content_length()
            .is_some_and(|len| usize::try_from(len).map_or(true, |len| len > self.max_bytes))
        {
            return Err(too_large());
        }

        let bytes = response.bytes().await?;
        if bytes.len() > self.max_bytes {
            return Err(too_large());
        }

        if !infer::is_image(&bytes) {
            return Err(PhotoError::NotAnImage {
                url: url.to_string(),
            });
        }

        let max_edge = self.max_edge;
        let jpeg = tokio::task::spawn_blocking(move || normalize_image(&bytes, max_edge))
            .await?
            .map_err(|e| PhotoError::Image {
                url: url.to_string(),
                source: e,
            })?;

        Ok(FetchedImage { bytes: jpeg })
    }

    async fn write_image(
        &self,
        file_stem: &str,
        image: &FetchedImage,
    ) -> Result<PathBuf, PhotoError> {
        tokio::fs::create_dir_all(&self.output_dir)
            .await
            .map_err(|e| PhotoError::Io {
                path: self.output_dir.display().to_string(),
                source: e,
            })?;

        let path = self
            .output_dir
            .join(format!("{file_stem}.{OUTPUT_EXTENSION}"));
        tokio::fs::write(&path, &image.bytes)
            .await
            .map_err(|e| PhotoError::Io {
                path: path.display().to_string(),
                source: e,
            })?;
        Ok(path)
    }

    /// Downloads up to `limit` photos for a restaurant.
    ///
    /// With a selection, the hero comes first (flagged `is_hero`) followed by
    /// the gallery in rank order. Without one, the first `limit` raw URLs are
    /// used and the first successful download becomes the hero. Files are
    /// named `<slug>-<n>.jpg` with `n` counting from 1 over saved files.
    /// Failed downloads and byte-identical duplicates are skipped.
    pub async fn materialize(
        &self,
        slug: &str,
        name: &str,
        selection: Option<&PhotoSelection>,
        raw_urls: &[String],
        limit: usize,
    ) -> Vec<PhotoFile> {
        let planned = plan_downloads(selection, raw_urls, limit);
        if planned.is_empty() {
            return Vec::new();
        }

        let fetched: Vec<(PlannedPhoto, Result<FetchedImage, PhotoError>)> =
            stream::iter(planned.into_iter().map(|plan| async move {
                let result = self.fetch_image(&plan.url).await;
                (plan, result)
            }))
            .buffered(DOWNLOAD_CONCURRENCY)
            .collect()
            .await;

        let mut seen_hashes: HashSet<String> = HashSet::new();
        let mut files: Vec<PhotoFile> = Vec::new();
        let assign_hero_by_position = selection.is_none();

        for (plan, result) in fetched {
            let image = match result {
                Ok(image) => image,
                Err(e) => {
                    tracing::warn!(url = %plan.url, error = %e, "photo download failed");
                    continue;
                }
            };

            if !seen_hashes.insert(content_hash(&image.bytes)) {
                tracing::debug!(url = %plan.url, "duplicate photo content skipped");
                continue;
            }

            let n = files.len() + 1;
            let stem = format!("{slug}-{n}");
            match self.write_image(&stem, &image).await {
                Ok(local_path) => {
                    let is_hero = if assign_hero_by_position {
                        files.is_empty()
                    } else {
                        plan.is_hero
                    };
                    files.push(PhotoFile {
                        source_url: plan.url,
                        local_path,
                        alt_text: alt_text(name, plan.subject, &plan.description, n),
                        subject: plan.subject,
                        is_hero,
                    });
                }
                Err(e) => {
                    tracing::warn!(url = %plan.url, error = %e, "photo write failed");
                }
            }
        }

        tracing::info!(slug, saved = files.len(), "photos materialized");
        files
    }
}

#[derive(Debug, Clone)]
struct PlannedPhoto {
    url: String,
    subject: Option<PhotoSubject>,
    description: String,
    is_hero: bool,
}

impl PlannedPhoto {
    fn from_candidate(candidate: &PhotoCandidate, is_hero: bool) -> Self {
        Self {
            url: candidate.url.clone(),
            subject: Some(candidate.analysis.subject),
            description: candidate.analysis.description.clone(),
            is_hero,
        }
    }
}

fn plan_downloads(
    selection: Option<&PhotoSelection>,
    raw_urls: &[String],
    limit: usize,
) -> Vec<PlannedPhoto> {
    match selection {
        Some(selection) => selection
            .hero
            .iter()
            .map(|c| PlannedPhoto::from_candidate(c, true))
            .chain(
                selection
                    .gallery
                    .iter()
                    .map(|c| PlannedPhoto::from_candidate(c, false)),
            )
            .take(limit)
            .collect(),
        None => crate::urls::dedup_candidates(raw_urls)
            .into_iter()
            .take(limit)
            .map(|url| PlannedPhoto {
                url,
                subject: None,
                description: String::new(),
                is_hero: false,
            })
            .collect(),
    }
}

/// Alt text: the analyzer's description, then a subject phrase, then a
/// positional fallback.
fn alt_text(name: &str, subject: Option<PhotoSubject>, description: &str, n: usize) -> String {
    let description = description.trim();
    if !description.is_empty() {
        return description.to_string();
    }
    match subject {
        Some(PhotoSubject::Food) => format!("Dish served at {name}"),
        Some(PhotoSubject::Ambiance) => format!("Dining room at {name}"),
        Some(PhotoSubject::Exterior) => format!("Exterior of {name}"),
        Some(PhotoSubject::People) => format!("Guests at {name}"),
        Some(PhotoSubject::Other) | None => format!("{name} photo {n}"),
    }
}

/// Decodes any supported format, shrinks it to fit `max_edge` keeping the
/// aspect ratio, and re-encodes it as RGB JPEG.
fn normalize_image(bytes: &[u8], max_edge: u32) -> Result<Vec<u8>, image::ImageError> {
    let mut img = image::load_from_memory(bytes)?;
    if img.width() > max_edge || img.height() > max_edge {
        img = img.resize(max_edge, max_edge, FilterType::Lanczos3);
    }
    let rgb = img.to_rgb8();

    let mut out = Vec::new();
    JpegEncoder::new_with_quality(&mut out, JPEG_QUALITY).encode_image(&rgb)?;
    Ok(out)
}

fn content_hash(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    digest.iter().map(|b| format!("{b:02x}")).collect()
}
