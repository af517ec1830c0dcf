//! Candidate photo discovery and the optional select-then-download stage.

use std::sync::{Arc, LazyLock};

use regex::Regex;
use serde_json::Value;
use tablescout_core::PhotoFile;
use tablescout_photos::{dedup_candidates, PhotoDownloader, PhotoPipeline};

use crate::html::{json_ld_nodes, meta_content};

static GOOGLE_PHOTO_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"https://lh\d\.googleusercontent\.com/[A-Za-z0-9_\-/.]+(?:=[A-Za-z0-9\-]+)?")
        .expect("valid google photo regex")
});

/// Photo URLs on a listing page: JSON-LD images, `og:image`, then every
/// Google user-content URL in page order. Upgraded to full resolution and
/// deduplicated.
#[must_use]
pub fn photo_urls(page: &str) -> Vec<String> {
    let mut urls: Vec<String> = Vec::new();
    for node in json_ld_nodes(page) {
        collect_images(node.get("image"), &mut urls);
        collect_images(node.get("photo"), &mut urls);
    }
    if let Some(og) = meta_content(page, "og:image") {
        urls.push(og);
    }

    // Script payloads escape `=` and `/`.
    let unescaped = page.replace("\\u003d", "=").replace("\\/", "/");
    urls.extend(
        GOOGLE_PHOTO_RE
            .find_iter(&unescaped)
            .map(|m| m.as_str().to_owned()),
    );
    dedup_candidates(&urls)
}

fn collect_images(value: Option<&Value>, out: &mut Vec<String>) {
    match value {
        Some(Value::String(s)) => out.push(s.trim().to_owned()),
        Some(Value::Array(items)) => {
            for item in items {
                collect_images(Some(item), out);
            }
        }
        Some(obj @ Value::Object(_)) => {
            collect_images(obj.get("url").or_else(|| obj.get("contentUrl")), out);
        }
        _ => {}
    }
}

/// Photo selection plus download for listing records.
///
/// Without a pipeline (no vision analyzer configured), photos are taken in
/// page order and the first saved one becomes the hero.
pub struct ListingPhotoStage {
    pipeline: Option<Arc<PhotoPipeline>>,
    downloader: Arc<PhotoDownloader>,
    max_analyze: usize,
    limit: usize,
}

impl ListingPhotoStage {
    /// `limit` bounds saved files: one hero plus the gallery.
    #[must_use]
    pub fn new(
        pipeline: Option<Arc<PhotoPipeline>>,
        downloader: Arc<PhotoDownloader>,
        max_analyze: usize,
        limit: usize,
    ) -> Self {
        Self {
            pipeline,
            downloader,
            max_analyze,
            limit,
        }
    }

    pub async fn run(&self, slug: &str, name: &str, urls: &[String]) -> Vec<PhotoFile> {
        if urls.is_empty() || self.limit == 0 {
            return Vec::new();
        }
        let selection = match &self.pipeline {
            Some(pipeline) => Some(pipeline.select_photos(urls, self.max_analyze).await),
            None => None,
        };
        // No hero means the first raw URL stands in for one.
        let selection = selection.filter(|s| s.hero.is_some());
        self.downloader
            .materialize(slug, name, selection.as_ref(), urls, self.limit)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collects_ld_og_and_inline_urls_in_order() {
        let page = r#"
            <meta property="og:image" content="https://cdn.example.com/og.jpg">
            <script type="application/ld+json">{"@type":"Restaurant","image":["https://cdn.example.com/ld.jpg",{"url":"https://cdn.example.com/ld2.jpg"}]}</script>
            <img src="https://lh5.googleusercontent.com/p/AF1Qip1=w408-h306-k-no">
            <script>var s = "https:\/\/lh5.googleusercontent.com\/p\/AF1Qip1=w80-h80";</script>
            <script>var t = "https:\/\/lh3.googleusercontent.com\/p\/AF1Qip2=s120";</script>
        "#;

        assert_eq!(
            photo_urls(page),
            vec![
                "https://cdn.example.com/ld.jpg".to_string(),
                "https://cdn.example.com/ld2.jpg".to_string(),
                "https://cdn.example.com/og.jpg".to_string(),
                "https://lh5.googleusercontent.com/p/AF1Qip1=s1600".to_string(),
                "https://lh3.googleusercontent.com/p/AF1Qip2=s1600".to_string(),
            ]
        );
    }

    #[test]
    fn page_without_images_yields_nothing() {
        assert!(photo_urls("<html><h1>Luigi's</h1></html>").is_empty());
    }
}
