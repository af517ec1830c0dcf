//! Per-image analysis: subject, quality, appeal, and recommendation tier.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tablescout_core::PhotoSubject;

use crate::error::PhotoError;
use crate::types::{PhotoAnalysis, Recommendation};

/// Anything that can score one image URL.
#[async_trait]
pub trait PhotoAnalyzer: Send + Sync {
    /// Analyzes one image.
    ///
    /// # Errors
    ///
    /// Returns [`PhotoError`] when the image cannot be analyzed; the pipeline
    /// drops such candidates.
    async fn analyze(&self, image_url: &str) -> Result<PhotoAnalysis, PhotoError>;
}

const SYSTEM_PROMPT: &str = "You rate restaurant photos for a marketing website. \
Return JSON with keys: subject (one of food, ambiance, exterior, people, other), \
quality (1-10, lighting, sharpness, composition), appeal (1-10, how inviting it looks), \
recommendation (one of hero, gallery, skip), description (at most 12 words, usable as alt text).";

const USER_PROMPT: &str = "Rate this photo.";

/// Vision analyzer backed by an OpenAI-compatible chat-completions endpoint.
pub struct VisionAnalyzer {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
}

impl VisionAnalyzer {
    /// # Errors
    ///
    /// Returns [`PhotoError::Http`] if the HTTP client cannot be built.
    pub fn new(
        endpoint: &str,
        api_key: &str,
        model: &str,
        timeout_secs: u64,
    ) -> Result<Self, PhotoError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;
        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
        })
    }
}

#[async_trait]
impl PhotoAnalyzer for VisionAnalyzer {
    async fn analyze(&self, image_url: &str) -> Result<PhotoAnalysis, PhotoError> {
        let req_body = json!({
            "model": self.model,
            "response_format": { "type": "json_object" },
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                {
                    "role": "user",
                    "content": [
                        { "type": "text", "text": USER_PROMPT },
                        { "type": "image_url", "image_url": { "url": image_url } }
                    ]
                }
            ],
            "temperature": 0.1,
            "max_tokens": 300
        });

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&req_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(PhotoError::UnexpectedStatus {
                status: status.as_u16(),
                url: self.endpoint.clone(),
            });
        }

        let body = response.text().await?;
        let parsed: Value = serde_json::from_str(&body).map_err(|e| PhotoError::Deserialize {
            context: format!("analysis of {image_url}"),
            source: e,
        })?;

        let content = parsed
            .get("choices")
            .and_then(Value::as_array)
            .and_then(|choices| choices.first())
            .and_then(|choice| choice.get("message"))
            .and_then(|msg| msg.get("content"))
            .and_then(Value::as_str)
            .ok_or_else(|| PhotoError::InvalidResponse("no message content".to_string()))?;

        parse_analysis_json(content)
    }
}

#[derive(Deserialize)]
struct RawAnalysis {
    #[serde(default)]
    subject: String,
    quality: f64,
    #[serde(alias = "visual_appeal", alias = "visualAppeal")]
    appeal: f64,
    #[serde(default)]
    recommendation: String,
    #[serde(default)]
    description: String,
}

/// Parses the model's JSON answer, tolerating Markdown code fences.
///
/// Scores are clamped to 1–10; non-finite scores are rejected.
pub(crate) fn parse_analysis_json(content: &str) -> Result<PhotoAnalysis, PhotoError> {
    let trimmed = content
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim();

    let raw: RawAnalysis = serde_json::from_str(trimmed).map_err(|e| PhotoError::Deserialize {
        context: "photo analysis content".to_string(),
        source: e,
    })?;

    if !raw.quality.is_finite() || !raw.appeal.is_finite() {
        return Err(PhotoError::InvalidResponse(
            "non-finite score in analysis".to_string(),
        ));
    }

    Ok(PhotoAnalysis {
        subject: PhotoSubject::from_label(&raw.subject),
        quality: raw.quality.clamp(1.0, 10.0),
        appeal: raw.appeal.clamp(1.0, 10.0),
        recommendation: Recommendation::from_label(&raw.recommendation),
        description: raw.description.trim().to_string(),
    })
}
