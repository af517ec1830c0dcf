use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub log_level: String,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub max_retries: u32,
    pub retry_backoff_base_ms: u64,
    /// Base URL of a headless render service. Plain HTTP fetches when absent.
    pub render_url: Option<String>,
    pub render_token: Option<String>,
    pub vision_api_url: String,
    /// Photo analysis is skipped entirely when no key is configured.
    pub vision_api_key: Option<String>,
    pub vision_model: String,
    pub photo_dir: PathBuf,
    pub photo_max_analyze: usize,
    pub photo_gallery_cap: usize,
    pub photo_batch_size: usize,
    pub photo_batch_pause_ms: u64,
    pub photo_max_bytes: usize,
    /// Longest edge, in pixels, of a saved photo.
    pub photo_max_edge: u32,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff_base_ms", &self.retry_backoff_base_ms)
            .field("render_url", &self.render_url)
            .field(
                "render_token",
                &self.render_token.as_ref().map(|_| "[redacted]"),
            )
            .field("vision_api_url", &self.vision_api_url)
            .field(
                "vision_api_key",
                &self.vision_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("vision_model", &self.vision_model)
            .field("photo_dir", &self.photo_dir)
            .field("photo_max_analyze", &self.photo_max_analyze)
            .field("photo_gallery_cap", &self.photo_gallery_cap)
            .field("photo_batch_size", &self.photo_batch_size)
            .field("photo_batch_pause_ms", &self.photo_batch_pause_ms)
            .field("photo_max_bytes", &self.photo_max_bytes)
            .field("photo_max_edge", &self.photo_max_edge)
            .finish()
    }
}
