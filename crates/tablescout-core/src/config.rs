use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Every variable has a default, so an empty environment yields a usable
/// config; only malformed values are rejected.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let optional = |var: &str| -> Option<String> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<usize>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let env = parse_environment(&or_default("TABLESCOUT_ENV", "development"))?;
    let log_level = or_default("TABLESCOUT_LOG_LEVEL", "info");

    let request_timeout_secs = parse_u64("TABLESCOUT_REQUEST_TIMEOUT_SECS", "30")?;
    let user_agent = or_default(
        "TABLESCOUT_USER_AGENT",
        "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    );
    let max_retries = parse_u32("TABLESCOUT_MAX_RETRIES", "2")?;
    let retry_backoff_base_ms = parse_u64("TABLESCOUT_RETRY_BACKOFF_BASE_MS", "500")?;

    let render_url = optional("TABLESCOUT_RENDER_URL");
    let render_token = optional("TABLESCOUT_RENDER_TOKEN");

    let vision_api_url = or_default(
        "TABLESCOUT_VISION_API_URL",
        "https://api.openai.com/v1/chat/completions",
    );
    let vision_api_key = optional("TABLESCOUT_VISION_API_KEY");
    let vision_model = or_default("TABLESCOUT_VISION_MODEL", "gpt-4o-mini");

    let photo_dir = PathBuf::from(or_default("TABLESCOUT_PHOTO_DIR", "./photos"));
    let photo_max_analyze = parse_usize("TABLESCOUT_PHOTO_MAX_ANALYZE", "8")?;
    let photo_gallery_cap = parse_usize("TABLESCOUT_PHOTO_GALLERY_CAP", "5")?;
    let photo_batch_size = parse_usize("TABLESCOUT_PHOTO_BATCH_SIZE", "3")?;
    let photo_batch_pause_ms = parse_u64("TABLESCOUT_PHOTO_BATCH_PAUSE_MS", "1000")?;
    let photo_max_bytes = parse_usize("TABLESCOUT_PHOTO_MAX_BYTES", "8388608")?;
    let photo_max_edge = parse_u32("TABLESCOUT_PHOTO_MAX_EDGE", "1600")?;

    if photo_max_edge == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "TABLESCOUT_PHOTO_MAX_EDGE".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }

    if photo_batch_size == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "TABLESCOUT_PHOTO_BATCH_SIZE".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }

    Ok(AppConfig {
        env,
        log_level,
        request_timeout_secs,
        user_agent,
        max_retries,
        retry_backoff_base_ms,
        render_url,
        render_token,
        vision_api_url,
        vision_api_key,
        vision_model,
        photo_dir,
        photo_max_analyze,
        photo_gallery_cap,
        photo_batch_size,
        photo_batch_pause_ms,
        photo_max_bytes,
        photo_max_edge,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "TABLESCOUT_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
