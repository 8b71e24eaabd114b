use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use eye_common::openai::{VisionClientConfig, DEFAULT_BASE_URL, DEFAULT_MODEL};

use crate::error::AppError;

/// Application configuration loaded explicitly from environment variables.
///
/// Only the API key is required; everything else has a default suited to a local run.
#[derive(Debug, Clone)]
pub struct Config {
    /// Settings handed to the vision client at construction.
    pub vision: VisionClientConfig,
    /// Address the HTTP server listens on.
    pub bind_addr: SocketAddr,
    /// Directory where uploaded and captured images are written and served from.
    pub upload_dir: PathBuf,
    /// Request body limit for `POST /analyze`.
    pub max_upload_bytes: usize,
    /// How long a stored analysis stays reachable from its session cookie.
    pub session_ttl: Duration,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Required:
    /// - `OPENROUTER_API_KEY`
    ///
    /// Optional:
    /// - `OPENROUTER_MODEL` (default: "openai/gpt-4o-mini")
    /// - `OPENROUTER_BASE_URL` (default: "https://openrouter.ai/api/v1")
    /// - `OPENROUTER_REFERER`, `OPENROUTER_TITLE` (attribution headers)
    /// - `VISION_TIMEOUT_SECS` (default: 60)
    /// - `VISION_MAX_ERROR_BODY_BYTES` (default: 8192)
    /// - `BIND_ADDR` (default: "0.0.0.0:5000")
    /// - `UPLOAD_DIR` (default: "static")
    /// - `MAX_UPLOAD_BYTES` (default: 16 MiB)
    /// - `SESSION_TTL_SECS` (default: 86400)
    pub fn from_env() -> Result<Self, AppError> {
        let api_key = std::env::var("OPENROUTER_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                AppError::Config("OPENROUTER_API_KEY environment variable is required".to_string())
            })?;

        let mut vision = VisionClientConfig::new(api_key)
            .with_model(env_or("OPENROUTER_MODEL", DEFAULT_MODEL))
            .with_base_url(env_or("OPENROUTER_BASE_URL", DEFAULT_BASE_URL));
        if let Some(secs) = env_parse::<u64>("VISION_TIMEOUT_SECS") {
            vision = vision.with_timeout(Duration::from_secs(secs));
        }
        if let Some(bytes) = env_parse::<usize>("VISION_MAX_ERROR_BODY_BYTES") {
            vision.max_error_body_bytes = bytes;
        }
        if let Ok(referer) = std::env::var("OPENROUTER_REFERER") {
            vision.referer = Some(referer).filter(|s| !s.is_empty());
        }
        if let Ok(title) = std::env::var("OPENROUTER_TITLE") {
            vision.title = Some(title).filter(|s| !s.is_empty());
        }

        let bind_addr = env_or("BIND_ADDR", "0.0.0.0:5000")
            .parse::<SocketAddr>()
            .map_err(|e| AppError::Config(format!("BIND_ADDR is not a socket address: {e}")))?;

        Ok(Self {
            vision,
            bind_addr,
            upload_dir: PathBuf::from(env_or("UPLOAD_DIR", "static")),
            max_upload_bytes: env_parse("MAX_UPLOAD_BYTES").unwrap_or(16 * 1024 * 1024),
            session_ttl: Duration::from_secs(env_parse("SESSION_TTL_SECS").unwrap_or(86_400)),
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|s| s.parse::<T>().ok())
}
