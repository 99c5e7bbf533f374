use crate::domain::RefinementPolicy;
use restyle_errors::AppError;
use std::env;
use std::fmt::Display;
use std::net::SocketAddr;
use std::str::FromStr;

pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_IMAGE_MODEL: &str = "gemini-2.5-flash-image-preview";
pub const DEFAULT_TEXT_MODEL: &str = "gemini-2.5-flash";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_MAX_BODY_BYTES: usize = 20 * 1024 * 1024;
const DEFAULT_RATE_LIMIT_PER_MINUTE: u32 = 10;
const DEFAULT_RATE_LIMIT_PER_HOUR: u32 = 100;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub gemini_api_key: Option<String>,
    pub gemini_base_url: String,
    pub image_model: String,
    pub text_model: String,
    pub database_url: Option<String>,
    pub allowed_origins: Vec<String>,
    pub refinement: RefinementPolicy,
    pub bind_addr: SocketAddr,
    pub max_body_bytes: usize,
    pub rate_limit_per_minute: u32,
    pub rate_limit_per_hour: u32,
    pub admin_token: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let defaults = RefinementPolicy::default();

        let gemini_base_url = optional("GEMINI_BASE_URL")
            .unwrap_or_else(|| DEFAULT_GEMINI_BASE_URL.to_string());
        url::Url::parse(&gemini_base_url).map_err(|e| {
            AppError::Configuration(format!("GEMINI_BASE_URL is not a valid URL: {e}"))
        })?;

        let config = Self {
            gemini_api_key: optional("GEMINI_API_KEY"),
            gemini_base_url: gemini_base_url.trim_end_matches('/').to_string(),
            image_model: optional("GEMINI_IMAGE_MODEL")
                .unwrap_or_else(|| DEFAULT_IMAGE_MODEL.to_string()),
            text_model: optional("GEMINI_TEXT_MODEL")
                .unwrap_or_else(|| DEFAULT_TEXT_MODEL.to_string()),
            database_url: optional("DATABASE_URL"),
            allowed_origins: parse_origins(
                &optional("ALLOWED_ORIGINS").unwrap_or_else(|| "*".to_string()),
            ),
            refinement: RefinementPolicy::new(
                parse_or("VOTE_THRESHOLD", defaults.vote_threshold)?,
                parse_or("NEGATIVE_RATIO_THRESHOLD", defaults.negative_ratio_threshold)?,
            ),
            bind_addr: parse_or("BIND_ADDR", parse_default(DEFAULT_BIND_ADDR)?)?,
            max_body_bytes: parse_or("MAX_BODY_BYTES", DEFAULT_MAX_BODY_BYTES)?,
            rate_limit_per_minute: parse_or("RATE_LIMIT_PER_MINUTE", DEFAULT_RATE_LIMIT_PER_MINUTE)?,
            rate_limit_per_hour: parse_or("RATE_LIMIT_PER_HOUR", DEFAULT_RATE_LIMIT_PER_HOUR)?,
            admin_token: optional("ADMIN_TOKEN"),
        };

        if config.gemini_api_key.is_none() {
            tracing::warn!("GEMINI_API_KEY not set, generative endpoints will return 500");
        }

        Ok(config)
    }

    /// Configuration for local runs and tests: development vote threshold,
    /// wildcard CORS, no database, no credentials.
    pub fn development() -> Self {
        Self {
            gemini_api_key: None,
            gemini_base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            image_model: DEFAULT_IMAGE_MODEL.to_string(),
            text_model: DEFAULT_TEXT_MODEL.to_string(),
            database_url: None,
            allowed_origins: vec!["*".to_string()],
            refinement: RefinementPolicy::development(),
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            rate_limit_per_minute: DEFAULT_RATE_LIMIT_PER_MINUTE,
            rate_limit_per_hour: DEFAULT_RATE_LIMIT_PER_HOUR,
            admin_token: None,
        }
    }
}

fn optional(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_or<T>(key: &str, default: T) -> Result<T, AppError>
where
    T: FromStr + Display,
    T::Err: Display,
{
    match optional(key) {
        Some(raw) => raw
            .parse()
            .map_err(|e| AppError::Configuration(format!("invalid {key} value {raw:?}: {e}"))),
        None => {
            tracing::debug!("{key} not set, using default: {default}");
            Ok(default)
        }
    }
}

fn parse_default<T>(raw: &str) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: Display,
{
    raw.parse()
        .map_err(|e| AppError::Internal(format!("bad built-in default {raw:?}: {e}")))
}

pub fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|o| o.trim().trim_end_matches('/').to_string())
        .filter(|o| !o.is_empty())
        .collect()
}
