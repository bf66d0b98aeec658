//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Settings for the AI coach. The provider string is interpreted once, when
/// the coach is built.
#[derive(Clone, Debug)]
pub struct AiSettings {
    pub provider: String,
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub base_url: Option<String>,
    pub timeout: Duration,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RateLimitSettings {
    pub limit: u32,
    pub window: Duration,
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    /// `None` runs the service on the in-memory store.
    pub database_url: Option<String>,
    pub log_level: Level,
    pub cors_origin: String,
    pub ai: AiSettings,
    pub session_ttl_days: i64,
    pub ai_rate_limit: RateLimitSettings,
    pub auth_rate_limit: RateLimitSettings,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        // --- Server and Database Settings ---
        let bind_address = parse_or(&var, "BIND_ADDRESS", "0.0.0.0:3000".parse::<SocketAddr>())?;
        let database_url = var("DATABASE_URL");

        let log_level_str = var("RUST_LOG").unwrap_or_else(|| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let cors_origin = var("CORS_ORIGIN").unwrap_or_else(|| "http://localhost:3000".to_string());

        // --- AI Settings ---
        let ai = AiSettings {
            provider: var("AI_PROVIDER").unwrap_or_else(|| "openai".to_string()),
            api_key: var("AI_API_KEY"),
            model: var("AI_MODEL"),
            base_url: var("AI_BASE_URL"),
            timeout: Duration::from_secs(parse_or(&var, "AI_TIMEOUT_SECS", Ok::<u64, ()>(30))?),
        };

        let session_ttl_days = parse_or(&var, "SESSION_TTL_DAYS", Ok::<i64, ()>(30))?;
        if session_ttl_days < 1 {
            return Err(ConfigError::InvalidValue(
                "SESSION_TTL_DAYS".to_string(),
                "must be at least 1".to_string(),
            ));
        }

        // --- Rate Limits ---
        let ai_rate_limit = RateLimitSettings {
            limit: parse_or(&var, "AI_RATE_LIMIT", Ok::<u32, ()>(50))?,
            window: Duration::from_secs(parse_or(&var, "AI_RATE_WINDOW_SECS", Ok::<u64, ()>(60))?),
        };
        let auth_rate_limit = RateLimitSettings {
            limit: parse_or(&var, "AUTH_RATE_LIMIT", Ok::<u32, ()>(5))?,
            window: Duration::from_secs(parse_or(
                &var,
                "AUTH_RATE_WINDOW_SECS",
                Ok::<u64, ()>(15 * 60),
            )?),
        };

        Ok(Self {
            bind_address,
            database_url,
            log_level,
            cors_origin,
            ai,
            session_ttl_days,
            ai_rate_limit,
            auth_rate_limit,
        })
    }
}

/// Parses `key` when set, otherwise falls back to `default`.
fn parse_or<T, E, V>(var: &V, key: &str, default: Result<T, E>) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    V: Fn(&str) -> Option<String>,
{
    match var(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidValue(key.to_string(), e.to_string())),
        None => default.map_err(|_| ConfigError::MissingVar(key.to_string())),
    }
}
