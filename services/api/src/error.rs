//! services/api/src/error.rs
//!
//! Failures that stop the service from starting. Once requests are flowing,
//! errors are `ServiceError`s and `web::envelope` renders them.

use crate::config::ConfigError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// A missing or malformed environment variable, or a router setting
    /// (such as the CORS origin) that cannot be applied.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Connecting the Postgres pool failed.
    #[error("Database Error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration Error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// The AI vendor HTTP client could not be built.
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// Binding the listener or serving connections failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
