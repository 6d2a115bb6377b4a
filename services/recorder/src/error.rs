//! services/recorder/src/error.rs
//!
//! Defines the primary error type for the recorder service.

use crate::config::ConfigError;
use workout_recorder_core::ports::PortError;

/// The primary error type for the `recorder` service.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents an error that propagated up from one of the core service ports.
    #[error("Service Port Error: {0}")]
    Port(#[from] PortError),

    /// Represents an error from the underlying database library.
    #[error("Database Error: {0}")]
    Database(#[from] sqlx::Error),

    /// Represents a failed schema migration at startup.
    #[error("Migration Error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Represents a standard Input/Output error (e.g., reading stdin).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Represents a message that could not be encoded for the console.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A catch-all for any other unexpected errors.
    #[error("An unexpected internal error occurred: {0}")]
    Internal(String),
}
