//! services/recorder/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::path::PathBuf;
use tracing::Level;
use workout_recorder_core::rest_timer::DEFAULT_REST_SECONDS;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub db_max_connections: u32,
    pub log_level: Level,
    pub drafts_path: PathBuf,
    pub rest_timer_seconds: u32,
    pub session_token: Option<String>,
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

        // --- Database ---
        let database_url = std::env::var("DATABASE_URL")
            .map_err(|_| ConfigError::MissingVar("DATABASE_URL".to_string()))?;
        let db_max_connections = parse_positive("DB_MAX_CONNECTIONS", 5)?;

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        // --- Local drafts and the rest timer ---
        let drafts_path = std::env::var("DRAFTS_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./drafts"));
        let rest_timer_seconds = parse_positive("REST_TIMER_SECONDS", DEFAULT_REST_SECONDS)?;

        // --- Identity (optional: without it the user is signed out) ---
        let session_token = std::env::var("RECORDER_SESSION_TOKEN")
            .ok()
            .filter(|t| !t.trim().is_empty());

        Ok(Self {
            database_url,
            db_max_connections,
            log_level,
            drafts_path,
            rest_timer_seconds,
            session_token,
        })
    }
}

fn parse_positive(var: &str, default: u32) -> Result<u32, ConfigError> {
    match std::env::var(var) {
        Err(_) => Ok(default),
        Ok(raw) => match raw.trim().parse::<u32>() {
            Ok(value) if value > 0 => Ok(value),
            _ => Err(ConfigError::InvalidValue(
                var.to_string(),
                format!("'{}' is not a positive integer", raw),
            )),
        },
    }
}
