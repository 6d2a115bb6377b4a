//! services/recorder/src/bin/recorder.rs

use recorder_lib::{
    adapters::{DbAdapter, FileStore, TokenIdentity},
    config::Config,
    console::{self, AppState},
    error::AppError,
};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tokio::io::BufReader;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use workout_recorder_core::StaticCatalog;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // --- 1. Load Configuration & Set Up Logging ---
    // stdout carries the console protocol, so logs go to stderr.
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
    info!("Configuration loaded. Starting recorder...");

    // --- 2. Connect to Database & Run Migrations ---
    info!("Connecting to database...");
    let db_pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .connect(&config.database_url)
        .await?;
    let db_adapter = Arc::new(DbAdapter::new(db_pool));
    info!("Running database migrations...");
    db_adapter.run_migrations().await?;
    info!("Database migrations complete.");

    // --- 3. Initialize Local Storage & Identity ---
    let local_store = Arc::new(FileStore::open(&config.drafts_path)?);
    info!("Drafts are kept in {}", config.drafts_path.display());
    let identity = Arc::new(TokenIdentity::new(
        db_adapter.clone(),
        config.session_token.clone(),
    ));
    if config.session_token.is_none() {
        info!("No session token configured; completing a session will ask to sign in.");
    }

    // --- 4. Build the Shared AppState ---
    let app_state = Arc::new(AppState {
        db: db_adapter,
        identity,
        catalog: Arc::new(StaticCatalog),
        local_store,
        config: config.clone(),
    });

    // --- 5. Run the Console ---
    console::run(
        app_state,
        BufReader::new(tokio::io::stdin()),
        tokio::io::stdout(),
    )
    .await
}
