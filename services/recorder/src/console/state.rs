//! services/recorder/src/console/state.rs
//!
//! Defines the shared services the console is built from.

use crate::config::Config;
use std::sync::Arc;
use workout_recorder_core::ports::{
    ExerciseCatalog, IdentityProvider, KeyValueStore, WorkoutDatabase,
};

/// The shared application state, created once at startup and handed to the
/// console.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<dyn WorkoutDatabase>,
    pub identity: Arc<dyn IdentityProvider>,
    pub catalog: Arc<dyn ExerciseCatalog>,
    /// Durable local storage for drafts and memos.
    pub local_store: Arc<dyn KeyValueStore>,
    pub config: Arc<Config>,
}
