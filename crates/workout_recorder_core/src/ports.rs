//! crates/workout_recorder_core/src/ports.rs
//!
//! Defines the service contracts (traits) the recorder depends on.
//! These traits form the boundary of the hexagonal architecture, keeping the core
//! independent of the concrete database, identity provider and local storage.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{BodyPart, NewWorkoutSession, User, WorkoutDay};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (database, filesystem).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Local storage error: {0}")]
    Storage(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait WorkoutDatabase: Send + Sync {
    /// Records a whole session. Either every exercise and set is stored or none is.
    async fn commit_session(&self, session: NewWorkoutSession) -> PortResult<Uuid>;

    /// Every committed session of a user, oldest date first.
    async fn list_sessions(&self, user_id: Uuid) -> PortResult<Vec<WorkoutDay>>;

    /// Resolves an auth-session token to the user it belongs to.
    async fn validate_auth_session(&self, token: &str) -> PortResult<User>;
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// The signed-in user, or `None` when nobody is signed in.
    async fn current_user(&self) -> PortResult<Option<User>>;
}

/// Read-only mapping from body part to the exercise names offered for it.
pub trait ExerciseCatalog: Send + Sync {
    fn exercises(&self, body_part: BodyPart) -> &[&'static str];

    fn contains(&self, body_part: BodyPart, exercise_name: &str) -> bool {
        self.exercises(body_part).iter().any(|name| *name == exercise_name)
    }
}

/// A plain string key-value store that survives restarts.
///
/// Calls are synchronous: every write lands before the mutation that caused it
/// returns, so writes for one key are applied in mutation order.
pub trait KeyValueStore: Send + Sync {
    fn get_item(&self, key: &str) -> PortResult<Option<String>>;

    fn set_item(&self, key: &str, value: &str) -> PortResult<()>;

    fn remove_item(&self, key: &str) -> PortResult<()>;

    fn keys(&self) -> PortResult<Vec<String>>;
}
