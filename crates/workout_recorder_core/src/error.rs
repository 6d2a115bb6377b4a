//! crates/workout_recorder_core/src/error.rs
//!
//! Errors raised by the recorder's builders and state machines.

use crate::domain::{BodyPart, ExerciseKind};
use crate::ports::PortError;

/// User input that is incomplete or invalid. Handled where it is raised and
/// shown to the user; it never reaches storage or the database.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("Select a body part first")]
    MissingBodyPart,
    #[error("Select an exercise first")]
    MissingExerciseName,
    #[error("Add at least one set")]
    NoSets,
    #[error("'{name}' is not a {body_part} exercise")]
    UnknownExercise { body_part: BodyPart, name: String },
    #[error("No set with order {0}")]
    UnknownSet(u32),
    #[error("{field} does not apply to a {kind} set")]
    FieldNotApplicable { field: &'static str, kind: &'static str },
    #[error("{field} must not be negative")]
    NegativeValue { field: &'static str },
}

impl ValidationError {
    pub(crate) fn not_applicable(field: &'static str, kind: ExerciseKind) -> Self {
        ValidationError::FieldNotApplicable {
            field,
            kind: kind.as_str(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TimerError {
    #[error("Cannot {action} the timer while it is {state}")]
    InvalidTransition {
        action: &'static str,
        state: &'static str,
    },
    #[error("The rest duration cannot be changed while the timer is running")]
    Running,
    #[error("The rest duration must be at least one second")]
    ZeroDuration,
}

/// Errors surfaced by the session recorder's complete flow.
#[derive(Debug, thiserror::Error)]
pub enum RecorderError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Please sign in to save your workout")]
    Unauthenticated,
    #[error("Save at least one exercise before completing the workout")]
    NothingToCommit,
    #[error("The workout is already being saved")]
    CommitInFlight,
    #[error("Saving the workout failed: {0}")]
    Persistence(#[source] PortError),
}
