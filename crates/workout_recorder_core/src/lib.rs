pub mod catalog;
pub mod domain;
pub mod draft_store;
pub mod error;
pub mod exercise_builder;
pub mod memo;
pub mod memory_store;
pub mod nutrition;
pub mod ports;
pub mod recorder;
pub mod rest_timer;
pub mod set_builder;
pub mod stats;

pub use catalog::StaticCatalog;
pub use domain::{
    BodyPart, ExerciseEntry, ExerciseKind, InProgressExercise, NewWorkoutSession, SetEntry,
    SetMetrics, User, WorkoutDay, WorkoutDraft,
};
pub use draft_store::DraftStore;
pub use error::{RecorderError, TimerError, ValidationError};
pub use memo::MemoStore;
pub use memory_store::MemoryStore;
pub use ports::{
    ExerciseCatalog, IdentityProvider, KeyValueStore, PortError, PortResult, WorkoutDatabase,
};
pub use recorder::{CommitTicket, SessionRecorder};
pub use rest_timer::{RestTimer, RestTimerState, TimerPhase};
pub use set_builder::SetUpdate;
pub use stats::WorkoutStats;
