//! services/recorder/src/console/protocol.rs
//!
//! Defines the line-delimited JSON protocol between a front end and the
//! recorder console. Every line on stdin is one `ClientMessage`; every line the
//! recorder writes to stdout is one `ServerMessage`.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use workout_recorder_core::{
    nutrition::{BodyProfile, CalorieTarget, FoodItem, FoodTotals, Goal, NewFoodItem},
    BodyPart, RestTimerState, SetUpdate, WorkoutDay, WorkoutDraft, WorkoutStats,
};

//=========================================================================================
// Messages Sent FROM the Client TO the Recorder
//=========================================================================================

/// Represents the commands a client can send to the recorder.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Switches the recorder to another calendar date.
    SelectDate { date: NaiveDate },

    SelectBodyPart { body_part: BodyPart },
    SelectExercise { exercise_name: String },

    /// Asks for the exercise names offered for a body part.
    ListExercises { body_part: BodyPart },

    AddSet,
    RemoveSet { order: u32 },
    UpdateSet { order: u32, update: SetUpdate },

    /// Moves the exercise under construction into the session.
    CommitExercise,

    SetTitle {
        #[serde(default)]
        title: Option<String>,
    },
    SetTimes {
        #[serde(default)]
        start_time: Option<NaiveTime>,
        #[serde(default)]
        end_time: Option<NaiveTime>,
    },

    /// Records the session of the active date in the database.
    CompleteSession,

    StartTimer,
    PauseTimer,
    ResetTimer,
    SetTimerTotal { seconds: u32 },

    TargetCalories { profile: BodyProfile, goal: Goal },
    AddFood { food: NewFoodItem },
    RemoveFood { id: Uuid },
    FoodLog,

    Stats,
    /// Asks for the recorded workouts of a date (the active date by default).
    WorkoutsForDate {
        #[serde(default)]
        date: Option<NaiveDate>,
    },

    SaveMemo { text: String },
    GetMemo,
}

//=========================================================================================
// Messages Sent FROM the Recorder TO the Client
//=========================================================================================

/// Represents the messages the recorder writes back.
#[derive(Serialize, Debug, Clone)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// The draft of the active date, sent after every change.
    DraftUpdated { draft: WorkoutDraft },

    /// A builder command was rejected. Nothing was changed.
    ValidationFailed { message: String },

    Exercises {
        body_part: BodyPart,
        exercises: Vec<String>,
    },

    TimerTick { state: RestTimerState },
    TimerExpired { state: RestTimerState },

    /// The session was handed to the database; the answer follows later.
    CommitPending { date: NaiveDate },
    SessionCompleted { session_id: Uuid, date: NaiveDate },

    /// The requested action needs a signed-in user.
    SignInRequired,

    Calories { target: CalorieTarget },
    FoodLog {
        items: Vec<FoodItem>,
        totals: FoodTotals,
    },
    Stats { stats: WorkoutStats },
    Workouts {
        date: NaiveDate,
        workouts: Vec<WorkoutDay>,
    },
    Memo { date: NaiveDate, text: Option<String> },

    /// Reports an error the client should display.
    Error { message: String },
}
