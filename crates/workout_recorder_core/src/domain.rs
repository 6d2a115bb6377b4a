//! crates/workout_recorder_core/src/domain.rs
//!
//! Defines the pure, core data structures for the recorder.
//! They derive serde so the draft store can keep a JSON mirror of them, but
//! they carry no knowledge of where that JSON ends up.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

//=========================================================================================
// Body Parts and Exercise Kinds
//=========================================================================================

/// The closed set of body-part categories used to filter the exercise catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyPart {
    Back,
    Shoulder,
    Chest,
    Biceps,
    Triceps,
    Legs,
    Abs,
    Cardio,
}

impl BodyPart {
    pub const ALL: [BodyPart; 8] = [
        BodyPart::Back,
        BodyPart::Shoulder,
        BodyPart::Chest,
        BodyPart::Biceps,
        BodyPart::Triceps,
        BodyPart::Legs,
        BodyPart::Abs,
        BodyPart::Cardio,
    ];

    /// The kind every exercise of this body part is recorded as.
    pub fn kind(self) -> ExerciseKind {
        match self {
            BodyPart::Cardio => ExerciseKind::Cardio,
            _ => ExerciseKind::Weighted,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BodyPart::Back => "back",
            BodyPart::Shoulder => "shoulder",
            BodyPart::Chest => "chest",
            BodyPart::Biceps => "biceps",
            BodyPart::Triceps => "triceps",
            BodyPart::Legs => "legs",
            BodyPart::Abs => "abs",
            BodyPart::Cardio => "cardio",
        }
    }
}

impl fmt::Display for BodyPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BodyPart {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BodyPart::ALL
            .into_iter()
            .find(|part| part.as_str() == s)
            .ok_or_else(|| format!("unknown body part '{}'", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExerciseKind {
    Weighted,
    Cardio,
}

impl ExerciseKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ExerciseKind::Weighted => "weighted",
            ExerciseKind::Cardio => "cardio",
        }
    }
}

//=========================================================================================
// Sets
//=========================================================================================

/// The measured values of one set. The variant always matches the kind of
/// the exercise the set belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SetMetrics {
    Weighted { weight_kg: f64, reps: u32 },
    Cardio { distance_km: f64, duration_min: f64 },
}

impl SetMetrics {
    /// Zeroed metrics for a freshly added set.
    pub fn empty(kind: ExerciseKind) -> Self {
        match kind {
            ExerciseKind::Weighted => SetMetrics::Weighted {
                weight_kg: 0.0,
                reps: 0,
            },
            ExerciseKind::Cardio => SetMetrics::Cardio {
                distance_km: 0.0,
                duration_min: 0.0,
            },
        }
    }

    pub fn kind(&self) -> ExerciseKind {
        match self {
            SetMetrics::Weighted { .. } => ExerciseKind::Weighted,
            SetMetrics::Cardio { .. } => ExerciseKind::Cardio,
        }
    }

    /// Lifted volume of the set (weight × reps); zero for cardio.
    pub fn volume_kg(&self) -> f64 {
        match *self {
            SetMetrics::Weighted { weight_kg, reps } => weight_kg * f64::from(reps),
            SetMetrics::Cardio { .. } => 0.0,
        }
    }
}

/// One set within an exercise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetEntry {
    /// 1-based, dense position within the exercise.
    pub order: u32,
    pub metrics: SetMetrics,
    pub completed: bool,
}

//=========================================================================================
// Exercises
//=========================================================================================

/// An exercise that has been committed into a session. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseEntry {
    id: Uuid,
    body_part: BodyPart,
    exercise_name: String,
    sets: Vec<SetEntry>,
}

impl ExerciseEntry {
    /// Only the exercise builder assembles entries, after validation.
    pub(crate) fn new(body_part: BodyPart, exercise_name: String, sets: Vec<SetEntry>) -> Self {
        Self {
            id: Uuid::new_v4(),
            body_part,
            exercise_name,
            sets,
        }
    }

    /// Rebuilds an entry read back from durable storage.
    pub fn restore(id: Uuid, body_part: BodyPart, exercise_name: String, sets: Vec<SetEntry>) -> Self {
        Self {
            id,
            body_part,
            exercise_name,
            sets,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn body_part(&self) -> BodyPart {
        self.body_part
    }

    pub fn exercise_name(&self) -> &str {
        &self.exercise_name
    }

    pub fn kind(&self) -> ExerciseKind {
        self.body_part.kind()
    }

    pub fn sets(&self) -> &[SetEntry] {
        &self.sets
    }
}

/// The exercise currently being assembled; nothing here is validated yet.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InProgressExercise {
    pub body_part: Option<BodyPart>,
    pub exercise_name: Option<String>,
    pub sets: Vec<SetEntry>,
}

impl InProgressExercise {
    pub fn is_empty(&self) -> bool {
        self.body_part.is_none() && self.exercise_name.is_none() && self.sets.is_empty()
    }
}

//=========================================================================================
// Drafts
//=========================================================================================

/// A not-yet-committed workout session for a single calendar date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutDraft {
    pub date: NaiveDate,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub start_time: Option<NaiveTime>,
    #[serde(default)]
    pub end_time: Option<NaiveTime>,
    pub committed_exercises: Vec<ExerciseEntry>,
    pub in_progress: InProgressExercise,
}

impl WorkoutDraft {
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            title: None,
            start_time: None,
            end_time: None,
            committed_exercises: Vec::new(),
            in_progress: InProgressExercise::default(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.start_time.is_none()
            && self.end_time.is_none()
            && self.committed_exercises.is_empty()
            && self.in_progress.is_empty()
    }

    /// Session length in whole minutes, if both clock times are set.
    /// An end time earlier than the start time is taken to be past midnight.
    pub fn duration_min(&self) -> Option<u32> {
        let (start, end) = (self.start_time?, self.end_time?);
        let mut minutes = (end - start).num_minutes();
        if minutes < 0 {
            minutes += 24 * 60;
        }
        match minutes {
            0 => None,
            m => u32::try_from(m).ok(),
        }
    }
}

//=========================================================================================
// Users and Committed Sessions
//=========================================================================================

// Represents the signed-in user, as reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub user_id: Uuid,
    pub email: Option<String>,
}

/// Everything the database needs to record a finished session.
#[derive(Debug, Clone, PartialEq)]
pub struct NewWorkoutSession {
    pub user_id: Uuid,
    pub date: NaiveDate,
    pub title: Option<String>,
    pub duration_min: Option<u32>,
    pub exercises: Vec<ExerciseEntry>,
}

/// A session that has been recorded in the database.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkoutDay {
    pub id: Uuid,
    pub date: NaiveDate,
    pub title: Option<String>,
    pub duration_min: Option<u32>,
    pub exercises: Vec<ExerciseEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_is_derived_from_body_part() {
        assert_eq!(BodyPart::Cardio.kind(), ExerciseKind::Cardio);
        for part in BodyPart::ALL.into_iter().filter(|p| *p != BodyPart::Cardio) {
            assert_eq!(part.kind(), ExerciseKind::Weighted);
        }
    }

    #[test]
    fn body_part_parses_its_own_name() {
        for part in BodyPart::ALL {
            assert_eq!(part.as_str().parse::<BodyPart>(), Ok(part));
        }
        assert!("neck".parse::<BodyPart>().is_err());
    }

    #[test]
    fn duration_wraps_past_midnight() {
        let mut draft = WorkoutDraft::empty(NaiveDate::from_ymd_opt(2025, 6, 1).unwrap());
        draft.start_time = NaiveTime::from_hms_opt(23, 30, 0);
        draft.end_time = NaiveTime::from_hms_opt(0, 45, 0);
        assert_eq!(draft.duration_min(), Some(75));

        draft.end_time = None;
        assert_eq!(draft.duration_min(), None);
    }

    #[test]
    fn volume_counts_weighted_sets_only() {
        let weighted = SetMetrics::Weighted { weight_kg: 80.0, reps: 10 };
        let cardio = SetMetrics::Cardio { distance_km: 5.0, duration_min: 30.0 };
        assert_eq!(weighted.volume_kg(), 800.0);
        assert_eq!(cardio.volume_kg(), 0.0);
    }
}
