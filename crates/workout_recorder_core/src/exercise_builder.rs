//! crates/workout_recorder_core/src/exercise_builder.rs
//!
//! Gates the commitment of a well-formed exercise into the session.

use crate::domain::{BodyPart, ExerciseEntry, InProgressExercise};
use crate::error::ValidationError;
use crate::ports::ExerciseCatalog;
use crate::set_builder::SetBuilder;

pub struct ExerciseBuilder<'a> {
    exercise: &'a mut InProgressExercise,
}

impl<'a> ExerciseBuilder<'a> {
    pub fn new(exercise: &'a mut InProgressExercise) -> Self {
        Self { exercise }
    }

    /// Picks the body part. Any exercise chosen for a previous body part is
    /// dropped together with its sets, since they may be of the other kind.
    pub fn select_body_part(&mut self, body_part: BodyPart) {
        if self.exercise.body_part == Some(body_part) {
            return;
        }
        *self.exercise = InProgressExercise {
            body_part: Some(body_part),
            ..InProgressExercise::default()
        };
    }

    /// Picks an exercise from the catalog and seeds it with one empty set.
    pub fn select_exercise(
        &mut self,
        exercise_name: &str,
        catalog: &dyn ExerciseCatalog,
    ) -> Result<(), ValidationError> {
        let body_part = self.exercise.body_part.ok_or(ValidationError::MissingBodyPart)?;
        if !catalog.contains(body_part, exercise_name) {
            return Err(ValidationError::UnknownExercise {
                body_part,
                name: exercise_name.to_string(),
            });
        }

        self.exercise.exercise_name = Some(exercise_name.to_string());
        self.exercise.sets.clear();
        SetBuilder::new(body_part.kind(), &mut self.exercise.sets).add_set();
        Ok(())
    }

    /// The set list of the exercise, typed by the selected body part.
    pub fn sets(&mut self) -> Result<SetBuilder<'_>, ValidationError> {
        let body_part = self.exercise.body_part.ok_or(ValidationError::MissingBodyPart)?;
        if self.exercise.exercise_name.is_none() {
            return Err(ValidationError::MissingExerciseName);
        }
        Ok(SetBuilder::new(body_part.kind(), &mut self.exercise.sets))
    }

    /// Validates the exercise and hands it out, leaving the builder empty.
    /// Nothing changes when validation fails.
    pub fn commit(&mut self) -> Result<ExerciseEntry, ValidationError> {
        let body_part = self.exercise.body_part.ok_or(ValidationError::MissingBodyPart)?;
        let has_name = self
            .exercise
            .exercise_name
            .as_deref()
            .is_some_and(|name| !name.trim().is_empty());
        if !has_name {
            return Err(ValidationError::MissingExerciseName);
        }
        if self.exercise.sets.is_empty() {
            return Err(ValidationError::NoSets);
        }

        let taken = std::mem::take(&mut *self.exercise);
        let exercise_name = taken.exercise_name.unwrap_or_default();
        Ok(ExerciseEntry::new(body_part, exercise_name, taken.sets))
    }
}
