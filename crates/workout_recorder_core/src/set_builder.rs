//! crates/workout_recorder_core/src/set_builder.rs
//!
//! Maintains the ordered set list of the exercise under construction.
//! After every operation the set orders are exactly `1..=len`.

use serde::{Deserialize, Serialize};

use crate::domain::{ExerciseKind, SetEntry, SetMetrics};
use crate::error::ValidationError;

/// A single-field change to one set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "snake_case")]
pub enum SetUpdate {
    WeightKg(f64),
    Reps(u32),
    DistanceKm(f64),
    DurationMin(f64),
    Completed(bool),
}

/// A mutable view over a set list whose sets all share one kind.
pub struct SetBuilder<'a> {
    kind: ExerciseKind,
    sets: &'a mut Vec<SetEntry>,
}

impl<'a> SetBuilder<'a> {
    pub fn new(kind: ExerciseKind, sets: &'a mut Vec<SetEntry>) -> Self {
        Self { kind, sets }
    }

    /// Appends a zeroed, not-yet-completed set and returns its order.
    pub fn add_set(&mut self) -> u32 {
        let order = self.next_order();
        self.sets.push(SetEntry {
            order,
            metrics: SetMetrics::empty(self.kind),
            completed: false,
        });
        order
    }

    /// Removes the set at `order` and closes the gap it leaves.
    pub fn remove_set(&mut self, order: u32) -> Result<(), ValidationError> {
        let index = self.index_of(order)?;
        self.sets.remove(index);
        for set in self.sets.iter_mut().filter(|s| s.order > order) {
            set.order -= 1;
        }
        Ok(())
    }

    pub fn update_set(&mut self, order: u32, update: SetUpdate) -> Result<(), ValidationError> {
        let index = self.index_of(order)?;
        let kind = self.kind;
        let set = &mut self.sets[index];

        match (update, &mut set.metrics) {
            (SetUpdate::Completed(done), _) => set.completed = done,
            (SetUpdate::WeightKg(value), SetMetrics::Weighted { weight_kg, .. }) => {
                *weight_kg = non_negative("weight_kg", value)?;
            }
            (SetUpdate::Reps(value), SetMetrics::Weighted { reps, .. }) => *reps = value,
            (SetUpdate::DistanceKm(value), SetMetrics::Cardio { distance_km, .. }) => {
                *distance_km = non_negative("distance_km", value)?;
            }
            (SetUpdate::DurationMin(value), SetMetrics::Cardio { duration_min, .. }) => {
                *duration_min = non_negative("duration_min", value)?;
            }
            (other, _) => return Err(ValidationError::not_applicable(other.field_name(), kind)),
        }
        Ok(())
    }

    fn next_order(&self) -> u32 {
        u32::try_from(self.sets.len()).map_or(u32::MAX, |len| len.saturating_add(1))
    }

    fn index_of(&self, order: u32) -> Result<usize, ValidationError> {
        self.sets
            .iter()
            .position(|s| s.order == order)
            .ok_or(ValidationError::UnknownSet(order))
    }
}

impl SetUpdate {
    pub fn field_name(&self) -> &'static str {
        match self {
            SetUpdate::WeightKg(_) => "weight_kg",
            SetUpdate::Reps(_) => "reps",
            SetUpdate::DistanceKm(_) => "distance_km",
            SetUpdate::DurationMin(_) => "duration_min",
            SetUpdate::Completed(_) => "completed",
        }
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<f64, ValidationError> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(ValidationError::NegativeValue { field })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn orders(sets: &[SetEntry]) -> Vec<u32> {
        sets.iter().map(|s| s.order).collect()
    }

    #[test]
    fn orders_stay_dense_across_adds_and_removes() {
        let mut sets = Vec::new();
        let mut builder = SetBuilder::new(ExerciseKind::Weighted, &mut sets);
        for _ in 0..5 {
            builder.add_set();
        }
        builder.remove_set(2).unwrap();
        builder.remove_set(4).unwrap();
        builder.add_set();
        builder.remove_set(1).unwrap();
        assert_eq!(orders(&sets), vec![1, 2, 3]);
    }

    #[test]
    fn orders_stay_dense_across_many_edit_sequences() {
        // Small LCG so every run replays the same sequences.
        let mut seed: u64 = 0x2545_f491_4f6c_dd1d;
        let mut next = move |bound: u64| {
            seed = seed.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1);
            (seed >> 33) % bound
        };

        for _ in 0..200 {
            let mut sets = Vec::new();
            let mut builder = SetBuilder::new(ExerciseKind::Weighted, &mut sets);
            let mut expected_len = 0u32;
            for _ in 0..40 {
                if expected_len == 0 || next(3) > 0 {
                    let order = builder.add_set();
                    expected_len += 1;
                    assert_eq!(order, expected_len);
                } else {
                    let order = u32::try_from(next(u64::from(expected_len))).unwrap() + 1;
                    builder.remove_set(order).unwrap();
                    expected_len -= 1;
                }
                assert_eq!(orders(&builder.sets[..]), (1..=expected_len).collect::<Vec<_>>());
            }
        }
    }

    #[test]
    fn removal_renumbers_the_sets_that_followed() {
        let mut sets = Vec::new();
        let mut builder = SetBuilder::new(ExerciseKind::Weighted, &mut sets);
        builder.add_set();
        builder.add_set();
        builder.add_set();
        builder.update_set(3, SetUpdate::Reps(12)).unwrap();
        builder.remove_set(1).unwrap();

        assert_eq!(orders(&sets), vec![1, 2]);
        assert_eq!(sets[1].metrics, SetMetrics::Weighted { weight_kg: 0.0, reps: 12 });
    }

    #[test]
    fn removing_the_only_set_leaves_an_empty_list() {
        let mut sets = Vec::new();
        let mut builder = SetBuilder::new(ExerciseKind::Cardio, &mut sets);
        builder.add_set();
        builder.remove_set(1).unwrap();
        assert!(sets.is_empty());
    }

    #[test]
    fn new_sets_are_zeroed_and_open() {
        let mut sets = Vec::new();
        SetBuilder::new(ExerciseKind::Cardio, &mut sets).add_set();
        assert_eq!(
            sets[0],
            SetEntry {
                order: 1,
                metrics: SetMetrics::Cardio { distance_km: 0.0, duration_min: 0.0 },
                completed: false,
            }
        );
    }

    #[test]
    fn update_rejects_fields_of_the_other_kind() {
        let mut sets = Vec::new();
        let mut builder = SetBuilder::new(ExerciseKind::Weighted, &mut sets);
        builder.add_set();

        let err = builder.update_set(1, SetUpdate::DistanceKm(5.0)).unwrap_err();
        assert_eq!(
            err,
            ValidationError::FieldNotApplicable { field: "distance_km", kind: "weighted" }
        );
    }

    #[test]
    fn update_rejects_negative_values_and_unknown_orders() {
        let mut sets = Vec::new();
        let mut builder = SetBuilder::new(ExerciseKind::Weighted, &mut sets);
        builder.add_set();

        assert_eq!(
            builder.update_set(1, SetUpdate::WeightKg(-1.0)),
            Err(ValidationError::NegativeValue { field: "weight_kg" })
        );
        assert_eq!(
            builder.update_set(7, SetUpdate::Completed(true)),
            Err(ValidationError::UnknownSet(7))
        );
        assert_eq!(builder.remove_set(0), Err(ValidationError::UnknownSet(0)));
    }

    #[test]
    fn completed_flag_toggles_on_any_kind() {
        let mut sets = Vec::new();
        let mut builder = SetBuilder::new(ExerciseKind::Cardio, &mut sets);
        builder.add_set();
        builder.update_set(1, SetUpdate::Completed(true)).unwrap();
        builder.update_set(1, SetUpdate::DurationMin(30.0)).unwrap();

        assert!(sets[0].completed);
        assert_eq!(sets[0].metrics, SetMetrics::Cardio { distance_km: 0.0, duration_min: 30.0 });
    }
}
