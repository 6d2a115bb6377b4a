//! crates/workout_recorder_core/src/stats.rs
//!
//! Summary statistics over recorded workout history.

use chrono::{Duration, NaiveDate};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::domain::{BodyPart, WorkoutDay};

const TOP_EXERCISES: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExerciseCount {
    pub name: String,
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkoutStats {
    pub total_workout_days: u32,
    pub total_sets: u32,
    pub total_volume_kg: f64,
    pub body_part_distribution: BTreeMap<BodyPart, u32>,
    pub top_exercises: Vec<ExerciseCount>,
    /// Consecutive workout days ending today, or yesterday if today is still open.
    pub streak: u32,
}

impl WorkoutStats {
    pub fn from_history(days: &[WorkoutDay], today: NaiveDate) -> Self {
        let dates: BTreeSet<NaiveDate> = days.iter().map(|d| d.date).collect();

        let mut total_sets = 0u32;
        let mut total_volume_kg = 0.0;
        let mut body_part_distribution = BTreeMap::new();
        let mut exercise_counts: HashMap<&str, u32> = HashMap::new();

        for exercise in days.iter().flat_map(|d| &d.exercises) {
            *body_part_distribution.entry(exercise.body_part()).or_insert(0) += 1;
            *exercise_counts.entry(exercise.exercise_name()).or_insert(0) += 1;
            for set in exercise.sets() {
                total_sets += 1;
                total_volume_kg += set.metrics.volume_kg();
            }
        }

        let mut top_exercises: Vec<ExerciseCount> = exercise_counts
            .into_iter()
            .map(|(name, count)| ExerciseCount {
                name: name.to_string(),
                count,
            })
            .collect();
        top_exercises.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
        top_exercises.truncate(TOP_EXERCISES);

        Self {
            total_workout_days: u32::try_from(dates.len()).unwrap_or(u32::MAX),
            total_sets,
            total_volume_kg,
            body_part_distribution,
            top_exercises,
            streak: streak(&dates, today),
        }
    }
}

fn streak(dates: &BTreeSet<NaiveDate>, today: NaiveDate) -> u32 {
    let mut day = if dates.contains(&today) {
        today
    } else {
        today - Duration::days(1)
    };
    let mut count = 0;
    while dates.contains(&day) {
        count += 1;
        day -= Duration::days(1);
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ExerciseEntry, SetEntry, SetMetrics};
    use uuid::Uuid;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, d).unwrap()
    }

    fn weighted(part: BodyPart, name: &str, sets: &[(f64, u32)]) -> ExerciseEntry {
        let sets = sets
            .iter()
            .enumerate()
            .map(|(i, &(weight_kg, reps))| SetEntry {
                order: i as u32 + 1,
                metrics: SetMetrics::Weighted { weight_kg, reps },
                completed: true,
            })
            .collect();
        ExerciseEntry::new(part, name.to_string(), sets)
    }

    fn day(d: u32, exercises: Vec<ExerciseEntry>) -> WorkoutDay {
        WorkoutDay {
            id: Uuid::new_v4(),
            date: date(d),
            title: None,
            duration_min: None,
            exercises,
        }
    }

    #[test]
    fn totals_and_distribution() {
        let run = ExerciseEntry::new(
            BodyPart::Cardio,
            "running".to_string(),
            vec![SetEntry {
                order: 1,
                metrics: SetMetrics::Cardio { distance_km: 5.0, duration_min: 30.0 },
                completed: true,
            }],
        );
        let history = vec![
            day(15, vec![
                weighted(BodyPart::Back, "pullUp", &[(0.0, 10), (0.0, 8)]),
                weighted(BodyPart::Chest, "benchPress", &[(100.0, 10), (100.0, 8)]),
            ]),
            day(17, vec![weighted(BodyPart::Chest, "benchPress", &[(100.0, 6)])]),
            day(25, vec![run]),
        ];

        let stats = WorkoutStats::from_history(&history, date(31));

        assert_eq!(stats.total_workout_days, 3);
        assert_eq!(stats.total_sets, 6);
        assert_eq!(stats.total_volume_kg, 2400.0);
        assert_eq!(stats.body_part_distribution.get(&BodyPart::Chest), Some(&2));
        assert_eq!(stats.body_part_distribution.get(&BodyPart::Legs), None);
        assert_eq!(
            stats.top_exercises[0],
            ExerciseCount { name: "benchPress".to_string(), count: 2 }
        );
        assert_eq!(stats.streak, 0);
    }

    #[test]
    fn streak_tolerates_an_open_today() {
        let history = vec![day(18, vec![]), day(19, vec![]), day(20, vec![]), day(16, vec![])];
        assert_eq!(WorkoutStats::from_history(&history, date(20)).streak, 3);
        assert_eq!(WorkoutStats::from_history(&history, date(21)).streak, 3);
        assert_eq!(WorkoutStats::from_history(&history, date(22)).streak, 0);
    }

    #[test]
    fn empty_history_is_all_zero() {
        let stats = WorkoutStats::from_history(&[], date(1));
        assert_eq!(stats.total_workout_days, 0);
        assert!(stats.top_exercises.is_empty());
        assert_eq!(stats.streak, 0);
    }
}
