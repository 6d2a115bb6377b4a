//! services/recorder/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `WorkoutDatabase` port from the `core` crate. It handles all interactions
//! with the PostgreSQL database using `sqlx`.

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use std::collections::HashMap;
use uuid::Uuid;
use workout_recorder_core::domain::{
    BodyPart, ExerciseEntry, NewWorkoutSession, SetEntry, SetMetrics, User, WorkoutDay,
};
use workout_recorder_core::ports::{PortError, PortResult, WorkoutDatabase};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `WorkoutDatabase` port.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }
}

fn unexpected(e: sqlx::Error) -> PortError {
    PortError::Unexpected(e.to_string())
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct UserRecord {
    user_id: Uuid,
    email: Option<String>,
}
impl UserRecord {
    fn to_domain(self) -> User {
        User {
            user_id: self.user_id,
            email: self.email,
        }
    }
}

#[derive(FromRow)]
struct WorkoutRecord {
    id: Uuid,
    date: NaiveDate,
    title: Option<String>,
    duration_min: Option<i32>,
}

#[derive(FromRow)]
struct SetRowRecord {
    workout_id: Uuid,
    workout_exercise_id: Uuid,
    name: String,
    body_part: String,
    set_number: i32,
    completed: bool,
    weight_kg: Option<f64>,
    reps: Option<i32>,
    distance_km: Option<f64>,
    duration_min: Option<f64>,
}
impl SetRowRecord {
    fn to_domain(&self, body_part: BodyPart) -> SetEntry {
        let metrics = match body_part {
            BodyPart::Cardio => SetMetrics::Cardio {
                distance_km: self.distance_km.unwrap_or(0.0),
                duration_min: self.duration_min.unwrap_or(0.0),
            },
            _ => SetMetrics::Weighted {
                weight_kg: self.weight_kg.unwrap_or(0.0),
                reps: self.reps.and_then(|r| u32::try_from(r).ok()).unwrap_or(0),
            },
        };
        SetEntry {
            order: u32::try_from(self.set_number).unwrap_or(0),
            metrics,
            completed: self.completed,
        }
    }
}

/// Rows come ordered by workout, exercise position and set number, so each
/// exercise is one contiguous run.
fn group_exercises(rows: Vec<SetRowRecord>) -> PortResult<Vec<(Uuid, ExerciseEntry)>> {
    let mut grouped: Vec<(Uuid, Uuid, BodyPart, String, Vec<SetEntry>)> = Vec::new();
    for row in rows {
        let body_part: BodyPart = row.body_part.parse().map_err(PortError::Unexpected)?;
        let set = row.to_domain(body_part);
        match grouped.iter_mut().last() {
            Some(last) if last.1 == row.workout_exercise_id => {
                last.4.push(set);
                continue;
            }
            _ => {}
        }
        grouped.push((row.workout_id, row.workout_exercise_id, body_part, row.name, vec![set]));
    }
    Ok(grouped
        .into_iter()
        .map(|(workout_id, id, body_part, name, sets)| {
            (workout_id, ExerciseEntry::restore(id, body_part, name, sets))
        })
        .collect())
}

//=========================================================================================
// Commit Helpers (all run inside one transaction)
//=========================================================================================

async fn upsert_exercise(
    tx: &mut Transaction<'_, Postgres>,
    exercise: &ExerciseEntry,
) -> PortResult<Uuid> {
    let (id,): (Uuid,) = sqlx::query_as(
        "INSERT INTO exercises (id, name, body_part, kind) VALUES ($1, $2, $3, $4) \
         ON CONFLICT (name, body_part) DO UPDATE SET kind = EXCLUDED.kind RETURNING id",
    )
    .bind(Uuid::new_v4())
    .bind(exercise.exercise_name())
    .bind(exercise.body_part().as_str())
    .bind(exercise.kind().as_str())
    .fetch_one(&mut **tx)
    .await
    .map_err(unexpected)?;
    Ok(id)
}

/// Postgres `INTEGER` columns are signed, so counts above `i32::MAX` are
/// refused instead of being stored as NULL.
fn int_column<T>(column: &str, value: T) -> PortResult<i32>
where
    T: TryInto<i32> + Copy + std::fmt::Display,
{
    value.try_into().map_err(|_| {
        PortError::Unexpected(format!("{} value {} is out of range", column, value))
    })
}

struct SetColumns {
    set_number: i32,
    weight_kg: Option<f64>,
    reps: Option<i32>,
    distance_km: Option<f64>,
    duration_min: Option<f64>,
}

fn set_columns(set: &SetEntry) -> PortResult<SetColumns> {
    let set_number = int_column("set_number", set.order)?;
    Ok(match set.metrics {
        SetMetrics::Weighted { weight_kg, reps } => SetColumns {
            set_number,
            weight_kg: Some(weight_kg),
            reps: Some(int_column("reps", reps)?),
            distance_km: None,
            duration_min: None,
        },
        SetMetrics::Cardio {
            distance_km,
            duration_min,
        } => SetColumns {
            set_number,
            weight_kg: None,
            reps: None,
            distance_km: Some(distance_km),
            duration_min: Some(duration_min),
        },
    })
}

async fn insert_sets(
    tx: &mut Transaction<'_, Postgres>,
    workout_exercise_id: Uuid,
    sets: &[SetEntry],
) -> PortResult<()> {
    for set in sets {
        let columns = set_columns(set)?;
        sqlx::query(
            "INSERT INTO workout_sets \
             (workout_exercise_id, set_number, completed, weight_kg, reps, distance_km, duration_min) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(workout_exercise_id)
        .bind(columns.set_number)
        .bind(set.completed)
        .bind(columns.weight_kg)
        .bind(columns.reps)
        .bind(columns.distance_km)
        .bind(columns.duration_min)
        .execute(&mut **tx)
        .await
        .map_err(unexpected)?;
    }
    Ok(())
}

//=========================================================================================
// `WorkoutDatabase` Trait Implementation
//=========================================================================================

#[async_trait]
impl WorkoutDatabase for DbAdapter {
    async fn commit_session(&self, session: NewWorkoutSession) -> PortResult<Uuid> {
        let mut tx = self.pool.begin().await.map_err(unexpected)?;

        sqlx::query("INSERT INTO users (user_id) VALUES ($1) ON CONFLICT (user_id) DO NOTHING")
            .bind(session.user_id)
            .execute(&mut *tx)
            .await
            .map_err(unexpected)?;

        let duration_min = session
            .duration_min
            .map(|m| int_column("duration_min", m))
            .transpose()?;
        let workout_id = Uuid::new_v4();
        sqlx::query(
            "INSERT INTO workouts (id, user_id, date, title, duration_min) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(workout_id)
        .bind(session.user_id)
        .bind(session.date)
        .bind(session.title.as_deref())
        .bind(duration_min)
        .execute(&mut *tx)
        .await
        .map_err(unexpected)?;

        for (position, exercise) in session.exercises.iter().enumerate() {
            let exercise_id = upsert_exercise(&mut tx, exercise).await?;
            sqlx::query(
                "INSERT INTO workout_exercises (id, workout_id, exercise_id, position) VALUES ($1, $2, $3, $4)",
            )
            .bind(exercise.id())
            .bind(workout_id)
            .bind(exercise_id)
            .bind(int_column("position", position)?)
            .execute(&mut *tx)
            .await
            .map_err(unexpected)?;
            insert_sets(&mut tx, exercise.id(), exercise.sets()).await?;
        }

        // Dropping `tx` on any early return above rolls everything back.
        tx.commit().await.map_err(unexpected)?;
        Ok(workout_id)
    }

    async fn list_sessions(&self, user_id: Uuid) -> PortResult<Vec<WorkoutDay>> {
        let workouts = sqlx::query_as::<_, WorkoutRecord>(
            "SELECT id, date, title, duration_min FROM workouts WHERE user_id = $1 ORDER BY date ASC, created_at ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        let rows = sqlx::query_as::<_, SetRowRecord>(
            "SELECT we.workout_id, we.id AS workout_exercise_id, e.name, e.body_part, \
                    s.set_number, s.completed, s.weight_kg, s.reps, s.distance_km, s.duration_min \
             FROM workout_exercises we \
             JOIN workouts w ON w.id = we.workout_id \
             JOIN exercises e ON e.id = we.exercise_id \
             JOIN workout_sets s ON s.workout_exercise_id = we.id \
             WHERE w.user_id = $1 \
             ORDER BY we.workout_id, we.position, s.set_number",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        let mut by_workout: HashMap<Uuid, Vec<ExerciseEntry>> = HashMap::new();
        for (workout_id, exercise) in group_exercises(rows)? {
            by_workout.entry(workout_id).or_default().push(exercise);
        }

        let days = workouts
            .into_iter()
            .map(|w| WorkoutDay {
                exercises: by_workout.remove(&w.id).unwrap_or_default(),
                id: w.id,
                date: w.date,
                title: w.title,
                duration_min: w.duration_min.and_then(|m| u32::try_from(m).ok()),
            })
            .collect();
        Ok(days)
    }

    async fn validate_auth_session(&self, token: &str) -> PortResult<User> {
        let record = sqlx::query_as::<_, UserRecord>(
            "SELECT u.user_id, u.email FROM auth_sessions s \
             JOIN users u ON u.user_id = s.user_id \
             WHERE s.id = $1 AND s.expires_at > NOW()",
        )
        .bind(token)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => PortError::Unauthorized,
            _ => unexpected(e),
        })?;
        Ok(record.to_domain())
    }
}
