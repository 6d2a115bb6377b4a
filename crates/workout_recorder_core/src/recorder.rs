//! crates/workout_recorder_core/src/recorder.rs
//!
//! The session recorder: owns the draft of the active date, forwards user
//! input to the exercise and set builders, writes every change through to the
//! draft store, and finally hands the finished session to the database.
//!
//! Completing a session is split in two (`prepare_commit` / `finish_commit`)
//! so the caller can keep editing while the database call is outstanding.
//! Everything a ticket touches is keyed by the date captured when the ticket
//! was issued, never by whichever date happens to be active when the answer
//! arrives.

use chrono::{NaiveDate, NaiveTime};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::{
    BodyPart, ExerciseEntry, InProgressExercise, NewWorkoutSession, User, WorkoutDraft,
};
use crate::draft_store::DraftStore;
use crate::error::{RecorderError, ValidationError};
use crate::exercise_builder::ExerciseBuilder;
use crate::ports::{ExerciseCatalog, IdentityProvider, PortError, PortResult, WorkoutDatabase};
use crate::set_builder::SetUpdate;

/// An issued, not yet answered, request to record a session.
#[derive(Debug, Clone)]
pub struct CommitTicket {
    session: NewWorkoutSession,
    /// The exercise under construction when the ticket was issued.
    in_progress: InProgressExercise,
}

impl CommitTicket {
    pub fn date(&self) -> NaiveDate {
        self.session.date
    }

    pub fn session(&self) -> &NewWorkoutSession {
        &self.session
    }

    fn submitted(&self, exercise: &ExerciseEntry) -> bool {
        self.session.exercises.iter().any(|e| e.id() == exercise.id())
    }
}

pub struct SessionRecorder {
    drafts: DraftStore,
    catalog: Arc<dyn ExerciseCatalog>,
    draft: WorkoutDraft,
    in_flight: Option<NaiveDate>,
}

impl SessionRecorder {
    /// Mounts the recorder on `date`: stale drafts are evicted first, then the
    /// draft for `date` is loaded (or started fresh).
    pub fn activate(
        drafts: DraftStore,
        catalog: Arc<dyn ExerciseCatalog>,
        date: NaiveDate,
        today: NaiveDate,
    ) -> Self {
        drafts.evict_stale(today);
        let draft = drafts.load(date);
        info!(
            "Recorder active for {} ({} saved exercise(s)).",
            date,
            draft.committed_exercises.len()
        );
        Self {
            drafts,
            catalog,
            draft,
            in_flight: None,
        }
    }

    pub fn draft(&self) -> &WorkoutDraft {
        &self.draft
    }

    pub fn active_date(&self) -> NaiveDate {
        self.draft.date
    }

    pub fn is_commit_in_flight(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Switches to another date, keeping what was entered for the current one.
    pub fn change_date(&mut self, date: NaiveDate, today: NaiveDate) {
        self.persist();
        self.drafts.evict_stale(today);
        self.draft = self.drafts.load(date);
        info!("Switched recorder to {}.", date);
    }

    //=====================================================================================
    // Builder Mutations (each one is written through)
    //=====================================================================================

    pub fn select_body_part(&mut self, body_part: BodyPart) {
        ExerciseBuilder::new(&mut self.draft.in_progress).select_body_part(body_part);
        self.persist();
    }

    pub fn select_exercise(&mut self, exercise_name: &str) -> Result<(), ValidationError> {
        ExerciseBuilder::new(&mut self.draft.in_progress)
            .select_exercise(exercise_name, self.catalog.as_ref())?;
        self.persist();
        Ok(())
    }

    pub fn add_set(&mut self) -> Result<u32, ValidationError> {
        let order = ExerciseBuilder::new(&mut self.draft.in_progress)
            .sets()?
            .add_set();
        self.persist();
        Ok(order)
    }

    pub fn remove_set(&mut self, order: u32) -> Result<(), ValidationError> {
        ExerciseBuilder::new(&mut self.draft.in_progress)
            .sets()?
            .remove_set(order)?;
        self.persist();
        Ok(())
    }

    pub fn update_set(&mut self, order: u32, update: SetUpdate) -> Result<(), ValidationError> {
        ExerciseBuilder::new(&mut self.draft.in_progress)
            .sets()?
            .update_set(order, update)?;
        self.persist();
        Ok(())
    }

    /// Moves the exercise under construction into the session's list.
    /// Returns the id of the new entry.
    pub fn commit_exercise(&mut self) -> Result<Uuid, ValidationError> {
        let entry = ExerciseBuilder::new(&mut self.draft.in_progress).commit()?;
        let id = entry.id();
        self.draft.committed_exercises.push(entry);
        self.persist();
        Ok(id)
    }

    pub fn set_title(&mut self, title: Option<String>) {
        self.draft.title = title
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());
        self.persist();
    }

    pub fn set_times(&mut self, start: Option<NaiveTime>, end: Option<NaiveTime>) {
        self.draft.start_time = start;
        self.draft.end_time = end;
        self.persist();
    }

    //=====================================================================================
    // Completing the Session
    //=====================================================================================

    /// Checks that there is something to record and nothing already on its way.
    pub fn ensure_committable(&self) -> Result<(), RecorderError> {
        if self.in_flight.is_some() {
            return Err(RecorderError::CommitInFlight);
        }
        if self.draft.committed_exercises.is_empty() {
            return Err(RecorderError::NothingToCommit);
        }
        Ok(())
    }

    /// Snapshots the active draft into a ticket and blocks further completes
    /// until the ticket is finished.
    pub fn prepare_commit(&mut self, user: &User) -> Result<CommitTicket, RecorderError> {
        self.ensure_committable()?;
        let session = NewWorkoutSession {
            user_id: user.user_id,
            date: self.draft.date,
            title: self.draft.title.clone(),
            duration_min: self.draft.duration_min(),
            exercises: self.draft.committed_exercises.clone(),
        };
        self.in_flight = Some(session.date);
        info!(
            "Submitting {} exercise(s) for {}.",
            session.exercises.len(),
            session.date
        );
        Ok(CommitTicket {
            session,
            in_progress: self.draft.in_progress.clone(),
        })
    }

    /// Applies the database's answer. On success the submitted exercises and
    /// the untouched working state leave the draft of the ticket's date, and
    /// the stored draft is purged unless edits made in the meantime remain.
    /// On failure the draft is left as it was so the user can try again.
    pub fn finish_commit(
        &mut self,
        ticket: CommitTicket,
        outcome: PortResult<Uuid>,
    ) -> Result<Uuid, RecorderError> {
        self.in_flight = None;
        let session_id = match outcome {
            Ok(id) => id,
            Err(e) => {
                warn!("Recording the session for {} failed: {}", ticket.date(), e);
                return Err(RecorderError::Persistence(e));
            }
        };

        if self.draft.date == ticket.date() {
            strip_submitted(&mut self.draft, &ticket);
            self.persist();
        } else {
            let mut stored = self.drafts.load(ticket.date());
            strip_submitted(&mut stored, &ticket);
            self.store(&stored);
        }
        info!("Recorded session {} for {}.", session_id, ticket.date());
        Ok(session_id)
    }

    /// The whole complete flow in one call: sign-in check, submit, apply.
    pub async fn complete_session(
        &mut self,
        identity: &dyn IdentityProvider,
        database: &dyn WorkoutDatabase,
    ) -> Result<Uuid, RecorderError> {
        self.ensure_committable()?;
        let user = resolve_user(identity).await?;
        let ticket = self.prepare_commit(&user)?;
        let outcome = database.commit_session(ticket.session().clone()).await;
        self.finish_commit(ticket, outcome)
    }

    fn persist(&self) {
        self.store(&self.draft);
    }

    fn store(&self, draft: &WorkoutDraft) {
        if draft.is_empty() {
            self.drafts.purge(draft.date);
        } else {
            self.drafts.save(draft);
        }
    }
}

/// Asks the identity provider for the signed-in user.
pub async fn resolve_user(identity: &dyn IdentityProvider) -> Result<User, RecorderError> {
    match identity.current_user().await {
        Ok(Some(user)) => Ok(user),
        Ok(None) | Err(PortError::Unauthorized) => Err(RecorderError::Unauthenticated),
        Err(e) => Err(RecorderError::Persistence(e)),
    }
}

fn strip_submitted(draft: &mut WorkoutDraft, ticket: &CommitTicket) {
    draft.committed_exercises.retain(|e| !ticket.submitted(e));
    if draft.in_progress == ticket.in_progress {
        draft.in_progress = InProgressExercise::default();
    }
    draft.title = None;
    draft.start_time = None;
    draft.end_time = None;
}
