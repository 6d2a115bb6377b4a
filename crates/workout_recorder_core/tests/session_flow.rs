//! End-to-end flows of the session recorder against in-memory ports.

use async_trait::async_trait;
use chrono::{Duration, NaiveDate, NaiveTime};
use std::sync::{Arc, Mutex};
use uuid::Uuid;
use workout_recorder_core::{
    BodyPart, DraftStore, IdentityProvider, KeyValueStore, MemoryStore, NewWorkoutSession,
    PortError, PortResult, RecorderError, SessionRecorder, SetMetrics, SetUpdate, StaticCatalog,
    User, ValidationError, WorkoutDatabase, WorkoutDay, WorkoutDraft,
};

//=========================================================================================
// Fakes
//=========================================================================================

struct SignedIn(Option<User>);

#[async_trait]
impl IdentityProvider for SignedIn {
    async fn current_user(&self) -> PortResult<Option<User>> {
        Ok(self.0.clone())
    }
}

#[derive(Default)]
struct FakeDatabase {
    fail: bool,
    received: Mutex<Vec<NewWorkoutSession>>,
}

#[async_trait]
impl WorkoutDatabase for FakeDatabase {
    async fn commit_session(&self, session: NewWorkoutSession) -> PortResult<Uuid> {
        if self.fail {
            return Err(PortError::Unexpected("connection reset".to_string()));
        }
        self.received.lock().unwrap().push(session);
        Ok(Uuid::new_v4())
    }

    async fn list_sessions(&self, _user_id: Uuid) -> PortResult<Vec<WorkoutDay>> {
        Ok(Vec::new())
    }

    async fn validate_auth_session(&self, _token: &str) -> PortResult<User> {
        Err(PortError::Unauthorized)
    }
}

fn user() -> User {
    User {
        user_id: Uuid::new_v4(),
        email: Some("lifter@example.com".to_string()),
    }
}

fn june_first() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
}

fn recorder_on(store: Arc<MemoryStore>, date: NaiveDate) -> SessionRecorder {
    SessionRecorder::activate(
        DraftStore::new(store),
        Arc::new(StaticCatalog),
        date,
        june_first(),
    )
}

fn record_bench_press(recorder: &mut SessionRecorder) {
    recorder.select_body_part(BodyPart::Chest);
    recorder.select_exercise("benchPress").unwrap();
    recorder.update_set(1, SetUpdate::WeightKg(80.0)).unwrap();
    recorder.update_set(1, SetUpdate::Reps(10)).unwrap();
    let second = recorder.add_set().unwrap();
    recorder.update_set(second, SetUpdate::WeightKg(80.0)).unwrap();
    recorder.update_set(second, SetUpdate::Reps(8)).unwrap();
    recorder.commit_exercise().unwrap();
}

//=========================================================================================
// Scenarios
//=========================================================================================

#[tokio::test]
async fn full_session_is_committed_and_the_draft_purged() {
    let store = Arc::new(MemoryStore::new());
    let mut recorder = recorder_on(store.clone(), june_first());
    record_bench_press(&mut recorder);
    assert!(recorder.draft().in_progress.is_empty());

    let database = FakeDatabase::default();
    recorder
        .complete_session(&SignedIn(Some(user())), &database)
        .await
        .unwrap();

    let received = database.received.lock().unwrap();
    assert_eq!(received.len(), 1);
    let session = &received[0];
    assert_eq!(session.date, june_first());
    assert_eq!(session.exercises.len(), 1);
    let bench = &session.exercises[0];
    assert_eq!(bench.body_part(), BodyPart::Chest);
    assert_eq!(bench.exercise_name(), "benchPress");
    let sets: Vec<(u32, SetMetrics)> = bench.sets().iter().map(|s| (s.order, s.metrics)).collect();
    assert_eq!(
        sets,
        vec![
            (1, SetMetrics::Weighted { weight_kg: 80.0, reps: 10 }),
            (2, SetMetrics::Weighted { weight_kg: 80.0, reps: 8 }),
        ]
    );

    assert_eq!(store.get_item("draft:2025-06-01").unwrap(), None);
    assert!(recorder.draft().committed_exercises.is_empty());
}

#[tokio::test]
async fn completing_clears_an_unfinished_exercise_and_purges_the_date() {
    let store = Arc::new(MemoryStore::new());
    let mut recorder = recorder_on(store.clone(), june_first());
    record_bench_press(&mut recorder);
    recorder.select_body_part(BodyPart::Legs);

    recorder
        .complete_session(&SignedIn(Some(user())), &FakeDatabase::default())
        .await
        .unwrap();

    assert!(recorder.draft().is_empty());
    assert_eq!(store.get_item("draft:2025-06-01").unwrap(), None);
}

#[test]
fn working_state_changed_during_the_commit_survives_it() {
    let store = Arc::new(MemoryStore::new());
    let mut recorder = recorder_on(store.clone(), june_first());
    record_bench_press(&mut recorder);
    recorder.select_body_part(BodyPart::Legs);
    let ticket = recorder.prepare_commit(&user()).unwrap();

    recorder.select_exercise("squat").unwrap();
    recorder.finish_commit(ticket, Ok(Uuid::new_v4())).unwrap();

    assert!(recorder.draft().committed_exercises.is_empty());
    assert_eq!(recorder.draft().in_progress.exercise_name.as_deref(), Some("squat"));
    let stored = DraftStore::new(store).load(june_first());
    assert_eq!(stored.in_progress.body_part, Some(BodyPart::Legs));
}

#[test]
fn abandoned_draft_is_resumed_the_same_day() {
    let store = Arc::new(MemoryStore::new());
    let saved = {
        let mut recorder = recorder_on(store.clone(), june_first());
        record_bench_press(&mut recorder);
        recorder.draft().committed_exercises.clone()
    };

    let reloaded = recorder_on(store, june_first());
    assert_eq!(reloaded.draft().committed_exercises, saved);
}

#[tokio::test]
async fn failed_commit_keeps_the_draft() {
    let store = Arc::new(MemoryStore::new());
    let mut recorder = recorder_on(store.clone(), june_first());
    record_bench_press(&mut recorder);

    let database = FakeDatabase {
        fail: true,
        ..FakeDatabase::default()
    };
    let err = recorder
        .complete_session(&SignedIn(Some(user())), &database)
        .await
        .unwrap_err();
    assert!(matches!(err, RecorderError::Persistence(_)));
    assert!(!recorder.is_commit_in_flight());

    let drafts = DraftStore::new(store);
    assert_eq!(drafts.load(june_first()).committed_exercises.len(), 1);
}

#[tokio::test]
async fn signed_out_users_are_asked_to_sign_in() {
    let store = Arc::new(MemoryStore::new());
    let mut recorder = recorder_on(store.clone(), june_first());
    record_bench_press(&mut recorder);

    let database = FakeDatabase::default();
    let err = recorder
        .complete_session(&SignedIn(None), &database)
        .await
        .unwrap_err();

    assert!(matches!(err, RecorderError::Unauthenticated));
    assert!(database.received.lock().unwrap().is_empty());
    assert_eq!(recorder.draft().committed_exercises.len(), 1);
    assert!(store.get_item("draft:2025-06-01").unwrap().is_some());
}

#[tokio::test]
async fn completing_an_empty_session_is_a_no_op() {
    let store = Arc::new(MemoryStore::new());
    let mut recorder = recorder_on(store, june_first());
    let database = FakeDatabase::default();

    let err = recorder
        .complete_session(&SignedIn(Some(user())), &database)
        .await
        .unwrap_err();
    assert!(matches!(err, RecorderError::NothingToCommit));
    assert!(database.received.lock().unwrap().is_empty());
}

#[test]
fn commit_is_gated_on_a_complete_exercise() {
    let store = Arc::new(MemoryStore::new());
    let mut recorder = recorder_on(store, june_first());

    recorder.select_body_part(BodyPart::Chest);
    assert_eq!(recorder.add_set(), Err(ValidationError::MissingExerciseName));
    assert_eq!(recorder.commit_exercise(), Err(ValidationError::MissingExerciseName));
    assert!(recorder.draft().committed_exercises.is_empty());

    recorder.select_exercise("benchPress").unwrap();
    recorder.commit_exercise().unwrap();
    assert_eq!(recorder.draft().committed_exercises.len(), 1);
    assert!(recorder.draft().in_progress.is_empty());
}

//=========================================================================================
// Draft Store Properties
//=========================================================================================

#[test]
fn saved_draft_loads_back_field_for_field() {
    let store = Arc::new(MemoryStore::new());
    let mut recorder = recorder_on(store.clone(), june_first());
    recorder.set_title(Some("  Push day ".to_string()));
    recorder.set_times(NaiveTime::from_hms_opt(18, 0, 0), NaiveTime::from_hms_opt(19, 15, 0));
    record_bench_press(&mut recorder);
    recorder.select_body_part(BodyPart::Cardio);
    recorder.select_exercise("running").unwrap();
    recorder.update_set(1, SetUpdate::DistanceKm(5.0)).unwrap();
    recorder.update_set(1, SetUpdate::Completed(true)).unwrap();

    let expected: WorkoutDraft = recorder.draft().clone();
    assert_eq!(expected.title.as_deref(), Some("Push day"));
    assert_eq!(expected.duration_min(), Some(75));

    let drafts = DraftStore::new(store);
    drafts.save(&expected);
    assert_eq!(drafts.load(june_first()), expected);
}

#[test]
fn only_drafts_older_than_yesterday_are_evicted() {
    let store = Arc::new(MemoryStore::new());
    let drafts = DraftStore::new(store.clone());
    let today = june_first();
    for offset in [-2, -1, 0, 1] {
        let mut draft = WorkoutDraft::empty(today + Duration::days(offset));
        draft.title = Some(format!("day {}", offset));
        drafts.save(&draft);
    }

    let evicted = drafts.evict_stale(today);

    assert_eq!(evicted, vec![today - Duration::days(2)]);
    assert_eq!(
        store.keys().unwrap(),
        vec![
            "draft:2025-05-31".to_string(),
            "draft:2025-06-01".to_string(),
            "draft:2025-06-02".to_string(),
        ]
    );
}

#[test]
fn activating_a_date_evicts_stale_drafts_first() {
    let store = Arc::new(MemoryStore::new());
    let drafts = DraftStore::new(store.clone());
    let mut old = WorkoutDraft::empty(june_first() - Duration::days(5));
    old.title = Some("forgotten".to_string());
    drafts.save(&old);

    let _recorder = recorder_on(store.clone(), june_first());

    assert!(store.keys().unwrap().is_empty());
}

//=========================================================================================
// In-flight Commits and Date Changes
//=========================================================================================

#[test]
fn editing_continues_while_a_commit_is_in_flight() {
    let store = Arc::new(MemoryStore::new());
    let mut recorder = recorder_on(store.clone(), june_first());
    record_bench_press(&mut recorder);

    let ticket = recorder.prepare_commit(&user()).unwrap();
    assert!(matches!(
        recorder.prepare_commit(&user()),
        Err(RecorderError::CommitInFlight)
    ));

    recorder.select_body_part(BodyPart::Legs);
    recorder.select_exercise("squat").unwrap();
    let late = recorder.commit_exercise().unwrap();

    recorder.finish_commit(ticket, Ok(Uuid::new_v4())).unwrap();

    let remaining = &recorder.draft().committed_exercises;
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id(), late);
    let stored = DraftStore::new(store).load(june_first());
    assert_eq!(stored.committed_exercises.len(), 1);
}

#[test]
fn late_answers_apply_to_the_ticket_date_not_the_active_one() {
    let store = Arc::new(MemoryStore::new());
    let mut recorder = recorder_on(store.clone(), june_first());
    record_bench_press(&mut recorder);
    let ticket = recorder.prepare_commit(&user()).unwrap();

    let next_day = june_first() + Duration::days(1);
    recorder.change_date(next_day, june_first());
    record_bench_press(&mut recorder);

    recorder.finish_commit(ticket, Ok(Uuid::new_v4())).unwrap();

    assert_eq!(recorder.active_date(), next_day);
    assert_eq!(recorder.draft().committed_exercises.len(), 1);
    assert_eq!(store.get_item("draft:2025-06-01").unwrap(), None);
    assert!(store.get_item("draft:2025-06-02").unwrap().is_some());
}

#[test]
fn changing_date_keeps_each_date_separate() {
    let store = Arc::new(MemoryStore::new());
    let mut recorder = recorder_on(store.clone(), june_first());
    recorder.select_body_part(BodyPart::Back);

    let next_day = june_first() + Duration::days(1);
    recorder.change_date(next_day, june_first());
    assert!(recorder.draft().is_empty());

    recorder.change_date(june_first(), june_first());
    assert_eq!(recorder.draft().in_progress.body_part, Some(BodyPart::Back));
}
