//! services/recorder/src/console/session.rs
//!
//! This is the main control loop of the recorder console. It owns the session
//! recorder, applies one command per input line, and delegates the slow work
//! (rest timer ticks, database commits) to spawned tasks.
//!
//! A database commit never blocks the loop: the ticket goes to a spawned task
//! and its answer comes back over a channel, to be applied whenever it lands.
//! Commands keep being processed in the meantime.

use crate::{
    console::{
        protocol::{ClientMessage, ServerMessage},
        state::AppState,
        timer_task::tick_process,
    },
    error::AppError,
};
use chrono::{Local, NaiveDate};
use std::sync::Arc;
use tokio::{
    io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt},
    sync::{mpsc, Mutex},
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use uuid::Uuid;
use workout_recorder_core::{
    error::TimerError, nutrition::{FoodLog, NutritionError}, recorder::resolve_user, CommitTicket, DraftStore,
    MemoStore, PortResult, RecorderError, RestTimer, RestTimerState, SessionRecorder,
    ValidationError, WorkoutDay, WorkoutStats,
};

/// The database's answer to an issued commit ticket.
pub type CommitAnswer = (CommitTicket, PortResult<Uuid>);

const OUTBOUND_CAPACITY: usize = 64;

fn today() -> NaiveDate {
    Local::now().date_naive()
}

//=========================================================================================
// The Console Loop
//=========================================================================================

/// Runs the console until `input` is closed.
///
/// Every `ServerMessage` is written to `output` as one JSON line. Logging goes
/// through `tracing`, never to `output`.
pub async fn run<R, W>(app_state: Arc<AppState>, input: R, output: W) -> Result<(), AppError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (outbound, outbound_rx) = mpsc::channel(OUTBOUND_CAPACITY);
    let (commits, mut commit_rx) = mpsc::channel::<CommitAnswer>(1);
    let writer = tokio::spawn(write_lines(outbound_rx, output));

    let mut console = Console::new(app_state, today(), outbound, commits)?;
    console.send_draft().await;
    info!("Console ready for {}.", console.recorder().active_date());

    let mut lines = input.lines();
    let result = loop {
        tokio::select! {
            line = lines.next_line() => match line {
                Ok(Some(line)) => {
                    let line = line.trim();
                    if !line.is_empty() {
                        console.handle_line(line, today()).await;
                    }
                }
                Ok(None) => {
                    info!("Input closed.");
                    break Ok(());
                }
                Err(e) => break Err(AppError::from(e)),
            },
            Some(answer) = commit_rx.recv() => console.apply_commit(answer).await,
        }
    };

    if console.recorder().is_commit_in_flight() {
        info!("Waiting for the outstanding commit before exiting.");
        if let Some(answer) = commit_rx.recv().await {
            console.apply_commit(answer).await;
        }
    }

    // --- Cleanup ---
    console.shutdown();
    drop(console);
    match writer.await {
        Ok(written) => written?,
        Err(e) => return Err(AppError::Internal(format!("Console writer failed: {}", e))),
    }
    info!("Console closed.");
    result
}

async fn write_lines<W>(mut outbound: mpsc::Receiver<ServerMessage>, mut output: W) -> Result<(), AppError>
where
    W: AsyncWrite + Unpin,
{
    while let Some(message) = outbound.recv().await {
        let mut line = serde_json::to_string(&message)?;
        line.push('\n');
        output.write_all(line.as_bytes()).await?;
        output.flush().await?;
    }
    Ok(())
}

//=========================================================================================
// Console State and Command Handling
//=========================================================================================

pub struct Console {
    app_state: Arc<AppState>,
    recorder: SessionRecorder,
    memos: MemoStore,
    food_log: FoodLog,
    timer: Arc<Mutex<RestTimer>>,
    /// Cancels the tick task of the current countdown.
    tick_token: CancellationToken,
    outbound: mpsc::Sender<ServerMessage>,
    commits: mpsc::Sender<CommitAnswer>,
}

impl Console {
    /// Mounts the recorder on `today`, evicting stale drafts on the way.
    pub fn new(
        app_state: Arc<AppState>,
        today: NaiveDate,
        outbound: mpsc::Sender<ServerMessage>,
        commits: mpsc::Sender<CommitAnswer>,
    ) -> Result<Self, AppError> {
        let recorder = SessionRecorder::activate(
            DraftStore::new(app_state.local_store.clone()),
            app_state.catalog.clone(),
            today,
            today,
        );
        let memos = MemoStore::new(app_state.local_store.clone());
        let timer = RestTimer::new(app_state.config.rest_timer_seconds)
            .map_err(|e| AppError::Internal(format!("Invalid rest duration: {}", e)))?;

        Ok(Self {
            app_state,
            recorder,
            memos,
            food_log: FoodLog::new(),
            timer: Arc::new(Mutex::new(timer)),
            tick_token: CancellationToken::new(),
            outbound,
            commits,
        })
    }

    pub fn recorder(&self) -> &SessionRecorder {
        &self.recorder
    }

    /// Stops the rest timer's tick task, if one is running.
    pub fn shutdown(&self) {
        self.tick_token.cancel();
    }

    pub async fn handle_line(&mut self, line: &str, today: NaiveDate) {
        match serde_json::from_str::<ClientMessage>(line) {
            Ok(message) => self.handle(message, today).await,
            Err(e) => {
                warn!("Ignoring malformed command: {}", e);
                self.send(ServerMessage::Error {
                    message: format!("Invalid message: {}", e),
                })
                .await;
            }
        }
    }

    pub async fn handle(&mut self, message: ClientMessage, today: NaiveDate) {
        debug!("Handling {:?}", message);
        match message {
            ClientMessage::SelectDate { date } => {
                self.recorder.change_date(date, today);
                self.send_draft().await;
            }
            ClientMessage::SelectBodyPart { body_part } => {
                self.recorder.select_body_part(body_part);
                self.send_draft().await;
            }
            ClientMessage::SelectExercise { exercise_name } => {
                let result = self.recorder.select_exercise(&exercise_name);
                self.after_edit(result).await;
            }
            ClientMessage::ListExercises { body_part } => {
                let exercises = self
                    .app_state
                    .catalog
                    .exercises(body_part)
                    .iter()
                    .map(|name| name.to_string())
                    .collect();
                self.send(ServerMessage::Exercises {
                    body_part,
                    exercises,
                })
                .await;
            }
            ClientMessage::AddSet => {
                let result = self.recorder.add_set().map(|_| ());
                self.after_edit(result).await;
            }
            ClientMessage::RemoveSet { order } => {
                let result = self.recorder.remove_set(order);
                self.after_edit(result).await;
            }
            ClientMessage::UpdateSet { order, update } => {
                let result = self.recorder.update_set(order, update);
                self.after_edit(result).await;
            }
            ClientMessage::CommitExercise => {
                let result = self.recorder.commit_exercise().map(|_| ());
                self.after_edit(result).await;
            }
            ClientMessage::SetTitle { title } => {
                self.recorder.set_title(title);
                self.send_draft().await;
            }
            ClientMessage::SetTimes {
                start_time,
                end_time,
            } => {
                self.recorder.set_times(start_time, end_time);
                self.send_draft().await;
            }
            ClientMessage::CompleteSession => self.complete_session().await,
            ClientMessage::StartTimer => self.start_timer().await,
            ClientMessage::PauseTimer => {
                self.tick_token.cancel();
                let result = {
                    let mut timer = self.timer.lock().await;
                    timer.pause().map(|_| timer.state())
                };
                self.after_timer(result).await;
            }
            ClientMessage::ResetTimer => {
                self.tick_token.cancel();
                let state = {
                    let mut timer = self.timer.lock().await;
                    timer.reset();
                    timer.state()
                };
                self.send(ServerMessage::TimerTick { state }).await;
            }
            ClientMessage::SetTimerTotal { seconds } => {
                let result = {
                    let mut timer = self.timer.lock().await;
                    timer.set_total(seconds).map(|_| timer.state())
                };
                self.after_timer(result).await;
            }
            ClientMessage::TargetCalories { profile, goal } => {
                match profile.target_calories(goal) {
                    Ok(target) => self.send(ServerMessage::Calories { target }).await,
                    Err(e) => {
                        self.send(ServerMessage::ValidationFailed {
                            message: e.to_string(),
                        })
                        .await
                    }
                }
            }
            ClientMessage::AddFood { food } => {
                let result = self.food_log.add(food).map(|_| ());
                self.after_food(result).await;
            }
            ClientMessage::RemoveFood { id } => {
                let result = self.food_log.remove(id).map(|_| ());
                self.after_food(result).await;
            }
            ClientMessage::FoodLog => self.send_food_log().await,
            ClientMessage::Stats => self.send_stats(today).await,
            ClientMessage::WorkoutsForDate { date } => {
                let date = date.unwrap_or_else(|| self.recorder.active_date());
                self.send_workouts(date).await;
            }
            ClientMessage::SaveMemo { text } => {
                let date = self.recorder.active_date();
                self.memos.save(date, &text);
                self.send_memo(date).await;
            }
            ClientMessage::GetMemo => self.send_memo(self.recorder.active_date()).await,
        }
    }

    /// Applies a database answer delivered by a commit task.
    pub async fn apply_commit(&mut self, (ticket, outcome): CommitAnswer) {
        let date = ticket.date();
        match self.recorder.finish_commit(ticket, outcome) {
            Ok(session_id) => {
                self.send(ServerMessage::SessionCompleted { session_id, date })
                    .await;
                self.send_draft().await;
            }
            Err(e) => self.report(e).await,
        }
    }

    //=====================================================================================
    // Slow Paths (handed to spawned tasks)
    //=====================================================================================

    async fn complete_session(&mut self) {
        if let Err(e) = self.recorder.ensure_committable() {
            self.report(e).await;
            return;
        }
        let user = match resolve_user(self.app_state.identity.as_ref()).await {
            Ok(user) => user,
            Err(e) => {
                self.report(e).await;
                return;
            }
        };
        let ticket = match self.recorder.prepare_commit(&user) {
            Ok(ticket) => ticket,
            Err(e) => {
                self.report(e).await;
                return;
            }
        };

        let date = ticket.date();
        let db = self.app_state.db.clone();
        let commits = self.commits.clone();
        tokio::spawn(async move {
            let outcome = db.commit_session(ticket.session().clone()).await;
            if commits.send((ticket, outcome)).await.is_err() {
                error!("Console closed before the commit for {} was answered.", date);
            }
        });
        self.send(ServerMessage::CommitPending { date }).await;
    }

    async fn start_timer(&mut self) {
        let result = {
            let mut timer = self.timer.lock().await;
            timer.start().map(|_| timer.state())
        };
        let state = match result {
            Ok(state) => state,
            Err(e) => {
                self.send(ServerMessage::Error {
                    message: e.to_string(),
                })
                .await;
                return;
            }
        };

        self.tick_token.cancel();
        self.tick_token = CancellationToken::new();
        tokio::spawn(tick_process(
            self.timer.clone(),
            self.outbound.clone(),
            self.tick_token.clone(),
        ));
        self.send(ServerMessage::TimerTick { state }).await;
    }

    /// Loads the signed-in user's recorded sessions. Failures are reported to
    /// the client and yield `None`.
    async fn load_history(&self) -> Option<Vec<WorkoutDay>> {
        let user = match resolve_user(self.app_state.identity.as_ref()).await {
            Ok(user) => user,
            Err(e) => {
                self.report(e).await;
                return None;
            }
        };
        match self.app_state.db.list_sessions(user.user_id).await {
            Ok(days) => Some(days),
            Err(e) => {
                error!("Failed to load workout history: {:?}", e);
                self.send(ServerMessage::Error {
                    message: "Failed to load workout history.".to_string(),
                })
                .await;
                None
            }
        }
    }

    async fn send_stats(&self, today: NaiveDate) {
        if let Some(days) = self.load_history().await {
            let stats = WorkoutStats::from_history(&days, today);
            self.send(ServerMessage::Stats { stats }).await;
        }
    }

    async fn send_workouts(&self, date: NaiveDate) {
        if let Some(days) = self.load_history().await {
            let workouts = days.into_iter().filter(|day| day.date == date).collect();
            self.send(ServerMessage::Workouts { date, workouts }).await;
        }
    }

    //=====================================================================================
    // Replies
    //=====================================================================================

    async fn send(&self, message: ServerMessage) {
        if self.outbound.send(message).await.is_err() {
            warn!("Console output closed; dropping message.");
        }
    }

    async fn send_draft(&self) {
        self.send(ServerMessage::DraftUpdated {
            draft: self.recorder.draft().clone(),
        })
        .await;
    }

    async fn send_memo(&self, date: NaiveDate) {
        let text = self.memos.get(date);
        self.send(ServerMessage::Memo { date, text }).await;
    }

    async fn send_food_log(&self) {
        self.send(ServerMessage::FoodLog {
            items: self.food_log.items().to_vec(),
            totals: self.food_log.totals(),
        })
        .await;
    }

    async fn after_food(&self, result: Result<(), NutritionError>) {
        match result {
            Ok(()) => self.send_food_log().await,
            Err(e) => {
                self.send(ServerMessage::ValidationFailed {
                    message: e.to_string(),
                })
                .await
            }
        }
    }

    async fn after_edit(&self, result: Result<(), ValidationError>) {
        match result {
            Ok(()) => self.send_draft().await,
            Err(e) => {
                self.send(ServerMessage::ValidationFailed {
                    message: e.to_string(),
                })
                .await
            }
        }
    }

    async fn after_timer(&self, result: Result<RestTimerState, TimerError>) {
        match result {
            Ok(state) => self.send(ServerMessage::TimerTick { state }).await,
            Err(e) => {
                self.send(ServerMessage::Error {
                    message: e.to_string(),
                })
                .await
            }
        }
    }

    async fn report(&self, e: RecorderError) {
        let message = match e {
            RecorderError::Unauthenticated => ServerMessage::SignInRequired,
            RecorderError::Validation(e) => ServerMessage::ValidationFailed {
                message: e.to_string(),
            },
            other => ServerMessage::Error {
                message: other.to_string(),
            },
        };
        self.send(message).await;
    }
}
