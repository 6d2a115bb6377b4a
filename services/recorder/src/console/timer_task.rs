//! services/recorder/src/console/timer_task.rs
//!
//! The worker that drives a running rest timer: one `tick` per second, with
//! the resulting state pushed to the client.
//!
//! The task is the timer's only clock. It stops as soon as the timer leaves
//! `Running` (expired, or paused/reset by the console) or its token is
//! cancelled, so a stopped timer never has a periodic source attached.

use crate::console::protocol::ServerMessage;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use workout_recorder_core::{RestTimer, TimerPhase};

const TICK: Duration = Duration::from_secs(1);

pub async fn tick_process(
    timer: Arc<Mutex<RestTimer>>,
    outbound: mpsc::Sender<ServerMessage>,
    cancellation_token: CancellationToken,
) {
    let mut interval = interval_at(Instant::now() + TICK, TICK);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = cancellation_token.cancelled() => {
                debug!("Rest timer task cancelled.");
                return;
            }
            _ = interval.tick() => {}
        }

        let (phase, state) = {
            let mut timer = timer.lock().await;
            // Pause and reset cancel before taking the lock, so a tick that
            // lost the race must not touch the timer.
            if cancellation_token.is_cancelled() {
                return;
            }
            match timer.tick() {
                Ok(phase) => (phase, timer.state()),
                Err(e) => {
                    debug!("Rest timer stopped ticking: {}", e);
                    return;
                }
            }
        };

        let (message, expired) = match phase {
            TimerPhase::Expired { .. } => (ServerMessage::TimerExpired { state }, true),
            _ => (ServerMessage::TimerTick { state }, false),
        };
        if outbound.send(message).await.is_err() {
            warn!("Console output closed. Ending rest timer task.");
            return;
        }
        if expired {
            info!("Rest timer expired.");
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn running(total: u32) -> Arc<Mutex<RestTimer>> {
        let mut timer = RestTimer::new(total).unwrap();
        timer.start().unwrap();
        Arc::new(Mutex::new(timer))
    }

    #[tokio::test(start_paused = true)]
    async fn counts_down_once_per_second_until_expired() {
        let timer = running(3);
        let (tx, mut rx) = mpsc::channel(8);
        let handle = tokio::spawn(tick_process(timer.clone(), tx, CancellationToken::new()));

        let mut remaining = Vec::new();
        while let Some(message) = rx.recv().await {
            match message {
                ServerMessage::TimerTick { state } => remaining.push(state.remaining_seconds),
                ServerMessage::TimerExpired { state } => {
                    assert_eq!(state.remaining_seconds, 0);
                    assert!(!state.running);
                }
                other => panic!("unexpected message {:?}", other),
            }
        }

        handle.await.unwrap();
        assert_eq!(remaining, vec![2, 1]);
        assert!(matches!(timer.lock().await.phase(), TimerPhase::Expired { total: 3 }));
    }

    #[tokio::test(start_paused = true)]
    async fn default_timer_expires_after_ninety_ticks() {
        let timer = running(90);
        let (tx, mut rx) = mpsc::channel(128);
        let started = Instant::now();
        tokio::spawn(tick_process(timer, tx, CancellationToken::new()));

        let mut ticks = 0;
        while let Some(message) = rx.recv().await {
            ticks += 1;
            if matches!(message, ServerMessage::TimerExpired { .. }) {
                break;
            }
        }

        assert_eq!(ticks, 90);
        assert_eq!(started.elapsed(), Duration::from_secs(90));
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_task_leaves_the_timer_alone() {
        let timer = running(30);
        let (tx, mut rx) = mpsc::channel(8);
        let token = CancellationToken::new();
        let handle = tokio::spawn(tick_process(timer.clone(), tx, token.clone()));

        token.cancel();
        handle.await.unwrap();

        assert_eq!(timer.lock().await.remaining(), 30);
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn stops_when_the_timer_is_paused_elsewhere() {
        let timer = running(30);
        let (tx, mut rx) = mpsc::channel(8);
        let handle = tokio::spawn(tick_process(timer.clone(), tx, CancellationToken::new()));

        assert!(matches!(rx.recv().await, Some(ServerMessage::TimerTick { .. })));
        timer.lock().await.pause().unwrap();
        handle.await.unwrap();

        assert_eq!(timer.lock().await.remaining(), 29);
        assert!(matches!(timer.lock().await.phase(), TimerPhase::Paused { .. }));
    }
}
