//! crates/workout_recorder_core/src/rest_timer.rs
//!
//! The rest-timer countdown state machine.
//!
//! The machine never looks at a clock. Whoever drives it calls `tick` once per
//! second while it is running and stops calling as soon as `is_running` turns
//! false.

use serde::Serialize;

use crate::error::TimerError;

pub const DEFAULT_REST_SECONDS: u32 = 90;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum TimerPhase {
    Idle { total: u32 },
    Running { remaining: u32, total: u32 },
    Paused { remaining: u32, total: u32 },
    Expired { total: u32 },
}

impl TimerPhase {
    fn name(&self) -> &'static str {
        match self {
            TimerPhase::Idle { .. } => "idle",
            TimerPhase::Running { .. } => "running",
            TimerPhase::Paused { .. } => "paused",
            TimerPhase::Expired { .. } => "expired",
        }
    }
}

/// Read-only view of the timer, as shown by the progress indicator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RestTimerState {
    pub remaining_seconds: u32,
    pub total_seconds: u32,
    pub running: bool,
    pub progress: f64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestTimer {
    phase: TimerPhase,
}

impl Default for RestTimer {
    fn default() -> Self {
        Self {
            phase: TimerPhase::Idle {
                total: DEFAULT_REST_SECONDS,
            },
        }
    }
}

impl RestTimer {
    pub fn new(total_seconds: u32) -> Result<Self, TimerError> {
        if total_seconds == 0 {
            return Err(TimerError::ZeroDuration);
        }
        Ok(Self {
            phase: TimerPhase::Idle {
                total: total_seconds,
            },
        })
    }

    pub fn phase(&self) -> TimerPhase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        matches!(self.phase, TimerPhase::Running { .. })
    }

    pub fn total(&self) -> u32 {
        match self.phase {
            TimerPhase::Idle { total }
            | TimerPhase::Running { total, .. }
            | TimerPhase::Paused { total, .. }
            | TimerPhase::Expired { total } => total,
        }
    }

    pub fn remaining(&self) -> u32 {
        match self.phase {
            TimerPhase::Idle { total } => total,
            TimerPhase::Running { remaining, .. } | TimerPhase::Paused { remaining, .. } => {
                remaining
            }
            TimerPhase::Expired { .. } => 0,
        }
    }

    /// Fraction of the rest period that has elapsed, from 0.0 to 1.0.
    pub fn progress(&self) -> f64 {
        1.0 - f64::from(self.remaining()) / f64::from(self.total())
    }

    pub fn state(&self) -> RestTimerState {
        RestTimerState {
            remaining_seconds: self.remaining(),
            total_seconds: self.total(),
            running: self.is_running(),
            progress: self.progress(),
        }
    }

    /// Starts a fresh countdown, or resumes a paused one where it left off.
    /// An expired timer has to be reset first.
    pub fn start(&mut self) -> Result<(), TimerError> {
        self.phase = match self.phase {
            TimerPhase::Idle { total } => TimerPhase::Running {
                remaining: total,
                total,
            },
            TimerPhase::Paused { remaining, total } => TimerPhase::Running { remaining, total },
            TimerPhase::Running { .. } | TimerPhase::Expired { .. } => {
                return Err(self.invalid("start"))
            }
        };
        Ok(())
    }

    pub fn pause(&mut self) -> Result<(), TimerError> {
        match self.phase {
            TimerPhase::Running { remaining, total } => {
                self.phase = TimerPhase::Paused { remaining, total };
                Ok(())
            }
            _ => Err(self.invalid("pause")),
        }
    }

    /// Advances the countdown by one second. Returns the phase afterwards.
    pub fn tick(&mut self) -> Result<TimerPhase, TimerError> {
        let TimerPhase::Running { remaining, total } = self.phase else {
            return Err(self.invalid("tick"));
        };
        self.phase = match remaining.saturating_sub(1) {
            0 => TimerPhase::Expired { total },
            left => TimerPhase::Running {
                remaining: left,
                total,
            },
        };
        Ok(self.phase)
    }

    pub fn reset(&mut self) {
        self.phase = TimerPhase::Idle { total: self.total() };
    }

    /// Changes the rest duration. Not allowed mid-countdown.
    pub fn set_total(&mut self, total_seconds: u32) -> Result<(), TimerError> {
        if self.is_running() {
            return Err(TimerError::Running);
        }
        if total_seconds == 0 {
            return Err(TimerError::ZeroDuration);
        }
        self.phase = TimerPhase::Idle {
            total: total_seconds,
        };
        Ok(())
    }

    fn invalid(&self, action: &'static str) -> TimerError {
        TimerError::InvalidTransition {
            action,
            state: self.phase.name(),
        }
    }
}
