//! Work/break cycle state machine.
//!
//! The machine never performs I/O. Every command takes the current settings
//! snapshot explicitly, and expiry is reported as an ordered list of
//! [`SessionEffect`]s that the caller executes.
//!
//! ```text
//! work ──expire──> short-break ──expire──> work ...
//!   └── every 4th work ──> long-break ──expire──> work (cycle reset)
//! ```

use chrono::{DateTime, Datelike, Local, Timelike, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::achievement::WorkSessionFacts;
use super::{LogEntry, SessionConfig, SessionMode};

const LONG_BREAK_EVERY: u32 = 4;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionCommandError {
    #[error("a session is already running")]
    AlreadyRunning,

    #[error("no session is running")]
    NotRunning,

    #[error("cannot switch mode while a session is running")]
    SwitchWhileRunning,
}

/// Facts about a just-finished session, handed to the achievement step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionCompletion {
    pub mode: SessionMode,
    pub duration_minutes: u32,
    pub cycle_count: u32,
    pub completed_at: DateTime<Local>,
}

impl SessionCompletion {
    pub fn work_facts(&self, total_completed: u32) -> WorkSessionFacts {
        WorkSessionFacts {
            total_completed,
            cycle_count: self.cycle_count,
            hour: self.completed_at.hour(),
            weekday: self.completed_at.weekday(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEffect {
    PlayCue,
    AppendLog(LogEntry),
    EvaluateAchievements(SessionCompletion),
    ShowEndSessionMessage,
    ModeSwitched {
        next: SessionMode,
        remaining_seconds: u64,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TickOutcome {
    pub remaining_seconds: u64,
    pub effects: Vec<SessionEffect>,
}

impl TickOutcome {
    pub fn expired(&self) -> bool {
        !self.effects.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub mode: SessionMode,
    pub remaining_seconds: u64,
    pub running: bool,
    pub completed_work_in_cycle: u32,
    pub planned_minutes: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionMachine {
    mode: SessionMode,
    remaining_seconds: u64,
    running: bool,
    completed_work_in_cycle: u32,
    planned_minutes: u32,
}

impl SessionMachine {
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            mode: SessionMode::Work,
            remaining_seconds: config.duration_seconds(SessionMode::Work),
            running: false,
            completed_work_in_cycle: 0,
            planned_minutes: config.duration_minutes(SessionMode::Work),
        }
    }

    pub fn mode(&self) -> SessionMode {
        self.mode
    }

    pub fn remaining_seconds(&self) -> u64 {
        self.remaining_seconds
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn completed_work_in_cycle(&self) -> u32 {
        self.completed_work_in_cycle
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            mode: self.mode,
            remaining_seconds: self.remaining_seconds,
            running: self.running,
            completed_work_in_cycle: self.completed_work_in_cycle,
            planned_minutes: self.planned_minutes,
        }
    }

    /// Starts (or resumes) a countdown in `mode`. `shortened_minutes` comes from
    /// a confirmed partial approval and only ever shortens the countdown.
    pub fn start(
        &mut self,
        config: &SessionConfig,
        mode: SessionMode,
        shortened_minutes: Option<u32>,
    ) -> Result<(), SessionCommandError> {
        if self.running {
            return Err(SessionCommandError::AlreadyRunning);
        }

        if mode != self.mode {
            self.switch_mode(config, mode)?;
        }

        if self.remaining_seconds == 0 {
            self.restore_full_duration(config);
        }

        if let Some(minutes) = shortened_minutes {
            let seconds = u64::from(minutes) * 60;
            if seconds > 0 && seconds < self.remaining_seconds {
                // Logged length is what will actually have run, in whole minutes.
                let elapsed = (u64::from(self.planned_minutes) * 60)
                    .saturating_sub(self.remaining_seconds);
                self.planned_minutes = ((elapsed + seconds) / 60) as u32;
                self.remaining_seconds = seconds;
            }
        }

        self.running = true;
        Ok(())
    }

    pub fn pause(&mut self) -> Result<(), SessionCommandError> {
        if !self.running {
            return Err(SessionCommandError::NotRunning);
        }
        self.running = false;
        Ok(())
    }

    pub fn reset(&mut self, config: &SessionConfig) {
        self.running = false;
        self.restore_full_duration(config);
    }

    /// Manual mode selection. Leaves the work-count cycle untouched.
    pub fn switch_mode(
        &mut self,
        config: &SessionConfig,
        mode: SessionMode,
    ) -> Result<(), SessionCommandError> {
        if self.running {
            return Err(SessionCommandError::SwitchWhileRunning);
        }
        self.mode = mode;
        self.restore_full_duration(config);
        Ok(())
    }

    /// Picks up new durations when the current countdown has not been touched.
    pub fn apply_settings(&mut self, config: &SessionConfig) {
        let untouched = u64::from(self.planned_minutes) * 60 == self.remaining_seconds;
        if !self.running && untouched {
            self.restore_full_duration(config);
        }
    }

    pub fn tick(&mut self, config: &SessionConfig, now: DateTime<Local>) -> TickOutcome {
        if !self.running {
            return TickOutcome {
                remaining_seconds: self.remaining_seconds,
                effects: Vec::new(),
            };
        }

        self.remaining_seconds = self.remaining_seconds.saturating_sub(1);

        if self.remaining_seconds > 0 {
            return TickOutcome {
                remaining_seconds: self.remaining_seconds,
                effects: Vec::new(),
            };
        }

        TickOutcome {
            remaining_seconds: 0,
            effects: self.expire(config, now),
        }
    }

    fn expire(&mut self, config: &SessionConfig, now: DateTime<Local>) -> Vec<SessionEffect> {
        self.running = false;
        let completed = self.mode;
        let duration_minutes = self.planned_minutes;

        let next = match completed {
            SessionMode::Work => {
                self.completed_work_in_cycle += 1;
                if self.completed_work_in_cycle % LONG_BREAK_EVERY == 0 {
                    SessionMode::LongBreak
                } else {
                    SessionMode::ShortBreak
                }
            }
            SessionMode::LongBreak => {
                self.completed_work_in_cycle = 0;
                SessionMode::Work
            }
            SessionMode::ShortBreak => SessionMode::Work,
        };

        let mut effects = vec![
            SessionEffect::PlayCue,
            SessionEffect::AppendLog(LogEntry::new(
                completed,
                duration_minutes,
                now.with_timezone(&Utc),
            )),
            SessionEffect::EvaluateAchievements(SessionCompletion {
                mode: completed,
                duration_minutes,
                cycle_count: self.completed_work_in_cycle,
                completed_at: now,
            }),
        ];

        if config.show_end_session_message {
            effects.push(SessionEffect::ShowEndSessionMessage);
        }

        self.mode = next;
        self.restore_full_duration(config);

        effects.push(SessionEffect::ModeSwitched {
            next,
            remaining_seconds: self.remaining_seconds,
        });

        effects
    }

    fn restore_full_duration(&mut self, config: &SessionConfig) {
        self.remaining_seconds = config.duration_seconds(self.mode);
        self.planned_minutes = config.duration_minutes(self.mode);
    }
}
