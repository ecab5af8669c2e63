use serde::{Deserialize, Serialize};

pub const MICRO_TIMER_SECONDS: u64 = 120;

/// One-shot two-minute countdown, independent from the session cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MicroTimer {
    remaining_seconds: u64,
    running: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MicroTick {
    pub remaining_seconds: u64,
    pub completed: bool,
}

impl Default for MicroTimer {
    fn default() -> Self {
        Self {
            remaining_seconds: MICRO_TIMER_SECONDS,
            running: false,
        }
    }
}

impl MicroTimer {
    pub fn remaining_seconds(&self) -> u64 {
        self.remaining_seconds
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Returns false when the countdown was already running.
    pub fn start(&mut self) -> bool {
        if self.running {
            return false;
        }
        self.running = true;
        true
    }

    pub fn cancel(&mut self) {
        *self = Self::default();
    }

    pub fn tick(&mut self) -> MicroTick {
        if !self.running {
            return MicroTick {
                remaining_seconds: self.remaining_seconds,
                completed: false,
            };
        }

        self.remaining_seconds = self.remaining_seconds.saturating_sub(1);

        if self.remaining_seconds == 0 {
            self.cancel();
            return MicroTick {
                remaining_seconds: 0,
                completed: true,
            };
        }

        MicroTick {
            remaining_seconds: self.remaining_seconds,
            completed: false,
        }
    }
}
