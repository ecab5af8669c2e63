//! Miqat protocol definitions for CLI-daemon communication
//!
//! Frames are a `u32` little-endian length followed by a bincode payload.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

mod frame;

pub use frame::{read_frame, write_frame, FrameError, MAX_FRAME_BYTES};

pub use miqat_core::domain::{
    DailyReview, LogSummary, PrayerName, SessionConfig, SessionMode, SessionSnapshot, SettingKey,
    TaskBoard, TaskId,
};
pub use miqat_core::{Achievement, Quadrant};

#[cfg(unix)]
pub fn default_socket_path() -> PathBuf {
    let uid = unsafe { libc::getuid() };
    PathBuf::from(format!("/run/user/{}/miqat.sock", uid))
}

#[cfg(windows)]
pub fn default_socket_path() -> PathBuf {
    let local_app_data = std::env::var("LOCALAPPDATA").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(format!(r"{}\miqat\miqat.sock", local_app_data))
}

/// Requests sent from CLI to daemon
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Request {
    Ping,
    GetStatus,
    /// Start or resume a session (None = current mode). Work sessions may be
    /// gated by upcoming prayer times.
    StartSession {
        mode: Option<SessionMode>,
    },
    /// Accept the pending shortened session offered by the gate
    ConfirmShortenedSession,
    /// Drop the pending offer; the timer stays idle
    DeclineShortenedSession,
    PauseSession,
    ResetSession,
    SwitchMode {
        mode: SessionMode,
    },
    StartMicroTimer,
    CancelMicroTimer,
    GetSettings,
    UpdateSetting {
        key: SettingKey,
        value: String,
    },
    AddTask {
        text: String,
        quadrant: Quadrant,
        intention: Option<String>,
    },
    ToggleTask {
        id: TaskId,
    },
    RemoveTask {
        id: TaskId,
    },
    ListTasks,
    ListAchievements,
    GetStats,
    AddDailyReview {
        highlights: String,
        improvements: String,
        intention_for_tomorrow: Option<String>,
    },
    ListDailyReviews {
        password: Option<String>,
    },
}

/// Outcome of a start request after the prayer gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StartDecision {
    Started {
        mode: SessionMode,
        remaining_seconds: u64,
    },
    /// Needs `ConfirmShortenedSession` before anything runs.
    ShortenedOffer {
        minutes: u32,
        prayer: PrayerName,
    },
    Denied {
        prayer: PrayerName,
        minutes_until: u32,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingOffer {
    pub minutes: u32,
    pub prayer: PrayerName,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MicroTimerStatus {
    pub remaining_seconds: u64,
    pub running: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusReport {
    pub session: SessionSnapshot,
    pub micro_timer: MicroTimerStatus,
    pub pending_offer: Option<PendingOffer>,
    /// Open urgent and important tasks, for the focus view
    pub urgent_important: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StatsReport {
    pub today: LogSummary,
    pub last_seven_days: LogSummary,
    pub lifetime: LogSummary,
    pub completed_tasks_on_board: u32,
}

/// Responses sent from daemon to CLI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Response {
    SessionStatus(StatusReport),
    StartDecision(StartDecision),
    /// The password hash is never sent; `journal_locked` reports whether one is set.
    Settings {
        settings: SessionConfig,
        journal_locked: bool,
    },
    Tasks(TaskBoard),
    Achievements {
        unlocked: Vec<Achievement>,
    },
    Stats(StatsReport),
    DailyReviews(Vec<DailyReview>),
    /// Success that may have unlocked achievements (possibly none)
    Unlocked {
        achievements: Vec<Achievement>,
    },
    Ok,
    Error {
        message: String,
    },
    Pong,
}

impl Response {
    pub fn error(message: impl std::fmt::Display) -> Self {
        Response::Error {
            message: message.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use miqat_core::domain::{Task, TaskBoard};

    fn roundtrip<T>(value: &T) -> T
    where
        T: Serialize + for<'de> Deserialize<'de>,
    {
        let bytes = bincode::serialize(value).unwrap();
        bincode::deserialize(&bytes).unwrap()
    }

    #[test]
    fn request_variants_serialization() {
        let requests = vec![
            Request::Ping,
            Request::StartSession { mode: None },
            Request::StartSession {
                mode: Some(SessionMode::LongBreak),
            },
            Request::UpdateSetting {
                key: SettingKey::CustomMessages,
                value: "Breathe | Stretch".to_string(),
            },
            Request::ToggleTask {
                id: uuid::Uuid::new_v4(),
            },
            Request::ListDailyReviews {
                password: Some("diary".to_string()),
            },
        ];

        for request in requests {
            assert_eq!(roundtrip(&request), request);
        }
    }

    #[test]
    fn settings_response_serialization() {
        let mut settings = SessionConfig::default();
        settings.apply(SettingKey::City, "Rabat").unwrap();
        settings.apply(SettingKey::Method, "3").unwrap();
        settings.custom_messages = vec!["one".to_string()];

        let response = Response::Settings {
            settings,
            journal_locked: true,
        };

        assert_eq!(roundtrip(&response), response);
    }

    #[test]
    fn task_board_response_serialization() {
        let mut board = TaskBoard::default();
        board.add(Task::new("call the bank", Quadrant::Q1, Some("calm".to_string())));
        board.add(Task::new("sort photos", Quadrant::Q4, None));

        let response = Response::Tasks(board);

        assert_eq!(roundtrip(&response), response);
    }

    #[test]
    fn start_decision_serialization() {
        let decisions = vec![
            StartDecision::Started {
                mode: SessionMode::Work,
                remaining_seconds: 1500,
            },
            StartDecision::ShortenedOffer {
                minutes: 20,
                prayer: PrayerName::Asr,
            },
            StartDecision::Denied {
                prayer: PrayerName::Maghrib,
                minutes_until: 3,
            },
        ];

        for decision in decisions {
            let response = Response::StartDecision(decision);
            assert_eq!(roundtrip(&response), response);
        }
    }

    #[test]
    fn daily_reviews_response_serialization() {
        let response = Response::DailyReviews(vec![DailyReview::write(
            "deep work before noon",
            "fewer tabs",
            None,
        )]);

        assert_eq!(roundtrip(&response), response);
    }

    #[test]
    fn error_helper_formats_message() {
        assert_eq!(
            Response::error("no session is running"),
            Response::Error {
                message: "no session is running".to_string()
            }
        );
    }
}
