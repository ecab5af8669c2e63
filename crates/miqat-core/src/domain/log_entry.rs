use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::SessionMode;

/// Immutable record of one finished session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub kind: SessionMode,
    pub duration_minutes: u32,
    pub completed_at: DateTime<Utc>,
}

impl LogEntry {
    pub fn new(kind: SessionMode, duration_minutes: u32, completed_at: DateTime<Utc>) -> Self {
        Self {
            kind,
            duration_minutes,
            completed_at,
        }
    }
}

/// Totals over a slice of the session log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LogSummary {
    pub work_sessions: u32,
    pub short_breaks: u32,
    pub long_breaks: u32,
    pub focus_minutes: u64,
}

impl LogSummary {
    pub fn from_entries(entries: &[LogEntry]) -> Self {
        entries.iter().fold(Self::default(), |mut summary, entry| {
            match entry.kind {
                SessionMode::Work => {
                    summary.work_sessions += 1;
                    summary.focus_minutes += u64::from(entry.duration_minutes);
                }
                SessionMode::ShortBreak => summary.short_breaks += 1,
                SessionMode::LongBreak => summary.long_breaks += 1,
            }
            summary
        })
    }
}
