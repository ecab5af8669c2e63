use std::sync::Arc;

use tracing::debug;

use miqat_core::domain::{AchievementFacts, BreakHistoryFacts, SessionCompletion};
use miqat_core::ports::{SessionLogRepository, StoreError};
use miqat_core::{AchievementLedger, AchievementSet, LogEntry, SessionMode};

/// Session log plus the achievements derived from it.
pub struct SessionHistory {
    log: Arc<dyn SessionLogRepository>,
    ledger: Arc<AchievementLedger>,
}

impl SessionHistory {
    pub fn new(log: Arc<dyn SessionLogRepository>, ledger: Arc<AchievementLedger>) -> Self {
        Self { log, ledger }
    }

    pub fn record(&self, entry: &LogEntry) -> Result<(), StoreError> {
        self.log.append(entry)?;
        debug!(kind = %entry.kind, minutes = entry.duration_minutes, "session logged");
        Ok(())
    }

    /// Must run after the completed session was recorded, so lifetime totals
    /// include it.
    pub fn grant_for(&self, completion: &SessionCompletion) -> Result<AchievementSet, StoreError> {
        let facts = match completion.mode {
            SessionMode::Work => {
                let total = self.log.count_by_kind(SessionMode::Work)?;
                AchievementFacts::WorkSession(completion.work_facts(total))
            }
            SessionMode::ShortBreak | SessionMode::LongBreak => {
                AchievementFacts::BreakHistory(BreakHistoryFacts {
                    has_short_break: self.log.count_by_kind(SessionMode::ShortBreak)? > 0,
                    has_long_break: self.log.count_by_kind(SessionMode::LongBreak)? > 0,
                })
            }
        };

        self.ledger.grant(&facts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Local, TimeZone, Utc};
    use miqat_adapters::SqliteDocumentStore;
    use miqat_core::Achievement;
    use uuid::Uuid;

    fn history() -> SessionHistory {
        let store = Arc::new(SqliteDocumentStore::in_memory(Uuid::new_v4()).unwrap());
        SessionHistory::new(store.clone(), Arc::new(AchievementLedger::new(store)))
    }

    fn completion(mode: SessionMode, cycle_count: u32) -> SessionCompletion {
        SessionCompletion {
            mode,
            duration_minutes: 25,
            cycle_count,
            // A Wednesday afternoon.
            completed_at: Local.with_ymd_and_hms(2024, 3, 13, 14, 0, 0).unwrap(),
        }
    }

    #[test]
    fn first_work_session_unlocks_first_once() {
        let history = history();
        history
            .record(&LogEntry::new(SessionMode::Work, 25, Utc::now()))
            .unwrap();

        let unlocked = history.grant_for(&completion(SessionMode::Work, 1)).unwrap();
        let again = history.grant_for(&completion(SessionMode::Work, 1)).unwrap();

        assert_eq!(unlocked.iter().collect::<Vec<_>>(), vec![Achievement::First]);
        assert!(again.is_empty());
    }

    #[test]
    fn break_champion_needs_both_break_kinds() {
        let history = history();
        history
            .record(&LogEntry::new(SessionMode::ShortBreak, 5, Utc::now()))
            .unwrap();
        assert!(history
            .grant_for(&completion(SessionMode::ShortBreak, 1))
            .unwrap()
            .is_empty());

        history
            .record(&LogEntry::new(SessionMode::LongBreak, 15, Utc::now()))
            .unwrap();
        let unlocked = history.grant_for(&completion(SessionMode::LongBreak, 0)).unwrap();

        assert!(unlocked.contains(Achievement::BreakChampion));
    }
}
