use chrono::{DateTime, Utc};
use serde_json::{json, Value};

use miqat_core::domain::{CompletedTaskRecord, DailyReview};
use miqat_core::ports::{
    AchievementRepository, JournalRepository, SessionLogRepository, SettingsRepository,
    StoreError, TaskBoardRepository, Versioned,
};
use miqat_core::{
    Achievement, AchievementSet, LogEntry, SessionConfig, SessionMode, StoreChange, TaskBoard,
};

use super::document_store::{serialization_error, SqliteDocumentStore};

impl SettingsRepository for SqliteDocumentStore {
    fn load_settings(&self) -> Result<Option<SessionConfig>, StoreError> {
        self.load_document(StoreChange::Settings)?
            .map(|document| serde_json::from_value(document.body).map_err(serialization_error))
            .transpose()
    }

    fn save_settings(&self, settings: &SessionConfig) -> Result<(), StoreError> {
        let body = serde_json::to_value(settings).map_err(serialization_error)?;
        self.merge_document(StoreChange::Settings, body)
    }

    fn save_message_cursor(&self, cursor: usize) -> Result<(), StoreError> {
        self.merge_document(StoreChange::Settings, json!({ "message_cursor": cursor }))
    }
}

impl AchievementRepository for SqliteDocumentStore {
    fn load_achievements(&self) -> Result<Versioned<AchievementSet>, StoreError> {
        let Some(document) = self.load_document(StoreChange::Achievements)? else {
            return Ok(Versioned::default());
        };

        let ids: Vec<String> = serde_json::from_value(document.body).map_err(serialization_error)?;
        let value = ids
            .iter()
            .filter_map(|id| {
                let achievement = Achievement::from_id(id);
                if achievement.is_none() {
                    tracing::warn!(id = %id, "ignoring unknown stored achievement");
                }
                achievement
            })
            .collect();

        Ok(Versioned {
            value,
            version: document.version,
        })
    }

    fn store_achievements_if_unchanged(
        &self,
        achievements: &AchievementSet,
        expected_version: u64,
    ) -> Result<bool, StoreError> {
        let body = serde_json::to_value(achievements).map_err(serialization_error)?;
        self.put_document(StoreChange::Achievements, &body, Some(expected_version))
    }
}

impl SessionLogRepository for SqliteDocumentStore {
    fn append(&self, entry: &LogEntry) -> Result<(), StoreError> {
        let body = serde_json::to_value(entry).map_err(serialization_error)?;
        self.append_entry(StoreChange::Log, &body, entry.completed_at)
    }

    fn count_by_kind(&self, kind: SessionMode) -> Result<u32, StoreError> {
        let entries = self.find_since(DateTime::<Utc>::MIN_UTC)?;
        Ok(entries.iter().filter(|entry| entry.kind == kind).count() as u32)
    }

    fn find_since(&self, since: DateTime<Utc>) -> Result<Vec<LogEntry>, StoreError> {
        self.list_entries(StoreChange::Log, Some(since))?
            .into_iter()
            .map(decode_log_entry)
            .collect()
    }
}

/// Accepts the legacy mode names older clients wrote (`pomodoro`, `shortBreak`).
fn decode_log_entry(mut body: Value) -> Result<LogEntry, StoreError> {
    if let Some(kind) = body.get("kind").and_then(Value::as_str) {
        if let Some(mode) = SessionMode::from_stored(kind) {
            body["kind"] = Value::String(mode.as_str().to_string());
        }
    }
    serde_json::from_value(body).map_err(serialization_error)
}

impl TaskBoardRepository for SqliteDocumentStore {
    fn load_board(&self) -> Result<TaskBoard, StoreError> {
        match self.load_document(StoreChange::Tasks)? {
            Some(document) => serde_json::from_value(document.body).map_err(serialization_error),
            None => Ok(TaskBoard::default()),
        }
    }

    fn save_board(&self, board: &TaskBoard) -> Result<(), StoreError> {
        let body = serde_json::to_value(board).map_err(serialization_error)?;
        self.put_document(StoreChange::Tasks, &body, None)?;
        Ok(())
    }
}

impl JournalRepository for SqliteDocumentStore {
    fn append_completed_task(&self, record: &CompletedTaskRecord) -> Result<(), StoreError> {
        let body = serde_json::to_value(record).map_err(serialization_error)?;
        self.append_entry(StoreChange::CompletedTasks, &body, record.completed_at)
    }

    fn append_daily_review(&self, review: &DailyReview) -> Result<(), StoreError> {
        let body = serde_json::to_value(review).map_err(serialization_error)?;
        self.append_entry(StoreChange::DailyReviews, &body, review.written_at)
    }

    fn list_daily_reviews(&self) -> Result<Vec<DailyReview>, StoreError> {
        let mut reviews = self
            .list_entries(StoreChange::DailyReviews, None)?
            .into_iter()
            .map(|body| serde_json::from_value(body).map_err(serialization_error))
            .collect::<Result<Vec<DailyReview>, _>>()?;
        reviews.reverse();
        Ok(reviews)
    }
}
