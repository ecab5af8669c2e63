use std::sync::Arc;

use chrono::{DateTime, Duration, Local, TimeZone, Utc};
use thiserror::Error;
use tracing::{debug, info};

use miqat_core::domain::{
    AchievementFacts, CompletedTaskRecord, DailyReview, LogSummary, SettingsError, Task, TaskId,
};
use miqat_core::ports::{
    JournalRepository, SessionLogRepository, SettingsRepository, StoreError, TaskBoardRepository,
};
use miqat_core::{
    AchievementLedger, AchievementSet, JournalAccess, JournalLockError, Quadrant, SessionConfig,
    SettingKey, TaskBoard,
};
use miqat_protocol::StatsReport;

#[derive(Error, Debug)]
pub enum BoardError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error(transparent)]
    Journal(#[from] JournalLockError),

    #[error("no task with id {0}")]
    TaskNotFound(TaskId),

    #[error("task text cannot be empty")]
    EmptyTask,
}

/// Everything outside the running countdown: task board, settings, journal
/// and statistics.
pub struct BoardService {
    tasks: Arc<dyn TaskBoardRepository>,
    settings: Arc<dyn SettingsRepository>,
    journal: Arc<dyn JournalRepository>,
    log: Arc<dyn SessionLogRepository>,
    ledger: Arc<AchievementLedger>,
}

impl BoardService {
    pub fn new(
        tasks: Arc<dyn TaskBoardRepository>,
        settings: Arc<dyn SettingsRepository>,
        journal: Arc<dyn JournalRepository>,
        log: Arc<dyn SessionLogRepository>,
        ledger: Arc<AchievementLedger>,
    ) -> Self {
        Self {
            tasks,
            settings,
            journal,
            log,
            ledger,
        }
    }

    pub fn settings(&self) -> Result<SessionConfig, BoardError> {
        Ok(self.settings.load_settings()?.unwrap_or_default())
    }

    pub fn update_setting(
        &self,
        key: SettingKey,
        value: &str,
    ) -> Result<AchievementSet, BoardError> {
        let mut settings = self.settings()?;
        settings.apply(key, value)?;
        self.settings.save_settings(&settings)?;
        info!(%key, "setting updated");

        Ok(self.ledger.grant(&AchievementFacts::SettingsSaved)?)
    }

    pub fn board(&self) -> Result<TaskBoard, BoardError> {
        Ok(self.tasks.load_board()?)
    }

    pub fn add_task(
        &self,
        text: &str,
        quadrant: Quadrant,
        intention: Option<String>,
    ) -> Result<AchievementSet, BoardError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(BoardError::EmptyTask);
        }

        let mut board = self.tasks.load_board()?;
        let id = board.add(Task::new(text, quadrant, intention));
        self.tasks.save_board(&board)?;
        debug!(%id, %quadrant, "task added");

        Ok(self.ledger.grant(&AchievementFacts::BoardComposition(&board))?)
    }

    pub fn toggle_task(&self, id: TaskId) -> Result<AchievementSet, BoardError> {
        let mut board = self.tasks.load_board()?;
        let toggle = board.toggle(id).ok_or(BoardError::TaskNotFound(id))?;
        self.tasks.save_board(&board)?;

        if !toggle.now_completed {
            return Ok(AchievementSet::new());
        }

        if self.settings()?.log_task_completions {
            self.journal
                .append_completed_task(&CompletedTaskRecord::from_task(&toggle.task, Utc::now()))?;
        }

        Ok(self.ledger.grant(&AchievementFacts::TaskCompletion(&board))?)
    }

    pub fn remove_task(&self, id: TaskId) -> Result<(), BoardError> {
        let mut board = self.tasks.load_board()?;
        board.remove(id).ok_or(BoardError::TaskNotFound(id))?;
        self.tasks.save_board(&board)?;
        Ok(())
    }

    pub fn achievements(&self) -> Result<AchievementSet, BoardError> {
        Ok(self.ledger.unlocked()?)
    }

    pub fn add_daily_review(
        &self,
        highlights: &str,
        improvements: &str,
        intention_for_tomorrow: Option<String>,
    ) -> Result<(), BoardError> {
        let review = DailyReview::write(
            highlights.trim(),
            improvements.trim(),
            intention_for_tomorrow,
        );
        self.journal.append_daily_review(&review)?;
        Ok(())
    }

    pub fn daily_reviews(&self, password: Option<&str>) -> Result<Vec<DailyReview>, BoardError> {
        let settings = self.settings()?;
        JournalAccess::check(settings.journal_password_hash.as_deref(), password)?;
        Ok(self.journal.list_daily_reviews()?)
    }

    pub fn stats(&self, now: DateTime<Local>) -> Result<StatsReport, BoardError> {
        let lifetime = self.log.find_since(DateTime::<Utc>::MIN_UTC)?;
        let start_of_today = Local
            .from_local_datetime(&now.date_naive().and_hms_opt(0, 0, 0).unwrap_or_default())
            .earliest()
            .map(|midnight| midnight.with_timezone(&Utc))
            .unwrap_or_else(|| now.with_timezone(&Utc) - Duration::hours(24));
        let week_start = now.with_timezone(&Utc) - Duration::days(7);

        let since = |from: DateTime<Utc>| {
            let entries: Vec<_> = lifetime
                .iter()
                .filter(|entry| entry.completed_at >= from)
                .cloned()
                .collect();
            LogSummary::from_entries(&entries)
        };

        Ok(StatsReport {
            today: since(start_of_today),
            last_seven_days: since(week_start),
            lifetime: LogSummary::from_entries(&lifetime),
            completed_tasks_on_board: self.tasks.load_board()?.completed_count() as u32,
        })
    }
}
