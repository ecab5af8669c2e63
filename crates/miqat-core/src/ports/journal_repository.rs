use crate::domain::{CompletedTaskRecord, DailyReview};

use super::StoreError;

pub trait JournalRepository: Send + Sync {
    fn append_completed_task(&self, record: &CompletedTaskRecord) -> Result<(), StoreError>;

    fn append_daily_review(&self, review: &DailyReview) -> Result<(), StoreError>;

    /// Newest first.
    fn list_daily_reviews(&self) -> Result<Vec<DailyReview>, StoreError>;
}
