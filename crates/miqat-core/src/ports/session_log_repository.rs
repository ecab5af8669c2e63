use chrono::{DateTime, Utc};

use crate::domain::{LogEntry, SessionMode};

use super::StoreError;

pub trait SessionLogRepository: Send + Sync {
    fn append(&self, entry: &LogEntry) -> Result<(), StoreError>;

    fn count_by_kind(&self, kind: SessionMode) -> Result<u32, StoreError>;

    fn find_since(&self, since: DateTime<Utc>) -> Result<Vec<LogEntry>, StoreError>;
}
