use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::Value;
use tokio::sync::broadcast;
use uuid::Uuid;

use miqat_core::ports::StoreError;
use miqat_core::StoreChange;

const CHANGE_FEED_CAPACITY: usize = 64;
const MERGE_ATTEMPTS: u32 = 5;

/// Per-user document store: whole JSON documents with a version counter, plus
/// append-only entry collections. Every successful write is announced on the
/// change feed.
pub struct SqliteDocumentStore {
    connection: Mutex<Connection>,
    user_id: String,
    changes: broadcast::Sender<StoreChange>,
}

pub(super) struct StoredDocument {
    pub body: Value,
    pub version: u64,
}

impl SqliteDocumentStore {
    pub fn new(path: &Path, user_id: Uuid) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|error| StoreError::Storage {
                message: error.to_string(),
            })?;
        }
        let connection = Connection::open(path).map_err(storage_error)?;
        Self::with_connection(connection, user_id)
    }

    pub fn in_memory(user_id: Uuid) -> Result<Self, StoreError> {
        let connection = Connection::open_in_memory().map_err(storage_error)?;
        Self::with_connection(connection, user_id)
    }

    fn with_connection(connection: Connection, user_id: Uuid) -> Result<Self, StoreError> {
        let (changes, _) = broadcast::channel(CHANGE_FEED_CAPACITY);
        let store = Self {
            connection: Mutex::new(connection),
            user_id: user_id.to_string(),
            changes,
        };
        store.initialize_schema()?;
        Ok(store)
    }

    fn initialize_schema(&self) -> Result<(), StoreError> {
        let connection = self.connection.lock().unwrap();
        connection
            .execute_batch(
                "CREATE TABLE IF NOT EXISTS documents (
                    user_id TEXT NOT NULL,
                    category TEXT NOT NULL,
                    body TEXT NOT NULL,
                    version INTEGER NOT NULL,
                    PRIMARY KEY (user_id, category)
                );
                CREATE TABLE IF NOT EXISTS entries (
                    id INTEGER PRIMARY KEY,
                    user_id TEXT NOT NULL,
                    collection TEXT NOT NULL,
                    body TEXT NOT NULL,
                    created_at TEXT NOT NULL
                );
                CREATE INDEX IF NOT EXISTS idx_entries_user_collection
                    ON entries (user_id, collection, created_at);",
            )
            .map_err(storage_error)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StoreChange> {
        self.changes.subscribe()
    }

    pub(super) fn notify(&self, change: StoreChange) {
        // No subscriber is not an error.
        let _ = self.changes.send(change);
    }

    pub(super) fn load_document(
        &self,
        change: StoreChange,
    ) -> Result<Option<StoredDocument>, StoreError> {
        let connection = self.connection.lock().unwrap();

        let row: Option<(String, i64)> = connection
            .query_row(
                "SELECT body, version FROM documents WHERE user_id = ?1 AND category = ?2",
                params![self.user_id, change.category()],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()
            .map_err(storage_error)?;

        row.map(|(body, version)| {
            Ok(StoredDocument {
                body: serde_json::from_str(&body).map_err(serialization_error)?,
                version: version as u64,
            })
        })
        .transpose()
    }

    /// Replaces the whole document. With `expected_version`, the write only
    /// happens if the stored version still matches (0 meaning absent).
    pub(super) fn put_document(
        &self,
        change: StoreChange,
        body: &Value,
        expected_version: Option<u64>,
    ) -> Result<bool, StoreError> {
        let serialized = serde_json::to_string(body).map_err(serialization_error)?;

        {
            let connection = self.connection.lock().unwrap();
            let current: u64 = connection
                .query_row(
                    "SELECT version FROM documents WHERE user_id = ?1 AND category = ?2",
                    params![self.user_id, change.category()],
                    |row| row.get::<_, i64>(0),
                )
                .optional()
                .map_err(storage_error)?
                .unwrap_or(0) as u64;

            if expected_version.is_some_and(|expected| expected != current) {
                return Ok(false);
            }

            connection
                .execute(
                    "INSERT INTO documents (user_id, category, body, version)
                     VALUES (?1, ?2, ?3, ?4)
                     ON CONFLICT (user_id, category)
                     DO UPDATE SET body = excluded.body, version = excluded.version",
                    params![self.user_id, change.category(), serialized, (current + 1) as i64],
                )
                .map_err(storage_error)?;
        }

        self.notify(change);
        Ok(true)
    }

    /// Upsert with merge on top-level object keys.
    pub(super) fn merge_document(
        &self,
        change: StoreChange,
        patch: Value,
    ) -> Result<(), StoreError> {
        for _ in 0..MERGE_ATTEMPTS {
            let (merged, version) = match (self.load_document(change)?, patch.clone()) {
                (
                    Some(StoredDocument {
                        body: Value::Object(mut stored),
                        version,
                    }),
                    Value::Object(fields),
                ) => {
                    stored.extend(fields);
                    (Value::Object(stored), version)
                }
                (stored, patch) => (patch, stored.map_or(0, |document| document.version)),
            };

            if self.put_document(change, &merged, Some(version))? {
                return Ok(());
            }
        }

        Err(StoreError::Conflict {
            category: change.category().to_string(),
            attempts: MERGE_ATTEMPTS,
        })
    }

    pub(super) fn append_entry(
        &self,
        change: StoreChange,
        body: &Value,
        created_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let serialized = serde_json::to_string(body).map_err(serialization_error)?;

        self.connection
            .lock()
            .unwrap()
            .execute(
                "INSERT INTO entries (user_id, collection, body, created_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![self.user_id, change.category(), serialized, created_at.to_rfc3339()],
            )
            .map_err(storage_error)?;

        self.notify(change);
        Ok(())
    }

    /// Entries of a collection, oldest first, optionally from `since` on.
    pub(super) fn list_entries(
        &self,
        change: StoreChange,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<Value>, StoreError> {
        let connection = self.connection.lock().unwrap();
        let since = since
            .map(|at| at.to_rfc3339())
            .unwrap_or_default();

        let mut statement = connection
            .prepare(
                "SELECT body FROM entries
                 WHERE user_id = ?1 AND collection = ?2 AND created_at >= ?3
                 ORDER BY created_at ASC, id ASC",
            )
            .map_err(storage_error)?;

        let bodies = statement
            .query_map(params![self.user_id, change.category(), since], |row| {
                row.get::<_, String>(0)
            })
            .map_err(storage_error)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(storage_error)?;

        bodies
            .iter()
            .map(|body| serde_json::from_str(body).map_err(serialization_error))
            .collect()
    }
}

pub(super) fn storage_error(error: rusqlite::Error) -> StoreError {
    StoreError::Storage {
        message: error.to_string(),
    }
}

pub(super) fn serialization_error(error: serde_json::Error) -> StoreError {
    StoreError::Serialization {
        message: error.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn store() -> SqliteDocumentStore {
        SqliteDocumentStore::in_memory(Uuid::new_v4()).unwrap()
    }

    #[test]
    fn missing_document_loads_as_none() {
        let store = store();

        assert!(store.load_document(StoreChange::Settings).unwrap().is_none());
    }

    #[test]
    fn merge_keeps_untouched_keys_and_bumps_version() {
        let store = store();

        store
            .merge_document(StoreChange::Settings, json!({"a": 1, "b": 2}))
            .unwrap();
        store
            .merge_document(StoreChange::Settings, json!({"b": 3, "c": 4}))
            .unwrap();

        let document = store.load_document(StoreChange::Settings).unwrap().unwrap();
        assert_eq!(document.body, json!({"a": 1, "b": 3, "c": 4}));
        assert_eq!(document.version, 2);
    }

    #[test]
    fn conditional_put_rejects_stale_version() {
        let store = store();

        assert!(store
            .put_document(StoreChange::Achievements, &json!(["first"]), Some(0))
            .unwrap());
        assert!(!store
            .put_document(StoreChange::Achievements, &json!([]), Some(0))
            .unwrap());
        assert!(store
            .put_document(StoreChange::Achievements, &json!(["first", "tenth"]), Some(1))
            .unwrap());

        let document = store.load_document(StoreChange::Achievements).unwrap().unwrap();
        assert_eq!(document.body, json!(["first", "tenth"]));
    }

    #[test]
    fn users_do_not_see_each_other() {
        let path = std::env::temp_dir().join(format!("miqat-store-{}.db", Uuid::new_v4()));
        let alice = SqliteDocumentStore::new(&path, Uuid::new_v4()).unwrap();
        let bob = SqliteDocumentStore::new(&path, Uuid::new_v4()).unwrap();

        alice
            .merge_document(StoreChange::Settings, json!({"work_minutes": 50}))
            .unwrap();
        alice
            .append_entry(StoreChange::Log, &json!({"n": 1}), Utc::now())
            .unwrap();

        assert!(bob.load_document(StoreChange::Settings).unwrap().is_none());
        assert!(bob.list_entries(StoreChange::Log, None).unwrap().is_empty());
        assert_eq!(alice.list_entries(StoreChange::Log, None).unwrap().len(), 1);

        drop(alice);
        drop(bob);
        let _ = std::fs::remove_file(path);
    }

    #[tokio::test]
    async fn every_write_is_announced_once() {
        let store = store();
        let mut changes = store.subscribe();

        store
            .merge_document(StoreChange::Settings, json!({"a": 1}))
            .unwrap();
        store
            .append_entry(StoreChange::DailyReviews, &json!({}), Utc::now())
            .unwrap();
        store
            .put_document(StoreChange::Achievements, &json!([]), Some(7))
            .unwrap();

        assert_eq!(changes.recv().await.unwrap(), StoreChange::Settings);
        assert_eq!(changes.recv().await.unwrap(), StoreChange::DailyReviews);
        assert!(changes.try_recv().is_err());
    }
}
