use crate::domain::SessionConfig;

use super::StoreError;

pub trait SettingsRepository: Send + Sync {
    /// `None` when the user never saved settings.
    fn load_settings(&self) -> Result<Option<SessionConfig>, StoreError>;

    /// Upsert with merge: fields absent from the stored document are added,
    /// present ones are overwritten.
    fn save_settings(&self, settings: &SessionConfig) -> Result<(), StoreError>;

    fn save_message_cursor(&self, cursor: usize) -> Result<(), StoreError>;
}
