mod achievement_repository;
mod journal_repository;
mod prayer_times_gateway;
mod quote_gateway;
mod session_log_repository;
mod settings_repository;
mod store_error;
mod task_board_repository;

pub use achievement_repository::{AchievementRepository, Versioned};
pub use journal_repository::JournalRepository;
pub use prayer_times_gateway::PrayerTimesGateway;
pub use quote_gateway::{GatewayError, QuoteGateway};
pub use session_log_repository::SessionLogRepository;
pub use settings_repository::SettingsRepository;
pub use store_error::StoreError;
pub use task_board_repository::TaskBoardRepository;
