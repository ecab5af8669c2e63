//! Miqat core library
//!
//! Domain types, decision functions and port definitions (traits) for the
//! Miqat focus timer. This crate performs no network or database I/O.

pub mod config;
pub mod domain;
pub mod identity;
pub mod journal_lock;
pub mod ledger;
pub mod ports;

pub use config::{Config, ConfigError, NotificationConfig, NotificationUrgency, ServicesConfig};
pub use domain::{
    Achievement, AchievementSet, EndMessage, GateOutcome, LogEntry, PrayerName, Quadrant,
    SessionConfig, SessionMachine, SessionMode, SettingKey, StoreChange, Task, TaskBoard, Verse,
};
pub use identity::{AppState, IdentityError};
pub use journal_lock::{JournalAccess, JournalLockError};
pub use ledger::AchievementLedger;
pub use ports::{GatewayError, StoreError};
