mod achievement;
mod daily_review;
mod end_message;
mod log_entry;
mod micro_timer;
mod prayer;
mod session_machine;
mod session_mode;
mod settings;
mod store_change;
mod task;

pub use achievement::{
    evaluate as evaluate_achievements, Achievement, AchievementDescriptor, AchievementFacts,
    AchievementSet, BreakHistoryFacts, WorkSessionFacts,
};
pub use daily_review::DailyReview;
pub use end_message::{
    pick as pick_end_message, EndMessage, MessagePick, Verse, FIRST_VERSE, LAST_VERSE,
};
pub use log_entry::{LogEntry, LogSummary};
pub use micro_timer::{MicroTick, MicroTimer, MICRO_TIMER_SECONDS};
pub use prayer::{
    decide as decide_gate, requires_lookup as gate_requires_lookup, CalculationMethod,
    GateOutcome, InvalidCalculationMethod, PrayerLocation, PrayerName, PrayerTime,
    PrayerTimetable, TimetableError,
};
pub use session_machine::{
    SessionCommandError, SessionCompletion, SessionEffect, SessionMachine, SessionSnapshot,
    TickOutcome,
};
pub use session_mode::SessionMode;
pub use settings::{MessageOrder, MessageSource, SessionConfig, SettingKey, SettingsError};
pub use store_change::StoreChange;
pub use task::{CompletedTaskRecord, Quadrant, Task, TaskBoard, TaskId, TaskToggle};
