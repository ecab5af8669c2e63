use serde::{Deserialize, Serialize};

/// Category touched by a successful store write, as seen by subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StoreChange {
    Settings,
    Achievements,
    Tasks,
    Log,
    DailyReviews,
    CompletedTasks,
}

impl StoreChange {
    pub fn category(&self) -> &'static str {
        match self {
            StoreChange::Settings => "settings",
            StoreChange::Achievements => "achievements",
            StoreChange::Tasks => "eisenhower-tasks",
            StoreChange::Log => "log",
            StoreChange::DailyReviews => "daily-reviews",
            StoreChange::CompletedTasks => "completed-tasks",
        }
    }
}
