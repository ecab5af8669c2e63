use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyReview {
    pub written_at: DateTime<Utc>,
    pub highlights: String,
    pub improvements: String,
    #[serde(default)]
    pub intention_for_tomorrow: Option<String>,
}

impl DailyReview {
    pub fn write(
        highlights: impl Into<String>,
        improvements: impl Into<String>,
        intention_for_tomorrow: Option<String>,
    ) -> Self {
        Self {
            written_at: Utc::now(),
            highlights: highlights.into(),
            improvements: improvements.into(),
            intention_for_tomorrow: intention_for_tomorrow
                .filter(|value| !value.trim().is_empty()),
        }
    }
}
