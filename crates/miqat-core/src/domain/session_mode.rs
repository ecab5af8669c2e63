use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SessionMode {
    Work,
    ShortBreak,
    LongBreak,
}

impl SessionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionMode::Work => "work",
            SessionMode::ShortBreak => "short-break",
            SessionMode::LongBreak => "long-break",
        }
    }

    pub fn from_stored(value: &str) -> Option<Self> {
        match value {
            "work" | "pomodoro" => Some(SessionMode::Work),
            "short-break" | "shortBreak" => Some(SessionMode::ShortBreak),
            "long-break" | "longBreak" => Some(SessionMode::LongBreak),
            _ => None,
        }
    }

    pub fn is_break(&self) -> bool {
        !matches!(self, SessionMode::Work)
    }

    pub fn all() -> &'static [SessionMode] {
        &[
            SessionMode::Work,
            SessionMode::ShortBreak,
            SessionMode::LongBreak,
        ]
    }
}

impl std::fmt::Display for SessionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_mode_roundtrip_for_all_variants() {
        for mode in SessionMode::all() {
            let stored = mode.as_str();
            assert_eq!(SessionMode::from_stored(stored), Some(*mode));
        }
    }

    #[test]
    fn camel_case_names_are_accepted() {
        assert_eq!(
            SessionMode::from_stored("shortBreak"),
            Some(SessionMode::ShortBreak)
        );
        assert_eq!(
            SessionMode::from_stored("longBreak"),
            Some(SessionMode::LongBreak)
        );
        assert_eq!(SessionMode::from_stored("pomodoro"), Some(SessionMode::Work));
    }

    #[test]
    fn unknown_value_is_rejected() {
        assert_eq!(SessionMode::from_stored("nap"), None);
    }

    #[test]
    fn only_work_is_not_a_break() {
        assert!(!SessionMode::Work.is_break());
        assert!(SessionMode::ShortBreak.is_break());
        assert!(SessionMode::LongBreak.is_break());
    }
}
