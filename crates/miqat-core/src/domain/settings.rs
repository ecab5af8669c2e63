use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

use super::prayer::{CalculationMethod, PrayerLocation};
use super::SessionMode;
use crate::journal_lock;

const DURATION_RANGE: (u32, u32) = (1, 120);
const BUFFER_RANGE: (u32, u32) = (1, 60);

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SettingsError {
    #[error("unknown setting: {0}")]
    UnknownKey(String),

    #[error("{key} expects a number, got {value:?}")]
    InvalidNumber { key: SettingKey, value: String },

    #[error("{key} must be between {min} and {max}, got {value}")]
    OutOfRange {
        key: SettingKey,
        value: u32,
        min: u32,
        max: u32,
    },

    #[error("{key} does not accept {value:?}")]
    InvalidChoice { key: SettingKey, value: String },

    #[error("unable to hash journal password: {0}")]
    PasswordHash(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageSource {
    #[default]
    Verse,
    Custom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageOrder {
    Random,
    #[default]
    Sequential,
}

/// User-facing settings document. Decision functions only ever borrow it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub work_minutes: u32,
    pub short_break_minutes: u32,
    pub long_break_minutes: u32,
    pub salah_awareness: bool,
    pub buffer_minutes: u32,
    pub city: String,
    pub country: String,
    pub method: CalculationMethod,
    pub show_end_session_message: bool,
    pub message_source: MessageSource,
    pub message_order: MessageOrder,
    pub custom_messages: Vec<String>,
    pub message_cursor: usize,
    pub log_task_completions: bool,
    pub journal_password_hash: Option<String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            work_minutes: 25,
            short_break_minutes: 5,
            long_break_minutes: 15,
            salah_awareness: false,
            buffer_minutes: 5,
            city: String::new(),
            country: String::new(),
            method: CalculationMethod::default(),
            show_end_session_message: true,
            message_source: MessageSource::default(),
            message_order: MessageOrder::default(),
            custom_messages: Vec::new(),
            message_cursor: 0,
            log_task_completions: false,
            journal_password_hash: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SettingKey {
    WorkMinutes,
    ShortBreakMinutes,
    LongBreakMinutes,
    SalahAwareness,
    BufferMinutes,
    City,
    Country,
    Method,
    ShowEndSessionMessage,
    MessageSource,
    MessageOrder,
    CustomMessages,
    LogTaskCompletions,
    JournalPassword,
}

impl SettingKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SettingKey::WorkMinutes => "work",
            SettingKey::ShortBreakMinutes => "short-break",
            SettingKey::LongBreakMinutes => "long-break",
            SettingKey::SalahAwareness => "salah",
            SettingKey::BufferMinutes => "buffer",
            SettingKey::City => "city",
            SettingKey::Country => "country",
            SettingKey::Method => "method",
            SettingKey::ShowEndSessionMessage => "show-message",
            SettingKey::MessageSource => "message-source",
            SettingKey::MessageOrder => "message-order",
            SettingKey::CustomMessages => "messages",
            SettingKey::LogTaskCompletions => "log-tasks",
            SettingKey::JournalPassword => "journal-password",
        }
    }

    pub fn all() -> &'static [SettingKey] {
        &[
            SettingKey::WorkMinutes,
            SettingKey::ShortBreakMinutes,
            SettingKey::LongBreakMinutes,
            SettingKey::SalahAwareness,
            SettingKey::BufferMinutes,
            SettingKey::City,
            SettingKey::Country,
            SettingKey::Method,
            SettingKey::ShowEndSessionMessage,
            SettingKey::MessageSource,
            SettingKey::MessageOrder,
            SettingKey::CustomMessages,
            SettingKey::LogTaskCompletions,
            SettingKey::JournalPassword,
        ]
    }
}

impl std::fmt::Display for SettingKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SettingKey {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowercase = s.trim().to_lowercase();
        SettingKey::all()
            .iter()
            .copied()
            .find(|key| key.as_str() == lowercase)
            .ok_or(SettingsError::UnknownKey(lowercase))
    }
}

impl SessionConfig {
    pub fn duration_minutes(&self, mode: SessionMode) -> u32 {
        match mode {
            SessionMode::Work => self.work_minutes,
            SessionMode::ShortBreak => self.short_break_minutes,
            SessionMode::LongBreak => self.long_break_minutes,
        }
    }

    pub fn duration_seconds(&self, mode: SessionMode) -> u64 {
        u64::from(self.duration_minutes(mode)) * 60
    }

    pub fn location(&self) -> Option<PrayerLocation> {
        let city = self.city.trim();
        let country = self.country.trim();

        if city.is_empty() || country.is_empty() {
            return None;
        }

        Some(PrayerLocation {
            city: city.to_string(),
            country: country.to_string(),
            method: self.method,
        })
    }

    pub fn is_journal_locked(&self) -> bool {
        self.journal_password_hash.is_some()
    }

    /// Applies one raw value. On error the previous value is left untouched.
    pub fn apply(&mut self, key: SettingKey, raw: &str) -> Result<(), SettingsError> {
        let value = raw.trim();

        match key {
            SettingKey::WorkMinutes => {
                self.work_minutes = parse_bounded(key, value, DURATION_RANGE)?;
            }
            SettingKey::ShortBreakMinutes => {
                self.short_break_minutes = parse_bounded(key, value, DURATION_RANGE)?;
            }
            SettingKey::LongBreakMinutes => {
                self.long_break_minutes = parse_bounded(key, value, DURATION_RANGE)?;
            }
            SettingKey::BufferMinutes => {
                self.buffer_minutes = parse_bounded(key, value, BUFFER_RANGE)?;
            }
            SettingKey::SalahAwareness => {
                self.salah_awareness = parse_flag(key, value)?;
            }
            SettingKey::ShowEndSessionMessage => {
                self.show_end_session_message = parse_flag(key, value)?;
            }
            SettingKey::LogTaskCompletions => {
                self.log_task_completions = parse_flag(key, value)?;
            }
            SettingKey::City => self.city = value.to_string(),
            SettingKey::Country => self.country = value.to_string(),
            SettingKey::Method => {
                self.method = value
                    .parse()
                    .map_err(|_| SettingsError::InvalidChoice {
                        key,
                        value: value.to_string(),
                    })?;
            }
            SettingKey::MessageSource => {
                self.message_source = match value.to_lowercase().as_str() {
                    "verse" | "quran" | "external" => MessageSource::Verse,
                    "custom" => MessageSource::Custom,
                    _ => {
                        return Err(SettingsError::InvalidChoice {
                            key,
                            value: value.to_string(),
                        })
                    }
                };
            }
            SettingKey::MessageOrder => {
                self.message_order = match value.to_lowercase().as_str() {
                    "random" => MessageOrder::Random,
                    "sequential" => MessageOrder::Sequential,
                    _ => {
                        return Err(SettingsError::InvalidChoice {
                            key,
                            value: value.to_string(),
                        })
                    }
                };
            }
            SettingKey::CustomMessages => {
                self.custom_messages = value
                    .split('|')
                    .map(str::trim)
                    .filter(|message| !message.is_empty())
                    .map(String::from)
                    .collect();
                self.message_cursor = 0;
            }
            SettingKey::JournalPassword => {
                self.journal_password_hash = if value.is_empty() {
                    None
                } else {
                    Some(
                        journal_lock::hash_password(value)
                            .map_err(|error| SettingsError::PasswordHash(error.to_string()))?,
                    )
                };
            }
        }

        Ok(())
    }
}

fn parse_bounded(
    key: SettingKey,
    value: &str,
    (min, max): (u32, u32),
) -> Result<u32, SettingsError> {
    let parsed: u32 = value.parse().map_err(|_| SettingsError::InvalidNumber {
        key,
        value: value.to_string(),
    })?;

    if parsed < min || parsed > max {
        return Err(SettingsError::OutOfRange {
            key,
            value: parsed,
            min,
            max,
        });
    }

    Ok(parsed)
}

fn parse_flag(key: SettingKey, value: &str) -> Result<bool, SettingsError> {
    match value.to_lowercase().as_str() {
        "true" | "on" | "yes" | "1" => Ok(true),
        "false" | "off" | "no" | "0" => Ok(false),
        _ => Err(SettingsError::InvalidChoice {
            key,
            value: value.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settings_match_classic_pomodoro() {
        let config = SessionConfig::default();

        assert_eq!(config.duration_minutes(SessionMode::Work), 25);
        assert_eq!(config.duration_minutes(SessionMode::ShortBreak), 5);
        assert_eq!(config.duration_minutes(SessionMode::LongBreak), 15);
        assert_eq!(config.duration_seconds(SessionMode::Work), 1500);
        assert_eq!(config.buffer_minutes, 5);
        assert!(!config.salah_awareness);
        assert!(config.show_end_session_message);
        assert_eq!(config.message_source, MessageSource::Verse);
        assert_eq!(config.message_order, MessageOrder::Sequential);
        assert!(config.location().is_none());
    }

    #[test]
    fn apply_updates_duration() {
        let mut config = SessionConfig::default();

        config.apply(SettingKey::WorkMinutes, "50").unwrap();

        assert_eq!(config.work_minutes, 50);
    }

    #[test]
    fn non_numeric_duration_keeps_previous_value() {
        let mut config = SessionConfig::default();

        let result = config.apply(SettingKey::WorkMinutes, "half an hour");

        assert!(matches!(result, Err(SettingsError::InvalidNumber { .. })));
        assert_eq!(config.work_minutes, 25);
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        let mut config = SessionConfig::default();

        assert!(matches!(
            config.apply(SettingKey::LongBreakMinutes, "121"),
            Err(SettingsError::OutOfRange { max: 120, .. })
        ));
        assert!(matches!(
            config.apply(SettingKey::BufferMinutes, "0"),
            Err(SettingsError::OutOfRange { min: 1, .. })
        ));
        assert_eq!(config.long_break_minutes, 15);
        assert_eq!(config.buffer_minutes, 5);
    }

    #[test]
    fn location_requires_city_and_country() {
        let mut config = SessionConfig::default();

        config.apply(SettingKey::City, "Cairo").unwrap();
        assert!(config.location().is_none());

        config.apply(SettingKey::Country, "Egypt").unwrap();
        config.apply(SettingKey::Method, "5").unwrap();

        let location = config.location().unwrap();
        assert_eq!(location.city, "Cairo");
        assert_eq!(location.country, "Egypt");
        assert_eq!(location.method.code(), "5");
    }

    #[test]
    fn invalid_method_is_rejected() {
        let mut config = SessionConfig::default();

        assert!(config.apply(SettingKey::Method, "15").is_err());
        assert!(config.apply(SettingKey::Method, "isna").is_err());
    }

    #[test]
    fn custom_messages_split_on_pipe_and_reset_cursor() {
        let mut config = SessionConfig {
            message_cursor: 3,
            ..Default::default()
        };

        config
            .apply(SettingKey::CustomMessages, "Drink water | Stretch || Breathe")
            .unwrap();

        assert_eq!(
            config.custom_messages,
            vec!["Drink water", "Stretch", "Breathe"]
        );
        assert_eq!(config.message_cursor, 0);
    }

    #[test]
    fn flags_accept_common_spellings() {
        let mut config = SessionConfig::default();

        config.apply(SettingKey::SalahAwareness, "on").unwrap();
        config.apply(SettingKey::ShowEndSessionMessage, "no").unwrap();

        assert!(config.salah_awareness);
        assert!(!config.show_end_session_message);
        assert!(config.apply(SettingKey::LogTaskCompletions, "maybe").is_err());
    }

    #[test]
    fn journal_password_is_stored_as_hash() {
        let mut config = SessionConfig::default();

        config.apply(SettingKey::JournalPassword, "s3cret").unwrap();

        let hash = config.journal_password_hash.clone().unwrap();
        assert_ne!(hash, "s3cret");
        assert!(journal_lock::verify_password("s3cret", &hash).unwrap());

        config.apply(SettingKey::JournalPassword, "").unwrap();
        assert!(!config.is_journal_locked());
    }

    #[test]
    fn setting_key_parses_cli_names() {
        assert_eq!("work".parse::<SettingKey>().unwrap(), SettingKey::WorkMinutes);
        assert_eq!(
            "Message-Order".parse::<SettingKey>().unwrap(),
            SettingKey::MessageOrder
        );
        assert!("volume".parse::<SettingKey>().is_err());
    }

    #[test]
    fn partial_document_deserializes_with_defaults() {
        let config: SessionConfig =
            serde_json::from_str(r#"{"work_minutes": 40, "salah_awareness": true}"#).unwrap();

        assert_eq!(config.work_minutes, 40);
        assert!(config.salah_awareness);
        assert_eq!(config.short_break_minutes, 5);
    }
}
