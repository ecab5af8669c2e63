use anyhow::{bail, Result};
use dialoguer::Password;
use miqat_core::domain::{MessageOrder, MessageSource};
use miqat_protocol::{Request, Response, SessionConfig, SettingKey};

use super::{print_unlocked, send, unexpected};

pub async fn show() -> Result<()> {
    let (settings, journal_locked) = match send(Request::GetSettings).await? {
        Response::Settings {
            settings,
            journal_locked,
        } => (settings, journal_locked),
        other => return Err(unexpected(other)),
    };

    for key in SettingKey::all() {
        println!("{:<18} {}", key, value_of(&settings, *key, journal_locked));
    }
    Ok(())
}

pub async fn set(key: SettingKey, value: Option<String>) -> Result<()> {
    let value = match (key, value) {
        (_, Some(value)) => value,
        (SettingKey::JournalPassword, None) => Password::new()
            .with_prompt("New journal password (empty removes the lock)")
            .with_confirmation("Repeat password", "Passwords do not match")
            .allow_empty_password(true)
            .interact()?,
        (key, None) => bail!("a value is required for {}", key),
    };

    let response = send(Request::UpdateSetting { key, value }).await?;
    println!("✅ {} updated", key);
    print_unlocked(response)
}

fn value_of(settings: &SessionConfig, key: SettingKey, journal_locked: bool) -> String {
    match key {
        SettingKey::WorkMinutes => format!("{} min", settings.work_minutes),
        SettingKey::ShortBreakMinutes => format!("{} min", settings.short_break_minutes),
        SettingKey::LongBreakMinutes => format!("{} min", settings.long_break_minutes),
        SettingKey::BufferMinutes => format!("{} min", settings.buffer_minutes),
        SettingKey::SalahAwareness => on_off(settings.salah_awareness),
        SettingKey::ShowEndSessionMessage => on_off(settings.show_end_session_message),
        SettingKey::LogTaskCompletions => on_off(settings.log_task_completions),
        SettingKey::City => or_unset(&settings.city),
        SettingKey::Country => or_unset(&settings.country),
        SettingKey::Method => settings.method.code(),
        SettingKey::MessageSource => match settings.message_source {
            MessageSource::Verse => "verse".to_string(),
            MessageSource::Custom => "custom".to_string(),
        },
        SettingKey::MessageOrder => match settings.message_order {
            MessageOrder::Random => "random".to_string(),
            MessageOrder::Sequential => "sequential".to_string(),
        },
        SettingKey::CustomMessages => or_unset(&settings.custom_messages.join(" | ")),
        SettingKey::JournalPassword => {
            if journal_locked { "set" } else { "not set" }.to_string()
        }
    }
}

fn on_off(flag: bool) -> String {
    if flag { "on" } else { "off" }.to_string()
}

fn or_unset(value: &str) -> String {
    if value.is_empty() {
        "(unset)".to_string()
    } else {
        value.to_string()
    }
}
