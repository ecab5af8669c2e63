use anyhow::{bail, Context, Result};
use dialoguer::{Confirm, Input, Select};
use miqat_core::{Config, NotificationUrgency};
use serde::Serialize;
use std::fs;
use std::path::Path;

const URGENCIES: [(NotificationUrgency, &str); 3] = [
    (NotificationUrgency::Low, "low"),
    (NotificationUrgency::Normal, "normal"),
    (NotificationUrgency::Critical, "critical"),
];

#[derive(Debug, Serialize)]
struct InitFile {
    notifications: NotificationsSection,
    services: ServicesSection,
}

#[derive(Debug, Serialize)]
struct NotificationsSection {
    sound_enabled: bool,
    urgency: &'static str,
}

#[derive(Debug, Serialize)]
struct ServicesSection {
    quote_edition: String,
}

pub fn execute(force: bool) -> Result<()> {
    let config_path = Config::config_path();

    if config_path.exists() && !force {
        bail!(
            "configuration already exists: {}\nUse --force to overwrite it.",
            config_path.display()
        );
    }

    if force && config_path.exists() {
        println!("⚠️  Overwriting the existing configuration.\n");
    }

    println!("Welcome to Miqat! Let's set up notifications.\n");

    let file = prompt_configuration()?;
    write_config(&config_path, &file)?;

    println!("\n✅ Configuration saved: {}", config_path.display());
    println!("Set your location for prayer-aware sessions:");
    println!("   miqat settings set city <city>");
    println!("   miqat settings set country <country>");
    println!("   miqat settings set salah on");

    Ok(())
}

fn prompt_configuration() -> Result<InitFile> {
    let sound_enabled = Confirm::new()
        .with_prompt("Play a sound when a session ends?")
        .default(true)
        .interact()?;

    let labels: Vec<&str> = URGENCIES.iter().map(|(_, label)| *label).collect();
    let selected = Select::new()
        .with_prompt("Notification urgency")
        .items(&labels)
        .default(1)
        .interact()?;

    let quote_edition: String = Input::new()
        .with_prompt("Verse translation edition")
        .default(Config::default().services.quote_edition)
        .interact_text()?;

    Ok(InitFile {
        notifications: NotificationsSection {
            sound_enabled,
            urgency: URGENCIES[selected].1,
        },
        services: ServicesSection { quote_edition },
    })
}

fn write_config(path: &Path, file: &InitFile) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create the configuration directory")?;
    }

    let content = toml::to_string(file).context("failed to render the configuration")?;
    fs::write(path, content).context("failed to write the configuration file")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn written_file_loads_back_as_config() {
        let path = std::env::temp_dir()
            .join(format!("miqat-init-{}", uuid::Uuid::new_v4()))
            .join("config.toml");
        let file = InitFile {
            notifications: NotificationsSection {
                sound_enabled: false,
                urgency: "critical",
            },
            services: ServicesSection {
                quote_edition: "fr.hamidullah".to_string(),
            },
        };

        write_config(&path, &file).unwrap();
        let config: Config = toml::from_str(&fs::read_to_string(&path).unwrap()).unwrap();

        assert!(!config.notifications.sound_enabled);
        assert_eq!(config.notifications.urgency, NotificationUrgency::Critical);
        assert_eq!(config.services.quote_edition, "fr.hamidullah");
        assert_eq!(config.services.quotes_url, "https://api.alquran.cloud");

        let _ = fs::remove_dir_all(path.parent().unwrap());
    }
}
