mod client;
mod commands;
mod daemon_launcher;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use miqat_protocol::{Quadrant, SessionMode, SettingKey};

#[derive(Parser)]
#[command(name = "miqat", version)]
#[command(about = "Miqat - a focus timer that keeps prayer times in mind", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start or resume a session (current mode by default)
    Start {
        #[arg(value_enum)]
        mode: Option<ModeArg>,
        /// Accept a shortened session without asking
        #[arg(short, long)]
        yes: bool,
    },
    /// Pause the running session
    Pause,
    /// Restore the full duration of the current mode
    Reset,
    /// Switch the idle timer to another mode
    Mode {
        #[arg(value_enum)]
        mode: ModeArg,
    },
    /// Show the timer state
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Two-minute countdown for small chores
    Micro {
        #[command(subcommand)]
        action: MicroAction,
    },
    /// Eisenhower task board
    Tasks {
        #[command(subcommand)]
        action: Option<TaskAction>,
    },
    /// List every achievement and whether it is unlocked
    Achievements,
    /// Session totals for today, the last 7 days and all time
    Stats,
    /// Show or change session settings
    Settings {
        #[command(subcommand)]
        action: Option<SettingsAction>,
    },
    /// Daily review journal
    Review {
        #[command(subcommand)]
        action: ReviewAction,
    },
    /// Write the machine configuration file interactively
    Init {
        /// Overwrite an existing configuration
        #[arg(long)]
        force: bool,
    },
}

#[derive(Subcommand)]
enum MicroAction {
    Start,
    Cancel,
}

#[derive(Subcommand)]
enum TaskAction {
    List,
    Add {
        text: String,
        /// q1 urgent & important, q2 important, q3 urgent, q4 neither
        #[arg(short, long, value_parser = parse_quadrant, default_value = "q2")]
        quadrant: Quadrant,
        #[arg(short, long)]
        intention: Option<String>,
    },
    /// Mark a task done, or open again
    Toggle {
        /// Task id or its first characters
        id: String,
    },
    Remove {
        /// Task id or its first characters
        id: String,
    },
}

#[derive(Subcommand)]
enum SettingsAction {
    Show,
    Set {
        key: SettingKey,
        /// Prompted for when setting the journal password
        value: Option<String>,
    },
}

#[derive(Subcommand)]
enum ReviewAction {
    /// Write today's review (prompts for missing parts)
    Add {
        #[arg(long)]
        highlights: Option<String>,
        #[arg(long)]
        improvements: Option<String>,
        #[arg(long)]
        intention: Option<String>,
    },
    List,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModeArg {
    Work,
    ShortBreak,
    LongBreak,
}

impl From<ModeArg> for SessionMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Work => SessionMode::Work,
            ModeArg::ShortBreak => SessionMode::ShortBreak,
            ModeArg::LongBreak => SessionMode::LongBreak,
        }
    }
}

fn parse_quadrant(value: &str) -> Result<Quadrant, String> {
    Quadrant::from_stored(value)
        .ok_or_else(|| format!("unknown quadrant {:?}, use q1 to q4", value))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Start { mode, yes } => commands::start(mode.map(SessionMode::from), yes).await,
        Commands::Pause => commands::pause().await,
        Commands::Reset => commands::reset().await,
        Commands::Mode { mode } => commands::switch_mode(mode.into()).await,
        Commands::Status { json } => commands::status(json).await,
        Commands::Micro { action } => match action {
            MicroAction::Start => commands::micro_start().await,
            MicroAction::Cancel => commands::micro_cancel().await,
        },
        Commands::Tasks { action } => match action.unwrap_or(TaskAction::List) {
            TaskAction::List => commands::task_list().await,
            TaskAction::Add {
                text,
                quadrant,
                intention,
            } => commands::task_add(text, quadrant, intention).await,
            TaskAction::Toggle { id } => commands::task_toggle(&id).await,
            TaskAction::Remove { id } => commands::task_remove(&id).await,
        },
        Commands::Achievements => commands::achievements().await,
        Commands::Stats => commands::stats().await,
        Commands::Settings { action } => match action.unwrap_or(SettingsAction::Show) {
            SettingsAction::Show => commands::settings_show().await,
            SettingsAction::Set { key, value } => commands::settings_set(key, value).await,
        },
        Commands::Review { action } => match action {
            ReviewAction::Add {
                highlights,
                improvements,
                intention,
            } => commands::review_add(highlights, improvements, intention).await,
            ReviewAction::List => commands::review_list().await,
        },
        Commands::Init { force } => commands::init(force),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn start_accepts_kebab_case_modes() {
        let cli = Cli::try_parse_from(["miqat", "start", "long-break", "--yes"]).unwrap();

        assert!(matches!(
            cli.command,
            Commands::Start {
                mode: Some(ModeArg::LongBreak),
                yes: true
            }
        ));
    }

    #[test]
    fn task_add_parses_quadrant() {
        let args = ["miqat", "tasks", "add", "file taxes", "--quadrant", "1"];
        let cli = Cli::try_parse_from(args).unwrap();

        let Commands::Tasks {
            action: Some(TaskAction::Add { quadrant, .. }),
        } = cli.command
        else {
            panic!("expected tasks add");
        };
        assert_eq!(quadrant, Quadrant::Q1);
    }

    #[test]
    fn settings_set_parses_key() {
        let cli = Cli::try_parse_from(["miqat", "settings", "set", "short-break", "10"]).unwrap();

        let Commands::Settings {
            action: Some(SettingsAction::Set { key, value }),
        } = cli.command
        else {
            panic!("expected settings set");
        };
        assert_eq!(key, SettingKey::ShortBreakMinutes);
        assert_eq!(value.as_deref(), Some("10"));
    }

    #[test]
    fn unknown_quadrant_is_rejected() {
        assert!(Cli::try_parse_from(["miqat", "tasks", "add", "x", "--quadrant", "q5"]).is_err());
    }
}
