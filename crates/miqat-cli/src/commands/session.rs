use std::time::Duration;

use anyhow::Result;
use dialoguer::Confirm;
use miqat_protocol::{Request, Response, SessionMode, StartDecision};

use super::{expect_ok, format_clock, send, send_with, unexpected};
use crate::client::DaemonClient;

/// Work starts may wait on the prayer-times lookup.
const START_TIMEOUT: Duration = Duration::from_secs(15);

pub async fn start(mode: Option<SessionMode>, assume_yes: bool) -> Result<()> {
    let client = DaemonClient::new().with_timeout(START_TIMEOUT);

    let mut decision = start_decision(send_with(&client, Request::StartSession { mode }).await?)?;

    // Confirming re-checks the prayer time, so the answer can be a new decision.
    loop {
        match decision {
            StartDecision::Started {
                mode,
                remaining_seconds,
            } => {
                print_started(mode, remaining_seconds);
                return Ok(());
            }
            StartDecision::Denied {
                prayer,
                minutes_until,
            } => {
                println!(
                    "🕌 {} is in {} min. Pray first, then start a fresh session.",
                    prayer, minutes_until
                );
                return Ok(());
            }
            StartDecision::ShortenedOffer { minutes, prayer } => {
                println!("🕌 {} comes before this session would end.", prayer);

                let accept = assume_yes
                    || Confirm::new()
                        .with_prompt(format!(
                            "Start a shortened {}-minute session instead?",
                            minutes
                        ))
                        .default(true)
                        .interact()?;

                if !accept {
                    expect_ok(send(Request::DeclineShortenedSession).await?)?;
                    println!("Session not started.");
                    return Ok(());
                }

                let confirmed = send_with(&client, Request::ConfirmShortenedSession).await?;
                decision = start_decision(confirmed)?;
            }
        }
    }
}

fn start_decision(response: Response) -> Result<StartDecision> {
    match response {
        Response::StartDecision(decision) => Ok(decision),
        other => Err(unexpected(other)),
    }
}

fn print_started(mode: SessionMode, remaining_seconds: u64) {
    let label = match mode {
        SessionMode::Work => "🍅 Focus session started",
        SessionMode::ShortBreak => "☕ Short break started",
        SessionMode::LongBreak => "🌿 Long break started",
    };
    println!("{} ({} remaining)", label, format_clock(remaining_seconds));
}

pub async fn pause() -> Result<()> {
    expect_ok(send(Request::PauseSession).await?)?;
    println!("⏸️  Session paused");
    Ok(())
}

pub async fn reset() -> Result<()> {
    expect_ok(send(Request::ResetSession).await?)?;
    println!("↺ Session reset");
    Ok(())
}

pub async fn switch_mode(mode: SessionMode) -> Result<()> {
    expect_ok(send(Request::SwitchMode { mode }).await?)?;
    println!("Switched to {}", mode);
    Ok(())
}
