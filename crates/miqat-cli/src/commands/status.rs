use anyhow::Result;
use miqat_protocol::{Request, Response, SessionMode, StatusReport};

use super::{format_clock, send, unexpected};

const LONG_BREAK_EVERY: u32 = 4;

pub async fn execute(json: bool) -> Result<()> {
    let report = match send(Request::GetStatus).await? {
        Response::SessionStatus(report) => report,
        other => return Err(unexpected(other)),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for line in render(&report) {
            println!("{}", line);
        }
    }

    Ok(())
}

fn render(report: &StatusReport) -> Vec<String> {
    let session = &report.session;
    let mut lines = Vec::new();

    let state = if session.running {
        "🟢 Running"
    } else if session.remaining_seconds == u64::from(session.planned_minutes) * 60 {
        "⚪ Ready"
    } else {
        "⏸️  Paused"
    };
    let mode = match session.mode {
        SessionMode::Work => "focus",
        SessionMode::ShortBreak => "short break",
        SessionMode::LongBreak => "long break",
    };
    lines.push(format!("{} {}", state, mode));
    lines.push(format!(
        "   Remaining: {} of {} min",
        format_clock(session.remaining_seconds),
        session.planned_minutes
    ));
    lines.push(format!(
        "   Focus sessions this cycle: {}/{}",
        session.completed_work_in_cycle,
        LONG_BREAK_EVERY
    ));

    if let Some(offer) = report.pending_offer {
        lines.push(format!(
            "   Waiting for confirmation: {}-minute session before {}",
            offer.minutes, offer.prayer
        ));
    }

    if report.micro_timer.running {
        lines.push(format!(
            "   Micro timer: {}",
            format_clock(report.micro_timer.remaining_seconds)
        ));
    }

    if !report.urgent_important.is_empty() {
        lines.push("   Urgent & important:".to_string());
        for task in &report.urgent_important {
            lines.push(format!("     • {}", task));
        }
    }

    lines
}
