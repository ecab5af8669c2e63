use anyhow::Result;
use miqat_protocol::{LogSummary, Request, Response};

use super::{send, unexpected};

pub async fn execute() -> Result<()> {
    let stats = match send(Request::GetStats).await? {
        Response::Stats(stats) => stats,
        other => return Err(unexpected(other)),
    };

    println!("{:<14} {:>6} {:>8} {:>8} {:>10}", "", "focus", "short", "long", "minutes");
    for (label, summary) in [
        ("Today", stats.today),
        ("Last 7 days", stats.last_seven_days),
        ("All time", stats.lifetime),
    ] {
        println!("{}", row(label, &summary));
    }
    println!("\nCompleted tasks on the board: {}", stats.completed_tasks_on_board);

    Ok(())
}

fn row(label: &str, summary: &LogSummary) -> String {
    format!(
        "{:<14} {:>6} {:>8} {:>8} {:>10}",
        label,
        summary.work_sessions,
        summary.short_breaks,
        summary.long_breaks,
        summary.focus_minutes
    )
}
