use anyhow::Result;
use miqat_protocol::{Achievement, Request, Response};

use super::{send, unexpected};

pub async fn execute() -> Result<()> {
    let unlocked = match send(Request::ListAchievements).await? {
        Response::Achievements { unlocked } => unlocked,
        other => return Err(unexpected(other)),
    };

    println!(
        "Achievements: {}/{} unlocked\n",
        unlocked.len(),
        Achievement::all().len()
    );
    for achievement in Achievement::all() {
        let descriptor = achievement.descriptor();
        let mark = if unlocked.contains(achievement) { "🏆" } else { "🔒" };
        println!("{} {:<24} {}", mark, descriptor.title, descriptor.description);
    }

    Ok(())
}
