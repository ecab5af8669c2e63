use anyhow::Result;
use chrono::Local;
use dialoguer::{Input, Password};
use miqat_protocol::{DailyReview, Request, Response};

use super::{expect_ok, send, unexpected};

pub async fn add(
    highlights: Option<String>,
    improvements: Option<String>,
    intention: Option<String>,
) -> Result<()> {
    let prompted = highlights.is_none();
    let highlights = match highlights {
        Some(value) => value,
        None => Input::new()
            .with_prompt("What went well today?")
            .interact_text()?,
    };
    let improvements = match improvements {
        Some(value) => value,
        None => Input::new()
            .with_prompt("What could be better?")
            .interact_text()?,
    };
    let intention_for_tomorrow = match intention {
        Some(value) => Some(value),
        None if prompted => Some(
            Input::<String>::new()
                .with_prompt("Intention for tomorrow (optional)")
                .allow_empty(true)
                .interact_text()?,
        ),
        None => None,
    };

    expect_ok(
        send(Request::AddDailyReview {
            highlights,
            improvements,
            intention_for_tomorrow,
        })
        .await?,
    )?;
    println!("📓 Review saved");
    Ok(())
}

pub async fn list() -> Result<()> {
    let journal_locked = match send(Request::GetSettings).await? {
        Response::Settings { journal_locked, .. } => journal_locked,
        other => return Err(unexpected(other)),
    };

    let password = if journal_locked {
        Some(
            Password::new()
                .with_prompt("Journal password")
                .interact()?,
        )
    } else {
        None
    };

    let reviews = match send(Request::ListDailyReviews { password }).await? {
        Response::DailyReviews(reviews) => reviews,
        other => return Err(unexpected(other)),
    };

    if reviews.is_empty() {
        println!("No reviews yet. Write one with: miqat review add");
        return Ok(());
    }

    for review in &reviews {
        println!("{}\n", render(review));
    }
    Ok(())
}

fn render(review: &DailyReview) -> String {
    let mut text = format!(
        "── {} ──\n  Went well:     {}\n  Could improve: {}",
        review.written_at.with_timezone(&Local).format("%Y-%m-%d %H:%M"),
        review.highlights,
        review.improvements
    );
    if let Some(intention) = &review.intention_for_tomorrow {
        text.push_str(&format!("\n  Tomorrow:      {}", intention));
    }
    text
}
