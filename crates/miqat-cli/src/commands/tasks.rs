use anyhow::{bail, Result};
use miqat_protocol::{Quadrant, Request, Response, TaskBoard, TaskId};

use super::{expect_ok, print_unlocked, send, unexpected};

const SHORT_ID_LENGTH: usize = 8;

pub async fn list() -> Result<()> {
    let board = fetch_board().await?;

    if board.is_empty() {
        println!("No tasks yet. Add one with: miqat tasks add \"...\" --quadrant q1");
        return Ok(());
    }

    for line in render(&board) {
        println!("{}", line);
    }
    Ok(())
}

pub async fn add(text: String, quadrant: Quadrant, intention: Option<String>) -> Result<()> {
    let response = send(Request::AddTask {
        text,
        quadrant,
        intention,
    })
    .await?;
    println!("Task added to {}", quadrant.label());
    print_unlocked(response)
}

pub async fn toggle(reference: &str) -> Result<()> {
    let id = resolve(&fetch_board().await?, reference)?;
    print_unlocked(send(Request::ToggleTask { id }).await?)
}

pub async fn remove(reference: &str) -> Result<()> {
    let id = resolve(&fetch_board().await?, reference)?;
    expect_ok(send(Request::RemoveTask { id }).await?)?;
    println!("Task removed");
    Ok(())
}

async fn fetch_board() -> Result<TaskBoard> {
    match send(Request::ListTasks).await? {
        Response::Tasks(board) => Ok(board),
        other => Err(unexpected(other)),
    }
}

/// Finds the single task whose id starts with `reference`.
fn resolve(board: &TaskBoard, reference: &str) -> Result<TaskId> {
    let reference = reference.trim().to_lowercase();
    if reference.is_empty() {
        bail!("task id cannot be empty");
    }

    let matches: Vec<TaskId> = board
        .all_tasks()
        .map(|task| task.id)
        .filter(|id| id.to_string().starts_with(&reference))
        .collect();

    match matches.as_slice() {
        [id] => Ok(*id),
        [] => bail!("no task matches {:?}", reference),
        _ => bail!("{:?} matches {} tasks, use more characters", reference, matches.len()),
    }
}

fn render(board: &TaskBoard) -> Vec<String> {
    let mut lines = Vec::new();

    for quadrant in Quadrant::all() {
        let tasks = board.tasks_in(*quadrant);
        if tasks.is_empty() {
            continue;
        }

        lines.push(format!("{} · {}", quadrant.as_str().to_uppercase(), quadrant.label()));
        for task in tasks {
            let mark = if task.completed { "x" } else { " " };
            let short_id: String = task.id.to_string().chars().take(SHORT_ID_LENGTH).collect();
            let mut line = format!("  [{}] {} {}", mark, short_id, task.text);
            if let Some(intention) = &task.intention {
                line.push_str(&format!(" ({})", intention));
            }
            lines.push(line);
        }
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use miqat_core::Task;

    fn board() -> (TaskBoard, TaskId, TaskId) {
        let mut board = TaskBoard::default();
        let first = board.add(Task::new("write letter", Quadrant::Q1, Some("for mum".to_string())));
        let second = board.add(Task::new("sort photos", Quadrant::Q4, None));
        (board, first, second)
    }

    #[test]
    fn full_id_and_unique_prefix_resolve() {
        let (board, first, _) = board();

        assert_eq!(resolve(&board, &first.to_string()).unwrap(), first);
        assert_eq!(
            resolve(&board, &first.to_string()[..SHORT_ID_LENGTH].to_uppercase()).unwrap(),
            first
        );
    }

    #[test]
    fn unknown_or_empty_reference_is_rejected() {
        let (board, _, _) = board();

        assert!(resolve(&board, "").is_err());
        assert!(resolve(&board, "not-a-task").is_err());
    }

    #[test]
    fn render_groups_by_quadrant() {
        let (mut board, first, _) = board();
        board.toggle(first);

        let lines = render(&board);

        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "Q1 · Urgent & important");
        assert!(lines[1].starts_with("  [x] "));
        assert!(lines[1].ends_with("write letter (for mum)"));
        assert_eq!(lines[2], "Q4 · Neither urgent nor important");
    }
}
