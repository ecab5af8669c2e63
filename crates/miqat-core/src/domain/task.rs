use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

pub type TaskId = Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Quadrant {
    Q1,
    Q2,
    Q3,
    Q4,
}

impl Quadrant {
    pub fn as_str(&self) -> &'static str {
        match self {
            Quadrant::Q1 => "q1",
            Quadrant::Q2 => "q2",
            Quadrant::Q3 => "q3",
            Quadrant::Q4 => "q4",
        }
    }

    pub fn from_stored(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "q1" | "1" => Some(Quadrant::Q1),
            "q2" | "2" => Some(Quadrant::Q2),
            "q3" | "3" => Some(Quadrant::Q3),
            "q4" | "4" => Some(Quadrant::Q4),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Quadrant::Q1 => "Urgent & important",
            Quadrant::Q2 => "Important, not urgent",
            Quadrant::Q3 => "Urgent, not important",
            Quadrant::Q4 => "Neither urgent nor important",
        }
    }

    pub fn all() -> &'static [Quadrant] {
        &[Quadrant::Q1, Quadrant::Q2, Quadrant::Q3, Quadrant::Q4]
    }
}

impl std::fmt::Display for Quadrant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub text: String,
    pub quadrant: Quadrant,
    pub completed: bool,
    #[serde(default)]
    pub intention: Option<String>,
}

impl Task {
    pub fn new(text: impl Into<String>, quadrant: Quadrant, intention: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: text.into(),
            quadrant,
            completed: false,
            intention: intention.filter(|value| !value.trim().is_empty()),
        }
    }
}

/// Result of flipping a task's completion flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskToggle {
    pub task: Task,
    pub now_completed: bool,
}

/// Priority board. A quadrant missing from the map is simply empty.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskBoard {
    quadrants: BTreeMap<Quadrant, Vec<Task>>,
}

impl TaskBoard {
    pub fn tasks_in(&self, quadrant: Quadrant) -> &[Task] {
        self.quadrants
            .get(&quadrant)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn all_tasks(&self) -> impl Iterator<Item = &Task> {
        self.quadrants.values().flatten()
    }

    pub fn add(&mut self, task: Task) -> TaskId {
        let id = task.id;
        self.quadrants.entry(task.quadrant).or_default().push(task);
        id
    }

    pub fn toggle(&mut self, id: TaskId) -> Option<TaskToggle> {
        let task = self
            .quadrants
            .values_mut()
            .flat_map(|tasks| tasks.iter_mut())
            .find(|task| task.id == id)?;

        task.completed = !task.completed;

        Some(TaskToggle {
            task: task.clone(),
            now_completed: task.completed,
        })
    }

    pub fn remove(&mut self, id: TaskId) -> Option<Task> {
        for tasks in self.quadrants.values_mut() {
            if let Some(position) = tasks.iter().position(|task| task.id == id) {
                return Some(tasks.remove(position));
            }
        }
        None
    }

    /// Open tasks of the urgent & important quadrant.
    pub fn urgent_important(&self) -> Vec<&Task> {
        self.tasks_in(Quadrant::Q1)
            .iter()
            .filter(|task| !task.completed)
            .collect()
    }

    pub fn completed_count(&self) -> usize {
        self.all_tasks().filter(|task| task.completed).count()
    }

    pub fn is_empty(&self) -> bool {
        self.all_tasks().next().is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletedTaskRecord {
    pub text: String,
    pub quadrant: Quadrant,
    pub completed_at: DateTime<Utc>,
}

impl CompletedTaskRecord {
    pub fn from_task(task: &Task, completed_at: DateTime<Utc>) -> Self {
        Self {
            text: task.text.clone(),
            quadrant: task.quadrant,
            completed_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_board_reports_empty_quadrants() {
        let board = TaskBoard::default();

        assert!(board.is_empty());
        assert!(board.tasks_in(Quadrant::Q3).is_empty());
        assert_eq!(board.completed_count(), 0);
    }

    #[test]
    fn toggle_flips_completion_both_ways() {
        let mut board = TaskBoard::default();
        let id = board.add(Task::new("Write report", Quadrant::Q1, None));

        let toggled = board.toggle(id).unwrap();
        assert!(toggled.now_completed);
        assert_eq!(board.completed_count(), 1);

        let toggled = board.toggle(id).unwrap();
        assert!(!toggled.now_completed);
        assert_eq!(board.completed_count(), 0);
    }

    #[test]
    fn toggle_unknown_task_returns_none() {
        let mut board = TaskBoard::default();

        assert!(board.toggle(Uuid::new_v4()).is_none());
    }

    #[test]
    fn urgent_important_lists_only_open_q1_tasks() {
        let mut board = TaskBoard::default();
        let done = board.add(Task::new("Pay rent", Quadrant::Q1, None));
        board.add(Task::new("Call doctor", Quadrant::Q1, None));
        board.add(Task::new("Plan week", Quadrant::Q2, None));
        board.toggle(done);

        let urgent: Vec<&str> = board
            .urgent_important()
            .iter()
            .map(|task| task.text.as_str())
            .collect();

        assert_eq!(urgent, vec!["Call doctor"]);
    }

    #[test]
    fn remove_takes_task_off_the_board() {
        let mut board = TaskBoard::default();
        let id = board.add(Task::new("Reply to email", Quadrant::Q3, None));

        let removed = board.remove(id).unwrap();

        assert_eq!(removed.text, "Reply to email");
        assert!(board.is_empty());
        assert!(board.remove(id).is_none());
    }

    #[test]
    fn blank_intention_is_dropped() {
        let task = Task::new("Read", Quadrant::Q2, Some("   ".to_string()));

        assert!(task.intention.is_none());
    }

    #[test]
    fn board_document_with_missing_quadrants_deserializes() {
        let board: TaskBoard = serde_json::from_str(r#"{"quadrants": {}}"#).unwrap();
        assert!(board.is_empty());

        let board: TaskBoard = serde_json::from_str("{}").unwrap();
        assert!(board.tasks_in(Quadrant::Q4).is_empty());
    }

    #[test]
    fn quadrant_parses_short_forms() {
        assert_eq!(Quadrant::from_stored("Q2"), Some(Quadrant::Q2));
        assert_eq!(Quadrant::from_stored("4"), Some(Quadrant::Q4));
        assert_eq!(Quadrant::from_stored("q5"), None);
    }
}
