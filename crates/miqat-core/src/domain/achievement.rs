//! Rule-based achievements.
//!
//! [`evaluate`] is a pure function over a snapshot of facts. It returns only
//! the identifiers that are not already unlocked, so feeding its result back
//! into the set is an idempotent union.

use chrono::Weekday;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::{Quadrant, TaskBoard};

const FIRST_MILESTONE: u32 = 1;
const TENTH_MILESTONE: u32 = 10;
const FIFTIETH_MILESTONE: u32 = 50;
const HUNDREDTH_MILESTONE: u32 = 100;
const MARATHON_CYCLE: u32 = 4;
const UNSTOPPABLE_CYCLE: u32 = 8;
const EARLY_BIRD_BEFORE_HOUR: u32 = 8;
const NIGHT_OWL_FROM_HOUR: u32 = 22;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Achievement {
    #[serde(rename = "first")]
    First,
    #[serde(rename = "tenth")]
    Tenth,
    #[serde(rename = "fiftieth")]
    Fiftieth,
    #[serde(rename = "hundredth")]
    Hundredth,
    #[serde(rename = "marathon")]
    Marathon,
    #[serde(rename = "unstoppable")]
    Unstoppable,
    #[serde(rename = "early-bird")]
    EarlyBird,
    #[serde(rename = "night-owl")]
    NightOwl,
    #[serde(rename = "weekend-warrior")]
    WeekendWarrior,
    #[serde(rename = "break-champion")]
    BreakChampion,
    #[serde(rename = "first-task")]
    FirstTask,
    #[serde(rename = "tenth-task")]
    TenthTask,
    #[serde(rename = "delegator")]
    Delegator,
    #[serde(rename = "q1-cleared")]
    Q1Cleared,
    #[serde(rename = "q2-cleared")]
    Q2Cleared,
    #[serde(rename = "bane-of-procrastination")]
    BaneOfProcrastination,
    #[serde(rename = "juggler")]
    Juggler,
    #[serde(rename = "full-board")]
    FullBoard,
    #[serde(rename = "personalizer")]
    Personalizer,
}

pub struct AchievementDescriptor {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
}

impl Achievement {
    pub fn descriptor(&self) -> AchievementDescriptor {
        let (id, title, description) = match self {
            Achievement::First => ("first", "First Step", "Complete your first focus session."),
            Achievement::Tenth => ("tenth", "Getting Started", "Complete 10 focus sessions."),
            Achievement::Fiftieth => ("fiftieth", "Dedicated", "Complete 50 focus sessions."),
            Achievement::Hundredth => ("hundredth", "Centurion", "Complete 100 focus sessions."),
            Achievement::Marathon => (
                "marathon",
                "Marathon",
                "Complete 4 focus sessions in one cycle.",
            ),
            Achievement::Unstoppable => (
                "unstoppable",
                "Unstoppable",
                "Complete 8 focus sessions in one cycle.",
            ),
            Achievement::EarlyBird => (
                "early-bird",
                "Early Bird",
                "Finish a focus session before 8 AM.",
            ),
            Achievement::NightOwl => (
                "night-owl",
                "Night Owl",
                "Finish a focus session after 10 PM.",
            ),
            Achievement::WeekendWarrior => (
                "weekend-warrior",
                "Weekend Warrior",
                "Finish a focus session on a weekend.",
            ),
            Achievement::BreakChampion => (
                "break-champion",
                "Break Champion",
                "Take both a short and a long break.",
            ),
            Achievement::FirstTask => ("first-task", "Task Starter", "Complete your first task."),
            Achievement::TenthTask => ("tenth-task", "Task Master", "Complete 10 tasks."),
            Achievement::Delegator => (
                "delegator",
                "Delegator",
                "Complete an urgent but unimportant task.",
            ),
            Achievement::Q1Cleared => (
                "q1-cleared",
                "Firefighter",
                "Clear every urgent & important task.",
            ),
            Achievement::Q2Cleared => (
                "q2-cleared",
                "Strategist",
                "Clear every important, not urgent task.",
            ),
            Achievement::BaneOfProcrastination => (
                "bane-of-procrastination",
                "Bane of Procrastination",
                "Clear every task that was neither urgent nor important.",
            ),
            Achievement::Juggler => ("juggler", "Juggler", "Complete a task in every quadrant."),
            Achievement::FullBoard => (
                "full-board",
                "Full Board",
                "Have tasks in all four quadrants.",
            ),
            Achievement::Personalizer => (
                "personalizer",
                "Personalizer",
                "Save your settings for the first time.",
            ),
        };

        AchievementDescriptor {
            id,
            title,
            description,
        }
    }

    pub fn id(&self) -> &'static str {
        self.descriptor().id
    }

    pub fn title(&self) -> &'static str {
        self.descriptor().title
    }

    pub fn from_id(value: &str) -> Option<Self> {
        Achievement::all()
            .iter()
            .copied()
            .find(|achievement| achievement.id() == value)
    }

    pub fn all() -> &'static [Achievement] {
        &[
            Achievement::First,
            Achievement::Tenth,
            Achievement::Fiftieth,
            Achievement::Hundredth,
            Achievement::Marathon,
            Achievement::Unstoppable,
            Achievement::EarlyBird,
            Achievement::NightOwl,
            Achievement::WeekendWarrior,
            Achievement::BreakChampion,
            Achievement::FirstTask,
            Achievement::TenthTask,
            Achievement::Delegator,
            Achievement::Q1Cleared,
            Achievement::Q2Cleared,
            Achievement::BaneOfProcrastination,
            Achievement::Juggler,
            Achievement::FullBoard,
            Achievement::Personalizer,
        ]
    }
}

impl std::fmt::Display for Achievement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.title())
    }
}

/// Grow-only set of unlocked achievements.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AchievementSet(BTreeSet<Achievement>);

impl AchievementSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, achievement: Achievement) -> bool {
        self.0.contains(&achievement)
    }

    pub fn insert(&mut self, achievement: Achievement) -> bool {
        self.0.insert(achievement)
    }

    pub fn union(&self, other: &AchievementSet) -> AchievementSet {
        AchievementSet(self.0.union(&other.0).copied().collect())
    }

    pub fn is_superset(&self, other: &AchievementSet) -> bool {
        self.0.is_superset(&other.0)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = Achievement> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<Achievement> for AchievementSet {
    fn from_iter<I: IntoIterator<Item = Achievement>>(iter: I) -> Self {
        AchievementSet(iter.into_iter().collect())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkSessionFacts {
    /// Lifetime completed work sessions, including the one just finished.
    pub total_completed: u32,
    pub cycle_count: u32,
    pub hour: u32,
    pub weekday: Weekday,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BreakHistoryFacts {
    pub has_short_break: bool,
    pub has_long_break: bool,
}

#[derive(Debug, Clone, Copy)]
pub enum AchievementFacts<'a> {
    WorkSession(WorkSessionFacts),
    BreakHistory(BreakHistoryFacts),
    TaskCompletion(&'a TaskBoard),
    BoardComposition(&'a TaskBoard),
    SettingsSaved,
}

pub fn evaluate(facts: &AchievementFacts<'_>, already: &AchievementSet) -> AchievementSet {
    let earned = match facts {
        AchievementFacts::WorkSession(work) => work_session_rules(work),
        AchievementFacts::BreakHistory(breaks) => {
            if already.contains(Achievement::BreakChampion) {
                Vec::new()
            } else {
                break_rules(breaks)
            }
        }
        AchievementFacts::TaskCompletion(board) => task_completion_rules(board),
        AchievementFacts::BoardComposition(board) => board_composition_rules(board),
        AchievementFacts::SettingsSaved => vec![Achievement::Personalizer],
    };

    earned
        .into_iter()
        .filter(|achievement| !already.contains(*achievement))
        .collect()
}

fn work_session_rules(facts: &WorkSessionFacts) -> Vec<Achievement> {
    let mut earned = Vec::new();

    let milestones = [
        (FIRST_MILESTONE, Achievement::First),
        (TENTH_MILESTONE, Achievement::Tenth),
        (FIFTIETH_MILESTONE, Achievement::Fiftieth),
        (HUNDREDTH_MILESTONE, Achievement::Hundredth),
    ];
    for (threshold, achievement) in milestones {
        if facts.total_completed >= threshold {
            earned.push(achievement);
        }
    }

    if facts.cycle_count == MARATHON_CYCLE {
        earned.push(Achievement::Marathon);
    }
    if facts.cycle_count == UNSTOPPABLE_CYCLE {
        earned.push(Achievement::Unstoppable);
    }
    if facts.hour < EARLY_BIRD_BEFORE_HOUR {
        earned.push(Achievement::EarlyBird);
    }
    if facts.hour >= NIGHT_OWL_FROM_HOUR {
        earned.push(Achievement::NightOwl);
    }
    if matches!(facts.weekday, Weekday::Sat | Weekday::Sun) {
        earned.push(Achievement::WeekendWarrior);
    }

    earned
}

fn break_rules(facts: &BreakHistoryFacts) -> Vec<Achievement> {
    if facts.has_short_break && facts.has_long_break {
        vec![Achievement::BreakChampion]
    } else {
        Vec::new()
    }
}

fn task_completion_rules(board: &TaskBoard) -> Vec<Achievement> {
    let mut earned = Vec::new();
    let completed = board.completed_count();

    if completed >= FIRST_MILESTONE as usize {
        earned.push(Achievement::FirstTask);
    }
    if completed >= TENTH_MILESTONE as usize {
        earned.push(Achievement::TenthTask);
    }
    if has_completed_in(board, Quadrant::Q3) {
        earned.push(Achievement::Delegator);
    }
    if is_cleared(board, Quadrant::Q1) {
        earned.push(Achievement::Q1Cleared);
    }
    if is_cleared(board, Quadrant::Q2) {
        earned.push(Achievement::Q2Cleared);
    }
    if is_cleared(board, Quadrant::Q4) {
        earned.push(Achievement::BaneOfProcrastination);
    }
    if Quadrant::all()
        .iter()
        .all(|quadrant| has_completed_in(board, *quadrant))
    {
        earned.push(Achievement::Juggler);
    }

    earned
}

fn board_composition_rules(board: &TaskBoard) -> Vec<Achievement> {
    if Quadrant::all()
        .iter()
        .all(|quadrant| !board.tasks_in(*quadrant).is_empty())
    {
        vec![Achievement::FullBoard]
    } else {
        Vec::new()
    }
}

fn has_completed_in(board: &TaskBoard, quadrant: Quadrant) -> bool {
    board.tasks_in(quadrant).iter().any(|task| task.completed)
}

fn is_cleared(board: &TaskBoard, quadrant: Quadrant) -> bool {
    let tasks = board.tasks_in(quadrant);
    !tasks.is_empty() && tasks.iter().all(|task| task.completed)
}
