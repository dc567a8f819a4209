//! Workspace aggregate
//!
//! A workspace is the complete productivity state of one user. It is always
//! read, mutated and written back as a whole; the methods here are the pure
//! mutation rules, persistence and locking live in `WorkspaceService`.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::goal::{Direction, Goal, Priority};
use super::result::{Error, Result};
use super::stats::{GoalBoard, WorkspaceStats};
use super::task::Task;
use super::work_log::WorkLogEntry;

/// Schema version written with every workspace
pub const CURRENT_SCHEMA_VERSION: u32 = 1;

fn default_schema_version() -> u32 {
    CURRENT_SCHEMA_VERSION
}

fn default_streak() -> u32 {
    1
}

/// Per-user productivity state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workspace {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    /// Save counter, owned by the repository (not part of the stored blob)
    #[serde(skip)]
    pub revision: u64,
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub goals: Vec<Goal>,
    #[serde(default)]
    pub work_log: Vec<WorkLogEntry>,
    #[serde(default = "default_streak")]
    pub streak: u32,
    pub last_visit: DateTime<Utc>,
    #[serde(default)]
    pub achievements: Vec<String>,
    #[serde(default)]
    pub high_score: u64,
}

impl Default for Workspace {
    fn default() -> Self {
        Self::new()
    }
}

/// Map a caller-supplied position onto the current sequence length
fn resolve_index(index: i64, len: usize, kind: &str) -> Result<usize> {
    usize::try_from(index)
        .ok()
        .filter(|i| *i < len)
        .ok_or_else(|| {
            Error::not_found(format!(
                "{} at index {} (workspace has {})",
                kind, index, len
            ))
        })
}

impl Workspace {
    /// A fresh workspace: empty lists, streak 1, visited now
    pub fn new() -> Self {
        Self {
            schema_version: CURRENT_SCHEMA_VERSION,
            revision: 0,
            tasks: Vec::new(),
            goals: Vec::new(),
            work_log: Vec::new(),
            streak: 1,
            last_visit: Utc::now(),
            achievements: Vec::new(),
            high_score: 0,
        }
    }

    // === Tasks ===

    pub fn add_task(&mut self, text: &str) -> Result<(usize, Task)> {
        let task = Task::new(text);
        task.validate().map_err(Error::validation)?;
        self.tasks.push(task.clone());
        Ok((self.tasks.len() - 1, task))
    }

    pub fn toggle_task(&mut self, index: i64) -> Result<Task> {
        let i = resolve_index(index, self.tasks.len(), "task")?;
        let task = &mut self.tasks[i];
        task.toggle();
        Ok(task.clone())
    }

    /// Remove the task at `index`; later tasks shift down by one
    pub fn delete_task(&mut self, index: i64) -> Result<Task> {
        let i = resolve_index(index, self.tasks.len(), "task")?;
        Ok(self.tasks.remove(i))
    }

    pub fn clear_completed_tasks(&mut self) -> usize {
        let before = self.tasks.len();
        self.tasks.retain(|t| !t.completed);
        before - self.tasks.len()
    }

    pub fn task_index(&self, id: Uuid) -> Result<i64> {
        self.tasks
            .iter()
            .position(|t| t.id == id)
            .map(|i| i as i64)
            .ok_or_else(|| Error::not_found(format!("task {}", id)))
    }

    pub fn remaining_tasks(&self) -> usize {
        self.tasks.iter().filter(|t| !t.completed).count()
    }

    // === Goals ===

    pub fn add_goal(&mut self, text: &str, priority: Priority, deadline: Option<&str>) -> Result<Goal> {
        let goal = Goal::new(text, priority, deadline);
        goal.validate().map_err(Error::validation)?;
        self.goals.push(goal.clone());
        Ok(goal)
    }

    /// Step a goal's status; the flag is false when the move was clamped
    pub fn move_goal(&mut self, index: i64, direction: Direction) -> Result<(Goal, bool)> {
        let i = resolve_index(index, self.goals.len(), "goal")?;
        let goal = &mut self.goals[i];
        let changed = goal.advance(direction);
        Ok((goal.clone(), changed))
    }

    pub fn delete_goal(&mut self, index: i64) -> Result<Goal> {
        let i = resolve_index(index, self.goals.len(), "goal")?;
        Ok(self.goals.remove(i))
    }

    pub fn goal_index(&self, id: Uuid) -> Result<i64> {
        self.goals
            .iter()
            .position(|g| g.id == id)
            .map(|i| i as i64)
            .ok_or_else(|| Error::not_found(format!("goal {}", id)))
    }

    pub fn goal_board(&self) -> GoalBoard {
        GoalBoard::from_goals(&self.goals)
    }

    // === Work log ===

    pub fn log_hours(&mut self, hours: Decimal) -> Result<WorkLogEntry> {
        let entry = WorkLogEntry::new(hours)?;
        self.work_log.push(entry.clone());
        Ok(entry)
    }

    pub fn total_hours(&self) -> Decimal {
        self.work_log
            .iter()
            .fold(Decimal::ZERO, |total, e| total.saturating_add(e.hours))
    }

    // === Counters ===

    /// Update the streak for a visit at `now`
    ///
    /// Same calendar day keeps the streak, the next day extends it, any longer
    /// gap starts over at 1. A visit that predates the last one (clock skew)
    /// changes nothing.
    pub fn record_visit(&mut self, now: DateTime<Utc>) -> u32 {
        let gap = (now.date_naive() - self.last_visit.date_naive()).num_days();
        match gap {
            g if g < 0 => return self.streak,
            0 => {}
            1 => self.streak = self.streak.saturating_add(1),
            _ => self.streak = 1,
        }
        self.streak = self.streak.max(1);
        if now > self.last_visit {
            self.last_visit = now;
        }
        self.streak
    }

    /// Add an achievement; false when it was already unlocked
    pub fn unlock_achievement(&mut self, name: &str) -> Result<bool> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::validation("achievement name cannot be empty"));
        }
        if self.achievements.iter().any(|a| a == name) {
            return Ok(false);
        }
        self.achievements.push(name.to_string());
        Ok(true)
    }

    pub fn record_score(&mut self, score: u64) -> u64 {
        self.high_score = self.high_score.max(score);
        self.high_score
    }

    pub fn stats(&self) -> WorkspaceStats {
        let goal_count = self.goals.len();
        WorkspaceStats {
            completed_count: self.tasks.iter().filter(|t| t.completed).count(),
            open_goal_count: self.goals.iter().filter(|g| g.is_open()).count(),
            goal_count,
            streak: self.streak,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;
    use crate::domain::GoalStatus;

    fn workspace_with_tasks(texts: &[(&str, bool)]) -> Workspace {
        let mut ws = Workspace::new();
        for (text, done) in texts {
            let (i, _) = ws.add_task(text).unwrap();
            if *done {
                ws.toggle_task(i as i64).unwrap();
            }
        }
        ws
    }

    #[test]
    fn test_new_workspace_defaults() {
        let ws = Workspace::new();
        assert!(ws.tasks.is_empty());
        assert!(ws.goals.is_empty());
        assert_eq!(ws.streak, 1);
        assert_eq!(ws.high_score, 0);
        assert_eq!(ws.schema_version, CURRENT_SCHEMA_VERSION);
    }

    #[test]
    fn test_add_task_rejects_blank() {
        let mut ws = Workspace::new();
        let err = ws.add_task("   ").unwrap_err();
        assert!(err.is_validation());
        assert!(ws.tasks.is_empty());
    }

    #[test]
    fn test_toggle_out_of_bounds() {
        let mut ws = workspace_with_tasks(&[("a", false), ("b", false)]);
        let before = ws.clone();
        assert!(ws.toggle_task(-1).unwrap_err().is_not_found());
        assert!(ws.toggle_task(999).unwrap_err().is_not_found());
        assert!(ws.toggle_task(2).unwrap_err().is_not_found());
        assert_eq!(ws, before);
    }

    #[test]
    fn test_delete_same_index_twice_removes_next() {
        let mut ws = workspace_with_tasks(&[("a", false), ("b", false), ("c", false)]);
        assert_eq!(ws.delete_task(1).unwrap().text, "b");
        assert_eq!(ws.delete_task(1).unwrap().text, "c");
        assert_eq!(ws.tasks.len(), 1);
        assert_eq!(ws.tasks[0].text, "a");
        assert!(ws.delete_task(1).unwrap_err().is_not_found());
    }

    #[test]
    fn test_clear_completed_preserves_order() {
        let mut ws = workspace_with_tasks(&[("A", true), ("B", false), ("C", true), ("D", false)]);
        assert_eq!(ws.clear_completed_tasks(), 2);
        let texts: Vec<&str> = ws.tasks.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["B", "D"]);
    }

    #[test]
    fn test_move_goal_clamps() {
        let mut ws = Workspace::new();
        ws.add_goal("ship", Priority::High, None).unwrap();

        let (goal, changed) = ws.move_goal(0, Direction::Back).unwrap();
        assert_eq!(goal.status, GoalStatus::Planning);
        assert!(!changed);

        ws.move_goal(0, Direction::Forward).unwrap();
        ws.move_goal(0, Direction::Forward).unwrap();
        let (goal, changed) = ws.move_goal(0, Direction::Forward).unwrap();
        assert_eq!(goal.status, GoalStatus::Completed);
        assert!(!changed);
    }

    #[test]
    fn test_stats() {
        let mut ws = workspace_with_tasks(&[("a", true), ("b", false), ("c", true)]);
        ws.add_goal("g1", Priority::Low, None).unwrap();
        ws.add_goal("g2", Priority::Low, None).unwrap();
        ws.move_goal(1, Direction::Forward).unwrap();
        ws.move_goal(1, Direction::Forward).unwrap();

        let stats = ws.stats();
        assert_eq!(stats.completed_count, 2);
        assert_eq!(stats.goal_count, 2);
        assert_eq!(stats.open_goal_count, 1);
        assert_eq!(stats.streak, 1);
        assert_eq!(ws.remaining_tasks(), 1);
    }

    #[test]
    fn test_goal_board_columns_keep_positions() {
        let mut ws = Workspace::new();
        ws.add_goal("a", Priority::Low, None).unwrap();
        ws.add_goal("b", Priority::Medium, None).unwrap();
        ws.add_goal("c", Priority::High, None).unwrap();
        ws.move_goal(1, Direction::Forward).unwrap();

        let board = ws.goal_board();
        assert_eq!(board.len(), 3);
        assert_eq!(board.planning.iter().map(|c| c.index).collect::<Vec<_>>(), vec![0, 2]);
        assert_eq!(board.in_progress[0].index, 1);
        assert!(board.completed.is_empty());
    }

    #[test]
    fn test_record_visit_streak_rules() {
        let mut ws = Workspace::new();
        let start = Utc.with_ymd_and_hms(2026, 3, 10, 9, 0, 0).unwrap();
        ws.last_visit = start;

        assert_eq!(ws.record_visit(start + Duration::minutes(5)), 1);
        assert_eq!(ws.record_visit(start + Duration::days(1)), 2);
        assert_eq!(ws.record_visit(start + Duration::days(2)), 3);
        assert_eq!(ws.record_visit(start + Duration::days(5)), 1);
        // Older visit is ignored
        assert_eq!(ws.record_visit(start), 1);
        assert_eq!(ws.last_visit, start + Duration::days(5));
    }

    #[test]
    fn test_achievements_are_a_set() {
        let mut ws = Workspace::new();
        assert!(ws.unlock_achievement("first-task").unwrap());
        assert!(!ws.unlock_achievement(" first-task ").unwrap());
        assert!(ws.unlock_achievement("").unwrap_err().is_validation());
        assert_eq!(ws.achievements, vec!["first-task".to_string()]);
    }

    #[test]
    fn test_high_score_keeps_max() {
        let mut ws = Workspace::new();
        assert_eq!(ws.record_score(40), 40);
        assert_eq!(ws.record_score(10), 40);
        assert_eq!(ws.high_score, 40);
    }

    #[test]
    fn test_log_hours_and_total() {
        let mut ws = Workspace::new();
        ws.log_hours(Decimal::new(75, 1)).unwrap();
        ws.log_hours(Decimal::new(2, 0)).unwrap();
        assert!(ws.log_hours(Decimal::new(-3, 0)).unwrap_err().is_validation());
        assert_eq!(ws.work_log.len(), 2);
        assert_eq!(ws.total_hours(), Decimal::new(95, 1));
    }

    #[test]
    fn test_total_hours_of_oversized_stored_log_does_not_overflow() {
        let mut ws = Workspace::new();
        assert!(ws.log_hours(Decimal::MAX).unwrap_err().is_validation());
        assert!(ws.work_log.is_empty());

        // Entries written by hand into the stored JSON skip validation
        for _ in 0..2 {
            ws.work_log.push(WorkLogEntry {
                hours: Decimal::MAX,
                logged_at: Utc::now(),
            });
        }
        assert_eq!(ws.total_hours(), Decimal::MAX);
    }

    #[test]
    fn test_stored_shape_is_camel_case() {
        let mut ws = Workspace::new();
        ws.add_task("x").unwrap();
        let value = serde_json::to_value(&ws).unwrap();
        assert!(value.get("schemaVersion").is_some());
        assert!(value.get("workLog").is_some());
        assert!(value.get("highScore").is_some());
        assert!(value.get("revision").is_none());
        assert_eq!(value["tasks"][0]["completed"], false);
    }
}
