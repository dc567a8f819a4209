//! Workspace service - the per-user workspace store
//!
//! Every mutation is a read-modify-write of the user's whole workspace,
//! performed while holding that user's lock. Different users never contend.
//! A rejected operation returns before anything is written.
//!
//! Only accounts in the user directory have a workspace: every operation on
//! an unknown user id fails with `NotFound`, and account deletion runs under
//! the same lock so nothing can bring the workspace back afterwards.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::domain::result::{Error, Result};
use crate::domain::{
    Direction, Goal, GoalBoard, Priority, Task, WorkLogEntry, Workspace, WorkspaceStats,
};
use crate::ports::WorkspaceRepository;

type UserLock = Arc<Mutex<()>>;

/// Per-user workspace store
pub struct WorkspaceService {
    repository: Arc<dyn WorkspaceRepository>,
    locks: Mutex<HashMap<String, UserLock>>,
}

fn check_user_id(user_id: &str) -> Result<()> {
    if user_id.trim().is_empty() {
        return Err(Error::validation("user id cannot be empty"));
    }
    Ok(())
}

fn unknown_account(user_id: &str) -> Error {
    Error::not_found(format!("account {}", user_id))
}

impl WorkspaceService {
    pub fn new(repository: Arc<dyn WorkspaceRepository>) -> Self {
        Self {
            repository,
            locks: Mutex::new(HashMap::new()),
        }
    }

    fn ensure_account(&self, user_id: &str) -> Result<()> {
        check_user_id(user_id)?;
        if self.repository.get_user(user_id)?.is_none() {
            return Err(unknown_account(user_id));
        }
        Ok(())
    }

    fn user_lock(&self, user_id: &str) -> Result<UserLock> {
        let mut locks = self
            .locks
            .lock()
            .map_err(|e| Error::Other(format!("lock table poisoned: {}", e)))?;
        Ok(Arc::clone(locks.entry(user_id.to_string()).or_default()))
    }

    /// Run `f` holding the user's lock
    ///
    /// Unknown ids are turned away before a lock entry is made for them. An
    /// account deleted while we waited for the lock is caught by the check
    /// repeated inside, and its lock entry dropped again.
    fn with_user_lock<T>(&self, user_id: &str, f: impl FnOnce() -> Result<T>) -> Result<T> {
        self.ensure_account(user_id)?;
        let lock = self.user_lock(user_id)?;
        let result = {
            let _guard = lock
                .lock()
                .map_err(|e| Error::Other(format!("workspace lock poisoned: {}", e)))?;
            match self.ensure_account(user_id) {
                Ok(()) => f(),
                Err(e) => Err(e),
            }
        };
        if matches!(&result, Err(e) if e.is_not_found())
            && self.repository.get_user(user_id)?.is_none()
        {
            self.forget(user_id);
        }
        result
    }

    /// Load the stored workspace or create and persist a fresh one.
    /// Caller must hold the user's lock and have checked the account exists.
    fn load_or_create(&self, user_id: &str) -> Result<Workspace> {
        if let Some(workspace) = self.repository.load_workspace(user_id)? {
            return Ok(workspace);
        }
        let workspace = self
            .repository
            .create_workspace_if_absent(user_id, &Workspace::new())?;
        tracing::debug!(user_id = %user_id, "workspace created");
        Ok(workspace)
    }

    /// Read-modify-write under the user's lock
    ///
    /// `apply` returns the operation's value and whether the workspace changed;
    /// unchanged workspaces are not written back.
    fn mutate<T>(
        &self,
        user_id: &str,
        op: &'static str,
        apply: impl FnOnce(&mut Workspace) -> Result<(T, bool)>,
    ) -> Result<T> {
        self.with_user_lock(user_id, || {
            let mut workspace = self.load_or_create(user_id)?;
            let (value, changed) = match apply(&mut workspace) {
                Ok(result) => result,
                Err(e) => {
                    tracing::debug!(user_id = %user_id, op, error = %e, "operation rejected");
                    return Err(e);
                }
            };

            if changed {
                let revision = self
                    .repository
                    .save_workspace(user_id, &workspace)
                    .map_err(|e| {
                        if e.is_conflict() {
                            tracing::warn!(user_id = %user_id, op, error = %e, "concurrent write rejected");
                        }
                        e
                    })?;
                tracing::debug!(user_id = %user_id, op, revision, "workspace saved");
            }
            Ok(value)
        })
    }

    /// Current stored state without creating anything
    fn read(&self, user_id: &str) -> Result<Workspace> {
        self.ensure_account(user_id)?;
        Ok(self
            .repository
            .load_workspace(user_id)?
            .unwrap_or_default())
    }

    /// Return the user's workspace, creating it on first access
    pub fn get_or_create(&self, user_id: &str) -> Result<Workspace> {
        self.with_user_lock(user_id, || self.load_or_create(user_id))
    }

    // === Tasks ===

    /// Append a task; returns its position and the stored task
    pub fn add_task(&self, user_id: &str, text: &str) -> Result<(usize, Task)> {
        self.mutate(user_id, "add_task", |ws| Ok((ws.add_task(text)?, true)))
    }

    pub fn toggle_task(&self, user_id: &str, index: i64) -> Result<Task> {
        self.mutate(user_id, "toggle_task", |ws| Ok((ws.toggle_task(index)?, true)))
    }

    pub fn toggle_task_by_id(&self, user_id: &str, task_id: Uuid) -> Result<Task> {
        self.mutate(user_id, "toggle_task", |ws| {
            let index = ws.task_index(task_id)?;
            Ok((ws.toggle_task(index)?, true))
        })
    }

    /// Remove the task at `index`; later positions shift down by one
    pub fn delete_task(&self, user_id: &str, index: i64) -> Result<()> {
        self.mutate(user_id, "delete_task", |ws| {
            ws.delete_task(index)?;
            Ok(((), true))
        })
    }

    pub fn delete_task_by_id(&self, user_id: &str, task_id: Uuid) -> Result<()> {
        self.mutate(user_id, "delete_task", |ws| {
            let index = ws.task_index(task_id)?;
            ws.delete_task(index)?;
            Ok(((), true))
        })
    }

    /// Remove every completed task; returns how many were removed
    pub fn clear_completed_tasks(&self, user_id: &str) -> Result<usize> {
        self.mutate(user_id, "clear_completed_tasks", |ws| {
            let removed = ws.clear_completed_tasks();
            Ok((removed, removed > 0))
        })
    }

    pub fn tasks(&self, user_id: &str) -> Result<Vec<Task>> {
        Ok(self.read(user_id)?.tasks)
    }

    pub fn remaining_task_count(&self, user_id: &str) -> Result<usize> {
        Ok(self.read(user_id)?.remaining_tasks())
    }

    // === Goals ===

    pub fn add_goal(
        &self,
        user_id: &str,
        text: &str,
        priority: Priority,
        deadline: Option<&str>,
    ) -> Result<Goal> {
        self.mutate(user_id, "add_goal", |ws| {
            Ok((ws.add_goal(text, priority, deadline)?, true))
        })
    }

    /// Move a goal one stage; a move past either end is a successful no-op
    pub fn move_goal(&self, user_id: &str, index: i64, direction: Direction) -> Result<Goal> {
        self.mutate(user_id, "move_goal", |ws| ws.move_goal(index, direction))
    }

    pub fn move_goal_by_id(&self, user_id: &str, goal_id: Uuid, direction: Direction) -> Result<Goal> {
        self.mutate(user_id, "move_goal", |ws| {
            let index = ws.goal_index(goal_id)?;
            ws.move_goal(index, direction)
        })
    }

    pub fn delete_goal(&self, user_id: &str, index: i64) -> Result<()> {
        self.mutate(user_id, "delete_goal", |ws| {
            ws.delete_goal(index)?;
            Ok(((), true))
        })
    }

    pub fn delete_goal_by_id(&self, user_id: &str, goal_id: Uuid) -> Result<()> {
        self.mutate(user_id, "delete_goal", |ws| {
            let index = ws.goal_index(goal_id)?;
            ws.delete_goal(index)?;
            Ok(((), true))
        })
    }

    pub fn goal_board(&self, user_id: &str) -> Result<GoalBoard> {
        Ok(self.read(user_id)?.goal_board())
    }

    // === Work log ===

    pub fn log_hours(&self, user_id: &str, hours: Decimal) -> Result<()> {
        self.mutate(user_id, "log_hours", |ws| {
            ws.log_hours(hours)?;
            Ok(((), true))
        })
    }

    pub fn work_log(&self, user_id: &str) -> Result<Vec<WorkLogEntry>> {
        Ok(self.read(user_id)?.work_log)
    }

    pub fn total_hours(&self, user_id: &str) -> Result<Decimal> {
        Ok(self.read(user_id)?.total_hours())
    }

    // === Counters ===

    /// Record a visit now; returns the updated streak
    pub fn record_visit(&self, user_id: &str) -> Result<u32> {
        self.record_visit_at(user_id, Utc::now())
    }

    pub fn record_visit_at(&self, user_id: &str, at: DateTime<Utc>) -> Result<u32> {
        self.mutate(user_id, "record_visit", |ws| {
            let before = (ws.streak, ws.last_visit);
            let streak = ws.record_visit(at);
            Ok((streak, before != (ws.streak, ws.last_visit)))
        })
    }

    /// Unlock an achievement; false when it was already unlocked
    pub fn unlock_achievement(&self, user_id: &str, name: &str) -> Result<bool> {
        self.mutate(user_id, "unlock_achievement", |ws| {
            let added = ws.unlock_achievement(name)?;
            Ok((added, added))
        })
    }

    /// Offer a score; returns the (possibly unchanged) high score
    pub fn record_score(&self, user_id: &str, score: u64) -> Result<u64> {
        self.mutate(user_id, "record_score", |ws| {
            let before = ws.high_score;
            let high = ws.record_score(score);
            Ok((high, high != before))
        })
    }

    /// Dashboard counters; never writes
    pub fn snapshot_stats(&self, user_id: &str) -> Result<WorkspaceStats> {
        Ok(self.read(user_id)?.stats())
    }

    /// Delete the account and its workspace under the user's lock; false if
    /// there was no such account
    pub(crate) fn delete_account(&self, user_id: &str) -> Result<bool> {
        check_user_id(user_id)?;
        let lock = self.user_lock(user_id)?;
        let deleted = {
            let _guard = lock
                .lock()
                .map_err(|e| Error::Other(format!("workspace lock poisoned: {}", e)))?;
            self.repository.delete_user(user_id)
        };
        self.forget(user_id);
        deleted
    }

    fn forget(&self, user_id: &str) {
        if let Ok(mut locks) = self.locks.lock() {
            locks.remove(user_id);
        }
    }

    #[cfg(test)]
    fn lock_entries(&self) -> usize {
        self.locks.lock().map(|locks| locks.len()).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::MemoryRepository;
    use crate::domain::{GoalStatus, User};

    fn service() -> (Arc<MemoryRepository>, WorkspaceService) {
        let repo = Arc::new(MemoryRepository::new());
        for (id, name) in [("user_1", "Ada"), ("u", "Bob"), ("nobody", "Cy")] {
            repo.upsert_user(&User::new(id, name, &format!("{}@example.com", id)))
                .unwrap();
        }
        let service = WorkspaceService::new(repo.clone());
        (repo, service)
    }

    #[test]
    fn test_get_or_create_is_idempotent() {
        let (repo, service) = service();
        let first = service.get_or_create("user_1").unwrap();
        let second = service.get_or_create("user_1").unwrap();
        assert_eq!(first, second);
        assert_eq!(repo.list_workspace_owners().unwrap(), vec!["user_1".to_string()]);
        assert_eq!(first.streak, 1);
        assert_eq!(first.high_score, 0);
    }

    #[test]
    fn test_blank_user_id_rejected() {
        let (_, service) = service();
        assert!(service.get_or_create("  ").unwrap_err().is_validation());
        assert!(service.add_task("", "x").unwrap_err().is_validation());
    }

    #[test]
    fn test_rejected_add_does_not_write() {
        let (repo, service) = service();
        service.add_task("user_1", "first").unwrap();
        let before = repo.load_workspace("user_1").unwrap().unwrap();

        assert!(service.add_task("user_1", "   ").unwrap_err().is_validation());
        let after = repo.load_workspace("user_1").unwrap().unwrap();
        assert_eq!(before.revision, after.revision);
        assert_eq!(after.tasks.len(), 1);
    }

    #[test]
    fn test_toggle_bounds() {
        let (repo, service) = service();
        service.add_task("user_1", "a").unwrap();
        service.add_task("user_1", "b").unwrap();
        let before = repo.load_workspace("user_1").unwrap().unwrap();

        assert!(service.toggle_task("user_1", -1).unwrap_err().is_not_found());
        assert!(service.toggle_task("user_1", 999).unwrap_err().is_not_found());
        assert_eq!(repo.load_workspace("user_1").unwrap().unwrap(), before);

        assert!(service.toggle_task("user_1", 1).unwrap().completed);
        assert!(!service.toggle_task("user_1", 1).unwrap().completed);
    }

    #[test]
    fn test_clear_completed() {
        let (_, service) = service();
        for text in ["A", "B", "C", "D"] {
            service.add_task("u", text).unwrap();
        }
        service.toggle_task("u", 0).unwrap();
        service.toggle_task("u", 2).unwrap();

        assert_eq!(service.clear_completed_tasks("u").unwrap(), 2);
        let texts: Vec<String> = service.tasks("u").unwrap().into_iter().map(|t| t.text).collect();
        assert_eq!(texts, vec!["B", "D"]);
        assert_eq!(service.clear_completed_tasks("u").unwrap(), 0);
    }

    #[test]
    fn test_move_goal_clamped_is_success() {
        let (repo, service) = service();
        service.add_goal("u", "launch", Priority::High, Some("2026-11-01")).unwrap();
        let rev = repo.load_workspace("u").unwrap().unwrap().revision;

        let goal = service.move_goal("u", 0, Direction::Back).unwrap();
        assert_eq!(goal.status, GoalStatus::Planning);
        assert_eq!(repo.load_workspace("u").unwrap().unwrap().revision, rev);

        service.move_goal("u", 0, Direction::Forward).unwrap();
        let goal = service.move_goal("u", 0, Direction::Forward).unwrap();
        assert_eq!(goal.status, GoalStatus::Completed);
        let goal = service.move_goal("u", 0, Direction::Forward).unwrap();
        assert_eq!(goal.status, GoalStatus::Completed);

        assert!(service.move_goal("u", 3, Direction::Forward).unwrap_err().is_not_found());
    }

    #[test]
    fn test_id_addressing_survives_shifts() {
        let (_, service) = service();
        service.add_task("u", "a").unwrap();
        let (_, b) = service.add_task("u", "b").unwrap();
        service.delete_task("u", 0).unwrap();

        let toggled = service.toggle_task_by_id("u", b.id).unwrap();
        assert_eq!(toggled.text, "b");
        assert!(toggled.completed);

        service.delete_task_by_id("u", b.id).unwrap();
        assert!(service.delete_task_by_id("u", b.id).unwrap_err().is_not_found());
    }

    #[test]
    fn test_goal_id_addressing() {
        let (_, service) = service();
        let goal = service.add_goal("u", "hire", Priority::Medium, None).unwrap();
        let moved = service.move_goal_by_id("u", goal.id, Direction::Forward).unwrap();
        assert_eq!(moved.status, GoalStatus::InProgress);
        service.delete_goal_by_id("u", goal.id).unwrap();
        assert!(service.goal_board("u").unwrap().is_empty());
    }

    #[test]
    fn test_snapshot_stats_never_writes() {
        let (repo, service) = service();
        let stats = service.snapshot_stats("nobody").unwrap();
        assert_eq!(stats.streak, 1);
        assert_eq!(stats.goal_count, 0);
        assert!(repo.load_workspace("nobody").unwrap().is_none());
    }

    #[test]
    fn test_log_hours() {
        let (_, service) = service();
        service.log_hours("u", Decimal::new(4, 0)).unwrap();
        assert!(service.log_hours("u", Decimal::new(-1, 0)).unwrap_err().is_validation());
        assert_eq!(service.work_log("u").unwrap().len(), 1);
        assert_eq!(service.total_hours("u").unwrap(), Decimal::new(4, 0));

        assert!(service.log_hours("u", Decimal::MAX).unwrap_err().is_validation());
        service.log_hours("u", Decimal::new(24, 0)).unwrap();
        assert_eq!(service.total_hours("u").unwrap(), Decimal::new(28, 0));
    }

    #[test]
    fn test_unknown_account_rejected_without_workspace() {
        let (repo, service) = service();

        assert!(service.add_task("never_signed_up", "x").unwrap_err().is_not_found());
        assert!(service.get_or_create("never_signed_up").unwrap_err().is_not_found());
        assert!(service.record_visit("never_signed_up").unwrap_err().is_not_found());
        assert!(service.tasks("never_signed_up").unwrap_err().is_not_found());
        assert!(service.snapshot_stats("never_signed_up").unwrap_err().is_not_found());

        assert!(repo.load_workspace("never_signed_up").unwrap().is_none());
        assert_eq!(service.lock_entries(), 0);
    }

    #[test]
    fn test_deleted_account_stays_deleted() {
        let (repo, service) = service();
        service.add_task("u", "before").unwrap();

        assert!(service.delete_account("u").unwrap());
        assert!(!service.delete_account("u").unwrap());

        assert!(service.add_task("u", "after").unwrap_err().is_not_found());
        assert!(repo.load_workspace("u").unwrap().is_none());
        assert!(!repo.list_workspace_owners().unwrap().contains(&"u".to_string()));
        assert_eq!(service.lock_entries(), 0);
    }

    #[test]
    fn test_counters() {
        let (_, service) = service();
        assert!(service.unlock_achievement("u", "first-goal").unwrap());
        assert!(!service.unlock_achievement("u", "first-goal").unwrap());
        assert_eq!(service.record_score("u", 12).unwrap(), 12);
        assert_eq!(service.record_score("u", 3).unwrap(), 12);

        let ws = service.get_or_create("u").unwrap();
        let next_day = ws.last_visit + chrono::Duration::days(1);
        assert_eq!(service.record_visit_at("u", next_day).unwrap(), 2);
    }
}
