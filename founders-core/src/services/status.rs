//! Status service - store-wide counts

use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;

use crate::config::Config;
use crate::domain::result::Result;
use crate::ports::WorkspaceRepository;

pub struct StatusService {
    repository: Arc<dyn WorkspaceRepository>,
    data_dir: PathBuf,
}

impl StatusService {
    pub fn new(repository: Arc<dyn WorkspaceRepository>, data_dir: PathBuf) -> Self {
        Self {
            repository,
            data_dir,
        }
    }

    pub fn get_status(&self) -> Result<StatusSummary> {
        let users = self.repository.list_users()?;
        let owners = self.repository.list_workspace_owners()?;

        let mut total_tasks = 0;
        let mut open_tasks = 0;
        let mut total_goals = 0;
        let mut open_goals = 0;
        for owner in &owners {
            if let Some(ws) = self.repository.load_workspace(owner)? {
                total_tasks += ws.tasks.len();
                open_tasks += ws.remaining_tasks();
                total_goals += ws.goals.len();
                open_goals += ws.goals.iter().filter(|g| g.is_open()).count();
            }
        }

        let current_user = Config::load(&self.data_dir)?
            .current_user
            .filter(|id| users.iter().any(|u| &u.id == id));

        Ok(StatusSummary {
            storage: self.repository.name().to_string(),
            data_dir: self.data_dir.display().to_string(),
            total_users: users.len(),
            total_workspaces: owners.len(),
            total_tasks,
            open_tasks,
            total_goals,
            open_goals,
            log_entries: None,
            current_user,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct StatusSummary {
    pub storage: String,
    pub data_dir: String,
    pub total_users: usize,
    pub total_workspaces: usize,
    pub total_tasks: usize,
    pub open_tasks: usize,
    pub total_goals: usize,
    pub open_goals: usize,
    /// Filled in by callers that have the activity log open
    pub log_entries: Option<u64>,
    pub current_user: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::MemoryRepository;
    use crate::domain::{Priority, User};
    use crate::services::WorkspaceService;
    use tempfile::tempdir;

    #[test]
    fn test_counts_across_users() {
        let dir = tempdir().unwrap();
        let repo = Arc::new(MemoryRepository::new());
        let workspaces = WorkspaceService::new(repo.clone());

        repo.upsert_user(&User::new("a", "Ada", "a@x.io")).unwrap();
        repo.upsert_user(&User::new("b", "Bob", "b@x.io")).unwrap();
        workspaces.add_task("a", "one").unwrap();
        workspaces.add_task("a", "two").unwrap();
        workspaces.toggle_task("a", 0).unwrap();
        workspaces.add_goal("b", "ship", Priority::High, None).unwrap();

        let status = StatusService::new(repo, dir.path().to_path_buf()).get_status().unwrap();
        assert_eq!(status.storage, "memory");
        assert_eq!(status.total_users, 2);
        assert_eq!(status.total_workspaces, 2);
        assert_eq!(status.total_tasks, 2);
        assert_eq!(status.open_tasks, 1);
        assert_eq!(status.open_goals, 1);
        assert!(status.current_user.is_none());
    }
}
