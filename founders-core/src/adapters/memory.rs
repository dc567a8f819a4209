//! In-process repository
//!
//! Keeps users and workspaces in maps behind one mutex. Nothing survives the
//! process; used for tests and throwaway sessions (`FOUNDERS_STORAGE=memory`).

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};

use crate::domain::result::{Error, Result};
use crate::domain::{User, Workspace};
use crate::ports::WorkspaceRepository;

#[derive(Default)]
struct State {
    users: HashMap<String, User>,
    workspaces: BTreeMap<String, Workspace>,
}

#[derive(Default)]
pub struct MemoryRepository {
    state: Mutex<State>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> Result<MutexGuard<'_, State>> {
        self.state
            .lock()
            .map_err(|e| Error::Other(format!("memory store lock poisoned: {}", e)))
    }
}

impl WorkspaceRepository for MemoryRepository {
    fn name(&self) -> &str {
        "memory"
    }

    fn upsert_user(&self, user: &User) -> Result<User> {
        user.validate().map_err(Error::validation)?;
        let mut state = self.state()?;
        let stored = match state.users.get(&user.id) {
            Some(existing) => User {
                created_at: existing.created_at,
                ..user.clone()
            },
            None => user.clone(),
        };
        state.users.insert(stored.id.clone(), stored.clone());
        Ok(stored)
    }

    fn get_user(&self, user_id: &str) -> Result<Option<User>> {
        Ok(self.state()?.users.get(user_id).cloned())
    }

    fn list_users(&self) -> Result<Vec<User>> {
        let mut users: Vec<User> = self.state()?.users.values().cloned().collect();
        users.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(users)
    }

    fn delete_user(&self, user_id: &str) -> Result<bool> {
        let mut state = self.state()?;
        state.workspaces.remove(user_id);
        Ok(state.users.remove(user_id).is_some())
    }

    fn load_workspace(&self, user_id: &str) -> Result<Option<Workspace>> {
        Ok(self.state()?.workspaces.get(user_id).cloned())
    }

    fn create_workspace_if_absent(&self, user_id: &str, initial: &Workspace) -> Result<Workspace> {
        let mut state = self.state()?;
        let stored = state
            .workspaces
            .entry(user_id.to_string())
            .or_insert_with(|| Workspace {
                revision: 0,
                ..initial.clone()
            });
        Ok(stored.clone())
    }

    fn save_workspace(&self, user_id: &str, workspace: &Workspace) -> Result<u64> {
        let mut state = self.state()?;
        let stored = state
            .workspaces
            .get_mut(user_id)
            .ok_or_else(|| Error::not_found(format!("workspace for {}", user_id)))?;

        if stored.revision != workspace.revision {
            return Err(Error::conflict(format!(
                "workspace for {} is at revision {}, write was based on {}",
                user_id, stored.revision, workspace.revision
            )));
        }

        let next = workspace.revision + 1;
        *stored = Workspace {
            revision: next,
            ..workspace.clone()
        };
        Ok(next)
    }

    fn list_workspace_owners(&self) -> Result<Vec<String>> {
        Ok(self.state()?.workspaces.keys().cloned().collect())
    }
}
