//! Repository port - storage abstraction for users and workspaces

use crate::domain::result::Result;
use crate::domain::{User, Workspace};

/// Storage medium for the user directory and per-user workspaces
///
/// A workspace is stored as one unit. `save_workspace` is compare-and-swap on
/// `Workspace::revision`: implementations must reject a save whose revision
/// does not match the stored one with `Error::Conflict`, and must not return
/// before the write is durable for the next read.
pub trait WorkspaceRepository: Send + Sync {
    /// Backend name (e.g., "duckdb", "memory")
    fn name(&self) -> &str;

    // === Users ===

    /// Insert or refresh a user; the stored `created_at` is kept on refresh
    fn upsert_user(&self, user: &User) -> Result<User>;

    /// Get a user by id
    fn get_user(&self, user_id: &str) -> Result<Option<User>>;

    /// All users, oldest first
    fn list_users(&self) -> Result<Vec<User>>;

    /// Delete a user together with their workspace; false if no such user
    fn delete_user(&self, user_id: &str) -> Result<bool>;

    // === Workspaces ===

    /// Load a workspace with its current revision
    fn load_workspace(&self, user_id: &str) -> Result<Option<Workspace>>;

    /// Store `initial` unless a workspace already exists; returns whichever
    /// workspace is stored afterwards
    fn create_workspace_if_absent(&self, user_id: &str, initial: &Workspace) -> Result<Workspace>;

    /// Write back a workspace read at `workspace.revision`; returns the new revision
    fn save_workspace(&self, user_id: &str, workspace: &Workspace) -> Result<u64>;

    /// Ids of every user that owns a stored workspace
    fn list_workspace_owners(&self) -> Result<Vec<String>>;
}
