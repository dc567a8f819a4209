//! Core domain entities
//!
//! All entities are defined here. These are pure data structures with
//! validation logic - no I/O or external dependencies.

mod goal;
pub mod result;
mod stats;
mod task;
mod user;
mod work_log;
mod workspace;

pub use goal::{Direction, Goal, GoalStatus, Priority};
pub use stats::{BoardCard, GoalBoard, WorkspaceStats};
pub use task::Task;
pub use user::User;
pub use work_log::{WorkLogEntry, MAX_HOURS_PER_ENTRY};
pub use workspace::{Workspace, CURRENT_SCHEMA_VERSION};
