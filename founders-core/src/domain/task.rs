//! Task (todo) domain model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single to-do item
///
/// Tasks are ordered by insertion; two tasks may share the same text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: Uuid,
    pub text: String,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

impl Task {
    /// Create an open task; text is trimmed
    pub fn new(text: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: text.trim().to_string(),
            completed: false,
            created_at: Utc::now(),
        }
    }

    pub fn toggle(&mut self) {
        self.completed = !self.completed;
    }

    pub fn validate(&self) -> Result<(), &'static str> {
        if self.text.trim().is_empty() {
            return Err("task text cannot be empty");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_task_is_open_and_trimmed() {
        let task = Task::new("  ship the beta  ");
        assert_eq!(task.text, "ship the beta");
        assert!(!task.completed);
        assert!(task.validate().is_ok());
    }

    #[test]
    fn test_toggle_twice_restores() {
        let mut task = Task::new("call investors");
        task.toggle();
        assert!(task.completed);
        task.toggle();
        assert!(!task.completed);
    }

    #[test]
    fn test_blank_task_invalid() {
        assert!(Task::new("   ").validate().is_err());
    }
}
