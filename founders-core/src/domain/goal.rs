//! Goal domain model and its lifecycle

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::result::Error;

/// Goal priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

impl FromStr for Priority {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            other => Err(Error::validation(format!(
                "invalid priority '{}' (expected low, medium or high)",
                other
            ))),
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Goal lifecycle stage
///
/// Stages are ordered planning -> inprogress -> completed. A goal only ever
/// moves to an adjacent stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GoalStatus {
    Planning,
    InProgress,
    Completed,
}

impl GoalStatus {
    pub const ORDER: [GoalStatus; 3] = [
        GoalStatus::Planning,
        GoalStatus::InProgress,
        GoalStatus::Completed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GoalStatus::Planning => "planning",
            GoalStatus::InProgress => "inprogress",
            GoalStatus::Completed => "completed",
        }
    }

    fn position(self) -> usize {
        match self {
            GoalStatus::Planning => 0,
            GoalStatus::InProgress => 1,
            GoalStatus::Completed => 2,
        }
    }

    /// Adjacent stage in `direction`, clamped at both ends
    pub fn step(self, direction: Direction) -> GoalStatus {
        let pos = self.position();
        let next = match direction {
            Direction::Forward => (pos + 1).min(Self::ORDER.len() - 1),
            Direction::Back => pos.saturating_sub(1),
        };
        Self::ORDER[next]
    }
}

impl fmt::Display for GoalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Direction of a goal move on the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Forward,
    Back,
}

impl FromStr for Direction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "forward" | "next" => Ok(Direction::Forward),
            "back" | "prev" => Ok(Direction::Back),
            other => Err(Error::validation(format!(
                "invalid direction '{}' (expected forward or back)",
                other
            ))),
        }
    }
}

/// A planned objective
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    pub id: Uuid,
    pub text: String,
    pub priority: Priority,
    /// Opaque date string as entered; never an empty string
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<String>,
    pub status: GoalStatus,
    pub created_at: DateTime<Utc>,
}

impl Goal {
    pub fn new(text: &str, priority: Priority, deadline: Option<&str>) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: text.trim().to_string(),
            priority,
            deadline: deadline
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(str::to_string),
            status: GoalStatus::Planning,
            created_at: Utc::now(),
        }
    }

    /// Move one stage; returns true when the status changed
    pub fn advance(&mut self, direction: Direction) -> bool {
        let next = self.status.step(direction);
        let changed = next != self.status;
        self.status = next;
        changed
    }

    pub fn is_open(&self) -> bool {
        self.status != GoalStatus::Completed
    }

    pub fn validate(&self) -> Result<(), &'static str> {
        if self.text.trim().is_empty() {
            return Err("goal text cannot be empty");
        }
        Ok(())
    }
}
