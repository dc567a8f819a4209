//! Read models derived from a workspace

use serde::Serialize;

use super::goal::{Goal, GoalStatus};

/// Dashboard counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceStats {
    pub completed_count: usize,
    pub open_goal_count: usize,
    pub goal_count: usize,
    pub streak: u32,
}

/// A goal placed on the board, with the position used to address it
#[derive(Debug, Clone, Serialize)]
pub struct BoardCard {
    pub index: usize,
    pub goal: Goal,
}

/// Goals grouped into one column per status
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalBoard {
    pub planning: Vec<BoardCard>,
    pub in_progress: Vec<BoardCard>,
    pub completed: Vec<BoardCard>,
}

impl GoalBoard {
    pub fn from_goals(goals: &[Goal]) -> Self {
        let mut board = GoalBoard::default();
        for (index, goal) in goals.iter().enumerate() {
            let card = BoardCard {
                index,
                goal: goal.clone(),
            };
            match goal.status {
                GoalStatus::Planning => board.planning.push(card),
                GoalStatus::InProgress => board.in_progress.push(card),
                GoalStatus::Completed => board.completed.push(card),
            }
        }
        board
    }

    pub fn column(&self, status: GoalStatus) -> &[BoardCard] {
        match status {
            GoalStatus::Planning => &self.planning,
            GoalStatus::InProgress => &self.in_progress,
            GoalStatus::Completed => &self.completed,
        }
    }

    pub fn len(&self) -> usize {
        self.planning.len() + self.in_progress.len() + self.completed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
