//! Goal commands - the three-column goal board

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;

use founders_core::{Direction, GoalStatus, OperationResult, Priority};

use super::{get_signed_in, position_to_index, print_json};
use crate::output;

#[derive(Subcommand)]
pub enum GoalCommands {
    /// Add a goal in the Planning column
    Add {
        /// Goal text
        text: String,
        /// low, medium or high
        #[arg(long, short, default_value = "medium")]
        priority: Priority,
        /// Free-form deadline (e.g. 2026-12-31)
        #[arg(long, short)]
        deadline: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the goal board
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Move a goal one column forward or back
    Move {
        /// Position as shown by `fc goal list`
        #[arg(allow_negative_numbers = true)]
        position: i64,
        /// forward or back
        #[arg(default_value = "forward")]
        direction: Direction,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete a goal
    Delete {
        /// Position as shown by `fc goal list`
        #[arg(allow_negative_numbers = true)]
        position: i64,
    },
}

pub fn run(command: GoalCommands) -> Result<()> {
    let (ctx, user) = get_signed_in()?;
    let store = &ctx.workspace_service;

    match command {
        GoalCommands::Add {
            text,
            priority,
            deadline,
            json,
        } => {
            let goal = store.add_goal(&user.id, &text, priority, deadline.as_deref())?;
            if json {
                return print_json(&OperationResult::ok(goal));
            }
            output::success(&format!("Added goal: {}", goal.text));
        }
        GoalCommands::List { json } => {
            let board = store.goal_board(&user.id)?;
            if json {
                return print_json(&board);
            }
            if board.is_empty() {
                output::info("No goals yet. Add one with `fc goal add \"...\"`.");
                return Ok(());
            }

            for status in GoalStatus::ORDER {
                let cards = board.column(status);
                println!("{} ({})", output::status_label(status).bold(), cards.len());
                if cards.is_empty() {
                    println!("  {}", "-".dimmed());
                }
                for card in cards {
                    let deadline = card
                        .goal
                        .deadline
                        .as_deref()
                        .map(|d| format!(" due {}", d).dimmed().to_string())
                        .unwrap_or_default();
                    println!(
                        "  #{} {} [{}]{}",
                        card.index + 1,
                        card.goal.text,
                        output::priority_label(card.goal.priority),
                        deadline
                    );
                }
                println!();
            }
        }
        GoalCommands::Move {
            position,
            direction,
            json,
        } => {
            let goal = store.move_goal(&user.id, position_to_index(position), direction)?;
            if json {
                return print_json(&OperationResult::ok(goal));
            }
            output::success(&format!(
                "{} is in {}",
                goal.text,
                output::status_label(goal.status)
            ));
        }
        GoalCommands::Delete { position } => {
            store.delete_goal(&user.id, position_to_index(position))?;
            output::success(&format!("Deleted goal #{}", position));
        }
    }

    Ok(())
}
