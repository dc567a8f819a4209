//! Task commands - the to-do list

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;

use founders_core::OperationResult;

use super::{get_signed_in, position_to_index, print_json};
use crate::output;

#[derive(Subcommand)]
pub enum TaskCommands {
    /// Add a task
    Add {
        /// Task text
        text: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List tasks
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Toggle a task between open and done
    Toggle {
        /// Position as shown by `fc task list`
        #[arg(allow_negative_numbers = true)]
        position: i64,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete a task
    Delete {
        /// Position as shown by `fc task list`
        #[arg(allow_negative_numbers = true)]
        position: i64,
    },
    /// Remove every completed task
    Clear {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

pub fn run(command: TaskCommands) -> Result<()> {
    let (ctx, user) = get_signed_in()?;
    let store = &ctx.workspace_service;

    match command {
        TaskCommands::Add { text, json } => {
            let (index, task) = store.add_task(&user.id, &text)?;
            if json {
                return print_json(&OperationResult::ok(task));
            }
            output::success(&format!("Added task #{}: {}", index + 1, task.text));
        }
        TaskCommands::List { json } => {
            let tasks = store.tasks(&user.id)?;
            if json {
                return print_json(&tasks);
            }
            if tasks.is_empty() {
                output::info("No tasks yet. Add one with `fc task add \"...\"`.");
                return Ok(());
            }

            let mut table = output::create_table();
            table.set_header(vec!["#", "", "Task"]);
            for (i, task) in tasks.iter().enumerate() {
                let (mark, text) = if task.completed {
                    ("✓".green().to_string(), task.text.dimmed().strikethrough().to_string())
                } else {
                    ("○".to_string(), task.text.clone())
                };
                table.add_row(vec![(i + 1).to_string(), mark, text]);
            }
            println!("{}", table);

            let remaining = tasks.iter().filter(|t| !t.completed).count();
            println!("{} remaining", remaining.to_string().bold());
        }
        TaskCommands::Toggle { position, json } => {
            let task = store.toggle_task(&user.id, position_to_index(position))?;
            if json {
                return print_json(&OperationResult::ok(task));
            }
            let state = if task.completed { "done" } else { "open" };
            output::success(&format!("{} is now {}", task.text, state));
        }
        TaskCommands::Delete { position } => {
            store.delete_task(&user.id, position_to_index(position))?;
            output::success(&format!("Deleted task #{}", position));
        }
        TaskCommands::Clear { json } => {
            let removed = store.clear_completed_tasks(&user.id)?;
            if json {
                return print_json(&serde_json::json!({ "removed": removed }));
            }
            output::success(&format!("Cleared {} completed task(s)", removed));
        }
    }

    Ok(())
}
