//! Work log commands - hours worked

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;

use founders_core::{OperationResult, WorkLogEntry};

use super::{get_signed_in, print_json};
use crate::output;

#[derive(Subcommand)]
pub enum LogCommands {
    /// Record hours worked
    Add {
        /// Hours, e.g. 2 or 1.5
        hours: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the work log
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

pub fn run(command: LogCommands) -> Result<()> {
    let (ctx, user) = get_signed_in()?;
    let store = &ctx.workspace_service;

    match command {
        LogCommands::Add { hours, json } => {
            let hours = WorkLogEntry::parse_hours(&hours)?;
            store.log_hours(&user.id, hours)?;
            let total = store.total_hours(&user.id)?;
            if json {
                return print_json(&OperationResult::ok(serde_json::json!({
                    "hours": hours,
                    "total": total,
                })));
            }
            output::success(&format!("Logged {}h ({}h total)", hours, total));
        }
        LogCommands::List { json } => {
            let entries = store.work_log(&user.id)?;
            if json {
                return print_json(&entries);
            }
            if entries.is_empty() {
                println!("No hours logged yet.");
                return Ok(());
            }

            let mut table = output::create_table();
            table.set_header(vec!["#", "Logged", "Hours"]);
            for (i, entry) in entries.iter().enumerate() {
                table.add_row(vec![
                    (i + 1).to_string(),
                    entry.logged_at.format("%Y-%m-%d %H:%M").to_string(),
                    entry.hours.to_string(),
                ]);
            }
            println!("{}", table);
            println!(
                "Total: {}h",
                store.total_hours(&user.id)?.to_string().bold()
            );
        }
    }

    Ok(())
}
