//! Status command - store summary

use anyhow::Result;
use colored::Colorize;
use comfy_table::{ContentArrangement, Table};

use super::{get_context, get_logger};

pub fn run(json: bool) -> Result<()> {
    let ctx = get_context()?;
    let mut status = ctx.status_service.get_status()?;
    status.log_entries = get_logger().and_then(|l| l.count().ok());

    if json {
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    println!("{}", "Founders Cloud Status".bold());
    println!();

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);

    table.add_row(vec!["Storage", &status.storage]);
    table.add_row(vec!["Data directory", &status.data_dir]);
    table.add_row(vec!["Accounts", &status.total_users.to_string()]);
    table.add_row(vec!["Workspaces", &status.total_workspaces.to_string()]);
    table.add_row(vec![
        "Tasks",
        &format!("{} ({} open)", status.total_tasks, status.open_tasks),
    ]);
    table.add_row(vec![
        "Goals",
        &format!("{} ({} open)", status.total_goals, status.open_goals),
    ]);
    if let Some(entries) = status.log_entries {
        table.add_row(vec!["Log entries", &entries.to_string()]);
    }

    println!("{}", table);
    println!();

    match &status.current_user {
        Some(id) => println!("Signed in as {}", id.cyan()),
        None => println!("{}", "Not signed in".dimmed()),
    }

    Ok(())
}
