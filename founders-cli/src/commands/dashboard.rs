//! Dashboard command - greeting, streak and counters

use anyhow::Result;
use colored::Colorize;

use super::{get_signed_in, print_json};
use crate::output;

pub fn run(json: bool) -> Result<()> {
    let (ctx, user) = get_signed_in()?;
    let store = &ctx.workspace_service;

    let streak = store.record_visit(&user.id)?;
    let stats = store.snapshot_stats(&user.id)?;
    let remaining = store.remaining_task_count(&user.id)?;
    let hours = store.total_hours(&user.id)?;

    if json {
        return print_json(&serde_json::json!({
            "user": user,
            "stats": stats,
            "remainingTasks": remaining,
            "totalHours": hours,
        }));
    }

    println!("{} {}", "Welcome back,".bold(), format!("{} {}", user.first_name(), user.avatar).bold());
    if !user.startup.is_empty() {
        println!("{}", user.startup.dimmed());
    }
    println!();

    let mut table = output::create_table();
    table.add_row(vec!["Streak".to_string(), format!("{} day(s)", streak)]);
    table.add_row(vec!["Tasks completed".to_string(), stats.completed_count.to_string()]);
    table.add_row(vec!["Tasks remaining".to_string(), remaining.to_string()]);
    table.add_row(vec![
        "Open goals".to_string(),
        format!("{} of {}", stats.open_goal_count, stats.goal_count),
    ]);
    table.add_row(vec!["Hours logged".to_string(), hours.to_string()]);
    println!("{}", table);

    Ok(())
}
