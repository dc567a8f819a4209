//! CLI command implementations

pub mod dashboard;
pub mod doctor;
pub mod goal;
pub mod logs;
pub mod session;
pub mod status;
pub mod task;
pub mod worklog;

use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};
use founders_core::config::StorageKind;
use founders_core::services::{EntryPoint, LogEvent, LoggingService};
use founders_core::{FoundersContext, User};

/// Get the logging service for CLI operations
///
/// Returns None if logging fails to initialize (shouldn't block operations)
pub fn get_logger() -> Option<LoggingService> {
    let data_dir = get_data_dir().ok()?;
    std::fs::create_dir_all(&data_dir).ok()?;
    match LoggingService::new(&data_dir, EntryPoint::Cli, env!("CARGO_PKG_VERSION")) {
        Ok(logger) => Some(logger),
        Err(e) => {
            tracing::debug!(error = %e, "activity log unavailable");
            None
        }
    }
}

/// Log an event, ignoring any errors (logging should never break the app)
pub fn log_event(logger: &Option<LoggingService>, event: LogEvent) {
    if let Some(l) = logger {
        if let Err(e) = l.log(event) {
            tracing::debug!(error = %e, "failed to write activity log");
        }
    }
}

/// Data directory from FOUNDERS_DIR or ~/.founders
pub fn get_data_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("FOUNDERS_DIR") {
        return Ok(PathBuf::from(dir));
    }
    dirs::home_dir()
        .map(|home| home.join(".founders"))
        .ok_or_else(|| anyhow!("Could not find home directory (set FOUNDERS_DIR)"))
}

/// The in-memory store is gone when the process exits, so a session
/// started by one `fc` run could never be seen by the next
fn check_storage(storage: StorageKind) -> Result<()> {
    if storage == StorageKind::Memory {
        bail!(
            "memory storage only lives for one process and cannot back the CLI \
             (unset FOUNDERS_STORAGE or set app.storage to \"duckdb\")"
        );
    }
    Ok(())
}

/// Open the store in the data directory
pub fn get_context() -> Result<FoundersContext> {
    let data_dir = get_data_dir()?;
    let ctx = FoundersContext::new(&data_dir)
        .with_context(|| format!("Failed to open founders data in {}", data_dir.display()))?;
    check_storage(ctx.config.storage)?;
    Ok(ctx)
}

/// Open the store and resolve the signed-in user
pub fn get_signed_in() -> Result<(FoundersContext, User)> {
    let ctx = get_context()?;
    let user = ctx.session_service.require_user()?;
    Ok((ctx, user))
}

/// Convert a 1-based position from a listing into a store index
pub fn position_to_index(position: i64) -> i64 {
    position.saturating_sub(1)
}

/// Print a value as pretty JSON
pub fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
