//! DuckDB repository implementation

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use std::thread;
use std::time::Duration;

use chrono::{DateTime, Utc};
use duckdb::{params, Connection, OptionalExt};

use crate::domain::result::{Error, Result};
use crate::domain::{User, Workspace};
use crate::ports::WorkspaceRepository;
use crate::services::{MigrationResult, MigrationService};

/// Maximum number of retries when database file is locked
const MAX_RETRIES: u32 = 5;

/// Initial retry delay in milliseconds (doubles each retry: 50, 100, 200, 400, 800ms)
const INITIAL_RETRY_DELAY_MS: u64 = 50;

/// Check if an error message indicates a file locking issue that should be retried
fn is_retryable_error(err_msg: &str) -> bool {
    let lower = err_msg.to_lowercase();
    // Windows error messages
    lower.contains("being used by another process")
        || lower.contains("cannot access the file")
        // Unix/macOS error messages
        || lower.contains("resource temporarily unavailable")
        || lower.contains("database is locked")
        || lower.contains("file is already open")
}

const USER_COLUMNS: &str = "user_id, name, startup, email, avatar, created_at";

/// DuckDB repository implementation
///
/// Users live in `sys_users`; each workspace is one row of `sys_workspaces`
/// holding the JSON document plus its schema version and revision.
pub struct DuckDbRepository {
    conn: Mutex<Connection>,
    db_path: Option<PathBuf>,
}

impl DuckDbRepository {
    /// Open (or create) a database file
    ///
    /// Includes retry logic with exponential backoff for file locking errors,
    /// which can occur when a second process holds the file briefly.
    pub fn new(db_path: &Path) -> Result<Self> {
        let mut last_error = None;

        for attempt in 0..MAX_RETRIES {
            match Self::try_open_connection(db_path) {
                Ok(conn) => {
                    return Ok(Self {
                        conn: Mutex::new(conn),
                        db_path: Some(db_path.to_path_buf()),
                    });
                }
                Err(e) => {
                    let err_msg = e.to_string();
                    if is_retryable_error(&err_msg) && attempt < MAX_RETRIES - 1 {
                        let delay =
                            Duration::from_millis(INITIAL_RETRY_DELAY_MS * 2u64.pow(attempt));
                        tracing::warn!(
                            attempt = attempt + 1,
                            max = MAX_RETRIES,
                            delay_ms = delay.as_millis() as u64,
                            error = %err_msg,
                            "database busy, retrying"
                        );
                        thread::sleep(delay);
                        last_error = Some(e);
                        continue;
                    }
                    return Err(e.into());
                }
            }
        }

        Err(last_error
            .map(Error::from)
            .unwrap_or_else(|| Error::database(format!("failed to open database after {} retries", MAX_RETRIES))))
    }

    /// Open a private in-memory database (tests, throwaway sessions)
    pub fn open_in_memory() -> Result<Self> {
        let config = duckdb::Config::default().enable_autoload_extension(false)?;
        let conn = Connection::open_in_memory_with_flags(config)?;
        Ok(Self {
            conn: Mutex::new(conn),
            db_path: None,
        })
    }

    fn try_open_connection(db_path: &Path) -> std::result::Result<Connection, duckdb::Error> {
        // Extension autoloading stays off; JSON is linked in via the "json" feature
        let config = duckdb::Config::default().enable_autoload_extension(false)?;
        Connection::open_with_flags(db_path, config)
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| Error::database(format!("connection lock poisoned: {}", e)))
    }

    /// Run database migrations using the MigrationService
    pub fn run_migrations(&self) -> Result<MigrationResult> {
        let conn = self.conn()?;
        let migration_service = MigrationService::new(&conn);
        Ok(migration_service.run_pending()?)
    }

    /// Ensure database schema exists (runs pending migrations)
    pub fn ensure_schema(&self) -> Result<()> {
        let result = self.run_migrations()?;
        if !result.applied.is_empty() {
            tracing::debug!(applied = ?result.applied, "applied migrations");
        }
        Ok(())
    }

    pub fn db_path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    /// Size of the database file in bytes (0 for in-memory databases)
    pub fn get_db_size(&self) -> Result<u64> {
        match &self.db_path {
            Some(path) => Ok(std::fs::metadata(path)?.len()),
            None => Ok(0),
        }
    }

    /// Check if a table exists
    pub fn table_exists(&self, table_name: &str) -> Result<bool> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM information_schema.tables WHERE table_name = ?",
            [table_name],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    fn row_to_user(row: &duckdb::Row) -> duckdb::Result<User> {
        // 0: user_id, 1: name, 2: startup, 3: email, 4: avatar, 5: created_at
        let created_str: String = row.get(5)?;
        Ok(User {
            id: row.get(0)?,
            name: row.get(1)?,
            startup: row.get(2)?,
            email: row.get(3)?,
            avatar: row.get(4)?,
            created_at: parse_timestamp(&created_str),
        })
    }

    fn read_user(conn: &Connection, user_id: &str) -> Result<Option<User>> {
        let user = conn
            .query_row(
                &format!("SELECT {} FROM sys_users WHERE user_id = ?", USER_COLUMNS),
                [user_id],
                Self::row_to_user,
            )
            .optional()?;
        Ok(user)
    }

    fn read_workspace(conn: &Connection, user_id: &str) -> Result<Option<Workspace>> {
        let row: Option<(i64, String)> = conn
            .query_row(
                "SELECT revision, CAST(data AS VARCHAR) FROM sys_workspaces WHERE user_id = ?",
                [user_id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        match row {
            Some((revision, data)) => {
                let mut workspace: Workspace = serde_json::from_str(&data)?;
                workspace.revision = revision as u64;
                Ok(Some(workspace))
            }
            None => Ok(None),
        }
    }
}

impl WorkspaceRepository for DuckDbRepository {
    fn name(&self) -> &str {
        "duckdb"
    }

    fn upsert_user(&self, user: &User) -> Result<User> {
        user.validate().map_err(Error::validation)?;
        let conn = self.conn()?;
        let now = Utc::now().to_rfc3339();

        // created_at is only written on first insert
        conn.execute(
            "INSERT INTO sys_users (user_id, name, startup, email, avatar, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT (user_id) DO UPDATE SET
                name = EXCLUDED.name,
                startup = EXCLUDED.startup,
                email = EXCLUDED.email,
                avatar = EXCLUDED.avatar,
                updated_at = EXCLUDED.updated_at",
            params![
                user.id,
                user.name,
                user.startup,
                user.email,
                user.avatar,
                user.created_at.to_rfc3339(),
                now,
            ],
        )?;

        Self::read_user(&conn, &user.id)?
            .ok_or_else(|| Error::database(format!("user {} missing after upsert", user.id)))
    }

    fn get_user(&self, user_id: &str) -> Result<Option<User>> {
        let conn = self.conn()?;
        Self::read_user(&conn, user_id)
    }

    fn list_users(&self) -> Result<Vec<User>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM sys_users ORDER BY created_at, user_id",
            USER_COLUMNS
        ))?;
        let users = stmt
            .query_map([], Self::row_to_user)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(users)
    }

    fn delete_user(&self, user_id: &str) -> Result<bool> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM sys_workspaces WHERE user_id = ?", params![user_id])?;
        let rows = tx.execute("DELETE FROM sys_users WHERE user_id = ?", params![user_id])?;
        tx.commit()?;
        Ok(rows > 0)
    }

    fn load_workspace(&self, user_id: &str) -> Result<Option<Workspace>> {
        let conn = self.conn()?;
        Self::read_workspace(&conn, user_id)
    }

    fn create_workspace_if_absent(&self, user_id: &str, initial: &Workspace) -> Result<Workspace> {
        let conn = self.conn()?;
        let data = serde_json::to_string(initial)?;

        conn.execute(
            "INSERT INTO sys_workspaces (user_id, schema_version, revision, data, updated_at)
             VALUES (?, ?, 0, ?, ?)
             ON CONFLICT (user_id) DO NOTHING",
            params![user_id, initial.schema_version, data, Utc::now().to_rfc3339()],
        )?;

        Self::read_workspace(&conn, user_id)?
            .ok_or_else(|| Error::database(format!("workspace for {} missing after insert", user_id)))
    }

    fn save_workspace(&self, user_id: &str, workspace: &Workspace) -> Result<u64> {
        let conn = self.conn()?;
        let data = serde_json::to_string(workspace)?;
        let expected = workspace.revision as i64;
        let next = expected + 1;

        let rows = conn.execute(
            "UPDATE sys_workspaces
             SET data = ?, schema_version = ?, revision = ?, updated_at = ?
             WHERE user_id = ? AND revision = ?",
            params![
                data,
                workspace.schema_version,
                next,
                Utc::now().to_rfc3339(),
                user_id,
                expected,
            ],
        )?;

        if rows == 1 {
            return Ok(next as u64);
        }

        let stored: Option<i64> = conn
            .query_row(
                "SELECT revision FROM sys_workspaces WHERE user_id = ?",
                [user_id],
                |row| row.get(0),
            )
            .optional()?;
        match stored {
            Some(current) => Err(Error::conflict(format!(
                "workspace for {} is at revision {}, write was based on {}",
                user_id, current, expected
            ))),
            None => Err(Error::not_found(format!("workspace for {}", user_id))),
        }
    }

    fn list_workspace_owners(&self) -> Result<Vec<String>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT user_id FROM sys_workspaces ORDER BY user_id")?;
        let owners = stmt
            .query_map([], |row| row.get(0))?
            .collect::<std::result::Result<Vec<String>, _>>()?;
        Ok(owners)
    }
}

fn parse_timestamp(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}
