//! Activity log migrations - embedded SQL for logs.duckdb
//!
//! Applied by `LoggingService` through the same `MigrationService` as the main
//! database, but tracked in the log database's own `sys_migrations` table.

/// All log migrations, embedded at compile time.
/// Format: (filename, sql_content)
pub const LOG_MIGRATIONS: &[(&str, &str)] = &[
    ("000_migrations.sql", include_str!("000_migrations.sql")),
    ("001_initial_schema.sql", include_str!("001_initial_schema.sql")),
];
