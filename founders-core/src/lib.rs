//! Founders Core - per-user workspace store for founder productivity
//!
//! This crate implements the core domain logic following hexagonal architecture:
//!
//! - **domain**: Workspace, tasks, goals, work log, users
//! - **ports**: Trait definitions for external dependencies (WorkspaceRepository, IdentityProvider)
//! - **services**: Business logic orchestration (workspace store, session, status, doctor, activity log)
//! - **adapters**: Concrete implementations (DuckDB, in-memory, local identity)

pub mod adapters;
pub mod config;
pub mod domain;
pub mod log_migrations;
pub mod migrations;
pub mod ports;
pub mod services;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use adapters::duckdb::DuckDbRepository;
use adapters::memory::MemoryRepository;
use config::{Config, StorageKind};
use ports::WorkspaceRepository;
use services::*;

// Re-export commonly used types at crate root
pub use domain::result::{Error, OperationResult, Result};
pub use domain::{
    Direction, Goal, GoalBoard, GoalStatus, Priority, Task, User, WorkLogEntry, Workspace,
    WorkspaceStats,
};

/// Workspace database file inside the data directory
pub const DB_FILENAME: &str = "founders.duckdb";

/// Main context for Founders operations
///
/// Holds the repository, configuration and every service wired to it.
pub struct FoundersContext {
    pub config: Config,
    pub data_dir: PathBuf,
    pub repository: Arc<dyn WorkspaceRepository>,
    pub workspace_service: Arc<WorkspaceService>,
    pub session_service: SessionService,
    pub status_service: StatusService,
    pub doctor_service: DoctorService,
}

impl FoundersContext {
    /// Open the store in `data_dir`, creating the directory and schema if needed
    pub fn new(data_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(data_dir)?;
        let config = Config::load(data_dir)?;

        let repository: Arc<dyn WorkspaceRepository> = match config.storage {
            StorageKind::Duckdb => {
                let repository = DuckDbRepository::new(&data_dir.join(DB_FILENAME))?;
                repository.ensure_schema()?;
                Arc::new(repository)
            }
            StorageKind::Memory => Arc::new(MemoryRepository::new()),
        };

        Ok(Self::with_repository(config, data_dir, repository))
    }

    /// Wire services around an existing repository
    pub fn with_repository(
        config: Config,
        data_dir: &Path,
        repository: Arc<dyn WorkspaceRepository>,
    ) -> Self {
        let workspace_service = Arc::new(WorkspaceService::new(Arc::clone(&repository)));
        let session_service = SessionService::new(
            Arc::clone(&repository),
            Arc::clone(&workspace_service),
            data_dir.to_path_buf(),
        );
        let status_service = StatusService::new(Arc::clone(&repository), data_dir.to_path_buf());
        let doctor_service = DoctorService::new(Arc::clone(&repository));

        tracing::debug!(storage = repository.name(), data_dir = %data_dir.display(), "context ready");

        Self {
            config,
            data_dir: data_dir.to_path_buf(),
            repository,
            workspace_service,
            session_service,
            status_service,
            doctor_service,
        }
    }
}
