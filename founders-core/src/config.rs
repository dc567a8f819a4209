//! Configuration management
//!
//! Settings live in `<data_dir>/settings.json`:
//! ```json
//! {
//!   "app": { "currentUser": "user_3f2c...", "storage": "duckdb" }
//! }
//! ```
//! Keys this crate does not manage are kept as-is when saving.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::result::{Error, Result};

/// Raw settings.json structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettingsFile {
    #[serde(default)]
    app: AppSettings,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AppSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    current_user: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    storage: Option<String>,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

/// Which repository backs the workspace store
///
/// `Memory` keeps nothing once the process exits; it is for library users and
/// tests, and the CLI refuses it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    #[default]
    Duckdb,
    Memory,
}

impl FromStr for StorageKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "duckdb" | "" => Ok(StorageKind::Duckdb),
            "memory" => Ok(StorageKind::Memory),
            other => Err(Error::Config(format!("unknown storage '{}'", other))),
        }
    }
}

impl fmt::Display for StorageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageKind::Duckdb => write!(f, "duckdb"),
            StorageKind::Memory => write!(f, "memory"),
        }
    }
}

const SETTINGS_FILE: &str = "settings.json";

fn read_settings(data_dir: &Path) -> Result<SettingsFile> {
    let settings_path = data_dir.join(SETTINGS_FILE);
    if !settings_path.exists() {
        return Ok(SettingsFile::default());
    }
    let content = std::fs::read_to_string(&settings_path)?;
    serde_json::from_str(&content)
        .map_err(|e| Error::Config(format!("{}: {}", settings_path.display(), e)))
}

/// Founders configuration (the parts of settings.json we manage)
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub current_user: Option<String>,
    pub storage: StorageKind,
}

impl Config {
    /// Load config from the data directory
    ///
    /// Storage can be overridden with FOUNDERS_STORAGE (for CI/testing).
    pub fn load(data_dir: &Path) -> Result<Self> {
        let raw = read_settings(data_dir)?;

        let storage = match std::env::var("FOUNDERS_STORAGE").ok() {
            Some(value) => value.parse::<StorageKind>()?,
            None => match raw.app.storage.as_deref() {
                Some(value) => value.parse::<StorageKind>()?,
                None => StorageKind::default(),
            },
        };

        Ok(Self {
            current_user: raw.app.current_user.filter(|id| !id.trim().is_empty()),
            storage,
        })
    }

    /// Save config to the data directory, preserving unmanaged settings
    pub fn save(&self, data_dir: &Path) -> Result<()> {
        let mut settings = read_settings(data_dir)?;

        settings.app.current_user = self.current_user.clone();
        // Env overrides are not persisted
        if std::env::var("FOUNDERS_STORAGE").is_err() {
            settings.app.storage = match self.storage {
                StorageKind::Duckdb => settings.app.storage.take(),
                StorageKind::Memory => Some(self.storage.to_string()),
            };
        }

        std::fs::create_dir_all(data_dir)?;
        let content = serde_json::to_string_pretty(&settings)?;
        std::fs::write(data_dir.join(SETTINGS_FILE), content)?;
        Ok(())
    }
}
