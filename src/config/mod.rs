//! Configuration system for sqlmem.
//!
//! Values resolve with priority defaults < config file < environment
//! variables. [`open_sqlite`] turns a resolved [`Config`] into a configured
//! SQLite handle ready to be passed to a store builder.

mod env_parser;
mod loader;
mod overrides;
mod paths;
mod validation;

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use rusqlite::Connection;

use crate::errors::Error;

pub use loader::ConfigFile;

/// SQLite journal modes accepted by the `journal_mode` setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JournalMode {
    Delete,
    Truncate,
    Persist,
    Memory,
    Wal,
    Off,
}

impl JournalMode {
    pub const fn as_str(self) -> &'static str {
        match self {
            JournalMode::Delete => "DELETE",
            JournalMode::Truncate => "TRUNCATE",
            JournalMode::Persist => "PERSIST",
            JournalMode::Memory => "MEMORY",
            JournalMode::Wal => "WAL",
            JournalMode::Off => "OFF",
        }
    }
}

impl FromStr for JournalMode {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Error> {
        match value.trim().to_ascii_uppercase().as_str() {
            "DELETE" => Ok(JournalMode::Delete),
            "TRUNCATE" => Ok(JournalMode::Truncate),
            "PERSIST" => Ok(JournalMode::Persist),
            "MEMORY" => Ok(JournalMode::Memory),
            "WAL" => Ok(JournalMode::Wal),
            "OFF" => Ok(JournalMode::Off),
            _ => Err(Error::Config(format!(
                "Invalid journal mode: {value} (expected one of DELETE, TRUNCATE, PERSIST, MEMORY, WAL, OFF)"
            ))),
        }
    }
}

impl fmt::Display for JournalMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuration values with priority: defaults < config file < env vars.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Path to the SQLite database.
    pub database_path: PathBuf,

    /// How long SQLite waits on a locked database, in milliseconds.
    pub busy_timeout_ms: u64,

    /// Journal mode applied when the database is opened.
    pub journal_mode: JournalMode,
}

impl Default for Config {
    fn default() -> Self {
        // Use home directory with sensible fallback for systems without HOME
        let home = dirs::home_dir().unwrap_or_else(|| {
            std::env::var("HOME")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("."))
        });

        Self {
            database_path: home.join(".sqlmem").join("memory.db"),
            busy_timeout_ms: 5000,
            journal_mode: JournalMode::Wal,
        }
    }
}

impl Config {
    /// Load configuration with defaults, file values, and environment overrides.
    pub fn load() -> Result<Self, Error> {
        let file_config = loader::load_from_file()?;
        Self::resolve(file_config, |name| std::env::var(name).ok())
    }

    /// Load configuration from an explicit file, then apply environment overrides.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the file does not exist or is invalid.
    pub fn load_from_path(path: &Path) -> Result<Self, Error> {
        let file_config = loader::load_from_path(path)?.ok_or_else(|| {
            Error::Config(format!("Config file not found: {}", path.display()))
        })?;
        Self::resolve(Some(file_config), |name| std::env::var(name).ok())
    }

    /// Resolve configuration from an optional file and an environment lookup.
    pub(crate) fn resolve(
        file_config: Option<ConfigFile>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, Error> {
        let mut config = Config::default();

        if let Some(mut file) = file_config {
            if let Some(path) = file.database_path.as_mut() {
                paths::expand_tilde(path);
            }
            config.merge_from_file(file)?;
        }

        overrides::apply_env_overrides(&mut config, &env)?;

        config.validate()?;

        Ok(config)
    }

    /// Replace the database path, expanding `~` and re-validating.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the path is empty.
    pub fn with_database_path(mut self, path: &Path) -> Result<Self, Error> {
        self.database_path = paths::expand_tilde_path(path);
        self.validate()?;
        Ok(self)
    }

    /// Merge configuration from a file into this config.
    fn merge_from_file(&mut self, file: ConfigFile) -> Result<(), Error> {
        if let Some(path) = file.database_path {
            self.database_path = path;
        }
        if let Some(timeout) = file.busy_timeout_ms {
            self.busy_timeout_ms = timeout;
        }
        if let Some(mode) = file.journal_mode {
            self.journal_mode = mode.parse()?;
        }
        Ok(())
    }

    /// Validate configuration values.
    fn validate(&self) -> Result<(), Error> {
        let validator = validation::ConfigValidator {
            database_path: &self.database_path,
            busy_timeout_ms: self.busy_timeout_ms,
        };

        validator.validate()
    }

    /// Ensure the parent directory of the database path exists.
    pub fn ensure_directories(&self) -> Result<(), Error> {
        if let Some(parent) = self.database_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    Error::Config(format!(
                        "Failed to create database directory {}: {e}",
                        parent.display()
                    ))
                })?;
            }
        }

        Ok(())
    }
}

/// Open the database named by `config` and apply its pragmas.
///
/// Creates the parent directory of the database file when missing. The
/// returned handle has no schema yet; the connector creates it.
///
/// # Errors
///
/// Returns `Error::Config` if the directory cannot be created, the file
/// cannot be opened, or a pragma is rejected.
pub fn open_sqlite(config: &Config) -> Result<Connection, Error> {
    config.ensure_directories()?;

    let conn = Connection::open(&config.database_path).map_err(|e| {
        Error::Config(format!(
            "Failed to open database {}: {e}",
            config.database_path.display()
        ))
    })?;

    conn.busy_timeout(Duration::from_millis(config.busy_timeout_ms))
        .map_err(|e| Error::Config(format!("Failed to set busy timeout: {e}")))?;

    let applied: String = conn
        .pragma_update_and_check(None, "journal_mode", config.journal_mode.as_str(), |row| {
            row.get(0)
        })
        .map_err(|e| Error::Config(format!("Failed to set journal mode: {e}")))?;

    tracing::debug!(
        path = %config.database_path.display(),
        journal_mode = %applied,
        busy_timeout_ms = config.busy_timeout_ms,
        "opened sqlite database"
    );

    Ok(conn)
}
