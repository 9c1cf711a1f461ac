//! Environment variable parsing utilities for configuration.

use crate::errors::Error;
use std::path::PathBuf;

use super::JournalMode;
use super::paths;

pub const DATABASE_PATH_VAR: &str = "SQLMEM_DATABASE_PATH";
pub const BUSY_TIMEOUT_VAR: &str = "SQLMEM_BUSY_TIMEOUT_MS";
pub const JOURNAL_MODE_VAR: &str = "SQLMEM_JOURNAL_MODE";

fn non_empty<'a>(name: &str, value: &'a str) -> Result<&'a str, Error> {
    if value.trim().is_empty() {
        return Err(Error::Config(format!("{name} cannot be empty")));
    }
    Ok(value)
}

/// Parse environment variable as a path, expanding tilde.
fn parse_env_path(name: &str, value: &str) -> Result<PathBuf, Error> {
    let value = non_empty(name, value)?;
    Ok(paths::expand_tilde_path(&PathBuf::from(value)))
}

/// Parse environment variable as an unsigned integer.
fn parse_env_u64(name: &str, value: &str) -> Result<u64, Error> {
    non_empty(name, value)?
        .trim()
        .parse()
        .map_err(|e| Error::Config(format!("Invalid {name} value: {e}")))
}

fn parse_env_journal_mode(name: &str, value: &str) -> Result<JournalMode, Error> {
    non_empty(name, value)?.parse()
}

/// Apply SQLMEM_DATABASE_PATH override.
pub fn apply_database_path_override(
    database_path: &mut PathBuf,
    env: &impl Fn(&str) -> Option<String>,
) -> Result<(), Error> {
    if let Some(val) = env(DATABASE_PATH_VAR) {
        *database_path = parse_env_path(DATABASE_PATH_VAR, &val)?;
    }
    Ok(())
}

/// Apply SQLMEM_BUSY_TIMEOUT_MS override.
pub fn apply_busy_timeout_override(
    busy_timeout_ms: &mut u64,
    env: &impl Fn(&str) -> Option<String>,
) -> Result<(), Error> {
    if let Some(val) = env(BUSY_TIMEOUT_VAR) {
        *busy_timeout_ms = parse_env_u64(BUSY_TIMEOUT_VAR, &val)?;
    }
    Ok(())
}

/// Apply SQLMEM_JOURNAL_MODE override.
pub fn apply_journal_mode_override(
    journal_mode: &mut JournalMode,
    env: &impl Fn(&str) -> Option<String>,
) -> Result<(), Error> {
    if let Some(val) = env(JOURNAL_MODE_VAR) {
        *journal_mode = parse_env_journal_mode(JOURNAL_MODE_VAR, &val)?;
    }
    Ok(())
}
