//! Configuration file loading and parsing.

use crate::errors::Error;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Configuration loaded from TOML file. Absent keys keep their defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    #[serde(default)]
    pub database_path: Option<PathBuf>,

    #[serde(default)]
    pub busy_timeout_ms: Option<u64>,

    #[serde(default)]
    pub journal_mode: Option<String>,
}

/// Location of the config file: `<config_dir>/sqlmem/config.toml`.
pub fn config_file_path() -> PathBuf {
    let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    let config_dir = dirs::config_dir().unwrap_or_else(|| home.join(".config"));
    config_dir.join("sqlmem").join("config.toml")
}

/// Load configuration from the default TOML file, if it exists.
pub fn load_from_file() -> Result<Option<ConfigFile>, Error> {
    load_from_path(&config_file_path())
}

/// Load configuration from a TOML file, if it exists.
pub fn load_from_path(config_path: &Path) -> Result<Option<ConfigFile>, Error> {
    if !config_path.exists() {
        return Ok(None);
    }

    let content = std::fs::read_to_string(config_path).map_err(|e| {
        Error::Config(format!(
            "Failed to read config file {}: {e}",
            config_path.display()
        ))
    })?;

    let config: ConfigFile = toml::from_str(&content).map_err(|e| {
        Error::Config(format!(
            "Failed to parse config file {}: {e}",
            config_path.display()
        ))
    })?;

    Ok(Some(config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_malformed_toml() {
        let content = r#"
This is not valid TOML
 [[unclosed bracket
 "#;

        let result: Result<ConfigFile, _> = toml::from_str(content);
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_config_file() {
        let config: ConfigFile = toml::from_str("").unwrap();

        assert!(config.database_path.is_none());
        assert!(config.busy_timeout_ms.is_none());
        assert!(config.journal_mode.is_none());
    }

    #[test]
    fn test_config_file_partial_toml() {
        let content = r#"
            database_path = "/test/db.db"
        "#;

        let config: ConfigFile = toml::from_str(content).unwrap();
        assert_eq!(config.database_path, Some(PathBuf::from("/test/db.db")));
        assert!(config.busy_timeout_ms.is_none());
    }

    #[test]
    fn test_unknown_key_rejected() {
        let result: Result<ConfigFile, _> = toml::from_str("embedding_model = \"x\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_load_from_missing_path() {
        let dir = TempDir::new().unwrap();
        let result = load_from_path(&dir.path().join("absent.toml")).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_load_from_path_reports_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "busy_timeout_ms = \"soon\"").unwrap();

        let result = load_from_path(&path);
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_config_file_path_location() {
        assert!(config_file_path().ends_with("sqlmem/config.toml"));
    }
}
