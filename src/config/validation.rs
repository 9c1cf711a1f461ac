//! Configuration validation logic.

use crate::errors::Error;
use std::path::Path;

/// Validates configuration values.
pub struct ConfigValidator<'a> {
    /// Path to the SQLite database file.
    pub database_path: &'a Path,
    /// Busy timeout in milliseconds.
    pub busy_timeout_ms: u64,
}

impl ConfigValidator<'_> {
    /// Validate all configuration values.
    ///
    /// Checks that:
    /// - Database path is not empty
    /// - Busy timeout is greater than zero
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if any validation check fails.
    pub fn validate(&self) -> Result<(), Error> {
        self.validate_database_path()?;
        self.validate_busy_timeout()?;

        Ok(())
    }

    fn validate_database_path(&self) -> Result<(), Error> {
        if self.database_path.as_os_str().is_empty() {
            return Err(Error::Config("Database path cannot be empty".to_string()));
        }

        Ok(())
    }

    fn validate_busy_timeout(&self) -> Result<(), Error> {
        if self.busy_timeout_ms == 0 {
            return Err(Error::Config(
                "Invalid busy timeout: 0 (must be greater than zero)".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_config() {
        let validator = ConfigValidator {
            database_path: Path::new("/tmp/mem.db"),
            busy_timeout_ms: 5000,
        };
        assert!(validator.validate().is_ok());
    }

    #[test]
    fn test_empty_database_path() {
        let validator = ConfigValidator {
            database_path: Path::new(""),
            busy_timeout_ms: 5000,
        };
        let err = validator.validate().unwrap_err();
        assert!(err.to_string().contains("Database path cannot be empty"));
    }

    #[test]
    fn test_zero_busy_timeout() {
        let validator = ConfigValidator {
            database_path: Path::new("/tmp/mem.db"),
            busy_timeout_ms: 0,
        };
        let err = validator.validate().unwrap_err();
        assert!(err.to_string().contains("busy timeout"));
    }
}
