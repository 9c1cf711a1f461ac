//! Environment variable overrides for configuration.

use crate::errors::Error;

use super::Config;
use super::env_parser;

/// Apply environment variable overrides to configuration.
///
/// `env` looks up a variable by name; production passes `std::env::var`.
pub fn apply_env_overrides(
    config: &mut Config,
    env: &impl Fn(&str) -> Option<String>,
) -> Result<(), Error> {
    env_parser::apply_database_path_override(&mut config.database_path, env)?;
    env_parser::apply_busy_timeout_override(&mut config.busy_timeout_ms, env)?;
    env_parser::apply_journal_mode_override(&mut config.journal_mode, env)?;
    Ok(())
}
