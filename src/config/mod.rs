//! Runtime configuration.
//!
//! The database path is the only knob the core needs. Precedence:
//! explicit flag > `TRACKD_DB` environment variable > `./trackd.db`.

use std::path::PathBuf;

/// Environment variable naming the database file.
pub const DB_ENV_VAR: &str = "TRACKD_DB";

/// Default database file, relative to the working directory.
pub const DEFAULT_DB_FILE: &str = "trackd.db";

/// Resolved runtime configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: PathBuf,
}

impl Config {
    /// Resolve configuration, giving an explicit override top precedence.
    #[must_use]
    pub fn load(db_override: Option<PathBuf>) -> Self {
        let db_path = db_override
            .or_else(|| std::env::var_os(DB_ENV_VAR).map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_FILE));
        Self { db_path }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_override_wins() {
        let config = Config::load(Some(PathBuf::from("/tmp/explicit.db")));
        assert_eq!(config.db_path, PathBuf::from("/tmp/explicit.db"));
    }

    #[test]
    fn default_without_override() {
        // Env lookups are process-global; only assert the fallback shape here.
        let config = Config::load(None);
        assert!(!config.db_path.as_os_str().is_empty());
    }
}
