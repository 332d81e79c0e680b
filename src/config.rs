//! File-based configuration, layered under CLI flags.
//!
//! Precedence, highest first: CLI flags > `autoimport.toml` > built-in
//! defaults. A missing config file is not an error — it just means every
//! setting falls back to its built-in default.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::CoreError;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Additional import-database files to load, beyond the built-in table.
    pub db_paths: Vec<PathBuf>,
    /// The bracketed prefix written before every auto-import log line.
    pub log_prefix: String,
    /// Whether list-comprehension iteration variables leak into the
    /// enclosing scope.
    pub list_comprehension_leak: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_paths: Vec::new(),
            log_prefix: "[AUTOIMPORT]".to_string(),
            list_comprehension_leak: true,
        }
    }
}

impl Config {
    /// Load `path` if it exists, otherwise return the built-in defaults
    /// untouched.
    pub fn load_or_default(path: &Path) -> Result<Self, CoreError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path).map_err(|source| CoreError::ImportDbLoad {
            path: path.display().to_string(),
            source,
        })?;
        toml::from_str(&text).map_err(|e| CoreError::ImportDbLoad {
            path: path.display().to_string(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()),
        })
    }

    /// Apply CLI overrides on top of this config. `None` leaves the
    /// existing (config-file-or-default) value in place.
    pub fn with_overrides(
        mut self,
        extra_db_paths: Vec<PathBuf>,
        log_prefix: Option<String>,
        list_comprehension_leak: Option<bool>,
    ) -> Self {
        self.db_paths.extend(extra_db_paths);
        if let Some(p) = log_prefix {
            self.log_prefix = p;
        }
        if let Some(v) = list_comprehension_leak {
            self.list_comprehension_leak = v;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_missing_config_file_is_not_an_error() {
        let cfg = Config::load_or_default(Path::new("/nonexistent/autoimport.toml")).unwrap();
        assert_eq!(cfg.log_prefix, "[AUTOIMPORT]");
        assert!(cfg.list_comprehension_leak);
    }

    #[test]
    fn test_config_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("autoimport.toml");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, "log_prefix = \"[IMPORT]\"").unwrap();
        writeln!(f, "list_comprehension_leak = false").unwrap();
        let cfg = Config::load_or_default(&path).unwrap();
        assert_eq!(cfg.log_prefix, "[IMPORT]");
        assert!(!cfg.list_comprehension_leak);
    }

    #[test]
    fn test_cli_overrides_take_precedence() {
        let cfg = Config::default().with_overrides(vec![], Some("[X]".to_string()), Some(false));
        assert_eq!(cfg.log_prefix, "[X]");
        assert!(!cfg.list_comprehension_leak);
    }
}
