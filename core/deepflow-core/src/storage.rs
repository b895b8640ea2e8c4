//! Storage configuration and path management for Deepflow.
//!
//! All on-disk locations are decided here. Production code uses
//! `StorageConfig::from_env()` (`$DEEPFLOW_HOME`, or `~/.deepflow`); tests use
//! `StorageConfig::with_root(temp_dir)` for isolation.

use std::env;
use std::path::{Path, PathBuf};

use crate::error::{FocusError, Result};

const HOME_ENV: &str = "DEEPFLOW_HOME";

/// Central configuration for all Deepflow storage paths.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    root: PathBuf,
}

impl StorageConfig {
    /// Resolves the root from `$DEEPFLOW_HOME`, falling back to `~/.deepflow`.
    pub fn from_env() -> Result<Self> {
        if let Some(root) = env::var_os(HOME_ENV).filter(|v| !v.is_empty()) {
            return Ok(Self::with_root(PathBuf::from(root)));
        }
        let home = dirs::home_dir().ok_or(FocusError::HomeDirNotFound)?;
        Ok(Self::with_root(home.join(".deepflow")))
    }

    /// Creates a StorageConfig with a custom root directory.
    pub fn with_root(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path backing a local key: `<root>/<key>.json`.
    pub fn key_file(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.json", key))
    }

    /// Path to config.json (app preferences and remote settings).
    pub fn config_file(&self) -> PathBuf {
        self.root.join("config.json")
    }

    /// Path to logs/ directory.
    pub fn logs_dir(&self) -> PathBuf {
        self.root.join("logs")
    }

    /// Ensures the root directory exists.
    pub fn ensure_dirs(&self) -> Result<()> {
        fs_err::create_dir_all(&self.root).map_err(|e| FocusError::Io {
            context: format!("creating {}", self.root.display()),
            source: e,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_key_file_path() {
        let config = StorageConfig::with_root(PathBuf::from("/tmp/deepflow"));
        assert_eq!(
            config.key_file("timer_state"),
            PathBuf::from("/tmp/deepflow/timer_state.json")
        );
    }

    #[test]
    fn test_config_and_logs_paths() {
        let config = StorageConfig::with_root(PathBuf::from("/tmp/deepflow"));
        assert_eq!(
            config.config_file(),
            PathBuf::from("/tmp/deepflow/config.json")
        );
        assert_eq!(config.logs_dir(), PathBuf::from("/tmp/deepflow/logs"));
    }

    #[test]
    fn test_ensure_dirs_creates_nested_root() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("a").join("b");
        let config = StorageConfig::with_root(root.clone());
        config.ensure_dirs().unwrap();
        assert!(root.is_dir());
    }
}
