//! Configuration loading and saving.
//!
//! `config.json` under the storage root holds the default target and the
//! remote endpoint. Missing or unreadable config falls back to defaults;
//! environment variables override the remote settings.

use std::env;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{FocusError, Result};
use crate::storage::StorageConfig;
use crate::timer::{TargetDuration, DEFAULT_TARGET_MINUTES};

const REMOTE_URL_ENV: &str = "DEEPFLOW_REMOTE_URL";
const REMOTE_KEY_ENV: &str = "DEEPFLOW_REMOTE_KEY";

/// Remote endpoint settings. Both values are required for cloud sync.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteConfig {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FocusConfig {
    #[serde(default = "default_target_minutes")]
    pub target_minutes: u32,
    #[serde(default)]
    pub remote: RemoteConfig,
}

fn default_target_minutes() -> u32 {
    DEFAULT_TARGET_MINUTES
}

impl Default for FocusConfig {
    fn default() -> Self {
        Self {
            target_minutes: DEFAULT_TARGET_MINUTES,
            remote: RemoteConfig::default(),
        }
    }
}

impl FocusConfig {
    /// Loads config.json, returning defaults if it doesn't exist or is malformed.
    pub fn load(storage: &StorageConfig) -> Self {
        match Self::try_load(storage) {
            Ok(config) => config,
            Err(err) => {
                warn!(error = %err, "Failed to load config, using defaults");
                Self::default()
            }
        }
    }

    pub fn try_load(storage: &StorageConfig) -> Result<Self> {
        let path = storage.config_file();
        let content = match fs_err::read_to_string(&path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(err) => {
                return Err(FocusError::Io {
                    context: format!("reading {}", path.display()),
                    source: err,
                })
            }
        };
        serde_json::from_str(&content).map_err(|e| FocusError::ConfigMalformed {
            path,
            details: e.to_string(),
        })
    }

    pub fn save(&self, storage: &StorageConfig) -> Result<()> {
        storage.ensure_dirs()?;
        let path = storage.config_file();
        let content = serde_json::to_string_pretty(self).map_err(|e| FocusError::Json {
            context: "serializing config".to_string(),
            source: e,
        })?;
        fs_err::write(&path, content).map_err(|e| FocusError::Io {
            context: format!("writing {}", path.display()),
            source: e,
        })
    }

    /// Applies `DEEPFLOW_REMOTE_URL` / `DEEPFLOW_REMOTE_KEY` when set.
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(url) = env::var(REMOTE_URL_ENV).ok().filter(|v| !v.is_empty()) {
            self.remote.url = Some(url);
        }
        if let Some(key) = env::var(REMOTE_KEY_ENV).ok().filter(|v| !v.is_empty()) {
            self.remote.api_key = Some(key);
        }
        self
    }

    /// The configured target, clamped into the valid range.
    pub fn target(&self) -> TargetDuration {
        TargetDuration::clamped(self.target_minutes)
    }

    /// `(url, api_key)` when cloud sync is fully configured.
    ///
    /// Logs a warning and returns `None` otherwise; the app then runs local-only.
    pub fn remote_endpoint(&self) -> Option<(&str, &str)> {
        match (self.remote.url.as_deref(), self.remote.api_key.as_deref()) {
            (Some(url), Some(key)) => Some((url, key)),
            _ => {
                warn!("Missing remote url or api key. Cloud sync will be disabled.");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn storage() -> (TempDir, StorageConfig) {
        let temp = TempDir::new().unwrap();
        let storage = StorageConfig::with_root(temp.path().to_path_buf());
        (temp, storage)
    }

    #[test]
    fn test_missing_config_is_default() {
        let (_temp, storage) = storage();
        assert_eq!(FocusConfig::load(&storage), FocusConfig::default());
    }

    #[test]
    fn test_malformed_config_is_reported_by_try_load() {
        let (_temp, storage) = storage();
        fs_err::write(storage.config_file(), "{").unwrap();
        assert!(matches!(
            FocusConfig::try_load(&storage),
            Err(FocusError::ConfigMalformed { .. })
        ));
        assert_eq!(FocusConfig::load(&storage), FocusConfig::default());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let (_temp, storage) = storage();
        let config = FocusConfig {
            target_minutes: 45,
            remote: RemoteConfig {
                url: Some("https://example.supabase.co".to_string()),
                api_key: Some("anon".to_string()),
            },
        };
        config.save(&storage).unwrap();
        assert_eq!(FocusConfig::load(&storage), config);
        assert_eq!(
            config.remote_endpoint(),
            Some(("https://example.supabase.co", "anon"))
        );
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let (_temp, storage) = storage();
        fs_err::write(storage.config_file(), r#"{"remote":{"url":"https://x"}}"#).unwrap();
        let config = FocusConfig::load(&storage);
        assert_eq!(config.target_minutes, DEFAULT_TARGET_MINUTES);
        assert_eq!(config.remote_endpoint(), None);
    }

    #[test]
    fn test_target_is_clamped() {
        let config = FocusConfig {
            target_minutes: 999,
            ..FocusConfig::default()
        };
        assert_eq!(config.target().minutes(), 240);
    }
}
