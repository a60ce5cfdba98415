use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::messages::Settings;

const CONFIG_VERSION: &str = "1.0";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("config parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Persisted configuration file format.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ConfigFile {
    version: String,
    settings: Settings,
    created_at: String,
    modified_at: String,
}

/// Loads and persists director settings. Settings live in config.json next
/// to the binary by default; a missing file yields defaults rather than an
/// error.
pub struct ConfigManager {
    config_path: PathBuf,
    settings: Settings,
}

impl ConfigManager {
    pub fn new(config_path: Option<PathBuf>) -> Self {
        let config_path = config_path.unwrap_or_else(|| PathBuf::from("config.json"));
        ConfigManager {
            config_path,
            settings: Settings::default(),
        }
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Load settings from disk, falling back to defaults when no config file
    /// exists yet.
    pub fn load(&mut self) -> Result<Settings, ConfigError> {
        if !self.config_path.exists() {
            log::info!(
                "no config at {}, using defaults",
                self.config_path.display()
            );
            self.settings = Settings::default();
            return Ok(self.settings.clone());
        }

        let contents = fs::read_to_string(&self.config_path)?;
        let file: ConfigFile = serde_json::from_str(&contents)?;
        self.settings = file.settings;
        log::info!("loaded config from {}", self.config_path.display());
        Ok(self.settings.clone())
    }

    /// Replace the settings and persist them.
    pub fn update_settings(&mut self, settings: Settings) -> Result<(), ConfigError> {
        self.settings = settings;
        self.save()
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        let now = chrono::Utc::now().to_rfc3339();
        let created_at = self
            .read_created_at()
            .unwrap_or_else(|| now.clone());
        let file = ConfigFile {
            version: CONFIG_VERSION.to_string(),
            settings: self.settings.clone(),
            created_at,
            modified_at: now,
        };
        let contents = serde_json::to_string_pretty(&file)?;
        fs::write(&self.config_path, contents)?;
        Ok(())
    }

    fn read_created_at(&self) -> Option<String> {
        let contents = fs::read_to_string(&self.config_path).ok()?;
        let file: ConfigFile = serde_json::from_str(&contents).ok()?;
        Some(file.created_at)
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_missing_file_yields_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.json");

        let mut manager = ConfigManager::new(Some(path.clone()));
        let settings = manager.load().unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(manager.config_path(), path);
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.json");

        let mut manager = ConfigManager::new(Some(path.clone()));
        let mut settings = Settings::default();
        settings.target_fps = 30.0;
        settings.warmup_secs = 5.0;
        manager.update_settings(settings.clone()).unwrap();

        let mut manager2 = ConfigManager::new(Some(path));
        let loaded = manager2.load().unwrap();
        assert_eq!(loaded.target_fps, 30.0);
        assert_eq!(loaded.warmup_secs, 5.0);
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.json");
        fs::write(&path, "not json").unwrap();

        let mut manager = ConfigManager::new(Some(path));
        assert!(matches!(manager.load(), Err(ConfigError::Parse(_))));
    }
}
