use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ShellConfigError;
use crate::navigation::UnitPolicy;

fn default_log_filter() -> String {
    "info".to_string()
}

fn default_section() -> Option<String> {
    Some("Primary Workflow".to_string())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShellConfig {
    /// Section whose first step opens when no selection was persisted
    #[serde(default = "default_section")]
    pub default_section: Option<String>,

    /// Settings file for persisted UI state (platform config dir if unset)
    #[serde(default)]
    pub settings_file: Option<PathBuf>,

    /// `tracing` filter used when RUST_LOG is not set
    #[serde(default = "default_log_filter")]
    pub log_filter: String,

    /// Reuse or rebuild a step's unit on every selection
    #[serde(default)]
    pub unit_policy: UnitPolicy,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            default_section: default_section(),
            settings_file: None,
            log_filter: default_log_filter(),
            unit_policy: UnitPolicy::Cached,
        }
    }
}

impl ShellConfig {
    /// Load from the platform config directory; a missing file yields defaults
    pub fn load() -> Result<Self, ShellConfigError> {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => {
                tracing::warn!("No platform config directory, using default shell config");
                Ok(Self::default())
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, ShellConfigError> {
        if !path.exists() {
            tracing::debug!("No shell config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let load_failed = |source: Box<dyn std::error::Error + Send + Sync>| {
            ShellConfigError::LoadFailed {
                path: path.display().to_string(),
                source,
            }
        };

        let content = fs::read_to_string(path).map_err(|e| load_failed(Box::new(e)))?;
        let config: ShellConfig =
            serde_json::from_str(&content).map_err(|e| load_failed(Box::new(e)))?;
        config.validate()?;

        tracing::info!("Loaded shell config from: {}", path.display());
        Ok(config)
    }

    /// Save configuration to disk
    pub fn save_to(&self, path: &Path) -> Result<(), ShellConfigError> {
        let save_failed = |source: Box<dyn std::error::Error + Send + Sync>| {
            ShellConfigError::SaveFailed {
                path: path.display().to_string(),
                source,
            }
        };

        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| save_failed(Box::new(e)))?;
        }

        let json = serde_json::to_string_pretty(self).map_err(|e| save_failed(Box::new(e)))?;
        fs::write(path, json).map_err(|e| save_failed(Box::new(e)))?;

        Ok(())
    }

    pub fn validate(&self) -> Result<(), ShellConfigError> {
        if let Some(section) = &self.default_section {
            if section.trim().is_empty() {
                return Err(ShellConfigError::Invalid(
                    "default_section must not be blank".to_string(),
                ));
            }
        }

        if self.log_filter.trim().is_empty() {
            return Err(ShellConfigError::Invalid(
                "log_filter must not be blank".to_string(),
            ));
        }

        Ok(())
    }

    /// Get the config file path
    pub fn config_path() -> Option<PathBuf> {
        Self::app_dir().map(|dir| dir.join("shell.json"))
    }

    /// Per-user application directory (config, settings and logs)
    pub fn app_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("ReqWorkbench"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ShellConfig::default();
        assert_eq!(config.default_section.as_deref(), Some("Primary Workflow"));
        assert_eq!(config.log_filter, "info");
        assert_eq!(config.unit_policy, UnitPolicy::Cached);
        assert!(config.settings_file.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let config: ShellConfig = serde_json::from_str(r#"{ "unit_policy": "recreate" }"#).unwrap();
        assert_eq!(config.unit_policy, UnitPolicy::Recreate);
        assert_eq!(config.default_section.as_deref(), Some("Primary Workflow"));
        assert_eq!(config.log_filter, "info");
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shell.json");

        let config = ShellConfig {
            default_section: Some("Repair".to_string()),
            settings_file: Some(dir.path().join("settings.json")),
            log_filter: "debug".to_string(),
            unit_policy: UnitPolicy::Recreate,
        };
        config.save_to(&path).unwrap();

        assert_eq!(ShellConfig::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = ShellConfig::load_from(&dir.path().join("absent.json")).unwrap();
        assert_eq!(config, ShellConfig::default());
    }

    #[test]
    fn test_blank_default_section_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shell.json");
        fs::write(&path, r#"{ "default_section": "  " }"#).unwrap();

        let err = ShellConfig::load_from(&path).unwrap_err();
        assert!(matches!(err, ShellConfigError::Invalid(_)));
    }

    #[test]
    fn test_corrupt_file_is_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shell.json");
        fs::write(&path, "{").unwrap();

        let err = ShellConfig::load_from(&path).unwrap_err();
        assert!(matches!(err, ShellConfigError::LoadFailed { .. }));
    }
}
