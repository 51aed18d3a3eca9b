//! Persisted user settings.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use vaultsweep_core::{DeleteOption, DisposalConfig, ExclusionConfig};

/// Settings stored in `settings.toml` under the user config directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserSettings {
    /// How unused files are removed.
    pub delete_option: DeleteOption,
    /// Print the cleanup log after a sweep.
    pub show_log: bool,
    /// Comma-separated folders whose files are never removed.
    pub excluded_folders: String,
    /// Also protect files in subfolders of the excluded folders.
    pub exclude_subfolders: bool,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            delete_option: DeleteOption::VaultTrash,
            show_log: true,
            excluded_folders: String::new(),
            exclude_subfolders: false,
        }
    }
}

impl UserSettings {
    /// Get the config file path.
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("vaultsweep").join("settings.toml"))
    }

    /// Load settings from disk, or return defaults.
    pub fn load() -> Self {
        Self::config_path()
            .and_then(|path| std::fs::read_to_string(&path).ok())
            .and_then(|content| Self::parse(&content))
            .unwrap_or_default()
    }

    /// Parse a settings file; `None` if it is not valid TOML for this shape.
    pub fn parse(content: &str) -> Option<Self> {
        match toml::from_str(content) {
            Ok(settings) => Some(settings),
            Err(e) => {
                tracing::warn!(error = %e, "ignoring invalid settings file");
                None
            }
        }
    }

    /// Save settings to disk.
    pub fn save(&self) -> std::io::Result<PathBuf> {
        let path = Self::config_path().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::NotFound, "No config directory")
        })?;

        // Create parent directory if needed
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;

        std::fs::write(&path, content)?;
        Ok(path)
    }

    /// Folder exclusion rules from these settings.
    pub fn exclusion(&self) -> ExclusionConfig {
        ExclusionConfig::from_setting(&self.excluded_folders, self.exclude_subfolders)
    }

    /// Disposal config for a sweep.
    pub fn disposal_config(&self) -> DisposalConfig {
        DisposalConfig::new(self.delete_option, self.exclusion())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_keys_use_defaults() {
        let settings = UserSettings::parse("excluded_folders = \"Archive, Templates\"").unwrap();
        assert_eq!(settings.delete_option, DeleteOption::VaultTrash);
        assert!(settings.show_log);
        assert_eq!(
            settings.exclusion().excluded_folders,
            vec!["Archive".to_string(), "Templates".to_string()]
        );
    }

    #[test]
    fn test_delete_option_names() {
        let settings = UserSettings::parse("delete_option = \"system-trash\"").unwrap();
        assert_eq!(settings.delete_option, DeleteOption::SystemTrash);
        let settings = UserSettings::parse("delete_option = \"permanent\"").unwrap();
        assert_eq!(settings.delete_option, DeleteOption::Permanent);
        assert!(UserSettings::parse("delete_option = \"shred\"").is_none());
    }

    #[test]
    fn test_round_trip_through_toml() {
        let settings = UserSettings {
            delete_option: DeleteOption::Permanent,
            show_log: false,
            excluded_folders: "A/B".into(),
            exclude_subfolders: true,
        };
        let text = toml::to_string_pretty(&settings).unwrap();
        assert!(text.contains("delete_option = \"permanent\""));
        assert_eq!(UserSettings::parse(&text), Some(settings));
    }
}
