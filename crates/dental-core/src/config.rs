//! Configuration for dental
//!
//! Stored in `<config dir>/dental/config.toml`

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const APP_DIR: &str = "dental";
const CONFIG_FILE: &str = "config.toml";

/// dental configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding the record files (platform data dir if unset)
    pub data_dir: Option<PathBuf>,

    /// Create the default dentist and settings on first run
    pub seed_defaults: bool,

    /// Export settings
    #[serde(default)]
    pub export: ExportConfig,

    /// Display settings
    #[serde(default)]
    pub display: DisplayConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: None,
            seed_defaults: true,
            export: ExportConfig::default(),
            display: DisplayConfig::default(),
        }
    }
}

/// Export configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Where export files are written (current directory if unset)
    pub directory: Option<PathBuf>,

    /// Export file names are `<file_prefix>-<YYYY-MM-DD>.json`
    pub file_prefix: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            directory: None,
            file_prefix: "dental-data".to_string(),
        }
    }
}

/// Display configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Use colors in output
    pub colors: bool,

    /// Date format for display
    pub date_format: String,

    /// Rows per page in listings
    pub page_size: usize,

    /// Maximum summary length before truncation
    pub max_summary_length: usize,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            colors: true,
            date_format: "%Y-%m-%d %H:%M".to_string(),
            page_size: 10,
            max_summary_length: 80,
        }
    }
}

impl Config {
    /// Default config file location
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
    }

    /// Load config from a TOML file
    pub fn load(path: &Path) -> crate::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config: Config =
            toml::from_str(&content).map_err(|e| crate::Error::Config(e.to_string()))?;
        Ok(config)
    }

    /// Save config to a TOML file
    pub fn save(&self, path: &Path) -> crate::Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::Error::Config(format!("failed to serialize: {e}")))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Data directory: configured, else the platform data dir
    pub fn resolve_data_dir(&self) -> crate::Result<PathBuf> {
        if let Some(dir) = &self.data_dir {
            return Ok(dir.clone());
        }
        dirs::data_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or_else(|| crate::Error::Config("no data directory; set data_dir".to_string()))
    }

    /// Generate a default config file with comments
    pub fn default_with_comments() -> String {
        r#"# dental configuration

# Directory holding the record files (platform data dir if unset)
# data_dir = "/var/lib/dental"

# Create the default dentist and practice settings on first run
seed_defaults = true

[export]
# Where export files are written (current directory if unset)
# directory = "/home/me/backups"

# Export file names are <file_prefix>-<YYYY-MM-DD>.json
file_prefix = "dental-data"

[display]
# Use colors in output
colors = true

# Date format for display (strftime format)
date_format = "%Y-%m-%d %H:%M"

# Rows per page in listings
page_size = 10

# Maximum summary length before truncation
max_summary_length = 80
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commented_default_matches_default() {
        let parsed: Config = toml::from_str(&Config::default_with_comments()).unwrap();
        assert_eq!(parsed, Config::default());
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let parsed: Config = toml::from_str("[display]\npage_size = 25\n").unwrap();
        assert_eq!(parsed.display.page_size, 25);
        assert!(parsed.display.colors);
        assert!(parsed.seed_defaults);
        assert_eq!(parsed.export.file_prefix, "dental-data");
    }

    #[test]
    fn test_resolve_data_dir_prefers_configured() {
        let config = Config {
            data_dir: Some(PathBuf::from("/tmp/dental-test")),
            ..Config::default()
        };
        assert_eq!(config.resolve_data_dir().unwrap(), PathBuf::from("/tmp/dental-test"));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.display.colors = false;
        config.data_dir = Some(dir.path().join("data"));
        config.save(&path).unwrap();

        assert_eq!(Config::load(&path).unwrap(), config);
        assert_eq!(
            Config::load(&dir.path().join("missing.toml")).unwrap(),
            Config::default()
        );
    }

    #[test]
    fn test_invalid_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "seed_defaults = \"maybe\"").unwrap();
        assert!(matches!(Config::load(&path), Err(crate::Error::Config(_))));
    }
}
