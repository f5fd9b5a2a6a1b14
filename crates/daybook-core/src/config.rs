use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{DaybookError, Result};

/// Top-level configuration for the Daybook engine.
///
/// Loaded from `~/.daybook/config.toml` by default. Each section corresponds
/// to one engine concern; every section and field has a default so a partial
/// file (or none at all) still yields a working configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaybookConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub extraction: ExtractionConfig,
    #[serde(default)]
    pub summary: SummaryConfig,
}

impl Default for DaybookConfig {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            extraction: ExtractionConfig::default(),
            summary: SummaryConfig::default(),
        }
    }
}

impl DaybookConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: DaybookConfig = toml::from_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| DaybookError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }
}

/// General engine settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Whether the extraction engine accepts new utterances.
    pub enabled: bool,
    /// Maximum utterance length in characters.
    pub max_utterance_length: usize,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_utterance_length: 2000,
        }
    }
}

/// Normalizer and staging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Maximum number of derived tags per candidate.
    pub derived_tag_limit: usize,
    /// Hour of day (0-23) used when "today" implies a date but no time.
    pub morning_hour: u32,
    /// Number of prior turns handed to the classifier as history.
    pub history_turns: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            derived_tag_limit: 3,
            morning_hour: 9,
            history_turns: 10,
        }
    }
}

/// Context summary settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SummaryConfig {
    /// Maximum open-item titles listed per kind.
    pub max_highlights: usize,
    /// Number of recent notes included in the digest.
    pub recent_notes: usize,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            max_highlights: 5,
            recent_notes: 3,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_values() {
        let config = DaybookConfig::default();
        assert!(config.general.enabled);
        assert_eq!(config.general.max_utterance_length, 2000);
        assert_eq!(config.extraction.derived_tag_limit, 3);
        assert_eq!(config.extraction.morning_hour, 9);
        assert_eq!(config.extraction.history_turns, 10);
        assert_eq!(config.summary.max_highlights, 5);
        assert_eq!(config.summary.recent_notes, 3);
    }

    #[test]
    fn test_toml_round_trip() {
        let config = DaybookConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let rt: DaybookConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(rt.general.max_utterance_length, 2000);
        assert_eq!(rt.extraction.derived_tag_limit, 3);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let toml_str = r#"
            [extraction]
            derived_tag_limit = 5
        "#;
        let config: DaybookConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.extraction.derived_tag_limit, 5);
        // Untouched fields keep their defaults.
        assert_eq!(config.extraction.morning_hour, 9);
        assert!(config.general.enabled);
        assert_eq!(config.summary.max_highlights, 5);
    }

    #[test]
    fn test_empty_toml_is_all_defaults() {
        let config: DaybookConfig = toml::from_str("").unwrap();
        assert_eq!(config.general.max_utterance_length, 2000);
        assert_eq!(config.summary.recent_notes, 3);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = DaybookConfig::default();
        config.general.max_utterance_length = 500;
        config.save(&path).unwrap();

        let loaded = DaybookConfig::load(&path).unwrap();
        assert_eq!(loaded.general.max_utterance_length, 500);
    }

    #[test]
    fn test_load_missing_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        assert!(DaybookConfig::load(&path).is_err());
    }

    #[test]
    fn test_load_or_default_on_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        let config = DaybookConfig::load_or_default(&path);
        assert_eq!(config.general.max_utterance_length, 2000);
    }

    #[test]
    fn test_load_or_default_on_garbage_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "not [valid toml").unwrap();
        let config = DaybookConfig::load_or_default(&path);
        assert_eq!(config.extraction.morning_hour, 9);
    }

    #[test]
    fn test_save_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("deep").join("config.toml");
        DaybookConfig::default().save(&path).unwrap();
        assert!(path.exists());
    }
}
