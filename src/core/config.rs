//! Settings with a layered hierarchy

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Local settings file looked up in the working directory
pub const LOCAL_CONFIG_FILE: &str = ".pquote.yaml";

/// Pricing artifact location used when nothing else is configured
pub const DEFAULT_PRICING_CONFIG: &str = "config/pricing_coefficients.json";

/// Service settings, merged from defaults, config files and environment
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Path to the trained pricing artifact
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pricing_config: Option<PathBuf>,

    /// Default output format (auto, yaml, json, md)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_format: Option<String>,
}

impl Settings {
    /// Load settings from all sources, merging in priority order
    pub fn load() -> Self {
        let global = Self::global_config_path();
        let local = std::env::current_dir()
            .ok()
            .map(|dir| dir.join(LOCAL_CONFIG_FILE));
        let mut settings = Self::load_files(global.as_deref(), local.as_deref());

        // Environment wins over files
        if let Ok(path) = std::env::var("PQUOTE_PRICING_CONFIG") {
            settings.pricing_config = Some(PathBuf::from(path));
        }
        if let Ok(format) = std::env::var("PQUOTE_FORMAT") {
            settings.default_format = Some(format);
        }

        settings
    }

    /// Merge the global file, then the local file. Unreadable files are
    /// skipped with a warning.
    pub fn load_files(global: Option<&Path>, local: Option<&Path>) -> Self {
        let mut settings = Settings::default();

        for path in [global, local].into_iter().flatten() {
            if !path.exists() {
                continue;
            }
            match std::fs::read_to_string(path)
                .map_err(|e| e.to_string())
                .and_then(|c| serde_yml::from_str::<Settings>(&c).map_err(|e| e.to_string()))
            {
                Ok(layer) => settings.merge(layer),
                Err(e) => tracing::warn!("ignoring settings file {}: {}", path.display(), e),
            }
        }

        settings
    }

    /// Get the path to the global settings file
    pub fn global_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "pquote")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Merge another layer into this one (other takes precedence)
    fn merge(&mut self, other: Settings) {
        if other.pricing_config.is_some() {
            self.pricing_config = other.pricing_config;
        }
        if other.default_format.is_some() {
            self.default_format = other.default_format;
        }
    }

    /// Pricing artifact path, falling back to the conventional location
    pub fn pricing_config_path(&self) -> PathBuf {
        self.pricing_config
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_PRICING_CONFIG))
    }
}
