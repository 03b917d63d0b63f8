//! Configuration types for card scanning.
//!
//! Loads settings from config.json at startup. Provides region layout
//! fractions, preprocessing thresholds, and recognition engine parameters.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::OnceLock;
use std::time::Duration;

use crate::error::{CardError, Result};
use crate::segment::RegionLayout;

/// Global configuration instance, initialized once at startup.
static CONFIG: OnceLock<ScanConfig> = OnceLock::new();

/// Complete scan configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Header height as a fraction of the card height
    pub header_height_fraction: f32,
    /// Absolute cap on header height, so very tall scans don't swallow the body
    pub header_max_px: u32,
    /// Body height as a fraction of the card height
    pub body_height_fraction: f32,
    /// Pixels darker than this become ink; None keeps plain grayscale
    pub binarize_threshold: Option<u8>,
    /// Tesseract page segmentation mode
    pub tesseract_psm: u32,
    /// Tesseract language code
    pub tesseract_lang: String,
    /// Per-region recognition deadline in seconds; None waits forever
    pub recognition_timeout_secs: Option<u64>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            header_height_fraction: 0.18,
            header_max_px: 420,
            body_height_fraction: 0.82,
            binarize_threshold: None,
            // Assume a single uniform block of text
            tesseract_psm: 6,
            tesseract_lang: "eng".to_string(),
            recognition_timeout_secs: Some(60),
        }
    }
}

impl ScanConfig {
    /// Checks that the layout fractions describe a usable split.
    pub fn validate(&self) -> Result<()> {
        let in_range = |f: f32| f > 0.0 && f <= 1.0;
        if !in_range(self.header_height_fraction) {
            return Err(CardError::Config(format!(
                "header_height_fraction must be in (0, 1], got {}",
                self.header_height_fraction
            )));
        }
        if !in_range(self.body_height_fraction) {
            return Err(CardError::Config(format!(
                "body_height_fraction must be in (0, 1], got {}",
                self.body_height_fraction
            )));
        }
        if self.header_max_px == 0 {
            return Err(CardError::Config("header_max_px must be positive".to_string()));
        }
        if self.tesseract_lang.trim().is_empty() {
            return Err(CardError::Config("tesseract_lang is empty".to_string()));
        }
        Ok(())
    }

    pub fn layout(&self) -> RegionLayout {
        RegionLayout {
            header_fraction: self.header_height_fraction,
            header_max_px: self.header_max_px,
            body_fraction: self.body_height_fraction,
        }
    }

    pub fn recognition_timeout(&self) -> Option<Duration> {
        self.recognition_timeout_secs.map(Duration::from_secs)
    }
}

/// Loads configuration from `path`, falling back to defaults.
///
/// A missing, unreadable, unparseable or invalid file is logged and
/// replaced by `ScanConfig::default()`.
pub fn load_config_from(config_path: &Path) -> ScanConfig {
    crate::log(&format!("Looking for config at: {}", config_path.display()));

    if !config_path.exists() {
        crate::log("config.json not found. Using default config.");
        return ScanConfig::default();
    }

    match fs::read_to_string(config_path) {
        Ok(contents) => match serde_json::from_str::<ScanConfig>(&contents) {
            Ok(config) => match config.validate() {
                Ok(()) => {
                    crate::log("Config loaded from config.json");
                    return config;
                }
                Err(e) => {
                    crate::log(&format!("Invalid config: {}. Using defaults.", e));
                }
            },
            Err(e) => {
                crate::log(&format!(
                    "Failed to parse config.json: {}. Using defaults.",
                    e
                ));
            }
        },
        Err(e) => {
            crate::log(&format!(
                "Failed to read config.json: {}. Using defaults.",
                e
            ));
        }
    }

    ScanConfig::default()
}

/// Initializes the global configuration. Call once at startup.
///
/// Uses `path` when given, otherwise config.json next to the executable.
pub fn init_config(path: Option<&Path>) {
    let config = match path {
        Some(p) => load_config_from(p),
        None => load_config_from(&crate::paths::get_config_path()),
    };
    let _ = CONFIG.set(config);
}

/// Returns the global configuration, or defaults if `init_config` was never called.
pub fn get_config() -> &'static ScanConfig {
    CONFIG.get_or_init(ScanConfig::default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config_is_valid() {
        assert!(ScanConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "header_max_px": 300, "binarize_threshold": 140 }"#).unwrap();

        let config = load_config_from(&path);
        assert_eq!(config.header_max_px, 300);
        assert_eq!(config.binarize_threshold, Some(140));
        assert_eq!(config.tesseract_psm, 6);
        assert_eq!(config.tesseract_lang, "eng");
    }

    #[test]
    fn test_missing_config_uses_defaults() {
        let dir = tempdir().unwrap();
        let config = load_config_from(&dir.path().join("nope.json"));
        assert_eq!(config, ScanConfig::default());
    }

    #[test]
    fn test_invalid_fraction_falls_back() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "header_height_fraction": 1.5 }"#).unwrap();

        let config = load_config_from(&path);
        assert_eq!(config, ScanConfig::default());
    }

    #[test]
    fn test_garbage_config_falls_back() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "not json").unwrap();

        assert_eq!(load_config_from(&path), ScanConfig::default());
    }

    #[test]
    fn test_timeout_conversion() {
        let mut config = ScanConfig::default();
        assert_eq!(config.recognition_timeout(), Some(Duration::from_secs(60)));
        config.recognition_timeout_secs = None;
        assert_eq!(config.recognition_timeout(), None);
    }
}
