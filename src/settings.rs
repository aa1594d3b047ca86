//! # Settings Module
//!
//! ## Purpose
//! Holds the tunable constants of the acid-base calculators and persists them in a
//! JSON file, so that a laboratory can change e.g. the polyprotic threshold or point
//! the calculators at its own buffer catalog without recompiling.
//!
//! ## Architecture
//! - **CalcSettings**: serializable values handed to the calculators by reference
//! - **SettingsManager**: loads, validates and saves the settings file
//! - **Configuration File**: `bufferlab_config.json` in the working directory
//!
//! Calculators never read the file themselves: the caller loads settings once and
//! passes `&CalcSettings` into every `*_with_settings` call.
//!
//! ## Configuration Format
//! ```json
//! {
//!   "davies_a": 0.51,
//!   "ionic_strength_limit": 0.5,
//!   "polyprotic_gap": 2.5,
//!   "dead_zone_width": 1.0,
//!   "dilution_correction": true,
//!   "dilution_tolerance": 0.001,
//!   "max_dilution_iterations": 50,
//!   "catalog_file": null,
//!   "log_level": "warn"
//! }
//! ```
//!
//! ## Usage Pattern
//! ```rust
//! use BufferLab::settings::SettingsManager;
//!
//! let manager = SettingsManager::with_config_file("no_such_config.json");
//! assert_eq!(manager.settings().polyprotic_gap, 2.5);
//! ```

use crate::Catalog::catalog_api::BufferCatalog;
use crate::Utils::load_from_file::load_json_from_file;
use crate::error::{AcidBaseError, Result};
use log::{LevelFilter, info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// Default settings file name
pub const CONFIG_FILE: &str = "bufferlab_config.json";

/// Tunable constants of the calculators.
///
/// Every field has a default, so a settings file may list only the values it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalcSettings {
    /// A constant of the Davies equation (0.51 at 25 °C)
    pub davies_a: f64,
    /// Ionic strength above which the Davies correction carries an accuracy warning, mol/L
    pub ionic_strength_limit: f64,
    /// Adjacent pKa gap below which buffers go to the polyprotic solver, pH units
    pub polyprotic_gap: f64,
    /// Distance from every pKa that counts as dead zone, pH units
    pub dead_zone_width: f64,
    /// Iterate the reagent volume of a pH adjustment against the final volume
    pub dilution_correction: bool,
    /// Relative change of the reagent volume that ends the iteration
    pub dilution_tolerance: f64,
    pub max_dilution_iterations: usize,
    /// Buffer catalog replacing the built-in one
    pub catalog_file: Option<String>,
    /// Log level of the command line tool
    pub log_level: String,
}

impl Default for CalcSettings {
    fn default() -> Self {
        Self {
            davies_a: 0.51,
            ionic_strength_limit: 0.5,
            polyprotic_gap: 2.5,
            dead_zone_width: 1.0,
            dilution_correction: true,
            dilution_tolerance: 0.001,
            max_dilution_iterations: 50,
            catalog_file: None,
            log_level: "warn".to_string(),
        }
    }
}

impl CalcSettings {
    /// Checks that every numeric setting is usable.
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("davies_a", self.davies_a),
            ("ionic_strength_limit", self.ionic_strength_limit),
            ("polyprotic_gap", self.polyprotic_gap),
            ("dead_zone_width", self.dead_zone_width),
            ("dilution_tolerance", self.dilution_tolerance),
        ];
        for (name, value) in positive {
            crate::error::require_positive(name, value)?;
        }
        if self.max_dilution_iterations == 0 {
            return Err(AcidBaseError::invalid_input(
                "max_dilution_iterations",
                0.0,
                "must be at least 1",
            ));
        }
        Ok(())
    }

    /// Parsed log level; unknown names fall back to `Warn`.
    pub fn log_level_filter(&self) -> LevelFilter {
        LevelFilter::from_str(&self.log_level).unwrap_or(LevelFilter::Warn)
    }

    /// The configured catalog file, or the built-in catalog.
    pub fn load_catalog(&self) -> Result<BufferCatalog> {
        match &self.catalog_file {
            Some(path) => BufferCatalog::from_file(path),
            None => Ok(BufferCatalog::builtin().clone()),
        }
    }
}

/// Loads and persists [`CalcSettings`].
#[derive(Debug, Clone)]
pub struct SettingsManager {
    settings: CalcSettings,
    config_file: String,
}

impl SettingsManager {
    /// Settings from `bufferlab_config.json`, defaults when the file is absent or broken.
    pub fn new() -> Self {
        Self::with_config_file(CONFIG_FILE)
    }

    /// Settings from a custom file path, defaults when the file is absent or broken.
    pub fn with_config_file(config_file: &str) -> Self {
        let settings = match Self::load_config(config_file) {
            Ok(settings) => settings,
            Err(e) => {
                warn!("Using default settings: {}", e);
                CalcSettings::default()
            }
        };
        Self {
            settings,
            config_file: config_file.to_string(),
        }
    }

    /// Reads and validates a settings file. A missing file yields the defaults.
    pub fn load_config(config_file: &str) -> Result<CalcSettings> {
        if !Path::new(config_file).exists() {
            return Ok(CalcSettings::default());
        }
        let settings: CalcSettings = load_json_from_file(config_file)?;
        settings.validate()?;
        info!("Loaded settings from '{}'", config_file);
        Ok(settings)
    }

    /// Writes the current settings to the config file.
    pub fn save_config(&self) -> Result<()> {
        let content = serde_json::to_string_pretty(&self.settings)?;
        fs::write(&self.config_file, content).map_err(|source| AcidBaseError::FileWrite {
            path: self.config_file.clone(),
            source,
        })
    }

    pub fn settings(&self) -> &CalcSettings {
        &self.settings
    }

    pub fn config_file(&self) -> &str {
        &self.config_file
    }

    /// Replaces the settings after validating them and saves the file.
    pub fn update(&mut self, settings: CalcSettings) -> Result<()> {
        settings.validate()?;
        self.settings = settings;
        self.save_config()
    }

    /// Points the calculators at another catalog; the file must exist and parse.
    pub fn set_catalog_file(&mut self, path: &str) -> Result<()> {
        BufferCatalog::from_file(path)?;
        self.settings.catalog_file = Some(path.to_string());
        self.save_config()
    }

    pub fn reset_to_defaults(&mut self) -> Result<()> {
        self.settings = CalcSettings::default();
        self.save_config()
    }
}

impl Default for SettingsManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn missing_file_gives_defaults() {
        let manager = SettingsManager::with_config_file("definitely_missing_config.json");
        assert_eq!(manager.settings(), &CalcSettings::default());
        assert_eq!(manager.settings().log_level_filter(), LevelFilter::Warn);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, r#"{{"polyprotic_gap": 2.0, "log_level": "debug"}}"#).unwrap();
        let settings = SettingsManager::load_config(temp_file.path().to_str().unwrap()).unwrap();
        assert_eq!(settings.polyprotic_gap, 2.0);
        assert_eq!(settings.davies_a, 0.51);
        assert!(settings.dilution_correction);
        assert_eq!(settings.log_level_filter(), LevelFilter::Debug);
    }

    #[test]
    fn invalid_values_are_rejected() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, r#"{{"dead_zone_width": -1.0}}"#).unwrap();
        let path = temp_file.path().to_str().unwrap().to_string();
        assert!(SettingsManager::load_config(&path).is_err());
        // the manager degrades to defaults
        let manager = SettingsManager::with_config_file(&path);
        assert_eq!(manager.settings().dead_zone_width, 1.0);
    }

    #[test]
    fn save_and_reload() {
        let temp_file = NamedTempFile::new().unwrap();
        let path = temp_file.path().to_str().unwrap().to_string();
        let mut manager = SettingsManager::with_config_file(&path);
        let mut settings = CalcSettings::default();
        settings.dilution_correction = false;
        settings.max_dilution_iterations = 10;
        manager.update(settings.clone()).unwrap();

        let reloaded = SettingsManager::with_config_file(&path);
        assert_eq!(reloaded.settings(), &settings);

        let mut bad = settings.clone();
        bad.max_dilution_iterations = 0;
        assert!(manager.update(bad).is_err());
    }

    #[test]
    fn builtin_catalog_by_default() {
        let catalog = CalcSettings::default().load_catalog().unwrap();
        assert!(catalog.get("tris").is_some());

        let mut settings = CalcSettings::default();
        settings.catalog_file = Some("missing_catalog.json".to_string());
        assert!(settings.load_catalog().is_err());
    }
}
