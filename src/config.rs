use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::chart::{MAX_HEIGHT, MAX_WIDTH};
use crate::error::DietError;
use crate::logging::LogConfig;
use crate::models::{ActivityLevel, BodyProfile, Sex};
use crate::units::{to_cm, Units};

/// Main application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application metadata
    pub metadata: ConfigMetadata,

    /// Profile used when a command does not override a field
    #[serde(default)]
    pub profile: ProfileSettings,

    /// Console presentation
    #[serde(default)]
    pub display: DisplaySettings,

    /// Text chart dimensions
    #[serde(default)]
    pub chart: ChartSettings,

    /// Logging configuration
    #[serde(default)]
    pub logging: LogConfig,
}

/// Configuration metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigMetadata {
    /// Configuration format version
    pub version: String,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last modification timestamp
    pub updated_at: DateTime<Utc>,
}

/// Default body profile and activity level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileSettings {
    /// Height in centimeters
    pub height_cm: f64,

    /// Age in years
    pub age_years: f64,

    pub sex: Sex,

    pub activity: ActivityLevel,
}

impl ProfileSettings {
    pub fn body_profile(&self) -> BodyProfile {
        BodyProfile::new(self.height_cm, self.age_years, self.sex)
    }
}

/// Console presentation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplaySettings {
    /// Units for mass/height input and output
    pub units: Units,

    /// Colorize status lines and chart series
    pub color: bool,
}

/// Text chart settings, in character cells
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartSettings {
    pub width: u32,
    pub height: u32,

    /// Draw a legend on multi-series charts
    pub legend: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        let now = Utc::now();

        AppConfig {
            metadata: ConfigMetadata {
                version: "1.0".to_string(),
                created_at: now,
                updated_at: now,
            },
            profile: ProfileSettings::default(),
            display: DisplaySettings::default(),
            chart: ChartSettings::default(),
            logging: LogConfig::default(),
        }
    }
}

impl Default for ProfileSettings {
    fn default() -> Self {
        ProfileSettings {
            height_cm: to_cm(77.0),
            age_years: 43.0,
            sex: Sex::Male,
            activity: ActivityLevel::Sedentary,
        }
    }
}

impl Default for DisplaySettings {
    fn default() -> Self {
        DisplaySettings {
            units: Units::Metric,
            color: true,
        }
    }
}

impl Default for ChartSettings {
    fn default() -> Self {
        ChartSettings {
            width: 60,
            height: 20,
            legend: true,
        }
    }
}

/// Configuration management implementation
impl AppConfig {
    /// Load configuration from TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: AppConfig = toml::from_str(&content)
            .with_context(|| "Failed to parse TOML configuration")?;

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn save_to_file<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        self.metadata.updated_at = Utc::now();

        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {}", parent.display()))?;
        }

        let toml_content = toml::to_string_pretty(self)
            .with_context(|| "Failed to serialize configuration to TOML")?;

        fs::write(&path, toml_content)
            .with_context(|| format!("Failed to write config file: {}", path.as_ref().display()))?;

        Ok(())
    }

    /// Get default configuration file path
    pub fn default_config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".dietrs")
            .join("config.toml")
    }

    /// Load configuration from `path` (or the default path), falling back to
    /// defaults when the file does not exist
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        let config_path = path
            .map(Path::to_path_buf)
            .unwrap_or_else(Self::default_config_path);

        if !config_path.exists() {
            if path.is_some() {
                anyhow::bail!("Config file not found: {}", config_path.display());
            }
            return Ok(Self::default());
        }

        Self::load_from_file(&config_path)
    }

    /// Reject values the formulas and charts cannot work with
    pub fn validate(&self) -> crate::error::Result<()> {
        if !self.profile.height_cm.is_finite() || self.profile.height_cm <= 0.0 {
            return Err(DietError::Configuration(format!(
                "profile.height_cm must be positive, got {}",
                self.profile.height_cm
            )));
        }
        if !self.profile.age_years.is_finite() || self.profile.age_years < 0.0 {
            return Err(DietError::Configuration(format!(
                "profile.age_years must not be negative, got {}",
                self.profile.age_years
            )));
        }
        let (width, height) = (self.chart.width, self.chart.height);
        if !(10..=MAX_WIDTH).contains(&width) || !(4..=MAX_HEIGHT).contains(&height) {
            return Err(DietError::Configuration(format!(
                "chart must be between 10x4 and {}x{} cells, got {}x{}",
                MAX_WIDTH, MAX_HEIGHT, width, height
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults_match_reference_profile() {
        let config = AppConfig::default();
        assert_eq!(config.profile.body_profile(), BodyProfile::reference());
        assert_eq!(config.profile.activity, ActivityLevel::Sedentary);
        assert_eq!((config.chart.width, config.chart.height), (60, 20));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_serialization() {
        let config = AppConfig::default();
        let toml_str = toml::to_string(&config).unwrap();
        let deserialized: AppConfig = toml::from_str(&toml_str).unwrap();

        assert_eq!(config.metadata.version, deserialized.metadata.version);
        assert_eq!(config.profile, deserialized.profile);
        assert_eq!(config.display.units, deserialized.display.units);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let toml_str = r#"
            [metadata]
            version = "1.0"
            created_at = "2026-01-01T00:00:00Z"
            updated_at = "2026-01-01T00:00:00Z"

            [profile]
            sex = "female"
            activity = "light"

            [display]
            units = "imperial"
        "#;
        let config: AppConfig = toml::from_str(toml_str).unwrap();

        assert_eq!(config.profile.sex, Sex::Female);
        assert_eq!(config.profile.activity, ActivityLevel::Light);
        assert_eq!(config.profile.age_years, 43.0);
        assert_eq!(config.display.units, Units::Imperial);
        assert_eq!(config.chart.width, 60);
    }

    #[test]
    fn test_config_file_io() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("nested").join("config.toml");

        let mut original_config = AppConfig::default();
        original_config.profile.age_years = 35.0;
        original_config.chart.width = 80;

        original_config.save_to_file(&config_path).unwrap();
        let loaded_config = AppConfig::load_from_file(&config_path).unwrap();

        assert_eq!(loaded_config.profile.age_years, 35.0);
        assert_eq!(loaded_config.chart.width, 80);
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let temp_dir = tempdir().unwrap();
        let missing = temp_dir.path().join("absent.toml");
        assert!(AppConfig::load_or_default(Some(&missing)).is_err());
    }

    #[test]
    fn test_invalid_values_rejected() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.toml");

        let mut config = AppConfig::default();
        config.chart.width = 3;
        config.save_to_file(&config_path).unwrap();

        assert!(AppConfig::load_from_file(&config_path).is_err());
    }

    #[test]
    fn test_oversized_chart_rejected() {
        let mut config = AppConfig::default();
        config.chart.width = 70_000;
        config.chart.height = 70_000;
        assert!(matches!(config.validate(), Err(DietError::Configuration(_))));

        config.chart.width = MAX_WIDTH;
        config.chart.height = MAX_HEIGHT;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_negative_age_is_a_configuration_error() {
        let mut config = AppConfig::default();
        config.profile.age_years = -1.0;
        let err = config.validate().unwrap_err();
        assert!(matches!(err, DietError::Configuration(_)));
        assert!(err.to_string().contains("age_years"));
    }
}
