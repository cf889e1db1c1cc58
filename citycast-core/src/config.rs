use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, time::Duration};

use crate::units::UnitSystem;

/// Environment variable that overrides the API key stored on disk.
pub const API_KEY_ENV: &str = "OPENWEATHER_API_KEY";

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_FALLBACK_DELAY_MS: u64 = 1000;

/// Settings for the OpenWeather forecast provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenWeatherConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub units: UnitSystem,
    pub timeout_secs: u64,
}

impl Default for OpenWeatherConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            units: UnitSystem::default(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl OpenWeatherConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Settings for the mock fallback path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FallbackConfig {
    pub delay_ms: u64,
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self { delay_ms: DEFAULT_FALLBACK_DELAY_MS }
    }
}

impl FallbackConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// [openweather]
/// api_key = "..."
/// units = "metric"
///
/// [fallback]
/// delay_ms = 500
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub openweather: OpenWeatherConfig,
    pub fallback: FallbackConfig,
}

impl Config {
    /// Load config from disk (or defaults on first run) and apply the
    /// environment override for the API key.
    pub fn load() -> Result<Self> {
        let mut cfg = Self::load_file()?;
        cfg.apply_env_key(std::env::var(API_KEY_ENV).ok());
        Ok(cfg)
    }

    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load_file() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        let cfg: Config = toml::from_str(contents).context("Invalid configuration TOML")?;
        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "citycast", "citycast")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Replace the stored key with a non-blank value from the environment.
    pub fn apply_env_key(&mut self, value: Option<String>) {
        if let Some(key) = value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty()) {
            self.openweather.api_key = Some(key);
        }
    }

    pub fn set_api_key(&mut self, api_key: String) {
        self.openweather.api_key = Some(api_key);
    }

    /// Returns the API key, if one is set and non-blank.
    pub fn api_key(&self) -> Option<&str> {
        self.openweather
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }

    pub fn is_provider_configured(&self) -> bool {
        self.api_key().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_behavior() {
        let cfg = Config::default();

        assert_eq!(cfg.openweather.timeout(), Duration::from_secs(10));
        assert_eq!(cfg.openweather.units, UnitSystem::Standard);
        assert_eq!(cfg.openweather.base_url, DEFAULT_BASE_URL);
        assert_eq!(cfg.fallback.delay(), Duration::from_millis(1000));
        assert!(!cfg.is_provider_configured());
    }

    #[test]
    fn partial_toml_keeps_defaults_for_missing_fields() {
        let cfg = Config::from_toml(
            r#"
            [openweather]
            api_key = "OPEN_KEY"
            units = "metric"
            "#,
        )
        .expect("config must parse");

        assert_eq!(cfg.api_key(), Some("OPEN_KEY"));
        assert_eq!(cfg.openweather.units, UnitSystem::Metric);
        assert_eq!(cfg.openweather.timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert_eq!(cfg.fallback.delay_ms, DEFAULT_FALLBACK_DELAY_MS);
    }

    #[test]
    fn unknown_units_fail_to_parse() {
        let err = Config::from_toml("[openweather]\nunits = \"kelvin\"\n").unwrap_err();
        assert!(err.to_string().contains("Invalid configuration TOML"));
    }

    #[test]
    fn env_key_overrides_file_key() {
        let mut cfg = Config::default();
        cfg.set_api_key("FILE_KEY".into());

        cfg.apply_env_key(Some("ENV_KEY".into()));
        assert_eq!(cfg.api_key(), Some("ENV_KEY"));
    }

    #[test]
    fn blank_env_key_is_ignored() {
        let mut cfg = Config::default();
        cfg.set_api_key("FILE_KEY".into());

        cfg.apply_env_key(Some("   ".into()));
        assert_eq!(cfg.api_key(), Some("FILE_KEY"));

        cfg.apply_env_key(None);
        assert_eq!(cfg.api_key(), Some("FILE_KEY"));
    }

    #[test]
    fn blank_stored_key_counts_as_unconfigured() {
        let mut cfg = Config::default();
        cfg.set_api_key("  ".into());
        assert!(!cfg.is_provider_configured());
    }

    #[test]
    fn config_roundtrips_through_toml() {
        let mut cfg = Config::default();
        cfg.set_api_key("KEY".into());
        cfg.openweather.units = UnitSystem::Imperial;

        let text = toml::to_string_pretty(&cfg).expect("serialize");
        let parsed = Config::from_toml(&text).expect("parse");
        assert_eq!(parsed, cfg);
    }
}
