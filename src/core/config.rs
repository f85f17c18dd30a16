use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use super::alerts::{AlertConfig, DEFAULT_FUSER_THRESHOLD, DEFAULT_TONER_THRESHOLD};
use super::tray_state::{write_atomic, DEFAULT_MAX_EVENTS};
use crate::error::MonitorError;

pub const DEFAULT_INTERVAL_MINUTES: u32 = 5;
pub const STATE_FILE_NAME: &str = "printer_monitor_state.json";

const APP_DIR: &str = "traywatch";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Monitor page address
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default = "default_toner_threshold")]
    pub toner_threshold: u8,
    #[serde(default = "default_fuser_threshold")]
    pub fuser_threshold: u8,
    #[serde(default = "default_interval_minutes")]
    pub interval_minutes: u32,
    #[serde(default = "default_max_events")]
    pub max_events: usize,
    /// Overrides the tray state location under the data directory
    #[serde(default)]
    pub state_path: Option<String>,
}

fn default_toner_threshold() -> u8 {
    DEFAULT_TONER_THRESHOLD
}

fn default_fuser_threshold() -> u8 {
    DEFAULT_FUSER_THRESHOLD
}

fn default_interval_minutes() -> u32 {
    DEFAULT_INTERVAL_MINUTES
}

fn default_max_events() -> usize {
    DEFAULT_MAX_EVENTS
}

impl Default for Config {
    fn default() -> Self {
        Self {
            url: None,
            toner_threshold: DEFAULT_TONER_THRESHOLD,
            fuser_threshold: DEFAULT_FUSER_THRESHOLD,
            interval_minutes: DEFAULT_INTERVAL_MINUTES,
            max_events: DEFAULT_MAX_EVENTS,
            state_path: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;
        Self::load_from(&config_path)
    }

    /// Read a config file. A missing, empty or corrupted file yields defaults.
    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Config::default());
        }

        let data = fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file: {:?}", config_path))?;

        if data.trim().is_empty() {
            return Ok(Config::default());
        }

        let config = serde_json::from_str(&data).unwrap_or_else(|e| {
            log::warn!("Ignoring unreadable config {:?}: {}", config_path, e);
            Config::default()
        });
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::get_config_path()?;
        self.save_to(&config_path)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        let data = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        write_atomic(config_path, data.as_bytes())
            .with_context(|| format!("Failed to write config file: {:?}", config_path))?;
        Ok(())
    }

    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir =
            dirs::config_dir().with_context(|| "Could not determine config directory")?;

        Ok(config_dir.join(APP_DIR).join("config.json"))
    }

    /// Configured override, else `<data_dir>/traywatch/printer_monitor_state.json`
    pub fn resolve_state_path(&self) -> Result<PathBuf> {
        if let Some(path) = self.state_path.as_deref().filter(|p| !p.trim().is_empty()) {
            return Ok(PathBuf::from(path));
        }

        let data_dir = dirs::data_dir().with_context(|| "Could not determine data directory")?;
        Ok(data_dir.join(APP_DIR).join(STATE_FILE_NAME))
    }

    pub fn alert_config(&self) -> AlertConfig {
        AlertConfig::new(self.toner_threshold, self.fuser_threshold)
    }

    pub fn get_url(&self) -> Option<&String> {
        self.url.as_ref()
    }

    pub fn set_url(&mut self, url: &str) -> Result<()> {
        self.url = Some(validate_url(url)?);
        Ok(())
    }

    pub fn set_toner_threshold(&mut self, value: u32) -> Result<()> {
        self.toner_threshold = validate_percent("toner threshold", value)?;
        Ok(())
    }

    pub fn set_fuser_threshold(&mut self, value: u32) -> Result<()> {
        self.fuser_threshold = validate_percent("fuser threshold", value)?;
        Ok(())
    }

    pub fn set_interval_minutes(&mut self, value: u32) -> Result<()> {
        if value < 1 {
            return Err(MonitorError::config("Interval must be at least 1 minute").into());
        }
        self.interval_minutes = value;
        Ok(())
    }

    pub fn set_max_events(&mut self, value: usize) -> Result<()> {
        if value < 1 {
            return Err(MonitorError::config("History size must be at least 1 event").into());
        }
        self.max_events = value;
        Ok(())
    }

    pub fn set_state_path(&mut self, path: String) {
        self.state_path = Some(path);
    }
}

/// Accepts absolute http(s) URLs only; returns the normalized form
pub fn validate_url(raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    let parsed = url::Url::parse(trimmed)
        .map_err(|e| MonitorError::config(format!("Invalid URL '{}': {}", trimmed, e)))?;

    match parsed.scheme() {
        "http" | "https" if parsed.host_str().is_some() => Ok(parsed.to_string()),
        "http" | "https" => Err(MonitorError::config(format!("URL '{}' has no host", trimmed)).into()),
        other => Err(MonitorError::config(format!(
            "Unsupported URL scheme '{}' (use http or https)",
            other
        ))
        .into()),
    }
}

fn validate_percent(name: &str, value: u32) -> Result<u8> {
    if !(1..=100).contains(&value) {
        return Err(MonitorError::config(format!("{} must be between 1 and 100, got {}", name, value)).into());
    }
    Ok(value as u8)
}
