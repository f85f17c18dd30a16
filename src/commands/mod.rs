// Command handlers module
pub mod config;
pub mod history;
pub mod scan;
pub mod trays;
pub mod version;
pub mod watch;

// Re-exports for cleaner imports
pub use version::execute as version;

use anyhow::{Context, Result};
use clap::ArgMatches;
use std::path::PathBuf;

use crate::core::{AlertConfig, Config, HttpFetcher, Monitor, ScanRequest, StateStore};

/// Stored configuration with this invocation's flag overrides applied
#[derive(Debug, Clone)]
pub struct Settings {
    pub url: Option<String>,
    pub alerts: AlertConfig,
    pub interval_minutes: u32,
    pub max_events: usize,
    pub state_path: PathBuf,
}

impl Settings {
    /// Load the config file and layer the global flags on top
    pub fn resolve(matches: &ArgMatches) -> Result<Self> {
        let config = Config::load()?;
        Self::from_config(config, matches)
    }

    pub fn from_config(mut config: Config, matches: &ArgMatches) -> Result<Self> {
        if let Some(url) = flag::<String>(matches, "url") {
            config.set_url(url)?;
        }
        if let Some(&value) = flag::<u32>(matches, "toner-threshold") {
            config.set_toner_threshold(value)?;
        }
        if let Some(&value) = flag::<u32>(matches, "fuser-threshold") {
            config.set_fuser_threshold(value)?;
        }
        if let Some(&value) = flag::<u32>(matches, "interval") {
            config.set_interval_minutes(value)?;
        }
        if let Some(path) = flag::<String>(matches, "state") {
            config.set_state_path(path.clone());
        }

        Ok(Self {
            url: config.url.clone(),
            alerts: config.alert_config(),
            interval_minutes: config.interval_minutes.max(1),
            max_events: config.max_events.max(1),
            state_path: config.resolve_state_path()?,
        })
    }

    /// The monitor URL, or an error explaining how to configure one
    pub fn require_url(&self) -> Result<String> {
        self.url.clone().context(
            "No monitor URL configured. Pass --url <URL> or run 'traywatch set url <URL>'",
        )
    }

    pub fn scan_request(&self) -> Result<ScanRequest> {
        Ok(ScanRequest {
            url: self.require_url()?,
            alerts: self.alerts,
        })
    }

    pub fn open_store(&self) -> StateStore {
        log::debug!("Using tray state at {}", self.state_path.display());
        StateStore::open(&self.state_path, self.max_events)
    }

    pub fn monitor(&self) -> Result<Monitor<HttpFetcher>> {
        let fetcher = HttpFetcher::new().context("Failed to initialize HTTP client")?;
        Ok(Monitor::new(fetcher, self.open_store()))
    }
}

/// Global flags are optional on every subcommand; absent ids read as unset
fn flag<'a, T>(matches: &'a ArgMatches, id: &str) -> Option<&'a T>
where
    T: Clone + Send + Sync + 'static,
{
    matches.try_get_one::<T>(id).ok().flatten()
}
