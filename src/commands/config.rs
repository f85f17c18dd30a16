use crate::core::Config;
use anyhow::{Context, Result};
use colored::Colorize;

/// Configuration keys editable through `set` / `get`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConfigType {
    Url,
    TonerThreshold,
    FuserThreshold,
    Interval,
    MaxEvents,
    StatePath,
}

impl ConfigType {
    const ALL: [ConfigType; 6] = [
        ConfigType::Url,
        ConfigType::TonerThreshold,
        ConfigType::FuserThreshold,
        ConfigType::Interval,
        ConfigType::MaxEvents,
        ConfigType::StatePath,
    ];

    fn from_subcommand(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.key() == name)
    }

    fn key(&self) -> &'static str {
        match self {
            ConfigType::Url => "url",
            ConfigType::TonerThreshold => "toner-threshold",
            ConfigType::FuserThreshold => "fuser-threshold",
            ConfigType::Interval => "interval",
            ConfigType::MaxEvents => "max-events",
            ConfigType::StatePath => "state-path",
        }
    }

    fn name(&self) -> &'static str {
        match self {
            ConfigType::Url => "Monitor URL",
            ConfigType::TonerThreshold => "Toner threshold",
            ConfigType::FuserThreshold => "Fuser threshold",
            ConfigType::Interval => "Scan interval",
            ConfigType::MaxEvents => "History size",
            ConfigType::StatePath => "State file",
        }
    }

    fn set_value(&self, config: &mut Config, raw: &str) -> Result<()> {
        match self {
            ConfigType::Url => config.set_url(raw),
            ConfigType::TonerThreshold => config.set_toner_threshold(parse_number(raw)?),
            ConfigType::FuserThreshold => config.set_fuser_threshold(parse_number(raw)?),
            ConfigType::Interval => config.set_interval_minutes(parse_number(raw)?),
            ConfigType::MaxEvents => config.set_max_events(parse_number(raw)?),
            ConfigType::StatePath => {
                let path = raw.trim();
                if path.is_empty() {
                    anyhow::bail!("State path cannot be empty");
                }
                config.set_state_path(path.to_string());
                Ok(())
            }
        }
    }

    fn get_value(&self, config: &Config) -> Option<String> {
        match self {
            ConfigType::Url => config.get_url().cloned(),
            ConfigType::TonerThreshold => Some(format!("{}%", config.toner_threshold)),
            ConfigType::FuserThreshold => Some(format!("{}%", config.fuser_threshold)),
            ConfigType::Interval => Some(format!("{} minute(s)", config.interval_minutes)),
            ConfigType::MaxEvents => Some(format!("{} events", config.max_events)),
            ConfigType::StatePath => config
                .resolve_state_path()
                .ok()
                .map(|path| path.display().to_string()),
        }
    }

    fn example_value(&self) -> &'static str {
        match self {
            ConfigType::Url => "http://printmonitor.local/status",
            ConfigType::TonerThreshold => "15",
            ConfigType::FuserThreshold => "20",
            ConfigType::Interval => "5",
            ConfigType::MaxEvents => "20000",
            ConfigType::StatePath => "/var/lib/traywatch/state.json",
        }
    }
}

fn parse_number<T: std::str::FromStr>(raw: &str) -> Result<T> {
    raw.trim()
        .parse::<T>()
        .map_err(|_| anyhow::anyhow!("'{}' is not a valid number", raw.trim()))
}

pub fn handle_set(matches: &clap::ArgMatches) -> Result<()> {
    match matches.subcommand() {
        Some((name, sub_matches)) => match ConfigType::from_subcommand(name) {
            Some(config_type) => set_value_for_type(sub_matches, config_type),
            None => {
                println!("Use 'traywatch set --help' for more information.");
                Ok(())
            }
        },
        None => {
            println!("Use 'traywatch set --help' for more information.");
            Ok(())
        }
    }
}

/// Shared logic for setting a configuration value
fn set_value_for_type(matches: &clap::ArgMatches, config_type: ConfigType) -> Result<()> {
    let raw = matches
        .get_one::<String>("value")
        .context("Value argument is required")?;

    let mut config = Config::load()?;
    config_type.set_value(&mut config, raw)?;
    config.save()?;

    let shown = config_type.get_value(&config).unwrap_or_else(|| raw.clone());
    println!(
        "{} {}",
        format!("✓ {} set to:", config_type.name()).green(),
        shown
    );
    log::info!("{} updated", config_type.key());

    Ok(())
}

pub fn handle_get(matches: &clap::ArgMatches) -> Result<()> {
    let config = Config::load()?;

    match matches.subcommand() {
        Some((name, _)) => match ConfigType::from_subcommand(name) {
            Some(config_type) => {
                get_value_for_type(&config, config_type);
                Ok(())
            }
            None => {
                println!("Use 'traywatch get --help' for more information.");
                Ok(())
            }
        },
        None => {
            show_all(&config)?;
            Ok(())
        }
    }
}

/// Shared logic for getting a configuration value
fn get_value_for_type(config: &Config, config_type: ConfigType) {
    let type_name = config_type.name();

    match config_type.get_value(config) {
        Some(value) => {
            println!("{}", format!("{}:", type_name).white());
            println!("{}", value.cyan().bold());
        }
        None => {
            println!(
                "{}",
                format!("No {} configured.", type_name.to_lowercase()).yellow()
            );
            println!();
            println!("{}", format!("To set the {}, run:", type_name.to_lowercase()).white());
            println!(
                "  {}",
                format!("traywatch set {} <value>", config_type.key()).cyan().bold()
            );
            println!();
            println!("{}", "Example:".dimmed());
            println!(
                "  {}",
                format!(
                    "traywatch set {} {}",
                    config_type.key(),
                    config_type.example_value()
                )
                .dimmed()
            );
        }
    }
}

fn show_all(config: &Config) -> Result<()> {
    let path = Config::get_config_path()?;
    println!("{} {}", "Config file:".white(), path.display().to_string().dimmed());
    println!();
    for config_type in ConfigType::ALL {
        let value = config_type
            .get_value(config)
            .unwrap_or_else(|| "(not set)".to_string());
        println!("  {:<18} {}", config_type.key(), value.cyan());
    }
    Ok(())
}
