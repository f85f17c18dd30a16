use anyhow::{Context, Result};
use clap::ArgMatches;
use std::path::PathBuf;

use super::Settings;
use crate::core::export::{default_export_name, export_history_to_path};
use crate::ui::{dimmed, info, print_events, success};

/// Handle 'history' - show the most recent events, oldest first
pub fn handle_list(matches: &ArgMatches) -> Result<()> {
    let settings = Settings::resolve(matches)?;
    let store = settings.open_store();
    let events = store.events();

    let limit = matches.get_one::<usize>("limit").copied().unwrap_or(50);
    let skip = events.len().saturating_sub(limit);

    if matches.get_flag("json") {
        let recent: Vec<_> = events.iter().skip(skip).collect();
        println!(
            "{}",
            serde_json::to_string_pretty(&recent).context("Failed to serialize history")?
        );
        return Ok(());
    }

    print_events(events.iter().skip(skip));
    if skip > 0 {
        dimmed(&format!(
            "{} older event(s) not shown (use --limit)",
            skip
        ));
    }
    Ok(())
}

/// Handle 'export' - write the whole event log to CSV
pub fn handle_export(matches: &ArgMatches) -> Result<()> {
    let settings = Settings::resolve(matches)?;
    let store = settings.open_store();

    if store.events().is_empty() {
        info("No history events to export yet.");
        return Ok(());
    }

    let output = matches
        .get_one::<String>("output")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(default_export_name()));

    let rows = export_history_to_path(&output, store.events())
        .with_context(|| format!("Failed to export history to {:?}", output))?;

    success(&format!("✓ Exported {} event(s) to {}", rows, output.display()));
    Ok(())
}
