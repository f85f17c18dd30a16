use anyhow::{Context, Result};
use clap::ArgMatches;

use super::Settings;
use crate::ui::{format_scan_report, warn};

/// Run one scan in the foreground and print the result
pub fn execute(matches: &ArgMatches) -> Result<()> {
    let settings = Settings::resolve(matches)?;
    let request = settings.scan_request()?;
    let monitor = settings.monitor()?;

    let report = monitor
        .scan_now(&request)
        .with_context(|| format!("Scan of {} failed", request.url))?;

    if matches.get_flag("json") {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("Failed to serialize scan report")?
        );
        return Ok(());
    }

    format_scan_report(
        &report,
        settings.alerts.toner_threshold,
        settings.alerts.fuser_threshold,
    );

    if report.changes.new_empties > 0 {
        warn(&format!(
            "{} tray(s) newly reported empty",
            report.changes.new_empties
        ));
    }
    Ok(())
}
