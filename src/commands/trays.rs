// Open tray commands - list, resolve and work notes for trays currently
// believed empty. None of these touch the network.

use anyhow::{bail, Context, Result};
use clap::ArgMatches;
use colored::Colorize;
use std::collections::BTreeMap;

use super::Settings;
use crate::core::clock::{self, display_optional};
use crate::core::page::normalize_tray;
use crate::core::tray_state::{tray_key, OpenTrayEntry};
use crate::core::{build_work_note, WorkNoteMode};
use crate::ui::{dimmed, info, print_open_trays, read_confirmation, success, warn};

/// Handle 'trays' - list open trays from the persisted state
pub fn handle_list(matches: &ArgMatches) -> Result<()> {
    let settings = Settings::resolve(matches)?;
    let store = settings.open_store();
    let entries = store.document().sorted_open_trays();

    if matches.get_flag("json") {
        println!(
            "{}",
            serde_json::to_string_pretty(&entries).context("Failed to serialize open trays")?
        );
        return Ok(());
    }

    print_open_trays(&entries);
    println!();
    dimmed(&format!(
        "Last scan: {}",
        display_optional(store.last_scan().as_ref())
    ));
    Ok(())
}

/// Handle 'resolve' - manually mark an open tray as filled
pub fn handle_resolve(matches: &ArgMatches) -> Result<()> {
    let settings = Settings::resolve(matches)?;
    let mut store = settings.open_store();
    let entry = select_entry(store.open_trays(), matches)?;
    let key = entry.key();

    if !matches.get_flag("yes") {
        println!(
            "{} {} - {} ({})",
            "Mark this tray as filled?".white().bold(),
            entry.device_id.cyan(),
            entry.description,
            entry.tray.yellow()
        );
        if !read_confirmation("Continue? (y/N): ", 3)? {
            info("Cancelled.");
            return Ok(());
        }
    }

    // mark_filled re-reads the document under the state lock
    if store
        .mark_filled(&key, clock::now())
        .with_context(|| format!("Failed to record resolution of {}", key))?
    {
        success(&format!("✓ {} marked filled", key));
    } else {
        warn("Tray was already resolved.");
    }
    Ok(())
}

/// Handle 'note' - print a ticket work note for an open tray
pub fn handle_note(matches: &ArgMatches) -> Result<()> {
    let settings = Settings::resolve(matches)?;
    let store = settings.open_store();
    let entry = select_entry(store.open_trays(), matches)?;

    let mode = match matches.get_one::<String>("mode") {
        Some(raw) => raw.parse::<WorkNoteMode>()?,
        None => WorkNoteMode::default(),
    };

    println!("{}", build_work_note(&entry, mode, &clock::now()));
    Ok(())
}

fn select_entry(
    open: &BTreeMap<String, OpenTrayEntry>,
    matches: &ArgMatches,
) -> Result<OpenTrayEntry> {
    let printer = matches
        .get_one::<String>("printer")
        .context("Printer argument is required")?;
    let tray = matches.get_one::<String>("tray").map(String::as_str);
    find_open_entry(open, printer, tray)
}

/// Locate an open tray by `printer::tray` key, by printer and tray, or by
/// printer alone when it has exactly one open tray
pub fn find_open_entry(
    open: &BTreeMap<String, OpenTrayEntry>,
    printer: &str,
    tray: Option<&str>,
) -> Result<OpenTrayEntry> {
    let printer = printer.trim();

    if tray.is_none() {
        if let Some(entry) = open.get(printer) {
            return Ok(entry.clone());
        }
    }

    let candidates: Vec<&OpenTrayEntry> = open
        .values()
        .filter(|entry| entry.device_id == printer)
        .collect();

    if candidates.is_empty() {
        bail!("Printer {} has no open empty trays", printer);
    }

    match tray {
        Some(tray) => {
            let tray = tray.trim();
            // exact label first, so "Unknown Tray" and the like still match
            let exact = candidates
                .iter()
                .find(|entry| entry.tray.eq_ignore_ascii_case(tray));
            let found = exact.or_else(|| {
                let wanted = tray_key(printer, &normalize_tray(tray));
                candidates.iter().find(|entry| entry.key() == wanted)
            });
            match found {
                Some(entry) => Ok((*entry).clone()),
                None => bail!(
                    "{} is not open for printer {} (open: {})",
                    tray,
                    printer,
                    list_trays(&candidates)
                ),
            }
        }
        None if candidates.len() == 1 => Ok(candidates[0].clone()),
        None => bail!(
            "Printer {} has several open trays ({}); name one",
            printer,
            list_trays(&candidates)
        ),
    }
}

fn list_trays(entries: &[&OpenTrayEntry]) -> String {
    entries
        .iter()
        .map(|entry| entry.tray.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
