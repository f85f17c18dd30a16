use colored::*;

use crate::core::alerts::LowAlert;
use crate::core::clock::display_time;
use crate::core::monitor::ScanReport;
use crate::core::page::{Channel, DeviceRecord};
use crate::core::tray_state::{EventType, HistoryEvent, OpenTrayEntry};

/// Level as `NN%`, `-` when not reported
pub fn format_level(level: Option<u8>) -> String {
    match level {
        Some(value) => format!("{}%", value),
        None => "-".to_string(),
    }
}

/// Cut `text` to at most `width` characters, marking the cut with `…`
pub fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    if width == 0 {
        return String::new();
    }
    let mut cut: String = text.chars().take(width - 1).collect();
    cut.push('…');
    cut
}

/// Right-aligned level, red at or below `threshold`, yellow within twice it
fn color_level(level: Option<u8>, threshold: u8, width: usize) -> ColoredString {
    let text = format!("{:>width$}", format_level(level), width = width);
    match level {
        Some(value) if value <= threshold => text.red().bold(),
        Some(value) if u16::from(value) <= u16::from(threshold) * 2 => text.yellow(),
        Some(_) => text.green(),
        None => text.dimmed(),
    }
}

fn print_section_header(title: &str) {
    println!("\n{}", title.bold().green());
    println!("{}", "-".repeat(80).dimmed());
}

/// Full scan result as printed by `scan` and `watch`
pub fn format_scan_report(report: &ScanReport, toner_threshold: u8, fuser_threshold: u8) {
    println!("\n{}", "PRINTER FLEET STATUS".bold().bright_cyan());
    println!("{}", "=".repeat(80));
    println!(
        "{} {}   {} {}   {} {}   {} {}",
        "Scanned:".white(),
        display_time(&report.scan_time).cyan(),
        "Printers:".white(),
        report.records.len().to_string().cyan().bold(),
        "Alerts:".white(),
        report.low_alerts.len().to_string().cyan().bold(),
        "Open trays:".white(),
        report.open_trays.len().to_string().cyan().bold(),
    );

    print_printers(&report.records, toner_threshold, fuser_threshold);
    print_alerts(&report.low_alerts);
    let open: Vec<&OpenTrayEntry> = report.open_trays.values().collect();
    print_open_trays(&open);

    println!(
        "\n{} {} new empty, {} filled, {} event(s) stored",
        "Changes:".white().bold(),
        report.changes.new_empties.to_string().yellow(),
        report.changes.new_filled.to_string().green(),
        report.event_count
    );
}

pub fn print_printers(records: &[DeviceRecord], toner_threshold: u8, fuser_threshold: u8) {
    print_section_header("PRINTERS");
    println!(
        "{}",
        format!(
            "{:<7} {:<28} {:>5} {:>5} {:>5} {:>5} {:>6} {:<18}",
            "ID", "Description", "K", "C", "M", "Y", "Fuser", "Empty trays"
        )
        .bold()
    );

    for record in records {
        let empties = if record.empty_trays.is_empty() {
            "-".to_string()
        } else {
            record.empty_trays.join(", ")
        };
        let empties = format!("{:<18}", empties);
        println!(
            "{:<7} {:<28} {} {} {} {} {} {}",
            record.device_id,
            truncate(&record.description, 28),
            color_level(record.level(Channel::TonerK), toner_threshold, 5),
            color_level(record.level(Channel::TonerC), toner_threshold, 5),
            color_level(record.level(Channel::TonerM), toner_threshold, 5),
            color_level(record.level(Channel::TonerY), toner_threshold, 5),
            color_level(record.level(Channel::Fuser), fuser_threshold, 6),
            if record.empty_trays.is_empty() {
                empties.dimmed()
            } else {
                empties.yellow()
            },
        );
    }
}

pub fn print_alerts(alerts: &[LowAlert]) {
    print_section_header("LOW SUPPLY ALERTS");
    if alerts.is_empty() {
        println!("{}", "No low-supply alerts.".dimmed());
        return;
    }

    for alert in alerts {
        println!(
            "{:<7} {:<28} {} {}  {}",
            alert.device_id,
            truncate(&alert.description, 28),
            format!("{:<14}", alert.item).yellow().bold(),
            format!("{:>9}", alert.level).red(),
            alert.source.dimmed()
        );
    }
}

pub fn print_open_trays(entries: &[&OpenTrayEntry]) {
    print_section_header("EMPTY TRAYS");
    if entries.is_empty() {
        println!("{}", "No trays are currently reported empty.".dimmed());
        return;
    }

    println!(
        "{}",
        format!(
            "{:<7} {:<24} {:<10} {:<19} {:<19}",
            "ID", "Description", "Tray", "Empty since", "Last seen"
        )
        .bold()
    );
    for entry in entries {
        println!(
            "{:<7} {:<24} {} {:<19} {:<19}",
            entry.device_id,
            truncate(&entry.description, 24),
            format!("{:<10}", entry.tray).yellow().bold(),
            display_time(&entry.since),
            display_time(&entry.last_seen),
        );
        if !entry.status_message.is_empty() {
            println!("        {}", truncate(&entry.status_message, 72).dimmed());
        }
    }
}

pub fn print_events<'a, I>(events: I)
where
    I: IntoIterator<Item = &'a HistoryEvent>,
{
    print_section_header("TRAY HISTORY");
    println!(
        "{}",
        format!(
            "{:<19} {:<9} {:<7} {:<22} {:<10} {}",
            "Time", "Event", "ID", "Description", "Tray", "Note"
        )
        .bold()
    );

    let mut shown = 0;
    for event in events {
        let kind = format!("{:<9}", event.event_type.as_str());
        let kind = match event.event_type {
            EventType::Detected => kind.yellow(),
            EventType::Filled => kind.green(),
        };
        println!(
            "{:<19} {} {:<7} {:<22} {:<10} {}",
            display_time(&event.timestamp),
            kind,
            event.device_id,
            truncate(&event.description, 22),
            event.tray,
            event.note.dimmed()
        );
        shown += 1;
    }

    if shown == 0 {
        println!("{}", "No history events recorded yet.".dimmed());
    }
}
