//! Ticket work-note text for an open tray.

use std::fmt;
use std::str::FromStr;

use super::clock::{display_time, Timestamp};
use super::tray_state::OpenTrayEntry;
use crate::error::MonitorError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WorkNoteMode {
    /// Monitoring alert with the planned refill
    #[default]
    Detected,
    /// Refill done and test print confirmed
    Refilled,
}

impl WorkNoteMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkNoteMode::Detected => "detected",
            WorkNoteMode::Refilled => "refilled",
        }
    }
}

impl fmt::Display for WorkNoteMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WorkNoteMode {
    type Err = MonitorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "detected" | "empty" => Ok(WorkNoteMode::Detected),
            "refilled" | "filled" => Ok(WorkNoteMode::Refilled),
            other => Err(MonitorError::other(format!(
                "Unknown work note mode '{}' (expected 'detected' or 'refilled')",
                other
            ))),
        }
    }
}

fn or_none(value: &str) -> &str {
    if value.trim().is_empty() {
        "None"
    } else {
        value
    }
}

/// Render the note for `entry` as of `now`
pub fn build_work_note(entry: &OpenTrayEntry, mode: WorkNoteMode, now: &Timestamp) -> String {
    let now_label = display_time(now);
    let since = display_time(&entry.since);
    let last_seen = display_time(&entry.last_seen);
    let tray = &entry.tray;

    let lines = match mode {
        WorkNoteMode::Refilled => vec![
            format!(
                "[{}] Refill completed for printer {} ({}).",
                now_label, entry.device_id, entry.description
            ),
            format!("Issue addressed: {} empty.", tray),
            format!("First detected empty: {}.", since),
            format!("Most recent empty detection: {}.", last_seen),
            "Actions performed:".to_string(),
            format!("- Arrived on site and verified {} was empty.", tray),
            format!("- Refilled {} with paper.", tray),
            "- Ran a test print and confirmed successful output.".to_string(),
            "- No additional supply/tray faults observed after refill.".to_string(),
            "Printer returned to service.".to_string(),
        ],
        WorkNoteMode::Detected => vec![
            format!(
                "[{}] Monitoring alert for printer {} ({}).",
                now_label, entry.device_id, entry.description
            ),
            format!("Current issue: {} empty.", tray),
            format!("First detected empty: {}.", since),
            format!("Most recent detection: {}.", last_seen),
            format!("Status Message: {}", or_none(&entry.status_message)),
            format!("Printer Text: {}", or_none(&entry.printer_text)),
            "Planned action:".to_string(),
            format!("- Refill {}.", tray),
            "- Run test print.".to_string(),
            "- Update ticket with verification results.".to_string(),
        ],
    };

    lines.join("\n")
}
