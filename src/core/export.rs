//! CSV export of the tray event log.

use chrono::Local;
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use super::tray_state::HistoryEvent;
use crate::error::{MonitorError, Result};

/// One CSV row; field order is the column order
#[derive(Debug, Serialize)]
struct HistoryRow<'a> {
    timestamp: String,
    event_type: &'a str,
    printer_id: &'a str,
    description: &'a str,
    tray: &'a str,
    empty_since: String,
    last_seen: String,
    status_message: &'a str,
    printer_text: &'a str,
    note: &'a str,
}

impl<'a> From<&'a HistoryEvent> for HistoryRow<'a> {
    fn from(event: &'a HistoryEvent) -> Self {
        Self {
            timestamp: event.timestamp.to_rfc3339(),
            event_type: event.event_type.as_str(),
            printer_id: &event.device_id,
            description: &event.description,
            tray: &event.tray,
            empty_since: event.empty_since.map(|ts| ts.to_rfc3339()).unwrap_or_default(),
            last_seen: event.last_seen.map(|ts| ts.to_rfc3339()).unwrap_or_default(),
            status_message: &event.status_message,
            printer_text: &event.printer_text,
            note: &event.note,
        }
    }
}

/// Write header plus one row per event, in stored order. Returns rows written.
pub fn export_history_csv<'a, W, I>(writer: W, events: I) -> Result<usize>
where
    W: Write,
    I: IntoIterator<Item = &'a HistoryEvent>,
{
    let mut csv_writer = csv::Writer::from_writer(writer);
    let mut rows = 0;
    for event in events {
        csv_writer.serialize(HistoryRow::from(event))?;
        rows += 1;
    }
    if rows == 0 {
        return Err(MonitorError::export("No history events to export yet."));
    }
    csv_writer.flush()?;
    Ok(rows)
}

/// Export to a file. Nothing is created when there are no events.
pub fn export_history_to_path<'a, I>(path: &Path, events: I) -> Result<usize>
where
    I: IntoIterator<Item = &'a HistoryEvent>,
    I::IntoIter: ExactSizeIterator,
{
    let events = events.into_iter();
    if events.len() == 0 {
        return Err(MonitorError::export("No history events to export yet."));
    }

    let file = File::create(path)?;
    let rows = export_history_csv(file, events)?;
    log::info!("Exported {} history event(s) to {}", rows, path.display());
    Ok(rows)
}

/// `tray_history_YYYYMMDD_HHMMSS.csv` for the current local time
pub fn default_export_name() -> String {
    format!("tray_history_{}.csv", Local::now().format("%Y%m%d_%H%M%S"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::clock::parse_timestamp;
    use crate::core::tray_state::{EventType, HistoryEvent};
    use tempfile::TempDir;

    const HEADER: &str = "timestamp,event_type,printer_id,description,tray,empty_since,\
                          last_seen,status_message,printer_text,note";

    fn event(event_type: EventType, note: &str) -> HistoryEvent {
        HistoryEvent {
            timestamp: parse_timestamp("2025-03-14T09:30:00-05:00").unwrap(),
            event_type,
            device_id: "10001".into(),
            description: "Lobby, 1st floor".into(),
            tray: "Tray 2".into(),
            empty_since: parse_timestamp("2025-03-14T09:30:00-05:00"),
            last_seen: None,
            status_message: "Tray 2 empty".into(),
            printer_text: String::new(),
            note: note.into(),
        }
    }

    #[test]
    fn test_header_and_rows() {
        let events = vec![
            event(EventType::Detected, "detected by monitor"),
            event(EventType::Filled, "manually marked filled"),
        ];
        let mut out = Vec::new();
        let rows = export_history_csv(&mut out, &events).unwrap();
        assert_eq!(rows, 2);

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], HEADER);
        assert_eq!(
            lines[1],
            "2025-03-14T09:30:00-05:00,detected,10001,\"Lobby, 1st floor\",Tray 2,\
             2025-03-14T09:30:00-05:00,,Tray 2 empty,,detected by monitor"
        );
        assert!(lines[2].starts_with("2025-03-14T09:30:00-05:00,filled,"));
    }

    #[test]
    fn test_empty_history_writes_no_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.csv");
        let events: Vec<HistoryEvent> = Vec::new();

        let err = export_history_to_path(&path, &events).unwrap_err();
        assert!(matches!(err, MonitorError::Export(_)));
        assert!(!path.exists());
    }

    #[test]
    fn test_export_to_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.csv");
        let events = vec![event(EventType::Detected, "detected by monitor")];

        assert_eq!(export_history_to_path(&path, &events).unwrap(), 1);
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with(HEADER));
    }

    #[test]
    fn test_default_export_name() {
        let name = default_export_name();
        assert!(name.starts_with("tray_history_"));
        assert!(name.ends_with(".csv"));
        assert_eq!(name.len(), "tray_history_YYYYMMDD_HHMMSS.csv".len());
    }
}
