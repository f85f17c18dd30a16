use std::fs;
use tempfile::TempDir;
use traywatch::core::clock::parse_timestamp;
use traywatch::core::export::export_history_to_path;
use traywatch::core::page::parse_monitor_page;
use traywatch::core::tray_state::{build_current_empties, StateStore};
use traywatch::MonitorError;

const PAGE: &str = include_str!("../fixtures/monitor_page.html");

#[test]
fn test_export_after_scans() {
    let temp_dir = TempDir::new().unwrap();
    let mut store = StateStore::open(temp_dir.path().join("state.json"), 100);
    let current = build_current_empties(&parse_monitor_page(PAGE));

    store
        .reconcile(&current, parse_timestamp("2025-03-14T09:30:00-05:00").unwrap())
        .unwrap();
    store
        .reconcile(
            &build_current_empties(&[]),
            parse_timestamp("2025-03-14T10:00:00-05:00").unwrap(),
        )
        .unwrap();

    let output = temp_dir.path().join("history.csv");
    let rows = export_history_to_path(&output, store.events()).unwrap();
    assert_eq!(rows, 4);

    let mut reader = csv::Reader::from_path(&output).unwrap();
    let headers: Vec<String> = reader.headers().unwrap().iter().map(String::from).collect();
    assert_eq!(
        headers,
        vec![
            "timestamp",
            "event_type",
            "printer_id",
            "description",
            "tray",
            "empty_since",
            "last_seen",
            "status_message",
            "printer_text",
            "note"
        ]
    );

    let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
    let kinds: Vec<&str> = rows.iter().map(|r| &r[1]).collect();
    assert_eq!(kinds, vec!["detected", "detected", "filled", "filled"]);
    assert_eq!(&rows[0][2], "10001");
    assert_eq!(&rows[0][4], "Tray 2");
    assert_eq!(&rows[0][7], "Tray 2 is empty");
    assert_eq!(&rows[2][6], "2025-03-14T10:00:00-05:00");
}

#[test]
fn test_export_with_no_events_creates_nothing() {
    let temp_dir = TempDir::new().unwrap();
    let store = StateStore::open(temp_dir.path().join("state.json"), 100);
    let output = temp_dir.path().join("history.csv");

    let err = export_history_to_path(&output, store.events()).unwrap_err();
    assert!(matches!(err, MonitorError::Export(_)));
    assert!(!output.exists());
}

#[test]
fn test_export_to_missing_directory_fails_without_touching_state() {
    let temp_dir = TempDir::new().unwrap();
    let state_path = temp_dir.path().join("state.json");
    let mut store = StateStore::open(&state_path, 100);
    store
        .reconcile(
            &build_current_empties(&parse_monitor_page(PAGE)),
            parse_timestamp("2025-03-14T09:30:00-05:00").unwrap(),
        )
        .unwrap();
    let before = fs::read_to_string(&state_path).unwrap();

    let output = temp_dir.path().join("no").join("such").join("history.csv");
    let err = export_history_to_path(&output, store.events()).unwrap_err();
    assert!(matches!(err, MonitorError::Io(_)));
    assert_eq!(fs::read_to_string(&state_path).unwrap(), before);
}
