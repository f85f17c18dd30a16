use std::fs;
use tempfile::TempDir;
use traywatch::core::clock::parse_timestamp;
use traywatch::core::page::parse_monitor_page;
use traywatch::core::tray_state::{
    build_current_empties, EventType, StateStore, NOTE_DETECTED, NOTE_MANUAL,
    NOTE_NO_LONGER_EMPTY,
};

const PAGE: &str = include_str!("../fixtures/monitor_page.html");

fn at(time: &str) -> traywatch::core::clock::Timestamp {
    parse_timestamp(&format!("2025-03-14T{}-05:00", time)).unwrap()
}

#[test]
fn test_page_to_open_trays() {
    let dir = TempDir::new().unwrap();
    let mut store = StateStore::open(dir.path().join("state.json"), 100);

    let current = build_current_empties(&parse_monitor_page(PAGE));
    let summary = store.reconcile(&current, at("09:30:00")).unwrap();

    assert_eq!(summary.new_empties, 2);
    let keys: Vec<&str> = store.open_trays().keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["10001::Tray 2", "10003::Unknown Tray"]);
    assert!(store.events().iter().all(|e| e.note == NOTE_DETECTED));
}

#[test]
fn test_detect_persist_then_refill() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("state.json");
    let records = parse_monitor_page(PAGE);
    let current = build_current_empties(&records);

    {
        let mut store = StateStore::open(&path, 100);
        store.reconcile(&current, at("09:30:00")).unwrap();
        store.reconcile(&current, at("09:35:00")).unwrap();
    }

    // a fresh process sees the same open set with the first detection time
    let mut store = StateStore::open(&path, 100);
    let entry = &store.open_trays()["10001::Tray 2"];
    assert_eq!(entry.since, at("09:30:00"));
    assert_eq!(entry.last_seen, at("09:35:00"));
    assert_eq!(store.events().len(), 2);

    // next page: everything refilled
    let summary = store
        .reconcile(&build_current_empties(&[]), at("10:00:00"))
        .unwrap();
    assert_eq!(summary.new_filled, 2);
    assert!(store.open_trays().is_empty());

    let filled: Vec<_> = store
        .events()
        .iter()
        .filter(|e| e.event_type == EventType::Filled)
        .collect();
    assert_eq!(filled.len(), 2);
    assert!(filled.iter().all(|e| e.note == NOTE_NO_LONGER_EMPTY));
    assert!(filled.iter().all(|e| e.empty_since == Some(at("09:30:00"))));
    assert!(filled.iter().all(|e| e.last_seen == Some(at("10:00:00"))));
}

#[test]
fn test_manual_resolution_then_redetection() {
    let dir = TempDir::new().unwrap();
    let mut store = StateStore::open(dir.path().join("state.json"), 100);
    let current = build_current_empties(&parse_monitor_page(PAGE));

    store.reconcile(&current, at("09:30:00")).unwrap();
    assert!(store.mark_filled("10001::Tray 2", at("09:40:00")).unwrap());
    assert!(!store.mark_filled("10001::Tray 2", at("09:41:00")).unwrap());

    let last = store.events().back().unwrap();
    assert_eq!(last.note, NOTE_MANUAL);
    assert_eq!(last.event_type, EventType::Filled);

    // page still reports it empty: a new detection with a new since
    let summary = store.reconcile(&current, at("09:45:00")).unwrap();
    assert_eq!(summary.new_empties, 1);
    assert_eq!(store.open_trays()["10001::Tray 2"].since, at("09:45:00"));
}

#[test]
fn test_event_cap_keeps_newest() {
    let dir = TempDir::new().unwrap();
    let mut store = StateStore::open(dir.path().join("state.json"), 3);
    let current = build_current_empties(&parse_monitor_page(PAGE));
    let empty = build_current_empties(&[]);

    store.reconcile(&current, at("09:00:00")).unwrap();
    store.reconcile(&empty, at("09:05:00")).unwrap();
    store.reconcile(&current, at("09:10:00")).unwrap();

    assert_eq!(store.events().len(), 3);
    assert_eq!(store.events().back().unwrap().timestamp, at("09:10:00"));
    assert_eq!(store.events().front().unwrap().event_type, EventType::Filled);
}

#[test]
fn test_corrupt_document_starts_empty_and_is_replaced() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("state.json");
    fs::write(&path, "{\"open_empty_trays\": [").unwrap();

    let mut store = StateStore::open(&path, 100);
    assert!(store.open_trays().is_empty());

    let current = build_current_empties(&parse_monitor_page(PAGE));
    store.reconcile(&current, at("09:30:00")).unwrap();

    let written: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(written["schema_version"], 1);
    assert_eq!(written["events"].as_array().unwrap().len(), 2);
    assert!(!dir.path().join("state.json.tmp").exists());
}
