//! Persisted tray-state document.
//!
//! The on-disk JSON keeps the field names older installs wrote
//! (`open_empty_trays`, `printer_id`, `device_last_update`, `empty_since`)
//! and adds a `schema_version`. Documents without one are the legacy
//! layout and are migrated on load.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};
use std::fmt;

use super::snapshot::TraySnapshot;
use crate::core::clock::{self, Timestamp};
use crate::error::{MonitorError, Result};

pub const SCHEMA_VERSION: u32 = 1;
pub const DEFAULT_MAX_EVENTS: usize = 20_000;

pub const NOTE_DETECTED: &str = "detected by monitor";
pub const NOTE_NO_LONGER_EMPTY: &str = "no longer reported empty";
pub const NOTE_MANUAL: &str = "manually marked filled";

/// A tray currently believed empty
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenTrayEntry {
    #[serde(rename = "printer_id")]
    pub device_id: String,
    #[serde(default)]
    pub description: String,
    pub tray: String,
    #[serde(default)]
    pub status_message: String,
    #[serde(default)]
    pub printer_text: String,
    #[serde(rename = "device_last_update", default)]
    pub device_reported_time: String,
    /// First detection; unchanged while the key stays open
    pub since: Timestamp,
    pub last_seen: Timestamp,
}

impl OpenTrayEntry {
    pub fn from_snapshot(snapshot: &TraySnapshot, since: Timestamp, last_seen: Timestamp) -> Self {
        Self {
            device_id: snapshot.device_id.clone(),
            description: snapshot.description.clone(),
            tray: snapshot.tray.clone(),
            status_message: snapshot.status_message.clone(),
            printer_text: snapshot.printer_text.clone(),
            device_reported_time: snapshot.device_reported_time.clone(),
            since,
            last_seen,
        }
    }

    pub fn key(&self) -> String {
        super::snapshot::tray_key(&self.device_id, &self.tray)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    /// Legacy documents wrote `"empty"`
    #[serde(alias = "empty")]
    Detected,
    Filled,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Detected => "detected",
            EventType::Filled => "filled",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One detected/filled transition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEvent {
    pub timestamp: Timestamp,
    pub event_type: EventType,
    #[serde(rename = "printer_id")]
    pub device_id: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tray: String,
    #[serde(default, with = "clock::optional")]
    pub empty_since: Option<Timestamp>,
    #[serde(default, with = "clock::optional")]
    pub last_seen: Option<Timestamp>,
    #[serde(default)]
    pub status_message: String,
    #[serde(default)]
    pub printer_text: String,
    #[serde(default)]
    pub note: String,
}

impl HistoryEvent {
    /// Snapshot of an entry's identifying fields at event time
    pub fn for_entry(
        timestamp: Timestamp,
        event_type: EventType,
        entry: &OpenTrayEntry,
        note: &str,
    ) -> Self {
        Self {
            timestamp,
            event_type,
            device_id: entry.device_id.clone(),
            description: entry.description.clone(),
            tray: entry.tray.clone(),
            empty_since: Some(entry.since),
            last_seen: Some(entry.last_seen),
            status_message: entry.status_message.clone(),
            printer_text: entry.printer_text.clone(),
            note: note.to_string(),
        }
    }
}

/// The whole persisted state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateDocument {
    /// 0 when the field is missing (legacy layout)
    #[serde(default)]
    pub schema_version: u32,
    #[serde(rename = "open_empty_trays", default)]
    pub open_trays: BTreeMap<String, OpenTrayEntry>,
    /// Oldest first
    #[serde(default)]
    pub events: VecDeque<HistoryEvent>,
    #[serde(default, with = "clock::optional")]
    pub last_scan_at: Option<Timestamp>,
}

impl Default for StateDocument {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            open_trays: BTreeMap::new(),
            events: VecDeque::new(),
            last_scan_at: None,
        }
    }
}

impl StateDocument {
    /// Parse and migrate a stored document
    pub fn from_json(content: &str) -> Result<Self> {
        let mut doc: StateDocument = serde_json::from_str(content)?;
        match doc.schema_version {
            0 => {
                log::info!("Migrating legacy tray state document to schema {}", SCHEMA_VERSION);
                doc.migrate_legacy();
            }
            SCHEMA_VERSION => {}
            other => {
                return Err(MonitorError::config(format!(
                    "Unsupported state schema version {} (expected {})",
                    other, SCHEMA_VERSION
                )))
            }
        }
        Ok(doc)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    fn migrate_legacy(&mut self) {
        // legacy entries were keyed the same way but could carry stale keys
        self.open_trays = std::mem::take(&mut self.open_trays)
            .into_values()
            .map(|entry| (entry.key(), entry))
            .collect();
        self.schema_version = SCHEMA_VERSION;
    }

    /// Append an event, then drop the oldest beyond `capacity`
    pub fn push_event(&mut self, event: HistoryEvent, capacity: usize) {
        self.events.push_back(event);
        self.trim_events(capacity);
    }

    pub fn trim_events(&mut self, capacity: usize) {
        let capacity = capacity.max(1);
        while self.events.len() > capacity {
            self.events.pop_front();
        }
    }

    /// Open entries ordered by device then tray
    pub fn sorted_open_trays(&self) -> Vec<&OpenTrayEntry> {
        let mut entries: Vec<&OpenTrayEntry> = self.open_trays.values().collect();
        entries.sort_by(|a, b| {
            a.device_id
                .cmp(&b.device_id)
                .then_with(|| a.tray.cmp(&b.tray))
        });
        entries
    }
}
