//! Durable open/filled tray tracking.
//!
//! `StateStore` owns the persisted document. Every mutation takes an
//! exclusive lock on a sibling `<name>.lock` file, reloads the document,
//! builds the next one, writes it through a uniquely named temporary file
//! in the same directory and renames it over the target, and only then
//! replaces the in-memory copy. A failed write leaves disk at the previous
//! state and memory at what was last read from disk.
//!
//! The lock is advisory and spans processes, so a `resolve` run from a
//! shell cannot interleave with a background scan.

use serde::Serialize;
use std::collections::{BTreeMap, VecDeque};
use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

use super::document::{
    EventType, HistoryEvent, OpenTrayEntry, StateDocument, NOTE_DETECTED, NOTE_MANUAL,
    NOTE_NO_LONGER_EMPTY,
};
use super::snapshot::CurrentEmpties;
use crate::core::clock::Timestamp;
use crate::error::Result;

/// Change counts from one reconciliation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileSummary {
    pub new_empties: usize,
    pub new_filled: usize,
}

pub struct StateStore {
    path: PathBuf,
    max_events: usize,
    data: StateDocument,
}

impl StateStore {
    /// Open the store at `path`. Never fails: a missing or unreadable
    /// document starts empty.
    pub fn open(path: impl Into<PathBuf>, max_events: usize) -> Self {
        let mut store = Self {
            path: path.into(),
            max_events: max_events.max(1),
            data: StateDocument::default(),
        };
        store.load();
        store
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn max_events(&self) -> usize {
        self.max_events
    }

    /// Sibling file holding the cross-process update lock
    pub fn lock_path(&self) -> PathBuf {
        sibling_path(&self.path, ".lock")
    }

    /// Re-read the document from disk, resetting to the empty default if
    /// it is missing or cannot be parsed
    pub fn load(&mut self) {
        self.data = match fs::read_to_string(&self.path) {
            Ok(content) => StateDocument::from_json(&content).unwrap_or_else(|e| {
                log::warn!(
                    "Tray state at {} is unreadable ({}); starting from empty state",
                    self.path.display(),
                    e
                );
                StateDocument::default()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => StateDocument::default(),
            Err(e) => {
                log::warn!(
                    "Could not read tray state at {} ({}); starting from empty state",
                    self.path.display(),
                    e
                );
                StateDocument::default()
            }
        };
    }

    pub fn document(&self) -> &StateDocument {
        &self.data
    }

    pub fn open_trays(&self) -> &BTreeMap<String, OpenTrayEntry> {
        &self.data.open_trays
    }

    pub fn events(&self) -> &VecDeque<HistoryEvent> {
        &self.data.events
    }

    pub fn last_scan(&self) -> Option<Timestamp> {
        self.data.last_scan_at
    }

    /// Diff the current empties against the open set, record transitions
    /// and persist. The open set is the one on disk at the time of the
    /// call, not whatever this handle read earlier.
    pub fn reconcile(
        &mut self,
        current: &CurrentEmpties,
        scan_time: Timestamp,
    ) -> Result<ReconcileSummary> {
        let _lock = StateLock::acquire(&self.lock_path())?;
        self.load();

        let mut next = self.data.clone();
        let previous = std::mem::take(&mut next.open_trays);
        let mut summary = ReconcileSummary::default();

        for (key, snapshot) in current {
            match previous.get(key) {
                None => {
                    let entry = OpenTrayEntry::from_snapshot(snapshot, scan_time, scan_time);
                    next.events.push_back(HistoryEvent::for_entry(
                        scan_time,
                        EventType::Detected,
                        &entry,
                        NOTE_DETECTED,
                    ));
                    next.open_trays.insert(key.clone(), entry);
                    summary.new_empties += 1;
                }
                Some(prior) => {
                    let entry = OpenTrayEntry::from_snapshot(snapshot, prior.since, scan_time);
                    next.open_trays.insert(key.clone(), entry);
                }
            }
        }

        for (key, prior) in &previous {
            if !current.contains_key(key) {
                let mut resolved = prior.clone();
                resolved.last_seen = scan_time;
                next.events.push_back(HistoryEvent::for_entry(
                    scan_time,
                    EventType::Filled,
                    &resolved,
                    NOTE_NO_LONGER_EMPTY,
                ));
                summary.new_filled += 1;
            }
        }

        next.last_scan_at = Some(scan_time);
        next.trim_events(self.max_events);
        self.commit(next)?;

        log::info!(
            "Reconciled {} empty tray(s): {} new, {} filled",
            current.len(),
            summary.new_empties,
            summary.new_filled
        );
        Ok(summary)
    }

    /// Manually close an open tray. Returns `false` when the key is not
    /// open, in which case nothing is written.
    pub fn mark_filled(&mut self, key: &str, timestamp: Timestamp) -> Result<bool> {
        let _lock = StateLock::acquire(&self.lock_path())?;
        self.load();

        let mut next = self.data.clone();
        let Some(mut entry) = next.open_trays.remove(key) else {
            log::info!("Tray {} already resolved", key);
            return Ok(false);
        };

        entry.last_seen = timestamp;
        next.push_event(
            HistoryEvent::for_entry(timestamp, EventType::Filled, &entry, NOTE_MANUAL),
            self.max_events,
        );
        next.last_scan_at = Some(timestamp);
        self.commit(next)?;

        log::info!("Tray {} manually marked filled", key);
        Ok(true)
    }

    fn commit(&mut self, next: StateDocument) -> Result<()> {
        write_atomic(&self.path, next.to_json()?.as_bytes())?;
        self.data = next;
        Ok(())
    }
}

/// Exclusive advisory lock, released when dropped
struct StateLock {
    _file: File,
}

impl StateLock {
    fn acquire(lock_path: &Path) -> Result<Self> {
        ensure_parent_dir(lock_path)?;
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(lock_path)?;
        file.lock()?;
        log::debug!("Locked {}", lock_path.display());
        Ok(Self { _file: file })
    }
}

fn sibling_path(path: &Path, suffix: &str) -> PathBuf {
    let mut name: OsString = path
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_else(|| "state".into());
    name.push(suffix);
    path.with_file_name(name)
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

/// Write `bytes` to a uniquely named temporary file next to `path`, flush
/// it to disk, then rename it over `path`. Concurrent writers never share
/// a temporary file; the last rename wins.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    ensure_parent_dir(path)?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    // on failure the temporary file is removed when the error drops it
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
