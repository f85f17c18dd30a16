//! Scan orchestration.
//!
//! A scan (fetch, parse, alert, reconcile) runs on a short-lived worker
//! thread and hands a finished [`ScanReport`] back over a channel. At most
//! one scan is in flight per [`Monitor`]. The state store is shared between
//! the scan path and manual resolution behind one mutex.

use chrono::{DateTime, Local, TimeDelta};
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::thread;

use super::alerts::{evaluate_alerts, AlertConfig, LowAlert};
use super::clock::{self, Timestamp};
use super::fetch::PageSource;
use super::page::{DeviceRecord, PageParser};
use super::tray_state::{build_current_empties, OpenTrayEntry, ReconcileSummary, StateStore};
use crate::error::{MonitorError, Result};

/// State store shared by every call site that mutates it
pub type SharedStore = Arc<Mutex<StateStore>>;

/// Inputs for one scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanRequest {
    pub url: String,
    pub alerts: AlertConfig,
}

/// Everything a scan produced, handed back to the foreground
#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    pub scan_time: Timestamp,
    pub records: Vec<DeviceRecord>,
    pub low_alerts: Vec<LowAlert>,
    pub open_trays: BTreeMap<String, OpenTrayEntry>,
    pub event_count: usize,
    pub changes: ReconcileSummary,
}

/// Clears the in-flight flag when dropped, including on panic or error
struct InFlightGuard {
    flag: Arc<AtomicBool>,
}

impl InFlightGuard {
    fn acquire(flag: &Arc<AtomicBool>) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag: flag.clone() })
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

pub struct Monitor<S: PageSource + 'static> {
    source: Arc<S>,
    store: SharedStore,
    in_flight: Arc<AtomicBool>,
}

impl<S: PageSource + 'static> Clone for Monitor<S> {
    fn clone(&self) -> Self {
        Self {
            source: self.source.clone(),
            store: self.store.clone(),
            in_flight: self.in_flight.clone(),
        }
    }
}

impl<S: PageSource + 'static> Monitor<S> {
    pub fn new(source: S, store: StateStore) -> Self {
        Self {
            source: Arc::new(source),
            store: Arc::new(Mutex::new(store)),
            in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn store(&self) -> SharedStore {
        self.store.clone()
    }

    pub fn is_scanning(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Run a scan on the calling thread
    pub fn scan_now(&self, request: &ScanRequest) -> Result<ScanReport> {
        let _guard = InFlightGuard::acquire(&self.in_flight).ok_or(MonitorError::ScanInProgress)?;
        run_scan(self.source.as_ref(), &self.store, request)
    }

    /// Start a scan on a worker thread; the result is sent on `results`.
    ///
    /// Returns `false` without doing anything when a scan is already running.
    pub fn spawn_scan(&self, request: ScanRequest, results: Sender<Result<ScanReport>>) -> bool {
        let Some(guard) = InFlightGuard::acquire(&self.in_flight) else {
            log::debug!("Scan requested while another is in flight; ignoring");
            return false;
        };

        let source = self.source.clone();
        let store = self.store.clone();
        let spawned = thread::Builder::new()
            .name("scan-worker".into())
            .spawn(move || {
                let outcome = run_scan(source.as_ref(), &store, &request);
                // report first: once the flag clears, a caller that sees no
                // scan running must also find the result already queued
                let _ = results.send(outcome);
                drop(guard);
            });

        match spawned {
            Ok(_) => true,
            Err(e) => {
                log::error!("Failed to start scan worker: {}", e);
                false
            }
        }
    }

    /// Manually close an open tray. `Ok(false)` means it was already resolved.
    pub fn mark_filled(&self, key: &str) -> Result<bool> {
        self.store.lock().mark_filled(key, clock::now())
    }

    /// Open trays as currently persisted
    pub fn open_trays(&self) -> BTreeMap<String, OpenTrayEntry> {
        self.store.lock().open_trays().clone()
    }
}

fn run_scan<S: PageSource + ?Sized>(
    source: &S,
    store: &SharedStore,
    request: &ScanRequest,
) -> Result<ScanReport> {
    log::info!("Scanning {}", request.url);

    let html = source.fetch(&request.url)?;
    let records = PageParser::new().parse_page(&html);
    if records.is_empty() {
        log::warn!("No printer rows parsed from {}", request.url);
        return Err(MonitorError::EmptyExtraction);
    }

    let low_alerts = evaluate_alerts(&records, &request.alerts);
    let current = build_current_empties(&records);
    let scan_time = clock::now();

    let (changes, open_trays, event_count) = {
        let mut store = store.lock();
        let changes = store.reconcile(&current, scan_time)?;
        (changes, store.open_trays().clone(), store.events().len())
    };

    log::info!(
        "Scan complete: {} printer(s), {} alert(s), {} open tray(s)",
        records.len(),
        low_alerts.len(),
        open_trays.len()
    );

    Ok(ScanReport {
        scan_time,
        records,
        low_alerts,
        open_trays,
        event_count,
        changes,
    })
}

/// Wall-clock due-time tracking for automatic scans
#[derive(Debug, Clone)]
pub struct Scheduler {
    interval_minutes: u32,
    next_due: Option<DateTime<Local>>,
}

impl Scheduler {
    pub fn new(interval_minutes: u32) -> Self {
        Self {
            interval_minutes: interval_minutes.max(1),
            next_due: None,
        }
    }

    pub fn interval_minutes(&self) -> u32 {
        self.interval_minutes
    }

    /// Takes effect at the next [`Scheduler::schedule_next`]
    pub fn set_interval_minutes(&mut self, minutes: u32) {
        self.interval_minutes = minutes.max(1);
    }

    pub fn next_due(&self) -> Option<DateTime<Local>> {
        self.next_due
    }

    /// Due when never scheduled or the due instant has passed
    pub fn is_due(&self, now: DateTime<Local>) -> bool {
        self.next_due.map_or(true, |due| now >= due)
    }

    /// Called after every finished scan, successful or not
    pub fn schedule_next(&mut self, now: DateTime<Local>) {
        self.next_due = Some(now + TimeDelta::minutes(i64::from(self.interval_minutes)));
    }
}
