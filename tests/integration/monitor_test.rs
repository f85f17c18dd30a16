use chrono::{Local, TimeDelta};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::time::{Duration, Instant};
use tempfile::TempDir;
use traywatch::core::alerts::AlertConfig;
use traywatch::core::fetch::PageSource;
use traywatch::core::monitor::{Monitor, ScanRequest, Scheduler};
use traywatch::core::tray_state::StateStore;
use traywatch::{MonitorError, Result};

const PAGE: &str = include_str!("../fixtures/monitor_page.html");
const REFILLED: &str = "<table><tr><td>10001 Lobby 03/14/25 10:26:53 5 0 0 0 80 0 0 0 90 50</td></tr>\
                        <tr><td>10003 Annex Copier</td></tr></table>";

/// Serves each page once, then keeps returning the last one
struct ScriptedPages {
    pages: Vec<&'static str>,
    served: AtomicUsize,
}

impl ScriptedPages {
    fn new(pages: Vec<&'static str>) -> Self {
        Self {
            pages,
            served: AtomicUsize::new(0),
        }
    }
}

impl PageSource for ScriptedPages {
    fn fetch(&self, _url: &str) -> Result<String> {
        let index = self.served.fetch_add(1, Ordering::SeqCst);
        let page = self
            .pages
            .get(index)
            .or_else(|| self.pages.last())
            .ok_or_else(|| MonitorError::transport("no pages scripted"))?;
        Ok(page.to_string())
    }
}

fn wait_until_idle<S: PageSource>(monitor: &Monitor<S>) {
    let deadline = Instant::now() + Duration::from_secs(10);
    while monitor.is_scanning() {
        assert!(Instant::now() < deadline, "scan never finished");
        std::thread::sleep(Duration::from_millis(10));
    }
}

fn request() -> ScanRequest {
    ScanRequest {
        url: "http://printmonitor.local/status".to_string(),
        alerts: AlertConfig::default(),
    }
}

#[test]
fn test_background_scans_track_trays() {
    let temp_dir = TempDir::new().unwrap();
    let store = StateStore::open(temp_dir.path().join("state.json"), 100);
    let monitor = Monitor::new(ScriptedPages::new(vec![PAGE, REFILLED]), store);
    let (tx, rx) = mpsc::channel();

    assert!(monitor.spawn_scan(request(), tx.clone()));
    let first = rx.recv_timeout(Duration::from_secs(10)).unwrap().unwrap();
    assert_eq!(first.records.len(), 3);
    assert_eq!(first.low_alerts.len(), 5);
    assert_eq!(first.changes.new_empties, 2);

    // the worker clears its busy flag just after reporting
    wait_until_idle(&monitor);
    assert!(monitor.spawn_scan(request(), tx));
    let second = rx.recv_timeout(Duration::from_secs(10)).unwrap().unwrap();
    assert_eq!(second.changes.new_filled, 2);
    assert!(second.open_trays.is_empty());
    assert_eq!(second.event_count, 4);
}

#[test]
fn test_state_survives_between_monitors() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("state.json");

    let monitor = Monitor::new(ScriptedPages::new(vec![PAGE]), StateStore::open(&path, 100));
    monitor.scan_now(&request()).unwrap();
    drop(monitor);

    let monitor = Monitor::new(ScriptedPages::new(vec![PAGE]), StateStore::open(&path, 100));
    assert_eq!(monitor.open_trays().len(), 2);
    let report = monitor.scan_now(&request()).unwrap();
    assert_eq!(report.changes.new_empties, 0);
    assert_eq!(report.event_count, 2);
}

#[test]
fn test_failed_scan_still_schedules_next() {
    let temp_dir = TempDir::new().unwrap();
    let monitor = Monitor::new(
        ScriptedPages::new(vec!["<p>maintenance</p>"]),
        StateStore::open(temp_dir.path().join("state.json"), 100),
    );
    let mut scheduler = Scheduler::new(5);
    let now = Local::now();

    assert!(scheduler.is_due(now));
    let err = monitor.scan_now(&request()).unwrap_err();
    assert!(err.is_scan_failure());
    scheduler.schedule_next(now);

    assert!(!scheduler.is_due(now + TimeDelta::minutes(1)));
    assert!(scheduler.is_due(now + TimeDelta::minutes(5)));
    assert!(monitor.open_trays().is_empty());
}
