//! Periodic scanning until interrupted.
//!
//! The foreground loop ticks once a second. When the scheduler says a scan
//! is due and none is running, one is started on a worker thread; its
//! report comes back over a channel and the next due time is computed
//! from the moment it finished.

use anyhow::Result;
use chrono::Local;
use clap::ArgMatches;
use colored::Colorize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, TryRecvError};
use std::sync::Arc;
use std::time::Duration;

use super::Settings;
use crate::core::{Config, HttpFetcher, Monitor, ScanReport, Scheduler};
use crate::error::MonitorError;
use crate::ui::{dimmed, error, format_scan_report, info, warn};

const TICK: Duration = Duration::from_secs(1);
const SHUTDOWN_WAIT: Duration = Duration::from_secs(60);

pub fn execute(matches: &ArgMatches) -> Result<()> {
    let settings = Settings::resolve(matches)?;
    let request = settings.scan_request()?;
    let monitor = settings.monitor()?;
    let interval_pinned = matches.try_get_one::<u32>("interval").ok().flatten().is_some();

    let running = Arc::new(AtomicBool::new(true));
    let running_clone = running.clone();
    ctrlc::set_handler(move || {
        println!();
        println!("{}", "Stopping watch...".yellow().bold());
        running_clone.store(false, Ordering::Relaxed);
    })
    .map_err(|e| anyhow::anyhow!("Failed to set Ctrl+C handler: {}", e))?;

    let mut scheduler = Scheduler::new(settings.interval_minutes);
    let (tx, rx) = mpsc::channel();

    println!(
        "{} {} {}",
        "Watching".cyan().bold(),
        request.url.white(),
        format!("every {} minute(s)", scheduler.interval_minutes()).dimmed()
    );
    dimmed("Press Ctrl+C to stop");

    while running.load(Ordering::Relaxed) {
        let now = Local::now();
        if !monitor.is_scanning() && scheduler.is_due(now) {
            if !monitor.spawn_scan(request.clone(), tx.clone()) {
                // worker could not be started; try again next interval
                scheduler.schedule_next(now);
                continue;
            }
            info(&format!("Scanning {} ...", request.url));
        }

        match rx.recv_timeout(TICK) {
            Ok(outcome) => {
                show_outcome(outcome, &settings);

                if !interval_pinned {
                    refresh_interval(&mut scheduler);
                }
                scheduler.schedule_next(Local::now());
                if let Some(due) = scheduler.next_due() {
                    dimmed(&format!("Next scan at {}", due.format("%H:%M:%S")));
                }
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    wait_for_in_flight(&monitor, &rx, &settings);
    Ok(())
}

fn show_outcome(outcome: crate::Result<ScanReport>, settings: &Settings) {
    match outcome {
        Ok(report) => {
            format_scan_report(
                &report,
                settings.alerts.toner_threshold,
                settings.alerts.fuser_threshold,
            );
            if report.changes.new_empties > 0 {
                warn(&format!(
                    "{} tray(s) newly reported empty",
                    report.changes.new_empties
                ));
            }
        }
        Err(e @ MonitorError::EmptyExtraction) => {
            error(&format!("Scan failed: {}", e));
        }
        Err(e) => {
            log::error!("Scan failed: {}", e);
            error(&format!("Scan failed: {}", e));
        }
    }
}

/// Pick up an interval changed with `traywatch set interval` while watching
fn refresh_interval(scheduler: &mut Scheduler) {
    match Config::load() {
        Ok(config) if config.interval_minutes != scheduler.interval_minutes() => {
            log::info!("Scan interval changed to {} minute(s)", config.interval_minutes);
            scheduler.set_interval_minutes(config.interval_minutes);
        }
        Ok(_) => {}
        Err(e) => log::warn!("Could not reload config: {}", e),
    }
}

fn wait_for_in_flight(
    monitor: &Monitor<HttpFetcher>,
    rx: &Receiver<crate::Result<ScanReport>>,
    settings: &Settings,
) {
    if monitor.is_scanning() {
        dimmed("Waiting for the running scan to finish...");
    }
    match final_outcome(rx, || monitor.is_scanning(), SHUTDOWN_WAIT) {
        FinalOutcome::Received(outcome) => show_outcome(outcome, settings),
        FinalOutcome::Idle => {}
        FinalOutcome::TimedOut => warn("Scan did not finish in time; exiting anyway"),
    }
}

#[derive(Debug, PartialEq)]
enum FinalOutcome<T> {
    Received(T),
    Idle,
    TimedOut,
}

/// Collect a result that is already queued, or wait up to `wait` for the
/// scan that is still running
fn final_outcome<T>(
    rx: &Receiver<T>,
    scanning: impl Fn() -> bool,
    wait: Duration,
) -> FinalOutcome<T> {
    match rx.try_recv() {
        Ok(outcome) => return FinalOutcome::Received(outcome),
        Err(TryRecvError::Disconnected) => return FinalOutcome::Idle,
        Err(TryRecvError::Empty) => {}
    }
    if !scanning() {
        return FinalOutcome::Idle;
    }
    match rx.recv_timeout(wait) {
        Ok(outcome) => FinalOutcome::Received(outcome),
        Err(RecvTimeoutError::Disconnected) => FinalOutcome::Idle,
        Err(RecvTimeoutError::Timeout) => FinalOutcome::TimedOut,
    }
}
