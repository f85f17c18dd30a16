// Core monitoring logic

pub mod alerts;
pub mod clock;
pub mod config;
pub mod export;
pub mod fetch;
pub mod monitor;
pub mod page;
pub mod tray_state;
pub mod worknote;

// Re-export commonly used items
pub use alerts::{evaluate_alerts, AlertConfig, LowAlert};
pub use config::Config;
pub use fetch::{HttpFetcher, PageSource};
pub use monitor::{Monitor, ScanReport, ScanRequest, Scheduler};
pub use page::{parse_monitor_page, DeviceRecord};
pub use tray_state::{OpenTrayEntry, StateStore};
pub use worknote::{build_work_note, WorkNoteMode};
