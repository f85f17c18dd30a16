// UI and formatting module

pub mod formatters;
pub mod prompts;

// Re-export commonly used items for cleaner imports
pub use formatters::{
    format_level, format_scan_report, print_alerts, print_events,
    print_open_trays, print_printers, truncate,
};
pub use prompts::{dimmed, error, info, read_confirmation, success, warn};
