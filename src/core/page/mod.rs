//! Monitor page extraction.
//!
//! Raw markup is reduced to text lines, segmented into one record per
//! device, and each record's tail text and diagnostic fields are run
//! through the level and tray heuristics.

mod normalizer;
mod record;
mod segmenter;
mod tail;
mod trays;

pub use normalizer::{decode_entities, html_to_lines, Lines};
pub use record::{Channel, DeviceRecord, Levels};
pub use segmenter::{parse_monitor_page, PageParser};
pub use tail::{parse_tail_metrics, text_before_timestamp, LastTenNumbers, TailMetricStrategy, TailMetrics};
pub use trays::{
    detect_empty_trays, normalize_tray, PhrasePatterns, TrayDetectionStrategy, UNKNOWN_TRAY,
};
