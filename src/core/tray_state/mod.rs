//! Empty-tray history.
//!
//! Each scan's empty trays are flattened into a keyed snapshot and
//! reconciled against the persisted open set, producing `detected` and
//! `filled` events in a bounded log.

mod document;
mod snapshot;
mod store;

pub use document::{
    EventType, HistoryEvent, OpenTrayEntry, StateDocument, DEFAULT_MAX_EVENTS, NOTE_DETECTED,
    NOTE_MANUAL, NOTE_NO_LONGER_EMPTY, SCHEMA_VERSION,
};
pub use snapshot::{build_current_empties, tray_key, CurrentEmpties, TraySnapshot};
pub use store::{write_atomic, ReconcileSummary, StateStore};
