use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::core::page::DeviceRecord;

/// An empty tray as seen in the current scan, before any timestamps
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraySnapshot {
    pub device_id: String,
    pub description: String,
    pub tray: String,
    pub status_message: String,
    pub printer_text: String,
    pub device_reported_time: String,
}

/// Current empty trays keyed by [`tray_key`]
pub type CurrentEmpties = BTreeMap<String, TraySnapshot>;

/// `"{device_id}::{tray}"`
pub fn tray_key(device_id: &str, tray: &str) -> String {
    format!("{}::{}", device_id, tray)
}

/// Flatten every empty tray of every record into the keyed current state
pub fn build_current_empties(records: &[DeviceRecord]) -> CurrentEmpties {
    records
        .iter()
        .flat_map(|record| {
            record.empty_trays.iter().map(move |tray| {
                (
                    tray_key(&record.device_id, tray),
                    TraySnapshot {
                        device_id: record.device_id.clone(),
                        description: record.description.clone(),
                        tray: tray.clone(),
                        status_message: record.status_message.clone(),
                        printer_text: record.printer_text.clone(),
                        device_reported_time: record.device_reported_time.clone(),
                    },
                )
            })
        })
        .collect()
}
