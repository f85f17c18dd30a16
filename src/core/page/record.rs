use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Supply channels reported on the monitor page.
///
/// Variant order is the order in which the last ten numbers of a device's
/// tail text are assigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    TonerK,
    TonerC,
    TonerM,
    TonerY,
    DrumK,
    DrumC,
    DrumM,
    DrumY,
    Belt,
    Fuser,
}

impl Channel {
    /// All channels in tail assignment order
    pub const TAIL_ORDER: [Channel; 10] = [
        Channel::TonerK,
        Channel::TonerC,
        Channel::TonerM,
        Channel::TonerY,
        Channel::DrumK,
        Channel::DrumC,
        Channel::DrumM,
        Channel::DrumY,
        Channel::Belt,
        Channel::Fuser,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::TonerK => "toner_k",
            Channel::TonerC => "toner_c",
            Channel::TonerM => "toner_m",
            Channel::TonerY => "toner_y",
            Channel::DrumK => "drum_k",
            Channel::DrumC => "drum_c",
            Channel::DrumM => "drum_m",
            Channel::DrumY => "drum_y",
            Channel::Belt => "belt",
            Channel::Fuser => "fuser",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Percentage levels keyed by channel. Any subset may be present.
pub type Levels = BTreeMap<Channel, u8>;

/// One printer's parsed attributes for a single scan
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeviceRecord {
    pub device_id: String,
    pub description: String,
    pub status_message: String,
    pub printer_text: String,
    pub raw_tail_text: String,
    /// Timestamp exactly as printed on the page, never parsed
    pub device_reported_time: String,
    pub levels: Levels,
    pub empty_trays: Vec<String>,
}

impl DeviceRecord {
    pub fn new(device_id: impl Into<String>) -> Self {
        Self {
            device_id: device_id.into(),
            ..Default::default()
        }
    }

    pub fn level(&self, channel: Channel) -> Option<u8> {
        self.levels.get(&channel).copied()
    }
}
