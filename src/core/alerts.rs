//! Low-supply alerts.
//!
//! Evaluates parsed device records against configurable thresholds and
//! status-text keywords, producing a de-duplicated, ordered alert list.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::page::{Channel, DeviceRecord};

pub const DEFAULT_TONER_THRESHOLD: u8 = 15;
pub const DEFAULT_FUSER_THRESHOLD: u8 = 20;

/// Level string used for keyword alerts
pub const REPORTED_LEVEL: &str = "reported";

/// Alert configuration with thresholds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertConfig {
    pub toner_threshold: u8, // Alert at or below (%)
    pub fuser_threshold: u8, // Alert at or below (%)
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            toner_threshold: DEFAULT_TONER_THRESHOLD,
            fuser_threshold: DEFAULT_FUSER_THRESHOLD,
        }
    }
}

impl AlertConfig {
    /// Thresholds clamped to 1..=100
    pub fn new(toner_threshold: u8, fuser_threshold: u8) -> Self {
        Self {
            toner_threshold: toner_threshold.clamp(1, 100),
            fuser_threshold: fuser_threshold.clamp(1, 100),
        }
    }
}

/// A single low-supply alert
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LowAlert {
    pub device_id: String,
    pub description: String,
    pub item: String,
    pub level: String,
    pub source: String,
}

/// Why an alert was raised; part of the de-duplication key
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum AlertSource {
    Level,
    Keyword(&'static str),
}

struct KeywordRule {
    pattern: Regex,
    item: &'static str,
    reason: &'static str,
}

static KEYWORD_RULES: Lazy<Vec<KeywordRule>> = Lazy::new(|| {
    [
        (r"\blow\s+toner\b", "Toner", "status message reports low toner"),
        (r"\blow\s+ink\b", "Ink", "status message reports low ink"),
        (r"\blow\s+fuser\b", "Fuser", "status message reports low fuser"),
    ]
    .into_iter()
    .map(|(pattern, item, reason)| KeywordRule {
        pattern: Regex::new(pattern).expect("valid keyword pattern"),
        item,
        reason,
    })
    .collect()
});

const TONER_CHANNELS: [(Channel, &str); 4] = [
    (Channel::TonerK, "Black"),
    (Channel::TonerC, "Cyan"),
    (Channel::TonerM, "Magenta"),
    (Channel::TonerY, "Yellow"),
];

/// Cyan, magenta and yellow all reported and all exactly zero: a mono
/// device, not a colour shortage
pub fn is_mono_like(record: &DeviceRecord) -> bool {
    [Channel::TonerC, Channel::TonerM, Channel::TonerY]
        .iter()
        .all(|channel| record.level(*channel) == Some(0))
}

/// Evaluate device records and generate alerts, sorted by device then item
pub fn evaluate_alerts(records: &[DeviceRecord], config: &AlertConfig) -> Vec<LowAlert> {
    let mut alerts = Vec::new();
    let mut seen: HashSet<(String, String, AlertSource)> = HashSet::new();

    let mut push = |record: &DeviceRecord, item: String, level: String, source: String, kind: AlertSource| {
        if seen.insert((record.device_id.clone(), item.clone(), kind)) {
            alerts.push(LowAlert {
                device_id: record.device_id.clone(),
                description: record.description.clone(),
                item,
                level,
                source,
            });
        }
    };

    for record in records {
        let mono_like = is_mono_like(record);

        // Toner alerts
        for (channel, color) in TONER_CHANNELS {
            if mono_like && channel != Channel::TonerK {
                continue;
            }
            if let Some(level) = record.level(channel) {
                if level <= config.toner_threshold {
                    push(
                        record,
                        format!("{} Toner", color),
                        format!("{}%", level),
                        format!("threshold <= {}%", config.toner_threshold),
                        AlertSource::Level,
                    );
                }
            }
        }

        // Fuser alert
        if let Some(level) = record.level(Channel::Fuser) {
            if level <= config.fuser_threshold {
                push(
                    record,
                    "Fuser".to_string(),
                    format!("{}%", level),
                    format!("threshold <= {}%", config.fuser_threshold),
                    AlertSource::Level,
                );
            }
        }

        // Keyword alerts
        let status_blob = format!("{} {}", record.status_message, record.printer_text).to_lowercase();
        for rule in KEYWORD_RULES.iter() {
            if rule.pattern.is_match(&status_blob) {
                push(
                    record,
                    rule.item.to_string(),
                    REPORTED_LEVEL.to_string(),
                    rule.reason.to_string(),
                    AlertSource::Keyword(rule.reason),
                );
            }
        }
    }

    // stable: a threshold alert stays ahead of a keyword alert for the same item
    alerts.sort_by(|a, b| {
        a.device_id
            .cmp(&b.device_id)
            .then_with(|| a.item.cmp(&b.item))
    });
    alerts
}
