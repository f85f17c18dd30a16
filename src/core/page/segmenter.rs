//! Groups normalized page lines into one record per device.

use once_cell::sync::Lazy;
use regex::Regex;

use super::normalizer::html_to_lines;
use super::record::{Channel, DeviceRecord};
use super::tail::{text_before_timestamp, LastTenNumbers, TailMetricStrategy};
use super::trays::{PhrasePatterns, TrayDetectionStrategy};

static DEVICE_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{5})\b(.*)$").expect("valid device line pattern"));
static FUSER_VALUE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)fuser:\s*(\d{1,3})%").expect("valid fuser pattern"));
static BELT_VALUE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)belt:\s*(\d{1,3})%").expect("valid belt pattern"));

/// Field lines recognized inside a device segment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldLine {
    Description,
    StatusMessage,
    PrinterText,
    Fuser,
}

impl FieldLine {
    const PREFIXES: [(&'static str, FieldLine); 4] = [
        ("description:", FieldLine::Description),
        ("status message:", FieldLine::StatusMessage),
        ("printer text:", FieldLine::PrinterText),
        ("fuser:", FieldLine::Fuser),
    ];

    fn classify(line: &str) -> Option<FieldLine> {
        let lowered = line.to_lowercase();
        Self::PREFIXES
            .iter()
            .find(|(prefix, _)| lowered.starts_with(*prefix))
            .map(|(_, field)| *field)
    }
}

/// Device page parser, parameterized over its two heuristics
#[derive(Debug, Clone, Default)]
pub struct PageParser<T = LastTenNumbers, D = PhrasePatterns> {
    tail: T,
    trays: D,
}

impl PageParser {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<T: TailMetricStrategy, D: TrayDetectionStrategy> PageParser<T, D> {
    pub fn with_strategies(tail: T, trays: D) -> Self {
        Self { tail, trays }
    }

    /// Parse a full monitor page into finalized device records
    pub fn parse_page(&self, html: &str) -> Vec<DeviceRecord> {
        self.parse_lines(html_to_lines(html))
    }

    /// Segment already normalized lines into finalized device records
    pub fn parse_lines<I>(&self, lines: I) -> Vec<DeviceRecord>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let mut records = Vec::new();
        let mut current: Option<DeviceRecord> = None;

        for line in lines {
            let line = line.as_ref();

            if let Some(caps) = DEVICE_LINE.captures(line) {
                if let Some(done) = current.take() {
                    records.push(self.finalize(done));
                }
                current = Some(self.start_record(&caps[1], caps[2].trim()));
                continue;
            }

            let Some(record) = current.as_mut() else {
                continue;
            };

            match FieldLine::classify(line) {
                Some(FieldLine::Description) => record.description = value_after_colon(line),
                Some(FieldLine::StatusMessage) => record.status_message = value_after_colon(line),
                Some(FieldLine::PrinterText) => record.printer_text = value_after_colon(line),
                Some(FieldLine::Fuser) => apply_fuser_line(record, line),
                None => {}
            }
        }

        if let Some(done) = current.take() {
            records.push(self.finalize(done));
        }

        // page chrome can contain 5-digit runs that are not device ids
        records.retain(|record| {
            !record.device_id.is_empty() && record.device_id.bytes().all(|b| b.is_ascii_digit())
        });
        records
    }

    fn start_record(&self, device_id: &str, tail: &str) -> DeviceRecord {
        let metrics = self.tail.extract(tail);
        DeviceRecord {
            device_id: device_id.to_string(),
            raw_tail_text: tail.to_string(),
            device_reported_time: metrics.reported_time,
            levels: metrics.levels,
            ..Default::default()
        }
    }

    fn finalize(&self, mut record: DeviceRecord) -> DeviceRecord {
        if record.description.is_empty() {
            let guess = text_before_timestamp(&record.raw_tail_text);
            record.description = if guess.is_empty() {
                format!("Printer {}", record.device_id)
            } else {
                guess.to_string()
            };
        }

        let combined = diagnostic_text(&record);
        record.empty_trays = self.trays.detect(&combined);
        record
    }
}

/// Status message, printer text and tail joined for tray detection,
/// skipping placeholder values
fn diagnostic_text(record: &DeviceRecord) -> String {
    [
        record.status_message.as_str(),
        record.printer_text.as_str(),
        record.raw_tail_text.as_str(),
    ]
    .into_iter()
    .filter(|value| !value.is_empty() && !is_placeholder(value))
    .collect::<Vec<_>>()
    .join(" ")
}

fn is_placeholder(value: &str) -> bool {
    value.eq_ignore_ascii_case("none") || value.eq_ignore_ascii_case("n/a")
}

fn value_after_colon(line: &str) -> String {
    line.split_once(':')
        .map(|(_, value)| value.trim().to_string())
        .unwrap_or_default()
}

fn apply_fuser_line(record: &mut DeviceRecord, line: &str) {
    for (pattern, channel) in [(&FUSER_VALUE, Channel::Fuser), (&BELT_VALUE, Channel::Belt)] {
        let value = pattern
            .captures(line)
            .and_then(|caps| caps[1].parse::<u8>().ok())
            .filter(|value| *value <= 100);
        if let Some(value) = value {
            record.levels.insert(channel, value);
        }
    }
}

/// Parse a monitor page with the default heuristics
pub fn parse_monitor_page(html: &str) -> Vec<DeviceRecord> {
    PageParser::new().parse_page(html)
}
