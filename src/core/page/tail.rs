//! Timestamp and supply-level extraction from a device's first line.

use once_cell::sync::Lazy;
use regex::Regex;

use super::record::{Channel, Levels};

/// `DD/DD/DD HH:MM:SS`, two-digit groups, no calendar validation
pub(crate) static TIMESTAMP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(\d{2}/\d{2}/\d{2}\s+\d{2}:\d{2}:\d{2})\b").expect("valid timestamp pattern")
});
static SMALL_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\d{1,3})\b").expect("valid number pattern"));

/// What a tail strategy recovered from one line
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TailMetrics {
    pub levels: Levels,
    pub reported_time: String,
}

/// Heuristic that turns a device's tail text into levels and a timestamp
pub trait TailMetricStrategy {
    fn extract(&self, tail: &str) -> TailMetrics;
}

/// Takes the last ten small integers as the ten supply channels.
///
/// Yields no levels at all when fewer than ten numbers are present or any
/// of the last ten is above 100.
#[derive(Debug, Clone, Copy, Default)]
pub struct LastTenNumbers;

impl TailMetricStrategy for LastTenNumbers {
    fn extract(&self, tail: &str) -> TailMetrics {
        let reported_time = TIMESTAMP
            .captures(tail)
            .map(|caps| caps[1].to_string())
            .unwrap_or_default();

        let numbers: Vec<u32> = SMALL_NUMBER
            .captures_iter(tail)
            .filter_map(|caps| caps[1].parse().ok())
            .collect();

        let mut levels = Levels::new();
        if numbers.len() >= Channel::TAIL_ORDER.len() {
            let candidate = &numbers[numbers.len() - Channel::TAIL_ORDER.len()..];
            if candidate.iter().all(|&value| value <= 100) {
                for (channel, &value) in Channel::TAIL_ORDER.iter().zip(candidate) {
                    levels.insert(*channel, value as u8);
                }
            }
        }

        TailMetrics {
            levels,
            reported_time,
        }
    }
}

/// Convenience wrapper over the default strategy
pub fn parse_tail_metrics(tail: &str) -> TailMetrics {
    LastTenNumbers.extract(tail)
}

/// Portion of the tail before the first timestamp, trimmed
pub fn text_before_timestamp(tail: &str) -> &str {
    match TIMESTAMP.find(tail) {
        Some(m) => tail[..m.start()].trim(),
        None => tail.trim(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GOLDEN_TAIL: &str =
        "Library 2nd Floor 03/14/25 09:26:53 Online 45 0 0 0 88 0 0 0 97 61";

    #[test]
    fn test_golden_tail_assigns_channels_in_order() {
        let metrics = parse_tail_metrics(GOLDEN_TAIL);
        assert_eq!(metrics.reported_time, "03/14/25 09:26:53");

        let expected = [45, 0, 0, 0, 88, 0, 0, 0, 97, 61];
        for (channel, value) in Channel::TAIL_ORDER.iter().zip(expected) {
            assert_eq!(metrics.levels.get(channel), Some(&value), "{}", channel);
        }
    }

    #[test]
    fn test_takes_last_ten_numbers() {
        // timestamp digits and the floor number precede the ten levels
        let metrics = parse_tail_metrics(GOLDEN_TAIL);
        assert_eq!(metrics.levels.len(), 10);
        assert_eq!(metrics.levels.get(&Channel::TonerK), Some(&45));
        assert_eq!(metrics.levels.get(&Channel::Fuser), Some(&61));
    }

    #[test]
    fn test_fewer_than_ten_numbers_yields_no_levels() {
        let metrics = parse_tail_metrics("Lobby 01/02/25 10:00:00 10 20 30");
        assert!(metrics.levels.is_empty());
        assert_eq!(metrics.reported_time, "01/02/25 10:00:00");
    }

    #[test]
    fn test_out_of_range_value_rejects_all_levels() {
        let metrics = parse_tail_metrics("Lobby 10 20 30 40 50 60 70 80 90 101");
        assert!(metrics.levels.is_empty());
    }

    #[test]
    fn test_exactly_ten_at_bounds() {
        let metrics = parse_tail_metrics("0 100 0 100 0 100 0 100 0 100");
        assert_eq!(metrics.levels.len(), 10);
        assert_eq!(metrics.levels.get(&Channel::TonerC), Some(&100));
        assert_eq!(metrics.reported_time, "");
    }

    #[test]
    fn test_four_digit_tokens_are_not_numbers() {
        // 2024 is not a 1-3 digit token, so only nine numbers remain
        let metrics = parse_tail_metrics("Model 2024 1 2 3 4 5 6 7 8 9");
        assert!(metrics.levels.is_empty());
    }

    #[test]
    fn test_text_before_timestamp() {
        assert_eq!(text_before_timestamp(GOLDEN_TAIL), "Library 2nd Floor");
        assert_eq!(text_before_timestamp("  no stamp here "), "no stamp here");
        assert_eq!(text_before_timestamp("03/14/25 09:26:53 x"), "");
    }
}
