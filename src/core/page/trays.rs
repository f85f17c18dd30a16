//! Empty paper tray detection in free-form status text.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;

pub const UNKNOWN_TRAY: &str = "Unknown Tray";

/// "tray X is empty", "paper out in tray X", "empty tray X"
static TRAY_PATTERNS: Lazy<[Regex; 3]> = Lazy::new(|| {
    [
        Regex::new(r"(?i)\btray\s*([A-Za-z0-9-]+)\s*(?:is\s*)?(?:empty|out|no\s+paper)\b")
            .expect("valid tray-then-adjective pattern"),
        Regex::new(r"(?i)\bpaper\s*out\s*(?:in\s*)?tray\s*([A-Za-z0-9-]+)\b")
            .expect("valid paper-out pattern"),
        Regex::new(r"(?i)\b(?:empty|out)\s*tray\s*([A-Za-z0-9-]+)\b")
            .expect("valid adjective-then-tray pattern"),
    ]
});
static GENERIC_EMPTY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(?:paper out|tray empty)\b").expect("valid generic pattern"));

/// Heuristic that finds empty trays mentioned in a block of text
pub trait TrayDetectionStrategy {
    /// Sorted, de-duplicated normalized tray labels
    fn detect(&self, text: &str) -> Vec<String>;
}

/// Phrase-pattern detector used for the monitor page
#[derive(Debug, Clone, Copy, Default)]
pub struct PhrasePatterns;

impl TrayDetectionStrategy for PhrasePatterns {
    fn detect(&self, text: &str) -> Vec<String> {
        let mut trays = BTreeSet::new();

        for pattern in TRAY_PATTERNS.iter() {
            for caps in pattern.captures_iter(text) {
                trays.insert(normalize_tray(&caps[1]));
            }
        }

        if trays.is_empty() && GENERIC_EMPTY.is_match(text) {
            trays.insert(UNKNOWN_TRAY.to_string());
        }

        // BTreeSet iterates in plain string order: "Tray 10" sorts before "Tray 2"
        trays.into_iter().collect()
    }
}

/// Detect empty trays with the default strategy
pub fn detect_empty_trays(text: &str) -> Vec<String> {
    PhrasePatterns.detect(text)
}

/// Normalize a captured tray token into a display label.
///
/// `"07"` → `"Tray 7"`, `"tray-b"` → `"Tray B"`, `"MP"` → `"Tray MP"`,
/// `"#"` → `"Unknown Tray"`. A hyphen directly after a `TRAY` prefix is a
/// separator, not part of the label.
pub fn normalize_tray(value: &str) -> String {
    let token: String = value
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-')
        .collect::<String>()
        .to_ascii_uppercase();

    if token.is_empty() {
        return UNKNOWN_TRAY.to_string();
    }
    if let Some(label) = numeric_label(&token) {
        return label;
    }
    if let Some(rest) = token.strip_prefix("TRAY") {
        let rest = rest.trim_start_matches('-');
        let rest = if rest.is_empty() { "UNKNOWN" } else { rest };
        return numeric_label(rest).unwrap_or_else(|| format!("Tray {}", rest));
    }
    format!("Tray {}", token)
}

fn numeric_label(token: &str) -> Option<String> {
    if token.is_empty() || !token.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let trimmed = token.trim_start_matches('0');
    let number = if trimmed.is_empty() { "0" } else { trimmed };
    Some(format!("Tray {}", number))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_numeric_drops_leading_zeros() {
        assert_eq!(normalize_tray("tray07"), "Tray 7");
        assert_eq!(normalize_tray("007"), "Tray 7");
        assert_eq!(normalize_tray("0"), "Tray 0");
        assert_eq!(normalize_tray("TRAY000"), "Tray 0");
    }

    #[test]
    fn test_normalize_prefixed_and_literal_tokens() {
        assert_eq!(normalize_tray("TRAY-B"), "Tray B");
        assert_eq!(normalize_tray("tray-03"), "Tray 3");
        assert_eq!(normalize_tray("trayB"), "Tray B");
        assert_eq!(normalize_tray("TRAY"), "Tray UNKNOWN");
        assert_eq!(normalize_tray("TRAY-"), "Tray UNKNOWN");
        assert_eq!(normalize_tray("mp"), "Tray MP");
        assert_eq!(normalize_tray("b-2"), "Tray B-2");
    }

    #[test]
    fn test_normalize_unrecognizable_token() {
        assert_eq!(normalize_tray(""), UNKNOWN_TRAY);
        assert_eq!(normalize_tray("#!?"), UNKNOWN_TRAY);
    }

    #[test]
    fn test_detect_tray_then_adjective() {
        assert_eq!(detect_empty_trays("Tray 2 is empty"), vec!["Tray 2"]);
        assert_eq!(detect_empty_trays("TRAY 3 OUT"), vec!["Tray 3"]);
        assert_eq!(detect_empty_trays("tray 4 no paper"), vec!["Tray 4"]);
    }

    #[test]
    fn test_detect_paper_out_then_tray() {
        assert_eq!(detect_empty_trays("Paper out in tray 1"), vec!["Tray 1"]);
        assert_eq!(detect_empty_trays("paper out tray 05"), vec!["Tray 5"]);
    }

    #[test]
    fn test_detect_adjective_then_tray() {
        assert_eq!(detect_empty_trays("Empty tray MP"), vec!["Tray MP"]);
    }

    #[test]
    fn test_detect_collects_all_matches_deduplicated() {
        let text = "Tray 2 empty. Paper out in tray 2. Tray 10 empty";
        assert_eq!(detect_empty_trays(text), vec!["Tray 10", "Tray 2"]);
    }

    #[test]
    fn test_generic_phrase_gives_unknown_tray() {
        assert_eq!(detect_empty_trays("Printer reports paper out"), vec![UNKNOWN_TRAY]);
        assert_eq!(detect_empty_trays("Tray Empty"), vec![UNKNOWN_TRAY]);
    }

    #[test]
    fn test_no_mention_gives_nothing() {
        assert!(detect_empty_trays("Ready. Toner low").is_empty());
        assert!(detect_empty_trays("").is_empty());
    }
}
