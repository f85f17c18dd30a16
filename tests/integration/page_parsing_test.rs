use traywatch::core::alerts::{evaluate_alerts, AlertConfig};
use std::cell::RefCell;
use std::rc::Rc;
use traywatch::core::page::{
    html_to_lines, parse_monitor_page, Channel, LastTenNumbers, PageParser, TailMetricStrategy,
    TailMetrics, TrayDetectionStrategy, UNKNOWN_TRAY,
};

const PAGE: &str = include_str!("../fixtures/monitor_page.html");

#[test]
fn test_golden_page_devices() {
    let records = parse_monitor_page(PAGE);
    let ids: Vec<&str> = records.iter().map(|r| r.device_id.as_str()).collect();
    assert_eq!(ids, vec!["10001", "10002", "10003"]);
}

#[test]
fn test_golden_page_first_device() {
    let records = parse_monitor_page(PAGE);
    let lobby = &records[0];

    assert_eq!(lobby.description, "Lobby");
    assert_eq!(lobby.device_reported_time, "03/14/25 09:26:53");
    assert_eq!(lobby.status_message, "Tray 2 is empty");
    assert_eq!(lobby.printer_text, "Load paper in tray 2");
    assert_eq!(lobby.empty_trays, vec!["Tray 2"]);

    let expected = [5, 0, 0, 0, 80, 0, 0, 0, 90, 50];
    for (channel, value) in Channel::TAIL_ORDER.iter().zip(expected) {
        assert_eq!(lobby.level(*channel), Some(value), "{}", channel);
    }
}

#[test]
fn test_golden_page_field_lines() {
    let records = parse_monitor_page(PAGE);

    let library = &records[1];
    assert_eq!(library.description, "Library & Study Hall");
    assert_eq!(library.status_message, "Low toner");
    assert!(library.empty_trays.is_empty());

    let annex = &records[2];
    assert_eq!(annex.description, "Annex Copier");
    assert_eq!(annex.device_reported_time, "");
    assert_eq!(annex.level(Channel::Fuser), Some(18));
    assert_eq!(annex.level(Channel::Belt), Some(55));
    assert_eq!(annex.level(Channel::TonerK), None);
    assert_eq!(annex.printer_text, "none");
    assert_eq!(annex.empty_trays, vec![UNKNOWN_TRAY]);
}

#[test]
fn test_golden_page_alerts() {
    let records = parse_monitor_page(PAGE);
    let alerts = evaluate_alerts(&records, &AlertConfig::default());

    let summary: Vec<(&str, &str, &str)> = alerts
        .iter()
        .map(|a| (a.device_id.as_str(), a.item.as_str(), a.level.as_str()))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("10001", "Black Toner", "5%"),
            ("10002", "Cyan Toner", "12%"),
            ("10002", "Fuser", "15%"),
            ("10002", "Toner", "reported"),
            ("10003", "Fuser", "18%"),
        ]
    );
}

#[test]
fn test_script_and_style_content_never_becomes_lines() {
    let lines: Vec<String> = html_to_lines(PAGE).collect();
    assert!(lines.iter().all(|line| !line.contains("99999")));
    assert!(lines.iter().all(|line| !line.contains("color")));
    assert!(lines.iter().all(|line| !line.is_empty() && line.trim() == line));
}

#[test]
fn test_page_without_devices() {
    assert!(parse_monitor_page("<html><body><p>Service unavailable</p></body></html>").is_empty());
    assert!(parse_monitor_page("").is_empty());
}

/// Remembers what it was asked about and reports one fixed tray
#[derive(Default)]
struct RecordingTrays {
    seen: Rc<RefCell<Vec<String>>>,
}

impl TrayDetectionStrategy for RecordingTrays {
    fn detect(&self, text: &str) -> Vec<String> {
        self.seen.borrow_mut().push(text.to_string());
        vec!["Tray 9".to_string()]
    }
}

/// Ignores the tail and reports a fixed fuser level
struct FixedFuser(u8);

impl TailMetricStrategy for FixedFuser {
    fn extract(&self, _tail: &str) -> TailMetrics {
        let mut metrics = TailMetrics::default();
        metrics.levels.insert(Channel::Fuser, self.0);
        metrics
    }
}

#[test]
fn test_custom_tray_detection_strategy() {
    let trays = RecordingTrays::default();
    let seen = trays.seen.clone();
    let records = PageParser::with_strategies(LastTenNumbers, trays).parse_page(PAGE);

    assert_eq!(records.len(), 3);
    assert!(records.iter().all(|r| r.empty_trays == vec!["Tray 9"]));
    assert_eq!(records[0].level(Channel::TonerK), Some(5));

    // one call per device, placeholder fields left out
    let seen = seen.borrow();
    assert_eq!(seen.len(), 3);
    assert!(seen[0].contains("Load paper in tray 2"));
    assert!(!seen[2].contains("none"));
}

#[test]
fn test_custom_tail_strategy() {
    let parser = PageParser::with_strategies(FixedFuser(7), RecordingTrays::default());
    let records = parser.parse_page(PAGE);

    assert_eq!(records[0].level(Channel::Fuser), Some(7));
    assert_eq!(records[0].level(Channel::TonerK), None);
    // an explicit Fuser: line still wins over the tail
    assert_eq!(records[2].level(Channel::Fuser), Some(18));
}
