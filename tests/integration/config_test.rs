use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;
use traywatch::core::config::{validate_url, Config};

#[test]
fn test_config_default() {
    let config = Config::default();
    assert!(config.url.is_none());
    assert!(config.state_path.is_none());
    assert_eq!(config.alert_config().toner_threshold, 15);
    assert_eq!(config.alert_config().fuser_threshold, 20);
}

#[test]
fn test_config_load_nonexistent_returns_default() {
    let temp_dir = TempDir::new().unwrap();
    let config = Config::load_from(&temp_dir.path().join("missing.json")).unwrap();
    assert_eq!(config, Config::default());
}

#[test]
fn test_config_roundtrip() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("nested").join("config.json");

    let mut config = Config::default();
    config.set_url("https://printmonitor.local/status").unwrap();
    config.set_toner_threshold(25).unwrap();
    config.set_interval_minutes(15).unwrap();
    config.set_state_path("/srv/traywatch/state.json".to_string());
    config.save_to(&path).unwrap();

    let loaded = Config::load_from(&path).unwrap();
    assert_eq!(loaded, config);
    assert_eq!(
        loaded.resolve_state_path().unwrap(),
        PathBuf::from("/srv/traywatch/state.json")
    );

    let raw: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(raw["toner_threshold"], 25);
    assert_eq!(raw["interval_minutes"], 15);
}

#[test]
fn test_config_empty_file_returns_default() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.json");
    fs::write(&path, "   ").unwrap();
    assert_eq!(Config::load_from(&path).unwrap(), Config::default());
}

#[test]
fn test_out_of_range_thresholds_are_clamped_for_alerts() {
    // hand-edited files can bypass the setters
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.json");
    fs::write(&path, r#"{"toner_threshold": 0, "fuser_threshold": 200}"#).unwrap();

    let config = Config::load_from(&path).unwrap();
    let alerts = config.alert_config();
    assert_eq!(alerts.toner_threshold, 1);
    assert_eq!(alerts.fuser_threshold, 100);
}

#[test]
fn test_url_validation() {
    assert!(validate_url("http://10.0.0.5:8080/fleet").is_ok());
    assert!(validate_url("https://printmonitor.local").is_ok());
    assert!(validate_url("javascript:alert(1)").is_err());
    assert!(validate_url("").is_err());
}
