use super::validation::validate_config;
use super::*;
use crate::engine::rules::{Method, Severity};
use tempfile::tempdir;

fn minimal_toml() -> &'static str {
    r#"
        [position]
        source = "static"
        latitude = 57.0
        longitude = -3.0
    "#
}

fn parse(toml_text: &str) -> Config {
    toml::from_str(toml_text).expect("config should parse")
}

#[test]
fn minimal_config_uses_defaults() {
    let config = parse(minimal_toml());
    assert_eq!(config.root(), "environment.sunphases.");
    assert_eq!(config.heartbeat(), 60);
    assert_eq!(config.zone_override(), None);
    assert!(config.notifications.is_empty());
    assert_eq!(config.metadata_entries().len(), 14);
    assert!(validate_config(&config).is_ok());
}

#[test]
fn full_config_round_trips() {
    let config = parse(
        r#"
        root = "environment.sunphases"
        heartbeat = 600
        timezone = "Europe/London"

        [position]
        source = "file"
        path = "/var/run/positions.ndjson"

        [[notifications]]
        range_low = "dawn-30m"
        range_high = "dusk+1h"
        in_range = { key = "daytime", state = "alert", method = ["visual", "sound"] }
        out_range = { key = "nighttime" }

        [[metadata]]
        key = "sunrise"
        description = "Top edge of the sun appears on the horizon"
        units = "ISO8601 (UTC)"
    "#,
    );

    assert_eq!(config.heartbeat(), 600);
    assert_eq!(config.zone_override().unwrap().to_string(), "Europe/London");
    assert_eq!(config.position.source, PositionSourceKind::File);

    let rule = &config.notifications[0];
    assert_eq!(rule.range_low, "dawn-30m");
    assert_eq!(rule.in_range.state, Severity::Alert);
    assert_eq!(rule.in_range.method, vec![Method::Visual, Method::Sound]);
    assert_eq!(rule.out_range.state, Severity::Normal);
    assert!(rule.out_range.method.is_empty());

    assert_eq!(config.metadata_entries().len(), 1);
    assert!(validate_config(&config).is_ok());
}

#[test]
fn root_is_normalized() {
    assert_eq!(normalize_root("environment.sunphases"), "environment.sunphases.");
    assert_eq!(normalize_root("  .environment.sunphases.. "), "environment.sunphases.");
    assert_eq!(normalize_root("custom"), "custom.");
}

#[test]
fn empty_root_is_rejected() {
    let mut config = parse(minimal_toml());
    config.root = Some("...".into());
    assert!(validate_config(&config).is_err());
}

#[test]
fn static_source_requires_coordinates_in_range() {
    let config = parse(
        r#"
        [position]
        source = "static"
        latitude = 97.0
        longitude = -3.0
    "#,
    );
    let error = validate_config(&config).unwrap_err();
    assert!(error.to_string().contains("latitude"));

    let config = parse(
        r#"
        [position]
        source = "static"
    "#,
    );
    assert!(validate_config(&config).is_err());
}

#[test]
fn file_source_requires_a_path() {
    let config = parse(
        r#"
        [position]
        source = "file"
    "#,
    );
    assert!(validate_config(&config).is_err());
}

#[test]
fn unknown_timezone_is_rejected() {
    let mut config = parse(minimal_toml());
    config.timezone = Some("Mars/Olympus_Mons".into());
    let error = validate_config(&config).unwrap_err();
    assert!(error.to_string().contains("Mars/Olympus_Mons"));
}

#[test]
fn rule_with_unknown_event_key_is_rejected_before_start() {
    let config = parse(
        r#"
        [position]
        source = "stdin"

        [[notifications]]
        range_low = "dawnn"
        range_high = "dusk"
        in_range = { key = "daytime" }
        out_range = { key = "nighttime" }
    "#,
    );
    let error = format!("{:#}", validate_config(&config).unwrap_err());
    assert!(error.contains("rule 1"));
    assert!(error.contains("invalid sun phase key 'dawnn'"));
}

#[test]
fn rule_with_invalid_clock_time_is_rejected_before_start() {
    let config = parse(
        r#"
        [position]
        source = "stdin"

        [[notifications]]
        range_low = "06:00:00"
        range_high = "25:00:00"
        in_range = { key = "daytime" }
        out_range = { key = "nighttime" }
    "#,
    );
    let error = format!("{:#}", validate_config(&config).unwrap_err());
    assert!(error.contains("range_high"));
    assert!(error.contains("hh:mm:ss value is invalid"));
}

#[test]
fn rule_with_empty_notification_key_is_rejected() {
    let config = parse(
        r#"
        [position]
        source = "stdin"

        [[notifications]]
        range_low = "dawn"
        range_high = "dusk"
        in_range = { key = "" }
        out_range = { key = "nighttime" }
    "#,
    );
    assert!(validate_config(&config).is_err());
}

#[test]
fn load_creates_a_valid_default_config() {
    let dir = tempdir().unwrap();
    let config = load(Some(dir.path())).unwrap();

    assert!(dir.path().join("sunphases.toml").exists());
    assert_eq!(config.position.source, PositionSourceKind::Stdin);
    assert_eq!(config.notifications.len(), 1);
    assert_eq!(config.notifications[0].in_range.key, "daytime");

    // A second load reads the file back rather than regenerating it.
    let reloaded = load(Some(dir.path())).unwrap();
    assert_eq!(reloaded, config);
}

#[test]
fn load_from_missing_path_fails_with_context() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("nope.toml");
    let error = load_from_path(&missing).unwrap_err();
    assert!(error.to_string().contains("nope.toml"));
}
