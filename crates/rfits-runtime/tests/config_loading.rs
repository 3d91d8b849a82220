#![forbid(unsafe_code)]

//! Loading `ViewerConfig` from TOML and JSON.
//!
//! Run:
//!   cargo test -p rfits-runtime --features config --test config_loading

use std::io::Write;

use rfits_harness::{RecordingSink, ScriptedSource};
use rfits_runtime::{ConfigError, RenderDispatcher, ViewerConfig, ViewerSession};

#[test]
fn empty_toml_is_default() {
    assert_eq!(ViewerConfig::from_toml_str("").unwrap(), ViewerConfig::default());
    assert_eq!(ViewerConfig::from_json_str("{}").unwrap(), ViewerConfig::default());
}

#[test]
fn partial_toml_overrides_only_named_fields() {
    let config = ViewerConfig::from_toml_str(
        r#"
        [zoom]
        max_percent = 800.0

        [stretch]
        low_percentile = 0.01

        [dispatch]
        coalesce_input = true
        "#,
    )
    .unwrap();

    assert_eq!(config.zoom.max_percent, 800.0);
    assert_eq!(config.zoom.min_percent, 10.0);
    assert_eq!(config.stretch.low_percentile, 0.01);
    assert_eq!(config.stretch.high_percentile, 0.995);
    assert!(config.dispatch.coalesce_input);
    assert!(config.dispatch.dedupe);
    assert_eq!(config.interaction.drag_sensitivity, 2.0);
}

#[test]
fn json_overrides() {
    let config = ViewerConfig::from_json_str(
        r#"{"interaction": {"drag_sensitivity": 1.5}, "dispatch": {"channel_capacity": 16}}"#,
    )
    .unwrap();
    assert_eq!(config.interaction.drag_sensitivity, 1.5);
    assert_eq!(config.interaction.wheel_zoom_in, 1.1);
    assert_eq!(config.dispatch.channel_capacity, 16);
}

#[test]
fn invalid_values_are_rejected_with_every_message() {
    let err = ViewerConfig::from_toml_str(
        r#"
        [stretch]
        low_percentile = 0.9
        high_percentile = 0.1

        [dispatch]
        slider_steps = 0
        "#,
    )
    .unwrap_err();
    match err {
        ConfigError::Validation(messages) => {
            assert_eq!(messages.len(), 2, "{messages:?}");
            assert!(messages.iter().any(|m| m.contains("low_percentile")));
            assert!(messages.iter().any(|m| m.contains("slider_steps")));
        }
        other => panic!("expected validation error, got {other}"),
    }
}

#[test]
fn malformed_input_is_a_parse_error() {
    assert!(matches!(
        ViewerConfig::from_toml_str("[zoom\nmax_percent = "),
        Err(ConfigError::Toml(_))
    ));
    assert!(matches!(
        ViewerConfig::from_json_str("{\"zoom\": 3}"),
        Err(ConfigError::Json(_))
    ));
}

#[test]
fn files_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = ViewerConfig::default();
    config.zoom.max_percent = 1000.0;
    config.dispatch.dedupe = false;

    let toml_path = dir.path().join("rfits.toml");
    std::fs::write(&toml_path, config.to_toml_string().unwrap()).unwrap();
    assert_eq!(ViewerConfig::from_toml_file(&toml_path).unwrap(), config);

    let json_path = dir.path().join("rfits.json");
    let mut file = std::fs::File::create(&json_path).unwrap();
    file.write_all(br#"{"zoom": {"max_percent": 1000.0}, "dispatch": {"dedupe": false}}"#)
        .unwrap();
    drop(file);
    assert_eq!(ViewerConfig::from_json_file(&json_path).unwrap(), config);
}

#[test]
fn missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    assert!(matches!(
        ViewerConfig::from_toml_file(dir.path().join("absent.toml")),
        Err(ConfigError::Io(_))
    ));
}

#[test]
fn loaded_config_drives_the_session() {
    let config = ViewerConfig::from_toml_str("[zoom]\nmax_percent = 200.0\n").unwrap();
    let mut session = ViewerSession::with_config(
        ScriptedSource::new(),
        RenderDispatcher::new(RecordingSink::new()),
        config,
    )
    .unwrap();
    session.set_zoom_percent(450.0);
    assert_eq!(session.view().zoom_percent(), 200.0);
}
