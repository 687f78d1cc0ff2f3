mod common;

use common::temp_config;
use storebridge::config::{BridgeConfig, ConfigError, SyncMode};

#[test]
fn test_config_default_values() {
    let config = BridgeConfig::default();

    assert_eq!(config.mode, SyncMode::Lenient);
    assert_eq!(config.channel_prefix, "store-sync:");
    assert_eq!(config.inbound_buffer, 64);
    assert_eq!(config.hmr.completion_event, "hmr:complete");
}

#[test]
fn test_config_path_ends_with_expected() {
    let path = BridgeConfig::config_path();
    assert!(path.ends_with("storebridge/config.toml"));
}

#[test]
fn test_load_full_config() {
    let (_dir, path) = temp_config(
        r#"
mode = "strict"
channel_prefix = "sync/"
inbound_buffer = 8

[hmr]
completion_event = "reloaded"
"#,
    );

    let config = BridgeConfig::load_from(&path).expect("load");
    assert_eq!(config.mode, SyncMode::Strict);
    assert_eq!(config.channel_for("cart"), "sync/cart");
    assert_eq!(config.inbound_buffer, 8);
    assert_eq!(config.hmr.completion_event, "reloaded");
}

#[test]
fn test_empty_file_uses_defaults() {
    let (_dir, path) = temp_config("");
    let config = BridgeConfig::load_from(&path).expect("load");
    assert_eq!(config, BridgeConfig::default());
}

#[test]
fn test_unknown_mode_is_parse_error() {
    let (_dir, path) = temp_config(r#"mode = "relaxed""#);
    let result = BridgeConfig::load_from(&path);
    assert!(matches!(result, Err(ConfigError::ParseError { .. })));
}

#[test]
fn test_invalid_values_fail_validation() {
    let (_dir, path) = temp_config(
        r#"
[hmr]
completion_event = ""
"#,
    );
    let result = BridgeConfig::load_from(&path);
    assert!(matches!(result, Err(ConfigError::ValidationError { .. })));
}

#[test]
fn test_missing_file_is_read_error() {
    let dir = tempfile::TempDir::new().expect("temp dir");
    let result = BridgeConfig::load_from(&dir.path().join("absent.toml"));
    match result {
        Err(ConfigError::ReadError { path, .. }) => assert!(path.ends_with("absent.toml")),
        other => panic!("expected read error, got {:?}", other),
    }
}
