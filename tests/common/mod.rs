//! Shared test utilities.

#![allow(dead_code)]

use serde_json::Value;
use std::path::PathBuf;
use storebridge::bridge::{BridgeController, RecordingSink};
use storebridge::config::{BridgeConfig, SyncMode};
use storebridge::StoreData;
use tempfile::TempDir;

/// Unwraps a `json!` object literal into store data.
pub fn data(value: Value) -> StoreData {
    match value {
        Value::Object(map) => map,
        other => panic!("expected a JSON object, got {}", other),
    }
}

/// Controller wired to an in-memory outbound sink.
pub fn recording_bridge(mode: SyncMode) -> (BridgeController, RecordingSink) {
    let sink = RecordingSink::new();
    let controller = BridgeController::new(BridgeConfig::with_mode(mode), sink.clone());
    (controller, sink)
}

/// Writes `content` to a temporary `config.toml`.
pub fn temp_config(content: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = temp_dir.path().join("config.toml");
    std::fs::write(&config_path, content).expect("Failed to write config");
    (temp_dir, config_path)
}
