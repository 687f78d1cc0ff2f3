use serde::{Deserialize, Serialize};

/// Policy for a `store-update` that arrives for a store the bridge has never
/// initialized.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncMode {
    /// Reject the update with `BridgeError::StoreNotFound`.
    Strict,
    /// Create the store from the update payload, as if it were an init.
    #[default]
    Lenient,
}

/// Root configuration container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// Store-not-found policy for updates.
    #[serde(default)]
    pub mode: SyncMode,
    /// Prefix of the per-store outbound channel name (`<prefix><store_id>`).
    #[serde(default = "default_channel_prefix")]
    pub channel_prefix: String,
    /// Capacity of the inbound message channel (default: 64).
    #[serde(default = "default_inbound_buffer")]
    pub inbound_buffer: usize,
    #[serde(default)]
    pub hmr: HmrConfig,
}

/// Hot reload settings. Only consulted when built with the `hmr` feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HmrConfig {
    /// Event dispatched on the document once a body swap completes.
    #[serde(default = "default_completion_event")]
    pub completion_event: String,
}

fn default_channel_prefix() -> String {
    "store-sync:".to_string()
}

fn default_inbound_buffer() -> usize {
    64
}

fn default_completion_event() -> String {
    "hmr:complete".to_string()
}

impl BridgeConfig {
    /// Config with the given mode and every other field defaulted.
    pub fn with_mode(mode: SyncMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    /// Outbound channel name for a store.
    pub fn channel_for(&self, store_id: &str) -> String {
        format!("{}{}", self.channel_prefix, store_id)
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            mode: SyncMode::default(),
            channel_prefix: default_channel_prefix(),
            inbound_buffer: default_inbound_buffer(),
            hmr: HmrConfig::default(),
        }
    }
}

impl Default for HmrConfig {
    fn default() -> Self {
        Self {
            completion_event: default_completion_event(),
        }
    }
}
