//! Bridge configuration: store-not-found policy, channel naming and
//! hot reload settings, loaded from TOML.

mod loader;
mod types;

pub use loader::ConfigError;
pub use types::{BridgeConfig, HmrConfig, SyncMode};
