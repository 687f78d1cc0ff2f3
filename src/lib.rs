//! Two-way sync between server-pushed store data and client-side reactive
//! stores.
//!
//! The server initializes and updates named stores through
//! [`bridge::InboundMessage`]s; local mutations of those stores flow back as
//! [`bridge::OutboundChange`]s. Changes caused by an inbound update are never
//! echoed back.
//!
//! ```no_run
//! use storebridge::bridge::{BridgeController, BridgeLayer, OutboundChange};
//! use storebridge::config::BridgeConfig;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let (outbound, _server_rx) = tokio::sync::mpsc::unbounded_channel::<OutboundChange>();
//! let controller = BridgeController::new(BridgeConfig::load()?, outbound);
//! let (client, dispatcher) = BridgeLayer::new(controller);
//! tokio::spawn(dispatcher.run());
//! client
//!     .send_json(r#"{"type":"store-init","storeId":"cart","data":{"count":0}}"#)
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod bridge;
pub mod config;
#[cfg(feature = "hmr")]
pub mod hmr;
pub mod logging;
pub mod scheduler;
pub mod store;

pub use bridge::{BridgeController, BridgeError, BridgeLayer, InboundMessage, OutboundChange};
pub use config::{BridgeConfig, SyncMode};
pub use store::{ReactiveStore, StoreData, StoreRegistry};
