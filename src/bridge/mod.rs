//! Bridge controller and its inbound/outbound plumbing.
//!
//! ```text
//! server ─▶ BridgeClient ─▶ BridgeDispatcher ─▶ BridgeController ─▶ store
//!                                                      ▲              │
//!                                                      └── observers ◀┘
//!                                                      │
//! server ◀──────────────────────────── OutboundSink ◀──┘ (not suspended)
//! ```

mod client;
mod controller;
mod dispatcher;
mod error;
mod messages;
mod sink;
mod suspension;


use tokio::sync::mpsc;

pub use client::BridgeClient;
#[cfg(feature = "hmr")]
pub use controller::SharedDocument;
pub use controller::{BridgeController, StoreState};
pub use dispatcher::{BridgeDispatcher, DispatchStats};
pub use error::{BridgeError, DispatchError, SinkError};
pub use messages::{InboundMessage, OutboundChange};
pub use sink::{OutboundSink, RecordingSink};
pub use suspension::{SuspensionToken, Suspensions};

pub struct BridgeLayer;

impl BridgeLayer {
    /// Wires a client and a dispatcher around `controller`, with the inbound
    /// buffer sized from its config.
    pub fn new(controller: BridgeController) -> (BridgeClient, BridgeDispatcher) {
        let buffer = controller.config().inbound_buffer.max(1);
        let (sender, receiver) = mpsc::channel(buffer);
        (
            BridgeClient::new(sender),
            BridgeDispatcher::new(receiver, controller),
        )
    }
}
