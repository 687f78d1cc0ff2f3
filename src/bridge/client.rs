use tokio::sync::mpsc;

use crate::store::StoreData;

use super::error::DispatchError;
use super::messages::InboundMessage;

/// Transport-facing end of the inbound channel.
#[derive(Clone)]
pub struct BridgeClient {
    sender: mpsc::Sender<InboundMessage>,
}

impl BridgeClient {
    pub fn new(sender: mpsc::Sender<InboundMessage>) -> Self {
        Self { sender }
    }

    /// Queues a message, waiting for room while the buffer is full.
    pub async fn send(&self, message: InboundMessage) -> Result<(), DispatchError> {
        self.sender
            .send(message)
            .await
            .map_err(|_| DispatchError::Disconnected)
    }

    /// Decodes a raw wire message and queues it.
    pub async fn send_json(&self, raw: &str) -> Result<(), DispatchError> {
        let message = InboundMessage::from_json(raw)?;
        self.send(message).await
    }

    pub async fn init_store(
        &self,
        store_id: impl Into<String>,
        data: StoreData,
    ) -> Result<(), DispatchError> {
        self.send(InboundMessage::StoreInit {
            store_id: store_id.into(),
            data,
        })
        .await
    }

    pub async fn update_store(
        &self,
        store_id: impl Into<String>,
        data: StoreData,
    ) -> Result<(), DispatchError> {
        self.send(InboundMessage::StoreUpdate {
            store_id: store_id.into(),
            data,
        })
        .await
    }

    pub async fn reload_document(&self, html: impl Into<String>) -> Result<(), DispatchError> {
        self.send(InboundMessage::HmrReload { html: html.into() })
            .await
    }
}
