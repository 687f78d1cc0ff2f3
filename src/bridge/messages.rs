//! Wire shapes exchanged with the server.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::store::StoreData;

/// Messages pushed by the server.
///
/// Serialized with a `type` tag, e.g.
/// `{"type":"store-update","storeId":"cart","data":{"count":2}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum InboundMessage {
    StoreInit {
        #[serde(rename = "storeId")]
        store_id: String,
        #[serde(default)]
        data: StoreData,
    },
    StoreUpdate {
        #[serde(rename = "storeId")]
        store_id: String,
        #[serde(default)]
        data: StoreData,
    },
    HmrReload { html: String },
}

impl InboundMessage {
    /// Protocol name of the message.
    pub fn name(&self) -> &'static str {
        match self {
            InboundMessage::StoreInit { .. } => "store-init",
            InboundMessage::StoreUpdate { .. } => "store-update",
            InboundMessage::HmrReload { .. } => "hmr-reload",
        }
    }

    pub fn store_id(&self) -> Option<&str> {
        match self {
            InboundMessage::StoreInit { store_id, .. }
            | InboundMessage::StoreUpdate { store_id, .. } => Some(store_id.as_str()),
            InboundMessage::HmrReload { .. } => None,
        }
    }

    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}

/// A locally observed change, addressed to the store's outbound channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutboundChange {
    pub channel: String,
    pub store_id: String,
    pub key: String,
    pub value: Value,
}

impl OutboundChange {
    /// Body sent on the channel: `{ key, value }`.
    pub fn payload(&self) -> Value {
        json!({ "key": self.key, "value": self.value })
    }
}
