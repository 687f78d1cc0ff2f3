use thiserror::Error;

/// Errors raised while handling one inbound message.
///
/// Each error belongs to a single message and, where known, a single store.
/// The dispatcher logs it and carries on with the next message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BridgeError {
    /// An update arrived for a store that was never initialized (strict mode).
    #[error("Store '{store_id}' not found: update received before init")]
    StoreNotFound { store_id: String },

    /// A merge, observer or hot reload routine failed part-way through.
    /// `store_id` is `None` for document-level failures.
    #[error("Sync failed for {}: {message}", .store_id.as_deref().unwrap_or("document"))]
    SyncCallback {
        store_id: Option<String>,
        message: String,
    },

    /// Store ids must be non-empty.
    #[error("Store id must not be empty")]
    InvalidStoreId,

    /// A hot reload message arrived but the bridge was built without it.
    #[error("Hot reload is not enabled in this build")]
    HmrDisabled,
}

impl BridgeError {
    /// Store this error is about, if any.
    pub fn store_id(&self) -> Option<&str> {
        match self {
            BridgeError::StoreNotFound { store_id } => Some(store_id.as_str()),
            BridgeError::SyncCallback { store_id, .. } => store_id.as_deref(),
            BridgeError::InvalidStoreId | BridgeError::HmrDisabled => None,
        }
    }
}

/// Errors on the client side of the inbound channel.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("Bridge dispatcher disconnected")]
    Disconnected,

    #[error("Malformed inbound message: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Errors from an outbound sink.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SinkError {
    #[error("Outbound channel closed")]
    Closed,
}
