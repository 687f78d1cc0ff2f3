use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc;

use super::error::SinkError;
use super::messages::OutboundChange;

/// Where outbound changes go. Called synchronously from store observers.
pub trait OutboundSink: Send + Sync {
    fn send(&self, change: OutboundChange) -> Result<(), SinkError>;
}

impl OutboundSink for mpsc::UnboundedSender<OutboundChange> {
    fn send(&self, change: OutboundChange) -> Result<(), SinkError> {
        mpsc::UnboundedSender::send(self, change).map_err(|_| SinkError::Closed)
    }
}

/// Keeps every change in memory, in send order.
#[derive(Clone, Default)]
pub struct RecordingSink {
    sent: Arc<Mutex<Vec<OutboundChange>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything sent so far.
    pub fn sent(&self) -> Vec<OutboundChange> {
        self.sent.lock().clone()
    }

    /// Drains the recorded changes.
    pub fn take(&self) -> Vec<OutboundChange> {
        std::mem::take(&mut *self.sent.lock())
    }

    pub fn len(&self) -> usize {
        self.sent.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sent.lock().is_empty()
    }
}

impl OutboundSink for RecordingSink {
    fn send(&self, change: OutboundChange) -> Result<(), SinkError> {
        self.sent.lock().push(change);
        Ok(())
    }
}
