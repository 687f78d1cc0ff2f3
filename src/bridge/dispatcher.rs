use tokio::sync::mpsc;

use super::controller::BridgeController;
use super::messages::InboundMessage;

/// Counters returned when the dispatcher stops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchStats {
    pub applied: u64,
    pub failed: u64,
}

/// Consumes inbound messages one at a time.
///
/// Every message is fully handled, its suspensions released, before the next
/// one is taken. A failing message is logged and counted; it never stops
/// the loop.
pub struct BridgeDispatcher {
    pub(crate) receiver: mpsc::Receiver<InboundMessage>,
    controller: BridgeController,
}

impl BridgeDispatcher {
    pub fn new(receiver: mpsc::Receiver<InboundMessage>, controller: BridgeController) -> Self {
        Self {
            receiver,
            controller,
        }
    }

    pub async fn run(mut self) -> DispatchStats {
        let mut stats = DispatchStats::default();
        while let Some(message) = self.receiver.recv().await {
            self.handle(message, &mut stats);
        }
        tracing::debug!(
            applied = stats.applied,
            failed = stats.failed,
            "inbound channel closed, dispatcher stopped"
        );
        stats
    }

    fn handle(&self, message: InboundMessage, stats: &mut DispatchStats) {
        let name = message.name();
        match self.controller.dispatch(message) {
            Ok(()) => {
                stats.applied += 1;
                tracing::trace!(message = name, "inbound message applied");
            }
            Err(err) => {
                stats.failed += 1;
                tracing::error!(
                    message = name,
                    store_id = err.store_id().unwrap_or("-"),
                    error = %err,
                    "inbound message failed"
                );
            }
        }
    }
}
