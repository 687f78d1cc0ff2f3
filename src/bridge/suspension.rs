//! Per-store echo suppression.
//!
//! Each inbound update takes a [`SuspensionToken`] for its store. The store
//! counts as suspended while any token for it is alive, so overlapping
//! updates cannot release each other's suppression early.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

#[derive(Clone, Default)]
pub struct Suspensions {
    counts: Arc<Mutex<HashMap<String, usize>>>,
}

impl Suspensions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Suspends `store_id` until the returned token is released or dropped.
    pub fn suspend(&self, store_id: &str) -> SuspensionToken {
        *self
            .counts
            .lock()
            .entry(store_id.to_string())
            .or_insert(0) += 1;
        SuspensionToken {
            store_id: store_id.to_string(),
            suspensions: self.clone(),
        }
    }

    pub fn is_suspended(&self, store_id: &str) -> bool {
        self.depth(store_id) > 0
    }

    /// Number of live tokens for `store_id`.
    pub fn depth(&self, store_id: &str) -> usize {
        self.counts.lock().get(store_id).copied().unwrap_or(0)
    }

    fn release(&self, store_id: &str) {
        let mut counts = self.counts.lock();
        if let Some(count) = counts.get_mut(store_id) {
            *count = count.saturating_sub(1);
            if *count == 0 {
                counts.remove(store_id);
            }
        }
    }
}

/// Keeps one store suspended. Releases on drop.
#[must_use = "dropping the token releases the suspension immediately"]
pub struct SuspensionToken {
    store_id: String,
    suspensions: Suspensions,
}

impl SuspensionToken {
    pub fn store_id(&self) -> &str {
        &self.store_id
    }

    pub fn release(self) {
        drop(self);
    }
}

impl Drop for SuspensionToken {
    fn drop(&mut self) {
        self.suspensions.release(&self.store_id);
        tracing::trace!(store_id = %self.store_id, "suspension released");
    }
}
