//! Mediates all synchronization between server messages and client stores.
//!
//! Inbound updates suspend their store until the inbound cycle that applied
//! them ends, so that the observer cascade they trigger is not echoed back to
//! the server. Local
//! mutations never take a suspension token and always propagate.

use std::any::Any;
use std::collections::HashSet;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use serde_json::Value;

use crate::config::{BridgeConfig, SyncMode};
#[cfg(feature = "hmr")]
use crate::hmr::{self, DocumentHost};
use crate::scheduler::MicrotaskQueue;
use crate::store::{ReactiveStore, StoreData, StoreRegistry};

use super::error::BridgeError;
use super::messages::{InboundMessage, OutboundChange};
use super::sink::OutboundSink;
use super::suspension::Suspensions;

/// Document handle shared between the bridge and its embedder.
#[cfg(feature = "hmr")]
pub type SharedDocument = Arc<Mutex<dyn DocumentHost>>;

/// Lifecycle of one store as seen by the bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreState {
    /// Not observed by the bridge yet.
    Uninitialized,
    /// Observers active, local changes are forwarded.
    Initialized,
    /// An inbound update is in flight; local changes are suppressed until its
    /// inbound cycle ends.
    Updating,
}

/// One bridge instance. Cheap to clone; clones share all state.
#[derive(Clone)]
pub struct BridgeController {
    inner: Arc<ControllerInner>,
}

struct ControllerInner {
    config: BridgeConfig,
    registry: StoreRegistry,
    suspensions: Suspensions,
    microtasks: MicrotaskQueue,
    /// Stores the bridge observes: initialized, or adopted by an update.
    known: Mutex<HashSet<String>>,
    /// Nesting of inbound handlers; deferred work runs when it drops to zero.
    inbound_depth: AtomicUsize,
    sink: Arc<dyn OutboundSink>,
    #[cfg(feature = "hmr")]
    document: Mutex<Option<SharedDocument>>,
}

impl BridgeController {
    pub fn new(config: BridgeConfig, sink: impl OutboundSink + 'static) -> Self {
        tracing::debug!(
            mode = ?config.mode,
            channel_prefix = %config.channel_prefix,
            "bridge controller created"
        );
        Self {
            inner: Arc::new(ControllerInner {
                config,
                registry: StoreRegistry::new(),
                suspensions: Suspensions::new(),
                microtasks: MicrotaskQueue::new(),
                known: Mutex::new(HashSet::new()),
                inbound_depth: AtomicUsize::new(0),
                sink: Arc::new(sink),
                #[cfg(feature = "hmr")]
                document: Mutex::new(None),
            }),
        }
    }

    fn from_weak(inner: &Weak<ControllerInner>) -> Option<Self> {
        inner.upgrade().map(|inner| Self { inner })
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.inner.config
    }

    pub fn registry(&self) -> &StoreRegistry {
        &self.inner.registry
    }

    /// Handle to a store, for local reads and writes.
    pub fn store(&self, store_id: &str) -> Option<ReactiveStore> {
        self.inner.registry.get(store_id)
    }

    pub fn microtasks(&self) -> &MicrotaskQueue {
        &self.inner.microtasks
    }

    /// Runs deferred work, releasing the suspensions of finished updates.
    ///
    /// Inbound handlers flush on their own when the outermost one returns;
    /// this is only needed for work queued outside of them.
    pub fn flush_microtasks(&self) -> usize {
        self.inner.microtasks.flush()
    }

    pub fn is_suspended(&self, store_id: &str) -> bool {
        self.inner.suspensions.is_suspended(store_id)
    }

    pub fn store_state(&self, store_id: &str) -> StoreState {
        if !self.inner.known.lock().contains(store_id) {
            StoreState::Uninitialized
        } else if self.is_suspended(store_id) {
            StoreState::Updating
        } else {
            StoreState::Initialized
        }
    }

    /// Sorted ids of the stores the bridge observes.
    pub fn known_stores(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.inner.known.lock().iter().cloned().collect();
        ids.sort();
        ids
    }

    /// Observers registered on `store[key]`. The bridge keeps exactly one per
    /// observed key, even across re-initialization.
    pub fn observer_count(&self, store_id: &str, key: &str) -> usize {
        self.store(store_id)
            .map(|store| store.observer_count(key))
            .unwrap_or(0)
    }

    /// Routes one inbound message to its handler.
    ///
    /// A panic inside the handler (for example in a store observer) is
    /// contained and reported as [`BridgeError::SyncCallback`].
    pub fn dispatch(&self, message: InboundMessage) -> Result<(), BridgeError> {
        let store_id = message.store_id().map(str::to_string);
        self.inbound(|| {
            match panic::catch_unwind(AssertUnwindSafe(|| self.route(message))) {
                Ok(result) => result,
                Err(payload) => Err(BridgeError::SyncCallback {
                    store_id,
                    message: panic_message(payload.as_ref()),
                }),
            }
        })
    }

    /// Runs several inbound operations as one synchronization cycle.
    ///
    /// Suspensions taken inside `f` are released together once it returns,
    /// so overlapping updates of the same store stay suppressed until the
    /// last of them has finished.
    pub fn batch<T>(&self, f: impl FnOnce(&Self) -> T) -> T {
        self.inbound(|| f(self))
    }

    /// Runs `f` as an inbound handler. The outermost handler flushes the
    /// microtask queue on exit, unwinding included, so no suspension
    /// outlives the call that took it.
    fn inbound<T>(&self, f: impl FnOnce() -> T) -> T {
        self.inner.inbound_depth.fetch_add(1, Ordering::SeqCst);
        let _exit = scopeguard::guard(&self.inner, |inner| {
            if inner.inbound_depth.fetch_sub(1, Ordering::SeqCst) == 1 {
                let released = inner.microtasks.flush();
                tracing::trace!(released, "inbound cycle finished");
            }
        });
        f()
    }

    fn route(&self, message: InboundMessage) -> Result<(), BridgeError> {
        match message {
            InboundMessage::StoreInit { store_id, data } => self.handle_init(&store_id, data),
            InboundMessage::StoreUpdate { store_id, data } => self.handle_update(&store_id, data),
            InboundMessage::HmrReload { html } => self.reload_document(&html),
        }
    }

    /// Creates (or fully replaces) a store and starts observing it.
    ///
    /// Observers from an earlier init of the same id are dropped first.
    /// Initialization itself sends nothing outbound.
    pub fn handle_init(&self, store_id: &str, data: StoreData) -> Result<(), BridgeError> {
        validate_store_id(store_id)?;

        let keys = data.len();
        let reinit = self.inner.registry.contains(store_id);
        let store = self.inner.registry.replace(store_id, data);
        self.install_observers(&store);
        self.inner.known.lock().insert(store_id.to_string());

        tracing::info!(store_id, keys, reinit, "store initialized");
        Ok(())
    }

    /// Shallow-merges `data` into a store without echoing it back.
    ///
    /// The store stays suspended until the enclosing inbound cycle ends (this
    /// call, or the surrounding [`dispatch`](Self::dispatch) or
    /// [`batch`](Self::batch)), so every observer the merge triggers, directly
    /// or by cascade, is suppressed.
    ///
    /// A store that exists locally but was never initialized by the server is
    /// adopted: the bridge starts observing it and merges into it.
    pub fn handle_update(&self, store_id: &str, data: StoreData) -> Result<(), BridgeError> {
        self.inbound(|| self.merge_update(store_id, data))
    }

    fn merge_update(&self, store_id: &str, data: StoreData) -> Result<(), BridgeError> {
        validate_store_id(store_id)?;

        let Some(store) = self.inner.registry.get(store_id) else {
            return self.update_missing(store_id, data);
        };
        self.adopt(&store);

        let token = self.inner.suspensions.suspend(store_id);
        let microtasks = self.inner.microtasks.clone();
        // Queued on scope exit, unwinding included.
        let _release = scopeguard::guard(token, move |token| {
            microtasks.queue(move || token.release());
        });

        let changed = store.merge(&data);
        tracing::debug!(store_id, keys = data.len(), changed, "store updated");
        Ok(())
    }

    fn adopt(&self, store: &ReactiveStore) {
        let adopted = self.inner.known.lock().insert(store.id().to_string());
        if adopted {
            self.install_observers(store);
            tracing::debug!(store_id = store.id(), "adopted locally created store");
        }
    }

    fn update_missing(&self, store_id: &str, data: StoreData) -> Result<(), BridgeError> {
        match self.inner.config.mode {
            SyncMode::Strict => Err(BridgeError::StoreNotFound {
                store_id: store_id.to_string(),
            }),
            SyncMode::Lenient => {
                tracing::warn!(store_id, "update received before init, creating store");
                self.handle_init(store_id, data)
            }
        }
    }

    /// Sends a locally observed change to the store's outbound channel,
    /// unless the store is suspended by an inbound update.
    pub fn forward_change(&self, store_id: &str, key: &str, value: &Value) {
        if self.is_suspended(store_id) {
            tracing::trace!(store_id, key, "change suppressed during inbound update");
            return;
        }

        let change = OutboundChange {
            channel: self.inner.config.channel_for(store_id),
            store_id: store_id.to_string(),
            key: key.to_string(),
            value: value.clone(),
        };
        match self.inner.sink.send(change) {
            Ok(()) => tracing::trace!(store_id, key, "change forwarded"),
            Err(err) => tracing::warn!(store_id, key, error = %err, "failed to forward change"),
        }
    }

    fn install_observers(&self, store: &ReactiveStore) {
        for key in store.keys() {
            self.observe_key(store, &key);
        }

        let weak = Arc::downgrade(&self.inner);
        let store_id = store.id().to_string();
        store.observe_keys(Arc::new(move |key: &str, value: &Value| {
            let Some(controller) = BridgeController::from_weak(&weak) else {
                return;
            };
            if let Some(store) = controller.store(&store_id) {
                controller.observe_key(&store, key);
            }
            controller.forward_change(&store_id, key, value);
        }));
    }

    fn observe_key(&self, store: &ReactiveStore, key: &str) {
        let weak = Arc::downgrade(&self.inner);
        let store_id = store.id().to_string();
        let observed = key.to_string();
        store.observe(
            key,
            Arc::new(move |value: &Value| {
                if let Some(controller) = BridgeController::from_weak(&weak) {
                    controller.forward_change(&store_id, &observed, value);
                }
            }),
        );
    }

    /// Attaches the live document that hot reloads swap into.
    #[cfg(feature = "hmr")]
    pub fn attach_document(&self, document: SharedDocument) {
        *self.inner.document.lock() = Some(document);
    }

    /// Replaces the document body with the body of `html`, re-binds, and
    /// dispatches the configured completion event once.
    #[cfg(feature = "hmr")]
    pub fn handle_hmr(&self, html: &str) -> Result<(), BridgeError> {
        let document = self
            .inner
            .document
            .lock()
            .clone()
            .ok_or_else(|| BridgeError::SyncCallback {
                store_id: None,
                message: "no document attached".to_string(),
            })?;

        let mut document = document.lock();
        hmr::reload(&mut *document, html, &self.inner.config.hmr.completion_event).map_err(
            |err| BridgeError::SyncCallback {
                store_id: None,
                message: err.to_string(),
            },
        )?;
        tracing::info!("document hot reloaded");
        Ok(())
    }

    #[cfg(feature = "hmr")]
    fn reload_document(&self, html: &str) -> Result<(), BridgeError> {
        self.handle_hmr(html)
    }

    #[cfg(not(feature = "hmr"))]
    fn reload_document(&self, _html: &str) -> Result<(), BridgeError> {
        Err(BridgeError::HmrDisabled)
    }
}

fn validate_store_id(store_id: &str) -> Result<(), BridgeError> {
    if store_id.is_empty() {
        return Err(BridgeError::InvalidStoreId);
    }
    Ok(())
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "handler panicked".to_string()
    }
}
