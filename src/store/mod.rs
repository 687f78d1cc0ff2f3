//! Store registry and reactive adapter.
//!
//! Keeps the bridge away from the details of how values are stored and
//! observed. Every store is a flat map of JSON values keyed by string.

mod reactive;
mod registry;

pub use reactive::{KeySetObserver, ObserverId, ReactiveStore, ValueObserver};
pub use registry::StoreRegistry;

/// Key/value payload of a store, as carried by init and update messages.
pub type StoreData = serde_json::Map<String, serde_json::Value>;
