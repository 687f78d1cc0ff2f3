use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use super::reactive::{KeySetObserver, ObserverId, ReactiveStore, ValueObserver};
use super::StoreData;

/// Named stores for one bridge instance.
///
/// The registry lock is only held to look a store up; store mutations and
/// observer callbacks run after it is released.
#[derive(Clone, Default)]
pub struct StoreRegistry {
    stores: Arc<Mutex<HashMap<String, ReactiveStore>>>,
}

impl StoreRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the existing store, or creates one holding `initial`.
    ///
    /// `initial` is ignored when the store already exists.
    pub fn get_or_create(&self, store_id: &str, initial: StoreData) -> ReactiveStore {
        self.stores
            .lock()
            .entry(store_id.to_string())
            .or_insert_with(|| ReactiveStore::new(store_id, initial))
            .clone()
    }

    pub fn get(&self, store_id: &str) -> Option<ReactiveStore> {
        self.stores.lock().get(store_id).cloned()
    }

    pub fn contains(&self, store_id: &str) -> bool {
        self.stores.lock().contains_key(store_id)
    }

    /// Sorted ids of every registered store.
    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.stores.lock().keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Creates the store, or resets an existing one to `data` with no
    /// observers left. Handles held elsewhere see the new state.
    pub fn replace(&self, store_id: &str, data: StoreData) -> ReactiveStore {
        let existing = self.get(store_id);
        match existing {
            Some(store) => {
                store.reset(data);
                store
            }
            None => self.get_or_create(store_id, data),
        }
    }

    /// Registers `callback` for `store[key]`. `None` if the store is unknown.
    pub fn observe(
        &self,
        store_id: &str,
        key: &str,
        callback: ValueObserver,
    ) -> Option<ObserverId> {
        self.get(store_id).map(|store| store.observe(key, callback))
    }

    /// Registers a key-set observer. `None` if the store is unknown.
    pub fn observe_keys(&self, store_id: &str, callback: KeySetObserver) -> Option<ObserverId> {
        self.get(store_id).map(|store| store.observe_keys(callback))
    }

    /// Writes every key of `partial` onto the store.
    ///
    /// Keys are applied in map order; payloads are expected not to depend on
    /// cross-key ordering. Returns the number of changed keys, or `None` if
    /// the store is unknown.
    pub fn apply_merge(&self, store_id: &str, partial: &StoreData) -> Option<usize> {
        let store = self.get(store_id)?;
        Some(store.merge(partial))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn data(value: Value) -> StoreData {
        match value {
            Value::Object(map) => map,
            _ => panic!("test data must be an object"),
        }
    }

    #[test]
    fn get_or_create_keeps_existing_state() {
        let registry = StoreRegistry::new();
        registry.get_or_create("cart", data(json!({"items": 1})));
        let store = registry.get_or_create("cart", data(json!({"items": 99})));

        assert_eq!(store.get("items"), Some(json!(1)));
        assert_eq!(registry.ids(), vec!["cart".to_string()]);
    }

    #[test]
    fn get_unknown_store_is_none() {
        let registry = StoreRegistry::new();
        assert!(registry.get("missing").is_none());
        assert!(registry.apply_merge("missing", &data(json!({"a": 1}))).is_none());
        assert!(registry
            .observe("missing", "a", Arc::new(|_: &Value| {}))
            .is_none());
    }

    #[test]
    fn replace_resets_shared_handles() {
        let registry = StoreRegistry::new();
        let handle = registry.get_or_create("s", data(json!({"a": 1, "b": 2})));
        registry.replace("s", data(json!({"c": 3})));

        assert_eq!(handle.snapshot(), data(json!({"c": 3})));
    }

    #[test]
    fn apply_merge_runs_observers_synchronously() {
        let registry = StoreRegistry::new();
        registry.get_or_create("s", data(json!({"a": 1})));
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        registry.observe("s", "a", Arc::new(move |value: &Value| sink.lock().push(value.clone())));

        let changed = registry.apply_merge("s", &data(json!({"a": 2, "b": 3})));

        assert_eq!(changed, Some(2));
        assert_eq!(*seen.lock(), vec![json!(2)]);
    }
}
