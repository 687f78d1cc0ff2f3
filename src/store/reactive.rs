//! A named key/value store with per-key and key-set observers.
//!
//! # Invariants
//!
//! 1. Writing a value equal to the current one is a no-op: no observer runs.
//! 2. Observers run synchronously, in registration order, after the write is
//!    visible through [`ReactiveStore::get`].
//! 3. Observers run outside the store lock, so a callback may read or write
//!    the same store.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::Value;
use uuid::Uuid;

use super::StoreData;

/// Runs with the new value of one observed key.
pub type ValueObserver = Arc<dyn Fn(&Value) + Send + Sync>;

/// Runs with the key and initial value of every key added to a store.
pub type KeySetObserver = Arc<dyn Fn(&str, &Value) + Send + Sync>;

/// Identifies a registered observer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(Uuid);

impl ObserverId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ObserverId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Shared handle to one store. Clones point at the same data.
#[derive(Clone)]
pub struct ReactiveStore {
    id: Arc<str>,
    inner: Arc<Mutex<StoreInner>>,
}

#[derive(Default)]
struct StoreInner {
    values: StoreData,
    observers: HashMap<String, Vec<(ObserverId, ValueObserver)>>,
    key_observers: Vec<(ObserverId, KeySetObserver)>,
}

impl ReactiveStore {
    pub fn new(id: &str, initial: StoreData) -> Self {
        Self {
            id: Arc::from(id),
            inner: Arc::new(Mutex::new(StoreInner {
                values: initial,
                ..StoreInner::default()
            })),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.inner.lock().values.get(key).cloned()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.inner.lock().values.contains_key(key)
    }

    /// Current keys, in map order.
    pub fn keys(&self) -> Vec<String> {
        self.inner.lock().values.keys().cloned().collect()
    }

    /// Copy of the full current state.
    pub fn snapshot(&self) -> StoreData {
        self.inner.lock().values.clone()
    }

    /// Writes `value` under `key` and notifies observers if it changed.
    ///
    /// Returns `false` when the write was a no-op.
    pub fn set(&self, key: &str, value: Value) -> bool {
        let (key_observers, value_observers) = {
            let mut inner = self.inner.lock();
            let added = match inner.values.get(key) {
                Some(current) if *current == value => return false,
                Some(_) => false,
                None => true,
            };
            inner.values.insert(key.to_string(), value.clone());

            let key_observers: Vec<KeySetObserver> = if added {
                inner
                    .key_observers
                    .iter()
                    .map(|(_, callback)| Arc::clone(callback))
                    .collect()
            } else {
                Vec::new()
            };
            let value_observers: Vec<ValueObserver> = inner
                .observers
                .get(key)
                .map(|registered| {
                    registered
                        .iter()
                        .map(|(_, callback)| Arc::clone(callback))
                        .collect()
                })
                .unwrap_or_default();
            (key_observers, value_observers)
        };

        for callback in key_observers {
            callback(key, &value);
        }
        for callback in value_observers {
            callback(&value);
        }
        true
    }

    /// Shallow merge: every key in `partial` is written, others are untouched.
    ///
    /// Returns the number of keys whose value actually changed.
    pub fn merge(&self, partial: &StoreData) -> usize {
        let mut changed = 0;
        for (key, value) in partial {
            if self.set(key, value.clone()) {
                changed += 1;
            }
        }
        changed
    }

    /// Replaces the whole state and drops every registered observer.
    ///
    /// Nothing is notified: this starts a new observation session.
    pub fn reset(&self, data: StoreData) {
        let mut inner = self.inner.lock();
        inner.values = data;
        inner.observers.clear();
        inner.key_observers.clear();
    }

    /// Observes one key. The key does not need to exist yet.
    pub fn observe(&self, key: &str, callback: ValueObserver) -> ObserverId {
        let id = ObserverId::new();
        self.inner
            .lock()
            .observers
            .entry(key.to_string())
            .or_default()
            .push((id, callback));
        id
    }

    /// Observes additions to the key set.
    pub fn observe_keys(&self, callback: KeySetObserver) -> ObserverId {
        let id = ObserverId::new();
        self.inner.lock().key_observers.push((id, callback));
        id
    }

    /// Removes an observer. Returns `false` if it was not registered.
    pub fn unobserve(&self, id: ObserverId) -> bool {
        let mut inner = self.inner.lock();
        let before = inner.key_observers.len();
        inner.key_observers.retain(|(registered, _)| *registered != id);
        if inner.key_observers.len() != before {
            return true;
        }
        for registered in inner.observers.values_mut() {
            if let Some(position) = registered.iter().position(|(entry, _)| *entry == id) {
                registered.remove(position);
                return true;
            }
        }
        false
    }

    /// Number of observers registered for `key`.
    pub fn observer_count(&self, key: &str) -> usize {
        self.inner
            .lock()
            .observers
            .get(key)
            .map(Vec::len)
            .unwrap_or(0)
    }

    pub fn key_observer_count(&self) -> usize {
        self.inner.lock().key_observers.len()
    }
}

impl fmt::Debug for ReactiveStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReactiveStore")
            .field("id", &self.id)
            .field("values", &self.inner.lock().values)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn data(value: Value) -> StoreData {
        match value {
            Value::Object(map) => map,
            _ => panic!("test data must be an object"),
        }
    }

    fn recorder() -> (ValueObserver, Arc<Mutex<Vec<Value>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let callback: ValueObserver = Arc::new(move |value: &Value| sink.lock().push(value.clone()));
        (callback, seen)
    }

    #[test]
    fn set_notifies_key_observer() {
        let store = ReactiveStore::new("s", data(json!({"a": 1})));
        let (callback, seen) = recorder();
        store.observe("a", callback);

        assert!(store.set("a", json!(2)));
        assert_eq!(*seen.lock(), vec![json!(2)]);
        assert_eq!(store.get("a"), Some(json!(2)));
    }

    #[test]
    fn equal_write_is_noop() {
        let store = ReactiveStore::new("s", data(json!({"a": {"x": [1, 2]}})));
        let (callback, seen) = recorder();
        store.observe("a", callback);

        assert!(!store.set("a", json!({"x": [1, 2]})));
        assert!(seen.lock().is_empty());
    }

    #[test]
    fn merge_leaves_absent_keys_untouched() {
        let store = ReactiveStore::new("s", data(json!({"a": 1, "b": 2})));
        let changed = store.merge(&data(json!({"b": 3, "c": 4})));

        assert_eq!(changed, 2);
        assert_eq!(store.snapshot(), data(json!({"a": 1, "b": 3, "c": 4})));
    }

    #[test]
    fn key_set_observer_sees_only_new_keys() {
        let store = ReactiveStore::new("s", data(json!({"a": 1})));
        let added = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&added);
        store.observe_keys(Arc::new(move |key: &str, value: &Value| {
            sink.lock().push((key.to_string(), value.clone()));
        }));

        store.set("a", json!(5));
        store.set("b", json!(6));
        store.set("b", json!(7));

        assert_eq!(*added.lock(), vec![("b".to_string(), json!(6))]);
    }

    #[test]
    fn observer_may_write_back_into_store() {
        let store = ReactiveStore::new("s", data(json!({"a": 1, "double": 2})));
        let target = store.clone();
        store.observe(
            "a",
            Arc::new(move |value: &Value| {
                let doubled = value.as_i64().unwrap_or(0) * 2;
                target.set("double", json!(doubled));
            }),
        );

        store.set("a", json!(21));
        assert_eq!(store.get("double"), Some(json!(42)));
    }

    #[test]
    fn reset_drops_observers() {
        let store = ReactiveStore::new("s", data(json!({"a": 1})));
        let (callback, seen) = recorder();
        store.observe("a", callback);
        store.observe_keys(Arc::new(|_: &str, _: &Value| {}));

        store.reset(data(json!({"a": 9})));
        store.set("a", json!(10));

        assert!(seen.lock().is_empty());
        assert_eq!(store.observer_count("a"), 0);
        assert_eq!(store.key_observer_count(), 0);
    }

    #[test]
    fn unobserve_removes_callback() {
        let store = ReactiveStore::new("s", StoreData::new());
        let (callback, seen) = recorder();
        let id = store.observe("a", callback);

        assert!(store.unobserve(id));
        assert!(!store.unobserve(id));
        store.set("a", json!(1));
        assert!(seen.lock().is_empty());
    }
}
