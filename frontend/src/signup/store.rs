//! Key-value persistence for the signup state.
//!
//! `KeyValueStore` is the raw string store: browser local storage on the
//! page, `MemoryStore` in tests. `JsonStore` layers JSON encoding on top and
//! absorbs every failure, because local storage is an optional capability of
//! the browser (private mode, quota, disabled cookies).

#[cfg(test)]
use std::collections::HashMap;

use log::warn;
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage is not available")]
    Unavailable,
    #[error("storage backend error: {0}")]
    Backend(String),
    #[error("failed to encode value: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("failed to decode value: {0}")]
    Decode(#[source] serde_json::Error),
}

pub trait KeyValueStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove_item(&mut self, key: &str) -> Result<(), StoreError>;
}

/// `window.localStorage`, looked up on every call so a store that disappears
/// mid-session is reported instead of cached.
#[derive(Clone, Copy, Debug, Default)]
pub struct LocalStorage;

impl LocalStorage {
    fn storage() -> Result<web_sys::Storage, StoreError> {
        let window = web_sys::window().ok_or(StoreError::Unavailable)?;
        match window.local_storage() {
            Ok(Some(storage)) => Ok(storage),
            Ok(None) => Err(StoreError::Unavailable),
            Err(e) => Err(StoreError::Backend(format!("{:?}", e))),
        }
    }
}

impl KeyValueStore for LocalStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StoreError> {
        Self::storage()?
            .get_item(key)
            .map_err(|e| StoreError::Backend(format!("{:?}", e)))
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        Self::storage()?
            .set_item(key, value)
            .map_err(|e| StoreError::Backend(format!("{:?}", e)))
    }

    fn remove_item(&mut self, key: &str) -> Result<(), StoreError> {
        Self::storage()?
            .remove_item(key)
            .map_err(|e| StoreError::Backend(format!("{:?}", e)))
    }
}

/// In-process store. `unavailable()` builds one that fails every call.
#[cfg(test)]
#[derive(Clone, Debug)]
pub struct MemoryStore {
    items: HashMap<String, String>,
    available: bool,
}

#[cfg(test)]
impl MemoryStore {
    pub fn new() -> Self {
        Self {
            items: HashMap::new(),
            available: true,
        }
    }

    pub fn unavailable() -> Self {
        Self {
            items: HashMap::new(),
            available: false,
        }
    }

    pub fn with_item(mut self, key: &str, value: &str) -> Self {
        self.items.insert(key.to_string(), value.to_string());
        self
    }

    pub fn raw(&self, key: &str) -> Option<&str> {
        self.items.get(key).map(String::as_str)
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.available {
            Ok(())
        } else {
            Err(StoreError::Unavailable)
        }
    }
}

#[cfg(test)]
impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
impl KeyValueStore for MemoryStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.check()?;
        Ok(self.items.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.check()?;
        self.items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> Result<(), StoreError> {
        self.check()?;
        self.items.remove(key);
        Ok(())
    }
}

/// JSON adapter over a raw store. None of its operations fail: problems are
/// logged and the call degrades to a no-op or the caller's default.
#[derive(Clone, Debug)]
pub struct JsonStore<S> {
    backend: S,
}

impl<S: KeyValueStore> JsonStore<S> {
    pub fn new(backend: S) -> Self {
        Self { backend }
    }

    #[cfg(test)]
    pub fn backend(&self) -> &S {
        &self.backend
    }

    #[cfg(test)]
    pub fn into_backend(self) -> S {
        self.backend
    }

    /// Returns whether the value actually reached the store.
    pub fn set<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) -> bool {
        let result = serde_json::to_string(value)
            .map_err(StoreError::Encode)
            .and_then(|encoded| self.backend.set_item(key, &encoded));
        match result {
            Ok(()) => true,
            Err(e) => {
                warn!("Could not save {} to local storage: {}", key, e);
                false
            }
        }
    }

    /// `None` when the key is absent, malformed, or the store is unavailable.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.backend.get_item(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!("Could not read {} from local storage: {}", key, e);
                return None;
            }
        };
        match serde_json::from_str(&raw).map_err(StoreError::Decode) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Ignoring stored {}: {}", key, e);
                None
            }
        }
    }

    pub fn get_or<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        self.get(key).unwrap_or(default)
    }

    pub fn remove(&mut self, key: &str) {
        if let Err(e) = self.backend.remove_item(key) {
            warn!("Could not remove {} from local storage: {}", key, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stored_values_read_back() {
        let mut store = JsonStore::new(MemoryStore::new());
        assert!(store.set("slots", &vec![1u32, 2, 3]));
        assert_eq!(store.get::<Vec<u32>>("slots"), Some(vec![1, 2, 3]));
        assert_eq!(store.backend().raw("slots"), Some("[1,2,3]"));
    }

    #[test]
    fn malformed_entry_yields_default() {
        let store = JsonStore::new(MemoryStore::new().with_item("count", "{not json"));
        assert_eq!(store.get::<u64>("count"), None);
        assert_eq!(store.get_or("count", 47u64), 47);
    }

    #[test]
    fn missing_entry_yields_default() {
        let store = JsonStore::new(MemoryStore::new());
        assert_eq!(store.get_or("nothing", String::from("fallback")), "fallback");
    }

    #[test]
    fn unavailable_store_never_fails_the_caller() {
        let mut store = JsonStore::new(MemoryStore::unavailable());
        assert!(!store.set("count", &5u64));
        assert_eq!(store.get_or("count", 7u64), 7);
        store.remove("count");
    }

    #[test]
    fn remove_deletes_entry() {
        let mut store = JsonStore::new(MemoryStore::new());
        store.set("count", &1u64);
        store.remove("count");
        assert_eq!(store.backend().raw("count"), None);
    }
}
