use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use crate::{error::PersistenceError, transfer::ExportDocument};

/// Key under which a scratch value is written to probe availability.
const PROBE_KEY: &str = "storage_probe";

/// Abstraction over synchronous string key-value backends. The store writes
/// its full serialized state through this interface after every mutation and
/// reads it back once at startup.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError>;
    fn set(&self, key: &str, value: &str) -> Result<(), PersistenceError>;
    fn remove(&self, key: &str) -> Result<(), PersistenceError>;

    /// Probes whether the backend currently accepts writes by writing and
    /// removing a scratch key.
    fn is_available(&self) -> bool {
        self.set(PROBE_KEY, "probe")
            .and_then(|_| self.remove(PROBE_KEY))
            .is_ok()
    }
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Arc<T> {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), PersistenceError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), PersistenceError> {
        (**self).remove(key)
    }

    fn is_available(&self) -> bool {
        (**self).is_available()
    }
}

/// Receives export documents from the periodic backup task and from
/// user-triggered exports.
pub trait ExportSink: Send + Sync {
    fn write_export(&self, document: &ExportDocument) -> Result<(), PersistenceError>;
}

/// In-memory key-value backend. Reference implementation and test double;
/// writes can be made to fail to exercise durability error paths.
#[derive(Debug, Default)]
pub struct MemoryKeyValueStore {
    entries: Mutex<HashMap<String, String>>,
    fail_writes: Mutex<bool>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// When `fail` is set, subsequent `set` calls error like a full or
    /// unavailable backend.
    pub fn fail_writes(&self, fail: bool) {
        if let Ok(mut flag) = self.fail_writes.lock() {
            *flag = fail;
        }
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        Ok(self
            .entries
            .lock()
            .map_err(|_| PersistenceError::Corrupt("storage lock poisoned".into()))?
            .get(key)
            .cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), PersistenceError> {
        if *self
            .fail_writes
            .lock()
            .map_err(|_| PersistenceError::WriteFailed("storage lock poisoned".into()))?
        {
            return Err(PersistenceError::WriteFailed("storage unavailable".into()));
        }
        self.entries
            .lock()
            .map_err(|_| PersistenceError::WriteFailed("storage lock poisoned".into()))?
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), PersistenceError> {
        self.entries
            .lock()
            .map_err(|_| PersistenceError::WriteFailed("storage lock poisoned".into()))?
            .remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_round_trips_values() {
        let store = MemoryKeyValueStore::new();
        assert_eq!(store.get("missing").unwrap(), None);

        store.set("driving_log", "{}").unwrap();
        assert_eq!(store.get("driving_log").unwrap().as_deref(), Some("{}"));

        store.remove("driving_log").unwrap();
        assert_eq!(store.get("driving_log").unwrap(), None);
    }

    #[test]
    fn availability_probe_reflects_write_failures() {
        let store = MemoryKeyValueStore::new();
        assert!(store.is_available());

        store.fail_writes(true);
        assert!(!store.is_available());
        assert!(matches!(
            store.set("key", "value").unwrap_err(),
            PersistenceError::WriteFailed(_)
        ));
    }
}
