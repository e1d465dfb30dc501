use std::sync::Mutex;

use fx_core::RawAssignments;

use crate::traits::Storage;
use crate::StorageError;

/// In-memory storage for tests. Not durable.
#[derive(Default)]
pub struct InMemoryStorage {
    inner: Mutex<Option<RawAssignments>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_assignments(raw: RawAssignments) -> Self {
        Self { inner: Mutex::new(Some(raw)) }
    }
}

impl Storage for InMemoryStorage {
    fn load_assignments(&self) -> anyhow::Result<Option<RawAssignments>> {
        let inner = self.inner.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(inner.clone())
    }

    fn save_assignments(&self, raw: &RawAssignments) -> anyhow::Result<()> {
        let mut inner = self.inner.lock().map_err(|_| StorageError::Poisoned)?;
        *inner = Some(raw.clone());
        Ok(())
    }

    fn clear_assignments(&self) -> anyhow::Result<()> {
        let mut inner = self.inner.lock().map_err(|_| StorageError::Poisoned)?;
        *inner = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use fx_core::Timestamp;

    fn raw(experiment: &str, name: Option<&str>, ttl: i64) -> RawAssignments {
        let mut variations = BTreeMap::new();
        variations.insert(experiment.to_string(), name.map(str::to_string));
        RawAssignments::new(variations, ttl, Timestamp(1000))
    }

    #[test]
    fn test_new_creates_empty_storage() {
        let storage = InMemoryStorage::new();
        assert!(storage.load_assignments().unwrap().is_none());
    }

    #[test]
    fn test_save_and_load() {
        let storage = InMemoryStorage::new();
        let r = raw("exp_a", Some("t1"), 60);
        storage.save_assignments(&r).unwrap();
        assert_eq!(storage.load_assignments().unwrap(), Some(r));
    }

    #[test]
    fn test_save_replaces_previous_snapshot() {
        let storage = InMemoryStorage::with_assignments(raw("old", Some("t1"), 60));
        storage.save_assignments(&raw("new", None, 30)).unwrap();
        let loaded = storage.load_assignments().unwrap().unwrap();
        assert!(!loaded.variations.contains_key("old"));
        assert_eq!(loaded.variations.get("new"), Some(&None));
        assert_eq!(loaded.ttl, 30);
    }

    #[test]
    fn test_clear() {
        let storage = InMemoryStorage::with_assignments(raw("exp_a", None, 60));
        storage.clear_assignments().unwrap();
        assert!(storage.load_assignments().unwrap().is_none());
        // clearing an empty store is fine
        storage.clear_assignments().unwrap();
    }
}
