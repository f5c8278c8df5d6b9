use std::collections::HashMap;
use std::sync::Mutex;

use crate::error::{AyumiError, Result};
use crate::storage::StorageBackend;

/// In-memory storage. Nothing survives the process; used by tests and
/// throwaway runs.
#[derive(Default)]
pub struct MemoryStorage {
    slots: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageBackend for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let slots = self
            .slots
            .lock()
            .map_err(|e| AyumiError::Storage(format!("failed to acquire slot lock: {e}")))?;
        Ok(slots.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut slots = self
            .slots
            .lock()
            .map_err(|e| AyumiError::Storage(format!("failed to acquire slot lock: {e}")))?;
        slots.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_key_reads_as_none() {
        let storage = MemoryStorage::new();
        assert!(storage.get("childcare-episodes").unwrap().is_none());
    }

    #[test]
    fn set_then_get_roundtrip() {
        let storage = MemoryStorage::new();
        storage.set("childcare-episodes", "[1,2,3]").unwrap();
        assert_eq!(
            storage.get("childcare-episodes").unwrap().as_deref(),
            Some("[1,2,3]")
        );
    }
}
