use std::collections::HashMap;

use parking_lot::RwLock;

use super::{KvStore, StoreError, StoreKey, StoreResult};

/// In-memory store for tests. Same trimming and not-found rules as [`super::FileStore`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    data: RwLock<HashMap<StoreKey, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.data.read().len()
    }
}

impl KvStore for MemoryStore {
    fn get(&self, key: &StoreKey) -> StoreResult<String> {
        self.data
            .read()
            .get(key)
            .map(|v| v.trim().to_string())
            .ok_or_else(|| StoreError::NotFound(key.to_string()))
    }

    fn set(&self, key: &StoreKey, value: &str) -> StoreResult<()> {
        self.data.write().insert(key.clone(), value.to_string());
        Ok(())
    }
}
