use crate::store::KeyValueCollection;
use anyhow::{Result, anyhow};
use std::collections::HashMap;
use std::sync::RwLock;
use tracing::debug;

/// In-memory collection implementation using HashMap and RwLock
#[derive(Default)]
pub struct MemoryCollection {
    inner: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryCollection {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueCollection for MemoryCollection {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let map = self.inner.read().map_err(|_| anyhow!("Lock poisoned"))?;
        let value = map.get(key).cloned();
        debug!(key, hit = value.is_some(), "Memory GET");
        Ok(value)
    }

    fn put(&self, key: &str, value: &[u8]) -> Result<()> {
        let mut map = self.inner.write().map_err(|_| anyhow!("Lock poisoned"))?;
        debug!(key, bytes = value.len(), "Memory PUT");
        map.insert(key.to_string(), value.to_vec());
        Ok(())
    }
}
