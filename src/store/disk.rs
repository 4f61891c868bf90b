use crate::store::KeyValueCollection;
use anyhow::Result;
use fjall::{Keyspace, PartitionHandle, PersistMode};
use std::sync::Arc;
use tracing::debug;

/// A collection stored in a `fjall` partition. Every write is synced to the
/// journal before returning.
pub struct DiskCollection {
    keyspace: Arc<Keyspace>,
    partition: PartitionHandle,
}

impl DiskCollection {
    pub fn new(keyspace: Arc<Keyspace>, partition: PartitionHandle) -> Self {
        Self {
            keyspace,
            partition,
        }
    }

    fn persist(&self) -> Result<()> {
        self.keyspace.persist(PersistMode::SyncAll)?;
        Ok(())
    }
}

impl KeyValueCollection for DiskCollection {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let value = self.partition.get(key)?.map(|slice| slice.to_vec());
        debug!(key, hit = value.is_some(), "Disk GET");
        Ok(value)
    }

    fn put(&self, key: &str, value: &[u8]) -> Result<()> {
        self.partition.insert(key, value)?;
        self.persist()?;
        debug!(key, bytes = value.len(), "Disk PUT");
        Ok(())
    }
}
