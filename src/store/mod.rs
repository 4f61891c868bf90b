pub mod disk;
pub mod memory;
pub mod records;
pub mod subscriptions;

use anyhow::{Context, Result, anyhow};
use disk::DiskCollection;
use fjall::{Keyspace, PartitionCreateOptions};
use memory::MemoryCollection;
use std::{
    collections::HashMap,
    path::Path,
    sync::{Arc, RwLock},
};
use tracing::debug;

pub use records::{NewSubscription, SubscriptionPatch};
pub use subscriptions::{Snapshot, SubscriptionStore};

/// A named bucket of byte values.
pub trait KeyValueCollection: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;
    fn put(&self, key: &str, value: &[u8]) -> Result<()>;
}

/// A thread-safe key-value store that can hold multiple collections.
///
/// Collections are backed by `fjall` partitions when the store was opened on
/// disk, and by in-memory maps otherwise.
pub struct KeyValueStore {
    collections: RwLock<HashMap<String, Arc<dyn KeyValueCollection>>>,
    keyspace: Option<Arc<Keyspace>>,
}

impl KeyValueStore {
    pub fn open(path: &Path) -> Result<Self> {
        std::fs::create_dir_all(path)
            .with_context(|| format!("Failed to create data directory: {}", path.display()))?;
        let keyspace = fjall::Config::new(path)
            .open()
            .with_context(|| format!("Failed to open data store at {}", path.display()))?;
        debug!("Opened data store at {}", path.display());

        Ok(Self {
            collections: RwLock::new(HashMap::new()),
            keyspace: Some(Arc::new(keyspace)),
        })
    }

    pub fn in_memory() -> Self {
        Self {
            collections: RwLock::new(HashMap::new()),
            keyspace: None,
        }
    }

    pub fn is_persistent(&self) -> bool {
        self.keyspace.is_some()
    }

    /// Returns the collection called `name`, creating it on first use.
    pub fn collection(&self, name: &str) -> Result<Arc<dyn KeyValueCollection>> {
        if let Some(existing) = self
            .collections
            .read()
            .map_err(|_| anyhow!("Collection registry lock poisoned"))?
            .get(name)
        {
            return Ok(Arc::clone(existing));
        }

        let mut collections = self
            .collections
            .write()
            .map_err(|_| anyhow!("Collection registry lock poisoned"))?;
        if let Some(existing) = collections.get(name) {
            return Ok(Arc::clone(existing));
        }

        let collection: Arc<dyn KeyValueCollection> = match &self.keyspace {
            Some(keyspace) => {
                let partition = keyspace
                    .open_partition(name, PartitionCreateOptions::default())
                    .with_context(|| format!("Failed to open collection: {name}"))?;
                Arc::new(DiskCollection::new(Arc::clone(keyspace), partition))
            }
            None => Arc::new(MemoryCollection::new()),
        };
        debug!("Created collection {name}");
        collections.insert(name.to_string(), Arc::clone(&collection));
        Ok(collection)
    }
}

impl Default for KeyValueStore {
    fn default() -> Self {
        Self::in_memory()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_in_memory_collections_are_shared_by_name() -> Result<()> {
        let store = KeyValueStore::in_memory();
        assert!(!store.is_persistent());

        let first = store.collection("subtrack")?;
        first.put("key", b"value")?;

        let second = store.collection("subtrack")?;
        assert_eq!(second.get("key")?, Some(b"value".to_vec()));

        let other = store.collection("other")?;
        assert_eq!(other.get("key")?, None);
        Ok(())
    }

    #[test]
    fn test_disk_collections_survive_reopen() -> Result<()> {
        let dir = tempdir()?;
        {
            let store = KeyValueStore::open(dir.path())?;
            assert!(store.is_persistent());
            store.collection("subtrack")?.put("key", b"persisted")?;
        }

        let store = KeyValueStore::open(dir.path())?;
        assert_eq!(
            store.collection("subtrack")?.get("key")?,
            Some(b"persisted".to_vec())
        );
        Ok(())
    }
}
