pub mod disk;
pub mod memory;

use crate::core::cache::KeyValueCollection;
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

/// A key-value store that hands out named collections, persisted to a fjall
/// keyspace when one is open and held in memory otherwise.
pub struct KeyValueStore {
    collections: RwLock<HashMap<String, Arc<dyn KeyValueCollection>>>,
    keyspace: Option<Arc<Keyspace>>,
}

impl KeyValueStore {
    /// Opens (or creates) a persistent store under `data_path/cache`.
    pub fn open(data_path: &Path) -> Result<Self> {
        let cache_dir = data_path.join("cache");
        std::fs::create_dir_all(&cache_dir)
            .with_context(|| format!("Failed to create directory: {}", cache_dir.display()))?;
        let keyspace = fjall::Config::new(&cache_dir)
            .open()
            .with_context(|| format!("Failed to open store at {}", cache_dir.display()))?;
        debug!("Opened store at {}", cache_dir.display());

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

    pub fn collection(&self, name: &str) -> Result<Arc<dyn KeyValueCollection>> {
        if let Some(existing) = self
            .collections
            .read()
            .map_err(|_| anyhow!("Store lock poisoned"))?
            .get(name)
        {
            return Ok(Arc::clone(existing));
        }

        let mut collections = self
            .collections
            .write()
            .map_err(|_| anyhow!("Store lock poisoned"))?;
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
        collections.insert(name.to_string(), Arc::clone(&collection));
        Ok(collection)
    }
}
