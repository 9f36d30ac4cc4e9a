use crate::core::cache::{Entry, KeyValueCollection};
use anyhow::{Context, Result};
use async_trait::async_trait;
use fjall::{Keyspace, PartitionHandle, PersistMode};
use std::sync::Arc;
use tracing::debug;

/// Collection backed by a fjall partition.
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
}

#[async_trait]
impl KeyValueCollection for DiskCollection {
    async fn load_all(&self) -> Result<Vec<Entry>> {
        let mut entries = Vec::new();
        for item in self.partition.iter() {
            let (key, value) = item.context("Failed to read partition entry")?;
            entries.push((key.to_vec(), value.to_vec()));
        }
        debug!(entries = entries.len(), "Disk collection LOAD");
        Ok(entries)
    }

    async fn append_batch(&self, entries: Vec<Entry>) -> Result<()> {
        let count = entries.len();
        let mut batch = self.keyspace.batch();
        for (key, value) in entries {
            batch.insert(&self.partition, key, value);
        }
        batch.commit().context("Failed to commit batch")?;
        self.keyspace
            .persist(PersistMode::SyncAll)
            .context("Failed to persist keyspace")?;
        debug!(entries = count, "Disk collection APPEND");
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        let mut batch = self.keyspace.batch();
        for key in self.partition.keys() {
            let key = key.context("Failed to read partition key")?;
            batch.remove(&self.partition, key);
        }
        batch.commit().context("Failed to commit clear")?;
        self.keyspace
            .persist(PersistMode::SyncAll)
            .context("Failed to persist keyspace")?;
        debug!("Disk collection CLEAR");
        Ok(())
    }

    async fn len(&self) -> Result<usize> {
        self.partition
            .len()
            .context("Failed to count partition entries")
    }
}
