use crate::core::cache::{Entry, KeyValueCollection};
use anyhow::Result;
use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::Mutex;
use tracing::debug;

/// In-memory collection, used when nothing needs to outlive the process.
#[derive(Default)]
pub struct MemoryCollection {
    inner: Mutex<BTreeMap<Vec<u8>, Vec<u8>>>,
}

impl MemoryCollection {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueCollection for MemoryCollection {
    async fn load_all(&self) -> Result<Vec<Entry>> {
        let inner = self.inner.lock().await;
        Ok(inner.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
    }

    async fn append_batch(&self, entries: Vec<Entry>) -> Result<()> {
        let mut inner = self.inner.lock().await;
        debug!(entries = entries.len(), "Memory collection APPEND");
        inner.extend(entries);
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        self.inner.lock().await.clear();
        debug!("Memory collection CLEAR");
        Ok(())
    }

    async fn len(&self) -> Result<usize> {
        Ok(self.inner.lock().await.len())
    }
}
