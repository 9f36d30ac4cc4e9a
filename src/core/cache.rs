//! Persistent enrichment cache of career records keyed by player id

use crate::core::career::CareerRecord;
use crate::core::stats::PlayerId;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub type Entry = (Vec<u8>, Vec<u8>);

/// Key-value substrate the cache persists to. Supports a full load,
/// append-only batch writes, and a full clear.
#[async_trait]
pub trait KeyValueCollection: Send + Sync {
    async fn load_all(&self) -> Result<Vec<Entry>>;
    async fn append_batch(&self, entries: Vec<Entry>) -> Result<()>;
    async fn clear(&self) -> Result<()>;
    async fn len(&self) -> Result<usize>;
}

/// Career records loaded once per run. Misses inserted during the run are
/// kept pending until [`EnrichmentCache::flush`].
pub struct EnrichmentCache {
    collection: Arc<dyn KeyValueCollection>,
    records: HashMap<PlayerId, CareerRecord>,
    pending: Vec<PlayerId>,
}

impl EnrichmentCache {
    /// Loads every parseable entry; malformed entries are skipped so those
    /// players are re-enriched.
    pub async fn load(collection: Arc<dyn KeyValueCollection>) -> Result<Self> {
        let entries = collection
            .load_all()
            .await
            .context("Failed to load enrichment cache")?;

        let mut records = HashMap::with_capacity(entries.len());
        let mut skipped = 0usize;
        for (key, value) in entries {
            match decode(&key, &value) {
                Some((id, record)) => {
                    records.insert(id, record);
                }
                None => {
                    skipped += 1;
                    debug!(key = %String::from_utf8_lossy(&key), "Skipping malformed cache entry");
                }
            }
        }
        if skipped > 0 {
            warn!(skipped, "Ignored malformed cache entries");
        }
        info!(entries = records.len(), "Loaded enrichment cache");

        Ok(Self {
            collection,
            records,
            pending: Vec::new(),
        })
    }

    pub fn get(&self, id: PlayerId) -> Option<&CareerRecord> {
        let record = self.records.get(&id);
        if record.is_some() {
            debug!(player_id = id, "Cache HIT");
        } else {
            debug!(player_id = id, "Cache MISS");
        }
        record
    }

    pub fn insert(&mut self, id: PlayerId, record: CareerRecord) {
        debug!(player_id = id, "Cache PUT");
        if self.records.insert(id, record).is_none() {
            self.pending.push(id);
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Writes pending records to the collection in one batch.
    pub async fn flush(&mut self) -> Result<usize> {
        if self.pending.is_empty() {
            return Ok(0);
        }

        let mut batch = Vec::with_capacity(self.pending.len());
        for id in &self.pending {
            if let Some(record) = self.records.get(id) {
                let value = serde_json::to_vec(record)
                    .with_context(|| format!("Failed to serialize career record {id}"))?;
                batch.push((id.to_string().into_bytes(), value));
            }
        }

        let written = batch.len();
        self.collection
            .append_batch(batch)
            .await
            .context("Failed to persist enrichment cache")?;
        self.pending.clear();
        info!(written, "Persisted enrichment cache updates");
        Ok(written)
    }

    /// Drops every persisted entry.
    pub async fn clear(collection: &dyn KeyValueCollection) -> Result<usize> {
        let removed = collection.len().await?;
        collection
            .clear()
            .await
            .context("Failed to clear enrichment cache")?;
        info!(removed, "Cleared enrichment cache");
        Ok(removed)
    }
}

fn decode(key: &[u8], value: &[u8]) -> Option<(PlayerId, CareerRecord)> {
    let id = std::str::from_utf8(key).ok()?.parse::<PlayerId>().ok()?;
    let record = serde_json::from_slice::<CareerRecord>(value).ok()?;
    Some((id, record))
}
