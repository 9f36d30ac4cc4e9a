use super::ui;
use crate::core::cache::{EnrichmentCache, KeyValueCollection};
use anyhow::Result;

/// Drops every cached career record so the next run re-enriches all players.
pub async fn clear(collection: &dyn KeyValueCollection) -> Result<()> {
    let removed = EnrichmentCache::clear(collection).await?;
    println!(
        "{} {removed} cached career records",
        ui::style_text("Cleared", ui::StyleType::TotalLabel)
    );
    Ok(())
}
