pub mod cli;
pub mod core;
pub mod providers;
pub mod store;

use crate::cli::rankings::OutputFormat;
use crate::core::config::AppConfig;
use crate::core::{AssetClassifier, BioEnricher, EnrichmentCache, RunOrchestrator};
use crate::providers::nhl_players::NhlPlayerProvider;
use crate::providers::nhl_stats::NhlStatsProvider;
use crate::store::KeyValueStore;
use anyhow::Result;
use tracing::{debug, info};

/// Collection holding cached career records.
pub const CAREER_COLLECTION: &str = "career";

pub enum AppCommand {
    Run { format: OutputFormat },
    ClearCache,
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("rinkscout starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let store = KeyValueStore::open(&config.default_data_path()?)?;
    let collection = store.collection(CAREER_COLLECTION)?;

    match command {
        AppCommand::Run { format } => {
            let mut cache = EnrichmentCache::load(collection).await?;
            let feed = NhlStatsProvider::new(&config.providers.stats.base_url)?;
            let lookup = NhlPlayerProvider::new(&config.providers.players.base_url)?;
            let classifier = AssetClassifier::new(&config.reference, config.rookie_draft_year);
            let today = chrono::Local::now().date_naive();
            let orchestrator = RunOrchestrator::new(
                &feed,
                BioEnricher::new(&lookup, &config.leagues, today),
                &classifier,
                config.signal,
                config.run.batch_size,
            );

            cli::rankings::run(
                &orchestrator,
                &config.season,
                &mut cache,
                format,
                config.run.time_budget(),
            )
            .await
        }
        AppCommand::ClearCache => cli::cache::clear(collection.as_ref()).await,
    }
}
