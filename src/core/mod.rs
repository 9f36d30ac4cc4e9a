//! Scoring engine, enrichment cache, and the run that ties them together

pub mod cache;
pub mod career;
pub mod classifier;
pub mod config;
pub mod log;
pub mod orchestrator;
pub mod output;
pub mod performance;
pub mod stats;
pub mod synthesis;

// Re-export main types for cleaner imports
pub use cache::{EnrichmentCache, KeyValueCollection};
pub use career::{BioEnricher, CareerRecord, DetailLookup};
pub use classifier::{AssetClassifier, ClassificationResult};
pub use orchestrator::{RunOrchestrator, RunSummary};
pub use output::{OutputSink, RankingRow};
pub use stats::{SeasonStatLine, StatFeed};
