//! Drives one full scoring pass: feeds, enrichment, dual scoring,
//! synthesis, batched output, cache persistence.

use crate::core::cache::EnrichmentCache;
use crate::core::career::BioEnricher;
use crate::core::classifier::AssetClassifier;
use crate::core::config::SignalThresholds;
use crate::core::output::{OutputSink, RankingRow};
use crate::core::performance::PerformanceModel;
use crate::core::stats::{SeasonStatLine, StatFeed, join_feeds};
use crate::core::synthesis::{PerformanceSignal, synthesize};
use std::time::Instant;
use tracing::{debug, info, warn};

/// What a pass did, for the operator's log line.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub candidates: usize,
    pub processed: usize,
    pub rows_written: usize,
    pub cache_hits: usize,
    pub lookups: usize,
    pub cache_written: usize,
    pub deadline_hit: bool,
}

pub struct RunOrchestrator<'a> {
    feed: &'a dyn StatFeed,
    enricher: BioEnricher<'a>,
    classifier: &'a AssetClassifier,
    model: PerformanceModel,
    thresholds: SignalThresholds,
    batch_size: usize,
}

impl<'a> RunOrchestrator<'a> {
    pub fn new(
        feed: &'a dyn StatFeed,
        enricher: BioEnricher<'a>,
        classifier: &'a AssetClassifier,
        thresholds: SignalThresholds,
        batch_size: usize,
    ) -> Self {
        Self {
            feed,
            enricher,
            classifier,
            model: PerformanceModel,
            thresholds,
            batch_size: batch_size.max(1),
        }
    }

    /// Pulls the three feeds and joins them. A failed feed counts as empty.
    /// Goaltenders and lines without games or points are dropped.
    pub async fn fetch_lines(&self, season: &str) -> Vec<SeasonStatLine> {
        info!(season, "Fetching stat feeds");
        let (summary, realtime, powerplay) = futures::join!(
            self.feed.summary(season),
            self.feed.realtime(season),
            self.feed.powerplay(season)
        );

        let summary = summary.unwrap_or_else(|e| {
            warn!(error = %e, "Summary feed unavailable");
            Vec::new()
        });
        let realtime = realtime.unwrap_or_else(|e| {
            warn!(error = %e, "Realtime feed unavailable");
            Vec::new()
        });
        let powerplay = powerplay.unwrap_or_else(|e| {
            warn!(error = %e, "Power-play feed unavailable");
            Vec::new()
        });

        let lines: Vec<_> = join_feeds(summary, realtime, powerplay)
            .into_iter()
            .filter(|line| !line.is_goalie() && !line.is_empty())
            .collect();
        info!(players = lines.len(), "Joined stat feeds");
        lines
    }

    /// Scores each line in order until `deadline`. Rows produced before the
    /// deadline are always flushed, and new cache entries are persisted.
    pub async fn score_lines(
        &self,
        lines: &[SeasonStatLine],
        cache: &mut EnrichmentCache,
        sink: &mut dyn OutputSink,
        deadline: Instant,
        on_progress: &dyn Fn(),
    ) -> RunSummary {
        let mut summary = RunSummary {
            candidates: lines.len(),
            ..Default::default()
        };

        if let Err(e) = sink.clear() {
            warn!(error = %e, "Failed to clear output rows");
        }

        let mut batch = Vec::with_capacity(self.batch_size);
        for line in lines {
            if Instant::now() >= deadline {
                info!(
                    processed = summary.processed,
                    remaining = lines.len() - summary.processed,
                    "Time budget reached, stopping early"
                );
                summary.deadline_hit = true;
                break;
            }

            let career = match cache.get(line.player_id) {
                Some(record) => {
                    summary.cache_hits += 1;
                    record.clone()
                }
                None => {
                    summary.lookups += 1;
                    let record = self.enricher.enrich(line.player_id).await;
                    cache.insert(line.player_id, record.clone());
                    record
                }
            };

            let hobby = self.classifier.classify(line, &career);
            let math = PerformanceSignal::evaluate(&self.model, line, &career, &self.thresholds);
            let verdict = synthesize(&hobby, math.signal);
            debug!(
                player = %line.name,
                score = hobby.score,
                tier = %hobby.tier,
                signal = %math.signal,
                verdict = %verdict.label,
                "Scored player"
            );

            batch.push(RankingRow::new(line, &career, &hobby, &math, verdict));
            summary.processed += 1;
            on_progress();

            if batch.len() >= self.batch_size {
                summary.rows_written += write_batch(sink, &mut batch);
            }
        }
        summary.rows_written += write_batch(sink, &mut batch);

        match cache.flush().await {
            Ok(written) => summary.cache_written = written,
            Err(e) => warn!(error = %e, "Failed to persist cache updates"),
        }

        info!(
            processed = summary.processed,
            rows = summary.rows_written,
            cache_hits = summary.cache_hits,
            lookups = summary.lookups,
            "Run complete"
        );
        summary
    }

    pub async fn run(
        &self,
        season: &str,
        cache: &mut EnrichmentCache,
        sink: &mut dyn OutputSink,
        deadline: Instant,
    ) -> RunSummary {
        let lines = self.fetch_lines(season).await;
        self.score_lines(&lines, cache, sink, deadline, &|| {}).await
    }
}

fn write_batch(sink: &mut dyn OutputSink, batch: &mut Vec<RankingRow>) -> usize {
    if batch.is_empty() {
        return 0;
    }
    let written = match sink.append(batch) {
        Ok(()) => batch.len(),
        Err(e) => {
            warn!(error = %e, rows = batch.len(), "Failed to write output batch");
            0
        }
    };
    batch.clear();
    written
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::cache::KeyValueCollection;
    use crate::core::career::{DetailLookup, DraftDetails, PlayerDetail, SeasonTotal};
    use crate::core::classifier::{Flag, Tier};
    use crate::core::config::{ReferenceLists, default_league_factors};
    use crate::core::output::MemorySink;
    use crate::core::stats::{PlayerId, PowerPlayRow, RealtimeRow, SummaryRow};
    use crate::core::synthesis::{Signal, VerdictLabel};
    use crate::store::memory::MemoryCollection;
    use anyhow::{Result, anyhow};
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct FakeFeed {
        summary: Vec<SummaryRow>,
        fail_supplemental: bool,
    }

    #[async_trait]
    impl StatFeed for FakeFeed {
        async fn summary(&self, _season: &str) -> Result<Vec<SummaryRow>> {
            Ok(self.summary.clone())
        }

        async fn realtime(&self, _season: &str) -> Result<Vec<RealtimeRow>> {
            if self.fail_supplemental {
                return Err(anyhow!("realtime down"));
            }
            Ok(vec![RealtimeRow {
                player_id: 1,
                blocked_shots: 10,
                takeaways: 5,
                giveaways: 3,
            }])
        }

        async fn powerplay(&self, _season: &str) -> Result<Vec<PowerPlayRow>> {
            if self.fail_supplemental {
                return Err(anyhow!("powerplay down"));
            }
            Ok(vec![PowerPlayRow {
                player_id: 1,
                pp_points: 4,
            }])
        }
    }

    struct CountingLookup {
        calls: AtomicUsize,
        details: HashMap<PlayerId, PlayerDetail>,
    }

    #[async_trait]
    impl DetailLookup for CountingLookup {
        async fn fetch_detail(&self, player_id: PlayerId) -> Result<PlayerDetail> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.details
                .get(&player_id)
                .cloned()
                .ok_or_else(|| anyhow!("no such player"))
        }
    }

    fn summary_row(id: PlayerId, name: &str, position: &str, gp: u32, goals: u32, assists: u32) -> SummaryRow {
        SummaryRow {
            player_id: id,
            skater_full_name: name.to_string(),
            team_abbrevs: "CBJ".to_string(),
            position_code: position.to_string(),
            games_played: gp,
            goals,
            assists,
            points: goals + assists,
            plus_minus: 0,
        }
    }

    fn feed() -> FakeFeed {
        FakeFeed {
            summary: vec![
                summary_row(1, "Hot Hand", "C", 20, 12, 10),
                summary_row(2, "Goalie Guy", "G", 20, 0, 1),
                summary_row(3, "Scratch", "D", 0, 0, 0),
                summary_row(4, "Connor McDavid", "C", 20, 10, 20),
                summary_row(5, "Unknown Skater", "L", 30, 3, 4),
            ],
            fail_supplemental: false,
        }
    }

    fn lookup() -> CountingLookup {
        let veteran = PlayerDetail {
            birth_date: Some("1995-01-01".to_string()),
            draft_details: Some(DraftDetails {
                year: 2013,
                overall_pick: 20,
            }),
            season_totals: vec![SeasonTotal {
                league_abbrev: "NHL".to_string(),
                games_played: 400,
                points: 120,
                power_play_points: 20,
                plus_minus: 0,
            }],
            awards: vec![],
        };
        CountingLookup {
            calls: AtomicUsize::new(0),
            details: HashMap::from([(1, veteran.clone()), (4, veteran)]),
        }
    }

    fn classifier() -> AssetClassifier {
        AssetClassifier::new(&ReferenceLists::default(), 2025)
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 12, 1).unwrap()
    }

    fn far_deadline() -> Instant {
        Instant::now() + Duration::from_secs(60)
    }

    #[tokio::test]
    async fn test_fetch_lines_filters_and_joins() {
        let feed = feed();
        let lookup = lookup();
        let factors = default_league_factors();
        let classifier = classifier();
        let orchestrator = RunOrchestrator::new(
            &feed,
            BioEnricher::new(&lookup, &factors, today()),
            &classifier,
            SignalThresholds::default(),
            50,
        );

        let lines = orchestrator.fetch_lines("20252026").await;
        let ids: Vec<_> = lines.iter().map(|l| l.player_id).collect();
        assert_eq!(ids, vec![1, 4, 5]);
        assert_eq!(lines[0].power_play_points, 4);
        assert_eq!(lines[0].blocked_shots, 10);
    }

    #[tokio::test]
    async fn test_supplemental_feed_failure_degrades() {
        let mut feed = feed();
        feed.fail_supplemental = true;
        let lookup = lookup();
        let factors = default_league_factors();
        let classifier = classifier();
        let orchestrator = RunOrchestrator::new(
            &feed,
            BioEnricher::new(&lookup, &factors, today()),
            &classifier,
            SignalThresholds::default(),
            50,
        );

        let lines = orchestrator.fetch_lines("20252026").await;
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].power_play_points, 0);
    }

    #[tokio::test]
    async fn test_full_run_and_warm_cache() {
        let feed = feed();
        let lookup = lookup();
        let factors = default_league_factors();
        let classifier = classifier();
        let orchestrator = RunOrchestrator::new(
            &feed,
            BioEnricher::new(&lookup, &factors, today()),
            &classifier,
            SignalThresholds::default(),
            2,
        );
        let collection: Arc<dyn KeyValueCollection> = Arc::new(MemoryCollection::new());

        let mut cache = EnrichmentCache::load(Arc::clone(&collection)).await.unwrap();
        let mut sink = MemorySink::default();
        let summary = orchestrator
            .run("20252026", &mut cache, &mut sink, far_deadline())
            .await;

        assert_eq!(summary.candidates, 3);
        assert_eq!(summary.processed, 3);
        assert_eq!(summary.rows_written, 3);
        assert_eq!(summary.lookups, 3);
        assert_eq!(summary.cache_hits, 0);
        assert_eq!(summary.cache_written, 3);
        assert!(!summary.deadline_hit);
        assert_eq!(sink.batches, vec![2, 1]);
        assert_eq!(lookup.calls.load(Ordering::SeqCst), 3);

        // Hot season against a 0.25 ppg career baseline
        let hot = &sink.rows[0];
        assert_eq!(hot.name, "Hot Hand");
        assert_eq!(hot.age, 30);
        assert_eq!(hot.signal, Signal::Sell);
        assert!(hot.delta >= 14);
        assert_eq!(
            hot.headshot,
            "https://assets.nhle.com/mugs/nhl/latest/1.png"
        );

        let legend = &sink.rows[1];
        assert_eq!(legend.score, 99);
        assert_eq!(legend.tier, Tier::Grail);
        assert_eq!(legend.flags, vec![Flag::Immortal]);

        // Lookup failed: default record, no baseline, still scored
        let unknown = &sink.rows[2];
        assert_eq!(unknown.age, 27);
        assert_eq!(unknown.signal, Signal::Neutral);
        assert_eq!(unknown.delta, 0);
        assert_eq!(unknown.current_index, None);
        assert_eq!(unknown.verdict, VerdictLabel::Roster);

        // Second run: every player comes from the reloaded cache
        let mut warm = EnrichmentCache::load(collection).await.unwrap();
        let mut second_sink = MemorySink::default();
        let second = orchestrator
            .run("20252026", &mut warm, &mut second_sink, far_deadline())
            .await;
        assert_eq!(second.lookups, 0);
        assert_eq!(second.cache_hits, 3);
        assert_eq!(second.cache_written, 0);
        assert_eq!(lookup.calls.load(Ordering::SeqCst), 3);
        assert_eq!(second_sink.rows, sink.rows);
    }

    #[tokio::test]
    async fn test_elapsed_deadline_stops_before_first_player() {
        let feed = feed();
        let lookup = lookup();
        let factors = default_league_factors();
        let classifier = classifier();
        let orchestrator = RunOrchestrator::new(
            &feed,
            BioEnricher::new(&lookup, &factors, today()),
            &classifier,
            SignalThresholds::default(),
            50,
        );
        let collection = Arc::new(MemoryCollection::new());
        let mut cache = EnrichmentCache::load(collection).await.unwrap();
        let mut sink = MemorySink::default();

        let summary = orchestrator
            .run("20252026", &mut cache, &mut sink, Instant::now())
            .await;

        assert!(summary.deadline_hit);
        assert_eq!(summary.processed, 0);
        assert!(sink.rows.is_empty());
        assert_eq!(lookup.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_partial_results_are_flushed() {
        let feed = feed();
        let lookup = lookup();
        let factors = default_league_factors();
        let classifier = classifier();
        let orchestrator = RunOrchestrator::new(
            &feed,
            BioEnricher::new(&lookup, &factors, today()),
            &classifier,
            SignalThresholds::default(),
            50,
        );
        let lines = orchestrator.fetch_lines("20252026").await;
        let collection: Arc<dyn KeyValueCollection> = Arc::new(MemoryCollection::new());
        let mut cache = EnrichmentCache::load(Arc::clone(&collection)).await.unwrap();
        let mut sink = MemorySink::default();

        // Deadline passes while the first player is being scored.
        let deadline = Instant::now() + Duration::from_millis(50);
        let summary = orchestrator
            .score_lines(&lines, &mut cache, &mut sink, deadline, &|| {
                std::thread::sleep(Duration::from_millis(60))
            })
            .await;

        assert!(summary.deadline_hit);
        assert_eq!(summary.processed, 1);
        assert_eq!(sink.rows.len(), 1);
        assert_eq!(summary.cache_written, 1);
        assert_eq!(collection.len().await.unwrap(), 1);
    }
}
