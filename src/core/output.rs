//! Output rows and the sink abstraction they are written to

use crate::core::career::CareerRecord;
use crate::core::classifier::{AssetClass, ClassificationResult, Flag, Tier};
use crate::core::stats::{PlayerId, SeasonStatLine};
use crate::core::synthesis::{Action, Confidence, PerformanceSignal, Signal, Verdict, VerdictLabel};
use anyhow::Result;
use serde::Serialize;

const HEADSHOT_BASE_URL: &str = "https://assets.nhle.com/mugs/nhl/latest";

/// One fixed-layout output row: identity, verdict, hobby engine, math
/// engine, then display columns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankingRow {
    pub player_id: PlayerId,
    pub name: String,
    pub team: String,
    pub position: String,
    pub age: u32,
    pub draft_year: u32,
    pub games_played: u32,
    pub verdict: VerdictLabel,
    pub action: Action,
    pub confidence: Confidence,
    pub tier: Tier,
    pub asset_class: AssetClass,
    pub flags: Vec<Flag>,
    pub score: u8,
    pub signal: Signal,
    pub delta: i32,
    pub current_index: Option<i32>,
    pub baseline_index: Option<i32>,
    pub pace: u32,
    pub headshot: String,
}

impl RankingRow {
    pub fn new(
        line: &SeasonStatLine,
        career: &CareerRecord,
        hobby: &ClassificationResult,
        math: &PerformanceSignal,
        verdict: Verdict,
    ) -> Self {
        Self {
            player_id: line.player_id,
            name: line.name.clone(),
            team: line.team.clone(),
            position: line.position.clone(),
            age: career.age,
            draft_year: career.draft_year,
            games_played: line.games_played,
            verdict: verdict.label,
            action: verdict.action,
            confidence: verdict.confidence,
            tier: hobby.tier,
            asset_class: hobby.asset_class,
            flags: hobby.flags.iter().copied().collect(),
            score: hobby.score,
            signal: math.signal,
            delta: math.delta,
            current_index: math.current_index,
            baseline_index: math.baseline_index,
            pace: hobby.pace,
            headshot: format!("{HEADSHOT_BASE_URL}/{}.png", line.player_id),
        }
    }

    pub fn flags_label(&self) -> String {
        self.flags
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Tabular destination for ranking rows.
pub trait OutputSink {
    /// Drops existing data rows, keeping the header.
    fn clear(&mut self) -> Result<()>;
    fn append(&mut self, rows: &[RankingRow]) -> Result<()>;
}

/// Sink that keeps every row in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub rows: Vec<RankingRow>,
    pub batches: Vec<usize>,
}

impl OutputSink for MemorySink {
    fn clear(&mut self) -> Result<()> {
        self.rows.clear();
        self.batches.clear();
        Ok(())
    }

    fn append(&mut self, rows: &[RankingRow]) -> Result<()> {
        self.batches.push(rows.len());
        self.rows.extend_from_slice(rows);
        Ok(())
    }
}
