//! Career records and the biographical enrichment that produces them

use crate::core::stats::{PlayerId, null_as_default};
use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, warn};

pub const DEFAULT_AGE: u32 = 27;
pub const UNDRAFTED_PICK: u32 = 999;

const NHL_LEAGUE: &str = "NHL";
const MIN_FEEDER_GAMES: u32 = 15;
const DAYS_PER_YEAR: f64 = 365.25;

// Per-game rates used to infer defensive baselines the landing payload lacks.
const BLOCKS_PER_GAME: f64 = 0.8;
const TAKEAWAYS_PER_GAME: f64 = 0.4;
const GIVEAWAYS_PER_GAME: f64 = 0.5;

/// Normalized career snapshot for one player, cached across runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CareerRecord {
    pub player_id: PlayerId,
    pub age: u32,
    pub draft_pick: u32,
    pub draft_year: u32,
    pub games_played: u32,
    pub points: u32,
    pub power_play_points: u32,
    pub plus_minus: i32,
    pub blocked_shots: f64,
    pub takeaways: f64,
    pub giveaways: f64,
    /// Best feeder-league scoring rate projected to an 82-game NHL season.
    pub pedigree: f64,
    pub awards: Vec<String>,
}

impl CareerRecord {
    /// Conservative record used whenever the detail lookup fails.
    pub fn fallback(player_id: PlayerId) -> Self {
        Self {
            player_id,
            age: DEFAULT_AGE,
            draft_pick: UNDRAFTED_PICK,
            draft_year: 0,
            games_played: 0,
            points: 0,
            power_play_points: 0,
            plus_minus: 0,
            blocked_shots: 0.0,
            takeaways: 0.0,
            giveaways: 0.0,
            pedigree: 0.0,
            awards: Vec::new(),
        }
    }

    pub fn points_per_game(&self) -> Option<f64> {
        (self.games_played > 0).then(|| self.points as f64 / self.games_played as f64)
    }
}

/// Raw player landing payload. Every field is optional so partial payloads
/// still normalize.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlayerDetail {
    pub birth_date: Option<String>,
    pub draft_details: Option<DraftDetails>,
    #[serde(deserialize_with = "null_as_default")]
    pub season_totals: Vec<SeasonTotal>,
    #[serde(deserialize_with = "null_as_default")]
    pub awards: Vec<AwardEntry>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DraftDetails {
    #[serde(deserialize_with = "null_as_default")]
    pub year: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub overall_pick: u32,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SeasonTotal {
    #[serde(deserialize_with = "null_as_default")]
    pub league_abbrev: String,
    #[serde(deserialize_with = "null_as_default")]
    pub games_played: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub points: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub power_play_points: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub plus_minus: i32,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AwardEntry {
    #[serde(deserialize_with = "null_as_default")]
    pub trophy: LocalizedName,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LocalizedName {
    #[serde(deserialize_with = "null_as_default")]
    pub default: String,
}

#[async_trait]
pub trait DetailLookup: Send + Sync {
    async fn fetch_detail(&self, player_id: PlayerId) -> Result<PlayerDetail>;
}

/// Builds career records from the detail lookup, never failing.
pub struct BioEnricher<'a> {
    lookup: &'a dyn DetailLookup,
    league_factors: &'a HashMap<String, f64>,
    today: NaiveDate,
}

impl<'a> BioEnricher<'a> {
    pub fn new(
        lookup: &'a dyn DetailLookup,
        league_factors: &'a HashMap<String, f64>,
        today: NaiveDate,
    ) -> Self {
        Self {
            lookup,
            league_factors,
            today,
        }
    }

    pub async fn enrich(&self, player_id: PlayerId) -> CareerRecord {
        match self.lookup.fetch_detail(player_id).await {
            Ok(detail) => normalize(player_id, &detail, self.league_factors, self.today),
            Err(e) => {
                warn!(player_id, error = %e, "Detail lookup failed, using default career record");
                CareerRecord::fallback(player_id)
            }
        }
    }
}

/// Turns a landing payload into a career record.
pub fn normalize(
    player_id: PlayerId,
    detail: &PlayerDetail,
    league_factors: &HashMap<String, f64>,
    today: NaiveDate,
) -> CareerRecord {
    let age = detail
        .birth_date
        .as_deref()
        .and_then(|d| age_on(d, today))
        .unwrap_or(DEFAULT_AGE);

    let (draft_pick, draft_year) = detail
        .draft_details
        .as_ref()
        .map_or((UNDRAFTED_PICK, 0), |d| (d.overall_pick, d.year));

    let mut record = CareerRecord {
        age,
        draft_pick,
        draft_year,
        ..CareerRecord::fallback(player_id)
    };

    for season in &detail.season_totals {
        if season.league_abbrev == NHL_LEAGUE {
            record.games_played += season.games_played;
            record.points += season.points;
            record.power_play_points += season.power_play_points;
            record.plus_minus += season.plus_minus;
        } else if let Some(factor) = league_factors.get(&season.league_abbrev) {
            if season.games_played > MIN_FEEDER_GAMES {
                let projected =
                    season.points as f64 / season.games_played as f64 * factor * 82.0;
                record.pedigree = record.pedigree.max(projected);
            }
        }
    }

    let games = record.games_played as f64;
    record.blocked_shots = games * BLOCKS_PER_GAME;
    record.takeaways = games * TAKEAWAYS_PER_GAME;
    record.giveaways = games * GIVEAWAYS_PER_GAME;

    record.awards = detail
        .awards
        .iter()
        .map(|a| a.trophy.default.clone())
        .filter(|name| !name.is_empty())
        .collect();

    debug!(
        player_id,
        age = record.age,
        career_gp = record.games_played,
        pedigree = record.pedigree,
        "Normalized career record"
    );
    record
}

fn age_on(birth_date: &str, today: NaiveDate) -> Option<u32> {
    let born = NaiveDate::parse_from_str(birth_date, "%Y-%m-%d").ok()?;
    let days = (today - born).num_days();
    if days < 0 {
        return None;
    }
    Some((days as f64 / DAYS_PER_YEAR).floor() as u32)
}
