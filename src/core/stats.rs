//! Current-season stat feeds and the joined per-player stat line

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Deserializer};
use std::collections::HashMap;

pub type PlayerId = u64;

/// Reads an explicit `null` as the field's default, same as a missing field.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Row of the skater summary report.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SummaryRow {
    #[serde(deserialize_with = "null_as_default")]
    pub player_id: PlayerId,
    #[serde(deserialize_with = "null_as_default")]
    pub skater_full_name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub team_abbrevs: String,
    #[serde(deserialize_with = "null_as_default")]
    pub position_code: String,
    #[serde(deserialize_with = "null_as_default")]
    pub games_played: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub goals: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub assists: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub points: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub plus_minus: i32,
}

/// Row of the skater realtime report.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RealtimeRow {
    #[serde(deserialize_with = "null_as_default")]
    pub player_id: PlayerId,
    #[serde(deserialize_with = "null_as_default")]
    pub blocked_shots: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub takeaways: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub giveaways: u32,
}

/// Row of the skater power-play report.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PowerPlayRow {
    #[serde(deserialize_with = "null_as_default")]
    pub player_id: PlayerId,
    #[serde(deserialize_with = "null_as_default")]
    pub pp_points: u32,
}

#[async_trait]
pub trait StatFeed: Send + Sync {
    async fn summary(&self, season: &str) -> Result<Vec<SummaryRow>>;
    async fn realtime(&self, season: &str) -> Result<Vec<RealtimeRow>>;
    async fn powerplay(&self, season: &str) -> Result<Vec<PowerPlayRow>>;
}

/// A player's current-season line, joined across all three feeds.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeasonStatLine {
    pub player_id: PlayerId,
    pub name: String,
    pub team: String,
    pub position: String,
    pub games_played: u32,
    pub goals: u32,
    pub assists: u32,
    pub points: u32,
    pub plus_minus: i32,
    pub power_play_points: u32,
    pub blocked_shots: u32,
    pub takeaways: u32,
    pub giveaways: u32,
}

impl SeasonStatLine {
    pub fn is_defense(&self) -> bool {
        self.position == "D"
    }

    pub fn is_goalie(&self) -> bool {
        self.position == "G"
    }

    /// Lines without a single game or point carry nothing to score.
    pub fn is_empty(&self) -> bool {
        self.games_played < 1 && self.points < 1
    }
}

/// Joins the supplemental feeds onto the summary feed by player id.
///
/// Players missing from a supplemental feed get zeroes for its fields.
/// Summary order is preserved.
pub fn join_feeds(
    summary: Vec<SummaryRow>,
    realtime: Vec<RealtimeRow>,
    powerplay: Vec<PowerPlayRow>,
) -> Vec<SeasonStatLine> {
    let realtime: HashMap<PlayerId, RealtimeRow> =
        realtime.into_iter().map(|r| (r.player_id, r)).collect();
    let powerplay: HashMap<PlayerId, PowerPlayRow> =
        powerplay.into_iter().map(|p| (p.player_id, p)).collect();

    summary
        .into_iter()
        .map(|s| {
            let rt = realtime.get(&s.player_id);
            let pp = powerplay.get(&s.player_id);
            SeasonStatLine {
                player_id: s.player_id,
                name: s.skater_full_name,
                team: s.team_abbrevs,
                position: s.position_code,
                games_played: s.games_played,
                goals: s.goals,
                assists: s.assists,
                points: s.points,
                plus_minus: s.plus_minus,
                power_play_points: pp.map_or(0, |p| p.pp_points),
                blocked_shots: rt.map_or(0, |r| r.blocked_shots),
                takeaways: rt.map_or(0, |r| r.takeaways),
                giveaways: rt.map_or(0, |r| r.giveaways),
            }
        })
        .collect()
}
