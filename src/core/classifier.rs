//! Collectibility scoring: maps a player's season and career into a tiered
//! asset classification.
//!
//! The score is built by a fixed sequence of stages over one accumulator.
//! Each stage is additive, a multiplicative discount, or a floor. Floors run
//! last so they win over the discounts applied before them.

use crate::core::career::CareerRecord;
use crate::core::config::ReferenceLists;
use crate::core::stats::SeasonStatLine;
use serde::Serialize;
use std::collections::{BTreeSet, HashSet};
use std::fmt::Display;

pub const LEGEND_SCORE: u8 = 99;
pub const MIN_SCORE: f64 = 40.0;
pub const MAX_SCORE: f64 = 98.0;

const SEASON_GAMES: f64 = 82.0;
const MIN_PACE_DIVISOR: u32 = 12;
const LEGEND_PACE: u32 = 100;
const DEFAULT_CAREER_PPG: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Tier {
    Common,
    Roster,
    Star,
    Elite,
    Franchise,
    Grail,
}

impl Tier {
    pub fn from_score(score: u8) -> Self {
        match score {
            96.. => Tier::Grail,
            90..=95 => Tier::Franchise,
            82..=89 => Tier::Elite,
            74..=81 => Tier::Star,
            60..=73 => Tier::Roster,
            _ => Tier::Common,
        }
    }
}

impl Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Tier::Grail => "GRAIL",
                Tier::Franchise => "FRANCHISE",
                Tier::Elite => "ELITE",
                Tier::Star => "STAR",
                Tier::Roster => "ROSTER",
                Tier::Common => "COMMON",
            }
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum AssetClass {
    Standard,
    Legend,
    Declining,
    Rising,
    Core,
    DepthKey,
    Rookie,
}

impl Display for AssetClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                AssetClass::Standard => "Standard",
                AssetClass::Legend => "GOAT",
                AssetClass::Declining => "Retiring",
                AssetClass::Rising => "Stock Up",
                AssetClass::Core => "Core Pillar",
                AssetClass::DepthKey => "Top 6 Key",
                AssetClass::Rookie => "Rookie Class",
            }
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Flag {
    Immortal,
    PedigreeFloor,
    InjuryRisk,
    Breakout,
    Playmaker,
    Prime,
    EliteDefense,
    RookieHype,
}

impl Display for Flag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Flag::Immortal => "IMMORTAL",
                Flag::PedigreeFloor => "Pedigree Floor",
                Flag::InjuryRisk => "Injury Risk",
                Flag::Breakout => "Breakout",
                Flag::Playmaker => "Playmaker",
                Flag::Prime => "Prime",
                Flag::EliteDefense => "Elite D",
                Flag::RookieHype => "RC Hype",
            }
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationResult {
    pub score: u8,
    pub tier: Tier,
    pub asset_class: AssetClass,
    pub flags: BTreeSet<Flag>,
    /// Season-projected points, rounded.
    pub pace: u32,
}

impl ClassificationResult {
    pub fn has_flag(&self, flag: Flag) -> bool {
        self.flags.contains(&flag)
    }
}

#[derive(Debug, Default, PartialEq)]
struct AwardTally {
    championships: u32,
    major: u32,
    minor: u32,
}

impl AwardTally {
    fn from_names(awards: &[String]) -> Self {
        let mut tally = Self::default();
        for name in awards {
            if name.contains("Stanley") {
                tally.championships += 1;
            } else if ["Hart", "Norris", "Conn"].iter().any(|m| name.contains(m)) {
                tally.major += 1;
            } else {
                tally.minor += 1;
            }
        }
        tally
    }

    fn bonus(&self) -> f64 {
        (self.championships * 3 + self.major * 5 + self.minor * 2) as f64
    }
}

pub struct AssetClassifier {
    legends: HashSet<String>,
    elite_defense: HashSet<String>,
    core_defense: HashSet<String>,
    top_markets: HashSet<String>,
    rookie_draft_year: u32,
}

impl AssetClassifier {
    pub fn new(reference: &ReferenceLists, rookie_draft_year: u32) -> Self {
        let set = |names: &[String]| names.iter().cloned().collect::<HashSet<_>>();
        Self {
            legends: set(&reference.legends),
            elite_defense: set(&reference.elite_defense),
            core_defense: set(&reference.core_defense),
            top_markets: set(&reference.top_markets),
            rookie_draft_year,
        }
    }

    pub fn classify(&self, line: &SeasonStatLine, career: &CareerRecord) -> ClassificationResult {
        if self.legends.contains(&line.name) {
            return ClassificationResult {
                score: LEGEND_SCORE,
                tier: Tier::Grail,
                asset_class: AssetClass::Legend,
                flags: BTreeSet::from([Flag::Immortal]),
                pace: LEGEND_PACE,
            };
        }

        let age = career.age;
        let gp = line.games_played;
        let mut asset_class = AssetClass::Standard;
        let mut flags = BTreeSet::new();

        // Pace: linear extrapolation to a full season.
        let multiplier = SEASON_GAMES / gp.max(MIN_PACE_DIVISOR) as f64;
        let mut pace_goals = line.goals as f64 * multiplier;
        let mut pace_assists = line.assists as f64 * multiplier;
        let mut pace_points = pace_goals + pace_assists;

        // Floor: young players on a small sample get their projection.
        if age <= 23 && gp < 40 && career.pedigree > pace_points {
            pace_points = career.pedigree;
            pace_goals = pace_points * 0.35;
            pace_assists = pace_points * 0.65;
            flags.insert(Flag::PedigreeFloor);
        }

        let award_bonus = AwardTally::from_names(&career.awards).bonus();

        let (goal_weight, assist_weight) = if line.is_defense() {
            (3.0, 0.9)
        } else {
            (2.1, 1.0)
        };
        let mut weighted = pace_goals * goal_weight + pace_assists * assist_weight;

        // Discount: aging depth players without hardware.
        if age > 34 && weighted < 60.0 && award_bonus < 5.0 {
            weighted *= 0.90;
            asset_class = AssetClass::Declining;
        }
        // Discount: durability, applied after the age discount.
        if gp < 30 && age > 22 {
            weighted *= 0.90;
            flags.insert(Flag::InjuryRisk);
        }

        // Base curve around weighted = 60, below baseline penalized at half rate.
        let mut score = if weighted > 50.0 {
            60.0 + (weighted - 60.0) / 3.0
        } else {
            60.0 - (60.0 - weighted) / 2.0
        };
        score += award_bonus;

        // Additive: trajectory, gated to young players below the elite ceiling.
        if age <= 25 && weighted < 80.0 {
            let career_ppg = match career.points_per_game() {
                Some(ppg) if career.games_played > 40 => ppg,
                _ => DEFAULT_CAREER_PPG,
            };
            let trajectory = (pace_points / SEASON_GAMES) / career_ppg;

            if trajectory > 1.3 && weighted > 45.0 {
                score += 3.0;
                flags.insert(Flag::Breakout);
                asset_class = AssetClass::Rising;
            }
            if weighted > 60.0 {
                score += 3.0;
                asset_class = AssetClass::Core;
            } else if weighted > 45.0 {
                score += 1.0;
                asset_class = AssetClass::DepthKey;
            }
        }

        // Additive: secondary bonuses.
        if pace_assists >= 65.0 {
            score += 3.0;
            flags.insert(Flag::Playmaker);
        }
        if weighted > 95.0 && age <= 29 {
            score += 3.0;
            flags.insert(Flag::Prime);
        }
        if self.top_markets.contains(&line.team) {
            score += 4.0;
        }

        // Floor: named defensemen.
        if line.is_defense() {
            if self.elite_defense.contains(&line.name) {
                score = score.max(92.0);
            }
            if self.core_defense.contains(&line.name) {
                score = score.max(88.0);
                flags.insert(Flag::EliteDefense);
            }
        }

        // Floor: current rookie class.
        if career.draft_year == self.rookie_draft_year {
            score = score.max(75.0);
            flags.insert(Flag::RookieHype);
            asset_class = AssetClass::Rookie;
        }

        let score = score.clamp(MIN_SCORE, MAX_SCORE).round() as u8;

        ClassificationResult {
            score,
            tier: Tier::from_score(score),
            asset_class,
            flags,
            pace: pace_points.round() as u32,
        }
    }
}
