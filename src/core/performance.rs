//! Even-strength offensive efficiency index

use crate::core::career::CareerRecord;
use crate::core::stats::SeasonStatLine;

pub const NEUTRAL_INDEX: f64 = 50.0;
pub const MIN_INDEX: f64 = 36.0;
pub const MAX_INDEX: f64 = 99.0;

/// Even-strength points per game treated as elite.
const ELITE_EV_RATE: f64 = 0.80;

/// Stat tuple the index is computed from.
#[derive(Debug, Clone, PartialEq)]
pub struct PerformanceInput<'a> {
    pub games_played: u32,
    pub points: u32,
    pub power_play_points: u32,
    pub plus_minus: i32,
    pub blocked_shots: f64,
    pub takeaways: f64,
    pub giveaways: f64,
    pub position: &'a str,
}

impl<'a> PerformanceInput<'a> {
    pub fn current(line: &'a SeasonStatLine) -> Self {
        Self {
            games_played: line.games_played,
            points: line.points,
            power_play_points: line.power_play_points,
            plus_minus: line.plus_minus,
            blocked_shots: line.blocked_shots as f64,
            takeaways: line.takeaways as f64,
            giveaways: line.giveaways as f64,
            position: &line.position,
        }
    }

    pub fn baseline(career: &CareerRecord, position: &'a str) -> Self {
        Self {
            games_played: career.games_played,
            points: career.points,
            power_play_points: career.power_play_points,
            plus_minus: career.plus_minus,
            blocked_shots: career.blocked_shots,
            takeaways: career.takeaways,
            giveaways: career.giveaways,
            position,
        }
    }
}

/// Scores offense against a fixed elite even-strength rate on a concave
/// curve. Only the scoring fields feed the index today; the defensive
/// fields and position are carried for position-adjusted curves.
#[derive(Debug, Default, Clone, Copy)]
pub struct PerformanceModel;

impl PerformanceModel {
    pub fn index(&self, input: &PerformanceInput<'_>) -> f64 {
        if input.games_played == 0 {
            return NEUTRAL_INDEX;
        }

        let ev_points = input.points as f64 - input.power_play_points as f64;
        let ev_rate = ev_points / input.games_played as f64;
        let ratio = ev_rate / ELITE_EV_RATE;
        let curve = if ratio <= 0.0 { 0.0 } else { ratio.sqrt() };

        (60.0 + curve * 39.0).clamp(MIN_INDEX, MAX_INDEX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(gp: u32, pts: u32, ppp: u32) -> PerformanceInput<'static> {
        PerformanceInput {
            games_played: gp,
            points: pts,
            power_play_points: ppp,
            plus_minus: 0,
            blocked_shots: 0.0,
            takeaways: 0.0,
            giveaways: 0.0,
            position: "C",
        }
    }

    #[test]
    fn test_zero_games_is_neutral() {
        assert_eq!(PerformanceModel.index(&input(0, 10, 2)), 50.0);
    }

    #[test]
    fn test_elite_anchor_hits_ceiling() {
        // 0.8 EV points per game
        assert_eq!(PerformanceModel.index(&input(10, 10, 2)), 99.0);
    }

    #[test]
    fn test_concave_curve() {
        // ratio 0.25 -> sqrt 0.5 -> 79.5
        let idx = PerformanceModel.index(&input(10, 2, 0));
        assert!((idx - 79.5).abs() < 1e-9);
    }

    #[test]
    fn test_no_even_strength_scoring() {
        assert_eq!(PerformanceModel.index(&input(10, 3, 3)), 60.0);
        // More power-play points than points reported is clamped by the curve
        assert_eq!(PerformanceModel.index(&input(10, 1, 3)), 60.0);
    }

    #[test]
    fn test_index_bounds() {
        for gp in [1, 5, 40, 82] {
            for pts in [0, 10, 60, 200] {
                for ppp in [0, 5, 30] {
                    let idx = PerformanceModel.index(&input(gp, pts, ppp));
                    assert!((36.0..=99.0).contains(&idx));
                }
            }
        }
    }

    #[test]
    fn test_position_does_not_change_index() {
        let mut d = input(50, 30, 5);
        let f = d.clone();
        d.position = "D";
        assert_eq!(PerformanceModel.index(&d), PerformanceModel.index(&f));
    }
}
