//! Reconciles the asset classification with the performance signal into a
//! single verdict.

use crate::core::career::CareerRecord;
use crate::core::classifier::{AssetClass, ClassificationResult, Flag, Tier};
use crate::core::config::SignalThresholds;
use crate::core::performance::{PerformanceInput, PerformanceModel};
use crate::core::stats::SeasonStatLine;
use serde::Serialize;
use std::fmt::Display;

/// Career games a player needs before a baseline is trusted.
pub const MIN_BASELINE_GAMES: u32 = 82;

const HEATING_DELTA: i32 = 5;
const COOLING_DELTA: i32 = -5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Signal {
    Buy,
    Sell,
    Heating,
    Cooling,
    Neutral,
}

impl Signal {
    pub fn from_delta(delta: i32, thresholds: &SignalThresholds) -> Self {
        if delta >= thresholds.sell {
            Signal::Sell
        } else if delta <= thresholds.buy {
            Signal::Buy
        } else if delta > HEATING_DELTA {
            Signal::Heating
        } else if delta < COOLING_DELTA {
            Signal::Cooling
        } else {
            Signal::Neutral
        }
    }
}

impl Display for Signal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Signal::Buy => "BUY",
                Signal::Sell => "SELL",
                Signal::Heating => "Heating",
                Signal::Cooling => "Cooling",
                Signal::Neutral => "—",
            }
        )
    }
}

/// Current-pace versus career-baseline comparison.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformanceSignal {
    pub signal: Signal,
    pub delta: i32,
    pub current_index: Option<i32>,
    pub baseline_index: Option<i32>,
}

impl PerformanceSignal {
    pub fn none() -> Self {
        Self {
            signal: Signal::Neutral,
            delta: 0,
            current_index: None,
            baseline_index: None,
        }
    }

    /// Scores the season against the career baseline. Players without more
    /// than [`MIN_BASELINE_GAMES`] career games get no signal.
    pub fn evaluate(
        model: &PerformanceModel,
        line: &SeasonStatLine,
        career: &CareerRecord,
        thresholds: &SignalThresholds,
    ) -> Self {
        if career.games_played <= MIN_BASELINE_GAMES {
            return Self::none();
        }

        let current = model.index(&PerformanceInput::current(line));
        let baseline = model.index(&PerformanceInput::baseline(career, &line.position));
        let delta = (current - baseline).round() as i32;

        Self {
            signal: Signal::from_delta(delta, thresholds),
            delta,
            current_index: Some(current.round() as i32),
            baseline_index: Some(baseline.round() as i32),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum VerdictLabel {
    EliteDiscount,
    ValuePlay,
    DipBuy,
    HypeTrain,
    FakeBreakout,
    PeakValue,
    CoreAsset,
    Breakout,
    Roster,
}

impl Display for VerdictLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                VerdictLabel::EliteDiscount => "ELITE DISCOUNT",
                VerdictLabel::ValuePlay => "VALUE PLAY",
                VerdictLabel::DipBuy => "DIP BUY",
                VerdictLabel::HypeTrain => "HYPE TRAIN",
                VerdictLabel::FakeBreakout => "FAKE BREAKOUT",
                VerdictLabel::PeakValue => "PEAK VALUE",
                VerdictLabel::CoreAsset => "CORE ASSET",
                VerdictLabel::Breakout => "BREAKOUT",
                VerdictLabel::Roster => "ROSTER",
            }
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Action {
    AllIn,
    Accumulate,
    Watch,
    SellIntoHype,
    Dump,
    Trim,
    Hold,
    Buy,
    NoAction,
}

impl Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Action::AllIn => "ALL IN",
                Action::Accumulate => "ACCUMULATE",
                Action::Watch => "WATCH",
                Action::SellIntoHype => "SELL INTO HYPE",
                Action::Dump => "DUMP",
                Action::Trim => "TRIM",
                Action::Hold => "HOLD",
                Action::Buy => "BUY",
                Action::NoAction => "—",
            }
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl Display for Confidence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Confidence::Low => "Low",
                Confidence::Medium => "Med",
                Confidence::High => "High",
            }
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Verdict {
    pub label: VerdictLabel,
    pub action: Action,
    pub confidence: Confidence,
}

impl Verdict {
    const fn new(label: VerdictLabel, action: Action, confidence: Confidence) -> Self {
        Self {
            label,
            action,
            confidence,
        }
    }
}

/// Tiers that count as discounted when a buy signal fires. Covers both the
/// top two tiers and Elite, so an Elite player on a cold streak still reads
/// as a discount.
fn is_premium(tier: Tier) -> bool {
    matches!(tier, Tier::Grail | Tier::Franchise | Tier::Elite)
}

/// Tiers held as core assets when the signal is quiet: the top non-grail
/// tier plus Elite. Grail is excluded.
fn is_hold_tier(tier: Tier) -> bool {
    matches!(tier, Tier::Franchise | Tier::Elite)
}

/// First matching rule wins: buy rules, then sell rules, then steady rules.
pub fn synthesize(hobby: &ClassificationResult, signal: Signal) -> Verdict {
    use Action::*;
    use Confidence::*;

    match signal {
        Signal::Buy => {
            if is_premium(hobby.tier) {
                Verdict::new(VerdictLabel::EliteDiscount, AllIn, High)
            } else if hobby.asset_class == AssetClass::Core {
                Verdict::new(VerdictLabel::ValuePlay, Accumulate, Medium)
            } else {
                Verdict::new(VerdictLabel::DipBuy, Watch, Low)
            }
        }
        Signal::Sell => {
            if hobby.asset_class == AssetClass::Rising {
                Verdict::new(VerdictLabel::HypeTrain, SellIntoHype, High)
            } else if hobby.tier == Tier::Common {
                Verdict::new(VerdictLabel::FakeBreakout, Dump, High)
            } else {
                Verdict::new(VerdictLabel::PeakValue, Trim, Medium)
            }
        }
        Signal::Heating | Signal::Cooling | Signal::Neutral => {
            if is_hold_tier(hobby.tier) {
                Verdict::new(VerdictLabel::CoreAsset, Hold, High)
            } else if hobby.has_flag(Flag::Breakout) {
                Verdict::new(VerdictLabel::Breakout, Action::Buy, Medium)
            } else {
                Verdict::new(VerdictLabel::Roster, NoAction, Low)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn thresholds() -> SignalThresholds {
        SignalThresholds { buy: -10, sell: 14 }
    }

    fn hobby(tier: Tier, asset_class: AssetClass, flags: &[Flag]) -> ClassificationResult {
        ClassificationResult {
            score: 70,
            tier,
            asset_class,
            flags: flags.iter().copied().collect::<BTreeSet<_>>(),
            pace: 50,
        }
    }

    #[test]
    fn test_signal_from_delta() {
        let t = thresholds();
        assert_eq!(Signal::from_delta(14, &t), Signal::Sell);
        assert_eq!(Signal::from_delta(13, &t), Signal::Heating);
        assert_eq!(Signal::from_delta(6, &t), Signal::Heating);
        assert_eq!(Signal::from_delta(5, &t), Signal::Neutral);
        assert_eq!(Signal::from_delta(0, &t), Signal::Neutral);
        assert_eq!(Signal::from_delta(-5, &t), Signal::Neutral);
        assert_eq!(Signal::from_delta(-6, &t), Signal::Cooling);
        assert_eq!(Signal::from_delta(-9, &t), Signal::Cooling);
        assert_eq!(Signal::from_delta(-10, &t), Signal::Buy);
    }

    #[test]
    fn test_buy_precedence() {
        for tier in [Tier::Grail, Tier::Franchise, Tier::Elite] {
            for class in [AssetClass::Core, AssetClass::Standard, AssetClass::Rising] {
                let v = synthesize(&hobby(tier, class, &[]), Signal::Buy);
                assert_eq!(v.label, VerdictLabel::EliteDiscount);
                assert_eq!(v.action, Action::AllIn);
                assert_eq!(v.confidence, Confidence::High);
            }
        }

        let v = synthesize(&hobby(Tier::Roster, AssetClass::Core, &[]), Signal::Buy);
        assert_eq!(v, Verdict::new(VerdictLabel::ValuePlay, Action::Accumulate, Confidence::Medium));

        let v = synthesize(&hobby(Tier::Common, AssetClass::Standard, &[]), Signal::Buy);
        assert_eq!(v, Verdict::new(VerdictLabel::DipBuy, Action::Watch, Confidence::Low));
    }

    #[test]
    fn test_sell_precedence() {
        for tier in [Tier::Common, Tier::Star, Tier::Grail] {
            let v = synthesize(&hobby(tier, AssetClass::Rising, &[]), Signal::Sell);
            assert_eq!(v.label, VerdictLabel::HypeTrain);
            assert_eq!(v.action, Action::SellIntoHype);
        }

        let v = synthesize(&hobby(Tier::Common, AssetClass::Standard, &[]), Signal::Sell);
        assert_eq!(v, Verdict::new(VerdictLabel::FakeBreakout, Action::Dump, Confidence::High));

        let v = synthesize(&hobby(Tier::Star, AssetClass::Core, &[]), Signal::Sell);
        assert_eq!(v, Verdict::new(VerdictLabel::PeakValue, Action::Trim, Confidence::Medium));
    }

    #[test]
    fn test_steady_precedence() {
        let v = synthesize(&hobby(Tier::Elite, AssetClass::Standard, &[Flag::Breakout]), Signal::Neutral);
        assert_eq!(v, Verdict::new(VerdictLabel::CoreAsset, Action::Hold, Confidence::High));

        let v = synthesize(&hobby(Tier::Franchise, AssetClass::Standard, &[]), Signal::Heating);
        assert_eq!(v, Verdict::new(VerdictLabel::CoreAsset, Action::Hold, Confidence::High));

        let v = synthesize(&hobby(Tier::Star, AssetClass::Rising, &[Flag::Breakout]), Signal::Heating);
        assert_eq!(v, Verdict::new(VerdictLabel::Breakout, Action::Buy, Confidence::Medium));

        let v = synthesize(&hobby(Tier::Grail, AssetClass::Legend, &[Flag::Immortal]), Signal::Cooling);
        assert_eq!(v, Verdict::new(VerdictLabel::Roster, Action::NoAction, Confidence::Low));
    }

    fn career(games: u32, points: u32) -> CareerRecord {
        CareerRecord {
            games_played: games,
            points,
            ..CareerRecord::fallback(1)
        }
    }

    fn hot_line() -> SeasonStatLine {
        SeasonStatLine {
            name: "Hot Hand".to_string(),
            position: "C".to_string(),
            games_played: 20,
            goals: 10,
            assists: 10,
            points: 20,
            ..Default::default()
        }
    }

    #[test]
    fn test_signal_gated_on_career_games() {
        let model = PerformanceModel;
        let at_boundary =
            PerformanceSignal::evaluate(&model, &hot_line(), &career(82, 10), &thresholds());
        assert_eq!(at_boundary, PerformanceSignal::none());

        let past_boundary =
            PerformanceSignal::evaluate(&model, &hot_line(), &career(83, 10), &thresholds());
        assert!(past_boundary.current_index.is_some());
        assert!(past_boundary.baseline_index.is_some());
        assert_ne!(past_boundary.delta, 0);
    }

    #[test]
    fn test_hot_season_against_weak_baseline_sells() {
        // current: 1.0 EV ppg -> 99; baseline: 10/83 ppg -> ~75.1
        let signal =
            PerformanceSignal::evaluate(&PerformanceModel, &hot_line(), &career(83, 10), &thresholds());
        assert_eq!(signal.current_index, Some(99));
        assert_eq!(signal.baseline_index, Some(75));
        assert_eq!(signal.delta, 24);
        assert_eq!(signal.signal, Signal::Sell);
    }

    #[test]
    fn test_evaluate_is_deterministic() {
        let a = PerformanceSignal::evaluate(&PerformanceModel, &hot_line(), &career(300, 200), &thresholds());
        let b = PerformanceSignal::evaluate(&PerformanceModel, &hot_line(), &career(300, 200), &thresholds());
        assert_eq!(a, b);
    }
}
