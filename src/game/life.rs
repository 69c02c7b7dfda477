use crate::config::{LifeMeterMetrics, Preferences};
use crate::game::drain::DrainMode;
use crate::game::flare::FLOATING_FLARE_START_INDEX;
use crate::game::judgment::ScoreEvent;
use crate::game::nonstop::NonstopProgression;
use crate::game::penalty::PenaltyEstimator;
use log::{trace, warn};
use serde::{Deserialize, Serialize};

// Simply Love's LifePercentChange metrics, which the theme ships for every
// ITG-style game mode.
pub const LIFE_FANTASTIC: f32 = 0.008;
pub const LIFE_EXCELLENT: f32 = 0.008;
pub const LIFE_GREAT: f32 = 0.004;
pub const LIFE_DECENT: f32 = 0.0;
pub const LIFE_WAY_OFF: f32 = -0.050;
pub const LIFE_MISS: f32 = -0.100;
pub const LIFE_HIT_MINE: f32 = -0.050;
pub const LIFE_CHECKPOINT_HIT: f32 = 0.002;
pub const LIFE_CHECKPOINT_MISS: f32 = -0.002;
pub const LIFE_HELD: f32 = 0.008;
pub const LIFE_LET_GO: f32 = -0.080;
pub const LIFE_MISSED: f32 = 0.0;

/// Only Floating Flare lets a positive delta through, and only this one: a
/// full refill onto a new gauge.
pub const FLARE_RESET_DELTA: f32 = 1.0;

/// Per-score-event life change, indexed by [`ScoreEvent`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LifePercentChange([f32; ScoreEvent::COUNT]);

impl Default for LifePercentChange {
    fn default() -> Self {
        let mut table = [0.0; ScoreEvent::COUNT];
        for event in ScoreEvent::ALL {
            table[event.index()] = match event {
                ScoreEvent::W1 => LIFE_FANTASTIC,
                ScoreEvent::W2 => LIFE_EXCELLENT,
                ScoreEvent::W3 => LIFE_GREAT,
                ScoreEvent::W4 => LIFE_DECENT,
                ScoreEvent::W5 => LIFE_WAY_OFF,
                ScoreEvent::Miss => LIFE_MISS,
                ScoreEvent::HitMine => LIFE_HIT_MINE,
                ScoreEvent::CheckpointHit => LIFE_CHECKPOINT_HIT,
                ScoreEvent::CheckpointMiss => LIFE_CHECKPOINT_MISS,
                ScoreEvent::Held => LIFE_HELD,
                ScoreEvent::LetGo => LIFE_LET_GO,
                ScoreEvent::Missed => LIFE_MISSED,
            };
        }
        Self(table)
    }
}

impl LifePercentChange {
    #[inline(always)]
    pub fn get(&self, event: ScoreEvent) -> f32 {
        self.0[event.index()]
    }

    pub fn set(&mut self, event: ScoreEvent, value: f32) {
        self.0[event.index()] = value;
    }
}

/// Everything one player's bar remembers between judgments.
#[derive(Debug, Clone, PartialEq)]
pub struct LifeState {
    pub(crate) percentage: f32,
    pub(crate) combo: u32,
    pub(crate) miss_combo: u32,
    pub(crate) combo_to_regain_life: u32,
    pub(crate) floating_flare_index: usize,
    pub(crate) penalty: PenaltyEstimator,
}

impl LifeState {
    pub fn new(percentage: f32) -> Self {
        Self {
            percentage,
            combo: 0,
            miss_combo: 0,
            combo_to_regain_life: 0,
            floating_flare_index: FLOATING_FLARE_START_INDEX,
            penalty: PenaltyEstimator::new(),
        }
    }

    #[inline(always)]
    pub const fn percentage(&self) -> f32 {
        self.percentage
    }

    pub const fn combo(&self) -> u32 {
        self.combo
    }

    pub const fn miss_combo(&self) -> u32 {
        self.miss_combo
    }

    pub const fn combo_to_regain_life(&self) -> u32 {
        self.combo_to_regain_life
    }

    pub const fn floating_flare_index(&self) -> usize {
        self.floating_flare_index
    }

    pub const fn penalty(&self) -> &PenaltyEstimator {
        &self.penalty
    }
}

/// Linear remap of `x` from `[l1, h1]` onto `[l2, h2]`.
#[inline(always)]
fn scale(x: f32, l1: f32, h1: f32, l2: f32, h2: f32) -> f32 {
    (x - l1) * (h2 - l2) / (h1 - l1) + l2
}

/// Applies the global modifiers to a raw delta and commits it to the bar.
#[derive(Debug, Clone, PartialEq)]
pub struct LifeAccumulator {
    mode: DrainMode,
    life_multiplier: f32,
    merciful: bool,
    regen_combo_after_miss: u32,
    max_regen_combo_after_miss: u32,
}

impl LifeAccumulator {
    pub fn new(
        mode: DrainMode,
        metrics: &LifeMeterMetrics,
        prefs: &Preferences,
        merciful_beginner: bool,
    ) -> Self {
        Self {
            mode,
            life_multiplier: metrics.life_multiplier,
            merciful: merciful_beginner || prefs.merciful_drain,
            regen_combo_after_miss: prefs.regen_combo_after_miss,
            max_regen_combo_after_miss: prefs.max_regen_combo_after_miss,
        }
    }

    pub const fn life_multiplier(&self) -> f32 {
        self.life_multiplier
    }

    /// Runs the modifier pipeline and adds the result to the bar. Returns
    /// the delta that was applied, or `None` when the player has already
    /// failed and the bar is frozen. Non-finite deltas are dropped without
    /// touching the state.
    pub fn apply(
        &self,
        state: &mut LifeState,
        delta: f32,
        difficulty: &NonstopProgression,
        failed: bool,
    ) -> Option<f32> {
        if !delta.is_finite() {
            warn!("Ignoring non-finite life delta {delta} ({})", self.mode);
            return None;
        }
        let mut delta = delta;

        // Softer penalties the emptier the bar.
        if self.merciful && delta < 0.0 {
            delta *= scale(state.percentage, 0.0, 1.0, 0.5, 1.0);
        }

        if delta >= 0.0 {
            state.miss_combo = 0;
            state.combo_to_regain_life = state.combo_to_regain_life.saturating_sub(1);
            if state.combo_to_regain_life > 0 {
                delta = 0.0;
            }
        } else {
            let progressive = difficulty.progressive_lifebar() as f32;
            delta *= 1.0 + progressive / 8.0 * state.miss_combo as f32;
            // Only successive misses raise the amount lost.
            state.miss_combo += 1;

            // Raise the regain requirement, never past the max, but don't
            // lower it if it is already past.
            let regen = state
                .combo_to_regain_life
                .saturating_add(self.regen_combo_after_miss)
                .min(self.max_regen_combo_after_miss);
            state.combo_to_regain_life = state.combo_to_regain_life.max(regen);
        }

        // No refilling the bar once the player has failed.
        if failed {
            return None;
        }

        let delta = self.scale_for_mode(delta, difficulty.life_difficulty());
        state.percentage = (state.percentage + delta).clamp(0.0, self.life_multiplier);
        trace!("life {:+.4} -> {:.4} ({})", delta, state.percentage, self.mode);
        Some(delta)
    }

    /// Sets the bar directly, clamped like every other change. Returns
    /// false and leaves the bar alone when `value` is not finite.
    pub fn set_absolute(&self, state: &mut LifeState, value: f32) -> bool {
        if !value.is_finite() {
            warn!("Ignoring non-finite life value {value} ({})", self.mode);
            return false;
        }
        state.percentage = value.clamp(0.0, self.life_multiplier);
        true
    }

    fn scale_for_mode(&self, delta: f32, life_difficulty: f32) -> f32 {
        match self.mode {
            DrainMode::Normal | DrainMode::Class | DrainMode::NoRecover => {
                if delta > 0.0 {
                    delta * life_difficulty
                } else {
                    delta / life_difficulty
                }
            }
            DrainMode::Flare(_) => delta.min(0.0),
            DrainMode::FloatingFlare => {
                if delta < 0.0 || delta == FLARE_RESET_DELTA {
                    delta
                } else {
                    0.0
                }
            }
            DrainMode::SuddenDeath => {
                if delta < 0.0 {
                    -1.0
                } else {
                    0.0
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::flare::FlareGauge;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() <= 1e-6
    }

    fn flat() -> NonstopProgression {
        NonstopProgression::new(1.0, 0).unwrap()
    }

    fn accumulator(mode: DrainMode) -> LifeAccumulator {
        LifeAccumulator::new(mode, &LifeMeterMetrics::default(), &Preferences::default(), false)
    }

    #[test]
    fn default_table_matches_simply_love() {
        let table = LifePercentChange::default();
        assert_eq!(table.get(ScoreEvent::W1), LIFE_FANTASTIC);
        assert_eq!(table.get(ScoreEvent::Miss), LIFE_MISS);
        assert_eq!(table.get(ScoreEvent::LetGo), LIFE_LET_GO);
    }

    #[test]
    fn deltas_are_clamped_to_the_bar() {
        let acc = accumulator(DrainMode::Normal);
        let mut state = LifeState::new(0.95);
        acc.apply(&mut state, 0.5, &flat(), false);
        assert_eq!(state.percentage, 1.0);
        acc.apply(&mut state, -3.0, &flat(), false);
        assert_eq!(state.percentage, 0.0);
    }

    #[test]
    fn life_difficulty_scales_gains_up_and_losses_down() {
        let acc = accumulator(DrainMode::Normal);
        let hard = NonstopProgression::new(2.0, 0).unwrap();
        let mut state = LifeState::new(0.5);
        assert!(close(acc.apply(&mut state, 0.01, &hard, false).unwrap(), 0.02));
        assert!(close(acc.apply(&mut state, -0.1, &hard, false).unwrap(), -0.05));
    }

    #[test]
    fn mercy_softens_losses_at_low_life() {
        let prefs = Preferences {
            merciful_drain: true,
            ..Preferences::default()
        };
        let acc = LifeAccumulator::new(DrainMode::Normal, &LifeMeterMetrics::default(), &prefs, false);
        let mut state = LifeState::new(0.0);
        assert!(close(acc.apply(&mut state, -0.1, &flat(), false).unwrap(), -0.05));
        let mut state = LifeState::new(1.0);
        assert!(close(acc.apply(&mut state, -0.1, &flat(), false).unwrap(), -0.1));
        let beginner =
            LifeAccumulator::new(DrainMode::Normal, &LifeMeterMetrics::default(), &Preferences::default(), true);
        let mut state = LifeState::new(0.5);
        assert!(close(beginner.apply(&mut state, -0.1, &flat(), false).unwrap(), -0.075));
    }

    #[test]
    fn progressive_lifebar_punishes_streaks() {
        let acc = accumulator(DrainMode::Normal);
        let progressive = NonstopProgression::new(1.0, 4).unwrap();
        let mut state = LifeState::new(1.0);
        assert!(close(acc.apply(&mut state, -0.1, &progressive, false).unwrap(), -0.1));
        assert!(close(acc.apply(&mut state, -0.1, &progressive, false).unwrap(), -0.15));
        assert!(close(acc.apply(&mut state, -0.1, &progressive, false).unwrap(), -0.2));
        assert_eq!(state.miss_combo, 3);
        acc.apply(&mut state, 0.0, &progressive, false);
        assert_eq!(state.miss_combo, 0);
    }

    #[test]
    fn regain_combo_blocks_gains_until_it_runs_out() {
        let prefs = Preferences {
            regen_combo_after_miss: 3,
            max_regen_combo_after_miss: 5,
            ..Preferences::default()
        };
        let acc = LifeAccumulator::new(DrainMode::Normal, &LifeMeterMetrics::default(), &prefs, false);
        let mut state = LifeState::new(0.5);
        acc.apply(&mut state, -0.1, &flat(), false);
        assert_eq!(state.combo_to_regain_life, 3);
        acc.apply(&mut state, -0.1, &flat(), false);
        assert_eq!(state.combo_to_regain_life, 5);

        let before = state.percentage;
        for remaining in (1..5).rev() {
            assert_eq!(acc.apply(&mut state, 0.5, &flat(), false), Some(0.0));
            assert_eq!(state.combo_to_regain_life, remaining);
        }
        assert_eq!(state.percentage, before);
        assert_eq!(acc.apply(&mut state, 0.05, &flat(), false), Some(0.05));
    }

    #[test]
    fn failed_players_keep_their_bar() {
        let acc = accumulator(DrainMode::Normal);
        let mut state = LifeState::new(0.0);
        assert_eq!(acc.apply(&mut state, 0.5, &flat(), true), None);
        assert_eq!(state.percentage, 0.0);
    }

    #[test]
    fn flare_gauges_only_drain() {
        let acc = accumulator(DrainMode::Flare(FlareGauge::II));
        let mut state = LifeState::new(0.5);
        assert_eq!(acc.apply(&mut state, 0.1, &flat(), false), Some(0.0));
        // Life difficulty does not touch flare penalties.
        let hard = NonstopProgression::new(2.0, 0).unwrap();
        assert_eq!(acc.apply(&mut state, -0.1, &hard, false), Some(-0.1));
    }

    #[test]
    fn floating_flare_lets_only_the_reset_through() {
        let acc = accumulator(DrainMode::FloatingFlare);
        let mut state = LifeState::new(0.2);
        assert_eq!(acc.apply(&mut state, 0.3, &flat(), false), Some(0.0));
        assert_eq!(acc.apply(&mut state, FLARE_RESET_DELTA, &flat(), false), Some(1.0));
        assert_eq!(state.percentage, 1.0);
    }

    #[test]
    fn sudden_death_turns_any_loss_into_death() {
        let acc = accumulator(DrainMode::SuddenDeath);
        let mut state = LifeState::new(1.0);
        assert_eq!(acc.apply(&mut state, 0.2, &flat(), false), Some(0.0));
        assert_eq!(acc.apply(&mut state, -0.001, &flat(), false), Some(-1.0));
        assert_eq!(state.percentage, 0.0);
    }

    #[test]
    fn set_absolute_clamps() {
        let acc = accumulator(DrainMode::Normal);
        let mut state = LifeState::new(0.5);
        acc.set_absolute(&mut state, 1.7);
        assert_eq!(state.percentage, 1.0);
        acc.set_absolute(&mut state, -0.2);
        assert_eq!(state.percentage, 0.0);
        acc.set_absolute(&mut state, 0.25);
        assert_eq!(state.percentage, 0.25);
    }

    #[test]
    fn non_finite_input_leaves_the_bar_alone() {
        let acc = accumulator(DrainMode::Normal);
        let mut state = LifeState::new(0.5);
        for bad in [f32::NAN, f32::INFINITY, f32::NEG_INFINITY] {
            assert_eq!(acc.apply(&mut state, bad, &flat(), false), None);
            assert!(!acc.set_absolute(&mut state, bad));
        }
        assert_eq!(state.percentage, 0.5);
        assert_eq!(state.miss_combo, 0);
        assert_eq!(state.combo_to_regain_life, 0);
        assert!(close(acc.apply(&mut state, 0.01, &flat(), false).unwrap(), 0.01));
    }
}
