use crate::config::LifeMeterMetrics;
use serde::{Deserialize, Serialize};

/// Alpha blends move toward their target at this many units per second.
pub const ALPHA_BLEND_RATE: f32 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HealthState {
    Hot,
    Alive,
    Danger,
    DangerNoComment,
    Dead,
}

impl HealthState {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Hot => "HealthState_Hot",
            Self::Alive => "HealthState_Alive",
            Self::Danger => "HealthState_Danger",
            Self::DangerNoComment => "HealthState_DangerNoComment",
            Self::Dead => "HealthState_Dead",
        }
    }
}

/// Threshold checks over the current life value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HealthStateEvaluator {
    danger_threshold: f32,
    danger_threshold_no_comment: f32,
    hot_value: f32,
    passmark: f32,
    floating_flare: bool,
}

impl HealthStateEvaluator {
    pub fn new(metrics: &LifeMeterMetrics, passmark: f32, floating_flare: bool) -> Self {
        Self {
            danger_threshold: metrics.danger_threshold,
            danger_threshold_no_comment: metrics.danger_threshold_no_comment,
            hot_value: metrics.hot_value,
            passmark,
            floating_flare,
        }
    }

    #[inline(always)]
    pub fn is_hot(&self, life: f32) -> bool {
        life >= self.hot_value
    }

    #[inline(always)]
    pub fn is_failing(&self, life: f32) -> bool {
        life <= self.passmark
    }

    /// Floating Flare only warns on the last gauge; above it a drop just
    /// swaps gauges.
    pub fn is_in_danger(&self, life: f32, flare_index: usize) -> bool {
        if self.floating_flare && flare_index != 0 {
            return false;
        }
        life < self.danger_threshold
    }

    pub fn danger_should_comment(&self, life: f32, flare_index: usize) -> bool {
        if self.floating_flare && flare_index != 0 {
            return false;
        }
        self.danger_threshold < life && life < self.danger_threshold_no_comment
    }

    pub fn health_state(&self, life: f32, flare_index: usize) -> HealthState {
        if self.is_hot(life) {
            HealthState::Hot
        } else if life <= 0.0 {
            HealthState::Dead
        } else if self.is_in_danger(life, flare_index) {
            HealthState::Danger
        } else if self.danger_should_comment(life, flare_index) {
            HealthState::DangerNoComment
        } else {
            HealthState::Alive
        }
    }

    /// Whether the danger overlay should show.
    pub fn danger_visible(&self, life: f32, flare_index: usize) -> bool {
        matches!(
            self.health_state(life, flare_index),
            HealthState::Danger | HealthState::DangerNoComment
        )
    }
}

/// A 0..1 fade that chases a boolean target.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AlphaBlend(f32);

impl AlphaBlend {
    pub const fn new(value: f32) -> Self {
        Self(value)
    }

    #[inline(always)]
    pub const fn value(self) -> f32 {
        self.0
    }

    pub fn advance(&mut self, target: bool, dt: f32) -> f32 {
        let step = dt * ALPHA_BLEND_RATE;
        let next = if target { self.0 + step } else { self.0 - step };
        self.0 = next.clamp(0.0, 1.0);
        self.0
    }
}
