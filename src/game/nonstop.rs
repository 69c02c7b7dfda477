use crate::config::{LifeMeterMetrics, Preferences};
use crate::error::LifeError;
use crate::game::stage::{PlayMode, StageContext};
use log::debug;

const DIFFICULTY_STEP: f32 = 0.2;
/// Difficulties at or above this are used as-is.
const LENIENT_FLOOR: f32 = 0.4;
const TABLE_ORIGIN: f32 = 1.8;
const TABLE_FIRST_INDEX: usize = 8;
const TABLE_LEN: usize = 16;
const HARDEST_DIFFICULTY: f32 = 0.04;
const DIFFICULTY_TABLE: [f32; TABLE_LEN] = [
    0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.30, 0.25, 0.20, 0.16, 0.14, 0.12, 0.10, 0.08,
];

/// Life difficulty across a multi-song session. Positive deltas are
/// multiplied by it and negative ones divided, so lower is harsher.
#[derive(Debug, Clone, PartialEq)]
pub struct NonstopProgression {
    base_life_difficulty: f32,
    life_difficulty: f32,
    progressive_lifebar: u32,
}

impl NonstopProgression {
    /// Fails unless the base difficulty is finite and positive, since
    /// every loss is divided by it.
    pub fn new(base_life_difficulty: f32, progressive_lifebar: u32) -> Result<Self, LifeError> {
        if !base_life_difficulty.is_finite() || base_life_difficulty <= 0.0 {
            return Err(LifeError::InvalidMetric {
                key: "LifeDifficultyScale",
                value: base_life_difficulty,
            });
        }
        Ok(Self {
            base_life_difficulty,
            life_difficulty: base_life_difficulty,
            progressive_lifebar,
        })
    }

    pub fn from_preferences(prefs: &Preferences) -> Result<Self, LifeError> {
        Self::new(prefs.base_life_difficulty, prefs.progressive_lifebar)
    }

    /// Back to the base difficulty for a new song.
    pub fn reset(&mut self, progressive_lifebar: u32) {
        self.life_difficulty = self.base_life_difficulty;
        self.progressive_lifebar = progressive_lifebar;
    }

    #[inline(always)]
    pub const fn life_difficulty(&self) -> f32 {
        self.life_difficulty
    }

    pub const fn base_life_difficulty(&self) -> f32 {
        self.base_life_difficulty
    }

    #[inline(always)]
    pub const fn progressive_lifebar(&self) -> u32 {
        self.progressive_lifebar
    }

    pub fn disable_progressive(&mut self) {
        self.progressive_lifebar = 0;
    }

    /// Recomputes the difficulty at a stage boundary.
    pub fn update(&mut self, stage: &StageContext, prefs: &Preferences, metrics: &LifeMeterMetrics) {
        let (cleared, total, level) = match stage.play_mode {
            PlayMode::Regular => {
                if stage.event_mode || stage.demonstration_or_jukebox {
                    return;
                }
                (stage.stage_index, prefs.songs_per_play, prefs.progressive_stage_lifebar)
            }
            PlayMode::Nonstop => (
                stage.course_song_index,
                stage.course_estimated_stages,
                prefs.progressive_nonstop_lifebar,
            ),
            _ => return,
        };

        if stage.extra_stage && metrics.force_life_difficulty_on_extra_stage {
            // Extra stages always play at a fixed difficulty.
            self.progressive_lifebar = 0;
            self.life_difficulty = metrics.extra_stage_life_difficulty;
            debug!("Extra stage: life difficulty forced to {}", self.life_difficulty);
            return;
        }

        self.life_difficulty = progressive_difficulty(self.base_life_difficulty, cleared, total, level);
        debug!(
            "Life difficulty {:.3} after {} of {} stages (progressive level {})",
            self.life_difficulty, cleared, total, level
        );
    }
}

fn progressive_difficulty(base: f32, cleared: u32, total: u32, level: u32) -> f32 {
    let steps = if total > 1 {
        (u64::from(level) * u64::from(cleared)) / u64::from(total - 1)
    } else {
        u64::from(level)
    };
    let d = base - DIFFICULTY_STEP * steps as f32;
    if d >= LENIENT_FLOOR {
        return d;
    }

    let index = ((TABLE_ORIGIN - d) / DIFFICULTY_STEP) as usize;
    if index >= TABLE_LEN {
        HARDEST_DIFFICULTY
    } else {
        // The leading zeros would zero the divisor.
        DIFFICULTY_TABLE[index.max(TABLE_FIRST_INDEX)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() <= 1e-5
    }

    fn prefs() -> Preferences {
        Preferences {
            base_life_difficulty: 1.3,
            songs_per_play: 3,
            progressive_stage_lifebar: 2,
            progressive_nonstop_lifebar: 4,
            ..Preferences::default()
        }
    }

    #[test]
    fn regular_play_steps_down_with_stages_cleared() {
        let mut p = NonstopProgression::from_preferences(&prefs()).unwrap();
        let stage = StageContext {
            stage_index: 1,
            ..StageContext::default()
        };
        p.update(&stage, &prefs(), &LifeMeterMetrics::default());
        // 1.3 - 0.2 * floor(2 * 1 / 2)
        assert!(close(p.life_difficulty(), 1.1));
    }

    #[test]
    fn nonstop_uses_course_position() {
        let mut p = NonstopProgression::from_preferences(&prefs()).unwrap();
        let stage = StageContext {
            play_mode: PlayMode::Nonstop,
            course_song_index: 2,
            course_estimated_stages: 3,
            ..StageContext::default()
        };
        p.update(&stage, &prefs(), &LifeMeterMetrics::default());
        // floor(4 * 2 / 2) = 4 steps: 1.3 - 0.8 = 0.5
        assert!(close(p.life_difficulty(), 0.5));
        p.update(
            &StageContext {
                course_song_index: 3,
                course_estimated_stages: 3,
                ..stage
            },
            &prefs(),
            &LifeMeterMetrics::default(),
        );
        // 6 steps: 1.3 - 1.2 = 0.1 -> (1.8 - 0.1) / 0.2 = 8.5
        assert!(close(p.life_difficulty(), 0.30));
    }

    #[test]
    fn event_mode_and_other_play_modes_leave_difficulty_alone() {
        let mut p = NonstopProgression::new(1.0, 0).unwrap();
        let event = StageContext {
            event_mode: true,
            stage_index: 2,
            ..StageContext::default()
        };
        p.update(&event, &prefs(), &LifeMeterMetrics::default());
        assert_eq!(p.life_difficulty(), 1.0);
        let oni = StageContext {
            play_mode: PlayMode::Oni,
            ..StageContext::default()
        };
        p.update(&oni, &prefs(), &LifeMeterMetrics::default());
        assert_eq!(p.life_difficulty(), 1.0);
    }

    #[test]
    fn extra_stage_forces_difficulty_and_disables_progressive() {
        let mut p = NonstopProgression::new(1.3, 3).unwrap();
        let stage = StageContext {
            extra_stage: true,
            stage_index: 2,
            ..StageContext::default()
        };
        let metrics = LifeMeterMetrics {
            extra_stage_life_difficulty: 0.7,
            ..LifeMeterMetrics::default()
        };
        p.update(&stage, &prefs(), &metrics);
        assert_eq!(p.life_difficulty(), 0.7);
        assert_eq!(p.progressive_lifebar(), 0);
    }

    #[test]
    fn base_difficulty_must_be_a_positive_divisor() {
        for bad in [0.0, -1.3, f32::NAN, f32::INFINITY] {
            assert!(matches!(
                NonstopProgression::new(bad, 0),
                Err(LifeError::InvalidMetric {
                    key: "LifeDifficultyScale",
                    ..
                })
            ));
        }
        let mut p = NonstopProgression::new(1.3, 2).unwrap();
        p.update(
            &StageContext {
                stage_index: 2,
                ..StageContext::default()
            },
            &prefs(),
            &LifeMeterMetrics::default(),
        );
        assert!(p.life_difficulty() < 1.3);
        p.reset(1);
        assert_eq!(p.life_difficulty(), 1.3);
        assert_eq!(p.progressive_lifebar(), 1);
    }

    #[test]
    fn single_song_sessions_step_by_level() {
        assert!(close(progressive_difficulty(1.0, 0, 1, 2), 0.6));
        assert!(close(progressive_difficulty(1.0, 5, 0, 1), 0.8));
    }

    #[test]
    fn harsh_difficulties_come_from_the_table() {
        assert!(close(progressive_difficulty(1.3, 1, 2, 3), 0.7));
        // 1.3 - 0.2 * 7 = -0.1 -> (1.8 + 0.1) / 0.2 = 9.5
        assert!(close(progressive_difficulty(1.3, 1, 2, 7), 0.25));
        // -0.3 -> 10.5
        assert!(close(progressive_difficulty(1.3, 1, 2, 8), 0.20));
        // Past the end of the table.
        assert!(close(progressive_difficulty(1.3, 1, 2, 20), HARDEST_DIFFICULTY));
    }

    #[test]
    fn table_never_yields_zero() {
        for level in 0..30 {
            for cleared in 0..6 {
                let d = progressive_difficulty(1.3, cleared, 6, level);
                assert!(d > 0.0, "level {level} cleared {cleared} gave {d}");
            }
        }
    }
}
