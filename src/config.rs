use crate::error::LifeError;
use crate::game::judgment::{ScoreEvent, TapNoteScore};
use crate::game::life::LifePercentChange;
use configparser::ini::Ini;
use log::warn;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::path::Path;
use std::str::FromStr;

pub const METRICS_SECTION: &str = "LifeMeterBar";
pub const GAMEPLAY_SECTION: &str = "Gameplay";
pub const OPTIONS_SECTION: &str = "Options";

/// Theme metrics for the life bar, `[LifeMeterBar]` in `metrics.ini`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LifeMeterMetrics {
    pub danger_threshold: f32,
    pub danger_threshold_no_comment: f32,
    pub initial_value: f32,
    pub hot_value: f32,
    pub life_multiplier: f32,
    pub min_stay_alive: TapNoteScore,
    pub force_life_difficulty_on_extra_stage: bool,
    pub extra_stage_life_difficulty: f32,
    /// `[Gameplay] PenalizeTapScoreNone`
    pub penalize_tap_score_none: bool,
    pub percent_change: LifePercentChange,
}

impl Default for LifeMeterMetrics {
    fn default() -> Self {
        Self {
            danger_threshold: 0.2,
            danger_threshold_no_comment: 0.35,
            initial_value: 0.5,
            hot_value: 1.0,
            life_multiplier: 1.0,
            min_stay_alive: TapNoteScore::W3,
            force_life_difficulty_on_extra_stage: true,
            extra_stage_life_difficulty: 1.0,
            penalize_tap_score_none: false,
            percent_change: LifePercentChange::default(),
        }
    }
}

impl LifeMeterMetrics {
    /// Reads every known key, keeping the default for anything missing or
    /// unparsable.
    pub fn from_ini(conf: &Ini) -> Self {
        let d = Self::default();
        let s = METRICS_SECTION;
        let mut percent_change = d.percent_change.clone();
        for event in ScoreEvent::ALL {
            let key = event.metric_name();
            let value = read_value(conf, s, &key, percent_change.get(event));
            percent_change.set(event, value);
        }
        Self {
            danger_threshold: read_value(conf, s, "DangerThreshold", d.danger_threshold),
            danger_threshold_no_comment: read_value(
                conf,
                s,
                "DangerThresholdNoComment",
                d.danger_threshold_no_comment,
            ),
            initial_value: read_value(conf, s, "InitialValue", d.initial_value),
            hot_value: read_value(conf, s, "HotValue", d.hot_value),
            life_multiplier: read_value(conf, s, "LifeMultiplier", d.life_multiplier),
            min_stay_alive: read_value(conf, s, "MinStayAlive", d.min_stay_alive),
            force_life_difficulty_on_extra_stage: read_bool(
                conf,
                s,
                "ForceLifeDifficultyOnExtraStage",
                d.force_life_difficulty_on_extra_stage,
            ),
            extra_stage_life_difficulty: read_value(
                conf,
                s,
                "ExtraStageLifeDifficulty",
                d.extra_stage_life_difficulty,
            ),
            penalize_tap_score_none: read_bool(
                conf,
                GAMEPLAY_SECTION,
                "PenalizeTapScoreNone",
                d.penalize_tap_score_none,
            ),
            percent_change,
        }
    }

    pub fn from_ini_str(text: &str) -> Result<Self, LifeError> {
        let mut conf = Ini::new();
        conf.read(text.to_string()).map_err(LifeError::Config)?;
        Ok(Self::from_ini(&conf))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, LifeError> {
        let path = path.as_ref();
        let mut conf = Ini::new();
        conf.load(path)
            .map_err(|e| LifeError::Config(format!("{}: {e}", path.display())))?;
        Ok(Self::from_ini(&conf))
    }

    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        Self::load(path).unwrap_or_else(|e| {
            warn!("Failed to load '{}', using default life meter metrics: {}", path.display(), e);
            Self::default()
        })
    }

    /// Rejects metrics that would break the clamp or the threshold checks.
    pub fn validate(&self) -> Result<(), LifeError> {
        let positive = [
            ("LifeMultiplier", self.life_multiplier),
            ("ExtraStageLifeDifficulty", self.extra_stage_life_difficulty),
        ];
        for (key, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(LifeError::InvalidMetric { key, value });
            }
        }
        let finite = [
            ("DangerThreshold", self.danger_threshold),
            ("DangerThresholdNoComment", self.danger_threshold_no_comment),
            ("InitialValue", self.initial_value),
            ("HotValue", self.hot_value),
        ];
        for (key, value) in finite {
            if !value.is_finite() {
                return Err(LifeError::InvalidMetric { key, value });
            }
        }
        for event in ScoreEvent::ALL {
            let value = self.percent_change.get(event);
            if !value.is_finite() {
                return Err(LifeError::InvalidMetric {
                    key: "LifePercentChange",
                    value,
                });
            }
        }
        Ok(())
    }
}

/// Machine preferences that shape the bar, `[Options]` in `Preferences.ini`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    pub merciful_beginner: bool,
    pub merciful_drain: bool,
    pub harsh_hot_life_penalty: bool,
    pub progressive_lifebar: u32,
    pub progressive_stage_lifebar: u32,
    pub progressive_nonstop_lifebar: u32,
    pub songs_per_play: u32,
    /// `LifeDifficultyScale`
    pub base_life_difficulty: f32,
    pub regen_combo_after_miss: u32,
    pub max_regen_combo_after_miss: u32,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            merciful_beginner: false,
            merciful_drain: false,
            harsh_hot_life_penalty: false,
            progressive_lifebar: 0,
            progressive_stage_lifebar: 0,
            progressive_nonstop_lifebar: 0,
            songs_per_play: 3,
            base_life_difficulty: 1.3,
            regen_combo_after_miss: 0,
            max_regen_combo_after_miss: 0,
        }
    }
}

impl Preferences {
    pub fn from_ini(conf: &Ini) -> Self {
        let d = Self::default();
        let s = OPTIONS_SECTION;
        Self {
            merciful_beginner: read_bool(conf, s, "MercifulBeginner", d.merciful_beginner),
            merciful_drain: read_bool(conf, s, "MercifulDrain", d.merciful_drain),
            harsh_hot_life_penalty: read_bool(
                conf,
                s,
                "HarshHotLifePenalty",
                d.harsh_hot_life_penalty,
            ),
            progressive_lifebar: read_value(conf, s, "ProgressiveLifebar", d.progressive_lifebar),
            progressive_stage_lifebar: read_value(
                conf,
                s,
                "ProgressiveStageLifebar",
                d.progressive_stage_lifebar,
            ),
            progressive_nonstop_lifebar: read_value(
                conf,
                s,
                "ProgressiveNonstopLifebar",
                d.progressive_nonstop_lifebar,
            ),
            songs_per_play: read_value(conf, s, "SongsPerPlay", d.songs_per_play),
            base_life_difficulty: read_value(
                conf,
                s,
                "LifeDifficultyScale",
                d.base_life_difficulty,
            ),
            regen_combo_after_miss: read_value(
                conf,
                s,
                "RegenComboAfterMiss",
                d.regen_combo_after_miss,
            ),
            max_regen_combo_after_miss: read_value(
                conf,
                s,
                "MaxRegenComboAfterMiss",
                d.max_regen_combo_after_miss,
            ),
        }
    }

    pub fn from_ini_str(text: &str) -> Result<Self, LifeError> {
        let mut conf = Ini::new();
        conf.read(text.to_string()).map_err(LifeError::Config)?;
        Ok(Self::from_ini(&conf))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, LifeError> {
        let path = path.as_ref();
        let mut conf = Ini::new();
        conf.load(path)
            .map_err(|e| LifeError::Config(format!("{}: {e}", path.display())))?;
        Ok(Self::from_ini(&conf))
    }

    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        Self::load(path).unwrap_or_else(|e| {
            warn!("Failed to load '{}', using default preferences: {}", path.display(), e);
            Self::default()
        })
    }
}

fn read_value<T>(conf: &Ini, section: &str, key: &str, default: T) -> T
where
    T: FromStr,
    T::Err: Display,
{
    let Some(raw) = conf.get(section, key) else {
        return default;
    };
    match raw.trim().parse::<T>() {
        Ok(v) => v,
        Err(e) => {
            warn!("Invalid value for [{section}] {key}: {e}, using default.");
            default
        }
    }
}

fn read_bool(conf: &Ini, section: &str, key: &str, default: bool) -> bool {
    let Some(raw) = conf.get(section, key) else {
        return default;
    };
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => true,
        "0" | "false" | "no" | "off" => false,
        other => {
            warn!("Invalid value for [{section}] {key}: '{other}', using default.");
            default
        }
    }
}
