use crate::config::{LifeMeterMetrics, Preferences};
use crate::error::LifeError;
use crate::game::flare::{FlareGauge, FlareRow, floating_flare_step};
use crate::game::judgment::{HoldNoteScore, Judgment, TapNoteScore, strip_prefix_ignore_case};
use crate::game::life::{LifePercentChange, LifeState};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// While hot, a mistake knocks at least this much off so "hot" takes a
/// while to come back.
const HARSH_HOT_PENALTY: f32 = -0.10;
/// Class (dan) courses are endurance runs: every delta is halved.
const CLASS_DELTA_SCALE: f64 = 0.5;
const MISS_STREAK_STEP: f64 = 0.2;
const MISS_STREAK_CAP: f64 = 3.0;
/// Combos at or below this are wiped by a miss; longer ones are halved.
const COMBO_KEEP_THRESHOLD: u32 = 8;
/// Past this combo every good judgment also feeds the penalty estimator.
const COMBO_WARM_THRESHOLD: u32 = 10;
const PENALTY_COMBO_CAP: u32 = 30;
const SUDDEN_DEATH_DELTA: f32 = -1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum DrainMode {
    #[default]
    Normal,
    Class,
    Flare(FlareGauge),
    FloatingFlare,
    NoRecover,
    SuddenDeath,
}

impl DrainMode {
    /// Only Normal starts from the configured initial value; every other
    /// drain only goes down, so it starts full.
    pub const fn starting_life(self, initial_value: f32) -> f32 {
        match self {
            Self::Normal => initial_value,
            _ => 1.0,
        }
    }

    pub const fn flare_gauge(self) -> Option<FlareGauge> {
        match self {
            Self::Flare(gauge) => Some(gauge),
            _ => None,
        }
    }

    pub const fn is_floating_flare(self) -> bool {
        matches!(self, Self::FloatingFlare)
    }
}

impl fmt::Display for DrainMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Normal => write!(f, "Normal"),
            Self::Class => write!(f, "Class"),
            Self::Flare(gauge) => gauge.fmt(f),
            Self::FloatingFlare => write!(f, "FloatingFlare"),
            Self::NoRecover => write!(f, "NoRecover"),
            Self::SuddenDeath => write!(f, "SuddenDeath"),
        }
    }
}

impl FromStr for DrainMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim();
        let name = strip_prefix_ignore_case(raw, "DrainType_");
        let key = name.to_ascii_lowercase();
        match key.as_str() {
            "normal" => Ok(Self::Normal),
            "class" => Ok(Self::Class),
            "floatingflare" => Ok(Self::FloatingFlare),
            "norecover" => Ok(Self::NoRecover),
            "suddendeath" => Ok(Self::SuddenDeath),
            flare if flare.starts_with("flare") => FlareGauge::from_str(name)
                .map(Self::Flare)
                .map_err(|_| format!("'{raw}' is not a valid DrainType")),
            _ => Err(format!("'{raw}' is not a valid DrainType")),
        }
    }
}

impl TryFrom<String> for DrainMode {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DrainMode> for String {
    fn from(mode: DrainMode) -> Self {
        mode.to_string()
    }
}

/// What one judgment does to the bar before global modifiers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolution {
    pub delta: f32,
    /// New Floating Flare tier, when the gauge dropped.
    pub flare_index: Option<usize>,
    /// Absolute life to set before the delta is applied.
    pub life_override: Option<f32>,
}

impl Resolution {
    const fn delta(delta: f32) -> Self {
        Self {
            delta,
            flare_index: None,
            life_override: None,
        }
    }
}

/// Maps judgments to raw life deltas for one drain mode.
#[derive(Debug, Clone, PartialEq)]
pub struct DrainModeResolver {
    mode: DrainMode,
    percent_change: LifePercentChange,
    min_stay_alive: TapNoteScore,
    harsh_hot_life_penalty: bool,
}

impl DrainModeResolver {
    pub fn new(mode: DrainMode, metrics: &LifeMeterMetrics, prefs: &Preferences) -> Self {
        Self {
            mode,
            percent_change: metrics.percent_change.clone(),
            min_stay_alive: metrics.min_stay_alive,
            harsh_hot_life_penalty: prefs.harsh_hot_life_penalty,
        }
    }

    pub const fn mode(&self) -> DrainMode {
        self.mode
    }

    /// Resolves a judgment against the current state. Normal and Class
    /// update the miss streak in `state`, and Normal also keeps the combo
    /// and the penalty estimator. The accumulator advances the streak again
    /// for every negative delta.
    pub fn resolve(
        &self,
        judgment: Judgment,
        state: &mut LifeState,
        hot: bool,
    ) -> Result<Resolution, LifeError> {
        match self.mode {
            DrainMode::Normal => {
                let delta = self.table_delta(judgment)?;
                let delta = self.harsh_hot(judgment, delta, hot);
                Ok(Resolution::delta(scale_by_combo(state, delta)))
            }
            DrainMode::Class => {
                let delta = self.table_delta(judgment)?;
                Ok(Resolution::delta(scale_for_class(state, delta)))
            }
            DrainMode::Flare(gauge) => {
                let row = self.flare_row(judgment)?;
                Ok(Resolution::delta(row.delta(gauge.index())))
            }
            DrainMode::FloatingFlare => {
                let row = self.flare_row(judgment)?;
                let step = floating_flare_step(row, state.floating_flare_index, state.percentage);
                Ok(Resolution {
                    delta: step.delta,
                    flare_index: step.next_index,
                    life_override: step.life_override,
                })
            }
            DrainMode::NoRecover => {
                let delta = match judgment {
                    Judgment::Hold(HoldNoteScore::LetGo) => self.table_delta(judgment)?,
                    Judgment::Hold(_) => 0.0,
                    Judgment::Tap(_) => self.table_delta(judgment)?.min(0.0),
                };
                Ok(Resolution::delta(delta))
            }
            DrainMode::SuddenDeath => {
                // Every tap grade ranks against MinStayAlive, AvoidMine included.
                let dies = match judgment {
                    Judgment::Tap(score) => score < self.min_stay_alive,
                    Judgment::Hold(score) => score == HoldNoteScore::LetGo,
                };
                Ok(Resolution::delta(if dies { SUDDEN_DEATH_DELTA } else { 0.0 }))
            }
        }
    }

    fn table_delta(&self, judgment: Judgment) -> Result<f32, LifeError> {
        match judgment.life_event() {
            Some(event) => Ok(self.percent_change.get(event)),
            None => Err(self.unmapped_judgment(judgment)),
        }
    }

    fn flare_row(&self, judgment: Judgment) -> Result<FlareRow, LifeError> {
        FlareRow::for_judgment(judgment).ok_or_else(|| self.unmapped_judgment(judgment))
    }

    fn harsh_hot(&self, judgment: Judgment, delta: f32, hot: bool) -> f32 {
        if !self.harsh_hot_life_penalty || !hot {
            return delta;
        }
        match judgment {
            Judgment::Hold(HoldNoteScore::LetGo) => HARSH_HOT_PENALTY,
            Judgment::Tap(_) if delta < 0.0 => delta.min(HARSH_HOT_PENALTY),
            _ => delta,
        }
    }

    fn unmapped_judgment(&self, judgment: Judgment) -> LifeError {
        match judgment {
            Judgment::Tap(score) => LifeError::UnmappedTapScore {
                mode: self.mode,
                score,
            },
            // Every hold score has a mapping in every drain.
            Judgment::Hold(_) => LifeError::Config(format!(
                "{judgment} has no life mapping under the {} drain",
                self.mode
            )),
        }
    }
}

fn miss_streak_factor(miss_combo: u32) -> f64 {
    (1.0 + f64::from(miss_combo) * MISS_STREAK_STEP).min(MISS_STREAK_CAP)
}

/// Normal drain: good judgments build the combo, mistakes break it and are
/// scaled by how long it was and by the current miss streak.
fn scale_by_combo(state: &mut LifeState, delta: f32) -> f32 {
    if delta >= 0.0 {
        state.combo += 1;
        state.miss_combo = 0;
        if state.combo > COMBO_WARM_THRESHOLD {
            // The multiplier is unused here; recording it keeps the average
            // honest for players who rarely miss.
            state.penalty.estimate(state.combo.min(PENALTY_COMBO_CAP));
        }
        return delta;
    }

    state.combo = if state.combo <= COMBO_KEEP_THRESHOLD {
        0
    } else {
        state.combo / 2
    };
    let multiplier = state.penalty.estimate(state.combo.min(PENALTY_COMBO_CAP));
    let streak = miss_streak_factor(state.miss_combo);
    state.miss_combo += 1;
    (f64::from(delta) * multiplier * streak) as f32
}

/// Class drain: no combo, but the miss streak counts this miss before it
/// amplifies.
fn scale_for_class(state: &mut LifeState, delta: f32) -> f32 {
    if delta < 0.0 {
        state.miss_combo += 1;
    } else {
        state.miss_combo = 0;
    }
    let scaled = f64::from(delta) * CLASS_DELTA_SCALE * miss_streak_factor(state.miss_combo);
    scaled as f32
}
