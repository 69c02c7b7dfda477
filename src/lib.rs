//! Life meter for ITG/StepMania-style play: turns a stream of judgments into
//! the health bar, across every drain type from Normal to Floating Flare.

pub mod config;
pub mod error;
pub mod game;
pub mod notify;

pub use config::{LifeMeterMetrics, Preferences};
pub use error::LifeError;
pub use game::drain::{DrainMode, DrainModeResolver, Resolution};
pub use game::flare::FlareGauge;
pub use game::health::{HealthState, HealthStateEvaluator};
pub use game::judgment::{HoldNoteScore, Judgment, ScoreEvent, TapNoteScore};
pub use game::life::{LifeAccumulator, LifePercentChange, LifeState};
pub use game::meter::LifeMeter;
pub use game::nonstop::NonstopProgression;
pub use game::penalty::PenaltyEstimator;
pub use game::stage::{Difficulty, PlayMode, PlayerNumber, PlayerOptions, StageContext};
pub use notify::{LifeChanged, LifeEvent, LifeObserver};
