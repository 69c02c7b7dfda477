use crate::game::drain::DrainMode;
use crate::game::judgment::TapNoteScore;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LifeError {
    /// The drain has no life change for this tap grade. This is a metrics
    /// or game-data problem, never something a player can cause.
    #[error("{score} has no life mapping under the {mode} drain")]
    UnmappedTapScore { mode: DrainMode, score: TapNoteScore },

    #[error("invalid metric {key} = {value}")]
    InvalidMetric { key: &'static str, value: f32 },

    #[error("configuration error: {0}")]
    Config(String),
}
