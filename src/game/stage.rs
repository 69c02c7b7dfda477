use crate::game::drain::DrainMode;
use crate::game::judgment::strip_prefix_ignore_case;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PlayMode {
    #[default]
    Regular,
    Nonstop,
    Oni,
    Endless,
    Battle,
    Rave,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub enum Difficulty {
    Beginner,
    Easy,
    #[default]
    Medium,
    Hard,
    Challenge,
    Edit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PlayerNumber {
    #[default]
    P1,
    P2,
}

impl PlayerNumber {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::P1 => "P1",
            Self::P2 => "P2",
        }
    }
}

impl fmt::Display for PlayerNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PlayerNumber_{}", self.as_str())
    }
}

impl FromStr for PlayerNumber {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim();
        match strip_prefix_ignore_case(raw, "PlayerNumber_").to_ascii_uppercase().as_str() {
            "P1" => Ok(Self::P1),
            "P2" => Ok(Self::P2),
            _ => Err(format!("'{raw}' is not a valid PlayerNumber")),
        }
    }
}

/// Per-player song options the bar reads at load.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerOptions {
    pub drain: DrainMode,
    /// Life at or below this counts as failing.
    pub passmark: f32,
}

/// Where the session currently is. Owned by the host and handed to the bar
/// at load and at every stage boundary.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StageContext {
    pub play_mode: PlayMode,
    pub event_mode: bool,
    /// Attract-loop playback: demonstration or jukebox.
    pub demonstration_or_jukebox: bool,
    pub extra_stage: bool,
    /// Stages already cleared in regular play.
    pub stage_index: u32,
    pub course_song_index: u32,
    pub course_estimated_stages: u32,
    pub chart_difficulty: Difficulty,
    pub player_enabled: bool,
}

impl Default for StageContext {
    fn default() -> Self {
        Self {
            play_mode: PlayMode::Regular,
            event_mode: false,
            demonstration_or_jukebox: false,
            extra_stage: false,
            stage_index: 0,
            course_song_index: 0,
            course_estimated_stages: 0,
            chart_difficulty: Difficulty::Medium,
            player_enabled: true,
        }
    }
}

impl StageContext {
    /// A human player on a regular-play beginner chart.
    pub fn is_beginner_regular_play(&self) -> bool {
        self.play_mode == PlayMode::Regular
            && self.player_enabled
            && self.chart_difficulty == Difficulty::Beginner
    }
}
