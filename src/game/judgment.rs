use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Tap grades in StepMania order, worst first. The derived `Ord` is what
/// `MinStayAlive` comparisons rely on: `score < min` means "worse than".
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TapNoteScore {
    None,
    HitMine,
    AvoidMine,
    CheckpointMiss,
    Miss,
    W5,
    W4,
    W3,
    W2,
    W1,
    CheckpointHit,
}

impl TapNoteScore {
    pub const ALL: [Self; 11] = [
        Self::None,
        Self::HitMine,
        Self::AvoidMine,
        Self::CheckpointMiss,
        Self::Miss,
        Self::W5,
        Self::W4,
        Self::W3,
        Self::W2,
        Self::W1,
        Self::CheckpointHit,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "None",
            Self::HitMine => "HitMine",
            Self::AvoidMine => "AvoidMine",
            Self::CheckpointMiss => "CheckpointMiss",
            Self::Miss => "Miss",
            Self::W5 => "W5",
            Self::W4 => "W4",
            Self::W3 => "W3",
            Self::W2 => "W2",
            Self::W1 => "W1",
            Self::CheckpointHit => "CheckpointHit",
        }
    }
}

impl fmt::Display for TapNoteScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TapNoteScore_{}", self.as_str())
    }
}

impl FromStr for TapNoteScore {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim();
        let name = strip_prefix_ignore_case(raw, "TapNoteScore_");
        Self::ALL
            .into_iter()
            .find(|score| score.as_str().eq_ignore_ascii_case(name))
            .ok_or_else(|| format!("'{raw}' is not a valid TapNoteScore"))
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HoldNoteScore {
    Held,
    LetGo,
    Missed,
}

impl HoldNoteScore {
    pub const ALL: [Self; 3] = [Self::Held, Self::LetGo, Self::Missed];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Held => "Held",
            Self::LetGo => "LetGo",
            Self::Missed => "Missed",
        }
    }
}

impl fmt::Display for HoldNoteScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HoldNoteScore_{}", self.as_str())
    }
}

impl FromStr for HoldNoteScore {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim();
        let name = strip_prefix_ignore_case(raw, "HoldNoteScore_");
        Self::ALL
            .into_iter()
            .find(|score| score.as_str().eq_ignore_ascii_case(name))
            .ok_or_else(|| format!("'{raw}' is not a valid HoldNoteScore"))
    }
}

/// A single judgment handed to the life meter by the scoring side.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Judgment {
    Tap(TapNoteScore),
    Hold(HoldNoteScore),
}

impl Judgment {
    /// The `LifePercentChange` metric a judgment reads in table-driven drains.
    /// `None` (a row that was never stepped on) is charged as a miss. W5 and
    /// AvoidMine carry no life change at all.
    pub const fn life_event(self) -> Option<ScoreEvent> {
        match self {
            Self::Tap(score) => match score {
                TapNoteScore::W1 => Some(ScoreEvent::W1),
                TapNoteScore::W2 => Some(ScoreEvent::W2),
                TapNoteScore::W3 => Some(ScoreEvent::W3),
                TapNoteScore::W4 => Some(ScoreEvent::W4),
                TapNoteScore::Miss | TapNoteScore::None => Some(ScoreEvent::Miss),
                TapNoteScore::HitMine => Some(ScoreEvent::HitMine),
                TapNoteScore::CheckpointHit => Some(ScoreEvent::CheckpointHit),
                TapNoteScore::CheckpointMiss => Some(ScoreEvent::CheckpointMiss),
                TapNoteScore::W5 | TapNoteScore::AvoidMine => None,
            },
            Self::Hold(score) => match score {
                HoldNoteScore::Held => Some(ScoreEvent::Held),
                HoldNoteScore::LetGo => Some(ScoreEvent::LetGo),
                HoldNoteScore::Missed => Some(ScoreEvent::Missed),
            },
        }
    }
}

impl fmt::Display for Judgment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tap(score) => score.fmt(f),
            Self::Hold(score) => score.fmt(f),
        }
    }
}

impl From<TapNoteScore> for Judgment {
    fn from(score: TapNoteScore) -> Self {
        Self::Tap(score)
    }
}

impl From<HoldNoteScore> for Judgment {
    fn from(score: HoldNoteScore) -> Self {
        Self::Hold(score)
    }
}

/// Score events that own a `LifePercentChange<Event>` metric.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ScoreEvent {
    W1,
    W2,
    W3,
    W4,
    W5,
    Miss,
    HitMine,
    CheckpointHit,
    CheckpointMiss,
    Held,
    LetGo,
    Missed,
}

impl ScoreEvent {
    pub const COUNT: usize = 12;

    pub const ALL: [Self; Self::COUNT] = [
        Self::W1,
        Self::W2,
        Self::W3,
        Self::W4,
        Self::W5,
        Self::Miss,
        Self::HitMine,
        Self::CheckpointHit,
        Self::CheckpointMiss,
        Self::Held,
        Self::LetGo,
        Self::Missed,
    ];

    #[inline(always)]
    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::W1 => "W1",
            Self::W2 => "W2",
            Self::W3 => "W3",
            Self::W4 => "W4",
            Self::W5 => "W5",
            Self::Miss => "Miss",
            Self::HitMine => "HitMine",
            Self::CheckpointHit => "CheckpointHit",
            Self::CheckpointMiss => "CheckpointMiss",
            Self::Held => "Held",
            Self::LetGo => "LetGo",
            Self::Missed => "Missed",
        }
    }

    /// Metric key under `[LifeMeterBar]`, e.g. `LifePercentChangeMiss`.
    pub fn metric_name(self) -> String {
        format!("LifePercentChange{}", self.as_str())
    }
}

pub(crate) fn strip_prefix_ignore_case<'a>(s: &'a str, prefix: &str) -> &'a str {
    match s.get(..prefix.len()) {
        Some(head) if head.eq_ignore_ascii_case(prefix) => &s[prefix.len()..],
        _ => s,
    }
}
