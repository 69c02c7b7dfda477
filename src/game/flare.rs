use crate::game::judgment::{HoldNoteScore, Judgment, TapNoteScore};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// Flare gauges only drain. Each table is indexed by gauge tier: Flare I at
// index 0 through Flare EX at index 9.

pub const FLARE_TIERS: usize = 10;

/// Floating Flare starts every session on Flare EX.
pub const FLOATING_FLARE_START_INDEX: usize = FLARE_TIERS - 1;

pub const FLARE_W1: [f32; FLARE_TIERS] = [0.0; FLARE_TIERS];
pub const FLARE_W2: [f32; FLARE_TIERS] = [0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, -0.01];
pub const FLARE_W3: [f32; FLARE_TIERS] = [
    -0.002, -0.0029, -0.0038, -0.0056, -0.0074, -0.0092, -0.0128, -0.0164, -0.02, -0.02,
];
pub const FLARE_W4: [f32; FLARE_TIERS] = [
    -0.01, -0.0145, -0.019, -0.028, -0.038, -0.045, -0.064, -0.082, -0.1, -0.1,
];
pub const FLARE_MISS: [f32; FLARE_TIERS] = [
    -0.10, -0.11, -0.12, -0.14, -0.16, -0.18, -0.22, -0.26, -0.3, -0.3,
];
pub const FLARE_HELD: [f32; FLARE_TIERS] = [0.0; FLARE_TIERS];
// Missed holds already cost a Miss on the head, so the hold itself is free.
pub const FLARE_MISSED: [f32; FLARE_TIERS] = [0.0; FLARE_TIERS];
pub const FLARE_LET_GO: [f32; FLARE_TIERS] = [
    -0.10, -0.11, -0.12, -0.14, -0.16, -0.18, -0.22, -0.26, -0.3, -0.3,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FlareGauge {
    I,
    II,
    III,
    IV,
    V,
    VI,
    VII,
    VIII,
    IX,
    EX,
}

impl FlareGauge {
    pub const ALL: [Self; FLARE_TIERS] = [
        Self::I,
        Self::II,
        Self::III,
        Self::IV,
        Self::V,
        Self::VI,
        Self::VII,
        Self::VIII,
        Self::IX,
        Self::EX,
    ];

    #[inline(always)]
    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn from_index(index: usize) -> Option<Self> {
        if index < FLARE_TIERS {
            Some(Self::ALL[index])
        } else {
            None
        }
    }

    /// Drain-type suffix: `Flare1`..`Flare9`, `FlareEX`.
    pub const fn drain_suffix(self) -> &'static str {
        match self {
            Self::I => "1",
            Self::II => "2",
            Self::III => "3",
            Self::IV => "4",
            Self::V => "5",
            Self::VI => "6",
            Self::VII => "7",
            Self::VIII => "8",
            Self::IX => "9",
            Self::EX => "EX",
        }
    }
}

impl fmt::Display for FlareGauge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Flare{}", self.drain_suffix())
    }
}

impl FromStr for FlareGauge {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim();
        let suffix = crate::game::judgment::strip_prefix_ignore_case(raw, "Flare");
        Self::ALL
            .into_iter()
            .find(|gauge| gauge.drain_suffix().eq_ignore_ascii_case(suffix))
            .ok_or_else(|| format!("'{raw}' is not a valid Flare gauge"))
    }
}

/// Which flare table a judgment reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlareRow {
    W1,
    W2,
    W3,
    W4,
    Miss,
    Held,
    LetGo,
    Missed,
}

impl FlareRow {
    /// Mines cost a Miss; unstepped rows and checkpoints read the W1 row.
    pub const fn for_judgment(judgment: Judgment) -> Option<Self> {
        match judgment {
            Judgment::Tap(score) => match score {
                TapNoteScore::W1
                | TapNoteScore::None
                | TapNoteScore::CheckpointHit
                | TapNoteScore::CheckpointMiss => Some(Self::W1),
                TapNoteScore::W2 => Some(Self::W2),
                TapNoteScore::W3 => Some(Self::W3),
                TapNoteScore::W4 => Some(Self::W4),
                TapNoteScore::Miss | TapNoteScore::HitMine => Some(Self::Miss),
                TapNoteScore::W5 | TapNoteScore::AvoidMine => None,
            },
            Judgment::Hold(score) => Some(match score {
                HoldNoteScore::Held => Self::Held,
                HoldNoteScore::LetGo => Self::LetGo,
                HoldNoteScore::Missed => Self::Missed,
            }),
        }
    }

    pub const fn table(self) -> &'static [f32; FLARE_TIERS] {
        match self {
            Self::W1 => &FLARE_W1,
            Self::W2 => &FLARE_W2,
            Self::W3 => &FLARE_W3,
            Self::W4 => &FLARE_W4,
            Self::Miss => &FLARE_MISS,
            Self::Held => &FLARE_HELD,
            Self::LetGo => &FLARE_LET_GO,
            Self::Missed => &FLARE_MISSED,
        }
    }

    #[inline(always)]
    pub fn delta(self, tier: usize) -> f32 {
        self.table()[tier.min(FLARE_TIERS - 1)]
    }
}

/// Outcome of one judgment on a Floating Flare gauge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FloatingFlareStep {
    pub delta: f32,
    /// Set when the gauge dropped a tier.
    pub next_index: Option<usize>,
    /// Life the bar is refilled to after a drop.
    pub life_override: Option<f32>,
}

/// Floating Flare: when a judgment would empty the current gauge, drop to the
/// next easier gauge and refill instead. On Flare I there is nothing left to
/// fall back to, so the penalty lands and the player can fail.
pub fn floating_flare_step(row: FlareRow, index: usize, life: f32) -> FloatingFlareStep {
    let delta = row.delta(index);
    if life + delta > 0.0 || index == 0 {
        return FloatingFlareStep {
            delta,
            next_index: None,
            life_override: None,
        };
    }

    let next = index.min(FLARE_TIERS - 1) - 1;
    FloatingFlareStep {
        delta: 0.0,
        next_index: Some(next),
        life_override: Some(1.0 - row.delta(next)),
    }
}
