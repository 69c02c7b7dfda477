pub mod drain;
pub mod flare;
pub mod health;
pub mod judgment;
pub mod life;
pub mod meter;
pub mod nonstop;
pub mod penalty;
pub mod stage;
