use crate::game::health::HealthState;
use crate::game::stage::PlayerNumber;
use serde::Serialize;
use serde_json::{Value, json};
use std::sync::mpsc::Sender;

pub const LIFE_CHANGED_MESSAGE: &str = "LifeChanged";

/// Snapshot broadcast after every change to the bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct LifeChanged {
    #[serde(serialize_with = "serialize_player")]
    pub player: PlayerNumber,
    pub life: f32,
    pub hot: bool,
    pub danger: bool,
    pub failing: bool,
    #[serde(serialize_with = "serialize_health")]
    pub health: HealthState,
}

impl LifeChanged {
    /// Message-bus payload: `{"Message":"LifeChanged","Player":"PlayerNumber_P1",...}`.
    pub fn to_message(&self) -> Value {
        let mut msg = json!({ "Message": LIFE_CHANGED_MESSAGE });
        if let (Value::Object(out), Ok(Value::Object(fields))) = (&mut msg, serde_json::to_value(self)) {
            out.extend(fields);
        }
        msg
    }
}

fn serialize_player<S: serde::Serializer>(player: &PlayerNumber, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(player)
}

fn serialize_health<S: serde::Serializer>(health: &HealthState, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(health.as_str())
}

/// Receives everything the bar would otherwise draw or broadcast.
pub trait LifeObserver {
    fn life_changed(&mut self, event: &LifeChanged);

    /// Passing and hot fades, reported from `update`.
    fn alphas_changed(&mut self, _player: PlayerNumber, _passing: f32, _hot: f32) {}
}

/// What a channel subscriber receives.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LifeEvent {
    Changed(LifeChanged),
    Alphas { player: PlayerNumber, passing: f32, hot: f32 },
}

/// Forwards events to another thread or a polling host. Sends to a closed
/// receiver are ignored.
impl LifeObserver for Sender<LifeEvent> {
    fn life_changed(&mut self, event: &LifeChanged) {
        let _ = self.send(LifeEvent::Changed(*event));
    }

    fn alphas_changed(&mut self, player: PlayerNumber, passing: f32, hot: f32) {
        let _ = self.send(LifeEvent::Alphas { player, passing, hot });
    }
}
