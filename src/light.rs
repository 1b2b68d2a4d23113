use crate::{RoadId, TrafficLightId};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A traffic light controlling one movement from an inbound road
/// to an outbound road of an intersection.
#[derive(Clone, Debug)]
pub struct TrafficLight {
    /// The light's ID.
    id: TrafficLightId,
    /// The road leading into the intersection.
    from: RoadId,
    /// The road leading out of the intersection.
    to: RoadId,
    /// The turning movement.
    turn: TurnType,
    /// The current state.
    state: LightState,
}

/// The turning movement controlled by a traffic light.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TurnType {
    Left,
    Straight,
    Right,
    UTurn,
}

/// The state of a traffic light.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum LightState {
    Red,
    Green,
    Yellow,
}

impl TurnType {
    /// Whether lights of this type are green during a left sub-phase.
    /// U-turns are treated as left turns.
    pub fn is_left_phase(self) -> bool {
        matches!(self, TurnType::Left | TurnType::UTurn)
    }
}

impl TrafficLight {
    /// Creates a light. Right turns start green, all others red.
    pub(crate) fn new(id: TrafficLightId, from: RoadId, to: RoadId, turn: TurnType) -> Self {
        let state = match turn {
            TurnType::Right => LightState::Green,
            _ => LightState::Red,
        };
        Self {
            id,
            from,
            to,
            turn,
            state,
        }
    }

    /// Gets the light's ID.
    pub fn id(&self) -> TrafficLightId {
        self.id
    }

    /// The road leading into the intersection.
    /// Renderers use it as the geometric anchor of the light.
    pub fn from(&self) -> RoadId {
        self.from
    }

    /// The road leading out of the intersection.
    pub fn to(&self) -> RoadId {
        self.to
    }

    /// The turning movement this light controls.
    pub fn turn(&self) -> TurnType {
        self.turn
    }

    /// The current state of the light.
    pub fn state(&self) -> LightState {
        self.state
    }

    pub fn is_green(&self) -> bool {
        self.state == LightState::Green
    }

    pub(crate) fn set_state(&mut self, state: LightState) {
        self.state = state;
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use slotmap::KeyData;

    fn light(turn: TurnType) -> TrafficLight {
        let road = RoadId::from(KeyData::from_ffi(1));
        TrafficLight::new(TrafficLightId::default(), road, road, turn)
    }

    #[test]
    fn default_states() {
        assert_eq!(light(TurnType::Right).state(), LightState::Green);
        assert_eq!(light(TurnType::Straight).state(), LightState::Red);
        assert_eq!(light(TurnType::Left).state(), LightState::Red);
        assert_eq!(light(TurnType::UTurn).state(), LightState::Red);
    }

    #[test]
    fn u_turns_share_the_left_phase() {
        assert!(TurnType::UTurn.is_left_phase());
        assert!(TurnType::Left.is_left_phase());
        assert!(!TurnType::Straight.is_left_phase());
        assert!(!TurnType::Right.is_left_phase());
    }
}
