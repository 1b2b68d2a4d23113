pub use cgmath;
pub use controller::{
    create as create_controller, AdaptiveController, AdaptiveTiming, ControlPolicy, Controller,
    Event, FixedTimeController, FixedTiming,
};
pub use error::{Error, Result};
pub use intersection::Intersection;
pub use light::{LightState, TrafficLight, TurnType};
pub use network::Network;
pub use road::RoadSegment;
pub use router::Route;
pub use simulation::{Simulation, SimulationConfig};
use slotmap::{new_key_type, SlotMap};
pub use slotmap::{Key, KeyData};
pub use stats::TripStats;
pub use util::Interval;
pub use vehicle::Vehicle;

mod controller;
mod error;
mod intersection;
mod light;
pub mod math;
mod network;
mod road;
pub mod router;
mod simulation;
mod stats;
mod util;
mod vehicle;

new_key_type! {
    /// Unique ID of an [Intersection].
    pub struct IntersectionId;
    /// Unique ID of a [RoadSegment].
    pub struct RoadId;
    /// Unique ID of a [TrafficLight] within its intersection.
    pub struct TrafficLightId;
    /// Unique ID of a [Vehicle].
    pub struct VehicleId;
}

type IntersectionSet = SlotMap<IntersectionId, Intersection>;
type RoadSet = SlotMap<RoadId, RoadSegment>;
type VehicleSet = SlotMap<VehicleId, Vehicle>;
