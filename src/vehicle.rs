use crate::math::{Point2d, PointExt};
use crate::router::Route;
use crate::{RoadId, VehicleId};

/// A simulated vehicle.
#[derive(Clone, Debug)]
pub struct Vehicle {
    /// The vehicle's ID.
    id: VehicleId,
    /// The point the trip starts at.
    source: Point2d,
    /// The point the trip ends at.
    destination: Point2d,
    /// The current location.
    location: Point2d,
    /// The current speed.
    speed: f64,
    /// The road the vehicle is on.
    road: RoadId,
    /// The road the trip ends on.
    final_road: RoadId,
    /// The roads between the end of the first road and the start of the final road.
    path: Vec<RoadId>,
    /// The index into `path` of the next road, or `path.len()` for the final road.
    cursor: usize,
    /// The time the trip started.
    start_time: f64,
    /// The expected duration of the trip.
    expected_time: f64,
}

impl Vehicle {
    pub(crate) fn new(
        id: VehicleId,
        source: Point2d,
        destination: Point2d,
        first_road: RoadId,
        final_road: RoadId,
        route: Route,
        start_time: f64,
    ) -> Self {
        Self {
            id,
            source,
            destination,
            location: source,
            speed: 0.0,
            road: first_road,
            final_road,
            path: route.roads,
            cursor: 0,
            start_time,
            expected_time: route.time,
        }
    }

    /// Gets the vehicle's ID.
    pub fn id(&self) -> VehicleId {
        self.id
    }

    /// The point the trip starts at.
    pub fn source(&self) -> Point2d {
        self.source
    }

    /// The point the trip ends at.
    pub fn destination(&self) -> Point2d {
        self.destination
    }

    pub fn location(&self) -> Point2d {
        self.location
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    /// The road the vehicle is on.
    pub fn road(&self) -> RoadId {
        self.road
    }

    /// The road the trip ends on.
    pub fn final_road(&self) -> RoadId {
        self.final_road
    }

    /// The roads between the first and final road.
    pub fn path(&self) -> &[RoadId] {
        &self.path
    }

    /// Whether another road follows the current one.
    pub fn has_next_road(&self) -> bool {
        self.cursor <= self.path.len()
    }

    /// The road following the current one.
    pub fn peek_next_road(&self) -> Option<RoadId> {
        match self.cursor {
            idx if idx < self.path.len() => Some(self.path[idx]),
            idx if idx == self.path.len() => Some(self.final_road),
            _ => None,
        }
    }

    /// Moves the cursor past the next road and returns it.
    pub(crate) fn advance_road(&mut self) -> Option<RoadId> {
        let next = self.peek_next_road()?;
        self.cursor += 1;
        Some(next)
    }

    /// The time the trip started.
    pub fn start_time(&self) -> f64 {
        self.start_time
    }

    /// The expected duration of the trip.
    pub fn expected_time(&self) -> f64 {
        self.expected_time
    }

    /// The time spent on the trip so far.
    pub fn elapsed_time(&self, now: f64) -> f64 {
        now - self.start_time
    }

    pub(crate) fn set_road(&mut self, road: RoadId) {
        self.road = road;
    }

    pub(crate) fn set_speed(&mut self, speed: f64) {
        self.speed = speed;
    }

    pub(crate) fn set_location(&mut self, location: Point2d) {
        self.location = location;
    }

    /// Moves the vehicle towards `target` for `dt` at its current speed.
    /// The vehicle may overshoot the target.
    pub(crate) fn drive_towards(&mut self, target: Point2d, dt: f64) {
        self.location = self.location.step_towards(&target, dt * self.speed);
    }
}
