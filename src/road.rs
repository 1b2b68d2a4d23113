use crate::math::{distance, Point2d, PointExt};
use crate::util::Interval;
use crate::{Intersection, IntersectionId, RoadId, VehicleId};
use rand::Rng;
use rand_distr::{Distribution, Normal};
use std::collections::{HashSet, VecDeque};

/// The slowest speed a vehicle will be assigned.
pub const MIN_SPEED: f64 = 0.001;

/// A directed, capacity-bounded road between two intersections.
#[derive(Clone, Debug)]
pub struct RoadSegment {
    /// The road ID.
    id: RoadId,
    /// The intersection the road starts at.
    source: IntersectionId,
    /// The intersection the road ends at.
    destination: IntersectionId,
    /// The location of the source intersection.
    source_loc: Point2d,
    /// The location of the destination intersection.
    destination_loc: Point2d,
    /// The length of the road.
    length: f64,
    /// The speed limit.
    speed_limit: f64,
    /// The maximum number of vehicles on the road.
    capacity: usize,
    /// The vehicles on the road, in order of entry.
    vehicles: Vec<VehicleId>,
    /// The vehicles stopped at the end of the road.
    waiting: VecDeque<VehicleId>,
    /// The members of `waiting`.
    queued: HashSet<VehicleId>,
    /// The vehicles scheduled to enter this road next.
    incoming: HashSet<VehicleId>,
    /// The latest time a vehicle left the waiting queue.
    latest_time: f64,
}

impl RoadSegment {
    /// Creates a road. The caller validates the speed limit.
    pub(crate) fn new(
        id: RoadId,
        source: &Intersection,
        destination: &Intersection,
        speed_limit: f64,
        capacity: usize,
    ) -> Self {
        let source_loc = source.location();
        let destination_loc = destination.location();
        Self {
            id,
            source: source.id(),
            destination: destination.id(),
            source_loc,
            destination_loc,
            length: distance(source_loc, destination_loc),
            speed_limit,
            capacity,
            vehicles: vec![],
            waiting: VecDeque::new(),
            queued: HashSet::new(),
            incoming: HashSet::new(),
            latest_time: 0.0,
        }
    }

    /// Gets the road ID.
    pub fn id(&self) -> RoadId {
        self.id
    }

    /// The intersection the road starts at.
    pub fn source(&self) -> IntersectionId {
        self.source
    }

    /// The intersection the road ends at.
    pub fn destination(&self) -> IntersectionId {
        self.destination
    }

    /// The location of the start of the road.
    pub fn source_location(&self) -> Point2d {
        self.source_loc
    }

    /// The location of the end of the road.
    pub fn destination_location(&self) -> Point2d {
        self.destination_loc
    }

    pub fn length(&self) -> f64 {
        self.length
    }

    pub fn speed_limit(&self) -> f64 {
        self.speed_limit
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The number of vehicles on the road.
    pub fn flow(&self) -> usize {
        self.vehicles.len()
    }

    /// The number of vehicles that may still enter the road.
    pub fn spare_capacity(&self) -> usize {
        self.capacity.saturating_sub(self.flow())
    }

    pub fn has_spare_capacity(&self) -> bool {
        self.spare_capacity() >= 1
    }

    /// The time it takes to travel the road at the speed limit.
    pub fn expected_time(&self) -> f64 {
        self.length / self.speed_limit
    }

    /// The direction of the road as an angle between -pi and pi.
    pub fn direction(&self) -> f64 {
        self.source_loc.angle_to(&self.destination_loc)
    }

    /// The expected speed of vehicles entering the road given the current flow.
    /// Congestion suppresses the speed to around 11% of the limit at capacity.
    pub fn projected_speed(&self) -> f64 {
        if self.capacity == 0 {
            return self.speed_limit;
        }
        let factor = 2.0 - f64::cosh(1.25 * self.flow() as f64 / self.capacity as f64);
        factor * self.speed_limit
    }

    /// Samples a speed from a normal distribution centred on the projected speed,
    /// with a standard deviation of 20% of it, bounded by [MIN_SPEED] and the limit.
    pub fn random_speed(&self, rng: &mut impl Rng) -> f64 {
        let proj = self.projected_speed();
        let distr = Normal::new(proj, 0.2 * proj).expect("Invalid standard deviation");
        Interval::new(MIN_SPEED, self.speed_limit).clamp(distr.sample(rng))
    }

    /// Picks a uniformly random point along the road.
    pub fn random_location(&self, rng: &mut impl Rng) -> Point2d {
        let dist = self.length * rng.gen::<f64>();
        self.source_loc.step_towards(&self.destination_loc, dist)
    }

    /// The vehicles on the road, in order of entry.
    pub fn vehicles(&self) -> &[VehicleId] {
        &self.vehicles
    }

    /// Whether the vehicle is on the road.
    pub fn contains(&self, id: VehicleId) -> bool {
        self.vehicles.contains(&id)
    }

    /// Whether the vehicle is scheduled to enter the road next.
    pub fn has_incoming(&self, id: VehicleId) -> bool {
        self.incoming.contains(&id)
    }

    /// Schedules the vehicle to enter this road next.
    pub(crate) fn add_incoming(&mut self, id: VehicleId) {
        let inserted = self.incoming.insert(id);
        assert!(
            inserted,
            "vehicle {:?} is already scheduled to enter road {:?}",
            id, self.id
        );
    }

    /// Withdraws a vehicle's reservation, if it has one.
    pub(crate) fn cancel_incoming(&mut self, id: VehicleId) {
        self.incoming.remove(&id);
    }

    /// Admits a vehicle previously scheduled with [Self::add_incoming].
    /// Returns `false` if the vehicle is already on the road or the road is full.
    pub(crate) fn add_vehicle(&mut self, id: VehicleId) -> bool {
        assert!(
            self.incoming.contains(&id),
            "vehicle {:?} is not scheduled to enter road {:?}",
            id,
            self.id
        );
        if self.contains(id) || !self.has_spare_capacity() {
            return false;
        }
        self.vehicles.push(id);
        self.incoming.remove(&id);
        true
    }

    /// Removes a vehicle from the road.
    /// Returns `false` if the vehicle was not on the road.
    pub(crate) fn remove_vehicle(&mut self, id: VehicleId) -> bool {
        assert!(
            !self.queued.contains(&id),
            "vehicle {:?} is still queued on road {:?}",
            id,
            self.id
        );
        assert!(
            !self.incoming.contains(&id),
            "vehicle {:?} is still scheduled to enter road {:?}",
            id,
            self.id
        );
        match self.vehicles.iter().position(|v| *v == id) {
            Some(idx) => {
                self.vehicles.remove(idx);
                true
            }
            None => false,
        }
    }

    /// Stops a vehicle, adding it to the back of the waiting queue.
    /// Returns `false` if it is already queued.
    pub(crate) fn stop(&mut self, id: VehicleId) -> bool {
        assert!(
            self.contains(id),
            "vehicle {:?} is not on road {:?}",
            id,
            self.id
        );
        if !self.queued.insert(id) {
            return false;
        }
        self.waiting.push_back(id);
        true
    }

    /// The vehicle at the front of the waiting queue.
    pub fn next_in_queue(&self) -> Option<VehicleId> {
        self.waiting.front().copied()
    }

    /// The vehicle at the back of the waiting queue.
    pub fn last_in_queue(&self) -> Option<VehicleId> {
        self.waiting.back().copied()
    }

    /// Releases the vehicle at the front of the waiting queue at time `now`.
    pub(crate) fn dequeue(&mut self, now: f64) -> Option<VehicleId> {
        let id = self.waiting.pop_front()?;
        self.queued.remove(&id);
        self.latest_time = now;
        Some(id)
    }

    pub fn count_in_queue(&self) -> usize {
        self.waiting.len()
    }

    /// Whether the vehicle is waiting in the queue.
    pub fn is_stopped(&self, id: VehicleId) -> bool {
        self.queued.contains(&id)
    }

    /// The latest time a vehicle left the waiting queue.
    pub fn latest_time(&self) -> f64 {
        self.latest_time
    }
}
