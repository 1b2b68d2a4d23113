use crate::error::{Error, Result};
use crate::math::{distance, Point2d};
use crate::router;
use crate::stats::TripStats;
use crate::{
    Intersection, IntersectionId, IntersectionSet, RoadId, RoadSegment, RoadSet, Vehicle,
    VehicleId, VehicleSet,
};
use log::debug;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use slotmap::SecondaryMap;

/// A road network: a directed graph of intersections and road segments,
/// along with the vehicles travelling on it.
#[derive(Clone, Debug)]
pub struct Network {
    /// The intersections.
    intersections: IntersectionSet,
    /// The road segments.
    roads: RoadSet,
    /// The vehicles.
    vehicles: VehicleSet,
    /// The road segments in a dense, compacted order.
    road_index: Vec<RoadId>,
    /// The position of each road segment in `road_index`.
    road_position: SecondaryMap<RoadId, usize>,
    /// The efficiency of the completed trips.
    stats: TripStats,
    /// The random number generator used for speeds and spawning.
    rng: StdRng,
}

impl Default for Network {
    fn default() -> Self {
        Self::new()
    }
}

impl Network {
    /// Creates an empty network with an entropy-seeded random number generator.
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Creates an empty network whose randomness is reproducible.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            intersections: IntersectionSet::default(),
            roads: RoadSet::default(),
            vehicles: VehicleSet::default(),
            road_index: vec![],
            road_position: SecondaryMap::new(),
            stats: TripStats::default(),
            rng,
        }
    }

    /// Creates an intersection at the given location.
    pub fn create_intersection(&mut self, location: Point2d) -> IntersectionId {
        let id = self
            .intersections
            .insert_with_key(|id| Intersection::new(id, location));
        debug!("created intersection {:?} at {:?}", id, location);
        id
    }

    /// Creates a road segment from `source` to `destination` and links it into both.
    pub fn create_road_segment(
        &mut self,
        source: IntersectionId,
        destination: IntersectionId,
        speed_limit: f64,
        capacity: usize,
    ) -> Result<RoadId> {
        for id in [source, destination] {
            if !self.intersections.contains_key(id) {
                return Err(Error::UnknownIntersection(id));
            }
        }
        if !speed_limit.is_finite() || speed_limit <= 0.0 {
            return Err(Error::InvalidSpeedLimit(speed_limit));
        }
        if source == destination {
            return Err(Error::SelfLoop(source));
        }

        let (src, dst) = (&self.intersections[source], &self.intersections[destination]);
        let id = self
            .roads
            .insert_with_key(|id| RoadSegment::new(id, src, dst, speed_limit, capacity));
        let road = &self.roads[id];
        self.intersections[source].add(road);
        self.intersections[destination].add(road);
        self.road_position.insert(id, self.road_index.len());
        self.road_index.push(id);
        debug!(
            "created road segment {:?} from {:?} to {:?}",
            id, source, destination
        );
        Ok(id)
    }

    /// Removes a road segment, then any endpoint left without roads.
    /// Returns `false` if the road segment is unknown.
    ///
    /// # Panics
    ///
    /// Panics if vehicles are on the road.
    pub fn remove_road_segment(&mut self, id: RoadId) -> bool {
        let road = match self.detach(id) {
            Some(road) => road,
            None => return false,
        };
        for endpoint in [road.source(), road.destination()] {
            let isolated = self
                .intersections
                .get(endpoint)
                .map_or(false, |i| i.indegree() + i.outdegree() == 0);
            if isolated {
                self.intersections.remove(endpoint);
                debug!("removed isolated intersection {:?}", endpoint);
            }
        }
        true
    }

    /// Replaces a road segment with two segments through the intersection `via`,
    /// keeping its speed limit and capacity.
    pub fn split_road_segment(
        &mut self,
        id: RoadId,
        via: IntersectionId,
    ) -> Result<(RoadId, RoadId)> {
        let road = self.roads.get(id).ok_or(Error::UnknownRoad(id))?;
        if !self.intersections.contains_key(via) {
            return Err(Error::UnknownIntersection(via));
        }
        let (source, destination) = (road.source(), road.destination());
        if via == source || via == destination {
            return Err(Error::SelfLoop(via));
        }
        let (speed_limit, capacity) = (road.speed_limit(), road.capacity());

        // The endpoints are kept as they are re-linked straight away
        self.detach(id);
        let first = self.create_road_segment(source, via, speed_limit, capacity)?;
        let second = self.create_road_segment(via, destination, speed_limit, capacity)?;
        debug!("split road segment {:?} at {:?}", id, via);
        Ok((first, second))
    }

    /// Unlinks a road segment from its endpoints and the dense index.
    fn detach(&mut self, id: RoadId) -> Option<RoadSegment> {
        let road = self.roads.remove(id)?;
        assert!(
            road.flow() == 0,
            "road segment {:?} still carries {} vehicles",
            id,
            road.flow()
        );
        for endpoint in [road.source(), road.destination()] {
            if let Some(intersection) = self.intersections.get_mut(endpoint) {
                intersection.remove(&road);
            }
        }
        if let Some(pos) = self.road_position.remove(id) {
            self.road_index.swap_remove(pos);
            if let Some(moved) = self.road_index.get(pos) {
                self.road_position[*moved] = pos;
            }
        }
        debug!("removed road segment {:?}", id);
        Some(road)
    }

    /// Derives the traffic lights of an intersection from the geometry of its roads.
    pub fn auto_connect_and_link(&mut self, id: IntersectionId) -> Result<()> {
        let intersection = self
            .intersections
            .get_mut(id)
            .ok_or(Error::UnknownIntersection(id))?;
        intersection.auto_connect_and_link(&self.roads);
        Ok(())
    }

    /// Derives the traffic lights of every intersection.
    pub fn auto_connect_all(&mut self) {
        for intersection in self.intersections.values_mut() {
            intersection.auto_connect_and_link(&self.roads);
        }
    }

    /// Gets a reference to the intersection with the given ID.
    pub fn intersection(&self, id: IntersectionId) -> Option<&Intersection> {
        self.intersections.get(id)
    }

    /// Gets a mutable reference to the intersection with the given ID.
    pub fn intersection_mut(&mut self, id: IntersectionId) -> Option<&mut Intersection> {
        self.intersections.get_mut(id)
    }

    /// Gets a reference to the road segment with the given ID.
    pub fn road(&self, id: RoadId) -> Option<&RoadSegment> {
        self.roads.get(id)
    }

    /// Gets a reference to the vehicle with the given ID.
    pub fn vehicle(&self, id: VehicleId) -> Option<&Vehicle> {
        self.vehicles.get(id)
    }

    /// Returns an iterator over all the intersections.
    pub fn intersections(&self) -> impl Iterator<Item = &Intersection> {
        self.intersections.values()
    }

    /// Returns an iterator over all the road segments.
    pub fn roads(&self) -> impl Iterator<Item = &RoadSegment> {
        self.roads.values()
    }

    /// Returns an iterator over all the vehicles.
    pub fn vehicles(&self) -> impl Iterator<Item = &Vehicle> {
        self.vehicles.values()
    }

    /// The road segments, for the intersection flow queries.
    pub fn road_set(&self) -> &RoadSet {
        &self.roads
    }

    pub fn count_intersections(&self) -> usize {
        self.intersections.len()
    }

    pub fn count_road_segments(&self) -> usize {
        self.roads.len()
    }

    pub fn count_vehicles(&self) -> usize {
        self.vehicles.len()
    }

    /// The number of roads ending at an intersection.
    pub fn indegree(&self, id: IntersectionId) -> Option<usize> {
        self.intersections.get(id).map(|i| i.indegree())
    }

    /// The number of roads starting at an intersection.
    pub fn outdegree(&self, id: IntersectionId) -> Option<usize> {
        self.intersections.get(id).map(|i| i.outdegree())
    }

    /// The road segment at the given position of the dense index.
    pub fn road_at(&self, index: usize) -> Option<RoadId> {
        self.road_index.get(index).copied()
    }

    /// The position of a road segment in the dense index.
    pub fn compressed_index(&self, id: RoadId) -> Option<usize> {
        self.road_position.get(id).copied()
    }

    /// The road segments in dense index order.
    pub fn road_ids(&self) -> &[RoadId] {
        &self.road_index
    }

    /// The statistics of the completed trips.
    pub fn stats(&self) -> &TripStats {
        &self.stats
    }

    /// The mean ratio of expected to actual trip time.
    pub fn efficiency(&self) -> f64 {
        self.stats.efficiency()
    }

    /// Forgets the completed trips, starting a fresh efficiency aggregate.
    pub fn reset_stats(&mut self) {
        self.stats.reset();
    }

    /// Picks a random road segment with spare capacity.
    pub fn random_road_segment(&mut self) -> Option<RoadId> {
        let roads = &self.roads;
        let candidates = self
            .road_index
            .iter()
            .copied()
            .filter(|id| roads[*id].has_spare_capacity())
            .collect::<Vec<_>>();
        candidates.choose(&mut self.rng).copied()
    }

    /// Picks a random point along a road segment.
    pub fn random_location(&mut self, id: RoadId) -> Option<Point2d> {
        let road = self.roads.get(id)?;
        Some(road.random_location(&mut self.rng))
    }

    /// Creates a vehicle travelling from `source` to `destination` and places it
    /// on whichever source road gives the quickest expected trip.
    ///
    /// `source_roads` are the roads the vehicle may start on and
    /// `destination_roads` the roads it may finish on.
    ///
    /// # Panics
    ///
    /// Panics if a source road has no spare capacity.
    pub fn spawn_vehicle(
        &mut self,
        source: Point2d,
        destination: Point2d,
        source_roads: &[RoadId],
        destination_roads: &[RoadId],
        time: f64,
    ) -> Result<VehicleId> {
        let mut sources = Vec::with_capacity(source_roads.len());
        for id in source_roads {
            let road = self.roads.get(*id).ok_or(Error::UnknownRoad(*id))?;
            assert!(
                road.has_spare_capacity(),
                "source road {:?} has no spare capacity",
                id
            );
            let offset = distance(road.destination_location(), source) / road.speed_limit();
            sources.push((road.destination(), offset));
        }
        let mut destinations = Vec::with_capacity(destination_roads.len());
        for id in destination_roads {
            let road = self.roads.get(*id).ok_or(Error::UnknownRoad(*id))?;
            let excess = distance(road.source_location(), destination) / road.speed_limit();
            destinations.push((road.source(), excess));
        }

        let route = router::shortest_route(self, &sources, &destinations).ok_or(Error::NoRoute)?;
        let first_road = source_roads[route.source];
        let final_road = destination_roads[route.destination];
        let id = self.vehicles.insert_with_key(|id| {
            Vehicle::new(id, source, destination, first_road, final_road, route, time)
        });
        self.roads[first_road].add_incoming(id);
        self.admit(id, first_road);
        debug!(
            "spawned vehicle {:?} on road {:?}, expected trip time {}",
            id,
            first_road,
            self.vehicles[id].expected_time()
        );
        Ok(id)
    }

    /// Spawns a vehicle between random points of two random road segments.
    pub fn spawn_random_vehicle(&mut self, time: f64) -> Result<VehicleId> {
        let src = self.random_road_segment().ok_or(Error::NoCandidateRoad)?;
        let roads = &self.roads;
        let from = &roads[src];
        let candidates = self
            .road_index
            .iter()
            .copied()
            .filter(|id| {
                let to = &roads[*id];
                *id != src
                    && to.has_spare_capacity()
                    && from.destination() != to.source()
                    && from.source() != to.destination()
            })
            .collect::<Vec<_>>();
        let dst = *candidates
            .choose(&mut self.rng)
            .ok_or(Error::NoCandidateRoad)?;

        let source = self.roads[src].random_location(&mut self.rng);
        let destination = self.roads[dst].random_location(&mut self.rng);
        self.spawn_vehicle(source, destination, &[src], &[dst], time)
    }

    pub(crate) fn road_mut(&mut self, id: RoadId) -> &mut RoadSegment {
        &mut self.roads[id]
    }

    pub(crate) fn vehicle_mut(&mut self, id: VehicleId) -> &mut Vehicle {
        &mut self.vehicles[id]
    }

    /// The road segment IDs in arena order.
    pub(crate) fn road_keys(&self) -> Vec<RoadId> {
        self.roads.keys().collect()
    }

    /// Moves a reserved vehicle onto a road segment, gives it a new speed
    /// and reserves its place on the road after.
    /// Returns `false` if the vehicle is already on the road or the road is full.
    pub(crate) fn admit(&mut self, id: VehicleId, road_id: RoadId) -> bool {
        let road = &mut self.roads[road_id];
        if !road.add_vehicle(id) {
            return false;
        }
        let speed = road.random_speed(&mut self.rng);
        let vehicle = &mut self.vehicles[id];
        vehicle.set_road(road_id);
        vehicle.set_speed(speed);
        if let Some(next) = vehicle.peek_next_road() {
            self.roads[next].add_incoming(id);
        }
        true
    }

    /// Records the trip of a vehicle which has left the network and deletes it.
    pub(crate) fn finish_trip(&mut self, id: VehicleId, time: f64) {
        if let Some(vehicle) = self.vehicles.remove(id) {
            if let Some(next) = vehicle.peek_next_road().and_then(|r| self.roads.get_mut(r)) {
                next.cancel_incoming(id);
            }
            let actual = vehicle.elapsed_time(time);
            self.stats.record(vehicle.expected_time(), actual);
            debug!(
                "vehicle {:?} arrived after {} (expected {})",
                id,
                actual,
                vehicle.expected_time()
            );
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::math::{point, PointExt};
    use assert_approx_eq::assert_approx_eq;
    use itertools::Itertools;

    fn line() -> (Network, IntersectionId, IntersectionId, RoadId) {
        let mut net = Network::with_seed(2);
        let a = net.create_intersection(point(0.0, 0.0));
        let b = net.create_intersection(point(100.0, 0.0));
        let road = net.create_road_segment(a, b, 10.0, 4).unwrap();
        (net, a, b, road)
    }

    #[test]
    fn create_road_segment_links_endpoints() {
        let (net, a, b, road) = line();
        assert_eq!(net.count_intersections(), 2);
        assert_eq!(net.count_road_segments(), 1);
        assert_eq!(net.outdegree(a), Some(1));
        assert_eq!(net.indegree(b), Some(1));
        assert_eq!(net.indegree(a), Some(0));
        assert_eq!(net.intersection(a).unwrap().road_to(b), Some(road));
        assert_eq!(net.intersection(b).unwrap().road_from(a), Some(road));
        assert_eq!(net.road_at(0), Some(road));
        assert_eq!(net.compressed_index(road), Some(0));
    }

    #[test]
    fn create_road_segment_validates() {
        let (mut net, a, b, _) = line();
        assert_eq!(
            net.create_road_segment(a, b, 0.0, 1),
            Err(Error::InvalidSpeedLimit(0.0))
        );
        assert!(matches!(
            net.create_road_segment(a, b, f64::NAN, 1),
            Err(Error::InvalidSpeedLimit(_))
        ));
        assert_eq!(net.create_road_segment(a, a, 5.0, 1), Err(Error::SelfLoop(a)));

        let missing = IntersectionId::default();
        assert_eq!(
            net.create_road_segment(a, missing, 5.0, 1),
            Err(Error::UnknownIntersection(missing))
        );
    }

    #[test]
    fn remove_prunes_isolated_intersections() {
        let mut net = Network::with_seed(2);
        let a = net.create_intersection(point(0.0, 0.0));
        let b = net.create_intersection(point(100.0, 0.0));
        let c = net.create_intersection(point(100.0, 100.0));
        let ab = net.create_road_segment(a, b, 10.0, 4).unwrap();
        let bc = net.create_road_segment(b, c, 10.0, 4).unwrap();

        assert!(net.remove_road_segment(ab));
        assert!(!net.remove_road_segment(ab));
        assert!(net.intersection(a).is_none());
        assert!(net.intersection(b).is_some());
        assert_eq!(net.road_ids(), &[bc]);
        assert_eq!(net.compressed_index(bc), Some(0));

        assert!(net.remove_road_segment(bc));
        assert_eq!(net.count_intersections(), 0);
        assert!(net.road_ids().is_empty());
    }

    #[test]
    fn dense_index_stays_compact() {
        let mut net = Network::with_seed(2);
        let ids = (0..4)
            .map(|i| net.create_intersection(point(i as f64 * 10.0, 0.0)))
            .collect::<Vec<_>>();
        let roads = ids
            .iter()
            .tuple_windows()
            .map(|(a, b)| net.create_road_segment(*a, *b, 5.0, 1).unwrap())
            .collect::<Vec<_>>();
        net.create_road_segment(ids[3], ids[0], 5.0, 1).unwrap();

        assert!(net.remove_road_segment(roads[0]));
        assert_eq!(net.road_ids().len(), 3);
        for (pos, road) in net.road_ids().iter().enumerate() {
            assert_eq!(net.compressed_index(*road), Some(pos));
            assert_eq!(net.road_at(pos), Some(*road));
        }
        assert_eq!(net.compressed_index(roads[0]), None);
    }

    #[test]
    fn split_preserves_length_and_connectivity() {
        let (mut net, a, b, road) = line();
        let mid = net.create_intersection(point(50.0, 0.0));
        let length = net.road(road).unwrap().length();
        let (first, second) = net.split_road_segment(road, mid).unwrap();

        assert!(net.road(road).is_none());
        let (first, second) = (net.road(first).unwrap(), net.road(second).unwrap());
        assert_approx_eq!(first.length() + second.length(), length);
        assert_eq!((first.source(), first.destination()), (a, mid));
        assert_eq!((second.source(), second.destination()), (mid, b));
        assert_eq!(first.speed_limit(), 10.0);
        assert_eq!(second.capacity(), 4);
        assert_eq!(net.count_intersections(), 3);
        assert_eq!(net.count_road_segments(), 2);
    }

    #[test]
    fn split_rejects_endpoints() {
        let (mut net, a, _, road) = line();
        assert_eq!(net.split_road_segment(road, a), Err(Error::SelfLoop(a)));
        assert!(net.road(road).is_some());
    }

    #[test]
    fn spawn_places_vehicle_on_source_road() {
        let mut net = Network::with_seed(2);
        let a = net.create_intersection(point(0.0, 0.0));
        let b = net.create_intersection(point(100.0, 0.0));
        let c = net.create_intersection(point(200.0, 0.0));
        let ab = net.create_road_segment(a, b, 10.0, 4).unwrap();
        let bc = net.create_road_segment(b, c, 10.0, 4).unwrap();

        let id = net
            .spawn_vehicle(point(20.0, 0.0), point(150.0, 0.0), &[ab], &[bc], 3.0)
            .unwrap();
        let vehicle = net.vehicle(id).unwrap();
        assert_eq!(vehicle.road(), ab);
        assert_eq!(vehicle.final_road(), bc);
        assert!(vehicle.path().is_empty());
        // 80 to the end of the first road, 50 along the last
        assert_approx_eq!(vehicle.expected_time(), 13.0);
        assert_eq!(vehicle.start_time(), 3.0);
        assert!(vehicle.location().approx_eq(&point(20.0, 0.0)));
        assert!(vehicle.speed() > 0.0 && vehicle.speed() <= 10.0);
        assert_eq!(net.road(ab).unwrap().flow(), 1);
        assert!(net.road(bc).unwrap().has_incoming(id));
    }

    #[test]
    fn spawn_without_route_fails() {
        let mut net = Network::with_seed(2);
        let a = net.create_intersection(point(0.0, 0.0));
        let b = net.create_intersection(point(100.0, 0.0));
        let c = net.create_intersection(point(200.0, 0.0));
        let d = net.create_intersection(point(300.0, 0.0));
        let ab = net.create_road_segment(a, b, 10.0, 4).unwrap();
        let cd = net.create_road_segment(c, d, 10.0, 4).unwrap();

        let result = net.spawn_vehicle(point(0.0, 0.0), point(300.0, 0.0), &[ab], &[cd], 0.0);
        assert_eq!(result, Err(Error::NoRoute));
        assert_eq!(net.count_vehicles(), 0);
        assert_eq!(net.road(ab).unwrap().flow(), 0);
    }

    /// Two consecutive roads from (0, 0) through (100, 0) to (200, 0).
    fn chain(capacity: usize) -> (Network, RoadId, RoadId) {
        let mut net = Network::with_seed(4);
        let a = net.create_intersection(point(0.0, 0.0));
        let b = net.create_intersection(point(100.0, 0.0));
        let c = net.create_intersection(point(200.0, 0.0));
        let ab = net.create_road_segment(a, b, 10.0, capacity).unwrap();
        let bc = net.create_road_segment(b, c, 10.0, capacity).unwrap();
        (net, ab, bc)
    }

    #[test]
    #[should_panic]
    fn spawn_on_full_road_panics() {
        let (mut net, ab, bc) = chain(2);
        for _ in 0..3 {
            net.spawn_vehicle(point(0.0, 0.0), point(200.0, 0.0), &[ab], &[bc], 0.0)
                .ok();
        }
    }

    #[test]
    fn random_spawn_needs_two_unrelated_roads() {
        let (mut net, _, _, _) = line();
        assert_eq!(net.spawn_random_vehicle(0.0), Err(Error::NoCandidateRoad));

        let mut net = Network::with_seed(9);
        let ids = [
            net.create_intersection(point(0.0, 0.0)),
            net.create_intersection(point(100.0, 0.0)),
            net.create_intersection(point(100.0, 100.0)),
            net.create_intersection(point(0.0, 100.0)),
        ];
        for (a, b) in ids.iter().circular_tuple_windows() {
            net.create_road_segment(*a, *b, 10.0, 2).unwrap();
            net.create_road_segment(*b, *a, 10.0, 2).unwrap();
        }
        for _ in 0..6 {
            let id = net.spawn_random_vehicle(0.0).unwrap();
            let vehicle = net.vehicle(id).unwrap();
            let (from, to) = (
                net.road(vehicle.road()).unwrap(),
                net.road(vehicle.final_road()).unwrap(),
            );
            assert_ne!(from.id(), to.id());
            assert_ne!(from.destination(), to.source());
            assert_ne!(from.source(), to.destination());
        }
        assert!(net.roads().all(|r| r.flow() <= r.capacity()));
    }

    #[test]
    fn random_road_segment_skips_full_roads() {
        let (mut net, ab, bc) = chain(2);
        for _ in 0..2 {
            net.spawn_vehicle(point(0.0, 0.0), point(200.0, 0.0), &[ab], &[bc], 0.0)
                .unwrap();
        }
        assert_eq!(net.road(ab).unwrap().spare_capacity(), 0);
        for _ in 0..10 {
            assert_eq!(net.random_road_segment(), Some(bc));
        }
    }

    #[test]
    fn random_spawn_skips_full_destinations() {
        let mut net = Network::with_seed(5);
        let ids = [
            net.create_intersection(point(0.0, 0.0)),
            net.create_intersection(point(100.0, 0.0)),
            net.create_intersection(point(100.0, 100.0)),
            net.create_intersection(point(0.0, 100.0)),
        ];
        let mut roads = vec![];
        for (a, b) in ids.iter().circular_tuple_windows() {
            roads.push(net.create_road_segment(*a, *b, 10.0, 1).unwrap());
            roads.push(net.create_road_segment(*b, *a, 10.0, 1).unwrap());
        }
        let ab = roads[0];
        let cd = roads[4];

        // Fill every road but two opposite sides of the square
        for road in roads.iter().copied().filter(|r| *r != ab && *r != cd) {
            let end = net.road(road).unwrap().destination();
            let next = net.intersection(end).unwrap().outbound_roads()[0];
            let (start, finish) = (
                net.road(road).unwrap().source_location(),
                net.intersection(end).unwrap().location(),
            );
            net.spawn_vehicle(start, finish, &[road], &[next], 0.0)
                .unwrap();
            assert!(!net.road(road).unwrap().has_spare_capacity());
        }

        let id = net.spawn_random_vehicle(0.0).unwrap();
        let vehicle = net.vehicle(id).unwrap();
        let mut trip = [vehicle.road(), vehicle.final_road()];
        trip.sort();
        let mut sides = [ab, cd];
        sides.sort();
        assert_eq!(trip, sides);

        // The remaining free side has no free destination left
        assert_eq!(net.spawn_random_vehicle(0.0), Err(Error::NoCandidateRoad));
    }

    #[test]
    fn reset_stats_forgets_trips() {
        let mut net = Network::with_seed(6);
        net.stats.record(10.0, 20.0);
        assert_approx_eq!(net.efficiency(), 0.5);
        net.reset_stats();
        assert_eq!(net.stats().reached(), 0);
        assert_eq!(net.efficiency(), 1.0);
    }
}
