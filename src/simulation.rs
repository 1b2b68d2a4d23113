use crate::controller::{self, ControlPolicy, Controller, Event};
use crate::error::Result;
use crate::light::TurnType;
use crate::math::distance;
use crate::{Network, RoadId, TrafficLight, VehicleId};
use log::{info, warn};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// The parameters of a [Simulation].
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SimulationConfig {
    /// The time between two vehicles leaving the same waiting queue.
    pub reaction_time: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self { reaction_time: 0.1 }
    }
}

/// A traffic simulation: a road network whose signals are driven by a controller.
pub struct Simulation {
    /// The road network and its vehicles.
    network: Network,
    /// The signal controller.
    controller: Box<dyn Controller>,
    /// The simulation parameters.
    config: SimulationConfig,
    /// The current time.
    time: f64,
    /// The number of steps simulated.
    frame: usize,
}

/// What happens to a vehicle once every vehicle on its road has moved.
#[derive(Clone, Copy, Debug)]
enum Outcome {
    /// The vehicle reached its destination point.
    Arrive(VehicleId),
    /// The vehicle reached the end of its road.
    Exit(VehicleId),
}

impl Simulation {
    /// Creates a simulation starting at time 0.
    pub fn new(network: Network, controller: Box<dyn Controller>) -> Self {
        Self {
            network,
            controller,
            config: SimulationConfig::default(),
            time: 0.0,
            frame: 0,
        }
    }

    /// Creates a simulation driven by the controller implementing `policy`.
    pub fn with_policy(network: Network, policy: ControlPolicy) -> Self {
        Self::new(network, controller::create(policy))
    }

    /// Replaces the simulation parameters.
    pub fn with_config(mut self, config: SimulationConfig) -> Self {
        self.config = config;
        self
    }

    /// Schedules every intersection to cycle at the given time.
    pub fn schedule_initial_events(&mut self, time: f64) {
        let ids = self
            .network
            .intersections()
            .map(|i| i.id())
            .collect::<Vec<_>>();
        for id in &ids {
            self.controller
                .add_event(Event::new(time, *id), &mut self.network);
        }
        info!("scheduled {} intersections to cycle at {}", ids.len(), time);
    }

    /// Spawns a vehicle between two random roads at the current time.
    pub fn spawn_random_vehicle(&mut self) -> Result<VehicleId> {
        match self.network.spawn_random_vehicle(self.time) {
            Ok(id) => Ok(id),
            Err(err) => {
                warn!("skipped spawning a vehicle at {}: {}", self.time, err);
                Err(err)
            }
        }
    }

    /// Advances the simulation by `dt`.
    pub fn step(&mut self, dt: f64) {
        self.time += dt;
        self.controller.run_events(self.time, &mut self.network);

        let mut done = HashSet::new();
        for road in self.network.road_keys() {
            self.release_queue(road, &mut done);
            let outcomes = self.advance_vehicles(road, dt, &mut done);
            self.apply_outcomes(road, outcomes);
        }
        self.frame += 1;
    }

    /// The current time.
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Gets the number of steps simulated.
    pub fn frame(&self) -> usize {
        self.frame
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn network(&self) -> &Network {
        &self.network
    }

    pub fn network_mut(&mut self) -> &mut Network {
        &mut self.network
    }

    pub fn controller(&self) -> &dyn Controller {
        self.controller.as_ref()
    }

    /// Lets the vehicle at the front of the road's waiting queue go,
    /// once the previous one has had time to clear.
    fn release_queue(&mut self, road_id: RoadId, done: &mut HashSet<VehicleId>) {
        let road = &self.network.road_set()[road_id];
        let head = match road.next_in_queue() {
            Some(head) if road.latest_time() + self.config.reaction_time <= self.time => head,
            _ => return,
        };
        done.insert(head);
        if !may_leave(&self.network, road_id, head) {
            return;
        }
        let end = road.destination_location();
        self.network.road_mut(road_id).dequeue(self.time);
        self.network.vehicle_mut(head).set_location(end);
        self.move_on(road_id, head);
    }

    /// Drives the moving vehicles on a road and decides which of them stop.
    fn advance_vehicles(
        &mut self,
        road_id: RoadId,
        dt: f64,
        done: &mut HashSet<VehicleId>,
    ) -> Vec<Outcome> {
        let road = &self.network.road_set()[road_id];
        let end = road.destination_location();
        let vehicles = road.vehicles().to_vec();

        let mut outcomes = vec![];
        for id in vehicles {
            if done.contains(&id) || self.network.road_set()[road_id].is_stopped(id) {
                continue;
            }
            done.insert(id);

            let vehicle = self.network.vehicle_mut(id);
            vehicle.drive_towards(end, dt);
            let vehicle = &*vehicle;
            let location = vehicle.location();
            let eps = 0.51 * dt * vehicle.speed();
            let arrived =
                road_id == vehicle.final_road() && distance(vehicle.destination(), location) <= eps;
            let next = vehicle.peek_next_road();

            let road = &self.network.road_set()[road_id];
            let behind_queue = road
                .last_in_queue()
                .and_then(|last| self.network.vehicle(last))
                .map_or(false, |last| distance(last.location(), location) <= eps);

            if arrived {
                outcomes.push(Outcome::Arrive(id));
            } else if behind_queue
                && next.map_or(true, |next| {
                    light_towards(&self.network, road_id, next).turn() == TurnType::Left
                })
            {
                self.stop(road_id, id);
            } else if distance(end, location) <= eps {
                if may_leave(&self.network, road_id, id) {
                    outcomes.push(Outcome::Exit(id));
                } else {
                    self.stop(road_id, id);
                }
            }
        }
        outcomes
    }

    fn apply_outcomes(&mut self, road_id: RoadId, outcomes: Vec<Outcome>) {
        for outcome in outcomes {
            match outcome {
                Outcome::Arrive(id) => {
                    self.leave_road(road_id, id);
                    self.network.finish_trip(id, self.time);
                }
                Outcome::Exit(id) => {
                    let next_full = self
                        .network
                        .vehicle(id)
                        .and_then(|v| v.peek_next_road())
                        .map_or(false, |next| {
                            !self.network.road_set()[next].has_spare_capacity()
                        });
                    if next_full {
                        self.stop(road_id, id);
                    } else {
                        self.move_on(road_id, id);
                    }
                }
            }
        }
    }

    /// Moves a vehicle off the end of its road onto the next road,
    /// or ends its trip if there is none.
    fn move_on(&mut self, road_id: RoadId, id: VehicleId) {
        self.leave_road(road_id, id);
        match self.network.vehicle_mut(id).advance_road() {
            Some(next) => {
                let admitted = self.network.admit(id, next);
                assert!(admitted, "vehicle {:?} could not enter road {:?}", id, next);
                let start = self.network.road_set()[road_id].destination_location();
                self.network.vehicle_mut(id).set_location(start);
            }
            None => self.network.finish_trip(id, self.time),
        }
    }

    fn leave_road(&mut self, road_id: RoadId, id: VehicleId) {
        let removed = self.network.road_mut(road_id).remove_vehicle(id);
        assert!(removed, "vehicle {:?} is not on road {:?}", id, road_id);
    }

    fn stop(&mut self, road_id: RoadId, id: VehicleId) {
        let stopped = self.network.road_mut(road_id).stop(id);
        assert!(stopped, "vehicle {:?} is already stopped", id);
    }
}

/// The light controlling the movement from a road onto the next road.
///
/// # Panics
///
/// Panics if no light joins the two roads.
fn light_towards(network: &Network, road_id: RoadId, next: RoadId) -> &TrafficLight {
    let road = &network.road_set()[road_id];
    network
        .intersection(road.destination())
        .and_then(|i| i.light_between(road_id, next))
        .unwrap_or_else(|| panic!("no light from road {:?} onto road {:?}", road_id, next))
}

/// Whether a vehicle at the end of a road may move on: it has nowhere left
/// to go, or its light is green and the next road has room.
fn may_leave(network: &Network, road_id: RoadId, id: VehicleId) -> bool {
    let next = match network.vehicle(id).and_then(|v| v.peek_next_road()) {
        Some(next) => next,
        None => return true,
    };
    light_towards(network, road_id, next).is_green()
        && network.road_set()[next].has_spare_capacity()
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::math::point;
    use assert_approx_eq::assert_approx_eq;

    /// Two roads joined at an intersection whose only light is straight.
    fn corridor() -> (Network, RoadId, RoadId) {
        let mut net = Network::with_seed(11);
        let a = net.create_intersection(point(0.0, 0.0));
        let b = net.create_intersection(point(20.0, 0.0));
        let c = net.create_intersection(point(40.0, 0.0));
        let ab = net.create_road_segment(a, b, 10.0, 3).unwrap();
        let bc = net.create_road_segment(b, c, 10.0, 3).unwrap();
        net.auto_connect_all();
        (net, ab, bc)
    }

    #[test]
    fn vehicle_waits_for_green() {
        let (mut net, ab, bc) = corridor();
        let id = net
            .spawn_vehicle(point(0.0, 0.0), point(40.0, 0.0), &[ab], &[bc], 0.0)
            .unwrap();
        let mut sim = Simulation::with_policy(net, ControlPolicy::default());

        // No events are scheduled, so the light stays red
        for _ in 0..200 {
            sim.step(0.1);
        }
        let road = sim.network().road(ab).unwrap();
        assert!(road.is_stopped(id));
        assert_eq!(road.count_in_queue(), 1);
        assert!(sim.network().vehicle(id).is_some());
        assert_approx_eq!(sim.time(), 20.0, 1e-9);
        assert_eq!(sim.frame(), 200);
    }

    #[test]
    fn vehicle_completes_trip_on_green() {
        let (mut net, ab, bc) = corridor();
        let id = net
            .spawn_vehicle(point(0.0, 0.0), point(40.0, 0.0), &[ab], &[bc], 0.0)
            .unwrap();
        let mut sim = Simulation::with_policy(net, ControlPolicy::default());
        sim.schedule_initial_events(0.0);
        assert_eq!(sim.controller().pending(), 3);

        let mut entered = false;
        for _ in 0..2000 {
            sim.step(0.1);
            if let Some(vehicle) = sim.network().vehicle(id) {
                entered |= vehicle.road() == bc;
            } else {
                break;
            }
        }
        assert!(entered);
        assert!(sim.network().vehicle(id).is_none());
        assert_eq!(sim.network().stats().reached(), 1);
        assert!(sim.network().efficiency() > 0.0);
        assert!(sim.network().roads().all(|r| r.flow() == 0));
    }

    #[test]
    fn full_road_blocks_the_queue() {
        let mut net = Network::with_seed(12);
        let a = net.create_intersection(point(0.0, 0.0));
        let b = net.create_intersection(point(20.0, 0.0));
        let c = net.create_intersection(point(40.0, 0.0));
        let d = net.create_intersection(point(60.0, 0.0));
        let ab = net.create_road_segment(a, b, 10.0, 3).unwrap();
        let bc = net.create_road_segment(b, c, 10.0, 1).unwrap();
        let cd = net.create_road_segment(c, d, 10.0, 3).unwrap();
        net.auto_connect_all();

        let ahead = net
            .spawn_vehicle(point(20.0, 0.0), point(60.0, 0.0), &[bc], &[cd], 0.0)
            .unwrap();
        let behind = net
            .spawn_vehicle(point(0.0, 0.0), point(60.0, 0.0), &[ab], &[cd], 0.0)
            .unwrap();
        assert_eq!(net.vehicle(behind).unwrap().path(), &[bc]);

        // Only the light at b ever turns green
        let mut controller = controller::create(ControlPolicy::default());
        controller.add_event(Event::new(0.0, b), &mut net);
        let mut sim = Simulation::new(net, controller)
            .with_config(SimulationConfig { reaction_time: 0.5 });
        for _ in 0..100 {
            sim.step(0.1);
        }
        assert_eq!(sim.config().reaction_time, 0.5);

        let net = sim.network();
        assert!(net.intersection(b).unwrap().lights().all(|l| l.is_green()));
        assert_eq!(net.vehicle(ahead).unwrap().road(), bc);
        assert_eq!(net.vehicle(behind).unwrap().road(), ab);
        assert!(net.road(ab).unwrap().is_stopped(behind));
        assert_eq!(net.road(bc).unwrap().flow(), 1);
    }

    #[test]
    fn random_spawn_failure_is_reported() {
        let (net, _, _) = corridor();
        let mut sim = Simulation::with_policy(net, ControlPolicy::default());
        assert!(sim.spawn_random_vehicle().is_err());
    }
}
