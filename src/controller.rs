use crate::{IntersectionId, Network};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

pub use adaptive::{AdaptiveController, AdaptiveTiming};
pub use fixed::{FixedTimeController, FixedTiming};

mod adaptive;
mod fixed;

/// Decides when the traffic lights of each intersection change.
pub trait Controller {
    /// Schedules an intersection to be cycled at the given time.
    fn add_event(&mut self, event: Event, network: &mut Network);

    /// Whether an event is due at time `now`.
    fn has_due_event(&self, now: f64) -> bool;

    /// Cycles every intersection whose event is due at time `now`
    /// and schedules the follow-up events.
    fn run_events(&mut self, now: f64, network: &mut Network);

    /// The number of scheduled events.
    fn pending(&self) -> usize;
}

/// A scheduled cycle of an intersection's traffic lights.
#[derive(Clone, Copy, Debug)]
pub struct Event {
    /// The time the event fires.
    pub time: f64,
    /// The intersection to cycle.
    pub intersection: IntersectionId,
}

impl Event {
    pub fn new(time: f64, intersection: IntersectionId) -> Self {
        Self { time, intersection }
    }
}

impl PartialEq for Event {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Event {}

impl PartialOrd for Event {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Event {
    fn cmp(&self, other: &Self) -> Ordering {
        self.time
            .total_cmp(&other.time)
            .then(self.intersection.cmp(&other.intersection))
    }
}

/// A min-heap of events.
#[derive(Clone, Debug, Default)]
struct EventQueue(BinaryHeap<Reverse<Event>>);

impl EventQueue {
    fn push(&mut self, event: Event) {
        self.0.push(Reverse(event));
    }

    fn is_due(&self, now: f64) -> bool {
        self.0.peek().map_or(false, |event| event.0.time <= now)
    }

    /// Removes the earliest event if it is due at time `now`.
    fn pop_due(&mut self, now: f64) -> Option<Event> {
        if self.is_due(now) {
            self.0.pop().map(|event| event.0)
        } else {
            None
        }
    }

    fn len(&self) -> usize {
        self.0.len()
    }
}

/// The signal timing policy of a simulation.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ControlPolicy {
    /// Pretimed phases of fixed length.
    FixedTiming(FixedTiming),
    /// Phases which end early when the waiting traffic is unbalanced.
    FlowAdaptive(AdaptiveTiming),
}

impl Default for ControlPolicy {
    fn default() -> Self {
        ControlPolicy::FixedTiming(FixedTiming::default())
    }
}

/// Creates the controller implementing a policy.
pub fn create(policy: ControlPolicy) -> Box<dyn Controller> {
    match policy {
        ControlPolicy::FixedTiming(timing) => Box::new(FixedTimeController::new(timing)),
        ControlPolicy::FlowAdaptive(timing) => Box::new(AdaptiveController::new(timing)),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::math::point;
    use crate::TurnType;

    /// A four-way crossing at the origin with two-way roads to the
    /// north, south, east and west intersections, in that order.
    pub(super) fn crossing() -> (Network, IntersectionId, [IntersectionId; 4]) {
        let mut net = Network::with_seed(3);
        let centre = net.create_intersection(point(0.0, 0.0));
        let arms = [
            net.create_intersection(point(0.0, -100.0)),
            net.create_intersection(point(0.0, 100.0)),
            net.create_intersection(point(100.0, 0.0)),
            net.create_intersection(point(-100.0, 0.0)),
        ];
        for arm in arms {
            net.create_road_segment(centre, arm, 10.0, 10).unwrap();
            net.create_road_segment(arm, centre, 10.0, 10).unwrap();
        }
        (net, centre, arms)
    }

    /// The crossing with only straight lights, paired into two cycles.
    pub(super) fn straight_crossing() -> (Network, IntersectionId) {
        let (mut net, centre, arms) = crossing();
        let inter = net.intersection(centre).unwrap();
        let pairs = [(0, 1), (1, 0), (2, 3), (3, 2)]
            .map(|(from, to)| (inter.road_from(arms[from]).unwrap(), inter.road_to(arms[to]).unwrap()));
        let inter = net.intersection_mut(centre).unwrap();
        let lights = pairs.map(|(from, to)| inter.connect(from, to, TurnType::Straight));
        inter.link(lights[0], lights[1]);
        inter.link(lights[2], lights[3]);
        assert_eq!(inter.cycle_count(), 2);
        (net, centre)
    }

    #[test]
    fn events_pop_in_time_order() {
        let mut net = Network::with_seed(0);
        let a = net.create_intersection(point(0.0, 0.0));
        let b = net.create_intersection(point(1.0, 0.0));
        let mut queue = EventQueue::default();
        queue.push(Event::new(5.0, a));
        queue.push(Event::new(1.0, b));
        queue.push(Event::new(1.0, a));
        assert_eq!(queue.len(), 3);

        assert_eq!(queue.pop_due(0.5), None);
        let first = queue.pop_due(1.0).unwrap();
        let second = queue.pop_due(1.0).unwrap();
        assert_eq!(first.time, 1.0);
        assert_eq!(second.time, 1.0);
        assert_eq!(first.intersection.min(second.intersection), first.intersection);
        assert!(!queue.is_due(4.9));
        assert_eq!(queue.pop_due(5.0), Some(Event::new(5.0, a)));
        assert_eq!(queue.len(), 0);
    }

    #[test]
    fn creates_controller_for_policy() {
        let mut net = Network::with_seed(0);
        let a = net.create_intersection(point(0.0, 0.0));
        let mut controller = create(ControlPolicy::FlowAdaptive(AdaptiveTiming::default()));
        controller.add_event(Event::new(2.0, a), &mut net);
        assert_eq!(controller.pending(), 1);
        assert!(!controller.has_due_event(1.0));
        assert!(controller.has_due_event(2.0));
        assert_eq!(net.intersection(a).unwrap().scheduled_time(), Some(2.0));

        let controller = create(ControlPolicy::default());
        assert_eq!(controller.pending(), 0);
    }
}
