use super::{Controller, Event, EventQueue};
use crate::{Intersection, IntersectionId, Network};
use log::trace;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The thresholds of the [AdaptiveController].
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AdaptiveTiming {
    /// The least time between two cycles of an intersection.
    pub min_dwell: f64,
    /// The time after which a phase ends whenever other approaches are occupied.
    pub max_dwell: f64,
    /// The length of a left sub-phase.
    pub left_phase: f64,
    /// The delay between deciding to cycle and cycling.
    pub cooldown: f64,
    /// A phase ends early when the other approaches carry this many times its flow.
    pub flow_ratio: f64,
}

impl Default for AdaptiveTiming {
    fn default() -> Self {
        Self {
            min_dwell: 5.0,
            max_dwell: 60.0,
            left_phase: 20.0,
            cooldown: 5.0,
            flow_ratio: 2.0,
        }
    }
}

/// Cycles intersections when the flow waiting on the other cycles outweighs the current one.
#[derive(Clone, Debug, Default)]
pub struct AdaptiveController {
    timing: AdaptiveTiming,
    events: EventQueue,
}

impl AdaptiveController {
    pub fn new(timing: AdaptiveTiming) -> Self {
        Self {
            timing,
            events: EventQueue::default(),
        }
    }

    pub fn timing(&self) -> &AdaptiveTiming {
        &self.timing
    }

    /// Whether an intersection should be scheduled to cycle at time `now`.
    fn wants_cycle(&self, network: &Network, id: IntersectionId, now: f64) -> bool {
        let intersection = match network.intersection(id) {
            Some(intersection) => intersection,
            None => return false,
        };
        let dwell = now - intersection.time_of_last_cycle();
        let scheduled_later = intersection.scheduled_time().map_or(false, |t| t > now);
        if dwell < self.timing.min_dwell || intersection.left_turn_signal_on() || scheduled_later {
            return false;
        }
        let roads = network.road_set();
        let current = intersection.current_flow(roads) as f64;
        let opposite = intersection.opposite_flow(roads) as f64;
        let waiting = opposite != 0.0 || held_at_red(network, intersection);
        (dwell >= self.timing.max_dwell && waiting) || current < self.timing.flow_ratio * opposite
    }
}

/// Whether the vehicle at the head of some inbound queue waits for a red light.
/// Left turns off the green approach wait for the next left sub-phase
/// without adding to the opposite flow.
fn held_at_red(network: &Network, intersection: &Intersection) -> bool {
    intersection.inbound_roads().iter().any(|road| {
        network
            .road(*road)
            .and_then(|road| road.next_in_queue())
            .and_then(|id| network.vehicle(id))
            .and_then(|vehicle| vehicle.peek_next_road())
            .and_then(|next| intersection.light_between(*road, next))
            .map_or(false, |light| !light.is_green())
    })
}

impl Controller for AdaptiveController {
    fn add_event(&mut self, event: Event, network: &mut Network) {
        if let Some(intersection) = network.intersection_mut(event.intersection) {
            intersection.set_scheduled_time(event.time);
        }
        self.events.push(event);
    }

    fn has_due_event(&self, now: f64) -> bool {
        self.events.is_due(now)
    }

    fn run_events(&mut self, now: f64, network: &mut Network) {
        while let Some(event) = self.events.pop_due(now) {
            let intersection = match network.intersection_mut(event.intersection) {
                Some(intersection) => intersection,
                None => continue,
            };
            intersection.cycle(now);
            trace!("cycled intersection {:?} at {}", event.intersection, now);
            if intersection.left_turn_signal_on() {
                let next = Event::new(now + self.timing.left_phase, event.intersection);
                self.add_event(next, network);
            }
        }

        let due = network
            .intersections()
            .map(|intersection| intersection.id())
            .filter(|id| self.wants_cycle(network, *id, now))
            .collect::<Vec<_>>();
        for id in due {
            self.add_event(Event::new(now + self.timing.cooldown, id), network);
        }
    }

    fn pending(&self) -> usize {
        self.events.len()
    }
}
