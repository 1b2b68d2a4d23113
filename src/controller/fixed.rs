use super::{Controller, Event, EventQueue};
use crate::Network;
use log::trace;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The phase lengths of the [FixedTimeController].
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FixedTiming {
    /// The length of a left sub-phase.
    pub left_phase: f64,
    /// The length of a full phase, left sub-phase included.
    pub full_phase: f64,
}

impl Default for FixedTiming {
    fn default() -> Self {
        Self {
            left_phase: 10.0,
            full_phase: 30.0,
        }
    }
}

/// Cycles every intersection on a fixed timetable.
#[derive(Clone, Debug, Default)]
pub struct FixedTimeController {
    timing: FixedTiming,
    events: EventQueue,
}

impl FixedTimeController {
    pub fn new(timing: FixedTiming) -> Self {
        Self {
            timing,
            events: EventQueue::default(),
        }
    }

    pub fn timing(&self) -> &FixedTiming {
        &self.timing
    }
}

impl Controller for FixedTimeController {
    fn add_event(&mut self, event: Event, _network: &mut Network) {
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
            let was_left = intersection.left_turn_signal_on();
            intersection.cycle(now);

            // A straight phase after a left sub-phase gets the rest of the full phase
            let delay = if intersection.left_turn_signal_on() {
                self.timing.left_phase
            } else if was_left {
                self.timing.full_phase - self.timing.left_phase
            } else {
                self.timing.full_phase
            };
            trace!(
                "cycled intersection {:?} at {}, next in {}",
                event.intersection,
                now,
                delay
            );
            self.events.push(Event::new(now + delay, event.intersection));
        }
    }

    fn pending(&self) -> usize {
        self.events.len()
    }
}
