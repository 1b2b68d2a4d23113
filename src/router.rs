//! Shortest expected time routing between sets of intersections.

use crate::{IntersectionId, Network, RoadId};
use cgmath::num_traits::Zero;
use itertools::unfold;
use pathfinding::directed::dijkstra::dijkstra_all;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::ops::Add;

/// The quickest way from one of several source intersections to one of
/// several destination intersections.
#[derive(Clone, Debug, PartialEq)]
pub struct Route {
    /// The roads to follow, from the source intersection to the destination intersection.
    pub roads: Vec<RoadId>,
    /// The index of the chosen source candidate.
    pub source: usize,
    /// The index of the chosen destination candidate.
    pub destination: usize,
    /// The expected travel time, including the source offset and destination excess.
    pub time: f64,
}

/// A node of the search graph.
/// The virtual origin links to every source intersection at the cost of its offset.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
enum Node {
    Origin,
    At(IntersectionId),
}

/// A travel time which can be used as a path cost.
#[derive(Clone, Copy, Debug)]
struct Time(f64);

impl PartialEq for Time {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Time {}

impl PartialOrd for Time {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Time {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl Add for Time {
    type Output = Time;

    fn add(self, rhs: Self) -> Self::Output {
        Time(self.0 + rhs.0)
    }
}

impl Zero for Time {
    fn zero() -> Self {
        Time(0.0)
    }

    fn is_zero(&self) -> bool {
        self.0 == 0.0
    }
}

/// Finds the route with the least expected time from any of the `sources` to any
/// of the `destinations`, or `None` if no destination can be reached.
///
/// Each source is an intersection with the time it takes to reach it, and each
/// destination an intersection with the time it takes to reach the end of the trip
/// from it. Road segments are weighted by their expected time. Of equally quick
/// destinations the first is chosen.
pub fn shortest_route(
    network: &Network,
    sources: &[(IntersectionId, f64)],
    destinations: &[(IntersectionId, f64)],
) -> Option<Route> {
    // The cheapest source candidate of each intersection
    let mut entries: HashMap<IntersectionId, usize> = HashMap::new();
    for (idx, (id, offset)) in sources.iter().enumerate() {
        let best = entries.entry(*id).or_insert(idx);
        if *offset < sources[*best].1 {
            *best = idx;
        }
    }
    let mut starts = entries.iter().map(|(id, idx)| (*idx, *id)).collect::<Vec<_>>();
    starts.sort_unstable();

    let reached = dijkstra_all(&Node::Origin, |node| match *node {
        Node::Origin => starts
            .iter()
            .map(|(idx, id)| (Node::At(*id), Time(sources[*idx].1)))
            .collect::<Vec<_>>(),
        Node::At(id) => network
            .intersection(id)
            .into_iter()
            .flat_map(|i| i.outbound_roads())
            .flat_map(|road| network.road(*road))
            .map(|road| (Node::At(road.destination()), Time(road.expected_time())))
            .collect(),
    });

    let (destination, time) = destinations
        .iter()
        .enumerate()
        .filter_map(|(idx, (id, excess))| {
            reached
                .get(&Node::At(*id))
                .map(|(_, cost)| (idx, cost.0 + excess))
        })
        .fold(None, |best: Option<(usize, f64)>, (idx, time)| match best {
            Some((_, best_time)) if best_time <= time => best,
            _ => Some((idx, time)),
        })?;

    // Walk the predecessors back to the virtual origin
    let target = destinations[destination].0;
    let mut first = target;
    let mut roads = unfold(target, |at| {
        let (parent, _) = reached.get(&Node::At(*at))?;
        match *parent {
            Node::Origin => {
                first = *at;
                None
            }
            Node::At(prev) => {
                let road = cheapest_road(network, prev, *at)?;
                *at = prev;
                Some(road)
            }
        }
    })
    .collect::<Vec<_>>();
    roads.reverse();

    Some(Route {
        roads,
        source: entries[&first],
        destination,
        time,
    })
}

/// The quickest road segment from one intersection to another.
/// Of equally quick roads the first in outbound order is chosen.
fn cheapest_road(network: &Network, from: IntersectionId, to: IntersectionId) -> Option<RoadId> {
    network
        .intersection(from)?
        .outbound_roads()
        .iter()
        .flat_map(|id| network.road(*id))
        .filter(|road| road.destination() == to)
        .fold(None, |best: Option<(RoadId, f64)>, road| match best {
            Some((_, time)) if time <= road.expected_time() => best,
            _ => Some((road.id(), road.expected_time())),
        })
        .map(|(id, _)| id)
}
