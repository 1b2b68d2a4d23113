use crate::light::{LightState, TrafficLight, TurnType};
use crate::math::{normalize_angle, Point2d, EPS};
use crate::util::rotated_range;
use crate::{IntersectionId, RoadId, RoadSegment, RoadSet, TrafficLightId};
use itertools::Itertools;
use log::trace;
use slotmap::{SecondaryMap, SlotMap};
use smallvec::{smallvec, SmallVec};
use std::collections::HashMap;
use std::f64::consts::PI;

type LightGroup = SmallVec<[TrafficLightId; 4]>;

/// An intersection of road segments, controlled by traffic lights.
///
/// The straight lights are partitioned into *cycles*: groups of lights which
/// are green together. Cycles take turns being active. Each straight light
/// may have left companions (left turns and u-turns), which are green during
/// the left sub-phase that precedes the straight phase of their cycle,
/// and right companions, which never turn red.
///
/// Angles follow screen coordinates (the y axis points down),
/// so a positive angular difference between two roads is a right turn.
#[derive(Clone, Debug)]
pub struct Intersection {
    /// The intersection ID.
    id: IntersectionId,
    /// The location of the intersection.
    location: Point2d,
    /// The roads ending at this intersection.
    inbound: Vec<RoadId>,
    /// The roads starting at this intersection.
    outbound: Vec<RoadId>,
    /// The inbound road coming from each neighbouring intersection.
    road_from: HashMap<IntersectionId, RoadId>,
    /// The outbound road going to each neighbouring intersection.
    road_to: HashMap<IntersectionId, RoadId>,
    /// The traffic lights.
    lights: SlotMap<TrafficLightId, TrafficLight>,
    /// The light between each pair of inbound and outbound roads.
    between: HashMap<(RoadId, RoadId), TrafficLightId>,
    /// The lights synchronised with each light.
    links: SecondaryMap<TrafficLightId, Links>,
    /// The straight lights in each cycle.
    cycles: Vec<LightGroup>,
    /// The cycle each straight light belongs to.
    cycle_of: SecondaryMap<TrafficLightId, usize>,
    /// The cycle which turns green on the next straight phase.
    current_cycle: usize,
    /// Whether the left sub-phase is active.
    left_turn: bool,
    /// The time of the latest call to [Self::cycle].
    time_of_last_cycle: f64,
    /// The next time the intersection is due to be cycled.
    scheduled_time: Option<f64>,
}

/// The lights linked to a light.
/// For a straight light these are its companions and the straight lights
/// it was merged with; for other lights, the straight light they follow.
#[derive(Clone, Debug, Default)]
struct Links {
    left: LightGroup,
    straight: LightGroup,
    right: LightGroup,
}

impl Intersection {
    /// Creates an intersection with no roads.
    pub(crate) fn new(id: IntersectionId, location: Point2d) -> Self {
        Self {
            id,
            location,
            inbound: vec![],
            outbound: vec![],
            road_from: HashMap::new(),
            road_to: HashMap::new(),
            lights: SlotMap::with_key(),
            between: HashMap::new(),
            links: SecondaryMap::new(),
            cycles: vec![],
            cycle_of: SecondaryMap::new(),
            current_cycle: 0,
            left_turn: true,
            time_of_last_cycle: 0.0,
            scheduled_time: None,
        }
    }

    /// Gets the intersection ID.
    pub fn id(&self) -> IntersectionId {
        self.id
    }

    /// The location of the intersection.
    pub fn location(&self) -> Point2d {
        self.location
    }

    /// The roads ending at this intersection.
    pub fn inbound_roads(&self) -> &[RoadId] {
        &self.inbound
    }

    /// The roads starting at this intersection.
    pub fn outbound_roads(&self) -> &[RoadId] {
        &self.outbound
    }

    /// The intersections with a road leading here.
    pub fn inbound_intersections(&self) -> impl Iterator<Item = IntersectionId> + '_ {
        self.road_from.keys().copied()
    }

    /// The intersections a road leads to from here.
    pub fn outbound_intersections(&self) -> impl Iterator<Item = IntersectionId> + '_ {
        self.road_to.keys().copied()
    }

    /// The road leading here from the given intersection.
    pub fn road_from(&self, neighbour: IntersectionId) -> Option<RoadId> {
        self.road_from.get(&neighbour).copied()
    }

    /// The road leading from here to the given intersection.
    pub fn road_to(&self, neighbour: IntersectionId) -> Option<RoadId> {
        self.road_to.get(&neighbour).copied()
    }

    pub fn indegree(&self) -> usize {
        self.inbound.len()
    }

    pub fn outdegree(&self) -> usize {
        self.outbound.len()
    }

    /// Returns an iterator over the traffic lights.
    pub fn lights(&self) -> impl Iterator<Item = &TrafficLight> {
        self.lights.values()
    }

    /// Gets the light with the given ID.
    pub fn light(&self, id: TrafficLightId) -> Option<&TrafficLight> {
        self.lights.get(id)
    }

    /// Gets the light controlling the movement from one road onto another.
    pub fn light_between(&self, from: RoadId, to: RoadId) -> Option<&TrafficLight> {
        self.between.get(&(from, to)).map(|id| &self.lights[*id])
    }

    /// Whether a light controls the movement from one road onto another.
    pub fn is_connected(&self, from: RoadId, to: RoadId) -> bool {
        self.between.contains_key(&(from, to))
    }

    /// The number of cycles.
    pub fn cycle_count(&self) -> usize {
        self.cycles.len()
    }

    /// The straight lights of the given cycle.
    pub fn cycle_lights(&self, cycle: usize) -> &[TrafficLightId] {
        self.cycles.get(cycle).map(|c| c.as_slice()).unwrap_or(&[])
    }

    /// The cycle a straight light belongs to.
    pub fn cycle_of(&self, light: TrafficLightId) -> Option<usize> {
        self.cycle_of.get(light).copied()
    }

    /// The left and u-turn lights linked to a straight light.
    pub fn left_companions(&self, light: TrafficLightId) -> &[TrafficLightId] {
        self.links.get(light).map(|l| l.left.as_slice()).unwrap_or(&[])
    }

    /// The right turn lights linked to a straight light.
    pub fn right_companions(&self, light: TrafficLightId) -> &[TrafficLightId] {
        self.links.get(light).map(|l| l.right.as_slice()).unwrap_or(&[])
    }

    /// The straight lights linked to a light.
    pub fn straight_links(&self, light: TrafficLightId) -> &[TrafficLightId] {
        self.links
            .get(light)
            .map(|l| l.straight.as_slice())
            .unwrap_or(&[])
    }

    /// The cycle which turns green on the next straight phase.
    pub fn current_cycle(&self) -> usize {
        self.current_cycle
    }

    /// Whether the left sub-phase is active.
    pub fn left_turn_signal_on(&self) -> bool {
        self.left_turn
    }

    /// The time the intersection was last cycled.
    pub fn time_of_last_cycle(&self) -> f64 {
        self.time_of_last_cycle
    }

    pub fn is_scheduled(&self) -> bool {
        self.scheduled_time.is_some()
    }

    /// The next time the intersection is due to be cycled, if any.
    pub fn scheduled_time(&self) -> Option<f64> {
        self.scheduled_time
    }

    pub fn set_scheduled_time(&mut self, time: f64) {
        self.scheduled_time = Some(time);
    }

    pub fn reset_scheduled_time(&mut self) {
        self.scheduled_time = None;
    }

    /// Adds a road starting or ending at this intersection.
    /// Returns `false` if the road is already present.
    pub(crate) fn add(&mut self, road: &RoadSegment) -> bool {
        let id = road.id();
        if self.inbound.contains(&id) || self.outbound.contains(&id) {
            return false;
        }
        assert!(
            road.source() == self.id || road.destination() == self.id,
            "road {:?} does not start or end at intersection {:?}",
            id,
            self.id
        );
        if road.destination() == self.id {
            self.inbound.push(id);
            self.road_from.insert(road.source(), id);
        }
        if road.source() == self.id {
            self.outbound.push(id);
            self.road_to.insert(road.destination(), id);
        }
        true
    }

    /// Removes a road along with every light controlling a movement onto or off it.
    /// Returns `false` if the road is not present.
    pub(crate) fn remove(&mut self, road: &RoadSegment) -> bool {
        let id = road.id();
        let inbound = self.inbound.iter().position(|r| *r == id);
        let outbound = self.outbound.iter().position(|r| *r == id);
        if inbound.is_none() && outbound.is_none() {
            return false;
        }
        if let Some(idx) = inbound {
            self.inbound.remove(idx);
            if self.road_from.get(&road.source()) == Some(&id) {
                self.road_from.remove(&road.source());
            }
        }
        if let Some(idx) = outbound {
            self.outbound.remove(idx);
            if self.road_to.get(&road.destination()) == Some(&id) {
                self.road_to.remove(&road.destination());
            }
        }

        let doomed = self
            .lights
            .values()
            .filter(|light| light.from() == id || light.to() == id)
            .map(|light| light.id())
            .collect::<Vec<_>>();
        for light in doomed {
            self.remove_light(light);
        }
        true
    }

    /// Deletes a light and purges it from the cycles and links.
    fn remove_light(&mut self, id: TrafficLightId) {
        let light = match self.lights.remove(id) {
            Some(light) => light,
            None => return,
        };
        self.between.remove(&(light.from(), light.to()));
        self.links.remove(id);
        for links in self.links.values_mut() {
            links.left.retain(|l| *l != id);
            links.straight.retain(|l| *l != id);
            links.right.retain(|l| *l != id);
        }

        if let Some(cycle) = self.cycle_of.remove(id) {
            self.cycles[cycle].retain(|l| *l != id);
            if self.cycles[cycle].is_empty() {
                // Keep the cycle numbering dense
                self.cycles.swap_remove(cycle);
                if let Some(moved) = self.cycles.get(cycle) {
                    for light in moved {
                        self.cycle_of[*light] = cycle;
                    }
                }
                self.follow_moved_cycle(cycle);
            }
        }
    }

    /// Connects an inbound road to an outbound road with a traffic light.
    /// A straight light starts out in a cycle of its own.
    pub fn connect(&mut self, from: RoadId, to: RoadId, turn: TurnType) -> TrafficLightId {
        assert!(
            self.inbound.contains(&from),
            "road {:?} is not inbound to intersection {:?}",
            from,
            self.id
        );
        assert!(
            self.outbound.contains(&to),
            "road {:?} is not outbound from intersection {:?}",
            to,
            self.id
        );
        assert!(
            !self.between.contains_key(&(from, to)),
            "roads {:?} and {:?} are already connected",
            from,
            to
        );

        let id = self
            .lights
            .insert_with_key(|id| TrafficLight::new(id, from, to, turn));
        self.between.insert((from, to), id);
        self.links.insert(id, Links::default());
        if turn == TurnType::Straight {
            self.cycle_of.insert(id, self.cycles.len());
            self.cycles.push(smallvec![id]);
        }
        id
    }

    /// Links light `b` to the straight light `a` so the two are synchronised.
    ///
    /// Left and u-turn lights become green during the left sub-phase of `a`'s cycle,
    /// right turn lights stay green, and the cycles of two straight lights are merged.
    pub fn link(&mut self, a: TrafficLightId, b: TrafficLightId) {
        assert!(
            self.lights[a].turn() == TurnType::Straight,
            "light {:?} must be a straight light",
            a
        );
        match self.lights[b].turn() {
            TurnType::Left | TurnType::UTurn => {
                push_unique(&mut self.links[a].left, b);
                push_unique(&mut self.links[b].straight, a);
            }
            TurnType::Right => {
                push_unique(&mut self.links[a].right, b);
                push_unique(&mut self.links[b].straight, a);
            }
            TurnType::Straight => {
                let (cycle_a, cycle_b) = (self.cycle_of[a], self.cycle_of[b]);
                assert!(
                    cycle_a != cycle_b,
                    "lights {:?} and {:?} are already linked",
                    a,
                    b
                );
                push_unique(&mut self.links[a].straight, b);
                push_unique(&mut self.links[b].straight, a);
                self.merge_cycles(cycle_a.min(cycle_b), cycle_a.max(cycle_b));
            }
        }
    }

    /// Moves the lights of cycle `absorbed` into cycle `keep`, where `keep < absorbed`.
    /// The last cycle takes the freed slot.
    fn merge_cycles(&mut self, keep: usize, absorbed: usize) {
        let lights = self.cycles.swap_remove(absorbed);
        for light in &lights {
            self.cycle_of[*light] = keep;
        }
        self.cycles[keep].extend(lights);
        if let Some(moved) = self.cycles.get(absorbed) {
            for light in moved {
                self.cycle_of[*light] = absorbed;
            }
        }
        if self.current_cycle == absorbed {
            self.current_cycle = keep;
        } else {
            self.follow_moved_cycle(absorbed);
        }
    }

    /// Keeps `current_cycle` on the same cycle after `swap_remove` moved the
    /// last cycle into slot `freed`.
    fn follow_moved_cycle(&mut self, freed: usize) {
        let old_last = self.cycles.len();
        if self.current_cycle == old_last && freed < old_last {
            self.current_cycle = freed;
        } else if self.current_cycle >= self.cycles.len() {
            self.current_cycle = 0;
        }
    }

    /// Derives the traffic lights from the road geometry.
    ///
    /// For each inbound road the outbound road closest to straight ahead gets a
    /// straight light and the others left, right or u-turn lights, which are then
    /// linked to it. Straight lights of opposite approaches are linked into one cycle.
    /// When there are at most two outbound roads, u-turns count as straight.
    pub fn auto_connect_and_link(&mut self, roads: &RoadSet) {
        let mut outbound = self
            .outbound
            .iter()
            .map(|id| &roads[*id])
            .collect::<Vec<_>>();
        outbound.sort_by(|a, b| a.direction().total_cmp(&b.direction()));

        let u_turn = if outbound.len() <= 2 {
            TurnType::Straight
        } else {
            TurnType::UTurn
        };
        let classify = |diff: f64| {
            if diff.abs() > PI - EPS {
                u_turn
            } else if diff > 0.0 {
                TurnType::Right
            } else {
                TurnType::Left
            }
        };

        let mut straights = vec![];
        for from in self.inbound.clone() {
            let in_dir = roads[from].direction();

            // Scanning in angular order makes right turns more likely to be marked as such
            let start = outbound.partition_point(|r| r.direction() - in_dir < EPS);
            let mut turns: Vec<(RoadId, TurnType)> = Vec::with_capacity(outbound.len());
            let mut closest: Option<(usize, f64)> = None;
            for idx in rotated_range(outbound.len(), start) {
                let out = outbound[idx];
                let diff = normalize_angle(out.direction() - in_dir);
                let mut turn = classify(diff);
                if closest.map_or(true, |(_, best)| diff.abs() < best.abs() - EPS) {
                    if let Some((prev, best)) = closest {
                        turns[prev].1 = classify(best);
                    }
                    turn = TurnType::Straight;
                    closest = Some((turns.len(), diff));
                }
                turns.push((out.id(), turn));
            }

            let mut straight = None;
            for (to, turn) in &turns {
                let light = self.connect(from, *to, *turn);
                if *turn == TurnType::Straight {
                    straight = Some(light);
                    straights.push(light);
                }
            }
            if let Some(straight) = straight {
                for (to, turn) in &turns {
                    if *turn != TurnType::Straight {
                        let light = self.between[&(from, *to)];
                        self.link(straight, light);
                    }
                }
            }
        }

        for (a, b) in straights.into_iter().tuple_combinations() {
            let (light_a, light_b) = (&self.lights[a], &self.lights[b]);
            let opposite = roads[light_a.from()].source() == roads[light_b.to()].destination()
                && roads[light_a.to()].destination() == roads[light_b.from()].source();
            let same_approach = light_a.from() == light_b.from();
            if (opposite || same_approach) && self.cycle_of[a] != self.cycle_of[b] {
                self.link(a, b);
            }
        }

        trace!(
            "intersection {:?}: {} lights in {} cycles",
            self.id,
            self.lights.len(),
            self.cycles.len()
        );
    }

    /// Advances the traffic lights to the next phase.
    ///
    /// If the current cycle has left companions and the left sub-phase has not run yet,
    /// only those turn green and the cycle is kept. Otherwise the cycle's straight
    /// lights turn green and the next cycle becomes current.
    pub fn cycle(&mut self, time: f64) {
        self.scheduled_time = None;
        self.time_of_last_cycle = time;
        let count = self.cycles.len();
        if count == 0 {
            self.left_turn = false;
            return;
        }

        let current = self.current_cycle;
        let previous = (current + count - 1) % count;
        for cycle in [previous, current] {
            for light in &self.cycles[cycle] {
                self.lights[*light].set_state(LightState::Red);
                for left in &self.links[*light].left {
                    self.lights[*left].set_state(LightState::Red);
                }
            }
        }

        let greens = self.cycles[current]
            .iter()
            .copied()
            .filter(|light| self.lights[*light].turn() == TurnType::Straight)
            .collect::<LightGroup>();
        let lefts = if self.left_turn {
            LightGroup::new()
        } else {
            self.cycles[current]
                .iter()
                .flat_map(|light| self.links[*light].left.iter().copied())
                .collect::<LightGroup>()
        };

        if lefts.is_empty() {
            self.left_turn = false;
            for light in greens {
                self.lights[light].set_state(LightState::Green);
            }
            self.current_cycle = (current + 1) % count;
        } else {
            self.left_turn = true;
            for light in lefts {
                self.lights[light].set_state(LightState::Green);
            }
        }
        trace!(
            "intersection {:?} cycled at {}: cycle {}, left turn {}",
            self.id,
            time,
            current,
            self.left_turn
        );
    }

    /// The index of the cycle whose lights are green.
    ///
    /// A straight phase advances `current_cycle` past the cycle it turned green,
    /// so outside a left sub-phase the active cycle is the one before it.
    pub fn active_cycle(&self) -> usize {
        let count = self.cycles.len();
        if self.left_turn || count == 0 {
            self.current_cycle
        } else {
            (self.current_cycle + count - 1) % count
        }
    }

    /// The number of vehicles on the inbound roads of the active cycle.
    pub fn current_flow(&self, roads: &RoadSet) -> usize {
        self.cycle_flow(self.active_cycle(), roads)
    }

    /// The number of vehicles on the inbound roads of every other cycle.
    pub fn opposite_flow(&self, roads: &RoadSet) -> usize {
        let active = self.active_cycle();
        (0..self.cycles.len())
            .filter(|cycle| *cycle != active)
            .map(|cycle| self.cycle_flow(cycle, roads))
            .sum()
    }

    fn cycle_flow(&self, cycle: usize, roads: &RoadSet) -> usize {
        self.cycle_lights(cycle)
            .iter()
            .map(|light| roads[self.lights[*light].from()].flow())
            .sum()
    }
}

fn push_unique(group: &mut LightGroup, light: TrafficLightId) {
    if !group.contains(&light) {
        group.push(light);
    }
}
