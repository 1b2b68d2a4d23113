use crate::{IntersectionId, RoadId};
use std::fmt;

/// The recoverable failures of the network construction and vehicle spawning API.
///
/// Broken invariants (double reservations, foreign roads, missing signals on a
/// vehicle's path and so on) are programming errors and panic instead.
#[derive(Clone, Debug, PartialEq)]
pub enum Error {
    /// No intersection with this ID is in the network.
    UnknownIntersection(IntersectionId),
    /// No road segment with this ID is in the network.
    UnknownRoad(RoadId),
    /// Speed limits must be positive and finite.
    InvalidSpeedLimit(f64),
    /// A road segment would start and end at the same intersection.
    SelfLoop(IntersectionId),
    /// None of the destination candidates can be reached from the sources.
    NoRoute,
    /// Random sampling did not find an admissible source/destination road.
    NoCandidateRoad,
}

pub type Result<T> = std::result::Result<T, Error>;

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::UnknownIntersection(id) => write!(f, "unknown intersection {:?}", id),
            Error::UnknownRoad(id) => write!(f, "unknown road segment {:?}", id),
            Error::InvalidSpeedLimit(limit) => write!(f, "invalid speed limit {}", limit),
            Error::SelfLoop(id) => write!(f, "road segment loops back to intersection {:?}", id),
            Error::NoRoute => write!(f, "no route connects the sources to the destinations"),
            Error::NoCandidateRoad => write!(f, "no road segment with spare capacity to spawn on"),
        }
    }
}

impl std::error::Error for Error {}
