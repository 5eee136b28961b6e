//! Stop visit types.
//!
//! A `StopVisit` is one trip stopping at one station at one time. The
//! schedule stores every visit once, in an arena addressed by
//! `StopVisitId`; trips, stations and the graph vertex index all refer to
//! visits through that id.

use std::fmt;

use super::{ServiceTime, StationId, TripIndex};

/// Stable index of a stop visit in the schedule's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StopVisitId(pub u32);

impl StopVisitId {
    /// Position in the arena.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for StopVisitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One occurrence of a trip stopping at a station.
///
/// Immutable once the schedule is built. The ephemeral query endpoints are
/// also represented as stop visits; they carry a sentinel station id and
/// no trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StopVisit {
    pub station: StationId,
    pub arrival: ServiceTime,
    pub departure: ServiceTime,
    /// GTFS `stop_sequence` within the trip.
    pub sequence: u32,
    /// Owning trip; `None` for the query endpoints.
    pub trip: Option<TripIndex>,
}

impl StopVisit {
    /// Synthetic visit standing for the query's origin point.
    pub fn origin(departure: ServiceTime) -> Self {
        Self::endpoint(StationId::ORIGIN, departure)
    }

    /// Synthetic visit standing for the query's destination point.
    pub fn destination(departure: ServiceTime) -> Self {
        Self::endpoint(StationId::DESTINATION, departure)
    }

    fn endpoint(station: StationId, at: ServiceTime) -> Self {
        Self {
            station,
            arrival: at,
            departure: at,
            sequence: 0,
            trip: None,
        }
    }

    /// Returns true if both visits belong to the same scheduled trip.
    ///
    /// Endpoints never share a trip with anything.
    pub fn same_trip(&self, other: &StopVisit) -> bool {
        matches!((self.trip, other.trip), (Some(a), Some(b)) if a == b)
    }
}
