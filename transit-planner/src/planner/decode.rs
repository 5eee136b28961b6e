//! Shortest-path search and path decoding.

use tracing::{debug, trace};

use crate::domain::{StationId, StopVisit};
use crate::graph::GraphError;
use crate::network::{QueryError, TransitNetwork};
use crate::schedule::Schedule;

use super::itinerary::{Itinerary, Leg, PlanResult, Place, Ride, Walk};

/// Errors from planning a query.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlanError {
    /// The path does not have the shape an attached query produces
    #[error("inconsistent path: {0}")]
    Consistency(String),

    #[error(transparent)]
    Query(#[from] QueryError),

    #[error(transparent)]
    Graph(#[from] GraphError),
}

impl PlanError {
    /// Returns false when the query can simply be skipped.
    pub fn is_fatal(&self) -> bool {
        match self {
            PlanError::Query(err) => err.is_fatal(),
            _ => true,
        }
    }
}

/// Plans over a network with an attached query.
pub struct ItineraryPlanner<'a> {
    network: &'a TransitNetwork,
    schedule: &'a Schedule,
}

impl<'a> ItineraryPlanner<'a> {
    pub fn new(network: &'a TransitNetwork, schedule: &'a Schedule) -> Self {
        Self { network, schedule }
    }

    /// Find the quickest itinerary between two vertices.
    ///
    /// `origin` and `destination` must be the endpoint vertices of the
    /// attached query.
    pub fn plan(&self, origin: usize, destination: usize) -> Result<PlanResult, PlanError> {
        if origin == destination {
            return Ok(PlanResult::SameLocation);
        }

        let shortest = self.network.graph().shortest_path(origin, destination)?;
        if !shortest.is_reachable() {
            debug!(origin, destination, "destination unreachable");
            return Ok(PlanResult::Unreachable);
        }
        if shortest.total == 0 {
            return Ok(PlanResult::SameLocation);
        }

        trace!(total = shortest.total, vertices = shortest.path.len(), "decoding path");
        let itinerary = self.decode(shortest.total, &shortest.path)?;
        debug!(
            total = itinerary.total_seconds,
            legs = itinerary.legs.len(),
            transfers = itinerary.transfers(),
            "planned itinerary"
        );
        Ok(PlanResult::Itinerary(itinerary))
    }

    fn visit(&self, vertex: usize) -> Result<StopVisit, PlanError> {
        self.network
            .visit_at(self.schedule, vertex)
            .ok_or_else(|| PlanError::Consistency(format!("vertex {vertex} has no stop visit")))
    }

    /// Turn a vertex path into legs.
    ///
    /// Consecutive visits at one station collapse into a single position.
    /// A station change along one trip extends a ride; a station change
    /// between trips is a walk.
    fn decode(&self, total: u32, path: &[usize]) -> Result<Itinerary, PlanError> {
        if path.len() < 3 {
            return Err(PlanError::Consistency(format!(
                "path of {} vertices cannot join two endpoints through a stop",
                path.len()
            )));
        }
        let visits = path
            .iter()
            .map(|&v| self.visit(v))
            .collect::<Result<Vec<_>, _>>()?;

        let first = visits[0];
        let last = visits[visits.len() - 1];
        if first.station != StationId::ORIGIN {
            return Err(PlanError::Consistency(format!(
                "path starts at station {}, not at the origin",
                first.station
            )));
        }
        if last.station != StationId::DESTINATION {
            return Err(PlanError::Consistency(
                "ran out of path before reaching the destination".to_string(),
            ));
        }
        let inner = &visits[1..visits.len() - 1];
        if let Some(stray) = inner.iter().find(|v| v.station.is_sentinel()) {
            let what = if stray.station == StationId::DESTINATION {
                "reached the destination before the end of the path"
            } else {
                "passed through the origin mid-path"
            };
            return Err(PlanError::Consistency(what.to_string()));
        }

        let mut legs = vec![Leg::Walk(Walk {
            from: Place::Origin,
            to: Place::Station(inner[0].station),
        })];

        let mut i = 0;
        while i + 1 < inner.len() {
            let current = inner[i];
            let next = inner[i + 1];
            if next.station == current.station {
                i += 1;
                continue;
            }
            if !current.same_trip(&next) {
                legs.push(Leg::Walk(Walk {
                    from: Place::Station(current.station),
                    to: Place::Station(next.station),
                }));
                i += 1;
                continue;
            }

            let mut alight = i + 1;
            while alight + 1 < inner.len() && inner[alight + 1].same_trip(&current) {
                alight += 1;
            }
            legs.push(Leg::Ride(self.ride(&current, &inner[alight])?));
            i = alight;
        }

        legs.push(Leg::Walk(Walk {
            from: Place::Station(inner[inner.len() - 1].station),
            to: Place::Destination,
        }));

        let departure = first.departure;
        let arrival = departure.checked_add_secs(total).ok_or_else(|| {
            PlanError::Consistency(format!("arrival {total}s after {departure} overflows"))
        })?;

        Ok(Itinerary {
            total_seconds: total,
            departure,
            arrival,
            legs,
        })
    }

    fn ride(&self, board: &StopVisit, alight: &StopVisit) -> Result<Ride, PlanError> {
        let trip_index = board
            .trip
            .ok_or_else(|| PlanError::Consistency("ride boards a visit with no trip".to_string()))?;
        let trip = self.schedule.trip(trip_index).ok_or_else(|| {
            PlanError::Consistency(format!("trip {} is not in the schedule", trip_index.0))
        })?;

        Ok(Ride {
            trip_id: trip.id.clone(),
            line_number: self.schedule.line_number(trip_index).map(str::to_string),
            board: board.station,
            board_time: board.departure,
            alight: alight.station,
            alight_time: alight.arrival,
        })
    }
}
