//! Compiles a schedule into the base graph.
//!
//! Every stop visit becomes one vertex. Three families of arcs connect
//! them:
//!
//! - trip arcs between consecutive visits of the same trip
//! - wait arcs between consecutive visits of different trips at one station
//! - transfer arcs from each visit at a station to the earliest visit at a
//!   transfer partner that respects the minimum transfer time
//!
//! All weights are the elapsed seconds between the two visits' arrivals.

use tracing::{debug, info};

use crate::domain::{ServiceTime, StopVisitId};
use crate::graph::{Weight, WeightedDigraph};
use crate::schedule::Schedule;

use super::TransitNetwork;
use super::error::{ArcKind, BuildError};
use super::index::{VertexIndex, VisitRef};

/// One-shot compiler from a [`Schedule`] to a [`TransitNetwork`].
pub struct GraphBuilder<'s> {
    schedule: &'s Schedule,
    graph: WeightedDigraph,
    index: VertexIndex,
}

impl<'s> GraphBuilder<'s> {
    pub fn new(schedule: &'s Schedule) -> Self {
        let visits = schedule.visit_count();
        Self {
            schedule,
            graph: WeightedDigraph::new(visits),
            // two extra slots for the query endpoints
            index: VertexIndex::with_capacity(visits + 2),
        }
    }

    /// Emit trip, wait and transfer arcs, in that order.
    pub fn build(mut self) -> Result<TransitNetwork, BuildError> {
        let trip_arcs = self.add_trip_arcs()?;
        let wait_arcs = self.add_wait_arcs()?;
        let transfer_arcs = self.add_transfer_arcs()?;

        // Every arena visit belongs to a trip, so this only trims slack.
        self.graph.resize(self.index.len());

        info!(
            vertices = self.graph.vertex_count(),
            arcs = self.graph.arc_count(),
            trip_arcs,
            wait_arcs,
            transfer_arcs,
            "built transit graph"
        );

        Ok(TransitNetwork::from_parts(self.graph, self.index))
    }

    fn add_trip_arcs(&mut self) -> Result<usize, BuildError> {
        if !self.index.is_empty() {
            return Err(BuildError::AlreadyBuilt);
        }

        let mut added = 0;
        for (_, trip) in self.schedule.trips() {
            let mut previous: Option<(usize, StopVisitId)> = None;
            for &id in &trip.visits {
                let vertex = self.index.push(VisitRef::Scheduled(id));
                if let Some((prev_vertex, prev_id)) = previous {
                    let weight = self.elapsed(ArcKind::Trip, prev_id, id)?;
                    self.graph.add_arc(prev_vertex, vertex, weight)?;
                    added += 1;
                }
                previous = Some((vertex, id));
            }
        }

        debug!(arcs = added, trips = self.schedule.trip_count(), "added trip arcs");
        Ok(added)
    }

    fn add_wait_arcs(&mut self) -> Result<usize, BuildError> {
        let mut added = 0;
        for station in self.schedule.stations() {
            for pair in station.visits().windows(2) {
                let (earlier, later) = (pair[0].1, pair[1].1);
                if self
                    .schedule
                    .visit(earlier)
                    .same_trip(self.schedule.visit(later))
                {
                    continue;
                }
                let weight = self.elapsed(ArcKind::Wait, earlier, later)?;
                let (from, to) = (self.vertex(earlier)?, self.vertex(later)?);
                self.graph.add_arc(from, to, weight)?;
                added += 1;
            }
        }

        debug!(arcs = added, stations = self.schedule.station_count(), "added wait arcs");
        Ok(added)
    }

    /// For each visit at the source station, link to the earliest visit at
    /// the target station that honours the minimum transfer time. A later
    /// visit could lead to a better trip; that is not searched for.
    fn add_transfer_arcs(&mut self) -> Result<usize, BuildError> {
        let mut added = 0;
        for transfer in self.schedule.transfers() {
            let from = self
                .schedule
                .station(transfer.from)
                .ok_or(BuildError::UnknownStation(transfer.from))?;
            let to = self
                .schedule
                .station(transfer.to)
                .ok_or(BuildError::UnknownStation(transfer.to))?;

            for &(arrival, visit) in from.visits() {
                let Some(ready) = arrival.checked_add_secs(transfer.min_seconds) else {
                    break;
                };
                // visits are time-ordered, so later ones cannot match either
                let Some((_, target)) = to.first_visit_at_or_after(ready) else {
                    break;
                };
                let elapsed = self.arrival_of(target).secs_since(arrival);
                if elapsed <= 0 {
                    return Err(BuildError::NonPositiveTransfer {
                        from: visit,
                        to: target,
                        elapsed,
                    });
                }
                let (from_vertex, to_vertex) = (self.vertex(visit)?, self.vertex(target)?);
                self.graph.add_arc(from_vertex, to_vertex, elapsed as Weight)?;
                added += 1;
            }
        }

        debug!(
            arcs = added,
            transfers = self.schedule.transfers().len(),
            "added transfer arcs"
        );
        Ok(added)
    }

    fn arrival_of(&self, id: StopVisitId) -> ServiceTime {
        self.schedule.visit(id).arrival
    }

    fn elapsed(&self, kind: ArcKind, from: StopVisitId, to: StopVisitId) -> Result<Weight, BuildError> {
        let delta = self.arrival_of(to).secs_since(self.arrival_of(from));
        Weight::try_from(delta).map_err(|_| BuildError::NegativeWeight {
            kind,
            from,
            to,
            delta,
        })
    }

    fn vertex(&self, id: StopVisitId) -> Result<usize, BuildError> {
        self.index
            .vertex_of(VisitRef::Scheduled(id))
            .ok_or(BuildError::UnindexedVisit(id))
    }
}
