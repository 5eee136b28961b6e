//! Per-query origin and destination overlay.
//!
//! A query adds two vertices on top of the base graph: the origin, with a
//! walking arc to the first catchable visit at every station within
//! walking distance, and the destination, with a walking arc from every
//! visit at every station within walking distance of it. Detaching removes
//! exactly those arcs and vertices again.

use tracing::{debug, error, warn};

use crate::domain::{Coordinates, ServiceTime, StopVisit};
use crate::graph::{GraphError, Weight};
use crate::planner::{ItineraryPlanner, PlanError, PlanResult, PlannerConfig};
use crate::schedule::Schedule;

use super::TransitNetwork;
use super::error::QueryError;
use super::index::VisitRef;

/// Vertices and walking arcs of the attached query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub origin: usize,
    pub destination: usize,
    pub departure: ServiceTime,
    /// Targets of the arcs leaving the origin vertex.
    pub reachable_from_origin: Vec<usize>,
    /// Sources of the arcs entering the destination vertex.
    pub reachable_to_destination: Vec<usize>,
}

#[derive(Debug, Clone)]
pub(super) struct OverlayState {
    pub(super) base_vertex_count: usize,
    pub(super) origin_visit: StopVisit,
    pub(super) destination_visit: StopVisit,
    pub(super) attachment: Attachment,
}

impl TransitNetwork {
    /// Add the origin and destination of one query.
    ///
    /// A station is within walking distance when it is strictly closer than
    /// [`PlannerConfig::max_walk_km`]. If either endpoint ends up without
    /// arcs the partial overlay is rolled back and
    /// [`QueryError::NoNearbyOrigin`] or [`QueryError::NoNearbyDestination`]
    /// is returned, leaving the network as it was.
    pub fn attach(
        &mut self,
        schedule: &Schedule,
        origin: Coordinates,
        destination: Coordinates,
        departure: ServiceTime,
        config: &PlannerConfig,
    ) -> Result<Attachment, QueryError> {
        if self.overlay.is_some() {
            return Err(QueryError::AlreadyAttached);
        }

        let base_vertex_count = self.graph.vertex_count();
        let origin_vertex = self.index.push(VisitRef::Origin);
        let destination_vertex = self.index.push(VisitRef::Destination);
        self.graph.resize(base_vertex_count + 2);

        let mut state = OverlayState {
            base_vertex_count,
            origin_visit: StopVisit::origin(departure),
            destination_visit: StopVisit::destination(departure),
            attachment: Attachment {
                origin: origin_vertex,
                destination: destination_vertex,
                departure,
                reachable_from_origin: Vec::new(),
                reachable_to_destination: Vec::new(),
            },
        };

        if let Err(err) = self.add_walking_arcs(schedule, origin, destination, config, &mut state) {
            if let Err(rollback) = self.remove_overlay(&state) {
                error!(%rollback, "failed to roll back partial query overlay");
            }
            debug!(%err, "query not attached");
            return Err(err);
        }

        debug!(
            origin = origin_vertex,
            destination = destination_vertex,
            %departure,
            origin_arcs = state.attachment.reachable_from_origin.len(),
            destination_arcs = state.attachment.reachable_to_destination.len(),
            "attached query"
        );

        let attachment = state.attachment.clone();
        self.overlay = Some(state);
        Ok(attachment)
    }

    /// Remove the attached query, restoring the base graph.
    pub fn detach(&mut self) -> Result<(), QueryError> {
        let state = self.overlay.take().ok_or(QueryError::NotAttached)?;
        self.remove_overlay(&state)?;
        debug!(vertices = self.graph.vertex_count(), arcs = self.graph.arc_count(), "detached query");
        Ok(())
    }

    /// Attach a query for the lifetime of the returned guard.
    ///
    /// ```no_run
    /// # use transit_planner::domain::{Coordinates, ServiceTime};
    /// # use transit_planner::network::TransitNetwork;
    /// # use transit_planner::planner::PlannerConfig;
    /// # fn demo(network: &mut TransitNetwork, schedule: &transit_planner::schedule::Schedule) {
    /// let from = Coordinates::new(46.81, -71.21);
    /// let to = Coordinates::new(46.78, -71.28);
    /// let at = ServiceTime::from_hms(8, 30, 0).unwrap();
    /// let overlay = network
    ///     .overlay(schedule, from, to, at, &PlannerConfig::default())
    ///     .unwrap();
    /// let result = overlay.plan(schedule);
    /// overlay.close().unwrap();
    /// # }
    /// ```
    pub fn overlay(
        &mut self,
        schedule: &Schedule,
        origin: Coordinates,
        destination: Coordinates,
        departure: ServiceTime,
        config: &PlannerConfig,
    ) -> Result<QueryOverlay<'_>, QueryError> {
        let attachment = self.attach(schedule, origin, destination, departure, config)?;
        Ok(QueryOverlay {
            network: self,
            attachment,
            closed: false,
        })
    }

    fn add_walking_arcs(
        &mut self,
        schedule: &Schedule,
        origin: Coordinates,
        destination: Coordinates,
        config: &PlannerConfig,
        state: &mut OverlayState,
    ) -> Result<(), QueryError> {
        let departure = state.attachment.departure;
        let origin_vertex = state.attachment.origin;
        let destination_vertex = state.attachment.destination;

        for station in schedule.stations() {
            let distance = station.coordinates.distance_km(&origin);
            if !config.is_walkable(distance) {
                continue;
            }
            let Some(ready) = departure.checked_add_secs(config.walking_seconds(distance)) else {
                continue;
            };
            let Some((arrival, visit)) = station.first_visit_at_or_after(ready) else {
                continue;
            };
            let Some(vertex) = self.index.vertex_of(VisitRef::Scheduled(visit)) else {
                warn!(station = %station, visit = %visit, "visit missing from the vertex index");
                continue;
            };
            self.graph
                .add_arc(origin_vertex, vertex, arrival.secs_since(departure) as Weight)?;
            state.attachment.reachable_from_origin.push(vertex);
        }
        if state.attachment.reachable_from_origin.is_empty() {
            return Err(QueryError::NoNearbyOrigin);
        }

        for station in schedule.stations() {
            let distance = station.coordinates.distance_km(&destination);
            if !config.is_walkable(distance) {
                continue;
            }
            let walk = config.walking_seconds(distance);
            for &(_, visit) in station.visits() {
                let Some(vertex) = self.index.vertex_of(VisitRef::Scheduled(visit)) else {
                    warn!(station = %station, visit = %visit, "visit missing from the vertex index");
                    continue;
                };
                self.graph.add_arc(vertex, destination_vertex, walk)?;
                state.attachment.reachable_to_destination.push(vertex);
            }
        }
        if state.attachment.reachable_to_destination.is_empty() {
            return Err(QueryError::NoNearbyDestination);
        }

        Ok(())
    }

    /// Remove the recorded walking arcs, then the two endpoint vertices.
    ///
    /// Keeps going after a failed arc removal so the vertex count is always
    /// restored; the first failure is returned.
    fn remove_overlay(&mut self, state: &OverlayState) -> Result<(), GraphError> {
        let attachment = &state.attachment;
        let mut first_error = None;

        let destination_arcs = attachment
            .reachable_to_destination
            .iter()
            .map(|&from| (from, attachment.destination));
        let origin_arcs = attachment
            .reachable_from_origin
            .iter()
            .map(|&to| (attachment.origin, to));
        for (from, to) in destination_arcs.chain(origin_arcs) {
            if let Err(err) = self.graph.remove_arc(from, to) {
                first_error.get_or_insert(err);
            }
        }

        self.graph.resize(state.base_vertex_count);
        while self.index.len() > state.base_vertex_count {
            self.index.pop();
        }

        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

/// Scoped query overlay. Detaches from the network when dropped.
pub struct QueryOverlay<'n> {
    network: &'n mut TransitNetwork,
    attachment: Attachment,
    closed: bool,
}

impl QueryOverlay<'_> {
    pub fn attachment(&self) -> &Attachment {
        &self.attachment
    }

    pub fn network(&self) -> &TransitNetwork {
        &*self.network
    }

    /// Shortest itinerary from the origin to the destination.
    pub fn plan(&self, schedule: &Schedule) -> Result<PlanResult, PlanError> {
        ItineraryPlanner::new(&*self.network, schedule)
            .plan(self.attachment.origin, self.attachment.destination)
    }

    /// Detach now, reporting any failure instead of logging it.
    pub fn close(mut self) -> Result<(), QueryError> {
        self.closed = true;
        self.network.detach()
    }
}

impl Drop for QueryOverlay<'_> {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        if let Err(err) = self.network.detach() {
            error!(%err, "failed to detach query overlay");
        }
    }
}
