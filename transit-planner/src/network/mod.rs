//! The compiled time-expanded graph.
//!
//! A [`TransitNetwork`] owns the base graph built by [`GraphBuilder`] and
//! the index that maps its vertices back to stop visits. Queries borrow it
//! mutably for the lifetime of an overlay (see [`TransitNetwork::attach`]
//! and [`QueryOverlay`]); once the overlay is gone the base graph is exactly
//! as it was built.

mod build;
mod error;
mod index;
mod overlay;

use crate::domain::{StopVisit, StopVisitId};
use crate::graph::{GraphError, Weight, WeightedDigraph};
use crate::schedule::Schedule;

pub use build::GraphBuilder;
pub use error::{ArcKind, BuildError, QueryError};
pub use index::VisitRef;
pub use overlay::{Attachment, QueryOverlay};

use index::VertexIndex;
use overlay::OverlayState;

/// Base graph plus vertex index, with at most one query overlay attached.
///
/// Cloning gives an independent network, which is how callers run queries
/// in parallel.
#[derive(Debug, Clone)]
pub struct TransitNetwork {
    graph: WeightedDigraph,
    index: VertexIndex,
    overlay: Option<OverlayState>,
}

impl TransitNetwork {
    /// Compile `schedule` with a fresh [`GraphBuilder`].
    pub fn build(schedule: &Schedule) -> Result<Self, BuildError> {
        GraphBuilder::new(schedule).build()
    }

    fn from_parts(graph: WeightedDigraph, index: VertexIndex) -> Self {
        Self {
            graph,
            index,
            overlay: None,
        }
    }

    /// Read access to the underlying graph, overlay included.
    pub fn graph(&self) -> &WeightedDigraph {
        &self.graph
    }

    pub fn vertex_count(&self) -> usize {
        self.graph.vertex_count()
    }

    pub fn arc_count(&self) -> usize {
        self.graph.arc_count()
    }

    pub fn get_weight(&self, from: usize, to: usize) -> Result<Weight, GraphError> {
        self.graph.get_weight(from, to)
    }

    /// Number of vertices that belong to scheduled stop visits.
    pub fn base_vertex_count(&self) -> usize {
        match &self.overlay {
            Some(state) => state.base_vertex_count,
            None => self.graph.vertex_count(),
        }
    }

    /// Vertex of a scheduled stop visit.
    pub fn vertex_of(&self, visit: StopVisitId) -> Option<usize> {
        self.index.vertex_of(VisitRef::Scheduled(visit))
    }

    pub fn visit_ref(&self, vertex: usize) -> Option<VisitRef> {
        self.index.visit_at(vertex)
    }

    /// The stop visit a vertex stands for, including the ephemeral
    /// endpoints of the attached query.
    ///
    /// `schedule` must be the schedule this network was built from.
    pub fn visit_at(&self, schedule: &Schedule, vertex: usize) -> Option<StopVisit> {
        match self.index.visit_at(vertex)? {
            VisitRef::Scheduled(id) => Some(*schedule.visit(id)),
            VisitRef::Origin => self.overlay.as_ref().map(|s| s.origin_visit),
            VisitRef::Destination => self.overlay.as_ref().map(|s| s.destination_visit),
        }
    }

    pub fn is_attached(&self) -> bool {
        self.overlay.is_some()
    }

    /// The current query's endpoints, if one is attached.
    pub fn attachment(&self) -> Option<&Attachment> {
        self.overlay.as_ref().map(|s| &s.attachment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::fixtures;

    #[test]
    fn accessors_on_a_fresh_network() {
        let schedule = fixtures::small_network();
        let network = TransitNetwork::build(&schedule).unwrap();

        assert_eq!(network.vertex_count(), schedule.visit_count());
        assert_eq!(network.base_vertex_count(), network.vertex_count());
        assert!(!network.is_attached());
        assert!(network.attachment().is_none());
        assert_eq!(network.visit_at(&schedule, network.vertex_count()), None);
        assert_eq!(network.visit_ref(network.vertex_count()), None);
    }

    #[test]
    fn every_visit_has_a_distinct_vertex() {
        let schedule = fixtures::small_network();
        let network = TransitNetwork::build(&schedule).unwrap();

        let mut seen = vec![false; network.vertex_count()];
        for id in (0..schedule.visit_count() as u32).map(StopVisitId) {
            let vertex = network.vertex_of(id).unwrap();
            assert!(!seen[vertex]);
            seen[vertex] = true;
            assert_eq!(network.visit_ref(vertex), Some(VisitRef::Scheduled(id)));
        }
        assert!(seen.into_iter().all(|s| s));
    }

    #[test]
    fn clones_are_independent() {
        let schedule = fixtures::two_station_schedule();
        let network = TransitNetwork::build(&schedule).unwrap();
        let mut copy = network.clone();

        copy.attach(
            &schedule,
            fixtures::STATION_A,
            fixtures::STATION_B,
            fixtures::time("08:00:00"),
            &Default::default(),
        )
        .unwrap();
        assert!(copy.is_attached());
        assert!(!network.is_attached());
        assert_eq!(copy.vertex_count(), network.vertex_count() + 2);
    }
}
