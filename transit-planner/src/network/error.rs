//! Network compilation and query errors.

use std::fmt;

use crate::domain::{StationId, StopVisitId};
use crate::graph::GraphError;

/// Which family of arcs a build error came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArcKind {
    Trip,
    Wait,
    Transfer,
}

impl fmt::Display for ArcKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ArcKind::Trip => "trip",
            ArcKind::Wait => "wait",
            ArcKind::Transfer => "transfer",
        })
    }
}

/// Errors from compiling a schedule into a graph.
///
/// All of these mean the schedule itself is inconsistent; none can be
/// recovered from by retrying.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BuildError {
    /// The vertex index already holds vertices
    #[error("the graph has already been built from a schedule")]
    AlreadyBuilt,

    /// Consecutive visits are out of time order
    #[error("negative {kind} weight {delta}s from visit {from} to visit {to}")]
    NegativeWeight {
        kind: ArcKind,
        from: StopVisitId,
        to: StopVisitId,
        delta: i64,
    },

    /// A transfer landed on a visit that is not strictly later
    #[error("transfer from visit {from} to visit {to} takes {elapsed}s, expected a positive duration")]
    NonPositiveTransfer {
        from: StopVisitId,
        to: StopVisitId,
        elapsed: i64,
    },

    /// A transfer names a station that has no visits
    #[error("transfer references station {0} which is not in the schedule")]
    UnknownStation(StationId),

    /// A station lists a visit no trip owns
    #[error("visit {0} has no vertex; trips and stations disagree")]
    UnindexedVisit(StopVisitId),

    #[error(transparent)]
    Graph(#[from] GraphError),
}

/// Errors from attaching or detaching a query overlay.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    /// `attach` was called while a previous overlay is still attached
    #[error("an origin and destination are already attached")]
    AlreadyAttached,

    /// `detach` was called with nothing attached
    #[error("no origin and destination are attached")]
    NotAttached,

    /// No station with a reachable visit is within walking distance of the origin
    #[error("no stop is within walking distance of the origin")]
    NoNearbyOrigin,

    /// No station is within walking distance of the destination
    #[error("no stop is within walking distance of the destination")]
    NoNearbyDestination,

    #[error(transparent)]
    Graph(#[from] GraphError),
}

impl QueryError {
    /// Returns false for outcomes that are normal for a sparse network,
    /// where the caller can simply move on to the next query.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            QueryError::NoNearbyOrigin | QueryError::NoNearbyDestination
        )
    }
}
