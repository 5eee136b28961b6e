//! Itinerary planning over an attached query.
//!
//! A query is answered in three steps: attach the origin and destination
//! to the network as an overlay, run Dijkstra between the two endpoint
//! vertices, and decode the vertex path into rides and walks. The overlay
//! is then detached so the network can serve the next query.
//!
//! [`plan_query`] runs all three steps.

mod config;
mod decode;
mod itinerary;


use std::time::{Duration, Instant};

use tracing::debug;

use crate::domain::{Coordinates, ServiceTime};
use crate::network::TransitNetwork;
use crate::schedule::Schedule;

pub use config::{ConfigError, PlannerConfig};
pub use decode::{ItineraryPlanner, PlanError};
pub use itinerary::{Itinerary, Leg, Narration, Place, PlanResult, Ride, Walk};

/// A planned query and the time spent searching.
#[derive(Debug, Clone)]
pub struct QueryOutcome {
    pub result: PlanResult,
    pub search_time: Duration,
}

/// Attach, plan and detach one origin/destination query.
///
/// The network is restored before returning, whether planning succeeded
/// or not.
pub fn plan_query(
    network: &mut TransitNetwork,
    schedule: &Schedule,
    origin: Coordinates,
    destination: Coordinates,
    departure: ServiceTime,
    config: &PlannerConfig,
) -> Result<QueryOutcome, PlanError> {
    let overlay = network.overlay(schedule, origin, destination, departure, config)?;

    let started = Instant::now();
    let result = overlay.plan(schedule);
    let search_time = started.elapsed();

    overlay.close()?;
    let result = result?;
    debug!(?search_time, %departure, "query planned");

    Ok(QueryOutcome {
        result,
        search_time,
    })
}
