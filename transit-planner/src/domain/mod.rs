//! Domain types for the transit planner.
//!
//! Plain value types shared by the schedule, the graph compiler and the
//! itinerary decoder. Identifiers are small `Copy` newtypes so the
//! compiled structures can refer to each other by index.

mod coordinates;
mod station;
mod time;
mod trip;
mod visit;

pub use coordinates::Coordinates;
pub use station::{Station, StationId};
pub use time::{SECONDS_PER_DAY, ServiceTime, TimeError, describe_duration};
pub use trip::{Line, Trip, TripIndex};
pub use visit::{StopVisit, StopVisitId};
