//! Compiled single-day timetable.
//!
//! A `Schedule` is the read-only input of the graph compiler: every stop
//! visit of the day's active trips inside the time window, the stations
//! those visits happen at, the transfers between surviving stations and
//! the lines used for display.
//!
//! Schedules are produced by [`ScheduleBuilder`], either directly or
//! through the GTFS loader in [`gtfs`].

mod builder;
mod error;
#[cfg(test)]
pub(crate) mod fixtures;
pub mod gtfs;

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use chrono::NaiveDate;

use crate::domain::{Line, ServiceTime, Station, StationId, StopVisit, StopVisitId, Trip, TripIndex};

pub use builder::ScheduleBuilder;
pub use error::ScheduleError;

/// Half-open time interval `[start, end)` of the service day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: ServiceTime,
    pub end: ServiceTime,
}

impl TimeWindow {
    /// Create a window, rejecting empty or reversed intervals.
    pub fn new(start: ServiceTime, end: ServiceTime) -> Result<Self, ScheduleError> {
        if end <= start {
            return Err(ScheduleError::InvalidWindow(format!(
                "end {end} is not after start {start}"
            )));
        }
        Ok(Self { start, end })
    }

    /// Returns true if `time` falls in `[start, end)`.
    pub fn contains(&self, time: ServiceTime) -> bool {
        self.start <= time && time < self.end
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.start, self.end)
    }
}

/// Directed minimum transfer time between two distinct stations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transfer {
    pub from: StationId,
    pub to: StationId,
    pub min_seconds: u32,
}

/// Read-only timetable for one date and time window.
#[derive(Debug, Clone)]
pub struct Schedule {
    date: NaiveDate,
    window: TimeWindow,
    visits: Vec<StopVisit>,
    trips: Vec<Trip>,
    stations: BTreeMap<StationId, Station>,
    transfers: Vec<Transfer>,
    lines: HashMap<String, Line>,
}

impl Schedule {
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn window(&self) -> TimeWindow {
        self.window
    }

    /// Look up a stop visit in the arena.
    ///
    /// Ids are only handed out by the builder, so every id a caller holds
    /// for this schedule is valid.
    pub fn visit(&self, id: StopVisitId) -> &StopVisit {
        &self.visits[id.index()]
    }

    /// Total number of stop visits, used to presize the graph.
    pub fn visit_count(&self) -> usize {
        self.visits.len()
    }

    /// Trips in ascending feed-id order.
    pub fn trips(&self) -> impl ExactSizeIterator<Item = (TripIndex, &Trip)> {
        self.trips
            .iter()
            .enumerate()
            .map(|(idx, trip)| (TripIndex(idx as u32), trip))
    }

    pub fn trip(&self, idx: TripIndex) -> Option<&Trip> {
        self.trips.get(idx.index())
    }

    pub fn trip_count(&self) -> usize {
        self.trips.len()
    }

    /// Stations that have at least one visit, in ascending id order.
    pub fn stations(&self) -> impl ExactSizeIterator<Item = &Station> {
        self.stations.values()
    }

    pub fn station(&self, id: StationId) -> Option<&Station> {
        self.stations.get(&id)
    }

    pub fn station_count(&self) -> usize {
        self.stations.len()
    }

    /// Display name of a station, falling back to its id.
    pub fn station_name(&self, id: StationId) -> String {
        self.station(id)
            .map(|s| s.name.clone())
            .unwrap_or_else(|| id.to_string())
    }

    pub fn transfers(&self) -> &[Transfer] {
        &self.transfers
    }

    pub fn line(&self, line_id: &str) -> Option<&Line> {
        self.lines.get(line_id)
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Rider-facing line number of a trip.
    pub fn line_number(&self, trip: TripIndex) -> Option<&str> {
        let trip = self.trip(trip)?;
        self.line(&trip.line_id).map(|line| line.number.as_str())
    }
}
