//! Incremental schedule assembly.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::NaiveDate;
use tracing::{debug, info};

use crate::domain::{
    Coordinates, Line, ServiceTime, Station, StationId, StopVisit, StopVisitId, Trip, TripIndex,
};

use super::{Schedule, ScheduleError, TimeWindow, Transfer};

#[derive(Debug)]
struct PendingTrip {
    line_id: String,
    service_id: String,
    direction: Option<u8>,
    headsign: Option<String>,
    stop_times: Vec<PendingStopTime>,
}

#[derive(Debug, Clone, Copy)]
struct PendingStopTime {
    station: StationId,
    arrival: ServiceTime,
    departure: ServiceTime,
    sequence: u32,
}

/// Collects timetable records and compiles them into a [`Schedule`].
///
/// Filtering happens in [`build`](Self::build):
/// - trips whose service is not active on the date are dropped
/// - stop times arriving outside the window are dropped
/// - trips and stations left without visits are dropped
/// - transfers touching a dropped station, or looping on one station,
///   are dropped
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use transit_planner::domain::{Coordinates, ServiceTime};
/// use transit_planner::schedule::{ScheduleBuilder, TimeWindow};
///
/// let date = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
/// let window = TimeWindow::new(
///     ServiceTime::parse("08:00:00").unwrap(),
///     ServiceTime::parse("09:00:00").unwrap(),
/// )
/// .unwrap();
///
/// let mut builder = ScheduleBuilder::new(date, window);
/// builder.add_line("L1", "1", "Downtown");
/// let a = builder.add_station("A", "Alpha", Coordinates::new(46.80, -71.20)).unwrap();
/// let b = builder.add_station("B", "Bravo", Coordinates::new(46.81, -71.21)).unwrap();
/// builder.activate_service("WEEK");
/// builder.add_trip("T1", "L1", "WEEK", None, None).unwrap();
/// builder.add_stop_time("T1", a, ServiceTime::parse("08:00:00").unwrap(), ServiceTime::parse("08:00:00").unwrap(), 1).unwrap();
/// builder.add_stop_time("T1", b, ServiceTime::parse("08:05:00").unwrap(), ServiceTime::parse("08:05:00").unwrap(), 2).unwrap();
///
/// let schedule = builder.build().unwrap();
/// assert_eq!(schedule.visit_count(), 2);
/// assert_eq!(schedule.station_count(), 2);
/// ```
#[derive(Debug)]
pub struct ScheduleBuilder {
    date: NaiveDate,
    window: TimeWindow,
    lines: HashMap<String, Line>,
    stations: Vec<Station>,
    station_codes: HashMap<String, StationId>,
    active_services: HashSet<String>,
    trips: BTreeMap<String, PendingTrip>,
    transfers: Vec<Transfer>,
}

impl ScheduleBuilder {
    pub fn new(date: NaiveDate, window: TimeWindow) -> Self {
        Self {
            date,
            window,
            lines: HashMap::new(),
            stations: Vec::new(),
            station_codes: HashMap::new(),
            active_services: HashSet::new(),
            trips: BTreeMap::new(),
            transfers: Vec::new(),
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// Register a line. A later line with the same id replaces it.
    pub fn add_line(&mut self, id: &str, number: &str, description: &str) {
        self.lines.insert(
            id.to_string(),
            Line {
                id: id.to_string(),
                number: number.to_string(),
                description: description.to_string(),
            },
        );
    }

    /// Register a station and return its id.
    pub fn add_station(
        &mut self,
        code: &str,
        name: &str,
        coordinates: Coordinates,
    ) -> Result<StationId, ScheduleError> {
        if self.station_codes.contains_key(code) {
            return Err(ScheduleError::DuplicateStation(code.to_string()));
        }
        let id = StationId(self.stations.len() as u32);
        if id.is_sentinel() {
            return Err(ScheduleError::DuplicateStation(code.to_string()));
        }
        self.stations
            .push(Station::new(id, code.to_string(), name.to_string(), coordinates));
        self.station_codes.insert(code.to_string(), id);
        Ok(id)
    }

    /// Id of a previously registered station.
    pub fn station_id(&self, code: &str) -> Option<StationId> {
        self.station_codes.get(code).copied()
    }

    /// Mark a service as running on the schedule's date.
    pub fn activate_service(&mut self, service_id: &str) {
        self.active_services.insert(service_id.to_string());
    }

    pub fn is_service_active(&self, service_id: &str) -> bool {
        self.active_services.contains(service_id)
    }

    pub fn active_service_count(&self) -> usize {
        self.active_services.len()
    }

    /// Register a trip. Its stop times are added with [`add_stop_time`](Self::add_stop_time).
    pub fn add_trip(
        &mut self,
        id: &str,
        line_id: &str,
        service_id: &str,
        direction: Option<u8>,
        headsign: Option<&str>,
    ) -> Result<(), ScheduleError> {
        if !self.lines.contains_key(line_id) {
            return Err(ScheduleError::UnknownLine(line_id.to_string()));
        }
        if self.trips.contains_key(id) {
            return Err(ScheduleError::DuplicateTrip(id.to_string()));
        }
        self.trips.insert(
            id.to_string(),
            PendingTrip {
                line_id: line_id.to_string(),
                service_id: service_id.to_string(),
                direction,
                headsign: headsign.map(str::to_string),
                stop_times: Vec::new(),
            },
        );
        Ok(())
    }

    pub fn has_trip(&self, id: &str) -> bool {
        self.trips.contains_key(id)
    }

    /// Add one stop of a trip. Order of calls does not matter; stops are
    /// sorted by `sequence` when the schedule is built.
    pub fn add_stop_time(
        &mut self,
        trip_id: &str,
        station: StationId,
        arrival: ServiceTime,
        departure: ServiceTime,
        sequence: u32,
    ) -> Result<(), ScheduleError> {
        self.check_station(station)?;
        let trip = self
            .trips
            .get_mut(trip_id)
            .ok_or_else(|| ScheduleError::UnknownTrip(trip_id.to_string()))?;
        trip.stop_times.push(PendingStopTime {
            station,
            arrival,
            departure,
            sequence,
        });
        Ok(())
    }

    /// Add a directed minimum transfer time between two stations.
    pub fn add_transfer(
        &mut self,
        from: StationId,
        to: StationId,
        min_seconds: u32,
    ) -> Result<(), ScheduleError> {
        self.check_station(from)?;
        self.check_station(to)?;
        self.transfers.push(Transfer {
            from,
            to,
            min_seconds,
        });
        Ok(())
    }

    fn check_station(&self, station: StationId) -> Result<(), ScheduleError> {
        if (station.0 as usize) < self.stations.len() {
            Ok(())
        } else {
            Err(ScheduleError::UnknownStation(station.to_string()))
        }
    }

    /// Apply the service, window and emptiness filters and freeze the result.
    pub fn build(self) -> Result<Schedule, ScheduleError> {
        let Self {
            date,
            window,
            lines,
            mut stations,
            active_services,
            trips: pending_trips,
            transfers: pending_transfers,
            ..
        } = self;

        let mut visits = Vec::new();
        let mut trips = Vec::new();
        let mut inactive_trips = 0usize;
        let mut out_of_window = 0usize;

        for (trip_id, mut pending) in pending_trips {
            if !active_services.contains(&pending.service_id) {
                inactive_trips += 1;
                continue;
            }

            pending.stop_times.sort_by_key(|st| st.sequence);
            if let Some(pair) = pending
                .stop_times
                .windows(2)
                .find(|pair| pair[0].sequence == pair[1].sequence)
            {
                return Err(ScheduleError::DuplicateStopSequence {
                    trip: trip_id,
                    sequence: pair[0].sequence,
                });
            }

            let trip_index = TripIndex(trips.len() as u32);
            let mut trip_visits = Vec::new();
            for st in pending.stop_times {
                if !window.contains(st.arrival) {
                    out_of_window += 1;
                    continue;
                }
                let id = StopVisitId(visits.len() as u32);
                visits.push(StopVisit {
                    station: st.station,
                    arrival: st.arrival,
                    departure: st.departure,
                    sequence: st.sequence,
                    trip: Some(trip_index),
                });
                stations[st.station.0 as usize].insert_visit(st.arrival, id);
                trip_visits.push(id);
            }

            if trip_visits.is_empty() {
                continue;
            }
            trips.push(Trip {
                id: trip_id,
                line_id: pending.line_id,
                service_id: pending.service_id,
                direction: pending.direction,
                headsign: pending.headsign,
                visits: trip_visits,
            });
        }

        let stations: BTreeMap<StationId, Station> = stations
            .into_iter()
            .filter(Station::has_visits)
            .map(|s| (s.id, s))
            .collect();

        let transfers: Vec<Transfer> = pending_transfers
            .into_iter()
            .filter(|t| t.from != t.to)
            .filter(|t| stations.contains_key(&t.from) && stations.contains_key(&t.to))
            .collect();

        debug!(
            inactive_trips,
            out_of_window, "dropped records outside the service date or window"
        );
        info!(
            %date,
            %window,
            trips = trips.len(),
            stations = stations.len(),
            visits = visits.len(),
            transfers = transfers.len(),
            "schedule built"
        );

        Ok(Schedule {
            date,
            window,
            visits,
            trips,
            stations,
            transfers,
            lines,
        })
    }
}
