//! GTFS feed loader.
//!
//! Reads a directory of GTFS text files and feeds a [`ScheduleBuilder`]
//! for one service date and time window. Only the columns the planner
//! uses are deserialized.
//!
//! Required files: `routes.txt`, `stops.txt`, `trips.txt`,
//! `stop_times.txt`. Optional: `calendar.txt`, `calendar_dates.txt`,
//! `transfers.txt`. At least one of the two calendar files must exist,
//! otherwise no service would ever be active.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::{Datelike, NaiveDate, Weekday};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::domain::{Coordinates, ServiceTime, TimeError};

use super::{Schedule, ScheduleBuilder, ScheduleError, TimeWindow};

/// Errors from reading a GTFS feed.
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    /// A required file is absent from the feed directory
    #[error("missing feed file {0}")]
    MissingFile(PathBuf),

    /// The file could not be read or a row could not be decoded
    #[error("failed to read {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("{file}: {source}")]
    Time {
        file: &'static str,
        #[source]
        source: TimeError,
    },

    #[error("{file}: invalid date {value:?}")]
    Date { file: &'static str, value: String },

    #[error(transparent)]
    Schedule(#[from] ScheduleError),

    /// Neither calendar file activates a service on the requested date
    #[error("no service runs on {0}")]
    NoActiveService(NaiveDate),
}

/// Which day and which part of it to load.
#[derive(Debug, Clone, Copy)]
pub struct FeedOptions {
    pub date: NaiveDate,
    pub window: TimeWindow,
}

impl FeedOptions {
    pub fn new(date: NaiveDate, window: TimeWindow) -> Self {
        Self { date, window }
    }
}

/// Load the feed in `dir` and compile the schedule for `options`.
pub fn load_feed(dir: impl AsRef<Path>, options: &FeedOptions) -> Result<Schedule, FeedError> {
    let dir = dir.as_ref();
    let mut builder = ScheduleBuilder::new(options.date, options.window);

    let lines = load_routes(dir, &mut builder)?;
    let stations = load_stops(dir, &mut builder)?;
    load_services(dir, options.date, &mut builder)?;
    if builder.active_service_count() == 0 {
        return Err(FeedError::NoActiveService(options.date));
    }
    let trips = load_trips(dir, &mut builder)?;
    let stop_times = load_stop_times(dir, &mut builder)?;
    let transfers = load_transfers(dir, &mut builder)?;

    info!(
        dir = %dir.display(),
        lines,
        stations,
        services = builder.active_service_count(),
        trips,
        stop_times,
        transfers,
        "feed records loaded"
    );

    Ok(builder.build()?)
}

fn read_records<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, FeedError> {
    let csv_err = |source| FeedError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_path(path)
        .map_err(csv_err)?;
    reader
        .deserialize()
        .collect::<Result<Vec<T>, csv::Error>>()
        .map_err(csv_err)
}

fn required(dir: &Path, name: &str) -> Result<PathBuf, FeedError> {
    let path = dir.join(name);
    if path.is_file() {
        Ok(path)
    } else {
        Err(FeedError::MissingFile(path))
    }
}

fn optional(dir: &Path, name: &str) -> Option<PathBuf> {
    let path = dir.join(name);
    path.is_file().then_some(path)
}

#[derive(Deserialize)]
struct RouteRecord {
    route_id: String,
    #[serde(default)]
    route_short_name: Option<String>,
    #[serde(default)]
    route_long_name: Option<String>,
    #[serde(default)]
    route_desc: Option<String>,
}

fn load_routes(dir: &Path, builder: &mut ScheduleBuilder) -> Result<usize, FeedError> {
    let records: Vec<RouteRecord> = read_records(&required(dir, "routes.txt")?)?;
    for rec in &records {
        let number = rec
            .route_short_name
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or(&rec.route_id);
        let description = rec
            .route_long_name
            .as_deref()
            .filter(|s| !s.is_empty())
            .or(rec.route_desc.as_deref())
            .unwrap_or_default();
        builder.add_line(&rec.route_id, number, description);
    }
    Ok(records.len())
}

#[derive(Deserialize)]
struct StopRecord {
    stop_id: String,
    #[serde(default)]
    stop_name: Option<String>,
    stop_lat: f64,
    stop_lon: f64,
    #[serde(default)]
    location_type: Option<u8>,
}

fn load_stops(dir: &Path, builder: &mut ScheduleBuilder) -> Result<usize, FeedError> {
    let records: Vec<StopRecord> = read_records(&required(dir, "stops.txt")?)?;
    let mut count = 0;
    for rec in records {
        // Parent stations, entrances and nodes never see a vehicle
        if rec.location_type.unwrap_or(0) != 0 {
            continue;
        }
        let name = rec.stop_name.unwrap_or_default();
        builder.add_station(&rec.stop_id, &name, Coordinates::new(rec.stop_lat, rec.stop_lon))?;
        count += 1;
    }
    Ok(count)
}

#[derive(Deserialize)]
struct CalendarRecord {
    service_id: String,
    monday: u8,
    tuesday: u8,
    wednesday: u8,
    thursday: u8,
    friday: u8,
    saturday: u8,
    sunday: u8,
    start_date: String,
    end_date: String,
}

impl CalendarRecord {
    fn runs_on(&self, weekday: Weekday) -> bool {
        let flag = match weekday {
            Weekday::Mon => self.monday,
            Weekday::Tue => self.tuesday,
            Weekday::Wed => self.wednesday,
            Weekday::Thu => self.thursday,
            Weekday::Fri => self.friday,
            Weekday::Sat => self.saturday,
            Weekday::Sun => self.sunday,
        };
        flag == 1
    }
}

#[derive(Deserialize)]
struct CalendarDateRecord {
    service_id: String,
    date: String,
    exception_type: u8,
}

/// GTFS `exception_type` values.
const SERVICE_ADDED: u8 = 1;
const SERVICE_REMOVED: u8 = 2;

fn parse_date(file: &'static str, value: &str) -> Result<NaiveDate, FeedError> {
    NaiveDate::parse_from_str(value, "%Y%m%d").map_err(|_| FeedError::Date {
        file,
        value: value.to_string(),
    })
}

/// Activate every service running on `date`: weekly patterns from
/// `calendar.txt`, then additions and removals from `calendar_dates.txt`.
fn load_services(dir: &Path, date: NaiveDate, builder: &mut ScheduleBuilder) -> Result<(), FeedError> {
    let calendar = optional(dir, "calendar.txt");
    let calendar_dates = optional(dir, "calendar_dates.txt");
    if calendar.is_none() && calendar_dates.is_none() {
        return Err(FeedError::MissingFile(dir.join("calendar_dates.txt")));
    }

    let mut running: HashMap<String, bool> = HashMap::new();

    if let Some(path) = calendar {
        for rec in read_records::<CalendarRecord>(&path)? {
            let start = parse_date("calendar.txt", &rec.start_date)?;
            let end = parse_date("calendar.txt", &rec.end_date)?;
            if start <= date && date <= end && rec.runs_on(date.weekday()) {
                running.insert(rec.service_id, true);
            }
        }
    }

    if let Some(path) = calendar_dates {
        for rec in read_records::<CalendarDateRecord>(&path)? {
            if parse_date("calendar_dates.txt", &rec.date)? != date {
                continue;
            }
            match rec.exception_type {
                SERVICE_ADDED => {
                    running.insert(rec.service_id, true);
                }
                SERVICE_REMOVED => {
                    running.insert(rec.service_id, false);
                }
                other => warn!(
                    service = %rec.service_id,
                    exception_type = other,
                    "ignoring unknown calendar exception"
                ),
            }
        }
    }

    for (service_id, _) in running.into_iter().filter(|(_, on)| *on) {
        builder.activate_service(&service_id);
    }
    Ok(())
}

#[derive(Deserialize)]
struct TripRecord {
    route_id: String,
    service_id: String,
    trip_id: String,
    #[serde(default)]
    trip_headsign: Option<String>,
    #[serde(default)]
    direction_id: Option<u8>,
}

fn load_trips(dir: &Path, builder: &mut ScheduleBuilder) -> Result<usize, FeedError> {
    let records: Vec<TripRecord> = read_records(&required(dir, "trips.txt")?)?;
    let mut count = 0;
    for rec in records {
        if !builder.is_service_active(&rec.service_id) {
            continue;
        }
        builder.add_trip(
            &rec.trip_id,
            &rec.route_id,
            &rec.service_id,
            rec.direction_id,
            rec.trip_headsign.as_deref().filter(|s| !s.is_empty()),
        )?;
        count += 1;
    }
    Ok(count)
}

#[derive(Deserialize)]
struct StopTimeRecord {
    trip_id: String,
    #[serde(default)]
    arrival_time: Option<String>,
    #[serde(default)]
    departure_time: Option<String>,
    stop_id: String,
    stop_sequence: u32,
}

fn parse_time(value: Option<&str>) -> Result<Option<ServiceTime>, FeedError> {
    match value.filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(s) => ServiceTime::parse(s)
            .map(Some)
            .map_err(|source| FeedError::Time {
                file: "stop_times.txt",
                source,
            }),
    }
}

fn load_stop_times(dir: &Path, builder: &mut ScheduleBuilder) -> Result<usize, FeedError> {
    let records: Vec<StopTimeRecord> = read_records(&required(dir, "stop_times.txt")?)?;
    let mut count = 0;
    let mut skipped_trips = 0usize;
    let mut untimed = 0usize;

    for rec in records {
        // Trips of inactive services were never added
        if !builder.has_trip(&rec.trip_id) {
            skipped_trips += 1;
            continue;
        }
        let station = builder
            .station_id(&rec.stop_id)
            .ok_or_else(|| ScheduleError::UnknownStation(rec.stop_id.clone()))?;

        let arrival = parse_time(rec.arrival_time.as_deref())?;
        let departure = parse_time(rec.departure_time.as_deref())?;
        let (arrival, departure) = match (arrival, departure) {
            (Some(a), Some(d)) => (a, d),
            (Some(a), None) => (a, a),
            (None, Some(d)) => (d, d),
            (None, None) => {
                untimed += 1;
                continue;
            }
        };

        builder.add_stop_time(&rec.trip_id, station, arrival, departure, rec.stop_sequence)?;
        count += 1;
    }

    debug!(skipped_trips, untimed, "stop times skipped");
    Ok(count)
}

#[derive(Deserialize)]
struct TransferRecord {
    from_stop_id: String,
    to_stop_id: String,
    #[serde(default)]
    transfer_type: Option<u8>,
    #[serde(default)]
    min_transfer_time: Option<u32>,
}

/// GTFS `transfer_type` meaning the transfer is impossible.
const TRANSFER_NOT_POSSIBLE: u8 = 3;

fn load_transfers(dir: &Path, builder: &mut ScheduleBuilder) -> Result<usize, FeedError> {
    let Some(path) = optional(dir, "transfers.txt") else {
        return Ok(0);
    };
    let records: Vec<TransferRecord> = read_records(&path)?;
    let mut count = 0;
    let mut ignored = 0usize;

    for rec in records {
        if rec.transfer_type == Some(TRANSFER_NOT_POSSIBLE) {
            ignored += 1;
            continue;
        }
        // A zero-second transfer would land on a visit at the very same
        // instant, which the graph rejects as a non-positive transfer.
        let Some(min_seconds) = rec.min_transfer_time.filter(|secs| *secs > 0) else {
            ignored += 1;
            continue;
        };
        let (Some(from), Some(to)) = (
            builder.station_id(&rec.from_stop_id),
            builder.station_id(&rec.to_stop_id),
        ) else {
            ignored += 1;
            continue;
        };
        builder.add_transfer(from, to, min_seconds)?;
        count += 1;
    }

    debug!(ignored, "transfers ignored");
    Ok(count)
}
