//! Hand-built schedules shared by the network and planner tests.

use chrono::NaiveDate;

use super::{Schedule, ScheduleBuilder, TimeWindow};
use crate::domain::{Coordinates, ServiceTime};

pub const STATION_A: Coordinates = Coordinates {
    latitude: 48.8566,
    longitude: 2.3522,
};

/// About 5.5 km north of A, out of walking range.
pub const STATION_B: Coordinates = Coordinates {
    latitude: 48.9066,
    longitude: 2.3522,
};

/// Far from everything.
pub const NOWHERE: Coordinates = Coordinates {
    latitude: 10.0,
    longitude: 10.0,
};

pub fn time(s: &str) -> ServiceTime {
    ServiceTime::parse(s).unwrap()
}

pub fn builder() -> ScheduleBuilder {
    let date = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
    let window = TimeWindow::new(time("06:00:00"), time("12:00:00")).unwrap();
    let mut b = ScheduleBuilder::new(date, window);
    b.add_line("L1", "1", "Line one");
    b.add_line("L2", "2", "Line two");
    b.activate_service("WEEK");
    b
}

/// Stations A and B; T1 runs A 08:00 to B 08:05, T2 runs A 08:10 to B
/// 08:20, and there is a 300 s transfer from A to B.
pub fn two_station_schedule() -> Schedule {
    let mut b = builder();
    let a = b.add_station("A", "Alpha", STATION_A).unwrap();
    let c = b.add_station("B", "Bravo", STATION_B).unwrap();

    b.add_trip("T1", "L1", "WEEK", Some(0), Some("Bravo")).unwrap();
    b.add_stop_time("T1", a, time("08:00:00"), time("08:00:00"), 1).unwrap();
    b.add_stop_time("T1", c, time("08:05:00"), time("08:05:00"), 2).unwrap();

    b.add_trip("T2", "L2", "WEEK", Some(0), Some("Bravo")).unwrap();
    b.add_stop_time("T2", a, time("08:10:00"), time("08:10:00"), 1).unwrap();
    b.add_stop_time("T2", c, time("08:20:00"), time("08:20:00"), 2).unwrap();

    b.add_transfer(a, c, 300).unwrap();
    b.build().unwrap()
}

/// A three-stop line A to B to C plus a crossing line at B, with a
/// transfer from A to C.
pub fn small_network() -> Schedule {
    let mut b = builder();
    let a = b.add_station("A", "Alpha", STATION_A).unwrap();
    let m = b.add_station("B", "Bravo", STATION_B).unwrap();
    let c = b
        .add_station("C", "Charlie", Coordinates::new(48.9566, 2.3522))
        .unwrap();
    let d = b
        .add_station("D", "Delta", Coordinates::new(48.9066, 2.4522))
        .unwrap();

    for (trip, start) in [("R1", 8), ("R2", 9)] {
        b.add_trip(trip, "L1", "WEEK", Some(0), None).unwrap();
        let at = |min: u32| ServiceTime::from_hms(start, min, 0).unwrap();
        b.add_stop_time(trip, a, at(0), at(1), 1).unwrap();
        b.add_stop_time(trip, m, at(10), at(11), 2).unwrap();
        b.add_stop_time(trip, c, at(20), at(20), 3).unwrap();
    }

    b.add_trip("X1", "L2", "WEEK", Some(1), None).unwrap();
    b.add_stop_time("X1", m, time("08:15:00"), time("08:16:00"), 1).unwrap();
    b.add_stop_time("X1", d, time("08:30:00"), time("08:30:00"), 2).unwrap();

    b.add_transfer(a, c, 1200).unwrap();
    b.build().unwrap()
}
