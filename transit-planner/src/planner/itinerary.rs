//! Itinerary types produced by the planner.
//!
//! An [`Itinerary`] is a sequence of legs from the query origin to the
//! query destination. Rides name the trip and the boarding and alighting
//! stations; walks connect two places on foot. All types serialize with
//! serde for machine-readable output, and [`Itinerary::narrate`] renders a
//! human-readable description against the schedule.

use std::fmt;

use chrono::Duration;
use serde::Serialize;

use crate::domain::{ServiceTime, StationId, describe_duration};
use crate::schedule::Schedule;

/// Where a walk starts or ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "station", rename_all = "snake_case")]
pub enum Place {
    Origin,
    Station(StationId),
    Destination,
}

/// Travel on foot between two places.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Walk {
    pub from: Place,
    pub to: Place,
}

/// Travel on one trip between two of its stops.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ride {
    pub trip_id: String,
    /// Display number of the trip's line, when the line is known.
    pub line_number: Option<String>,
    pub board: StationId,
    /// Departure time of the boarding visit.
    pub board_time: ServiceTime,
    pub alight: StationId,
    /// Arrival time of the alighting visit.
    pub alight_time: ServiceTime,
}

impl Ride {
    /// Time spent on board.
    pub fn duration(&self) -> Duration {
        self.alight_time.signed_duration_since(self.board_time)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Leg {
    Ride(Ride),
    Walk(Walk),
}

impl Leg {
    pub fn as_ride(&self) -> Option<&Ride> {
        match self {
            Leg::Ride(ride) => Some(ride),
            Leg::Walk(_) => None,
        }
    }

    pub fn is_walk(&self) -> bool {
        matches!(self, Leg::Walk(_))
    }
}

/// A decoded shortest path.
///
/// The first leg always walks from the origin and the last always walks to
/// the destination; in between, rides and station-to-station walks
/// alternate as the path dictates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Itinerary {
    pub total_seconds: u32,
    pub departure: ServiceTime,
    pub arrival: ServiceTime,
    pub legs: Vec<Leg>,
}

impl Itinerary {
    pub fn rides(&self) -> impl Iterator<Item = &Ride> {
        self.legs.iter().filter_map(Leg::as_ride)
    }

    /// Number of vehicle changes, zero for a single ride.
    pub fn transfers(&self) -> usize {
        self.rides().count().saturating_sub(1)
    }

    /// Human-readable description, one line per leg.
    pub fn narrate<'a>(&'a self, schedule: &'a Schedule) -> Narration<'a> {
        Narration {
            itinerary: self,
            schedule,
        }
    }
}

/// Outcome of planning one query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", content = "itinerary", rename_all = "snake_case")]
pub enum PlanResult {
    /// Origin and destination coincide, or are joined at no cost.
    SameLocation,
    /// No path exists in the time window.
    Unreachable,
    Itinerary(Itinerary),
}

impl PlanResult {
    pub fn itinerary(&self) -> Option<&Itinerary> {
        match self {
            PlanResult::Itinerary(itinerary) => Some(itinerary),
            _ => None,
        }
    }
}

/// [`Itinerary`] rendered with station names from a schedule.
pub struct Narration<'a> {
    itinerary: &'a Itinerary,
    schedule: &'a Schedule,
}

impl Narration<'_> {
    fn place(&self, place: Place) -> String {
        match place {
            Place::Origin => "the origin".to_string(),
            Place::Station(id) => self.schedule.station_name(id),
            Place::Destination => "the destination".to_string(),
        }
    }
}

impl fmt::Display for Narration<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let itinerary = self.itinerary;
        writeln!(
            f,
            "Depart at {}, arrive at {} ({})",
            itinerary.departure,
            itinerary.arrival,
            describe_duration(itinerary.total_seconds)
        )?;
        for leg in &itinerary.legs {
            match leg {
                Leg::Walk(walk) => {
                    writeln!(f, "  Walk from {} to {}", self.place(walk.from), self.place(walk.to))?
                }
                Leg::Ride(ride) => {
                    let line = match &ride.line_number {
                        Some(number) => format!("line {number}"),
                        None => "trip".to_string(),
                    };
                    writeln!(
                        f,
                        "  Take {line} ({}) from {} at {} to {} at {}",
                        ride.trip_id,
                        self.schedule.station_name(ride.board),
                        ride.board_time,
                        self.schedule.station_name(ride.alight),
                        ride.alight_time
                    )?
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::fixtures::{self, time};

    fn itinerary() -> Itinerary {
        Itinerary {
            total_seconds: 1500,
            departure: time("08:00:00"),
            arrival: time("08:25:00"),
            legs: vec![
                Leg::Walk(Walk {
                    from: Place::Origin,
                    to: Place::Station(StationId(0)),
                }),
                Leg::Ride(Ride {
                    trip_id: "T1".to_string(),
                    line_number: Some("1".to_string()),
                    board: StationId(0),
                    board_time: time("08:00:00"),
                    alight: StationId(1),
                    alight_time: time("08:05:00"),
                }),
                Leg::Ride(Ride {
                    trip_id: "T9".to_string(),
                    line_number: None,
                    board: StationId(1),
                    board_time: time("08:10:00"),
                    alight: StationId(0),
                    alight_time: time("08:20:00"),
                }),
                Leg::Walk(Walk {
                    from: Place::Station(StationId(0)),
                    to: Place::Destination,
                }),
            ],
        }
    }

    #[test]
    fn ride_helpers() {
        let it = itinerary();
        assert_eq!(it.rides().count(), 2);
        assert_eq!(it.transfers(), 1);
        assert_eq!(it.legs[1].as_ride().map(Ride::duration), Some(Duration::minutes(5)));
        assert!(it.legs[0].is_walk());
    }

    #[test]
    fn narration_uses_station_names() {
        let schedule = fixtures::two_station_schedule();
        let text = itinerary().narrate(&schedule).to_string();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(
            lines,
            vec![
                "Depart at 08:00:00, arrive at 08:25:00 (0 hours, 25 minutes, 0 seconds)",
                "  Walk from the origin to Alpha",
                "  Take line 1 (T1) from Alpha at 08:00:00 to Bravo at 08:05:00",
                "  Take trip (T9) from Bravo at 08:10:00 to Alpha at 08:20:00",
                "  Walk from Alpha to the destination",
            ]
        );
    }

    #[test]
    fn serializes_with_tags() {
        let json = serde_json::to_value(PlanResult::Itinerary(itinerary())).unwrap();

        assert_eq!(json["result"], "itinerary");
        let legs = &json["itinerary"]["legs"];
        assert_eq!(legs[0]["type"], "walk");
        assert_eq!(legs[0]["from"]["type"], "origin");
        assert_eq!(legs[1]["type"], "ride");
        assert_eq!(legs[1]["board_time"], "08:00:00");
        assert_eq!(json["itinerary"]["total_seconds"], 1500);

        let json = serde_json::to_value(PlanResult::Unreachable).unwrap();
        assert_eq!(json["result"], "unreachable");
    }
}
