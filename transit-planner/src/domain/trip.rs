//! Trip and line types.

use std::fmt;

use serde::Serialize;

use super::StopVisitId;

/// Position of a trip in the schedule, in ascending feed-id order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TripIndex(pub u32);

impl TripIndex {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A scheduled vehicle run and the stop visits it makes.
#[derive(Debug, Clone)]
pub struct Trip {
    /// Feed identifier (GTFS `trip_id`).
    pub id: String,
    /// Feed identifier of the line (GTFS `route_id`).
    pub line_id: String,
    pub service_id: String,
    pub direction: Option<u8>,
    pub headsign: Option<String>,
    /// Visits ordered by stop sequence.
    pub visits: Vec<StopVisitId>,
}

impl Trip {
    /// First visit of the trip, if any survived the time window.
    pub fn first_visit(&self) -> Option<StopVisitId> {
        self.visits.first().copied()
    }

    pub fn last_visit(&self) -> Option<StopVisitId> {
        self.visits.last().copied()
    }
}

impl fmt::Display for Trip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.headsign {
            Some(headsign) => write!(f, "{} ({headsign})", self.id),
            None => f.write_str(&self.id),
        }
    }
}

/// A public line, e.g. a bus route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    /// Feed identifier (GTFS `route_id`).
    pub id: String,
    /// Number shown to riders (GTFS `route_short_name`).
    pub number: String,
    pub description: String,
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.description.is_empty() {
            f.write_str(&self.number)
        } else {
            write!(f, "{} : {}", self.number, self.description)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trip_display_with_headsign() {
        let trip = Trip {
            id: "T1".into(),
            line_id: "800".into(),
            service_id: "WEEK".into(),
            direction: Some(0),
            headsign: Some("Beauport".into()),
            visits: vec![StopVisitId(4), StopVisitId(5)],
        };
        assert_eq!(trip.to_string(), "T1 (Beauport)");
        assert_eq!(trip.first_visit(), Some(StopVisitId(4)));
        assert_eq!(trip.last_visit(), Some(StopVisitId(5)));
    }

    #[test]
    fn line_display() {
        let line = Line {
            id: "1-800".into(),
            number: "800".into(),
            description: "Pointe-de-Sainte-Foy / Beauport".into(),
        };
        assert_eq!(line.to_string(), "800 : Pointe-de-Sainte-Foy / Beauport");

        let bare = Line {
            description: String::new(),
            ..line
        };
        assert_eq!(bare.to_string(), "800");
    }
}
