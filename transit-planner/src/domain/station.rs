//! Station types.

use std::fmt;

use serde::Serialize;

use super::{Coordinates, ServiceTime, StopVisitId};

/// Identifier of a station within one compiled schedule.
///
/// Ids are dense and assigned in insertion order by the schedule builder.
/// The two largest values are reserved for the ephemeral query endpoints
/// and never name a real station.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct StationId(pub u32);

impl StationId {
    /// Station id carried by the ephemeral origin stop visit.
    pub const ORIGIN: StationId = StationId(u32::MAX - 1);

    /// Station id carried by the ephemeral destination stop visit.
    pub const DESTINATION: StationId = StationId(u32::MAX);

    /// Returns true for the two reserved endpoint ids.
    pub fn is_sentinel(&self) -> bool {
        *self == Self::ORIGIN || *self == Self::DESTINATION
    }
}

impl fmt::Debug for StationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::ORIGIN => f.write_str("StationId(ORIGIN)"),
            Self::DESTINATION => f.write_str("StationId(DESTINATION)"),
            StationId(id) => write!(f, "StationId({id})"),
        }
    }
}

impl fmt::Display for StationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A station and every stop visit that happens there.
///
/// Visits are kept sorted by arrival time. Visits sharing a timestamp stay
/// in the order they were added, so the list behaves like a multimap.
#[derive(Debug, Clone)]
pub struct Station {
    pub id: StationId,
    /// Feed identifier (GTFS `stop_id`).
    pub code: String,
    pub name: String,
    pub coordinates: Coordinates,
    visits: Vec<(ServiceTime, StopVisitId)>,
}

impl Station {
    pub fn new(id: StationId, code: String, name: String, coordinates: Coordinates) -> Self {
        Self {
            id,
            code,
            name,
            coordinates,
            visits: Vec::new(),
        }
    }

    /// Visits at this station, ordered by arrival time.
    pub fn visits(&self) -> &[(ServiceTime, StopVisitId)] {
        &self.visits
    }

    pub fn visit_count(&self) -> usize {
        self.visits.len()
    }

    pub fn has_visits(&self) -> bool {
        !self.visits.is_empty()
    }

    /// Earliest visit arriving at or after `time`.
    ///
    /// When several visits share that arrival time, the first one added wins.
    pub fn first_visit_at_or_after(&self, time: ServiceTime) -> Option<(ServiceTime, StopVisitId)> {
        let idx = self.visits.partition_point(|(arrival, _)| *arrival < time);
        self.visits.get(idx).copied()
    }

    /// Record a visit, keeping arrival order stable for equal times.
    pub(crate) fn insert_visit(&mut self, arrival: ServiceTime, visit: StopVisitId) {
        let idx = self.visits.partition_point(|(t, _)| *t <= arrival);
        self.visits.insert(idx, (arrival, visit));
    }
}

impl fmt::Display for Station {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.code, self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn station() -> Station {
        Station::new(
            StationId(3),
            "1515".to_string(),
            "Gare du Palais".to_string(),
            Coordinates::new(46.8169, -71.2139),
        )
    }

    fn t(secs: u32) -> ServiceTime {
        ServiceTime::from_secs(secs)
    }

    #[test]
    fn sentinels_are_distinct() {
        assert_ne!(StationId::ORIGIN, StationId::DESTINATION);
        assert!(StationId::ORIGIN.is_sentinel());
        assert!(StationId::DESTINATION.is_sentinel());
        assert!(!StationId(0).is_sentinel());
        assert_eq!(format!("{:?}", StationId::ORIGIN), "StationId(ORIGIN)");
        assert_eq!(format!("{:?}", StationId(7)), "StationId(7)");
    }

    #[test]
    fn visits_are_kept_sorted() {
        let mut s = station();
        s.insert_visit(t(300), StopVisitId(0));
        s.insert_visit(t(100), StopVisitId(1));
        s.insert_visit(t(200), StopVisitId(2));

        let arrivals: Vec<u32> = s.visits().iter().map(|(t, _)| t.as_secs()).collect();
        assert_eq!(arrivals, vec![100, 200, 300]);
        assert_eq!(s.visit_count(), 3);
    }

    #[test]
    fn equal_arrivals_keep_insertion_order() {
        let mut s = station();
        s.insert_visit(t(100), StopVisitId(5));
        s.insert_visit(t(100), StopVisitId(2));
        s.insert_visit(t(50), StopVisitId(9));

        let ids: Vec<StopVisitId> = s.visits().iter().map(|(_, v)| *v).collect();
        assert_eq!(ids, vec![StopVisitId(9), StopVisitId(5), StopVisitId(2)]);
    }

    #[test]
    fn first_visit_at_or_after() {
        let mut s = station();
        s.insert_visit(t(100), StopVisitId(0));
        s.insert_visit(t(200), StopVisitId(1));
        s.insert_visit(t(200), StopVisitId(2));

        assert_eq!(s.first_visit_at_or_after(t(0)), Some((t(100), StopVisitId(0))));
        assert_eq!(s.first_visit_at_or_after(t(100)), Some((t(100), StopVisitId(0))));
        assert_eq!(s.first_visit_at_or_after(t(101)), Some((t(200), StopVisitId(1))));
        assert_eq!(s.first_visit_at_or_after(t(201)), None);
    }

    #[test]
    fn empty_station() {
        let s = station();
        assert!(!s.has_visits());
        assert_eq!(s.first_visit_at_or_after(t(0)), None);
        assert_eq!(s.to_string(), "1515 - Gare du Palais");
    }
}
