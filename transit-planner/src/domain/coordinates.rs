//! Geographic coordinates and straight-line distance.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Mean Earth radius used for great-circle distances.
const EARTH_RADIUS_KM: f64 = 6371.0;

/// A WGS84 point in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Great-circle distance to `other`, in kilometres (haversine formula).
    ///
    /// ```
    /// use transit_planner::domain::Coordinates;
    ///
    /// let a = Coordinates::new(46.8139, -71.2080);
    /// assert_eq!(a.distance_km(&a), 0.0);
    /// ```
    pub fn distance_km(&self, other: &Coordinates) -> f64 {
        let lat1 = self.latitude.to_radians();
        let lat2 = other.latitude.to_radians();
        let d_lat = (other.latitude - self.latitude).to_radians();
        let d_lon = (other.longitude - self.longitude).to_radians();

        let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
        EARTH_RADIUS_KM * c
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.6}, {:.6})", self.latitude, self.longitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_degree_of_latitude() {
        let a = Coordinates::new(0.0, 0.0);
        let b = Coordinates::new(1.0, 0.0);
        let d = a.distance_km(&b);
        assert!((d - 111.195).abs() < 0.01, "got {d}");
    }

    #[test]
    fn distance_is_symmetric() {
        let quebec = Coordinates::new(46.8139, -71.2080);
        let levis = Coordinates::new(46.8033, -71.1779);
        let there = quebec.distance_km(&levis);
        let back = levis.distance_km(&quebec);
        assert!((there - back).abs() < 1e-9);
        assert!(there > 2.0 && there < 3.0, "got {there}");
    }

    #[test]
    fn display() {
        assert_eq!(
            Coordinates::new(46.5, -71.25).to_string(),
            "(46.500000, -71.250000)"
        );
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn point() -> impl Strategy<Value = Coordinates> {
        (-80.0f64..80.0, -179.0f64..179.0).prop_map(|(lat, lon)| Coordinates::new(lat, lon))
    }

    proptest! {
        #[test]
        fn triangle_inequality(a in point(), b in point(), c in point()) {
            let ab = a.distance_km(&b);
            let bc = b.distance_km(&c);
            let ac = a.distance_km(&c);
            prop_assert!(ac <= ab + bc + 1e-6);
        }

        #[test]
        fn non_negative(a in point(), b in point()) {
            prop_assert!(a.distance_km(&b) >= 0.0);
        }
    }
}
