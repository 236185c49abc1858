//! Geographic coordinates and great-circle distances.

use std::fmt;

/// Mean Earth radius used by [`Location::distance_to`].
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// A latitude/longitude pair in degrees.
///
/// Values are not range-checked; out-of-range coordinates still produce a
/// (meaningless) distance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

impl Location {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Great-circle distance to `other` in meters, using the Haversine formula.
    pub fn distance_to(&self, other: &Location) -> f64 {
        let delta_lat = (other.latitude - self.latitude).to_radians();
        let delta_lon = (other.longitude - self.longitude).to_radians();

        let a = (delta_lat / 2.0).sin().powi(2)
            + self.latitude.to_radians().cos()
                * other.latitude.to_radians().cos()
                * (delta_lon / 2.0).sin().powi(2);
        let d = 2.0 * a.sqrt().asin();

        EARTH_RADIUS_M * d
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lat = if self.latitude < 0.0 { "S" } else { "N" };
        let lon = if self.longitude < 0.0 { "W" } else { "E" };

        write!(
            f,
            "({:.3} {}, {:.3} {})",
            self.latitude.abs(),
            lat,
            self.longitude.abs(),
            lon
        )
    }
}
