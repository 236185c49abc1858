use chrono::NaiveDate;
use std::fmt;

use crate::location::Location;

pub type StationId = u32;

/// A docking station, as read from one row of the stations file.
#[derive(Debug, Clone, PartialEq)]
pub struct Station {
    pub station_id: StationId,
    pub name: String,
    pub location: Location,
    pub dock_capacity: u32,
    /// Undocumented column carried through from the source data.
    pub landmark: i64,
    pub online_date: NaiveDate,
}

impl Station {
    /// Distance "as the crow flies" to `other`, in meters.
    pub fn distance_to(&self, other: &Station) -> f64 {
        self.location.distance_to(&other.location)
    }
}

impl fmt::Display for Station {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Station {}: {}", self.station_id, self.name)
    }
}
