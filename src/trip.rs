use chrono::NaiveDateTime;
use std::fmt;
use std::sync::Arc;

use crate::station::Station;

pub type TripId = u64;
pub type BikeId = u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gender {
    Male,
    Female,
}

/// Who rented the bike. Gender and birth year are only recorded for subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rider {
    /// Bought a 24-hour pass.
    Customer,
    /// Holds an annual membership.
    Subscriber {
        gender: Option<Gender>,
        birth_year: Option<u16>,
    },
}

/// A single rental, from pickup at one station to drop-off at another.
#[derive(Debug, Clone)]
pub struct Trip {
    pub trip_id: TripId,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub bike_id: BikeId,
    /// Authoritative duration as recorded in the trips file, not derived from
    /// the timestamps.
    pub duration_seconds: u64,
    pub from_station: Arc<Station>,
    pub to_station: Arc<Station>,
    pub rider: Rider,
}

impl Trip {
    /// Straight-line distance between origin and destination, in meters.
    pub fn get_distance(&self) -> f64 {
        self.from_station.distance_to(&self.to_station)
    }

    /// Dock capacity of the destination minus that of the origin.
    pub fn capacity_delta(&self) -> i64 {
        i64::from(self.to_station.dock_capacity) - i64::from(self.from_station.dock_capacity)
    }

    pub fn is_subscriber(&self) -> bool {
        matches!(self.rider, Rider::Subscriber { .. })
    }

    pub fn gender(&self) -> Option<Gender> {
        match self.rider {
            Rider::Subscriber { gender, .. } => gender,
            Rider::Customer => None,
        }
    }

    pub fn birth_year(&self) -> Option<u16> {
        match self.rider {
            Rider::Subscriber { birth_year, .. } => birth_year,
            Rider::Customer => None,
        }
    }
}

impl fmt::Display for Trip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Trip {}: Station {} to Station {}",
            self.trip_id, self.from_station.station_id, self.to_station.station_id
        )
    }
}
