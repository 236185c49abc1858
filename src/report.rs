//! Human-readable statistics over a loaded [`Dataset`].

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

use crate::dataset::Dataset;
use crate::stats::{mean, ratio, stddev};
use crate::trip::BikeId;

const MINUTE: u64 = 60;
const HOUR: u64 = 60 * MINUTE;
const DAY: u64 = 24 * HOUR;

/// Renders a duration as `1d 2h 3m 4s`, leaving out the days when there are none.
pub fn format_duration(seconds: u64) -> String {
    let days = seconds / DAY;
    let hours = (seconds % DAY) / HOUR;
    let minutes = (seconds % HOUR) / MINUTE;
    let secs = seconds % MINUTE;

    if days == 0 {
        format!("{hours}h {minutes}m {secs}s")
    } else {
        format!("{days}d {hours}h {minutes}m {secs}s")
    }
}

/// Renders `value` with a fixed number of decimals and comma thousands separators.
pub fn format_thousands(value: f64, decimals: usize) -> String {
    let formatted = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match formatted.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (formatted.as_str(), None),
    };

    let mut out = String::with_capacity(formatted.len() + int_part.len() / 3 + 1);
    if value < 0.0 {
        out.push('-');
    }

    let digits = int_part.len();
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (digits - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }

    if let Some(frac_part) = frac_part {
        out.push('.');
        out.push_str(frac_part);
    }

    out
}

/// Describes how the destination's dock count compares, on average, to the origin's.
pub fn capacity_direction(mean_delta: f64) -> String {
    if mean_delta > 0.0 {
        format!("{mean_delta:.2} more")
    } else if mean_delta < 0.0 {
        format!("{:.2} fewer", mean_delta.abs())
    } else {
        "the same number of".to_string()
    }
}

/// Aggregate statistics for one dataset, printable as text, JSON or a CSV row.
#[derive(Debug, Default, Serialize)]
pub struct Summary {
    pub timestamp: DateTime<Utc>,
    pub stations: usize,
    pub trips: usize,

    // durations, in seconds
    pub total_duration: u64,
    pub average_duration: f64,

    // distances, in meters
    pub total_distance: f64,
    pub average_distance: f64,

    // per-bike usage, in seconds
    pub average_bike_usage: f64,
    pub most_used_bike: Option<BikeId>,
    pub most_used_bike_usage: Option<u64>,

    // movements
    pub average_movements: f64,
    pub capacity_delta_mean: f64,
    pub capacity_delta_stddev: f64,
}

impl Summary {
    pub fn from_dataset(dataset: &Dataset) -> Self {
        let trips = dataset.number_trips();
        let total_duration = dataset.total_duration();
        let total_distance = dataset.total_distance();

        let bike_times = dataset.get_bike_times();
        let usage: Vec<f64> = bike_times.values().map(|&secs| secs as f64).collect();
        let most_used = bike_times.iter().max_by_key(|&(_, &secs)| secs);

        let movements = dataset.get_bike_movements();
        let movement_count: usize = movements.values().map(Vec::len).sum();
        let deltas: Vec<f64> = movements
            .values()
            .flatten()
            .map(|movement| movement.capacity_delta as f64)
            .collect();
        let capacity_delta_mean = mean(&deltas);

        Summary {
            timestamp: Utc::now(),
            stations: dataset.number_stations(),
            trips,
            total_duration,
            average_duration: ratio(total_duration as f64, trips),
            total_distance,
            average_distance: ratio(total_distance, trips),
            average_bike_usage: mean(&usage),
            most_used_bike: most_used.map(|(&bike_id, _)| bike_id),
            most_used_bike_usage: most_used.map(|(_, &secs)| secs),
            average_movements: ratio(movement_count as f64, movements.len()),
            capacity_delta_mean,
            capacity_delta_stddev: stddev(&deltas, capacity_delta_mean),
        }
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "# of stations: {}", self.stations)?;
        writeln!(f, "# of trips: {}", self.trips)?;
        writeln!(f)?;

        writeln!(
            f,
            "The aggregate total duration of all Divvy trips was {}",
            format_duration(self.total_duration)
        )?;
        writeln!(
            f,
            "The average duration of a Divvy trip was {}",
            format_duration(self.average_duration as u64)
        )?;
        writeln!(f)?;

        writeln!(
            f,
            "The total distance travelled by all the Divvy bikes was {} kilometers.",
            format_thousands(self.total_distance / 1000.0, 2)
        )?;
        writeln!(
            f,
            "The average distance travelled in a single trip was {} meters.",
            format_thousands(self.average_distance, 2)
        )?;
        writeln!(f)?;

        writeln!(
            f,
            "The average total usage of a bike is {}",
            format_duration(self.average_bike_usage as u64)
        )?;
        match (self.most_used_bike, self.most_used_bike_usage) {
            (Some(bike_id), Some(usage)) => writeln!(
                f,
                "The most used bike is {}, used a total of {}",
                bike_id,
                format_duration(usage)
            )?,
            _ => writeln!(f, "No bike was used")?,
        }
        writeln!(f)?;

        writeln!(
            f,
            "The average number of times a bike was moved was {:.2}",
            self.average_movements
        )?;
        writeln!(
            f,
            "On average, a bike is moved to a station with {} docks",
            capacity_direction(self.capacity_delta_mean)
        )?;
        write!(f, "(Standard deviation: {:.2})", self.capacity_delta_stddev)
    }
}
