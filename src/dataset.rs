//! Loading of the stations and trips files, and aggregate queries over them.
//!
//! Loading is all-or-nothing: the first malformed row, dangling station
//! reference or unknown gender aborts the whole load with a [`LoadError`]
//! naming the offending row.

use chrono::{NaiveDate, NaiveDateTime};
use csv::{ReaderBuilder, StringRecord};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::error::{FileKind, LoadError, RowError};
use crate::location::Location;
use crate::station::{Station, StationId};
use crate::trip::{BikeId, Gender, Rider, Trip};

const STATION_MIN_FIELDS: usize = 7;
/// Trip rows must reach the user type column; gender and birth year may be cut off.
const TRIP_MIN_FIELDS: usize = 10;

const ONLINE_DATE_FORMAT: &str = "%m/%d/%Y";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

pub type StationMap = HashMap<StationId, Arc<Station>>;

/// A bike being taken from one station to another by a single trip.
#[derive(Debug, Clone, PartialEq)]
pub struct Movement {
    pub from: Arc<Station>,
    pub to: Arc<Station>,
    /// Destination dock capacity minus origin dock capacity.
    pub capacity_delta: i64,
}

impl From<&Trip> for Movement {
    fn from(trip: &Trip) -> Self {
        Self {
            from: Arc::clone(&trip.from_station),
            to: Arc::clone(&trip.to_station),
            capacity_delta: trip.capacity_delta(),
        }
    }
}

/// The full, immutable bike-share dataset.
#[derive(Debug)]
pub struct Dataset {
    stations: StationMap,
    trips: Vec<Trip>,
    bike_ids: BTreeSet<BikeId>,
}

impl Dataset {
    /// Loads the stations file, then the trips file whose rows refer to it.
    #[tracing::instrument]
    pub fn load(stations_path: &Path, trips_path: &Path) -> Result<Self, LoadError> {
        let stations = read_stations(open(stations_path)?)?;
        let trips = read_trips(open(trips_path)?, &stations)?;

        Ok(Self::new(stations, trips))
    }

    /// Same protocol as [`Dataset::load`], over arbitrary readers.
    pub fn from_readers<S: Read, T: Read>(stations: S, trips: T) -> Result<Self, LoadError> {
        let stations = read_stations(stations)?;
        let trips = read_trips(trips, &stations)?;

        Ok(Self::new(stations, trips))
    }

    fn new(stations: StationMap, trips: Vec<Trip>) -> Self {
        let bike_ids = trips.iter().map(|trip| trip.bike_id).collect();

        Self {
            stations,
            trips,
            bike_ids,
        }
    }

    pub fn stations(&self) -> &StationMap {
        &self.stations
    }

    pub fn station(&self, station_id: StationId) -> Option<&Arc<Station>> {
        self.stations.get(&station_id)
    }

    /// Trips in file order, which is expected to be start-time order.
    pub fn trips(&self) -> &[Trip] {
        &self.trips
    }

    /// Every bike that appears in at least one trip.
    pub fn bike_ids(&self) -> &BTreeSet<BikeId> {
        &self.bike_ids
    }

    pub fn number_stations(&self) -> usize {
        self.stations.len()
    }

    pub fn number_trips(&self) -> usize {
        self.trips.len()
    }

    /// Sum of straight-line trip distances, in meters.
    pub fn total_distance(&self) -> f64 {
        self.trips.iter().map(Trip::get_distance).sum()
    }

    /// Sum of recorded trip durations, in seconds.
    pub fn total_duration(&self) -> u64 {
        self.trips.iter().map(|trip| trip.duration_seconds).sum()
    }

    /// Total time, in seconds, each bike spent on trips.
    pub fn get_bike_times(&self) -> BTreeMap<BikeId, u64> {
        let mut times: BTreeMap<BikeId, u64> =
            self.bike_ids.iter().map(|&bike_id| (bike_id, 0)).collect();

        for trip in &self.trips {
            *times.entry(trip.bike_id).or_default() += trip.duration_seconds;
        }

        times
    }

    /// Chronological movements of each bike, one per trip it took.
    pub fn get_bike_movements(&self) -> BTreeMap<BikeId, Vec<Movement>> {
        let mut movements: BTreeMap<BikeId, Vec<Movement>> = self
            .bike_ids
            .iter()
            .map(|&bike_id| (bike_id, Vec::new()))
            .collect();

        for trip in &self.trips {
            movements
                .entry(trip.bike_id)
                .or_default()
                .push(Movement::from(trip));
        }

        movements
    }
}

fn open(path: &Path) -> Result<File, LoadError> {
    File::open(path).map_err(|source| LoadError::Open {
        path: path.to_path_buf(),
        source,
    })
}

fn csv_reader<R: Read>(reader: R) -> csv::Reader<R> {
    // Arity is checked per row so short rows are reported with their contents.
    ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader)
}

/// Reads a stations file into a map keyed by station id.
#[tracing::instrument(skip(reader))]
pub fn read_stations<R: Read>(reader: R) -> Result<StationMap, LoadError> {
    let mut rdr = csv_reader(reader);
    let mut stations = StationMap::new();

    for result in rdr.records() {
        let record = result.map_err(|source| LoadError::Csv {
            file: FileKind::Stations,
            source,
        })?;
        let station =
            parse_station(&record).map_err(|kind| row_error(FileKind::Stations, &record, kind))?;

        let station_id = station.station_id;
        if stations.insert(station_id, Arc::new(station)).is_some() {
            warn!(station_id, "Duplicate station id, keeping the later row");
        }
    }

    info!(count = stations.len(), "Loaded stations");
    Ok(stations)
}

/// Reads a trips file, resolving station ids against `stations`.
#[tracing::instrument(skip(reader, stations))]
pub fn read_trips<R: Read>(reader: R, stations: &StationMap) -> Result<Vec<Trip>, LoadError> {
    let mut rdr = csv_reader(reader);
    let mut trips: Vec<Trip> = Vec::new();

    for result in rdr.records() {
        let record = result.map_err(|source| LoadError::Csv {
            file: FileKind::Trips,
            source,
        })?;
        let trip = parse_trip(&record, stations)
            .map_err(|kind| row_error(FileKind::Trips, &record, kind))?;

        trips.push(trip);
    }

    let out_of_order = count_out_of_order(&trips);
    if out_of_order > 0 {
        warn!(out_of_order, "Trips file is not sorted by start time");
    }

    info!(count = trips.len(), "Loaded trips");
    Ok(trips)
}

/// Number of trips that start before the trip preceding them in file order.
fn count_out_of_order(trips: &[Trip]) -> usize {
    trips
        .windows(2)
        .filter(|pair| pair[1].start_time < pair[0].start_time)
        .inspect(|pair| debug!(trip_id = pair[1].trip_id, "Trip starts before its predecessor"))
        .count()
}

fn row_error(file: FileKind, record: &StringRecord, kind: RowError) -> LoadError {
    LoadError::Row {
        file,
        line: record.position().map(|p| p.line()).unwrap_or_default(),
        row: record.iter().collect::<Vec<_>>().join(","),
        kind,
    }
}

fn parse_station(record: &StringRecord) -> Result<Station, RowError> {
    require_fields(record, STATION_MIN_FIELDS)?;

    Ok(Station {
        station_id: parse_field(record, 0, "station id")?,
        name: record[1].to_string(),
        location: Location::new(
            parse_field(record, 2, "latitude")?,
            parse_field(record, 3, "longitude")?,
        ),
        dock_capacity: parse_field(record, 4, "dock capacity")?,
        landmark: parse_field(record, 5, "landmark")?,
        online_date: parse_date(record, 6, "online date")?,
    })
}

fn parse_trip(record: &StringRecord, stations: &StationMap) -> Result<Trip, RowError> {
    require_fields(record, TRIP_MIN_FIELDS)?;

    // Columns 6 and 8 hold station names, which are looked up by id instead.
    let trip_id = parse_field(record, 0, "trip id")?;
    let start_time = parse_timestamp(record, 1, "start time")?;
    let end_time = parse_timestamp(record, 2, "stop time")?;
    let bike_id = parse_field(record, 3, "bike id")?;
    let duration_seconds = parse_field(record, 4, "trip duration")?;
    let from_station = lookup_station(record, 5, "from station id", stations)?;
    let to_station = lookup_station(record, 7, "to station id", stations)?;

    let rider = if &record[9] == "Subscriber" {
        Rider::Subscriber {
            gender: parse_gender(record.get(10).unwrap_or_default())?,
            birth_year: match record.get(11) {
                Some(value) if !value.is_empty() => Some(parse_field(record, 11, "birth year")?),
                _ => None,
            },
        }
    } else {
        Rider::Customer
    };

    Ok(Trip {
        trip_id,
        start_time,
        end_time,
        bike_id,
        duration_seconds,
        from_station,
        to_station,
        rider,
    })
}

fn require_fields(record: &StringRecord, expected: usize) -> Result<(), RowError> {
    if record.len() < expected {
        return Err(RowError::TooFewFields {
            expected,
            found: record.len(),
        });
    }
    Ok(())
}

fn parse_field<T>(record: &StringRecord, index: usize, field: &'static str) -> Result<T, RowError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    let value = record.get(index).unwrap_or_default();
    value
        .trim()
        .parse()
        .map_err(|e: T::Err| RowError::InvalidField {
            field,
            value: value.to_string(),
            reason: e.to_string(),
        })
}

fn parse_date(
    record: &StringRecord,
    index: usize,
    field: &'static str,
) -> Result<NaiveDate, RowError> {
    let value = record.get(index).unwrap_or_default();
    NaiveDate::parse_from_str(value.trim(), ONLINE_DATE_FORMAT).map_err(|e| {
        RowError::InvalidField {
            field,
            value: value.to_string(),
            reason: e.to_string(),
        }
    })
}

fn parse_timestamp(
    record: &StringRecord,
    index: usize,
    field: &'static str,
) -> Result<NaiveDateTime, RowError> {
    let value = record.get(index).unwrap_or_default();
    NaiveDateTime::parse_from_str(value.trim(), TIMESTAMP_FORMAT).map_err(|e| {
        RowError::InvalidField {
            field,
            value: value.to_string(),
            reason: e.to_string(),
        }
    })
}

fn lookup_station(
    record: &StringRecord,
    index: usize,
    field: &'static str,
    stations: &StationMap,
) -> Result<Arc<Station>, RowError> {
    let station_id: StationId = parse_field(record, index, field)?;
    stations
        .get(&station_id)
        .cloned()
        .ok_or(RowError::UnknownStation(station_id))
}

fn parse_gender(value: &str) -> Result<Option<Gender>, RowError> {
    match value {
        "" => Ok(None),
        "Male" => Ok(Some(Gender::Male)),
        "Female" => Ok(Some(Gender::Female)),
        other => Err(RowError::UnknownGender(other.to_string())),
    }
}
