//! Upcoming-train rows for a station.

use serde::{Deserialize, Serialize};

use super::{StationCode, TrainCode};

/// Direction of travel as reported by the source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Northbound,
    Southbound,
    /// Anything else the source emits ("To Belfast", "Eastbound", ...).
    Other(String),
}

impl Direction {
    /// Interpret a raw direction string.
    pub fn parse(s: &str) -> Self {
        match s.trim() {
            "Northbound" => Direction::Northbound,
            "Southbound" => Direction::Southbound,
            other => Direction::Other(other.to_string()),
        }
    }
}

/// One train due at a station within the lookahead window.
///
/// Times are kept as the source's pre-formatted `HH:MM` strings; the
/// schedule view sorts on them lexicographically.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Train {
    /// Server time when the board was generated.
    pub server_time: String,

    /// Service identity, the journey cache key.
    pub code: TrainCode,

    /// Name of the station the board was requested for.
    pub station_name: String,

    /// Code of the station the board was requested for.
    pub station_code: StationCode,

    /// Time the query was answered (`HH:MM:SS`).
    pub query_time: String,

    /// Date the service runs (e.g. "05 Mar 2024").
    pub train_date: String,

    /// Origin station name.
    pub origin: String,

    /// Destination station name.
    pub destination: String,

    /// Departure time from origin.
    pub origin_time: String,

    /// Arrival time at destination.
    pub destination_time: String,

    /// Running status ("En Route", "No Information", ...).
    pub status: String,

    /// Free-text last reported position ("Arrived Bray", ...).
    pub last_location: String,

    /// Minutes until the train is due here.
    pub due_in: Option<i32>,

    /// Minutes late.
    pub late: Option<i32>,

    /// Expected arrival at this station.
    pub expected_arrival: String,

    /// Expected departure from this station.
    pub expected_departure: String,

    /// Scheduled arrival at this station.
    pub scheduled_arrival: String,

    /// Scheduled departure from this station.
    pub scheduled_departure: String,

    pub direction: Direction,

    /// Service type ("DART", "Train", ...).
    pub train_type: String,

    /// Role of this station for the train (O/S/T/D).
    pub location_type: String,
}

impl Train {
    /// Whether the train is running late.
    pub fn is_late(&self) -> bool {
        self.late.is_some_and(|mins| mins > 0)
    }
}
