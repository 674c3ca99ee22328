//! Per-train journeys: the ordered stops of one service on one date.

use serde::{Deserialize, Serialize};

use super::TrainCode;

/// What kind of location a journey stop is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LocationKind {
    /// Where the service starts.
    Origin,
    /// A scheduled passenger stop.
    Stop,
    /// A timing point the train passes without stopping.
    TimingPoint,
    /// Where the service terminates.
    Destination,
}

impl LocationKind {
    /// Decode the source's single-letter location type (`O`, `S`, `T`, `D`).
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim() {
            "O" => Some(LocationKind::Origin),
            "S" => Some(LocationKind::Stop),
            "T" => Some(LocationKind::TimingPoint),
            "D" => Some(LocationKind::Destination),
            _ => None,
        }
    }
}

/// Marker for where the train currently is along the journey.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum StopMarker {
    /// The train is at (or was last reported at) this stop.
    Current,
    /// The train's next stop.
    Next,
    #[default]
    None,
}

impl StopMarker {
    /// Decode the source's stop type (`C`, `N`, or `-`).
    pub fn from_code(code: &str) -> Self {
        match code.trim() {
            "C" => StopMarker::Current,
            "N" => StopMarker::Next,
            _ => StopMarker::None,
        }
    }
}

/// One location along a train's journey.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JourneyStop {
    pub location_code: String,
    pub location_name: String,

    /// 1-based position along the route.
    pub order: u32,

    pub kind: LocationKind,

    pub scheduled_arrival: Option<String>,
    pub scheduled_departure: Option<String>,
    pub expected_arrival: Option<String>,
    pub expected_departure: Option<String>,

    /// Actual arrival, once reported.
    pub arrival: Option<String>,

    /// Actual departure, once reported.
    pub departure: Option<String>,

    pub marker: StopMarker,
}

impl JourneyStop {
    /// Whether the train has already departed from this stop.
    pub fn has_departed(&self) -> bool {
        self.departure.is_some()
    }
}

/// The sequence of stops and timings for one train on one date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Journey {
    pub code: TrainCode,

    /// Date as sent to the source (e.g. "5 Mar 2024").
    pub date: String,

    /// Stops ordered by `order`.
    pub stops: Vec<JourneyStop>,
}

impl Journey {
    /// Create a journey, ordering the stops by their position on the route.
    pub fn new(code: TrainCode, date: impl Into<String>, mut stops: Vec<JourneyStop>) -> Self {
        stops.sort_by_key(|s| s.order);
        Self {
            code,
            date: date.into(),
            stops,
        }
    }

    /// Stops where passengers can board or alight (timing points excluded).
    pub fn calling_points(&self) -> impl Iterator<Item = &JourneyStop> {
        self.stops
            .iter()
            .filter(|s| s.kind != LocationKind::TimingPoint)
    }

    /// The stop the train is currently at, if reported.
    pub fn current_stop(&self) -> Option<&JourneyStop> {
        self.stops.iter().find(|s| s.marker == StopMarker::Current)
    }

    /// The train's next stop, if reported.
    pub fn next_stop(&self) -> Option<&JourneyStop> {
        self.stops.iter().find(|s| s.marker == StopMarker::Next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stop(order: u32, name: &str, kind: LocationKind, marker: StopMarker) -> JourneyStop {
        JourneyStop {
            location_code: name[..3].to_uppercase(),
            location_name: name.to_string(),
            order,
            kind,
            scheduled_arrival: None,
            scheduled_departure: None,
            expected_arrival: None,
            expected_departure: None,
            arrival: None,
            departure: None,
            marker,
        }
    }

    #[test]
    fn stops_are_ordered() {
        let journey = Journey::new(
            TrainCode::parse("E109").unwrap(),
            "5 Mar 2024",
            vec![
                stop(3, "Bray", LocationKind::Destination, StopMarker::None),
                stop(1, "Howth", LocationKind::Origin, StopMarker::None),
                stop(2, "Connolly", LocationKind::Stop, StopMarker::None),
            ],
        );
        let names: Vec<_> = journey.stops.iter().map(|s| s.location_name.as_str()).collect();
        assert_eq!(names, vec!["Howth", "Connolly", "Bray"]);
    }

    #[test]
    fn calling_points_skip_timing_points() {
        let journey = Journey::new(
            TrainCode::parse("E109").unwrap(),
            "5 Mar 2024",
            vec![
                stop(1, "Howth", LocationKind::Origin, StopMarker::None),
                stop(2, "Howth Junction", LocationKind::TimingPoint, StopMarker::None),
                stop(3, "Bray", LocationKind::Destination, StopMarker::None),
            ],
        );
        assert_eq!(journey.calling_points().count(), 2);
    }

    #[test]
    fn current_and_next() {
        let journey = Journey::new(
            TrainCode::parse("E109").unwrap(),
            "5 Mar 2024",
            vec![
                stop(1, "Howth", LocationKind::Origin, StopMarker::Current),
                stop(2, "Bray", LocationKind::Destination, StopMarker::Next),
            ],
        );
        assert_eq!(journey.current_stop().unwrap().location_name, "Howth");
        assert_eq!(journey.next_stop().unwrap().location_name, "Bray");
    }

    #[test]
    fn decode_codes() {
        assert_eq!(LocationKind::from_code("T"), Some(LocationKind::TimingPoint));
        assert_eq!(LocationKind::from_code("X"), None);
        assert_eq!(StopMarker::from_code("C"), StopMarker::Current);
        assert_eq!(StopMarker::from_code("-"), StopMarker::None);
    }
}
