//! Decoding of the realtime API's XML documents into domain types.
//!
//! Every document is a flat array of records (`objStation`,
//! `objStationData`, `objTrainMovements`) whose fields are child elements
//! with text content. Records that fail validation are skipped with a
//! warning rather than failing the whole document.

use roxmltree::{Document, Node};
use tracing::warn;

use crate::domain::{
    Direction, Journey, JourneyStop, LocationKind, Station, StationCode, StopMarker, Train,
    TrainCode,
};

use super::error::ApiError;

/// Why a single record was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecordError {
    #[error("missing field {0}")]
    MissingField(&'static str),

    #[error("invalid field {field}: {value:?}")]
    InvalidField { field: &'static str, value: String },
}

/// Text of the first child element named `tag`, trimmed; `None` if absent
/// or empty.
fn child_text<'a>(node: Node<'a, '_>, tag: &str) -> Option<&'a str> {
    node.children()
        .find(|n| n.has_tag_name(tag))
        .and_then(|n| n.text())
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

fn required<'a>(node: Node<'a, '_>, tag: &'static str) -> Result<&'a str, RecordError> {
    child_text(node, tag).ok_or(RecordError::MissingField(tag))
}

fn optional_string(node: Node<'_, '_>, tag: &str) -> String {
    child_text(node, tag).unwrap_or_default().to_string()
}

/// Journey times use `00:00:00` for "not applicable".
fn optional_time(node: Node<'_, '_>, tag: &str) -> Option<String> {
    child_text(node, tag)
        .filter(|s| *s != "00:00:00")
        .map(str::to_string)
}

fn parse_number<T: std::str::FromStr>(
    node: Node<'_, '_>,
    tag: &'static str,
) -> Result<Option<T>, RecordError> {
    child_text(node, tag)
        .map(|s| {
            s.parse().map_err(|_| RecordError::InvalidField {
                field: tag,
                value: s.to_string(),
            })
        })
        .transpose()
}

fn records<'a, 'input>(
    doc: &'a Document<'input>,
    tag: &'static str,
) -> impl Iterator<Item = Node<'a, 'input>> {
    doc.root_element()
        .children()
        .filter(move |n| n.has_tag_name(tag))
}

/// Decode `getAllStationsXML`.
pub fn parse_stations(xml: &str) -> Result<Vec<Station>, ApiError> {
    let doc = Document::parse(xml)?;
    let stations = records(&doc, "objStation")
        .filter_map(|node| match decode_station(node) {
            Ok(station) => Some(station),
            Err(e) => {
                warn!(error = %e, "skipping station record");
                None
            }
        })
        .collect();
    Ok(stations)
}

fn decode_station(node: Node<'_, '_>) -> Result<Station, RecordError> {
    let raw_code = required(node, "StationCode")?;
    let code = StationCode::parse_normalized(raw_code).map_err(|_| RecordError::InvalidField {
        field: "StationCode",
        value: raw_code.to_string(),
    })?;

    Ok(Station {
        name: required(node, "StationDesc")?.to_string(),
        code,
        alias: child_text(node, "StationAlias").map(str::to_string),
        latitude: parse_number(node, "StationLatitude")?.unwrap_or_default(),
        longitude: parse_number(node, "StationLongitude")?.unwrap_or_default(),
        id: parse_number(node, "StationId")?,
    })
}

/// Decode `getStationDataByCodeXML_WithNumMins`, preserving document order.
pub fn parse_station_data(xml: &str) -> Result<Vec<Train>, ApiError> {
    let doc = Document::parse(xml)?;
    let trains = records(&doc, "objStationData")
        .filter_map(|node| match decode_train(node) {
            Ok(train) => Some(train),
            Err(e) => {
                warn!(error = %e, "skipping station data record");
                None
            }
        })
        .collect();
    Ok(trains)
}

fn decode_train(node: Node<'_, '_>) -> Result<Train, RecordError> {
    let raw_code = required(node, "Traincode")?;
    let code = TrainCode::parse_normalized(raw_code).map_err(|_| RecordError::InvalidField {
        field: "Traincode",
        value: raw_code.to_string(),
    })?;

    let raw_station = required(node, "Stationcode")?;
    let station_code =
        StationCode::parse_normalized(raw_station).map_err(|_| RecordError::InvalidField {
            field: "Stationcode",
            value: raw_station.to_string(),
        })?;

    Ok(Train {
        server_time: optional_string(node, "Servertime"),
        code,
        station_name: optional_string(node, "Stationfullname"),
        station_code,
        query_time: optional_string(node, "Querytime"),
        train_date: optional_string(node, "Traindate"),
        origin: optional_string(node, "Origin"),
        destination: optional_string(node, "Destination"),
        origin_time: optional_string(node, "Origintime"),
        destination_time: optional_string(node, "Destinationtime"),
        status: optional_string(node, "Status"),
        last_location: optional_string(node, "Lastlocation"),
        due_in: parse_number(node, "Duein")?,
        late: parse_number(node, "Late")?,
        expected_arrival: optional_string(node, "Exparrival"),
        expected_departure: optional_string(node, "Expdepart"),
        scheduled_arrival: optional_string(node, "Scharrival"),
        scheduled_departure: optional_string(node, "Schdepart"),
        direction: Direction::parse(&optional_string(node, "Direction")),
        train_type: optional_string(node, "Traintype"),
        location_type: optional_string(node, "Locationtype"),
    })
}

/// Decode `getTrainMovementsXML` for `code` on `date`.
///
/// An empty document means the source knows no such train that day.
pub fn parse_train_movements(xml: &str, code: &TrainCode, date: &str) -> Result<Journey, ApiError> {
    let doc = Document::parse(xml)?;
    let stops: Vec<JourneyStop> = records(&doc, "objTrainMovements")
        .filter_map(|node| match decode_stop(node) {
            Ok(stop) => Some(stop),
            Err(e) => {
                warn!(train = %code, error = %e, "skipping train movement record");
                None
            }
        })
        .collect();

    if stops.is_empty() {
        return Err(ApiError::JourneyNotFound(code.to_string()));
    }

    Ok(Journey::new(code.clone(), date, stops))
}

fn decode_stop(node: Node<'_, '_>) -> Result<JourneyStop, RecordError> {
    let raw_kind = required(node, "LocationType")?;
    let kind = LocationKind::from_code(raw_kind).ok_or_else(|| RecordError::InvalidField {
        field: "LocationType",
        value: raw_kind.to_string(),
    })?;

    Ok(JourneyStop {
        location_code: required(node, "LocationCode")?.to_string(),
        location_name: optional_string(node, "LocationFullName"),
        order: parse_number(node, "LocationOrder")?
            .ok_or(RecordError::MissingField("LocationOrder"))?,
        kind,
        scheduled_arrival: optional_time(node, "ScheduledArrival"),
        scheduled_departure: optional_time(node, "ScheduledDeparture"),
        expected_arrival: optional_time(node, "ExpectedArrival"),
        expected_departure: optional_time(node, "ExpectedDeparture"),
        arrival: optional_time(node, "Arrival"),
        departure: optional_time(node, "Departure"),
        marker: StopMarker::from_code(child_text(node, "StopType").unwrap_or("-")),
    })
}
