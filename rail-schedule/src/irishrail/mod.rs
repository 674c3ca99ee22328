//! Irish Rail realtime API client.
//!
//! This module provides an HTTP client for the public realtime API, which
//! serves the station list, the trains due at a station, and the movements
//! of a single train.
//!
//! Key characteristics of the API:
//! - Every response is an XML document in the `http://api.irishrail.ie/realtime/`
//!   namespace; the wrapper element names differ per endpoint
//! - Train codes are padded with trailing spaces
//! - Times are pre-formatted `HH:MM` strings, with `00:00:00` meaning "none"
//!   in journey movements
//! - Journey lookups take the date as `D Mon YYYY`

mod client;
mod error;
mod mock;
mod xml;

pub use client::{IrishRailClient, RailClientConfig};
pub use error::ApiError;
pub use mock::{MockOperation, MockRailClient};
pub use xml::{RecordError, parse_station_data, parse_stations, parse_train_movements};
