//! The remote schedule source, as seen by the rest of the crate.

use std::future::Future;

use chrono::NaiveDate;

use crate::domain::{Journey, Station, Train, TrainCode};
use crate::irishrail::ApiError;

/// Source of stations, upcoming trains and per-train journeys.
///
/// Implemented over HTTP by [`IrishRailClient`](crate::irishrail::IrishRailClient)
/// and in memory by [`MockRailClient`](crate::irishrail::MockRailClient).
pub trait ScheduleProvider: Send + Sync + 'static {
    /// Every station the source knows about.
    fn fetch_stations(&self) -> impl Future<Output = Result<Vec<Station>, ApiError>> + Send;

    /// Trains due at `station` within the next `lookahead_mins` minutes,
    /// in the source's order.
    fn fetch_trains(
        &self,
        station: &Station,
        lookahead_mins: u16,
    ) -> impl Future<Output = Result<Vec<Train>, ApiError>> + Send;

    /// The stops of train `code` on `date` (formatted by [`journey_date`]).
    fn fetch_journey(
        &self,
        code: &TrainCode,
        date: &str,
    ) -> impl Future<Output = Result<Journey, ApiError>> + Send;
}

/// Format a date the way journey lookups expect it: day without padding,
/// abbreviated month, full year (`5 Mar 2024`).
pub fn journey_date(date: NaiveDate) -> String {
    date.format("%-d %b %Y").to_string()
}
