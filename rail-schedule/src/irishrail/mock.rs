//! In-memory schedule source for tests and offline development.
//!
//! Serves fixed stations, trains and journeys as if they came from the
//! realtime API, with optional latency and switchable failures so callers
//! can exercise timeouts, overlapping requests and error paths.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use crate::domain::{Journey, Station, StationCode, Train, TrainCode};
use crate::provider::ScheduleProvider;

use super::error::ApiError;

/// Which mock operation a setting applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockOperation {
    Stations,
    Trains,
    Journey,
}

/// Mock schedule source.
///
/// Share it behind an `Arc` to inspect call counts after handing it to a
/// session.
#[derive(Debug, Default)]
pub struct MockRailClient {
    stations: Vec<Station>,
    trains: HashMap<StationCode, Vec<Train>>,
    journeys: HashMap<TrainCode, Journey>,

    stations_delay: Duration,
    train_delays: HashMap<StationCode, Duration>,
    journey_delay: Duration,

    fail_stations: AtomicBool,
    fail_trains: AtomicBool,
    fail_journeys: AtomicBool,

    station_calls: AtomicUsize,
    train_calls: AtomicUsize,
    journey_calls: AtomicUsize,

    last_journey_date: Mutex<Option<String>>,
}

impl MockRailClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve this station list.
    pub fn with_stations(mut self, stations: Vec<Station>) -> Self {
        self.stations = stations;
        self
    }

    /// Serve these trains for `station`.
    pub fn with_trains(mut self, station: StationCode, trains: Vec<Train>) -> Self {
        self.trains.insert(station, trains);
        self
    }

    /// Serve this journey for its train code, on any date.
    pub fn with_journey(mut self, journey: Journey) -> Self {
        self.journeys.insert(journey.code.clone(), journey);
        self
    }

    /// Delay the station list response.
    pub fn with_stations_delay(mut self, delay: Duration) -> Self {
        self.stations_delay = delay;
        self
    }

    /// Delay train list responses for one station.
    pub fn with_train_delay(mut self, station: StationCode, delay: Duration) -> Self {
        self.train_delays.insert(station, delay);
        self
    }

    /// Delay journey responses.
    pub fn with_journey_delay(mut self, delay: Duration) -> Self {
        self.journey_delay = delay;
        self
    }

    /// Make an operation fail (or succeed again) from now on.
    pub fn set_failing(&self, op: MockOperation, failing: bool) {
        self.flag(op).store(failing, Ordering::SeqCst);
    }

    /// How many times an operation has been called.
    pub fn calls(&self, op: MockOperation) -> usize {
        self.counter(op).load(Ordering::SeqCst)
    }

    /// Date string passed to the most recent journey lookup.
    pub fn last_journey_date(&self) -> Option<String> {
        self.last_journey_date
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn flag(&self, op: MockOperation) -> &AtomicBool {
        match op {
            MockOperation::Stations => &self.fail_stations,
            MockOperation::Trains => &self.fail_trains,
            MockOperation::Journey => &self.fail_journeys,
        }
    }

    fn counter(&self, op: MockOperation) -> &AtomicUsize {
        match op {
            MockOperation::Stations => &self.station_calls,
            MockOperation::Trains => &self.train_calls,
            MockOperation::Journey => &self.journey_calls,
        }
    }

    /// Count the call, wait out the delay, then report an injected failure.
    async fn begin(&self, op: MockOperation, delay: Duration) -> Result<(), ApiError> {
        self.counter(op).fetch_add(1, Ordering::SeqCst);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        if self.flag(op).load(Ordering::SeqCst) {
            return Err(ApiError::Api {
                status: 503,
                message: format!("mock {:?} failure", op),
            });
        }
        Ok(())
    }
}

impl ScheduleProvider for MockRailClient {
    async fn fetch_stations(&self) -> Result<Vec<Station>, ApiError> {
        self.begin(MockOperation::Stations, self.stations_delay)
            .await?;
        Ok(self.stations.clone())
    }

    async fn fetch_trains(
        &self,
        station: &Station,
        _lookahead_mins: u16,
    ) -> Result<Vec<Train>, ApiError> {
        let delay = self
            .train_delays
            .get(&station.code)
            .copied()
            .unwrap_or_default();
        self.begin(MockOperation::Trains, delay).await?;
        Ok(self.trains.get(&station.code).cloned().unwrap_or_default())
    }

    async fn fetch_journey(&self, code: &TrainCode, date: &str) -> Result<Journey, ApiError> {
        *self
            .last_journey_date
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(date.to_string());
        self.begin(MockOperation::Journey, self.journey_delay)
            .await?;

        let journey = self
            .journeys
            .get(code)
            .ok_or_else(|| ApiError::JourneyNotFound(code.to_string()))?;
        Ok(Journey {
            date: date.to_string(),
            ..journey.clone()
        })
    }
}
