//! Irish Rail realtime API HTTP client.
//!
//! The API is unauthenticated and answers every query with an XML document.
//! Station codes and train codes go in the query string; journey lookups
//! also need the service date in the short `D Mon YYYY` form.

use std::sync::Arc;

use tokio::sync::Semaphore;
use tracing::debug;

use crate::domain::{Journey, Station, Train, TrainCode};
use crate::provider::ScheduleProvider;

use super::error::ApiError;
use super::xml::{parse_station_data, parse_stations, parse_train_movements};

/// Default base URL for the realtime API.
const DEFAULT_BASE_URL: &str = "https://api.irishrail.ie/realtime/realtime.asmx";

/// Default maximum concurrent requests.
const DEFAULT_MAX_CONCURRENT: usize = 5;

/// Configuration for the realtime API client.
#[derive(Debug, Clone)]
pub struct RailClientConfig {
    /// Base URL for the API
    pub base_url: String,
    /// Maximum concurrent requests
    pub max_concurrent: usize,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl RailClientConfig {
    /// Create a config pointing at the public API.
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            timeout_secs: 30,
        }
    }

    /// Set a custom base URL (for testing or a proxy).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set maximum concurrent requests.
    pub fn with_max_concurrent(mut self, n: usize) -> Self {
        self.max_concurrent = n;
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

impl Default for RailClientConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Realtime API client.
///
/// Uses a semaphore to bound concurrent requests, since journey lookups for
/// many rows may be in flight at once.
#[derive(Debug, Clone)]
pub struct IrishRailClient {
    http: reqwest::Client,
    base_url: String,
    semaphore: Arc<Semaphore>,
}

impl IrishRailClient {
    /// Create a new client with the given configuration.
    pub fn new(config: RailClientConfig) -> Result<Self, ApiError> {
        if config.max_concurrent == 0 {
            return Err(ApiError::Config(
                "max_concurrent must be at least 1".to_string(),
            ));
        }

        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            semaphore: Arc::new(Semaphore::new(config.max_concurrent)),
        })
    }

    /// GET `{base_url}/{endpoint}` and return the body text.
    async fn get_xml(&self, endpoint: &str, query: &[(&str, String)]) -> Result<String, ApiError> {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|_| ApiError::Config("request semaphore closed".to_string()))?;

        let url = format!("{}/{}", self.base_url, endpoint);
        debug!(%url, ?query, "requesting");

        let response = self.http.get(&url).query(query).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        Ok(response.text().await?)
    }
}

impl ScheduleProvider for IrishRailClient {
    async fn fetch_stations(&self) -> Result<Vec<Station>, ApiError> {
        let body = self.get_xml("getAllStationsXML", &[]).await?;
        parse_stations(&body)
    }

    async fn fetch_trains(
        &self,
        station: &Station,
        lookahead_mins: u16,
    ) -> Result<Vec<Train>, ApiError> {
        let body = self
            .get_xml(
                "getStationDataByCodeXML_WithNumMins",
                &[
                    ("StationCode", station.code.to_string()),
                    ("NumMins", lookahead_mins.to_string()),
                ],
            )
            .await?;
        parse_station_data(&body)
    }

    async fn fetch_journey(&self, code: &TrainCode, date: &str) -> Result<Journey, ApiError> {
        let body = self
            .get_xml(
                "getTrainMovementsXML",
                &[
                    ("TrainId", code.to_string()),
                    ("TrainDate", date.to_string()),
                ],
            )
            .await?;
        parse_train_movements(&body, code, date)
    }
}
