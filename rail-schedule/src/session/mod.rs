//! The schedule viewer session: one user's station search, selected
//! station, schedule table, favourites and journey lookups.
//!
//! Station changes may overlap. Each change takes a token; a train list
//! whose token is no longer the latest is thrown away, so the schedule
//! always belongs to the most recently chosen station. While a change is
//! pending the schedule is faded out, and it only fades back in once both
//! the fade-out timer and the fetch have finished.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chrono::{DateTime, Local, TimeZone};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use crate::cache::{JourneyCache, JourneyCacheConfig, JourneyError};
use crate::domain::{Journey, Station, StationCode, TrainCode};
use crate::favourites::{self, FavouritesError, FavouritesStore};
use crate::irishrail::ApiError;
use crate::provider::ScheduleProvider;
use crate::schedule::{ScheduleColumn, ScheduleView};
use crate::search::{DEFAULT_MAX_MATCHES, SearchEvent, SearchSession};

/// Lookahead windows offered to the user, in minutes.
pub const LOOKAHEAD_OPTIONS: [u16; 4] = [30, 60, 90, 120];

/// Lookahead used until the user picks another.
pub const DEFAULT_LOOKAHEAD: u16 = 90;

/// Configuration for a session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// How long the initial station list may take before the session fails.
    pub station_load_timeout: Duration,

    /// Duration of the schedule fade-out on station change.
    pub fade_out: Duration,

    /// Pause between the new schedule arriving and the fade-in.
    pub fade_in_delay: Duration,

    /// Allowed lookahead windows (minutes).
    pub lookahead_options: Vec<u16>,

    /// Initial lookahead window (minutes).
    pub default_lookahead: u16,

    /// Number of search matches shown.
    pub max_matches: usize,

    pub journey_cache: JourneyCacheConfig,
}

impl SessionConfig {
    pub fn with_station_load_timeout(mut self, timeout: Duration) -> Self {
        self.station_load_timeout = timeout;
        self
    }

    pub fn with_fade(mut self, fade_out: Duration, fade_in_delay: Duration) -> Self {
        self.fade_out = fade_out;
        self.fade_in_delay = fade_in_delay;
        self
    }

    pub fn with_default_lookahead(mut self, mins: u16) -> Self {
        self.default_lookahead = mins;
        self
    }

    pub fn with_max_matches(mut self, n: usize) -> Self {
        self.max_matches = n;
        self
    }

    pub fn with_journey_cache(mut self, config: JourneyCacheConfig) -> Self {
        self.journey_cache = config;
        self
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            station_load_timeout: Duration::from_millis(5000),
            fade_out: Duration::from_millis(200),
            fade_in_delay: Duration::from_millis(50),
            lookahead_options: LOOKAHEAD_OPTIONS.to_vec(),
            default_lookahead: DEFAULT_LOOKAHEAD,
            max_matches: DEFAULT_MAX_MATCHES,
            journey_cache: JourneyCacheConfig::default(),
        }
    }
}

/// Where the session is in its life.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionStatus {
    /// Station list not loaded yet.
    Loading,
    Ready,
    /// The station list could not be loaded. Only a new session recovers.
    Failed(String),
}

/// Errors from session operations.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("failed to load stations: {0}")]
    StationLoad(#[source] ApiError),

    #[error("station list did not arrive within {0:?}")]
    StationLoadTimeout(Duration),

    /// An earlier station load failed.
    #[error("session unusable: {0}")]
    Failed(String),

    #[error("failed to fetch trains for {station}: {source}")]
    Trains {
        station: StationCode,
        #[source]
        source: ApiError,
    },

    #[error("{0} minutes is not an offered lookahead")]
    InvalidLookahead(u16),

    #[error("no station selected")]
    NoStation,

    #[error("no station named {0:?}")]
    UnknownStation(String),

    #[error(transparent)]
    Journey(#[from] JourneyError),

    #[error(transparent)]
    Favourites(#[from] FavouritesError),
}

/// Result of a station change that did not fail.
#[derive(Debug, Clone, PartialEq)]
pub enum StationChange {
    /// The station's trains are now the schedule.
    Applied { station: Station, trains: usize },
    /// A later station change started before this one finished.
    Superseded,
}

/// Selected station and its schedule.
#[derive(Debug)]
struct ViewState {
    station: Option<Station>,
    schedule: ScheduleView,
    lookahead: u16,
    faded_out: bool,
}

/// One user's viewer session over a schedule source `P`, persisting
/// favourites through `S`.
pub struct ScheduleSession<P, S> {
    provider: Arc<P>,
    store: S,
    config: SessionConfig,
    journeys: JourneyCache,
    status: RwLock<SessionStatus>,
    search: RwLock<SearchSession>,
    view: RwLock<ViewState>,
    favourites: RwLock<Vec<String>>,
    /// Serializes favourite updates so saves land in order.
    favourites_save: Mutex<()>,
    latest_token: AtomicU64,
}

impl<P: ScheduleProvider, S: FavouritesStore> ScheduleSession<P, S> {
    /// Create a session. Stations are not loaded until [`load_stations`].
    ///
    /// A favourites list that cannot be read starts out empty.
    ///
    /// [`load_stations`]: ScheduleSession::load_stations
    pub fn new(provider: Arc<P>, store: S, config: SessionConfig) -> Self {
        let favourites = store.load().unwrap_or_else(|e| {
            warn!(error = %e, "could not load favourites, starting empty");
            Vec::new()
        });

        Self {
            provider,
            store,
            journeys: JourneyCache::new(&config.journey_cache),
            status: RwLock::new(SessionStatus::Loading),
            search: RwLock::new(SearchSession::new(config.max_matches)),
            view: RwLock::new(ViewState {
                station: None,
                schedule: ScheduleView::default(),
                lookahead: config.default_lookahead,
                faded_out: false,
            }),
            favourites: RwLock::new(favourites),
            favourites_save: Mutex::new(()),
            latest_token: AtomicU64::new(0),
            config,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub async fn status(&self) -> SessionStatus {
        self.status.read().await.clone()
    }

    async fn ensure_usable(&self) -> Result<(), SessionError> {
        match &*self.status.read().await {
            SessionStatus::Failed(reason) => Err(SessionError::Failed(reason.clone())),
            _ => Ok(()),
        }
    }

    async fn fail(&self, reason: String) {
        *self.status.write().await = SessionStatus::Failed(reason);
    }

    /// Fetch the station list and build the search index from it.
    ///
    /// Fails the session if the source errors or does not answer within
    /// the configured timeout. Returns the number of stations.
    pub async fn load_stations(&self) -> Result<usize, SessionError> {
        self.ensure_usable().await?;

        let limit = self.config.station_load_timeout;
        let stations = match tokio::time::timeout(limit, self.provider.fetch_stations()).await {
            Ok(Ok(stations)) => stations,
            Ok(Err(e)) => {
                warn!(error = %e, "station list failed to load");
                self.fail(e.to_string()).await;
                return Err(SessionError::StationLoad(e));
            }
            Err(_) => {
                warn!(?limit, "station list timed out");
                self.fail(format!("station list did not arrive within {:?}", limit))
                    .await;
                return Err(SessionError::StationLoadTimeout(limit));
            }
        };

        let count = stations.len();
        self.search.write().await.set_stations(stations);
        *self.status.write().await = SessionStatus::Ready;
        info!(count, "stations loaded");
        Ok(count)
    }

    /// Read the search box state.
    pub async fn with_search<R>(&self, f: impl FnOnce(&SearchSession) -> R) -> R {
        f(&*self.search.read().await)
    }

    /// Feed an input event to the search box. A committed selection
    /// switches the schedule to that station.
    pub async fn handle_search(
        &self,
        event: SearchEvent,
    ) -> Result<Option<StationChange>, SessionError> {
        let committed = self.search.write().await.handle(event);
        match committed {
            Some(station) => self.change_station(station).await.map(Some),
            None => Ok(None),
        }
    }

    /// Switch the schedule to `station`.
    ///
    /// On failure the previous station and schedule stay in place.
    pub async fn change_station(&self, station: Station) -> Result<StationChange, SessionError> {
        self.ensure_usable().await?;

        let token = self.latest_token.fetch_add(1, Ordering::SeqCst) + 1;
        let lookahead = {
            let mut view = self.view.write().await;
            view.faded_out = true;
            view.lookahead
        };
        debug!(token, station = %station.code, lookahead, "changing station");

        let (_, fetched) = tokio::join!(
            tokio::time::sleep(self.config.fade_out),
            self.provider.fetch_trains(&station, lookahead),
        );

        if !self.is_latest(token) {
            debug!(token, station = %station.code, "discarding superseded train list");
            return Ok(StationChange::Superseded);
        }

        let result = match fetched {
            Ok(trains) => {
                let count = trains.len();
                let mut view = self.view.write().await;
                if !self.is_latest(token) {
                    return Ok(StationChange::Superseded);
                }
                view.station = Some(station.clone());
                view.schedule.replace_rows(trains);
                Ok(StationChange::Applied {
                    station,
                    trains: count,
                })
            }
            Err(source) => {
                warn!(station = %station.code, error = %source, "train list failed");
                Err(SessionError::Trains {
                    station: station.code,
                    source,
                })
            }
        };

        self.fade_in(token).await;
        result
    }

    fn is_latest(&self, token: u64) -> bool {
        self.latest_token.load(Ordering::SeqCst) == token
    }

    async fn fade_in(&self, token: u64) {
        tokio::time::sleep(self.config.fade_in_delay).await;
        if self.is_latest(token) {
            self.view.write().await.faded_out = false;
        }
    }

    /// Fetch the current station's trains again.
    pub async fn refresh(&self) -> Result<StationChange, SessionError> {
        let station = self
            .current_station()
            .await
            .ok_or(SessionError::NoStation)?;
        self.change_station(station).await
    }

    /// Change the lookahead window, refetching the schedule if a station
    /// is shown. Picking the current window does nothing.
    pub async fn set_lookahead(&self, mins: u16) -> Result<Option<StationChange>, SessionError> {
        if !self.config.lookahead_options.contains(&mins) {
            return Err(SessionError::InvalidLookahead(mins));
        }

        let station = {
            let mut view = self.view.write().await;
            if view.lookahead == mins {
                return Ok(None);
            }
            view.lookahead = mins;
            view.station.clone()
        };
        match station {
            Some(station) => self.change_station(station).await.map(Some),
            None => Ok(None),
        }
    }

    pub async fn lookahead(&self) -> u16 {
        self.view.read().await.lookahead
    }

    /// Close the schedule. Any pending station change is discarded.
    pub async fn close_station(&self) {
        self.latest_token.fetch_add(1, Ordering::SeqCst);
        let mut view = self.view.write().await;
        view.station = None;
        view.schedule.replace_rows(Vec::new());
        view.faded_out = false;
    }

    pub async fn current_station(&self) -> Option<Station> {
        self.view.read().await.station.clone()
    }

    /// Whether the schedule is currently faded out for a station change.
    pub async fn is_faded_out(&self) -> bool {
        self.view.read().await.faded_out
    }

    /// Read the schedule table.
    pub async fn with_schedule<R>(&self, f: impl FnOnce(&ScheduleView) -> R) -> R {
        f(&self.view.read().await.schedule)
    }

    /// Header click: sort by `column`, or cycle its direction.
    pub async fn sort_by(&self, column: ScheduleColumn) {
        self.view.write().await.schedule.select_column(column);
    }

    /// Journey of train `code` today, served from the journey cache when
    /// fresh.
    pub async fn journey(&self, code: &TrainCode) -> Result<Arc<Journey>, SessionError> {
        self.journey_at(code, Local::now()).await
    }

    /// Journey of train `code` as of `now`.
    pub async fn journey_at<Tz: TimeZone>(
        &self,
        code: &TrainCode,
        now: DateTime<Tz>,
    ) -> Result<Arc<Journey>, SessionError> {
        Ok(self
            .journeys
            .get_journey_for(&self.provider, code, now)
            .await?)
    }

    pub fn journey_cache(&self) -> &JourneyCache {
        &self.journeys
    }

    /// Favourite station names, in the order they were added.
    pub async fn favourites(&self) -> Vec<String> {
        self.favourites.read().await.clone()
    }

    pub async fn is_favourite(&self, name: &str) -> bool {
        self.favourites.read().await.iter().any(|n| n == name)
    }

    /// Add or remove `name` from the favourites and save the list.
    ///
    /// Returns whether `name` is a favourite afterwards. If saving fails
    /// the list is left as it was. Readers are not blocked while the store
    /// saves.
    pub async fn toggle_favourite(&self, name: &str) -> Result<bool, SessionError> {
        let _saving = self.favourites_save.lock().await;
        let mut updated = self.favourites.read().await.clone();
        let now_favourite = favourites::toggle(&mut updated, name);
        self.store.save(&updated)?;
        *self.favourites.write().await = updated;
        debug!(name, now_favourite, "toggled favourite");
        Ok(now_favourite)
    }

    /// Show the favourite station called `name`.
    pub async fn select_favourite(&self, name: &str) -> Result<StationChange, SessionError> {
        let station = self
            .search
            .read()
            .await
            .stations()
            .iter()
            .find(|s| s.name == name)
            .cloned()
            .ok_or_else(|| SessionError::UnknownStation(name.to_string()))?;

        self.handle_search(SearchEvent::ExternalSelect(station))
            .await?
            .ok_or(SessionError::NoStation)
    }
}
