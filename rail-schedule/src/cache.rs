//! Caching layer for per-train journey lookups.
//!
//! Journeys change as a train moves, so entries are only trusted for a short
//! freshness window (3 seconds by default) measured from when the fetch that
//! produced them was requested. Older entries are refetched and overwritten.
//!
//! Concurrent lookups for the same train share one pending fetch. Failed
//! fetches are reported to every waiter and never stored, so any earlier
//! entry survives them.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chrono::{DateTime, TimeZone};
use futures::future::{BoxFuture, FutureExt, Shared};
use moka::future::Cache as MokaCache;
use tokio::sync::Mutex;
use tracing::{debug, trace};

use crate::domain::{Journey, TrainCode};
use crate::irishrail::ApiError;
use crate::provider::{ScheduleProvider, journey_date};

/// A journey lookup failed.
///
/// Cloneable so that every caller sharing a fetch receives the same error.
#[derive(Debug, Clone, thiserror::Error)]
pub enum JourneyError {
    #[error("journey fetch failed: {0}")]
    Fetch(Arc<ApiError>),
}

/// Configuration for the journey cache.
#[derive(Debug, Clone)]
pub struct JourneyCacheConfig {
    /// How long an entry is served without refetching.
    pub freshness: Duration,

    /// Maximum number of cached journeys. `None` keeps every journey for
    /// the life of the cache.
    pub max_capacity: Option<u64>,
}

impl JourneyCacheConfig {
    pub fn with_freshness(mut self, freshness: Duration) -> Self {
        self.freshness = freshness;
        self
    }

    pub fn with_max_capacity(mut self, max_capacity: u64) -> Self {
        self.max_capacity = Some(max_capacity);
        self
    }
}

impl Default for JourneyCacheConfig {
    fn default() -> Self {
        Self {
            freshness: Duration::from_millis(3000),
            max_capacity: None,
        }
    }
}

/// A stored journey and the request time of the fetch that produced it.
#[derive(Debug, Clone)]
struct JourneyEntry {
    journey: Arc<Journey>,
    fetched_at_millis: i64,
}

type SharedFetch = Shared<BoxFuture<'static, Result<Arc<Journey>, JourneyError>>>;

/// A fetch that callers can join.
struct InFlight {
    /// Distinguishes this fetch from a later one for the same train.
    id: u64,
    started_at_millis: i64,
    fut: SharedFetch,
}

/// Time-bounded journey memoization keyed by train code.
pub struct JourneyCache {
    entries: MokaCache<TrainCode, JourneyEntry>,
    in_flight: Mutex<HashMap<TrainCode, InFlight>>,
    next_id: AtomicU64,
    freshness_millis: i64,
}

impl JourneyCache {
    /// Create a new cache with the given configuration.
    pub fn new(config: &JourneyCacheConfig) -> Self {
        let mut builder = MokaCache::builder();
        if let Some(max_capacity) = config.max_capacity {
            builder = builder.max_capacity(max_capacity);
        }
        let entries: MokaCache<TrainCode, JourneyEntry> = builder.build();

        Self {
            entries,
            in_flight: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(0),
            freshness_millis: i64::try_from(config.freshness.as_millis()).unwrap_or(i64::MAX),
        }
    }

    fn is_fresh(&self, entry: &JourneyEntry, now_millis: i64) -> bool {
        now_millis.saturating_sub(entry.fetched_at_millis) <= self.freshness_millis
    }

    /// The cached journey for `code`, if it is still fresh at `now_millis`.
    pub async fn peek(&self, code: &TrainCode, now_millis: i64) -> Option<Arc<Journey>> {
        self.entries
            .get(code)
            .await
            .filter(|entry| self.is_fresh(entry, now_millis))
            .map(|entry| entry.journey)
    }

    /// Get the journey for `code`, calling `fetch` only when no fresh entry
    /// exists and no fetch for the same train is already pending.
    ///
    /// A successful result is stored as fetched at the `now_millis` of the
    /// call that started the fetch.
    pub async fn get_journey<F, Fut>(
        &self,
        code: &TrainCode,
        now_millis: i64,
        fetch: F,
    ) -> Result<Arc<Journey>, JourneyError>
    where
        F: FnOnce(TrainCode) -> Fut + Send,
        Fut: Future<Output = Result<Journey, ApiError>> + Send + 'static,
    {
        if let Some(journey) = self.peek(code, now_millis).await {
            trace!(%code, "journey cache hit");
            return Ok(journey);
        }

        let (id, fut) = {
            let mut in_flight = self.in_flight.lock().await;

            // A fetch may have landed while we waited for the lock.
            if let Some(journey) = self.peek(code, now_millis).await {
                trace!(%code, "journey cache hit after wait");
                return Ok(journey);
            }

            match in_flight.get(code) {
                Some(pending) => {
                    debug!(%code, "joining pending journey fetch");
                    (pending.id, pending.fut.clone())
                }
                None => {
                    debug!(%code, now_millis, "journey cache miss, fetching");
                    let id = self.next_id.fetch_add(1, Ordering::Relaxed);
                    let fut = fetch(code.clone())
                        .map(|result| {
                            result
                                .map(Arc::new)
                                .map_err(|e| JourneyError::Fetch(Arc::new(e)))
                        })
                        .boxed()
                        .shared();
                    in_flight.insert(
                        code.clone(),
                        InFlight {
                            id,
                            started_at_millis: now_millis,
                            fut: fut.clone(),
                        },
                    );
                    (id, fut)
                }
            }
        };

        let result = fut.await;
        self.finish(code, id, &result).await;
        result
    }

    /// Retire a completed fetch. The first waiter to get here stores the
    /// result; later waiters find the fetch already gone.
    async fn finish(&self, code: &TrainCode, id: u64, result: &Result<Arc<Journey>, JourneyError>) {
        let mut in_flight = self.in_flight.lock().await;
        let Some(pending) = in_flight.get(code).filter(|p| p.id == id) else {
            return;
        };
        let started_at_millis = pending.started_at_millis;
        in_flight.remove(code);

        match result {
            Ok(journey) => {
                trace!(%code, started_at_millis, "storing journey");
                self.entries
                    .insert(
                        code.clone(),
                        JourneyEntry {
                            journey: Arc::clone(journey),
                            fetched_at_millis: started_at_millis,
                        },
                    )
                    .await;
            }
            Err(err) => debug!(%code, error = %err, "journey fetch failed, not cached"),
        }
    }

    /// Get the journey for `code` from `provider`, dated by `now`'s calendar
    /// day in its own time zone.
    pub async fn get_journey_for<P, Tz>(
        &self,
        provider: &Arc<P>,
        code: &TrainCode,
        now: DateTime<Tz>,
    ) -> Result<Arc<Journey>, JourneyError>
    where
        P: ScheduleProvider,
        Tz: TimeZone,
    {
        let date = journey_date(now.date_naive());
        let now_millis = now.timestamp_millis();
        let provider = Arc::clone(provider);
        self.get_journey(code, now_millis, move |code| async move {
            provider.fetch_journey(&code, &date).await
        })
        .await
    }

    /// Number of stored journeys, fresh or stale.
    pub async fn entry_count(&self) -> u64 {
        self.entries.run_pending_tasks().await;
        self.entries.entry_count()
    }

    /// Drop every stored journey. Pending fetches still complete and store
    /// their results.
    pub fn invalidate_all(&self) {
        self.entries.invalidate_all();
    }
}

impl Default for JourneyCache {
    fn default() -> Self {
        Self::new(&JourneyCacheConfig::default())
    }
}
