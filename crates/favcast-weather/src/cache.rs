//! Fetch-through weather cache.
//!
//! `WeatherCache::get` serves fresh entries from the TTL store and otherwise
//! fetches from the provider, storing the result for the kind's TTL.
//! Concurrent misses for one key share a single upstream call: the first miss
//! claims the key and spawns the fetch, later misses subscribe to the claim,
//! and everyone receives the same outcome. Failures are never stored, so the
//! next call after a failure fetches again.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use favcast_core::{CacheConfig, UpstreamError};
use parking_lot::Mutex;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::key::{CacheKey, KeyNormalizer};
use crate::provider::WeatherUpstream;
use crate::retry::{retry_upstream, RetryConfig};
use crate::store::TtlStore;
use crate::types::{Coordinates, ForecastSeries, WeatherKind, WeatherPayload, WeatherSnapshot};

pub type FetchOutcome = Result<WeatherPayload, UpstreamError>;

/// Freshness, keying and retry settings for the cache
#[derive(Debug, Clone)]
pub struct CachePolicy {
    pub current_ttl: Duration,
    pub forecast_ttl: Duration,
    pub normalizer: KeyNormalizer,
    pub retry: RetryConfig,
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self {
            current_ttl: Duration::from_secs(300),
            forecast_ttl: Duration::from_secs(300),
            normalizer: KeyNormalizer::default(),
            retry: RetryConfig::none(),
        }
    }
}

impl CachePolicy {
    pub fn from_config(config: &CacheConfig) -> Self {
        Self {
            current_ttl: Duration::from_secs(config.current_ttl_secs),
            forecast_ttl: Duration::from_secs(config.forecast_ttl_secs),
            normalizer: KeyNormalizer::new(config.key_precision),
            retry: RetryConfig::from_config(config),
        }
    }

    pub fn ttl_for(&self, kind: WeatherKind) -> Duration {
        match kind {
            WeatherKind::Current => self.current_ttl,
            WeatherKind::Forecast => self.forecast_ttl,
        }
    }
}

/// Point-in-time counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Served from the store without touching the provider
    pub hits: u64,
    /// Misses that claimed the key and started an upstream fetch
    pub misses: u64,
    /// Misses that joined a fetch already in flight
    pub coalesced: u64,
    /// Completed upstream fetches that failed
    pub failures: u64,
}

#[derive(Debug, Default)]
struct Counters {
    hits: AtomicU64,
    misses: AtomicU64,
    coalesced: AtomicU64,
    failures: AtomicU64,
}

/// Store and in-flight claims share one lock so a lookup, a claim and a
/// completion can never interleave.
struct CacheState {
    store: TtlStore<WeatherPayload>,
    in_flight: HashMap<CacheKey, broadcast::Sender<FetchOutcome>>,
}

struct Inner {
    state: Mutex<CacheState>,
    upstream: Arc<dyn WeatherUpstream>,
    policy: CachePolicy,
    counters: Counters,
}

/// Cheaply cloneable handle to one process-wide cache.
#[derive(Clone)]
pub struct WeatherCache {
    inner: Arc<Inner>,
}

enum Lookup {
    Hit(WeatherPayload),
    Join(broadcast::Receiver<FetchOutcome>),
    Claimed(broadcast::Sender<FetchOutcome>, broadcast::Receiver<FetchOutcome>),
}

impl WeatherCache {
    pub fn new(
        store: TtlStore<WeatherPayload>,
        upstream: Arc<dyn WeatherUpstream>,
        policy: CachePolicy,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(CacheState {
                    store,
                    in_flight: HashMap::new(),
                }),
                upstream,
                policy,
                counters: Counters::default(),
            }),
        }
    }

    pub fn policy(&self) -> &CachePolicy {
        &self.inner.policy
    }

    /// Fresh data for `kind` at `coords`, from the store or the provider.
    pub async fn get(&self, kind: WeatherKind, coords: Coordinates) -> FetchOutcome {
        let key = self.inner.policy.normalizer.key(kind, coords);

        let lookup = {
            let mut state = self.inner.state.lock();
            if let Some(value) = state.store.get(&key) {
                Lookup::Hit(value)
            } else if let Some(sender) = state.in_flight.get(&key) {
                Lookup::Join(sender.subscribe())
            } else {
                let (sender, receiver) = broadcast::channel(1);
                state.in_flight.insert(key.clone(), sender.clone());
                Lookup::Claimed(sender, receiver)
            }
        };

        let mut receiver = match lookup {
            Lookup::Hit(value) => {
                self.inner.counters.hits.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(key = %key, "Cache hit");
                return Ok(value);
            }
            Lookup::Join(receiver) => {
                self.inner.counters.coalesced.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(key = %key, "Joining in-flight fetch");
                receiver
            }
            Lookup::Claimed(sender, receiver) => {
                self.inner.counters.misses.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(key = %key, "Cache miss, fetching upstream");
                self.spawn_fetch(key.clone(), kind, coords, sender);
                receiver
            }
        };

        match receiver.recv().await {
            Ok(outcome) => outcome,
            Err(_) => Err(UpstreamError::Transport(format!(
                "fetch for {} ended without a result",
                key
            ))),
        }
    }

    /// Current conditions at `coords`
    pub async fn current(&self, coords: Coordinates) -> Result<Arc<WeatherSnapshot>, UpstreamError> {
        match self.get(WeatherKind::Current, coords).await? {
            WeatherPayload::Current(snapshot) => Ok(snapshot),
            WeatherPayload::Forecast(_) => Err(kind_mismatch(WeatherKind::Current)),
        }
    }

    /// Forecast series at `coords`
    pub async fn forecast(&self, coords: Coordinates) -> Result<Arc<ForecastSeries>, UpstreamError> {
        match self.get(WeatherKind::Forecast, coords).await? {
            WeatherPayload::Forecast(series) => Ok(series),
            WeatherPayload::Current(_) => Err(kind_mismatch(WeatherKind::Forecast)),
        }
    }

    /// Drop the stored entry so the next `get` refetches. Returns whether one existed.
    pub fn invalidate(&self, kind: WeatherKind, coords: Coordinates) -> bool {
        let key = self.inner.policy.normalizer.key(kind, coords);
        self.inner.state.lock().store.invalidate(&key)
    }

    /// Remove every stale entry. Returns the number removed.
    pub fn purge_expired(&self) -> usize {
        self.inner.state.lock().store.purge_expired()
    }

    /// Entries physically held, including stale ones not yet purged
    pub fn len(&self) -> usize {
        self.inner.state.lock().store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of keys with an upstream fetch outstanding
    pub fn in_flight(&self) -> usize {
        self.inner.state.lock().in_flight.len()
    }

    pub fn stats(&self) -> CacheStats {
        let counters = &self.inner.counters;
        CacheStats {
            hits: counters.hits.load(Ordering::Relaxed),
            misses: counters.misses.load(Ordering::Relaxed),
            coalesced: counters.coalesced.load(Ordering::Relaxed),
            failures: counters.failures.load(Ordering::Relaxed),
        }
    }

    /// Periodically purge stale entries until `shutdown` is cancelled.
    ///
    /// A zero `interval` disables sweeping and the task ends immediately.
    pub fn spawn_sweeper(&self, interval: Duration, shutdown: CancellationToken) -> JoinHandle<()> {
        let cache = self.clone();
        tokio::spawn(async move {
            if interval.is_zero() {
                tracing::debug!("Cache sweeper disabled");
                return;
            }
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            // first tick completes immediately
            ticker.tick().await;
            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => {
                        tracing::debug!("Cache sweeper stopped");
                        break;
                    }
                    _ = ticker.tick() => {
                        let purged = cache.purge_expired();
                        if purged > 0 {
                            tracing::info!("Swept {} expired cache entries", purged);
                        }
                    }
                }
            }
        })
    }

    /// Run the upstream fetch in its own task so that callers dropping their
    /// futures cannot strand the others waiting on the same claim.
    fn spawn_fetch(
        &self,
        key: CacheKey,
        kind: WeatherKind,
        coords: Coordinates,
        sender: broadcast::Sender<FetchOutcome>,
    ) {
        let inner = Arc::clone(&self.inner);
        let coords = inner.policy.normalizer.round(coords);
        tokio::spawn(async move {
            let claim = Claim {
                inner: Arc::clone(&inner),
                key: Some(key),
            };

            let fetcher: &Inner = &inner;
            let outcome =
                retry_upstream(&inner.policy.retry, move || fetcher.fetch_once(kind, coords)).await;
            claim.complete(&outcome);

            // No receivers left is fine: every caller went away.
            let _ = sender.send(outcome);
        });
    }
}

impl Inner {
    async fn fetch_once(&self, kind: WeatherKind, coords: Coordinates) -> FetchOutcome {
        match kind {
            WeatherKind::Current => self
                .upstream
                .fetch_current(coords)
                .await
                .map(|snapshot| WeatherPayload::Current(Arc::new(snapshot))),
            WeatherKind::Forecast => self
                .upstream
                .fetch_forecast(coords)
                .await
                .map(|series| WeatherPayload::Forecast(Arc::new(series))),
        }
    }
}

/// An in-flight claim on one key.
///
/// Released by `complete`, or on drop if the fetch task dies first, so a key
/// can never stay claimed forever.
struct Claim {
    inner: Arc<Inner>,
    key: Option<CacheKey>,
}

impl Claim {
    /// Release the claim and store a successful result in one critical section.
    ///
    /// The key is only forgotten once everything here has run; if anything
    /// panics on the way, `Drop` still releases the claim.
    fn complete(mut self, outcome: &FetchOutcome) {
        let Some(key) = self.key.as_ref() else {
            return;
        };
        {
            let mut state = self.inner.state.lock();
            state.in_flight.remove(key);
            match outcome {
                Ok(value) => {
                    let ttl = self.inner.policy.ttl_for(value.kind());
                    state.store.set(key.clone(), value.clone(), ttl);
                    tracing::info!(key = %key, ttl_secs = ttl.as_secs(), "Cached upstream response");
                }
                Err(e) => {
                    self.inner.counters.failures.fetch_add(1, Ordering::Relaxed);
                    tracing::warn!(key = %key, "Upstream fetch failed: {}", e);
                }
            }
        }
        self.key = None;
    }
}

impl Drop for Claim {
    fn drop(&mut self) {
        if let Some(key) = self.key.take() {
            tracing::warn!(key = %key, "Fetch task ended without completing its claim");
            self.inner.state.lock().in_flight.remove(&key);
        }
    }
}

fn kind_mismatch(expected: WeatherKind) -> UpstreamError {
    UpstreamError::Decode(format!("cached payload is not {} weather", expected))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::fixtures;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, AtomicUsize};
    use tokio::sync::Semaphore;

    /// Upstream double that counts calls, can be gated, and can be told to fail.
    #[derive(Default)]
    struct FakeUpstream {
        current_calls: AtomicUsize,
        forecast_calls: AtomicUsize,
        gate: Option<Semaphore>,
        failure: Mutex<Option<UpstreamError>>,
        fail_latitude: Option<f64>,
        crash: AtomicBool,
    }

    impl FakeUpstream {
        fn gated() -> Self {
            Self {
                gate: Some(Semaphore::new(0)),
                ..Self::default()
            }
        }

        fn failing(error: UpstreamError) -> Self {
            Self {
                failure: Mutex::new(Some(error)),
                ..Self::default()
            }
        }

        fn open_gate(&self) {
            if let Some(gate) = &self.gate {
                gate.add_permits(1_000);
            }
        }

        fn heal(&self) {
            *self.failure.lock() = None;
            self.crash.store(false, Ordering::SeqCst);
        }

        fn calls(&self) -> usize {
            self.current_calls.load(Ordering::SeqCst) + self.forecast_calls.load(Ordering::SeqCst)
        }

        #[allow(clippy::panic)]
        async fn wait(&self, coords: Coordinates) -> Result<(), UpstreamError> {
            if let Some(gate) = &self.gate {
                let _permit = gate
                    .acquire()
                    .await
                    .map_err(|e| UpstreamError::Transport(e.to_string()))?;
            }
            if self.crash.load(Ordering::SeqCst) {
                panic!("upstream client crashed");
            }
            if self.fail_latitude == Some(coords.latitude) {
                return Err(UpstreamError::Status {
                    status: 500,
                    message: "boom".into(),
                });
            }
            let failure = self.failure.lock().clone();
            match failure {
                Some(e) => Err(e),
                None => Ok(()),
            }
        }
    }

    #[async_trait]
    impl WeatherUpstream for FakeUpstream {
        async fn fetch_current(&self, coords: Coordinates) -> Result<WeatherSnapshot, UpstreamError> {
            self.current_calls.fetch_add(1, Ordering::SeqCst);
            self.wait(coords).await?;
            Ok(fixtures::snapshot(coords.latitude, coords.longitude))
        }

        async fn fetch_forecast(&self, coords: Coordinates) -> Result<ForecastSeries, UpstreamError> {
            self.forecast_calls.fetch_add(1, Ordering::SeqCst);
            self.wait(coords).await?;
            Ok(fixtures::series(coords.latitude, coords.longitude))
        }
    }

    fn cache_with(upstream: Arc<FakeUpstream>) -> WeatherCache {
        WeatherCache::new(TtlStore::new(), upstream, CachePolicy::default())
    }

    fn london() -> Coordinates {
        Coordinates::new(51.5074, -0.1278).unwrap()
    }

    async fn wait_for_coalesced(cache: &WeatherCache, expected: u64) {
        while cache.stats().coalesced < expected {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_hit_miss_and_expiry_scenario() {
        let upstream = Arc::new(FakeUpstream::default());
        let cache = cache_with(upstream.clone());

        let first = cache.current(london()).await.unwrap();
        assert_eq!(upstream.calls(), 1);
        assert_eq!(cache.len(), 1);

        tokio::time::advance(Duration::from_secs(299)).await;
        let second = cache.current(london()).await.unwrap();
        assert_eq!(upstream.calls(), 1);
        assert!(Arc::ptr_eq(&first, &second));

        tokio::time::advance(Duration::from_secs(1)).await;
        let third = cache.current(london()).await.unwrap();
        assert_eq!(upstream.calls(), 2);
        assert!(!Arc::ptr_eq(&first, &third));

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 2);
    }

    #[tokio::test]
    async fn test_floating_point_noise_hits_the_same_entry() {
        let upstream = Arc::new(FakeUpstream::default());
        let cache = cache_with(upstream.clone());

        cache.current(london()).await.unwrap();
        let noisy = Coordinates::new(51.50740000001, -0.12779999999).unwrap();
        cache.current(noisy).await.unwrap();

        assert_eq!(upstream.calls(), 1);
    }

    #[tokio::test]
    async fn test_upstream_receives_rounded_coordinates() {
        let upstream = Arc::new(FakeUpstream::default());
        let cache = cache_with(upstream.clone());

        let noisy = Coordinates::new(51.50740000001, -0.12779999999).unwrap();
        let snapshot = cache.current(noisy).await.unwrap();

        assert_eq!(snapshot.coord.lat, 51.5074);
        assert_eq!(snapshot.coord.lon, -0.1278);
    }

    #[tokio::test]
    async fn test_kinds_are_cached_separately() {
        let upstream = Arc::new(FakeUpstream::default());
        let cache = cache_with(upstream.clone());

        cache.current(london()).await.unwrap();
        cache.forecast(london()).await.unwrap();
        cache.forecast(london()).await.unwrap();

        assert_eq!(upstream.current_calls.load(Ordering::SeqCst), 1);
        assert_eq!(upstream.forecast_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_concurrent_misses_share_one_upstream_call() {
        const CALLERS: usize = 16;
        let upstream = Arc::new(FakeUpstream::gated());
        let cache = cache_with(upstream.clone());

        let mut tasks = tokio::task::JoinSet::new();
        for _ in 0..CALLERS {
            let cache = cache.clone();
            tasks.spawn(async move { cache.current(london()).await });
        }

        wait_for_coalesced(&cache, (CALLERS - 1) as u64).await;
        assert_eq!(cache.in_flight(), 1);
        upstream.open_gate();

        let mut results = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            results.push(joined.unwrap().unwrap());
        }

        assert_eq!(upstream.calls(), 1);
        assert_eq!(results.len(), CALLERS);
        assert!(results.iter().all(|r| Arc::ptr_eq(r, &results[0])));
        assert_eq!(cache.in_flight(), 0);
        assert_eq!(cache.stats().misses, 1);
    }

    #[tokio::test]
    async fn test_coalesced_callers_share_failure_and_next_call_retries() {
        const CALLERS: usize = 8;
        let upstream = Arc::new(FakeUpstream {
            gate: Some(Semaphore::new(0)),
            failure: Mutex::new(Some(UpstreamError::Timeout)),
            ..FakeUpstream::default()
        });
        let cache = cache_with(upstream.clone());

        let mut tasks = tokio::task::JoinSet::new();
        for _ in 0..CALLERS {
            let cache = cache.clone();
            tasks.spawn(async move { cache.forecast(london()).await });
        }

        wait_for_coalesced(&cache, (CALLERS - 1) as u64).await;
        upstream.open_gate();

        while let Some(joined) = tasks.join_next().await {
            assert_eq!(joined.unwrap().unwrap_err(), UpstreamError::Timeout);
        }
        assert_eq!(upstream.calls(), 1);
        assert!(cache.is_empty());
        assert_eq!(cache.in_flight(), 0);
        assert_eq!(cache.stats().failures, 1);

        upstream.heal();
        cache.forecast(london()).await.unwrap();
        assert_eq!(upstream.calls(), 2);
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn test_timeout_is_not_cached() {
        let upstream = Arc::new(FakeUpstream::failing(UpstreamError::Timeout));
        let cache = cache_with(upstream.clone());

        let err = cache.current(london()).await.unwrap_err();
        assert_eq!(err, UpstreamError::Timeout);
        assert!(cache.is_empty());

        let err = cache.current(london()).await.unwrap_err();
        assert_eq!(err, UpstreamError::Timeout);
        assert_eq!(upstream.calls(), 2);
    }

    #[tokio::test]
    async fn test_failure_for_one_key_does_not_affect_another() {
        let upstream = Arc::new(FakeUpstream {
            fail_latitude: Some(10.0),
            ..FakeUpstream::default()
        });
        let cache = cache_with(upstream.clone());

        let bad = Coordinates::new(10.0, 10.0).unwrap();
        let (failed, succeeded) = tokio::join!(cache.current(bad), cache.current(london()));

        assert_eq!(failed.unwrap_err().status_code(), Some(500));
        assert_eq!(succeeded.unwrap().name, "London");
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn test_invalidate_forces_refetch() {
        let upstream = Arc::new(FakeUpstream::default());
        let cache = cache_with(upstream.clone());

        cache.current(london()).await.unwrap();
        assert!(cache.invalidate(WeatherKind::Current, london()));
        assert!(!cache.invalidate(WeatherKind::Current, london()));
        cache.current(london()).await.unwrap();

        assert_eq!(upstream.calls(), 2);
    }

    #[tokio::test]
    async fn test_dropped_caller_does_not_strand_waiters() {
        let upstream = Arc::new(FakeUpstream::gated());
        let cache = cache_with(upstream.clone());

        let leader = {
            let cache = cache.clone();
            tokio::spawn(async move { cache.current(london()).await })
        };
        let follower = {
            let cache = cache.clone();
            tokio::spawn(async move { cache.current(london()).await })
        };
        wait_for_coalesced(&cache, 1).await;

        leader.abort();
        upstream.open_gate();

        assert!(follower.await.unwrap().is_ok());
        assert_eq!(upstream.calls(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_policy_runs_inside_the_claim() {
        let upstream = Arc::new(FakeUpstream::failing(UpstreamError::Status {
            status: 503,
            message: "busy".into(),
        }));
        let policy = CachePolicy {
            retry: RetryConfig::new(2, 100, 1000),
            ..CachePolicy::default()
        };
        let cache = WeatherCache::new(TtlStore::new(), upstream.clone(), policy);

        let err = cache.current(london()).await.unwrap_err();
        assert_eq!(err.status_code(), Some(503));
        assert_eq!(upstream.calls(), 3);
        assert_eq!(cache.stats().misses, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweeper_purges_stale_entries() {
        let upstream = Arc::new(FakeUpstream::default());
        let policy = CachePolicy {
            current_ttl: Duration::from_secs(30),
            ..CachePolicy::default()
        };
        let cache = WeatherCache::new(TtlStore::new(), upstream, policy);
        cache.current(london()).await.unwrap();
        cache.forecast(london()).await.unwrap();

        let shutdown = CancellationToken::new();
        let sweeper = cache.spawn_sweeper(Duration::from_secs(60), shutdown.clone());

        tokio::time::sleep(Duration::from_secs(61)).await;
        assert_eq!(cache.len(), 1);

        shutdown.cancel();
        sweeper.await.unwrap();
    }

    #[tokio::test]
    async fn test_crashed_fetch_releases_claim_and_fails_waiters() {
        const CALLERS: usize = 4;
        let upstream = Arc::new(FakeUpstream {
            gate: Some(Semaphore::new(0)),
            crash: AtomicBool::new(true),
            ..FakeUpstream::default()
        });
        let cache = cache_with(upstream.clone());

        let mut tasks = tokio::task::JoinSet::new();
        for _ in 0..CALLERS {
            let cache = cache.clone();
            tasks.spawn(async move { cache.current(london()).await });
        }
        wait_for_coalesced(&cache, (CALLERS - 1) as u64).await;
        upstream.open_gate();

        while let Some(joined) = tasks.join_next().await {
            let err = joined.unwrap().unwrap_err();
            assert!(matches!(err, UpstreamError::Transport(_)), "unexpected {:?}", err);
        }
        assert_eq!(cache.in_flight(), 0);
        assert!(cache.is_empty());

        upstream.heal();
        cache.current(london()).await.unwrap();
        assert_eq!(upstream.calls(), 2);
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_huge_ttl_from_config_is_cached_and_released() {
        let upstream = Arc::new(FakeUpstream::default());
        let policy = CachePolicy::from_config(&CacheConfig {
            current_ttl_secs: u64::MAX,
            ..CacheConfig::default()
        });
        let cache = WeatherCache::new(TtlStore::new(), upstream.clone(), policy);

        let first = tokio::time::timeout(Duration::from_secs(2), cache.current(london()))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(cache.in_flight(), 0);

        let second = tokio::time::timeout(Duration::from_secs(2), cache.current(london()))
            .await
            .unwrap()
            .unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(upstream.calls(), 1);
    }

    #[tokio::test]
    async fn test_zero_interval_sweeper_exits_immediately() {
        let cache = cache_with(Arc::new(FakeUpstream::default()));
        let sweeper = cache.spawn_sweeper(Duration::ZERO, CancellationToken::new());
        tokio::time::timeout(Duration::from_secs(1), sweeper)
            .await
            .unwrap()
            .unwrap();
    }

    #[test]
    fn test_policy_from_config() {
        let policy = CachePolicy::from_config(&CacheConfig {
            current_ttl_secs: 60,
            forecast_ttl_secs: 900,
            key_precision: 3,
            ..CacheConfig::default()
        });
        assert_eq!(policy.ttl_for(WeatherKind::Current), Duration::from_secs(60));
        assert_eq!(policy.ttl_for(WeatherKind::Forecast), Duration::from_secs(900));
        assert_eq!(policy.normalizer.precision(), 3);
        assert_eq!(policy.retry.max_retries, 0);
    }
}
