//! Station directory with atomic snapshot replacement.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use crate::domain::{Coordinate, Station, StationId};

use super::error::StationError;
use super::snapshot::StationSnapshot;

/// Upstream source of truth for the full station list.
pub trait StationSource: Send + Sync {
    /// Fetch every known station.
    fn fetch_all(&self) -> BoxFuture<'_, Result<Vec<Station>, StationError>>;
}

type RefreshResult = Result<Arc<StationSnapshot>, StationError>;
type InFlightRefresh = Shared<BoxFuture<'static, RefreshResult>>;

struct Inner {
    current: RwLock<Arc<StationSnapshot>>,
    in_flight: Mutex<Option<InFlightRefresh>>,
    source: Arc<dyn StationSource>,
    timeout: Duration,
}

/// Thread-safe station lookup backed by an immutable snapshot.
///
/// Readers clone the current `Arc<StationSnapshot>` and never see a
/// partially built list. A refresh builds a whole new snapshot and swaps
/// the pointer. Concurrent refreshes share one upstream fetch.
#[derive(Clone)]
pub struct StationDirectory {
    inner: Arc<Inner>,
}

impl StationDirectory {
    /// Create an empty directory. Nothing is fetched until [`refresh`](Self::refresh).
    ///
    /// `timeout` bounds each upstream fetch.
    pub fn new(source: Arc<dyn StationSource>, timeout: Duration) -> Self {
        Self {
            inner: Arc::new(Inner {
                current: RwLock::new(Arc::new(StationSnapshot::empty())),
                in_flight: Mutex::new(None),
                source,
                timeout,
            }),
        }
    }

    /// The current snapshot.
    pub async fn snapshot(&self) -> Arc<StationSnapshot> {
        self.inner.current.read().await.clone()
    }

    /// Look up a station by its `<org>:<org_id>` id.
    pub async fn get(&self, id: &str) -> Result<Station, StationError> {
        let id = StationId::parse(id)?;
        let snapshot = self.snapshot().await;
        snapshot
            .get(&id)
            .cloned()
            .ok_or_else(|| StationError::NotFound(id.to_string()))
    }

    /// The station closest to `coord`, ties going to the smallest id.
    pub async fn nearest(&self, coord: Coordinate) -> Result<Station, StationError> {
        let snapshot = self.snapshot().await;
        snapshot
            .nearest(coord)
            .cloned()
            .ok_or(StationError::EmptyDirectory)
    }

    /// All stations in upstream order.
    pub async fn list_all(&self) -> Vec<Station> {
        self.snapshot().await.stations().to_vec()
    }

    /// Fetch the station list and install it as a new snapshot.
    ///
    /// If a refresh is already running, waits for it and returns its
    /// outcome instead of starting another fetch. On failure the current
    /// snapshot is kept.
    pub async fn refresh(&self) -> Result<Arc<StationSnapshot>, StationError> {
        let refresh = {
            let mut slot = self.inner.in_flight.lock().await;
            match slot.as_ref() {
                Some(existing) => {
                    debug!("joining in-flight station refresh");
                    existing.clone()
                }
                None => {
                    // The attempt runs on its own task so it completes and
                    // clears the slot even if every waiter is dropped.
                    let task = tokio::spawn(run_refresh(Arc::clone(&self.inner)));
                    let started = async move {
                        task.await.unwrap_or_else(|e| {
                            Err(StationError::Internal(format!("station refresh task: {e}")))
                        })
                    }
                    .boxed()
                    .shared();
                    *slot = Some(started.clone());
                    started
                }
            }
        };

        refresh.await
    }
}

/// One refresh attempt. Clears the in-flight slot before resolving so the
/// next caller starts a fresh fetch.
async fn run_refresh(inner: Arc<Inner>) -> RefreshResult {
    let result = AssertUnwindSafe(fetch_and_install(&inner))
        .catch_unwind()
        .await
        .unwrap_or_else(|_| Err(StationError::Internal("station refresh panicked".to_string())));
    inner.in_flight.lock().await.take();
    result
}

async fn fetch_and_install(inner: &Inner) -> RefreshResult {
    let started = std::time::Instant::now();

    let stations = match tokio::time::timeout(inner.timeout, inner.source.fetch_all()).await {
        Ok(Ok(stations)) => stations,
        Ok(Err(e)) => {
            warn!(error = %e, "station refresh failed");
            return Err(e);
        }
        Err(_) => {
            warn!(timeout = ?inner.timeout, "station refresh timed out");
            return Err(StationError::UpstreamTimeout);
        }
    };

    // Refreshes are single-flight, so nothing else installs a snapshot
    // between reading the version and the swap below.
    let version = inner.current.read().await.version() + 1;
    let snapshot = match StationSnapshot::build(version, Utc::now(), stations) {
        Ok(snapshot) => Arc::new(snapshot),
        Err(e) => {
            warn!(error = %e, "rejected station list");
            return Err(e);
        }
    };
    *inner.current.write().await = Arc::clone(&snapshot);

    info!(
        version = snapshot.version(),
        stations = snapshot.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "installed station snapshot"
    );
    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use futures::future::join_all;

    use crate::stations::snapshot::tests::station;

    /// Serves scripted responses, counting how often it is asked.
    struct ScriptedSource {
        calls: AtomicUsize,
        delay: Duration,
        responses: std::sync::Mutex<Vec<Result<Vec<Station>, StationError>>>,
    }

    impl ScriptedSource {
        fn new(responses: Vec<Result<Vec<Station>, StationError>>) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                delay: Duration::ZERO,
                responses: std::sync::Mutex::new(responses),
            }
        }

        fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = delay;
            self
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl StationSource for ScriptedSource {
        fn fetch_all(&self) -> BoxFuture<'_, Result<Vec<Station>, StationError>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let response = self.responses.lock().unwrap().remove(0);
            let delay = self.delay;
            async move {
                tokio::time::sleep(delay).await;
                response
            }
            .boxed()
        }
    }

    fn new_england() -> Vec<Station> {
        vec![
            station("NOAA:8443970", 42.3548, -71.0534),
            station("NOAA:8441241", 42.7101, -70.7886),
            station("NOAA:8418150", 43.6567, -70.2467),
        ]
    }

    fn directory(source: ScriptedSource) -> (StationDirectory, Arc<ScriptedSource>) {
        let source = Arc::new(source);
        let dir = StationDirectory::new(source.clone(), Duration::from_secs(5));
        (dir, source)
    }

    #[tokio::test]
    async fn empty_before_refresh() {
        let (dir, source) = directory(ScriptedSource::new(vec![]));
        let here = Coordinate::new(42.0, -70.0).unwrap();

        assert_eq!(dir.nearest(here).await, Err(StationError::EmptyDirectory));
        assert!(dir.list_all().await.is_empty());
        assert_eq!(dir.snapshot().await.version(), 0);
        assert_eq!(source.calls(), 0);
    }

    #[tokio::test]
    async fn get_unknown_is_not_found() {
        let (dir, _) = directory(ScriptedSource::new(vec![Ok(new_england())]));
        dir.refresh().await.unwrap();

        assert_eq!(
            dir.get("UNKNOWN:0").await,
            Err(StationError::NotFound("UNKNOWN:0".to_string()))
        );
    }

    #[tokio::test]
    async fn get_malformed_is_invalid_argument() {
        let (dir, _) = directory(ScriptedSource::new(vec![]));
        let err = dir.get("no-separator").await.unwrap_err();
        assert_eq!(err.kind(), "invalid_argument");
    }

    #[tokio::test]
    async fn refresh_installs_snapshot() {
        let (dir, _) = directory(ScriptedSource::new(vec![Ok(new_england())]));

        let snapshot = dir.refresh().await.unwrap();
        assert_eq!(snapshot.version(), 1);
        assert_eq!(snapshot.len(), 3);
        assert!(snapshot.fetched_at().is_some());

        let plum = dir.get("NOAA:8441241").await.unwrap();
        assert_eq!(plum.coordinate.lat(), 42.7101);

        let ids: Vec<_> = dir.list_all().await.into_iter().map(|s| s.id.to_string()).collect();
        assert_eq!(ids, vec!["NOAA:8443970", "NOAA:8441241", "NOAA:8418150"]);
    }

    #[tokio::test]
    async fn versions_increase() {
        let (dir, _) = directory(ScriptedSource::new(vec![
            Ok(new_england()),
            Ok(vec![station("NOAA:1", 0.0, 0.0)]),
        ]));

        assert_eq!(dir.refresh().await.unwrap().version(), 1);
        let second = dir.refresh().await.unwrap();
        assert_eq!(second.version(), 2);
        assert_eq!(dir.list_all().await.len(), 1);
    }

    #[tokio::test]
    async fn failed_refresh_keeps_current_snapshot() {
        let (dir, _) = directory(ScriptedSource::new(vec![
            Ok(new_england()),
            Err(StationError::UpstreamUnavailable("connection refused".into())),
            Ok(vec![]),
        ]));
        dir.refresh().await.unwrap();

        let err = dir.refresh().await.unwrap_err();
        assert_eq!(err.kind(), "upstream_unavailable");

        let err = dir.refresh().await.unwrap_err();
        assert_eq!(err.kind(), "invalid_upstream_data");

        let snapshot = dir.snapshot().await;
        assert_eq!(snapshot.version(), 1);
        assert_eq!(snapshot.len(), 3);
    }

    #[tokio::test]
    async fn concurrent_refreshes_share_one_fetch() {
        let (dir, source) = directory(
            ScriptedSource::new(vec![Ok(new_england())]).with_delay(Duration::from_millis(100)),
        );

        let results = join_all((0..16).map(|_| dir.refresh())).await;

        assert_eq!(source.calls(), 1);
        for result in &results {
            let snapshot = result.as_ref().unwrap();
            assert_eq!(snapshot.version(), 1);
        }
        assert!(
            results
                .windows(2)
                .all(|w| Arc::ptr_eq(w[0].as_ref().unwrap(), w[1].as_ref().unwrap()))
        );
    }

    #[tokio::test]
    async fn concurrent_waiters_share_failure() {
        let (dir, source) = directory(
            ScriptedSource::new(vec![Err(StationError::UpstreamUnavailable("503".into()))])
                .with_delay(Duration::from_millis(50)),
        );

        let results = join_all((0..8).map(|_| dir.refresh())).await;

        assert_eq!(source.calls(), 1);
        for result in results {
            assert_eq!(
                result.unwrap_err(),
                StationError::UpstreamUnavailable("503".into())
            );
        }
    }

    #[tokio::test]
    async fn refresh_after_completion_fetches_again() {
        let (dir, source) = directory(ScriptedSource::new(vec![
            Ok(new_england()),
            Ok(new_england()),
        ]));

        dir.refresh().await.unwrap();
        dir.refresh().await.unwrap();
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_source_times_out_for_all_waiters() {
        let source = Arc::new(
            ScriptedSource::new(vec![Ok(new_england())]).with_delay(Duration::from_secs(60)),
        );
        let dir = StationDirectory::new(source.clone(), Duration::from_secs(1));

        let results = join_all((0..4).map(|_| dir.refresh())).await;

        assert_eq!(source.calls(), 1);
        for result in results {
            assert_eq!(result.unwrap_err(), StationError::UpstreamTimeout);
        }
        assert_eq!(dir.snapshot().await.version(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn abandoned_refresh_still_installs() {
        let (dir, source) = directory(
            ScriptedSource::new(vec![Ok(new_england()), Ok(new_england())])
                .with_delay(Duration::from_secs(2)),
        );

        // Caller goes away before the fetch finishes.
        let abandoned = tokio::time::timeout(Duration::from_secs(1), dir.refresh()).await;
        assert!(abandoned.is_err());

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(source.calls(), 1);
        assert_eq!(dir.snapshot().await.version(), 1);

        let next = dir.refresh().await.unwrap();
        assert_eq!(source.calls(), 2);
        assert_eq!(next.version(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn abandoned_refresh_does_not_leak_into_next_call() {
        let (dir, source) = directory(
            ScriptedSource::new(vec![Ok(new_england()), Ok(new_england())])
                .with_delay(Duration::from_secs(100_000)),
        );

        let abandoned = tokio::time::timeout(Duration::from_secs(1), dir.refresh()).await;
        assert!(abandoned.is_err());

        tokio::time::sleep(Duration::from_secs(86_400)).await;

        // A fresh attempt with its own timeout, not the stale one.
        let started = tokio::time::Instant::now();
        let err = dir.refresh().await.unwrap_err();
        assert_eq!(err, StationError::UpstreamTimeout);
        assert_eq!(source.calls(), 2);
        assert!(started.elapsed() >= Duration::from_secs(5));
        assert_eq!(dir.snapshot().await.version(), 0);
    }
}
