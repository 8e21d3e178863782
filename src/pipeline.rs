//! Resilient fetch pipeline: build query, fetch-or-fallback, normalize.
//!
//! Linear flow with no retry loop. A successful fetch refreshes the
//! fallback slot as a side effect; a failed fetch substitutes the
//! last-known-good snapshot. Only when both the live call and the slot are
//! unavailable does the pipeline surface a degraded terminal state.

use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::PipelineConfig;
use crate::error::{PipelineError, Result};
use crate::fallback::{FileSnapshotStore, SnapshotStore};
use crate::fetcher::{CatalogSource, HttpCatalogFetcher};
use crate::normalize::{normalize_payload, QuakeRecord, RawCatalogPayload};
use crate::query::QueryParams;

pub struct FetchPipeline {
    source: Arc<dyn CatalogSource>,
    store: Arc<dyn SnapshotStore>,
    window_days: i64,
}

impl FetchPipeline {
    /// Build the production pipeline: HTTP fetcher plus file-backed slot.
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            source: Arc::new(HttpCatalogFetcher::new(&config.catalog)),
            store: Arc::new(FileSnapshotStore::new(config.fallback.path.clone())),
            window_days: config.catalog.default_window_days,
        }
    }

    /// Assemble from explicit collaborators. Used by tests to inject
    /// doubles for the network and storage seams.
    pub fn with_parts(
        source: Arc<dyn CatalogSource>,
        store: Arc<dyn SnapshotStore>,
        window_days: i64,
    ) -> Self {
        Self {
            source,
            store,
            window_days,
        }
    }

    /// Run one fetch operation end to end.
    ///
    /// Every call builds a fresh query and re-normalizes; nothing is cached
    /// across invocations beyond the fallback slot itself.
    pub async fn fetch(
        &self,
        start: Option<&str>,
        min_magnitude: Option<&str>,
    ) -> Result<Vec<QuakeRecord>> {
        let params = QueryParams::build(start, min_magnitude, self.window_days);
        debug!(?params, "built catalog query");

        let payload = match self.source.fetch(&params).await {
            Ok(payload) => {
                // Persistence is best-effort; a live result is never
                // discarded because the slot could not be written.
                if let Err(e) = self.store.save(&payload).await {
                    warn!(error = %e, "failed to persist fallback snapshot");
                }
                payload
            }
            Err(fetch_err) => {
                warn!(error = %fetch_err, "catalog fetch failed, trying fallback snapshot");
                self.load_fallback(fetch_err).await?
            }
        };

        let records = normalize_payload(&payload)?;
        info!(count = records.len(), "normalized catalog records");
        Ok(records)
    }

    async fn load_fallback(
        &self,
        fetch_err: crate::fetcher::FetchError,
    ) -> Result<RawCatalogPayload> {
        match self.store.load().await {
            Ok(Some(payload)) => {
                info!("serving last-known-good fallback snapshot");
                Ok(payload)
            }
            Ok(None) => {
                warn!(error = %fetch_err, "no fallback snapshot available");
                Err(PipelineError::FallbackUnavailable)
            }
            Err(load_err) => {
                warn!(error = %load_err, "fallback snapshot unreadable");
                Err(load_err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetcher::FetchError;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct StubSource {
        result: Mutex<Option<std::result::Result<RawCatalogPayload, FetchError>>>,
    }

    impl StubSource {
        fn ok(payload: RawCatalogPayload) -> Arc<Self> {
            Arc::new(Self {
                result: Mutex::new(Some(Ok(payload))),
            })
        }

        fn failing(err: FetchError) -> Arc<Self> {
            Arc::new(Self {
                result: Mutex::new(Some(Err(err))),
            })
        }
    }

    #[async_trait]
    impl CatalogSource for StubSource {
        async fn fetch(&self, _params: &QueryParams) -> std::result::Result<RawCatalogPayload, FetchError> {
            self.result
                .lock()
                .unwrap()
                .take()
                .expect("stub source fetched more than once")
        }
    }

    #[derive(Default)]
    struct MemoryStore {
        slot: Mutex<Option<RawCatalogPayload>>,
        fail_saves: bool,
    }

    #[async_trait]
    impl SnapshotStore for MemoryStore {
        async fn save(&self, payload: &RawCatalogPayload) -> Result<()> {
            if self.fail_saves {
                return Err(PipelineError::snapshot("disk full"));
            }
            *self.slot.lock().unwrap() = Some(payload.clone());
            Ok(())
        }

        async fn load(&self) -> Result<Option<RawCatalogPayload>> {
            Ok(self.slot.lock().unwrap().clone())
        }
    }

    fn sample_payload() -> RawCatalogPayload {
        serde_json::json!({
            "features": [{
                "geometry": {"coordinates": [-122.1, 37.4, 10.5]},
                "properties": {"mag": 4.2, "place": "10km N of Testville", "time": 1_700_000_000_000i64}
            }]
        })
    }

    #[tokio::test]
    async fn success_saves_snapshot_and_returns_records() {
        let store = Arc::new(MemoryStore::default());
        let pipeline =
            FetchPipeline::with_parts(StubSource::ok(sample_payload()), store.clone(), 60);

        let records = pipeline.fetch(None, None).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].place, "10km N of Testville");

        // Save-after-success invariant: the slot now equals the fetched payload.
        let slot = store.load().await.unwrap().unwrap();
        assert_eq!(slot, sample_payload());
    }

    #[tokio::test]
    async fn fetch_failure_substitutes_snapshot() {
        let store = Arc::new(MemoryStore::default());
        store.save(&sample_payload()).await.unwrap();

        let pipeline = FetchPipeline::with_parts(
            StubSource::failing(FetchError::Timeout),
            store.clone(),
            60,
        );

        let records = pipeline.fetch(None, None).await.unwrap();
        assert_eq!(records, normalize_payload(&sample_payload()).unwrap());
    }

    #[tokio::test]
    async fn fetch_failure_without_snapshot_is_terminal() {
        let pipeline = FetchPipeline::with_parts(
            StubSource::failing(FetchError::Connection("refused".into())),
            Arc::new(MemoryStore::default()),
            60,
        );

        match pipeline.fetch(None, None).await {
            Err(PipelineError::FallbackUnavailable) => {}
            other => panic!("expected FallbackUnavailable, got {:?}", other.map(|r| r.len())),
        }
    }

    #[tokio::test]
    async fn save_failure_does_not_discard_live_result() {
        let store = Arc::new(MemoryStore {
            slot: Mutex::new(None),
            fail_saves: true,
        });
        let pipeline = FetchPipeline::with_parts(StubSource::ok(sample_payload()), store, 60);

        let records = pipeline.fetch(None, None).await.unwrap();
        assert_eq!(records.len(), 1);
    }

    #[tokio::test]
    async fn all_fetch_failure_kinds_fall_back_identically() {
        for err in [
            FetchError::Timeout,
            FetchError::Connection("refused".into()),
            FetchError::Status(503),
            FetchError::Decode("truncated".into()),
        ] {
            let store = Arc::new(MemoryStore::default());
            store.save(&sample_payload()).await.unwrap();
            let pipeline = FetchPipeline::with_parts(StubSource::failing(err), store, 60);
            assert_eq!(pipeline.fetch(None, None).await.unwrap().len(), 1);
        }
    }
}
