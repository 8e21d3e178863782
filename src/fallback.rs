//! Single-slot fallback snapshot store.
//!
//! The slot holds at most one payload, strictly replaced on every save.
//! Saves go through a temp file plus rename so a concurrent load never
//! observes a partial write. A missing slot is an explicit miss, distinct
//! from decode or IO failures.

use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::fs;

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

use crate::error::{PipelineError, Result};
use crate::normalize::RawCatalogPayload;

/// Seam over snapshot persistence, so tests can substitute a double.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Overwrite the slot with the given payload.
    async fn save(&self, payload: &RawCatalogPayload) -> Result<()>;

    /// `Ok(None)` when the slot has never been written.
    async fn load(&self) -> Result<Option<RawCatalogPayload>>;
}

/// File-backed store at a fixed well-known path.
pub struct FileSnapshotStore {
    path: PathBuf,
}

impl FileSnapshotStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    // Unique per save, so concurrent writers never share a temp file.
    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_os_string();
        name.push(format!(
            ".{}.{}.tmp",
            std::process::id(),
            TEMP_COUNTER.fetch_add(1, Ordering::Relaxed)
        ));
        PathBuf::from(name)
    }
}

#[async_trait]
impl SnapshotStore for FileSnapshotStore {
    async fn save(&self, payload: &RawCatalogPayload) -> Result<()> {
        let serialized = serde_json::to_vec(payload)?;
        let tmp = self.temp_path();
        fs::write(&tmp, &serialized).await.map_err(|e| {
            PipelineError::snapshot(format!("failed to write {}: {}", tmp.display(), e))
        })?;
        // Atomic replace; readers see the old slot or the new one, never a
        // partial write.
        fs::rename(&tmp, &self.path).await.map_err(|e| {
            PipelineError::snapshot(format!(
                "failed to replace {}: {}",
                self.path.display(),
                e
            ))
        })?;
        Ok(())
    }

    async fn load(&self) -> Result<Option<RawCatalogPayload>> {
        let bytes = match fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(PipelineError::snapshot(format!(
                    "failed to read {}: {}",
                    self.path.display(),
                    e
                )))
            }
        };
        let payload = serde_json::from_slice(&bytes)?;
        Ok(Some(payload))
    }
}
