//! Recomputes the full tagged-release snapshot and writes it to the blob
//! store at `index.json`. Fire-and-forget with respect to the publish
//! response (spec.md §4.5, §5): the caller spawns [`materialize`] as deferred
//! work rather than awaiting it inline.

use crate::blob::BlobStore;
use crate::manifest::format_index;
use crate::store::ReleaseStore;
use crate::types::{BlobError, StoreError};
use thiserror::Error;
use tracing::{info, warn};

pub const INDEX_KEY: &str = "index.json";

#[derive(Debug, Error)]
pub enum MaterializeError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Manifest(#[from] crate::manifest::ManifestError),

    #[error(transparent)]
    Blob(#[from] BlobError),

    #[error("failed to serialize index")]
    Encode(#[source] serde_json::Error),
}

/// Fetches `allTaggedDesc()`, renders it, and writes `index.json` unconditionally
/// (last-writer-wins, per spec.md §5). Retries are the caller's responsibility —
/// the host's deferred-work primitive (here, a `tokio::spawn`ed task) is expected
/// to retry on transient failure; this function itself is a single attempt.
pub async fn materialize(
    store: &dyn ReleaseStore,
    blob_store: &dyn BlobStore,
    public_url_base: &str,
) -> Result<(), MaterializeError> {
    let records = store.all_tagged_desc().await?;
    let index = format_index(&records, public_url_base)?;
    let json = serde_json::to_vec_pretty(&index).map_err(MaterializeError::Encode)?;
    blob_store.put(INDEX_KEY, json, "application/json").await?;
    Ok(())
}

/// Spawns [`materialize`] as deferred work, logging (not propagating) failure.
/// `store` and `blob_store` must be `'static` (an `Arc`-wrapped service handle),
/// since the task may outlive the request that triggered it.
pub fn spawn_materialize(
    store: std::sync::Arc<dyn ReleaseStore>,
    blob_store: std::sync::Arc<dyn BlobStore>,
    public_url_base: String,
) {
    tokio::spawn(async move {
        match materialize(store.as_ref(), blob_store.as_ref(), &public_url_base).await {
            Ok(()) => info!("index.json re-materialized"),
            Err(error) => warn!(%error, "failed to re-materialize index.json"),
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blob::FilesystemBlobStore;
    use crate::store::InMemoryReleaseStore;
    use crate::types::{Extension, ReleaseArtifact, ReleaseRecord};
    use std::collections::BTreeMap;

    fn record(version: &str) -> ReleaseRecord {
        ReleaseRecord {
            zls_version: version.to_string(),
            zig_version: version.to_string(),
            minimum_build_zig_version: version.to_string(),
            minimum_runtime_zig_version: version.to_string(),
            date: 0,
            artifacts: vec![ReleaseArtifact {
                os: "linux".into(),
                arch: "x86_64".into(),
                version: version.to_string(),
                extension: Extension::TarXz,
                file_shasum: "a".repeat(64),
                file_size: 1,
            }],
            tested_zig_versions: BTreeMap::new(),
            minisign: None,
        }
    }

    #[tokio::test]
    async fn writes_index_json_for_all_tagged_records() {
        let store = InMemoryReleaseStore::seed([record("0.12.0"), record("0.11.0")]);
        let dir = tempfile::tempdir().unwrap();
        let blob_store = FilesystemBlobStore::new(dir.path());

        materialize(&store, &blob_store, "https://example.test").await.unwrap();

        let written = tokio::fs::read(dir.path().join(INDEX_KEY)).await.unwrap();
        let parsed: serde_json::Value = serde_json::from_slice(&written).unwrap();
        assert!(parsed.get("0.12.0").is_some());
        assert!(parsed.get("0.11.0").is_some());
    }

    #[tokio::test]
    async fn idempotent_on_unchanged_storage() {
        let store = InMemoryReleaseStore::seed([record("0.12.0")]);
        let dir = tempfile::tempdir().unwrap();
        let blob_store = FilesystemBlobStore::new(dir.path());

        materialize(&store, &blob_store, "https://example.test").await.unwrap();
        let first = tokio::fs::read(dir.path().join(INDEX_KEY)).await.unwrap();
        materialize(&store, &blob_store, "https://example.test").await.unwrap();
        let second = tokio::fs::read(dir.path().join(INDEX_KEY)).await.unwrap();
        assert_eq!(first, second);
    }
}
