//! Orchestrates a publish request end to end: validate, write the atomic
//! store batch, then (for fresh artifacts) write blobs and schedule index
//! re-materialization as deferred work (spec.md §4.3 step 8, §5).

pub mod validator;

pub use validator::{ArtifactUpload, PublishRequest, Validated};

use crate::blob::BlobStore;
use crate::index;
use crate::store::ReleaseStore;
use crate::types::{Compatibility, PublishError, ReleaseRecord};
use std::collections::BTreeMap;
use std::sync::Arc;

pub struct PublishOutcome {
    pub zls_version: String,
    pub inserted: bool,
}

/// The JSON publish contract carries artifact metadata only (shasum, size),
/// not bytes (spec.md §9 open question 2) — this crate has no artifact-blob
/// write path.
///
/// `now_ms` is passed in rather than read from the clock here so the
/// orchestration stays testable; callers pass `chrono::Utc::now().timestamp_millis()`.
pub async fn publish(
    store: &dyn ReleaseStore,
    request: &PublishRequest,
    force_minisign: bool,
    now_ms: i64,
) -> Result<PublishOutcome, PublishError> {
    let validated = validator::validate(store, request, force_minisign).await?;

    let record = ReleaseRecord {
        zls_version: validated.zls_version.format(),
        zig_version: validated.zig_version.format(),
        minimum_build_zig_version: validated.minimum_build_zig_version.format(),
        minimum_runtime_zig_version: validated.minimum_runtime_zig_version.format(),
        date: now_ms,
        artifacts: validated.artifacts.clone(),
        tested_zig_versions: BTreeMap::new(),
        minisign: if validated.has_signatures { Some(true) } else { None },
    };

    let inserted = store
        .upsert_and_patch(&record, &validated.zig_version.format(), validated.compatibility)
        .await
        .map_err(PublishError::Store)?;

    Ok(PublishOutcome { zls_version: record.zls_version, inserted })
}

/// Schedules index re-materialization for a publish that created a new tagged
/// record, or gave a development record its first artifacts. Skipped for a
/// re-publish that only adds a CI datapoint (§4.5).
pub fn maybe_materialize_index(
    outcome: &PublishOutcome,
    has_artifacts: bool,
    store: Arc<dyn ReleaseStore>,
    blob_store: Arc<dyn BlobStore>,
    public_url_base: String,
) {
    if outcome.inserted && has_artifacts {
        index::spawn_materialize(store, blob_store, public_url_base);
    }
}
