//! The release store: a persistent mapping from ZLS version to [`ReleaseRecord`]
//! supporting the four ordered queries the core depends on (spec.md §4.2), plus
//! the atomic write used by the publish validator.

mod memory;
mod sqlite;

pub use memory::InMemoryReleaseStore;
pub use sqlite::SqliteReleaseStore;

use crate::types::{Compatibility, ReleaseRecord, StoreError};
use async_trait::async_trait;

#[async_trait]
pub trait ReleaseStore: Send + Sync {
    /// `getByVersion(v)` — exact match.
    async fn get_by_version(&self, version: &str) -> Result<Option<ReleaseRecord>, StoreError>;

    /// `allTaggedDesc` — tagged only, `(major, minor, patch)` descending.
    async fn all_tagged_desc(&self) -> Result<Vec<ReleaseRecord>, StoreError>;

    /// `allTaggedAsc` — tagged only, `(major, minor, patch)` ascending.
    async fn all_tagged_asc(&self) -> Result<Vec<ReleaseRecord>, StoreError>;

    /// `taggedByMinor(M, m)` — tagged, major=M, minor=m, patch descending.
    async fn tagged_by_minor(&self, major: u64, minor: u64) -> Result<Vec<ReleaseRecord>, StoreError>;

    /// `devByMinor(M, m)` — development, major=M, minor=m, `commitHeight` ascending.
    async fn dev_by_minor(&self, major: u64, minor: u64) -> Result<Vec<ReleaseRecord>, StoreError>;

    /// `devByQuad(M, m, p, h)` — development, exact `(M, m, p, commitHeight=h)`.
    async fn dev_by_quad(
        &self,
        major: u64,
        minor: u64,
        patch: u64,
        commit_height: u64,
    ) -> Result<Option<ReleaseRecord>, StoreError>;

    /// `batch([upsert, patch])`: insert `record` if its key is absent (otherwise a
    /// no-op on the main row), then merge `{zig_version: compatibility}` into
    /// `testedZigVersions`, applied atomically. Returns `true` iff the record was
    /// newly inserted by this call.
    async fn upsert_and_patch(
        &self,
        record: &ReleaseRecord,
        zig_version: &str,
        compatibility: Compatibility,
    ) -> Result<bool, StoreError>;
}
