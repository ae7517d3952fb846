//! Blob storage: object keys `zls-<os>-<arch>-<version>.<ext>`, the sidecar
//! `<key>.minisig`, and the well-known `index.json`. The spec treats the physical
//! store as an external collaborator (a CDN-fronted object store); this module
//! provides the trait plus one concrete filesystem-backed implementation good
//! enough for local development and for tests to assert on written bytes.

mod filesystem;

pub use filesystem::FilesystemBlobStore;

use crate::types::BlobError;
use async_trait::async_trait;

#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Writes `key` unconditionally, overwriting any existing content.
    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<(), BlobError>;

    /// Writes `key` only if absent. Blob writes are idempotent by key+shasum
    /// (spec.md §5), so callers use this for artifact bytes, which never change
    /// once published under a given key.
    async fn put_idempotent(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<(), BlobError> {
        if !self.exists(key).await? {
            self.put(key, bytes, content_type).await?;
        }
        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool, BlobError>;
}
