//! A filesystem-backed [`BlobStore`]: each key becomes a file under a configured
//! root. The `content_type` is recorded alongside as `<key>.content-type` since
//! the local filesystem has no notion of object metadata; a real deployment's
//! CDN-fronted store would carry it natively.

use super::BlobStore;
use crate::types::BlobError;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

pub struct FilesystemBlobStore {
    root: PathBuf,
}

impl FilesystemBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }

    fn io_err(key: &str, source: std::io::Error) -> BlobError {
        BlobError::Io { key: key.to_string(), source }
    }
}

#[async_trait]
impl BlobStore for FilesystemBlobStore {
    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<(), BlobError> {
        let path = self.path_for(key);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| Self::io_err(key, e))?;
        }
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| Self::io_err(key, e))?;
        tokio::fs::write(content_type_path(&path), content_type)
            .await
            .map_err(|e| Self::io_err(key, e))?;
        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool, BlobError> {
        Ok(tokio::fs::try_exists(self.path_for(key))
            .await
            .map_err(|e| Self::io_err(key, e))?)
    }
}

fn content_type_path(path: &Path) -> PathBuf {
    let mut os_string = path.as_os_str().to_owned();
    os_string.push(".content-type");
    PathBuf::from(os_string)
}
