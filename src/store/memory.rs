//! An in-memory [`ReleaseStore`] used to test the selection and publish
//! algorithms without exercising sqlite. Not used in production; the HTTP
//! service wires up [`super::SqliteReleaseStore`] instead.

use super::ReleaseStore;
use crate::types::{Compatibility, ReleaseRecord, StoreError};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::RwLock;

#[derive(Default)]
pub struct InMemoryReleaseStore {
    records: RwLock<BTreeMap<String, ReleaseRecord>>,
}

impl InMemoryReleaseStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(records: impl IntoIterator<Item = ReleaseRecord>) -> Self {
        let store = Self::new();
        let mut guard = store.records.write().unwrap();
        for record in records {
            guard.insert(record.zls_version.clone(), record);
        }
        drop(guard);
        store
    }
}

#[async_trait]
impl ReleaseStore for InMemoryReleaseStore {
    async fn get_by_version(&self, version: &str) -> Result<Option<ReleaseRecord>, StoreError> {
        Ok(self.records.read().unwrap().get(version).cloned())
    }

    async fn all_tagged_desc(&self) -> Result<Vec<ReleaseRecord>, StoreError> {
        let mut out = self.all_tagged_asc().await?;
        out.reverse();
        Ok(out)
    }

    async fn all_tagged_asc(&self) -> Result<Vec<ReleaseRecord>, StoreError> {
        let guard = self.records.read().unwrap();
        let mut out: Vec<ReleaseRecord> = guard
            .values()
            .filter(|r| r.zls_version_parsed().is_tagged())
            .cloned()
            .collect();
        out.sort_by_key(|r| (r.zls_version_parsed().major, r.zls_version_parsed().minor, r.zls_version_parsed().patch));
        Ok(out)
    }

    async fn tagged_by_minor(&self, major: u64, minor: u64) -> Result<Vec<ReleaseRecord>, StoreError> {
        let guard = self.records.read().unwrap();
        let mut out: Vec<ReleaseRecord> = guard
            .values()
            .filter(|r| {
                let v = r.zls_version_parsed();
                v.is_tagged() && v.major == major && v.minor == minor
            })
            .cloned()
            .collect();
        out.sort_by_key(|r| std::cmp::Reverse(r.zls_version_parsed().patch));
        Ok(out)
    }

    async fn dev_by_minor(&self, major: u64, minor: u64) -> Result<Vec<ReleaseRecord>, StoreError> {
        let guard = self.records.read().unwrap();
        let mut out: Vec<ReleaseRecord> = guard
            .values()
            .filter(|r| {
                let v = r.zls_version_parsed();
                !v.is_tagged() && v.major == major && v.minor == minor
            })
            .cloned()
            .collect();
        out.sort_by_key(|r| r.zls_version_parsed().dev.unwrap().commit_height);
        Ok(out)
    }

    async fn dev_by_quad(
        &self,
        major: u64,
        minor: u64,
        patch: u64,
        commit_height: u64,
    ) -> Result<Option<ReleaseRecord>, StoreError> {
        let guard = self.records.read().unwrap();
        Ok(guard
            .values()
            .find(|r| {
                let v = r.zls_version_parsed();
                match &v.dev {
                    Some(dev) => {
                        !v.is_tagged()
                            && v.major == major
                            && v.minor == minor
                            && v.patch == patch
                            && dev.commit_height == commit_height
                    }
                    None => false,
                }
            })
            .cloned())
    }

    async fn upsert_and_patch(
        &self,
        record: &ReleaseRecord,
        zig_version: &str,
        compatibility: Compatibility,
    ) -> Result<bool, StoreError> {
        let mut guard = self.records.write().unwrap();
        let key = record.zls_version.clone();
        let inserted = !guard.contains_key(&key);
        let entry = guard.entry(key).or_insert_with(|| record.clone());
        entry.tested_zig_versions.insert(zig_version.to_string(), compatibility);
        Ok(inserted)
    }
}

