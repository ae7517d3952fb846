//! `ZLSReleases(ZLSVersion PK, Major, Minor, Patch, IsRelease, BuildId nullable,
//! JsonData)` backed by sqlite, with the two indexes spec.md §6.3 requires so the
//! four ordered queries hit an index scan rather than a full scan.

use super::ReleaseStore;
use crate::types::{Compatibility, ReleaseRecord, StoreError};
use async_trait::async_trait;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Row, SqlitePool};

pub struct SqliteReleaseStore {
    pool: SqlitePool,
}

impl SqliteReleaseStore {
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(8)
            .connect(database_url)
            .await
            .map_err(StoreError::Database)?;
        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS zls_releases (
                zls_version TEXT PRIMARY KEY,
                major       INTEGER NOT NULL,
                minor       INTEGER NOT NULL,
                patch       INTEGER NOT NULL,
                is_release  INTEGER NOT NULL,
                build_id    INTEGER,
                json_data   TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(StoreError::Database)?;

        // Serves allTagged* and taggedByMinor.
        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_zls_releases_tagged \
             ON zls_releases (is_release, major, minor, patch)",
        )
        .execute(&self.pool)
        .await
        .map_err(StoreError::Database)?;

        // Serves devByMinor.
        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_zls_releases_dev \
             ON zls_releases (major, minor, build_id) WHERE is_release = 0",
        )
        .execute(&self.pool)
        .await
        .map_err(StoreError::Database)?;

        Ok(())
    }

    fn row_to_record(row: &sqlx::sqlite::SqliteRow) -> Result<ReleaseRecord, StoreError> {
        let json: String = row.try_get("json_data").map_err(StoreError::Database)?;
        serde_json::from_str(&json).map_err(StoreError::Corrupt)
    }
}

#[async_trait]
impl ReleaseStore for SqliteReleaseStore {
    async fn get_by_version(&self, version: &str) -> Result<Option<ReleaseRecord>, StoreError> {
        let row = sqlx::query("SELECT json_data FROM zls_releases WHERE zls_version = ?")
            .bind(version)
            .fetch_optional(&self.pool)
            .await
            .map_err(StoreError::Database)?;
        row.as_ref().map(Self::row_to_record).transpose()
    }

    async fn all_tagged_desc(&self) -> Result<Vec<ReleaseRecord>, StoreError> {
        let rows = sqlx::query(
            "SELECT json_data FROM zls_releases WHERE is_release = 1 \
             ORDER BY major DESC, minor DESC, patch DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(StoreError::Database)?;
        rows.iter().map(Self::row_to_record).collect()
    }

    async fn all_tagged_asc(&self) -> Result<Vec<ReleaseRecord>, StoreError> {
        let rows = sqlx::query(
            "SELECT json_data FROM zls_releases WHERE is_release = 1 \
             ORDER BY major ASC, minor ASC, patch ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(StoreError::Database)?;
        rows.iter().map(Self::row_to_record).collect()
    }

    async fn tagged_by_minor(&self, major: u64, minor: u64) -> Result<Vec<ReleaseRecord>, StoreError> {
        let rows = sqlx::query(
            "SELECT json_data FROM zls_releases \
             WHERE is_release = 1 AND major = ? AND minor = ? \
             ORDER BY patch DESC",
        )
        .bind(major as i64)
        .bind(minor as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(StoreError::Database)?;
        rows.iter().map(Self::row_to_record).collect()
    }

    async fn dev_by_minor(&self, major: u64, minor: u64) -> Result<Vec<ReleaseRecord>, StoreError> {
        let rows = sqlx::query(
            "SELECT json_data FROM zls_releases \
             WHERE is_release = 0 AND major = ? AND minor = ? \
             ORDER BY build_id ASC",
        )
        .bind(major as i64)
        .bind(minor as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(StoreError::Database)?;
        rows.iter().map(Self::row_to_record).collect()
    }

    async fn dev_by_quad(
        &self,
        major: u64,
        minor: u64,
        patch: u64,
        commit_height: u64,
    ) -> Result<Option<ReleaseRecord>, StoreError> {
        let row = sqlx::query(
            "SELECT json_data FROM zls_releases \
             WHERE is_release = 0 AND major = ? AND minor = ? AND patch = ? AND build_id = ?",
        )
        .bind(major as i64)
        .bind(minor as i64)
        .bind(patch as i64)
        .bind(commit_height as i64)
        .fetch_optional(&self.pool)
        .await
        .map_err(StoreError::Database)?;
        row.as_ref().map(Self::row_to_record).transpose()
    }

    async fn upsert_and_patch(
        &self,
        record: &ReleaseRecord,
        zig_version: &str,
        compatibility: Compatibility,
    ) -> Result<bool, StoreError> {
        let mut tx = self.pool.begin().await.map_err(StoreError::Database)?;

        let existing: Option<String> =
            sqlx::query_scalar("SELECT json_data FROM zls_releases WHERE zls_version = ?")
                .bind(&record.zls_version)
                .fetch_optional(&mut *tx)
                .await
                .map_err(StoreError::Database)?;

        let inserted = existing.is_none();

        let mut current: ReleaseRecord = match existing {
            Some(json) => serde_json::from_str(&json).map_err(StoreError::Corrupt)?,
            None => record.clone(),
        };
        current
            .tested_zig_versions
            .insert(zig_version.to_string(), compatibility);

        let v = current.zls_version_parsed();
        let is_release = v.is_tagged();
        let build_id = v.dev.as_ref().map(|d| d.commit_height as i64);
        let json = serde_json::to_string(&current).map_err(StoreError::Corrupt)?;

        sqlx::query(
            "INSERT INTO zls_releases (zls_version, major, minor, patch, is_release, build_id, json_data) \
             VALUES (?, ?, ?, ?, ?, ?, ?) \
             ON CONFLICT(zls_version) DO UPDATE SET json_data = excluded.json_data",
        )
        .bind(&current.zls_version)
        .bind(v.major as i64)
        .bind(v.minor as i64)
        .bind(v.patch as i64)
        .bind(is_release as i64)
        .bind(build_id)
        .bind(json)
        .execute(&mut *tx)
        .await
        .map_err(StoreError::Database)?;

        tx.commit().await.map_err(StoreError::Database)?;
        Ok(inserted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Compatibility, ReleaseArtifact, Extension};
    use std::collections::BTreeMap;

    async fn store() -> SqliteReleaseStore {
        SqliteReleaseStore::connect("sqlite::memory:").await.unwrap()
    }

    fn record(zls_version: &str, zig_version: &str) -> ReleaseRecord {
        ReleaseRecord {
            zls_version: zls_version.to_string(),
            zig_version: zig_version.to_string(),
            minimum_build_zig_version: zig_version.to_string(),
            minimum_runtime_zig_version: zig_version.to_string(),
            date: 0,
            artifacts: vec![ReleaseArtifact {
                os: "linux".into(),
                arch: "x86_64".into(),
                version: zls_version.to_string(),
                extension: Extension::TarXz,
                file_shasum: "a".repeat(64),
                file_size: 1,
            }],
            tested_zig_versions: BTreeMap::new(),
            minisign: None,
        }
    }

    #[tokio::test]
    async fn round_trips_a_tagged_record() {
        let store = store().await;
        let rec = record("0.12.0", "0.12.0");
        let inserted = store
            .upsert_and_patch(&rec, "0.12.0", Compatibility::Full)
            .await
            .unwrap();
        assert!(inserted);

        let fetched = store.get_by_version("0.12.0").await.unwrap().unwrap();
        assert_eq!(fetched.tested_zig_versions.get("0.12.0"), Some(&Compatibility::Full));

        let second = store
            .upsert_and_patch(&rec, "0.12.1", Compatibility::OnlyRuntime)
            .await
            .unwrap();
        assert!(!second, "second publish of the same version is an update, not an insert");

        let fetched = store.get_by_version("0.12.0").await.unwrap().unwrap();
        assert_eq!(fetched.tested_zig_versions.len(), 2);
    }

    #[tokio::test]
    async fn tagged_by_minor_orders_patch_descending() {
        let store = store().await;
        for v in ["0.12.0", "0.12.1", "0.12.2"] {
            store.upsert_and_patch(&record(v, v), v, Compatibility::Full).await.unwrap();
        }
        let rows = store.tagged_by_minor(0, 12).await.unwrap();
        let versions: Vec<_> = rows.iter().map(|r| r.zls_version.clone()).collect();
        assert_eq!(versions, vec!["0.12.2", "0.12.1", "0.12.0"]);
    }

    #[tokio::test]
    async fn dev_by_minor_orders_commit_height_ascending() {
        let store = store().await;
        for (v, zig) in [
            ("0.12.0-dev.3+aaaaaaaaa", "0.12.0-dev.3+aaaaaaaaa"),
            ("0.12.0-dev.1+aaaaaaaaa", "0.12.0-dev.1+aaaaaaaaa"),
            ("0.12.0-dev.2+aaaaaaaaa", "0.12.0-dev.2+aaaaaaaaa"),
        ] {
            store.upsert_and_patch(&record(v, zig), zig, Compatibility::Full).await.unwrap();
        }
        let rows = store.dev_by_minor(0, 12).await.unwrap();
        let heights: Vec<_> = rows.iter().map(|r| r.zls_version_parsed().dev.unwrap().commit_height).collect();
        assert_eq!(heights, vec![1, 2, 3]);
    }
}
