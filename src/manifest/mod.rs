//! Converts a [`ReleaseRecord`] plus a public URL base into the wire format for
//! both single-release responses and the full index.

use crate::types::{Extension, ReleaseRecord};
use chrono::{TimeZone, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("duplicate manifest key '{0}' across artifacts of the same release")]
    DuplicateArtifactKey(String),
}

#[derive(Debug, Serialize)]
pub struct ArtifactManifest {
    pub tarball: String,
    pub shasum: String,
    /// Serialized as a string per spec.md §4.6.
    pub size: String,
}

#[derive(Debug, Serialize)]
pub struct ReleaseManifest {
    pub version: String,
    pub date: String,
    #[serde(flatten)]
    pub artifacts: BTreeMap<String, ArtifactManifest>,
}

#[derive(Debug, Serialize)]
pub struct IndexEntry {
    pub date: String,
    #[serde(flatten)]
    pub artifacts: BTreeMap<String, ArtifactManifest>,
}

fn artifact_manifests(record: &ReleaseRecord, public_url_base: &str) -> Result<BTreeMap<String, ArtifactManifest>, ManifestError> {
    let zls_version = record.zls_version_parsed();
    let mut out = BTreeMap::new();
    for artifact in &record.artifacts {
        // The .tar.gz variant exists for interoperability but is omitted from the
        // manifest in favor of .tar.xz.
        if artifact.extension == Extension::TarGz {
            continue;
        }
        let key = artifact.manifest_key();
        if out.contains_key(&key) {
            return Err(ManifestError::DuplicateArtifactKey(key));
        }
        out.insert(
            key,
            ArtifactManifest {
                tarball: format!("{}/{}", public_url_base, artifact.file_name_for(&zls_version)),
                shasum: artifact.file_shasum.clone(),
                size: artifact.file_size.to_string(),
            },
        );
    }
    Ok(out)
}

/// `yyyy-mm-dd` in UTC, derived from the millisecond timestamp.
pub fn format_date(date_ms: i64) -> String {
    Utc.timestamp_millis_opt(date_ms)
        .single()
        .unwrap_or_else(|| Utc.timestamp_millis_opt(0).unwrap())
        .format("%Y-%m-%d")
        .to_string()
}

/// The single-release response for `select-version` and the by-version lookup.
pub fn format_release(record: &ReleaseRecord, public_url_base: &str) -> Result<ReleaseManifest, ManifestError> {
    Ok(ReleaseManifest {
        version: record.zls_version.clone(),
        date: format_date(record.date),
        artifacts: artifact_manifests(record, public_url_base)?,
    })
}

/// The full `index.json` snapshot of all tagged releases, descending by
/// `(major, minor, patch)` as `listAllTagged()` returns them.
pub fn format_index(records: &[ReleaseRecord], public_url_base: &str) -> Result<BTreeMap<String, IndexEntry>, ManifestError> {
    let mut out = BTreeMap::new();
    for record in records {
        out.insert(
            record.zls_version.clone(),
            IndexEntry {
                date: format_date(record.date),
                artifacts: artifact_manifests(record, public_url_base)?,
            },
        );
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ReleaseArtifact;

    fn artifact(os: &str, arch: &str, version: &str, ext: Extension) -> ReleaseArtifact {
        ReleaseArtifact {
            os: os.into(),
            arch: arch.into(),
            version: version.into(),
            extension: ext,
            file_shasum: "a".repeat(64),
            file_size: 1234,
        }
    }

    fn record() -> ReleaseRecord {
        ReleaseRecord {
            zls_version: "0.12.0".into(),
            zig_version: "0.12.0".into(),
            minimum_build_zig_version: "0.12.0".into(),
            minimum_runtime_zig_version: "0.12.0".into(),
            date: 1_700_000_000_000,
            artifacts: vec![
                artifact("linux", "x86_64", "0.12.0", Extension::TarXz),
                artifact("linux", "x86_64", "0.12.0", Extension::TarGz),
                artifact("windows", "x86_64", "0.12.0", Extension::Zip),
            ],
            tested_zig_versions: Default::default(),
            minisign: None,
        }
    }

    #[test]
    fn skips_tar_gz_and_keys_by_arch_os() {
        let manifest = format_release(&record(), "https://example.test").unwrap();
        assert_eq!(manifest.version, "0.12.0");
        assert_eq!(manifest.artifacts.len(), 2);
        assert!(manifest.artifacts.contains_key("x86_64-linux"));
        assert!(manifest.artifacts.contains_key("x86_64-windows"));
        assert_eq!(
            manifest.artifacts["x86_64-linux"].tarball,
            "https://example.test/zls-linux-x86_64-0.12.0.tar.xz"
        );
    }

    #[test]
    fn file_name_flips_past_0_15_0() {
        let mut r = record();
        r.zls_version = "0.15.0".into();
        for a in &mut r.artifacts {
            a.version = "0.15.0".into();
        }
        let manifest = format_release(&r, "https://example.test").unwrap();
        assert_eq!(
            manifest.artifacts["x86_64-linux"].tarball,
            "https://example.test/zls-x86_64-linux-0.15.0.tar.xz"
        );
    }

    #[test]
    fn duplicate_manifest_key_is_an_error() {
        let mut r = record();
        r.artifacts.push(artifact("linux", "x86_64", "0.12.0", Extension::Zip));
        assert!(format_release(&r, "https://example.test").is_err());
    }

    #[test]
    fn date_formats_as_utc_yyyy_mm_dd() {
        assert_eq!(format_date(1_700_000_000_000), "2023-11-14");
    }
}
