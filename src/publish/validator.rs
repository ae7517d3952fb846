//! The 8-step check order from the publish contract: scalar parsing, artifact
//! naming, extension-set grouping, version-triple invariants, the
//! empty-artifacts/compatibility pairing, the update-vs-first-publish rule,
//! the development-commit conflict rule, then acceptance. Checks that need no
//! I/O run first.

use crate::store::ReleaseStore;
use crate::types::{Compatibility, Extension, PublishError, ReleaseArtifact, Version};
use std::collections::{BTreeMap, BTreeSet};

/// One uploaded artifact's metadata, keyed by file name in [`PublishRequest::artifacts`].
#[derive(Debug, Clone)]
pub struct ArtifactUpload {
    pub shasum: String,
    pub size: u64,
    pub has_signature: bool,
}

/// `{zlsVersion, zigVersion, minimumBuildZigVersion, minimumRuntimeZigVersion,
/// compatibility, artifacts: map<fileName, {shasum, size}>}` plus a per-file
/// signature flag, since a real upload carries `.minisig` sidecars alongside.
#[derive(Debug, Clone)]
pub struct PublishRequest {
    pub zls_version: String,
    pub zig_version: String,
    pub minimum_build_zig_version: String,
    pub minimum_runtime_zig_version: String,
    pub compatibility: String,
    pub artifacts: BTreeMap<String, ArtifactUpload>,
}

/// The request after every check has passed: ready to become a [`crate::types::ReleaseRecord`].
pub struct Validated {
    pub zls_version: Version,
    pub zig_version: Version,
    pub minimum_build_zig_version: Version,
    pub minimum_runtime_zig_version: Version,
    pub compatibility: Compatibility,
    pub artifacts: Vec<ReleaseArtifact>,
    pub has_signatures: bool,
}

pub async fn validate(
    store: &dyn ReleaseStore,
    request: &PublishRequest,
    force_minisign: bool,
) -> Result<Validated, PublishError> {
    // 1. scalar fields.
    let zls_version = Version::parse(&request.zls_version)
        .ok_or(PublishError::InvalidVersionField { field: "zlsVersion" })?;
    let zig_version = Version::parse(&request.zig_version)
        .ok_or(PublishError::InvalidVersionField { field: "zigVersion" })?;
    let minimum_build_zig_version = Version::parse(&request.minimum_build_zig_version)
        .ok_or(PublishError::InvalidVersionField { field: "minimumBuildZigVersion" })?;
    let minimum_runtime_zig_version = Version::parse(&request.minimum_runtime_zig_version)
        .ok_or(PublishError::InvalidVersionField { field: "minimumRuntimeZigVersion" })?;
    let compatibility = parse_compatibility(&request.compatibility)?;

    // 2. artifact naming, version match, shasum shape, size.
    let mut artifacts = Vec::with_capacity(request.artifacts.len());
    for (file_name, upload) in &request.artifacts {
        let (os, arch, version, extension) = parse_artifact_file_name(file_name)
            .ok_or_else(|| PublishError::ArtifactNaming(file_name.clone()))?;

        if version != request.zls_version {
            return Err(PublishError::ArtifactVersionMismatch {
                artifact: file_name.clone(),
                found: version,
                expected: request.zls_version.clone(),
            });
        }
        if !crate::types::is_valid_shasum(&upload.shasum) {
            return Err(PublishError::ArtifactShasumShape(file_name.clone()));
        }
        if upload.size == 0 {
            return Err(PublishError::ArtifactEmptySize(file_name.clone()));
        }

        artifacts.push(ReleaseArtifact {
            os,
            arch,
            version,
            extension,
            file_shasum: upload.shasum.clone(),
            file_size: upload.size,
        });
    }

    // 3. I2: per (os, arch, version) group, the extension set.
    check_extension_groups(&artifacts)?;

    // 4. I3, I4, I8.
    if zls_version.major != 0 {
        return Err(PublishError::NonZeroMajor);
    }
    if zls_version.is_tagged() {
        if !zig_version.is_tagged() || artifacts.is_empty() || compatibility != Compatibility::Full {
            return Err(PublishError::TaggedWithoutArtifacts { zls_version: request.zls_version.clone() });
        }
    } else if zls_version.patch != 0 {
        return Err(PublishError::DevPatchNonzero(request.zls_version.clone()));
    }

    // 5. artifacts-empty iff compatibility == None.
    if artifacts.is_empty() != (compatibility == Compatibility::None) {
        return Err(PublishError::CompatibilityMismatch);
    }

    // 6. I6: an artifacts-empty record must already exist.
    if artifacts.is_empty() {
        let existing = store.get_by_version(&request.zls_version).await.map_err(PublishError::Store)?;
        if existing.is_none() {
            return Err(PublishError::FailedBuildNotUpdatable(request.zls_version.clone()));
        }
    }

    // 7. I7: development commit uniqueness per (major, minor, commitHeight).
    if let Some(dev) = &zls_version.dev {
        let existing = store
            .dev_by_quad(zls_version.major, zls_version.minor, zls_version.patch, dev.commit_height)
            .await
            .map_err(PublishError::Store)?;
        if let Some(existing) = existing {
            if existing.zls_version != request.zls_version {
                return Err(PublishError::ConflictingDevCommit {
                    major: zls_version.major,
                    minor: zls_version.minor,
                    commit_height: dev.commit_height,
                });
            }
        }
    }

    // 8 (minisign half). Signature presence must be all-or-nothing, or (if
    // forceMinisign) present on every artifact.
    let has_signatures = check_minisign(&request.artifacts, force_minisign)?;

    Ok(Validated {
        zls_version,
        zig_version,
        minimum_build_zig_version,
        minimum_runtime_zig_version,
        compatibility,
        artifacts,
        has_signatures,
    })
}

fn parse_compatibility(s: &str) -> Result<Compatibility, PublishError> {
    match s {
        "none" => Ok(Compatibility::None),
        "only-runtime" => Ok(Compatibility::OnlyRuntime),
        "full" => Ok(Compatibility::Full),
        _ => Err(PublishError::InvalidCompatibility),
    }
}

/// `zls-<os>-<arch>-<version>.(tar.xz|tar.gz|zip)`, where `<version>` must be
/// exactly the request's `zlsVersion`. `os` never contains a hyphen in
/// practice, so splitting the remainder once on the first `-` recovers
/// `(os, arch)` even though `<version>` itself may contain hyphens (development
/// builds).
fn parse_artifact_file_name(file_name: &str) -> Option<(String, String, String, Extension)> {
    let rest = file_name.strip_prefix("zls-")?;
    let (stem, extension) = [Extension::TarXz, Extension::TarGz, Extension::Zip]
        .into_iter()
        .find_map(|ext| rest.strip_suffix(&format!(".{ext}")).map(|stem| (stem, ext)))?;

    let mut parts = stem.splitn(2, '-');
    let os = parts.next()?.to_string();
    let arch_and_version = parts.next()?;
    let (arch, version) = arch_and_version.split_once('-')?;
    if arch.is_empty() || version.is_empty() {
        return None;
    }
    Some((os.to_string(), arch.to_string(), version.to_string(), extension))
}

fn check_extension_groups(artifacts: &[ReleaseArtifact]) -> Result<(), PublishError> {
    let mut groups: BTreeMap<(String, String, String), BTreeSet<Extension>> = BTreeMap::new();
    for artifact in artifacts {
        groups
            .entry((artifact.os.clone(), artifact.arch.clone(), artifact.version.clone()))
            .or_default()
            .insert(artifact.extension);
    }
    for ((os, arch, version), found) in groups {
        let expected: &[&str] = if os == "windows" { &["zip"] } else { &["tar.xz", "tar.gz"] };
        let found_set: BTreeSet<&str> = found.iter().map(Extension::as_str).collect();
        let expected_set: BTreeSet<&str> = expected.iter().copied().collect();
        if found_set != expected_set {
            return Err(PublishError::ExtensionSetMismatch {
                os,
                arch,
                version,
                found: found.iter().map(|e| e.as_str().to_string()).collect(),
                expected,
            });
        }
    }
    Ok(())
}

fn check_minisign(artifacts: &BTreeMap<String, ArtifactUpload>, force_minisign: bool) -> Result<bool, PublishError> {
    if artifacts.is_empty() {
        return Ok(false);
    }
    let signed = artifacts.values().filter(|a| a.has_signature).count();
    if force_minisign && signed != artifacts.len() {
        let missing = artifacts
            .iter()
            .find(|(_, a)| !a.has_signature)
            .map(|(name, _)| name.clone())
            .unwrap_or_default();
        return Err(PublishError::MissingMinisign(missing));
    }
    if signed != 0 && signed != artifacts.len() {
        return Err(PublishError::PartialMinisign);
    }
    Ok(signed == artifacts.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryReleaseStore;

    fn upload(shasum: &str, size: u64) -> ArtifactUpload {
        ArtifactUpload { shasum: shasum.to_string(), size, has_signature: false }
    }

    fn tagged_request(version: &str) -> PublishRequest {
        let mut artifacts = BTreeMap::new();
        artifacts.insert(format!("zls-linux-x86_64-{version}.tar.xz"), upload(&"a".repeat(64), 10));
        artifacts.insert(format!("zls-linux-x86_64-{version}.tar.gz"), upload(&"a".repeat(64), 10));
        artifacts.insert(format!("zls-windows-x86_64-{version}.zip"), upload(&"a".repeat(64), 10));
        PublishRequest {
            zls_version: version.to_string(),
            zig_version: version.to_string(),
            minimum_build_zig_version: version.to_string(),
            minimum_runtime_zig_version: version.to_string(),
            compatibility: "full".to_string(),
            artifacts,
        }
    }

    #[tokio::test]
    async fn accepts_well_formed_tagged_publish() {
        let store = InMemoryReleaseStore::new();
        let validated = validate(&store, &tagged_request("0.1.0"), false).await.unwrap();
        assert_eq!(validated.artifacts.len(), 3);
        assert_eq!(validated.compatibility, Compatibility::Full);
    }

    #[tokio::test]
    async fn rejects_missing_tar_gz() {
        let store = InMemoryReleaseStore::new();
        let mut request = tagged_request("0.1.0");
        request.artifacts.remove("zls-linux-x86_64-0.1.0.tar.gz");
        let err = validate(&store, &request, false).await.unwrap_err();
        assert!(matches!(err, PublishError::ExtensionSetMismatch { .. }));
    }

    #[tokio::test]
    async fn rejects_nonzero_major() {
        let store = InMemoryReleaseStore::new();
        let request = tagged_request("1.0.0");
        assert!(matches!(validate(&store, &request, false).await.unwrap_err(), PublishError::NonZeroMajor));
    }

    #[tokio::test]
    async fn rejects_conflicting_dev_commit() {
        let store = InMemoryReleaseStore::new();
        let mut artifacts = BTreeMap::new();
        artifacts.insert("zls-linux-x86_64-0.13.0-dev.1+aaaaaaa.tar.xz".to_string(), upload(&"a".repeat(64), 1));
        artifacts.insert("zls-linux-x86_64-0.13.0-dev.1+aaaaaaa.tar.gz".to_string(), upload(&"a".repeat(64), 1));
        let first = PublishRequest {
            zls_version: "0.13.0-dev.1+aaaaaaa".to_string(),
            zig_version: "0.13.0-dev.1+aaaaaaa".to_string(),
            minimum_build_zig_version: "0.13.0-dev.1+aaaaaaa".to_string(),
            minimum_runtime_zig_version: "0.13.0-dev.1+aaaaaaa".to_string(),
            compatibility: "full".to_string(),
            artifacts,
        };
        let validated = validate(&store, &first, false).await.unwrap();
        let record = crate::types::ReleaseRecord {
            zls_version: first.zls_version.clone(),
            zig_version: first.zig_version.clone(),
            minimum_build_zig_version: first.minimum_build_zig_version.clone(),
            minimum_runtime_zig_version: first.minimum_runtime_zig_version.clone(),
            date: 0,
            artifacts: validated.artifacts,
            tested_zig_versions: Default::default(),
            minisign: None,
        };
        store.upsert_and_patch(&record, &first.zig_version, Compatibility::Full).await.unwrap();

        let mut second = first.clone();
        second.zls_version = "0.13.0-dev.1+bbbbbbb".to_string();
        second.zig_version = second.zls_version.clone();
        let mut artifacts2 = BTreeMap::new();
        artifacts2.insert("zls-linux-x86_64-0.13.0-dev.1+bbbbbbb.tar.xz".to_string(), upload(&"a".repeat(64), 1));
        artifacts2.insert("zls-linux-x86_64-0.13.0-dev.1+bbbbbbb.tar.gz".to_string(), upload(&"a".repeat(64), 1));
        second.artifacts = artifacts2;

        let err = validate(&store, &second, false).await.unwrap_err();
        assert!(matches!(err, PublishError::ConflictingDevCommit { major: 0, minor: 13, commit_height: 1 }));
    }

    #[tokio::test]
    async fn rejects_failed_build_with_no_prior_record() {
        let store = InMemoryReleaseStore::new();
        let request = PublishRequest {
            zls_version: "0.13.0".to_string(),
            zig_version: "0.13.0".to_string(),
            minimum_build_zig_version: "0.13.0".to_string(),
            minimum_runtime_zig_version: "0.13.0".to_string(),
            compatibility: "none".to_string(),
            artifacts: BTreeMap::new(),
        };
        let err = validate(&store, &request, false).await.unwrap_err();
        assert!(matches!(err, PublishError::FailedBuildNotUpdatable(_)));
    }

    #[tokio::test]
    async fn rejects_partial_minisign() {
        let store = InMemoryReleaseStore::new();
        let mut request = tagged_request("0.1.0");
        request.artifacts.get_mut("zls-linux-x86_64-0.1.0.tar.xz").unwrap().has_signature = true;
        let err = validate(&store, &request, false).await.unwrap_err();
        assert!(matches!(err, PublishError::PartialMinisign));
    }
}
