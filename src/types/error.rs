//! Error taxonomy. Each concern gets its own `thiserror` enum, mirroring how
//! `zv`'s `ZvError`/`NetErr`/`CfgErr` split the failure space instead of a single
//! catch-all; a top-level [`ServiceError`] unifies them at the HTTP boundary.

use thiserror::Error;

/// Why a publish request was rejected. Surfaces as HTTP 400 (or 418 for
/// [`PublishError::NonZeroMajor`]) per the error table in the spec.
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("field '{field}' is not a valid version")]
    InvalidVersionField { field: &'static str },

    #[error("compatibility must be one of none, only-runtime, full")]
    InvalidCompatibility,

    #[error("artifact file name '{0}' does not match zls-<os>-<arch>-<version>.(tar.xz|tar.gz|zip)")]
    ArtifactNaming(String),

    #[error("artifact '{artifact}' version '{found}' does not match zlsVersion '{expected}'")]
    ArtifactVersionMismatch { artifact: String, found: String, expected: String },

    #[error("artifact '{0}' has an invalid shasum (must be 64 lowercase hex chars)")]
    ArtifactShasumShape(String),

    #[error("artifact '{0}' has a non-positive size")]
    ArtifactEmptySize(String),

    #[error("artifact group ({os}, {arch}, {version}) has extension set {found:?}, expected {expected:?}")]
    ExtensionSetMismatch {
        os: String,
        arch: String,
        version: String,
        found: Vec<String>,
        expected: Vec<&'static str>,
    },

    #[error("zlsVersion {zls_version} is tagged, so zigVersion must be tagged, compatibility must be full, and artifacts must be non-empty")]
    TaggedWithoutArtifacts { zls_version: String },

    #[error("development zlsVersion {0} must have patch == 0")]
    DevPatchNonzero(String),

    #[error("ZLS major version must be 0")]
    NonZeroMajor,

    #[error("artifacts must be empty iff compatibility is none")]
    CompatibilityMismatch,

    #[error("zlsVersion {0} has no prior record, so a first publish must carry artifacts")]
    FailedBuildNotUpdatable(String),

    #[error("(major={major}, minor={minor}, commitHeight={commit_height}) is already published with a different commitId")]
    ConflictingDevCommit { major: u64, minor: u64, commit_height: u64 },

    #[error("artifact signature presence must be all-or-nothing across the artifact set")]
    PartialMinisign,

    #[error("forceMinisign is set but artifact '{0}' has no accompanying signature")]
    MissingMinisign(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error")]
    Database(#[source] sqlx::Error),

    #[error("stored release record failed to deserialize")]
    Corrupt(#[source] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum BlobError {
    #[error("blob I/O error writing '{key}'")]
    Io { key: String, #[source] source: std::io::Error },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} is not configured")]
    Missing(&'static str),
}

/// Unifies the above at the HTTP boundary. See `http::error` for the
/// `IntoResponse` mapping (spec.md §7).
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Publish(#[from] PublishError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Blob(#[from] BlobError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("release record produced an invalid manifest")]
    Manifest(#[from] crate::manifest::ManifestError),

    #[error("missing or invalid query parameter '{0}'")]
    BadQuery(&'static str),

    #[error("malformed Authorization header")]
    MalformedAuth,

    #[error("invalid credentials")]
    Unauthorized,
}
