//! A downloadable compressed build for one (os, arch).

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Extension {
    #[serde(rename = "tar.xz")]
    TarXz,
    #[serde(rename = "tar.gz")]
    TarGz,
    Zip,
}

impl Extension {
    pub fn as_str(&self) -> &'static str {
        match self {
            Extension::TarXz => "tar.xz",
            Extension::TarGz => "tar.gz",
            Extension::Zip => "zip",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "tar.xz" => Some(Extension::TarXz),
            "tar.gz" => Some(Extension::TarGz),
            "zip" => Some(Extension::Zip),
            _ => None,
        }
    }
}

impl fmt::Display for Extension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `{os, arch, version, extension, fileShasum, fileSize}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseArtifact {
    pub os: String,
    pub arch: String,
    /// The ZLS version this artifact was built for, as a string (must equal
    /// the owning [`ReleaseRecord::zls_version`] when non-empty per invariant I1).
    pub version: String,
    pub extension: Extension,
    /// 64 lowercase hex chars (32 bytes).
    pub file_shasum: String,
    pub file_size: u64,
}

impl ReleaseArtifact {
    pub fn file_name(&self) -> String {
        format!("zls-{}-{}-{}.{}", self.os, self.arch, self.version, self.extension)
    }

    /// The file-name layout flips at ZLS 0.15.0: `zls-<arch>-<os>-<version>.<ext>`
    /// instead of `zls-<os>-<arch>-<version>.<ext>`. The manifest key `<arch>-<os>`
    /// is unaffected either way.
    pub fn file_name_for(&self, zls_version: &crate::types::Version) -> String {
        if flips_target_order(zls_version) {
            format!("zls-{}-{}-{}.{}", self.arch, self.os, self.version, self.extension)
        } else {
            self.file_name()
        }
    }

    pub fn manifest_key(&self) -> String {
        format!("{}-{}", self.arch, self.os)
    }
}

/// ZLS versions at or above 0.15.0 use `<arch>-<os>` in the file name; below that,
/// `<os>-<arch>`. Development builds for the 0.15 cycle (or later) flip too.
pub fn flips_target_order(zls_version: &crate::types::Version) -> bool {
    (zls_version.major, zls_version.minor) >= (0, 15)
}

pub fn is_valid_shasum(s: &str) -> bool {
    s.len() == 64 && s.bytes().all(|b| b.is_ascii_hexdigit() && !b.is_ascii_uppercase())
}
