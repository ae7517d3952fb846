//! The unit of storage: a single ZLS version's release record.

use super::{Compatibility, ReleaseArtifact, Version};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The stored metadata for a single published ZLS version, keyed by its version string.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleaseRecord {
    pub zls_version: String,
    pub zig_version: String,
    pub minimum_build_zig_version: String,
    pub minimum_runtime_zig_version: String,
    /// Milliseconds since the epoch; timestamp of first publish.
    pub date: i64,
    /// Possibly empty, meaning "failed build".
    pub artifacts: Vec<ReleaseArtifact>,
    /// Zig-version string -> compatibility observed in CI.
    pub tested_zig_versions: BTreeMap<String, Compatibility>,
    /// Whether signature files accompany the artifacts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minisign: Option<bool>,
}

impl ReleaseRecord {
    pub fn zls_version_parsed(&self) -> Version {
        Version::parse(&self.zls_version).expect("stored zlsVersion is always valid")
    }

    pub fn zig_version_parsed(&self) -> Version {
        Version::parse(&self.zig_version).expect("stored zigVersion is always valid")
    }

    pub fn minimum_build_zig_version_parsed(&self) -> Version {
        Version::parse(&self.minimum_build_zig_version).expect("stored minimum is always valid")
    }

    pub fn minimum_runtime_zig_version_parsed(&self) -> Version {
        Version::parse(&self.minimum_runtime_zig_version).expect("stored minimum is always valid")
    }

    /// `effectiveMinimum(r, c)`.
    pub fn effective_minimum(&self, compatibility: super::RequestedCompatibility) -> Version {
        match compatibility {
            super::RequestedCompatibility::Full => {
                self.minimum_build_zig_version_parsed().max(self.minimum_runtime_zig_version_parsed())
            }
            super::RequestedCompatibility::OnlyRuntime => self.minimum_runtime_zig_version_parsed(),
        }
    }

    /// Parses `tested_zig_versions` into a sorted sequence of
    /// `(version, success)` pairs under the requested compatibility regime, per §4.4.2
    /// Phase D.
    pub fn tested_sorted(&self, requested: super::RequestedCompatibility) -> Vec<(Version, bool)> {
        let mut tested: Vec<(Version, bool)> = self
            .tested_zig_versions
            .iter()
            .filter_map(|(zig, compat)| {
                let version = Version::parse(zig)?;
                let success = match compat {
                    Compatibility::None => false,
                    Compatibility::Full => true,
                    Compatibility::OnlyRuntime => {
                        matches!(requested, super::RequestedCompatibility::OnlyRuntime)
                    }
                };
                Some((version, success))
            })
            .collect();
        tested.sort_by(|a, b| a.0.cmp(&b.0));
        tested
    }
}
