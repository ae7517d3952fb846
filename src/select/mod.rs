//! The read path: given a client's Zig version and requested compatibility,
//! return the release record they should use, or a typed failure code.

mod enclosed;

pub use enclosed::is_version_enclosed_in_failure;

use crate::store::ReleaseStore;
use crate::types::{RequestedCompatibility, ReleaseRecord, StoreError, Version};

/// Mirrors the wire codes in spec.md §6.1 exactly (0–3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureCode {
    /// The Zig version predates even the oldest known support floor.
    Unsupported = 0,
    /// No ZLS builds exist for this release cycle yet.
    DevelopmentBuildUnsupported = 1,
    /// Builds exist but none is compatible with this exact Zig nightly.
    DevelopmentBuildIncompatible = 2,
    /// ZLS for this tagged Zig minor has not been released.
    TaggedReleaseIncompatible = 3,
}

impl FailureCode {
    pub fn code(self) -> u8 {
        self as u8
    }
}

pub enum Selection {
    Selected(ReleaseRecord),
    Failed(FailureCode),
}

/// `selectVersion(zigVersion, compatibility) -> ReleaseRecord | FailureCode`.
pub async fn select_version(
    store: &dyn ReleaseStore,
    zig_version: &Version,
    compatibility: RequestedCompatibility,
) -> Result<Selection, StoreError> {
    if zig_version.is_tagged() {
        select_tagged_release(store, zig_version).await
    } else {
        select_development_build(store, zig_version, compatibility).await
    }
}

/// §4.4.1
async fn select_tagged_release(store: &dyn ReleaseStore, zig_version: &Version) -> Result<Selection, StoreError> {
    let by_minor = store.tagged_by_minor(zig_version.major, zig_version.minor).await?;
    if let Some(record) = by_minor.into_iter().next() {
        return Ok(Selection::Selected(record));
    }

    let oldest = store.all_tagged_asc().await?.into_iter().next();
    match oldest {
        Some(record) => {
            if record.minimum_runtime_zig_version_parsed() > *zig_version {
                Ok(Selection::Failed(FailureCode::Unsupported))
            } else {
                Ok(Selection::Failed(FailureCode::TaggedReleaseIncompatible))
            }
        }
        None => Ok(Selection::Failed(FailureCode::TaggedReleaseIncompatible)),
    }
}

/// §4.4.2, phases A–D.
async fn select_development_build(
    store: &dyn ReleaseStore,
    zig_version: &Version,
    compatibility: RequestedCompatibility,
) -> Result<Selection, StoreError> {
    // Phase A — candidate set.
    let dev = store.dev_by_minor(zig_version.major, zig_version.minor).await?;
    let dev_is_nonempty = !dev.is_empty();

    let candidates: Vec<ReleaseRecord> = if dev_is_nonempty {
        dev
    } else {
        // Handoff case: Zig bumped to the next dev cycle but ZLS hasn't shipped its
        // first dev build for it yet — the latest tagged release may still work.
        store.all_tagged_desc().await?.into_iter().next().into_iter().collect()
    };

    if candidates.is_empty() {
        return Ok(Selection::Failed(FailureCode::DevelopmentBuildUnsupported));
    }

    // Phase B — support floor. If dev builds exist for this cycle, a Zig version
    // below the oldest one's floor simply predates support (Unsupported); if we
    // got here via the tagged handoff (no dev builds published yet this cycle),
    // that absence of builds is itself the failure (DevelopmentBuildUnsupported).
    let floor = candidates[0].effective_minimum(compatibility);
    if *zig_version < floor {
        return Ok(Selection::Failed(if dev_is_nonempty {
            FailureCode::Unsupported
        } else {
            FailureCode::DevelopmentBuildUnsupported
        }));
    }

    // Phase C — pick newest admissible release. Minima are not required to be
    // monotonic with commitHeight, so the whole candidate list is scanned.
    let mut selected = &candidates[0];
    for candidate in &candidates {
        let minimum = candidate.effective_minimum(compatibility);
        if *zig_version >= minimum {
            selected = candidate;
        }
    }

    // Phase D — enclosed-in-failure check.
    let tested = selected.tested_sorted(compatibility);
    if is_version_enclosed_in_failure(&tested, zig_version) {
        Ok(Selection::Failed(FailureCode::DevelopmentBuildIncompatible))
    } else {
        Ok(Selection::Selected(selected.clone()))
    }
}
