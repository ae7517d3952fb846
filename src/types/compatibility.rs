//! How a (ZLS build, Zig version) pair behaved in CI.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Compatibility {
    /// Incompatible.
    None,
    /// Could not be built from source with that Zig, but the pre-built binary runs.
    OnlyRuntime,
    /// Could be built with that Zig and ran against it.
    Full,
}

/// The subset of [`Compatibility`] a client may request when selecting a build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestedCompatibility {
    OnlyRuntime,
    Full,
}

impl std::str::FromStr for RequestedCompatibility {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "only-runtime" => Ok(Self::OnlyRuntime),
            "full" => Ok(Self::Full),
            _ => Err(()),
        }
    }
}
