//! The ZLS/Zig semver dialect: `MAJOR.MINOR.PATCH` or `MAJOR.MINOR.PATCH-dev.HEIGHT+COMMITID`.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// The development-build suffix: `-dev.<commitHeight>+<commitId>`.
#[derive(Debug, Clone)]
pub struct DevSuffix {
    pub commit_height: u64,
    pub commit_id: String,
}

/// A parsed ZLS/Zig version: either tagged (`0.12.0`) or a development build
/// (`0.12.0-dev.7+aaaaaaaaa`).
///
/// `commit_id` never participates in ordering or equality; only
/// `(major, minor, patch, commit_height)` do, and a tagged version always
/// outranks a development version with the same `(major, minor, patch)`.
#[derive(Debug, Clone)]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
    pub dev: Option<DevSuffix>,
}

impl Version {
    pub fn tagged(major: u64, minor: u64, patch: u64) -> Self {
        Self { major, minor, patch, dev: None }
    }

    pub fn dev(major: u64, minor: u64, patch: u64, commit_height: u64, commit_id: impl Into<String>) -> Self {
        Self {
            major,
            minor,
            patch,
            dev: Some(DevSuffix { commit_height, commit_id: commit_id.into() }),
        }
    }

    /// `isTagged(v) -> bool`
    pub fn is_tagged(&self) -> bool {
        self.dev.is_none()
    }

    /// Parses exactly `MAJOR.MINOR.PATCH` or `MAJOR.MINOR.PATCH-dev.HEIGHT+COMMITID`.
    /// Any other shape, or a numeric field that doesn't fit `u64`, returns `None`.
    pub fn parse(s: &str) -> Option<Self> {
        let (triple, rest) = match s.split_once('-') {
            Some((triple, rest)) => (triple, Some(rest)),
            None => (s, None),
        };

        let mut parts = triple.splitn(3, '.');
        let major = parts.next()?;
        let minor = parts.next()?;
        let patch = parts.next()?;
        if parts.next().is_some() {
            return None;
        }
        let major = parse_numeric_field(major)?;
        let minor = parse_numeric_field(minor)?;
        let patch = parse_numeric_field(patch)?;

        let dev = match rest {
            None => None,
            Some(rest) => {
                let rest = rest.strip_prefix("dev.")?;
                let (height, commit_id) = rest.split_once('+')?;
                let commit_height = parse_numeric_field(height)?;
                if !is_valid_commit_id(commit_id) {
                    return None;
                }
                Some(DevSuffix { commit_height, commit_id: commit_id.to_string() })
            }
        };

        Some(Self { major, minor, patch, dev })
    }

    /// `format(v) -> string` — round-trips `parse` for every valid input.
    pub fn format(&self) -> String {
        match &self.dev {
            None => format!("{}.{}.{}", self.major, self.minor, self.patch),
            Some(dev) => format!(
                "{}.{}.{}-dev.{}+{}",
                self.major, self.minor, self.patch, dev.commit_height, dev.commit_id
            ),
        }
    }

    /// `compare(a, b) -> {LT, EQ, GT}` per the ordering rules in the data model:
    /// lexicographic on `(major, minor, patch)`; for equal triples a tagged version
    /// outranks any development version; between two development versions, order by
    /// `commitHeight` alone.
    pub fn compare(&self, other: &Self) -> Ordering {
        (self.major, self.minor, self.patch)
            .cmp(&(other.major, other.minor, other.patch))
            .then_with(|| match (&self.dev, &other.dev) {
                (None, None) => Ordering::Equal,
                (None, Some(_)) => Ordering::Greater,
                (Some(_), None) => Ordering::Less,
                (Some(a), Some(b)) => a.commit_height.cmp(&b.commit_height),
            })
    }
}

fn parse_numeric_field(s: &str) -> Option<u64> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    // Reject leading zeros other than a bare "0", matching semver-style strictness.
    if s.len() > 1 && s.starts_with('0') {
        return None;
    }
    s.parse::<u64>().ok()
}

fn is_valid_commit_id(s: &str) -> bool {
    (7..=9).contains(&s.len()) && s.bytes().all(|b| b.is_ascii_hexdigit() && !b.is_ascii_uppercase())
}

impl FromStr for Version {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Version::parse(s).ok_or(())
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format())
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.compare(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.compare(other))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.compare(other)
    }
}

impl Serialize for Version {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.format())
    }
}

impl<'de> Deserialize<'de> for Version {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Version::parse(&s).ok_or_else(|| serde::de::Error::custom(format!("invalid version: {s}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_tagged() {
        let v = Version::parse("0.12.0").unwrap();
        assert!(v.is_tagged());
        assert_eq!((v.major, v.minor, v.patch), (0, 12, 0));
    }

    #[test]
    fn parses_dev() {
        let v = Version::parse("0.12.0-dev.7+aaaaaaaaa").unwrap();
        assert!(!v.is_tagged());
        let dev = v.dev.unwrap();
        assert_eq!(dev.commit_height, 7);
        assert_eq!(dev.commit_id, "aaaaaaaaa");
    }

    #[test]
    fn rejects_malformed() {
        assert!(Version::parse("0.12").is_none());
        assert!(Version::parse("0.12.0.1").is_none());
        assert!(Version::parse("0.12.0-dev.7").is_none());
        assert!(Version::parse("0.12.0-dev.7+aa").is_none()); // commit id too short
        assert!(Version::parse("0.12.0-dev.7+AAAAAAAAA").is_none()); // uppercase hex
        assert!(Version::parse("0.12.0-dev.abc+aaaaaaaaa").is_none());
        assert!(Version::parse("01.2.0").is_none()); // leading zero
        assert!(Version::parse("").is_none());
    }

    #[test]
    fn rejects_oversize_numeric_fields() {
        // 99999999999999999999 overflows u64
        assert!(Version::parse("99999999999999999999.0.0").is_none());
    }

    // P1: parse(format(v)) == v for every parseable v.
    #[test]
    fn round_trips() {
        for s in [
            "0.12.0",
            "0.13.0",
            "0.9.0-dev.3+aaaaaaaaa",
            "0.12.0-dev.1+deadbee",
        ] {
            let v = Version::parse(s).expect("parseable");
            assert_eq!(Version::parse(&v.format()).unwrap(), v);
            assert_eq!(v.format(), s);
        }
    }

    // P2 (partial, see select::enclosed tests for the rest): total order sample.
    #[test]
    fn orders_as_specified() {
        let a = Version::parse("0.12.0-dev.1+aaaaaaaaa").unwrap();
        let b = Version::parse("0.12.0-dev.5+aaaaaaaaa").unwrap();
        let c = Version::parse("0.12.0").unwrap();
        let d = Version::parse("0.13.0-dev.1+aaaaaaaaa").unwrap();
        assert!(a < b);
        assert!(b < c);
        assert!(c < d);
    }

    #[test]
    fn commit_id_is_not_ordered_or_compared() {
        let a = Version::parse("0.12.0-dev.5+aaaaaaaaa").unwrap();
        let b = Version::parse("0.12.0-dev.5+bbbbbbbbb").unwrap();
        assert_eq!(a.compare(&b), Ordering::Equal);
        assert_eq!(a, b);
    }
}
