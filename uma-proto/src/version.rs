//! Protocol version type.
//!
//! Provides [`Version`], a `major.minor` pair that serializes as the string
//! `"major.minor"` and orders lexicographically with the major part dominant.

use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use std::fmt;
use std::str::FromStr;

/// Major version of the protocol implemented by this crate.
pub const MAJOR_VERSION: u32 = 1;

/// Minor version of the protocol implemented by this crate.
pub const MINOR_VERSION: u32 = 0;

/// The protocol version string implemented by this crate.
pub const UMA_PROTOCOL_VERSION: &str = "1.0";

/// Older versions this implementation can still speak, in preference order.
pub const BACKCOMPAT_VERSIONS: &[&str] = &["0.3"];

/// A `major.minor` protocol version.
///
/// Ordering compares `major` first and `minor` second.
///
/// # Serialization
///
/// Serializes to/from a dot-separated string: `"1.0"`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Version {
    major: u32,
    minor: u32,
}

impl Version {
    /// The version implemented by this crate.
    pub const CURRENT: Self = Self::new(MAJOR_VERSION, MINOR_VERSION);

    /// Creates a version from its components.
    #[must_use]
    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }

    /// Returns the major component.
    #[must_use]
    pub const fn major(&self) -> u32 {
        self.major
    }

    /// Returns the minor component.
    #[must_use]
    pub const fn minor(&self) -> u32 {
        self.minor
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Error returned when parsing an invalid version string.
///
/// A valid version is two non-negative decimal integers joined by a single
/// dot, written without sign, whitespace or leading zeros.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid version format {0:?}")]
pub struct VersionFormatError(String);

impl VersionFormatError {
    /// Returns the rejected input.
    #[must_use]
    pub fn input(&self) -> &str {
        &self.0
    }
}

fn parse_component(s: &str) -> Option<u32> {
    let canonical = !s.is_empty()
        && s.bytes().all(|b| b.is_ascii_digit())
        && (s == "0" || !s.starts_with('0'));
    if canonical { s.parse().ok() } else { None }
}

impl FromStr for Version {
    type Err = VersionFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (major, minor) = s
            .split_once('.')
            .ok_or_else(|| VersionFormatError(s.into()))?;
        match (parse_component(major), parse_component(minor)) {
            (Some(major), Some(minor)) => Ok(Self { major, minor }),
            _ => Err(VersionFormatError(s.into())),
        }
    }
}

impl Serialize for Version {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Version {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::from_str(&s).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_current_matches_protocol_string() {
        assert_eq!(Version::CURRENT.to_string(), UMA_PROTOCOL_VERSION);
        assert_eq!(
            UMA_PROTOCOL_VERSION.parse::<Version>().unwrap(),
            Version::CURRENT
        );
    }

    #[test]
    fn test_parse_inverts_format() {
        for (major, minor) in [(0, 0), (0, 3), (1, 0), (7, 12), (u32::MAX, u32::MAX)] {
            let version = Version::new(major, minor);
            assert_eq!(version.to_string().parse::<Version>().unwrap(), version);
        }
    }

    #[test]
    fn test_parse_rejects_other_shapes() {
        for input in [
            "", "1", "1.", ".1", "1.0.0", "a.b", "1.x", "-1.0", "+1.0", " 1.0", "1.0 ", "01.0",
            "1.00", "1,0", "4294967296.0",
        ] {
            assert!(input.parse::<Version>().is_err(), "accepted {input:?}");
        }
    }

    #[test]
    fn test_ordering_is_major_dominant() {
        assert!(Version::new(1, 0) > Version::new(0, 9));
        assert!(Version::new(1, 2) > Version::new(1, 1));
        assert!(Version::new(0, 3) < Version::new(1, 0));
    }

    #[test]
    fn test_version_serde() {
        let serialized = serde_json::to_string(&Version::new(0, 3)).unwrap();
        assert_eq!(serialized, "\"0.3\"");
        let version: Version = serde_json::from_str("\"1.0\"").unwrap();
        assert_eq!(version, Version::CURRENT);
        assert!(serde_json::from_str::<Version>("\"1\"").is_err());
    }
}
