//! Unix timestamp type for signed protocol messages.
//!
//! Every signed message carries a `(nonce, timestamp)` pair. The timestamp is
//! the moment the signer produced the message and is part of the signed bytes,
//! so it must render identically on both sides.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::num::ParseIntError;
use std::str::FromStr;
use std::time::SystemTime;

/// A Unix timestamp representing seconds since the Unix epoch (1970-01-01T00:00:00Z).
///
/// # Serialization
///
/// Serialized as a bare JSON integer, matching the `signatureTimestamp` and
/// `expirationTimestamp` wire fields.
///
/// ```json
/// 1700000000
/// ```
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Ord, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnixTimestamp(u64);

impl Display for UnixTimestamp {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for UnixTimestamp {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<u64>().map(Self)
    }
}

impl From<u64> for UnixTimestamp {
    fn from(secs: u64) -> Self {
        Self(secs)
    }
}

impl UnixTimestamp {
    /// Creates a new [`UnixTimestamp`] from a raw seconds value.
    #[must_use]
    pub const fn from_secs(secs: u64) -> Self {
        Self(secs)
    }

    /// Returns the current system time as a [`UnixTimestamp`].
    ///
    /// # Panics
    ///
    /// Panics if the system clock is set to a time before the Unix epoch,
    /// which should never happen on properly configured systems.
    #[must_use]
    pub fn now() -> Self {
        let now = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .expect("SystemTime before UNIX epoch?!?")
            .as_secs();
        Self(now)
    }

    /// Returns the timestamp as raw seconds since the Unix epoch.
    #[must_use]
    pub const fn as_secs(&self) -> u64 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_serializes_as_integer() {
        let ts = UnixTimestamp::from_secs(1_700_000_000);
        assert_eq!(serde_json::to_string(&ts).unwrap(), "1700000000");
        let parsed: UnixTimestamp = serde_json::from_str("1700000000").unwrap();
        assert_eq!(parsed, ts);
    }

    #[test]
    fn test_timestamp_rejects_string_and_negative() {
        assert!(serde_json::from_str::<UnixTimestamp>("\"1700000000\"").is_err());
        assert!(serde_json::from_str::<UnixTimestamp>("-1").is_err());
    }

    #[test]
    fn test_timestamp_from_str() {
        assert_eq!(
            "42".parse::<UnixTimestamp>().unwrap(),
            UnixTimestamp::from_secs(42)
        );
        assert!("4x2".parse::<UnixTimestamp>().is_err());
    }
}
