//! Version catalog configuration.
//!
//! The catalog is an immutable value built once at startup and handed to a
//! [`VersionNegotiator`](crate::negotiation::VersionNegotiator). A host
//! application can load it from its own configuration file:
//!
//! ```rust
//! use uma::config::VersionCatalog;
//!
//! let catalog = VersionCatalog::from_json(br#"{"current":"1.0","backcompatVersions":["0.3"]}"#)?;
//! assert_eq!(catalog.current().to_string(), "1.0");
//! # Ok::<(), uma::UmaError>(())
//! ```

use serde::{Deserialize, Serialize};

use crate::UmaError;
use crate::proto::{BACKCOMPAT_VERSIONS, Version};

/// The protocol versions this VASP supports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionCatalog {
    /// The newest version, used for its own major version.
    #[serde(default = "current_version")]
    current: Version,
    /// Older `major.minor` versions still accepted, one per major version.
    ///
    /// Order matters: lookups take the first entry with a matching major.
    /// Entries that do not parse are skipped.
    #[serde(default = "backcompat_versions")]
    backcompat_versions: Vec<String>,
}

const fn current_version() -> Version {
    Version::CURRENT
}

fn backcompat_versions() -> Vec<String> {
    BACKCOMPAT_VERSIONS.iter().map(|v| (*v).to_owned()).collect()
}

impl Default for VersionCatalog {
    fn default() -> Self {
        Self {
            current: current_version(),
            backcompat_versions: backcompat_versions(),
        }
    }
}

impl VersionCatalog {
    /// Creates a catalog from a current version and a backward-compatibility list.
    pub fn new<I, S>(current: Version, backcompat_versions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            current,
            backcompat_versions: backcompat_versions.into_iter().map(Into::into).collect(),
        }
    }

    /// Loads a catalog from JSON. Missing keys fall back to the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`UmaError::Json`] if the document is malformed or `current`
    /// is not a valid version.
    pub fn from_json(data: &[u8]) -> Result<Self, UmaError> {
        Ok(serde_json::from_slice(data)?)
    }

    /// The newest supported version.
    #[must_use]
    pub const fn current(&self) -> Version {
        self.current
    }

    /// The configured backward-compatibility versions, unparsed.
    #[must_use]
    pub fn backcompat_versions(&self) -> &[String] {
        &self.backcompat_versions
    }

    /// The parseable backward-compatibility versions, in configured order.
    pub fn parsed_backcompat_versions(&self) -> impl Iterator<Item = Version> + '_ {
        self.backcompat_versions.iter().filter_map(|v| v.parse().ok())
    }
}
