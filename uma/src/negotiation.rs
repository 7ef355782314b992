//! Protocol version negotiation.
//!
//! Two VASPs converge on one `major.minor` version per handshake. The sender
//! states a preference in its capability request; the receiver answers with
//! the lower of that preference and its own current version. When the
//! receiver rejects a major version outright, the sender reads the
//! receiver's supported majors from the error body and retries with
//! [`VersionNegotiator::select_highest_mutual`].

use serde::Deserialize;
use std::collections::BTreeSet;

use crate::config::VersionCatalog;
use crate::error::{UmaError, UnsupportedVersionError};
use crate::proto::{Version, VersionFormatError};

/// Picks protocol versions against a [`VersionCatalog`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VersionNegotiator {
    catalog: VersionCatalog,
}

impl VersionNegotiator {
    /// Creates a negotiator over the given catalog.
    #[must_use]
    pub const fn new(catalog: VersionCatalog) -> Self {
        Self { catalog }
    }

    /// The catalog this negotiator consults.
    #[must_use]
    pub const fn catalog(&self) -> &VersionCatalog {
        &self.catalog
    }

    /// The current major version plus the major of every parseable
    /// backward-compatibility entry.
    #[must_use]
    pub fn supported_major_versions(&self) -> BTreeSet<u32> {
        std::iter::once(self.catalog.current().major())
            .chain(self.catalog.parsed_backcompat_versions().map(|v| v.major()))
            .collect()
    }

    /// The version to use when the counterparty speaks major version `major`.
    ///
    /// Returns the current version for the current major. Otherwise returns
    /// the first backward-compatibility entry with that major, even if a later
    /// entry has a higher minor.
    #[must_use]
    pub fn highest_version_for_major(&self, major: u32) -> Option<Version> {
        let current = self.catalog.current();
        if major == current.major() {
            return Some(current);
        }
        self.catalog
            .parsed_backcompat_versions()
            .find(|v| v.major() == major)
    }

    /// Picks the version for the highest major version both sides support.
    ///
    /// Counterparty majors this VASP does not support are ignored. A later
    /// entry replaces the running choice only if its major is strictly greater,
    /// so duplicates keep the first match. Returns `None` if nothing is shared.
    #[must_use]
    pub fn select_highest_mutual(&self, counterparty_majors: &[u32]) -> Option<Version> {
        let supported = self.supported_major_versions();
        let mut highest: Option<Version> = None;
        for &major in counterparty_majors {
            if !supported.contains(&major) {
                continue;
            }
            if highest.is_none_or(|h| major > h.major()) {
                highest = self.highest_version_for_major(major);
            }
        }
        #[cfg(feature = "telemetry")]
        if highest.is_none() {
            tracing::debug!(
                ?counterparty_majors,
                supported = ?supported,
                "uma.negotiation.no_mutual_major_version"
            );
        }
        highest
    }

    /// Returns `true` if `version` parses and its major version is supported.
    #[must_use]
    pub fn is_supported(&self, version: &str) -> bool {
        version
            .parse::<Version>()
            .is_ok_and(|v| self.supported_major_versions().contains(&v.major()))
    }

    /// Builds the error a receiver returns for an unsupported version.
    #[must_use]
    pub fn unsupported_version_error(&self, version: impl Into<String>) -> UnsupportedVersionError {
        UnsupportedVersionError {
            unsupported_version: version.into(),
            supported_major_versions: self.supported_major_versions().into_iter().collect(),
        }
    }
}

/// Returns the lower of two version strings.
///
/// # Errors
///
/// Returns [`VersionFormatError`] if either string is not a valid version.
pub fn select_lower(v1: &str, v2: &str) -> Result<Version, VersionFormatError> {
    let v1: Version = v1.parse()?;
    let v2: Version = v2.parse()?;
    Ok(v1.min(v2))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UnsupportedVersionBody {
    #[serde(default)]
    supported_major_versions: String,
}

/// Reads the counterparty's supported major versions from an unsupported-version
/// error response body such as `{"supportedMajorVersions":"0,1"}`.
///
/// # Errors
///
/// Returns [`UmaError::Json`] if the body is not a JSON object, or
/// [`UmaError::InvalidErrorResponse`] if any entry is not an integer.
pub fn supported_major_versions_from_error_body(body: &[u8]) -> Result<Vec<u32>, UmaError> {
    let body: UnsupportedVersionBody = serde_json::from_slice(body)?;
    body.supported_major_versions
        .split(',')
        .map(|major| {
            major.parse().map_err(|_| {
                UmaError::InvalidErrorResponse(format!(
                    "supportedMajorVersions entry {major:?} is not an integer"
                ))
            })
        })
        .collect()
}
