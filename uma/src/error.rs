//! Error types for UMA negotiation, encoding and signing.
//!
//! Every fallible operation in this crate returns [`UmaError`]. Each variant
//! maps to a machine-readable [`ErrorReason`] that a VASP can put in its error
//! responses.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::proto::{AmountFieldError, ProtocolError, VersionFormatError};

/// Errors that can occur while handling UMA messages.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum UmaError {
    /// A version string is not of the form `major.minor`.
    #[error(transparent)]
    InvalidVersionFormat(#[from] VersionFormatError),

    /// The hybrid `amount` field of an invoice request is malformed.
    #[error(transparent)]
    InvalidAmountField(#[from] AmountFieldError),

    /// A receiver address is not of the form `user@domain`.
    #[error("Invalid receiver address {0:?}")]
    InvalidReceiverAddress(String),

    /// The counterparty asked for a version this VASP does not support.
    #[error(transparent)]
    UnsupportedVersion(#[from] UnsupportedVersionError),

    /// A field that is part of a signing payload is absent or empty.
    #[error("Missing signing field: {0}")]
    MissingSigningField(&'static str),

    /// A field that is part of a signing payload contains the `|` separator.
    #[error("Signing field {0} contains the payload separator")]
    AmbiguousSigningField(&'static str),

    /// A capability request URL does not have the expected shape.
    #[error("Invalid request URL: {0}")]
    InvalidRequestUrl(String),

    /// A query parameter could not be parsed.
    #[error("Invalid query parameter {name}: {value:?}")]
    InvalidQueryParameter {
        /// Name of the parameter.
        name: &'static str,
        /// The rejected value.
        value: String,
    },

    /// An error response body does not carry a valid `supportedMajorVersions` list.
    #[error("Invalid error response: {0}")]
    InvalidErrorResponse(String),

    /// A signature did not verify against the counterparty's signing key.
    #[error("Invalid signature")]
    InvalidSignature,

    /// The signing capability failed.
    #[error("Signer error: {0}")]
    Signer(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// A signature is not valid base64.
    #[error("Invalid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    /// A message is missing a field or carries an undecodable key.
    #[error(transparent)]
    Protocol(ProtocolError),

    /// JSON serialization or deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<ProtocolError> for UmaError {
    fn from(value: ProtocolError) -> Self {
        match value {
            ProtocolError::InvalidVersionFormat(e) => Self::InvalidVersionFormat(e),
            ProtocolError::InvalidAmountField(e) => Self::InvalidAmountField(e),
            ProtocolError::Json(e) => Self::Json(e),
            other => Self::Protocol(other),
        }
    }
}

impl UmaError {
    /// Returns the machine-readable reason code for this error.
    #[must_use]
    pub const fn reason(&self) -> ErrorReason {
        match self {
            Self::InvalidVersionFormat(_) => ErrorReason::InvalidVersionFormat,
            Self::InvalidAmountField(_) => ErrorReason::InvalidAmountField,
            Self::InvalidReceiverAddress(_) => ErrorReason::InvalidReceiverAddress,
            Self::UnsupportedVersion(_) => ErrorReason::UnsupportedVersion,
            Self::MissingSigningField(_) | Self::AmbiguousSigningField(_) => {
                ErrorReason::InvalidSigningPayload
            }
            Self::InvalidRequestUrl(_) | Self::InvalidQueryParameter { .. } => {
                ErrorReason::InvalidRequest
            }
            Self::InvalidSignature | Self::Base64(_) => ErrorReason::InvalidSignature,
            Self::InvalidErrorResponse(_) | Self::Protocol(_) | Self::Json(_) => {
                ErrorReason::InvalidFormat
            }
            Self::Signer(_) => ErrorReason::UnexpectedError,
        }
    }
}

/// The counterparty's preferred version has a major version this VASP does not support.
///
/// This ends the handshake attempt. The caller may retry with a version picked
/// from [`Self::supported_major_versions`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unsupported UMA version {unsupported_version}")]
pub struct UnsupportedVersionError {
    /// The version that was rejected.
    pub unsupported_version: String,
    /// Major versions the rejecting VASP supports, ascending.
    pub supported_major_versions: Vec<u32>,
}

impl UnsupportedVersionError {
    /// Renders the error response body a VASP returns for this error.
    ///
    /// `supportedMajorVersions` is a comma-separated string, the shape
    /// [`supported_major_versions_from_error_body`] reads.
    ///
    /// [`supported_major_versions_from_error_body`]: crate::negotiation::supported_major_versions_from_error_body
    #[must_use]
    pub fn to_response_body(&self) -> serde_json::Value {
        let majors = self
            .supported_major_versions
            .iter()
            .map(u32::to_string)
            .collect::<Vec<_>>()
            .join(",");
        serde_json::json!({
            "reason": ErrorReason::UnsupportedVersion,
            "supportedMajorVersions": majors,
            "unsupportedVersion": self.unsupported_version,
        })
    }
}

/// Machine-readable reason codes for UMA failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum ErrorReason {
    /// A version string is malformed.
    InvalidVersionFormat,
    /// The invoice request amount is malformed.
    InvalidAmountField,
    /// The receiver address is malformed.
    InvalidReceiverAddress,
    /// No mutually supported major version.
    UnsupportedVersion,
    /// A signing payload could not be built.
    InvalidSigningPayload,
    /// The request URL or its query is malformed.
    InvalidRequest,
    /// The signature is invalid.
    InvalidSignature,
    /// A message body is malformed.
    InvalidFormat,
    /// An unexpected error occurred.
    UnexpectedError,
}

impl ErrorReason {
    /// Returns the `snake_case` string representation matching the wire format.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidVersionFormat => "invalid_version_format",
            Self::InvalidAmountField => "invalid_amount_field",
            Self::InvalidReceiverAddress => "invalid_receiver_address",
            Self::UnsupportedVersion => "unsupported_version",
            Self::InvalidSigningPayload => "invalid_signing_payload",
            Self::InvalidRequest => "invalid_request",
            Self::InvalidSignature => "invalid_signature",
            Self::InvalidFormat => "invalid_format",
            Self::UnexpectedError => "unexpected_error",
        }
    }
}

impl fmt::Display for ErrorReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_reason_wire_names() {
        for reason in [
            ErrorReason::InvalidVersionFormat,
            ErrorReason::UnsupportedVersion,
            ErrorReason::InvalidSigningPayload,
            ErrorReason::UnexpectedError,
        ] {
            let json = serde_json::to_string(&reason).unwrap();
            assert_eq!(json, format!("\"{}\"", reason.as_str()));
        }
    }

    #[test]
    fn test_protocol_error_flattens_into_specific_kinds() {
        let amount_err = "1000.USD.EUR"
            .parse::<crate::proto::AmountField>()
            .unwrap_err();
        let err = UmaError::from(ProtocolError::from(amount_err));
        assert!(matches!(err, UmaError::InvalidAmountField(_)));
        assert_eq!(err.reason(), ErrorReason::InvalidAmountField);

        let err: UmaError = ProtocolError::MissingField("compliance").into();
        assert!(matches!(err, UmaError::Protocol(_)));
        assert_eq!(err.reason(), ErrorReason::InvalidFormat);
    }

    #[test]
    fn test_unsupported_version_response_body() {
        let err = UnsupportedVersionError {
            unsupported_version: "2.0".into(),
            supported_major_versions: vec![0, 1],
        };
        let body = err.to_response_body();
        assert_eq!(body["reason"], "unsupported_version");
        assert_eq!(body["supportedMajorVersions"], "0,1");
        assert_eq!(body["unsupportedVersion"], "2.0");
        assert_eq!(
            UmaError::from(err).to_string(),
            "Unsupported UMA version 2.0"
        );
    }
}
