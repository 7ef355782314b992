//! Wire format types for the Universal Money Address (UMA) protocol.
//!
//! This crate defines the serialization-level data structures exchanged by
//! two VASPs during an UMA payment: capability discovery, invoice request and
//! response, public key discovery and the post-transaction callback. It has
//! minimal dependencies and is shared by everything built on top of it.
//!
//! Every message that UMA extends over plain LNURL comes in two forms:
//!
//! - a loose form (e.g. [`LnurlpResponse`]) where the UMA fields are optional,
//!   which is what legacy peers send and what the wire format describes;
//! - a strict form (e.g. [`UmaLnurlpResponse`]) where they are required.
//!
//! The strict form is obtained with `upgrade()` (returns `None` for a legacy
//! message) or `TryFrom` (names the missing field), and converts back with
//! `From`. Strict types serialize through their loose counterpart, so both
//! share one wire format.
//!
//! # Modules
//!
//! - [`lnurlp`] - Capability request and response
//! - [`payreq`] - Invoice request and response
//! - [`pubkey`] - Public key response
//! - [`callback`] - Post-transaction callback
//! - [`counterparty`] - Payer and payee data blocks
//! - [`compliance`] - Compliance sub-blocks and KYC status
//! - [`currency`] - Quotable currencies
//! - [`amount`] - The hybrid `amount` field encoding
//! - [`version`] - Protocol version parsing and constants
//! - [`timestamp`] - Unix timestamps

pub mod amount;
pub mod callback;
pub mod compliance;
pub mod counterparty;
pub mod currency;
pub mod lnurlp;
pub mod payreq;
pub mod pubkey;
pub mod timestamp;
pub mod version;

pub use amount::{AmountField, AmountFieldError};
pub use callback::{PostTransactionCallback, UtxoWithAmount};
pub use compliance::{CompliancePayeeData, CompliancePayerData, KycStatus};
pub use counterparty::{
    CounterPartyDataOption, CounterPartyDataOptions, PayeeData, PayerData, UmaPayeeData,
    UmaPayerData,
};
pub use currency::{ConvertibleCurrency, Currency};
pub use lnurlp::{
    LnurlComplianceResponse, LnurlpRequest, LnurlpResponse, PAY_REQUEST_TAG, UmaLnurlpRequest,
    UmaLnurlpResponse,
};
pub use payreq::{
    PayReqResponse, PayReqResponsePaymentInfo, PayRequest, Route, RouteHop, UmaPayReqResponse,
    UmaPayRequest,
};
pub use pubkey::PubKeyResponse;
pub use timestamp::UnixTimestamp;
pub use version::{
    BACKCOMPAT_VERSIONS, MAJOR_VERSION, MINOR_VERSION, UMA_PROTOCOL_VERSION, Version,
    VersionFormatError,
};

/// Errors that can occur when parsing or validating UMA protocol messages.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ProtocolError {
    /// A version string is not of the form `major.minor`.
    #[error(transparent)]
    InvalidVersionFormat(#[from] VersionFormatError),

    /// The hybrid `amount` field of an invoice request is malformed.
    #[error(transparent)]
    InvalidAmountField(#[from] AmountFieldError),

    /// A field required by the strict form of a message is missing.
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// A hex-encoded field could not be decoded.
    #[error("invalid hex in {field}: {source}")]
    InvalidHex {
        /// Wire name of the field.
        field: &'static str,
        /// The decoding failure.
        #[source]
        source: hex::FromHexError,
    },

    /// JSON deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
