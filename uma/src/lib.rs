#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! Protocol core for the Universal Money Address (UMA) payment handshake.
//!
//! UMA lets two independently operated VASPs discover each other's payment
//! capabilities, agree on a protocol version, exchange a signed invoice and
//! report the settled payment. Both sides must reproduce every wire artifact
//! exactly: a version choice the other side disagrees with or a signing
//! payload built in a different order makes the handshake fail.
//!
//! This crate is pure. It performs no I/O, holds no mutable global state and
//! treats cryptography, HTTP and key storage as capabilities supplied by the
//! caller.
//!
//! # Handshake
//!
//! 1. The sender builds a capability request with
//!    [`MessageBuilder::signed_lnurlp_request`] and fetches the URL from
//!    [`codec::encode_lnurlp_request_url`].
//! 2. The receiver parses it with [`codec::parse_lnurlp_request`], upgrades it
//!    to the strict form, verifies it with
//!    [`signing::verify_lnurlp_request_signature`] and answers with
//!    [`MessageBuilder::lnurlp_response`].
//! 3. The sender posts [`MessageBuilder::pay_request`] to the callback; the
//!    receiver answers with an invoice whose payee data carries
//!    [`MessageBuilder::payee_compliance`].
//! 4. After settlement both sides exchange
//!    [`MessageBuilder::post_transaction_callback`].
//!
//! # Modules
//!
//! - [`address`] - UMA address parsing and local-domain detection
//! - [`builders`] - Signed message construction
//! - [`clock`] - Time source for message timestamps
//! - [`codec`] - URL, form and JSON encodings
//! - [`config`] - The supported version catalog
//! - [`negotiation`] - Protocol version negotiation
//! - [`proto`] - Wire format types (re-exported from `uma-proto`)
//! - [`signing`] - Canonical signing payloads and signature checks
//!
//! # Feature Flags
//!
//! - `telemetry` - Enables tracing instrumentation for debugging and monitoring

pub mod address;
pub mod builders;
pub mod clock;
pub mod codec;
pub mod config;
pub mod error;
pub mod negotiation;
pub mod signing;

pub use uma_proto as proto;

pub use builders::{LnurlpResponseParams, MessageBuilder, PayRequestParams};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::VersionCatalog;
pub use error::{ErrorReason, UmaError, UnsupportedVersionError};
pub use negotiation::{VersionNegotiator, select_lower};
pub use signing::{Signable, Signer, Verifier};
