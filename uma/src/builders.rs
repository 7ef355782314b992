//! Builders for signed UMA messages.
//!
//! A [`MessageBuilder`] holds this VASP's [`Signer`], a [`Clock`] and a
//! [`VersionNegotiator`]. Each builder stamps a fresh random nonce and the
//! current time, signs the canonical payload and returns the strict message.

use rand::RngExt;
use rand::rng;
use serde_json::Value;
use std::collections::BTreeMap;

use crate::UmaError;
use crate::clock::{Clock, SystemClock};
use crate::codec::encode_lnurlp_request_url;
use crate::negotiation::{VersionNegotiator, select_lower};
use crate::proto::{
    CompliancePayeeData, CompliancePayerData, CounterPartyDataOptions, Currency, KycStatus,
    LnurlComplianceResponse, LnurlpRequest, PAY_REQUEST_TAG, PostTransactionCallback,
    UmaLnurlpRequest, UmaLnurlpResponse, UmaPayRequest, UmaPayerData, UtxoWithAmount, Version,
};
use crate::signing::{Signable, Signer, payee_compliance_payload, sign_payload};

/// Receiver-side inputs of a capability response.
#[derive(Debug, Clone, PartialEq)]
pub struct LnurlpResponseParams {
    /// URL the sender posts its invoice request to.
    pub callback: String,
    /// LNURL metadata, JSON-encoded.
    pub encoded_metadata: String,
    /// Minimum amount the receiver accepts, in millisatoshis.
    pub min_sendable: u64,
    /// Maximum amount the receiver accepts, in millisatoshis.
    pub max_sendable: u64,
    /// Payer fields the sender must supply.
    pub required_payer_data: CounterPartyDataOptions,
    /// Currencies the receiver can be paid in.
    pub currencies: Vec<Currency>,
    /// KYC status of the receiving user.
    pub receiver_kyc_status: KycStatus,
    /// Whether the receiving VASP must exchange travel-rule information.
    pub is_subject_to_travel_rule: bool,
    /// Maximum comment length, if comments are accepted.
    pub comment_chars_allowed: Option<u32>,
    /// Nostr key for zap receipts.
    pub nostr_pubkey: Option<String>,
}

/// Sender-side inputs of an invoice request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PayRequestParams {
    /// Amount to send, in millisatoshis or in `sending_amount_currency_code` units.
    pub amount: u64,
    /// Currency `amount` is denominated in; `None` for millisatoshis.
    pub sending_amount_currency_code: Option<String>,
    /// Currency the receiver should be credited in.
    pub receiving_currency_code: Option<String>,
    /// The payer's UMA address.
    pub payer_identifier: String,
    /// KYC status of the payer.
    pub payer_kyc_status: KycStatus,
    /// Outputs of the sender's channels that may carry the payment.
    pub utxos: Vec<String>,
    /// Public key of the sender's node.
    pub node_pub_key: Option<String>,
    /// Travel-rule information, already encrypted for the receiver.
    pub encrypted_travel_rule_info: Option<String>,
    /// Format of the encrypted travel-rule information.
    pub travel_rule_format: Option<String>,
    /// URL the receiver posts its post-transaction callback to.
    pub utxo_callback: String,
    /// Other payer fields the receiver asked for.
    pub extra_payer_data: BTreeMap<String, Value>,
    /// Payee fields the sender asks for.
    pub requested_payee_data: Option<CounterPartyDataOptions>,
    /// Free-form comment for the receiver.
    pub comment: Option<String>,
}

/// Builds signed UMA messages.
#[derive(Debug, Clone)]
pub struct MessageBuilder<S, C = SystemClock> {
    signer: S,
    clock: C,
    negotiator: VersionNegotiator,
}

impl<S: Signer> MessageBuilder<S> {
    /// Creates a builder with the system clock and the default version catalog.
    #[must_use]
    pub fn new(signer: S) -> Self {
        Self {
            signer,
            clock: SystemClock,
            negotiator: VersionNegotiator::default(),
        }
    }
}

impl<S: Signer, C: Clock> MessageBuilder<S, C> {
    /// Replaces the clock.
    #[must_use]
    pub fn with_clock<C2: Clock>(self, clock: C2) -> MessageBuilder<S, C2> {
        MessageBuilder {
            signer: self.signer,
            clock,
            negotiator: self.negotiator,
        }
    }

    /// Replaces the version negotiator.
    #[must_use]
    pub fn with_negotiator(mut self, negotiator: VersionNegotiator) -> Self {
        self.negotiator = negotiator;
        self
    }

    /// The version negotiator used for outgoing messages.
    pub const fn negotiator(&self) -> &VersionNegotiator {
        &self.negotiator
    }

    fn sign<M: Signable>(&self, message: &M) -> Result<String, UmaError> {
        sign_payload(&self.signer, &message.signable_payload()?)
    }

    /// Builds the signed capability request for `receiver_address`.
    ///
    /// `uma_version` defaults to the current version. A sender retrying after
    /// an unsupported-version error passes the result of
    /// [`VersionNegotiator::select_highest_mutual`].
    ///
    /// # Errors
    ///
    /// Returns [`UmaError::InvalidReceiverAddress`] if the address is not
    /// `user@domain` or would not survive encoding into the request URL, or
    /// the error of signing the payload.
    pub fn signed_lnurlp_request(
        &self,
        receiver_address: &str,
        vasp_domain: &str,
        is_subject_to_travel_rule: bool,
        uma_version: Option<Version>,
    ) -> Result<UmaLnurlpRequest, UmaError> {
        encode_lnurlp_request_url(&LnurlpRequest::new(receiver_address))?;
        let uma_version = uma_version.unwrap_or_else(|| self.negotiator.catalog().current());
        let mut request = UmaLnurlpRequest {
            receiver_address: receiver_address.to_owned(),
            nonce: generate_nonce(),
            signature: String::new(),
            is_subject_to_travel_rule,
            vasp_domain: vasp_domain.to_owned(),
            timestamp: self.clock.now(),
            uma_version: uma_version.to_string(),
        };
        request.signature = self.sign(&request)?;
        Ok(request)
    }

    /// Builds the signed capability response to a verified request.
    ///
    /// The response version is the lower of the sender's preference and this
    /// VASP's current version. The compliance block is signed over the
    /// request's receiver address.
    ///
    /// # Errors
    ///
    /// Returns [`UmaError::InvalidVersionFormat`] if the request's version
    /// is malformed, or the error of signing the payload.
    pub fn lnurlp_response(
        &self,
        request: &UmaLnurlpRequest,
        params: LnurlpResponseParams,
    ) -> Result<UmaLnurlpResponse, UmaError> {
        let current = self.negotiator.catalog().current().to_string();
        let uma_version = select_lower(&request.uma_version, &current)?;
        let mut compliance = LnurlComplianceResponse {
            kyc_status: params.receiver_kyc_status,
            signature: String::new(),
            nonce: generate_nonce(),
            timestamp: self.clock.now(),
            is_subject_to_travel_rule: params.is_subject_to_travel_rule,
            receiver_identifier: request.receiver_address.clone(),
        };
        compliance.signature = self.sign(&compliance)?;
        let allows_nostr = params.nostr_pubkey.is_some().then_some(true);
        Ok(UmaLnurlpResponse {
            tag: PAY_REQUEST_TAG.to_owned(),
            callback: params.callback,
            min_sendable: params.min_sendable,
            max_sendable: params.max_sendable,
            encoded_metadata: params.encoded_metadata,
            currencies: params.currencies,
            required_payer_data: params.required_payer_data,
            compliance,
            uma_version: uma_version.to_string(),
            comment_chars_allowed: params.comment_chars_allowed,
            nostr_pubkey: params.nostr_pubkey,
            allows_nostr,
        })
    }

    /// Builds the signed invoice request.
    ///
    /// # Errors
    ///
    /// Returns the error of signing the payload.
    pub fn pay_request(&self, params: PayRequestParams) -> Result<UmaPayRequest, UmaError> {
        let compliance = CompliancePayerData {
            utxos: params.utxos,
            node_pub_key: params.node_pub_key,
            kyc_status: params.payer_kyc_status,
            encrypted_travel_rule_info: params.encrypted_travel_rule_info,
            travel_rule_format: params.travel_rule_format,
            signature: String::new(),
            signature_nonce: generate_nonce(),
            signature_timestamp: self.clock.now(),
            utxo_callback: params.utxo_callback,
        };
        let mut request = UmaPayRequest {
            amount: params.amount,
            sending_amount_currency_code: params.sending_amount_currency_code,
            receiving_currency_code: params.receiving_currency_code,
            payer_data: UmaPayerData {
                identifier: params.payer_identifier,
                compliance,
                extra: params.extra_payer_data,
            },
            requested_payee_data: params.requested_payee_data,
            comment: params.comment,
        };
        request.payer_data.compliance.signature = self.sign(&request)?;
        Ok(request)
    }

    /// Builds the signed payee compliance block of an invoice response.
    ///
    /// # Errors
    ///
    /// Returns the error of signing the payload.
    pub fn payee_compliance(
        &self,
        payer_identifier: &str,
        payee_identifier: &str,
        utxos: Vec<String>,
        node_pub_key: Option<String>,
        utxo_callback: Option<String>,
    ) -> Result<CompliancePayeeData, UmaError> {
        let mut compliance = CompliancePayeeData {
            node_pub_key,
            utxos,
            utxo_callback,
            signature: String::new(),
            signature_nonce: generate_nonce(),
            signature_timestamp: self.clock.now(),
        };
        let payload = payee_compliance_payload(&compliance, payer_identifier, payee_identifier)?;
        compliance.signature = sign_payload(&self.signer, &payload)?;
        Ok(compliance)
    }

    /// Builds the signed post-transaction callback.
    ///
    /// # Errors
    ///
    /// Returns the error of signing the payload.
    pub fn post_transaction_callback(
        &self,
        utxos: Vec<UtxoWithAmount>,
        vasp_domain: &str,
    ) -> Result<PostTransactionCallback, UmaError> {
        let mut callback = PostTransactionCallback {
            utxos,
            vasp_domain: vasp_domain.to_owned(),
            signature: String::new(),
            nonce: generate_nonce(),
            timestamp: self.clock.now(),
        };
        callback.signature = self.sign(&callback)?;
        Ok(callback)
    }
}

fn generate_nonce() -> String {
    rng().random::<u64>().to_string()
}
