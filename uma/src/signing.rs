//! Canonical signing payloads and signature helpers.
//!
//! Every signed UMA message is signed over its identifying fields joined with
//! `|`, encoded as UTF-8. The payload depends only on the logical fields of a
//! message, never on how it was encoded on the wire:
//!
//! | Message | Payload |
//! |---|---|
//! | Capability request | `receiverAddress\|nonce\|timestamp` |
//! | Capability response compliance | `receiverIdentifier\|nonce\|timestamp` |
//! | Invoice request | `payerIdentifier\|nonce\|timestamp` |
//! | Payee compliance | `payerIdentifier\|payeeIdentifier\|nonce\|timestamp` |
//! | Post-transaction callback | `nonce\|timestamp` |
//!
//! Cryptography is not implemented here. Callers plug in a [`Signer`] for
//! their private key and a [`Verifier`] for counterparty keys; signatures
//! travel as standard base64.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as b64;

use crate::UmaError;
use crate::proto::{
    CompliancePayeeData, LnurlComplianceResponse, LnurlpRequest, PayRequest,
    PostTransactionCallback, PubKeyResponse, UmaLnurlpRequest, UmaLnurlpResponse,
    UmaPayReqResponse, UmaPayRequest, UnixTimestamp,
};

const SEPARATOR: &str = "|";

/// Produces signatures with this VASP's signing key.
pub trait Signer {
    /// The error returned when signing fails.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Signs a canonical payload, returning the raw signature bytes.
    ///
    /// # Errors
    ///
    /// Returns the implementation's error if the key cannot sign.
    fn sign(&self, payload: &[u8]) -> Result<Vec<u8>, Self::Error>;
}

impl<T: Signer + ?Sized> Signer for &T {
    type Error = T::Error;

    fn sign(&self, payload: &[u8]) -> Result<Vec<u8>, Self::Error> {
        (**self).sign(payload)
    }
}

/// Checks signatures against a counterparty's signing public key.
pub trait Verifier {
    /// Returns `true` if `signature` is valid for `payload` under `public_key`.
    fn verify(&self, public_key: &[u8], payload: &[u8], signature: &[u8]) -> bool;
}

impl<T: Verifier + ?Sized> Verifier for &T {
    fn verify(&self, public_key: &[u8], payload: &[u8], signature: &[u8]) -> bool {
        (**self).verify(public_key, payload, signature)
    }
}

/// A message with a canonical signing payload of its own.
pub trait Signable {
    /// Builds the exact bytes that are signed for this message.
    ///
    /// # Errors
    ///
    /// Returns [`UmaError::MissingSigningField`] if a payload field is absent
    /// or empty, and [`UmaError::AmbiguousSigningField`] if one contains `|`.
    fn signable_payload(&self) -> Result<Vec<u8>, UmaError>;
}

/// A payload field: its wire name and value, `None` if absent.
type Field<'a> = (&'static str, Option<&'a str>);

fn join_fields(
    fields: &[Field<'_>],
    timestamp: Option<UnixTimestamp>,
) -> Result<Vec<u8>, UmaError> {
    let timestamp = timestamp.ok_or(UmaError::MissingSigningField("timestamp"))?;
    let mut parts = Vec::with_capacity(fields.len() + 1);
    for &(name, value) in fields {
        let value = value
            .filter(|v| !v.is_empty())
            .ok_or(UmaError::MissingSigningField(name))?;
        if value.contains(SEPARATOR) {
            return Err(UmaError::AmbiguousSigningField(name));
        }
        parts.push(value.to_owned());
    }
    parts.push(timestamp.to_string());
    Ok(parts.join(SEPARATOR).into_bytes())
}

impl Signable for LnurlpRequest {
    fn signable_payload(&self) -> Result<Vec<u8>, UmaError> {
        join_fields(
            &[
                ("receiverAddress", Some(self.receiver_address.as_str())),
                ("nonce", self.nonce.as_deref()),
            ],
            self.timestamp,
        )
    }
}

impl Signable for UmaLnurlpRequest {
    fn signable_payload(&self) -> Result<Vec<u8>, UmaError> {
        join_fields(
            &[
                ("receiverAddress", Some(self.receiver_address.as_str())),
                ("nonce", Some(self.nonce.as_str())),
            ],
            Some(self.timestamp),
        )
    }
}

impl Signable for LnurlComplianceResponse {
    fn signable_payload(&self) -> Result<Vec<u8>, UmaError> {
        join_fields(
            &[
                ("receiverIdentifier", Some(self.receiver_identifier.as_str())),
                ("signatureNonce", Some(self.nonce.as_str())),
            ],
            Some(self.timestamp),
        )
    }
}

impl Signable for UmaLnurlpResponse {
    fn signable_payload(&self) -> Result<Vec<u8>, UmaError> {
        self.compliance.signable_payload()
    }
}

impl Signable for PayRequest {
    fn signable_payload(&self) -> Result<Vec<u8>, UmaError> {
        let payer_data = self
            .payer_data
            .as_ref()
            .ok_or(UmaError::MissingSigningField("payerData"))?;
        let compliance = payer_data
            .compliance
            .as_ref()
            .ok_or(UmaError::MissingSigningField("compliance"))?;
        join_fields(
            &[
                ("identifier", payer_data.identifier.as_deref()),
                ("signatureNonce", Some(compliance.signature_nonce.as_str())),
            ],
            Some(compliance.signature_timestamp),
        )
    }
}

impl Signable for UmaPayRequest {
    fn signable_payload(&self) -> Result<Vec<u8>, UmaError> {
        let compliance = &self.payer_data.compliance;
        join_fields(
            &[
                ("identifier", Some(self.payer_data.identifier.as_str())),
                ("signatureNonce", Some(compliance.signature_nonce.as_str())),
            ],
            Some(compliance.signature_timestamp),
        )
    }
}

impl Signable for PostTransactionCallback {
    fn signable_payload(&self) -> Result<Vec<u8>, UmaError> {
        join_fields(&[("signatureNonce", Some(self.nonce.as_str()))], Some(self.timestamp))
    }
}

/// Builds the signing payload of the payee compliance block of an invoice response.
///
/// The block does not carry the identifiers it is signed over; both sides
/// know them from the invoice request.
///
/// # Errors
///
/// Returns [`UmaError::MissingSigningField`] if an identifier or the nonce is
/// empty, and [`UmaError::AmbiguousSigningField`] if one contains `|`.
pub fn payee_compliance_payload(
    compliance: &CompliancePayeeData,
    payer_identifier: &str,
    payee_identifier: &str,
) -> Result<Vec<u8>, UmaError> {
    join_fields(
        &[
            ("payerIdentifier", Some(payer_identifier)),
            ("payeeIdentifier", Some(payee_identifier)),
            ("signatureNonce", Some(compliance.signature_nonce.as_str())),
        ],
        Some(compliance.signature_timestamp),
    )
}

/// Signs a payload and returns the base64 signature.
///
/// # Errors
///
/// Returns [`UmaError::Signer`] if the signer fails.
pub fn sign_payload<S: Signer>(signer: &S, payload: &[u8]) -> Result<String, UmaError> {
    let signature = signer
        .sign(payload)
        .map_err(|e| UmaError::Signer(Box::new(e)))?;
    Ok(b64.encode(signature))
}

/// Verifies a base64 signature over `payload` with the counterparty's signing key.
///
/// # Errors
///
/// Returns [`UmaError::Protocol`] if the signing key is not valid hex,
/// [`UmaError::Base64`] if the signature is not valid base64 and
/// [`UmaError::InvalidSignature`] if it does not verify.
#[cfg_attr(
    feature = "telemetry",
    tracing::instrument(name = "uma.verify_signature", skip_all, err)
)]
pub fn verify_payload_signature<V: Verifier>(
    verifier: &V,
    other_vasp_pub_keys: &PubKeyResponse,
    payload: &[u8],
    signature: &str,
) -> Result<(), UmaError> {
    let public_key = other_vasp_pub_keys.signing_pub_key()?;
    let signature = b64.decode(signature)?;
    if verifier.verify(&public_key, payload, &signature) {
        Ok(())
    } else {
        Err(UmaError::InvalidSignature)
    }
}

/// Verifies the signature of a capability request.
///
/// # Errors
///
/// See [`verify_payload_signature`].
pub fn verify_lnurlp_request_signature<V: Verifier>(
    verifier: &V,
    request: &UmaLnurlpRequest,
    other_vasp_pub_keys: &PubKeyResponse,
) -> Result<(), UmaError> {
    let payload = request.signable_payload()?;
    verify_payload_signature(verifier, other_vasp_pub_keys, &payload, &request.signature)
}

/// Verifies the compliance signature of a capability response.
///
/// # Errors
///
/// See [`verify_payload_signature`].
pub fn verify_lnurlp_response_signature<V: Verifier>(
    verifier: &V,
    response: &UmaLnurlpResponse,
    other_vasp_pub_keys: &PubKeyResponse,
) -> Result<(), UmaError> {
    let payload = response.signable_payload()?;
    verify_payload_signature(
        verifier,
        other_vasp_pub_keys,
        &payload,
        &response.compliance.signature,
    )
}

/// Verifies the payer compliance signature of an invoice request.
///
/// # Errors
///
/// See [`verify_payload_signature`].
pub fn verify_pay_request_signature<V: Verifier>(
    verifier: &V,
    request: &UmaPayRequest,
    other_vasp_pub_keys: &PubKeyResponse,
) -> Result<(), UmaError> {
    let payload = request.signable_payload()?;
    verify_payload_signature(
        verifier,
        other_vasp_pub_keys,
        &payload,
        &request.payer_data.compliance.signature,
    )
}

/// Verifies the payee compliance signature of an invoice response.
///
/// # Errors
///
/// See [`verify_payload_signature`].
pub fn verify_pay_req_response_signature<V: Verifier>(
    verifier: &V,
    response: &UmaPayReqResponse,
    payer_identifier: &str,
    payee_identifier: &str,
    other_vasp_pub_keys: &PubKeyResponse,
) -> Result<(), UmaError> {
    let compliance = &response.payee_data.compliance;
    let payload = payee_compliance_payload(compliance, payer_identifier, payee_identifier)?;
    verify_payload_signature(verifier, other_vasp_pub_keys, &payload, &compliance.signature)
}

/// Verifies the signature of a post-transaction callback.
///
/// # Errors
///
/// See [`verify_payload_signature`].
pub fn verify_post_transaction_callback_signature<V: Verifier>(
    verifier: &V,
    callback: &PostTransactionCallback,
    other_vasp_pub_keys: &PubKeyResponse,
) -> Result<(), UmaError> {
    let payload = callback.signable_payload()?;
    verify_payload_signature(verifier, other_vasp_pub_keys, &payload, &callback.signature)
}


#[cfg(test)]
mod tests {
    use super::testing::{XorSigner, XorVerifier, pub_keys};
    use super::*;
    use crate::proto::{CompliancePayerData, KycStatus, PayerData};

    fn lnurlp_request() -> LnurlpRequest {
        LnurlpRequest {
            nonce: Some("abc".into()),
            timestamp: Some(UnixTimestamp::from_secs(1_700_000_000)),
            ..LnurlpRequest::new("alice@vasp.com")
        }
    }

    fn payer_compliance() -> CompliancePayerData {
        CompliancePayerData {
            utxos: vec![],
            node_pub_key: None,
            kyc_status: KycStatus::Verified,
            encrypted_travel_rule_info: None,
            travel_rule_format: None,
            signature: String::new(),
            signature_nonce: "n1".into(),
            signature_timestamp: UnixTimestamp::from_secs(42),
            utxo_callback: "https://vasp1.com/utxo".into(),
        }
    }

    #[test]
    fn test_lnurlp_request_payload() {
        assert_eq!(
            lnurlp_request().signable_payload().unwrap(),
            b"alice@vasp.com|abc|1700000000"
        );
    }

    #[test]
    fn test_missing_fields_fail() {
        let no_nonce = LnurlpRequest {
            nonce: None,
            ..lnurlp_request()
        };
        assert!(matches!(
            no_nonce.signable_payload(),
            Err(UmaError::MissingSigningField("nonce"))
        ));

        let empty_nonce = LnurlpRequest {
            nonce: Some(String::new()),
            ..lnurlp_request()
        };
        assert!(matches!(
            empty_nonce.signable_payload(),
            Err(UmaError::MissingSigningField("nonce"))
        ));

        let no_timestamp = LnurlpRequest {
            timestamp: None,
            ..lnurlp_request()
        };
        assert!(matches!(
            no_timestamp.signable_payload(),
            Err(UmaError::MissingSigningField("timestamp"))
        ));
    }

    #[test]
    fn test_separator_in_field_is_rejected() {
        let forged = LnurlpRequest {
            nonce: Some("abc|1".into()),
            ..lnurlp_request()
        };
        assert!(matches!(
            forged.signable_payload(),
            Err(UmaError::AmbiguousSigningField("nonce"))
        ));
    }

    #[test]
    fn test_pay_request_payload() {
        let mut request = PayRequest {
            amount: 1_000,
            sending_amount_currency_code: Some("USD".into()),
            receiving_currency_code: Some("USD".into()),
            payer_data: None,
            requested_payee_data: None,
            comment: None,
        };
        assert!(matches!(
            request.signable_payload(),
            Err(UmaError::MissingSigningField("payerData"))
        ));

        request.payer_data = Some(PayerData {
            identifier: Some("$alice@vasp1.com".into()),
            compliance: Some(payer_compliance()),
            ..PayerData::default()
        });
        assert_eq!(request.signable_payload().unwrap(), b"$alice@vasp1.com|n1|42");

        let strict = request.clone().upgrade().unwrap();
        assert_eq!(
            strict.signable_payload().unwrap(),
            request.signable_payload().unwrap()
        );
    }

    #[test]
    fn test_lnurlp_response_compliance_payload() {
        let compliance = LnurlComplianceResponse {
            kyc_status: KycStatus::Verified,
            signature: String::new(),
            nonce: "n2".into(),
            timestamp: UnixTimestamp::from_secs(1_700_000_001),
            is_subject_to_travel_rule: true,
            receiver_identifier: "$bob@vasp2.com".into(),
        };
        assert_eq!(
            compliance.signable_payload().unwrap(),
            b"$bob@vasp2.com|n2|1700000001"
        );
    }

    #[test]
    fn test_payee_and_callback_payloads() {
        let compliance = CompliancePayeeData {
            node_pub_key: None,
            utxos: vec![],
            utxo_callback: None,
            signature: String::new(),
            signature_nonce: "n2".into(),
            signature_timestamp: UnixTimestamp::from_secs(43),
        };
        assert_eq!(
            payee_compliance_payload(&compliance, "$alice@vasp1.com", "$bob@vasp2.com").unwrap(),
            b"$alice@vasp1.com|$bob@vasp2.com|n2|43"
        );

        let callback = PostTransactionCallback {
            utxos: vec![],
            vasp_domain: "vasp2.com".into(),
            signature: String::new(),
            nonce: "n3".into(),
            timestamp: UnixTimestamp::from_secs(44),
        };
        assert_eq!(callback.signable_payload().unwrap(), b"n3|44");
    }

    #[test]
    fn test_sign_and_verify() {
        let payload = lnurlp_request().signable_payload().unwrap();
        let signature = sign_payload(&XorSigner, &payload).unwrap();
        verify_payload_signature(&XorVerifier, &pub_keys(), &payload, &signature).unwrap();

        let result = verify_payload_signature(&XorVerifier, &pub_keys(), b"other", &signature);
        assert!(matches!(result, Err(UmaError::InvalidSignature)));

        let result = verify_payload_signature(&XorVerifier, &pub_keys(), &payload, "not base64!");
        assert!(matches!(result, Err(UmaError::Base64(_))));
    }

    #[test]
    fn test_verify_rejects_bad_pub_key() {
        let keys = PubKeyResponse {
            signing_pub_key_hex: "xyz".into(),
            ..pub_keys()
        };
        let result = verify_payload_signature(&XorVerifier, &keys, b"p", "cA==");
        assert!(matches!(result, Err(UmaError::Protocol(_))));
    }
}
