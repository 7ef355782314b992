//! Capability discovery messages (LNURL-pay first round trip).
//!
//! The sending VASP asks the receiving VASP what a receiver address can accept
//! with an [`LnurlpRequest`]; the receiving VASP answers with an
//! [`LnurlpResponse`]. Both exist in a loose form (any compliance field may be
//! absent, as sent by plain LNURL peers) and a strict form ([`UmaLnurlpRequest`],
//! [`UmaLnurlpResponse`]) reachable only through `upgrade`.

use serde::{Deserialize, Serialize};

use crate::compliance::KycStatus;
use crate::counterparty::CounterPartyDataOptions;
use crate::currency::Currency;
use crate::{ProtocolError, UnixTimestamp};

/// The `tag` value of every LNURL-pay response.
pub const PAY_REQUEST_TAG: &str = "payRequest";

/// The capability request sent by the sending VASP.
///
/// Travels as the query string of `https://<domain>/.well-known/lnurlp/<user>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LnurlpRequest {
    /// Address of the receiving user, `user@domain`.
    pub receiver_address: String,
    /// Random string preventing replay of the signature.
    pub nonce: Option<String>,
    /// Base64 signature over `receiverAddress|nonce|timestamp`.
    pub signature: Option<String>,
    /// Whether the sending VASP must exchange travel-rule information.
    pub is_subject_to_travel_rule: Option<bool>,
    /// Domain of the sending VASP, used to fetch its public keys.
    pub vasp_domain: Option<String>,
    /// When the request was signed.
    pub timestamp: Option<UnixTimestamp>,
    /// Protocol version the sending VASP prefers.
    pub uma_version: Option<String>,
}

impl LnurlpRequest {
    /// A plain LNURL request with no compliance fields.
    #[must_use]
    pub fn new(receiver_address: impl Into<String>) -> Self {
        Self {
            receiver_address: receiver_address.into(),
            nonce: None,
            signature: None,
            is_subject_to_travel_rule: None,
            vasp_domain: None,
            timestamp: None,
            uma_version: None,
        }
    }

    /// Returns `true` if every field UMA requires is present.
    ///
    /// The travel-rule flag is not required and defaults to `false`.
    #[must_use]
    pub const fn is_uma_request(&self) -> bool {
        self.nonce.is_some()
            && self.signature.is_some()
            && self.vasp_domain.is_some()
            && self.timestamp.is_some()
            && self.uma_version.is_some()
    }

    /// Converts to the strict form, or `None` for a plain LNURL request.
    #[must_use]
    pub fn upgrade(self) -> Option<UmaLnurlpRequest> {
        UmaLnurlpRequest::try_from(self).ok()
    }
}

/// A capability request with every UMA field present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UmaLnurlpRequest {
    /// Address of the receiving user, `user@domain`.
    pub receiver_address: String,
    /// Random string preventing replay of the signature.
    pub nonce: String,
    /// Base64 signature over `receiverAddress|nonce|timestamp`.
    pub signature: String,
    /// Whether the sending VASP must exchange travel-rule information.
    pub is_subject_to_travel_rule: bool,
    /// Domain of the sending VASP, used to fetch its public keys.
    pub vasp_domain: String,
    /// When the request was signed.
    pub timestamp: UnixTimestamp,
    /// Protocol version the sending VASP prefers.
    pub uma_version: String,
}

impl TryFrom<LnurlpRequest> for UmaLnurlpRequest {
    type Error = ProtocolError;

    fn try_from(value: LnurlpRequest) -> Result<Self, Self::Error> {
        let LnurlpRequest {
            receiver_address,
            nonce,
            signature,
            is_subject_to_travel_rule,
            vasp_domain,
            timestamp,
            uma_version,
        } = value;
        Ok(Self {
            receiver_address,
            nonce: nonce.ok_or(ProtocolError::MissingField("nonce"))?,
            signature: signature.ok_or(ProtocolError::MissingField("signature"))?,
            is_subject_to_travel_rule: is_subject_to_travel_rule.unwrap_or(false),
            vasp_domain: vasp_domain.ok_or(ProtocolError::MissingField("vaspDomain"))?,
            timestamp: timestamp.ok_or(ProtocolError::MissingField("timestamp"))?,
            uma_version: uma_version.ok_or(ProtocolError::MissingField("umaVersion"))?,
        })
    }
}

impl From<UmaLnurlpRequest> for LnurlpRequest {
    fn from(value: UmaLnurlpRequest) -> Self {
        let UmaLnurlpRequest {
            receiver_address,
            nonce,
            signature,
            is_subject_to_travel_rule,
            vasp_domain,
            timestamp,
            uma_version,
        } = value;
        Self {
            receiver_address,
            nonce: Some(nonce),
            signature: Some(signature),
            is_subject_to_travel_rule: Some(is_subject_to_travel_rule),
            vasp_domain: Some(vasp_domain),
            timestamp: Some(timestamp),
            uma_version: Some(uma_version),
        }
    }
}

/// The `compliance` block of a capability response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LnurlComplianceResponse {
    /// Whether the receiving VASP holds KYC information about the receiver.
    pub kyc_status: KycStatus,
    /// Base64 signature over `receiverIdentifier|signatureNonce|signatureTimestamp`.
    pub signature: String,
    /// Random string preventing replay of the signature.
    #[serde(rename = "signatureNonce")]
    pub nonce: String,
    /// When the response was signed.
    #[serde(rename = "signatureTimestamp")]
    pub timestamp: UnixTimestamp,
    /// Whether the receiving VASP must exchange travel-rule information.
    pub is_subject_to_travel_rule: bool,
    /// Identifier of the receiver at the receiving VASP.
    pub receiver_identifier: String,
}

/// The capability response sent by the receiving VASP.
#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LnurlpResponse {
    /// Always [`PAY_REQUEST_TAG`].
    pub tag: String,
    /// URL the sending VASP calls to request an invoice.
    pub callback: String,
    /// Minimum sendable amount in millisatoshis.
    pub min_sendable: u64,
    /// Maximum sendable amount in millisatoshis.
    pub max_sendable: u64,
    /// LUD-06 metadata, already JSON-encoded.
    #[serde(rename = "metadata")]
    pub encoded_metadata: String,
    /// Currencies the receiver can quote. Required for UMA.
    pub currencies: Option<Vec<Currency>>,
    /// Payer fields the sending VASP must provide. Required for UMA.
    #[serde(rename = "payerData")]
    pub required_payer_data: Option<CounterPartyDataOptions>,
    /// Compliance block. Required for UMA.
    pub compliance: Option<LnurlComplianceResponse>,
    /// Version chosen by the receiving VASP. Required for UMA.
    pub uma_version: Option<String>,
    /// Maximum length of the payer's comment.
    #[serde(rename = "commentAllowed")]
    pub comment_chars_allowed: Option<u32>,
    /// BIP-340 public key used for nostr zaps (NIP-57), hex-encoded.
    pub nostr_pubkey: Option<String>,
    /// Whether nostr zaps are accepted.
    pub allows_nostr: Option<bool>,
}

impl LnurlpResponse {
    /// Returns `true` if every field UMA requires is present.
    #[must_use]
    pub const fn is_uma_response(&self) -> bool {
        self.compliance.is_some()
            && self.uma_version.is_some()
            && self.currencies.is_some()
            && self.required_payer_data.is_some()
    }

    /// Converts to the strict form, or `None` for a plain LNURL response.
    #[must_use]
    pub fn upgrade(self) -> Option<UmaLnurlpResponse> {
        UmaLnurlpResponse::try_from(self).ok()
    }
}

/// A capability response with every UMA field present.
///
/// Shares the wire format of [`LnurlpResponse`]; deserialization fails if a
/// required field is absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "LnurlpResponse", try_from = "LnurlpResponse")]
pub struct UmaLnurlpResponse {
    /// Always [`PAY_REQUEST_TAG`].
    pub tag: String,
    /// URL the sending VASP calls to request an invoice.
    pub callback: String,
    /// Minimum sendable amount in millisatoshis.
    pub min_sendable: u64,
    /// Maximum sendable amount in millisatoshis.
    pub max_sendable: u64,
    /// LUD-06 metadata, already JSON-encoded.
    pub encoded_metadata: String,
    /// Currencies the receiver can quote.
    pub currencies: Vec<Currency>,
    /// Payer fields the sending VASP must provide.
    pub required_payer_data: CounterPartyDataOptions,
    /// Compliance block.
    pub compliance: LnurlComplianceResponse,
    /// Version chosen by the receiving VASP.
    pub uma_version: String,
    /// Maximum length of the payer's comment.
    pub comment_chars_allowed: Option<u32>,
    /// BIP-340 public key used for nostr zaps (NIP-57), hex-encoded.
    pub nostr_pubkey: Option<String>,
    /// Whether nostr zaps are accepted.
    pub allows_nostr: Option<bool>,
}

impl TryFrom<LnurlpResponse> for UmaLnurlpResponse {
    type Error = ProtocolError;

    fn try_from(value: LnurlpResponse) -> Result<Self, Self::Error> {
        let LnurlpResponse {
            tag,
            callback,
            min_sendable,
            max_sendable,
            encoded_metadata,
            currencies,
            required_payer_data,
            compliance,
            uma_version,
            comment_chars_allowed,
            nostr_pubkey,
            allows_nostr,
        } = value;
        Ok(Self {
            tag,
            callback,
            min_sendable,
            max_sendable,
            encoded_metadata,
            currencies: currencies.ok_or(ProtocolError::MissingField("currencies"))?,
            required_payer_data: required_payer_data
                .ok_or(ProtocolError::MissingField("payerData"))?,
            compliance: compliance.ok_or(ProtocolError::MissingField("compliance"))?,
            uma_version: uma_version.ok_or(ProtocolError::MissingField("umaVersion"))?,
            comment_chars_allowed,
            nostr_pubkey,
            allows_nostr,
        })
    }
}

impl From<UmaLnurlpResponse> for LnurlpResponse {
    fn from(value: UmaLnurlpResponse) -> Self {
        let UmaLnurlpResponse {
            tag,
            callback,
            min_sendable,
            max_sendable,
            encoded_metadata,
            currencies,
            required_payer_data,
            compliance,
            uma_version,
            comment_chars_allowed,
            nostr_pubkey,
            allows_nostr,
        } = value;
        Self {
            tag,
            callback,
            min_sendable,
            max_sendable,
            encoded_metadata,
            currencies: Some(currencies),
            required_payer_data: Some(required_payer_data),
            compliance: Some(compliance),
            uma_version: Some(uma_version),
            comment_chars_allowed,
            nostr_pubkey,
            allows_nostr,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::counterparty::CounterPartyDataOption;

    fn uma_request() -> LnurlpRequest {
        LnurlpRequest {
            receiver_address: "alice@vasp.com".into(),
            nonce: Some("abc".into()),
            signature: Some("c2lnbmF0dXJl".into()),
            is_subject_to_travel_rule: Some(true),
            vasp_domain: Some("vasp1.com".into()),
            timestamp: Some(UnixTimestamp::from_secs(1_700_000_000)),
            uma_version: Some("1.0".into()),
        }
    }

    fn plain_response() -> LnurlpResponse {
        LnurlpResponse {
            tag: PAY_REQUEST_TAG.into(),
            callback: "https://vasp2.com/api/lnurl/payreq/alice".into(),
            min_sendable: 1_000,
            max_sendable: 10_000_000,
            encoded_metadata: r#"[["text/plain","Pay alice"]]"#.into(),
            currencies: None,
            required_payer_data: None,
            compliance: None,
            uma_version: None,
            comment_chars_allowed: None,
            nostr_pubkey: None,
            allows_nostr: None,
        }
    }

    fn uma_response() -> LnurlpResponse {
        LnurlpResponse {
            currencies: Some(vec![]),
            required_payer_data: Some(CounterPartyDataOptions::from([(
                "identifier".to_owned(),
                CounterPartyDataOption::mandatory(),
            )])),
            compliance: Some(LnurlComplianceResponse {
                kyc_status: KycStatus::Verified,
                signature: "c2ln".into(),
                nonce: "n2".into(),
                timestamp: UnixTimestamp::from_secs(1_700_000_001),
                is_subject_to_travel_rule: true,
                receiver_identifier: "$alice@vasp2.com".into(),
            }),
            uma_version: Some("1.0".into()),
            comment_chars_allowed: Some(255),
            ..plain_response()
        }
    }

    #[test]
    fn test_request_upgrade_copies_fields() {
        let loose = uma_request();
        assert!(loose.is_uma_request());
        let strict = loose.clone().upgrade().unwrap();
        assert_eq!(strict.receiver_address, "alice@vasp.com");
        assert_eq!(strict.nonce, "abc");
        assert_eq!(strict.signature, "c2lnbmF0dXJl");
        assert!(strict.is_subject_to_travel_rule);
        assert_eq!(strict.vasp_domain, "vasp1.com");
        assert_eq!(strict.timestamp, UnixTimestamp::from_secs(1_700_000_000));
        assert_eq!(strict.uma_version, "1.0");
        assert_eq!(LnurlpRequest::from(strict), loose);
    }

    #[test]
    fn test_request_missing_any_required_field_is_not_uma() {
        let strip: [fn(&mut LnurlpRequest); 5] = [
            |r| r.nonce = None,
            |r| r.signature = None,
            |r| r.vasp_domain = None,
            |r| r.timestamp = None,
            |r| r.uma_version = None,
        ];
        for remove in strip {
            let mut request = uma_request();
            remove(&mut request);
            assert!(!request.is_uma_request());
            assert!(request.upgrade().is_none());
        }
    }

    #[test]
    fn test_request_travel_rule_flag_defaults_false() {
        let request = LnurlpRequest {
            is_subject_to_travel_rule: None,
            ..uma_request()
        };
        assert!(request.is_uma_request());
        assert!(!request.upgrade().unwrap().is_subject_to_travel_rule);
    }

    #[test]
    fn test_request_try_from_names_missing_field() {
        let request = LnurlpRequest {
            vasp_domain: None,
            ..uma_request()
        };
        let err = UmaLnurlpRequest::try_from(request).unwrap_err();
        assert!(matches!(err, ProtocolError::MissingField("vaspDomain")));
    }

    #[test]
    fn test_plain_response_omits_absent_fields() {
        let json = serde_json::to_string(&plain_response()).unwrap();
        assert_eq!(
            json,
            r#"{"tag":"payRequest","callback":"https://vasp2.com/api/lnurl/payreq/alice","minSendable":1000,"maxSendable":10000000,"metadata":"[[\"text/plain\",\"Pay alice\"]]"}"#
        );
        let parsed: LnurlpResponse = serde_json::from_str(&json).unwrap();
        assert!(!parsed.is_uma_response());
        assert!(parsed.upgrade().is_none());
    }

    #[test]
    fn test_uma_response_wire_keys() {
        let json = serde_json::to_value(uma_response()).unwrap();
        let compliance = &json["compliance"];
        assert_eq!(compliance["kycStatus"], "VERIFIED");
        assert_eq!(compliance["signatureNonce"], "n2");
        assert_eq!(compliance["signatureTimestamp"], 1_700_000_001);
        assert_eq!(compliance["isSubjectToTravelRule"], true);
        assert_eq!(compliance["receiverIdentifier"], "$alice@vasp2.com");
        assert_eq!(json["umaVersion"], "1.0");
        assert_eq!(json["commentAllowed"], 255);
        assert_eq!(json["payerData"]["identifier"]["mandatory"], true);
    }

    #[test]
    fn test_strict_response_serializes_like_loose() {
        let loose = uma_response();
        let strict = loose.clone().upgrade().unwrap();
        assert_eq!(
            serde_json::to_string(&strict).unwrap(),
            serde_json::to_string(&loose).unwrap()
        );
        let decoded: UmaLnurlpResponse =
            serde_json::from_str(&serde_json::to_string(&loose).unwrap()).unwrap();
        assert_eq!(decoded, strict);
    }

    #[test]
    fn test_strict_response_rejects_plain_json() {
        let json = serde_json::to_string(&plain_response()).unwrap();
        assert!(serde_json::from_str::<UmaLnurlpResponse>(&json).is_err());
    }

    #[test]
    fn test_response_missing_currencies_is_not_uma() {
        let response = LnurlpResponse {
            currencies: None,
            ..uma_response()
        };
        assert!(!response.is_uma_response());
        assert!(response.upgrade().is_none());
    }
}
