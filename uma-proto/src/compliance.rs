//! Compliance sub-blocks carried inside payer and payee data.
//!
//! These blocks hold the signature material (`signature`, `signatureNonce`,
//! `signatureTimestamp`) of the invoice request and invoice response, plus the
//! KYC and travel-rule fields the counterparties exchange.

use serde::{Deserialize, Serialize};

use crate::UnixTimestamp;

/// Whether a VASP holds KYC information about its user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum KycStatus {
    /// The VASP does not say.
    #[default]
    Unknown,
    /// The user has not been verified.
    NotVerified,
    /// Verification is in progress.
    Pending,
    /// The user has been verified.
    Verified,
}

/// Compliance data the sending VASP attaches to the payer data of an invoice request.
#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompliancePayerData {
    /// Outputs of the sender's channels that may carry this payment, as `<txid>:<vout>`.
    #[serde(default)]
    pub utxos: Vec<String>,
    /// Public key of the sender's node, if the receiver needs to pre-screen it.
    pub node_pub_key: Option<String>,
    /// KYC status of the payer at the sending VASP.
    pub kyc_status: KycStatus,
    /// Travel-rule information, encrypted with the receiver's encryption key.
    pub encrypted_travel_rule_info: Option<String>,
    /// Format of the encrypted travel-rule information, as `type@version`.
    pub travel_rule_format: Option<String>,
    /// Base64 signature over `payerIdentifier|signatureNonce|signatureTimestamp`.
    pub signature: String,
    /// Random string preventing replay of the signature.
    pub signature_nonce: String,
    /// When the signature was produced.
    pub signature_timestamp: UnixTimestamp,
    /// URL the receiver calls with its own UTXOs once the payment completes.
    pub utxo_callback: String,
}

/// Compliance data the receiving VASP attaches to the payee data of an invoice response.
#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompliancePayeeData {
    /// Public key of the receiver's node.
    pub node_pub_key: Option<String>,
    /// Outputs of the receiver's channels that may carry this payment.
    #[serde(default)]
    pub utxos: Vec<String>,
    /// URL the sender calls with its own UTXOs once the payment completes.
    pub utxo_callback: Option<String>,
    /// Base64 signature over `payerIdentifier|payeeIdentifier|signatureNonce|signatureTimestamp`.
    pub signature: String,
    /// Random string preventing replay of the signature.
    pub signature_nonce: String,
    /// When the signature was produced.
    pub signature_timestamp: UnixTimestamp,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kyc_status_wire_names() {
        assert_eq!(
            serde_json::to_string(&KycStatus::NotVerified).unwrap(),
            "\"NOT_VERIFIED\""
        );
        let status: KycStatus = serde_json::from_str("\"VERIFIED\"").unwrap();
        assert_eq!(status, KycStatus::Verified);
    }

    #[test]
    fn test_payee_compliance_key_order() {
        let compliance = CompliancePayeeData {
            node_pub_key: None,
            utxos: vec!["abcd:0".into()],
            utxo_callback: Some("https://vasp2.com/utxo".into()),
            signature: "c2ln".into(),
            signature_nonce: "n1".into(),
            signature_timestamp: UnixTimestamp::from_secs(1_700_000_000),
        };
        let json = serde_json::to_string(&compliance).unwrap();
        assert_eq!(
            json,
            r#"{"utxos":["abcd:0"],"utxoCallback":"https://vasp2.com/utxo","signature":"c2ln","signatureNonce":"n1","signatureTimestamp":1700000000}"#
        );
    }

    #[test]
    fn test_payer_compliance_defaults_missing_utxos() {
        let compliance: CompliancePayerData = serde_json::from_str(
            r#"{"kycStatus":"PENDING","signature":"s","signatureNonce":"n","signatureTimestamp":5,"utxoCallback":"https://a.com/cb"}"#,
        )
        .unwrap();
        assert!(compliance.utxos.is_empty());
        assert_eq!(compliance.kyc_status, KycStatus::Pending);
        assert_eq!(compliance.signature_timestamp, UnixTimestamp::from_secs(5));
    }
}
