//! Post-transaction callback exchanged once the payment settles.

use serde::{Deserialize, Serialize};

use crate::UnixTimestamp;

/// A channel output and the amount that moved over it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UtxoWithAmount {
    /// Channel output, as `<txid>:<vout>`.
    pub utxo: String,
    /// Amount transferred over that channel, in millisatoshis.
    #[serde(rename = "amountMsats")]
    pub amount: u64,
}

/// Sent by each VASP to its counterparty's `utxoCallback` after the payment
/// completes, for transaction monitoring.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostTransactionCallback {
    /// Outputs and amounts of the sender's channels used by the payment.
    pub utxos: Vec<UtxoWithAmount>,
    /// Domain of the VASP sending the callback, used to fetch its public keys.
    pub vasp_domain: String,
    /// Base64 signature over `signatureNonce|signatureTimestamp`.
    pub signature: String,
    /// Random string preventing replay of the signature.
    #[serde(rename = "signatureNonce")]
    pub nonce: String,
    /// When the callback was signed.
    #[serde(rename = "signatureTimestamp")]
    pub timestamp: UnixTimestamp,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_callback_wire_shape() {
        let callback = PostTransactionCallback {
            utxos: vec![UtxoWithAmount {
                utxo: "abcd:1".into(),
                amount: 1_000,
            }],
            vasp_domain: "vasp1.com".into(),
            signature: "c2ln".into(),
            nonce: "n".into(),
            timestamp: UnixTimestamp::from_secs(7),
        };
        let json = serde_json::to_string(&callback).unwrap();
        assert_eq!(
            json,
            r#"{"utxos":[{"utxo":"abcd:1","amountMsats":1000}],"vaspDomain":"vasp1.com","signature":"c2ln","signatureNonce":"n","signatureTimestamp":7}"#
        );
        let back: PostTransactionCallback = serde_json::from_str(&json).unwrap();
        assert_eq!(back, callback);
    }
}
