//! Public key discovery response, served at `/.well-known/lnurlpubkey`.

use serde::{Deserialize, Serialize};

use crate::{ProtocolError, UnixTimestamp};

/// The public keys a VASP publishes for its counterparties.
#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PubKeyResponse {
    /// Key verifying this VASP's signatures, hex-encoded.
    #[serde(rename = "signingPubKey")]
    pub signing_pub_key_hex: String,
    /// Key used to encrypt travel-rule information for this VASP, hex-encoded.
    #[serde(rename = "encryptionPubKey")]
    pub encryption_pub_key_hex: String,
    /// When the keys must be refreshed. `None` means they may be cached indefinitely.
    pub expiration_timestamp: Option<UnixTimestamp>,
}

impl PubKeyResponse {
    /// Decodes the signing public key.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::InvalidHex`] if the key is not valid hex.
    pub fn signing_pub_key(&self) -> Result<Vec<u8>, ProtocolError> {
        hex::decode(&self.signing_pub_key_hex).map_err(|source| ProtocolError::InvalidHex {
            field: "signingPubKey",
            source,
        })
    }

    /// Decodes the encryption public key.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::InvalidHex`] if the key is not valid hex.
    pub fn encryption_pub_key(&self) -> Result<Vec<u8>, ProtocolError> {
        hex::decode(&self.encryption_pub_key_hex).map_err(|source| ProtocolError::InvalidHex {
            field: "encryptionPubKey",
            source,
        })
    }

    /// Returns `true` if the keys must be refetched at `now`.
    #[must_use]
    pub fn is_expired_at(&self, now: UnixTimestamp) -> bool {
        self.expiration_timestamp.is_some_and(|expiry| now >= expiry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(expiration: Option<u64>) -> PubKeyResponse {
        PubKeyResponse {
            signing_pub_key_hex: "02aabb".into(),
            encryption_pub_key_hex: "03ccdd".into(),
            expiration_timestamp: expiration.map(UnixTimestamp::from_secs),
        }
    }

    #[test]
    fn test_pubkey_wire_shape() {
        let json = serde_json::to_string(&response(Some(1_800_000_000))).unwrap();
        assert_eq!(
            json,
            r#"{"signingPubKey":"02aabb","encryptionPubKey":"03ccdd","expirationTimestamp":1800000000}"#
        );
        let cached_forever: PubKeyResponse =
            serde_json::from_str(r#"{"signingPubKey":"02aabb","encryptionPubKey":"03ccdd"}"#)
                .unwrap();
        assert_eq!(cached_forever, response(None));
    }

    #[test]
    fn test_decode_keys() {
        let keys = response(None);
        assert_eq!(keys.signing_pub_key().unwrap(), vec![0x02, 0xaa, 0xbb]);
        assert_eq!(keys.encryption_pub_key().unwrap(), vec![0x03, 0xcc, 0xdd]);

        let bad = PubKeyResponse {
            signing_pub_key_hex: "zz".into(),
            ..keys
        };
        assert!(matches!(
            bad.signing_pub_key(),
            Err(ProtocolError::InvalidHex {
                field: "signingPubKey",
                ..
            })
        ));
    }

    #[test]
    fn test_expiry() {
        let now = UnixTimestamp::from_secs(1_000);
        assert!(!response(None).is_expired_at(now));
        assert!(!response(Some(1_001)).is_expired_at(now));
        assert!(response(Some(1_000)).is_expired_at(now));
    }
}
