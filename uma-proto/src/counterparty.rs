//! Payer and payee data blocks.
//!
//! The shape of these blocks is mostly opaque to the protocol core: VASPs
//! exchange whatever fields the counterparty asked for. Two fields have a
//! protocol role and are modelled explicitly: the `identifier` (part of the
//! signed payload) and the `compliance` sub-block. Everything else round-trips
//! untouched through `extra`.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::ProtocolError;
use crate::compliance::{CompliancePayeeData, CompliancePayerData};

/// Whether a single counterparty data field must be supplied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterPartyDataOption {
    /// `true` if the counterparty must supply the field.
    pub mandatory: bool,
}

impl CounterPartyDataOption {
    /// A field the counterparty must supply.
    #[must_use]
    pub const fn mandatory() -> Self {
        Self { mandatory: true }
    }

    /// A field the counterparty may supply.
    #[must_use]
    pub const fn optional() -> Self {
        Self { mandatory: false }
    }
}

/// Describes the counterparty data fields one VASP asks the other for.
///
/// Keyed by field name (e.g. `"identifier"`, `"compliance"`, `"name"`).
pub type CounterPartyDataOptions = BTreeMap<String, CounterPartyDataOption>;

/// Data about the payer, sent with the invoice request.
#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PayerData {
    /// The payer's address at the sending VASP (e.g. `$alice@vasp1.com`).
    pub identifier: Option<String>,
    /// Compliance data, required for UMA.
    pub compliance: Option<CompliancePayerData>,
    /// Any other fields requested by the receiver.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl PayerData {
    /// Returns `true` if both the identifier and the compliance block are present.
    #[must_use]
    pub const fn is_uma_payer_data(&self) -> bool {
        self.identifier.is_some() && self.compliance.is_some()
    }

    /// Converts to [`UmaPayerData`] if the identifier and compliance block are present.
    #[must_use]
    pub fn upgrade(self) -> Option<UmaPayerData> {
        UmaPayerData::try_from(self).ok()
    }
}

/// Payer data with the identifier and compliance block guaranteed present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "PayerData", try_from = "PayerData")]
pub struct UmaPayerData {
    /// The payer's address at the sending VASP.
    pub identifier: String,
    /// Compliance data of the sending VASP.
    pub compliance: CompliancePayerData,
    /// Any other fields requested by the receiver.
    pub extra: BTreeMap<String, Value>,
}

impl TryFrom<PayerData> for UmaPayerData {
    type Error = ProtocolError;

    fn try_from(value: PayerData) -> Result<Self, Self::Error> {
        let PayerData {
            identifier,
            compliance,
            extra,
        } = value;
        Ok(Self {
            identifier: identifier.ok_or(ProtocolError::MissingField("identifier"))?,
            compliance: compliance.ok_or(ProtocolError::MissingField("compliance"))?,
            extra,
        })
    }
}

impl From<UmaPayerData> for PayerData {
    fn from(value: UmaPayerData) -> Self {
        let UmaPayerData {
            identifier,
            compliance,
            extra,
        } = value;
        Self {
            identifier: Some(identifier),
            compliance: Some(compliance),
            extra,
        }
    }
}

/// Data about the payee, sent with the invoice response.
#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PayeeData {
    /// The payee's address at the receiving VASP.
    pub identifier: Option<String>,
    /// Compliance data, required for UMA.
    pub compliance: Option<CompliancePayeeData>,
    /// Any other fields requested by the sender.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl PayeeData {
    /// Returns `true` if the compliance block is present.
    #[must_use]
    pub const fn is_uma_payee_data(&self) -> bool {
        self.compliance.is_some()
    }

    /// Converts to [`UmaPayeeData`] if the compliance block is present.
    #[must_use]
    pub fn upgrade(self) -> Option<UmaPayeeData> {
        UmaPayeeData::try_from(self).ok()
    }
}

/// Payee data with the compliance block guaranteed present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "PayeeData", try_from = "PayeeData")]
pub struct UmaPayeeData {
    /// The payee's address at the receiving VASP.
    pub identifier: Option<String>,
    /// Compliance data of the receiving VASP.
    pub compliance: CompliancePayeeData,
    /// Any other fields requested by the sender.
    pub extra: BTreeMap<String, Value>,
}

impl TryFrom<PayeeData> for UmaPayeeData {
    type Error = ProtocolError;

    fn try_from(value: PayeeData) -> Result<Self, Self::Error> {
        let PayeeData {
            identifier,
            compliance,
            extra,
        } = value;
        Ok(Self {
            identifier,
            compliance: compliance.ok_or(ProtocolError::MissingField("compliance"))?,
            extra,
        })
    }
}

impl From<UmaPayeeData> for PayeeData {
    fn from(value: UmaPayeeData) -> Self {
        let UmaPayeeData {
            identifier,
            compliance,
            extra,
        } = value;
        Self {
            identifier,
            compliance: Some(compliance),
            extra,
        }
    }
}
