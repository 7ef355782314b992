//! Invoice request and response (LNURL-pay second round trip).
//!
//! The sending VASP posts a [`PayRequest`] to the callback advertised in the
//! capability response and receives a [`PayReqResponse`] carrying the invoice.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;

use crate::ProtocolError;
use crate::amount::AmountField;
use crate::counterparty::{
    CounterPartyDataOptions, PayeeData, PayerData, UmaPayeeData, UmaPayerData,
};

/// The invoice request sent by the sending VASP.
///
/// # JSON Format
///
/// The `amount` field embeds the sending currency (see [`crate::amount`]):
///
/// ```json
/// {
///   "amount": "1000.USD",
///   "convert": "USD",
///   "payerData": { "identifier": "$alice@vasp1.com", "compliance": { ... } },
///   "payeeData": { "identifier": { "mandatory": true } },
///   "comment": "thanks"
/// }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct PayRequest {
    /// Amount in the smallest unit of `sending_amount_currency_code`, or in
    /// millisatoshis when that is `None`.
    pub amount: u64,
    /// Currency of `amount`. `None` means millisatoshis.
    pub sending_amount_currency_code: Option<String>,
    /// Currency the receiver will be credited in (`convert`).
    pub receiving_currency_code: Option<String>,
    /// Data identifying the payer. Required for UMA, as is its compliance block.
    pub payer_data: Option<PayerData>,
    /// Payee fields the sending VASP asks for.
    pub requested_payee_data: Option<CounterPartyDataOptions>,
    /// Free-form comment, bounded by the receiver's `commentAllowed`.
    pub comment: Option<String>,
}

#[serde_with::skip_serializing_none]
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PayRequestWire {
    amount: String,
    convert: Option<String>,
    payer_data: Option<PayerData>,
    payee_data: Option<CounterPartyDataOptions>,
    comment: Option<String>,
}

impl PayRequest {
    /// Returns the hybrid amount field as sent on the wire.
    #[must_use]
    pub fn amount_field(&self) -> AmountField {
        AmountField {
            amount: self.amount,
            currency_code: self.sending_amount_currency_code.clone(),
        }
    }

    /// Returns `true` if the payer data carries both an identifier and a compliance block.
    #[must_use]
    pub fn is_uma_request(&self) -> bool {
        self.payer_data
            .as_ref()
            .is_some_and(PayerData::is_uma_payer_data)
    }

    /// Converts to the strict form, or `None` for a plain LNURL request.
    #[must_use]
    pub fn upgrade(self) -> Option<UmaPayRequest> {
        UmaPayRequest::try_from(self).ok()
    }

    /// Parses a request from JSON, reporting a malformed `amount` as
    /// [`ProtocolError::InvalidAmountField`].
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError`] if the JSON is malformed or the amount field is invalid.
    pub fn from_json(data: &[u8]) -> Result<Self, ProtocolError> {
        let wire: PayRequestWire = serde_json::from_slice(data)?;
        Self::from_wire(wire)
    }

    /// Parses a request from an already-decoded JSON value.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError`] if the value has the wrong shape or the amount field is invalid.
    pub fn from_value(value: serde_json::Value) -> Result<Self, ProtocolError> {
        let wire: PayRequestWire = serde_json::from_value(value)?;
        Self::from_wire(wire)
    }

    fn from_wire(wire: PayRequestWire) -> Result<Self, ProtocolError> {
        let AmountField {
            amount,
            currency_code,
        } = wire.amount.parse::<AmountField>()?;
        Ok(Self {
            amount,
            sending_amount_currency_code: currency_code,
            receiving_currency_code: wire.convert,
            payer_data: wire.payer_data,
            requested_payee_data: wire.payee_data,
            comment: wire.comment,
        })
    }
}

impl Serialize for PayRequest {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let wire = PayRequestWire {
            amount: self.amount_field().to_string(),
            convert: self.receiving_currency_code.clone(),
            payer_data: self.payer_data.clone(),
            payee_data: self.requested_payee_data.clone(),
            comment: self.comment.clone(),
        };
        wire.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for PayRequest {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let wire = PayRequestWire::deserialize(deserializer)?;
        Self::from_wire(wire).map_err(serde::de::Error::custom)
    }
}

/// An invoice request whose payer data carries an identifier and a compliance block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "PayRequest", try_from = "PayRequest")]
pub struct UmaPayRequest {
    /// Amount in the smallest unit of `sending_amount_currency_code`, or in millisatoshis.
    pub amount: u64,
    /// Currency of `amount`. `None` means millisatoshis.
    pub sending_amount_currency_code: Option<String>,
    /// Currency the receiver will be credited in.
    pub receiving_currency_code: Option<String>,
    /// Data identifying the payer.
    pub payer_data: UmaPayerData,
    /// Payee fields the sending VASP asks for.
    pub requested_payee_data: Option<CounterPartyDataOptions>,
    /// Free-form comment.
    pub comment: Option<String>,
}

impl TryFrom<PayRequest> for UmaPayRequest {
    type Error = ProtocolError;

    fn try_from(value: PayRequest) -> Result<Self, Self::Error> {
        let PayRequest {
            amount,
            sending_amount_currency_code,
            receiving_currency_code,
            payer_data,
            requested_payee_data,
            comment,
        } = value;
        let payer_data = payer_data.ok_or(ProtocolError::MissingField("payerData"))?;
        Ok(Self {
            amount,
            sending_amount_currency_code,
            receiving_currency_code,
            payer_data: UmaPayerData::try_from(payer_data)?,
            requested_payee_data,
            comment,
        })
    }
}

impl From<UmaPayRequest> for PayRequest {
    fn from(value: UmaPayRequest) -> Self {
        let UmaPayRequest {
            amount,
            sending_amount_currency_code,
            receiving_currency_code,
            payer_data,
            requested_payee_data,
            comment,
        } = value;
        Self {
            amount,
            sending_amount_currency_code,
            receiving_currency_code,
            payer_data: Some(payer_data.into()),
            requested_payee_data,
            comment,
        }
    }
}

/// One hop of a legacy LNURL route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteHop {
    /// Node public key.
    pub pubkey: String,
    /// Fee charged by the hop, in millisatoshis.
    pub fee: u64,
    /// Amount forwarded, in millisatoshis.
    pub msatoshi: u64,
    /// Short channel id.
    pub channel: String,
}

/// A legacy LNURL route, superseded by BOLT11 route hints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    /// Public key of the destination node.
    pub pubkey: String,
    /// Hops leading to the destination.
    pub path: Vec<RouteHop>,
}

/// Currency details of the payment the receiver will be credited.
///
/// `invoice amount = amount * multiplier + fee`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayReqResponsePaymentInfo {
    /// Amount the receiver gets, in the smallest unit of `currency_code`, fees excluded.
    pub amount: u64,
    /// Currency the receiver gets.
    pub currency_code: String,
    /// Millisatoshis per smallest unit of `currency_code`.
    pub multiplier: f64,
    /// Digits after the decimal point for `currency_code`.
    pub decimals: u32,
    /// Fee charged by the receiving VASP, in millisatoshis.
    #[serde(rename = "fee")]
    pub exchange_fees_millisatoshi: u64,
}

/// The invoice response sent by the receiving VASP.
#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayReqResponse {
    /// The BOLT11 invoice to pay.
    #[serde(rename = "pr")]
    pub encoded_invoice: String,
    /// Legacy routes, almost always empty.
    #[serde(default)]
    pub routes: Vec<Route>,
    /// Currency details. Required for UMA.
    pub payment_info: Option<PayReqResponsePaymentInfo>,
    /// Data about the payee. Required for UMA, as is its compliance block.
    pub payee_data: Option<PayeeData>,
    /// Whether the LNURL may be discarded after use (LUD-11).
    pub disposable: Option<bool>,
    /// Action shown to the payer on success (LUD-09).
    pub success_action: Option<BTreeMap<String, String>>,
}

impl PayReqResponse {
    /// Returns `true` if payment info and a payee compliance block are present.
    #[must_use]
    pub fn is_uma_response(&self) -> bool {
        self.payment_info.is_some()
            && self
                .payee_data
                .as_ref()
                .is_some_and(PayeeData::is_uma_payee_data)
    }

    /// Converts to the strict form, or `None` for a plain LNURL response.
    #[must_use]
    pub fn upgrade(self) -> Option<UmaPayReqResponse> {
        UmaPayReqResponse::try_from(self).ok()
    }

    /// Whether the LNURL may be discarded. An absent flag means `true`.
    #[must_use]
    pub fn is_disposable(&self) -> bool {
        self.disposable.unwrap_or(true)
    }
}

/// An invoice response carrying payment info and a payee compliance block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "PayReqResponse", try_from = "PayReqResponse")]
pub struct UmaPayReqResponse {
    /// The BOLT11 invoice to pay.
    pub encoded_invoice: String,
    /// Legacy routes, almost always empty.
    pub routes: Vec<Route>,
    /// Currency details.
    pub payment_info: PayReqResponsePaymentInfo,
    /// Data about the payee.
    pub payee_data: UmaPayeeData,
    /// Whether the LNURL may be discarded after use.
    pub disposable: Option<bool>,
    /// Action shown to the payer on success.
    pub success_action: Option<BTreeMap<String, String>>,
}

impl TryFrom<PayReqResponse> for UmaPayReqResponse {
    type Error = ProtocolError;

    fn try_from(value: PayReqResponse) -> Result<Self, Self::Error> {
        let PayReqResponse {
            encoded_invoice,
            routes,
            payment_info,
            payee_data,
            disposable,
            success_action,
        } = value;
        let payee_data = payee_data.ok_or(ProtocolError::MissingField("payeeData"))?;
        Ok(Self {
            encoded_invoice,
            routes,
            payment_info: payment_info.ok_or(ProtocolError::MissingField("paymentInfo"))?,
            payee_data: UmaPayeeData::try_from(payee_data)?,
            disposable,
            success_action,
        })
    }
}

impl From<UmaPayReqResponse> for PayReqResponse {
    fn from(value: UmaPayReqResponse) -> Self {
        let UmaPayReqResponse {
            encoded_invoice,
            routes,
            payment_info,
            payee_data,
            disposable,
            success_action,
        } = value;
        Self {
            encoded_invoice,
            routes,
            payment_info: Some(payment_info),
            payee_data: Some(payee_data.into()),
            disposable,
            success_action,
        }
    }
}
