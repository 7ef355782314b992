//! Currencies a receiving VASP can quote (LUD-21).

use serde::{Deserialize, Serialize};

/// Bounds on how much of a currency can be sent, in its smallest unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConvertibleCurrency {
    /// Minimum amount that can be received.
    pub min: u64,
    /// Maximum amount that can be received.
    pub max: u64,
}

/// A currency the receiver can be paid in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Currency {
    /// ISO 4217 code, or a ticker for non-fiat currencies (e.g. `"USD"`).
    pub code: String,
    /// Display name (e.g. `"US Dollars"`).
    pub name: String,
    /// Display symbol (e.g. `"$"`).
    pub symbol: String,
    /// Estimated millisatoshis per smallest unit of this currency.
    #[serde(rename = "multiplier")]
    pub millisatoshi_per_unit: f64,
    /// Sendable bounds in the smallest unit of this currency.
    pub convertible: ConvertibleCurrency,
    /// Digits after the decimal point (2 for USD cents).
    pub decimals: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_currency_wire_shape() {
        let usd = Currency {
            code: "USD".into(),
            name: "US Dollars".into(),
            symbol: "$".into(),
            millisatoshi_per_unit: 34_150.0,
            convertible: ConvertibleCurrency { min: 1, max: 10_000 },
            decimals: 2,
        };
        let json = serde_json::to_value(&usd).unwrap();
        assert_eq!(json["multiplier"], 34_150.0);
        assert_eq!(json["convertible"]["max"], 10_000);
        let back: Currency = serde_json::from_value(json).unwrap();
        assert_eq!(back, usd);
    }
}
