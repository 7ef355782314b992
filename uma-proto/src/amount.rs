//! The hybrid `amount` field of the invoice request.
//!
//! The wire format has a single string slot for the amount, but the unit
//! depends on whether the sender pinned a currency. The field therefore
//! carries the currency code after a dot:
//!
//! - `"1000"` - 1000 millisatoshis
//! - `"1000.USD"` - 1000 of the smallest unit of USD (cents)
//!
//! A trailing dot with nothing after it (`"1000."`) also means millisatoshis.

use std::fmt;
use std::str::FromStr;

/// Error returned when the `amount` field cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid amount field {0:?}")]
pub struct AmountFieldError(String);

impl AmountFieldError {
    /// Returns the rejected input.
    #[must_use]
    pub fn input(&self) -> &str {
        &self.0
    }
}

/// An amount paired with the optional currency it is denominated in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AmountField {
    /// The amount, in the smallest unit of `currency_code` or in millisatoshis.
    pub amount: u64,
    /// The currency of `amount`. `None` means millisatoshis.
    pub currency_code: Option<String>,
}

impl AmountField {
    /// An amount in millisatoshis.
    #[must_use]
    pub const fn millisatoshis(amount: u64) -> Self {
        Self {
            amount,
            currency_code: None,
        }
    }

    /// An amount in the smallest unit of `currency_code`.
    pub fn in_currency(amount: u64, currency_code: impl Into<String>) -> Self {
        Self {
            amount,
            currency_code: Some(currency_code.into()),
        }
    }
}

impl fmt::Display for AmountField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.currency_code {
            Some(code) => write!(f, "{}.{code}", self.amount),
            None => write!(f, "{}", self.amount),
        }
    }
}

impl FromStr for AmountField {
    type Err = AmountFieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split('.');
        let amount_part = parts.next().unwrap_or_default();
        let currency_part = parts.next();
        if parts.next().is_some() {
            return Err(AmountFieldError(s.into()));
        }
        // u64::from_str accepts a leading '+', which is not a base-10 digit string.
        if amount_part.is_empty() || !amount_part.bytes().all(|b| b.is_ascii_digit()) {
            return Err(AmountFieldError(s.into()));
        }
        let amount = amount_part
            .parse::<u64>()
            .map_err(|_| AmountFieldError(s.into()))?;
        let currency_code = currency_part
            .filter(|code| !code.is_empty())
            .map(str::to_owned);
        Ok(Self {
            amount,
            currency_code,
        })
    }
}
