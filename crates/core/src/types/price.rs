//! Type-safe price representation using decimal arithmetic.
//!
//! Amounts are exact decimals. Intermediate sums and products are never
//! rounded; [`Price::round_to_cents`] is applied once, where a value is stored
//! or displayed.

use core::fmt;
use core::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Largest unit price accepted from the admin panel (`NUMERIC(10, 2)`).
const MAX_UNIT_PRICE: Decimal = Decimal::from_parts(1_410_065_407, 2, 0, false, 2);

/// Errors that can occur when building or combining prices.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The input is not a decimal number.
    #[error("price must be a number")]
    Invalid(String),
    /// The price is zero or negative.
    #[error("price must be a positive number")]
    NotPositive,
    /// The price does not fit the stored precision.
    #[error("price must be at most {max}")]
    TooLarge {
        /// Maximum accepted amount.
        max: Decimal,
    },
    /// Prices in different currencies were combined.
    #[error("currency mismatch: {0:?} vs {1:?}")]
    CurrencyMismatch(CurrencyCode, CurrencyCode),
    /// Arithmetic overflowed.
    #[error("price arithmetic overflow")]
    Overflow,
}

/// A price with currency information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Price {
    /// Amount in the currency's standard unit (e.g., dollars, not cents).
    pub amount: Decimal,
    /// ISO 4217 currency code.
    #[serde(default)]
    pub currency_code: CurrencyCode,
}

impl Price {
    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal, currency_code: CurrencyCode) -> Self {
        Self {
            amount,
            currency_code,
        }
    }

    /// Create a price in the store currency (USD).
    #[must_use]
    pub const fn usd(amount: Decimal) -> Self {
        Self::new(amount, CurrencyCode::USD)
    }

    /// A zero amount in the store currency.
    #[must_use]
    pub const fn zero() -> Self {
        Self::usd(Decimal::ZERO)
    }

    /// Create a USD price from an integer number of cents.
    #[must_use]
    pub fn from_cents(cents: i64) -> Self {
        Self::usd(Decimal::new(cents, 2))
    }

    /// Parse an admin-entered price, requiring a positive amount.
    ///
    /// # Errors
    ///
    /// Returns `PriceError::Invalid` for non-numeric input, `NotPositive` for
    /// amounts that are zero or negative once rounded to cents and `TooLarge`
    /// beyond the stored precision.
    pub fn parse_positive(s: &str) -> Result<Self, PriceError> {
        let amount =
            Decimal::from_str(s.trim()).map_err(|_| PriceError::Invalid(s.to_owned()))?;
        // Checked after rounding so a sub-cent amount cannot be stored as 0.00
        let price = Self::usd(amount).round_to_cents();
        if price.amount <= Decimal::ZERO {
            return Err(PriceError::NotPositive);
        }
        if price.amount > MAX_UNIT_PRICE {
            return Err(PriceError::TooLarge {
                max: MAX_UNIT_PRICE,
            });
        }
        Ok(price)
    }

    /// Multiply by a line quantity. Exact; saturates at `Decimal::MAX`.
    #[must_use]
    pub fn times(self, quantity: u32) -> Self {
        Self::new(
            self.amount.saturating_mul(Decimal::from(quantity)),
            self.currency_code,
        )
    }

    /// Add two prices of the same currency.
    ///
    /// # Errors
    ///
    /// Returns `PriceError::CurrencyMismatch` or `PriceError::Overflow`.
    pub fn checked_add(self, other: Self) -> Result<Self, PriceError> {
        if self.currency_code != other.currency_code {
            return Err(PriceError::CurrencyMismatch(
                self.currency_code,
                other.currency_code,
            ));
        }
        let amount = self
            .amount
            .checked_add(other.amount)
            .ok_or(PriceError::Overflow)?;
        Ok(Self::new(amount, self.currency_code))
    }

    /// Round half-to-even at two decimal places.
    #[must_use]
    pub fn round_to_cents(self) -> Self {
        Self::new(
            self.amount
                .round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven),
            self.currency_code,
        )
    }

    /// Returns true if the amount is zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }
}

impl Default for Price {
    fn default() -> Self {
        Self::zero()
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rounded = self.round_to_cents();
        write!(f, "{}{:.2}", self.currency_code.symbol(), rounded.amount)
    }
}

/// ISO 4217 currency codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    USD,
    EUR,
    GBP,
    CAD,
    AUD,
}

impl CurrencyCode {
    /// Display symbol for the currency.
    #[must_use]
    pub const fn symbol(&self) -> &'static str {
        match self {
            Self::USD | Self::CAD | Self::AUD => "$",
            Self::EUR => "\u{20ac}",
            Self::GBP => "\u{00a3}",
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_from_cents() {
        assert_eq!(Price::from_cents(1999).amount, dec("19.99"));
        assert_eq!(Price::from_cents(-250).amount, dec("-2.50"));
    }

    #[test]
    fn test_times_is_exact() {
        // 0.1 * 3 drifts in binary floating point; decimal stays exact.
        let price = Price::usd(dec("0.10"));
        assert_eq!(price.times(3).amount, dec("0.30"));
    }

    #[test]
    fn test_round_half_even() {
        assert_eq!(Price::usd(dec("2.125")).round_to_cents().amount, dec("2.12"));
        assert_eq!(Price::usd(dec("2.135")).round_to_cents().amount, dec("2.14"));
        assert_eq!(Price::usd(dec("2.1251")).round_to_cents().amount, dec("2.13"));
    }

    #[test]
    fn test_display() {
        assert_eq!(Price::usd(dec("27")).to_string(), "$27.00");
        assert_eq!(Price::usd(dec("199.99")).to_string(), "$199.99");
        assert_eq!(Price::zero().to_string(), "$0.00");
    }

    #[test]
    fn test_checked_add_currency_mismatch() {
        let usd = Price::usd(dec("1.00"));
        let eur = Price::new(dec("1.00"), CurrencyCode::EUR);
        assert!(matches!(
            usd.checked_add(eur),
            Err(PriceError::CurrencyMismatch(CurrencyCode::USD, CurrencyCode::EUR))
        ));
        assert_eq!(usd.checked_add(usd).unwrap().amount, dec("2.00"));
    }

    #[test]
    fn test_parse_positive() {
        assert_eq!(Price::parse_positive(" 12.5 ").unwrap().amount, dec("12.50"));
        assert!(matches!(
            Price::parse_positive("abc"),
            Err(PriceError::Invalid(_))
        ));
        assert!(matches!(
            Price::parse_positive("0"),
            Err(PriceError::NotPositive)
        ));
        assert!(matches!(
            Price::parse_positive("-3"),
            Err(PriceError::NotPositive)
        ));
        assert!(matches!(
            Price::parse_positive("100000000"),
            Err(PriceError::TooLarge { .. })
        ));
        assert!(Price::parse_positive("99999999.99").is_ok());
    }

    #[test]
    fn test_parse_positive_rejects_sub_cent_amounts() {
        for input in ["0.004", "0.005", "0.0001"] {
            assert!(
                matches!(Price::parse_positive(input), Err(PriceError::NotPositive)),
                "{input}"
            );
        }
        assert_eq!(Price::parse_positive("0.006").unwrap().amount, dec("0.01"));
        assert_eq!(Price::parse_positive("0.015").unwrap().amount, dec("0.02"));
        assert!(matches!(
            Price::parse_positive("99999999.995"),
            Err(PriceError::TooLarge { .. })
        ));
    }

    #[test]
    fn test_serde_amount_is_string() {
        let json = serde_json::to_value(Price::usd(dec("10.00"))).unwrap();
        assert_eq!(json["amount"], "10.00");
        assert_eq!(json["currency_code"], "USD");
    }
}
