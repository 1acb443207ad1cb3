//! Prices
//!
//! Feed data carries prices either as numbers or as display strings such as
//! `"1,250"`. Both are decoded once into a [`Price`] so nothing downstream
//! ever re-parses text.
//!
//! Lenient parsing keeps every `.` it meets, so a dotted label such as
//! `"Rs. 900"` reads as `0.9`. Text typed by a user should go through
//! [`Price::from_str`] instead.

use std::{fmt, ops::Deref, str::FromStr};

use rust_decimal::Decimal;
use serde::{
    Deserialize, Deserializer, Serialize, Serializer,
    de::{self, Visitor},
};
use thiserror::Error;

/// Errors raised when strictly parsing a price.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PriceError {
    /// The text is not a decimal number.
    #[error("not a price: {text:?}")]
    Invalid {
        /// Rejected input
        text: String,
        /// Decoding failure
        #[source]
        source: rust_decimal::Error,
    },

    /// The amount is below zero.
    #[error("price cannot be negative: {0}")]
    Negative(Decimal),
}

/// A non-negative unit price.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Price {
    value: Decimal,
}

impl Price {
    /// A price of zero.
    pub const ZERO: Self = Self {
        value: Decimal::ZERO,
    };

    /// Creates a new price. Negative amounts are clamped to zero.
    #[must_use]
    pub fn new(value: Decimal) -> Self {
        Self {
            value: value.max(Decimal::ZERO),
        }
    }

    /// Parses a display string, keeping only ASCII digits and the first
    /// decimal point. Text without a usable number is a zero price.
    #[must_use]
    pub fn parse_lenient(text: &str) -> Self {
        let mut seen_point = false;

        let digits: String = text
            .chars()
            .filter(|c| c.is_ascii_digit() || *c == '.')
            .take_while(|c| {
                if *c != '.' {
                    return true;
                }

                !std::mem::replace(&mut seen_point, true)
            })
            .collect();

        let digits = digits.trim_end_matches('.');

        if digits.is_empty() {
            return Self::ZERO;
        }

        let parsed = if digits.starts_with('.') {
            Decimal::from_str(&format!("0{digits}"))
        } else {
            Decimal::from_str(digits)
        };

        parsed.map(Self::new).unwrap_or(Self::ZERO)
    }

    /// Converts a floating point amount. Non-finite values are a zero price.
    #[must_use]
    pub fn from_f64(value: f64) -> Self {
        Decimal::try_from(value)
            .map(Self::new)
            .unwrap_or(Self::ZERO)
    }

    /// Returns the amount for `quantity` units of this price.
    #[must_use]
    pub fn times(self, quantity: u32) -> Decimal {
        self.value.saturating_mul(Decimal::from(quantity))
    }

    /// Returns the underlying decimal amount.
    #[must_use]
    pub fn amount(self) -> Decimal {
        self.value
    }
}

impl FromStr for Price {
    type Err = PriceError;

    /// Parses a plain decimal amount. Grouping commas are allowed; any other
    /// text is rejected.
    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let digits = text.trim().replace(',', "");

        let value = Decimal::from_str(&digits).map_err(|source| PriceError::Invalid {
            text: text.to_string(),
            source,
        })?;

        if value.is_sign_negative() && !value.is_zero() {
            return Err(PriceError::Negative(value));
        }

        Ok(Self::new(value))
    }
}

impl Deref for Price {
    type Target = Decimal;

    fn deref(&self) -> &Self::Target {
        &self.value
    }
}

impl From<Decimal> for Price {
    fn from(value: Decimal) -> Self {
        Self::new(value)
    }
}

impl From<&str> for Price {
    fn from(text: &str) -> Self {
        Self::parse_lenient(text)
    }
}

impl From<u32> for Price {
    fn from(value: u32) -> Self {
        Self::new(Decimal::from(value))
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value.normalize())
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.value.to_string())
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(PriceVisitor)
    }
}

struct PriceVisitor;

impl Visitor<'_> for PriceVisitor {
    type Value = Price;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a price as a number or a display string")
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
        Ok(Price::parse_lenient(value))
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<Self::Value, E> {
        Ok(Price::new(Decimal::from(value)))
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<Self::Value, E> {
        Ok(Price::new(Decimal::from(value)))
    }

    fn visit_f64<E: de::Error>(self, value: f64) -> Result<Self::Value, E> {
        Ok(Price::from_f64(value))
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(Price::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn parse_lenient_strips_grouping_separators() {
        assert_eq!(Price::parse_lenient("1,250"), Price::from(1250));
    }

    #[test]
    fn parse_lenient_strips_currency_labels() {
        assert_eq!(Price::parse_lenient("Rs 1,250"), Price::from(1250));
        assert_eq!(Price::parse_lenient("PKR 99.50"), Price::new(Decimal::new(9950, 2)));
    }

    #[test]
    fn parse_lenient_keeps_point_from_dotted_label() {
        // "Rs. 99.50" reduces to ".99.50", read up to the second point.
        assert_eq!(
            Price::parse_lenient("Rs. 99.50"),
            Price::new(Decimal::new(99, 2))
        );
    }

    #[test]
    fn parse_lenient_without_digits_is_zero() {
        assert_eq!(Price::parse_lenient("call us"), Price::ZERO);
        assert_eq!(Price::parse_lenient(""), Price::ZERO);
        assert_eq!(Price::parse_lenient("."), Price::ZERO);
    }

    #[test]
    fn parse_lenient_stops_at_second_point() {
        assert_eq!(
            Price::parse_lenient("1.2.3"),
            Price::new(Decimal::new(12, 1))
        );
    }

    #[test]
    fn parse_lenient_accepts_leading_point() {
        assert_eq!(Price::parse_lenient(".5"), Price::new(Decimal::new(5, 1)));
    }

    #[test]
    fn from_str_accepts_plain_amounts() -> TestResult {
        assert_eq!("900".parse::<Price>()?, Price::from(900));
        assert_eq!(" 1,250.50 ".parse::<Price>()?, Price::new(Decimal::new(125_050, 2)));

        Ok(())
    }

    #[test]
    fn from_str_rejects_labels_and_negatives() {
        let labelled = "Rs. 900".parse::<Price>();

        assert!(
            matches!(labelled, Err(PriceError::Invalid { ref text, .. }) if text == "Rs. 900"),
            "expected Invalid, got {labelled:?}"
        );
        assert_eq!(
            "-5".parse::<Price>(),
            Err(PriceError::Negative(Decimal::from(-5)))
        );
    }

    #[test]
    fn negative_amounts_clamp_to_zero() {
        assert_eq!(Price::new(Decimal::from(-5)), Price::ZERO);
    }

    #[test]
    fn non_finite_floats_are_zero() {
        assert_eq!(Price::from_f64(f64::NAN), Price::ZERO);
        assert_eq!(Price::from_f64(f64::INFINITY), Price::ZERO);
    }

    #[test]
    fn times_multiplies_by_quantity() {
        assert_eq!(Price::from(500).times(3), Decimal::from(1500));
    }

    #[test]
    fn deserializes_from_numbers_and_strings() -> TestResult {
        let prices: Vec<Price> = serde_json::from_str(r#"[500, "1,000", 12.5, null]"#)?;

        assert_eq!(
            prices,
            vec![
                Price::from(500),
                Price::from(1000),
                Price::new(Decimal::new(125, 1)),
                Price::ZERO,
            ]
        );

        Ok(())
    }

    #[test]
    fn serializes_as_decimal_string() -> TestResult {
        let json = serde_json::to_string(&Price::from("1,250"))?;

        assert_eq!(json, r#""1250""#);

        Ok(())
    }

    #[test]
    fn display_drops_trailing_zeros() {
        assert_eq!(Price::new(Decimal::new(125_000, 2)).to_string(), "1250");
    }

    #[test]
    fn price_derefs_to_decimal() {
        let price = Price::from(100);

        assert_eq!(*price, Decimal::from(100));
    }
}
