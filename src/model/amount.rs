//! Amount type for handling whole-Rupiah monetary values.
//!
//! This module provides the `Amount` type which wraps `Decimal` and handles parsing values that
//! may or may not include an `Rp` prefix and Indonesian thousands separators.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::error::Error;
use std::fmt;
use std::fmt::{Debug, Display, Formatter};
use std::iter::Sum;
use std::str::FromStr;

/// Represents an amount of money in whole Rupiah. It may be negative, e.g. an overdrawn balance.
///
/// Parsing accepts an optional `Rp` prefix, `.` as a thousands separator and `,` as a decimal
/// separator. Fractional Rupiah are rejected.
///
/// # Examples
///
/// ```
/// # use persony::model::Amount;
/// # use std::str::FromStr;
/// let amount = Amount::from_str("Rp 1.500.000").unwrap();
/// assert_eq!(amount.to_i64(), 1_500_000);
/// assert_eq!(amount.to_string(), "Rp 1.500.000");
/// ```
///
/// ```
/// # use persony::model::Amount;
/// # use std::str::FromStr;
/// let a = Amount::from_str("-5000").unwrap();
/// let b = Amount::from_str("-Rp 5.000").unwrap();
/// assert_eq!(a, b);
/// assert_eq!(a.to_string(), "-Rp 5.000");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount {
    /// Always integral and within the range of `i64`.
    value: Decimal,
}

impl Amount {
    pub const ZERO: Amount = Amount {
        value: Decimal::ZERO,
    };

    /// Creates a new Amount of `rupiah`.
    pub fn new(rupiah: i64) -> Self {
        Self {
            value: Decimal::from(rupiah),
        }
    }

    /// Returns the underlying Decimal value.
    pub fn value(&self) -> Decimal {
        self.value
    }

    /// Returns the amount as whole Rupiah.
    pub fn to_i64(&self) -> i64 {
        // Every constructor goes through `Amount::new`.
        self.value.to_i64().unwrap_or_default()
    }

    pub fn is_zero(&self) -> bool {
        self.value.is_zero()
    }

    /// Returns true if the amount is greater than zero.
    pub fn is_positive(&self) -> bool {
        !self.is_zero() && self.value.is_sign_positive()
    }

    /// Returns true if the amount is less than zero.
    pub fn is_negative(&self) -> bool {
        !self.is_zero() && self.value.is_sign_negative()
    }

    pub fn abs(&self) -> Self {
        Self {
            value: self.value.abs(),
        }
    }

    pub fn checked_add(&self, other: Amount) -> Result<Amount, AmountError> {
        self.to_i64()
            .checked_add(other.to_i64())
            .map(Amount::new)
            .ok_or_else(|| AmountError::OutOfRange(format!("{self} + {other}")))
    }

    pub fn checked_sub(&self, other: Amount) -> Result<Amount, AmountError> {
        self.to_i64()
            .checked_sub(other.to_i64())
            .map(Amount::new)
            .ok_or_else(|| AmountError::OutOfRange(format!("{self} - {other}")))
    }

    /// Returns `self / whole` as a float, or zero if `whole` is zero.
    pub fn ratio_of(&self, whole: Amount) -> f64 {
        if whole.is_zero() {
            return 0.0;
        }
        (self.value / whole.value).to_f64().unwrap_or_default()
    }
}

/// An error that can occur when parsing strings into `Amount` values.
pub enum AmountError {
    /// The number itself could not be parsed.
    Parse(rust_decimal::Error),
    /// The value had a non-zero fractional part.
    Fractional(String),
    /// The value does not fit in a 64 bit integer.
    OutOfRange(String),
}

impl Debug for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(self, f)
    }
}

impl Display for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            AmountError::Parse(e) => write!(f, "Invalid amount: {e}"),
            AmountError::Fractional(s) => {
                write!(f, "Amounts must be whole Rupiah, got '{s}'")
            }
            AmountError::OutOfRange(s) => write!(f, "Amount is out of range: {s}"),
        }
    }
}

impl std::error::Error for AmountError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            AmountError::Parse(e) => Some(e),
            _ => None,
        }
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();

        // Handle empty string
        if trimmed.is_empty() {
            return Ok(Amount::default());
        }

        let (negative, rest) = match trimmed.strip_prefix('-') {
            Some(after_minus) => (true, after_minus.trim_start()),
            None => (false, trimmed),
        };

        // Remove the currency prefix if present: "Rp 50.000", "rp50.000"
        let rest = match rest.get(..2) {
            Some(prefix) if prefix.eq_ignore_ascii_case("rp") => rest[2..].trim_start(),
            _ => rest,
        };

        // '.' groups thousands and ',' separates decimals
        let normalized = rest.replace('.', "").replace(',', ".");
        let value = Decimal::from_str(&normalized).map_err(AmountError::Parse)?;
        if !value.fract().is_zero() {
            return Err(AmountError::Fractional(trimmed.to_string()));
        }
        let value = if negative { -value.trunc() } else { value.trunc() };
        let rupiah = value
            .to_i64()
            .ok_or_else(|| AmountError::OutOfRange(trimmed.to_string()))?;
        Ok(Amount::new(rupiah))
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let sign = if self.is_negative() { "-" } else { "" };
        let digits = self.value.abs().trunc().normalize().to_string();
        write!(f, "{sign}Rp {}", group_thousands(&digits))
    }
}

/// Inserts a `.` between every group of three digits, counting from the right.
fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }
    grouped
}

impl Sum for Amount {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        Amount::new(iter.map(|a| a.to_i64()).fold(0i64, i64::saturating_add))
    }
}

impl<'a> Sum<&'a Amount> for Amount {
    fn sum<I: Iterator<Item = &'a Amount>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

impl From<i64> for Amount {
    fn from(value: i64) -> Self {
        Amount::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.value()
    }
}

impl Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Whole(i64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Whole(n) => Ok(Amount::new(n)),
            Raw::Text(s) => Amount::from_str(&s).map_err(serde::de::Error::custom),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_digits() {
        let amount = Amount::from_str("50000").unwrap();
        assert_eq!(amount.to_i64(), 50_000);
    }

    #[test]
    fn test_parse_with_prefix_and_separators() {
        let amount = Amount::from_str("Rp 14.570.800").unwrap();
        assert_eq!(amount.to_i64(), 14_570_800);
    }

    #[test]
    fn test_parse_prefix_without_space_any_case() {
        let amount = Amount::from_str("rp25.000").unwrap();
        assert_eq!(amount.to_i64(), 25_000);
    }

    #[test]
    fn test_parse_negative_with_prefix() {
        let amount = Amount::from_str("-Rp 5.000").unwrap();
        assert_eq!(amount.to_i64(), -5_000);
        assert!(amount.is_negative());
    }

    #[test]
    fn test_parse_empty_string() {
        let amount = Amount::from_str("   ").unwrap();
        assert!(amount.is_zero());
    }

    #[test]
    fn test_parse_zero_decimal_part_is_accepted() {
        let amount = Amount::from_str("1.000,00").unwrap();
        assert_eq!(amount.to_i64(), 1_000);
    }

    #[test]
    fn test_display_is_exact_across_i64_range() {
        assert_eq!(
            Amount::new(9_007_199_254_740_993).to_string(),
            "Rp 9.007.199.254.740.993"
        );
        assert_eq!(
            Amount::new(i64::MAX).to_string(),
            "Rp 9.223.372.036.854.775.807"
        );
        assert_eq!(Amount::new(-1_000).to_string(), "-Rp 1.000");
        assert_eq!(Amount::new(999).to_string(), "Rp 999");

        for n in [i64::MAX, i64::MIN, 9_007_199_254_740_993, -123_456_789] {
            let amount = Amount::new(n);
            assert_eq!(Amount::from_str(&amount.to_string()).unwrap(), amount);
            let json = serde_json::to_string(&amount).unwrap();
            assert_eq!(serde_json::from_str::<Amount>(&json).unwrap(), amount);
        }
    }

    #[test]
    fn test_parse_fractional_rejected() {
        let err = Amount::from_str("1.000,50").unwrap_err();
        assert!(err.to_string().contains("whole Rupiah"));
    }

    #[test]
    fn test_parse_garbage_rejected() {
        assert!(Amount::from_str("lima ribu").is_err());
        assert!(Amount::from_str("Rp").is_err());
    }

    #[test]
    fn test_parse_out_of_range() {
        let err = Amount::from_str("99999999999999999999999").unwrap_err();
        assert!(matches!(err, AmountError::OutOfRange(_)));
    }

    #[test]
    fn test_display() {
        assert_eq!(Amount::new(14_570_800).to_string(), "Rp 14.570.800");
        assert_eq!(Amount::new(-5_000).to_string(), "-Rp 5.000");
        assert_eq!(Amount::new(999).to_string(), "Rp 999");
        assert_eq!(Amount::ZERO.to_string(), "Rp 0");
    }

    #[test]
    fn test_display_parses_back() {
        let original = Amount::new(-1_234_567);
        let parsed = Amount::from_str(&original.to_string()).unwrap();
        assert_eq!(original, parsed);
    }

    #[test]
    fn test_serialize() {
        let json = serde_json::to_string(&Amount::new(50_000)).unwrap();
        assert_eq!(json, "\"Rp 50.000\"");
    }

    #[test]
    fn test_deserialize_number_or_string() {
        let a: Amount = serde_json::from_str("75000").unwrap();
        let b: Amount = serde_json::from_str("\"Rp 75.000\"").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_zero_is_not_positive_or_negative() {
        assert!(!Amount::ZERO.is_positive());
        assert!(!Amount::ZERO.is_negative());
    }

    #[test]
    fn test_checked_arithmetic() {
        let a = Amount::new(10_000);
        assert_eq!(a.checked_sub(Amount::new(25_000)).unwrap().to_i64(), -15_000);
        assert!(Amount::new(i64::MAX).checked_add(Amount::new(1)).is_err());
    }

    #[test]
    fn test_ratio_of() {
        assert_eq!(Amount::new(50).ratio_of(Amount::new(200)), 0.25);
        assert_eq!(Amount::new(50).ratio_of(Amount::ZERO), 0.0);
    }

    #[test]
    fn test_sum() {
        let total: Amount = [Amount::new(1), Amount::new(2), Amount::new(3)].iter().sum();
        assert_eq!(total.to_i64(), 6);
    }
}
