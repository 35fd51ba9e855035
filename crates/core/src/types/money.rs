//! Indonesian rupiah amounts and their display format.
//!
//! Prices travel through the system as human-formatted strings such as
//! `"Rp12.345,67"`: a fixed `Rp` prefix, `.` as the thousands separator and
//! `,` as the decimal separator. [`Rupiah`] keeps the amount as a
//! [`Decimal`] and converts to and from that representation at the edges.
//!
//! Formatting rounds to two fractional digits (banker's rounding) and drops
//! trailing fractional zeros, so whole amounts render as `Rp30.000`.
//! Negative amounts render with a leading minus sign: `-Rp1.000`.

use core::fmt;
use core::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::quantity::Quantity;

/// Prefix prepended to every formatted amount.
pub const CURRENCY_PREFIX: &str = "Rp";

const THOUSANDS_SEPARATOR: char = '.';
const DECIMAL_SEPARATOR: char = ',';
const FRACTION_DIGITS: u32 = 2;

/// Errors that can occur when parsing a [`Rupiah`] amount.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CurrencyError {
    /// The input string is empty.
    #[error("currency amount cannot be empty")]
    Empty,
    /// The input is not a number once the prefix and separators are removed.
    #[error("malformed currency amount: {0:?}")]
    Malformed(String),
}

/// A monetary amount in rupiah.
///
/// ## Examples
///
/// ```
/// use farm_fresh_core::Rupiah;
///
/// let price = Rupiah::parse("Rp12.345,67").unwrap();
/// assert_eq!(price.to_string(), "Rp12.345,67");
///
/// let whole = Rupiah::parse("Rp10.000").unwrap();
/// assert_eq!(whole.format(), "Rp10.000");
///
/// assert!(Rupiah::parse("Rp12,3,4").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Rupiah(Decimal);

impl Rupiah {
    /// Zero rupiah.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Wrap a decimal amount.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Returns the underlying decimal amount.
    #[must_use]
    pub const fn amount(self) -> Decimal {
        self.0
    }

    /// Multiply by a quantity, or `None` if the result does not fit.
    #[must_use]
    pub fn checked_mul(self, quantity: Quantity) -> Option<Self> {
        self.0.checked_mul(Decimal::from(quantity.get())).map(Self)
    }

    /// Add two amounts, or `None` if the result does not fit.
    #[must_use]
    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    /// Sum amounts, or `None` as soon as the running total overflows.
    #[must_use]
    pub fn checked_sum<I: IntoIterator<Item = Self>>(amounts: I) -> Option<Self> {
        amounts
            .into_iter()
            .try_fold(Self::ZERO, Self::checked_add)
    }

    /// Parse a display string such as `"Rp12.345,67"`.
    ///
    /// The `Rp` prefix is optional, thousands separators must group digits in
    /// threes when present, and at most one `,` may introduce the fraction.
    ///
    /// # Errors
    ///
    /// Returns `CurrencyError::Empty` for blank input and
    /// `CurrencyError::Malformed` if the remaining text is not numeric.
    pub fn parse(display: &str) -> Result<Self, CurrencyError> {
        let trimmed = display.trim();
        if trimmed.is_empty() {
            return Err(CurrencyError::Empty);
        }

        let malformed = || CurrencyError::Malformed(display.to_owned());

        let (negative, rest) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest.trim_start()),
            None => (false, trimmed),
        };
        let digits = rest.strip_prefix(CURRENCY_PREFIX).unwrap_or(rest).trim_start();

        let (integer, fraction) = match digits.split_once(DECIMAL_SEPARATOR) {
            Some((integer, fraction)) => (integer, Some(fraction)),
            None => (digits, None),
        };

        if !is_grouped_integer(integer) {
            return Err(malformed());
        }
        if let Some(fraction) = fraction
            && (fraction.is_empty() || !fraction.chars().all(|c| c.is_ascii_digit()))
        {
            return Err(malformed());
        }

        let mut canonical: String = integer
            .chars()
            .filter(|c| *c != THOUSANDS_SEPARATOR)
            .collect();
        if let Some(fraction) = fraction {
            canonical.push('.');
            canonical.push_str(fraction);
        }

        let amount = Decimal::from_str(&canonical).map_err(|_| malformed())?;
        Ok(Self(if negative { -amount } else { amount }))
    }

    /// Render the amount as a display string such as `"Rp12.345,67"`.
    #[must_use]
    pub fn format(self) -> String {
        let rounded = self
            .0
            .round_dp_with_strategy(FRACTION_DIGITS, RoundingStrategy::MidpointNearestEven)
            .normalize();
        let negative = rounded.is_sign_negative() && !rounded.is_zero();

        let text = rounded.abs().to_string();
        let (integer, fraction) = match text.split_once('.') {
            Some((integer, fraction)) => (integer, Some(fraction)),
            None => (text.as_str(), None),
        };

        let mut out = String::with_capacity(text.len() + text.len() / 3 + 4);
        if negative {
            out.push('-');
        }
        out.push_str(CURRENCY_PREFIX);
        push_grouped(&mut out, integer);
        if let Some(fraction) = fraction {
            out.push(DECIMAL_SEPARATOR);
            out.push_str(fraction);
        }
        out
    }
}

/// Digits, optionally grouped as `d{1,3}(.ddd)*`.
fn is_grouped_integer(integer: &str) -> bool {
    if integer.is_empty() {
        return false;
    }
    if !integer.contains(THOUSANDS_SEPARATOR) {
        return integer.chars().all(|c| c.is_ascii_digit());
    }

    let mut groups = integer.split(THOUSANDS_SEPARATOR);
    let leading_ok = groups
        .next()
        .is_some_and(|g| (1..=3).contains(&g.len()) && g.chars().all(|c| c.is_ascii_digit()));
    leading_ok && groups.all(|g| g.len() == 3 && g.chars().all(|c| c.is_ascii_digit()))
}

fn push_grouped(out: &mut String, digits: &str) {
    let len = digits.len();
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(THOUSANDS_SEPARATOR);
        }
        out.push(ch);
    }
}

impl fmt::Display for Rupiah {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format())
    }
}

impl FromStr for Rupiah {
    type Err = CurrencyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<Decimal> for Rupiah {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl From<i64> for Rupiah {
    fn from(amount: i64) -> Self {
        Self(Decimal::from(amount))
    }
}

impl Serialize for Rupiah {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.format())
    }
}

impl<'de> Deserialize<'de> for Rupiah {
    /// Accepts either a display string or a bare JSON number.
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct RupiahVisitor;

        impl Visitor<'_> for RupiahVisitor {
            type Value = Rupiah;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a rupiah amount such as \"Rp12.345,67\" or a number")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Rupiah, E> {
                Rupiah::parse(v).map_err(E::custom)
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Rupiah, E> {
                Ok(Rupiah::from(v))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Rupiah, E> {
                Ok(Rupiah(Decimal::from(v)))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<Rupiah, E> {
                // Shortest round-trip text keeps 0.1 as 0.1 rather than its binary expansion
                Decimal::from_str(&v.to_string())
                    .map(Rupiah)
                    .map_err(|_| E::custom(CurrencyError::Malformed(v.to_string())))
            }
        }

        deserializer.deserialize_any(RupiahVisitor)
    }
}
