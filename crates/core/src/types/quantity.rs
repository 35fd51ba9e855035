//! Cart line quantity.

use core::fmt;
use core::num::NonZeroU32;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Errors that can occur when constructing a [`Quantity`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum QuantityError {
    /// Zero or negative quantity.
    #[error("quantity must be a positive integer")]
    NotPositive,
    /// Quantity does not fit in a `u32`.
    #[error("quantity must be at most {max}")]
    TooLarge {
        /// Largest accepted quantity.
        max: u32,
    },
    /// Input was not an integer.
    #[error("quantity must be a whole number, got {0:?}")]
    NotInteger(String),
}

/// A positive number of units of a product.
///
/// ## Examples
///
/// ```
/// use farm_fresh_core::Quantity;
///
/// let q = Quantity::new(3).unwrap();
/// assert_eq!(q.get(), 3);
/// assert!(Quantity::new(0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Quantity(NonZeroU32);

impl Quantity {
    /// A single unit.
    pub const ONE: Self = Self(NonZeroU32::MIN);

    /// Create a quantity from a raw count.
    ///
    /// # Errors
    ///
    /// Returns `QuantityError::NotPositive` if `count` is zero.
    pub const fn new(count: u32) -> Result<Self, QuantityError> {
        match NonZeroU32::new(count) {
            Some(n) => Ok(Self(n)),
            None => Err(QuantityError::NotPositive),
        }
    }

    /// Create a quantity from a signed count, as sent by JSON clients.
    ///
    /// # Errors
    ///
    /// Returns `QuantityError::NotPositive` for zero or negative counts and
    /// `QuantityError::TooLarge` if the count overflows `u32`.
    pub fn from_i64(count: i64) -> Result<Self, QuantityError> {
        if count <= 0 {
            return Err(QuantityError::NotPositive);
        }
        let count = u32::try_from(count).map_err(|_| QuantityError::TooLarge { max: u32::MAX })?;
        Self::new(count)
    }

    /// Returns the raw count.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0.get()
    }

    /// Add two quantities, returning `None` on overflow.
    #[must_use]
    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.get()).map(Self)
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u32> for Quantity {
    type Error = QuantityError;

    fn try_from(count: u32) -> Result<Self, Self::Error> {
        Self::new(count)
    }
}

impl std::str::FromStr for Quantity {
    type Err = QuantityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let count = s
            .trim()
            .parse::<i64>()
            .map_err(|_| QuantityError::NotInteger(s.to_owned()))?;
        Self::from_i64(count)
    }
}

impl Serialize for Quantity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u32(self.get())
    }
}

impl<'de> Deserialize<'de> for Quantity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct QuantityVisitor;

        impl Visitor<'_> for QuantityVisitor {
            type Value = Quantity;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a positive integer quantity")
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Quantity, E> {
                Quantity::from_i64(v).map_err(E::custom)
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Quantity, E> {
                let v = u32::try_from(v).map_err(|_| {
                    E::custom(QuantityError::TooLarge { max: u32::MAX })
                })?;
                Quantity::new(v).map_err(E::custom)
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<Quantity, E> {
                if v.fract() != 0.0 || !v.is_finite() {
                    return Err(E::custom(QuantityError::NotInteger(v.to_string())));
                }
                #[allow(clippy::cast_possible_truncation)] // integral and range-checked below
                let whole = v as i64;
                Quantity::from_i64(whole).map_err(E::custom)
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Quantity, E> {
                v.parse().map_err(E::custom)
            }
        }

        deserializer.deserialize_any(QuantityVisitor)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_is_rejected() {
        assert_eq!(Quantity::new(0), Err(QuantityError::NotPositive));
        assert_eq!(Quantity::from_i64(-2), Err(QuantityError::NotPositive));
    }

    #[test]
    fn test_checked_add() {
        let a = Quantity::new(3).unwrap();
        let b = Quantity::new(2).unwrap();
        assert_eq!(a.checked_add(b).unwrap().get(), 5);
        assert!(Quantity::new(u32::MAX).unwrap().checked_add(b).is_none());
    }

    #[test]
    fn test_deserialize_accepts_numbers_and_numeric_strings() {
        let q: Quantity = serde_json::from_str("4").unwrap();
        assert_eq!(q.get(), 4);
        let q: Quantity = serde_json::from_str("\"7\"").unwrap();
        assert_eq!(q.get(), 7);
        let q: Quantity = serde_json::from_str("2.0").unwrap();
        assert_eq!(q.get(), 2);
    }

    #[test]
    fn test_deserialize_rejects_bad_values() {
        assert!(serde_json::from_str::<Quantity>("0").is_err());
        assert!(serde_json::from_str::<Quantity>("-1").is_err());
        assert!(serde_json::from_str::<Quantity>("1.5").is_err());
        assert!(serde_json::from_str::<Quantity>("\"lots\"").is_err());
        assert!(serde_json::from_str::<Quantity>("true").is_err());
    }

    #[test]
    fn test_serializes_as_number() {
        let q = Quantity::new(12).unwrap();
        assert_eq!(serde_json::to_string(&q).unwrap(), "12");
    }
}
