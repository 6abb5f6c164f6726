//! Order quantity type.
//!
//! A quantity is a positive, finite number of litres. It appears both as a
//! customer's default preference and on date-specific orders.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when validating a [`Quantity`].
#[derive(thiserror::Error, Debug, Clone)]
pub enum QuantityError {
    /// The input string is not a number.
    #[error("quantity must be a number")]
    NotANumber,
    /// The value is zero, negative, or not finite.
    #[error("quantity must be a positive number")]
    NotPositive,
}

/// A positive quantity in litres.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, PartialOrd)]
#[serde(transparent)]
#[cfg_attr(feature = "sqlite", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlite", sqlx(transparent))]
pub struct Quantity(f64);

impl Quantity {
    /// Create a `Quantity` from a raw value.
    ///
    /// # Errors
    ///
    /// Returns `QuantityError::NotPositive` if the value is zero, negative,
    /// infinite, or NaN.
    pub fn new(value: f64) -> Result<Self, QuantityError> {
        if !value.is_finite() || value <= 0.0 {
            return Err(QuantityError::NotPositive);
        }
        Ok(Self(value))
    }

    /// Parse a `Quantity` from form input.
    ///
    /// # Errors
    ///
    /// Returns `QuantityError::NotANumber` for non-numeric input and
    /// `QuantityError::NotPositive` for zero or negative values.
    pub fn parse(s: &str) -> Result<Self, QuantityError> {
        let value: f64 = s.trim().parse().map_err(|_| QuantityError::NotANumber)?;
        Self::new(value)
    }

    /// Get the underlying value in litres.
    #[must_use]
    pub const fn litres(&self) -> f64 {
        self.0
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Quantity {
    type Err = QuantityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_positive_values() {
        assert_eq!(Quantity::parse("1").unwrap().litres(), 1.0);
        assert_eq!(Quantity::parse("2.5").unwrap().litres(), 2.5);
        assert_eq!(Quantity::parse(" 0.25 ").unwrap().litres(), 0.25);
    }

    #[test]
    fn test_rejects_non_numeric() {
        assert!(matches!(
            Quantity::parse("two"),
            Err(QuantityError::NotANumber)
        ));
        assert!(matches!(Quantity::parse(""), Err(QuantityError::NotANumber)));
    }

    #[test]
    fn test_rejects_non_positive() {
        assert!(matches!(
            Quantity::parse("0"),
            Err(QuantityError::NotPositive)
        ));
        assert!(matches!(
            Quantity::parse("-1.5"),
            Err(QuantityError::NotPositive)
        ));
        assert!(matches!(
            Quantity::new(f64::NAN),
            Err(QuantityError::NotPositive)
        ));
        assert!(matches!(
            Quantity::new(f64::INFINITY),
            Err(QuantityError::NotPositive)
        ));
    }
}
