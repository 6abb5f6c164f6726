//! Milkman code type.
//!
//! A milkman code is the 6-digit identifier customers use to link themselves
//! to a specific delivery person. Codes are drawn uniformly at random from
//! [100000, 999999] at registration and are globally unique across milkmen.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`MilkmanCode`].
#[derive(thiserror::Error, Debug, Clone)]
pub enum CodeError {
    /// The input string is empty.
    #[error("milkman code cannot be empty")]
    Empty,
    /// The input is not exactly six ASCII digits.
    #[error("milkman code must be exactly 6 digits")]
    Malformed,
    /// The numeric value falls outside [100000, 999999].
    #[error("milkman code must be between 100000 and 999999")]
    OutOfRange,
}

/// A 6-digit milkman code.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
#[cfg_attr(feature = "sqlite", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlite", sqlx(transparent))]
pub struct MilkmanCode(String);

impl MilkmanCode {
    /// Lowest valid code value.
    pub const MIN: u32 = 100_000;
    /// Highest valid code value.
    pub const MAX: u32 = 999_999;

    /// Parse a `MilkmanCode` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, not six ASCII digits, or
    /// outside [100000, 999999].
    pub fn parse(s: &str) -> Result<Self, CodeError> {
        let s = s.trim();

        if s.is_empty() {
            return Err(CodeError::Empty);
        }

        if s.len() != 6 || !s.chars().all(|c| c.is_ascii_digit()) {
            return Err(CodeError::Malformed);
        }

        let value: u32 = s.parse().map_err(|_| CodeError::Malformed)?;
        if !(Self::MIN..=Self::MAX).contains(&value) {
            return Err(CodeError::OutOfRange);
        }

        Ok(Self(s.to_owned()))
    }

    /// Draw a code uniformly at random from [100000, 999999].
    ///
    /// Uniqueness against already-registered codes is the caller's concern;
    /// the milkman directory retries on collision.
    pub fn random<R: rand::Rng + ?Sized>(rng: &mut R) -> Self {
        Self(rng.random_range(Self::MIN..=Self::MAX).to_string())
    }

    /// Returns the code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `MilkmanCode` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for MilkmanCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for MilkmanCode {
    type Err = CodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for MilkmanCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
