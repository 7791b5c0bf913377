//! Phone number type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`PhoneNumber`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PhoneError {
    /// The input string is empty.
    #[error("phone number cannot be empty")]
    Empty,
    /// The input is not exactly ten ASCII digits.
    #[error("phone number must be exactly {expected} digits")]
    InvalidFormat {
        /// Required digit count.
        expected: usize,
    },
}

/// A ten-digit domestic mobile number, stored without separators.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Number of digits in a valid phone number.
    pub const DIGITS: usize = 10;

    /// Parse a `PhoneNumber`.
    ///
    /// # Errors
    ///
    /// Returns an error unless the input is exactly ten ASCII digits.
    pub fn parse(s: &str) -> Result<Self, PhoneError> {
        if s.is_empty() {
            return Err(PhoneError::Empty);
        }

        if s.len() != Self::DIGITS || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(PhoneError::InvalidFormat {
                expected: Self::DIGITS,
            });
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the phone number as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for PhoneNumber {
    type Err = PhoneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid() {
        assert!(PhoneNumber::parse("9876543210").is_ok());
    }

    #[test]
    fn test_parse_rejects_wrong_length_and_non_digits() {
        assert_eq!(PhoneNumber::parse(""), Err(PhoneError::Empty));
        assert!(PhoneNumber::parse("98765").is_err());
        assert!(PhoneNumber::parse("98765432101").is_err());
        assert!(PhoneNumber::parse("98765-4321").is_err());
        assert!(PhoneNumber::parse("+919876543").is_err());
    }
}
