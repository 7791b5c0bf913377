//! Line-item quantity.

use core::fmt;
use core::num::NonZeroU32;

use serde::{Deserialize, Serialize};

/// Errors that can occur when constructing a [`Quantity`].
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityError {
    /// Zero or negative quantities are never stored.
    #[error("quantity must be at least 1 (got {0})")]
    NotPositive(i64),
    /// The requested quantity does not fit the wire type.
    #[error("quantity {0} is too large")]
    TooLarge(i64),
}

/// A positive item quantity.
///
/// Cart lines and "buy now" selections always carry at least one unit; any
/// request that would produce zero or fewer units is either rejected or
/// turned into a removal before it reaches the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u32")]
pub struct Quantity(NonZeroU32);

impl Quantity {
    /// A single unit.
    pub const ONE: Self = Self(NonZeroU32::MIN);

    /// Build a quantity from a signed count.
    ///
    /// # Errors
    ///
    /// Returns `QuantityError::NotPositive` for zero or negative input and
    /// `QuantityError::TooLarge` if the value exceeds `u32::MAX`.
    pub fn new(count: i64) -> Result<Self, QuantityError> {
        if count <= 0 {
            return Err(QuantityError::NotPositive(count));
        }
        let value = u32::try_from(count).map_err(|_| QuantityError::TooLarge(count))?;
        NonZeroU32::new(value)
            .map(Self)
            .ok_or(QuantityError::NotPositive(count))
    }

    /// Get the quantity as a plain integer.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0.get()
    }
}

impl TryFrom<i64> for Quantity {
    type Error = QuantityError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Quantity> for u32 {
    fn from(q: Quantity) -> Self {
        q.get()
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_non_positive() {
        assert_eq!(Quantity::new(0), Err(QuantityError::NotPositive(0)));
        assert_eq!(Quantity::new(-3), Err(QuantityError::NotPositive(-3)));
    }

    #[test]
    fn test_new_rejects_overflow() {
        let too_big = i64::from(u32::MAX) + 1;
        assert_eq!(Quantity::new(too_big), Err(QuantityError::TooLarge(too_big)));
    }

    #[test]
    fn test_serde_uses_plain_integer() {
        let q = Quantity::new(3).unwrap();
        assert_eq!(serde_json::to_string(&q).unwrap(), "3");
        assert_eq!(serde_json::from_str::<Quantity>("2").unwrap().get(), 2);
        assert!(serde_json::from_str::<Quantity>("0").is_err());
    }
}
