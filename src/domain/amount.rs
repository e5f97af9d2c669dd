//! Amount type
//!
//! Domain primitive for monetary quantities in integer minor units (cents).
//! Amounts are validated at construction time, ensuring invalid values
//! cannot exist in the system. Fractional units do not exist at this layer.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Amount represents a validated quantity of money in minor units.
///
/// # Invariants
/// - Value is always positive (> 0)
///
/// # Example
/// ```
/// use fundflow::domain::Amount;
///
/// let amount = Amount::new(1_000).unwrap();
/// assert_eq!(amount.get(), 1_000);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Amount(i64);

/// Errors that can occur when creating an Amount or applying it to a balance
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AmountError {
    #[error("amount must be positive (got {0})")]
    NotPositive(i64),

    #[error("balance arithmetic overflowed")]
    Overflow,

    #[error("resulting balance would be negative")]
    Negative,
}

impl Amount {
    /// Create a new Amount with validation.
    ///
    /// # Errors
    /// - `AmountError::NotPositive` if value <= 0
    pub fn new(value: i64) -> Result<Self, AmountError> {
        if value <= 0 {
            return Err(AmountError::NotPositive(value));
        }
        Ok(Self(value))
    }

    /// Get the underlying minor-unit value.
    pub fn get(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<i64> for Amount {
    type Error = AmountError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Amount::new(value)
    }
}

impl From<Amount> for i64 {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}
