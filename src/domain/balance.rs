//! Account balance
//!
//! The persisted balance row for an account, plus the checked arithmetic
//! used to move it. A balance can be zero; it can never go negative.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::amount::AmountError;

/// Account identifier. Assigned by the storage collaborator.
pub type AccountId = i64;

/// Persisted balance for a single account, in minor units.
///
/// An account with no stored row has an implicit balance of zero; callers
/// should treat `Storage::NotFound` as [`AccountBalance::zero`], not as an
/// error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountBalance {
    pub account_id: AccountId,
    /// Minor units. Never negative once persisted.
    pub amount: i64,
    pub updated_at: DateTime<Utc>,
}

impl AccountBalance {
    /// The implicit balance of an account with no stored row.
    pub fn zero(account_id: AccountId) -> Self {
        Self {
            account_id,
            amount: 0,
            updated_at: Utc::now(),
        }
    }

    /// Apply a signed delta, producing the updated row.
    ///
    /// # Errors
    /// - `AmountError::Overflow` if the addition overflows i64
    /// - `AmountError::Negative` if the result would drop below zero
    pub fn adjusted(&self, delta: i64) -> Result<Self, AmountError> {
        let amount = self
            .amount
            .checked_add(delta)
            .ok_or(AmountError::Overflow)?;

        if amount < 0 {
            return Err(AmountError::Negative);
        }

        Ok(Self {
            account_id: self.account_id,
            amount,
            updated_at: Utc::now(),
        })
    }

    /// Check whether the balance covers a debit of `amount` minor units.
    pub fn is_sufficient_for(&self, amount: i64) -> bool {
        self.amount >= amount
    }
}
