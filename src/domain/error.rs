//! Domain Error Types
//!
//! Pure business outcomes that don't depend on infrastructure. These errors
//! terminate a transaction as failed; they are recorded, never retried.

use thiserror::Error;

use super::balance::AccountId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Amount was zero or negative
    #[error("invalid amount: {0}")]
    InvalidAmount(i64),

    /// Debit exceeds the available balance
    #[error("insufficient funds: requested {requested}, available {available}")]
    InsufficientFunds { requested: i64, available: i64 },

    /// Required source/destination account absent for the transaction kind
    #[error("missing {role} account for {kind} transaction")]
    MissingParticipant {
        role: &'static str,
        kind: crate::domain::TransactionKind,
    },

    /// Submission named a kind outside the supported set
    #[error("unknown transaction type: {0}")]
    UnknownTransactionType(String),

    /// Checked arithmetic guard; the adjustment was not applied
    #[error("balance overflow for account {0}")]
    BalanceOverflow(AccountId),

    /// A transfer's compensating refund failed after its credit failed.
    /// Both failures are preserved; the source account may be short.
    #[error("transfer compensation failed: credit failed ({credit_error}), refund failed ({refund_error})")]
    CompensationFailed {
        credit_error: String,
        refund_error: String,
    },
}

impl DomainError {
    pub fn insufficient_funds(requested: i64, available: i64) -> Self {
        Self::InsufficientFunds {
            requested,
            available,
        }
    }

    pub fn missing_participant(role: &'static str, kind: crate::domain::TransactionKind) -> Self {
        Self::MissingParticipant { role, kind }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TransactionKind;

    #[test]
    fn test_insufficient_funds_message() {
        let err = DomainError::insufficient_funds(100, 50);
        assert!(err.to_string().contains("100"));
        assert!(err.to_string().contains("50"));
    }

    #[test]
    fn test_missing_participant_message() {
        let err = DomainError::missing_participant("source", TransactionKind::Withdraw);
        assert_eq!(
            err.to_string(),
            "missing source account for withdraw transaction"
        );
    }

    #[test]
    fn test_compensation_failed_preserves_both_errors() {
        let err = DomainError::CompensationFailed {
            credit_error: "storage down".to_string(),
            refund_error: "still down".to_string(),
        };
        let message = err.to_string();
        assert!(message.contains("storage down"));
        assert!(message.contains("still down"));
    }
}
