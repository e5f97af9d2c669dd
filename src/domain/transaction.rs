//! Transaction model
//!
//! A submitted money-movement operation. Transactions are persisted with
//! status `pending` before they are enqueued; the processor writes the
//! terminal status exactly once after all ledger calls have returned.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::balance::AccountId;
use super::error::DomainError;

/// Transaction identifier. Assigned by the storage collaborator.
pub type TransactionId = i64;

/// The closed set of supported operations. Unknown kinds are rejected when
/// the submission string is parsed, before a transaction row exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Deposit,
    Withdraw,
    Transfer,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Deposit => "deposit",
            TransactionKind::Withdraw => "withdraw",
            TransactionKind::Transfer => "transfer",
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TransactionKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "deposit" => Ok(TransactionKind::Deposit),
            "withdraw" => Ok(TransactionKind::Withdraw),
            "transfer" => Ok(TransactionKind::Transfer),
            other => Err(DomainError::UnknownTransactionType(other.to_string())),
        }
    }
}

/// Processing state. `Pending` transitions to exactly one of the terminal
/// states and never back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Pending,
    Completed,
    Failed,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Pending => "pending",
            TransactionStatus::Completed => "completed",
            TransactionStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TransactionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(TransactionStatus::Pending),
            "completed" => Ok(TransactionStatus::Completed),
            "failed" => Ok(TransactionStatus::Failed),
            other => Err(format!("unknown transaction status: {other}")),
        }
    }
}

/// A persisted transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,

    /// Source account. Absent for deposits.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_account: Option<AccountId>,

    /// Destination account. Absent for withdrawals.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_account: Option<AccountId>,

    /// Minor units.
    pub amount: i64,

    pub kind: TransactionKind,
    pub status: TransactionStatus,
    pub created_at: DateTime<Utc>,
}

/// A transaction as handed to storage before an id exists.
/// Storage assigns the id and creation timestamp and returns the full row.
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub from_account: Option<AccountId>,
    pub to_account: Option<AccountId>,
    pub amount: i64,
    pub kind: TransactionKind,
}

impl NewTransaction {
    pub fn new(
        from_account: Option<AccountId>,
        to_account: Option<AccountId>,
        amount: i64,
        kind: TransactionKind,
    ) -> Self {
        Self {
            from_account,
            to_account,
            amount,
            kind,
        }
    }

    pub fn deposit(to_account: AccountId, amount: i64) -> Self {
        Self::new(None, Some(to_account), amount, TransactionKind::Deposit)
    }

    pub fn withdraw(from_account: AccountId, amount: i64) -> Self {
        Self::new(Some(from_account), None, amount, TransactionKind::Withdraw)
    }

    pub fn transfer(from_account: AccountId, to_account: AccountId, amount: i64) -> Self {
        Self::new(
            Some(from_account),
            Some(to_account),
            amount,
            TransactionKind::Transfer,
        )
    }
}
