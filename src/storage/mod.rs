//! Storage module
//!
//! Persistence port consumed by the ledger and the transaction service,
//! plus its backends: PostgreSQL for production, in-memory for tests and
//! the workload driver.

use async_trait::async_trait;

use crate::domain::{
    AccountBalance, AccountId, AuditRecord, NewAuditRecord, NewTransaction, Transaction,
    TransactionId, TransactionStatus,
};

mod memory;
mod postgres;

pub use memory::InMemoryStorage;
pub use postgres::{check_schema, PgStorage};

/// Storage errors
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// No row for the requested key. For balances this is not a failure:
    /// the ledger maps it to a zero balance.
    #[error("not found")]
    NotFound,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A stored row could not be mapped back to a domain value.
    #[error("corrupt row: {0}")]
    Decode(String),

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Persistence port for balances, transactions and the audit trail.
///
/// Implementations must make each individual call safe under concurrent use;
/// the engine provides no cross-call transactionality of its own — the
/// per-account lock plus sequential read-then-write is the consistency
/// mechanism.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Fetch the stored balance row for an account.
    /// Returns `StorageError::NotFound` when no row exists.
    async fn balance(&self, account_id: AccountId) -> Result<AccountBalance, StorageError>;

    /// Insert a balance row for a previously-unseen account.
    async fn create_balance(&self, balance: &AccountBalance) -> Result<(), StorageError>;

    /// Overwrite the balance row for an existing account.
    async fn update_balance(&self, balance: &AccountBalance) -> Result<(), StorageError>;

    /// Persist a new transaction with status `pending`; assigns the id and
    /// creation timestamp and returns the full row.
    async fn create_transaction(&self, tx: NewTransaction) -> Result<Transaction, StorageError>;

    /// Fetch a transaction by id.
    async fn transaction(&self, id: TransactionId) -> Result<Transaction, StorageError>;

    /// Transactions where the account appears as source or destination,
    /// newest first.
    async fn transactions_for_account(
        &self,
        account_id: AccountId,
    ) -> Result<Vec<Transaction>, StorageError>;

    /// Write the terminal status for a transaction.
    async fn update_transaction_status(
        &self,
        id: TransactionId,
        status: TransactionStatus,
    ) -> Result<(), StorageError>;

    /// Append an audit record. Callers treat a failure here as best-effort:
    /// it must not abort a balance mutation that already succeeded.
    async fn append_audit_record(&self, record: NewAuditRecord) -> Result<(), StorageError>;

    /// Audit records for an entity, newest first.
    async fn audit_records_for_entity(
        &self,
        entity_type: &str,
        entity_id: i64,
    ) -> Result<Vec<AuditRecord>, StorageError>;
}
