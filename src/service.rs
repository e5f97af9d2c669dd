//! Transaction Service
//!
//! The submission path consumed by the API layer. A submitted transaction
//! is persisted with status `pending` and handed to the worker pool; the
//! caller gets the pending row back immediately and never blocks for
//! processing.

use std::sync::Arc;

use crate::dispatcher::WorkerPool;
use crate::domain::{AccountId, NewTransaction, Transaction, TransactionId, TransactionKind};
use crate::error::EngineResult;
use crate::storage::Storage;

pub struct TransactionService {
    storage: Arc<dyn Storage>,
    pool: Arc<WorkerPool>,
}

impl TransactionService {
    pub fn new(storage: Arc<dyn Storage>, pool: Arc<WorkerPool>) -> Self {
        Self { storage, pool }
    }

    /// Record a transaction and enqueue it for asynchronous processing.
    ///
    /// The kind string is parsed into the closed [`TransactionKind`] set
    /// before anything is persisted, so an unknown kind fails with
    /// `UnknownTransactionType` and never reaches the queue. Amount and
    /// participant validation happen later, in the processor: those
    /// failures are recorded as the transaction's terminal status.
    ///
    /// Suspends while the queue is full (backpressure), rather than
    /// dropping the submission.
    pub async fn submit(
        &self,
        from_account: Option<AccountId>,
        to_account: Option<AccountId>,
        amount: i64,
        kind: &str,
    ) -> EngineResult<Transaction> {
        let kind: TransactionKind = kind.parse()?;

        let tx = self
            .storage
            .create_transaction(NewTransaction::new(from_account, to_account, amount, kind))
            .await?;

        tracing::debug!(tx_id = tx.id, kind = %tx.kind, amount, "transaction submitted");

        self.pool.submit(tx.clone()).await?;

        Ok(tx)
    }

    /// Fetch a transaction by id.
    pub async fn transaction(&self, id: TransactionId) -> EngineResult<Transaction> {
        Ok(self.storage.transaction(id).await?)
    }

    /// Transactions involving the account, newest first.
    pub async fn history(&self, account_id: AccountId) -> EngineResult<Vec<Transaction>> {
        Ok(self.storage.transactions_for_account(account_id).await?)
    }
}
