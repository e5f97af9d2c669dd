//! Transaction Processor
//!
//! Interprets a transaction's kind and drives the Balance Ledger. A
//! transaction arrives `pending` and leaves with exactly one terminal
//! status, written back unconditionally after all ledger calls for it have
//! returned — whether the outcome was success or failure.

use std::sync::Arc;

use async_trait::async_trait;

use crate::dispatcher::TransactionProcessor;
use crate::domain::{DomainError, Transaction, TransactionKind, TransactionStatus};
use crate::error::EngineResult;
use crate::ledger::BalanceLedger;
use crate::storage::Storage;

pub struct Processor {
    storage: Arc<dyn Storage>,
    ledger: Arc<BalanceLedger>,
}

impl Processor {
    pub fn new(storage: Arc<dyn Storage>, ledger: Arc<BalanceLedger>) -> Self {
        Self { storage, ledger }
    }

    /// Apply the transaction's ledger effects. The terminal status is the
    /// caller's concern; this only reports the outcome.
    async fn apply(&self, tx: &Transaction) -> EngineResult<()> {
        match tx.kind {
            TransactionKind::Deposit => {
                let to = tx
                    .to_account
                    .ok_or(DomainError::missing_participant("destination", tx.kind))?;
                self.ledger.credit(to, tx.amount).await?;
                Ok(())
            }

            TransactionKind::Withdraw => {
                let from = tx
                    .from_account
                    .ok_or(DomainError::missing_participant("source", tx.kind))?;
                self.ledger.debit(from, tx.amount).await?;
                Ok(())
            }

            TransactionKind::Transfer => {
                let from = tx
                    .from_account
                    .ok_or(DomainError::missing_participant("source", tx.kind))?;
                let to = tx
                    .to_account
                    .ok_or(DomainError::missing_participant("destination", tx.kind))?;

                // Locks are taken in call order: the source lock is released
                // before the destination lock is acquired, never both at
                // once, so opposite-direction transfers cannot deadlock.
                self.ledger.debit(from, tx.amount).await?;

                if let Err(credit_err) = self.ledger.credit(to, tx.amount).await {
                    // Refund the debited funds. The compensating credit is a
                    // regular ledger mutation: locked and audited.
                    return match self.ledger.credit(from, tx.amount).await {
                        Ok(_) => {
                            tracing::warn!(
                                tx_id = tx.id,
                                from_account = from,
                                to_account = to,
                                error = %credit_err,
                                "transfer credit failed, source refunded"
                            );
                            Err(credit_err)
                        }
                        Err(refund_err) => {
                            tracing::error!(
                                tx_id = tx.id,
                                from_account = from,
                                amount = tx.amount,
                                credit_error = %credit_err,
                                refund_error = %refund_err,
                                "transfer compensation failed, source account is short"
                            );
                            Err(DomainError::CompensationFailed {
                                credit_error: credit_err.to_string(),
                                refund_error: refund_err.to_string(),
                            }
                            .into())
                        }
                    };
                }

                Ok(())
            }
        }
    }
}

#[async_trait]
impl TransactionProcessor for Processor {
    async fn process(&self, tx: Transaction) -> EngineResult<()> {
        let outcome = self.apply(&tx).await;

        let status = match outcome {
            Ok(()) => TransactionStatus::Completed,
            Err(_) => TransactionStatus::Failed,
        };

        // At-most-once, best-effort: a failed write-back leaves the
        // transaction at its last stored status and is not retried.
        if let Err(err) = self.storage.update_transaction_status(tx.id, status).await {
            tracing::error!(
                tx_id = tx.id,
                status = %status,
                error = %err,
                "failed to record terminal transaction status"
            );
        }

        outcome
    }
}
