//! In-memory storage backend
//!
//! Backs the integration tests and the load driver. Ids are assigned from
//! an atomic counter; rows live in RwLock-guarded maps.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::domain::{
    AccountBalance, AccountId, AuditRecord, NewAuditRecord, NewTransaction, Transaction,
    TransactionId, TransactionStatus,
};

use super::{Storage, StorageError};

pub struct InMemoryStorage {
    balances: RwLock<HashMap<AccountId, AccountBalance>>,
    transactions: RwLock<HashMap<TransactionId, Transaction>>,
    audit_records: RwLock<Vec<AuditRecord>>,
    next_transaction_id: AtomicI64,
    next_audit_id: AtomicI64,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self {
            balances: RwLock::new(HashMap::new()),
            transactions: RwLock::new(HashMap::new()),
            audit_records: RwLock::new(Vec::new()),
            next_transaction_id: AtomicI64::new(1),
            next_audit_id: AtomicI64::new(1),
        }
    }
}

impl Default for InMemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Storage for InMemoryStorage {
    async fn balance(&self, account_id: AccountId) -> Result<AccountBalance, StorageError> {
        self.balances
            .read()
            .await
            .get(&account_id)
            .cloned()
            .ok_or(StorageError::NotFound)
    }

    async fn create_balance(&self, balance: &AccountBalance) -> Result<(), StorageError> {
        self.balances
            .write()
            .await
            .insert(balance.account_id, balance.clone());
        Ok(())
    }

    async fn update_balance(&self, balance: &AccountBalance) -> Result<(), StorageError> {
        let mut balances = self.balances.write().await;
        match balances.get_mut(&balance.account_id) {
            Some(row) => {
                *row = balance.clone();
                Ok(())
            }
            None => Err(StorageError::NotFound),
        }
    }

    async fn create_transaction(&self, tx: NewTransaction) -> Result<Transaction, StorageError> {
        let id = self.next_transaction_id.fetch_add(1, Ordering::SeqCst);
        let transaction = Transaction {
            id,
            from_account: tx.from_account,
            to_account: tx.to_account,
            amount: tx.amount,
            kind: tx.kind,
            status: TransactionStatus::Pending,
            created_at: Utc::now(),
        };

        self.transactions
            .write()
            .await
            .insert(id, transaction.clone());

        Ok(transaction)
    }

    async fn transaction(&self, id: TransactionId) -> Result<Transaction, StorageError> {
        self.transactions
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(StorageError::NotFound)
    }

    async fn transactions_for_account(
        &self,
        account_id: AccountId,
    ) -> Result<Vec<Transaction>, StorageError> {
        let transactions = self.transactions.read().await;
        let mut rows: Vec<Transaction> = transactions
            .values()
            .filter(|tx| {
                tx.from_account == Some(account_id) || tx.to_account == Some(account_id)
            })
            .cloned()
            .collect();

        rows.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(rows)
    }

    async fn update_transaction_status(
        &self,
        id: TransactionId,
        status: TransactionStatus,
    ) -> Result<(), StorageError> {
        let mut transactions = self.transactions.write().await;
        match transactions.get_mut(&id) {
            Some(tx) => {
                tx.status = status;
                Ok(())
            }
            None => Err(StorageError::NotFound),
        }
    }

    async fn append_audit_record(&self, record: NewAuditRecord) -> Result<(), StorageError> {
        let id = self.next_audit_id.fetch_add(1, Ordering::SeqCst);
        self.audit_records.write().await.push(AuditRecord {
            id,
            entity_type: record.entity_type.to_string(),
            entity_id: record.entity_id,
            action: record.action.as_str().to_string(),
            details: record.details,
            created_at: Utc::now(),
        });
        Ok(())
    }

    async fn audit_records_for_entity(
        &self,
        entity_type: &str,
        entity_id: i64,
    ) -> Result<Vec<AuditRecord>, StorageError> {
        let records = self.audit_records.read().await;
        let mut rows: Vec<AuditRecord> = records
            .iter()
            .filter(|r| r.entity_type == entity_type && r.entity_id == entity_id)
            .cloned()
            .collect();

        rows.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(rows)
    }
}
