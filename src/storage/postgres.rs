//! PostgreSQL storage backend
//!
//! One query per operation; no cross-call transactions. Serialization of
//! balance mutations is the ledger's concern, not the database's.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::{
    AccountBalance, AccountId, AuditRecord, NewAuditRecord, NewTransaction, Transaction,
    TransactionId, TransactionStatus,
};

use super::{Storage, StorageError};

#[derive(Debug, Clone)]
pub struct PgStorage {
    pool: PgPool,
}

impl PgStorage {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

type TransactionRow = (
    i64,
    Option<i64>,
    Option<i64>,
    i64,
    String,
    String,
    DateTime<Utc>,
);

fn map_transaction(row: TransactionRow) -> Result<Transaction, StorageError> {
    let (id, from_account, to_account, amount, kind, status, created_at) = row;
    Ok(Transaction {
        id,
        from_account,
        to_account,
        amount,
        kind: kind
            .parse()
            .map_err(|_| StorageError::Decode(format!("transaction {id}: kind '{kind}'")))?,
        status: status
            .parse()
            .map_err(|_| StorageError::Decode(format!("transaction {id}: status '{status}'")))?,
        created_at,
    })
}

#[async_trait]
impl Storage for PgStorage {
    async fn balance(&self, account_id: AccountId) -> Result<AccountBalance, StorageError> {
        let row: Option<(i64, i64, DateTime<Utc>)> = sqlx::query_as(
            r#"
            SELECT account_id, amount, last_updated_at
            FROM balances
            WHERE account_id = $1
            "#,
        )
        .bind(account_id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some((account_id, amount, updated_at)) => Ok(AccountBalance {
                account_id,
                amount,
                updated_at,
            }),
            None => Err(StorageError::NotFound),
        }
    }

    async fn create_balance(&self, balance: &AccountBalance) -> Result<(), StorageError> {
        sqlx::query(
            r#"
            INSERT INTO balances (account_id, amount, last_updated_at)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(balance.account_id)
        .bind(balance.amount)
        .bind(balance.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn update_balance(&self, balance: &AccountBalance) -> Result<(), StorageError> {
        let rows_affected = sqlx::query(
            r#"
            UPDATE balances
            SET amount = $2, last_updated_at = $3
            WHERE account_id = $1
            "#,
        )
        .bind(balance.account_id)
        .bind(balance.amount)
        .bind(balance.updated_at)
        .execute(&self.pool)
        .await?
        .rows_affected();

        if rows_affected == 0 {
            return Err(StorageError::NotFound);
        }

        Ok(())
    }

    async fn create_transaction(&self, tx: NewTransaction) -> Result<Transaction, StorageError> {
        let row: (i64, DateTime<Utc>) = sqlx::query_as(
            r#"
            INSERT INTO transactions (from_account_id, to_account_id, amount, type, status)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, created_at
            "#,
        )
        .bind(tx.from_account)
        .bind(tx.to_account)
        .bind(tx.amount)
        .bind(tx.kind.as_str())
        .bind(TransactionStatus::Pending.as_str())
        .fetch_one(&self.pool)
        .await?;

        Ok(Transaction {
            id: row.0,
            from_account: tx.from_account,
            to_account: tx.to_account,
            amount: tx.amount,
            kind: tx.kind,
            status: TransactionStatus::Pending,
            created_at: row.1,
        })
    }

    async fn transaction(&self, id: TransactionId) -> Result<Transaction, StorageError> {
        let row: Option<TransactionRow> = sqlx::query_as(
            r#"
            SELECT id, from_account_id, to_account_id, amount, type, status, created_at
            FROM transactions
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => map_transaction(row),
            None => Err(StorageError::NotFound),
        }
    }

    async fn transactions_for_account(
        &self,
        account_id: AccountId,
    ) -> Result<Vec<Transaction>, StorageError> {
        let rows: Vec<TransactionRow> = sqlx::query_as(
            r#"
            SELECT id, from_account_id, to_account_id, amount, type, status, created_at
            FROM transactions
            WHERE from_account_id = $1 OR to_account_id = $1
            ORDER BY id DESC
            "#,
        )
        .bind(account_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(map_transaction).collect()
    }

    async fn update_transaction_status(
        &self,
        id: TransactionId,
        status: TransactionStatus,
    ) -> Result<(), StorageError> {
        sqlx::query(
            r#"
            UPDATE transactions SET status = $1 WHERE id = $2
            "#,
        )
        .bind(status.as_str())
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn append_audit_record(&self, record: NewAuditRecord) -> Result<(), StorageError> {
        sqlx::query(
            r#"
            INSERT INTO audit_logs (entity_type, entity_id, action, details)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(record.entity_type)
        .bind(record.entity_id)
        .bind(record.action.as_str())
        .bind(&record.details)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn audit_records_for_entity(
        &self,
        entity_type: &str,
        entity_id: i64,
    ) -> Result<Vec<AuditRecord>, StorageError> {
        let rows: Vec<(i64, String, i64, String, String, DateTime<Utc>)> = sqlx::query_as(
            r#"
            SELECT id, entity_type, entity_id, action, details, created_at
            FROM audit_logs
            WHERE entity_type = $1 AND entity_id = $2
            ORDER BY id DESC
            "#,
        )
        .bind(entity_type)
        .bind(entity_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(
                |(id, entity_type, entity_id, action, details, created_at)| AuditRecord {
                    id,
                    entity_type,
                    entity_id,
                    action,
                    details,
                    created_at,
                },
            )
            .collect())
    }
}

/// Check if required tables exist
pub async fn check_schema(pool: &PgPool) -> Result<bool, sqlx::Error> {
    let required_tables = ["balances", "transactions", "audit_logs"];

    for table in required_tables {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM information_schema.tables
                WHERE table_schema = 'public' AND table_name = $1
            )
            "#,
        )
        .bind(table)
        .fetch_one(pool)
        .await?;

        if !exists {
            tracing::error!("Required table '{}' does not exist", table);
            return Ok(false);
        }
    }

    Ok(true)
}
