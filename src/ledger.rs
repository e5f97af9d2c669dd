//! Balance Ledger
//!
//! Applies credits and debits to persisted account balances under the
//! per-account lock, with an optional read-through cache and an append-only
//! audit trail. Per-account exclusive locking (rather than one global lock)
//! lets unrelated accounts' mutations run fully in parallel while keeping
//! all mutations touching the same account serialized — the only requirement
//! for the non-negative balance invariant.
//!
//! The lock plus sequential read-then-write is the sole consistency
//! mechanism: ledger calls are not wrapped in database transactions, so a
//! concurrent writer bypassing this code path (a second process instance) is
//! not guarded against. Single-process in-memory locking is the consistency
//! boundary.

use std::sync::Arc;
use std::time::Duration;

use crate::cache::BalanceCache;
use crate::domain::{
    AccountBalance, AccountId, Amount, AmountError, AuditRecord, DomainError, NewAuditRecord,
    ENTITY_ACCOUNT,
};
use crate::error::EngineResult;
use crate::locks::LockRegistry;
use crate::storage::{Storage, StorageError};

/// Default time-to-live for cached balance rows.
const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(600);

pub struct BalanceLedger {
    storage: Arc<dyn Storage>,
    cache: Option<Arc<dyn BalanceCache>>,
    locks: LockRegistry,
    cache_ttl: Duration,
}

impl BalanceLedger {
    pub fn new(storage: Arc<dyn Storage>, cache: Option<Arc<dyn BalanceCache>>) -> Self {
        Self {
            storage,
            cache,
            locks: LockRegistry::new(),
            cache_ttl: DEFAULT_CACHE_TTL,
        }
    }

    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    /// Read an account's balance under its shared lock.
    ///
    /// A missing row is a zero balance, not an error, and the miss has no
    /// side effects on storage. A storage hit back-fills the cache.
    pub async fn balance(&self, account_id: AccountId) -> EngineResult<AccountBalance> {
        let lock = self.locks.acquire(account_id);
        let _guard = lock.read().await;

        if let Some(cache) = &self.cache {
            if let Some(balance) = cache.get(account_id).await {
                return Ok(balance);
            }
        }

        match self.storage.balance(account_id).await {
            Ok(balance) => {
                if let Some(cache) = &self.cache {
                    cache.set(&balance, self.cache_ttl).await;
                }
                Ok(balance)
            }
            Err(StorageError::NotFound) => Ok(AccountBalance::zero(account_id)),
            Err(err) => Err(err.into()),
        }
    }

    /// Add `amount` minor units to an account. Fails with `InvalidAmount`
    /// for a non-positive amount; otherwise succeeds unless persistence
    /// fails.
    pub async fn credit(&self, account_id: AccountId, amount: i64) -> EngineResult<AccountBalance> {
        let amount = Amount::new(amount).map_err(|_| DomainError::InvalidAmount(amount))?;
        self.adjust(account_id, amount.get()).await
    }

    /// Remove `amount` minor units from an account. Fails with
    /// `InvalidAmount` for a non-positive amount and with
    /// `InsufficientFunds` when no stored balance covers it; a failed debit
    /// performs no mutation.
    pub async fn debit(&self, account_id: AccountId, amount: i64) -> EngineResult<AccountBalance> {
        let amount = Amount::new(amount).map_err(|_| DomainError::InvalidAmount(amount))?;
        self.adjust(account_id, -amount.get()).await
    }

    /// Apply a signed delta under the account's exclusive lock: load (zero
    /// if absent), adjust with checked arithmetic, persist, invalidate the
    /// cache entry, append an audit record. The unified primitive behind
    /// `credit`/`debit`; compensating refunds go through the same path, so
    /// they are locked and audited like any other mutation.
    pub async fn adjust(&self, account_id: AccountId, delta: i64) -> EngineResult<AccountBalance> {
        let lock = self.locks.acquire(account_id);
        let _guard = lock.write().await;

        let (current, exists) = match self.storage.balance(account_id).await {
            Ok(balance) => (balance, true),
            Err(StorageError::NotFound) => (AccountBalance::zero(account_id), false),
            Err(err) => return Err(err.into()),
        };

        let updated = current.adjusted(delta).map_err(|err| match err {
            AmountError::Negative => DomainError::insufficient_funds(
                delta.saturating_abs(),
                current.amount,
            ),
            _ => DomainError::BalanceOverflow(account_id),
        })?;

        if exists {
            self.storage.update_balance(&updated).await?;
        } else {
            self.storage.create_balance(&updated).await?;
        }

        if let Some(cache) = &self.cache {
            cache.delete(account_id).await;
        }

        // Best-effort: the mutation is already applied, so an audit failure
        // is logged rather than propagated.
        let record = NewAuditRecord::balance_adjusted(account_id, delta, updated.amount);
        if let Err(err) = self.storage.append_audit_record(record).await {
            tracing::warn!(account_id, delta, error = %err, "failed to append audit record");
        }

        tracing::debug!(account_id, delta, balance = updated.amount, "balance adjusted");

        Ok(updated)
    }

    /// Audit records for an account, newest first.
    pub async fn history(&self, account_id: AccountId) -> EngineResult<Vec<AuditRecord>> {
        let records = self
            .storage
            .audit_records_for_entity(ENTITY_ACCOUNT, account_id)
            .await?;
        Ok(records)
    }
}
