//! Balance cache
//!
//! Optional read-through cache consulted by the ledger. The interface is
//! infallible: any internal failure surfaces as a miss on reads and a no-op
//! on writes, so the ledger stays correct when every call does nothing.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;

use crate::domain::{AccountBalance, AccountId};

/// Cache port for balance rows.
#[async_trait]
pub trait BalanceCache: Send + Sync {
    /// Fetch a cached balance, or `None` on miss (including expiry).
    async fn get(&self, account_id: AccountId) -> Option<AccountBalance>;

    /// Store a balance with a time-to-live.
    async fn set(&self, balance: &AccountBalance, ttl: Duration);

    /// Drop any cached entry for the account.
    async fn delete(&self, account_id: AccountId);
}

/// Process-local cache with per-entry expiry. Expired entries are evicted
/// lazily when read.
#[derive(Default)]
pub struct InMemoryCache {
    entries: DashMap<AccountId, CacheEntry>,
}

struct CacheEntry {
    balance: AccountBalance,
    expires_at: Instant,
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl BalanceCache for InMemoryCache {
    async fn get(&self, account_id: AccountId) -> Option<AccountBalance> {
        let expired = match self.entries.get(&account_id) {
            Some(entry) if entry.expires_at > Instant::now() => {
                return Some(entry.balance.clone());
            }
            Some(_) => true,
            None => false,
        };

        if expired {
            self.entries.remove(&account_id);
        }
        None
    }

    async fn set(&self, balance: &AccountBalance, ttl: Duration) {
        self.entries.insert(
            balance.account_id,
            CacheEntry {
                balance: balance.clone(),
                expires_at: Instant::now() + ttl,
            },
        );
    }

    async fn delete(&self, account_id: AccountId) {
        self.entries.remove(&account_id);
    }
}
