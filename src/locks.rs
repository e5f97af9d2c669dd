//! Account Lock Registry
//!
//! One shared/exclusive async lock per account id, created on first use and
//! never removed: the map grows with the number of distinct accounts seen by
//! the process and entries live until it exits. That is an accepted memory
//! tradeoff for a bounded account population; an unbounded population would
//! need a sharded or evicting table instead.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::RwLock;

use crate::domain::AccountId;

/// Registry handing out the per-account lock that serializes all balance
/// mutation for that account.
#[derive(Default)]
pub struct LockRegistry {
    locks: DashMap<AccountId, Arc<RwLock<()>>>,
}

impl LockRegistry {
    pub fn new() -> Self {
        Self {
            locks: DashMap::new(),
        }
    }

    /// Get the lock for an account, creating it on first access. Repeated
    /// calls with the same id return handles to the same lock. First access
    /// from concurrent tasks is safe and does not block other accounts.
    pub fn acquire(&self, account_id: AccountId) -> Arc<RwLock<()>> {
        self.locks
            .entry(account_id)
            .or_insert_with(|| Arc::new(RwLock::new(())))
            .clone()
    }

    /// Number of accounts the registry has seen.
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[test]
    fn test_same_account_returns_same_lock() {
        let registry = LockRegistry::new();

        let first = registry.acquire(1);
        let second = registry.acquire(1);

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_distinct_accounts_get_distinct_locks() {
        let registry = LockRegistry::new();

        let a = registry.acquire(1);
        let b = registry.acquire(2);

        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(registry.len(), 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_first_access_creates_one_lock() {
        let registry = Arc::new(LockRegistry::new());

        let mut handles = Vec::new();
        for _ in 0..32 {
            let registry = registry.clone();
            handles.push(tokio::spawn(async move { registry.acquire(7) }));
        }

        let locks: Vec<_> = futures_join(handles).await;
        for lock in &locks[1..] {
            assert!(Arc::ptr_eq(&locks[0], lock));
        }
        assert_eq!(registry.len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_exclusive_holders_never_overlap() {
        let registry = Arc::new(LockRegistry::new());
        let in_section = Arc::new(AtomicUsize::new(0));
        let max_seen = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..16 {
            let registry = registry.clone();
            let in_section = in_section.clone();
            let max_seen = max_seen.clone();
            handles.push(tokio::spawn(async move {
                let lock = registry.acquire(1);
                let _guard = lock.write().await;
                let now = in_section.fetch_add(1, Ordering::SeqCst) + 1;
                max_seen.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(1)).await;
                in_section.fetch_sub(1, Ordering::SeqCst);
            }));
        }

        futures_join(handles).await;
        assert_eq!(max_seen.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_shared_holders_may_overlap() {
        let registry = LockRegistry::new();
        let lock = registry.acquire(1);

        let first = lock.read().await;
        let second = lock.read().await;
        drop(first);
        drop(second);
    }

    async fn futures_join<T>(handles: Vec<tokio::task::JoinHandle<T>>) -> Vec<T> {
        let mut results = Vec::with_capacity(handles.len());
        for handle in handles {
            results.push(handle.await.unwrap());
        }
        results
    }
}
