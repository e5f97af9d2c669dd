//! Shared integration test harness
//!
//! Wires the full engine over in-memory storage and offers the polling
//! helpers the asynchronous assertions need.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;

use fundflow::{
    BalanceCache, BalanceLedger, InMemoryCache, InMemoryStorage, PoolConfig, Processor, Storage,
    Transaction, TransactionId, TransactionService, TransactionStatus, WorkerPool,
};

const WAIT_BUDGET: Duration = Duration::from_secs(5);

pub struct TestEngine {
    pub ledger: Arc<BalanceLedger>,
    pub pool: Arc<WorkerPool>,
    pub service: TransactionService,
}

impl TestEngine {
    pub fn start() -> Self {
        Self::with_config(PoolConfig {
            workers: 4,
            queue_capacity: 32,
        })
    }

    pub fn with_config(config: PoolConfig) -> Self {
        let storage: Arc<dyn Storage> = Arc::new(InMemoryStorage::new());
        let cache: Arc<dyn BalanceCache> = Arc::new(InMemoryCache::new());

        let ledger = Arc::new(BalanceLedger::new(storage.clone(), Some(cache)));
        let processor = Arc::new(Processor::new(storage.clone(), ledger.clone()));
        let pool = Arc::new(WorkerPool::start(config, processor));
        let service = TransactionService::new(storage, pool.clone());

        Self {
            ledger,
            pool,
            service,
        }
    }

    /// Poll until the account's balance equals `expected`.
    pub async fn wait_for_balance(&self, account_id: i64, expected: i64) {
        timeout(WAIT_BUDGET, async {
            loop {
                if self.ledger.balance(account_id).await.unwrap().amount == expected {
                    return;
                }
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .unwrap_or_else(|_| {
            panic!("account {account_id} did not reach balance {expected} in time")
        });
    }

    /// Poll until the pool has finished `total` transactions.
    pub async fn wait_for_total(&self, total: u64) {
        timeout(WAIT_BUDGET, async {
            while self.pool.stats().total() < total {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .unwrap_or_else(|_| panic!("pool did not finish {total} transactions in time"));
    }

    /// Poll until the transaction reaches the given terminal status.
    pub async fn wait_for_status(
        &self,
        id: TransactionId,
        status: TransactionStatus,
    ) -> Transaction {
        timeout(WAIT_BUDGET, async {
            loop {
                let tx = self.service.transaction(id).await.unwrap();
                if tx.status == status {
                    return tx;
                }
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .unwrap_or_else(|_| panic!("transaction {id} did not reach status {status} in time"))
    }
}
