//! fundflow
//!
//! Asynchronous money-movement engine. Transactions are recorded
//! immediately with status `pending` and applied to account balances by a
//! bounded worker pool, with per-account locking, compensating rollback for
//! partial transfers, and an append-only audit trail.

pub mod cache;
pub mod config;
pub mod dispatcher;
pub mod domain;
pub mod error;
pub mod ledger;
pub mod locks;
pub mod processor;
pub mod service;
pub mod storage;

pub use cache::{BalanceCache, InMemoryCache};
pub use config::Config;
pub use dispatcher::{PoolConfig, PoolStats, TransactionProcessor, WorkerPool};
pub use domain::{
    AccountBalance, AccountId, Amount, AuditRecord, DomainError, Transaction, TransactionId,
    TransactionKind, TransactionStatus,
};
pub use error::{EngineError, EngineResult};
pub use ledger::BalanceLedger;
pub use locks::LockRegistry;
pub use processor::Processor;
pub use service::TransactionService;
pub use storage::{InMemoryStorage, PgStorage, Storage, StorageError};
