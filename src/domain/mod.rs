//! Domain types
//!
//! Value objects, models and business errors shared across the engine.

mod amount;
mod audit;
mod balance;
mod error;
mod transaction;

pub use amount::{Amount, AmountError};
pub use audit::{AuditAction, AuditRecord, NewAuditRecord, ENTITY_ACCOUNT};
pub use balance::{AccountBalance, AccountId};
pub use error::DomainError;
pub use transaction::{
    NewTransaction, Transaction, TransactionId, TransactionKind, TransactionStatus,
};
