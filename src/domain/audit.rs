//! Audit records
//!
//! Append-only trail of applied balance mutations. Every adjustment the
//! ledger persists is followed by a best-effort audit append; the record
//! carries the signed delta and the resulting balance as a JSON detail
//! payload.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Entity type label used for account-scoped audit records.
pub const ENTITY_ACCOUNT: &str = "account";

/// Audit action types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditAction {
    BalanceCredited,
    BalanceDebited,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::BalanceCredited => "balance.credited",
            AuditAction::BalanceDebited => "balance.debited",
        }
    }

    /// Pick the action label for a signed balance delta.
    pub fn for_delta(delta: i64) -> Self {
        if delta < 0 {
            AuditAction::BalanceDebited
        } else {
            AuditAction::BalanceCredited
        }
    }
}

impl std::fmt::Display for AuditAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A persisted audit record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditRecord {
    pub id: i64,
    pub entity_type: String,
    pub entity_id: i64,
    pub action: String,
    pub details: String,
    pub created_at: DateTime<Utc>,
}

/// An audit record as handed to storage before an id exists.
#[derive(Debug, Clone)]
pub struct NewAuditRecord {
    pub entity_type: &'static str,
    pub entity_id: i64,
    pub action: AuditAction,
    pub details: String,
}

impl NewAuditRecord {
    /// Record an applied balance adjustment for an account.
    pub fn balance_adjusted(account_id: i64, delta: i64, balance_after: i64) -> Self {
        let details = serde_json::json!({
            "delta": delta,
            "balance_after": balance_after,
        })
        .to_string();

        Self {
            entity_type: ENTITY_ACCOUNT,
            entity_id: account_id,
            action: AuditAction::for_delta(delta),
            details,
        }
    }
}
