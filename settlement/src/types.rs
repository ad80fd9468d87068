//! Boundary types for the settlement service

use payment_ledger::LedgerEntry;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Result of settling one `(account, day)` pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettlementSummary {
    /// Settled account
    pub account_id: String,

    /// Settled report-day (`YYYY-MM-DD`)
    pub date: String,

    /// Number of payments included
    pub total_payments: u64,

    /// Total amount settled (2 decimal places)
    pub total_amount: Decimal,

    /// Account balance after settlement
    pub new_balance: Decimal,

    /// Id of the ledger entry recording this settlement
    pub ledger_entry_id: String,
}

/// Balance projection of an account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceResponse {
    /// Account id
    pub account_id: String,

    /// Running balance, rounded to 2 decimal places
    pub balance: Decimal,
}

/// Ledger projection of an account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerResponse {
    /// Account id
    pub account_id: String,

    /// Settlement history, oldest first
    pub ledger: Vec<LedgerEntry>,
}

/// Liveness response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Health {
    /// Always `"ok"` while the service is up
    pub status: &'static str,
}

impl Default for Health {
    fn default() -> Self {
        Self { status: "ok" }
    }
}
