//! Core types for the payment ledger
//!
//! All types are designed for:
//! - Deterministic serialization (bincode)
//! - Exact arithmetic (Decimal for money)
//! - Immutability of recorded history

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Round an amount to 2 decimal places.
///
/// Uses round-half-to-even (banker's rounding), the conventional rule for
/// currency totals.
pub fn round2(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven)
}

/// Incoming payment fields, before the store assigns identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPayment {
    /// Free-text payer identifier
    pub user: String,

    /// Payment amount, must be > 0
    pub amount: Decimal,

    /// Payment method label (e.g. "upi", "credit_card")
    pub method: String,

    /// Account to be credited
    pub account_id: String,

    /// Caller-supplied timestamp (unix seconds); server-assigned if absent
    pub ts: Option<i64>,
}

/// A recorded payment. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    /// Unique transaction id (`txn_{ts}_{seq}`)
    pub transaction_id: String,

    /// Free-text payer identifier
    pub user: String,

    /// Payment amount (exact decimal, > 0)
    pub amount: Decimal,

    /// Payment method label
    pub method: String,

    /// Credited account
    pub account_id: String,

    /// Authoritative timestamp (unix seconds)
    pub ts: i64,

    /// Calendar day (`YYYY-MM-DD`, fixed reporting timezone) derived from
    /// `ts` at creation. Stored, never recomputed, so a later change of the
    /// reporting timezone does not regroup history.
    pub report_day: String,
}

/// Ledger entry kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum EntryKind {
    /// One day's payments summed into the balance
    DailySettlement,
}

/// An immutable audit record of a balance-affecting event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Unique id, derived from the settled day and settlement time
    /// (`set_{YYYYMMDD}_{millis}`)
    pub id: String,

    /// Entry kind
    pub kind: EntryKind,

    /// The report-day the included payments belong to
    pub date: String,

    /// Number of payments included
    pub count: u64,

    /// Total amount settled into this entry
    pub amount: Decimal,

    /// When the settlement ran (distinct from `date`)
    pub settled_at: DateTime<Utc>,
}

/// Account aggregate: running balance plus append-only settlement ledger.
///
/// A never-seen account is the default value (zero balance, empty ledger).
/// Reads never persist it; only a settlement mutation does.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Account {
    /// Running balance, equal to the sum of ledger entry amounts
    pub balance: Decimal,

    /// Ordered settlement history, append-only
    pub ledger: Vec<LedgerEntry>,
}

impl Account {
    /// Find the settlement entry for a report-day, if that day was settled.
    pub fn settlement_for(&self, date: &str) -> Option<&LedgerEntry> {
        self.ledger
            .iter()
            .find(|e| e.kind == EntryKind::DailySettlement && e.date == date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round2_half_to_even() {
        assert_eq!(round2(Decimal::new(10125, 3)), Decimal::new(1012, 2)); // 10.125 -> 10.12
        assert_eq!(round2(Decimal::new(10135, 3)), Decimal::new(1014, 2)); // 10.135 -> 10.14
        assert_eq!(round2(Decimal::new(30050, 2)), Decimal::new(30050, 2));
    }

    #[test]
    fn default_account_is_zero() {
        let account = Account::default();
        assert_eq!(account.balance, Decimal::ZERO);
        assert!(account.ledger.is_empty());
    }

    #[test]
    fn settlement_lookup_by_date() {
        let entry = LedgerEntry {
            id: "set_20240301_1709290800000".to_string(),
            kind: EntryKind::DailySettlement,
            date: "2024-03-01".to_string(),
            count: 2,
            amount: Decimal::new(30050, 2),
            settled_at: Utc::now(),
        };
        let account = Account {
            balance: entry.amount,
            ledger: vec![entry.clone()],
        };

        assert_eq!(account.settlement_for("2024-03-01"), Some(&entry));
        assert_eq!(account.settlement_for("2024-03-02"), None);
    }
}
