//! Daily settlement engine
//!
//! The core algorithm: select an account's unsettled payments for one
//! report-day, total them, and atomically fold the total into the account
//! through an append-only ledger entry.
//!
//! # Idempotency
//!
//! Settlement is guarded per `(account, day)`. The check runs inside the
//! account store's critical section, so concurrent settles of the same day
//! produce exactly one ledger entry; the losers observe the winner's entry
//! and return its summary. An unguarded re-append would double-count the
//! day's payments into the balance.

use crate::{error::Result, types::SettlementSummary, Error};
use chrono::{NaiveDate, Utc};
use payment_ledger::{
    round2, AccountStore, EntryKind, LedgerEntry, PaymentFilter, PaymentStore, ReportCalendar,
};
use rust_decimal::Decimal;
use std::sync::Arc;

/// What the critical section decided for this settle call.
enum SettleOutcome {
    /// A new ledger entry was appended
    Applied(LedgerEntry),
    /// The day was settled before; the prior entry is returned
    AlreadySettled(LedgerEntry),
}

/// Settlement engine
pub struct SettlementEngine {
    /// Payment log (read side)
    payments: Arc<PaymentStore>,

    /// Account ledger store (read-modify-write side)
    accounts: Arc<AccountStore>,

    /// Calendar for defaulting the settlement day
    calendar: ReportCalendar,
}

impl SettlementEngine {
    /// Create a new engine over shared stores.
    pub fn new(
        payments: Arc<PaymentStore>,
        accounts: Arc<AccountStore>,
        calendar: ReportCalendar,
    ) -> Self {
        Self {
            payments,
            accounts,
            calendar,
        }
    }

    /// Settle one report-day for one account.
    ///
    /// `date` must be a well-formed `YYYY-MM-DD` when provided; otherwise the
    /// current report-day is used.
    pub async fn settle(
        &self,
        account_id: &str,
        date: Option<&str>,
    ) -> Result<SettlementSummary> {
        let date = self.resolve_date(date)?;

        let matched = self.payments.list(&PaymentFilter {
            account_id: Some(account_id.to_string()),
            report_day: Some(date.clone()),
        })?;

        let total = round2(matched.iter().map(|p| p.amount).sum::<Decimal>());
        let count = matched.len() as u64;
        let settled_at = Utc::now();
        let entry_id = format!(
            "set_{}_{}",
            date.replace('-', ""),
            settled_at.timestamp_millis()
        );

        let entry_date = date.clone();
        let (account, outcome) = self.accounts.mutate(account_id, move |account| {
            if let Some(prior) = account.settlement_for(&entry_date) {
                return Ok::<_, Error>(SettleOutcome::AlreadySettled(prior.clone()));
            }

            let entry = LedgerEntry {
                id: entry_id,
                kind: EntryKind::DailySettlement,
                date: entry_date,
                count,
                amount: total,
                settled_at,
            };
            account.balance = round2(account.balance + entry.amount);
            account.ledger.push(entry.clone());

            Ok(SettleOutcome::Applied(entry))
        })?;

        let entry = match outcome {
            SettleOutcome::Applied(entry) => {
                tracing::info!(
                    account_id,
                    date = %entry.date,
                    count = entry.count,
                    amount = %entry.amount,
                    new_balance = %account.balance,
                    "Day settled"
                );
                entry
            }
            SettleOutcome::AlreadySettled(entry) => {
                tracing::info!(
                    account_id,
                    date = %entry.date,
                    ledger_entry_id = %entry.id,
                    "Day already settled, returning prior entry"
                );
                entry
            }
        };

        Ok(SettlementSummary {
            account_id: account_id.to_string(),
            date,
            total_payments: entry.count,
            total_amount: entry.amount,
            new_balance: account.balance,
            ledger_entry_id: entry.id,
        })
    }

    fn resolve_date(&self, date: Option<&str>) -> Result<String> {
        match date {
            Some(s) => {
                let parsed =
                    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| Error::InvalidDate)?;
                // parse_from_str tolerates unpadded fields ("2023-11-5"); only
                // the canonical form can match a stored report-day, so anything
                // else is rejected rather than settling a day that cannot exist.
                if parsed.format("%Y-%m-%d").to_string() != s {
                    return Err(Error::InvalidDate);
                }
                Ok(s.to_string())
            }
            None => Ok(self.calendar.day_string(None)),
        }
    }
}
