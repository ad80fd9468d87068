//! Payment store
//!
//! Durable append-only collection of payment records. Identity is assigned
//! here: transaction id, server timestamp when the caller omits one, and the
//! report-day tag derived through the reporting calendar.
//!
//! Transaction ids embed the unix second for operator-facing debuggability,
//! but uniqueness comes from a monotonic sequence counter: two payments in
//! the same clock tick still get distinct ids, and the counter is reseeded
//! from the tail of the log on reopen.

use crate::{
    calendar::ReportCalendar,
    error::{Error, Result},
    storage::Storage,
    types::{NewPayment, Payment},
};
use rust_decimal::Decimal;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Filter for listing payments. Omitted fields match everything; provided
/// fields combine with AND semantics.
#[derive(Debug, Clone, Default)]
pub struct PaymentFilter {
    /// Match only this account
    pub account_id: Option<String>,

    /// Match only this report-day (`YYYY-MM-DD`)
    pub report_day: Option<String>,
}

/// Append-only payment store.
pub struct PaymentStore {
    storage: Arc<Storage>,
    calendar: ReportCalendar,
    next_seq: AtomicU64,
}

impl PaymentStore {
    /// Create a store over shared storage, seeding the sequence counter from
    /// the existing log.
    pub fn new(storage: Arc<Storage>, calendar: ReportCalendar) -> Result<Self> {
        let last = storage.last_payment_seq()?.unwrap_or(0);

        Ok(Self {
            storage,
            calendar,
            next_seq: AtomicU64::new(last + 1),
        })
    }

    /// Record a payment and return it with assigned identity.
    ///
    /// The facade validates the amount before calling; the store rejects a
    /// non-positive amount regardless rather than silently persisting it.
    /// A timestamp outside the representable date range is also rejected, so
    /// every stored payment carries a real report-day.
    pub fn append(&self, new: NewPayment) -> Result<Payment> {
        if new.amount <= Decimal::ZERO {
            return Err(Error::Validation("amount must be positive".to_string()));
        }

        let ts = new
            .ts
            .unwrap_or_else(|| chrono::Utc::now().timestamp());
        let report_day = self
            .calendar
            .checked_day_string(ts)
            .ok_or_else(|| Error::Validation("timestamp out of range".to_string()))?;
        let seq = self.next_seq.fetch_add(1, Ordering::SeqCst);

        let payment = Payment {
            transaction_id: format!("txn_{}_{}", ts, seq),
            user: new.user,
            amount: new.amount,
            method: new.method,
            account_id: new.account_id,
            ts,
            report_day,
        };

        self.storage.put_payment(seq, &payment)?;

        Ok(payment)
    }

    /// List payments matching the filter, in insertion order.
    pub fn list(&self, filter: &PaymentFilter) -> Result<Vec<Payment>> {
        let mut payments = match &filter.account_id {
            Some(account_id) => self.storage.scan_account_payments(account_id)?,
            None => self.storage.scan_payments()?,
        };

        if let Some(day) = &filter.report_day {
            payments.retain(|p| &p.report_day == day);
        }

        Ok(payments)
    }
}
