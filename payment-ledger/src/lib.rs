//! Payment Ledger Core
//!
//! Append-only payment log and per-account settlement ledger.
//!
//! # Architecture
//!
//! - **Payments are immutable**: recorded once, never modified or deleted
//! - **Balance through the ledger only**: an account balance changes solely
//!   by appending a ledger entry and adding its amount
//! - **Per-account serialization**: read-modify-write of one account is a
//!   single critical section; unrelated accounts never block each other
//!
//! # Invariants
//!
//! - `balance` == Σ(ledger entry amounts), rounded to 2 decimal places
//! - `report_day` is derived from `ts` once at creation and stored
//! - Transaction ids are unique within a store, even under concurrent inserts

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

pub mod accounts;
pub mod calendar;
pub mod config;
pub mod error;
pub mod payments;
pub mod storage;
pub mod types;

// Re-exports
pub use accounts::AccountStore;
pub use calendar::ReportCalendar;
pub use config::Config;
pub use error::{Error, Result};
pub use payments::{PaymentFilter, PaymentStore};
pub use storage::Storage;
pub use types::{round2, Account, EntryKind, LedgerEntry, NewPayment, Payment};
