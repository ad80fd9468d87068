//! Settlement Engine
//!
//! Settles one day's accumulated payments into an account's running balance,
//! producing an auditable append-only ledger.
//!
//! # Architecture
//!
//! 1. **Selection**: list the account's payments for the target report-day
//! 2. **Totaling**: sum amounts, rounded to 2 decimal places
//! 3. **Application**: atomically append a ledger entry and bump the balance
//! 4. **Summary**: return what was settled and the new balance
//!
//! Settlement is idempotent per `(account, day)`: a repeat call returns the
//! prior entry's summary instead of double-counting the same payments.
//!
//! # Example
//!
//! ```no_run
//! use settlement::{Config, PaymentService};
//!
//! #[tokio::main]
//! async fn main() -> settlement::Result<()> {
//!     let service = PaymentService::open(Config::default())?;
//!
//!     let summary = service.settle("acct_demo", Some("2024-03-01")).await?;
//!     println!("settled {} payments, total {}",
//!              summary.total_payments, summary.total_amount);
//!
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

pub mod config;
pub mod engine;
pub mod error;
pub mod metrics;
pub mod service;
pub mod types;

// Re-exports
pub use config::Config;
pub use engine::SettlementEngine;
pub use error::{Error, Result};
pub use service::PaymentService;
pub use types::{BalanceResponse, Health, LedgerResponse, SettlementSummary};
