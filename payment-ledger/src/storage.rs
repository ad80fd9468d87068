//! Storage layer using RocksDB
//!
//! # Column Families
//!
//! - `payments` - Append-only payment log (key: big-endian sequence number,
//!   so key order is insertion order)
//! - `accounts` - Account aggregates (key: account_id)
//! - `indices` - Secondary index account_id -> payment sequence

use crate::{
    config::Config,
    error::{Error, Result},
    types::{Account, Payment},
};
use rocksdb::{
    BoundColumnFamily, ColumnFamilyDescriptor, DBCompressionType, Direction, IteratorMode,
    Options, WriteBatch, DB,
};
use std::sync::Arc;

const CF_PAYMENTS: &str = "payments";
const CF_ACCOUNTS: &str = "accounts";
const CF_INDICES: &str = "indices";

/// Storage wrapper for RocksDB
pub struct Storage {
    db: DB,
}

impl Storage {
    /// Open or create the database
    pub fn open(config: &Config) -> Result<Self> {
        let path = &config.data_dir;

        std::fs::create_dir_all(path)?;

        let mut db_opts = Options::default();
        db_opts.create_if_missing(true);
        db_opts.create_missing_column_families(true);

        // Tuning from config
        db_opts.set_write_buffer_size(config.rocksdb.write_buffer_size_mb * 1024 * 1024);
        db_opts.set_max_write_buffer_number(config.rocksdb.max_write_buffer_number);
        db_opts.set_max_background_jobs(config.rocksdb.max_background_jobs);

        let cf_descriptors = vec![
            ColumnFamilyDescriptor::new(CF_PAYMENTS, Self::cf_options_payments()),
            ColumnFamilyDescriptor::new(CF_ACCOUNTS, Self::cf_options_accounts()),
            ColumnFamilyDescriptor::new(CF_INDICES, Self::cf_options_indices()),
        ];

        let db = DB::open_cf_descriptors(&db_opts, path, cf_descriptors)?;

        tracing::info!(path = %path.display(), "Opened ledger database");

        Ok(Self { db })
    }

    // Column family options

    fn cf_options_payments() -> Options {
        let mut opts = Options::default();
        opts.set_compression_type(DBCompressionType::Zstd);
        opts
    }

    fn cf_options_accounts() -> Options {
        let mut opts = Options::default();
        // Accounts are frequently read, use LZ4 for speed
        opts.set_compression_type(DBCompressionType::Lz4);
        opts
    }

    fn cf_options_indices() -> Options {
        let mut opts = Options::default();
        opts.set_compression_type(DBCompressionType::Lz4);
        opts
    }

    fn cf(&self, name: &str) -> Result<Arc<BoundColumnFamily<'_>>> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| Error::Storage(format!("Column family {} not found", name)))
    }

    // Index key helpers
    //
    // NUL separator: account ids are free text, a zero byte keeps one id from
    // being a key-prefix of another.

    fn index_key(account_id: &str, seq: u64) -> Vec<u8> {
        let mut key = account_id.as_bytes().to_vec();
        key.push(0);
        key.extend_from_slice(&seq.to_be_bytes());
        key
    }

    fn index_prefix(account_id: &str) -> Vec<u8> {
        let mut key = account_id.as_bytes().to_vec();
        key.push(0);
        key
    }

    // Payment operations

    /// Append one payment: record plus account index in a single atomic batch.
    pub fn put_payment(&self, seq: u64, payment: &Payment) -> Result<()> {
        let cf_payments = self.cf(CF_PAYMENTS)?;
        let cf_indices = self.cf(CF_INDICES)?;

        let seq_key = seq.to_be_bytes();
        let value = bincode::serialize(payment)?;

        let mut batch = WriteBatch::default();
        batch.put_cf(&cf_payments, seq_key, &value);
        batch.put_cf(&cf_indices, Self::index_key(&payment.account_id, seq), seq_key);

        self.db.write(batch)?;

        tracing::debug!(
            transaction_id = %payment.transaction_id,
            account_id = %payment.account_id,
            "Payment appended"
        );

        Ok(())
    }

    /// All payments in insertion order.
    pub fn scan_payments(&self) -> Result<Vec<Payment>> {
        let cf = self.cf(CF_PAYMENTS)?;

        let mut payments = Vec::new();
        for item in self.db.iterator_cf(&cf, IteratorMode::Start) {
            let (_, value) = item?;
            payments.push(bincode::deserialize(&value)?);
        }

        Ok(payments)
    }

    /// One account's payments in insertion order, via the index.
    pub fn scan_account_payments(&self, account_id: &str) -> Result<Vec<Payment>> {
        let cf_indices = self.cf(CF_INDICES)?;
        let cf_payments = self.cf(CF_PAYMENTS)?;

        let prefix = Self::index_prefix(account_id);
        let iter = self
            .db
            .iterator_cf(&cf_indices, IteratorMode::From(prefix.as_slice(), Direction::Forward));

        let mut payments = Vec::new();
        for item in iter {
            let (key, seq_key) = item?;
            if !key.starts_with(&prefix) {
                break;
            }

            let value = self
                .db
                .get_cf(&cf_payments, &seq_key)?
                .ok_or_else(|| Error::Storage("Index points to missing payment".to_string()))?;
            payments.push(bincode::deserialize(&value)?);
        }

        Ok(payments)
    }

    /// Highest payment sequence number in the log, if any.
    ///
    /// Seeds the in-memory counter at open so ids stay unique across reopen.
    pub fn last_payment_seq(&self) -> Result<Option<u64>> {
        let cf = self.cf(CF_PAYMENTS)?;

        if let Some(item) = self.db.iterator_cf(&cf, IteratorMode::End).next() {
            let (key, _) = item?;
            let bytes: [u8; 8] = key
                .as_ref()
                .try_into()
                .map_err(|_| Error::Storage("Malformed payment key".to_string()))?;
            return Ok(Some(u64::from_be_bytes(bytes)));
        }

        Ok(None)
    }

    // Account operations

    /// Get an account, `None` if it was never persisted.
    pub fn get_account(&self, account_id: &str) -> Result<Option<Account>> {
        let cf = self.cf(CF_ACCOUNTS)?;

        match self.db.get_cf(&cf, account_id.as_bytes())? {
            Some(value) => Ok(Some(bincode::deserialize(&value)?)),
            None => Ok(None),
        }
    }

    /// Persist an account aggregate.
    pub fn put_account(&self, account_id: &str, account: &Account) -> Result<()> {
        let cf = self.cf(CF_ACCOUNTS)?;
        let value = bincode::serialize(account)?;

        self.db.put_cf(&cf, account_id.as_bytes(), &value)?;

        Ok(())
    }
}
