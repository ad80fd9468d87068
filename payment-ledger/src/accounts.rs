//! Account ledger store
//!
//! Durable mapping from account id to account state (balance plus ordered
//! ledger). Reads of an absent account return the zero-value default without
//! persisting anything; only `mutate` writes.
//!
//! # Concurrency
//!
//! `mutate` is an atomic read-modify-write: the load, the closure, and the
//! persist all happen under a per-account mutex, so two concurrent
//! settlements of the same account serialize instead of losing an update.
//! Mutations of different accounts take different locks and proceed in
//! parallel.

use crate::{
    error::{Error, Result},
    storage::Storage,
    types::Account,
};
use dashmap::DashMap;
use parking_lot::Mutex;
use std::sync::Arc;

/// Account ledger store.
pub struct AccountStore {
    storage: Arc<Storage>,
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl AccountStore {
    /// Create a store over shared storage.
    pub fn new(storage: Arc<Storage>) -> Self {
        Self {
            storage,
            locks: DashMap::new(),
        }
    }

    /// Current account state; the zero-value default if never persisted.
    pub fn get(&self, account_id: &str) -> Result<Account> {
        Ok(self.storage.get_account(account_id)?.unwrap_or_default())
    }

    /// Atomic read-modify-write of one account.
    ///
    /// Loads current state, applies `f`, persists the result, and returns the
    /// new state together with the closure's value. If `f` fails nothing is
    /// persisted. A failed persist surfaces as a storage error; it is never
    /// reported as success and never retried here.
    pub fn mutate<T, E, F>(&self, account_id: &str, f: F) -> std::result::Result<(Account, T), E>
    where
        F: FnOnce(&mut Account) -> std::result::Result<T, E>,
        E: From<Error>,
    {
        let lock = self
            .locks
            .entry(account_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let _guard = lock.lock();

        let mut account = self
            .storage
            .get_account(account_id)
            .map_err(E::from)?
            .unwrap_or_default();

        let value = f(&mut account)?;

        self.storage
            .put_account(account_id, &account)
            .map_err(E::from)?;

        Ok((account, value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::types::{round2, EntryKind, LedgerEntry};
    use rust_decimal::Decimal;
    use tempfile::TempDir;

    fn test_store() -> (Arc<AccountStore>, Arc<Storage>, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.data_dir = temp_dir.path().to_path_buf();

        let storage = Arc::new(Storage::open(&config).unwrap());
        (Arc::new(AccountStore::new(storage.clone())), storage, temp_dir)
    }

    fn settlement_entry(date: &str, cents: i64) -> LedgerEntry {
        LedgerEntry {
            id: format!("set_{}_{}", date.replace('-', ""), cents),
            kind: EntryKind::DailySettlement,
            date: date.to_string(),
            count: 1,
            amount: Decimal::new(cents, 2),
            settled_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn test_get_absent_returns_default_without_persisting() {
        let (store, storage, _temp) = test_store();

        let account = store.get("acct_a").unwrap();
        assert_eq!(account.balance, Decimal::ZERO);
        assert!(account.ledger.is_empty());

        // Read must not create a persisted record
        assert!(storage.get_account("acct_a").unwrap().is_none());
    }

    #[test]
    fn test_mutate_appends_and_persists() {
        let (store, storage, _temp) = test_store();

        let (account, entry_id) = store
            .mutate::<_, Error, _>("acct_a", |account| {
                let entry = settlement_entry("2024-03-01", 30050);
                account.balance = round2(account.balance + entry.amount);
                let id = entry.id.clone();
                account.ledger.push(entry);
                Ok(id)
            })
            .unwrap();

        assert_eq!(account.balance, Decimal::new(30050, 2));
        assert_eq!(account.ledger.len(), 1);
        assert_eq!(account.ledger[0].id, entry_id);

        let persisted = storage.get_account("acct_a").unwrap().unwrap();
        assert_eq!(persisted, account);
    }

    #[test]
    fn test_failed_closure_persists_nothing() {
        let (store, storage, _temp) = test_store();

        let result = store.mutate::<(), Error, _>("acct_a", |account| {
            account.balance = Decimal::new(99999, 2);
            Err(Error::Validation("rejected".to_string()))
        });

        assert!(result.is_err());
        assert!(storage.get_account("acct_a").unwrap().is_none());
    }

    #[test]
    fn test_concurrent_mutations_serialize() {
        let (store, _, _temp) = test_store();

        let mut handles = Vec::new();
        for _ in 0..8 {
            let store = store.clone();
            handles.push(std::thread::spawn(move || {
                for _ in 0..25 {
                    store
                        .mutate::<_, Error, _>("acct_a", |account| {
                            let entry = settlement_entry("2024-03-01", 100);
                            account.balance = round2(account.balance + entry.amount);
                            account.ledger.push(entry);
                            Ok(())
                        })
                        .unwrap();
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        // 200 appends of 1.00 each; a lost update would leave less
        let account = store.get("acct_a").unwrap();
        assert_eq!(account.balance, Decimal::new(20000, 2));
        assert_eq!(account.ledger.len(), 200);
    }

    #[test]
    fn test_different_accounts_are_independent() {
        let (store, _, _temp) = test_store();

        for (account_id, cents) in [("acct_a", 10000), ("acct_b", 25000)] {
            store
                .mutate::<_, Error, _>(account_id, |account| {
                    let entry = settlement_entry("2024-03-01", cents);
                    account.balance = round2(account.balance + entry.amount);
                    account.ledger.push(entry);
                    Ok(())
                })
                .unwrap();
        }

        assert_eq!(store.get("acct_a").unwrap().balance, Decimal::new(10000, 2));
        assert_eq!(store.get("acct_b").unwrap().balance, Decimal::new(25000, 2));
    }
}
