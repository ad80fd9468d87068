//! Service facade
//!
//! Single entry point for external callers (an HTTP layer, a CLI, tests).
//! Owns the shared storage, both stores, and the engine; validates inbound
//! fields and translates engine results into boundary responses.

use crate::{
    config::Config,
    engine::SettlementEngine,
    error::Result,
    metrics::Metrics,
    types::{BalanceResponse, Health, LedgerResponse, SettlementSummary},
    Error,
};
use payment_ledger::{
    round2, AccountStore, NewPayment, Payment, PaymentFilter, PaymentStore, ReportCalendar,
    Storage,
};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::sync::Arc;

/// Payment and settlement service.
pub struct PaymentService {
    payments: Arc<PaymentStore>,
    accounts: Arc<AccountStore>,
    engine: SettlementEngine,
    metrics: Metrics,
}

impl PaymentService {
    /// Open the service: storage, stores, engine, metrics.
    pub fn open(config: Config) -> Result<Self> {
        let calendar = ReportCalendar::from_offset_minutes(config.ledger.report_offset_minutes);
        let storage = Arc::new(Storage::open(&config.ledger)?);
        let payments = Arc::new(PaymentStore::new(storage.clone(), calendar)?);
        let accounts = Arc::new(AccountStore::new(storage));
        let engine = SettlementEngine::new(payments.clone(), accounts.clone(), calendar);
        let metrics = Metrics::new().map_err(|e| Error::Metrics(e.to_string()))?;

        tracing::info!(service_name = %config.service_name, "Service opened");

        Ok(Self {
            payments,
            accounts,
            engine,
            metrics,
        })
    }

    /// Record a payment. Rejects a non-positive amount before the store is
    /// touched.
    pub async fn record_payment(&self, payment: NewPayment) -> Result<Payment> {
        if payment.amount <= Decimal::ZERO {
            return Err(Error::Validation("amount must be positive".to_string()));
        }

        let stored = self.payments.append(payment)?;
        self.metrics.record_payment();

        tracing::info!(
            transaction_id = %stored.transaction_id,
            account_id = %stored.account_id,
            amount = %stored.amount,
            report_day = %stored.report_day,
            "Payment recorded"
        );

        Ok(stored)
    }

    /// List payments, optionally filtered by account and/or report-day.
    pub async fn list_payments(
        &self,
        account_id: Option<String>,
        report_day: Option<String>,
    ) -> Result<Vec<Payment>> {
        Ok(self.payments.list(&PaymentFilter {
            account_id,
            report_day,
        })?)
    }

    /// Current balance of an account (zero for a never-seen account).
    pub async fn balance(&self, account_id: &str) -> Result<BalanceResponse> {
        let account = self.accounts.get(account_id)?;
        Ok(BalanceResponse {
            account_id: account_id.to_string(),
            balance: round2(account.balance),
        })
    }

    /// Settlement history of an account (empty for a never-seen account).
    pub async fn ledger(&self, account_id: &str) -> Result<LedgerResponse> {
        let account = self.accounts.get(account_id)?;
        Ok(LedgerResponse {
            account_id: account_id.to_string(),
            ledger: account.ledger,
        })
    }

    /// Settle one report-day for an account.
    pub async fn settle(
        &self,
        account_id: &str,
        date: Option<&str>,
    ) -> Result<SettlementSummary> {
        let summary = self.engine.settle(account_id, date).await?;
        self.metrics
            .record_settlement(summary.total_amount.to_f64().unwrap_or(0.0));
        Ok(summary)
    }

    /// Liveness probe.
    pub fn health(&self) -> Health {
        Health::default()
    }

    /// Metrics handle (for an exporter at the boundary).
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use payment_ledger::EntryKind;
    use tempfile::TempDir;

    fn test_service() -> (Arc<PaymentService>, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.ledger.data_dir = temp_dir.path().to_path_buf();
        (Arc::new(PaymentService::open(config).unwrap()), temp_dir)
    }

    fn payment(account_id: &str, cents: i64, ts: i64) -> NewPayment {
        NewPayment {
            user: "alice".to_string(),
            amount: Decimal::new(cents, 2),
            method: "upi".to_string(),
            account_id: account_id.to_string(),
            ts: Some(ts),
        }
    }

    #[tokio::test]
    async fn test_payment_and_settlement_flow() {
        let (service, _temp) = test_service();

        // Two payments for the same account and day (2023-11-15 IST)
        let p1 = service
            .record_payment(payment("acct_demo", 10050, 1_700_000_000))
            .await
            .unwrap();
        service
            .record_payment(payment("acct_demo", 20000, 1_700_000_100))
            .await
            .unwrap();

        let day = p1.report_day.clone();
        let listed = service
            .list_payments(Some("acct_demo".to_string()), Some(day.clone()))
            .await
            .unwrap();
        assert_eq!(listed.len(), 2);

        let summary = service.settle("acct_demo", Some(&day)).await.unwrap();
        assert_eq!(summary.total_payments, 2);
        assert_eq!(summary.total_amount, Decimal::new(30050, 2));

        let balance = service.balance("acct_demo").await.unwrap();
        assert_eq!(balance.balance, Decimal::new(30050, 2));

        let ledger = service.ledger("acct_demo").await.unwrap();
        assert_eq!(ledger.ledger.len(), 1);
        assert_eq!(ledger.ledger[0].kind, EntryKind::DailySettlement);
        assert_eq!(ledger.ledger[0].date, day);
    }

    #[tokio::test]
    async fn test_non_positive_amount_rejected_with_no_mutation() {
        let (service, _temp) = test_service();

        for cents in [0, -100] {
            let err = service
                .record_payment(payment("acct_demo", cents, 1_700_000_000))
                .await
                .unwrap_err();
            assert!(err.is_client_error());
        }

        assert!(service.list_payments(None, None).await.unwrap().is_empty());
        assert_eq!(service.metrics().payments_recorded.get(), 0);
    }

    #[tokio::test]
    async fn test_reads_are_idempotent() {
        let (service, _temp) = test_service();

        service
            .record_payment(payment("acct_demo", 10050, 1_700_000_000))
            .await
            .unwrap();
        service
            .settle("acct_demo", Some("2023-11-15"))
            .await
            .unwrap();

        let b1 = service.balance("acct_demo").await.unwrap();
        let b2 = service.balance("acct_demo").await.unwrap();
        assert_eq!(b1, b2);

        let l1 = service.ledger("acct_demo").await.unwrap();
        let l2 = service.ledger("acct_demo").await.unwrap();
        assert_eq!(l1, l2);
    }

    #[tokio::test]
    async fn test_unknown_account_reads_default() {
        let (service, _temp) = test_service();

        let balance = service.balance("never_seen").await.unwrap();
        assert_eq!(balance.balance, Decimal::ZERO);

        let ledger = service.ledger("never_seen").await.unwrap();
        assert!(ledger.ledger.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_settle_date_is_client_error() {
        let (service, _temp) = test_service();

        let err = service
            .settle("acct_demo", Some("15-11-2023"))
            .await
            .unwrap_err();
        assert!(err.is_client_error());
        assert_eq!(err.to_string(), "Invalid date format (use YYYY-MM-DD)");
    }

    #[tokio::test]
    async fn test_filtering_excludes_other_days_and_accounts() {
        let (service, _temp) = test_service();

        service
            .record_payment(payment("acct_a", 100, 1_700_000_000)) // 2023-11-15
            .await
            .unwrap();
        service
            .record_payment(payment("acct_a", 200, 1_700_100_000)) // 2023-11-16
            .await
            .unwrap();
        service
            .record_payment(payment("acct_b", 300, 1_700_000_000)) // 2023-11-15
            .await
            .unwrap();

        let filtered = service
            .list_payments(Some("acct_a".to_string()), Some("2023-11-15".to_string()))
            .await
            .unwrap();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].amount, Decimal::new(100, 2));
    }

    #[tokio::test]
    async fn test_settlement_metrics_recorded() {
        let (service, _temp) = test_service();

        service
            .record_payment(payment("acct_demo", 10050, 1_700_000_000))
            .await
            .unwrap();
        service
            .settle("acct_demo", Some("2023-11-15"))
            .await
            .unwrap();

        assert_eq!(service.metrics().payments_recorded.get(), 1);
        assert_eq!(service.metrics().settlements.get(), 1);
    }

    #[tokio::test]
    async fn test_health() {
        let (service, _temp) = test_service();
        let health = serde_json::to_value(service.health()).unwrap();
        assert_eq!(health, serde_json::json!({"status": "ok"}));
    }
}
