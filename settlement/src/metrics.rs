//! Metrics collection for observability
//!
//! Prometheus metrics for the settlement service:
//!
//! - `payments_recorded_total` - Payments accepted by the facade
//! - `settlements_total` - Settlement calls completed
//! - `settlement_amount` - Histogram of settled totals

use prometheus::{Histogram, HistogramOpts, IntCounter, Registry};
use std::sync::Arc;

/// Metrics collector
#[derive(Clone)]
pub struct Metrics {
    /// Payments accepted
    pub payments_recorded: IntCounter,

    /// Settlement calls completed
    pub settlements: IntCounter,

    /// Settled total amounts
    pub settlement_amount: Histogram,

    /// Prometheus registry
    registry: Arc<Registry>,
}

impl Metrics {
    /// Create a collector with its own registry.
    ///
    /// Instance-scoped registration (no global registry) so multiple
    /// services in one process do not collide.
    pub fn new() -> prometheus::Result<Self> {
        let registry = Arc::new(Registry::new());

        let payments_recorded = IntCounter::new(
            "payments_recorded_total",
            "Payments accepted by the facade",
        )?;
        registry.register(Box::new(payments_recorded.clone()))?;

        let settlements = IntCounter::new(
            "settlements_total",
            "Settlement calls completed",
        )?;
        registry.register(Box::new(settlements.clone()))?;

        let settlement_amount = Histogram::with_opts(
            HistogramOpts::new("settlement_amount", "Settled total amounts").buckets(vec![
                0.0, 10.0, 100.0, 1_000.0, 10_000.0, 100_000.0, 1_000_000.0,
            ]),
        )?;
        registry.register(Box::new(settlement_amount.clone()))?;

        Ok(Self {
            payments_recorded,
            settlements,
            settlement_amount,
            registry,
        })
    }

    /// Record an accepted payment.
    pub fn record_payment(&self) {
        self.payments_recorded.inc();
    }

    /// Record a settlement and its total.
    pub fn record_settlement(&self, total: f64) {
        self.settlements.inc();
        self.settlement_amount.observe(total);
    }

    /// Get the metrics registry.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}
