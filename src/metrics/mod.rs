// Private module declaration
mod server;

use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry};

// Re-export for public API
pub use server::start_metrics_server;

// ============================================================================
// Metrics Module - Prometheus metrics for observability
// ============================================================================
//
// Provides metrics for:
// - Engine operations (throughput, latency, failure kinds)
// - Stock movement (units reserved by orders, units restored on cancel)
//
// All metrics are registered with Prometheus and can be scraped via /metrics
// ============================================================================

/// Central metrics registry for the entire application
pub struct Metrics {
    registry: Registry,

    // Engine Metrics
    pub engine_ops_total: IntCounterVec,
    pub engine_ops_failed: IntCounterVec,
    pub engine_op_duration: HistogramVec,

    // Stock Metrics
    pub stock_units_reserved: IntCounter,
    pub stock_units_restored: IntCounter,

    // Order Lifecycle Metrics
    pub orders_created: IntCounter,
    pub orders_cancelled: IntCounter,
}

impl Metrics {
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        // Engine Metrics
        let engine_ops_total = IntCounterVec::new(
            Opts::new("engine_ops_total", "Total engine operations committed"),
            &["operation"],
        )?;
        registry.register(Box::new(engine_ops_total.clone()))?;

        let engine_ops_failed = IntCounterVec::new(
            Opts::new("engine_ops_failed_total", "Total engine operations rejected"),
            &["operation", "kind"],
        )?;
        registry.register(Box::new(engine_ops_failed.clone()))?;

        let engine_op_duration = HistogramVec::new(
            HistogramOpts::new("engine_op_duration_seconds", "Engine operation duration")
                .buckets(vec![0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05, 0.1]),
            &["operation"],
        )?;
        registry.register(Box::new(engine_op_duration.clone()))?;

        // Stock Metrics
        let stock_units_reserved = IntCounter::new(
            "stock_units_reserved_total",
            "Units decremented from the catalog by order creation and item adds",
        )?;
        registry.register(Box::new(stock_units_reserved.clone()))?;

        let stock_units_restored = IntCounter::new(
            "stock_units_restored_total",
            "Units returned to the catalog by order cancellation",
        )?;
        registry.register(Box::new(stock_units_restored.clone()))?;

        // Order Lifecycle Metrics
        let orders_created = IntCounter::new("orders_created_total", "Orders created")?;
        registry.register(Box::new(orders_created.clone()))?;

        let orders_cancelled = IntCounter::new("orders_cancelled_total", "Orders cancelled")?;
        registry.register(Box::new(orders_cancelled.clone()))?;

        Ok(Self {
            registry,
            engine_ops_total,
            engine_ops_failed,
            engine_op_duration,
            stock_units_reserved,
            stock_units_restored,
            orders_created,
            orders_cancelled,
        })
    }

    /// Get the Prometheus registry for exposing metrics via HTTP
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Helper to record a committed engine operation
    pub fn record_engine_op(&self, operation: &str, duration_secs: f64) {
        self.engine_ops_total.with_label_values(&[operation]).inc();
        self.engine_op_duration
            .with_label_values(&[operation])
            .observe(duration_secs);
    }

    /// Helper to record a rejected engine operation
    pub fn record_engine_failure(&self, operation: &str, kind: &str) {
        self.engine_ops_failed
            .with_label_values(&[operation, kind])
            .inc();
    }

    /// Helper to record stock movement
    pub fn record_stock_reserved(&self, units: u32) {
        self.stock_units_reserved.inc_by(units as u64);
    }

    pub fn record_stock_restored(&self, units: u32) {
        self.stock_units_restored.inc_by(units as u64);
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_creation() {
        let metrics = Metrics::new().unwrap();
        assert!(metrics.registry.gather().len() > 0);
    }

    #[test]
    fn test_record_engine_op() {
        let metrics = Metrics::new().unwrap();
        metrics.record_engine_op("create_order", 0.002);

        let gathered = metrics.registry.gather();
        let total = gathered
            .iter()
            .find(|m| m.name() == "engine_ops_total")
            .unwrap();
        assert_eq!(total.metric[0].counter.value, Some(1.0));
    }

    #[test]
    fn test_record_engine_failure() {
        let metrics = Metrics::new().unwrap();
        metrics.record_engine_failure("create_order", "insufficient_stock");
        metrics.record_engine_failure("add_item", "order_not_found");

        let gathered = metrics.registry.gather();
        let failed = gathered
            .iter()
            .find(|m| m.name() == "engine_ops_failed_total")
            .unwrap();
        assert_eq!(failed.metric.len(), 2);
    }

    #[test]
    fn test_record_stock_movement() {
        let metrics = Metrics::new().unwrap();
        metrics.record_stock_reserved(3);
        metrics.record_stock_restored(3);

        let gathered = metrics.registry.gather();
        let restored = gathered
            .iter()
            .find(|m| m.name() == "stock_units_restored_total")
            .unwrap();
        assert_eq!(restored.metric[0].counter.value, Some(3.0));
    }
}
