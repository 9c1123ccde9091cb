//! # Controller Metrics
//!
//! Metrics for controller operations: reconciliations, errors and requeues.

use crate::observability::metrics::registry::REGISTRY;
use anyhow::Result;
use prometheus::{Histogram, IntCounter, IntCounterVec};
use std::sync::LazyLock;

// Controller reconciliation metrics
static RECONCILIATIONS_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "amp_alertmanager_reconciliations_total",
        "Total number of reconciliations",
    )
    .expect("Failed to create RECONCILIATIONS_TOTAL metric - this should never happen")
});

static RECONCILIATION_ERRORS_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "amp_alertmanager_reconciliation_errors_total",
        "Total number of reconciliation errors",
    )
    .expect("Failed to create RECONCILIATION_ERRORS_TOTAL metric - this should never happen")
});

static RECONCILIATION_DURATION: LazyLock<Histogram> = LazyLock::new(|| {
    Histogram::with_opts(
        prometheus::HistogramOpts::new(
            "amp_alertmanager_reconciliation_duration_seconds",
            "Duration of reconciliation in seconds",
        )
        .buckets(vec![0.1, 0.5, 1.0, 2.0, 5.0, 10.0, 30.0]),
    )
    .expect("Failed to create RECONCILIATION_DURATION metric - this should never happen")
});

// Requeue metrics
static REQUEUES_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        prometheus::Opts::new(
            "amp_alertmanager_requeues_total",
            "Total number of reconciliation requeues",
        ),
        &["reason"],
    )
    .expect("Failed to create REQUEUES_TOTAL metric - this should never happen")
});

/// Register controller metrics with the registry
pub(crate) fn register_controller_metrics() -> Result<()> {
    REGISTRY.register(Box::new(RECONCILIATIONS_TOTAL.clone()))?;
    REGISTRY.register(Box::new(RECONCILIATION_ERRORS_TOTAL.clone()))?;
    REGISTRY.register(Box::new(RECONCILIATION_DURATION.clone()))?;
    REGISTRY.register(Box::new(REQUEUES_TOTAL.clone()))?;
    Ok(())
}

pub fn increment_reconciliations() {
    RECONCILIATIONS_TOTAL.inc();
}

pub fn increment_reconciliation_errors() {
    RECONCILIATION_ERRORS_TOTAL.inc();
}

pub fn observe_reconciliation_duration(duration: f64) {
    RECONCILIATION_DURATION.observe(duration);
}

/// Reasons: `transient-wait`, `state-guard`, `not-synced`, `resync`, `error-backoff`
pub fn increment_requeues_total(reason: &str) {
    REQUEUES_TOTAL.with_label_values(&[reason]).inc();
}
