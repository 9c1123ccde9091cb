//! # Provider Metrics
//!
//! Outcome of every AMP API call, tagged by verb and operation name.

use crate::observability::metrics::registry::REGISTRY;
use crate::provider::RemoteError;
use anyhow::Result;
use prometheus::IntCounterVec;
use std::sync::LazyLock;

static API_CALLS_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        prometheus::Opts::new(
            "amp_alertmanager_api_calls_total",
            "Total number of AMP API calls",
        ),
        &["verb", "operation"],
    )
    .expect("Failed to create API_CALLS_TOTAL metric - this should never happen")
});

static API_CALL_ERRORS_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        prometheus::Opts::new(
            "amp_alertmanager_api_call_errors_total",
            "Total number of failed AMP API calls by error code",
        ),
        &["verb", "operation", "code"],
    )
    .expect("Failed to create API_CALL_ERRORS_TOTAL metric - this should never happen")
});

/// Register provider metrics with the registry
pub(crate) fn register_provider_metrics() -> Result<()> {
    REGISTRY.register(Box::new(API_CALLS_TOTAL.clone()))?;
    REGISTRY.register(Box::new(API_CALL_ERRORS_TOTAL.clone()))?;
    Ok(())
}

/// Record the outcome of one API call
///
/// `verb` is one of `READ_ONE`, `CREATE`, `UPDATE`, `DELETE`.
pub fn record_api_call(verb: &str, operation: &str, error: Option<&RemoteError>) {
    API_CALLS_TOTAL.with_label_values(&[verb, operation]).inc();
    if let Some(error) = error {
        API_CALL_ERRORS_TOTAL
            .with_label_values(&[verb, operation, error.code_label()])
            .inc();
    }
}
