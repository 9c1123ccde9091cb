//! # Metrics Registry
//!
//! Prometheus metrics registry setup and registration.

use anyhow::Result;
use prometheus::{Encoder, Registry, TextEncoder};
use std::sync::LazyLock;

/// Global Prometheus metrics registry
pub(crate) static REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

/// Register all metrics with the Prometheus registry
///
/// Prometheus Registry::register() takes ownership (Box<dyn Collector>),
/// so we clone the metrics. Since Prometheus metrics internally use Arc,
/// cloning is cheap (just increments a reference count).
#[allow(
    clippy::missing_errors_doc,
    reason = "Error documentation is provided in doc comments"
)]
pub fn register_metrics() -> Result<()> {
    super::controller_metrics::register_controller_metrics()?;
    super::provider_metrics::register_provider_metrics()?;
    Ok(())
}

/// Render all registered metrics in the Prometheus text format
#[allow(
    clippy::missing_errors_doc,
    reason = "Error documentation is provided in doc comments"
)]
pub fn gather_metrics() -> Result<String> {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    encoder.encode(&REGISTRY.gather(), &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}
