//! # Metrics Module
//!
//! Prometheus metrics for monitoring the controller, organized by responsibility.
//!
//! ## Sub-modules
//!
//! - `registry` - Metrics registry setup and registration
//! - `controller_metrics` - Controller-specific metrics (reconciliations, requeues)
//! - `provider_metrics` - AMP API call outcomes

pub mod controller_metrics;
pub mod provider_metrics;
pub mod registry;

pub use controller_metrics::*;
pub use provider_metrics::*;
pub use registry::*;
