//! AMP Alert Manager Controller Library
//!
//! This library provides the core functionality for the Alert Manager Definition controller.
//! Tests are included in the module files (e.g., engine.rs) and under `tests/`.

// Re-export modules so they can be tested
pub mod config;
pub mod constants;
pub mod controller;
pub mod crd;
pub mod observability;
pub mod provider;
pub mod runtime;

// Re-export CRD types for convenience
pub use crd::*;
