//! # Controller
//!
//! Reconciliation of `AlertManagerDefinition` resources against AMP.
//!
//! - `reconciler`: resource manager state machine and kube-runtime glue
//! - `backoff`: Fibonacci backoff for hard errors
//! - `server`: metrics and probe endpoints

pub mod backoff;
pub mod reconciler;
pub mod server;
