//! # Reconciler
//!
//! Core reconciliation logic for alert manager definitions.
//!
//! The resource manager is independent of Kubernetes: it works on immutable
//! [`Snapshot`] values and an [`AlertManagerApi`](crate::provider::AlertManagerApi)
//! backend. The `reconcile` and `status` modules translate between the custom
//! resource and snapshots.
//!
//! ## Sub-modules
//!
//! - `snapshot`: immutable resource view and condition types
//! - `lifecycle`: status classification predicates
//! - `delta`: field-level comparison of desired and observed snapshots
//! - `conditions`: terminal error policy and condition updater
//! - `error`: error taxonomy, requeue policy and pass outcomes
//! - `engine`: the resource manager
//! - `status`: status projection and patching
//! - `reconcile`: finalizer-driven entry point for kube-runtime
//! - `types`: controller context and runtime errors

pub mod conditions;
pub mod delta;
pub mod engine;
pub mod error;
pub mod lifecycle;
pub mod reconcile;
pub mod snapshot;
pub mod status;
pub mod types;

pub use conditions::{update_conditions, TerminalErrorPolicy};
pub use delta::{Delta, DeltaEntry, FieldPath, FieldValue};
pub use engine::ResourceManager;
pub use error::{Outcome, ReconcileError, RequeuePolicy, StateGuard};
pub use reconcile::reconcile;
pub use snapshot::{ConditionType, Snapshot, SnapshotCondition};
pub use types::{BackoffState, ControllerError, Reconciler};
