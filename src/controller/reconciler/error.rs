//! # Reconciliation Errors and Outcomes
//!
//! Error taxonomy of the resource manager and the values a pass returns.
//!
//! State-guard violations are not errors here: they travel inside
//! [`Outcome::RequeueAfter`] so the control loop treats them like any other
//! scheduled retry.

use super::snapshot::Snapshot;
use crate::crd::StatusCode;
use crate::provider::RemoteError;
use std::time::Duration;

/// Errors returned by the resource manager
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReconcileError {
    /// The definition does not exist remotely, or its identity is missing
    #[error("alert manager definition not found")]
    NotFound,

    /// Backend error, returned verbatim
    #[error(transparent)]
    Remote(#[from] RemoteError),

    /// Local validation failure that no retry can fix
    #[error("{0}")]
    Terminal(String),
}

impl ReconcileError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ReconcileError::NotFound)
    }
}

fn status_label(status: &Option<StatusCode>) -> &'static str {
    status.map_or("<nil>", StatusCode::as_str)
}

/// Reason a pass asked to be retried later
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum StateGuard {
    /// The backend is still working on the definition
    #[error("Alert Manager Definition in '{0}' state, cannot be modified or deleted")]
    InProgress(StatusCode),

    #[error("Cannot update alert manager definition as current status={}", status_label(.0))]
    UpdateBlocked(Option<StatusCode>),

    #[error(
        "Cannot delete alert manager definition as the status is not ACTIVE/CREATION_FAILED/UPDATE_FAILED, current status={}",
        status_label(.0)
    )]
    DeleteBlocked(Option<StatusCode>),
}

impl StateGuard {
    /// Requeue reason label for metrics
    pub fn metric_reason(&self) -> &'static str {
        match self {
            StateGuard::InProgress(_) => "transient-wait",
            StateGuard::UpdateBlocked(_) | StateGuard::DeleteBlocked(_) => "state-guard",
        }
    }
}

/// Waits handed back to the control loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequeuePolicy {
    /// While CREATING, UPDATING or DELETING
    pub transient: Duration,
    /// State-guard violations and unsynced resources
    pub default: Duration,
}

impl Default for RequeuePolicy {
    fn default() -> Self {
        use crate::constants::{DEFAULT_REQUEUE_SECS, DEFAULT_TRANSIENT_REQUEUE_SECS};
        Self {
            transient: Duration::from_secs(DEFAULT_TRANSIENT_REQUEUE_SECS),
            default: Duration::from_secs(DEFAULT_REQUEUE_SECS),
        }
    }
}

/// Result of a resource manager operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// New snapshot to persist
    Updated(Snapshot),
    /// Persist the snapshot and come back after `after`
    RequeueAfter {
        snapshot: Snapshot,
        after: Duration,
        reason: StateGuard,
    },
    /// The remote object is gone
    Removed,
}

impl Outcome {
    pub fn snapshot(&self) -> Option<&Snapshot> {
        match self {
            Outcome::Updated(snapshot) | Outcome::RequeueAfter { snapshot, .. } => Some(snapshot),
            Outcome::Removed => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_guard_messages() {
        assert_eq!(
            StateGuard::InProgress(StatusCode::Deleting).to_string(),
            "Alert Manager Definition in 'DELETING' state, cannot be modified or deleted"
        );
        assert_eq!(
            StateGuard::UpdateBlocked(None).to_string(),
            "Cannot update alert manager definition as current status=<nil>"
        );
        assert!(StateGuard::DeleteBlocked(Some(StatusCode::Creating))
            .to_string()
            .ends_with("current status=CREATING"));
    }

    #[test]
    fn test_state_guard_metric_reasons() {
        assert_eq!(
            StateGuard::InProgress(StatusCode::Creating).metric_reason(),
            "transient-wait"
        );
        assert_eq!(StateGuard::DeleteBlocked(None).metric_reason(), "state-guard");
    }

    #[test]
    fn test_remote_error_is_transparent() {
        let err: ReconcileError = RemoteError::service("ValidationException", "bad").into();
        assert_eq!(err.to_string(), "ValidationException: bad");
        assert!(!err.is_not_found());
        assert!(ReconcileError::NotFound.is_not_found());
    }

    #[test]
    fn test_removed_outcome_has_no_snapshot() {
        assert!(Outcome::Removed.snapshot().is_none());
        let outcome = Outcome::Updated(Snapshot::default());
        assert_eq!(outcome.snapshot(), Some(&Snapshot::default()));
    }
}
