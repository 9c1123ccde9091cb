//! # Reconciler Types
//!
//! Controller context and the errors surfaced to kube-runtime.

use super::engine::ResourceManager;
use super::error::{ReconcileError, StateGuard};
use crate::config::ControllerConfig;
use crate::controller::backoff::FibonacciBackoff;
use crate::provider::AlertManagerApi;
use kube::Client;
use kube_runtime::finalizer;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Errors returned to the controller runtime
#[derive(Debug, thiserror::Error)]
pub enum ControllerError {
    #[error(transparent)]
    Reconcile(#[from] ReconcileError),

    #[error("Kubernetes API error: {0}")]
    Kube(#[from] kube::Error),

    #[error("Finalizer error: {0}")]
    Finalizer(Box<finalizer::Error<ControllerError>>),

    /// Cleanup is blocked until the definition leaves its current state
    #[error("{reason}")]
    RequeueNeeded { after: Duration, reason: StateGuard },
}

impl ControllerError {
    /// Wait requested by a state guard, looking through finalizer wrapping
    pub fn requeue_after(&self) -> Option<(Duration, StateGuard)> {
        match self {
            ControllerError::RequeueNeeded { after, reason } => Some((*after, *reason)),
            ControllerError::Finalizer(inner) => match inner.as_ref() {
                finalizer::Error::ApplyFailed(e) | finalizer::Error::CleanupFailed(e) => {
                    e.requeue_after()
                }
                _ => None,
            },
            _ => None,
        }
    }
}

/// Per-resource error backoff
#[derive(Debug, Clone)]
pub struct BackoffState {
    pub backoff: FibonacciBackoff,
    pub error_count: u32,
}

impl BackoffState {
    pub fn new(min_minutes: u64, max_minutes: u64) -> Self {
        Self {
            backoff: FibonacciBackoff::new(min_minutes, max_minutes),
            error_count: 0,
        }
    }

    pub fn increment_error(&mut self) {
        self.error_count = self.error_count.saturating_add(1);
    }
}

/// Shared context handed to every reconciliation
pub struct Reconciler {
    pub client: Client,
    pub manager: ResourceManager,
    /// Requeue interval for resources that are in sync
    pub resync_period: Duration,
    /// Region written to `.status.region`
    pub region: Option<String>,
    /// Account written to `.status.ownerAccountID`
    pub owner_account_id: Option<String>,
    /// Keyed by `namespace/name`
    pub backoff_states: Mutex<HashMap<String, BackoffState>>,
}

impl std::fmt::Debug for Reconciler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reconciler")
            .field("manager", &self.manager)
            .field("resync_period", &self.resync_period)
            .field("region", &self.region)
            .field("owner_account_id", &self.owner_account_id)
            .finish_non_exhaustive()
    }
}

impl Reconciler {
    pub fn new(
        client: Client,
        api: Arc<dyn AlertManagerApi>,
        config: &ControllerConfig,
        region: Option<String>,
        owner_account_id: Option<String>,
    ) -> Self {
        Self {
            client,
            manager: ResourceManager::new(api, config.requeue_policy(), config.terminal_policy()),
            resync_period: config.resync_period(),
            region,
            owner_account_id,
            backoff_states: Mutex::new(HashMap::new()),
        }
    }

    /// Forget the error history of a resource after a successful pass
    pub fn reset_backoff(&self, resource_key: &str) {
        if let Ok(mut states) = self.backoff_states.lock() {
            states.remove(resource_key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crd::StatusCode;

    #[test]
    fn test_requeue_after_through_cleanup_failure() {
        let reason = StateGuard::InProgress(StatusCode::Deleting);
        let err = ControllerError::Finalizer(Box::new(finalizer::Error::CleanupFailed(
            ControllerError::RequeueNeeded {
                after: Duration::from_secs(10),
                reason,
            },
        )));
        assert_eq!(err.requeue_after(), Some((Duration::from_secs(10), reason)));
    }

    #[test]
    fn test_reconcile_errors_have_no_requeue() {
        let err = ControllerError::Reconcile(ReconcileError::NotFound);
        assert!(err.requeue_after().is_none());
        let err = ControllerError::Finalizer(Box::new(finalizer::Error::ApplyFailed(
            ControllerError::Reconcile(ReconcileError::NotFound),
        )));
        assert!(err.requeue_after().is_none());
    }

    #[test]
    fn test_backoff_state_counts_errors() {
        let mut state = BackoffState::new(1, 10);
        state.increment_error();
        state.increment_error();
        assert_eq!(state.error_count, 2);
        assert_eq!(state.backoff.next_backoff_seconds(), 60);
    }
}
