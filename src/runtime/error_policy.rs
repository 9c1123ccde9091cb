//! # Error Policy
//!
//! Error handling and backoff logic for the controller watch loop.
//! This module handles reconciliation errors and watch stream errors.

use crate::constants;
use crate::controller::reconciler::{BackoffState, ControllerError, Reconciler};
use crate::crd::AlertManagerDefinition;
use crate::observability;
use kube::ResourceExt;
use kube_runtime::controller::Action;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

/// Decide when to retry after a failed reconciliation
///
/// Deletions blocked by a state guard come back after the guard's own wait.
/// Everything else follows a per-resource Fibonacci backoff, reset by the next
/// successful reconciliation.
pub fn error_policy(
    obj: Arc<AlertManagerDefinition>,
    error: &ControllerError,
    ctx: Arc<Reconciler>,
) -> Action {
    let name = obj.name_any();
    let namespace = obj.namespace().unwrap_or_else(|| "default".to_string());

    if let Some((after, reason)) = error.requeue_after() {
        info!(
            resource.name = %name,
            resource.namespace = %namespace,
            "{} (requeue in {:?})",
            reason,
            after
        );
        observability::metrics::increment_requeues_total(reason.metric_reason());
        return Action::requeue(after);
    }

    let error_span = tracing::span!(
        tracing::Level::ERROR,
        "controller.watch.reconciliation_error",
        resource.name = %name,
        resource.namespace = %namespace,
        error = %error
    );
    let _error_guard = error_span.enter();

    error!("Reconciliation error for {}/{}: {}", namespace, name, error);
    observability::metrics::increment_reconciliation_errors();

    let resource_key = format!("{namespace}/{name}");
    let (backoff_seconds, error_count) = match ctx.backoff_states.lock() {
        Ok(mut states) => {
            let state = states.entry(resource_key).or_insert_with(|| {
                BackoffState::new(
                    constants::DEFAULT_BACKOFF_MIN_MINUTES,
                    constants::DEFAULT_BACKOFF_MAX_MINUTES,
                )
            });
            state.increment_error();
            (state.backoff.next_backoff_seconds(), state.error_count)
        }
        Err(e) => {
            warn!("Failed to lock backoff_states: {}, using default backoff", e);
            (constants::DEFAULT_RECONCILIATION_ERROR_REQUEUE_SECS, 0)
        }
    };

    info!(
        "Retrying in {}s (error count: {}, trigger source: error-backoff)",
        backoff_seconds, error_count
    );
    observability::metrics::increment_requeues_total("error-backoff");
    Action::requeue(Duration::from_secs(backoff_seconds))
}

/// Classification of a watch stream error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchErrorKind {
    /// 401 - RBAC revoked or token expired
    Unauthorized,
    /// 410 - resource version too old, normal after restarts
    Expired,
    /// 429 - API server storage reinitializing
    TooManyRequests,
    /// Object disappeared between list and get
    NotFound,
    Other,
}

pub fn classify_watch_error(error: &str) -> WatchErrorKind {
    if error.contains("401") || error.contains("Unauthorized") {
        WatchErrorKind::Unauthorized
    } else if error.contains("410")
        || error.contains("too old resource version")
        || error.contains("Expired")
        || error.contains("Gone")
    {
        WatchErrorKind::Expired
    } else if error.contains("429")
        || error.contains("storage is (re)initializing")
        || error.contains("TooManyRequests")
    {
        WatchErrorKind::TooManyRequests
    } else if error.contains("ObjectNotFound")
        || (error.contains("404") && error.contains("not found"))
    {
        WatchErrorKind::NotFound
    } else {
        WatchErrorKind::Other
    }
}

/// Log a watch stream error and pause where the API server needs time
pub async fn handle_watch_stream_error(error: &str) {
    match classify_watch_error(error) {
        WatchErrorKind::Unauthorized => {
            error!("Watch authentication failed (401) - check the controller's ClusterRole and ServiceAccount");
            error!("  kubectl auth can-i list alertmanagerdefinitions.prometheusservice.services.k8s.aws --as=system:serviceaccount:<namespace>:amp-alertmanager-controller");
            tokio::time::sleep(Duration::from_secs(
                constants::DEFAULT_WATCH_RESTART_DELAY_SECS,
            ))
            .await;
        }
        WatchErrorKind::Expired => {
            warn!("Watch resource version expired (410), watch will restart");
        }
        WatchErrorKind::TooManyRequests => {
            warn!("API server storage reinitializing (429), backing off");
            tokio::time::sleep(Duration::from_secs(
                constants::DEFAULT_WATCH_RESTART_DELAY_SECS,
            ))
            .await;
        }
        WatchErrorKind::NotFound => {
            warn!("Resource not found (likely deleted), continuing watch");
        }
        WatchErrorKind::Other => {
            error!("Controller stream error: {}", error);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_watch_errors() {
        assert_eq!(
            classify_watch_error("ApiError: Unauthorized (401)"),
            WatchErrorKind::Unauthorized
        );
        assert_eq!(
            classify_watch_error("too old resource version: 123 (456)"),
            WatchErrorKind::Expired
        );
        assert_eq!(
            classify_watch_error("storage is (re)initializing"),
            WatchErrorKind::TooManyRequests
        );
        assert_eq!(
            classify_watch_error("ObjectNotFound { name: x }"),
            WatchErrorKind::NotFound
        );
        assert_eq!(classify_watch_error("connection reset"), WatchErrorKind::Other);
    }
}
