//! # Resource Manager
//!
//! Drives one alert manager definition through describe, classify and
//! create/update/delete against the [`AlertManagerApi`].
//!
//! AMP validates some configurations only after accepting them: a create or put
//! returns 200 and the definition later lands in `CREATION_FAILED` or
//! `UPDATE_FAILED`. Two read rules keep that usable:
//!
//! - **Freeze**: the first read that observes a failed status keeps the desired
//!   configuration instead of the backend's copy and marks the resource
//!   Terminal, so the next pass compares against what failed.
//! - **Poison**: once a pass starts from a failed status, the observed payload is
//!   dropped, so re-applying the exact configuration that failed still produces a
//!   delta and a fresh put.
//!
//! Every operation issues at most one mutating call and returns backoff as data.

use super::conditions::{update_conditions, TerminalErrorPolicy};
use super::delta::Delta;
use super::error::{Outcome, ReconcileError, RequeuePolicy, StateGuard};
use super::snapshot::{ConditionType, Snapshot};
use crate::crd::StatusCode;
use crate::observability::metrics::record_api_call;
use crate::provider::{AlertManagerApi, RemoteError};
use std::sync::Arc;
use tracing::{debug, info, warn};

const VERB_READ_ONE: &str = "READ_ONE";
const VERB_CREATE: &str = "CREATE";
const VERB_UPDATE: &str = "UPDATE";
const VERB_DELETE: &str = "DELETE";

const OP_DESCRIBE: &str = "DescribeAlertManagerDefinition";
const OP_CREATE: &str = "CreateAlertManagerDefinition";
const OP_PUT: &str = "PutAlertManagerDefinition";
const OP_DELETE: &str = "DeleteAlertManagerDefinition";

/// Status code when the backend is still working on the definition
fn in_progress(snapshot: &Snapshot) -> Option<StatusCode> {
    snapshot.status_code().filter(|_| snapshot.is_transient())
}

/// Spec fields that cannot change once the remote definition exists
fn immutable_field_changes(desired: &Snapshot) -> Vec<&'static str> {
    let mut changed = Vec::new();
    if desired
        .bound_workspace_id()
        .is_some_and(|bound| desired.workspace_id() != Some(bound))
    {
        changed.push("workspaceID");
    }
    changed
}

fn record<T>(verb: &str, operation: &str, result: &Result<T, RemoteError>) {
    record_api_call(verb, operation, result.as_ref().err());
}

/// Reconciles alert manager definitions against one backend
pub struct ResourceManager {
    api: Arc<dyn AlertManagerApi>,
    requeue: RequeuePolicy,
    terminal: TerminalErrorPolicy,
}

impl std::fmt::Debug for ResourceManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceManager")
            .field("requeue", &self.requeue)
            .field("terminal", &self.terminal)
            .finish_non_exhaustive()
    }
}

impl ResourceManager {
    pub fn new(
        api: Arc<dyn AlertManagerApi>,
        requeue: RequeuePolicy,
        terminal: TerminalErrorPolicy,
    ) -> Self {
        Self {
            api,
            requeue,
            terminal,
        }
    }

    pub fn requeue_policy(&self) -> RequeuePolicy {
        self.requeue
    }

    pub fn terminal_policy(&self) -> &TerminalErrorPolicy {
        &self.terminal
    }

    /// Run one full pass for `desired`
    ///
    /// `desired` carries the user's payload together with the last persisted
    /// status, conditions and bound workspace. A workspace that differs from the
    /// bound one is a terminal error and nothing is sent to AMP.
    pub async fn reconcile(&self, desired: &Snapshot) -> Result<Outcome, ReconcileError> {
        if desired.workspace_id().is_none() {
            return Err(ReconcileError::NotFound);
        }

        let changed = immutable_field_changes(desired);
        if !changed.is_empty() {
            return Err(ReconcileError::Terminal(format!(
                "Immutable Spec fields have been modified: {}",
                changed.join(",")
            )));
        }

        let latest = match self.read_one(desired).await {
            Ok(latest) => latest,
            Err(ReconcileError::NotFound) => {
                info!(
                    "No alert manager definition in workspace {}, creating",
                    desired.workspace_id().unwrap_or_default()
                );
                return self.create(desired).await.map(Outcome::Updated);
            }
            Err(e) => return Err(e),
        };

        if let Some(code) = in_progress(&latest) {
            debug!("Definition is {}, waiting {:?}", code, self.requeue.transient);
            return Ok(Outcome::RequeueAfter {
                snapshot: latest.with_synced(false, None),
                after: self.requeue.transient,
                reason: StateGuard::InProgress(code),
            });
        }

        let delta = Delta::between(Some(desired), Some(&latest));
        if delta.is_empty() {
            return Ok(Outcome::Updated(latest.with_synced(true, None)));
        }

        debug!(paths = ?delta.paths(), "Desired and observed definitions differ");
        self.update(desired, &latest, &delta).await
    }

    /// Describe the definition and merge it into a copy of `current`
    pub async fn read_one(&self, current: &Snapshot) -> Result<Snapshot, ReconcileError> {
        let Some(workspace_id) = current.workspace_id() else {
            return Err(ReconcileError::NotFound);
        };

        let result = self.api.describe(workspace_id).await;
        record(VERB_READ_ONE, OP_DESCRIBE, &result);
        let described = match result {
            Ok(described) => described,
            Err(e) if e.is_not_found() => return Err(ReconcileError::NotFound),
            Err(e) => return Err(e.into()),
        };

        let latest = current
            .clone()
            .with_observed_status(described.status.as_ref());

        if latest.has_failed_status() && !current.has_failed_status() {
            let code = latest.status_code().map_or("<nil>", StatusCode::as_str);
            let mut message =
                format!("Alert Manager Definition is in '{code}' status because of a validating error");
            if let Some(reason) = latest.status_reason() {
                message.push_str(": ");
                message.push_str(reason);
            }
            warn!("{}", message);
            return Ok(latest
                .with_condition(ConditionType::Terminal, true, Some(message))
                .with_synced(true, None));
        }

        let mut latest = latest.with_remote_payload(described.data.as_deref());
        if current.has_failed_status() {
            latest = latest.without_payload();
        }
        if latest.is_updating() {
            latest = latest.with_synced(false, None);
        }

        Ok(latest)
    }

    /// Create the definition from `desired`
    pub async fn create(&self, desired: &Snapshot) -> Result<Snapshot, ReconcileError> {
        let Some(workspace_id) = desired.workspace_id() else {
            return Err(ReconcileError::NotFound);
        };
        if desired.configuration().is_none() {
            return Err(ReconcileError::Terminal(
                "configuration is required to create an alert manager definition".to_string(),
            ));
        }

        let result = self.api.create(workspace_id, desired.data()).await;
        record(VERB_CREATE, OP_CREATE, &result);
        let status = result?;

        let created = desired.clone().with_observed_status(status.as_ref());
        info!(
            "Created alert manager definition in workspace {} (status={:?})",
            workspace_id,
            created.status_code()
        );
        if created.is_creating() {
            return Ok(created.with_synced(false, None));
        }
        Ok(created)
    }

    /// Apply `delta` between `desired` and `latest`
    pub async fn update(
        &self,
        desired: &Snapshot,
        latest: &Snapshot,
        delta: &Delta,
    ) -> Result<Outcome, ReconcileError> {
        if latest.has_failed_status() || latest.is_active() {
            if !delta.differs_in_payload() {
                return self.read_one(desired).await.map(Outcome::Updated);
            }

            let Some(workspace_id) = desired.workspace_id() else {
                return Err(ReconcileError::NotFound);
            };
            let result = self.api.put(workspace_id, desired.data()).await;
            record(VERB_UPDATE, OP_PUT, &result);
            let status = result?;

            let updated = desired.clone().with_observed_status(status.as_ref());
            info!(
                "Replaced alert manager definition in workspace {} (status={:?})",
                workspace_id,
                updated.status_code()
            );
            if updated.is_updating() {
                return Ok(Outcome::Updated(updated.with_synced(false, None)));
            }
            return Ok(Outcome::Updated(updated));
        }

        if latest.has_terminal_status() {
            let code = latest.status_code().map_or("<nil>", StatusCode::as_str);
            let message = format!("Alert Manager Definition is in '{code}' status");
            return Ok(Outcome::Updated(
                desired
                    .clone()
                    .with_condition(ConditionType::Terminal, true, Some(message))
                    .with_synced(true, None),
            ));
        }

        if let Some(code) = in_progress(latest) {
            return Ok(Outcome::RequeueAfter {
                snapshot: latest.clone(),
                after: self.requeue.transient,
                reason: StateGuard::InProgress(code),
            });
        }

        let guard = StateGuard::UpdateBlocked(latest.status_code());
        warn!("{}", guard);
        Ok(Outcome::RequeueAfter {
            snapshot: desired.clone().with_synced(false, Some(guard.to_string())),
            after: self.requeue.default,
            reason: guard,
        })
    }

    /// Delete the definition behind `current`
    ///
    /// Outside ACTIVE and the failed statuses nothing is called and `current` comes
    /// back unchanged with a requeue.
    pub async fn delete(&self, current: &Snapshot) -> Result<Outcome, ReconcileError> {
        if current.is_active() || current.has_failed_status() {
            let Some(workspace_id) = current.workspace_id() else {
                return Err(ReconcileError::NotFound);
            };
            let result = self.api.delete(workspace_id).await;
            record(VERB_DELETE, OP_DELETE, &result);
            result?;
            info!("Deleted alert manager definition in workspace {}", workspace_id);
            return Ok(Outcome::Removed);
        }

        if let Some(code) = in_progress(current) {
            return Ok(Outcome::RequeueAfter {
                snapshot: current.clone(),
                after: self.requeue.transient,
                reason: StateGuard::InProgress(code),
            });
        }

        Ok(Outcome::RequeueAfter {
            snapshot: current.clone(),
            after: self.requeue.default,
            reason: StateGuard::DeleteBlocked(current.status_code()),
        })
    }

    /// Derive Terminal and Recoverable from the error of a pass
    pub fn update_conditions(
        &self,
        snapshot: &Snapshot,
        err: Option<&ReconcileError>,
    ) -> Option<Snapshot> {
        update_conditions(snapshot, err, &self.terminal)
    }

    pub fn is_terminal(&self, err: &ReconcileError) -> bool {
        self.terminal.is_terminal(err)
    }
}
