//! # Reconcile
//!
//! Entry point called by the kube-runtime controller for each
//! `AlertManagerDefinition`.
//!
//! The finalizer splits the work in two:
//! - Apply: one pass of the resource manager, then a status patch
//! - Cleanup: delete the remote definition; the finalizer is only released once
//!   AMP reports it gone

use super::error::{Outcome, ReconcileError};
use super::snapshot::ConditionType;
use super::status::{cleanup_snapshot, desired_snapshot, is_terminal_and_unchanged, patch_status};
use super::types::{ControllerError, Reconciler};
use crate::constants::FINALIZER_NAME;
use crate::crd::AlertManagerDefinition;
use crate::observability;
use kube::{Api, ResourceExt};
use kube_runtime::controller::Action;
use kube_runtime::finalizer::{finalizer, Event};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn, Instrument};

/// Reconcile one resource
pub async fn reconcile(
    amd: Arc<AlertManagerDefinition>,
    ctx: Arc<Reconciler>,
) -> Result<Action, ControllerError> {
    let name = amd.name_any();
    let namespace = amd.namespace().unwrap_or_else(|| "default".to_string());
    let resource_key = format!("{namespace}/{name}");
    let span = tracing::info_span!(
        "controller.reconcile",
        resource.name = %name,
        resource.namespace = %namespace
    );

    let start = Instant::now();
    observability::metrics::increment_reconciliations();

    let api: Api<AlertManagerDefinition> = Api::namespaced(ctx.client.clone(), &namespace);
    let result = finalizer(&api, FINALIZER_NAME, amd, |event| async {
        match event {
            Event::Apply(amd) => apply(&amd, &ctx).await,
            Event::Cleanup(amd) => cleanup(&amd, &ctx).await,
        }
    })
    .instrument(span)
    .await
    .map_err(|e| ControllerError::Finalizer(Box::new(e)));

    observability::metrics::observe_reconciliation_duration(start.elapsed().as_secs_f64());
    if result.is_ok() {
        ctx.reset_backoff(&resource_key);
    }
    result
}

async fn apply(amd: &AlertManagerDefinition, ctx: &Reconciler) -> Result<Action, ControllerError> {
    if is_terminal_and_unchanged(amd) {
        debug!("Terminal condition set and nothing changed, waiting for a spec change");
        return Ok(Action::await_change());
    }

    let manager = &ctx.manager;
    let desired = desired_snapshot(amd);
    let desired = manager.update_conditions(&desired, None).unwrap_or(desired);

    match manager.reconcile(&desired).await {
        Ok(outcome) => {
            let action = match &outcome {
                Outcome::Updated(snapshot) if snapshot.condition_is_true(ConditionType::Synced) => {
                    observability::metrics::increment_requeues_total("resync");
                    Action::requeue(ctx.resync_period)
                }
                Outcome::Updated(_) => {
                    observability::metrics::increment_requeues_total("not-synced");
                    Action::requeue(manager.requeue_policy().default)
                }
                Outcome::RequeueAfter { after, reason, .. } => {
                    info!("{} (requeue in {:?})", reason, after);
                    observability::metrics::increment_requeues_total(reason.metric_reason());
                    Action::requeue(*after)
                }
                Outcome::Removed => Action::await_change(),
            };
            if let Some(snapshot) = outcome.snapshot() {
                patch_status(ctx, amd, snapshot).await?;
            }
            Ok(action)
        }
        Err(ReconcileError::NotFound) => {
            warn!("workspaceID is required, nothing sent to AMP");
            let snapshot = desired.with_synced(false, Some("workspaceID is required".to_string()));
            patch_status(ctx, amd, &snapshot).await?;
            Ok(Action::await_change())
        }
        Err(err) => {
            let snapshot = manager
                .update_conditions(&desired, Some(&err))
                .unwrap_or(desired)
                .with_synced(false, None);
            patch_status(ctx, amd, &snapshot).await?;

            if manager.is_terminal(&err) {
                error!("Terminal error, not retrying until the resource changes: {}", err);
                return Ok(Action::await_change());
            }
            Err(err.into())
        }
    }
}

async fn cleanup(
    amd: &AlertManagerDefinition,
    ctx: &Reconciler,
) -> Result<Action, ControllerError> {
    let current = cleanup_snapshot(amd);
    if current.workspace_id().is_none() {
        info!("No workspaceID, nothing to delete");
        return Ok(Action::await_change());
    }

    let latest = match ctx.manager.read_one(&current).await {
        Ok(latest) => latest,
        Err(ReconcileError::NotFound) => {
            info!("Alert manager definition already gone");
            return Ok(Action::await_change());
        }
        Err(e) => return Err(e.into()),
    };

    match ctx.manager.delete(&latest).await? {
        Outcome::RequeueAfter {
            snapshot,
            after,
            reason,
        } => {
            if let Err(e) = patch_status(ctx, amd, &snapshot).await {
                warn!("Failed to update status during deletion: {}", e);
            }
            Err(ControllerError::RequeueNeeded { after, reason })
        }
        Outcome::Removed | Outcome::Updated(_) => Ok(Action::await_change()),
    }
}
