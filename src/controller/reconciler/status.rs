//! # Status Management
//!
//! Converts between the custom resource and reconciler snapshots, and patches
//! `.status` with the result of a pass. The spec is never written.

use super::snapshot::{ConditionType, Snapshot, SnapshotCondition};
use super::types::Reconciler;
use crate::constants::{FIELD_MANAGER, RECONCILE_ANNOTATION};
use crate::{AlertManagerDefinition, AlertManagerDefinitionStatus, Condition};
use kube::api::{Patch, PatchParams};
use kube::ResourceExt;
use tracing::debug;

fn condition_status(status: bool) -> &'static str {
    if status {
        "True"
    } else {
        "False"
    }
}

/// Value of the manual reconcile annotation, if set
pub fn reconcile_annotation(amd: &AlertManagerDefinition) -> Option<&str> {
    amd.annotations().get(RECONCILE_ANNOTATION).map(String::as_str)
}

/// Desired snapshot: the spec plus the last persisted status and conditions
pub fn desired_snapshot(amd: &AlertManagerDefinition) -> Snapshot {
    let snapshot = Snapshot::desired(
        Some(amd.spec.workspace_id.clone()),
        amd.spec.configuration.clone(),
    );
    let Some(status) = amd.status.as_ref() else {
        return snapshot;
    };

    let conditions = status
        .conditions
        .iter()
        .filter_map(|c| {
            ConditionType::parse(&c.r#type).map(|kind| SnapshotCondition {
                kind,
                status: c.status == "True",
                message: c.message.clone(),
            })
        })
        .collect();

    snapshot
        .with_status(status.status_code, status.status_reason.clone())
        .with_conditions(conditions)
        .with_bound_workspace(status.workspace_id.clone())
}

/// Snapshot naming the remote definition to delete
///
/// Targets the bound workspace when the spec was edited after creation.
pub fn cleanup_snapshot(amd: &AlertManagerDefinition) -> Snapshot {
    let snapshot = desired_snapshot(amd);
    match snapshot.bound_workspace_id().map(str::to_string) {
        Some(bound) => snapshot.with_workspace_id(Some(bound)),
        None => snapshot,
    }
}

/// True when the resource is Terminal and nothing changed since that was recorded
///
/// A new generation or a new manual reconcile annotation value lifts the stop.
pub fn is_terminal_and_unchanged(amd: &AlertManagerDefinition) -> bool {
    let Some(status) = amd.status.as_ref() else {
        return false;
    };
    let terminal = status
        .conditions
        .iter()
        .any(|c| c.r#type == ConditionType::Terminal.as_str() && c.status == "True");

    terminal
        && status.observed_generation == amd.metadata.generation
        && status.last_handled_reconcile_at.as_deref() == reconcile_annotation(amd)
}

/// AWS identity recorded next to the remote status
#[derive(Debug, Clone, Copy, Default)]
pub struct ResourceOwner<'a> {
    pub region: Option<&'a str>,
    pub account_id: Option<&'a str>,
}

/// Project a snapshot onto the resource status
///
/// `lastTransitionTime` is carried over unless the condition's value flipped.
/// The workspace is bound the first time AMP reports a status for it.
pub fn project_status(
    amd: &AlertManagerDefinition,
    snapshot: &Snapshot,
    owner: ResourceOwner<'_>,
    now: &str,
) -> AlertManagerDefinitionStatus {
    let previous = amd.status.as_ref();
    let conditions = snapshot
        .conditions()
        .iter()
        .map(|c| {
            let status = condition_status(c.status);
            let last_transition_time = previous
                .and_then(|p| p.conditions.iter().find(|old| old.r#type == c.kind.as_str()))
                .filter(|old| old.status == status)
                .and_then(|old| old.last_transition_time.clone())
                .unwrap_or_else(|| now.to_string());
            Condition {
                r#type: c.kind.as_str().to_string(),
                status: status.to_string(),
                last_transition_time: Some(last_transition_time),
                reason: None,
                message: c.message.clone(),
            }
        })
        .collect();

    AlertManagerDefinitionStatus {
        status_code: snapshot.status_code(),
        status_reason: snapshot.status_reason().map(str::to_string),
        conditions,
        observed_generation: amd.metadata.generation,
        region: owner
            .region
            .map(str::to_string)
            .or_else(|| previous.and_then(|p| p.region.clone())),
        owner_account_id: owner
            .account_id
            .map(str::to_string)
            .or_else(|| previous.and_then(|p| p.owner_account_id.clone())),
        workspace_id: snapshot
            .bound_workspace_id()
            .or_else(|| snapshot.status_code().and(snapshot.workspace_id()))
            .map(str::to_string),
        last_handled_reconcile_at: reconcile_annotation(amd).map(str::to_string),
    }
}

/// Patch `.status` from a snapshot
///
/// Skipped when the projected status equals the current one, so a steady
/// resource does not generate watch events.
pub async fn patch_status(
    reconciler: &Reconciler,
    amd: &AlertManagerDefinition,
    snapshot: &Snapshot,
) -> Result<(), kube::Error> {
    let now = chrono::Utc::now().to_rfc3339();
    let owner = ResourceOwner {
        region: reconciler.region.as_deref(),
        account_id: reconciler.owner_account_id.as_deref(),
    };
    let status = project_status(amd, snapshot, owner, &now);

    if amd.status.as_ref() == Some(&status) {
        debug!("Skipping status update for {} - unchanged", amd.name_any());
        return Ok(());
    }

    let api: kube::Api<AlertManagerDefinition> = kube::Api::namespaced(
        reconciler.client.clone(),
        amd.namespace().as_deref().unwrap_or("default"),
    );
    let patch = serde_json::json!({ "status": status });
    api.patch_status(
        &amd.name_any(),
        &PatchParams::apply(FIELD_MANAGER),
        &Patch::Merge(patch),
    )
    .await?;

    Ok(())
}
