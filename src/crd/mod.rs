//! # Custom Resource Definitions
//!
//! CRD types for the Alert Manager Definition controller.
//!
//! An `AlertManagerDefinition` binds an alertmanager configuration document to an
//! Amazon Managed Service for Prometheus workspace. The workspace owns at most one
//! definition, so the workspace ID is the identity of the remote object.

mod status;

pub use status::{AlertManagerDefinitionStatus, Condition, StatusCode, UnknownStatusCode};

use serde::{Deserialize, Serialize};

/// AlertManagerDefinition Custom Resource Definition
///
/// # Example
///
/// ```yaml
/// apiVersion: prometheusservice.services.k8s.aws/v1alpha1
/// kind: AlertManagerDefinition
/// metadata:
///   name: team-alerts
///   namespace: monitoring
/// spec:
///   workspaceID: ws-12345678-abcd-1234-abcd-123456789012
///   configuration: |
///     alertmanager_config: |
///       route:
///         receiver: 'default'
///       receivers:
///         - name: 'default'
/// ```
#[derive(kube::CustomResource, Debug, Clone, PartialEq, Deserialize, Serialize, schemars::JsonSchema)]
#[kube(
    kind = "AlertManagerDefinition",
    group = "prometheusservice.services.k8s.aws",
    version = "v1alpha1",
    namespaced,
    status = "AlertManagerDefinitionStatus",
    shortname = "amd",
    printcolumn = r#"{"name":"Workspace", "type":"string", "jsonPath":".spec.workspaceID"}, {"name":"Status", "type":"string", "jsonPath":".status.statusCode"}, {"name":"Synced", "type":"string", "jsonPath":".status.conditions[?(@.type==\"ResourceSynced\")].status"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct AlertManagerDefinitionSpec {
    /// ID of the AMP workspace that owns the definition
    /// Required - an empty value is treated as missing and nothing is sent to AWS
    #[serde(rename = "workspaceID")]
    pub workspace_id: String,
    /// Alertmanager configuration document (YAML)
    /// Sent to AMP as the raw bytes of this string
    #[serde(default)]
    pub configuration: Option<String>,
}
