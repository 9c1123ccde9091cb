//! # Resource Snapshot
//!
//! Immutable point-in-time view of an alert manager definition: the desired
//! payload, the remote lifecycle status and the reconciliation conditions.
//!
//! Snapshots are never edited in place. Every transition starts from a clone and
//! overwrites fields through the `with_*` constructors, so a snapshot held by a
//! caller is unaffected by anything the reconciler derives from it.

use crate::crd::StatusCode;
use crate::provider::DefinitionStatus;
use std::fmt;

/// Condition types managed by the reconciler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConditionType {
    /// Unrecoverable failure - stop retrying until the desired state changes
    Terminal,
    /// Retryable failure
    Recoverable,
    /// Desired and observed state match
    Synced,
}

impl ConditionType {
    /// Type name written to the resource's status
    pub fn as_str(self) -> &'static str {
        match self {
            ConditionType::Terminal => "Terminal",
            ConditionType::Recoverable => "Recoverable",
            ConditionType::Synced => "ResourceSynced",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Terminal" => Some(ConditionType::Terminal),
            "Recoverable" => Some(ConditionType::Recoverable),
            "ResourceSynced" => Some(ConditionType::Synced),
            _ => None,
        }
    }
}

impl fmt::Display for ConditionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotCondition {
    pub kind: ConditionType,
    pub status: bool,
    pub message: Option<String>,
}

/// Point-in-time view of one alert manager definition
///
/// `data` and `configuration` carry the same payload. For desired snapshots the
/// configuration string is authoritative and `data` is its bytes; for snapshots
/// read back from AMP the bytes are authoritative and the string is derived.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    workspace_id: Option<String>,
    data: Vec<u8>,
    configuration: Option<String>,
    status_code: Option<StatusCode>,
    status_reason: Option<String>,
    conditions: Vec<SnapshotCondition>,
    /// Workspace the remote definition was created in, from `.status`
    bound_workspace_id: Option<String>,
}

impl Snapshot {
    /// Desired state from user input
    ///
    /// An empty workspace ID counts as missing.
    pub fn desired(workspace_id: Option<String>, configuration: Option<String>) -> Self {
        let data = configuration
            .as_deref()
            .map(|c| c.as_bytes().to_vec())
            .unwrap_or_default();
        Self {
            workspace_id: workspace_id.filter(|id| !id.is_empty()),
            data,
            configuration,
            ..Self::default()
        }
    }

    pub fn workspace_id(&self) -> Option<&str> {
        self.workspace_id.as_deref()
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn configuration(&self) -> Option<&str> {
        self.configuration.as_deref()
    }

    pub fn status_code(&self) -> Option<StatusCode> {
        self.status_code
    }

    pub fn status_reason(&self) -> Option<&str> {
        self.status_reason.as_deref()
    }

    pub fn conditions(&self) -> &[SnapshotCondition] {
        &self.conditions
    }

    pub fn condition(&self, kind: ConditionType) -> Option<&SnapshotCondition> {
        self.conditions.iter().find(|c| c.kind == kind)
    }

    /// True when the condition exists and is set
    pub fn condition_is_true(&self, kind: ConditionType) -> bool {
        self.condition(kind).is_some_and(|c| c.status)
    }

    pub fn bound_workspace_id(&self) -> Option<&str> {
        self.bound_workspace_id.as_deref()
    }

    /// Record the workspace the remote definition lives in
    #[must_use]
    pub fn with_bound_workspace(mut self, workspace_id: Option<String>) -> Self {
        self.bound_workspace_id = workspace_id.filter(|id| !id.is_empty());
        self
    }

    /// Point the snapshot at another workspace; empty counts as missing
    #[must_use]
    pub fn with_workspace_id(mut self, workspace_id: Option<String>) -> Self {
        self.workspace_id = workspace_id.filter(|id| !id.is_empty());
        self
    }

    /// Overwrite both status fields
    #[must_use]
    pub fn with_status(mut self, status_code: Option<StatusCode>, reason: Option<String>) -> Self {
        self.status_code = status_code;
        self.status_reason = reason;
        self
    }

    /// Merge a status block from a backend response
    ///
    /// A missing block, or a missing field within it, unsets the local field.
    #[must_use]
    pub fn with_observed_status(self, status: Option<&DefinitionStatus>) -> Self {
        match status {
            Some(status) => self.with_status(status.status_code, status.status_reason.clone()),
            None => self.with_status(None, None),
        }
    }

    /// Replace the payload with bytes read from the backend
    #[must_use]
    pub fn with_remote_payload(mut self, data: Option<&[u8]>) -> Self {
        match data {
            Some(bytes) => {
                self.data = bytes.to_vec();
                self.configuration = Some(String::from_utf8_lossy(bytes).into_owned());
            }
            None => {
                self.data = Vec::new();
                self.configuration = None;
            }
        }
        self
    }

    /// Forget the remembered payload so any desired payload compares as different
    #[must_use]
    pub fn without_payload(self) -> Self {
        self.with_remote_payload(None)
    }

    /// Find-or-create the condition of `kind` and overwrite it
    #[must_use]
    pub fn with_condition(
        mut self,
        kind: ConditionType,
        status: bool,
        message: Option<String>,
    ) -> Self {
        match self.conditions.iter_mut().find(|c| c.kind == kind) {
            Some(existing) => {
                existing.status = status;
                existing.message = message;
            }
            None => self.conditions.push(SnapshotCondition {
                kind,
                status,
                message,
            }),
        }
        self
    }

    #[must_use]
    pub fn with_synced(self, synced: bool, message: Option<String>) -> Self {
        self.with_condition(ConditionType::Synced, synced, message)
    }

    /// Replace the whole condition list
    #[must_use]
    pub fn with_conditions(mut self, conditions: Vec<SnapshotCondition>) -> Self {
        self.conditions = conditions;
        self
    }
}
