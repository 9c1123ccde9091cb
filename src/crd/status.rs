//! # AlertManagerDefinition Status
//!
//! Status types for tracking the remote lifecycle and reconciliation conditions.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Status of the AlertManagerDefinition resource
///
/// Mirrors the status AMP reports for the definition plus controller conditions.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, Default, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AlertManagerDefinitionStatus {
    /// Lifecycle status reported by AMP
    /// Values: CREATING, ACTIVE, UPDATING, DELETING, CREATION_FAILED, UPDATE_FAILED
    /// Unset until the definition exists remotely
    #[serde(default)]
    pub status_code: Option<StatusCode>,
    /// Reason reported by AMP for the current status (usually set on failures)
    #[serde(default)]
    pub status_reason: Option<String>,
    /// Conditions represent the latest available observations
    /// Types: Terminal, Recoverable, ResourceSynced
    #[serde(default)]
    pub conditions: Vec<Condition>,
    /// Generation of the spec the status was computed from
    #[serde(default)]
    pub observed_generation: Option<i64>,
    /// AWS region the definition lives in
    #[serde(default)]
    pub region: Option<String>,
    /// AWS account that owns the workspace
    #[serde(default, rename = "ownerAccountID")]
    pub owner_account_id: Option<String>,
    /// Workspace the definition was created in
    /// Set once AMP reports a status; `spec.workspaceID` must keep this value
    #[serde(default, rename = "workspaceID")]
    pub workspace_id: Option<String>,
    /// Value of the manual reconcile annotation handled by the last reconciliation
    #[serde(default)]
    pub last_handled_reconcile_at: Option<String>,
}

/// Condition represents a condition of a resource
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    /// Type of condition
    pub r#type: String,
    /// Status of the condition (True, False, Unknown)
    pub status: String,
    /// Last transition time
    #[serde(default)]
    pub last_transition_time: Option<String>,
    /// Reason for the condition
    #[serde(default)]
    pub reason: Option<String>,
    /// Message describing the condition
    #[serde(default)]
    pub message: Option<String>,
}

/// Lifecycle status code of an alert manager definition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize, schemars::JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StatusCode {
    Creating,
    Active,
    Updating,
    Deleting,
    CreationFailed,
    UpdateFailed,
}

impl StatusCode {
    pub fn as_str(self) -> &'static str {
        match self {
            StatusCode::Creating => "CREATING",
            StatusCode::Active => "ACTIVE",
            StatusCode::Updating => "UPDATING",
            StatusCode::Deleting => "DELETING",
            StatusCode::CreationFailed => "CREATION_FAILED",
            StatusCode::UpdateFailed => "UPDATE_FAILED",
        }
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status string AMP returned that this controller does not know
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown alert manager definition status code: {0}")]
pub struct UnknownStatusCode(pub String);

impl FromStr for StatusCode {
    type Err = UnknownStatusCode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CREATING" => Ok(StatusCode::Creating),
            "ACTIVE" => Ok(StatusCode::Active),
            "UPDATING" => Ok(StatusCode::Updating),
            "DELETING" => Ok(StatusCode::Deleting),
            "CREATION_FAILED" => Ok(StatusCode::CreationFailed),
            "UPDATE_FAILED" => Ok(StatusCode::UpdateFailed),
            other => Err(UnknownStatusCode(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_code_round_trips_through_strings() {
        for code in [
            StatusCode::Creating,
            StatusCode::Active,
            StatusCode::Updating,
            StatusCode::Deleting,
            StatusCode::CreationFailed,
            StatusCode::UpdateFailed,
        ] {
            assert_eq!(code.as_str().parse::<StatusCode>(), Ok(code));
        }
    }

    #[test]
    fn test_unknown_status_code() {
        let err = "PENDING".parse::<StatusCode>().unwrap_err();
        assert_eq!(err, UnknownStatusCode("PENDING".to_string()));
    }

    #[test]
    fn test_status_code_serde_matches_aws_casing() {
        let json = serde_json::to_string(&StatusCode::CreationFailed).unwrap();
        assert_eq!(json, "\"CREATION_FAILED\"");
        let status: AlertManagerDefinitionStatus =
            serde_json::from_str(r#"{"statusCode":"UPDATE_FAILED","statusReason":"bad receiver"}"#)
                .unwrap();
        assert_eq!(status.status_code, Some(StatusCode::UpdateFailed));
        assert_eq!(status.status_reason.as_deref(), Some("bad receiver"));
        assert!(status.conditions.is_empty());
    }

    #[test]
    fn test_status_identity_field_casing() {
        let status = AlertManagerDefinitionStatus {
            owner_account_id: Some("123456789012".to_string()),
            workspace_id: Some("ws-1".to_string()),
            ..Default::default()
        };
        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(json["ownerAccountID"], "123456789012");
        assert_eq!(json["workspaceID"], "ws-1");
    }
}
