//! # Provider Module
//!
//! Remote adapter boundary for the alert manager definition API.
//!
//! The reconciler only talks to [`AlertManagerApi`]. Backend failures cross the
//! boundary as [`RemoteError`] values tagged with a [`RemoteErrorKind`], so callers
//! never need to inspect SDK error types.
//!
//! - `amp`: Amazon Managed Service for Prometheus implementation (aws-sdk-amp)

pub mod amp;

pub use amp::AmpAlertManagerClient;

use crate::crd::StatusCode;
use async_trait::async_trait;
use std::fmt;

/// Status block returned by describe, create and put
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DefinitionStatus {
    pub status_code: Option<StatusCode>,
    pub status_reason: Option<String>,
}

impl DefinitionStatus {
    pub fn new(status_code: StatusCode) -> Self {
        Self {
            status_code: Some(status_code),
            status_reason: None,
        }
    }

    #[must_use]
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.status_reason = Some(reason.into());
        self
    }
}

/// Result of describing a definition
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DescribedDefinition {
    pub status: Option<DefinitionStatus>,
    /// Raw configuration bytes currently stored by the backend
    pub data: Option<Vec<u8>>,
}

/// Classification of a backend failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteErrorKind {
    /// The definition (or its workspace) does not exist
    NotFound,
    /// The service answered with an error code
    Service,
    /// The request never got a service answer (timeout, dispatch, decoding)
    Transport,
}

/// Error returned by an [`AlertManagerApi`] call
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub struct RemoteError {
    pub kind: RemoteErrorKind,
    /// Service error code, e.g. `ValidationException`
    pub code: Option<String>,
    pub message: String,
}

impl RemoteError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            kind: RemoteErrorKind::NotFound,
            code: Some(crate::constants::RESOURCE_NOT_FOUND_CODE.to_string()),
            message: message.into(),
        }
    }

    pub fn service(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: RemoteErrorKind::Service,
            code: Some(code.into()),
            message: message.into(),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            kind: RemoteErrorKind::Transport,
            code: None,
            message: message.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind == RemoteErrorKind::NotFound
    }

    /// Label used for metrics
    pub fn code_label(&self) -> &str {
        self.code.as_deref().unwrap_or(match self.kind {
            RemoteErrorKind::NotFound => "NotFound",
            RemoteErrorKind::Service => "Unknown",
            RemoteErrorKind::Transport => "Transport",
        })
    }
}

impl fmt::Display for RemoteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.code {
            Some(code) => write!(f, "{code}: {}", self.message),
            None => f.write_str(&self.message),
        }
    }
}

/// Remote adapter for one alert manager definition per workspace
///
/// Implementations perform exactly one backend request per call and never retry;
/// retry timing belongs to the control loop.
#[async_trait]
pub trait AlertManagerApi: Send + Sync {
    /// Read the definition of a workspace
    async fn describe(&self, workspace_id: &str) -> Result<DescribedDefinition, RemoteError>;

    /// Create the definition, returning the status the backend reports
    async fn create(
        &self,
        workspace_id: &str,
        data: &[u8],
    ) -> Result<Option<DefinitionStatus>, RemoteError>;

    /// Replace the definition, returning the status the backend reports
    async fn put(
        &self,
        workspace_id: &str,
        data: &[u8],
    ) -> Result<Option<DefinitionStatus>, RemoteError>;

    /// Delete the definition
    async fn delete(&self, workspace_id: &str) -> Result<(), RemoteError>;
}
