//! # AMP API Operations
//!
//! [`AlertManagerApi`] implementation on top of `aws-sdk-amp`.

use super::AmpAlertManagerClient;
use crate::constants::RESOURCE_NOT_FOUND_CODE;
use crate::crd::StatusCode;
use crate::provider::{
    AlertManagerApi, DefinitionStatus, DescribedDefinition, RemoteError, RemoteErrorKind,
};
use async_trait::async_trait;
use aws_sdk_amp::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_amp::primitives::Blob;
use aws_sdk_amp::types::AlertManagerDefinitionStatus;
use tracing::{debug, warn};

/// Convert an SDK error into a tagged [`RemoteError`]
///
/// Only service responses carry an error code. `ResourceNotFoundException` maps to
/// [`RemoteErrorKind::NotFound`]; timeouts, dispatch and decoding failures map to
/// [`RemoteErrorKind::Transport`].
pub fn remote_error_from_sdk<E, R>(err: &SdkError<E, R>) -> RemoteError
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
    R: std::fmt::Debug,
{
    let message = err
        .message()
        .map_or_else(|| DisplayErrorContext(err).to_string(), str::to_string);

    match (err, err.code()) {
        (SdkError::ServiceError(_), Some(RESOURCE_NOT_FOUND_CODE)) => RemoteError {
            kind: RemoteErrorKind::NotFound,
            code: Some(RESOURCE_NOT_FOUND_CODE.to_string()),
            message,
        },
        (SdkError::ServiceError(_), code) => RemoteError {
            kind: RemoteErrorKind::Service,
            code: code.map(str::to_string),
            message,
        },
        _ => RemoteError::transport(message),
    }
}

/// Project the SDK status shape onto [`DefinitionStatus`]
fn definition_status(status: &AlertManagerDefinitionStatus) -> DefinitionStatus {
    let raw = status.status_code().as_str();
    let status_code = match raw.parse::<StatusCode>() {
        Ok(code) => Some(code),
        Err(e) => {
            warn!("{}", e);
            None
        }
    };

    DefinitionStatus {
        status_code,
        status_reason: status.status_reason().map(str::to_string),
    }
}

#[async_trait]
impl AlertManagerApi for AmpAlertManagerClient {
    async fn describe(&self, workspace_id: &str) -> Result<DescribedDefinition, RemoteError> {
        debug!("DescribeAlertManagerDefinition workspace={}", workspace_id);
        let output = self
            .client
            .describe_alert_manager_definition()
            .workspace_id(workspace_id)
            .send()
            .await
            .map_err(|e| remote_error_from_sdk(&e))?;

        let Some(definition) = output.alert_manager_definition() else {
            return Err(RemoteError::not_found(format!(
                "workspace {workspace_id} has no alert manager definition"
            )));
        };

        Ok(DescribedDefinition {
            status: definition.status().map(definition_status),
            data: Some(definition.data().as_ref().to_vec()),
        })
    }

    async fn create(
        &self,
        workspace_id: &str,
        data: &[u8],
    ) -> Result<Option<DefinitionStatus>, RemoteError> {
        debug!(
            "CreateAlertManagerDefinition workspace={} bytes={}",
            workspace_id,
            data.len()
        );
        let output = self
            .client
            .create_alert_manager_definition()
            .workspace_id(workspace_id)
            .data(Blob::new(data))
            .send()
            .await
            .map_err(|e| remote_error_from_sdk(&e))?;

        Ok(output.status().map(definition_status))
    }

    async fn put(
        &self,
        workspace_id: &str,
        data: &[u8],
    ) -> Result<Option<DefinitionStatus>, RemoteError> {
        debug!(
            "PutAlertManagerDefinition workspace={} bytes={}",
            workspace_id,
            data.len()
        );
        let output = self
            .client
            .put_alert_manager_definition()
            .workspace_id(workspace_id)
            .data(Blob::new(data))
            .send()
            .await
            .map_err(|e| remote_error_from_sdk(&e))?;

        Ok(output.status().map(definition_status))
    }

    async fn delete(&self, workspace_id: &str) -> Result<(), RemoteError> {
        debug!("DeleteAlertManagerDefinition workspace={}", workspace_id);
        self.client
            .delete_alert_manager_definition()
            .workspace_id(workspace_id)
            .send()
            .await
            .map_err(|e| remote_error_from_sdk(&e))?;

        Ok(())
    }
}
