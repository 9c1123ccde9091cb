//! # Amazon Managed Service for Prometheus Client
//!
//! Client for the AMP alert manager definition API.
//!
//! This module provides functionality to:
//! - Describe, create, replace and delete a workspace's alert manager definition
//! - Convert SDK errors into tagged [`RemoteError`] values
//! - Support IRSA (IAM Roles for Service Accounts) through the default credential chain

mod auth;
mod client;

use aws_sdk_amp::Client as AmpClient;

use crate::config::ControllerConfig;
use anyhow::Result;

use self::auth::{create_sdk_config, resolve_account_id};

pub use client::remote_error_from_sdk;

/// AMP alert manager definition client
pub struct AmpAlertManagerClient {
    pub(crate) client: AmpClient,
    pub(crate) region: Option<String>,
    pub(crate) account_id: Option<String>,
}

impl std::fmt::Debug for AmpAlertManagerClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AmpAlertManagerClient")
            .field("region", &self.region)
            .field("account_id", &self.account_id)
            .finish_non_exhaustive()
    }
}

impl AmpAlertManagerClient {
    /// Create a new AMP client from controller configuration
    #[allow(
        clippy::missing_errors_doc,
        reason = "Error documentation is provided in doc comments"
    )]
    pub async fn new(config: &ControllerConfig) -> Result<Self> {
        let sdk_config = create_sdk_config(
            config.aws_region.as_deref(),
            config.amp_endpoint_url.as_deref(),
        )
        .await?;
        let region = sdk_config.region().map(ToString::to_string);
        let account_id = match &config.aws_account_id {
            Some(account_id) => Some(account_id.clone()),
            None => resolve_account_id(&sdk_config).await,
        };
        let client = AmpClient::new(&sdk_config);

        Ok(Self {
            client,
            region,
            account_id,
        })
    }

    /// Region the client resolved, if any
    pub fn region(&self) -> Option<&str> {
        self.region.as_deref()
    }

    /// Account that owns the managed workspaces, if known
    pub fn account_id(&self) -> Option<&str> {
        self.account_id.as_deref()
    }
}
