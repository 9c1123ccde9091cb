//! # AMP Authentication
//!
//! Handles AWS SDK configuration and authentication setup.

use anyhow::Result;
use aws_config::SdkConfig;
use tracing::{info, warn};

/// Create AWS SDK config using the default credential chain
///
/// The default chain covers IRSA: the pod's service account annotation
/// `eks.amazonaws.com/role-arn` provides the web identity token the SDK assumes.
pub async fn create_sdk_config(region: Option<&str>, endpoint: Option<&str>) -> Result<SdkConfig> {
    let mut builder = aws_config::defaults(aws_config::BehaviorVersion::latest());

    if let Some(region) = region {
        info!("Using AWS region override: {}", region);
        builder = builder.region(aws_config::Region::new(region.to_string()));
    }

    // Mock servers and VPC endpoints
    if let Some(endpoint) = endpoint {
        info!("Routing AMP requests to {}", endpoint);
        builder = builder.endpoint_url(endpoint);
    }

    let sdk_config = builder.load().await;

    Ok(sdk_config)
}

/// Account of the caller, from STS `GetCallerIdentity`
///
/// Best effort: a failure is logged and yields `None`.
pub async fn resolve_account_id(sdk_config: &SdkConfig) -> Option<String> {
    let sts = aws_sdk_sts::Client::new(sdk_config);
    match sts.get_caller_identity().send().await {
        Ok(identity) => identity.account().map(str::to_string),
        Err(e) => {
            warn!(
                "Failed to resolve AWS account ID: {}",
                aws_sdk_sts::error::DisplayErrorContext(&e)
            );
            None
        }
    }
}
