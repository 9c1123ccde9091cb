//! # AMP Alert Manager Definition Controller
//!
//! A Kubernetes controller that manages the alert manager definition of Amazon
//! Managed Service for Prometheus workspaces from `AlertManagerDefinition`
//! custom resources.
//!
//! ## Overview
//!
//! 1. **Watching definitions** - `AlertManagerDefinition` resources in all namespaces,
//!    or one namespace when `WATCH_NAMESPACE` is set
//! 2. **Reconciling** - creates, replaces or waits on the workspace's definition
//!    depending on its AMP lifecycle status
//! 3. **Deleting** - a finalizer removes the definition from AMP before the
//!    resource goes away
//!
//! AMP validates some configurations asynchronously. A definition that lands in
//! `CREATION_FAILED` or `UPDATE_FAILED` is marked Terminal and retried once the
//! spec changes.

use amp_alertmanager_controller::runtime::{initialize, run_watch_loop};
use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    let init_result = initialize().await?;

    run_watch_loop(
        init_result.definitions,
        init_result.reconciler,
        init_result.server_state,
    )
    .await?;

    Ok(())
}
