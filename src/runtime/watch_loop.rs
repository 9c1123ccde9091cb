//! # Watch Loop
//!
//! Runs the kube-runtime controller over AlertManagerDefinition resources.

use crate::controller::reconciler::{reconcile, Reconciler};
use crate::controller::server::ServerState;
use crate::crd::AlertManagerDefinition;
use crate::runtime::error_policy::{error_policy, handle_watch_stream_error};
use anyhow::Result;
use futures::StreamExt;
use kube::api::Api;
use kube_runtime::controller::Controller;
use kube_runtime::watcher;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Watch definitions and reconcile them until shutdown
///
/// Readiness is dropped once the controller stream ends.
pub async fn run_watch_loop(
    definitions: Api<AlertManagerDefinition>,
    reconciler: Arc<Reconciler>,
    server_state: Arc<ServerState>,
) -> Result<()> {
    Controller::new(definitions, watcher::Config::default().any_semantic())
        .shutdown_on_signal()
        .run(reconcile, error_policy, reconciler)
        .for_each(|result| async move {
            match result {
                Ok((object, _action)) => {
                    debug!("Reconciled {}/{}", object.namespace.as_deref().unwrap_or("default"), object.name);
                }
                Err(kube_runtime::controller::Error::ReconcilerFailed(e, object)) => {
                    // Already handled by error_policy
                    debug!("Reconciler failed for {}: {}", object.name, e);
                }
                Err(e) => handle_watch_stream_error(&e.to_string()).await,
            }
        })
        .await;

    server_state.is_ready.store(false, Ordering::Relaxed);
    warn!("Controller stream ended");
    info!("Shutting down");
    Ok(())
}
