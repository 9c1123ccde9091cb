//! # Initialization
//!
//! Controller initialization logic including rustls setup, tracing, metrics,
//! server startup, and Kubernetes and AMP client setup.

use crate::config::{load_config, ControllerConfig, ServerConfig};
use crate::controller::reconciler::Reconciler;
use crate::controller::server::{start_server, ServerState};
use crate::crd::AlertManagerDefinition;
use crate::observability;
use crate::provider::AmpAlertManagerClient;
use anyhow::{Context, Result};
use kube::{api::Api, api::ListParams, Client, ResourceExt};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

/// Initialization result containing all necessary components for the controller
pub struct InitializationResult {
    pub client: Client,
    /// API for the watched AlertManagerDefinition resources
    pub definitions: Api<AlertManagerDefinition>,
    pub reconciler: Arc<Reconciler>,
    /// Server state for health checks
    pub server_state: Arc<ServerState>,
}

impl std::fmt::Debug for InitializationResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InitializationResult")
            .field("definitions", &self.definitions.resource_url())
            .field("reconciler", &self.reconciler)
            .field("server_state", &self.server_state)
            .finish_non_exhaustive()
    }
}

/// Install the default tracing subscriber
///
/// `RUST_LOG` overrides the default `amp_alertmanager_controller=info` filter.
pub fn init_tracing() {
    if let Err(e) = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "amp_alertmanager_controller=info".into()),
        )
        .try_init()
    {
        eprintln!("Tracing subscriber already initialized: {e}");
    }
}

/// Initialize the controller runtime
///
/// This function handles:
/// - Tracing subscriber setup
/// - rustls crypto provider setup
/// - Metrics registration
/// - HTTP server startup
/// - Kubernetes and AMP client creation
/// - Reconciler setup
pub async fn initialize() -> Result<InitializationResult> {
    init_tracing();

    // Required for rustls 0.23+ when no default provider is set via features
    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        warn!("rustls crypto provider was already installed");
    }

    let (controller_config, server_config) = load_config();
    info!("Starting AMP Alert Manager Definition controller");
    info!(
        "Configuration: transient_requeue={}s default_requeue={}s resync={}s terminal_codes={:?}",
        controller_config.transient_requeue_secs,
        controller_config.default_requeue_secs,
        controller_config.resync_period_secs,
        controller_config.terminal_error_codes
    );

    observability::metrics::register_metrics()?;

    let server_state = Arc::new(ServerState::default());
    let server_state_clone = server_state.clone();
    let server_port = server_config.metrics_port;
    let server_handle = tokio::spawn(async move {
        if let Err(e) = start_server(server_port, server_state_clone).await {
            error!("HTTP server error: {}", e);
        }
    });
    wait_for_server_ready(&server_config, &server_state, &server_handle).await?;

    let client = Client::try_default()
        .await
        .context("Failed to create Kubernetes client")?;

    let definitions: Api<AlertManagerDefinition> = match &controller_config.watch_namespace {
        Some(namespace) => {
            info!("Watching AlertManagerDefinition resources in namespace {}", namespace);
            Api::namespaced(client.clone(), namespace)
        }
        None => Api::all(client.clone()),
    };

    let reconciler = Arc::new(create_reconciler(client.clone(), &controller_config).await?);

    summarize_existing_resources(&definitions).await;

    info!("Controller initialized, starting watch loop...");

    Ok(InitializationResult {
        client,
        definitions,
        reconciler,
        server_state,
    })
}

/// Build the reconciler context backed by the AWS AMP client
async fn create_reconciler(client: Client, config: &ControllerConfig) -> Result<Reconciler> {
    let amp = AmpAlertManagerClient::new(config)
        .await
        .context("Failed to create AMP client")?;
    let region = amp.region().map(str::to_string);
    match &region {
        Some(region) => info!("AMP client configured for region {}", region),
        None => warn!("No AWS region resolved - set AWS_REGION"),
    }
    let account_id = amp.account_id().map(str::to_string);
    if account_id.is_none() {
        warn!("No AWS account ID resolved - set AWS_ACCOUNT_ID to record the owner account");
    }

    Ok(Reconciler::new(
        client,
        Arc::new(amp),
        config,
        region,
        account_id,
    ))
}

/// Wait for the HTTP server to become ready
async fn wait_for_server_ready(
    config: &ServerConfig,
    server_state: &Arc<ServerState>,
    server_handle: &tokio::task::JoinHandle<()>,
) -> Result<()> {
    let startup_timeout = Duration::from_secs(config.startup_timeout_secs);
    let poll_interval = Duration::from_millis(config.poll_interval_ms);
    let start_time = Instant::now();

    loop {
        if server_handle.is_finished() {
            return Err(anyhow::anyhow!("HTTP server failed to start"));
        }

        if server_state
            .is_ready
            .load(std::sync::atomic::Ordering::Relaxed)
        {
            info!("HTTP server is ready and accepting connections");
            return Ok(());
        }

        if start_time.elapsed() > startup_timeout {
            return Err(anyhow::anyhow!(
                "HTTP server failed to become ready within {} seconds",
                startup_timeout.as_secs()
            ));
        }

        tokio::time::sleep(poll_interval).await;
    }
}

/// Log existing resources by namespace, checking the CRD is installed
async fn summarize_existing_resources(definitions: &Api<AlertManagerDefinition>) {
    let list = match definitions.list(&ListParams::default()).await {
        Ok(list) => list,
        Err(e) => {
            error!("CRD is not queryable; {:?}. Is the CRD installed?", e);
            error!("Installation: crdgen | kubectl apply -f -");
            warn!("Continuing despite CRD queryability check failure - controller will retry");
            return;
        }
    };

    let mut by_namespace: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for item in &list.items {
        by_namespace
            .entry(item.namespace().unwrap_or_else(|| "default".to_string()))
            .or_default()
            .push(item.name_any());
    }

    info!(
        "Found {} existing AlertManagerDefinition resources in {} namespaces",
        list.items.len(),
        by_namespace.len()
    );
    for (namespace, mut names) in by_namespace {
        names.sort();
        info!("  {}: {}", namespace, names.join(", "));
    }
}
