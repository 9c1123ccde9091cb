//! # AMDCTL CLI
//!
//! Command-line interface for the AMP Alert Manager Definition controller.
//!
//! ## Usage
//!
//! ```bash
//! # Trigger reconciliation for a specific AlertManagerDefinition
//! amdctl reconcile --namespace monitoring --name team-alerts
//!
//! # List all AlertManagerDefinition resources
//! amdctl list
//!
//! # Show status of an AlertManagerDefinition
//! amdctl status --namespace monitoring --name team-alerts
//! ```

use amp_alertmanager_controller::constants::RECONCILE_ANNOTATION;
use amp_alertmanager_controller::AlertManagerDefinition;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use kube::{
    api::{Api, ListParams, Patch, PatchParams},
    Client,
};
use serde_json::json;
use std::collections::BTreeMap;

/// AMP Alert Manager Definition controller CLI
#[derive(Parser)]
#[command(name = "amdctl")]
#[command(about = "AMP Alert Manager Definition controller CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Kubernetes namespace
    #[arg(short, long, global = true)]
    namespace: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Trigger reconciliation for an AlertManagerDefinition
    ///
    /// Also lifts a Terminal stop without changing the spec.
    Reconcile {
        /// Name of the AlertManagerDefinition resource
        #[arg(long)]
        name: String,
    },
    /// List AlertManagerDefinition resources (all namespaces unless --namespace is set)
    List,
    /// Show status of an AlertManagerDefinition
    Status {
        /// Name of the AlertManagerDefinition resource
        #[arg(long)]
        name: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "amdctl=info".into()),
        )
        .init();

    let cli = Cli::parse();

    let client = Client::try_default()
        .await
        .context("Failed to create Kubernetes client. Ensure kubeconfig is configured.")?;

    match cli.command {
        Commands::Reconcile { name } => reconcile_command(client, name, cli.namespace).await,
        Commands::List => list_command(client, cli.namespace).await,
        Commands::Status { name } => status_command(client, name, cli.namespace).await,
    }
}

/// Trigger reconciliation by setting the reconcile annotation to a new timestamp
async fn reconcile_command(client: Client, name: String, namespace: Option<String>) -> Result<()> {
    let ns = namespace.as_deref().unwrap_or("default");
    println!("Triggering reconciliation for AlertManagerDefinition '{ns}/{name}'...");

    let api: Api<AlertManagerDefinition> = Api::namespaced(client, ns);
    let timestamp = chrono::Utc::now().to_rfc3339();
    let annotations = BTreeMap::from([(RECONCILE_ANNOTATION, timestamp.as_str())]);
    let patch = json!({
        "metadata": {
            "annotations": annotations
        }
    });

    api.patch(&name, &PatchParams::default(), &Patch::Merge(patch))
        .await
        .with_context(|| format!("Failed to trigger reconciliation for '{ns}/{name}'"))?;

    println!("Reconciliation triggered");
    println!("   Resource: {ns}/{name}");
    println!("   Timestamp: {timestamp}");

    Ok(())
}

fn condition_value(amd: &AlertManagerDefinition, kind: &str) -> String {
    amd.status
        .as_ref()
        .and_then(|s| s.conditions.iter().find(|c| c.r#type == kind))
        .map_or_else(|| "Unknown".to_string(), |c| c.status.clone())
}

async fn list_command(client: Client, namespace: Option<String>) -> Result<()> {
    let api: Api<AlertManagerDefinition> = match namespace.as_deref() {
        Some(ns) => Api::namespaced(client, ns),
        None => Api::all(client),
    };

    let definitions = api
        .list(&ListParams::default())
        .await
        .context("Failed to list AlertManagerDefinition resources")?;

    if definitions.items.is_empty() {
        println!("No AlertManagerDefinition resources found.");
        return Ok(());
    }

    println!(
        "{:<30} {:<20} {:<40} {:<16} {:<8} {:<8}",
        "NAME", "NAMESPACE", "WORKSPACE", "STATUS", "SYNCED", "TERMINAL"
    );
    println!("{}", "-".repeat(126));

    for amd in &definitions.items {
        let status_code = amd
            .status
            .as_ref()
            .and_then(|s| s.status_code)
            .map_or("-", |code| code.as_str());
        println!(
            "{:<30} {:<20} {:<40} {:<16} {:<8} {:<8}",
            amd.metadata.name.as_deref().unwrap_or("<unknown>"),
            amd.metadata.namespace.as_deref().unwrap_or("<unknown>"),
            amd.spec.workspace_id,
            status_code,
            condition_value(amd, "ResourceSynced"),
            condition_value(amd, "Terminal"),
        );
    }

    Ok(())
}

async fn status_command(client: Client, name: String, namespace: Option<String>) -> Result<()> {
    let ns = namespace.as_deref().unwrap_or("default");
    let api: Api<AlertManagerDefinition> = Api::namespaced(client, ns);

    let amd = api
        .get(&name)
        .await
        .with_context(|| format!("Failed to get AlertManagerDefinition '{ns}/{name}'"))?;

    println!("Status for AlertManagerDefinition '{ns}/{name}':\n");
    println!("Spec:");
    println!("  Workspace ID: {}", amd.spec.workspace_id);
    match amd.spec.configuration.as_deref() {
        Some(configuration) => println!("  Configuration: {} bytes", configuration.len()),
        None => println!("  Configuration: <none>"),
    }
    if let Some(generation) = amd.metadata.generation {
        println!("  Generation: {generation}");
    }

    let Some(status) = amd.status.as_ref() else {
        println!("\nStatus: No status available (resource may not have been reconciled yet)");
        return Ok(());
    };

    println!("\nStatus:");
    if let Some(code) = status.status_code {
        println!("  Status Code: {code}");
    }
    if let Some(reason) = status.status_reason.as_deref() {
        println!("  Status Reason: {reason}");
    }
    if let Some(region) = status.region.as_deref() {
        println!("  Region: {region}");
    }
    if let Some(account) = status.owner_account_id.as_deref() {
        println!("  Owner Account: {account}");
    }
    if let Some(workspace) = status.workspace_id.as_deref() {
        println!("  Bound Workspace: {workspace}");
    }
    if let Some(generation) = status.observed_generation {
        println!("  Observed Generation: {generation}");
    }
    if let Some(at) = status.last_handled_reconcile_at.as_deref() {
        println!("  Last Manual Reconcile: {at}");
    }

    if !status.conditions.is_empty() {
        println!("\nConditions:");
        for condition in &status.conditions {
            println!("  {}: {}", condition.r#type, condition.status);
            if let Some(message) = condition.message.as_deref() {
                println!("    Message: {message}");
            }
            if let Some(time) = condition.last_transition_time.as_deref() {
                println!("    Last Transition: {time}");
            }
        }
    }

    Ok(())
}
