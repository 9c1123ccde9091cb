//! # Constants
//!
//! Default values shared by configuration, the reconciler and the runtime.

/// Default HTTP port for metrics and health probes
pub const DEFAULT_METRICS_PORT: u16 = 8080;

/// How long to wait for the HTTP server to accept connections at startup
pub const DEFAULT_SERVER_STARTUP_TIMEOUT_SECS: u64 = 10;

/// Poll interval while waiting for the HTTP server
pub const DEFAULT_SERVER_POLL_INTERVAL_MS: u64 = 50;

/// Wait while the definition is CREATING, UPDATING or DELETING
pub const DEFAULT_TRANSIENT_REQUEUE_SECS: u64 = 10;

/// Wait used for state-guard violations and unsynced resources
pub const DEFAULT_REQUEUE_SECS: u64 = 30;

/// Periodic resync for resources that are in sync
pub const DEFAULT_RESYNC_PERIOD_SECS: u64 = 600;

/// Fallback requeue when the backoff state cannot be locked
pub const DEFAULT_RECONCILIATION_ERROR_REQUEUE_SECS: u64 = 60;

/// Fibonacci error backoff bounds (minutes)
pub const DEFAULT_BACKOFF_MIN_MINUTES: u64 = 1;
pub const DEFAULT_BACKOFF_MAX_MINUTES: u64 = 10;

/// Backend error codes that stop automatic retries
pub const DEFAULT_TERMINAL_ERROR_CODES: &[&str] = &["ValidationException"];

/// Backend error code reported when the definition does not exist
pub const RESOURCE_NOT_FOUND_CODE: &str = "ResourceNotFoundException";

/// Finalizer guarding deletion of the remote definition
pub const FINALIZER_NAME: &str = "finalizers.prometheusservice.services.k8s.aws/alertmanagerdefinition";

/// Annotation used by `amdctl reconcile` to request a manual reconciliation
pub const RECONCILE_ANNOTATION: &str = "prometheusservice.services.k8s.aws/reconcile";

/// Field manager name for status patches
pub const FIELD_MANAGER: &str = "amp-alertmanager-controller";

/// Delay before restarting the watch after an unexpected stream error
pub const DEFAULT_WATCH_RESTART_DELAY_SECS: u64 = 5;
