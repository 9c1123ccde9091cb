//! # Controller Configuration
//!
//! Reconciliation timing, terminal error classification and AWS settings.

use super::{env_var_opt, env_var_or_default};
use crate::controller::reconciler::{RequeuePolicy, TerminalErrorPolicy};
use std::time::Duration;

/// Controller configuration
///
/// All settings have sensible defaults and can be overridden via environment variables.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Requeue delay while the definition is CREATING, UPDATING or DELETING (seconds)
    pub transient_requeue_secs: u64,
    /// Requeue delay for state-guard violations and unsynced resources (seconds)
    pub default_requeue_secs: u64,
    /// Periodic resync for resources that are in sync (seconds)
    pub resync_period_secs: u64,
    /// Backend error codes treated as terminal
    /// Comma-separated in `TERMINAL_ERROR_CODES`
    pub terminal_error_codes: Vec<String>,
    /// AWS region override, SDK default chain when unset
    pub aws_region: Option<String>,
    /// Account recorded as `.status.ownerAccountID`, STS caller identity when unset
    pub aws_account_id: Option<String>,
    /// AMP endpoint override (mock servers, VPC endpoints)
    pub amp_endpoint_url: Option<String>,
    /// Restrict the watch to a single namespace
    pub watch_namespace: Option<String>,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        use crate::constants::*;
        Self {
            transient_requeue_secs: DEFAULT_TRANSIENT_REQUEUE_SECS,
            default_requeue_secs: DEFAULT_REQUEUE_SECS,
            resync_period_secs: DEFAULT_RESYNC_PERIOD_SECS,
            terminal_error_codes: DEFAULT_TERMINAL_ERROR_CODES
                .iter()
                .map(|code| (*code).to_string())
                .collect(),
            aws_region: None,
            aws_account_id: None,
            amp_endpoint_url: None,
            watch_namespace: None,
        }
    }
}

impl ControllerConfig {
    /// Load configuration from environment variables with defaults
    pub fn from_env() -> Self {
        use crate::constants::*;
        let terminal_error_codes = env_var_opt("TERMINAL_ERROR_CODES").map_or_else(
            || Self::default().terminal_error_codes,
            |raw| parse_code_list(&raw),
        );

        Self {
            transient_requeue_secs: env_var_or_default(
                "TRANSIENT_REQUEUE_SECS",
                DEFAULT_TRANSIENT_REQUEUE_SECS,
            ),
            default_requeue_secs: env_var_or_default("DEFAULT_REQUEUE_SECS", DEFAULT_REQUEUE_SECS),
            resync_period_secs: env_var_or_default(
                "RESYNC_PERIOD_SECS",
                DEFAULT_RESYNC_PERIOD_SECS,
            ),
            terminal_error_codes,
            aws_region: env_var_opt("AWS_REGION"),
            aws_account_id: env_var_opt("AWS_ACCOUNT_ID"),
            amp_endpoint_url: env_var_opt("AMP_ENDPOINT_URL"),
            watch_namespace: env_var_opt("WATCH_NAMESPACE"),
        }
    }

    /// Requeue delays handed to the resource manager
    pub fn requeue_policy(&self) -> RequeuePolicy {
        RequeuePolicy {
            transient: Duration::from_secs(self.transient_requeue_secs),
            default: Duration::from_secs(self.default_requeue_secs),
        }
    }

    /// Terminal error classifier handed to the resource manager
    pub fn terminal_policy(&self) -> TerminalErrorPolicy {
        TerminalErrorPolicy::new(self.terminal_error_codes.iter().cloned())
    }

    pub fn resync_period(&self) -> Duration {
        Duration::from_secs(self.resync_period_secs)
    }
}

/// Split a comma-separated list of error codes, dropping blanks
fn parse_code_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|code| !code.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_requeue_policy() {
        let policy = ControllerConfig::default().requeue_policy();
        assert_eq!(policy.transient, Duration::from_secs(10));
        assert_eq!(policy.default, Duration::from_secs(30));
    }

    #[test]
    fn test_default_terminal_codes() {
        let config = ControllerConfig::default();
        assert_eq!(config.terminal_error_codes, vec!["ValidationException"]);
        assert!(config.terminal_policy().is_terminal_code("ValidationException"));
        assert!(!config.terminal_policy().is_terminal_code("ThrottlingException"));
        assert!(config.aws_account_id.is_none());
    }

    #[test]
    fn test_parse_code_list() {
        assert_eq!(
            parse_code_list(" ValidationException, ,ConflictException "),
            vec!["ValidationException", "ConflictException"]
        );
        assert!(parse_code_list(" , ").is_empty());
    }
}
