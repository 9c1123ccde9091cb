//! # Condition Updater
//!
//! Derives the Terminal and Recoverable conditions from the error of a pass.

use super::error::ReconcileError;
use super::snapshot::{ConditionType, Snapshot};
use crate::provider::RemoteErrorKind;
use std::collections::HashSet;

/// Backend error codes that no retry can fix
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerminalErrorPolicy {
    codes: HashSet<String>,
}

impl Default for TerminalErrorPolicy {
    fn default() -> Self {
        Self::new(
            crate::constants::DEFAULT_TERMINAL_ERROR_CODES
                .iter()
                .map(|code| (*code).to_string()),
        )
    }
}

impl TerminalErrorPolicy {
    pub fn new(codes: impl IntoIterator<Item = String>) -> Self {
        Self {
            codes: codes.into_iter().collect(),
        }
    }

    pub fn is_terminal_code(&self, code: &str) -> bool {
        self.codes.contains(code)
    }

    /// Terminal errors: coded service errors in the set, and local validation failures
    pub fn is_terminal(&self, err: &ReconcileError) -> bool {
        match err {
            ReconcileError::Terminal(_) => true,
            ReconcileError::Remote(remote) => {
                remote.kind == RemoteErrorKind::Service
                    && remote
                        .code
                        .as_deref()
                        .is_some_and(|code| self.is_terminal_code(code))
            }
            ReconcileError::NotFound => false,
        }
    }
}

/// Apply the outcome of a pass to the condition set
///
/// Returns `None` when nothing would change, so repeated application with the
/// same error is a no-op. An existing condition that no longer applies is set
/// to false rather than removed.
pub fn update_conditions(
    snapshot: &Snapshot,
    err: Option<&ReconcileError>,
    policy: &TerminalErrorPolicy,
) -> Option<Snapshot> {
    let mut updated = snapshot.clone();

    match err {
        Some(err) if policy.is_terminal(err) => {
            updated = updated.with_condition(ConditionType::Terminal, true, Some(err.to_string()));
        }
        _ => {
            if updated.condition(ConditionType::Terminal).is_some() {
                updated = updated.with_condition(ConditionType::Terminal, false, None);
            }
            match err {
                Some(err) => {
                    updated = updated.with_condition(
                        ConditionType::Recoverable,
                        true,
                        Some(err.to_string()),
                    );
                }
                None if updated.condition(ConditionType::Recoverable).is_some() => {
                    updated = updated.with_condition(ConditionType::Recoverable, false, None);
                }
                None => {}
            }
        }
    }

    (updated.conditions() != snapshot.conditions()).then_some(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::RemoteError;

    fn policy() -> TerminalErrorPolicy {
        TerminalErrorPolicy::default()
    }

    #[test]
    fn test_validation_exception_is_terminal() {
        let err = ReconcileError::Remote(RemoteError::service("ValidationException", "bad"));
        assert!(policy().is_terminal(&err));
        let err = ReconcileError::Remote(RemoteError::service("ThrottlingException", "slow"));
        assert!(!policy().is_terminal(&err));
        assert!(!policy().is_terminal(&ReconcileError::NotFound));
        assert!(policy().is_terminal(&ReconcileError::Terminal("configuration is required".into())));
    }

    #[test]
    fn test_injected_codes_replace_defaults() {
        let policy = TerminalErrorPolicy::new(vec!["ConflictException".to_string()]);
        let conflict = ReconcileError::Remote(RemoteError::service("ConflictException", "busy"));
        let validation = ReconcileError::Remote(RemoteError::service("ValidationException", "bad"));
        assert!(policy.is_terminal(&conflict));
        assert!(!policy.is_terminal(&validation));
    }

    #[test]
    fn test_transport_errors_are_never_terminal() {
        let mut remote = RemoteError::transport("timeout");
        remote.code = Some("ValidationException".to_string());
        assert!(!policy().is_terminal(&ReconcileError::Remote(remote)));
    }

    #[test]
    fn test_terminal_error_sets_terminal_condition() {
        let err = ReconcileError::Remote(RemoteError::service("ValidationException", "bad route"));
        let updated = update_conditions(&Snapshot::default(), Some(&err), &policy())
            .expect("conditions should change");

        let terminal = updated.condition(ConditionType::Terminal).unwrap();
        assert!(terminal.status);
        assert_eq!(terminal.message.as_deref(), Some("ValidationException: bad route"));
        assert!(updated.condition(ConditionType::Recoverable).is_none());
    }

    #[test]
    fn test_recoverable_error_clears_terminal() {
        let snapshot = Snapshot::default().with_condition(
            ConditionType::Terminal,
            true,
            Some("old".into()),
        );
        let err = ReconcileError::Remote(RemoteError::transport("connection reset"));
        let updated = update_conditions(&snapshot, Some(&err), &policy()).unwrap();

        assert!(!updated.condition_is_true(ConditionType::Terminal));
        assert!(updated.condition(ConditionType::Terminal).unwrap().message.is_none());
        let recoverable = updated.condition(ConditionType::Recoverable).unwrap();
        assert!(recoverable.status);
        assert_eq!(recoverable.message.as_deref(), Some("connection reset"));
    }

    #[test]
    fn test_success_clears_recoverable() {
        let snapshot = Snapshot::default().with_condition(
            ConditionType::Recoverable,
            true,
            Some("throttled".into()),
        );
        let updated = update_conditions(&snapshot, None, &policy()).unwrap();
        let recoverable = updated.condition(ConditionType::Recoverable).unwrap();
        assert!(!recoverable.status);
        assert!(recoverable.message.is_none());
    }

    #[test]
    fn test_success_on_clean_snapshot_changes_nothing() {
        assert!(update_conditions(&Snapshot::default(), None, &policy()).is_none());
    }

    #[test]
    fn test_second_identical_application_is_noop() {
        let errors = [
            None,
            Some(ReconcileError::Remote(RemoteError::service("ValidationException", "bad"))),
            Some(ReconcileError::Remote(RemoteError::transport("timeout"))),
        ];
        let start = Snapshot::default()
            .with_condition(ConditionType::Terminal, true, Some("x".into()))
            .with_condition(ConditionType::Recoverable, true, Some("y".into()));

        for err in &errors {
            let first = update_conditions(&start, err.as_ref(), &policy()).unwrap_or(start.clone());
            assert!(
                update_conditions(&first, err.as_ref(), &policy()).is_none(),
                "second application with {err:?} should not change anything"
            );
        }
    }

    #[test]
    fn test_synced_condition_is_untouched() {
        let snapshot = Snapshot::default().with_synced(true, None);
        let err = ReconcileError::Remote(RemoteError::transport("timeout"));
        let updated = update_conditions(&snapshot, Some(&err), &policy()).unwrap();
        assert!(updated.condition_is_true(ConditionType::Synced));
    }
}
