//! # Lifecycle Classification
//!
//! Predicates over a snapshot's remote status code. All of them are false while
//! the status is unset.

use super::snapshot::Snapshot;
use crate::crd::StatusCode;

/// Statuses from which the definition can no longer be mutated
pub const TERMINAL_STATUSES: [StatusCode; 2] = [StatusCode::CreationFailed, StatusCode::Deleting];

/// Statuses the user can recover from by changing the desired state
pub const FAILED_STATUSES: [StatusCode; 2] = [StatusCode::CreationFailed, StatusCode::UpdateFailed];

impl Snapshot {
    fn status_is(&self, code: StatusCode) -> bool {
        self.status_code() == Some(code)
    }

    fn status_in(&self, codes: &[StatusCode]) -> bool {
        self.status_code().is_some_and(|code| codes.contains(&code))
    }

    pub fn is_creating(&self) -> bool {
        self.status_is(StatusCode::Creating)
    }

    pub fn is_updating(&self) -> bool {
        self.status_is(StatusCode::Updating)
    }

    pub fn is_deleting(&self) -> bool {
        self.status_is(StatusCode::Deleting)
    }

    pub fn is_active(&self) -> bool {
        self.status_is(StatusCode::Active)
    }

    /// CREATING, UPDATING or DELETING - the backend is still working
    pub fn is_transient(&self) -> bool {
        self.is_creating() || self.is_updating() || self.is_deleting()
    }

    pub fn has_terminal_status(&self) -> bool {
        self.status_in(&TERMINAL_STATUSES)
    }

    pub fn has_failed_status(&self) -> bool {
        self.status_in(&FAILED_STATUSES)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_code(code: StatusCode) -> Snapshot {
        Snapshot::default().with_status(Some(code), None)
    }

    #[test]
    fn test_unset_status_matches_nothing() {
        let snapshot = Snapshot::default();
        assert!(!snapshot.is_creating());
        assert!(!snapshot.is_updating());
        assert!(!snapshot.is_deleting());
        assert!(!snapshot.is_active());
        assert!(!snapshot.is_transient());
        assert!(!snapshot.has_terminal_status());
        assert!(!snapshot.has_failed_status());
    }

    #[test]
    fn test_single_status_predicates() {
        assert!(with_code(StatusCode::Creating).is_creating());
        assert!(with_code(StatusCode::Updating).is_updating());
        assert!(with_code(StatusCode::Deleting).is_deleting());
        assert!(with_code(StatusCode::Active).is_active());
        assert!(!with_code(StatusCode::Active).is_creating());
        assert!(!with_code(StatusCode::UpdateFailed).is_updating());
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(with_code(StatusCode::CreationFailed).has_terminal_status());
        assert!(with_code(StatusCode::Deleting).has_terminal_status());
        assert!(!with_code(StatusCode::UpdateFailed).has_terminal_status());
        assert!(!with_code(StatusCode::Active).has_terminal_status());
    }

    #[test]
    fn test_failed_statuses() {
        assert!(with_code(StatusCode::CreationFailed).has_failed_status());
        assert!(with_code(StatusCode::UpdateFailed).has_failed_status());
        assert!(!with_code(StatusCode::Deleting).has_failed_status());
        assert!(!with_code(StatusCode::Creating).has_failed_status());
    }

    #[test]
    fn test_transient_statuses() {
        for code in [StatusCode::Creating, StatusCode::Updating, StatusCode::Deleting] {
            assert!(with_code(code).is_transient(), "{code} should be transient");
        }
        for code in [
            StatusCode::Active,
            StatusCode::CreationFailed,
            StatusCode::UpdateFailed,
        ] {
            assert!(!with_code(code).is_transient(), "{code} should be stable");
        }
    }
}
