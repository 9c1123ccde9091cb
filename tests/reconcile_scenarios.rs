//! End-to-end passes of the resource manager against a scripted backend.
//!
//! Each scenario starts from a desired snapshot (spec plus persisted status) and
//! checks both the returned outcome and the exact backend calls made.

use amp_alertmanager_controller::controller::reconciler::{
    update_conditions, ConditionType, Outcome, ReconcileError, RequeuePolicy, ResourceManager,
    Snapshot, StateGuard, TerminalErrorPolicy,
};
use amp_alertmanager_controller::provider::{
    AlertManagerApi, DefinitionStatus, DescribedDefinition, RemoteError,
};
use amp_alertmanager_controller::StatusCode;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Call {
    Describe(String),
    Create(String, String),
    Put(String, String),
    Delete(String),
}

/// Backend with one scripted answer per operation
struct ScriptedAmp {
    describe: Result<DescribedDefinition, RemoteError>,
    create: Result<Option<DefinitionStatus>, RemoteError>,
    put: Result<Option<DefinitionStatus>, RemoteError>,
    delete: Result<(), RemoteError>,
    calls: Mutex<Vec<Call>>,
}

impl ScriptedAmp {
    fn missing() -> Self {
        Self::with_describe(Err(RemoteError::not_found("no definition")))
    }

    fn holding(code: StatusCode, data: &str) -> Self {
        Self::with_describe(Ok(DescribedDefinition {
            status: Some(DefinitionStatus::new(code)),
            data: Some(data.as_bytes().to_vec()),
        }))
    }

    fn with_describe(describe: Result<DescribedDefinition, RemoteError>) -> Self {
        Self {
            describe,
            create: Ok(Some(DefinitionStatus::new(StatusCode::Creating))),
            put: Ok(Some(DefinitionStatus::new(StatusCode::Updating))),
            delete: Ok(()),
            calls: Mutex::new(Vec::new()),
        }
    }

    fn failing_put(mut self, err: RemoteError) -> Self {
        self.put = Err(err);
        self
    }

    fn failing_delete(mut self, err: RemoteError) -> Self {
        self.delete = Err(err);
        self
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn mutating_calls(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|call| !matches!(call, Call::Describe(_)))
            .collect()
    }
}

#[async_trait]
impl AlertManagerApi for ScriptedAmp {
    async fn describe(&self, workspace_id: &str) -> Result<DescribedDefinition, RemoteError> {
        self.calls
            .lock()
            .unwrap()
            .push(Call::Describe(workspace_id.to_string()));
        self.describe.clone()
    }

    async fn create(
        &self,
        workspace_id: &str,
        data: &[u8],
    ) -> Result<Option<DefinitionStatus>, RemoteError> {
        self.calls.lock().unwrap().push(Call::Create(
            workspace_id.to_string(),
            String::from_utf8_lossy(data).into_owned(),
        ));
        self.create.clone()
    }

    async fn put(
        &self,
        workspace_id: &str,
        data: &[u8],
    ) -> Result<Option<DefinitionStatus>, RemoteError> {
        self.calls.lock().unwrap().push(Call::Put(
            workspace_id.to_string(),
            String::from_utf8_lossy(data).into_owned(),
        ));
        self.put.clone()
    }

    async fn delete(&self, workspace_id: &str) -> Result<(), RemoteError> {
        self.calls
            .lock()
            .unwrap()
            .push(Call::Delete(workspace_id.to_string()));
        self.delete.clone()
    }
}

fn manager(amp: &Arc<ScriptedAmp>) -> ResourceManager {
    ResourceManager::new(
        amp.clone(),
        RequeuePolicy::default(),
        TerminalErrorPolicy::default(),
    )
}

fn desired(config: &str) -> Snapshot {
    Snapshot::desired(Some("ws-1".to_string()), Some(config.to_string()))
}

fn persisted(config: &str, code: StatusCode) -> Snapshot {
    desired(config).with_status(Some(code), None)
}

#[tokio::test]
async fn test_missing_definition_is_created() {
    let amp = Arc::new(ScriptedAmp::missing());
    let outcome = manager(&amp).reconcile(&desired("route: {}")).await.unwrap();

    assert_eq!(
        amp.calls(),
        vec![
            Call::Describe("ws-1".into()),
            Call::Create("ws-1".into(), "route: {}".into()),
        ]
    );
    let Outcome::Updated(snapshot) = outcome else {
        panic!("expected an updated snapshot, got {outcome:?}");
    };
    assert_eq!(snapshot.status_code(), Some(StatusCode::Creating));
    assert!(!snapshot.condition_is_true(ConditionType::Synced));
    assert!(snapshot.condition(ConditionType::Terminal).is_none());
    assert!(snapshot.condition(ConditionType::Recoverable).is_none());
}

#[tokio::test]
async fn test_changed_configuration_is_put() {
    let amp = Arc::new(ScriptedAmp::holding(StatusCode::Active, "a"));
    let outcome = manager(&amp)
        .reconcile(&persisted("b", StatusCode::Active))
        .await
        .unwrap();

    assert_eq!(amp.mutating_calls(), vec![Call::Put("ws-1".into(), "b".into())]);
    let snapshot = outcome.snapshot().unwrap();
    assert_eq!(snapshot.status_code(), Some(StatusCode::Updating));
    assert_eq!(snapshot.configuration(), Some("b"));
    assert!(!snapshot.condition_is_true(ConditionType::Synced));
}

#[tokio::test]
async fn test_unchanged_active_definition_is_synced() {
    let amp = Arc::new(ScriptedAmp::holding(StatusCode::Active, "a"));
    let outcome = manager(&amp)
        .reconcile(&persisted("a", StatusCode::Active))
        .await
        .unwrap();

    assert!(amp.mutating_calls().is_empty());
    let snapshot = outcome.snapshot().unwrap();
    assert!(snapshot.condition_is_true(ConditionType::Synced));
}

#[tokio::test]
async fn test_in_progress_statuses_wait_without_mutating() {
    for code in [StatusCode::Creating, StatusCode::Updating, StatusCode::Deleting] {
        let amp = Arc::new(ScriptedAmp::holding(code, "a"));
        let outcome = manager(&amp).reconcile(&desired("b")).await.unwrap();

        assert!(amp.mutating_calls().is_empty(), "{code} issued a mutating call");
        match outcome {
            Outcome::RequeueAfter {
                snapshot,
                after,
                reason,
            } => {
                assert_eq!(after, Duration::from_secs(10));
                assert_eq!(reason, StateGuard::InProgress(code));
                assert!(!snapshot.condition_is_true(ConditionType::Synced));
            }
            other => panic!("expected a requeue for {code}, got {other:?}"),
        }
    }
}

#[tokio::test]
async fn test_delete_while_deleting_waits() {
    let amp = Arc::new(ScriptedAmp::holding(StatusCode::Deleting, "a"));
    let rm = manager(&amp);
    let latest = rm.read_one(&desired("a")).await.unwrap();
    let outcome = rm.delete(&latest).await.unwrap();

    assert!(amp.mutating_calls().is_empty());
    assert_eq!(
        outcome,
        Outcome::RequeueAfter {
            snapshot: latest,
            after: Duration::from_secs(10),
            reason: StateGuard::InProgress(StatusCode::Deleting),
        }
    );
}

#[tokio::test]
async fn test_delete_active_definition_removes_it() {
    let amp = Arc::new(ScriptedAmp::holding(StatusCode::Active, "a"));
    let rm = manager(&amp);
    let latest = rm.read_one(&desired("a")).await.unwrap();

    assert_eq!(rm.delete(&latest).await.unwrap(), Outcome::Removed);
    assert_eq!(amp.mutating_calls(), vec![Call::Delete("ws-1".into())]);
}

#[tokio::test]
async fn test_reapplying_failed_configuration_puts_again() {
    let amp = Arc::new(ScriptedAmp::holding(StatusCode::UpdateFailed, "a"));
    let outcome = manager(&amp)
        .reconcile(&persisted("a", StatusCode::UpdateFailed))
        .await
        .unwrap();

    assert_eq!(amp.mutating_calls(), vec![Call::Put("ws-1".into(), "a".into())]);
    assert_eq!(
        outcome.snapshot().unwrap().status_code(),
        Some(StatusCode::Updating)
    );
}

#[tokio::test]
async fn test_first_failed_read_keeps_desired_configuration() {
    let amp = Arc::new(ScriptedAmp::with_describe(Ok(DescribedDefinition {
        status: Some(DefinitionStatus::new(StatusCode::UpdateFailed).with_reason("bad receiver")),
        data: Some(b"a".to_vec()),
    })));
    let outcome = manager(&amp)
        .reconcile(&persisted("b", StatusCode::Updating))
        .await
        .unwrap();

    assert!(amp.mutating_calls().is_empty());
    let snapshot = outcome.snapshot().unwrap();
    assert_eq!(snapshot.configuration(), Some("b"));
    assert_eq!(snapshot.status_code(), Some(StatusCode::UpdateFailed));
    assert!(snapshot.condition_is_true(ConditionType::Synced));
    let terminal = snapshot.condition(ConditionType::Terminal).unwrap();
    assert!(terminal.status);
    assert_eq!(
        terminal.message.as_deref(),
        Some(
            "Alert Manager Definition is in 'UPDATE_FAILED' status because of a validating error: bad receiver"
        )
    );
}

#[tokio::test]
async fn test_missing_workspace_makes_no_call() {
    let amp = Arc::new(ScriptedAmp::holding(StatusCode::Active, "a"));
    let result = manager(&amp)
        .reconcile(&Snapshot::desired(Some(String::new()), Some("a".into())))
        .await;

    assert_eq!(result, Err(ReconcileError::NotFound));
    assert!(amp.calls().is_empty());
}

#[tokio::test]
async fn test_validation_exception_marks_terminal() {
    let amp = Arc::new(
        ScriptedAmp::holding(StatusCode::Active, "a")
            .failing_put(RemoteError::service("ValidationException", "invalid route")),
    );
    let rm = manager(&amp);
    let wanted = persisted("b", StatusCode::Active);
    let err = rm.reconcile(&wanted).await.unwrap_err();

    assert!(rm.is_terminal(&err));
    let snapshot = update_conditions(&wanted, Some(&err), rm.terminal_policy()).unwrap();
    let terminal = snapshot.condition(ConditionType::Terminal).unwrap();
    assert!(terminal.status);
    assert_eq!(
        terminal.message.as_deref(),
        Some("ValidationException: invalid route")
    );
    assert!(snapshot.condition(ConditionType::Recoverable).is_none());

    // Same error again changes nothing
    assert_eq!(update_conditions(&snapshot, Some(&err), rm.terminal_policy()), None);
}

#[tokio::test]
async fn test_transport_error_is_recoverable() {
    let amp = Arc::new(ScriptedAmp::with_describe(Err(RemoteError::transport(
        "dispatch failure",
    ))));
    let rm = manager(&amp);
    let wanted = desired("a");
    let err = rm.reconcile(&wanted).await.unwrap_err();

    assert!(!rm.is_terminal(&err));
    let snapshot = rm.update_conditions(&wanted, Some(&err)).unwrap();
    let recoverable = snapshot.condition(ConditionType::Recoverable).unwrap();
    assert!(recoverable.status);
    assert_eq!(recoverable.message.as_deref(), Some("dispatch failure"));

    // A clean pass afterwards flips it back off
    let cleared = rm.update_conditions(&snapshot, None).unwrap();
    assert!(!cleared.condition_is_true(ConditionType::Recoverable));
}

#[tokio::test]
async fn test_delete_error_is_returned_verbatim() {
    let conflict = RemoteError::service("ConflictException", "definition is busy");
    let amp = Arc::new(
        ScriptedAmp::holding(StatusCode::Active, "a").failing_delete(conflict.clone()),
    );
    let rm = manager(&amp);
    let latest = rm.read_one(&desired("a")).await.unwrap();

    assert_eq!(rm.delete(&latest).await, Err(ReconcileError::Remote(conflict)));
    assert_eq!(amp.mutating_calls(), vec![Call::Delete("ws-1".into())]);
}

#[tokio::test]
async fn test_active_definition_failing_validation_is_frozen() {
    let amp = Arc::new(ScriptedAmp::holding(StatusCode::UpdateFailed, "a"));
    let outcome = manager(&amp)
        .reconcile(&persisted("b", StatusCode::Active))
        .await
        .unwrap();

    assert!(amp.mutating_calls().is_empty());
    let snapshot = outcome.snapshot().unwrap();
    assert_eq!(snapshot.configuration(), Some("b"));
    assert_eq!(snapshot.data(), b"b");
    assert!(snapshot.condition_is_true(ConditionType::Synced));
    let terminal = snapshot.condition(ConditionType::Terminal).unwrap();
    assert!(terminal.status);
    assert_eq!(
        terminal.message.as_deref(),
        Some("Alert Manager Definition is in 'UPDATE_FAILED' status because of a validating error")
    );
}

#[tokio::test]
async fn test_creation_failed_with_empty_backend_configuration() {
    // AMP reports no configuration for a definition that failed creation
    let amp = Arc::new(ScriptedAmp::holding(StatusCode::CreationFailed, ""));
    let rm = manager(&amp);

    let frozen = rm
        .reconcile(&persisted("a", StatusCode::Creating))
        .await
        .unwrap();
    assert!(amp.mutating_calls().is_empty());
    let snapshot = frozen.snapshot().unwrap();
    assert_eq!(snapshot.configuration(), Some("a"));
    assert_eq!(snapshot.status_code(), Some(StatusCode::CreationFailed));
    assert!(snapshot.condition_is_true(ConditionType::Terminal));

    let retried = rm
        .reconcile(&persisted("b", StatusCode::CreationFailed))
        .await
        .unwrap();
    assert_eq!(amp.mutating_calls(), vec![Call::Put("ws-1".into(), "b".into())]);
    assert_eq!(
        retried.snapshot().unwrap().status_code(),
        Some(StatusCode::Updating)
    );
}

#[tokio::test]
async fn test_edited_workspace_is_rejected_without_calls() {
    let amp = Arc::new(ScriptedAmp::missing());
    let rm = manager(&amp);
    let edited = Snapshot::desired(Some("ws-2".into()), Some("a".into()))
        .with_status(Some(StatusCode::Active), None)
        .with_bound_workspace(Some("ws-1".into()));

    let err = rm.reconcile(&edited).await.unwrap_err();
    assert_eq!(
        err,
        ReconcileError::Terminal("Immutable Spec fields have been modified: workspaceID".into())
    );
    assert!(rm.is_terminal(&err));
    assert!(amp.calls().is_empty());

    // Unchanged workspace still reconciles normally
    let bound = edited.with_workspace_id(Some("ws-1".into()));
    let outcome = rm.reconcile(&bound).await.unwrap();
    assert!(matches!(outcome, Outcome::Updated(_)));
    assert_eq!(
        amp.calls(),
        vec![
            Call::Describe("ws-1".into()),
            Call::Create("ws-1".into(), "a".into()),
        ]
    );
}
