use async_trait::async_trait;
use migrant_engine::{
    Migration, MigrationEngine, MigrationError, MigrationRegistry, MigrationResult,
    MigrationRunResult, MigrationTool, RollbackResult, ToolSlot,
};
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Call {
    Migrate(Vec<String>),
    RollbackLast(Vec<String>),
    AppliedIds,
}

/// Records what the tool hands to the engine
#[derive(Default)]
struct RecordingEngine {
    label: String,
    calls: Mutex<Vec<Call>>,
    applied: HashSet<String>,
    fail_with: Option<fn() -> MigrationError>,
}

impl RecordingEngine {
    fn with_applied(ids: &[&str]) -> Self {
        Self {
            applied: ids.iter().map(|id| id.to_string()).collect(),
            ..Self::default()
        }
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }
}

fn ids(migrations: &[&Migration]) -> Vec<String> {
    migrations.iter().map(|m| m.id.clone()).collect()
}

#[async_trait]
impl MigrationEngine for RecordingEngine {
    async fn migrate(&self, migrations: &[&Migration]) -> MigrationResult<MigrationRunResult> {
        self.calls.lock().unwrap().push(Call::Migrate(ids(migrations)));
        if let Some(fail) = self.fail_with {
            return Err(fail());
        }
        let applied: Vec<String> = ids(migrations)
            .into_iter()
            .filter(|id| !self.applied.contains(id))
            .collect();
        Ok(MigrationRunResult {
            skipped: migrations.len() - applied.len(),
            applied,
        })
    }

    async fn rollback_last(&self, migrations: &[&Migration]) -> MigrationResult<RollbackResult> {
        self.calls.lock().unwrap().push(Call::RollbackLast(ids(migrations)));
        if let Some(fail) = self.fail_with {
            return Err(fail());
        }
        Ok(RollbackResult {
            rolled_back: migrations[0].id.clone(),
        })
    }

    async fn applied_ids(&self) -> MigrationResult<HashSet<String>> {
        self.calls.lock().unwrap().push(Call::AppliedIds);
        Ok(self.applied.clone())
    }
}

fn migration(id: &str) -> Migration {
    Migration::new(id, format!("migration {}", id), |_| Box::pin(async { Ok(()) }))
        .with_rollback(|_| Box::pin(async { Ok(()) }))
}

fn registry(ids: &[&str]) -> MigrationRegistry {
    let mut registry = MigrationRegistry::new();
    for id in ids {
        registry.register(migration(id));
    }
    registry
}

fn strings(ids: &[&str]) -> Vec<String> {
    ids.iter().map(|id| id.to_string()).collect()
}

#[tokio::test]
async fn apply_hands_migrations_to_engine_in_ascending_order() {
    let tool = MigrationTool::new(RecordingEngine::default(), registry(&["3", "1", "2"]));

    let result = tool.migrate_up().await.unwrap().unwrap();

    assert_eq!(tool.engine().calls(), vec![Call::Migrate(strings(&["1", "2", "3"]))]);
    assert_eq!(result.applied, strings(&["1", "2", "3"]));
}

#[tokio::test]
async fn rollback_hands_migrations_to_engine_in_descending_order() {
    let tool = MigrationTool::new(RecordingEngine::default(), registry(&["3", "1", "2"]));

    tool.migrate_down().await.unwrap();

    assert_eq!(
        tool.engine().calls(),
        vec![Call::RollbackLast(strings(&["3", "2", "1"]))]
    );
}

#[tokio::test]
async fn sorting_does_not_reorder_the_registry() {
    let tool = MigrationTool::new(RecordingEngine::default(), registry(&["3", "1", "2"]));

    tool.migrate_up().await.unwrap();
    tool.migrate_down().await.unwrap();

    let registered: Vec<&str> = tool.registry().iter().map(|m| m.id()).collect();
    assert_eq!(registered, vec!["3", "1", "2"]);
}

#[tokio::test]
async fn empty_registry_skips_engine_for_apply_and_rollback() {
    let tool = MigrationTool::new(RecordingEngine::default(), MigrationRegistry::new());

    assert!(tool.migrate_up().await.unwrap().is_none());
    assert!(tool.migrate_down().await.unwrap().is_none());

    assert!(tool.engine().calls().is_empty());
}

#[tokio::test]
async fn status_with_empty_registry_reports_applied_ids_as_unknown() {
    let tool = MigrationTool::new(
        RecordingEngine::with_applied(&["20240102000000", "20240101000000"]),
        MigrationRegistry::new(),
    );

    let status = tool.status().await.unwrap();

    assert!(status.migrations.is_empty());
    assert_eq!(
        status.unknown_applied,
        strings(&["20240101000000", "20240102000000"])
    );
    assert_eq!(status.pending_count(), 0);
    assert_eq!(tool.engine().calls(), vec![Call::AppliedIds]);
}

#[tokio::test]
async fn engine_errors_are_returned_unchanged() {
    let engine = RecordingEngine {
        fail_with: Some(|| MigrationError::DuplicateId("1".to_string())),
        ..RecordingEngine::default()
    };
    let tool = MigrationTool::new(engine, registry(&["1", "1"]));

    match tool.migrate_up().await {
        Err(MigrationError::DuplicateId(id)) => assert_eq!(id, "1"),
        other => panic!("unexpected result: {:?}", other),
    }
    assert!(matches!(
        tool.migrate_down().await,
        Err(MigrationError::DuplicateId(_))
    ));
}

#[tokio::test]
async fn status_reports_applied_pending_and_unknown() {
    let tool = MigrationTool::new(
        RecordingEngine::with_applied(&["1", "0"]),
        registry(&["2", "1"]),
    );

    let status = tool.status().await.unwrap();

    let summary: Vec<(&str, bool)> = status
        .migrations
        .iter()
        .map(|m| (m.id.as_str(), m.applied))
        .collect();
    assert_eq!(summary, vec![("1", true), ("2", false)]);
    assert_eq!(status.pending_count(), 1);
    assert_eq!(status.unknown_applied, strings(&["0"]));
    assert_eq!(tool.engine().calls(), vec![Call::AppliedIds]);
}

#[tokio::test]
async fn tool_slot_connects_once() {
    let slot: ToolSlot<RecordingEngine> = ToolSlot::new();
    let connects = AtomicUsize::new(0);

    let connect = |dsn: String| {
        connects.fetch_add(1, Ordering::SeqCst);
        async move {
            Ok::<_, MigrationError>(MigrationTool::new(
                RecordingEngine {
                    label: dsn,
                    ..RecordingEngine::default()
                },
                registry(&["1"]),
            ))
        }
    };

    let first = slot.get_or_connect("host=first", connect).await.unwrap();
    let second = slot.get_or_connect("host=second", connect).await.unwrap();

    assert!(std::ptr::eq(first, second));
    assert_eq!(connects.load(Ordering::SeqCst), 1);
    assert_eq!(second.engine().label, "host=first");
    assert!(slot.get().is_some());
}

#[tokio::test]
async fn tool_slot_stays_empty_after_failed_connect() {
    let slot: ToolSlot<RecordingEngine> = ToolSlot::new();

    let err = slot
        .get_or_connect("host=down", |_| async {
            Err::<MigrationTool<RecordingEngine>, _>(MigrationError::configuration(
                "database unreachable",
            ))
        })
        .await
        .err()
        .unwrap();

    assert!(matches!(err, MigrationError::Configuration { .. }));
    assert!(slot.get().is_none());
}
