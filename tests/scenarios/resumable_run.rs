//! Test: Resumable Run - one step per invocation, failures keep the cursor

use crate::helpers::*;
use rdf_etl::core::{EtlError, PipelineDefinition, PipelineState, RunPhase};
use rdf_etl::execution::{InvocationOutcome, OrchestratorEvent};
use rdf_etl::persistence::StateStore;
use std::sync::Arc;
use uuid::Uuid;

fn three_steps() -> PipelineDefinition {
    PipelineDefinition::new("three", "Three steps", &["extract", "transform", "load"])
}

/// Each invocation runs exactly the step at the stored sequence
#[tokio::test]
async fn test_invocations_walk_the_pipeline() {
    let trackers = [
        ("extract", StepTracker::new()),
        ("transform", StepTracker::new()),
        ("load", StepTracker::new()),
    ];
    let harness = Harness::new(three_steps(), scripted_registry(&trackers));
    let run_id = Uuid::new_v4();

    let state = harness.orchestrator.start(run_id, "three").await.unwrap();
    assert_eq!(state, PipelineState::new("three", 0));

    let outcome = harness.orchestrator.invoke(run_id, None).await.unwrap();
    assert!(matches!(
        outcome,
        InvocationOutcome::StepCompleted { ref step_id, ref next_step }
            if step_id == "extract" && next_step == "transform"
    ));
    assert_eq!(harness.sequence(run_id).await, 1);
    assert_eq!(trackers[0].1.executions(), 1);
    assert_eq!(trackers[1].1.executions(), 0);

    harness.orchestrator.invoke(run_id, None).await.unwrap();
    let outcome = harness.orchestrator.invoke(run_id, None).await.unwrap();
    assert!(matches!(
        outcome,
        InvocationOutcome::PipelineCompleted { ref step_id } if step_id == "load"
    ));
    assert_eq!(harness.sequence(run_id).await, 3);

    for (_, tracker) in &trackers {
        assert_eq!(tracker.executions(), 1);
    }

    let data = harness.store.load_context(run_id).await.unwrap();
    assert_eq!(data.get_u64("executed_steps"), Some(3));

    let status = harness.orchestrator.status(run_id).await.unwrap();
    assert_eq!(status.phase, RunPhase::Completed);
    assert_eq!(status.total_steps, 3);
}

/// A completed run is not executed again
#[tokio::test]
async fn test_completed_run_is_noop() {
    let trackers = [
        ("extract", StepTracker::new()),
        ("transform", StepTracker::new()),
        ("load", StepTracker::new()),
    ];
    let harness = Harness::new(three_steps(), scripted_registry(&trackers));
    let run_id = Uuid::new_v4();
    harness.orchestrator.start(run_id, "three").await.unwrap();

    for _ in 0..3 {
        harness.orchestrator.invoke(run_id, None).await.unwrap();
    }
    let outcome = harness.orchestrator.invoke(run_id, None).await.unwrap();

    assert!(matches!(outcome, InvocationOutcome::AlreadyCompleted));
    assert_eq!(harness.sequence(run_id).await, 3);
    assert_eq!(trackers[2].1.executions(), 1);
}

/// A failing step leaves the sequence where it was; the retry advances once
#[tokio::test]
async fn test_failure_keeps_sequence_and_retry_resumes() {
    let trackers = [
        ("extract", StepTracker::new()),
        ("transform", StepTracker::failing(2)),
        ("load", StepTracker::new()),
    ];
    let harness = Harness::new(three_steps(), scripted_registry(&trackers));
    let run_id = Uuid::new_v4();
    harness.orchestrator.start(run_id, "three").await.unwrap();
    harness.orchestrator.invoke(run_id, None).await.unwrap();

    for attempt in 1..=2 {
        let err = harness.orchestrator.invoke(run_id, None).await.unwrap_err();
        match err {
            EtlError::StepExecution { step_id, source } => {
                assert_eq!(step_id, "transform");
                assert!(source.to_string().contains("could not reach the triple store"));
            }
            other => panic!("unexpected error {:?}", other),
        }
        assert_eq!(harness.sequence(run_id).await, 1, "attempt {}", attempt);
    }

    // Shared data of the failed attempts is discarded
    let data = harness.store.load_context(run_id).await.unwrap();
    assert_eq!(data.get_u64("executed_steps"), Some(1));

    let outcome = harness.orchestrator.invoke(run_id, None).await.unwrap();
    assert!(matches!(outcome, InvocationOutcome::StepCompleted { .. }));
    assert_eq!(harness.sequence(run_id).await, 2);
    assert_eq!(trackers[0].1.executions(), 1);
    assert_eq!(trackers[1].1.executions(), 3);
    assert_eq!(trackers[2].1.executions(), 0);

    let failures = harness
        .events()
        .into_iter()
        .filter(|event| matches!(event, OrchestratorEvent::StepFailed { .. }))
        .count();
    assert_eq!(failures, 2);
}

/// Invoking a run without state reports that nothing is active
#[tokio::test]
async fn test_invoke_without_run() {
    let trackers = [("extract", StepTracker::new())];
    let harness = Harness::new(
        PipelineDefinition::new("one", "One", &["extract"]),
        scripted_registry(&trackers),
    );
    let run_id = Uuid::new_v4();

    let err = harness.orchestrator.invoke(run_id, None).await.unwrap_err();
    assert!(matches!(err, EtlError::NoActiveStep { run_id: id } if id == run_id));
    assert!(harness.store.load(run_id).await.unwrap().is_none());
    assert_eq!(trackers[0].1.executions(), 0);
}

#[tokio::test]
async fn test_start_unknown_pipeline() {
    let trackers = [
        ("extract", StepTracker::new()),
        ("transform", StepTracker::new()),
        ("load", StepTracker::new()),
    ];
    let harness = Harness::new(three_steps(), scripted_registry(&trackers));
    let run_id = Uuid::new_v4();

    let err = harness.orchestrator.start(run_id, "norway").await.unwrap_err();
    assert!(matches!(err, EtlError::NotFound { kind: "pipeline", .. }));
    assert!(harness.store.load(run_id).await.unwrap().is_none());
}

/// A stored sequence beyond the definition is reported, not executed
#[tokio::test]
async fn test_sequence_past_definition() {
    let trackers = [("extract", StepTracker::new())];
    let harness = Harness::new(
        PipelineDefinition::new("one", "One", &["extract"]),
        scripted_registry(&trackers),
    );
    let run_id = Uuid::new_v4();
    harness
        .store
        .save(run_id, &PipelineState::new("one", 4))
        .await
        .unwrap();

    let err = harness.orchestrator.invoke(run_id, None).await.unwrap_err();
    assert!(matches!(err, EtlError::UnknownStep { sequence: 4, .. }));
    assert_eq!(harness.sequence(run_id).await, 4);
}

/// Starting again resets the run; abandoning forgets it
#[tokio::test]
async fn test_restart_and_abandon() {
    let trackers = [
        ("extract", StepTracker::new()),
        ("transform", StepTracker::new()),
        ("load", StepTracker::new()),
    ];
    let harness = Harness::new(three_steps(), scripted_registry(&trackers));
    let run_id = Uuid::new_v4();
    harness.orchestrator.start(run_id, "three").await.unwrap();
    harness.orchestrator.invoke(run_id, None).await.unwrap();

    harness.orchestrator.start(run_id, "three").await.unwrap();
    assert_eq!(harness.sequence(run_id).await, 0);
    assert!(harness.store.load_context(run_id).await.unwrap().is_empty());

    harness.orchestrator.abandon(run_id).await.unwrap();
    assert!(matches!(
        harness.orchestrator.status(run_id).await,
        Err(EtlError::NoActiveStep { .. })
    ));
    assert!(matches!(
        harness.orchestrator.abandon(run_id).await,
        Err(EtlError::NoActiveStep { .. })
    ));
}

/// A new orchestrator over the same database picks the run up where it stopped
#[tokio::test]
async fn test_resume_from_sqlite_after_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("runs.db");
    let run_id = Uuid::new_v4();
    let trackers = [
        ("extract", StepTracker::new()),
        ("transform", StepTracker::new()),
        ("load", StepTracker::new()),
    ];

    {
        let store = Arc::new(rdf_etl::persistence::SqliteStateStore::new(&path).await.unwrap());
        let harness = Harness::with_stores(
            three_steps(),
            scripted_registry(&trackers),
            store,
            Arc::new(MemoryTripleStore::new()),
        );
        harness.orchestrator.start(run_id, "three").await.unwrap();
        harness.orchestrator.invoke(run_id, None).await.unwrap();
    }

    let store = Arc::new(rdf_etl::persistence::SqliteStateStore::new(&path).await.unwrap());
    let harness = Harness::with_stores(
        three_steps(),
        scripted_registry(&trackers),
        store,
        Arc::new(MemoryTripleStore::new()),
    );

    let status = harness.orchestrator.status(run_id).await.unwrap();
    assert_eq!(
        status.phase,
        RunPhase::AwaitingStep {
            sequence: 1,
            step_id: "transform".to_string()
        }
    );

    harness.orchestrator.invoke(run_id, None).await.unwrap();
    assert_eq!(harness.sequence(run_id).await, 2);
    assert_eq!(trackers[0].1.executions(), 1);
    assert_eq!(trackers[1].1.executions(), 1);

    let data = harness.store.load_context(run_id).await.unwrap();
    assert_eq!(data.get_u64("executed_steps"), Some(2));
}

/// A failed progress write leaves both cursor and shared data as they were
#[tokio::test]
async fn test_storage_failure_after_step_keeps_run_unchanged() {
    let trackers = [("extract", StepTracker::new()), ("load", StepTracker::new())];
    let store = Arc::new(UnreliableStateStore::new());
    let harness = Harness::with_stores(
        PipelineDefinition::new("two", "Two steps", &["extract", "load"]),
        scripted_registry(&trackers),
        store.clone(),
        Arc::new(MemoryTripleStore::new()),
    );
    let run_id = Uuid::new_v4();
    harness.orchestrator.start(run_id, "two").await.unwrap();

    store.reject_progress(true);
    let err = harness.orchestrator.invoke(run_id, None).await.unwrap_err();
    assert!(matches!(err, EtlError::Storage(_)));
    assert_eq!(trackers[0].1.executions(), 1);
    assert_eq!(harness.sequence(run_id).await, 0);
    assert!(harness.store.load_context(run_id).await.unwrap().is_empty());

    store.reject_progress(false);
    let outcome = harness.orchestrator.invoke(run_id, None).await.unwrap();
    assert!(matches!(
        outcome,
        InvocationOutcome::StepCompleted { ref step_id, .. } if step_id == "extract"
    ));
    assert_eq!(harness.sequence(run_id).await, 1);
    let data = harness.store.load_context(run_id).await.unwrap();
    assert_eq!(data.get_u64("executed_steps"), Some(1));
}
