//! Test: Configuration Phase - configurable steps wait for a valid form

use crate::helpers::*;
use rdf_etl::core::{EtlError, FormSubmission, PipelineDefinition};
use rdf_etl::StepConfiguration;
use rdf_etl::execution::{InvocationOutcome, OrchestratorEvent};
use rdf_etl::persistence::StateStore;
use uuid::Uuid;

fn configured_pipeline() -> (Harness, StepTracker) {
    let tracker = StepTracker::new();
    let trackers = [("configure", tracker.clone()), ("load", StepTracker::new())];
    let harness = Harness::new(
        PipelineDefinition::new("configured", "Configured", &["configure", "load"]),
        scripted_registry(&trackers),
    );
    (harness, tracker)
}

/// Without a submission the form comes back and nothing runs
#[tokio::test]
async fn test_form_is_returned_without_submission() {
    let (harness, tracker) = configured_pipeline();
    let run_id = Uuid::new_v4();
    harness.orchestrator.start(run_id, "configured").await.unwrap();

    let outcome = harness.orchestrator.invoke(run_id, None).await.unwrap();
    match outcome {
        InvocationOutcome::AwaitingConfiguration { step_id, form } => {
            assert_eq!(step_id, "configure");
            let field = form.get("label").unwrap();
            assert!(field.required);
        }
        other => panic!("unexpected outcome {:?}", other),
    }

    assert_eq!(tracker.executions(), 0);
    assert_eq!(harness.sequence(run_id).await, 0);
    assert!(harness
        .events()
        .iter()
        .any(|event| matches!(event, OrchestratorEvent::ConfigurationRequested { .. })));
}

/// A rejected submission reports field errors and keeps the run on the step
#[tokio::test]
async fn test_invalid_submission_is_rejected() {
    let (harness, tracker) = configured_pipeline();
    let run_id = Uuid::new_v4();
    harness.orchestrator.start(run_id, "configured").await.unwrap();

    for submission in [
        FormSubmission::new().with("label", "   "),
        FormSubmission::new().with("label", "a label that is far too long"),
    ] {
        let err = harness
            .orchestrator
            .invoke(run_id, Some(&submission))
            .await
            .unwrap_err();
        match err {
            EtlError::ConfigurationValidation { step_id, errors } => {
                assert_eq!(step_id, "configure");
                assert_eq!(errors.len(), 1);
                assert_eq!(errors.for_field("label").len(), 1);
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    assert_eq!(tracker.executions(), 0);
    assert_eq!(harness.sequence(run_id).await, 0);
}

/// A valid submission is applied and the step executes in the same call
#[tokio::test]
async fn test_valid_submission_executes_step() {
    let (harness, tracker) = configured_pipeline();
    let run_id = Uuid::new_v4();
    harness.orchestrator.start(run_id, "configured").await.unwrap();

    let submission = FormSubmission::new().with("label", "Spain CTT");
    let outcome = harness
        .orchestrator
        .invoke(run_id, Some(&submission))
        .await
        .unwrap();

    assert!(matches!(
        outcome,
        InvocationOutcome::StepCompleted { ref next_step, .. } if next_step == "load"
    ));
    assert_eq!(tracker.executions(), 1);
    assert_eq!(harness.sequence(run_id).await, 1);

    let data = harness.store.load_context(run_id).await.unwrap();
    assert_eq!(data.get_str("label"), Some("Spain CTT"));
    assert_eq!(data.get_str("sink"), Some(SINK));
}

/// Steps without the capability ignore any submission
#[tokio::test]
async fn test_submission_ignored_by_plain_step() {
    let (harness, _) = configured_pipeline();
    let run_id = Uuid::new_v4();
    harness.orchestrator.start(run_id, "configured").await.unwrap();
    harness
        .orchestrator
        .invoke(run_id, Some(&FormSubmission::new().with("label", "ok")))
        .await
        .unwrap();

    let outcome = harness
        .orchestrator
        .invoke(run_id, Some(&FormSubmission::new().with("label", "")))
        .await
        .unwrap();
    assert!(matches!(outcome, InvocationOutcome::PipelineCompleted { .. }));
}

/// The form hooks see the options the step was configured with
#[tokio::test]
async fn test_form_hooks_receive_step_configuration() {
    let harness = Harness::with_configuration(
        PipelineDefinition::new("configured", "Configured", &["configure"]),
        scripted_registry(&[("configure", StepTracker::new())]),
        sink_configuration()
            .with("label", "Preset label")
            .with("max_label_len", 5),
    );
    let run_id = Uuid::new_v4();
    harness.orchestrator.start(run_id, "configured").await.unwrap();

    match harness.orchestrator.invoke(run_id, None).await.unwrap() {
        InvocationOutcome::AwaitingConfiguration { form, .. } => {
            let field = form.get("label").unwrap();
            assert_eq!(field.default.as_deref(), Some("Preset label"));
        }
        other => panic!("unexpected outcome {:?}", other),
    }

    let err = harness
        .orchestrator
        .invoke(run_id, Some(&FormSubmission::new().with("label", "Spain CTT")))
        .await
        .unwrap_err();
    assert!(matches!(err, EtlError::ConfigurationValidation { .. }));

    let outcome = harness
        .orchestrator
        .invoke(run_id, Some(&FormSubmission::new().with("label", "CTT")))
        .await
        .unwrap();
    assert!(matches!(outcome, InvocationOutcome::PipelineCompleted { .. }));
}
