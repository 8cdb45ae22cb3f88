use anyhow::Result;
use test_utils::workflow_inputs_fixture;

use super::WorkflowRun;
use super::WorkflowStatus;

fn run_with_status(status: WorkflowStatus) -> WorkflowRun {
    return WorkflowRun {
        id: "run-1".to_string(),
        provider: "fal-ai".to_string(),
        workflow_type: "image-generation".to_string(),
        inputs: workflow_inputs_fixture().to_string(),
        status,
        output_blob_id: None,
        duration_nanos: Some(1_500_000_000),
        created_at: 1_700_000_000_000_000_000,
    };
}

#[test]
fn it_allows_the_client_driven_transitions() {
    assert!(WorkflowStatus::Pending.can_transition_to(&WorkflowStatus::Running));
    assert!(WorkflowStatus::Running.can_transition_to(&WorkflowStatus::Success));
    assert!(WorkflowStatus::Running
        .can_transition_to(&WorkflowStatus::Failed("boom".to_string())));
    assert!(WorkflowStatus::Pending
        .can_transition_to(&WorkflowStatus::Failed("Cancelled by user".to_string())));
}

#[test]
fn it_rejects_skipping_running_or_leaving_terminal_states() {
    assert!(!WorkflowStatus::Pending.can_transition_to(&WorkflowStatus::Success));
    assert!(!WorkflowStatus::Success.can_transition_to(&WorkflowStatus::Running));
    assert!(!WorkflowStatus::Success
        .can_transition_to(&WorkflowStatus::Failed("late".to_string())));
    assert!(!WorkflowStatus::Failed("boom".to_string())
        .can_transition_to(&WorkflowStatus::Success));
}

#[test]
fn it_flags_active_statuses() {
    assert!(WorkflowStatus::Pending.is_active());
    assert!(WorkflowStatus::Running.is_active());
    assert!(WorkflowStatus::Success.is_terminal());
    assert!(WorkflowStatus::Failed("x".to_string()).is_terminal());
}

#[test]
fn it_serializes_statuses_with_a_kind_tag() -> Result<()> {
    let failed = serde_json::to_string(&WorkflowStatus::Failed("quota".to_string()))?;
    let running = serde_json::to_string(&WorkflowStatus::Running)?;

    insta::assert_snapshot!(failed, @r###"{"kind":"failed","message":"quota"}"###);
    insta::assert_snapshot!(running, @r###"{"kind":"running"}"###);

    let parsed: WorkflowStatus = serde_json::from_str(r#"{"kind":"success"}"#)?;
    assert_eq!(parsed, WorkflowStatus::Success);
    return Ok(());
}

#[test]
fn it_reads_the_prompt_from_inputs() {
    let run = run_with_status(WorkflowStatus::Pending);
    assert_eq!(run.prompt(), Some("a red fox".to_string()));
    assert_eq!(run.duration_secs(), Some(1.5));
}

#[test]
fn it_tolerates_malformed_inputs() {
    let mut run = run_with_status(WorkflowStatus::Pending);
    run.inputs = "not json".to_string();
    assert!(run.inputs_map().is_empty());
    assert_eq!(run.prompt(), None);
}

#[test]
fn it_formats_creation_time() {
    let run = run_with_status(WorkflowStatus::Pending);
    insta::assert_snapshot!(run.created_at_rfc3339(), @"2023-11-14T22:13:20Z");
}
