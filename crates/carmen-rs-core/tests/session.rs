use carmen_rs_core::{ControllerState, FAREWELL, ModelError, NoopSpeech, Submission};
use carmen_rs_memory::{MemoryRetentionPolicy, MemoryStore};
use carmen_rs_test_utils::{FixedModel, GatedModel, RecordingSpeech, TestContext};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::time::Duration;

#[tokio::test]
async fn shutdown_persists_session_and_says_goodbye() {
    let test = TestContext::new();
    let speech = RecordingSpeech::new();
    let (mut controller, mut outcomes) =
        test.controller(Arc::new(FixedModel::new("Sure.")), Arc::new(speech.clone()));
    for message in ["one", "two", "three", "four", "five", "six"] {
        controller.submit(message);
        controller.wait_idle(&mut outcomes).await;
    }

    assert_eq!(controller.shutdown(), Some(FAREWELL.to_string()));
    assert_eq!(controller.state(), ControllerState::Closing);
    assert_eq!(controller.turns().last().expect("farewell").text, FAREWELL);
    assert_eq!(speech.stops(), 6);

    let stored = MemoryStore::load(test.dirs().memory_file(), MemoryRetentionPolicy::default());
    assert_eq!(
        stored.memory().recent,
        vec!["two", "three", "four", "five", "six"]
    );
    assert_eq!(stored.memory().sessions.len(), 1);
    assert_eq!(stored.memory().sessions[0].user_turns, 6);
    assert_eq!(stored.memory().sessions[0].mood, "Supportive");
    assert!(stored.preference("last_seen").is_some());

    controller.terminate();
    assert_eq!(controller.state(), ControllerState::Terminated);
}

#[tokio::test]
async fn shutdown_cancels_pending_reply() {
    let test = TestContext::new();
    let model = GatedModel::new();
    let (mut controller, mut outcomes) =
        test.controller(Arc::new(model.clone()), Arc::new(NoopSpeech));
    assert_eq!(controller.submit("are you there?"), Submission::Dispatched);
    assert_eq!(controller.submit("hello?"), Submission::Queued(1));

    controller.shutdown();
    assert_eq!(controller.pending().count(), 0);

    let outcome = tokio::time::timeout(Duration::from_secs(5), outcomes.recv())
        .await
        .expect("outcome in time")
        .expect("outcome");
    assert!(matches!(outcome.result, Err(ModelError::Cancelled)));
    assert_eq!(controller.complete(outcome), None);
    assert_eq!(controller.turns().last().expect("farewell").text, FAREWELL);
    assert!(!model.started().contains(&"hello?".to_string()));
}

#[tokio::test]
async fn empty_session_records_no_summary() {
    let test = TestContext::new();
    let (mut controller, _outcomes) =
        test.controller(Arc::new(FixedModel::new("Sure.")), Arc::new(NoopSpeech));
    controller.start();
    controller.shutdown();
    let stored = MemoryStore::load(test.dirs().memory_file(), MemoryRetentionPolicy::default());
    assert!(stored.memory().sessions.is_empty());
    assert!(stored.memory().recent.is_empty());
}
