use carmen_rs_core::{
    ChatController, CommandEffect, ControllerState, FALLBACK_REPLY, NoopSpeech,
    RelationshipMetrics, Submission,
};
use carmen_rs_memory::TurnRole;
use carmen_rs_test_utils::{FailingModel, FixedModel, GatedModel, RecordingModel, RecordingSpeech, TestContext};
use pretty_assertions::assert_eq;
use std::sync::Arc;

#[tokio::test]
async fn model_failure_uses_fallback_and_keeps_metrics() {
    let test = TestContext::new();
    let (mut controller, mut outcomes) = test.controller(
        Arc::new(FailingModel::new("connection refused by upstream")),
        Arc::new(NoopSpeech),
    );
    assert_eq!(
        controller.submit("I trust you, thank you for always being here"),
        Submission::Dispatched
    );
    let replies = controller.wait_idle(&mut outcomes).await;
    assert_eq!(replies, vec![FALLBACK_REPLY.to_string()]);
    assert_eq!(controller.state(), ControllerState::Idle);

    let last = controller.turns().last().expect("assistant turn");
    assert_eq!(last.role, TurnRole::Assistant);
    assert_eq!(last.text, FALLBACK_REPLY);
    assert!(
        controller
            .turns()
            .iter()
            .all(|turn| !turn.text.contains("connection refused"))
    );
    assert_eq!(
        controller.context().enhancer.metrics(),
        RelationshipMetrics::default()
    );
    assert!(controller.context().conversation_log.is_empty());
}

#[tokio::test]
async fn successful_turn_is_shaped_logged_and_spoken() {
    let test = TestContext::new();
    let speech = RecordingSpeech::new();
    let (mut controller, mut outcomes) = test.controller(
        Arc::new(FixedModel::new("That sounds difficult.")),
        Arc::new(speech.clone()),
    );
    controller.submit("I'm really upset today");
    let replies = controller.wait_idle(&mut outcomes).await;
    assert_eq!(
        replies,
        vec!["I'm here for you, that sounds difficult. I'm always here for you 💖".to_string()]
    );

    let context = controller.context();
    assert_eq!(context.conversation_log.len(), 1);
    let entries = context.conversation_log.entries().expect("entries");
    assert_eq!(entries[0].user_message, "I'm really upset today");
    assert_eq!(entries[0].mood, "Supportive");
    assert_eq!(entries[0].model_info, "fixed");
    assert_eq!(context.memory.memory().recent, vec!["I'm really upset today"]);

    let spoken = speech.spoken();
    assert_eq!(spoken.len(), 1);
    assert_eq!(spoken[0].voice, "en+f3");
    assert_eq!(spoken[0].rate, 160);
}

#[tokio::test]
async fn messages_sent_while_waiting_are_queued_in_order() {
    let test = TestContext::new();
    let model = GatedModel::new();
    let (mut controller, mut outcomes) =
        test.controller(Arc::new(model.clone()), Arc::new(NoopSpeech));

    assert_eq!(controller.submit("one"), Submission::Dispatched);
    assert_eq!(controller.submit("two"), Submission::Queued(1));
    assert_eq!(controller.submit("three"), Submission::Queued(2));
    assert_eq!(controller.pending().collect::<Vec<_>>(), vec!["two", "three"]);

    // Commands run immediately even while a reply is pending.
    assert_eq!(
        controller.submit("/mood Chaotic"),
        Submission::Command(CommandEffect::MoodChanged)
    );
    assert_eq!(controller.state(), ControllerState::AwaitingResponse);

    model.release(3);
    let replies = controller.wait_idle(&mut outcomes).await;
    assert_eq!(
        replies,
        vec![
            "Reply to one 🌟✨".to_string(),
            "Reply to two 🌟✨".to_string(),
            "Reply to three 🌟✨".to_string(),
        ]
    );
    assert_eq!(model.started(), vec!["one", "two", "three"]);

    let conversation: Vec<(TurnRole, String)> = controller
        .turns()
        .iter()
        .filter(|turn| turn.role != TurnRole::System)
        .map(|turn| (turn.role, turn.text.clone()))
        .collect();
    assert_eq!(
        conversation,
        vec![
            (TurnRole::User, "one".to_string()),
            (TurnRole::Assistant, "Reply to one 🌟✨".to_string()),
            (TurnRole::User, "two".to_string()),
            (TurnRole::Assistant, "Reply to two 🌟✨".to_string()),
            (TurnRole::User, "three".to_string()),
            (TurnRole::Assistant, "Reply to three 🌟✨".to_string()),
        ]
    );
}

#[tokio::test]
async fn prompt_carries_persona_and_history() {
    let test = TestContext::new();
    let model = RecordingModel::new();
    let (mut controller, mut outcomes) =
        test.controller(Arc::new(model.clone()), Arc::new(NoopSpeech));
    controller.submit("first");
    controller.wait_idle(&mut outcomes).await;
    controller.submit("second");
    controller.wait_idle(&mut outcomes).await;

    let requests = model.requests();
    assert_eq!(requests.len(), 2);
    let prompt = &requests[1].prompt;
    assert!(prompt.contains("User: first\nCarmen: You said: first"));
    assert!(prompt.ends_with("User: second\nCarmen:"));
    assert_eq!(requests[1].user_text, "second");
    assert_eq!(requests[1].temperature, 0.9);
    assert_eq!(requests[1].max_tokens, 400);
}

#[tokio::test]
async fn welcome_mentions_last_session() {
    let test = TestContext::new();
    {
        let (mut controller, mut outcomes) =
            test.controller(Arc::new(FixedModel::new("Sure.")), Arc::new(NoopSpeech));
        controller.submit("tell me about the stars");
        controller.wait_idle(&mut outcomes).await;
        controller.shutdown();
    }
    let (mut controller, _outcomes): (ChatController, _) =
        test.controller(Arc::new(FixedModel::new("Sure.")), Arc::new(NoopSpeech));
    let welcome = controller.start();
    assert!(welcome.ends_with("(Last time, you mentioned: tell me about the stars)"));
    assert_eq!(controller.turns()[0].text, welcome);
}

#[tokio::test]
async fn welcome_is_spoken_in_current_mood_voice() {
    let test = TestContext::new();
    let speech = RecordingSpeech::new();
    let (mut controller, _outcomes) =
        test.controller(Arc::new(FixedModel::new("Sure.")), Arc::new(speech.clone()));
    controller.submit("/mood Flirty");
    let welcome = controller.start();

    let spoken = speech.spoken();
    assert_eq!(spoken.len(), 1);
    assert_eq!(spoken[0].text, welcome);
    assert_eq!(spoken[0].rate, 190);
}
