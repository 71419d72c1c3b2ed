use carmen_rs_config::{CompanionConfig, ConfigStore};
use carmen_rs_core::{CommandEffect, NoopSpeech, Submission};
use carmen_rs_memory::TurnRole;
use carmen_rs_test_utils::{FixedModel, TestContext};
use pretty_assertions::assert_eq;
use std::sync::Arc;

#[tokio::test]
async fn mood_switch_persists_and_unknown_mood_is_rejected() {
    let test = TestContext::new();
    let (mut controller, _outcomes) =
        test.controller(Arc::new(FixedModel::new("ok")), Arc::new(NoopSpeech));

    assert_eq!(
        controller.submit("/mood Flirty"),
        Submission::Command(CommandEffect::MoodChanged)
    );
    assert_eq!(controller.context().config.mood, "Flirty");
    assert_eq!(
        controller.turns().last().expect("notice").text,
        "My essence shifts to Flirty... 😘"
    );
    let store = ConfigStore::new(test.dirs().config_file());
    assert_eq!(store.load().mood, "Flirty");

    assert_eq!(
        controller.submit("/mood Unknown"),
        Submission::Command(CommandEffect::None)
    );
    assert_eq!(controller.context().config.mood, "Flirty");
    let notice = controller.turns().last().expect("notice");
    assert_eq!(notice.role, TurnRole::System);
    assert_eq!(
        notice.text,
        "Unknown mood 'Unknown'. Available: Supportive, Flirty, Intellectual, Chaotic, Dreamlike"
    );
    assert_eq!(store.load().mood, "Flirty");

    let history: Vec<String> = controller
        .context()
        .memory
        .memory()
        .mood_history
        .iter()
        .map(|change| change.mood.clone())
        .collect();
    assert_eq!(history, vec!["Flirty"]);
}

#[tokio::test]
async fn bare_mood_lists_moods() {
    let test = TestContext::new();
    let (mut controller, _outcomes) =
        test.controller(Arc::new(FixedModel::new("ok")), Arc::new(NoopSpeech));
    controller.submit("/MOOD");
    assert_eq!(
        controller.turns().last().expect("notice").text,
        "Moods: 💖 Supportive (current), 😘 Flirty, 🧠 Intellectual, 🌀 Chaotic, 🌙 Dreamlike"
    );
}

#[tokio::test]
async fn unknown_command_points_to_help() {
    let test = TestContext::new();
    let (mut controller, _outcomes) =
        test.controller(Arc::new(FixedModel::new("ok")), Arc::new(NoopSpeech));
    assert_eq!(
        controller.submit("/dance"),
        Submission::Command(CommandEffect::None)
    );
    assert_eq!(
        controller.turns().last().expect("notice").text,
        "Unknown command '/dance'. Type /help for the list."
    );
    controller.submit("/help");
    let help = &controller.turns().last().expect("help").text;
    assert!(help.starts_with("Commands:\n/help"));
    assert!(help.contains("/quit"));
}

#[tokio::test]
async fn settings_commands_update_config() {
    let test = TestContext::new();
    let (mut controller, _outcomes) =
        test.controller(Arc::new(FixedModel::new("ok")), Arc::new(NoopSpeech));
    controller.submit("/style You are a patient astronomer.");
    controller.submit("/temp 0.05");
    controller.submit("/tts off");

    let config = ConfigStore::new(test.dirs().config_file()).load();
    assert_eq!(config.style, "You are a patient astronomer.");
    assert_eq!(config.temperature, 0.1);
    assert!(!config.speech.enabled);
    assert!(!controller.context().speech.is_enabled());
}

#[tokio::test]
async fn export_writes_transcript() {
    let test = TestContext::new();
    let (mut controller, mut outcomes) =
        test.controller(Arc::new(FixedModel::new("Hello.")), Arc::new(NoopSpeech));
    controller.submit("hi");
    controller.wait_idle(&mut outcomes).await;

    let path = test.temp.path().join("out").join("chat.txt");
    controller.submit(&format!("/export {}", path.display()));
    let text = std::fs::read_to_string(&path).expect("export");
    assert!(text.starts_with("Carmen Chat Export\nDate: "));
    assert!(text.contains("Mood: Supportive\n"));
    assert!(text.contains("User: hi\nCarmen: Hello. I'm always here for you 💖\n"));
    assert_eq!(
        controller.turns().last().expect("notice").text,
        format!("Conversation exported to {}.", path.display())
    );

    controller.submit("/export");
    let exports: Vec<_> = std::fs::read_dir(test.dirs().exports_dir())
        .expect("exports dir")
        .collect();
    assert_eq!(exports.len(), 1);
}

#[tokio::test]
async fn summary_and_stats_report_session() {
    let test = TestContext::new();
    let (mut controller, mut outcomes) =
        test.controller(Arc::new(FixedModel::new("Always.")), Arc::new(NoopSpeech));
    controller.submit("I trust you");
    controller.wait_idle(&mut outcomes).await;

    controller.submit("/summary");
    let summary = controller.turns().last().expect("summary").text.clone();
    assert!(summary.starts_with("2 messages so far (1 from you), 0 min together. Mood: Supportive 💖."));
    assert!(summary.ends_with("\nFavorite topics: bonding (1), trust (1)"));

    controller.submit("/stats");
    assert_eq!(
        controller.turns().last().expect("stats").text,
        "Intimacy 0.10 | Depth 0.05 | Feeling neutral | Interactions 1"
    );
}

#[tokio::test]
async fn reset_restores_default_persona_and_temperature() {
    let test = TestContext::new();
    let (mut controller, _outcomes) =
        test.controller(Arc::new(FixedModel::new("ok")), Arc::new(NoopSpeech));
    controller.submit("/style You are a pirate.");
    controller.submit("/temp 1.5");
    assert_eq!(controller.context().config.style, "You are a pirate.");

    assert_eq!(
        controller.submit("/reset"),
        Submission::Command(CommandEffect::None)
    );
    let defaults = CompanionConfig::default();
    assert_eq!(controller.context().config.style, defaults.style);
    assert_eq!(controller.context().config.temperature, 0.9);
    assert_eq!(
        controller.turns().last().expect("notice").text,
        "Persona reset to default. Temperature 0.9."
    );
    let stored = ConfigStore::new(test.dirs().config_file()).load();
    assert_eq!(stored.style, defaults.style);
    assert_eq!(stored.temperature, 0.9);
}

#[tokio::test]
async fn summary_lists_topics_and_mood_history() {
    let test = TestContext::new();
    let (mut controller, mut outcomes) =
        test.controller(Arc::new(FixedModel::new("Mm.")), Arc::new(NoopSpeech));
    controller.submit("/mood Flirty");
    controller.submit("/dream");
    controller.submit("I feel closer to you");
    controller.wait_idle(&mut outcomes).await;

    let memory = controller.context().memory.summary();
    assert_eq!(memory.recent_moods, vec!["Flirty", "Dreamlike"]);
    assert_eq!(
        memory.most_frequent_topics,
        vec![("deepening".to_string(), 1), ("personal_sharing".to_string(), 1)]
    );
    assert_eq!(
        controller.context().memory.memory().patterns.typical_mood,
        "Dreamlike"
    );

    controller.submit("/summary");
    let summary = controller.turns().last().expect("summary").text.clone();
    assert!(summary.contains("\nFavorite topics: deepening (1), personal_sharing (1)"));
    assert!(summary.ends_with("\nRecent moods: Flirty, Dreamlike"));
}
