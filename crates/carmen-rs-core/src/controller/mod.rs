//! Chat controller: turns user input into model calls, shapes replies and
//! runs slash commands.
//!
//! Model calls run on spawned tasks. Their results come back as
//! [`TurnOutcome`] values on the channel returned by
//! [`ChatController::new`]; the owner drains it and hands each outcome to
//! [`ChatController::complete`]. Messages sent while a reply is pending are
//! queued and dispatched in order.

mod commands;
mod export;

pub use commands::{Command, HELP_LINES, parse_command, parse_phrase};
pub use export::{default_export_path, render_export, write_export};

use crate::context::AppContext;
use crate::model::{CancelToken, GenerationRequest, ModelError, generate_with_retry};
use crate::mood::{Mood, MoodInfo};
use crate::personality::analyze;
use crate::prompt::{build_prompt, welcome_message};
use carmen_rs_config::{CompanionConfig, Theme, clamp_temperature};
use carmen_rs_memory::{ChatTurn, ConversationEntry, SessionSummary, TurnRole};
use chrono::{DateTime, Local, Timelike, Utc};
use log::{debug, info, warn};
use std::collections::VecDeque;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::mpsc;

/// Reply used when the model fails.
pub const FALLBACK_REPLY: &str = "I'm having a technical moment... give me a second to recover!";
/// Last line of every session.
pub const FAREWELL: &str = "Before I go... remember, I'll still be here. Always.";
/// How long the farewell stays on screen before the window closes.
pub const SHUTDOWN_GRACE: Duration = Duration::from_millis(1500);
const DREAM_NOTICE: &str = "Entering dreamspace... reality becomes fluid... 🌙";
const OUTCOME_CHANNEL_CAPACITY: usize = 256;

/// Lifecycle of a chat session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    Idle,
    AwaitingResponse,
    Closing,
    Terminated,
}

/// Result of one background model call.
#[derive(Debug)]
pub struct TurnOutcome {
    pub ticket: u64,
    pub result: Result<String, ModelError>,
}

/// What a command changed, for the caller to react to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandEffect {
    None,
    Cleared,
    MoodChanged,
    ThemeChanged,
    Quit,
}

/// How a submission was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submission {
    /// Blank input, or the session is closing.
    Ignored,
    Command(CommandEffect),
    /// Sent to the model right away.
    Dispatched,
    /// Waiting behind a pending reply; the value is the queue length.
    Queued(usize),
}

#[derive(Debug)]
struct InFlight {
    ticket: u64,
    user_text: String,
}

pub struct ChatController {
    ctx: AppContext,
    state: ControllerState,
    queue: VecDeque<String>,
    in_flight: Option<InFlight>,
    next_ticket: u64,
    cancel: CancelToken,
    outcomes: mpsc::Sender<TurnOutcome>,
    session_inputs: Vec<String>,
    started_at: DateTime<Utc>,
}

impl ChatController {
    /// Create a controller and the receiver its model results arrive on.
    pub fn new(ctx: AppContext) -> (Self, mpsc::Receiver<TurnOutcome>) {
        let (outcomes, receiver) = mpsc::channel(OUTCOME_CHANNEL_CAPACITY);
        let controller = Self {
            ctx,
            state: ControllerState::Idle,
            queue: VecDeque::new(),
            in_flight: None,
            next_ticket: 1,
            cancel: CancelToken::new(),
            outcomes,
            session_inputs: Vec::new(),
            started_at: Utc::now(),
        };
        (controller, receiver)
    }

    pub fn context(&self) -> &AppContext {
        &self.ctx
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }

    pub fn turns(&self) -> &[ChatTurn] {
        self.ctx.memory.turns()
    }

    /// Messages waiting for the current reply, oldest first.
    pub fn pending(&self) -> impl Iterator<Item = &str> {
        self.queue.iter().map(String::as_str)
    }

    pub fn current_mood(&self) -> &'static MoodInfo {
        self.ctx.current_mood()
    }

    pub fn theme(&self) -> Theme {
        self.ctx.config.theme
    }

    /// Avatar clip and ambient loop for the current mood.
    pub fn mood_assets(&self) -> (Option<PathBuf>, Option<PathBuf>) {
        let mood = self.current_mood();
        (self.ctx.frames.avatar(mood), self.ctx.audio.ambient(mood))
    }

    /// Greet the user and return the greeting.
    pub fn start(&mut self) -> String {
        let hour = Local::now().hour();
        let welcome = welcome_message(hour, &self.ctx.memory.memory().recent);
        info!(
            "session started (name={}, mood={}, recent={})",
            self.ctx.config.name,
            self.ctx.config.mood,
            self.ctx.memory.memory().recent.len()
        );
        self.ctx
            .memory
            .record_turn(TurnRole::Assistant, welcome.clone());
        self.speak(&welcome, self.current_mood());
        welcome
    }

    /// Handle one line of user input.
    pub fn submit(&mut self, input: &str) -> Submission {
        if matches!(
            self.state,
            ControllerState::Closing | ControllerState::Terminated
        ) {
            return Submission::Ignored;
        }
        let text = input.trim();
        if text.is_empty() {
            return Submission::Ignored;
        }
        match parse_command(text) {
            Ok(Some(command)) => return Submission::Command(self.execute(command)),
            Ok(None) => {}
            Err(notice) => {
                self.notice(notice);
                return Submission::Command(CommandEffect::None);
            }
        }
        if let Some(command) = parse_phrase(text) {
            return Submission::Command(self.execute(command));
        }
        if self.state == ControllerState::AwaitingResponse {
            self.queue.push_back(text.to_string());
            debug!("message queued (pending={})", self.queue.len());
            return Submission::Queued(self.queue.len());
        }
        self.dispatch(text.to_string());
        Submission::Dispatched
    }

    fn dispatch(&mut self, text: String) {
        let request = GenerationRequest {
            prompt: build_prompt(
                &self.ctx.config.style,
                &self.ctx.config.mood,
                &self.ctx.config.name,
                &self.ctx.memory.memory().username,
                self.ctx.memory.turns(),
                &text,
            ),
            user_text: text.clone(),
            max_tokens: self.ctx.config.model.max_tokens,
            temperature: self.ctx.config.temperature,
        };
        self.ctx.memory.record_turn(TurnRole::User, text.clone());
        self.ctx.memory.append_recent(text.clone());
        self.session_inputs.push(text.clone());
        let analysis = analyze(&text);
        let topics: Vec<&str> = analysis
            .intimacy_indicators
            .iter()
            .chain(&analysis.relationship_cues)
            .copied()
            .collect();
        self.ctx
            .memory
            .record_conversation(&topics, &self.ctx.config.mood);

        let ticket = self.next_ticket;
        self.next_ticket += 1;
        self.in_flight = Some(InFlight {
            ticket,
            user_text: text,
        });
        self.state = ControllerState::AwaitingResponse;

        let model = self.ctx.model.clone();
        let cancel = self.cancel.clone();
        let outcomes = self.outcomes.clone();
        let max_retries = self.ctx.config.model.max_retries;
        debug!("turn dispatched (ticket={}, model={})", ticket, model.describe());
        tokio::spawn(async move {
            let result = generate_with_retry(model.as_ref(), &request, max_retries, &cancel).await;
            if outcomes.send(TurnOutcome { ticket, result }).await.is_err() {
                debug!("turn outcome dropped, controller gone (ticket={})", ticket);
            }
        });
    }

    /// Apply a finished model call and return the assistant reply.
    ///
    /// Outcomes for turns that are no longer pending, such as after
    /// shutdown, are ignored.
    pub fn complete(&mut self, outcome: TurnOutcome) -> Option<String> {
        if self.state != ControllerState::AwaitingResponse {
            debug!("stale turn outcome ignored (ticket={})", outcome.ticket);
            return None;
        }
        let in_flight = match self.in_flight.take() {
            Some(in_flight) if in_flight.ticket == outcome.ticket => in_flight,
            other => {
                self.in_flight = other;
                debug!("unexpected turn outcome ignored (ticket={})", outcome.ticket);
                return None;
            }
        };

        let mood = self.current_mood();
        let reply = match outcome.result {
            Ok(text) => {
                let analysis = analyze(&in_flight.user_text);
                let reply = self.ctx.enhancer.enhance(&text, &analysis, mood);
                let entry = ConversationEntry::new(
                    in_flight.user_text.as_str(),
                    reply.as_str(),
                    mood.name(),
                    self.ctx.model.describe(),
                );
                if let Err(err) = self.ctx.conversation_log.append(&entry) {
                    warn!(
                        "failed to append conversation log (path={}, error={})",
                        self.ctx.conversation_log.path().display(),
                        err
                    );
                }
                reply
            }
            Err(err) => {
                warn!(
                    "model call failed, using fallback (ticket={}, error={})",
                    outcome.ticket, err
                );
                FALLBACK_REPLY.to_string()
            }
        };
        self.ctx
            .memory
            .record_turn(TurnRole::Assistant, reply.clone());
        self.ctx.memory.save();
        self.speak(&reply, mood);

        self.state = ControllerState::Idle;
        if let Some(next) = self.queue.pop_front() {
            self.dispatch(next);
        }
        Some(reply)
    }

    /// Drain outcomes until no reply is pending, returning the replies.
    pub async fn wait_idle(&mut self, outcomes: &mut mpsc::Receiver<TurnOutcome>) -> Vec<String> {
        let mut replies = Vec::new();
        while self.state == ControllerState::AwaitingResponse {
            let Some(outcome) = outcomes.recv().await else {
                break;
            };
            if let Some(reply) = self.complete(outcome) {
                replies.push(reply);
            }
        }
        replies
    }

    /// Cancel pending work, persist the session and say goodbye.
    ///
    /// Returns the farewell, or `None` when already closing.
    pub fn shutdown(&mut self) -> Option<String> {
        if matches!(
            self.state,
            ControllerState::Closing | ControllerState::Terminated
        ) {
            return None;
        }
        self.cancel.cancel();
        self.in_flight = None;
        if !self.queue.is_empty() {
            debug!("dropping queued messages (pending={})", self.queue.len());
            self.queue.clear();
        }

        let now = Utc::now();
        if !self.session_inputs.is_empty() {
            self.ctx.memory.flush_recent(&self.session_inputs);
        }
        let user_turns = self
            .ctx
            .memory
            .turns()
            .iter()
            .filter(|turn| turn.role == TurnRole::User)
            .count();
        if user_turns > 0 {
            self.ctx.memory.record_session(SessionSummary {
                started_at: self.started_at,
                ended_at: now,
                user_turns,
                mood: self.ctx.config.mood.clone(),
            });
        }
        self.ctx
            .memory
            .set_preference("last_seen", serde_json::Value::String(now.to_rfc3339()));
        self.ctx.speech.stop();
        self.ctx
            .memory
            .record_turn(TurnRole::Assistant, FAREWELL.to_string());
        self.state = ControllerState::Closing;
        info!(
            "session closing (user_turns={}, mood={})",
            user_turns, self.ctx.config.mood
        );
        Some(FAREWELL.to_string())
    }

    /// Finish closing once the grace period is over.
    pub fn terminate(&mut self) {
        self.ctx.speech.stop();
        self.state = ControllerState::Terminated;
        debug!("session terminated");
    }

    fn speak(&self, text: &str, mood: &MoodInfo) {
        let rate = mood.speech_rate.unwrap_or(self.ctx.config.speech.rate);
        self.ctx.speech.play(text, &self.ctx.config.voice, rate);
    }

    fn notice(&mut self, text: impl Into<String>) {
        self.ctx.memory.record_turn(TurnRole::System, text);
    }

    fn execute(&mut self, command: Command) -> CommandEffect {
        debug!("command (command={:?})", command);
        match command {
            Command::Help => {
                let lines: Vec<String> = HELP_LINES
                    .iter()
                    .map(|(usage, about)| format!("{usage}  {about}"))
                    .collect();
                self.notice(format!("Commands:\n{}", lines.join("\n")));
                CommandEffect::None
            }
            Command::Clear => {
                self.ctx.memory.clear_turns();
                self.notice("Conversation cleared.");
                CommandEffect::Cleared
            }
            Command::Mood(None) => {
                let current = self.current_mood().name();
                let moods: Vec<String> = self
                    .ctx
                    .moods
                    .iter()
                    .map(|info| {
                        let marker = if info.name() == current { " (current)" } else { "" };
                        format!("{} {}{}", info.emoji, info.name(), marker)
                    })
                    .collect();
                self.notice(format!("Moods: {}", moods.join(", ")));
                CommandEffect::None
            }
            Command::Mood(Some(name)) => match self.ctx.moods.get(&name) {
                Ok(info) => {
                    self.set_mood(info);
                    self.notice(format!("My essence shifts to {}... {}", info.name(), info.emoji));
                    CommandEffect::MoodChanged
                }
                Err(err) => {
                    self.notice(err.to_string());
                    CommandEffect::None
                }
            },
            Command::Dream => {
                self.set_mood(Mood::Dreamlike.info());
                self.notice(DREAM_NOTICE);
                CommandEffect::MoodChanged
            }
            Command::Quit => {
                self.shutdown();
                CommandEffect::Quit
            }
            Command::Theme(name) => {
                let theme = match name {
                    None => self.ctx.config.theme.next(),
                    Some(name) => match Theme::parse(&name) {
                        Some(theme) => theme,
                        None => {
                            let names: Vec<&str> = Theme::ALL.iter().map(|theme| theme.as_str()).collect();
                            self.notice(format!(
                                "Unknown theme '{name}'. Available: {}",
                                names.join(", ")
                            ));
                            return CommandEffect::None;
                        }
                    },
                };
                self.ctx.config.theme = theme;
                self.ctx.save_config();
                self.notice(format!("Theme switched to {theme}."));
                CommandEffect::ThemeChanged
            }
            Command::Temperature(value) => {
                let temperature = clamp_temperature(value);
                self.ctx.config.temperature = temperature;
                self.ctx.save_config();
                self.notice(format!("Temperature set to {temperature}."));
                CommandEffect::None
            }
            Command::Style(style) => {
                self.ctx.config.style = style;
                self.ctx.save_config();
                self.notice("Persona updated.");
                CommandEffect::None
            }
            Command::Reset => {
                let defaults = CompanionConfig::default();
                self.ctx.config.style = defaults.style;
                self.ctx.config.temperature = defaults.temperature;
                self.ctx.save_config();
                info!("persona reset (temperature={})", self.ctx.config.temperature);
                self.notice(format!(
                    "Persona reset to default. Temperature {}.",
                    self.ctx.config.temperature
                ));
                CommandEffect::None
            }
            Command::Speech(enabled) => {
                self.ctx.speech.set_enabled(enabled);
                self.ctx.config.speech.enabled = enabled;
                self.ctx.save_config();
                self.notice(if enabled { "Speech on." } else { "Speech off." });
                CommandEffect::None
            }
            Command::Export(path) => {
                self.export(path);
                CommandEffect::None
            }
            Command::Summary => {
                let notice = self.summary();
                self.notice(notice);
                CommandEffect::None
            }
            Command::Stats => {
                let stats = self.ctx.enhancer.stats();
                self.notice(format!(
                    "Intimacy {:.2} | Depth {:.2} | Feeling {} | Interactions {}",
                    stats.metrics.intimacy_level,
                    stats.metrics.relationship_depth,
                    stats.emotional_state,
                    stats.total_interactions
                ));
                CommandEffect::None
            }
        }
    }

    fn set_mood(&mut self, info: &'static MoodInfo) {
        self.ctx.config.mood = info.name().to_string();
        self.ctx.save_config();
        self.ctx.memory.record_mood(info.name());
        info!("mood changed (mood={})", info.name());
    }

    fn export(&mut self, path: Option<PathBuf>) {
        let now = Local::now();
        let path = path.unwrap_or_else(|| default_export_path(&self.ctx.dirs.exports_dir(), now));
        let contents = render_export(
            &self.ctx.config.name,
            &self.ctx.memory.memory().username,
            &self.ctx.config.mood,
            self.ctx.memory.turns(),
            now,
        );
        match write_export(&path, &contents) {
            Ok(()) => {
                info!("conversation exported (path={})", path.display());
                self.notice(format!("Conversation exported to {}.", path.display()));
            }
            Err(err) => {
                warn!("export failed (path={}, error={})", path.display(), err);
                self.notice(format!("Export failed: {err}"));
            }
        }
    }

    fn summary(&self) -> String {
        let turns = self.ctx.memory.turns();
        let messages = turns
            .iter()
            .filter(|turn| turn.role != TurnRole::System)
            .count();
        let from_user = turns
            .iter()
            .filter(|turn| turn.role == TurnRole::User)
            .count();
        let minutes = (Utc::now() - self.started_at).num_minutes();
        let mood = self.current_mood();
        let mut summary = format!(
            "{messages} messages so far ({from_user} from you), {minutes} min together. Mood: {} {}. It's {}.",
            mood.name(),
            mood.emoji,
            Local::now().format("%H:%M")
        );
        let memory = self.ctx.memory.summary();
        if !memory.most_frequent_topics.is_empty() {
            let topics: Vec<String> = memory
                .most_frequent_topics
                .iter()
                .map(|(topic, count)| format!("{topic} ({count})"))
                .collect();
            summary.push_str(&format!("\nFavorite topics: {}", topics.join(", ")));
        }
        if !memory.recent_moods.is_empty() {
            summary.push_str(&format!("\nRecent moods: {}", memory.recent_moods.join(", ")));
        }
        summary
    }
}

impl std::fmt::Debug for ChatController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatController")
            .field("state", &self.state)
            .field("pending", &self.queue.len())
            .field("turns", &self.ctx.memory.turns().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::{ChatController, CommandEffect, ControllerState, Submission, TurnOutcome};
    use crate::context::AppContext;
    use crate::model::{MockModel, ModelError};
    use crate::speech::NoopSpeech;
    use carmen_rs_config::{CompanionConfig, DataDirs, Theme};
    use carmen_rs_memory::TurnRole;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;
    use tempfile::{TempDir, tempdir};

    fn controller() -> (TempDir, ChatController, tokio::sync::mpsc::Receiver<TurnOutcome>) {
        let temp = tempdir().expect("tempdir");
        let context = AppContext::builder(DataDirs::new(temp.path()))
            .config(CompanionConfig::default())
            .model(Arc::new(MockModel::new()))
            .speech_engine(Arc::new(NoopSpeech))
            .build()
            .expect("context");
        let (controller, outcomes) = ChatController::new(context);
        (temp, controller, outcomes)
    }

    #[tokio::test]
    async fn message_round_trip_returns_to_idle() {
        let (_temp, mut controller, mut outcomes) = controller();
        assert_eq!(controller.submit("hello"), Submission::Dispatched);
        assert_eq!(controller.state(), ControllerState::AwaitingResponse);
        let replies = controller.wait_idle(&mut outcomes).await;
        assert_eq!(
            replies,
            vec!["Hello! It's good to connect with you. I'm always here for you 💖"]
        );
        assert_eq!(controller.state(), ControllerState::Idle);
        let roles: Vec<TurnRole> = controller.turns().iter().map(|turn| turn.role).collect();
        assert_eq!(roles, vec![TurnRole::User, TurnRole::Assistant]);
        assert_eq!(controller.context().conversation_log.len(), 1);
    }

    #[tokio::test]
    async fn blank_input_is_ignored() {
        let (_temp, mut controller, _outcomes) = controller();
        assert_eq!(controller.submit("   "), Submission::Ignored);
        assert!(controller.turns().is_empty());
    }

    #[tokio::test]
    async fn stale_outcome_is_ignored() {
        let (_temp, mut controller, _outcomes) = controller();
        let outcome = TurnOutcome {
            ticket: 99,
            result: Err(ModelError::EmptyResponse),
        };
        assert_eq!(controller.complete(outcome), None);
        assert!(controller.turns().is_empty());
    }

    #[tokio::test]
    async fn theme_command_cycles_and_persists() {
        let (_temp, mut controller, _outcomes) = controller();
        assert_eq!(
            controller.submit("/theme"),
            Submission::Command(CommandEffect::ThemeChanged)
        );
        assert_eq!(controller.theme(), Theme::Light);
        assert_eq!(
            controller.submit("/theme blue"),
            Submission::Command(CommandEffect::ThemeChanged)
        );
        assert_eq!(controller.context().config_store.load().theme, Theme::Blue);
        assert_eq!(
            controller.submit("/theme neon"),
            Submission::Command(CommandEffect::None)
        );
        let last = controller.turns().last().expect("notice");
        assert_eq!(last.text, "Unknown theme 'neon'. Available: Dark, Light, Blue");
    }

    #[tokio::test]
    async fn temperature_is_clamped() {
        let (_temp, mut controller, _outcomes) = controller();
        controller.submit("/temp 5");
        assert_eq!(controller.context().config.temperature, 2.0);
        let last = controller.turns().last().expect("notice");
        assert_eq!(last.text, "Temperature set to 2.");
    }

    #[tokio::test]
    async fn phrases_and_dream_switch_mood() {
        let (_temp, mut controller, _outcomes) = controller();
        assert_eq!(
            controller.submit("enter dreamwalker"),
            Submission::Command(CommandEffect::MoodChanged)
        );
        assert_eq!(controller.current_mood().name(), "Dreamlike");
        assert_eq!(
            controller.turns().last().expect("notice").text,
            "Entering dreamspace... reality becomes fluid... 🌙"
        );
        assert_eq!(
            controller.submit("clear chat"),
            Submission::Command(CommandEffect::Cleared)
        );
        assert_eq!(controller.turns().len(), 1);
    }

    #[tokio::test]
    async fn closing_controller_ignores_input() {
        let (_temp, mut controller, _outcomes) = controller();
        assert_eq!(
            controller.submit("/quit"),
            Submission::Command(CommandEffect::Quit)
        );
        assert_eq!(controller.state(), ControllerState::Closing);
        assert_eq!(controller.submit("hello?"), Submission::Ignored);
        assert_eq!(controller.shutdown(), None);
        controller.terminate();
        assert_eq!(controller.state(), ControllerState::Terminated);
    }
}
