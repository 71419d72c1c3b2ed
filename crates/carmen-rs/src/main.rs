//! `carmen`: terminal entry point for the companion.

use anyhow::{Context, bail};
use carmen_rs_config::{ConfigStore, DataDirs, ModelConfig, ModelProvider};
use carmen_rs_core::{AppContext, ChatController, model_from_config};
use clap::{Parser, Subcommand};
use log::{LevelFilter, info};
use std::fs::{self, OpenOptions};
use std::path::PathBuf;

/// Command-line options for the companion.
#[derive(Debug, Parser)]
#[command(name = "carmen", version, about)]
struct Cli {
    /// Data directory (defaults to ~/.carmen)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
    /// Use canned offline replies instead of a model server
    #[arg(long, global = true)]
    mock: bool,
    /// Base URL of an OpenAI-compatible completions server
    #[arg(long, global = true, env = "CARMEN_MODEL_ENDPOINT")]
    endpoint: Option<String>,
    /// Model name sent with each request
    #[arg(long, global = true, env = "CARMEN_MODEL")]
    model: Option<String>,
    /// Keep quiet for this run
    #[arg(long, global = true)]
    no_speech: bool,
    #[command(subcommand)]
    command: Option<CliCommand>,
}

#[derive(Debug, Clone, Subcommand, PartialEq)]
enum CliCommand {
    /// Open the chat window (default)
    Tui,
    /// Send one message and print the reply
    Ask {
        /// Message to send
        #[arg(required = true, num_args = 1..)]
        message: Vec<String>,
    },
    /// Print relationship and memory stats
    Stats,
}

impl Cli {
    /// Model settings with command-line overrides applied.
    fn model_config(&self, stored: &ModelConfig) -> ModelConfig {
        let mut config = stored.clone();
        if let Some(endpoint) = &self.endpoint {
            config.endpoint.clone_from(endpoint);
            config.provider = ModelProvider::Http;
        }
        if let Some(model) = &self.model {
            config.model.clone_from(model);
            config.provider = ModelProvider::Http;
        }
        if self.mock {
            config.provider = ModelProvider::Mock;
        }
        config
    }
}

/// Entry point for the companion.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let dirs = match &cli.data_dir {
        Some(root) => DataDirs::new(root),
        None => DataDirs::user_default().context("cannot determine home directory")?,
    };
    let command = cli.command.clone().unwrap_or(CliCommand::Tui);
    init_logging(&dirs, &command)?;
    info!(
        "starting (root={}, command={:?}, mock={}, endpoint_set={}, no_speech={})",
        dirs.root().display(),
        command,
        cli.mock,
        cli.endpoint.is_some(),
        cli.no_speech
    );

    let context = build_context(&cli, dirs)?;
    match command {
        CliCommand::Tui => {
            let (controller, outcomes) = ChatController::new(context);
            carmen_rs_tui::run(controller, outcomes).await
        }
        CliCommand::Ask { message } => ask(context, &message.join(" ")).await,
        CliCommand::Stats => {
            print_stats(&context);
            Ok(())
        }
    }
}

/// Log to a file while the chat window owns the terminal, stderr otherwise.
fn init_logging(dirs: &DataDirs, command: &CliCommand) -> anyhow::Result<()> {
    let mut builder = env_logger::builder();
    builder.format_timestamp_millis();
    if *command == CliCommand::Tui {
        let path = dirs.log_file();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("failed to open log file {}", path.display()))?;
        builder
            .filter_level(LevelFilter::Info)
            .target(env_logger::Target::Pipe(Box::new(file)));
    }
    let _ = builder.parse_default_env().try_init();
    Ok(())
}

fn build_context(cli: &Cli, dirs: DataDirs) -> anyhow::Result<AppContext> {
    let config = ConfigStore::new(dirs.config_file()).load();
    let model = model_from_config(&cli.model_config(&config.model))
        .context("failed to build text model")?;
    let mut builder = AppContext::builder(dirs).config(config).model(model);
    if cli.no_speech {
        builder = builder.speech_enabled(false);
    }
    builder.build().context("failed to start companion")
}

async fn ask(context: AppContext, message: &str) -> anyhow::Result<()> {
    let (mut controller, mut outcomes) = ChatController::new(context);
    let submission = controller.submit(message);
    info!("message submitted (submission={:?})", submission);
    let replies = controller.wait_idle(&mut outcomes).await;
    if replies.is_empty() {
        // Commands answer with notices rather than replies.
        let Some(last) = controller.turns().last() else {
            bail!("no reply");
        };
        println!("{}", last.text);
    }
    for reply in replies {
        println!("{reply}");
    }
    controller.shutdown();
    controller.terminate();
    Ok(())
}

fn print_stats(context: &AppContext) {
    let stats = context.enhancer.stats();
    let memory = context.memory.memory();
    println!("{} {}", context.config.name, context.config.emoji);
    println!("Mood: {}", context.config.mood);
    println!("Intimacy: {:.2}", stats.metrics.intimacy_level);
    println!("Depth: {:.2}", stats.metrics.relationship_depth);
    println!("Feeling: {}", stats.emotional_state);
    println!("Interactions: {}", stats.total_interactions);
    println!("Sessions: {}", memory.sessions.len());
    println!("Logged turns: {}", context.conversation_log.len());
    if let Some(last_seen) = memory.preferences.get("last_seen").and_then(|v| v.as_str()) {
        println!("Last seen: {last_seen}");
    }
    let summary = context.memory.summary();
    println!("Topics tracked: {}", summary.important_topics_count);
    if !summary.most_frequent_topics.is_empty() {
        let topics: Vec<String> = summary
            .most_frequent_topics
            .iter()
            .map(|(topic, count)| format!("{topic} ({count})"))
            .collect();
        println!("Favorite topics: {}", topics.join(", "));
    }
    if !summary.recent_moods.is_empty() {
        println!("Recent moods: {}", summary.recent_moods.join(", "));
    }
    if !memory.recent.is_empty() {
        println!("Recent:");
        for utterance in &memory.recent {
            println!("  - {utterance}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Cli, CliCommand};
    use carmen_rs_config::{ModelConfig, ModelProvider};
    use clap::Parser;
    use pretty_assertions::assert_eq;

    #[test]
    fn default_command_is_tui() {
        let cli = Cli::try_parse_from(["carmen"]).expect("parse");
        assert_eq!(cli.command, None);
    }

    #[test]
    fn ask_joins_words() {
        let cli =
            Cli::try_parse_from(["carmen", "--mock", "ask", "hello", "there"]).expect("parse");
        assert!(cli.mock);
        assert_eq!(
            cli.command,
            Some(CliCommand::Ask {
                message: vec!["hello".to_string(), "there".to_string()]
            })
        );
        assert!(Cli::try_parse_from(["carmen", "ask"]).is_err());
    }

    #[test]
    fn endpoint_selects_http_unless_mocked() {
        let cli = Cli::try_parse_from(["carmen", "--endpoint", "http://localhost:4891", "stats"])
            .expect("parse");
        let config = cli.model_config(&ModelConfig::default());
        assert_eq!(config.provider, ModelProvider::Http);
        assert_eq!(config.endpoint, "http://localhost:4891");

        let cli = Cli::try_parse_from(["carmen", "--mock", "--model", "llama"]).expect("parse");
        let config = cli.model_config(&ModelConfig::default());
        assert_eq!(config.provider, ModelProvider::Mock);
        assert_eq!(config.model, "llama");
    }
}
