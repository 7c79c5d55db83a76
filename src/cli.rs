use std::path::PathBuf;
use std::sync::Arc;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;

use crate::config::Config;
use crate::dialogue::{Dialogue, DialogueSettings};
use crate::history::SessionHistory;
use crate::mood::{MoodCategory, MoodClassifier};
use crate::nlp::{LanguageAnalyzer, LexiconAnalyzer};
use crate::recommend::{time_specific, RecommendationSelector};
use crate::shell::{self, ShellMode};
use crate::time::{TimeCategory, TimeParser};

#[derive(Parser)]
#[command(name = "study-agent")]
#[command(about = "Conversational study agent: tell it how you feel and how much time you have")]
#[command(version)]
pub struct Args {
    /// Data directory (defaults to the user config dir)
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the interactive study session (default)
    Chat,
    /// Classify a mood description
    Mood {
        #[arg(required = true)]
        text: Vec<String>,
    },
    /// Parse an available-time expression
    Time {
        #[arg(required = true)]
        text: Vec<String>,
    },
    /// Show recommendations for a mood and time category
    Recommend {
        /// motivado | normal | cansado
        #[arg(long)]
        mood: String,
        /// poco | medio | mucho
        #[arg(long)]
        time: String,
    },
    /// Print a random study tip
    Tip,
    /// Show recent sessions
    History {
        #[arg(long, default_value = "10")]
        limit: usize,
    },
    /// Show session statistics
    Stats,
}

/// Everything a command needs, built once at startup.
pub struct Runtime {
    pub config: Config,
    pub analyzer: Arc<dyn LanguageAnalyzer>,
    pub history: SessionHistory,
}

impl Runtime {
    /// Config, then the analyzer, then the session history.
    pub fn bootstrap(data_dir: Option<PathBuf>) -> Result<Self> {
        let config = Config::new(data_dir)?;
        let analyzer = LexiconAnalyzer::load(config.lexicon_path().as_deref())?;
        let history = SessionHistory::open(config.history_path())
            .context("Failed to open session history")?;

        Ok(Runtime {
            config,
            analyzer: Arc::new(analyzer),
            history,
        })
    }

    fn classifier(&self) -> MoodClassifier {
        MoodClassifier::with_defaults(Arc::clone(&self.analyzer))
    }

    fn selector(&self) -> RecommendationSelector {
        RecommendationSelector::from_seed_option(self.config.tip_seed)
    }
}

pub fn run(args: Args) -> Result<()> {
    let runtime = Runtime::bootstrap(args.data_dir)?;

    match args.command.unwrap_or(Commands::Chat) {
        Commands::Chat => handle_chat(runtime),
        Commands::Mood { text } => handle_mood(&runtime, &text.join(" ")),
        Commands::Time { text } => handle_time(&text.join(" ")),
        Commands::Recommend { mood, time } => handle_recommend(&runtime, &mood, &time),
        Commands::Tip => handle_tip(&runtime),
        Commands::History { limit } => {
            shell::print_history(&runtime.history, limit);
            Ok(())
        }
        Commands::Stats => {
            shell::print_stats(&runtime.history);
            Ok(())
        }
    }
}

pub fn handle_chat(runtime: Runtime) -> Result<()> {
    let dialogue = Dialogue::new(
        runtime.classifier(),
        TimeParser::builtin()?,
        runtime.selector(),
        DialogueSettings::from(&runtime.config),
    );

    let mut shell = ShellMode::new(runtime.config, dialogue, runtime.history)?;
    shell.run()
}

pub fn handle_mood(runtime: &Runtime, text: &str) -> Result<()> {
    let Some(result) = runtime.classifier().classify(text) else {
        println!("{}", "No pude identificar un estado de ánimo".yellow());
        return Ok(());
    };

    println!(
        "{} {}",
        result.category.emoji(),
        result.category.label().cyan().bold()
    );
    println!("{} {}", "Descripción:".dimmed(), result.description);
    println!("{} {:.2}", "Confianza:".dimmed(), result.confidence);
    if result.intensity != 1.0 {
        println!(
            "{} x{:.1} ({:.2})",
            "Intensidad:".dimmed(),
            result.intensity,
            result.scaled_confidence()
        );
    }
    println!("{} {:+.2}", "Polaridad:".dimmed(), result.polarity);

    Ok(())
}

pub fn handle_time(text: &str) -> Result<()> {
    let parser = TimeParser::builtin()?;
    let Some(result) = parser.parse(text) else {
        println!("{}", "No pude identificar el tiempo disponible".yellow());
        return Ok(());
    };

    println!("{} ({} min)", result.category.label().cyan().bold(), result.minutes);
    println!("{} {}", "Descripción:".dimmed(), result.description);

    Ok(())
}

pub fn handle_recommend(runtime: &Runtime, mood: &str, time: &str) -> Result<()> {
    let mood: MoodCategory = mood.parse()?;
    let time: TimeCategory = time.parse()?;
    let selector = runtime.selector();

    println!(
        "{}",
        format!("🎯 {} {} / {}", mood.emoji(), mood.label(), time.label()).cyan().bold()
    );
    let advice = time_specific(time.default_minutes());
    for (i, rec) in selector.recommend(mood, time).iter().chain(advice.iter()).enumerate() {
        println!("   {}. {}", i + 1, rec);
    }

    Ok(())
}

pub fn handle_tip(runtime: &Runtime) -> Result<()> {
    let mut selector = runtime.selector();
    println!("{}", selector.random_tip());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_to_chat() {
        let args = Args::parse_from(["study-agent"]);
        assert!(args.command.is_none());
        assert!(args.data_dir.is_none());
    }

    #[test]
    fn test_parses_subcommands() {
        let args = Args::parse_from(["study-agent", "--data-dir", "/tmp/x", "time", "1:30"]);
        assert_eq!(args.data_dir, Some(PathBuf::from("/tmp/x")));
        assert!(matches!(args.command, Some(Commands::Time { text }) if text == vec!["1:30"]));

        let args = Args::parse_from(["study-agent", "recommend", "--mood", "cansado", "--time", "poco"]);
        assert!(matches!(args.command, Some(Commands::Recommend { .. })));
    }

    #[test]
    fn test_bootstrap_creates_data_dir() {
        let dir = TempDir::new().unwrap();
        let data_dir = dir.path().join("agent");

        let runtime = Runtime::bootstrap(Some(data_dir.clone())).unwrap();
        assert!(data_dir.join("config.json").exists());
        assert!(runtime.history.is_empty());
        assert_eq!(runtime.analyzer.name(), "es-compact");
    }

    #[test]
    fn test_recommend_rejects_unknown_category() {
        let dir = TempDir::new().unwrap();
        let runtime = Runtime::bootstrap(Some(dir.path().to_path_buf())).unwrap();
        assert!(handle_recommend(&runtime, "feliz", "poco").is_err());
        assert!(handle_recommend(&runtime, "motivado", "poco").is_ok());
    }
}
