use anyhow::{Context, Result};
use colored::*;
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;
use rustyline::{Editor, Helper};
use tracing::warn;

use crate::config::Config;
use crate::dialogue::Dialogue;
use crate::history::SessionHistory;

const SLASH_COMMANDS: &[&str] = &["/help", "/stats", "/history", "/exit"];

struct ShellHelper;

impl Helper for ShellHelper {}

impl Hinter for ShellHelper {
    type Hint = String;

    fn hint(&self, _line: &str, _pos: usize, _ctx: &rustyline::Context<'_>) -> Option<String> {
        None
    }
}

impl Highlighter for ShellHelper {}

impl Validator for ShellHelper {}

impl Completer for ShellHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &rustyline::Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        if !line.starts_with('/') {
            return Ok((pos, Vec::new()));
        }

        let word = &line[..pos];
        let matches = SLASH_COMMANDS
            .iter()
            .filter(|cmd| cmd.starts_with(word))
            .map(|cmd| Pair {
                display: cmd.to_string(),
                replacement: cmd.to_string(),
            })
            .collect();

        Ok((0, matches))
    }
}

pub struct ShellMode {
    config: Config,
    dialogue: Dialogue,
    history: SessionHistory,
    editor: Editor<ShellHelper, DefaultHistory>,
}

impl ShellMode {
    pub fn new(config: Config, dialogue: Dialogue, history: SessionHistory) -> Result<Self> {
        let mut editor = Editor::with_config(
            rustyline::Config::builder()
                .tab_stop(4)
                .build()
        )?;
        editor.set_helper(Some(ShellHelper));

        let history_file = config.shell_history_path();
        if history_file.exists() {
            if let Err(e) = editor.load_history(&history_file) {
                warn!("Could not load shell history: {}", e);
            }
        }

        Ok(ShellMode {
            config,
            dialogue,
            history,
            editor,
        })
    }

    pub fn run(&mut self) -> Result<()> {
        println!("{}", "🎓 Agente de Estudio".cyan().bold());
        println!("{}", "Escribe /help para ver los comandos, /exit para salir".dimmed());
        println!();

        for line in Dialogue::greeting() {
            agent_say(&line);
        }

        loop {
            match self.editor.readline("tú> ") {
                Ok(line) => {
                    let input = line.trim();
                    if input.is_empty() {
                        continue;
                    }

                    self.editor
                        .add_history_entry(input)
                        .context("Failed to add to history")?;

                    if input.starts_with('/') {
                        if !self.execute_slash_command(input) {
                            break;
                        }
                        continue;
                    }

                    if let Err(e) = self.handle_input(input) {
                        println!("{}: {}", "Error".red().bold(), e);
                    }
                }
                Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
                    break;
                }
                Err(err) => {
                    println!("{}: {}", "Input error".red().bold(), err);
                    break;
                }
            }
        }

        println!("{}", "¡Hasta pronto! 📚".cyan());
        self.save_history()
    }

    fn handle_input(&mut self, input: &str) -> Result<()> {
        let turn = self.dialogue.handle(input);

        for line in &turn.lines {
            agent_say(line);
        }

        if let Some(record) = turn.record {
            self.history
                .append(record)
                .context("Failed to save session history")?;
        }

        Ok(())
    }

    /// Returns false when the shell should exit.
    fn execute_slash_command(&mut self, command: &str) -> bool {
        match command {
            "/exit" | "/quit" => return false,
            "/help" => self.show_help(),
            "/stats" => print_stats(&self.history),
            "/history" => print_history(&self.history, 10),
            _ => {
                println!("{}: {}", "Comando desconocido".red().bold(), command);
                println!("Escribe {} para ver los comandos", "/help".green());
            }
        }
        true
    }

    fn show_help(&self) {
        println!("\n{}", "Comandos".cyan().bold());
        println!("  {} - Muestra esta ayuda", "/help".green());
        println!("  {} - Estadísticas de tus sesiones", "/stats".green());
        println!("  {} - Últimas sesiones registradas", "/history".green());
        println!("  {} - Salir (también Ctrl+C / Ctrl+D)", "/exit".green());
        println!();
        println!(
            "{}",
            format!("Sesiones guardadas en {}", self.history.path().display()).dimmed()
        );
        println!();
    }

    fn save_history(&mut self) -> Result<()> {
        let history_file = self.config.shell_history_path();
        self.editor
            .save_history(&history_file)
            .context("Failed to save shell history")?;
        Ok(())
    }
}

fn agent_say(line: &str) {
    println!("{} {}", "Agente 🤖:".green().bold(), line);
}

pub fn print_stats(history: &SessionHistory) {
    let Some(stats) = history.stats() else {
        println!("{}", "Todavía no hay sesiones registradas".yellow());
        return;
    };

    println!("{}", "📊 Estadísticas".cyan().bold());
    println!("Total de sesiones: {}", stats.total_sesiones);

    println!("\n{}", "Estados de ánimo:".yellow());
    for mood in crate::mood::MoodCategory::ALL {
        println!("  {} {:<10} {}", mood.emoji(), mood.label(), stats.mood_count(mood));
    }

    println!("\n{}", "Tiempos de estudio:".yellow());
    for time in crate::time::TimeCategory::ALL {
        println!("  {:<12} {}", time.label(), stats.time_count(time));
    }
}

pub fn print_history(history: &SessionHistory, limit: usize) {
    if history.is_empty() {
        println!("{}", "Todavía no hay sesiones registradas".yellow());
        return;
    }

    let records = history.records();
    let start = records.len().saturating_sub(limit);
    for record in &records[start..] {
        println!(
            "{} {} {} / {}",
            record.fecha.format("%Y-%m-%d %H:%M").to_string().dimmed(),
            record.estado_animo.emoji(),
            record.estado_animo.label().cyan(),
            record.tiempo.label().cyan()
        );
        for rec in &record.recomendaciones {
            println!("    - {}", rec);
        }
    }
}
