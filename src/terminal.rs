//! Line surface over the process's stdin and stdout.

use std::io::{self, IsTerminal, Write};

use async_trait::async_trait;
use colored::Colorize;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

use crate::session::{
    protocol::{LineSurface, Report, Verdict},
    repl::COMMAND_PROMPT,
};

const HELP: &[(&str, &str)] = &[
    ("h|help", "Show this help."),
    ("list", "List all quizzes."),
    ("show <id>", "Show the question and answer of a quiz."),
    ("add", "Add a new quiz interactively."),
    ("delete <id>", "Delete a quiz."),
    ("edit <id>", "Edit a quiz."),
    ("test <id>", "Answer one quiz."),
    ("p|play", "Answer every quiz in random order until the first miss."),
    ("credits", "Credits."),
    ("q|quit", "Leave the program."),
];

/// Reads lines from stdin and renders reports on stdout, errors on stderr.
pub struct TerminalSurface {
    lines: Lines<BufReader<Stdin>>,
    interactive: bool,
    hint: Option<String>,
}

impl TerminalSurface {
    /// Surface bound to this process's standard streams.
    pub fn new() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
            interactive: io::stdout().is_terminal(),
            hint: None,
        }
    }
}

impl Default for TerminalSurface {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LineSurface for TerminalSurface {
    async fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        {
            let mut out = io::stdout().lock();
            if let Some(hint) = self.hint.take() {
                writeln!(out, "{}", format!("  current: {hint}").dimmed())?;
            }
            let styled = if prompt == COMMAND_PROMPT {
                prompt.blue()
            } else {
                prompt.red()
            };
            write!(out, "{styled}")?;
            out.flush()?;
        }
        self.lines.next_line().await
    }

    // Stdin is line-buffered by the terminal, so the current text is shown as a hint
    // above the prompt instead of being typed into it.
    fn prefill(&mut self, text: &str) {
        if self.interactive {
            self.hint = Some(text.to_string());
        }
    }

    fn report(&mut self, report: Report) {
        if let Report::Error(line) = &report {
            eprintln!("{} {}", "Error:".red().bold(), line.red());
            return;
        }
        for line in render(&report) {
            println!("{line}");
        }
    }
}

/// Formats one report as display lines. Errors are rendered by the caller.
pub fn render(report: &Report) -> Vec<String> {
    let arrow = "=>".magenta();
    match report {
        Report::Help => std::iter::once("Commands:".to_string())
            .chain(HELP.iter().map(|(cmd, what)| format!("  {cmd} - {what}")))
            .collect(),
        Report::Credits => std::iter::once("Authors:".to_string())
            .chain(
                env!("CARGO_PKG_AUTHORS")
                    .split(':')
                    .filter(|a| !a.is_empty())
                    .map(|a| format!("  {a}")),
            )
            .chain(std::iter::once(format!(
                "{} {}",
                env!("CARGO_PKG_NAME"),
                env!("CARGO_PKG_VERSION")
            )))
            .collect(),
        Report::Listed(quiz) => vec![format!("  [{}]: {}", quiz.id.to_string().magenta(), quiz.question)],
        Report::Shown(quiz) => vec![format!(
            "  [{}]: {} {arrow} {}",
            quiz.id.to_string().magenta(),
            quiz.question,
            quiz.answer
        )],
        Report::Verdict(Verdict::Correct) => vec!["correct".green().bold().to_string()],
        Report::Verdict(Verdict::Incorrect) => vec!["incorrect".red().bold().to_string()],
        Report::Score(score) => vec![format!("Correct answers: {}", score.to_string().green())],
        Report::FinalScore(score) => vec![format!("Final score: {}", score.to_string().green().bold())],
        Report::Added(quiz) => vec![format!(
            "  {}: {} {arrow} {}",
            "Added".magenta(),
            quiz.question,
            quiz.answer
        )],
        Report::Edited(quiz) => vec![format!(
            "  Quiz {} changed to: {} {arrow} {}",
            quiz.id.to_string().magenta(),
            quiz.question,
            quiz.answer
        )],
        Report::Error(line) => vec![line.clone()],
    }
}
