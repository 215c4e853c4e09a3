use anyhow::Result;
use console::style;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Chat,
    Image,
    Speech,
}

impl Mode {
    fn history_file(&self) -> &'static str {
        match self {
            Mode::Chat => "chat_history.txt",
            Mode::Image => "image_history.txt",
            Mode::Speech => "speech_history.txt",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    Empty,
    Quit,
    Help,
    Recent,
    Clear,
    Voices,
    Voice(String),
    Input(String),
}

impl ReplCommand {
    /// Classifies one line. Commands only exist in the modes that support
    /// them; anywhere else the same words are ordinary input.
    pub fn parse(line: &str, mode: Mode) -> Self {
        let line = line.trim();
        if line.is_empty() {
            return ReplCommand::Empty;
        }

        let lower = line.to_lowercase();
        let media = matches!(mode, Mode::Image | Mode::Speech);
        match lower.as_str() {
            "quit" | "exit" | "bye" => return ReplCommand::Quit,
            "q" if media => return ReplCommand::Quit,
            "help" => return ReplCommand::Help,
            "recent" if media => return ReplCommand::Recent,
            "clear" if media => return ReplCommand::Clear,
            "voices" if mode == Mode::Speech => return ReplCommand::Voices,
            _ => {}
        }

        if mode == Mode::Speech
            && let Some(name) = lower.strip_prefix("voice ")
        {
            return ReplCommand::Voice(name.trim().to_string());
        }

        ReplCommand::Input(line.to_string())
    }
}

/// Line editor with per-mode history under the parley directory.
pub struct LineReader {
    editor: DefaultEditor,
    history: Option<PathBuf>,
}

impl LineReader {
    pub fn new(mode: Mode) -> Result<Self> {
        let mut editor = DefaultEditor::new()?;
        let history = parley_core::config::get_parley_dir().join(mode.history_file());
        let history = match editor.load_history(&history) {
            Ok(()) => Some(history),
            Err(ReadlineError::Io(_)) if !history.exists() => Some(history),
            Err(e) => {
                tracing::warn!("History disabled: {}", e);
                None
            }
        };
        Ok(Self { editor, history })
    }

    /// Reads a line; `None` on Ctrl-C or Ctrl-D.
    pub fn read(&mut self, prompt: &str) -> Result<Option<String>> {
        match self.editor.readline(prompt) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    let _ = self.editor.add_history_entry(line.as_str());
                }
                Ok(Some(line))
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn save(&mut self) {
        let Some(path) = &self.history else {
            return;
        };
        if let Some(parent) = path.parent()
            && let Err(e) = std::fs::create_dir_all(parent)
        {
            tracing::warn!("Could not create {}: {}", parent.display(), e);
            return;
        }
        if let Err(e) = self.editor.save_history(path) {
            tracing::warn!("Could not save history: {}", e);
        }
    }
}

pub fn print_banner(title: &str, lines: &[&str]) {
    println!("{}", style(title).cyan().bold());
    for line in lines {
        println!("{}", line);
    }
    println!("{}", "-".repeat(60));
}

/// Shows at most three names, then a count of the rest.
pub fn print_recent_summary(label: &str, names: &[String]) {
    if names.is_empty() {
        return;
    }
    let shown = names.iter().take(3).cloned().collect::<Vec<_>>();
    println!("{} {}", label, shown.join(", "));
    if names.len() > 3 {
        println!("   ... and {} more", names.len() - 3);
    }
}

pub fn print_numbered(names: &[String]) {
    for (i, name) in names.iter().enumerate() {
        println!("   {}. {}", i + 1, name);
    }
}

pub fn goodbye() {
    println!("👋 Goodbye!");
}

pub fn print_error(context: &str, error: impl std::fmt::Display) {
    println!("{} {}: {}", style("❌").red(), context, error);
}
