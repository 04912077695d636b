//! REPL input parsing.

use std::path::PathBuf;

/// Slash commands offered by completion and hints.
pub const COMMANDS: [&str; 9] = [
    "/upload", "/chat", "/dash", "/code", "/suggest", "/reset", "/files", "/help", "/quit",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Upload(Vec<PathBuf>),
    Chat,
    Dashboard,
    /// `/code` alone arms error-code mode for the next input; `/code E102` sends right away.
    Code(Option<String>),
    /// `/suggest` lists the queries; `/suggest 2` sends the second one.
    Suggest(Option<usize>),
    Reset,
    Files,
    Help,
    Quit,
    Message(String),
    Unknown(String),
}

impl Command {
    /// Parses one input line. Blank lines yield `None`.
    pub fn parse(line: &str) -> Option<Self> {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return None;
        }
        if trimmed == "quit" || trimmed == "exit" {
            return Some(Command::Quit);
        }
        if !trimmed.starts_with('/') {
            return Some(Command::Message(trimmed.to_string()));
        }

        let (name, rest) = match trimmed.split_once(char::is_whitespace) {
            Some((name, rest)) => (name, rest.trim()),
            None => (trimmed, ""),
        };
        let argument = (!rest.is_empty()).then(|| rest.to_string());

        let command = match name {
            "/upload" => Command::Upload(rest.split_whitespace().map(PathBuf::from).collect()),
            "/chat" => Command::Chat,
            "/dash" | "/dashboard" => Command::Dashboard,
            "/code" => Command::Code(argument),
            "/suggest" => match argument {
                None => Command::Suggest(None),
                Some(n) => match n.parse::<usize>() {
                    Ok(index) => Command::Suggest(Some(index)),
                    Err(_) => Command::Unknown(trimmed.to_string()),
                },
            },
            "/reset" => Command::Reset,
            "/files" => Command::Files,
            "/help" => Command::Help,
            "/quit" | "/exit" => Command::Quit,
            _ => Command::Unknown(name.to_string()),
        };
        Some(command)
    }
}
