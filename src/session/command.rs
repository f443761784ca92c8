use super::error::SessionError;

/// One parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Blank line.
    Empty,
    /// `help` / `h`.
    Help,
    /// `list`.
    List,
    /// `show <id>`.
    Show(Option<String>),
    /// `add`.
    Add,
    /// `delete <id>`.
    Delete(Option<String>),
    /// `edit <id>`.
    Edit(Option<String>),
    /// `test <id>`.
    Test(Option<String>),
    /// `play` / `p`.
    Play,
    /// `credits`.
    Credits,
    /// `quit` / `q`.
    Quit,
}

impl Command {
    /// Splits `line` on whitespace; the first word picks the command, case-insensitively,
    /// and the second word, if any, is its argument.
    pub fn parse(line: &str) -> Result<Self, SessionError> {
        let mut words = line.split_whitespace();
        let Some(name) = words.next() else {
            return Ok(Self::Empty);
        };
        let arg = words.next().map(str::to_string);

        let cmd = match name.to_lowercase().as_str() {
            "h" | "help" => Self::Help,
            "list" => Self::List,
            "show" => Self::Show(arg),
            "add" => Self::Add,
            "delete" => Self::Delete(arg),
            "edit" => Self::Edit(arg),
            "test" => Self::Test(arg),
            "p" | "play" => Self::Play,
            "credits" => Self::Credits,
            "q" | "quit" => Self::Quit,
            _ => return Err(SessionError::UnknownCommand(name.to_string())),
        };
        Ok(cmd)
    }
}
