//! Command parser - splits prefixed text into a lookup key and arguments

/// A command line split into its parts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommand {
    /// First word after the prefix, lower-cased
    pub name: String,
    /// Remaining words, verbatim
    pub args: Vec<String>,
}

/// Parses text that starts with the command prefix
#[derive(Debug, Clone)]
pub struct CommandParser {
    command_prefix: String,
}

impl CommandParser {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            command_prefix: prefix.into(),
        }
    }

    pub fn is_command(&self, text: &str) -> bool {
        text.starts_with(&self.command_prefix)
    }

    /// Split `text` into a command. Returns `None` when the prefix is missing
    /// or nothing follows it.
    pub fn parse(&self, text: &str) -> Option<ParsedCommand> {
        let cmd_text = text.strip_prefix(&self.command_prefix)?;

        let mut parts = cmd_text.split_whitespace();
        let name = parts.next()?.to_lowercase();
        let args = parts.map(str::to_string).collect();

        Some(ParsedCommand { name, args })
    }
}
