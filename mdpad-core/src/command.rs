//! Named editor commands

use crate::format::Format;

/// Everything the session can be asked to do
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Command {
    Format(Format),
    /// Replace the selection with text (pasted or dropped content)
    Insert(String),
    /// Replace the whole buffer
    Import(String),
    Clear,
    Copy,
    TogglePreview,
    Undo,
    Redo,
}

impl Command {
    /// Resolve a command name and optional payload.
    ///
    /// Returns `None` for unknown names and for payloads the command cannot
    /// use; callers treat that as a no-op.
    pub fn parse(name: &str, payload: Option<&str>) -> Option<Self> {
        let command = match name {
            "heading" => match payload {
                None => Command::Format(Format::Heading(1)),
                Some(level) => Command::Format(Format::heading(level.trim().parse().ok()?)?),
            },
            "insert" => Command::Insert(payload?.to_string()),
            "import" | "importFile" => Command::Import(payload?.to_string()),
            "clear" => Command::Clear,
            "copy" => Command::Copy,
            "togglePreview" => Command::TogglePreview,
            "undo" => Command::Undo,
            "redo" => Command::Redo,
            other => Command::Format(Format::from_name(other)?),
        };
        Some(command)
    }

    pub fn name(&self) -> String {
        match self {
            Command::Format(format) => format.name(),
            Command::Insert(_) => "insert".to_string(),
            Command::Import(_) => "import".to_string(),
            Command::Clear => "clear".to_string(),
            Command::Copy => "copy".to_string(),
            Command::TogglePreview => "togglePreview".to_string(),
            Command::Undo => "undo".to_string(),
            Command::Redo => "redo".to_string(),
        }
    }
}
