//! Keyboard shortcuts

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::command::Command;

/// Default bindings, chord → command name
const DEFAULT_BINDINGS: &[(&str, &str)] = &[
    ("Ctrl+H", "heading"),
    ("Ctrl+B", "bold"),
    ("Ctrl+I", "italic"),
    ("Ctrl+Q", "blockquote"),
    ("Ctrl+K", "link"),
    ("Ctrl+Alt+I", "image"),
    ("Ctrl+Shift+C", "codeBlock"),
    ("Ctrl+E", "inlineCode"),
    ("Ctrl+U", "unorderedList"),
    ("Ctrl+O", "orderedList"),
    ("Ctrl+1", "heading1"),
    ("Ctrl+2", "heading2"),
    ("Ctrl+3", "heading3"),
    ("Ctrl+4", "heading4"),
    ("Ctrl+5", "heading5"),
    ("Ctrl+6", "heading6"),
    ("Ctrl+Z", "undo"),
    ("Ctrl+Y", "redo"),
    ("Ctrl+P", "togglePreview"),
];

/// A key plus modifiers, e.g. `Ctrl+Shift+C`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Chord {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    /// Lowercased key character
    pub key: char,
}

impl Chord {
    pub fn ctrl(key: char) -> Self {
        Self {
            ctrl: true,
            alt: false,
            shift: false,
            key: key.to_ascii_lowercase(),
        }
    }
}

impl FromStr for Chord {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut chord = Chord {
            ctrl: false,
            alt: false,
            shift: false,
            key: '\0',
        };
        let mut key = None;

        for part in s.split('+').map(str::trim) {
            match part.to_ascii_lowercase().as_str() {
                "ctrl" | "control" | "cmd" => chord.ctrl = true,
                "alt" | "option" => chord.alt = true,
                "shift" => chord.shift = true,
                other => {
                    let mut chars = other.chars();
                    match (chars.next(), chars.next(), key) {
                        (Some(c), None, None) => key = Some(c),
                        _ => anyhow::bail!("Invalid key {part:?} in chord {s:?}"),
                    }
                }
            }
        }

        chord.key = key.with_context(|| format!("Chord {s:?} has no key"))?;
        Ok(chord)
    }
}

impl fmt::Display for Chord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.ctrl {
            f.write_str("Ctrl+")?;
        }
        if self.alt {
            f.write_str("Alt+")?;
        }
        if self.shift {
            f.write_str("Shift+")?;
        }
        write!(f, "{}", self.key.to_ascii_uppercase())
    }
}

/// Chord to command-name table
#[derive(Debug, Clone)]
pub struct Keymap {
    bindings: HashMap<Chord, String>,
}

impl Default for Keymap {
    fn default() -> Self {
        let bindings = DEFAULT_BINDINGS
            .iter()
            .filter_map(|(chord, name)| Some((chord.parse().ok()?, name.to_string())))
            .collect();
        Self { bindings }
    }
}

impl Keymap {
    /// Bind `chord` (e.g. `"Ctrl+Alt+H"`) to a command name
    pub fn bind(&mut self, chord: &str, name: &str) -> Result<()> {
        if Command::parse(name, None).is_none() {
            anyhow::bail!("Unknown command {name:?}");
        }
        let chord: Chord = chord.parse()?;
        self.bindings.insert(chord, name.to_string());
        Ok(())
    }

    pub fn lookup(&self, chord: &Chord) -> Option<Command> {
        let name = self.bindings.get(chord)?;
        Command::parse(name, None)
    }

    /// Bindings sorted by chord label, for a shortcuts listing
    pub fn entries(&self) -> Vec<(String, &str)> {
        let mut entries: Vec<_> = self
            .bindings
            .iter()
            .map(|(chord, name)| (chord.to_string(), name.as_str()))
            .collect();
        entries.sort();
        entries
    }
}
