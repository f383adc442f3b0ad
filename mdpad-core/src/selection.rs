//! Character-offset selection model

use anyhow::{Context, Result};
use std::fmt;
use std::str::FromStr;

/// A selection in the buffer, measured in chars.
///
/// `start == end` is a caret. Construction always normalizes so that
/// `start <= end`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Selection {
    start: usize,
    end: usize,
}

impl Selection {
    /// Create a selection from two offsets in either order
    pub fn new(a: usize, b: usize) -> Self {
        Self {
            start: a.min(b),
            end: a.max(b),
        }
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }

    /// Create a caret at the given offset
    pub fn caret(pos: usize) -> Self {
        Self::new(pos, pos)
    }

    /// Select the whole of `text`
    pub fn all(text: &str) -> Self {
        Self::new(0, text.chars().count())
    }

    pub fn is_caret(&self) -> bool {
        self.start == self.end
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.is_caret()
    }

    /// Clamp both ends to a buffer of `len_chars` characters
    pub fn clamp(&self, len_chars: usize) -> Self {
        Self::new(self.start.min(len_chars), self.end.min(len_chars))
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.start, self.end)
    }
}

/// Parses `START:END` or a bare caret offset `POS`
impl FromStr for Selection {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        match s.split_once(':') {
            Some((a, b)) => {
                let start = a
                    .trim()
                    .parse::<usize>()
                    .with_context(|| format!("Invalid selection start: {a:?}"))?;
                let end = b
                    .trim()
                    .parse::<usize>()
                    .with_context(|| format!("Invalid selection end: {b:?}"))?;
                Ok(Self::new(start, end))
            }
            None => {
                let pos = s
                    .parse::<usize>()
                    .with_context(|| format!("Invalid caret offset: {s:?}"))?;
                Ok(Self::caret(pos))
            }
        }
    }
}

/// Convert a char offset into a byte offset, clamping past-the-end offsets
pub(crate) fn byte_offset(text: &str, char_idx: usize) -> usize {
    text.char_indices()
        .nth(char_idx)
        .map(|(byte, _)| byte)
        .unwrap_or(text.len())
}

/// Split `text` into (before, selected, after) around a clamped selection
pub(crate) fn split_at_selection(text: &str, sel: Selection) -> (&str, &str, &str) {
    let sel = sel.clamp(text.chars().count());
    let start = byte_offset(text, sel.start);
    let end = byte_offset(text, sel.end);
    (&text[..start], &text[start..end], &text[end..])
}
