//! Formatting engine
//!
//! Pure functions mapping `(buffer, selection, operation)` to a new buffer and
//! cursor. Nothing here touches history or the session; callers decide what to
//! do with the returned [`Edit`].
//!
//! Every operation places the cursor at the end of the text it inserted, with
//! the exception of horizontal rules, which leave the cursor just after the rule.

use crate::selection::{split_at_selection, Selection};

/// Literal inserted by [`Format::HorizontalRule`]
pub const HORIZONTAL_RULE: &str = "\n---\n";

/// Deepest heading level markdown supports
pub const MAX_HEADING_LEVEL: u8 = 6;

/// A formatting operation from the toolbar or a keyboard shortcut
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Format {
    Heading(u8),
    Bold,
    Italic,
    Blockquote,
    Link,
    Image,
    CodeBlock,
    InlineCode,
    UnorderedList,
    OrderedList,
    HorizontalRule,
}

/// Result of applying a formatting operation
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Edit {
    pub text: String,
    /// Caret position in chars, always within `0..=text.chars().count()`
    pub cursor: usize,
}

/// How an operation reshapes the selected text
enum Shape {
    /// Prefix and suffix around the selection or the placeholder
    Wrap {
        prefix: &'static str,
        suffix: &'static str,
        placeholder: &'static str,
    },
    /// Marker in front of every selected line
    Lines {
        marker: LineMarker,
        placeholder: String,
    },
    /// Fixed literal at the selection start
    Insert(&'static str),
}

enum LineMarker {
    Fixed(String),
    Numbered,
}

impl LineMarker {
    fn for_line(&self, index: usize) -> String {
        match self {
            LineMarker::Fixed(marker) => marker.clone(),
            LineMarker::Numbered => format!("{}. ", index + 1),
        }
    }
}

impl Format {
    /// Heading of the given level, `None` outside 1..=6
    pub fn heading(level: u8) -> Option<Self> {
        (1..=MAX_HEADING_LEVEL)
            .contains(&level)
            .then_some(Format::Heading(level))
    }

    /// Resolve a toolbar action name, including the short aliases
    pub fn from_name(name: &str) -> Option<Self> {
        let format = match name {
            "heading" => Format::Heading(1),
            "bold" => Format::Bold,
            "italic" => Format::Italic,
            "blockquote" => Format::Blockquote,
            "link" => Format::Link,
            "image" => Format::Image,
            "code" | "codeBlock" => Format::CodeBlock,
            "inlineCode" => Format::InlineCode,
            "ul" | "unorderedList" => Format::UnorderedList,
            "ol" | "orderedList" => Format::OrderedList,
            "hr" | "horizontalRule" => Format::HorizontalRule,
            other => {
                let level = other.strip_prefix("heading")?.parse::<u8>().ok()?;
                return Self::heading(level);
            }
        };
        Some(format)
    }

    /// Canonical action name
    pub fn name(&self) -> String {
        match self {
            Format::Heading(level) => format!("heading{level}"),
            Format::Bold => "bold".to_string(),
            Format::Italic => "italic".to_string(),
            Format::Blockquote => "blockquote".to_string(),
            Format::Link => "link".to_string(),
            Format::Image => "image".to_string(),
            Format::CodeBlock => "codeBlock".to_string(),
            Format::InlineCode => "inlineCode".to_string(),
            Format::UnorderedList => "unorderedList".to_string(),
            Format::OrderedList => "orderedList".to_string(),
            Format::HorizontalRule => "horizontalRule".to_string(),
        }
    }

    fn shape(&self) -> Shape {
        match *self {
            Format::Heading(level) => {
                let level = level.clamp(1, MAX_HEADING_LEVEL);
                Shape::Lines {
                    marker: LineMarker::Fixed(format!("{} ", "#".repeat(level as usize))),
                    placeholder: format!("Heading {level}"),
                }
            }
            Format::Bold => Shape::Wrap {
                prefix: "**",
                suffix: "**",
                placeholder: "bold text",
            },
            Format::Italic => Shape::Wrap {
                prefix: "*",
                suffix: "*",
                placeholder: "italic text",
            },
            Format::InlineCode => Shape::Wrap {
                prefix: "`",
                suffix: "`",
                placeholder: "inline code",
            },
            Format::Link => Shape::Wrap {
                prefix: "[",
                suffix: "](url)",
                placeholder: "link text",
            },
            Format::Image => Shape::Wrap {
                prefix: "![",
                suffix: "](image-url)",
                placeholder: "alt text",
            },
            Format::CodeBlock => Shape::Wrap {
                prefix: "```\n",
                suffix: "\n```",
                placeholder: "code block",
            },
            Format::Blockquote => Shape::Lines {
                marker: LineMarker::Fixed("> ".to_string()),
                placeholder: "Blockquote".to_string(),
            },
            Format::UnorderedList => Shape::Lines {
                marker: LineMarker::Fixed("- ".to_string()),
                placeholder: "List item".to_string(),
            },
            Format::OrderedList => Shape::Lines {
                marker: LineMarker::Numbered,
                placeholder: "List item".to_string(),
            },
            Format::HorizontalRule => Shape::Insert(HORIZONTAL_RULE),
        }
    }
}

/// Apply `format` to `text` at `selection`.
///
/// The selection is clamped to the buffer first, so any offsets are accepted.
pub fn apply(text: &str, selection: Selection, format: Format) -> Edit {
    let (before, selected, after) = split_at_selection(text, selection);

    let (inserted, kept) = match format.shape() {
        Shape::Wrap {
            prefix,
            suffix,
            placeholder,
        } => {
            let body = if selected.is_empty() { placeholder } else { selected };
            (format!("{prefix}{body}{suffix}"), "")
        }
        Shape::Lines {
            marker,
            placeholder,
        } => {
            let body = if selected.is_empty() {
                format!("{}{placeholder}", marker.for_line(0))
            } else {
                prefix_lines(selected, &marker)
            };
            (body, "")
        }
        // The selection stays in place after the inserted literal
        Shape::Insert(literal) => (literal.to_string(), selected),
    };

    let cursor = before.chars().count() + inserted.chars().count();
    let mut out = String::with_capacity(text.len() + inserted.len());
    out.push_str(before);
    out.push_str(&inserted);
    out.push_str(kept);
    out.push_str(after);

    let len = out.chars().count();
    Edit {
        text: out,
        cursor: cursor.min(len),
    }
}

/// Replace the selection with `insertion`, leaving the caret after it
pub fn replace_selection(text: &str, selection: Selection, insertion: &str) -> Edit {
    let (before, _, after) = split_at_selection(text, selection);
    let cursor = before.chars().count() + insertion.chars().count();
    Edit {
        text: format!("{before}{insertion}{after}"),
        cursor,
    }
}

/// Put the marker in front of each line. A trailing empty line (selection
/// ending in a newline) is left bare so the marker does not dangle.
fn prefix_lines(selected: &str, marker: &LineMarker) -> String {
    let lines: Vec<&str> = selected.split('\n').collect();
    let last = lines.len() - 1;
    lines
        .iter()
        .enumerate()
        .map(|(i, line)| {
            if i == last && i > 0 && line.is_empty() {
                String::new()
            } else {
                format!("{}{line}", marker.for_line(i))
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
