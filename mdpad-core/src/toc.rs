//! Table of Contents extraction from Markdown

use ropey::Rope;

/// A heading in the markdown document
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Heading {
    pub level: u8,
    pub text: String,
    /// Zero-based source line
    pub line: usize,
    pub anchor: String,
}

impl Heading {
    /// Nesting depth for display, level 1 is 0
    pub fn depth(&self) -> usize {
        self.level.saturating_sub(1) as usize
    }
}

/// Extract ATX and Setext headings, ignoring fenced code blocks
pub fn extract_headings(rope: &Rope) -> Vec<Heading> {
    let mut headings = Vec::new();
    let line_count = rope.len_lines();
    let mut in_fence = false;

    let mut line_idx = 0;
    while line_idx < line_count {
        let line_str: String = rope.line(line_idx).chunks().collect();
        let trimmed = line_str.trim_end();

        if is_fence(trimmed) {
            in_fence = !in_fence;
            line_idx += 1;
            continue;
        }
        if in_fence {
            line_idx += 1;
            continue;
        }

        if let Some((level, text)) = parse_atx_heading(trimmed) {
            headings.push(Heading {
                level,
                anchor: make_anchor(&text),
                text,
                line: line_idx,
            });
        }
        // Setext: look ahead to the underline
        else if line_idx + 1 < line_count && !trimmed.trim().is_empty() {
            let next_str: String = rope.line(line_idx + 1).chunks().collect();

            if let Some(level) = parse_setext_underline(next_str.trim()) {
                let text = trimmed.trim().to_string();
                headings.push(Heading {
                    level,
                    anchor: make_anchor(&text),
                    text,
                    line: line_idx,
                });

                // Skip the underline
                line_idx += 1;
            }
        }

        line_idx += 1;
    }

    headings
}

/// Render headings as a nested markdown list of anchor links
pub fn render_markdown(headings: &[Heading]) -> String {
    headings
        .iter()
        .map(|h| format!("{}- [{}](#{})", "  ".repeat(h.depth()), h.text, h.anchor))
        .collect::<Vec<_>>()
        .join("\n")
}

fn is_fence(line: &str) -> bool {
    let trimmed = line.trim_start();
    trimmed.starts_with("```") || trimmed.starts_with("~~~")
}

/// Parse an ATX heading into (level, text); the text must be non-empty
fn parse_atx_heading(line: &str) -> Option<(u8, String)> {
    if !line.starts_with('#') {
        return None;
    }

    let hash_count = line.chars().take_while(|&c| c == '#').count();
    if hash_count > 6 {
        return None;
    }

    let rest = &line[hash_count..];
    if !rest.starts_with(|c: char| c.is_whitespace()) {
        return None;
    }

    // Drop an optional closing sequence of hashes
    let mut text = rest.trim();
    let without_closing = text.trim_end_matches('#');
    if without_closing.ends_with(char::is_whitespace) {
        text = without_closing.trim_end();
    }

    if text.is_empty() {
        None
    } else {
        Some((hash_count as u8, text.to_string()))
    }
}

/// Parse Setext heading underline (returns level if valid)
fn parse_setext_underline(line: &str) -> Option<u8> {
    let first_char = line.chars().next()?;
    if first_char == '=' && line.chars().all(|c| c == '=') {
        Some(1)
    } else if first_char == '-' && line.chars().all(|c| c == '-') {
        Some(2)
    } else {
        None
    }
}

/// Anchor id: lowercase, punctuation dropped, whitespace runs become '-'
pub fn make_anchor(text: &str) -> String {
    let cleaned: String = text
        .to_lowercase()
        .chars()
        .filter(|&c| c.is_alphanumeric() || c == '_' || c == '-' || c.is_whitespace())
        .collect();
    cleaned.split_whitespace().collect::<Vec<_>>().join("-")
}
