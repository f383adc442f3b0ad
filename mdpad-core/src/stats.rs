//! Document statistics for the status bar

use ropey::Rope;

/// Average reading speed used for the estimate
pub const WORDS_PER_MINUTE: usize = 200;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DocStats {
    pub words: usize,
    /// Characters of the trimmed text
    pub characters: usize,
    pub lines: usize,
    /// Estimated minutes, never below 1
    pub reading_minutes: usize,
}

impl DocStats {
    pub fn compute(text: &str) -> Self {
        let trimmed = text.trim();
        let words = word_count(trimmed);
        Self {
            words,
            characters: trimmed.chars().count(),
            lines: Rope::from_str(text).len_lines(),
            reading_minutes: reading_minutes(words),
        }
    }
}

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

pub fn reading_minutes(words: usize) -> usize {
    words.div_ceil(WORDS_PER_MINUTE).max(1)
}

/// Zero-based (line, column) of a char offset, clamped to the buffer
pub fn caret_position(text: &str, cursor: usize) -> (usize, usize) {
    let rope = Rope::from_str(text);
    let cursor = cursor.min(rope.len_chars());
    let line = rope.char_to_line(cursor);
    (line, cursor - rope.line_to_char(line))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document() {
        let stats = DocStats::compute("   \n ");
        assert_eq!(stats.words, 0);
        assert_eq!(stats.characters, 0);
        assert_eq!(stats.reading_minutes, 1);
    }

    #[test]
    fn test_counts_trimmed_text() {
        let stats = DocStats::compute("  # Hello  World\n\nbody text  \n");
        assert_eq!(stats.words, 5);
        assert_eq!(stats.characters, "# Hello  World\n\nbody text".chars().count());
        assert_eq!(stats.lines, 4);
    }

    #[test]
    fn test_reading_time_rounds_up() {
        assert_eq!(reading_minutes(0), 1);
        assert_eq!(reading_minutes(200), 1);
        assert_eq!(reading_minutes(201), 2);
        assert_eq!(reading_minutes(1000), 5);
    }

    #[test]
    fn test_caret_position() {
        let text = "ab\ncdé\nf";
        assert_eq!(caret_position(text, 0), (0, 0));
        assert_eq!(caret_position(text, 4), (1, 1));
        assert_eq!(caret_position(text, 7), (2, 0));
        assert_eq!(caret_position(text, 99), (2, 1));
    }
}
