//! Markdown tidy-up pass run after typing pauses
//!
//! Normalizes spacing after block markers, collapses horizontal rules to
//! `---`, joins `[text] (url)` links and trims whitespace inside emphasis and
//! code spans. Fenced code blocks are left alone.

/// Format a whole document
pub fn format_markdown(text: &str) -> String {
    let mut in_fence = false;
    text.split('\n')
        .map(|line| {
            let trimmed = line.trim_start();
            if trimmed.starts_with("```") || trimmed.starts_with("~~~") {
                in_fence = !in_fence;
                return line.to_string();
            }
            if in_fence {
                line.to_string()
            } else {
                format_line(line)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn format_line(line: &str) -> String {
    if is_rule(line) {
        return "---".to_string();
    }
    match split_block_prefix(line) {
        Some((prefix, content)) => format!("{prefix}{}", format_inline(content)),
        None => format_inline(line),
    }
}

/// Three or more of `-`, `*`, `_` and nothing else
fn is_rule(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.len() >= 3 && trimmed.chars().all(|c| matches!(c, '-' | '*' | '_'))
}

/// Split off a heading, list or blockquote marker, normalized to a single
/// trailing space. Returns `None` for plain lines.
fn split_block_prefix(line: &str) -> Option<(String, &str)> {
    // Headings: no indent, up to six hashes, optional space
    let hashes = line.chars().take_while(|&c| c == '#').count();
    if (1..=6).contains(&hashes) {
        let content = line[hashes..].trim();
        if !content.is_empty() {
            return Some((format!("{} ", &line[..hashes]), content));
        }
        return None;
    }

    let indent_len = line.len() - line.trim_start().len();
    let (indent, rest) = line.split_at(indent_len);

    // Bullets need whitespace after the marker
    if let Some(after) = rest.strip_prefix(['-', '*', '+']) {
        if after.starts_with(char::is_whitespace) && !after.trim().is_empty() {
            return Some((format!("{indent}{} ", &rest[..1]), after.trim()));
        }
    }

    // Ordered items: digits, a dot, whitespace
    let digits = rest.chars().take_while(char::is_ascii_digit).count();
    if digits > 0 {
        if let Some(after) = rest[digits..].strip_prefix('.') {
            if after.starts_with(char::is_whitespace) && !after.trim().is_empty() {
                return Some((format!("{indent}{}. ", &rest[..digits]), after.trim()));
            }
        }
    }

    let quotes = rest.chars().take_while(|&c| c == '>').count();
    if quotes > 0 {
        let content = rest[quotes..].trim();
        if !content.is_empty() {
            return Some((format!("{indent}{} ", &rest[..quotes]), content));
        }
    }

    None
}

enum Segment<'a> {
    Text(&'a str),
    Code { fence: &'a str, inner: &'a str },
}

fn format_inline(content: &str) -> String {
    let mut out = String::with_capacity(content.len());
    for segment in split_code_spans(content) {
        match segment {
            Segment::Text(text) => {
                let text = tighten_links(text);
                let text = tighten_runs(&text, '*');
                out.push_str(&tighten_runs(&text, '_'));
            }
            Segment::Code { fence, inner } => {
                out.push_str(fence);
                if inner.trim().is_empty() {
                    out.push_str(inner);
                } else {
                    out.push_str(inner.trim());
                }
                out.push_str(fence);
            }
        }
    }
    out
}

/// Byte ranges of maximal runs of `marker` (an ASCII char)
fn marker_runs(s: &str, marker: char) -> Vec<(usize, usize)> {
    let mut runs = Vec::new();
    let mut start = None;
    for (idx, c) in s.char_indices() {
        match (c == marker, start) {
            (true, None) => start = Some(idx),
            (false, Some(st)) => {
                runs.push((st, idx));
                start = None;
            }
            _ => {}
        }
    }
    if let Some(st) = start {
        runs.push((st, s.len()));
    }
    runs
}

/// Separate code spans (backtick runs closed by a run of equal length)
fn split_code_spans(s: &str) -> Vec<Segment<'_>> {
    let runs = marker_runs(s, '`');
    let mut segments = Vec::new();
    let mut cursor = 0;
    let mut i = 0;

    while i < runs.len() {
        let (start, end) = runs[i];
        let len = end - start;
        let closing = runs[i + 1..]
            .iter()
            .position(|&(s2, e2)| e2 - s2 == len);

        match closing {
            Some(k) => {
                let (close_start, close_end) = runs[i + 1 + k];
                if start > cursor {
                    segments.push(Segment::Text(&s[cursor..start]));
                }
                segments.push(Segment::Code {
                    fence: &s[start..end],
                    inner: &s[end..close_start],
                });
                cursor = close_end;
                i += 2 + k;
            }
            None => i += 1,
        }
    }

    if cursor < s.len() {
        segments.push(Segment::Text(&s[cursor..]));
    }
    segments
}

/// Trim whitespace inside paired emphasis runs (`*x*`, `**x**`)
fn tighten_runs(s: &str, marker: char) -> String {
    let runs = marker_runs(s, marker);
    let mut out = String::with_capacity(s.len());
    let mut cursor = 0;
    let mut i = 0;

    while i + 1 < runs.len() {
        let (open_start, open_end) = runs[i];
        let (close_start, close_end) = runs[i + 1];
        let len = open_end - open_start;
        let inner = &s[open_end..close_start];

        if len <= 2 && close_end - close_start == len && !inner.trim().is_empty() {
            out.push_str(&s[cursor..open_end]);
            out.push_str(inner.trim());
            cursor = close_start;
            i += 2;
        } else {
            i += 1;
        }
    }

    out.push_str(&s[cursor..]);
    out
}

/// `[text] (url)` and `![alt] (src)` lose the gap between `]` and `(`
fn tighten_links(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut out = String::with_capacity(s.len());
    let mut open: Option<usize> = None;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        out.push(c);
        match c {
            '[' => open = Some(i),
            ']' => {
                if let Some(o) = open.take() {
                    let mut j = i + 1;
                    while j < chars.len() && chars[j].is_whitespace() {
                        j += 1;
                    }
                    let has_label = i > o + 1;
                    let has_gap = j > i + 1;
                    let has_target = j < chars.len()
                        && chars[j] == '('
                        && chars[j + 1..]
                            .iter()
                            .position(|&c| c == ')')
                            .is_some_and(|close| close > 0);
                    if has_label && has_gap && has_target {
                        i = j;
                        continue;
                    }
                }
            }
            _ => {}
        }
        i += 1;
    }
    out
}
