//! Literal search and replace over the buffer

/// A match, as a char range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchMatch {
    /// Start character position (inclusive)
    pub start: usize,
    /// End character position (exclusive)
    pub end: usize,
}

impl SearchMatch {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchOptions {
    pub case_sensitive: bool,
}

/// Outcome of a replace-all
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replaced {
    pub text: String,
    pub count: usize,
}

fn chars_eq(a: char, b: char, case_sensitive: bool) -> bool {
    if case_sensitive {
        a == b
    } else {
        a == b || a.to_lowercase().eq(b.to_lowercase())
    }
}

/// All non-overlapping matches of `query`, left to right.
/// The query is taken literally; an empty query matches nothing.
pub fn find_all(text: &str, query: &str, options: &SearchOptions) -> Vec<SearchMatch> {
    let needle: Vec<char> = query.chars().collect();
    if needle.is_empty() {
        return Vec::new();
    }
    let haystack: Vec<char> = text.chars().collect();

    let mut matches = Vec::new();
    let mut i = 0;
    while i + needle.len() <= haystack.len() {
        let hit = haystack[i..i + needle.len()]
            .iter()
            .zip(&needle)
            .all(|(&a, &b)| chars_eq(a, b, options.case_sensitive));
        if hit {
            matches.push(SearchMatch {
                start: i,
                end: i + needle.len(),
            });
            i += needle.len();
        } else {
            i += 1;
        }
    }
    matches
}

pub fn count(text: &str, query: &str, options: &SearchOptions) -> usize {
    find_all(text, query, options).len()
}

/// Replace every match of `query` with `replacement`
pub fn replace_all(
    text: &str,
    query: &str,
    replacement: &str,
    options: &SearchOptions,
) -> Replaced {
    let matches = find_all(text, query, options);
    if matches.is_empty() {
        return Replaced {
            text: text.to_string(),
            count: 0,
        };
    }

    let mut out = String::with_capacity(text.len());
    let mut next = matches.iter().peekable();
    let mut skip_until = 0;
    for (idx, c) in text.chars().enumerate() {
        if idx < skip_until {
            continue;
        }
        match next.peek() {
            Some(m) if m.start == idx => {
                out.push_str(replacement);
                skip_until = m.end;
                next.next();
            }
            _ => out.push(c),
        }
    }

    Replaced {
        text: out,
        count: matches.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn insensitive() -> SearchOptions {
        SearchOptions::default()
    }

    fn sensitive() -> SearchOptions {
        SearchOptions {
            case_sensitive: true,
        }
    }

    #[test]
    fn test_find_case_insensitive_by_default() {
        let text = "This is a test.\nAnother TEST line.";
        let matches = find_all(text, "test", &insensitive());
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0], SearchMatch { start: 10, end: 14 });
        assert_eq!(count(text, "test", &sensitive()), 1);
    }

    #[test]
    fn test_empty_query_matches_nothing() {
        assert!(find_all("abc", "", &insensitive()).is_empty());
        let replaced = replace_all("abc", "", "x", &insensitive());
        assert_eq!(replaced.text, "abc");
        assert_eq!(replaced.count, 0);
    }

    #[test]
    fn test_query_is_literal() {
        let text = "a.b a*b (x)";
        assert_eq!(count(text, "a.b", &insensitive()), 1);
        assert_eq!(count(text, "(x)", &insensitive()), 1);
        assert_eq!(count(text, ".", &insensitive()), 1);
    }

    #[test]
    fn test_matches_do_not_overlap() {
        assert_eq!(count("aaaa", "aa", &insensitive()), 2);
        assert_eq!(replace_all("aaa", "aa", "b", &insensitive()).text, "ba");
    }

    #[test]
    fn test_replace_all() {
        let replaced = replace_all("Cat cat CAT dog", "cat", "fox", &insensitive());
        assert_eq!(replaced.text, "fox fox fox dog");
        assert_eq!(replaced.count, 3);

        let replaced = replace_all("Cat cat CAT", "cat", "fox", &sensitive());
        assert_eq!(replaced.text, "Cat fox CAT");
        assert_eq!(replaced.count, 1);
    }

    #[test]
    fn test_replace_with_multibyte() {
        let replaced = replace_all("café CAFÉ", "café", "tea", &insensitive());
        assert_eq!(replaced.text, "tea tea");
        let replaced = replace_all("x→y", "→", " to ", &insensitive());
        assert_eq!(replaced.text, "x to y");
    }

    #[test]
    fn test_replacement_containing_query() {
        let replaced = replace_all("a a", "a", "aa", &insensitive());
        assert_eq!(replaced.text, "aa aa");
        assert_eq!(replaced.count, 2);
    }
}
