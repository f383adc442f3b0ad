//! Markdown to HTML rendering and the preview cache

use anyhow::Result;
use lru::LruCache;
use pulldown_cmark::{html, CowStr, Event, Options, Parser, Tag, TagEnd};
use std::num::NonZeroUsize;
use std::sync::Arc;

use crate::config::{RenderConfig, ThemeVariant, ViewOptions};
use crate::toc::make_anchor;

const CACHE_SIZE: usize = 32;

/// Converts a markdown buffer to HTML
pub trait MarkdownRenderer {
    fn to_html(&self, markdown: &str) -> Result<String>;
}

/// pulldown-cmark backed renderer
#[derive(Debug, Clone)]
pub struct CmarkRenderer {
    options: Options,
    hard_breaks: bool,
}

impl CmarkRenderer {
    pub fn new(config: &RenderConfig) -> Self {
        let mut options = Options::empty();
        if config.tables {
            options.insert(Options::ENABLE_TABLES);
        }
        if config.strikethrough {
            options.insert(Options::ENABLE_STRIKETHROUGH);
        }
        if config.tasklists {
            options.insert(Options::ENABLE_TASKLISTS);
        }
        Self {
            options,
            hard_breaks: config.hard_breaks,
        }
    }
}

impl Default for CmarkRenderer {
    fn default() -> Self {
        Self::new(&RenderConfig::default())
    }
}

impl MarkdownRenderer for CmarkRenderer {
    fn to_html(&self, markdown: &str) -> Result<String> {
        let mut events: Vec<Event> = Parser::new_ext(markdown, self.options)
            .map(|event| match event {
                Event::SoftBreak if self.hard_breaks => Event::HardBreak,
                other => other,
            })
            .collect();
        assign_heading_ids(&mut events);

        let mut out = String::with_capacity(markdown.len() * 3 / 2);
        html::push_html(&mut out, events.into_iter());
        Ok(out)
    }
}

/// Give headings the same ids the table of contents links to
fn assign_heading_ids(events: &mut [Event<'_>]) {
    let mut i = 0;
    while i < events.len() {
        if matches!(&events[i], Event::Start(Tag::Heading { id: None, .. })) {
            let mut text = String::new();
            let mut j = i + 1;
            while j < events.len() {
                match &events[j] {
                    Event::End(TagEnd::Heading(_)) => break,
                    Event::Text(t) | Event::Code(t) => text.push_str(t),
                    _ => {}
                }
                j += 1;
            }
            if let Event::Start(Tag::Heading { id, .. }) = &mut events[i] {
                *id = Some(CowStr::from(make_anchor(&text)));
            }
            i = j;
        }
        i += 1;
    }
}

/// Preview pane state: caches HTML per buffer revision and keeps the last
/// good output when rendering fails
pub struct Preview {
    renderer: Box<dyn MarkdownRenderer>,
    cache: LruCache<u64, Arc<str>>,
    last_good: Option<Arc<str>>,
}

impl Preview {
    pub fn new(renderer: Box<dyn MarkdownRenderer>) -> Self {
        let size = NonZeroUsize::new(CACHE_SIZE).unwrap_or(NonZeroUsize::MIN);
        Self {
            renderer,
            cache: LruCache::new(size),
            last_good: None,
        }
    }

    /// HTML for revision `rev` of the buffer. On failure the previous HTML is
    /// returned (possibly stale) and the error is logged.
    pub fn render(&mut self, rev: u64, markdown: &str) -> Option<Arc<str>> {
        if let Some(html) = self.cache.get(&rev) {
            return Some(html.clone());
        }
        match self.renderer.to_html(markdown) {
            Ok(html) => {
                let html: Arc<str> = Arc::from(html);
                self.cache.put(rev, html.clone());
                self.last_good = Some(html.clone());
                Some(html)
            }
            Err(e) => {
                log::warn!("Render of revision {rev} failed, keeping stale preview: {e:#}");
                self.last_good.clone()
            }
        }
    }

    /// Most recent successful render
    pub fn last_html(&self) -> Option<Arc<str>> {
        self.last_good.clone()
    }
}

impl Default for Preview {
    fn default() -> Self {
        Self::new(Box::new(CmarkRenderer::default()))
    }
}

/// Wrap rendered HTML in a standalone document for export
pub fn standalone_html(title: &str, body: &str, theme: ThemeVariant, view: &ViewOptions) -> String {
    let mut classes = vec![format!("theme-{}", theme.as_str())];
    if view.focus_mode {
        classes.push("focus-mode".to_string());
    }
    if view.typewriter {
        classes.push("typewriter".to_string());
    }
    if view.fullscreen {
        classes.push("fullscreen".to_string());
    }

    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n</head>\n<body class=\"{}\">\n{}</body>\n</html>\n",
        escape_html(title),
        classes.join(" "),
        body
    )
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_renders_basic_markdown() -> Result<()> {
        let html = CmarkRenderer::default().to_html("# Hello World\n\n**bold** and *it*\n")?;
        assert!(html.contains("<h1 id=\"hello-world\">Hello World</h1>"));
        assert!(html.contains("<strong>bold</strong>"));
        assert!(html.contains("<em>it</em>"));
        Ok(())
    }

    #[test]
    fn test_gfm_extensions() -> Result<()> {
        let md = "| A | B |\n|---|---|\n| 1 | 2 |\n\n~~gone~~\n\n- [x] done\n";
        let html = CmarkRenderer::default().to_html(md)?;
        assert!(html.contains("<table>"));
        assert!(html.contains("<del>gone</del>"));
        assert!(html.contains("checkbox"));
        Ok(())
    }

    #[test]
    fn test_hard_breaks_toggle() -> Result<()> {
        let md = "line one\nline two\n";
        let with = CmarkRenderer::default().to_html(md)?;
        assert!(with.contains("<br />"));

        let config = RenderConfig {
            hard_breaks: false,
            ..Default::default()
        };
        let without = CmarkRenderer::new(&config).to_html(md)?;
        assert!(!without.contains("<br />"));
        Ok(())
    }

    #[test]
    fn test_code_block_language_class() -> Result<()> {
        let html = CmarkRenderer::default().to_html("```rust\nfn main() {}\n```\n")?;
        assert!(html.contains("class=\"language-rust\""));
        Ok(())
    }

    struct Flaky {
        calls: Cell<u32>,
    }

    impl MarkdownRenderer for Flaky {
        fn to_html(&self, markdown: &str) -> Result<String> {
            let n = self.calls.get();
            self.calls.set(n + 1);
            if n == 0 {
                Ok(format!("<p>{markdown}</p>"))
            } else {
                anyhow::bail!("parser exploded")
            }
        }
    }

    #[test]
    fn test_preview_keeps_last_good_on_failure() {
        let mut preview = Preview::new(Box::new(Flaky { calls: Cell::new(0) }));
        let first = preview.render(1, "one");
        assert_eq!(first.as_deref(), Some("<p>one</p>"));

        let second = preview.render(2, "two");
        assert_eq!(second.as_deref(), Some("<p>one</p>"));
        assert_eq!(preview.last_html().as_deref(), Some("<p>one</p>"));
    }

    #[test]
    fn test_preview_caches_by_revision() {
        let mut preview = Preview::new(Box::new(Flaky { calls: Cell::new(0) }));
        preview.render(1, "one");
        // Cached: the flaky renderer is not called again
        assert_eq!(preview.render(1, "one").as_deref(), Some("<p>one</p>"));
    }

    #[test]
    fn test_standalone_document() {
        let view = ViewOptions {
            focus_mode: true,
            ..Default::default()
        };
        let doc = standalone_html("A <b> title", "<p>x</p>\n", ThemeVariant::Dark, &view);
        assert!(doc.starts_with("<!DOCTYPE html>"));
        assert!(doc.contains("<title>A &lt;b&gt; title</title>"));
        assert!(doc.contains("class=\"theme-dark focus-mode\""));
        assert!(doc.contains("<p>x</p>"));
    }
}
