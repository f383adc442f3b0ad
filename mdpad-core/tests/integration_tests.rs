use anyhow::Result;
use mdpad_core::goal::{GoalStatus, WordGoal};
use mdpad_core::search::SearchOptions;
use mdpad_core::session::Confirm;
use mdpad_core::store::{FileStore, Store, CONTENT_KEY};
use mdpad_core::{Config, Outcome, Selection, Session, SessionEvent, ViewMode};
use std::io::Write;
use std::sync::Arc;
use tempfile::{NamedTempFile, TempDir};

fn quiet_config() -> Config {
    let mut config = Config::default();
    config.autosave.enabled = false;
    config
}

#[test]
fn test_toolbar_session_round_trip() -> Result<()> {
    let mut session = Session::new("", &quiet_config());
    let events = session.subscribe();

    session.apply_action("heading2", None, Selection::caret(0));
    assert_eq!(session.text(), "## Heading 2");

    let end = session.cursor();
    session.apply_action("insert", Some("\n\nintro paragraph"), Selection::caret(end));
    session.apply_action("bold", None, Selection::new(14, 19));
    assert_eq!(session.text(), "## Heading 2\n\n**intro** paragraph");

    let all = Selection::all(session.text());
    session.apply_action("blockquote", None, all);
    assert_eq!(session.text(), "> ## Heading 2\n> \n> **intro** paragraph");

    session.undo();
    session.undo();
    assert_eq!(session.text(), "## Heading 2\n\nintro paragraph");
    session.redo();
    assert_eq!(session.text(), "## Heading 2\n\n**intro** paragraph");

    let changes = events
        .try_iter()
        .filter(|e| matches!(e, SessionEvent::Changed { .. }))
        .count();
    assert_eq!(changes, 7);
    Ok(())
}

#[test]
fn test_history_limit_from_config() {
    let mut config = quiet_config();
    config.history.limit = 3;
    let mut session = Session::new("0", &config);

    for i in 1..=5 {
        session.set_text(&i.to_string(), 1);
    }
    assert_eq!(session.history().past_len(), 3);

    assert_eq!(session.undo(), Outcome::Applied);
    assert_eq!(session.undo(), Outcome::Applied);
    assert_eq!(session.text(), "3");
    assert_eq!(session.undo(), Outcome::Unchanged);
}

#[test]
fn test_new_edit_discards_redo() {
    let mut session = Session::new("a", &quiet_config());
    session.set_text("ab", 2);
    session.set_text("abc", 3);
    session.undo();
    assert!(session.history().can_redo());

    session.set_text("abX", 3);
    assert!(!session.history().can_redo());
    assert_eq!(session.redo(), Outcome::Unchanged);
    assert_eq!(session.text(), "abX");
}

#[test]
fn test_autosave_to_file_store() -> Result<()> {
    let dir = TempDir::new()?;
    let store: Arc<dyn Store> = Arc::new(FileStore::new(dir.path()));

    let mut config = Config::default();
    config.autosave.delay_ms = 20;

    {
        let mut session = Session::restore(store.clone(), "# Start", &config);
        assert_eq!(session.text(), "# Start");
        session.apply_action("italic", None, Selection::caret(7));
    }
    assert_eq!(
        store.get(CONTENT_KEY)?.as_deref(),
        Some("# Start*italic text*")
    );

    let session = Session::restore(store, "# Start", &config);
    assert_eq!(session.text(), "# Start*italic text*");
    Ok(())
}

#[test]
fn test_import_file_then_undo() -> Result<()> {
    let mut file = NamedTempFile::new()?;
    file.write_all(b"# Imported\n\nBody text\n")?;

    let mut session = Session::new("draft", &quiet_config());
    let events = session.subscribe();
    assert_eq!(session.import_file(file.path()), Outcome::Applied);
    assert_eq!(session.text(), "# Imported\n\nBody text\n");

    let notified = events
        .try_iter()
        .any(|e| matches!(e, SessionEvent::Notify(n) if !n.is_error()));
    assert!(notified);

    session.undo();
    assert_eq!(session.text(), "draft");
    Ok(())
}

#[test]
fn test_preview_render_follows_buffer() {
    let mut session = Session::new("# Title", &quiet_config());
    let first = session.html();
    assert!(first.as_deref().is_some_and(|h| h.contains("<h1")));

    session.toggle_preview();
    assert_eq!(session.mode(), ViewMode::Preview);
    session.preview_edit("<h1>Changed in preview</h1>");
    assert_eq!(session.text(), "# Title");

    session.toggle_preview();
    session.apply_action("hr", None, Selection::caret(7));
    let second = session.html();
    assert!(second.as_deref().is_some_and(|h| h.contains("<hr />")));
}

#[test]
fn test_replace_clear_and_stats() {
    let mut session = Session::new("one two one", &quiet_config()).with_prompter(Box::new(Confirm));

    let count = session.replace_all(
        "one",
        "three",
        &SearchOptions {
            case_sensitive: true,
        },
    );
    assert_eq!(count, 2);
    assert_eq!(session.stats().words, 3);

    let mut goal = WordGoal::new(4);
    assert_eq!(goal.status(session.stats().words), GoalStatus::Close(75));
    goal.acknowledge();

    assert_eq!(session.apply_action("clear", None, Selection::caret(0)), Outcome::Applied);
    assert_eq!(session.text(), "");
    assert_eq!(session.stats().words, 0);
}

#[test]
fn test_toc_of_session() {
    let session = Session::new(
        "# Guide\n\n```\n# not a heading\n```\n\n## Setup Steps\n\nText\n===\n",
        &quiet_config(),
    );
    let headings = session.headings();
    let anchors: Vec<_> = headings.iter().map(|h| h.anchor.as_str()).collect();
    assert_eq!(anchors, vec!["guide", "setup-steps", "text"]);
}
