//! Editor session: owns the buffer and routes commands through the
//! formatting engine and history

use anyhow::{Context, Result};
use crossbeam_channel::{Receiver, Sender};
use ropey::Rope;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::autoformat;
use crate::clipboard::{default_clipboard, Clipboard};
use crate::command::Command;
use crate::config::{Config, ThemeVariant, ViewOptions};
use crate::format;
use crate::history::{History, Snapshot};
use crate::keymap::{Chord, Keymap};
use crate::notify::Notification;
use crate::render::{standalone_html, CmarkRenderer, Preview};
use crate::schedule::Debouncer;
use crate::search::{self, SearchOptions};
use crate::selection::Selection;
use crate::stats::DocStats;
use crate::store::{self, Autosave, Store};
use crate::toc::{self, Heading};

/// Key the theme is persisted under
pub const THEME_KEY: &str = "theme";

/// Text shown when nothing was supplied or persisted
pub const DEFAULT_CONTENT: &str = "# Hello, World!\n\nStart writing your markdown here...";

/// Which pane the user is typing into
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewMode {
    Edit,
    Preview,
}

/// Published to subscribers after state changes
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionEvent {
    /// The buffer has a new value
    Changed { rev: u64, text: Arc<str> },
    /// Raw HTML edited in the rendered view. Not merged into the buffer.
    PreviewEdited(String),
    ModeChanged(ViewMode),
    Notify(Notification),
}

/// What a command did
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Buffer changed and one snapshot was recorded
    Applied,
    /// Ran, but the buffer did not change (copy, mode switch, nothing to undo)
    Unchanged,
    /// User said no to a destructive command
    Declined,
    /// Unknown command name
    Ignored,
    /// I/O failed; reported through a notification
    Failed,
}

/// Asks the user a yes/no question
pub trait Prompter {
    fn confirm(&mut self, message: &str) -> bool;
}

/// Says no to everything
#[derive(Debug, Default, Clone, Copy)]
pub struct Decline;

impl Prompter for Decline {
    fn confirm(&mut self, _message: &str) -> bool {
        false
    }
}

/// Says yes to everything
#[derive(Debug, Default, Clone, Copy)]
pub struct Confirm;

impl Prompter for Confirm {
    fn confirm(&mut self, _message: &str) -> bool {
        true
    }
}

pub struct Session {
    text: Arc<str>,
    rev: u64,
    cursor: usize,
    history: History,
    mode: ViewMode,
    view: ViewOptions,
    theme: ThemeVariant,
    config: Config,
    pending_cursor: Option<usize>,
    subscribers: Vec<Sender<SessionEvent>>,
    clipboard: Box<dyn Clipboard>,
    prompter: Box<dyn Prompter>,
    store: Option<Arc<dyn Store>>,
    autosave: Option<Autosave>,
    autoformat: Option<Debouncer>,
    preview: Preview,
}

impl Session {
    /// Start a session on `initial` with no persistence
    pub fn new(initial: &str, config: &Config) -> Self {
        let text: Arc<str> = Arc::from(initial);
        let cursor = text.chars().count();
        let history = History::with_initial(Snapshot::new(text.clone(), cursor), config.history.limit);
        let autoformat = config
            .autoformat
            .enabled
            .then(|| Debouncer::new(Duration::from_millis(config.autoformat.delay_ms)));

        Self {
            text,
            rev: 1,
            cursor,
            history,
            mode: ViewMode::Edit,
            view: config.view,
            theme: config.theme,
            config: config.clone(),
            pending_cursor: None,
            subscribers: Vec::new(),
            clipboard: default_clipboard(),
            prompter: Box::new(Decline),
            store: None,
            autosave: None,
            autoformat,
            preview: Preview::new(Box::new(CmarkRenderer::new(&config.render))),
        }
    }

    /// Start from whatever `store` holds, falling back to `initial`, and
    /// autosave back into it
    pub fn restore(store: Arc<dyn Store>, initial: &str, config: &Config) -> Self {
        let text = store::restore(store.as_ref(), &config.autosave.key, initial);
        let mut session = Self::new(&text, config);
        if let Ok(Some(theme)) = store.get(THEME_KEY) {
            if let Some(theme) = ThemeVariant::from_stored(&theme) {
                session.theme = theme;
            }
        }
        session.with_store(store)
    }

    /// Persist into `store`, autosaving the buffer if enabled
    pub fn with_store(mut self, store: Arc<dyn Store>) -> Self {
        if self.config.autosave.enabled {
            self.autosave = Some(Autosave::spawn(
                store.clone(),
                self.config.autosave.key.clone(),
                Duration::from_millis(self.config.autosave.delay_ms),
            ));
        }
        self.store = Some(store);
        self
    }

    pub fn with_clipboard(mut self, clipboard: Box<dyn Clipboard>) -> Self {
        self.clipboard = clipboard;
        self
    }

    pub fn with_prompter(mut self, prompter: Box<dyn Prompter>) -> Self {
        self.prompter = prompter;
        self
    }

    /// Receive every event published from now on
    pub fn subscribe(&mut self) -> Receiver<SessionEvent> {
        let (tx, rx) = crossbeam_channel::unbounded();
        self.subscribers.push(tx);
        rx
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn snapshot(&self) -> Arc<str> {
        self.text.clone()
    }

    pub fn rev(&self) -> u64 {
        self.rev
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    pub fn view(&self) -> &ViewOptions {
        &self.view
    }

    pub fn set_view(&mut self, view: ViewOptions) {
        self.view = view;
    }

    pub fn theme(&self) -> ThemeVariant {
        self.theme
    }

    pub fn set_theme(&mut self, theme: ThemeVariant) {
        self.theme = theme;
        if let Some(store) = &self.store {
            if let Err(e) = store.set(THEME_KEY, theme.as_str()) {
                log::warn!("Failed to persist theme: {e:#}");
            }
        }
    }

    /// Caret the host should restore after re-rendering, if any
    pub fn take_pending_cursor(&mut self) -> Option<usize> {
        self.pending_cursor.take()
    }

    /// Apply a command by name. Unknown names do nothing.
    pub fn apply_action(&mut self, name: &str, payload: Option<&str>, selection: Selection) -> Outcome {
        match Command::parse(name, payload) {
            Some(command) => self.apply(command, selection),
            None => {
                log::debug!("Ignoring unknown action {name:?}");
                Outcome::Ignored
            }
        }
    }

    /// Apply the command bound to `chord`, if any
    pub fn apply_chord(&mut self, keymap: &Keymap, chord: &Chord, selection: Selection) -> Outcome {
        match keymap.lookup(chord) {
            Some(command) => self.apply(command, selection),
            None => Outcome::Ignored,
        }
    }

    pub fn apply(&mut self, command: Command, selection: Selection) -> Outcome {
        log::debug!("Applying {} at {selection}", command.name());
        match command {
            Command::Format(fmt) => {
                let edit = format::apply(&self.text, selection, fmt);
                self.commit(edit.text, edit.cursor)
            }
            Command::Insert(insertion) => {
                let edit = format::replace_selection(&self.text, selection, &insertion);
                self.commit(edit.text, edit.cursor)
            }
            Command::Import(text) => self.import_text(&text),
            Command::Clear => self.clear(),
            Command::Copy => self.copy(),
            Command::TogglePreview => {
                self.toggle_preview();
                Outcome::Unchanged
            }
            Command::Undo => self.undo(),
            Command::Redo => self.redo(),
        }
    }

    /// A direct edit from the text input (typing, cutting, pasting)
    pub fn set_text(&mut self, text: &str, cursor: usize) -> Outcome {
        self.commit(text.to_string(), cursor)
    }

    pub fn undo(&mut self) -> Outcome {
        match self.history.undo() {
            Some(snapshot) => {
                let snapshot = snapshot.clone();
                self.restore_snapshot(snapshot);
                Outcome::Applied
            }
            None => Outcome::Unchanged,
        }
    }

    pub fn redo(&mut self) -> Outcome {
        match self.history.redo() {
            Some(snapshot) => {
                let snapshot = snapshot.clone();
                self.restore_snapshot(snapshot);
                Outcome::Applied
            }
            None => Outcome::Unchanged,
        }
    }

    /// Empty the buffer after the user confirms
    pub fn clear(&mut self) -> Outcome {
        if !self.prompter.confirm("Are you sure you want to clear the editor?") {
            log::debug!("Clear declined");
            return Outcome::Declined;
        }
        // A confirmed clear is always its own undo step
        self.record(String::new(), 0)
    }

    /// Copy the whole buffer to the clipboard
    pub fn copy(&mut self) -> Outcome {
        match self.clipboard.set_text(&self.text) {
            Ok(()) => {
                self.notify(Notification::info(
                    "Copied to clipboard",
                    "Markdown content has been copied to your clipboard.",
                    "clipboard",
                ));
                Outcome::Unchanged
            }
            Err(e) => {
                log::warn!("Copy failed: {e:#}");
                self.notify(Notification::error(
                    "Failed to copy",
                    format!("Could not copy to clipboard: {e:#}"),
                    "clipboard",
                ));
                Outcome::Failed
            }
        }
    }

    pub fn toggle_preview(&mut self) -> ViewMode {
        self.mode = match self.mode {
            ViewMode::Edit => ViewMode::Preview,
            ViewMode::Preview => ViewMode::Edit,
        };
        self.publish(SessionEvent::ModeChanged(self.mode));
        self.mode
    }

    /// HTML edited in the rendered view. Forwarded to subscribers only;
    /// the markdown buffer is never overwritten with HTML.
    pub fn preview_edit(&mut self, html: &str) -> Outcome {
        if self.mode != ViewMode::Preview {
            return Outcome::Ignored;
        }
        self.publish(SessionEvent::PreviewEdited(html.to_string()));
        Outcome::Unchanged
    }

    /// Replace the buffer wholesale
    pub fn import_text(&mut self, text: &str) -> Outcome {
        self.commit(text.to_string(), 0)
    }

    /// Replace the buffer with a file's contents
    pub fn import_file(&mut self, path: &Path) -> Outcome {
        let result = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()));
        match result {
            Ok(text) => {
                let outcome = self.import_text(&text);
                self.notify(Notification::info(
                    "File imported",
                    format!("Imported {}", path.display()),
                    "import",
                ));
                outcome
            }
            Err(e) => {
                log::warn!("Import failed: {e:#}");
                self.notify(Notification::error("Import failed", format!("{e:#}"), "import"));
                Outcome::Failed
            }
        }
    }

    /// Replace every match of `query`; one snapshot for the lot
    pub fn replace_all(&mut self, query: &str, replacement: &str, options: &SearchOptions) -> usize {
        let replaced = search::replace_all(&self.text, query, replacement, options);
        if replaced.count > 0 {
            let cursor = self.cursor;
            self.commit(replaced.text, cursor);
        }
        replaced.count
    }

    /// Drive timers: the auto-format pass and autosave results
    pub fn tick(&mut self, now: Instant) -> Outcome {
        let mut results = Vec::new();
        if let Some(autosave) = &self.autosave {
            while let Some(result) = autosave.try_recv_result() {
                results.push(result);
            }
        }
        for result in results {
            if let Some(error) = result.error {
                self.notify(Notification::error("Autosave failed", error, "autosave"));
            }
        }

        let due = self.autoformat.as_mut().is_some_and(|d| d.fire(now));
        if !due {
            return Outcome::Unchanged;
        }
        let formatted = autoformat::format_markdown(&self.text);
        let cursor = self.cursor;
        self.commit(formatted, cursor)
    }

    pub fn stats(&self) -> DocStats {
        DocStats::compute(&self.text)
    }

    pub fn headings(&self) -> Vec<Heading> {
        toc::extract_headings(&Rope::from_str(&self.text))
    }

    /// Rendered HTML for the current revision
    pub fn html(&mut self) -> Option<Arc<str>> {
        self.preview.render(self.rev, &self.text)
    }

    /// Standalone HTML document for download
    pub fn export_html(&mut self, title: &str) -> Result<String> {
        let body = self
            .html()
            .context("Nothing has been rendered for this document")?;
        Ok(standalone_html(title, &body, self.theme, &self.view))
    }

    fn commit(&mut self, text: String, cursor: usize) -> Outcome {
        if *self.text == *text {
            return Outcome::Unchanged;
        }
        self.record(text, cursor)
    }

    /// Record `text` as a new snapshot even if it matches the buffer
    fn record(&mut self, text: String, cursor: usize) -> Outcome {
        let text: Arc<str> = Arc::from(text);
        let cursor = cursor.min(text.chars().count());
        self.history.record(Snapshot::new(text.clone(), cursor));
        self.set_current(text, cursor);
        if let Some(debouncer) = &mut self.autoformat {
            debouncer.touch(Instant::now());
        }
        log::debug!("Committed revision {}", self.rev);
        Outcome::Applied
    }

    fn restore_snapshot(&mut self, snapshot: Snapshot) {
        // A format pass after undo/redo would record over the redo stack
        if let Some(debouncer) = &mut self.autoformat {
            debouncer.cancel();
        }
        self.set_current(snapshot.text, snapshot.cursor);
    }

    fn set_current(&mut self, text: Arc<str>, cursor: usize) {
        self.text = text;
        self.cursor = cursor;
        self.rev += 1;

        if self.mode == ViewMode::Edit {
            self.pending_cursor = Some(cursor);
        }
        if let Some(autosave) = &self.autosave {
            autosave.request(self.rev, self.text.clone());
        }
        self.publish(SessionEvent::Changed {
            rev: self.rev,
            text: self.text.clone(),
        });
    }

    fn notify(&mut self, notification: Notification) {
        self.publish(SessionEvent::Notify(notification));
    }

    fn publish(&mut self, event: SessionEvent) {
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }
}
