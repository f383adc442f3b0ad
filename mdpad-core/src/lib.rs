//! mdpad Core - Markdown editing engine, history, and session state
//!
//! This crate contains the editing logic for mdpad, independent of any UI:
//! - Formatting engine that inserts markdown syntax around a selection
//! - Bounded undo/redo history of whole-buffer snapshots
//! - Editor session routing named commands, notifications and preview state
//! - Persistence with a debounced autosave worker
//! - Writing aids: statistics, word goal, table of contents, search, auto-format
//! - Configuration management

pub mod autoformat;
pub mod clipboard;
pub mod command;
pub mod config;
pub mod format;
pub mod goal;
pub mod history;
pub mod keymap;
pub mod notify;
pub mod render;
pub mod schedule;
pub mod search;
pub mod selection;
pub mod session;
pub mod stats;
pub mod store;
pub mod toc;

// Re-export commonly used types
pub use command::Command;
pub use config::Config;
pub use format::{Edit, Format};
pub use history::{History, Snapshot};
pub use notify::{Notification, NotificationLevel};
pub use selection::Selection;
pub use session::{Outcome, Session, SessionEvent, ViewMode};
