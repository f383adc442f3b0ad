//! Undo/redo history over whole-buffer snapshots

use std::collections::VecDeque;
use std::sync::Arc;

/// Default number of snapshots kept in `past`
pub const DEFAULT_HISTORY_LIMIT: usize = 100;

/// A recorded buffer state
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Snapshot {
    pub text: Arc<str>,
    /// Caret the snapshot was produced with, restored on undo/redo
    pub cursor: usize,
}

impl Snapshot {
    pub fn new(text: impl Into<Arc<str>>, cursor: usize) -> Self {
        Self {
            text: text.into(),
            cursor,
        }
    }
}

/// Linear history.
///
/// `past` runs oldest to newest and its last entry is the current state.
/// `future` holds undone states, front first. The current state is never in
/// `future`.
#[derive(Debug, Clone)]
pub struct History {
    past: VecDeque<Snapshot>,
    future: VecDeque<Snapshot>,
    limit: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LIMIT)
    }
}

impl History {
    /// Create an empty history keeping at most `limit` past entries
    pub fn new(limit: usize) -> Self {
        Self {
            past: VecDeque::new(),
            future: VecDeque::new(),
            limit: limit.max(1),
        }
    }

    /// Create a history whose current state is `initial`
    pub fn with_initial(initial: Snapshot, limit: usize) -> Self {
        let mut history = Self::new(limit);
        history.past.push_back(initial);
        history
    }

    /// Record a new current state. Clears redo and evicts the oldest entry
    /// once the limit is exceeded.
    pub fn record(&mut self, snapshot: Snapshot) {
        self.past.push_back(snapshot);
        self.future.clear();
        while self.past.len() > self.limit {
            self.past.pop_front();
        }
    }

    /// Step back one state. Returns the new current state.
    pub fn undo(&mut self) -> Option<&Snapshot> {
        if self.past.len() < 2 {
            return None;
        }
        let current = self.past.pop_back()?;
        self.future.push_front(current);
        self.past.back()
    }

    /// Step forward one state. Returns the new current state.
    pub fn redo(&mut self) -> Option<&Snapshot> {
        let next = self.future.pop_front()?;
        self.past.push_back(next);
        self.past.back()
    }

    pub fn current(&self) -> Option<&Snapshot> {
        self.past.back()
    }

    pub fn can_undo(&self) -> bool {
        self.past.len() >= 2
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    pub fn past_len(&self) -> usize {
        self.past.len()
    }

    pub fn future_len(&self) -> usize {
        self.future.len()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Every recorded state in timeline order: past, then future
    pub fn timeline(&self) -> impl Iterator<Item = &Snapshot> {
        self.past.iter().chain(self.future.iter())
    }
}
