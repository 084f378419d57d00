//! Cursor-indexed undo/redo history over committed graph snapshots.

use crate::graph::{Edge, Node};
use serde::{Deserialize, Serialize};

/// Maximum number of snapshots to keep.
pub const MAX_HISTORY: usize = 50;

/// An immutable snapshot of the committed graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

/// Linear undo/redo history with a cursor into the entry list.
///
/// Pushing while the cursor sits before the tip discards the redo branch.
/// Undo/redo hand back the snapshot to apply; applying it must not itself
/// be recorded, so both arm a one-shot suppression that swallows the next
/// push of the state just restored.
#[derive(Debug, Clone, Default)]
pub struct History {
    entries: Vec<HistoryEntry>,
    cursor: usize,
    suppress_next: bool,
}

impl History {
    /// Create an empty history. The first `reset` or `push` establishes
    /// the baseline entry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a committed snapshot: truncate the redo branch, append, and
    /// advance the cursor. Bounded to [`MAX_HISTORY`] entries, dropping the
    /// oldest. A push echoing a state just restored by undo/redo is skipped.
    pub fn push(&mut self, nodes: Vec<Node>, edges: Vec<Edge>) {
        let entry = HistoryEntry { nodes, edges };

        if self.suppress_next {
            self.suppress_next = false;
            // Only the restore echo is swallowed; a genuinely new state is
            // a real mutation and still records.
            if self.entries.get(self.cursor) == Some(&entry) {
                return;
            }
        }

        if !self.entries.is_empty() {
            self.entries.truncate(self.cursor + 1);
        }
        self.entries.push(entry);
        if self.entries.len() > MAX_HISTORY {
            self.entries.remove(0);
        }
        self.cursor = self.entries.len() - 1;
    }

    /// Step back one entry and return the snapshot to restore. No-op at the
    /// start of history.
    pub fn undo(&mut self) -> Option<&HistoryEntry> {
        if !self.can_undo() {
            return None;
        }
        self.cursor -= 1;
        self.suppress_next = true;
        Some(&self.entries[self.cursor])
    }

    /// Step forward one entry and return the snapshot to restore. No-op at
    /// the tip.
    pub fn redo(&mut self) -> Option<&HistoryEntry> {
        if !self.can_redo() {
            return None;
        }
        self.cursor += 1;
        self.suppress_next = true;
        Some(&self.entries[self.cursor])
    }

    /// Replace the entire history with a single baseline entry. Used when
    /// switching to a different document.
    pub fn reset(&mut self, nodes: Vec<Node>, edges: Vec<Edge>) {
        self.entries = vec![HistoryEntry { nodes, edges }];
        self.cursor = 0;
        self.suppress_next = false;
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        !self.entries.is_empty() && self.cursor < self.entries.len() - 1
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Current cursor position.
    pub fn cursor(&self) -> usize {
        self.cursor
    }
}
