//! History manager implementation.

use crate::model::Books;
use crate::types::Timestamp;
use std::collections::VecDeque;

/// Default number of frames kept on each side.
pub const DEFAULT_HISTORY_CAPACITY: usize = 20;

/// A recorded frame and the action it belongs to.
#[derive(Clone, Debug)]
pub struct HistoryEntry {
    /// Action that produced the transition this frame sits on, e.g. "Add element".
    pub label: String,
    /// The book collection at this point in time. Never mutated once recorded.
    pub frame: Books,
    pub timestamp: Timestamp,
}

impl HistoryEntry {
    fn new(label: &str, frame: Books) -> Self {
        Self {
            label: label.to_string(),
            frame,
            timestamp: Timestamp::now(),
        }
    }
}

/// Past and future stacks of frames.
///
/// `past` is ordered oldest to newest; `future` nearest first. Both are
/// capped at `capacity`; anything beyond is dropped silently from the far end.
#[derive(Clone, Debug)]
pub struct HistoryManager {
    past: VecDeque<HistoryEntry>,
    future: VecDeque<HistoryEntry>,
    capacity: usize,
}

impl Default for HistoryManager {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

impl HistoryManager {
    pub fn new(capacity: usize) -> Self {
        Self {
            past: VecDeque::with_capacity(capacity),
            future: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Record the collection as it was before a tracked action.
    ///
    /// Drops the oldest frame at capacity and clears the future.
    pub fn record(&mut self, label: &str, previous: Books) {
        self.future.clear();
        self.past.push_back(HistoryEntry::new(label, previous));
        while self.past.len() > self.capacity {
            self.past.pop_front();
        }

        tracing::debug!(label, undo_depth = self.past.len(), "History frame recorded");
    }

    /// Step back. `current` goes to the front of the future; the newest past
    /// frame is returned for the caller to install.
    pub fn undo(&mut self, current: Books) -> Option<Books> {
        let entry = self.past.pop_back()?;

        self.future.push_front(HistoryEntry::new(&entry.label, current));
        while self.future.len() > self.capacity {
            self.future.pop_back();
        }

        tracing::debug!(
            label = %entry.label,
            undo_remaining = self.past.len(),
            redo_depth = self.future.len(),
            "Undo"
        );

        Some(entry.frame)
    }

    /// Step forward. `current` goes onto the past; the nearest future frame
    /// is returned for the caller to install.
    pub fn redo(&mut self, current: Books) -> Option<Books> {
        let entry = self.future.pop_front()?;

        self.past.push_back(HistoryEntry::new(&entry.label, current));
        while self.past.len() > self.capacity {
            self.past.pop_front();
        }

        tracing::debug!(
            label = %entry.label,
            undo_depth = self.past.len(),
            redo_remaining = self.future.len(),
            "Redo"
        );

        Some(entry.frame)
    }

    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    /// Label of the action the next undo reverts.
    pub fn undo_label(&self) -> Option<&str> {
        self.past.back().map(|e| e.label.as_str())
    }

    /// Label of the action the next redo re-applies.
    pub fn redo_label(&self) -> Option<&str> {
        self.future.front().map(|e| e.label.as_str())
    }

    pub fn undo_count(&self) -> usize {
        self.past.len()
    }

    pub fn redo_count(&self) -> usize {
        self.future.len()
    }

    /// Past entries, oldest first.
    pub fn past(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.past.iter()
    }

    /// Future entries, nearest first.
    pub fn future(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.future.iter()
    }

    pub fn clear(&mut self) {
        self.past.clear();
        self.future.clear();
        tracing::debug!("History cleared");
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Change the capacity, trimming the far ends of both stacks if needed.
    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity;
        while self.past.len() > capacity {
            self.past.pop_front();
        }
        while self.future.len() > capacity {
            self.future.pop_back();
        }
    }
}
