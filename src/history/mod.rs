//! Bounded linear undo/redo over whole-collection frames.
//!
//! Every tracked action records the collection as it was before the action.
//! Recording clears the redo side, so there is never more than one future.

mod manager;

pub use manager::{HistoryEntry, HistoryManager, DEFAULT_HISTORY_CAPACITY};
