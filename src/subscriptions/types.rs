//! Subscription types for canvas change events.

use crate::types::{BookId, PageId, Selection};
use serde::{Deserialize, Serialize};

/// Configuration for a subscription.
#[derive(Clone, Debug)]
pub struct SubscriptionConfig {
    /// Max buffered events before the subscriber is dropped.
    /// Default: 256
    pub buffer_size: usize,

    /// Filter criteria.
    pub filter: SubscriptionFilter,
}

impl Default for SubscriptionConfig {
    fn default() -> Self {
        Self {
            buffer_size: 256,
            filter: SubscriptionFilter::default(),
        }
    }
}

/// Areas of the canvas an event can be about.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Topic {
    Books,
    Pointers,
    Selection,
    Ui,
    History,
    Assets,
}

/// Filter criteria for subscriptions.
#[derive(Clone, Debug, Default)]
pub struct SubscriptionFilter {
    /// Topics to receive (None = everything).
    pub topics: Option<Vec<Topic>>,
}

impl SubscriptionFilter {
    /// Subscribe to everything.
    pub fn all() -> Self {
        Self::default()
    }

    /// Subscribe to specific topics.
    pub fn topics(topics: Vec<Topic>) -> Self {
        Self {
            topics: Some(topics),
        }
    }

    pub fn accepts(&self, topic: Topic) -> bool {
        match &self.topics {
            Some(topics) => topics.contains(&topic),
            None => true,
        }
    }
}

/// Events emitted after a change has been committed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CanvasEvent {
    /// The book collection changed.
    BooksChanged {
        /// Action label, or "Undo"/"Redo".
        label: String,
    },

    /// Active book or page moved.
    PointersChanged {
        active_book_id: Option<BookId>,
        active_page_id: Option<PageId>,
    },

    SelectionChanged {
        selection: Option<Selection>,
    },

    /// Mode, zoom, grid, rulers, offset or panning flags changed.
    UiChanged,

    HistoryChanged {
        can_undo: bool,
        can_redo: bool,
    },

    /// The uploaded image list changed.
    AssetsChanged,

    /// Subscription was dropped.
    Dropped {
        reason: DropReason,
    },
}

impl CanvasEvent {
    /// Topic used for filtering. `Dropped` has none and is always delivered.
    pub fn topic(&self) -> Option<Topic> {
        match self {
            CanvasEvent::BooksChanged { .. } => Some(Topic::Books),
            CanvasEvent::PointersChanged { .. } => Some(Topic::Pointers),
            CanvasEvent::SelectionChanged { .. } => Some(Topic::Selection),
            CanvasEvent::UiChanged => Some(Topic::Ui),
            CanvasEvent::HistoryChanged { .. } => Some(Topic::History),
            CanvasEvent::AssetsChanged => Some(Topic::Assets),
            CanvasEvent::Dropped { .. } => None,
        }
    }
}

/// Why a subscription was dropped.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DropReason {
    /// Send buffer overflowed (slow consumer).
    BufferOverflow,
    /// Explicitly unsubscribed.
    Unsubscribed,
}

/// Unique identifier for a subscription.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

/// Handle to manage a subscription.
pub struct SubscriptionHandle {
    pub id: SubscriptionId,
    /// Channel to receive events.
    pub receiver: crossbeam_channel::Receiver<CanvasEvent>,
}

impl SubscriptionHandle {
    /// Receive the next event (blocking).
    pub fn recv(&self) -> Result<CanvasEvent, crossbeam_channel::RecvError> {
        self.receiver.recv()
    }

    /// Try to receive an event (non-blocking).
    pub fn try_recv(&self) -> Result<CanvasEvent, crossbeam_channel::TryRecvError> {
        self.receiver.try_recv()
    }

    /// Receive with timeout.
    pub fn recv_timeout(
        &self,
        timeout: std::time::Duration,
    ) -> Result<CanvasEvent, crossbeam_channel::RecvTimeoutError> {
        self.receiver.recv_timeout(timeout)
    }

    /// Everything currently buffered, without blocking.
    pub fn drain(&self) -> Vec<CanvasEvent> {
        self.receiver.try_iter().collect()
    }
}
