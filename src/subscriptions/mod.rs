//! Change notifications for UI layers.
//!
//! A front-end subscribes once and re-reads the parts of the canvas named
//! by each event, instead of polling after every action.
//!
//! # Example
//!
//! ```ignore
//! let handle = canvas.subscribe(SubscriptionConfig {
//!     filter: SubscriptionFilter::topics(vec![Topic::Books, Topic::Selection]),
//!     ..Default::default()
//! });
//!
//! while let Ok(event) = handle.recv() {
//!     match event {
//!         CanvasEvent::BooksChanged { .. } => redraw_pages(&canvas),
//!         CanvasEvent::SelectionChanged { .. } => redraw_inspector(&canvas),
//!         CanvasEvent::Dropped { .. } => break,
//!         _ => {}
//!     }
//! }
//! ```

mod manager;
mod types;

pub use manager::SubscriptionManager;
pub use types::{
    CanvasEvent, DropReason, SubscriptionConfig, SubscriptionFilter, SubscriptionHandle,
    SubscriptionId, Topic,
};
