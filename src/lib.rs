//! # Scrapbook
//!
//! Document state and undo/redo engine for a paginated scrapbook editor.
//!
//! ## Core Concepts
//!
//! - **Books**: Ordered collection of books, each with ordered pages
//! - **Elements**: Positioned text and image nodes on a page
//! - **Pointers**: Active book, active page and selection, always resolvable
//! - **History**: Bounded linear undo/redo of whole-collection frames
//!
//! ## Example
//!
//! ```ignore
//! use scrapbook::{Book, Canvas, CanvasConfig, Element, ElementPatch};
//!
//! let canvas = Canvas::new(CanvasConfig::default());
//! canvas.add_book(Some(Book::notebook("Viaje")))?;
//!
//! let book = canvas.active_book_id().unwrap();
//! let page = canvas.active_page_id().unwrap();
//!
//! let hello = Element::text("hola");
//! let id = hello.id;
//! canvas.add_element(book, page, hello)?;
//! canvas.update_element(book, page, id, ElementPatch::new().x(40.0))?;
//!
//! canvas.undo();
//! ```

pub mod error;
pub mod history;
pub mod model;
pub mod session;
pub mod state;
pub mod store;
pub mod subscriptions;
pub mod types;

// Re-exports
pub use error::{CanvasError, Result};
pub use history::{HistoryEntry, HistoryManager, DEFAULT_HISTORY_CAPACITY};
pub use model::{
    Attributes, Background, Book, BookPatch, Books, Border, Element, ElementKind, ElementPatch,
    ElementUpdate, Filters, Font, Geometry, Page, PagePatch, Shadow, Style, StylePatch, TextAlign,
    TextPreset,
};
pub use session::Session;
pub use state::{Alignment, Applied, Axis, Document, PageBounds, Pointers};
pub use store::{Canvas, CanvasConfig};
pub use subscriptions::{
    CanvasEvent, DropReason, SubscriptionConfig, SubscriptionFilter, SubscriptionHandle,
    SubscriptionId, SubscriptionManager, Topic,
};
pub use types::*;
