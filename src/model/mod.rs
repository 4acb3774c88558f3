//! The document tree: books own pages, pages own elements.
//!
//! Every level is held behind [`std::sync::Arc`]. Cloning a book collection
//! only bumps reference counts, and edits go through `Arc::make_mut`, which
//! copies a node only when a history frame still shares it. A recorded frame
//! therefore behaves like a deep copy without paying for one.

mod book;
mod element;
mod page;

pub use book::{Attributes, Book, BookPatch};
pub use element::{
    Border, Element, ElementKind, ElementPatch, ElementUpdate, Filters, Font, Geometry, Shadow,
    Style, StylePatch, TextAlign, TextPreset,
};
pub use page::{Background, Page, PagePatch};

use std::sync::Arc;

/// The whole book collection; also the shape of a history frame.
pub type Books = Vec<Arc<Book>>;
