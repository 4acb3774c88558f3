//! Document state and the mutation layer.
//!
//! [`Document`] holds the book collection together with the pointers that
//! must always resolve against it (active book, active page, selection).
//! The functions in [`mutation`] are the only way the collection changes:
//! each one takes a transformation over an owned copy of a slice, validates
//! the result and commits it, re-resolving pointers afterwards.

mod document;
pub mod layout;
pub mod mutation;

pub use document::{validate_books, Document, Pointers};
pub use layout::{Alignment, Axis, PageBounds};
pub use mutation::{
    replace_books, replace_elements, replace_pages, set_books, set_elements, set_pages, Applied,
};
