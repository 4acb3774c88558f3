//! Error types for canvas operations.
//!
//! A failed action never leaves partial state behind: the document, history
//! and pointers are exactly as they were before the call.

use crate::types::{AssetId, BookId, ElementId, PageId};
use thiserror::Error;

/// Main error type for canvas operations.
#[derive(Debug, Error)]
pub enum CanvasError {
    #[error("Book not found: {0}")]
    BookNotFound(BookId),

    #[error("Page not found: {page} (book {book})")]
    PageNotFound { book: BookId, page: PageId },

    #[error("Element not found: {element} (page {page})")]
    ElementNotFound { page: PageId, element: ElementId },

    #[error("Asset not found: {0}")]
    AssetNotFound(AssetId),

    #[error("Duplicate id: {0}")]
    DuplicateId(String),

    #[error("Malformed transformation result: {0}")]
    Malformed(String),

    #[error("Selection does not resolve: element {element} on page {page}")]
    InvalidSelection { page: PageId, element: ElementId },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    #[error("Invalid session format: {0}")]
    InvalidFormat(String),

    #[error("Checksum mismatch: expected {expected}, got {got}")]
    ChecksumMismatch { expected: u32, got: u32 },
}

impl CanvasError {
    /// Whether this is one of the "target id does not exist" errors.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            CanvasError::BookNotFound(_)
                | CanvasError::PageNotFound { .. }
                | CanvasError::ElementNotFound { .. }
                | CanvasError::AssetNotFound(_)
        )
    }
}

impl From<serde_json::Error> for CanvasError {
    fn from(e: serde_json::Error) -> Self {
        if e.is_data() || e.is_syntax() || e.is_eof() {
            CanvasError::Deserialization(e.to_string())
        } else {
            CanvasError::Serialization(e.to_string())
        }
    }
}

impl From<rmp_serde::encode::Error> for CanvasError {
    fn from(e: rmp_serde::encode::Error) -> Self {
        CanvasError::Serialization(e.to_string())
    }
}

impl From<rmp_serde::decode::Error> for CanvasError {
    fn from(e: rmp_serde::decode::Error) -> Self {
        CanvasError::Deserialization(e.to_string())
    }
}

/// Result type for canvas operations.
pub type Result<T> = std::result::Result<T, CanvasError>;
