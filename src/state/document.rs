//! The book collection and the pointers that refer into it.

use crate::error::{CanvasError, Result};
use crate::model::{Book, Books, Element, Page};
use crate::types::{BookId, ElementId, PageId, Selection};
use std::collections::HashSet;
use std::sync::Arc;

/// Active book/page ids, compared before and after a commit to decide which
/// change events to emit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Pointers {
    pub active_book_id: Option<BookId>,
    pub active_page_id: Option<PageId>,
    pub selection: Option<Selection>,
}

/// The document tree plus its derived pointers.
///
/// Invariants, restored by [`Document::resolve_pointers`] after every change:
/// - `active_book_id` names an existing book, or is `None` iff there are none.
/// - `active_page_id` names a page of the active book, or is `None` iff that
///   book has no pages.
/// - `selection`, if set, names a page of the active book and an element on it.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Document {
    pub(crate) books: Books,
    pub(crate) active_book_id: Option<BookId>,
    pub(crate) active_page_id: Option<PageId>,
    pub(crate) selection: Option<Selection>,
}

impl Document {
    /// An empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a document from an existing collection, validating ids and
    /// resolving pointers from scratch.
    pub fn from_books(books: Books) -> Result<Self> {
        validate_books(&books)?;
        let mut doc = Self {
            books,
            ..Default::default()
        };
        doc.resolve_pointers();
        Ok(doc)
    }

    // --- Reads ---

    pub fn books(&self) -> &Books {
        &self.books
    }

    pub fn active_book_id(&self) -> Option<BookId> {
        self.active_book_id
    }

    pub fn active_page_id(&self) -> Option<PageId> {
        self.active_page_id
    }

    pub fn selection(&self) -> Option<Selection> {
        self.selection
    }

    pub fn pointers(&self) -> Pointers {
        Pointers {
            active_book_id: self.active_book_id,
            active_page_id: self.active_page_id,
            selection: self.selection,
        }
    }

    pub fn book(&self, id: BookId) -> Option<&Arc<Book>> {
        self.books.iter().find(|b| b.id == id)
    }

    pub fn page(&self, book_id: BookId, page_id: PageId) -> Option<&Arc<Page>> {
        self.book(book_id)?.pages.iter().find(|p| p.id == page_id)
    }

    pub fn element(
        &self,
        book_id: BookId,
        page_id: PageId,
        element_id: ElementId,
    ) -> Option<&Arc<Element>> {
        self.page(book_id, page_id)?
            .elements
            .iter()
            .find(|e| e.id == element_id)
    }

    pub fn active_book(&self) -> Option<&Arc<Book>> {
        self.book(self.active_book_id?)
    }

    pub fn active_page(&self) -> Option<&Arc<Page>> {
        self.page(self.active_book_id?, self.active_page_id?)
    }

    /// The selected element, looked up within the active book.
    pub fn selected_element(&self) -> Option<&Arc<Element>> {
        let selection = self.selection?;
        self.element(self.active_book_id?, selection.page_id, selection.element_id)
    }

    // --- Pointer maintenance ---

    /// Re-point active book/page and selection at entities that exist.
    ///
    /// Keeps the current ids where they still resolve, otherwise falls back to
    /// the first book and its first page. Selection is cleared whenever the
    /// active book or page changes identity, or when it no longer resolves.
    pub fn resolve_pointers(&mut self) {
        let before = self.pointers();

        let book = self
            .active_book_id
            .and_then(|id| self.books.iter().find(|b| b.id == id))
            .or_else(|| self.books.first());

        let Some(book) = book else {
            self.active_book_id = None;
            self.active_page_id = None;
            self.selection = None;
            return;
        };

        self.active_book_id = Some(book.id);

        let page_exists = self
            .active_page_id
            .is_some_and(|page_id| book.contains_page(page_id));
        if !page_exists {
            self.active_page_id = book.first_page_id();
            self.selection = None;
        }

        if before.active_book_id != self.active_book_id {
            self.selection = None;
        }

        if let Some(selection) = self.selection {
            let resolves = book
                .page(selection.page_id)
                .is_some_and(|page| page.contains_element(selection.element_id));
            if !resolves {
                self.selection = None;
            }
        }
    }

    /// Install a history frame. Selection is always cleared.
    pub(crate) fn restore(&mut self, books: Books) {
        self.books = books;
        self.selection = None;
        self.resolve_pointers();
    }

    /// Make `book_id` active, falling back to the first book. Selects the
    /// book's first page and clears selection.
    pub fn set_active_book(&mut self, book_id: BookId) -> Option<BookId> {
        let target = self
            .book(book_id)
            .or_else(|| self.books.first())
            .map(|b| (b.id, b.first_page_id()));

        match target {
            Some((id, first_page)) => {
                self.active_book_id = Some(id);
                self.active_page_id = first_page;
            }
            None => {
                self.active_book_id = None;
                self.active_page_id = None;
            }
        }
        self.selection = None;
        self.active_book_id
    }

    /// Make `page_id` of `book_id` active.
    ///
    /// The book falls back to the active book, then the first book; the page
    /// falls back to that book's first page. Clears selection. Returns `None`
    /// without changing anything when there are no books at all.
    pub fn set_active_page(&mut self, book_id: BookId, page_id: PageId) -> Option<PageId> {
        let (book_id, page) = {
            let book = self
                .book(book_id)
                .or_else(|| self.active_book())
                .or_else(|| self.books.first())?;
            let page = book
                .page(page_id)
                .map(|p| p.id)
                .or_else(|| book.first_page_id());
            (book.id, page)
        };

        self.active_book_id = Some(book_id);
        self.active_page_id = page;
        self.selection = None;
        page
    }

    /// Set or clear the selection. A selection that does not resolve within
    /// the active book is rejected and leaves the current one in place.
    pub fn set_selection(&mut self, selection: Option<Selection>) -> Result<()> {
        if let Some(sel) = selection {
            let resolves = self
                .active_book()
                .and_then(|book| book.page(sel.page_id))
                .is_some_and(|page| page.contains_element(sel.element_id));
            if !resolves {
                return Err(CanvasError::InvalidSelection {
                    page: sel.page_id,
                    element: sel.element_id,
                });
            }
        }
        self.selection = selection;
        Ok(())
    }
}

/// Check a book collection before it is committed.
///
/// Every book, page and element id must be unique across the whole tree and
/// element geometry must be finite.
pub fn validate_books(books: &Books) -> Result<()> {
    let mut seen = HashSet::new();

    for book in books {
        if !seen.insert(book.id.0) {
            return Err(CanvasError::DuplicateId(format!("book {}", book.id)));
        }
        for page in &book.pages {
            if !seen.insert(page.id.0) {
                return Err(CanvasError::DuplicateId(format!("page {}", page.id)));
            }
            for element in &page.elements {
                if !seen.insert(element.id.0) {
                    return Err(CanvasError::DuplicateId(format!("element {}", element.id)));
                }
                let g = &element.geometry;
                let finite = [g.x, g.y, g.width, g.height, g.rotation, element.style.opacity]
                    .iter()
                    .all(|v| v.is_finite());
                if !finite {
                    return Err(CanvasError::Malformed(format!(
                        "element {} has non-finite geometry",
                        element.id
                    )));
                }
            }
        }
    }

    Ok(())
}
