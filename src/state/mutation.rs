//! Slice replacement primitives.
//!
//! Each primitive hands the transformation an owned copy of the current
//! slice. Because the tree is `Arc`-shared, the copy is shallow: mutating an
//! entry goes through `Arc::make_mut` and never reaches the live document or
//! any recorded history frame.
//!
//! If the transformation fails, or its result does not validate, the
//! document is left exactly as it was and the error is returned.

use super::document::{validate_books, Document};
use crate::error::{CanvasError, Result};
use crate::model::{Book, Books, Element, Page};
use crate::types::{BookId, PageId};
use std::sync::Arc;

/// Outcome of a committed replacement.
#[derive(Clone, Debug)]
pub struct Applied<T> {
    /// The full book collection as it was before the commit.
    pub previous: Books,
    /// The slice that was replaced, as it is now.
    pub slice: Vec<Arc<T>>,
}

/// Replace the whole book collection with `f(current)`.
pub fn replace_books<F>(doc: &mut Document, f: F) -> Result<Applied<Book>>
where
    F: FnOnce(Books) -> Result<Books>,
{
    let previous = doc.books.clone();
    let next = f(previous.clone())?;
    validate_books(&next)?;

    doc.books = next;
    doc.resolve_pointers();

    Ok(Applied {
        slice: doc.books.clone(),
        previous,
    })
}

/// Replace the book collection with a literal value.
pub fn set_books(doc: &mut Document, books: Books) -> Result<Applied<Book>> {
    replace_books(doc, move |_| Ok(books))
}

/// Replace the pages of `book_id` with `f(current pages)`.
pub fn replace_pages<F>(doc: &mut Document, book_id: BookId, f: F) -> Result<Applied<Page>>
where
    F: FnOnce(Vec<Arc<Page>>) -> Result<Vec<Arc<Page>>>,
{
    if doc.book(book_id).is_none() {
        return Err(CanvasError::BookNotFound(book_id));
    }

    let applied = replace_books(doc, |mut books| {
        let book = books
            .iter_mut()
            .find(|b| b.id == book_id)
            .ok_or(CanvasError::BookNotFound(book_id))?;
        let pages = f(book.pages.clone())?;
        Arc::make_mut(book).pages = pages;
        Ok(books)
    })?;

    let slice = doc
        .book(book_id)
        .map(|b| b.pages.clone())
        .unwrap_or_default();

    Ok(Applied {
        previous: applied.previous,
        slice,
    })
}

/// Replace the pages of `book_id` with a literal value.
pub fn set_pages(
    doc: &mut Document,
    book_id: BookId,
    pages: Vec<Arc<Page>>,
) -> Result<Applied<Page>> {
    replace_pages(doc, book_id, move |_| Ok(pages))
}

/// Replace the elements of `page_id` in `book_id` with `f(current elements)`.
pub fn replace_elements<F>(
    doc: &mut Document,
    book_id: BookId,
    page_id: PageId,
    f: F,
) -> Result<Applied<Element>>
where
    F: FnOnce(Vec<Arc<Element>>) -> Result<Vec<Arc<Element>>>,
{
    let book = doc.book(book_id).ok_or(CanvasError::BookNotFound(book_id))?;
    if !book.contains_page(page_id) {
        return Err(CanvasError::PageNotFound {
            book: book_id,
            page: page_id,
        });
    }

    let applied = replace_pages(doc, book_id, |mut pages| {
        let page = pages
            .iter_mut()
            .find(|p| p.id == page_id)
            .ok_or(CanvasError::PageNotFound {
                book: book_id,
                page: page_id,
            })?;
        let elements = f(page.elements.clone())?;
        Arc::make_mut(page).elements = elements;
        Ok(pages)
    })?;

    let slice = doc
        .page(book_id, page_id)
        .map(|p| p.elements.clone())
        .unwrap_or_default();

    Ok(Applied {
        previous: applied.previous,
        slice,
    })
}

/// Replace the elements of a page with a literal value.
pub fn set_elements(
    doc: &mut Document,
    book_id: BookId,
    page_id: PageId,
    elements: Vec<Arc<Element>>,
) -> Result<Applied<Element>> {
    replace_elements(doc, book_id, page_id, move |_| Ok(elements))
}
