//! Books: the top-level containers of the document tree.

use super::page::Page;
use crate::types::{BookId, PageId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Free-form book metadata (author, paper type, default styles, ...).
pub type Attributes = BTreeMap<String, serde_json::Value>;

/// An ordered list of pages plus metadata.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Book {
    pub id: BookId,
    pub title: String,
    /// Reading order.
    #[serde(default)]
    pub pages: Vec<Arc<Page>>,
    #[serde(default)]
    pub attributes: Attributes,
    /// Opaque, carried through edits untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history: Option<serde_json::Value>,
    /// Opaque, carried through edits untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relationships: Option<serde_json::Value>,
}

impl Default for Book {
    fn default() -> Self {
        Self::new("Nuevo cuaderno")
    }
}

impl Book {
    /// An empty book with a fresh id.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: BookId::new(),
            title: title.into(),
            pages: Vec::new(),
            attributes: Attributes::new(),
            history: None,
            relationships: None,
        }
    }

    /// A new notebook the way the start menu creates one: default attributes
    /// and a single blank first page.
    pub fn notebook(title: impl Into<String>) -> Self {
        let mut book = Self::new(title);
        book.attributes
            .insert("author".to_string(), serde_json::json!("Autor"));
        book.attributes
            .insert("paperType".to_string(), serde_json::json!("plain"));
        book.with_page(Page::new("Página 1"))
    }

    pub fn with_id(mut self, id: BookId) -> Self {
        self.id = id;
        self
    }

    pub fn with_page(mut self, page: Page) -> Self {
        self.pages.push(Arc::new(page));
        self
    }

    pub fn page(&self, id: PageId) -> Option<&Page> {
        self.pages.iter().find(|p| p.id == id).map(Arc::as_ref)
    }

    pub fn contains_page(&self, id: PageId) -> bool {
        self.pages.iter().any(|p| p.id == id)
    }

    pub fn first_page_id(&self) -> Option<PageId> {
        self.pages.first().map(|p| p.id)
    }
}

/// Shallow partial update of a book. `attributes` replaces the whole map.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BookPatch {
    pub title: Option<String>,
    pub attributes: Option<Attributes>,
}

impl BookPatch {
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Default::default()
        }
    }

    pub fn apply(self, book: &mut Book) {
        if let Some(title) = self.title {
            book.title = title;
        }
        if let Some(attributes) = self.attributes {
            book.attributes = attributes;
        }
    }
}
