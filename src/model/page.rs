//! Pages: a background plus an ordered list of elements.

use super::element::Element;
use crate::types::{ElementId, PageId};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Background {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// A canvas holding positioned elements. Owned by exactly one book.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub id: PageId,
    pub title: String,
    #[serde(default)]
    pub background: Background,
    /// Paint order; the inspector lists them by z-index instead.
    #[serde(default)]
    pub elements: Vec<Arc<Element>>,
}

impl Default for Page {
    fn default() -> Self {
        Self::new("Página 1")
    }
}

impl Page {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: PageId::new(),
            title: title.into(),
            background: Background {
                url: None,
                color: Some("#ffffff".to_string()),
            },
            elements: Vec::new(),
        }
    }

    pub fn with_id(mut self, id: PageId) -> Self {
        self.id = id;
        self
    }

    pub fn with_element(mut self, element: Element) -> Self {
        self.elements.push(Arc::new(element));
        self
    }

    pub fn element(&self, id: ElementId) -> Option<&Element> {
        self.elements.iter().find(|e| e.id == id).map(Arc::as_ref)
    }

    pub fn contains_element(&self, id: ElementId) -> bool {
        self.elements.iter().any(|e| e.id == id)
    }

    /// Elements ordered top-most first, as the layer panel shows them.
    pub fn layers(&self) -> Vec<Arc<Element>> {
        let mut layers = self.elements.clone();
        layers.sort_by(|a, b| b.geometry.z_index.cmp(&a.geometry.z_index));
        layers
    }
}

/// Shallow partial update of a page.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PagePatch {
    pub title: Option<String>,
    pub background: Option<Background>,
}

impl PagePatch {
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Default::default()
        }
    }

    pub fn apply(self, page: &mut Page) {
        if let Some(title) = self.title {
            page.title = title;
        }
        if let Some(background) = self.background {
            page.background = background;
        }
    }
}
