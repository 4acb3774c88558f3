//! Alignment and distribution of elements within the page bounds.

use crate::model::{Element, ElementPatch};
use crate::types::ElementId;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Where to snap an element against the page edges.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Alignment {
    Left,
    CenterX,
    Right,
    Top,
    CenterY,
    Bottom,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    Horizontal,
    Vertical,
}

impl Axis {
    fn position(self, element: &Element) -> f64 {
        match self {
            Axis::Horizontal => element.geometry.x,
            Axis::Vertical => element.geometry.y,
        }
    }

    fn extent(self, element: &Element) -> f64 {
        match self {
            Axis::Horizontal => element.geometry.width,
            Axis::Vertical => element.geometry.height,
        }
    }
}

/// Page size and the padding kept free along its edges.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PageBounds {
    pub width: f64,
    pub height: f64,
    pub padding: f64,
}

impl Default for PageBounds {
    fn default() -> Self {
        Self {
            width: 560.0,
            height: 760.0,
            padding: 24.0,
        }
    }
}

impl PageBounds {
    /// Patch moving `element` to the requested edge or center line.
    pub fn align(&self, element: &Element, alignment: Alignment) -> ElementPatch {
        let g = &element.geometry;
        let patch = ElementPatch::new();
        match alignment {
            Alignment::Left => patch.x(self.padding),
            Alignment::CenterX => patch.x((self.width - g.width) / 2.0),
            Alignment::Right => patch.x(self.width - g.width - self.padding),
            Alignment::Top => patch.y(self.padding),
            Alignment::CenterY => patch.y((self.height - g.height) / 2.0),
            Alignment::Bottom => patch.y(self.height - g.height - self.padding),
        }
    }

    /// New positions spreading the visible elements evenly along `axis`
    /// between the padded edges, keeping their current order on that axis.
    ///
    /// Returns an empty list when fewer than two elements are visible.
    pub fn distribute(&self, elements: &[Arc<Element>], axis: Axis) -> Vec<(ElementId, f64)> {
        let mut visible: Vec<&Element> = elements
            .iter()
            .filter(|e| e.visible)
            .map(Arc::as_ref)
            .collect();
        if visible.len() < 2 {
            return Vec::new();
        }

        visible.sort_by(|a, b| axis.position(a).total_cmp(&axis.position(b)));

        let start = self.padding;
        let end = match axis {
            Axis::Horizontal => self.width - self.padding,
            Axis::Vertical => self.height - self.padding,
        };
        let total: f64 = visible.iter().map(|e| axis.extent(e)).sum();
        let gap = (end - start - total) / (visible.len() - 1) as f64;

        let mut cursor = start;
        visible
            .into_iter()
            .map(|e| {
                let at = cursor;
                cursor += axis.extent(e) + gap;
                (e.id, at)
            })
            .collect()
    }
}
