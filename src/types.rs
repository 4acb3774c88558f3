//! Core types shared by the model, the mutation layer and the store.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident, $tag:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Generate a fresh random id.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($tag, "({})"), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s).map(Self)
            }
        }
    };
}

entity_id!(
    /// Unique identifier for a book.
    BookId,
    "BookId"
);
entity_id!(
    /// Unique identifier for a page.
    PageId,
    "PageId"
);
entity_id!(
    /// Unique identifier for an element on a page.
    ElementId,
    "ElementId"
);
entity_id!(
    /// Unique identifier for an uploaded image in the asset library.
    AssetId,
    "AssetId"
);

/// Microseconds since Unix epoch.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(pub i64);

impl Timestamp {
    /// Current time.
    pub fn now() -> Self {
        let duration = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();
        Timestamp(duration.as_micros() as i64)
    }
}

impl fmt::Debug for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Timestamp({})", self.0)
    }
}

/// A 2D point or offset in page coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// The element currently chosen for editing, scoped to a page.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Selection {
    pub page_id: PageId,
    pub element_id: ElementId,
}

impl Selection {
    pub fn new(page_id: PageId, element_id: ElementId) -> Self {
        Self {
            page_id,
            element_id,
        }
    }
}

/// Editor mode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    View,
    #[default]
    Edit,
    Library,
}

impl Mode {
    /// Parse a mode name, falling back to [`Mode::Edit`] for anything unknown.
    pub fn from_name(name: &str) -> Self {
        name.parse().unwrap_or_default()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::View => "view",
            Mode::Edit => "edit",
            Mode::Library => "library",
        }
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "view" => Ok(Mode::View),
            "edit" => Ok(Mode::Edit),
            "library" => Ok(Mode::Library),
            other => Err(format!("unknown mode: {other}")),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An image in the asset library. Not part of the book tree.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedImage {
    pub id: AssetId,
    pub url: String,
}

/// Editor chrome state: mode, zoom, grid and ruler toggles, pan offset.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UiState {
    pub mode: Mode,
    pub zoom: f64,
    pub show_grid: bool,
    pub show_rulers: bool,
    pub offset: Point,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            mode: Mode::Edit,
            zoom: 1.0,
            show_grid: true,
            show_rulers: false,
            offset: Point::default(),
        }
    }
}

/// Transient pointer state that is never persisted. Selection lives with the
/// document so it can be re-resolved on every commit.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct InteractionState {
    pub is_panning: bool,
    pub pan_start: Option<Point>,
    pub space_pressed: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_unique() {
        let a = ElementId::new();
        let b = ElementId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn test_id_round_trips_through_string() {
        let id = BookId::new();
        let parsed: BookId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
        assert!("not-a-uuid".parse::<PageId>().is_err());
    }

    #[test]
    fn test_id_serializes_as_plain_string() {
        let id = PageId::new();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", id));
    }

    #[test]
    fn test_mode_from_name_falls_back_to_edit() {
        assert_eq!(Mode::from_name("view"), Mode::View);
        assert_eq!(Mode::from_name("library"), Mode::Library);
        assert_eq!(Mode::from_name("presentation"), Mode::Edit);
        assert_eq!(Mode::from_name(""), Mode::Edit);
    }

    #[test]
    fn test_ui_defaults() {
        let ui = UiState::default();
        assert_eq!(ui.mode, Mode::Edit);
        assert_eq!(ui.zoom, 1.0);
        assert!(ui.show_grid);
        assert!(!ui.show_rulers);
    }
}
