//! Text and image elements positioned on a page.

use crate::types::{ElementId, Point};
use serde::{Deserialize, Serialize};

/// What an element renders.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementKind {
    #[default]
    Text,
    Image,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
    Justify,
}

/// Position, size and stacking order in page coordinates.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub rotation: f64,
    pub z_index: i32,
}

impl Default for Geometry {
    fn default() -> Self {
        Self {
            x: 120.0,
            y: 140.0,
            width: 260.0,
            height: 140.0,
            rotation: 0.0,
            z_index: 1,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Font {
    pub family: String,
    pub size: f64,
    pub weight: u16,
    pub align: TextAlign,
    pub letter_spacing: f64,
    pub line_height: f64,
}

impl Default for Font {
    fn default() -> Self {
        Self {
            family: "'Sue Ellen Francisco', cursive".to_string(),
            size: 26.0,
            weight: 500,
            align: TextAlign::Left,
            letter_spacing: 0.0,
            line_height: 1.4,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Border {
    pub width: f64,
    pub color: String,
    pub radius: f64,
}

impl Default for Border {
    fn default() -> Self {
        Self {
            width: 0.0,
            color: "transparent".to_string(),
            radius: 8.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Shadow {
    pub enabled: bool,
    pub offset_x: f64,
    pub offset_y: f64,
    pub blur: f64,
    pub color: String,
}

impl Default for Shadow {
    fn default() -> Self {
        Self {
            enabled: false,
            offset_x: 2.0,
            offset_y: 2.0,
            blur: 6.0,
            color: "rgba(0,0,0,0.35)".to_string(),
        }
    }
}

/// CSS-style image filters, in percent.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Filters {
    pub brightness: f64,
    pub contrast: f64,
    pub saturate: f64,
}

impl Default for Filters {
    fn default() -> Self {
        Self {
            brightness: 100.0,
            contrast: 100.0,
            saturate: 100.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Style {
    pub color: String,
    pub background: String,
    pub font: Font,
    pub opacity: f64,
    pub border: Border,
    pub shadow: Shadow,
    pub filters: Filters,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            color: "#1f1f1f".to_string(),
            background: "transparent".to_string(),
            font: Font::default(),
            opacity: 1.0,
            border: Border::default(),
            shadow: Shadow::default(),
            filters: Filters::default(),
        }
    }
}

/// A positioned text or image node on a page.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub id: ElementId,
    pub kind: ElementKind,
    /// Text for text elements, image URL for image elements.
    pub content: String,
    /// Layer name shown in the inspector.
    pub name: String,
    #[serde(default)]
    pub geometry: Geometry,
    #[serde(default)]
    pub style: Style,
    #[serde(default = "default_true")]
    pub visible: bool,
    #[serde(default)]
    pub locked: bool,
}

fn default_true() -> bool {
    true
}

impl Default for Element {
    fn default() -> Self {
        Self::text("Escribe algo creativo aquí")
    }
}

impl Element {
    /// A text element with the editor's default styling.
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            id: ElementId::new(),
            kind: ElementKind::Text,
            content: content.into(),
            name: "Texto".to_string(),
            geometry: Geometry::default(),
            style: Style::default(),
            visible: true,
            locked: false,
        }
    }

    /// An image element showing `url`.
    pub fn image(url: impl Into<String>) -> Self {
        Self {
            kind: ElementKind::Image,
            name: "Imagen".to_string(),
            geometry: Geometry {
                width: 320.0,
                height: 240.0,
                ..Geometry::default()
            },
            ..Self::text(url)
        }
    }

    /// A text element sized and weighted for one of the toolbar presets.
    pub fn preset(preset: TextPreset) -> Self {
        let (name, size, weight, height) = match preset {
            TextPreset::Title => ("Título", 44.0, 700, 120.0),
            TextPreset::Subtitle => ("Subtítulo", 32.0, 600, 100.0),
            TextPreset::Body => ("Cuerpo", 20.0, 500, 160.0),
        };
        let mut element = Self::text("Escribe algo creativo aquí");
        element.name = name.to_string();
        element.style.font.size = size;
        element.style.font.weight = weight;
        element.geometry.width = 420.0;
        element.geometry.height = height;
        element
    }

    /// Same element with a different id.
    pub fn with_id(mut self, id: ElementId) -> Self {
        self.id = id;
        self
    }

    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.geometry.x = x;
        self.geometry.y = y;
        self
    }

    pub fn position(&self) -> Point {
        Point::new(self.geometry.x, self.geometry.y)
    }
}

/// Text presets offered by the toolbar.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextPreset {
    Title,
    Subtitle,
    Body,
}

/// Partial update of an element's style. `Some` fields replace, `None` fields keep.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StylePatch {
    pub color: Option<String>,
    pub background: Option<String>,
    pub font_family: Option<String>,
    pub font_size: Option<f64>,
    pub font_weight: Option<u16>,
    pub align: Option<TextAlign>,
    pub letter_spacing: Option<f64>,
    pub line_height: Option<f64>,
    pub opacity: Option<f64>,
    pub border: Option<Border>,
    pub shadow: Option<Shadow>,
    pub filters: Option<Filters>,
}

impl StylePatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    fn apply(self, style: &mut Style) {
        if let Some(v) = self.color {
            style.color = v;
        }
        if let Some(v) = self.background {
            style.background = v;
        }
        if let Some(v) = self.font_family {
            style.font.family = v;
        }
        if let Some(v) = self.font_size {
            style.font.size = v;
        }
        if let Some(v) = self.font_weight {
            style.font.weight = v;
        }
        if let Some(v) = self.align {
            style.font.align = v;
        }
        if let Some(v) = self.letter_spacing {
            style.font.letter_spacing = v;
        }
        if let Some(v) = self.line_height {
            style.font.line_height = v;
        }
        if let Some(v) = self.opacity {
            style.opacity = v;
        }
        if let Some(v) = self.border {
            style.border = v;
        }
        if let Some(v) = self.shadow {
            style.shadow = v;
        }
        if let Some(v) = self.filters {
            style.filters = v;
        }
    }
}

/// Shallow partial update of an element. The id is never patched.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElementPatch {
    pub kind: Option<ElementKind>,
    pub content: Option<String>,
    pub name: Option<String>,
    pub visible: Option<bool>,
    pub locked: Option<bool>,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub rotation: Option<f64>,
    pub z_index: Option<i32>,
    pub style: StylePatch,
}

impl ElementPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn visible(mut self, visible: bool) -> Self {
        self.visible = Some(visible);
        self
    }

    pub fn locked(mut self, locked: bool) -> Self {
        self.locked = Some(locked);
        self
    }

    pub fn x(mut self, x: f64) -> Self {
        self.x = Some(x);
        self
    }

    pub fn y(mut self, y: f64) -> Self {
        self.y = Some(y);
        self
    }

    pub fn size(mut self, width: f64, height: f64) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    pub fn rotation(mut self, rotation: f64) -> Self {
        self.rotation = Some(rotation);
        self
    }

    pub fn z_index(mut self, z_index: i32) -> Self {
        self.z_index = Some(z_index);
        self
    }

    pub fn style(mut self, style: StylePatch) -> Self {
        self.style = style;
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Merge this patch into `element`.
    pub fn apply(self, element: &mut Element) {
        if let Some(v) = self.kind {
            element.kind = v;
        }
        if let Some(v) = self.content {
            element.content = v;
        }
        if let Some(v) = self.name {
            element.name = v;
        }
        if let Some(v) = self.visible {
            element.visible = v;
        }
        if let Some(v) = self.locked {
            element.locked = v;
        }
        let geometry = &mut element.geometry;
        if let Some(v) = self.x {
            geometry.x = v;
        }
        if let Some(v) = self.y {
            geometry.y = v;
        }
        if let Some(v) = self.width {
            geometry.width = v;
        }
        if let Some(v) = self.height {
            geometry.height = v;
        }
        if let Some(v) = self.rotation {
            geometry.rotation = v;
        }
        if let Some(v) = self.z_index {
            geometry.z_index = v;
        }
        self.style.apply(&mut element.style);
    }
}

/// An element update: either a literal patch or a patch computed from the
/// element's current value (e.g. bumping its z-index).
pub enum ElementUpdate {
    Patch(ElementPatch),
    With(Box<dyn FnOnce(&Element) -> ElementPatch>),
}

impl ElementUpdate {
    pub fn with<F>(f: F) -> Self
    where
        F: FnOnce(&Element) -> ElementPatch + 'static,
    {
        ElementUpdate::With(Box::new(f))
    }

    /// Resolve to a concrete patch against the element's current value.
    pub fn resolve(self, current: &Element) -> ElementPatch {
        match self {
            ElementUpdate::Patch(patch) => patch,
            ElementUpdate::With(f) => f(current),
        }
    }
}

impl From<ElementPatch> for ElementUpdate {
    fn from(patch: ElementPatch) -> Self {
        ElementUpdate::Patch(patch)
    }
}

impl std::fmt::Debug for ElementUpdate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ElementUpdate::Patch(patch) => f.debug_tuple("Patch").field(patch).finish(),
            ElementUpdate::With(_) => f.write_str("With(<fn>)"),
        }
    }
}
