//! Drawable object model for the canvas.
//!
//! Objects live in a flat, ordered list — index order is layer order.
//! There is no scene graph and no containment: the canvas is a simple
//! stacking surface, like a paint program's layer list. Geometry is
//! stored as a top-left anchor (`left`, `top`) plus kind-specific shape
//! parameters.

/// Shape-specific parameters of a drawable object.
#[derive(Debug, Clone, PartialEq)]
pub enum ObjectKind {
    Rect { width: f32, height: f32 },
    Circle { radius: f32 },
    Ellipse { rx: f32, ry: f32 },
    Text { content: String, font_size: f32 },
}

impl ObjectKind {
    /// Lowercase type tag used in snapshots and for display ("rect", "circle", ...).
    pub fn type_name(&self) -> &'static str {
        match self {
            ObjectKind::Rect { .. } => "rect",
            ObjectKind::Circle { .. } => "circle",
            ObjectKind::Ellipse { .. } => "ellipse",
            ObjectKind::Text { .. } => "text",
        }
    }
}

/// A single drawable element on the canvas.
///
/// `selectable`, `editable`, `id`, and `name` are the custom properties
/// carried through snapshots when tracked (see
/// [`TrackedProperty`](crate::serialize::TrackedProperty)). Base geometry
/// and appearance are always serialized.
#[derive(Debug, Clone, PartialEq)]
pub struct CanvasObject {
    pub kind: ObjectKind,
    /// X of the bounding-box top-left corner.
    pub left: f32,
    /// Y of the bounding-box top-left corner.
    pub top: f32,
    /// Fill as a CSS color string ("red", "#00FF00", ...). Not interpreted here.
    pub fill: String,
    /// Rotation in degrees.
    pub angle: f32,
    /// Horizontal skew in degrees.
    pub skew_x: f32,
    /// Vertical skew in degrees.
    pub skew_y: f32,
    /// Whether the object can be selected by UI tools.
    pub selectable: bool,
    /// Whether the object's content can be edited in place (text objects).
    pub editable: bool,
    /// Optional stable identifier (e.g. carried over from an SVG `id` attribute).
    pub id: Option<String>,
    /// Optional human-readable title shown in layer lists.
    pub name: Option<String>,
}

impl CanvasObject {
    pub fn new(kind: ObjectKind, left: f32, top: f32, fill: impl Into<String>) -> Self {
        Self {
            kind,
            left,
            top,
            fill: fill.into(),
            angle: 0.0,
            skew_x: 0.0,
            skew_y: 0.0,
            selectable: true,
            editable: true,
            id: None,
            name: None,
        }
    }

    pub fn rect(left: f32, top: f32, width: f32, height: f32, fill: impl Into<String>) -> Self {
        Self::new(ObjectKind::Rect { width, height }, left, top, fill)
    }

    pub fn circle(left: f32, top: f32, radius: f32, fill: impl Into<String>) -> Self {
        Self::new(ObjectKind::Circle { radius }, left, top, fill)
    }

    pub fn ellipse(left: f32, top: f32, rx: f32, ry: f32, fill: impl Into<String>) -> Self {
        Self::new(ObjectKind::Ellipse { rx, ry }, left, top, fill)
    }

    pub fn text(left: f32, top: f32, content: impl Into<String>, font_size: f32) -> Self {
        Self::new(
            ObjectKind::Text {
                content: content.into(),
                font_size,
            },
            left,
            top,
            "black",
        )
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Bounding-box size `(width, height)` ignoring rotation and skew.
    pub fn bounds(&self) -> (f32, f32) {
        match &self.kind {
            ObjectKind::Rect { width, height } => (*width, *height),
            ObjectKind::Circle { radius } => (radius * 2.0, radius * 2.0),
            ObjectKind::Ellipse { rx, ry } => (rx * 2.0, ry * 2.0),
            // Text extent depends on font metrics, which live in the
            // renderer. Approximate with a per-glyph advance.
            ObjectKind::Text { content, font_size } => {
                (content.chars().count() as f32 * font_size * 0.6, *font_size)
            }
        }
    }
}
