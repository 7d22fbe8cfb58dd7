//! Snapshot serialization: canvas content ⇄ JSON string.
//!
//! A [`Snapshot`] is the full canvas content captured as one JSON
//! document — opaque to callers and immutable once taken. Base geometry
//! and appearance are always included; the four custom properties
//! (`selectable`, `editable`, `id`, `name`) are included only when named
//! in the [`TrackedProperties`] set, so observers that don't care about
//! them get smaller snapshots.

use crate::canvas::Canvas;
use crate::model::{CanvasObject, ObjectKind};
use serde::{Deserialize, Serialize};
use smallvec::{SmallVec, smallvec};

/// Serialized full-state capture of canvas content at one instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot(String);

impl Snapshot {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl From<String> for Snapshot {
    fn from(s: String) -> Self {
        Snapshot(s)
    }
}

/// Custom object properties that may be carried through snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackedProperty {
    Selectable,
    Editable,
    Id,
    Name,
}

/// The set of custom properties included when snapshotting.
pub type TrackedProperties = SmallVec<[TrackedProperty; 4]>;

/// The default tracked set: all four custom properties.
pub fn default_tracked_properties() -> TrackedProperties {
    smallvec![
        TrackedProperty::Selectable,
        TrackedProperty::Editable,
        TrackedProperty::Id,
        TrackedProperty::Name,
    ]
}

// ─── Wire format ─────────────────────────────────────────────────────────

/// Flat per-object wire record. Kind-specific fields are optional so every
/// object type shares one record shape, keyed by `type`.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireObject {
    #[serde(rename = "type")]
    kind: String,
    left: f32,
    top: f32,
    fill: String,
    #[serde(default, skip_serializing_if = "is_zero")]
    angle: f32,
    #[serde(default, skip_serializing_if = "is_zero")]
    skew_x: f32,
    #[serde(default, skip_serializing_if = "is_zero")]
    skew_y: f32,

    // Kind-specific geometry/content.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    width: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    height: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    radius: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    rx: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    ry: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    font_size: Option<f32>,

    // Custom properties, present only when tracked.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    selectable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    editable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
}

fn is_zero(v: &f32) -> bool {
    *v == 0.0
}

#[derive(Debug, Serialize, Deserialize)]
struct WireCanvas {
    version: String,
    background: String,
    objects: Vec<WireObject>,
}

fn to_wire(object: &CanvasObject, tracked: &TrackedProperties) -> WireObject {
    let mut wire = WireObject {
        kind: object.kind.type_name().to_string(),
        left: object.left,
        top: object.top,
        fill: object.fill.clone(),
        angle: object.angle,
        skew_x: object.skew_x,
        skew_y: object.skew_y,
        width: None,
        height: None,
        radius: None,
        rx: None,
        ry: None,
        text: None,
        font_size: None,
        selectable: None,
        editable: None,
        id: None,
        name: None,
    };
    match &object.kind {
        ObjectKind::Rect { width, height } => {
            wire.width = Some(*width);
            wire.height = Some(*height);
        }
        ObjectKind::Circle { radius } => wire.radius = Some(*radius),
        ObjectKind::Ellipse { rx, ry } => {
            wire.rx = Some(*rx);
            wire.ry = Some(*ry);
        }
        ObjectKind::Text { content, font_size } => {
            wire.text = Some(content.clone());
            wire.font_size = Some(*font_size);
        }
    }
    for prop in tracked {
        match prop {
            TrackedProperty::Selectable => wire.selectable = Some(object.selectable),
            TrackedProperty::Editable => wire.editable = Some(object.editable),
            TrackedProperty::Id => wire.id = object.id.clone(),
            TrackedProperty::Name => wire.name = object.name.clone(),
        }
    }
    wire
}

fn from_wire(wire: WireObject) -> Result<CanvasObject, String> {
    let kind = match wire.kind.as_str() {
        "rect" => ObjectKind::Rect {
            width: wire.width.ok_or("rect object missing width")?,
            height: wire.height.ok_or("rect object missing height")?,
        },
        "circle" => ObjectKind::Circle {
            radius: wire.radius.ok_or("circle object missing radius")?,
        },
        "ellipse" => ObjectKind::Ellipse {
            rx: wire.rx.ok_or("ellipse object missing rx")?,
            ry: wire.ry.ok_or("ellipse object missing ry")?,
        },
        "text" => ObjectKind::Text {
            content: wire.text.ok_or("text object missing text")?,
            font_size: wire.font_size.unwrap_or(16.0),
        },
        other => return Err(format!("unknown object type \"{other}\"")),
    };
    Ok(CanvasObject {
        kind,
        left: wire.left,
        top: wire.top,
        fill: wire.fill,
        angle: wire.angle,
        skew_x: wire.skew_x,
        skew_y: wire.skew_y,
        selectable: wire.selectable.unwrap_or(true),
        editable: wire.editable.unwrap_or(true),
        id: wire.id,
        name: wire.name,
    })
}

impl Canvas {
    /// Serialize the current content to a [`Snapshot`], including the named
    /// custom properties and nothing transient (no subscriber state, no
    /// dimensions — "dataless" in the sense of content-only).
    pub fn to_dataless_json(&self, tracked: &TrackedProperties) -> Result<Snapshot, String> {
        let doc = WireCanvas {
            version: env!("CARGO_PKG_VERSION").to_string(),
            background: self.background().to_string(),
            objects: self
                .objects()
                .iter()
                .map(|obj| to_wire(obj, tracked))
                .collect(),
        };
        serde_json::to_string(&doc)
            .map(Snapshot::from)
            .map_err(|err| format!("snapshot serialization failed: {err}"))
    }

    /// Replace the entire canvas content from a snapshot.
    ///
    /// On success the previous content is gone and one `ObjectAdded` event
    /// fires per restored object. A malformed snapshot leaves the canvas
    /// untouched and returns `Err`.
    pub fn load_from_json(&mut self, snapshot: &Snapshot) -> Result<(), String> {
        let doc: WireCanvas = serde_json::from_str(snapshot.as_str())
            .map_err(|err| format!("malformed snapshot: {err}"))?;
        let objects = doc
            .objects
            .into_iter()
            .map(from_wire)
            .collect::<Result<Vec<_>, _>>()?;
        self.set_background(doc.background);
        self.replace_objects(objects);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventKind;
    use pretty_assertions::assert_eq;
    use smallvec::smallvec;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn demo_canvas() -> Canvas {
        let mut canvas = Canvas::new(800.0, 400.0);
        canvas.set_background("lightgray");
        canvas.add(CanvasObject::circle(200.0, 100.0, 50.0, "red").with_name("Sun"));
        canvas.add(CanvasObject::rect(300.0, 200.0, 50.0, 100.0, "green").with_id("tower"));
        canvas
    }

    #[test]
    fn tracked_properties_filter_custom_fields() {
        let canvas = demo_canvas();

        let full = canvas.to_dataless_json(&default_tracked_properties()).unwrap();
        assert!(full.as_str().contains("\"name\":\"Sun\""));
        assert!(full.as_str().contains("\"id\":\"tower\""));
        assert!(full.as_str().contains("\"selectable\":true"));

        let bare = canvas.to_dataless_json(&smallvec![]).unwrap();
        assert!(!bare.as_str().contains("selectable"));
        assert!(!bare.as_str().contains("\"name\""));
        assert!(bare.as_str().contains("\"fill\":\"red\""));
    }

    #[test]
    fn load_replaces_content_and_echoes_added() {
        let canvas = demo_canvas();
        let snapshot = canvas.to_dataless_json(&default_tracked_properties()).unwrap();

        let mut other = Canvas::new(800.0, 400.0);
        other.add(CanvasObject::text(0.0, 0.0, "scratch", 12.0));

        let added = Rc::new(RefCell::new(0usize));
        let sink = Rc::clone(&added);
        other.on(&[EventKind::ObjectAdded], move |_, _| {
            *sink.borrow_mut() += 1;
        });

        other.load_from_json(&snapshot).unwrap();
        assert_eq!(other.len(), 2);
        assert_eq!(other.background(), "lightgray");
        assert_eq!(*added.borrow(), 2);
        assert_eq!(other.get(1).unwrap().id.as_deref(), Some("tower"));
    }

    #[test]
    fn roundtrip_preserves_objects_exactly() {
        let canvas = demo_canvas();
        let snapshot = canvas.to_dataless_json(&default_tracked_properties()).unwrap();

        let mut restored = Canvas::new(800.0, 400.0);
        restored.load_from_json(&snapshot).unwrap();
        assert_eq!(restored.objects(), canvas.objects());
    }

    #[test]
    fn untracked_custom_props_fall_back_to_defaults() {
        let mut canvas = Canvas::new(100.0, 100.0);
        let mut obj = CanvasObject::rect(0.0, 0.0, 10.0, 10.0, "blue").with_name("Box");
        obj.selectable = false;
        canvas.add(obj);

        // Snapshot without tracking: selectable/name are not carried.
        let snapshot = canvas.to_dataless_json(&smallvec![]).unwrap();
        let mut restored = Canvas::new(100.0, 100.0);
        restored.load_from_json(&snapshot).unwrap();

        let restored_obj = restored.get(0).unwrap();
        assert!(restored_obj.selectable);
        assert_eq!(restored_obj.name, None);
    }

    #[test]
    fn malformed_snapshot_is_an_error_and_leaves_canvas_alone() {
        let mut canvas = demo_canvas();
        let err = canvas
            .load_from_json(&Snapshot::from("not json".to_string()))
            .unwrap_err();
        assert!(err.contains("malformed snapshot"));
        assert_eq!(canvas.len(), 2);

        // Structurally valid JSON with a broken object is also rejected.
        let bad = Snapshot::from(
            r#"{"version":"0","background":"white","objects":[{"type":"rect","left":0,"top":0,"fill":"red"}]}"#
                .to_string(),
        );
        let err = canvas.load_from_json(&bad).unwrap_err();
        assert!(err.contains("missing width"));
        assert_eq!(canvas.len(), 2);
    }
}
