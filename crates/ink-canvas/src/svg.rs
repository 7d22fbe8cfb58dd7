//! SVG subset import/export.
//!
//! Built on `winnow` 0.7. Imports the shape subset a drawing session
//! round-trips through: an `<svg>` root with optional `width`/`height`/
//! `viewBox`, containing `<rect>`, `<circle>`, and `<ellipse>` elements
//! with geometry, `fill`, and `id` attributes. Unknown elements, comments,
//! and the XML prolog are skipped. Export emits a standalone SVG document
//! that re-imports to the same object list.

use crate::canvas::Canvas;
use crate::model::{CanvasObject, ObjectKind};
use std::fmt::Write;
use winnow::combinator::delimited;
use winnow::error::{ContextError, ErrMode};
use winnow::prelude::*;
use winnow::token::{take_till, take_while};

/// Consume optional whitespace (concrete error type avoids inference issues).
fn skip_ws(input: &mut &str) {
    use winnow::ascii::multispace0;
    let _: Result<&str, ErrMode<ContextError>> = multispace0.parse_next(input);
}

/// Parse an SVG document and add every recognized shape to the canvas
/// (each addition emits `ObjectAdded`, so an import is recorded by history
/// as one mutation per shape). Returns the number of shapes imported.
pub fn import_svg(canvas: &mut Canvas, input: &str) -> Result<usize, String> {
    let mut rest = input;
    skip_to_tag(&mut rest, "svg").ok_or_else(|| "no <svg> root element found".to_string())?;
    let root = parse_element
        .parse_next(&mut rest)
        .map_err(|e| format!("SVG root parse error: {e}"))?;
    if root.name != "svg" {
        return Err(format!("expected <svg> root, found <{}>", root.name));
    }

    let mut imported = 0;
    loop {
        skip_ws(&mut rest);
        if rest.is_empty() || rest.starts_with("</svg") {
            break;
        }
        if rest.starts_with("<!--") {
            skip_comment(&mut rest);
            continue;
        }
        if !rest.starts_with('<') {
            // Stray text content — skip to the next tag.
            match rest.find('<') {
                Some(pos) => rest = &rest[pos..],
                None => break,
            }
            continue;
        }
        let element = parse_element
            .parse_next(&mut rest)
            .map_err(|e| format!("SVG element parse error: {e}"))?;
        let recognized = shape_from_element(&element)?;
        if !element.self_closing {
            skip_subtree(&mut rest, element.name);
        }
        if let Some(object) = recognized {
            log::debug!("svg import: {} at index {}", object.kind.type_name(), canvas.len());
            canvas.add(object);
            imported += 1;
        }
    }
    Ok(imported)
}

/// Emit the canvas as a standalone SVG document.
pub fn export_svg(canvas: &Canvas) -> String {
    let mut out = String::with_capacity(256);
    let _ = write!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
        w = canvas.width(),
        h = canvas.height(),
    );
    out.push('\n');
    for object in canvas.objects() {
        emit_object(&mut out, object);
    }
    out.push_str("</svg>\n");
    out
}

// ─── Element parser ─────────────────────────────────────────────────────

#[derive(Debug)]
struct Element<'a> {
    name: &'a str,
    attrs: Vec<(&'a str, &'a str)>,
    self_closing: bool,
}

impl Element<'_> {
    fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| *v)
    }

    fn number(&self, name: &str) -> Result<f32, String> {
        let raw = self
            .attr(name)
            .ok_or_else(|| format!("<{}> missing attribute \"{name}\"", self.name))?;
        parse_length(raw)
            .ok_or_else(|| format!("<{}> has invalid {name}=\"{raw}\"", self.name))
    }
}

/// Parse a numeric attribute value, tolerating a `px` suffix.
fn parse_length(raw: &str) -> Option<f32> {
    raw.trim().trim_end_matches("px").parse::<f32>().ok()
}

/// Advance past the prolog, doctype, and comments to the opening `<name` tag.
/// Leaves the input positioned at the `<`.
fn skip_to_tag(input: &mut &str, name: &str) -> Option<()> {
    loop {
        let pos = input.find('<')?;
        *input = &input[pos..];
        if input.starts_with("<!--") {
            skip_comment(input);
            continue;
        }
        if input.starts_with("<?") || input.starts_with("<!") {
            let end = input.find('>')?;
            *input = &input[end + 1..];
            continue;
        }
        let rest = &input[1..];
        if rest.starts_with(name) {
            return Some(());
        }
        // Some other element before the one we want — not a valid prolog.
        return None;
    }
}

fn skip_comment(input: &mut &str) {
    match input.find("-->") {
        Some(end) => *input = &input[end + 3..],
        None => *input = "",
    }
}

/// Skip a non-self-closing element's content up to and past `</name>`.
/// Nested same-name elements are not handled; the imported subset never
/// nests shapes.
fn skip_subtree(input: &mut &str, name: &str) {
    let close = format!("</{name}");
    match input.find(&close) {
        Some(pos) => {
            *input = &input[pos..];
            match input.find('>') {
                Some(end) => *input = &input[end + 1..],
                None => *input = "",
            }
        }
        None => *input = "",
    }
}

fn parse_name<'a>(input: &mut &'a str) -> ModalResult<&'a str> {
    take_while(1.., |c: char| {
        c.is_alphanumeric() || c == '-' || c == '_' || c == ':'
    })
    .parse_next(input)
}

fn parse_attribute<'a>(input: &mut &'a str) -> ModalResult<(&'a str, &'a str)> {
    let name = parse_name.parse_next(input)?;
    skip_ws(input);
    let _ = '='.parse_next(input)?;
    skip_ws(input);
    let value = if input.starts_with('\'') {
        delimited('\'', take_till(0.., '\''), '\'').parse_next(input)?
    } else {
        delimited('"', take_till(0.., '"'), '"').parse_next(input)?
    };
    Ok((name, value))
}

/// Parse one opening tag: `<name attr="v" ...>` or `<name ... />`.
fn parse_element<'a>(input: &mut &'a str) -> ModalResult<Element<'a>> {
    let _ = '<'.parse_next(input)?;
    let name = parse_name.parse_next(input)?;
    let mut attrs = Vec::new();

    loop {
        skip_ws(input);
        if input.starts_with("/>") {
            *input = &input[2..];
            return Ok(Element {
                name,
                attrs,
                self_closing: true,
            });
        }
        if input.starts_with('>') {
            *input = &input[1..];
            return Ok(Element {
                name,
                attrs,
                self_closing: false,
            });
        }
        if input.is_empty() {
            return Err(ErrMode::Backtrack(ContextError::new()));
        }
        attrs.push(parse_attribute.parse_next(input)?);
    }
}

/// Map a parsed element to a canvas object, or `None` for unrecognized
/// element names. SVG's default fill is black when the attribute is absent.
fn shape_from_element(element: &Element<'_>) -> Result<Option<CanvasObject>, String> {
    let fill = element.attr("fill").unwrap_or("black");
    let object = match element.name {
        "rect" => {
            let mut obj = CanvasObject::rect(
                element.number("x")?,
                element.number("y")?,
                element.number("width")?,
                element.number("height")?,
                fill,
            );
            obj.id = element.attr("id").map(str::to_string);
            obj
        }
        "circle" => {
            let r = element.number("r")?;
            let mut obj = CanvasObject::circle(
                element.number("cx")? - r,
                element.number("cy")? - r,
                r,
                fill,
            );
            obj.id = element.attr("id").map(str::to_string);
            obj
        }
        "ellipse" => {
            let rx = element.number("rx")?;
            let ry = element.number("ry")?;
            let mut obj = CanvasObject::ellipse(
                element.number("cx")? - rx,
                element.number("cy")? - ry,
                rx,
                ry,
                fill,
            );
            obj.id = element.attr("id").map(str::to_string);
            obj
        }
        _ => return Ok(None),
    };
    Ok(Some(object))
}

// ─── Emitter ─────────────────────────────────────────────────────────────

fn emit_object(out: &mut String, object: &CanvasObject) {
    out.push_str("  ");
    match &object.kind {
        ObjectKind::Rect { width, height } => {
            let _ = write!(
                out,
                r#"<rect x="{}" y="{}" width="{width}" height="{height}""#,
                object.left, object.top,
            );
        }
        ObjectKind::Circle { radius } => {
            let _ = write!(
                out,
                r#"<circle cx="{}" cy="{}" r="{radius}""#,
                object.left + radius,
                object.top + radius,
            );
        }
        ObjectKind::Ellipse { rx, ry } => {
            let _ = write!(
                out,
                r#"<ellipse cx="{}" cy="{}" rx="{rx}" ry="{ry}""#,
                object.left + rx,
                object.top + ry,
            );
        }
        ObjectKind::Text { content, font_size } => {
            let _ = write!(
                out,
                r#"<text x="{}" y="{}" font-size="{font_size}" fill="{}">{}</text>"#,
                object.left,
                object.top + font_size,
                object.fill,
                escape_text(content),
            );
            out.push('\n');
            return;
        }
    }
    let _ = write!(out, r#" fill="{}""#, object.fill);
    if let Some(id) = &object.id {
        let _ = write!(out, r#" id="{id}""#);
    }
    if object.angle != 0.0 || object.skew_x != 0.0 || object.skew_y != 0.0 {
        out.push_str(" transform=\"");
        let mut first = true;
        for (func, value) in [
            ("rotate", object.angle),
            ("skewX", object.skew_x),
            ("skewY", object.skew_y),
        ] {
            if value != 0.0 {
                if !first {
                    out.push(' ');
                }
                let _ = write!(out, "{func}({value})");
                first = false;
            }
        }
        out.push('"');
    }
    out.push_str("/>\n");
}

fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    // Two absolutely-positioned rects with ids, as a design tool exports them.
    const DEMO_SVG: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" width="1080" height="1080" viewBox="0 0 1080 1080">
        <rect id="MAIN_000_CONTAIN" x="60" y="125" width="30" height="200" fill="blue"/>
        <rect id="MAIN_001" x="520" y="50" width="360" height="425" fill="yellow"/>
      </svg>"#;

    #[test]
    fn imports_demo_fixture() {
        let mut canvas = Canvas::new(1080.0, 1080.0);
        let imported = import_svg(&mut canvas, DEMO_SVG).unwrap();
        assert_eq!(imported, 2);
        assert_eq!(canvas.len(), 2);

        let first = canvas.get(0).unwrap();
        assert_eq!(first.id.as_deref(), Some("MAIN_000_CONTAIN"));
        assert_eq!(first.left, 60.0);
        assert_eq!(first.top, 125.0);
        assert_eq!(first.fill, "blue");
        assert_eq!(first.kind, ObjectKind::Rect { width: 30.0, height: 200.0 });
    }

    #[test]
    fn circle_center_converts_to_top_left() {
        let mut canvas = Canvas::new(100.0, 100.0);
        import_svg(&mut canvas, r#"<svg><circle cx="50" cy="40" r="10" fill="red"/></svg>"#)
            .unwrap();
        let obj = canvas.get(0).unwrap();
        assert_eq!(obj.left, 40.0);
        assert_eq!(obj.top, 30.0);
        assert_eq!(obj.kind, ObjectKind::Circle { radius: 10.0 });
    }

    #[test]
    fn prolog_comments_and_unknown_elements_are_skipped() {
        let input = r#"<?xml version="1.0"?>
<!-- header -->
<svg width="10px" height="10px">
  <!-- a note -->
  <g fill="none"><path d="M0 0"/></g>
  <defs><clipPath id="c"/></defs>
  <ellipse cx="5" cy="5" rx="4" ry="2"/>
</svg>"#;
        let mut canvas = Canvas::new(10.0, 10.0);
        let imported = import_svg(&mut canvas, input).unwrap();
        assert_eq!(imported, 1);
        assert_eq!(canvas.get(0).unwrap().kind, ObjectKind::Ellipse { rx: 4.0, ry: 2.0 });
        // Absent fill falls back to SVG's default.
        assert_eq!(canvas.get(0).unwrap().fill, "black");
    }

    #[test]
    fn missing_root_and_bad_geometry_are_errors() {
        let mut canvas = Canvas::new(10.0, 10.0);
        assert!(import_svg(&mut canvas, "just text").is_err());
        let err =
            import_svg(&mut canvas, r#"<svg><rect x="a" y="0" width="1" height="1"/></svg>"#)
                .unwrap_err();
        assert!(err.contains("invalid x"));
    }

    #[test]
    fn export_reimports_to_same_shapes() {
        let mut canvas = Canvas::new(200.0, 100.0);
        canvas.add(CanvasObject::rect(10.0, 20.0, 30.0, 40.0, "green").with_id("r1"));
        canvas.add(CanvasObject::circle(50.0, 60.0, 15.0, "red"));

        let svg = export_svg(&canvas);
        assert!(svg.contains(r#"id="r1""#));

        let mut reimported = Canvas::new(200.0, 100.0);
        import_svg(&mut reimported, &svg).unwrap();
        assert_eq!(reimported.len(), 2);
        assert_eq!(reimported.get(0).unwrap().kind, canvas.get(0).unwrap().kind);
        assert_eq!(reimported.get(1).unwrap().left, 50.0);
        assert_eq!(reimported.get(1).unwrap().top, 60.0);
    }

    #[test]
    fn transform_emitted_for_skewed_objects() {
        let mut canvas = Canvas::new(100.0, 100.0);
        let mut obj = CanvasObject::rect(0.0, 0.0, 10.0, 10.0, "blue");
        obj.angle = 45.0;
        obj.skew_x = 10.0;
        canvas.add(obj);
        let svg = export_svg(&canvas);
        assert!(svg.contains(r#"transform="rotate(45) skewX(10)""#));
    }
}
