//! A scripted drawing session: the wiring a UI shell would do.
//!
//! Builds the demo canvas (red circle, green rect), attaches history,
//! mutates, imports an SVG fragment, and walks undo/redo while an
//! observer prints button availability. Run with:
//!
//! ```sh
//! RUST_LOG=debug cargo run -p ink-history --example sketch_session
//! ```

use ink_canvas::{Canvas, CanvasObject, export_svg, import_svg};
use ink_history::{History, HistoryOptions};

const DEMO_SVG: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" width="1080" height="1080" viewBox="0 0 1080 1080">
        <rect id="MAIN_000_CONTAIN" x="60" y="125" width="30" height="200" fill="blue"/>
        <rect id="MAIN_001" x="520" y="50" width="360" height="425" fill="yellow"/>
      </svg>"#;

fn main() -> Result<(), String> {
    env_logger::init();

    let mut canvas = Canvas::new(800.0, 400.0);
    canvas.set_background("lightgray");
    canvas.add(CanvasObject::circle(200.0, 100.0, 50.0, "red").with_name("Sun"));
    canvas.add(CanvasObject::rect(300.0, 200.0, 50.0, 100.0, "green").with_name("Tower"));

    let mut history = History::attach(&canvas, HistoryOptions::default(), |can_undo, can_redo| {
        println!("[buttons] undo={can_undo} redo={can_redo}");
    })?;

    println!("-- drawing --");
    canvas.add(CanvasObject::text(20.0, 20.0, "hello inkpad", 24.0));
    canvas.update(0, |obj| obj.fill = "orange".to_string());
    canvas.skew(1, 15.0, 0.0);

    println!("-- importing svg --");
    let imported = import_svg(&mut canvas, DEMO_SVG)?;
    println!("imported {imported} shapes, {} objects total", canvas.len());

    println!("-- undoing everything --");
    while history.undo(&mut canvas)? {
        println!("undo -> {} objects", canvas.len());
    }

    println!("-- redoing twice --");
    history.redo(&mut canvas)?;
    history.redo(&mut canvas)?;

    println!("-- final svg --");
    print!("{}", export_svg(&canvas));
    Ok(())
}
