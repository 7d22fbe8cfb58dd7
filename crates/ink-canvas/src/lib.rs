pub mod canvas;
pub mod event;
pub mod model;
pub mod serialize;
pub mod svg;

pub use canvas::Canvas;
pub use event::{ContentEvent, EventKind, SubscriberId};
pub use model::{CanvasObject, ObjectKind};
pub use serialize::{Snapshot, TrackedProperties, TrackedProperty, default_tracked_properties};
pub use svg::{export_svg, import_svg};
