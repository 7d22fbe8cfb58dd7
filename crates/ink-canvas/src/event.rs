//! Content-changed events emitted by the canvas.
//!
//! Observers subscribe with [`Canvas::on`](crate::Canvas::on), naming the
//! event kinds they care about, and receive a synchronous callback after
//! each matching mutation. This is the seam the history manager hangs off:
//! it listens to all four kinds and re-snapshots the canvas on each one.

use crate::Canvas;
use smallvec::SmallVec;

/// Discriminated kind of a content change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// A new object entered the canvas (including objects restored by
    /// [`Canvas::load_from_json`](crate::Canvas::load_from_json)).
    ObjectAdded,
    /// An existing object's properties were changed in place.
    ObjectModified,
    /// An object left the canvas.
    ObjectRemoved,
    /// An object's skew was adjusted.
    ObjectSkewing,
}

impl EventKind {
    /// All four kinds — what a full-fidelity observer subscribes to.
    pub const ALL: [EventKind; 4] = [
        EventKind::ObjectAdded,
        EventKind::ObjectModified,
        EventKind::ObjectRemoved,
        EventKind::ObjectSkewing,
    ];
}

/// One content change. `index` is the position of the affected object in
/// the canvas's layer list (for `ObjectRemoved`, the position it held
/// before removal).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentEvent {
    pub kind: EventKind,
    pub index: usize,
}

/// Opaque handle returned by [`Canvas::on`](crate::Canvas::on); pass it to
/// [`Canvas::off`](crate::Canvas::off) to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(pub(crate) u64);

pub(crate) type Handler = Box<dyn FnMut(&Canvas, &ContentEvent)>;

pub(crate) struct Subscriber {
    pub(crate) id: SubscriberId,
    pub(crate) kinds: SmallVec<[EventKind; 4]>,
    pub(crate) handler: Handler,
}
