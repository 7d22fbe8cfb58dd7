//! The mutable drawing surface.
//!
//! `Canvas` owns the object list and the subscriber registry. Every
//! mutation method emits the matching [`ContentEvent`] synchronously,
//! after the object list has been updated, so handlers always observe the
//! post-mutation state. Handlers receive `&Canvas` and may read or
//! serialize it; they must not subscribe or unsubscribe from inside the
//! callback (the subscriber list is borrowed for the duration of the
//! dispatch).
//!
//! The canvas is single-threaded by construction: handlers are plain
//! boxed closures, so the type is `!Send`.

use crate::event::{ContentEvent, EventKind, Handler, Subscriber, SubscriberId};
use crate::model::CanvasObject;
use smallvec::SmallVec;
use std::cell::{Cell, RefCell};

pub struct Canvas {
    width: f32,
    height: f32,
    background: String,
    objects: Vec<CanvasObject>,
    subscribers: RefCell<Vec<Subscriber>>,
    next_subscriber: Cell<u64>,
}

impl Canvas {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            background: "white".to_string(),
            objects: Vec::new(),
            subscribers: RefCell::new(Vec::new()),
            next_subscriber: Cell::new(0),
        }
    }

    // ─── Accessors ───────────────────────────────────────────────────────

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn background(&self) -> &str {
        &self.background
    }

    /// Objects in layer order (index 0 is the bottom layer).
    pub fn objects(&self) -> &[CanvasObject] {
        &self.objects
    }

    pub fn get(&self, index: usize) -> Option<&CanvasObject> {
        self.objects.get(index)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    // ─── Mutations ───────────────────────────────────────────────────────

    /// Background changes are cosmetic and emit no content event.
    pub fn set_background(&mut self, color: impl Into<String>) {
        self.background = color.into();
    }

    /// Add an object on top of the stack. Returns its layer index.
    pub fn add(&mut self, object: CanvasObject) -> usize {
        self.objects.push(object);
        let index = self.objects.len() - 1;
        self.emit(ContentEvent {
            kind: EventKind::ObjectAdded,
            index,
        });
        index
    }

    /// Remove the object at `index`. Returns it, or `None` if out of range.
    pub fn remove(&mut self, index: usize) -> Option<CanvasObject> {
        if index >= self.objects.len() {
            return None;
        }
        let removed = self.objects.remove(index);
        self.emit(ContentEvent {
            kind: EventKind::ObjectRemoved,
            index,
        });
        Some(removed)
    }

    /// Modify the object at `index` in place. Returns `false` if out of range.
    pub fn update(&mut self, index: usize, f: impl FnOnce(&mut CanvasObject)) -> bool {
        let Some(object) = self.objects.get_mut(index) else {
            return false;
        };
        f(object);
        self.emit(ContentEvent {
            kind: EventKind::ObjectModified,
            index,
        });
        true
    }

    /// Adjust the skew of the object at `index`. Returns `false` if out of range.
    pub fn skew(&mut self, index: usize, skew_x: f32, skew_y: f32) -> bool {
        let Some(object) = self.objects.get_mut(index) else {
            return false;
        };
        object.skew_x = skew_x;
        object.skew_y = skew_y;
        self.emit(ContentEvent {
            kind: EventKind::ObjectSkewing,
            index,
        });
        true
    }

    /// Remove every object, top layer first, emitting `ObjectRemoved` for each.
    pub fn clear(&mut self) {
        while !self.objects.is_empty() {
            let index = self.objects.len() - 1;
            self.objects.pop();
            self.emit(ContentEvent {
                kind: EventKind::ObjectRemoved,
                index,
            });
        }
    }

    /// Replace the entire object list, then emit `ObjectAdded` for each new
    /// object. Used by snapshot restoration — the emitted events are the
    /// restoration's "mutation echo" that history recording suppresses.
    pub(crate) fn replace_objects(&mut self, objects: Vec<CanvasObject>) {
        self.objects = objects;
        for index in 0..self.objects.len() {
            self.emit(ContentEvent {
                kind: EventKind::ObjectAdded,
                index,
            });
        }
    }

    // ─── Subscriptions ───────────────────────────────────────────────────

    /// Subscribe `handler` to the given event kinds. The handler runs
    /// synchronously after each matching mutation, with the canvas already
    /// in its post-mutation state.
    pub fn on(
        &self,
        kinds: &[EventKind],
        handler: impl FnMut(&Canvas, &ContentEvent) + 'static,
    ) -> SubscriberId {
        let id = SubscriberId(self.next_subscriber.get());
        self.next_subscriber.set(id.0 + 1);
        self.subscribers.borrow_mut().push(Subscriber {
            id,
            kinds: SmallVec::from_slice(kinds),
            handler: Box::new(handler) as Handler,
        });
        id
    }

    /// Unsubscribe. Returns `false` if the id was not registered.
    pub fn off(&self, id: SubscriberId) -> bool {
        let mut subscribers = self.subscribers.borrow_mut();
        let before = subscribers.len();
        subscribers.retain(|s| s.id != id);
        subscribers.len() != before
    }

    fn emit(&self, event: ContentEvent) {
        let mut subscribers = self.subscribers.borrow_mut();
        for sub in subscribers.iter_mut() {
            if sub.kinds.contains(&event.kind) {
                (sub.handler)(self, &event);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CanvasObject;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn seen_events(canvas: &Canvas) -> Rc<RefCell<Vec<ContentEvent>>> {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        canvas.on(&EventKind::ALL, move |_, event| {
            sink.borrow_mut().push(*event);
        });
        seen
    }

    #[test]
    fn add_remove_emit_events() {
        let mut canvas = Canvas::new(800.0, 400.0);
        let seen = seen_events(&canvas);

        let index = canvas.add(CanvasObject::circle(200.0, 100.0, 50.0, "red"));
        assert_eq!(index, 0);
        canvas.add(CanvasObject::rect(300.0, 200.0, 50.0, 100.0, "green"));
        canvas.remove(0);

        assert_eq!(
            *seen.borrow(),
            vec![
                ContentEvent {
                    kind: EventKind::ObjectAdded,
                    index: 0
                },
                ContentEvent {
                    kind: EventKind::ObjectAdded,
                    index: 1
                },
                ContentEvent {
                    kind: EventKind::ObjectRemoved,
                    index: 0
                },
            ]
        );
        assert_eq!(canvas.len(), 1);
    }

    #[test]
    fn update_and_skew_emit_their_kinds() {
        let mut canvas = Canvas::new(100.0, 100.0);
        canvas.add(CanvasObject::rect(0.0, 0.0, 10.0, 10.0, "blue"));
        let seen = seen_events(&canvas);

        assert!(canvas.update(0, |obj| obj.left = 42.0));
        assert!(canvas.skew(0, 15.0, 0.0));

        let kinds: Vec<_> = seen.borrow().iter().map(|e| e.kind).collect();
        assert_eq!(kinds, vec![EventKind::ObjectModified, EventKind::ObjectSkewing]);
        assert_eq!(canvas.get(0).unwrap().left, 42.0);
        assert_eq!(canvas.get(0).unwrap().skew_x, 15.0);
    }

    #[test]
    fn out_of_range_mutations_are_noops() {
        let mut canvas = Canvas::new(100.0, 100.0);
        let seen = seen_events(&canvas);

        assert!(canvas.remove(0).is_none());
        assert!(!canvas.update(3, |obj| obj.left = 1.0));
        assert!(!canvas.skew(3, 1.0, 1.0));
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn handler_observes_post_mutation_state() {
        let mut canvas = Canvas::new(100.0, 100.0);
        let lens = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&lens);
        canvas.on(&[EventKind::ObjectAdded], move |canvas, _| {
            sink.borrow_mut().push(canvas.len());
        });

        canvas.add(CanvasObject::circle(0.0, 0.0, 1.0, "red"));
        canvas.add(CanvasObject::circle(0.0, 0.0, 2.0, "red"));
        assert_eq!(*lens.borrow(), vec![1, 2]);
    }

    #[test]
    fn off_stops_delivery() {
        let mut canvas = Canvas::new(100.0, 100.0);
        let seen = Rc::new(RefCell::new(0usize));
        let sink = Rc::clone(&seen);
        let id = canvas.on(&EventKind::ALL, move |_, _| {
            *sink.borrow_mut() += 1;
        });

        canvas.add(CanvasObject::circle(0.0, 0.0, 1.0, "red"));
        assert!(canvas.off(id));
        assert!(!canvas.off(id));
        canvas.add(CanvasObject::circle(0.0, 0.0, 2.0, "red"));

        assert_eq!(*seen.borrow(), 1);
    }

    #[test]
    fn kind_filter_is_respected() {
        let mut canvas = Canvas::new(100.0, 100.0);
        let seen = Rc::new(RefCell::new(0usize));
        let sink = Rc::clone(&seen);
        canvas.on(&[EventKind::ObjectRemoved], move |_, _| {
            *sink.borrow_mut() += 1;
        });

        canvas.add(CanvasObject::circle(0.0, 0.0, 1.0, "red"));
        assert_eq!(*seen.borrow(), 0);
        canvas.remove(0);
        assert_eq!(*seen.borrow(), 1);
    }

    #[test]
    fn clear_removes_top_down() {
        let mut canvas = Canvas::new(100.0, 100.0);
        canvas.add(CanvasObject::circle(0.0, 0.0, 1.0, "red"));
        canvas.add(CanvasObject::circle(0.0, 0.0, 2.0, "red"));
        let seen = seen_events(&canvas);

        canvas.clear();
        assert!(canvas.is_empty());
        let indices: Vec<_> = seen.borrow().iter().map(|e| e.index).collect();
        assert_eq!(indices, vec![1, 0]);
    }
}
