//! Bounded snapshot undo/redo history.
//!
//! The history manager instruments one canvas: every content change is
//! captured as a full-state [`Snapshot`] and pushed onto a bounded undo
//! stack; undo/redo swap snapshots between the two stacks and re-apply
//! them to the canvas. Full-state snapshots trade memory (one serialized
//! document per entry) for not needing an inverse command per mutation
//! kind — structural diffs could replace them later without changing this
//! API.
//!
//! Each [`History`] is owned by exactly one canvas attachment; there is no
//! shared or global history state. Dropping the handle drops the state —
//! call [`History::detach`] first if the canvas outlives it.

use ink_canvas::{
    Canvas, EventKind, Snapshot, SubscriberId, TrackedProperties, default_tracked_properties,
};
use std::cell::RefCell;
use std::rc::{Rc, Weak};

pub const DEFAULT_MAX_UNDO_STEPS: usize = 50;

/// Attachment options.
#[derive(Debug, Clone)]
pub struct HistoryOptions {
    /// Maximum undo depth. At capacity the oldest entry is silently
    /// dropped (FIFO) — depth is a soft limit, not a guarantee. Values
    /// below 1 are clamped to 1.
    pub max_undo_steps: usize,
    /// Custom properties carried through every snapshot, beyond base
    /// geometry and content.
    pub tracked_properties: TrackedProperties,
}

impl Default for HistoryOptions {
    fn default() -> Self {
        Self {
            max_undo_steps: DEFAULT_MAX_UNDO_STEPS,
            tracked_properties: default_tracked_properties(),
        }
    }
}

struct HistoryState {
    /// Most-recent-last, bounded to `max_undo_steps`.
    undo_stack: Vec<Snapshot>,
    /// Most-recent-last, unbounded within a session.
    redo_stack: Vec<Snapshot>,
    /// The canvas's present content. On neither stack.
    current_state: Snapshot,
    /// True only while a snapshot is being re-applied to the canvas. The
    /// canvas re-emits `ObjectAdded` for every restored object; this flag
    /// keeps those echoes from being recorded as new history entries.
    restoring: bool,
    max_undo_steps: usize,
    tracked: TrackedProperties,
    on_change: Box<dyn FnMut(bool, bool)>,
}

impl HistoryState {
    fn notify(&mut self) {
        let can_undo = !self.undo_stack.is_empty();
        let can_redo = !self.redo_stack.is_empty();
        (self.on_change)(can_undo, can_redo);
    }

    /// Record one user-driven mutation: the outgoing `current_state`
    /// becomes the newest undo entry and any redo future is discarded.
    fn record(&mut self, canvas: &Canvas) {
        if self.restoring {
            return;
        }
        let fresh = match canvas.to_dataless_json(&self.tracked) {
            Ok(snapshot) => snapshot,
            Err(err) => {
                log::error!("history: snapshot failed, mutation not recorded: {err}");
                return;
            }
        };
        if self.undo_stack.len() >= self.max_undo_steps {
            self.undo_stack.remove(0);
        }
        let previous = std::mem::replace(&mut self.current_state, fresh);
        self.undo_stack.push(previous);
        self.redo_stack.clear();
        log::debug!("history: recorded mutation, undo depth {}", self.undo_stack.len());
        self.notify();
    }
}

/// Handle to the history state attached to one canvas.
pub struct History {
    state: Rc<RefCell<HistoryState>>,
    subscriber: SubscriberId,
}

impl History {
    /// Attach a fresh history to `canvas`.
    ///
    /// Seeds the current state from the canvas's present content,
    /// subscribes to all four content-event kinds, and fires an initial
    /// `on_change(false, false)` so bound controls start disabled.
    pub fn attach(
        canvas: &Canvas,
        options: HistoryOptions,
        on_change: impl FnMut(bool, bool) + 'static,
    ) -> Result<Self, String> {
        let current_state = canvas.to_dataless_json(&options.tracked_properties)?;
        let state = Rc::new(RefCell::new(HistoryState {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            current_state,
            restoring: false,
            max_undo_steps: options.max_undo_steps.max(1),
            tracked: options.tracked_properties,
            on_change: Box::new(on_change),
        }));

        let weak: Weak<RefCell<HistoryState>> = Rc::downgrade(&state);
        let subscriber = canvas.on(&EventKind::ALL, move |canvas, _event| {
            if let Some(state) = weak.upgrade() {
                state.borrow_mut().record(canvas);
            }
        });

        state.borrow_mut().notify();
        Ok(Self { state, subscriber })
    }

    /// Revert the canvas to the previous snapshot.
    ///
    /// `Ok(false)` when the undo stack is empty (a no-op, not an error).
    /// `Err` when a restore is already in flight, or when the canvas
    /// rejects the snapshot — in the latter case the stacks have already
    /// shifted and are NOT rolled back (the failed snapshot is current).
    pub fn undo(&mut self, canvas: &mut Canvas) -> Result<bool, String> {
        let snapshot = {
            let mut state = self.state.borrow_mut();
            if state.restoring {
                return Err("restore already in flight".to_string());
            }
            let Some(snapshot) = state.undo_stack.pop() else {
                return Ok(false);
            };
            state.restoring = true;
            let previous = std::mem::replace(&mut state.current_state, snapshot.clone());
            state.redo_stack.push(previous);
            snapshot
        };

        // Borrow released: the canvas's restore echo re-enters `record`,
        // which must see `restoring` through its own borrow.
        let result = canvas.load_from_json(&snapshot);

        let mut state = self.state.borrow_mut();
        state.restoring = false;
        result?;
        log::debug!("history: undo, depth now {}", state.undo_stack.len());
        state.notify();
        Ok(true)
    }

    /// Re-apply the most recently undone snapshot. Symmetric to
    /// [`History::undo`], with the same error contract.
    pub fn redo(&mut self, canvas: &mut Canvas) -> Result<bool, String> {
        let snapshot = {
            let mut state = self.state.borrow_mut();
            if state.restoring {
                return Err("restore already in flight".to_string());
            }
            let Some(snapshot) = state.redo_stack.pop() else {
                return Ok(false);
            };
            state.restoring = true;
            let previous = std::mem::replace(&mut state.current_state, snapshot.clone());
            state.undo_stack.push(previous);
            snapshot
        };

        let result = canvas.load_from_json(&snapshot);

        let mut state = self.state.borrow_mut();
        state.restoring = false;
        result?;
        log::debug!("history: redo, depth now {}", state.redo_stack.len());
        state.notify();
        Ok(true)
    }

    pub fn can_undo(&self) -> bool {
        !self.state.borrow().undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.state.borrow().redo_stack.is_empty()
    }

    /// Current undo depth (number of reachable past states).
    pub fn undo_depth(&self) -> usize {
        self.state.borrow().undo_stack.len()
    }

    /// Current redo depth.
    pub fn redo_depth(&self) -> usize {
        self.state.borrow().redo_stack.len()
    }

    /// Unsubscribe from the canvas. The handle keeps its stacks but stops
    /// recording; use this before the canvas is disposed.
    pub fn detach(&self, canvas: &Canvas) -> bool {
        canvas.off(self.subscriber)
    }
}
