//! Undo/redo for an `ink-canvas` drawing surface.
//!
//! One component: [`History`]. Attach it to a canvas and every content
//! change (add/modify/remove/skew) is captured as a full-state snapshot;
//! `undo`/`redo` walk the captured timeline and report
//! `(can_undo, can_redo)` to an observer callback after every transition,
//! ready for wiring to a pair of UI buttons.
//!
//! Calls to `undo`/`redo` are synchronous here, but the restore-in-flight
//! guard is still part of the contract: a call that arrives while a
//! restoration is applying is rejected with an error instead of
//! interleaving stack mutations. Serializing requests (e.g. disabling the
//! triggering control until the callback fires) remains the caller's job.

pub mod history;

pub use history::{DEFAULT_MAX_UNDO_STEPS, History, HistoryOptions};
