//! Playback scheduler — decides which segment should currently be audible.
//!
//! The entire scheduler state is one pointer: `None`, or the index of the
//! segment the listener should hear.  Transitions:
//!
//! ```text
//! select(i)            pointer = Some(i)   — unconditional, even if the
//!                                            segment is not ready yet
//! finished(i, len)     pointer = Some(i+1) — when i is pointed-to and in
//!                                            bounds, else None (end of queue)
//! auto_start()         pointer = Some(0)   — only when nothing is selected
//! reset()              pointer = None      — new run
//! ```
//!
//! The scheduler never skips a not-yet-ready segment: the pointer advances
//! to it and playback waits until its audio exists.  If the pointed-to
//! segment permanently fails, the pointer stays put until the listener
//! selects something else.

use std::sync::{Arc, Mutex};

// ---------------------------------------------------------------------------
// PlaybackScheduler
// ---------------------------------------------------------------------------

/// The playback pointer state machine.  Owned by the orchestrator's command
/// loop; pure and synchronous so the transitions are trivially testable.
#[derive(Debug, Default)]
pub struct PlaybackScheduler {
    pointer: Option<usize>,
}

impl PlaybackScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// The currently audible segment index, or `None`.
    pub fn pointer(&self) -> Option<usize> {
        self.pointer
    }

    /// Listener chose segment `i`.  The pointer moves unconditionally; if
    /// the segment is not ready yet, playback simply begins once its audio
    /// becomes available.
    pub fn select(&mut self, i: usize) {
        self.pointer = Some(i);
    }

    /// The audio of segment `i` finished playing.  Advances to `i + 1`
    /// regardless of that segment's readiness, or to `None` at the end of
    /// the queue.  A finish event for a segment that is no longer
    /// pointed-to (the listener jumped elsewhere mid-playback) is ignored.
    pub fn finished(&mut self, i: usize, len: usize) {
        if self.pointer != Some(i) {
            return;
        }
        self.pointer = if i + 1 < len { Some(i + 1) } else { None };
    }

    /// Point at the first segment when the run's front becomes playable,
    /// unless the listener already selected something.
    pub fn auto_start(&mut self) -> bool {
        if self.pointer.is_some() {
            return false;
        }
        self.pointer = Some(0);
        true
    }

    /// Clear the pointer for a new run.
    pub fn reset(&mut self) {
        self.pointer = None;
    }
}

// ---------------------------------------------------------------------------
// SharedScheduler
// ---------------------------------------------------------------------------

/// Thread-safe handle to [`PlaybackScheduler`].
pub type SharedScheduler = Arc<Mutex<PlaybackScheduler>>;

/// Construct a new [`SharedScheduler`] with no pointer set.
pub fn new_shared_scheduler() -> SharedScheduler {
    Arc::new(Mutex::new(PlaybackScheduler::new()))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
