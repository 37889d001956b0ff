//! Segment store — the single shared mutable structure of a run.
//!
//! [`SegmentStore`] holds the ordered list of [`Segment`]s for the current
//! run plus the live [`Progress`] indicator.  The orchestrator is its sole
//! writer; the scheduler and presentation layer read cloned snapshots.
//!
//! Every mutator takes the caller's [`RunId`].  Starting a new run bumps the
//! store's generation, so a collaborator call that resolves after its run
//! was abandoned finds its writes rejected — this is how implicit
//! cancellation works without ever interrupting an in-flight await.
//!
//! Status transitions are monotonic per segment:
//!
//! ```text
//! Pending ──▶ Processing ──▶ Success
//!                        └─▶ Error
//! ```
//!
//! Terminal states are final; there are no retries.

use std::sync::{Arc, Mutex};

use crate::audio::AudioClip;
use crate::segmenter::TextChunk;

// ---------------------------------------------------------------------------
// RunId
// ---------------------------------------------------------------------------

/// Generation counter identifying one document run.  Writes carrying a
/// stale `RunId` are rejected.
pub type RunId = u64;

// ---------------------------------------------------------------------------
// SegmentStatus
// ---------------------------------------------------------------------------

/// Lifecycle status of a segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentStatus {
    /// Created, not yet picked up by the orchestrator.
    Pending,
    /// Currently being translated / synthesized.
    Processing,
    /// Audio is ready to play.
    Success,
    /// Translation or synthesis failed; see [`Segment::error`].
    Error,
}

impl SegmentStatus {
    /// `true` for `Success` and `Error` — no further transition occurs.
    pub fn is_terminal(&self) -> bool {
        matches!(self, SegmentStatus::Success | SegmentStatus::Error)
    }
}

// ---------------------------------------------------------------------------
// Segment
// ---------------------------------------------------------------------------

/// One chunk of the document plus its pipeline lifecycle state.
#[derive(Debug, Clone)]
pub struct Segment {
    /// Stable identifier; encodes the segment's position in the sequence.
    pub id: usize,
    /// Display label copied from the source chunk.
    pub title: String,
    /// Immutable source text.
    pub original_text: String,
    /// Set exactly once, when translation succeeds.
    pub translated_text: Option<String>,
    /// Present iff `status == Success`; owns the playable audio.
    pub audio: Option<AudioClip>,
    pub status: SegmentStatus,
    /// Human-readable failure description, set only when `status == Error`.
    pub error: Option<String>,
}

impl Segment {
    fn from_chunk(id: usize, chunk: TextChunk) -> Self {
        Self {
            id,
            title: chunk.title,
            original_text: chunk.text,
            translated_text: None,
            audio: None,
            status: SegmentStatus::Pending,
            error: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Progress
// ---------------------------------------------------------------------------

/// Live pipeline progress: `current ∈ [1, total]`.  Present only while the
/// orchestrator is working through a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub current: usize,
    pub total: usize,
}

// ---------------------------------------------------------------------------
// SegmentStore
// ---------------------------------------------------------------------------

/// Ordered, append-only-at-creation list of segments for the current run.
#[derive(Debug, Default)]
pub struct SegmentStore {
    run_id: RunId,
    segments: Vec<Segment>,
    progress: Option<Progress>,
}

impl SegmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The current run's generation.
    pub fn run_id(&self) -> RunId {
        self.run_id
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn progress(&self) -> Option<Progress> {
        self.progress
    }

    /// Replace the segment list with a fresh one built from `chunks`,
    /// bumping the run generation.
    ///
    /// Dropping the previous `Vec<Segment>` releases every [`AudioClip`]
    /// the old run held; any in-flight task from that run will find its
    /// subsequent writes rejected.
    pub fn begin_run(&mut self, chunks: Vec<TextChunk>) -> RunId {
        self.run_id += 1;
        self.progress = None;
        self.segments = chunks
            .into_iter()
            .enumerate()
            .map(|(id, chunk)| Segment::from_chunk(id, chunk))
            .collect();
        self.run_id
    }

    /// Cloned, internally consistent view of all segments.
    pub fn snapshot(&self) -> Vec<Segment> {
        self.segments.clone()
    }

    pub fn segment(&self, id: usize) -> Option<&Segment> {
        self.segments.get(id)
    }

    /// The source text of segment `id`, or `None` when `run` is stale or
    /// the id is out of range.
    pub fn original_text(&self, run: RunId, id: usize) -> Option<String> {
        if run != self.run_id {
            return None;
        }
        self.segments.get(id).map(|s| s.original_text.clone())
    }

    // -----------------------------------------------------------------------
    // Guarded mutators — all return `false` when the write was rejected
    // (stale run, unknown id, or an invalid status transition).
    // -----------------------------------------------------------------------

    /// `Pending → Processing`.
    pub fn mark_processing(&mut self, run: RunId, id: usize) -> bool {
        self.update(run, id, |segment| {
            if segment.status != SegmentStatus::Pending {
                return false;
            }
            segment.status = SegmentStatus::Processing;
            true
        })
    }

    /// Record the translation result on a `Processing` segment.
    pub fn set_translated(&mut self, run: RunId, id: usize, text: String) -> bool {
        self.update(run, id, |segment| {
            if segment.status != SegmentStatus::Processing || segment.translated_text.is_some() {
                return false;
            }
            segment.translated_text = Some(text);
            true
        })
    }

    /// `Processing → Success`, attaching the playable clip.
    pub fn mark_success(&mut self, run: RunId, id: usize, clip: AudioClip) -> bool {
        self.update(run, id, |segment| {
            if segment.status != SegmentStatus::Processing {
                return false;
            }
            segment.status = SegmentStatus::Success;
            segment.audio = Some(clip);
            true
        })
    }

    /// `Processing → Error`, recording the failure description.
    pub fn mark_error(&mut self, run: RunId, id: usize, message: String) -> bool {
        self.update(run, id, |segment| {
            if segment.status.is_terminal() {
                return false;
            }
            segment.status = SegmentStatus::Error;
            segment.error = Some(message);
            true
        })
    }

    /// Publish or clear the progress indicator.
    pub fn set_progress(&mut self, run: RunId, progress: Option<Progress>) -> bool {
        if run != self.run_id {
            return false;
        }
        self.progress = progress;
        true
    }

    fn update(&mut self, run: RunId, id: usize, f: impl FnOnce(&mut Segment) -> bool) -> bool {
        if run != self.run_id {
            return false;
        }
        match self.segments.get_mut(id) {
            Some(segment) => f(segment),
            None => false,
        }
    }
}

// ---------------------------------------------------------------------------
// SharedStore
// ---------------------------------------------------------------------------

/// Thread-safe handle to [`SegmentStore`].
///
/// Cheap to clone (`Arc` clone).  Lock for a short critical section; do
/// **not** hold the lock across `.await` points.
pub type SharedStore = Arc<Mutex<SegmentStore>>;

/// Construct a new empty [`SharedStore`].
pub fn new_shared_store() -> SharedStore {
    Arc::new(Mutex::new(SegmentStore::new()))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
