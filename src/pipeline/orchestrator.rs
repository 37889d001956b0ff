//! Pipeline orchestrator — drives extract → segment → translate →
//! synthesize → decode for one document run.
//!
//! [`PipelineOrchestrator`] owns the [`SharedStore`] and responds to
//! [`PipelineCommand`]s received over a `tokio::sync::mpsc` channel,
//! publishing [`PipelineEvent`]s to the presentation layer.
//!
//! # Run flow
//!
//! ```text
//! PipelineCommand::StartRun { payload, mode }
//!   ├─▶ extract text            — failure is document-fatal
//!   ├─▶ truncate at the 50 000-char ceiling (logged, lossy, not an error)
//!   ├─▶ segment                 — zero chunks is document-fatal
//!   ├─▶ SegmentStore::begin_run — replaces the old run, releases its audio
//!   └─▶ spawn the sequential run task
//!         └─ per segment, strictly in order:
//!              Pending → Processing, publish Progress
//!              Translator::translate   ── Err → segment Error, continue
//!              Synthesizer::synthesize ── Err → segment Error, continue
//!              AudioClip::from_pcm16   ── Err → segment Error, continue
//!              Processing → Success; segment 0 auto-starts playback
//! ```
//!
//! The run task runs concurrently with the command loop so that
//! `SelectSegment` / `SegmentFinished` are honored immediately mid-run.
//! Every store write carries the run's generation; a `StartRun` arriving
//! mid-run bumps the generation and the superseded task abandons itself on
//! its next rejected write.  One segment's failure never aborts the run.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use tokio::sync::mpsc;

use crate::audio::{AudioClip, SAMPLE_RATE_HZ};
use crate::config::{NarrationMode, SegmenterConfig};
use crate::extract::{DocumentPayload, TextExtractor};
use crate::segmenter::segment;
use crate::translate::Translator;
use crate::tts::Synthesizer;

use super::playback::SharedScheduler;
use super::store::{Progress, RunId, SegmentStatus, SharedStore};

// ---------------------------------------------------------------------------
// LogLine
// ---------------------------------------------------------------------------

/// A timestamped log entry published to the presentation layer, decoupled
/// from the `log` crate sink used for developer diagnostics.
#[derive(Debug, Clone)]
pub struct LogLine {
    pub timestamp: SystemTime,
    pub message: String,
}

impl LogLine {
    pub fn now(message: impl Into<String>) -> Self {
        Self {
            timestamp: SystemTime::now(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for LogLine {
    /// Formats as `[HH:MM:SS] message` (UTC).
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let secs = self
            .timestamp
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        let (h, m, s) = (secs / 3600 % 24, secs / 60 % 60, secs % 60);
        write!(f, "[{h:02}:{m:02}:{s:02}] {}", self.message)
    }
}

// ---------------------------------------------------------------------------
// Commands & events
// ---------------------------------------------------------------------------

/// Inputs accepted from the presentation layer.
#[derive(Debug)]
pub enum PipelineCommand {
    /// Start narrating a new document, discarding any in-flight run.
    StartRun {
        payload: DocumentPayload,
        mode: NarrationMode,
    },
    /// Listener chose segment `i`.
    SelectSegment(usize),
    /// Segment `i`'s audio finished playing.
    SegmentFinished(usize),
}

/// Notifications published to the presentation layer.
#[derive(Debug, Clone)]
pub enum PipelineEvent {
    /// Progress changed; `None` means no run is active.
    Progress(Option<Progress>),
    /// A human-readable run log entry.
    Log(LogLine),
    /// The segment store changed; observers should take a fresh snapshot.
    StoreChanged,
    /// The playback pointer moved.
    PointerChanged(Option<usize>),
    /// Every segment reached a terminal status.
    RunFinished { succeeded: usize, failed: usize },
    /// A document-fatal error aborted the run before any segment existed.
    RunFailed(String),
}

// ---------------------------------------------------------------------------
// PipelineOrchestrator
// ---------------------------------------------------------------------------

/// Drives the complete narration pipeline.
///
/// Create with [`PipelineOrchestrator::new`], then call [`run`](Self::run)
/// inside a tokio task.  The store and scheduler handles passed in are also
/// held by the presentation layer for read-only snapshots.
pub struct PipelineOrchestrator {
    store: SharedStore,
    scheduler: SharedScheduler,
    extractor: Arc<dyn TextExtractor>,
    translator: Arc<dyn Translator>,
    synthesizer: Arc<dyn Synthesizer>,
    segmenter: SegmenterConfig,
    events: mpsc::Sender<PipelineEvent>,
}

impl PipelineOrchestrator {
    pub fn new(
        store: SharedStore,
        scheduler: SharedScheduler,
        extractor: Arc<dyn TextExtractor>,
        translator: Arc<dyn Translator>,
        synthesizer: Arc<dyn Synthesizer>,
        segmenter: SegmenterConfig,
        events: mpsc::Sender<PipelineEvent>,
    ) -> Self {
        Self {
            store,
            scheduler,
            extractor,
            translator,
            synthesizer,
            segmenter,
            events,
        }
    }

    // -----------------------------------------------------------------------
    // Main async loop
    // -----------------------------------------------------------------------

    /// Run the orchestrator until the command channel is closed.
    ///
    /// Spawn this as a tokio task; it never returns while the channel is
    /// open.
    pub async fn run(self, mut command_rx: mpsc::Receiver<PipelineCommand>) {
        while let Some(command) = command_rx.recv().await {
            match command {
                PipelineCommand::StartRun { payload, mode } => {
                    self.handle_start_run(payload, mode).await;
                }
                PipelineCommand::SelectSegment(i) => {
                    self.handle_select(i).await;
                }
                PipelineCommand::SegmentFinished(i) => {
                    self.handle_finished(i).await;
                }
            }
        }

        log::info!("pipeline: command channel closed, orchestrator shutting down");
    }

    // -----------------------------------------------------------------------
    // Command handlers
    // -----------------------------------------------------------------------

    /// Extract, truncate, segment and kick off the sequential run task.
    async fn handle_start_run(&self, payload: DocumentPayload, mode: NarrationMode) {
        let text = match self.extractor.extract(&payload) {
            Ok(text) => text,
            Err(e) => {
                self.fail_run(format!("text extraction failed: {e}")).await;
                return;
            }
        };

        // Oversized input is truncated, not rejected.
        let ceiling = self.segmenter.max_document_chars;
        let text = match truncate_chars(&text, ceiling) {
            Some(truncated) => {
                log::warn!("pipeline: document exceeds {ceiling} chars, truncating");
                self.log_event(format!(
                    "document is longer than {ceiling} characters — narrating the first {ceiling} only"
                ))
                .await;
                truncated
            }
            None => text,
        };

        let chunks = segment(&text, self.segmenter.target_chars);
        if chunks.is_empty() {
            self.fail_run("document produced no narratable text".to_string())
                .await;
            return;
        }

        let total = chunks.len();
        let run_id = self.store.lock().unwrap().begin_run(chunks);
        self.scheduler.lock().unwrap().reset();
        self.emit(PipelineEvent::StoreChanged).await;
        self.emit(PipelineEvent::PointerChanged(None)).await;

        log::info!("pipeline: run {run_id} started, {total} segments ({mode} mode)");
        self.log_event(format!("queued {total} segments ({mode} narration)"))
            .await;

        let task = RunTask {
            store: Arc::clone(&self.store),
            scheduler: Arc::clone(&self.scheduler),
            translator: Arc::clone(&self.translator),
            synthesizer: Arc::clone(&self.synthesizer),
            events: self.events.clone(),
            run_id,
            mode,
            total,
        };
        tokio::spawn(task.process_run());
    }

    async fn handle_select(&self, i: usize) {
        let len = self.store.lock().unwrap().len();
        if i >= len {
            log::warn!("pipeline: select of out-of-range segment {i} (len {len}) ignored");
            return;
        }
        self.scheduler.lock().unwrap().select(i);
        self.emit(PipelineEvent::PointerChanged(Some(i))).await;
    }

    async fn handle_finished(&self, i: usize) {
        let len = self.store.lock().unwrap().len();
        let pointer = {
            let mut scheduler = self.scheduler.lock().unwrap();
            scheduler.finished(i, len);
            scheduler.pointer()
        };
        self.emit(PipelineEvent::PointerChanged(pointer)).await;
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    /// Document-fatal failure: no segments were created.
    async fn fail_run(&self, message: String) {
        log::error!("pipeline: run aborted: {message}");
        self.log_event(message.clone()).await;
        self.emit(PipelineEvent::RunFailed(message)).await;
    }

    async fn log_event(&self, message: String) {
        self.emit(PipelineEvent::Log(LogLine::now(message))).await;
    }

    async fn emit(&self, event: PipelineEvent) {
        // A dropped receiver just means nobody is listening anymore.
        let _ = self.events.send(event).await;
    }
}

/// Returns `Some(prefix)` of the first `max_chars` characters when `text`
/// exceeds the ceiling, `None` otherwise.  Splits on character boundaries.
fn truncate_chars(text: &str, max_chars: usize) -> Option<String> {
    text.char_indices()
        .nth(max_chars)
        .map(|(idx, _)| text[..idx].to_string())
}

// ---------------------------------------------------------------------------
// RunTask — the sequential per-segment loop
// ---------------------------------------------------------------------------

/// State captured for one run's processing task.  All store writes carry
/// `run_id`; the first rejected write means the run was superseded and the
/// task abandons itself.
struct RunTask {
    store: SharedStore,
    scheduler: SharedScheduler,
    translator: Arc<dyn Translator>,
    synthesizer: Arc<dyn Synthesizer>,
    events: mpsc::Sender<PipelineEvent>,
    run_id: RunId,
    mode: NarrationMode,
    total: usize,
}

impl RunTask {
    async fn process_run(self) {
        for i in 0..self.total {
            if !self.process_segment(i).await {
                log::debug!("pipeline: run {} superseded at segment {i}", self.run_id);
                return;
            }
        }

        if !self.store.lock().unwrap().set_progress(self.run_id, None) {
            return;
        }
        self.emit(PipelineEvent::Progress(None)).await;

        let (succeeded, failed) = {
            let store = self.store.lock().unwrap();
            let snapshot = store.snapshot();
            (
                snapshot
                    .iter()
                    .filter(|s| s.status == SegmentStatus::Success)
                    .count(),
                snapshot
                    .iter()
                    .filter(|s| s.status == SegmentStatus::Error)
                    .count(),
            )
        };

        log::info!(
            "pipeline: run {} complete, {succeeded} narrated, {failed} failed",
            self.run_id
        );
        self.emit(PipelineEvent::Log(LogLine::now(format!(
            "narration complete: {succeeded} segments ready, {failed} failed"
        ))))
        .await;
        self.emit(PipelineEvent::RunFinished { succeeded, failed })
            .await;
    }

    /// Drive segment `i` to a terminal status.  Returns `false` when the
    /// run was superseded and the task must stop.
    async fn process_segment(&self, i: usize) -> bool {
        let original = match self.store.lock().unwrap().original_text(self.run_id, i) {
            Some(text) => text,
            None => return false,
        };

        let progress = Progress {
            current: i + 1,
            total: self.total,
        };
        {
            let mut store = self.store.lock().unwrap();
            if !store.mark_processing(self.run_id, i) {
                return false;
            }
            store.set_progress(self.run_id, Some(progress));
        }
        self.emit(PipelineEvent::Progress(Some(progress))).await;
        self.emit(PipelineEvent::StoreChanged).await;

        // ── 1. Translate / condense ──────────────────────────────────────
        let translated = match self.translator.translate(&original, self.mode).await {
            Ok(text) => text,
            Err(e) => {
                return self
                    .fail_segment(i, format!("translation failed: {e}"))
                    .await;
            }
        };
        if !self
            .store
            .lock()
            .unwrap()
            .set_translated(self.run_id, i, translated.clone())
        {
            return false;
        }

        // ── 2. Synthesize speech ─────────────────────────────────────────
        let pcm = match self.synthesizer.synthesize(&translated).await {
            Ok(bytes) => bytes,
            Err(e) => {
                return self
                    .fail_segment(i, format!("speech synthesis failed: {e}"))
                    .await;
            }
        };

        // ── 3. Decode + encode into a playable clip ──────────────────────
        let clip = match AudioClip::from_pcm16(&pcm, SAMPLE_RATE_HZ) {
            Ok(clip) => clip,
            Err(e) => {
                return self
                    .fail_segment(i, format!("audio decoding failed: {e}"))
                    .await;
            }
        };

        if !self.store.lock().unwrap().mark_success(self.run_id, i, clip) {
            return false;
        }
        self.emit(PipelineEvent::StoreChanged).await;
        self.emit(PipelineEvent::Log(LogLine::now(format!(
            "segment {}/{} ready",
            i + 1,
            self.total
        ))))
        .await;

        // ── 4. Auto-start playback on the first ready front segment ──────
        if i == 0 {
            let started = self.scheduler.lock().unwrap().auto_start();
            if started {
                self.emit(PipelineEvent::PointerChanged(Some(0))).await;
            }
        }

        true
    }

    /// Record a segment-local failure and keep the run going.  Returns
    /// `false` only when the write was rejected because the run is stale.
    async fn fail_segment(&self, i: usize, message: String) -> bool {
        log::warn!("pipeline: segment {}: {message}", i + 1);
        if !self
            .store
            .lock()
            .unwrap()
            .mark_error(self.run_id, i, message.clone())
        {
            return false;
        }
        self.emit(PipelineEvent::Log(LogLine::now(format!(
            "segment {}/{}: {message}",
            i + 1,
            self.total
        ))))
        .await;
        self.emit(PipelineEvent::StoreChanged).await;
        true
    }

    async fn emit(&self, event: PipelineEvent) {
        let _ = self.events.send(event).await;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::{ExtractError, FailingExtractor, PlainTextExtractor};
    use crate::pipeline::playback::new_shared_scheduler;
    use crate::pipeline::store::new_shared_store;
    use crate::translate::MockTranslator;
    use crate::tts::MockSynthesizer;

    const TWO_SECTION_DOC: &str = "Abstract\n\nFoo bar.\n\nIntroduction\n\nBaz qux.";

    struct Harness {
        store: SharedStore,
        scheduler: SharedScheduler,
        command_tx: mpsc::Sender<PipelineCommand>,
        event_rx: mpsc::Receiver<PipelineEvent>,
    }

    fn spawn_orchestrator(
        extractor: Arc<dyn TextExtractor>,
        translator: Arc<dyn Translator>,
        synthesizer: Arc<dyn Synthesizer>,
    ) -> Harness {
        let store = new_shared_store();
        let scheduler = new_shared_scheduler();
        let (command_tx, command_rx) = mpsc::channel(16);
        let (event_tx, event_rx) = mpsc::channel(256);

        let orchestrator = PipelineOrchestrator::new(
            Arc::clone(&store),
            Arc::clone(&scheduler),
            extractor,
            translator,
            synthesizer,
            SegmenterConfig::default(),
            event_tx,
        );
        tokio::spawn(orchestrator.run(command_rx));

        Harness {
            store,
            scheduler,
            command_tx,
            event_rx,
        }
    }

    fn default_harness() -> Harness {
        spawn_orchestrator(
            Arc::new(PlainTextExtractor),
            Arc::new(MockTranslator::ok()),
            Arc::new(MockSynthesizer::ok(240)),
        )
    }

    async fn start_run(harness: &Harness, document: &str) {
        harness
            .command_tx
            .send(PipelineCommand::StartRun {
                payload: DocumentPayload::PlainText(document.into()),
                mode: NarrationMode::Literal,
            })
            .await
            .unwrap();
    }

    /// Drain events until the run terminates, returning everything seen.
    async fn events_until_terminal(harness: &mut Harness) -> Vec<PipelineEvent> {
        let mut seen = Vec::new();
        while let Some(event) = harness.event_rx.recv().await {
            let terminal = matches!(
                event,
                PipelineEvent::RunFinished { .. } | PipelineEvent::RunFailed(_)
            );
            seen.push(event);
            if terminal {
                break;
            }
        }
        seen
    }

    // ---- happy path ---

    #[tokio::test]
    async fn all_segments_reach_success() {
        let mut harness = default_harness();
        start_run(&harness, TWO_SECTION_DOC).await;
        let events = events_until_terminal(&mut harness).await;

        assert!(matches!(
            events.last(),
            Some(PipelineEvent::RunFinished {
                succeeded: 2,
                failed: 0
            })
        ));

        let store = harness.store.lock().unwrap();
        assert_eq!(store.len(), 2);
        for segment in store.snapshot() {
            assert_eq!(segment.status, SegmentStatus::Success);
            assert!(segment.audio.is_some());
            assert_eq!(
                segment.translated_text.as_deref(),
                Some(format!("narrated: {}", segment.original_text).as_str())
            );
        }
        assert!(store.progress().is_none());
    }

    #[tokio::test]
    async fn first_success_auto_starts_playback() {
        let mut harness = default_harness();
        start_run(&harness, TWO_SECTION_DOC).await;
        let events = events_until_terminal(&mut harness).await;

        assert_eq!(harness.scheduler.lock().unwrap().pointer(), Some(0));
        assert!(events
            .iter()
            .any(|e| matches!(e, PipelineEvent::PointerChanged(Some(0)))));
    }

    #[tokio::test]
    async fn progress_is_monotonic_and_cleared_at_the_end() {
        let mut harness = default_harness();
        start_run(&harness, TWO_SECTION_DOC).await;
        let events = events_until_terminal(&mut harness).await;

        let progress: Vec<Option<Progress>> = events
            .iter()
            .filter_map(|e| match e {
                PipelineEvent::Progress(p) => Some(*p),
                _ => None,
            })
            .collect();

        let currents: Vec<usize> = progress.iter().flatten().map(|p| p.current).collect();
        assert_eq!(currents, vec![1, 2]);
        assert_eq!(progress.last(), Some(&None));
    }

    // ---- segment-local failure isolation ---

    #[tokio::test]
    async fn failing_translation_isolates_one_segment() {
        let mut harness = spawn_orchestrator(
            Arc::new(PlainTextExtractor),
            Arc::new(MockTranslator::failing_on("Baz")),
            Arc::new(MockSynthesizer::ok(240)),
        );
        start_run(&harness, TWO_SECTION_DOC).await;
        let events = events_until_terminal(&mut harness).await;

        assert!(matches!(
            events.last(),
            Some(PipelineEvent::RunFinished {
                succeeded: 1,
                failed: 1
            })
        ));

        let store = harness.store.lock().unwrap();
        let snapshot = store.snapshot();
        assert_eq!(snapshot[0].status, SegmentStatus::Success);
        assert_eq!(snapshot[1].status, SegmentStatus::Error);
        assert!(snapshot[1]
            .error
            .as_deref()
            .unwrap()
            .starts_with("translation failed"));
        assert!(snapshot[1].audio.is_none());
    }

    #[tokio::test]
    async fn failing_synthesis_isolates_one_segment() {
        let mut harness = spawn_orchestrator(
            Arc::new(PlainTextExtractor),
            Arc::new(MockTranslator::ok()),
            // The mock translator prefixes, so match against the source text.
            Arc::new(MockSynthesizer::failing_on("Foo bar")),
        );
        start_run(&harness, TWO_SECTION_DOC).await;
        let events = events_until_terminal(&mut harness).await;

        assert!(matches!(
            events.last(),
            Some(PipelineEvent::RunFinished {
                succeeded: 1,
                failed: 1
            })
        ));

        let store = harness.store.lock().unwrap();
        let snapshot = store.snapshot();
        assert_eq!(snapshot[0].status, SegmentStatus::Error);
        // Translation had succeeded before synthesis failed.
        assert!(snapshot[0].translated_text.is_some());
        assert_eq!(snapshot[1].status, SegmentStatus::Success);
    }

    // ---- document-fatal failures ---

    #[tokio::test]
    async fn empty_document_fails_the_run() {
        let mut harness = default_harness();
        start_run(&harness, "   \n\n  ").await;
        let events = events_until_terminal(&mut harness).await;

        assert!(matches!(events.last(), Some(PipelineEvent::RunFailed(_))));
        assert!(harness.store.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn extraction_failure_fails_the_run() {
        let mut harness = spawn_orchestrator(
            Arc::new(FailingExtractor(ExtractError::UnsupportedFormat(
                "application/pdf".into(),
            ))),
            Arc::new(MockTranslator::ok()),
            Arc::new(MockSynthesizer::ok(240)),
        );
        start_run(&harness, "irrelevant").await;
        let events = events_until_terminal(&mut harness).await;

        match events.last() {
            Some(PipelineEvent::RunFailed(message)) => {
                assert!(message.contains("extraction failed"));
            }
            other => panic!("expected RunFailed, got {other:?}"),
        }
    }

    // ---- truncation ---

    #[tokio::test]
    async fn oversized_document_is_truncated_before_segmentation() {
        let mut harness = default_harness();
        let document = "a".repeat(60_000);
        start_run(&harness, &document).await;
        let events = events_until_terminal(&mut harness).await;

        // Truncation is lossy but not fatal: the run still completes.
        assert!(matches!(
            events.last(),
            Some(PipelineEvent::RunFinished { .. })
        ));
        assert!(events.iter().any(|e| matches!(
            e,
            PipelineEvent::Log(line) if line.message.contains("longer than")
        )));

        let store = harness.store.lock().unwrap();
        let total_chars: usize = store
            .snapshot()
            .iter()
            .map(|s| s.original_text.chars().count())
            .sum();
        assert_eq!(total_chars, 50_000);
    }

    // ---- listener commands ---

    #[tokio::test]
    async fn select_and_finished_move_the_pointer() {
        let mut harness = default_harness();
        start_run(&harness, TWO_SECTION_DOC).await;
        events_until_terminal(&mut harness).await;

        harness
            .command_tx
            .send(PipelineCommand::SelectSegment(1))
            .await
            .unwrap();
        loop {
            match harness.event_rx.recv().await.unwrap() {
                PipelineEvent::PointerChanged(p) => {
                    assert_eq!(p, Some(1));
                    break;
                }
                _ => continue,
            }
        }

        // Finishing the last segment clears the pointer (end of queue).
        harness
            .command_tx
            .send(PipelineCommand::SegmentFinished(1))
            .await
            .unwrap();
        loop {
            match harness.event_rx.recv().await.unwrap() {
                PipelineEvent::PointerChanged(p) => {
                    assert_eq!(p, None);
                    break;
                }
                _ => continue,
            }
        }
    }

    #[tokio::test]
    async fn out_of_range_select_is_ignored() {
        let mut harness = default_harness();
        start_run(&harness, TWO_SECTION_DOC).await;
        events_until_terminal(&mut harness).await;

        harness
            .command_tx
            .send(PipelineCommand::SelectSegment(99))
            .await
            .unwrap();
        // The pointer stays on the auto-started front segment.
        harness
            .command_tx
            .send(PipelineCommand::SelectSegment(1))
            .await
            .unwrap();
        loop {
            match harness.event_rx.recv().await.unwrap() {
                PipelineEvent::PointerChanged(p) => {
                    assert_eq!(p, Some(1));
                    break;
                }
                _ => continue,
            }
        }
    }

    // ---- new run replaces the old ---

    #[tokio::test]
    async fn second_run_replaces_first() {
        let mut harness = default_harness();
        start_run(&harness, TWO_SECTION_DOC).await;
        events_until_terminal(&mut harness).await;

        start_run(&harness, "Conclusion\n\nShort and sweet.").await;
        let events = events_until_terminal(&mut harness).await;

        assert!(matches!(
            events.last(),
            Some(PipelineEvent::RunFinished {
                succeeded: 1,
                failed: 0
            })
        ));
        assert_eq!(harness.store.lock().unwrap().len(), 1);
    }

    // ---- LogLine ---

    #[test]
    fn log_line_display_has_timestamp_prefix() {
        let line = LogLine::now("hello");
        let rendered = line.to_string();
        assert!(rendered.starts_with('['));
        assert!(rendered.ends_with("] hello"));
    }

    #[test]
    fn truncate_chars_is_char_boundary_safe() {
        assert_eq!(truncate_chars("héllo", 2), Some("hé".into()));
        assert_eq!(truncate_chars("hi", 10), None);
        assert_eq!(truncate_chars("hi", 2), None);
    }
}
