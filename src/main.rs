//! Application entry point — audiopaper.
//!
//! A thin shell around the pipeline: it reads a document from disk, runs
//! one narration, prints progress and log lines, and writes every finished
//! segment's WAV next to the input file.  All rendering, drag-and-drop and
//! playback chrome live outside this crate.
//!
//! # Startup sequence
//!
//! 1. Initialise logging.
//! 2. Load [`AppConfig`] from disk (returns default on first run).
//! 3. Build the API collaborators ([`ApiTranslator`], [`ApiSynthesizer`]).
//! 4. Create pipeline channels (`command`, `event`).
//! 5. Spawn the pipeline orchestrator and send `StartRun`.
//! 6. Consume events until the run terminates, then export WAV files.
//!
//! # Usage
//!
//! ```text
//! audiopaper <document.txt> [--podcast | --literal]
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context};
use tokio::sync::mpsc;

use audiopaper::{
    config::{AppConfig, NarrationMode},
    extract::{DocumentPayload, PlainTextExtractor},
    pipeline::{
        new_shared_scheduler, new_shared_store, PipelineCommand, PipelineEvent,
        PipelineOrchestrator, SegmentStatus, SharedStore,
    },
    translate::ApiTranslator,
    tts::ApiSynthesizer,
};

// ---------------------------------------------------------------------------
// CLI arguments
// ---------------------------------------------------------------------------

struct CliArgs {
    document: PathBuf,
    mode_override: Option<NarrationMode>,
}

fn parse_args() -> anyhow::Result<CliArgs> {
    let mut document = None;
    let mut mode_override = None;

    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--podcast" => mode_override = Some(NarrationMode::Podcast),
            "--literal" => mode_override = Some(NarrationMode::Literal),
            _ if arg.starts_with("--") => bail!("unknown flag: {arg}"),
            _ => document = Some(PathBuf::from(arg)),
        }
    }

    let document = document.context("usage: audiopaper <document.txt> [--podcast | --literal]")?;
    Ok(CliArgs {
        document,
        mode_override,
    })
}

// ---------------------------------------------------------------------------
// WAV export
// ---------------------------------------------------------------------------

/// Write every successful segment's WAV next to the input document as
/// `<stem>-NN.wav`.  Runs on the blocking thread pool.
fn export_wavs(store: &SharedStore, input: &Path) -> anyhow::Result<usize> {
    let snapshot = store.lock().unwrap().snapshot();
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("narration");
    let dir = input.parent().unwrap_or_else(|| Path::new("."));

    let mut written = 0;
    for segment in &snapshot {
        if segment.status != SegmentStatus::Success {
            continue;
        }
        let clip = segment
            .audio
            .as_ref()
            .context("success segment without audio")?;
        let path = dir.join(format!("{stem}-{:02}.wav", segment.id + 1));
        std::fs::write(&path, clip.wav_bytes())
            .with_context(|| format!("writing {}", path.display()))?;
        log::info!(
            "wrote {} ({:.1}s, {})",
            path.display(),
            clip.duration_secs(),
            segment.title
        );
        written += 1;
    }
    Ok(written)
}

// ---------------------------------------------------------------------------
// main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("audiopaper starting up");

    // 2. Configuration
    let config = AppConfig::load().unwrap_or_else(|e| {
        log::warn!("Failed to load config ({e}); using defaults");
        AppConfig::default()
    });

    let args = parse_args()?;
    let mode = args.mode_override.unwrap_or(config.mode);

    let text = std::fs::read_to_string(&args.document)
        .with_context(|| format!("reading {}", args.document.display()))?;

    // 3. Collaborators
    let translator = Arc::new(ApiTranslator::from_config(&config.translator));
    let synthesizer = Arc::new(ApiSynthesizer::from_config(&config.tts));

    // 4. Channel setup
    let (command_tx, command_rx) = mpsc::channel::<PipelineCommand>(16);
    let (event_tx, mut event_rx) = mpsc::channel::<PipelineEvent>(64);

    let store = new_shared_store();
    let scheduler = new_shared_scheduler();

    // 5. Spawn the orchestrator and start the run
    let orchestrator = PipelineOrchestrator::new(
        Arc::clone(&store),
        Arc::clone(&scheduler),
        Arc::new(PlainTextExtractor),
        translator,
        synthesizer,
        config.segmenter.clone(),
        event_tx,
    );
    tokio::spawn(orchestrator.run(command_rx));

    command_tx
        .send(PipelineCommand::StartRun {
            payload: DocumentPayload::PlainText(text),
            mode,
        })
        .await
        .context("orchestrator channel closed")?;

    // 6. Consume events until the run terminates
    while let Some(event) = event_rx.recv().await {
        match event {
            PipelineEvent::Log(line) => println!("{line}"),
            PipelineEvent::Progress(Some(p)) => {
                println!("  processing segment {}/{}", p.current, p.total);
            }
            PipelineEvent::Progress(None) | PipelineEvent::StoreChanged => {}
            PipelineEvent::PointerChanged(pointer) => {
                log::debug!("playback pointer → {pointer:?}");
            }
            PipelineEvent::RunFinished { succeeded, failed } => {
                let store = Arc::clone(&store);
                let input = args.document.clone();
                let written =
                    tokio::task::spawn_blocking(move || export_wavs(&store, &input)).await??;
                println!("{written} WAV files written ({succeeded} ok, {failed} failed)");
                if succeeded == 0 {
                    bail!("no segment could be narrated");
                }
                return Ok(());
            }
            PipelineEvent::RunFailed(message) => {
                bail!("narration failed: {message}");
            }
        }
    }

    bail!("orchestrator stopped unexpectedly")
}
