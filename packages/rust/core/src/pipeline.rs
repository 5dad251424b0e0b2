//! End-to-end coding pipeline: load → chunk → classify → highlight → legend → save.

use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::{info, instrument};

use transcoder_classifier::{ChatBackend, classify_chunk};
use transcoder_shared::{DEFAULT_MAX_CHUNK_CHARS, Document, Result, TranscoderError};

use crate::chunker::chunk_paragraphs;
use crate::highlight::apply_highlights;
use crate::legend::append_legend;

/// Tunables for coding one document.
#[derive(Debug, Clone)]
pub struct CodingOptions {
    /// Character budget per classification chunk.
    pub max_chunk_chars: usize,
}

impl Default for CodingOptions {
    fn default() -> Self {
        Self {
            max_chunk_chars: DEFAULT_MAX_CHUNK_CHARS,
        }
    }
}

/// Counts gathered while coding one document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodingSummary {
    /// Non-empty paragraphs sent for classification.
    pub paragraphs: usize,
    pub chunks: usize,
    /// Quote matches returned across all chunks.
    pub matches: usize,
    /// Matches that marked at least one paragraph.
    pub applied: usize,
}

/// Configuration for [`code_transcript`].
#[derive(Debug, Clone)]
pub struct CodeTranscriptConfig {
    /// Source `.docx`.
    pub input: PathBuf,
    /// Destination `.docx`; written once, at the very end.
    pub output: PathBuf,
    pub options: CodingOptions,
}

/// Result of [`code_transcript`].
#[derive(Debug)]
pub struct CodeTranscriptResult {
    pub output: PathBuf,
    pub summary: CodingSummary,
    /// Total elapsed time.
    pub elapsed: std::time::Duration,
}

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called before a chunk is sent for classification.
    fn chunk_started(&self, current: usize, total: usize, chars: usize);
    /// Called after a chunk's matches were received.
    fn chunk_coded(&self, current: usize, total: usize, matches: usize);
    /// Called when the pipeline completes.
    fn done(&self, result: &CodeTranscriptResult);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn chunk_started(&self, _current: usize, _total: usize, _chars: usize) {}
    fn chunk_coded(&self, _current: usize, _total: usize, _matches: usize) {}
    fn done(&self, _result: &CodeTranscriptResult) {}
}

/// Default destination: `<stem><suffix>.docx` next to the input.
pub fn default_output_path(input: &Path, suffix: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "transcript".to_string());
    input.with_file_name(format!("{stem}{suffix}.docx"))
}

/// Code an in-memory document.
///
/// Chunks are classified one at a time, in order. Every returned match is
/// applied against the whole document, and the legend is always appended.
/// Any classification failure aborts before the document is touched.
#[instrument(skip_all, fields(paragraphs = document.len(), max_chars = options.max_chunk_chars))]
pub async fn code_document(
    document: &mut Document,
    backend: &dyn ChatBackend,
    options: &CodingOptions,
    progress: &dyn ProgressReporter,
) -> Result<CodingSummary> {
    if options.max_chunk_chars == 0 {
        return Err(TranscoderError::validation(
            "max_chunk_chars must be greater than zero",
        ));
    }

    let paragraphs = document.text_paragraphs();
    if paragraphs.is_empty() {
        return Err(TranscoderError::EmptyDocument);
    }

    let chunks = chunk_paragraphs(&paragraphs, options.max_chunk_chars);
    let total = chunks.len();

    progress.phase("Coding transcript");
    let mut matches = Vec::new();
    for (i, chunk) in chunks.iter().enumerate() {
        let chars = chunk.chars().count();
        progress.chunk_started(i + 1, total, chars);
        info!(chunk = i + 1, total, chars, "coding chunk");

        let found = classify_chunk(backend, chunk).await?;

        progress.chunk_coded(i + 1, total, found.len());
        info!(chunk = i + 1, matches = found.len(), "received matches");
        matches.extend(found);
    }

    let applied = if matches.is_empty() {
        progress.phase("No excerpts were returned by the model");
        info!("no matches returned, skipping highlights");
        0
    } else {
        progress.phase("Applying highlights");
        let applied = apply_highlights(document, &matches);
        info!(applied, matches = matches.len(), "highlights applied");
        applied
    };

    progress.phase("Appending legend");
    append_legend(document);

    Ok(CodingSummary {
        paragraphs: paragraphs.len(),
        chunks: total,
        matches: matches.len(),
        applied,
    })
}

/// Run the full pipeline on a `.docx` file.
///
/// 1. Load the transcript
/// 2. Code it ([`code_document`])
/// 3. Save the copy to the destination
///
/// Nothing is written unless every earlier step succeeded.
#[instrument(skip_all, fields(input = %config.input.display(), output = %config.output.display()))]
pub async fn code_transcript(
    config: &CodeTranscriptConfig,
    backend: &dyn ChatBackend,
    progress: &dyn ProgressReporter,
) -> Result<CodeTranscriptResult> {
    let start = Instant::now();

    progress.phase("Loading transcript");
    let input = config.input.clone();
    let (mut document, package) = run_blocking(move || transcoder_docx::open(&input)).await?;

    let summary = code_document(&mut document, backend, &config.options, progress).await?;

    progress.phase("Saving coded transcript");
    let output = config.output.clone();
    run_blocking(move || package.save(&document, &output)).await?;

    let result = CodeTranscriptResult {
        output: config.output.clone(),
        summary,
        elapsed: start.elapsed(),
    };

    info!(
        applied = result.summary.applied,
        matches = result.summary.matches,
        chunks = result.summary.chunks,
        elapsed_ms = result.elapsed.as_millis() as u64,
        "saved coded transcript"
    );
    progress.done(&result);

    Ok(result)
}

/// Run file and container work off the async worker threads.
async fn run_blocking<T, F>(work: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| TranscoderError::Document(format!("document task failed: {e}")))?
}
