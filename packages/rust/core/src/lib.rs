//! Core coding logic for Transcoder.
//!
//! This crate ties together chunking, classification, highlighting and the
//! legend into the end-to-end workflow (`code_transcript`).

pub mod chunker;
pub mod highlight;
pub mod legend;
pub mod pipeline;

pub use chunker::chunk_paragraphs;
pub use highlight::{apply_highlights, highlight_quote};
pub use legend::{LEGEND_TITLE, append_legend};
pub use pipeline::{
    CodeTranscriptConfig, CodeTranscriptResult, CodingOptions, CodingSummary, ProgressReporter,
    SilentProgress, code_document, code_transcript, default_output_path,
};
