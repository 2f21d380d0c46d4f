//! Output types returned by a generation run.

use crate::config::{OutputFormat, Theme};
use crate::error::FileError;
use crate::pipeline::sections::SectionMap;
use crate::prompts::ContentType;
use serde::Serialize;
use std::path::PathBuf;

/// The result of a magazine generation run.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationOutput {
    /// Parsed sections, in reply order.
    pub sections: SectionMap,

    /// The model's reply after clean-up (what the parser saw).
    pub reply: String,

    /// Name of the backend that produced the reply.
    pub backend: String,

    /// Per-input outcome, in command-line order.
    pub files: Vec<FileResult>,

    /// Labels detected in the combined text.
    pub content_types: Vec<ContentType>,

    pub theme: Theme,

    /// Format of the rendered document.
    pub format: OutputFormat,

    /// Rendered document bytes (PDF or UTF-8 HTML). Not serialised.
    #[serde(skip)]
    pub document: Vec<u8>,

    pub stats: GenerationStats,
}

/// Outcome of extracting one input file.
#[derive(Debug, Clone, Serialize)]
pub struct FileResult {
    pub path: PathBuf,

    /// Characters of extracted text; `0` when skipped.
    pub chars: usize,

    /// Why the file was skipped, if it was.
    pub error: Option<FileError>,
}

impl FileResult {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Run statistics.
#[derive(Debug, Clone, Default, Serialize)]
pub struct GenerationStats {
    pub files_total: usize,
    pub files_parsed: usize,
    pub files_skipped: usize,

    /// Length of the combined text sent to the model, in characters.
    pub input_chars: usize,

    /// Number of backends tried, including the one that answered.
    pub backends_tried: usize,

    pub model_duration_ms: u64,
    pub total_duration_ms: u64,

    /// Rendered sections, not counting `"Title"`.
    pub sections: usize,

    /// Pages in the native PDF layout; `None` for HTML or markup-converted PDF.
    pub pages: Option<usize>,
}
