//! Error types for the edgequake-magazine library.
//!
//! Three error types reflect three failure scopes:
//!
//! * [`MagazineError`] — **Fatal**: the run cannot produce an output file
//!   (unsupported output extension, every model backend down, the external
//!   renderer failed). Returned as `Err(MagazineError)` from the top-level
//!   `generate*` functions.
//!
//! * [`FileError`] — **Non-fatal**: one input file was missing, had an
//!   unsupported extension, or its format library choked. Stored inside
//!   [`crate::output::FileResult`]; the run continues with the text of the
//!   remaining files.
//!
//! * [`BackendError`] — one model backend failed. The backend chain collects
//!   these and only surfaces them (as [`MagazineError::ModelBackendFailed`])
//!   once every candidate has failed.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the edgequake-magazine library.
#[derive(Debug, Error)]
pub enum MagazineError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("Input file not found: '{path}'")]
    FileNotFound { path: PathBuf },

    /// The file extension is not one of the supported input or output formats.
    #[error("Unsupported file type '{extension}' for '{path}'")]
    UnsupportedFormat { path: PathBuf, extension: String },

    /// The format library failed to read the file.
    #[error("Failed to extract text from {format} file '{path}': {detail}")]
    ExtractionFailed {
        path: PathBuf,
        format: String,
        detail: String,
    },

    // ── LLM errors ────────────────────────────────────────────────────────
    /// Every configured model backend failed.
    ///
    /// `attempts` lists one message per backend, in the order they were tried.
    #[error("All model backends failed: {}", attempts.join("; "))]
    ModelBackendFailed { attempts: Vec<String> },

    // ── Output errors ─────────────────────────────────────────────────────
    /// The external markup-to-PDF renderer is missing or exited with an error.
    #[error("Rendering failed: {detail}")]
    RenderFailed { detail: String },

    /// Could not create or write the output file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A non-fatal error for a single input file.
#[derive(Debug, Clone, Error, serde::Serialize, serde::Deserialize)]
pub enum FileError {
    /// The path does not exist; the file is skipped.
    #[error("File not found: {path}")]
    Missing { path: PathBuf },

    /// The extension is not handled by any extractor.
    #[error("Unsupported file type '{extension}': {path}")]
    Unsupported { path: PathBuf, extension: String },

    /// The extractor for this format failed.
    #[error("Error parsing {path}: {detail}")]
    Extraction { path: PathBuf, detail: String },
}

impl From<MagazineError> for FileError {
    fn from(err: MagazineError) -> Self {
        match err {
            MagazineError::FileNotFound { path } => FileError::Missing { path },
            MagazineError::UnsupportedFormat { path, extension } => {
                FileError::Unsupported { path, extension }
            }
            MagazineError::ExtractionFailed { path, detail, .. } => {
                FileError::Extraction { path, detail }
            }
            other => FileError::Extraction {
                path: PathBuf::new(),
                detail: other.to_string(),
            },
        }
    }
}

/// Failure of a single model backend.
#[derive(Debug, Clone, Error)]
#[error("{backend}: {detail}")]
pub struct BackendError {
    pub backend: String,
    pub detail: String,
}

impl BackendError {
    pub fn new(backend: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            backend: backend.into(),
            detail: detail.into(),
        }
    }
}
