//! Progress-callback trait for generation events.
//!
//! Inject an [`Arc<dyn GenerationProgressCallback>`] via
//! [`crate::config::MagazineConfigBuilder::progress_callback`] to receive
//! events as the pipeline extracts files, calls the model and writes the
//! output. The CLI uses it to print its progress lines and drive a spinner.
//!
//! # Example
//!
//! ```rust
//! use edgequake_magazine::{GenerationProgressCallback, MagazineConfig};
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! struct Printer;
//!
//! impl GenerationProgressCallback for Printer {
//!     fn on_file_parsed(&self, path: &Path, chars: usize) {
//!         eprintln!("Parsed: {} ({chars} chars)", path.display());
//!     }
//! }
//!
//! let config = MagazineConfig::builder()
//!     .progress_callback(Arc::new(Printer) as Arc<dyn GenerationProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use crate::prompts::ContentType;
use std::path::Path;
use std::sync::Arc;

/// Called by the generation pipeline at each stage boundary.
///
/// All methods have default no-op implementations so callers only override
/// what they care about.
pub trait GenerationProgressCallback: Send + Sync {
    /// Called once before any file is read.
    fn on_generation_start(&self, total_files: usize) {
        let _ = total_files;
    }

    /// Called when a file's text was extracted.
    fn on_file_parsed(&self, path: &Path, chars: usize) {
        let _ = (path, chars);
    }

    /// Called when a file is skipped (missing, unsupported or unreadable).
    fn on_file_skipped(&self, path: &Path, reason: &str) {
        let _ = (path, reason);
    }

    /// Called after extraction with the combined text size and detected types.
    fn on_content_analysed(&self, total_chars: usize, content_types: &[ContentType]) {
        let _ = (total_chars, content_types);
    }

    /// Called just before a model backend is asked for a reply.
    fn on_model_start(&self, backend: &str) {
        let _ = backend;
    }

    /// Called when a backend failed and the next candidate is about to be tried.
    fn on_model_fallback(&self, failed_backend: &str, error: &str) {
        let _ = (failed_backend, error);
    }

    /// Called when a backend produced a reply.
    fn on_model_complete(&self, backend: &str, reply_len: usize) {
        let _ = (backend, reply_len);
    }

    /// Called once the output file has been written.
    fn on_output_written(&self, path: &Path, sections: usize) {
        let _ = (path, sections);
    }
}

/// A no-op implementation for callers that don't need progress events.
///
/// This is the default when no callback is configured.
pub struct NoopProgressCallback;

impl GenerationProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::MagazineConfig`].
pub type ProgressCallback = Arc<dyn GenerationProgressCallback>;
