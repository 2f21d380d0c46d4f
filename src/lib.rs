//! # edgequake-magazine
//!
//! Turn a pile of documents into a themed magazine.
//!
//! Text is pulled out of PDF, Word, image (OCR), HTML and plain-text files,
//! handed to a language model that reorganises it into sections, and the
//! reply is laid out as a paginated PDF or a single styled HTML page in one
//! of four themes.
//!
//! ## Pipeline Overview
//!
//! ```text
//! files
//!  │
//!  ├─ 1. Extract    pdfium / docx-rs / tesseract / html2md / read (spawn_blocking)
//!  ├─ 2. Analyse    keyword content types → instruction prompt
//!  ├─ 3. Model      hosted (OpenRouter, with a key) → local (ollama) fallback
//!  ├─ 4. Polish     reply clean-up (fences, TITLE:, # headings)
//!  ├─ 5. Sections   **Header** scan with a case-heuristic fallback
//!  └─ 6. Render     native PDF (lopdf) · HTML · HTML → external PDF converter
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use edgequake_magazine::{generate, MagazineConfig, Theme};
//! use std::path::PathBuf;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = MagazineConfig::builder().theme(Theme::Sports).build()?;
//!     let files = vec![PathBuf::from("report.pdf"), PathBuf::from("notes.txt")];
//!     let output = generate(&files, "magazine.pdf", &config).await?;
//!     println!("{} sections via {}", output.stats.sections, output.backend);
//!     Ok(())
//! }
//! ```
//!
//! Without an API key only the local backend is used, so a running ollama
//! with the configured model is required.
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `magazine` binary (clap + anyhow + indicatif + tracing-subscriber) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! edgequake-magazine = { version = "0.1", default-features = false }
//! ```
//!
//! ## External tools
//!
//! | Need | Tool |
//! |------|------|
//! | PDF input | pdfium shared library (`PDFIUM_LIB_PATH`, working dir or system) |
//! | Image input | `tesseract` on `PATH` |
//! | `PdfEngine::Markup` | `weasyprint` or `wkhtmltopdf` on `PATH` |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod generate;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod prompts;
pub mod render;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{MagazineConfig, MagazineConfigBuilder, OutputFormat, PdfEngine, Theme};
pub use error::{BackendError, FileError, MagazineError};
pub use generate::{generate, generate_document, generate_sync, render_document, render_options};
pub use output::{FileResult, GenerationOutput, GenerationStats};
pub use pipeline::llm::{BackendChain, HostedBackend, LocalBackend, ModelBackend};
pub use pipeline::sections::{parse_sections, SectionMap};
pub use progress::{GenerationProgressCallback, NoopProgressCallback, ProgressCallback};
pub use prompts::ContentType;
pub use render::RenderOptions;
