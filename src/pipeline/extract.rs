//! Text extraction: map each input file to plain text.
//!
//! Dispatch is by case-insensitive extension through [`FORMAT_TABLE`]. Every
//! format library call is blocking, so each extraction runs inside
//! `spawn_blocking`.
//!
//! A failing file never aborts the run: [`extract_sources`] records the
//! failure as a [`FileError`] and moves on to the next input.

use crate::error::{FileError, MagazineError};
use crate::output::FileResult;
use crate::progress::ProgressCallback;
use once_cell::sync::Lazy;
use pdfium_render::prelude::*;
use regex::Regex;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Input format family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Pdf,
    Word,
    Image,
    Html,
    Text,
}

/// Extension (lower-case, no dot) → format.
pub static FORMAT_TABLE: &[(&str, SourceFormat)] = &[
    ("pdf", SourceFormat::Pdf),
    ("docx", SourceFormat::Word),
    ("doc", SourceFormat::Word),
    ("png", SourceFormat::Image),
    ("jpg", SourceFormat::Image),
    ("jpeg", SourceFormat::Image),
    ("bmp", SourceFormat::Image),
    ("tiff", SourceFormat::Image),
    ("html", SourceFormat::Html),
    ("txt", SourceFormat::Text),
];

impl SourceFormat {
    /// Resolve the format from the file extension.
    pub fn from_path(path: &Path) -> Result<Self, MagazineError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        FORMAT_TABLE
            .iter()
            .find(|(e, _)| *e == ext)
            .map(|(_, f)| *f)
            .ok_or_else(|| MagazineError::UnsupportedFormat {
                path: path.to_path_buf(),
                extension: format!(".{ext}"),
            })
    }

    pub fn label(self) -> &'static str {
        match self {
            SourceFormat::Pdf => "PDF",
            SourceFormat::Word => "Word",
            SourceFormat::Image => "image",
            SourceFormat::Html => "HTML",
            SourceFormat::Text => "text",
        }
    }
}

/// Combined text of every readable input, plus the per-file outcome.
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    pub combined: String,
    pub files: Vec<FileResult>,
}

/// The block appended to the combined text for one source.
pub fn source_block(file_name: &str, text: &str) -> String {
    format!("\n--- Content from {file_name} ---\n{text}\n")
}

/// Base name of a path, falling back to the full path.
pub fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Extract every input in order. Never fails; skipped files are reported in
/// [`Extraction::files`].
pub async fn extract_sources(paths: &[PathBuf], progress: Option<&ProgressCallback>) -> Extraction {
    let mut out = Extraction::default();

    for path in paths {
        match extract_text(path).await {
            Ok(text) => {
                let chars = text.chars().count();
                info!("Parsed: {} ({} chars)", path.display(), chars);
                out.combined.push_str(&source_block(&file_name(path), &text));
                if let Some(cb) = progress {
                    cb.on_file_parsed(path, chars);
                }
                out.files.push(FileResult {
                    path: path.clone(),
                    chars,
                    error: None,
                });
            }
            Err(e) => {
                let err = FileError::from(e);
                warn!("Skipping {}: {}", path.display(), err);
                if let Some(cb) = progress {
                    cb.on_file_skipped(path, &err.to_string());
                }
                out.files.push(FileResult {
                    path: path.clone(),
                    chars: 0,
                    error: Some(err),
                });
            }
        }
    }

    out
}

/// Extract plain text from one file.
pub async fn extract_text(path: &Path) -> Result<String, MagazineError> {
    if !path.exists() {
        return Err(MagazineError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    let format = SourceFormat::from_path(path)?;
    debug!("Extracting {} as {}", path.display(), format.label());

    let owned = path.to_path_buf();
    let result = tokio::task::spawn_blocking(move || extract_blocking(&owned, format))
        .await
        .map_err(|e| MagazineError::Internal(format!("Extraction task panicked: {}", e)))?;

    result.map_err(|detail| MagazineError::ExtractionFailed {
        path: path.to_path_buf(),
        format: format.label().to_string(),
        detail,
    })
}

fn extract_blocking(path: &Path, format: SourceFormat) -> Result<String, String> {
    match format {
        SourceFormat::Pdf => extract_pdf(path),
        SourceFormat::Word => extract_word(path),
        SourceFormat::Image => extract_image(path),
        SourceFormat::Html => extract_html(path),
        SourceFormat::Text => extract_plain(path),
    }
}

// ── PDF ──────────────────────────────────────────────────────────────────────

/// Bind pdfium: `PDFIUM_LIB_PATH` (file or directory), then the working
/// directory, then the system library search path.
fn bind_pdfium() -> Result<Pdfium, String> {
    if let Ok(configured) = std::env::var("PDFIUM_LIB_PATH") {
        let configured = PathBuf::from(configured);
        let lib = if configured.is_dir() {
            Pdfium::pdfium_platform_library_name_at_path(&configured)
        } else {
            configured
        };
        match Pdfium::bind_to_library(&lib) {
            Ok(bindings) => return Ok(Pdfium::new(bindings)),
            Err(e) => warn!("PDFIUM_LIB_PATH {} not usable: {:?}", lib.display(), e),
        }
    }

    Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
        .or_else(|_| Pdfium::bind_to_system_library())
        .map(Pdfium::new)
        .map_err(|e| format!("pdfium library not available: {:?}", e))
}

fn extract_pdf(path: &Path) -> Result<String, String> {
    let pdfium = bind_pdfium()?;
    let document = pdfium
        .load_pdf_from_file(path, None)
        .map_err(|e| format!("{:?}", e))?;

    let mut text = String::new();
    for (idx, page) in document.pages().iter().enumerate() {
        let page_text = page
            .text()
            .map_err(|e| format!("page {}: {:?}", idx + 1, e))?;
        text.push_str(&page_text.all());
        text.push('\n');
    }
    Ok(text)
}

// ── Word ─────────────────────────────────────────────────────────────────────

fn extract_word(path: &Path) -> Result<String, String> {
    use docx_rs::{DocumentChild, TableCellContent, TableChild, TableRowChild};

    let bytes = std::fs::read(path).map_err(|e| e.to_string())?;
    let docx = docx_rs::read_docx(&bytes).map_err(|e| format!("Failed to parse DOCX: {e}"))?;

    let mut text = String::new();
    for child in &docx.document.children {
        match child {
            DocumentChild::Paragraph(p) => {
                text.push_str(&paragraph_text(p));
                text.push('\n');
            }
            DocumentChild::Table(t) => {
                for row in &t.rows {
                    let TableChild::TableRow(r) = row;
                    let cells: Vec<String> = r
                        .cells
                        .iter()
                        .map(|cell| {
                            let TableRowChild::TableCell(c) = cell;
                            c.children
                                .iter()
                                .filter_map(|content| match content {
                                    TableCellContent::Paragraph(p) => Some(paragraph_text(p)),
                                    _ => None,
                                })
                                .filter(|s| !s.trim().is_empty())
                                .collect::<Vec<_>>()
                                .join(" ")
                        })
                        .collect();
                    text.push_str(&cells.join(" | "));
                    text.push('\n');
                }
            }
            _ => {}
        }
    }
    Ok(text)
}

fn paragraph_text(p: &docx_rs::Paragraph) -> String {
    use docx_rs::ParagraphChild;

    let mut text = String::new();
    for child in &p.children {
        match child {
            ParagraphChild::Run(r) => push_run_text(r, &mut text),
            ParagraphChild::Hyperlink(h) => {
                for inner in &h.children {
                    if let ParagraphChild::Run(r) = inner {
                        push_run_text(r, &mut text);
                    }
                }
            }
            _ => {}
        }
    }
    text
}

fn push_run_text(run: &docx_rs::Run, text: &mut String) {
    use docx_rs::RunChild;

    for child in &run.children {
        match child {
            RunChild::Text(t) => text.push_str(&t.text),
            RunChild::Tab(_) => text.push('\t'),
            RunChild::Break(_) => text.push('\n'),
            _ => {}
        }
    }
}

// ── Image (OCR) ──────────────────────────────────────────────────────────────

fn extract_image(path: &Path) -> Result<String, String> {
    let (w, h) = image::image_dimensions(path).map_err(|e| format!("unreadable image: {e}"))?;
    debug!("OCR on {}x{} image {}", w, h, path.display());

    let img = rusty_tesseract::Image::from_path(path).map_err(|e| format!("{e:?}"))?;
    rusty_tesseract::image_to_string(&img, &rusty_tesseract::Args::default())
        .map_err(|e| format!("tesseract: {e:?}"))
}

// ── HTML ─────────────────────────────────────────────────────────────────────

fn extract_html(path: &Path) -> Result<String, String> {
    let html = std::fs::read_to_string(path).map_err(|e| e.to_string())?;
    Ok(markdown_to_text(&html2md::parse_html(&html)))
}

static RE_MD_IMAGE: Lazy<Regex> = Lazy::new(|| Regex::new(r"!\[([^\]]*)\]\([^)]*\)").unwrap());
static RE_MD_LINK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[([^\]]*)\]\([^)]*\)").unwrap());
static RE_MD_SETEXT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^[ \t]*(?:=+|-{3,})[ \t]*\n?").unwrap());
static RE_MD_ATX: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^[ \t]*#{1,6}[ \t]+").unwrap());
static RE_MD_EMPHASIS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*\*|__").unwrap());
static RE_MD_ESCAPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\\([\\`*_{}\[\]()#+.!<>-])").unwrap());

/// Reduce html2md's Markdown to the visible text: link and image targets,
/// heading underlines and markers, bold markers and escapes are removed.
fn markdown_to_text(markdown: &str) -> String {
    let s = RE_MD_IMAGE.replace_all(markdown, "$1");
    let s = RE_MD_LINK.replace_all(&s, "$1");
    let s = RE_MD_SETEXT.replace_all(&s, "");
    let s = RE_MD_ATX.replace_all(&s, "");
    let s = RE_MD_EMPHASIS.replace_all(&s, "");
    RE_MD_ESCAPE.replace_all(&s, "$1").into_owned()
}

// ── Plain text ───────────────────────────────────────────────────────────────

fn extract_plain(path: &Path) -> Result<String, String> {
    std::fs::read_to_string(path).map_err(|e| e.to_string())
}
