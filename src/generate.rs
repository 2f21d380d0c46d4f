//! Magazine generation entry points.
//!
//! [`generate`] runs the whole pipeline and writes the output file;
//! [`generate_document`] stops before the write and hands back the bytes.
//! The output format is resolved from the output path first, so an
//! unsupported extension fails before any file is read or any model called.

use crate::config::{MagazineConfig, OutputFormat, PdfEngine};
use crate::error::MagazineError;
use crate::output::{GenerationOutput, GenerationStats};
use crate::pipeline::extract::{extract_sources, file_name};
use crate::pipeline::llm::BackendChain;
use crate::pipeline::postprocess::clean_reply;
use crate::pipeline::sections::{parse_sections, SectionMap};
use crate::prompts::{build_prompt, detect_content_types};
use crate::render::{html, markup, pdf, RenderOptions};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};

/// Generate a magazine from `files` and write it to `output_path`.
///
/// The format follows the output extension (`.pdf` or `.html`, any case).
///
/// # Errors
/// Fatal errors only: unsupported output extension, every model backend
/// failing, the external markup renderer failing, or the write itself.
/// Missing or unreadable inputs are skipped and reported in
/// [`GenerationOutput::files`].
pub async fn generate(
    files: &[PathBuf],
    output_path: impl AsRef<Path>,
    config: &MagazineConfig,
) -> Result<GenerationOutput, MagazineError> {
    let path = output_path.as_ref();
    let format = OutputFormat::from_path(path)?;

    let output = generate_document(files, format, config).await?;
    write_atomic(path, format, &output.document).await?;
    info!("Magazine written to {}", path.display());

    if let Some(ref cb) = config.progress_callback {
        cb.on_output_written(path, output.stats.sections);
    }
    Ok(output)
}

/// Run the pipeline and render to `format` without writing a file.
pub async fn generate_document(
    files: &[PathBuf],
    format: OutputFormat,
    config: &MagazineConfig,
) -> Result<GenerationOutput, MagazineError> {
    let total_start = Instant::now();
    if files.is_empty() {
        return Err(MagazineError::InvalidConfig("No input files given".into()));
    }
    let chain = BackendChain::from_config(config)?;
    info!(
        "Generating {:?} magazine from {} file(s), backends: {}",
        format,
        files.len(),
        chain.names().join(" → ")
    );

    if let Some(ref cb) = config.progress_callback {
        cb.on_generation_start(files.len());
    }

    // ── Step 1: Extract ──────────────────────────────────────────────────
    let extraction = extract_sources(files, config.progress_callback.as_ref()).await;
    let input_chars = extraction.combined.chars().count();

    // ── Step 2: Analyse and compose the prompt ───────────────────────────
    let content_types = detect_content_types(&extraction.combined);
    info!(
        "Total content: {} chars, detected: {}",
        input_chars,
        content_types
            .iter()
            .map(|t| t.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );
    if let Some(ref cb) = config.progress_callback {
        cb.on_content_analysed(input_chars, &content_types);
    }

    let names: Vec<String> = files.iter().map(|p| file_name(p)).collect();
    let prompt = build_prompt(&extraction.combined, &content_types, &names);
    debug!("Prompt: {} chars", prompt.len());

    // ── Step 3: Model ────────────────────────────────────────────────────
    let reply = chain
        .generate(&prompt, config.progress_callback.as_ref())
        .await?;
    info!(
        "Reply from '{}' ({} chars) in {}ms",
        reply.backend,
        reply.reply.len(),
        reply.duration_ms
    );

    // ── Step 4: Clean up and parse ───────────────────────────────────────
    let cleaned = clean_reply(&reply.reply);
    let sections = parse_sections(&cleaned);
    debug!("Parsed sections: {:?}", sections.titles());

    // ── Step 5: Render ───────────────────────────────────────────────────
    let opts = render_options(config);
    let (document, pages) = render_document(&sections, format, config, &opts).await?;

    let files_parsed = extraction.files.iter().filter(|f| f.is_ok()).count();
    let stats = GenerationStats {
        files_total: extraction.files.len(),
        files_parsed,
        files_skipped: extraction.files.len() - files_parsed,
        input_chars,
        backends_tried: reply.backends_tried,
        model_duration_ms: reply.duration_ms,
        total_duration_ms: total_start.elapsed().as_millis() as u64,
        sections: sections.sections().count(),
        pages,
    };
    info!(
        "Generation complete: {}/{} files, {} sections, {}ms total",
        stats.files_parsed, stats.files_total, stats.sections, stats.total_duration_ms
    );

    Ok(GenerationOutput {
        sections,
        reply: cleaned,
        backend: reply.backend,
        files: extraction.files,
        content_types,
        theme: config.theme,
        format,
        document,
        stats,
    })
}

/// Synchronous wrapper around [`generate`].
///
/// Creates a temporary tokio runtime internally.
pub fn generate_sync(
    files: &[PathBuf],
    output_path: impl AsRef<Path>,
    config: &MagazineConfig,
) -> Result<GenerationOutput, MagazineError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| MagazineError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(generate(files, output_path, config))
}

/// Render options derived from a config, dated today.
pub fn render_options(config: &MagazineConfig) -> RenderOptions {
    RenderOptions {
        default_title: config.default_title.clone(),
        publisher: config.publisher.clone(),
        ..RenderOptions::new(config.theme)
    }
}

/// Render an already-parsed section map.
///
/// Returns the document bytes and, for the native PDF layout, the page count.
pub async fn render_document(
    sections: &SectionMap,
    format: OutputFormat,
    config: &MagazineConfig,
    opts: &RenderOptions,
) -> Result<(Vec<u8>, Option<usize>), MagazineError> {
    match (format, config.pdf_engine) {
        (OutputFormat::Html, _) => Ok((html::render_html(sections, opts).into_bytes(), None)),
        (OutputFormat::Pdf, PdfEngine::Native) => {
            let (bytes, pages) = pdf::render_pdf(sections, opts)?;
            debug!("Native PDF: {} pages, {} bytes", pages, bytes.len());
            Ok((bytes, Some(pages)))
        }
        (OutputFormat::Pdf, PdfEngine::Markup) => {
            let markup = html::render_html(sections, opts);
            let renderer = config.markup_renderer.clone();
            let bytes = tokio::task::spawn_blocking(move || {
                markup::html_to_pdf(&markup, renderer.as_deref())
            })
            .await
            .map_err(|e| MagazineError::Internal(format!("Render task panicked: {e}")))??;
            Ok((bytes, None))
        }
    }
}

/// Write to a sibling temp file, then rename over the target.
async fn write_atomic(path: &Path, format: OutputFormat, bytes: &[u8]) -> Result<(), MagazineError> {
    let write_err = |source| MagazineError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
    }

    let tmp_path = path.with_extension(match format {
        OutputFormat::Pdf => "pdf.tmp",
        OutputFormat::Html => "html.tmp",
    });
    tokio::fs::write(&tmp_path, bytes).await.map_err(write_err)?;
    tokio::fs::rename(&tmp_path, path).await.map_err(write_err)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Theme;

    #[tokio::test]
    async fn unsupported_output_is_rejected_before_anything_runs() {
        let config = MagazineConfig::default();
        let err = generate(&[PathBuf::from("missing.txt")], "issue.docx", &config)
            .await
            .unwrap_err();
        assert!(matches!(err, MagazineError::UnsupportedFormat { ref extension, .. } if extension == ".docx"));
    }

    #[tokio::test]
    async fn empty_input_list_is_invalid() {
        let config = MagazineConfig::default();
        let err = generate_document(&[], OutputFormat::Html, &config).await.unwrap_err();
        assert!(matches!(err, MagazineError::InvalidConfig(_)));
    }

    #[test]
    fn render_options_follow_config() {
        let config = MagazineConfig::builder()
            .theme(Theme::Academic)
            .publisher("Physics Society")
            .default_title("Quarterly")
            .build()
            .unwrap();
        let opts = render_options(&config);
        assert_eq!(opts.theme, Theme::Academic);
        assert_eq!(opts.publisher, "Physics Society");
        assert_eq!(opts.default_title, "Quarterly");
    }

    #[tokio::test]
    async fn markup_engine_with_missing_tool_fails_to_render() {
        let config = MagazineConfig::builder()
            .pdf_engine(PdfEngine::Markup)
            .markup_renderer("no-such-markup-converter-7f3a")
            .build()
            .unwrap();
        let map = parse_sections("**A**\na");
        let err = render_document(&map, OutputFormat::Pdf, &config, &render_options(&config))
            .await
            .unwrap_err();
        assert!(matches!(err, MagazineError::RenderFailed { .. }));
    }

    #[tokio::test]
    async fn atomic_write_creates_parent_and_leaves_no_temp() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("issue.html");
        write_atomic(&path, OutputFormat::Html, b"<html></html>").await.unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"<html></html>");
        assert!(!path.with_extension("html.tmp").exists());
    }
}
