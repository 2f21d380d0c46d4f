//! Markup → PDF through an external converter.
//!
//! The styled HTML from [`super::html`] is written to a scratch directory and
//! handed to `weasyprint` or `wkhtmltopdf`, whichever is configured or found
//! first on `PATH`. Any failure surfaces as [`MagazineError::RenderFailed`].

use crate::error::MagazineError;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::{debug, info};

/// Converters probed on `PATH`, in order.
pub const KNOWN_CONVERTERS: &[&str] = &["weasyprint", "wkhtmltopdf"];

/// Argument convention of a converter binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConverterKind {
    /// `weasyprint IN OUT`
    Weasyprint,
    /// `wkhtmltopdf --quiet IN OUT`
    Wkhtmltopdf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Converter {
    pub kind: ConverterKind,
    pub path: PathBuf,
}

impl Converter {
    fn from_path(path: PathBuf) -> Self {
        let is_wkhtml = path
            .file_stem()
            .and_then(|s| s.to_str())
            .is_some_and(|s| s.contains("wkhtmltopdf"));
        let kind = if is_wkhtml {
            ConverterKind::Wkhtmltopdf
        } else {
            ConverterKind::Weasyprint
        };
        Self { kind, path }
    }

    fn command(&self, input: &Path, output: &Path) -> Command {
        let mut cmd = Command::new(&self.path);
        if self.kind == ConverterKind::Wkhtmltopdf {
            cmd.arg("--quiet");
        }
        cmd.arg(input).arg(output);
        cmd.stdin(Stdio::null()).stdout(Stdio::null()).stderr(Stdio::piped());
        cmd
    }
}

/// Resolve the converter: the configured command (a name on `PATH` or a
/// path), else the first of [`KNOWN_CONVERTERS`] on `PATH`.
pub fn find_converter(configured: Option<&str>) -> Result<Converter, MagazineError> {
    if let Some(command) = configured {
        let path = which::which(command).map_err(|e| MagazineError::RenderFailed {
            detail: format!("markup converter '{command}' not found: {e}"),
        })?;
        return Ok(Converter::from_path(path));
    }

    KNOWN_CONVERTERS
        .iter()
        .find_map(|name| which::which(name).ok())
        .map(Converter::from_path)
        .ok_or_else(|| MagazineError::RenderFailed {
            detail: format!(
                "no markup converter found on PATH (tried {})",
                KNOWN_CONVERTERS.join(", ")
            ),
        })
}

/// Convert `html` to PDF bytes. Blocking; runs the converter to completion.
pub fn html_to_pdf(html: &str, configured: Option<&str>) -> Result<Vec<u8>, MagazineError> {
    let converter = find_converter(configured)?;
    let failed = |detail: String| MagazineError::RenderFailed { detail };

    let scratch = tempfile::tempdir().map_err(|e| failed(format!("scratch directory: {e}")))?;
    let input = scratch.path().join("magazine.html");
    let output = scratch.path().join("magazine.pdf");
    std::fs::write(&input, html).map_err(|e| failed(format!("writing markup: {e}")))?;

    debug!(converter = %converter.path.display(), "Converting markup to PDF");
    let result = converter
        .command(&input, &output)
        .output()
        .map_err(|e| failed(format!("{}: {e}", converter.path.display())))?;

    if !result.status.success() {
        let stderr = String::from_utf8_lossy(&result.stderr);
        return Err(failed(format!(
            "{} exited with {}: {}",
            converter.path.display(),
            result.status,
            stderr.trim()
        )));
    }

    let bytes = std::fs::read(&output).map_err(|e| failed(format!("reading converter output: {e}")))?;
    if bytes.is_empty() {
        return Err(failed("converter produced an empty file".into()));
    }
    info!(bytes = bytes.len(), "Markup converted to PDF");
    Ok(bytes)
}
