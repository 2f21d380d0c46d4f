//! CLI binary for edgequake-magazine.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `MagazineConfig`, prints progress and echoes the organised content.

use anyhow::{Context, Result};
use clap::Parser;
use edgequake_magazine::{
    generate, ContentType, GenerationProgressCallback, MagazineConfig, OutputFormat, PdfEngine,
    ProgressCallback, Theme,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

// ── CLI progress callback ────────────────────────────────────────────────────

/// Prints one line per pipeline event to stdout and spins while the model
/// is working.
struct CliProgressCallback {
    spinner_enabled: bool,
    spinner: Mutex<Option<ProgressBar>>,
}

impl CliProgressCallback {
    fn new(spinner_enabled: bool) -> Arc<Self> {
        Arc::new(Self {
            spinner_enabled,
            spinner: Mutex::new(None),
        })
    }

    fn stop_spinner(&self) {
        if let Ok(mut slot) = self.spinner.lock() {
            if let Some(bar) = slot.take() {
                bar.finish_and_clear();
            }
        }
    }
}

impl GenerationProgressCallback for CliProgressCallback {
    fn on_generation_start(&self, total_files: usize) {
        println!("{}", bold(&format!("Reading {total_files} file(s)…")));
    }

    fn on_file_parsed(&self, path: &Path, chars: usize) {
        println!(
            "  {} Parsed: {}  {}",
            green("✓"),
            path.display(),
            dim(&format!("{chars} chars"))
        );
    }

    fn on_file_skipped(&self, path: &Path, reason: &str) {
        println!("  {} Skipped: {}  {}", yellow("⚠"), path.display(), dim(reason));
    }

    fn on_content_analysed(&self, total_chars: usize, content_types: &[ContentType]) {
        let labels: Vec<&str> = content_types.iter().map(|t| t.as_str()).collect();
        println!("Total content length: {total_chars} characters");
        println!("Detected content types: {}", labels.join(", "));
    }

    fn on_model_start(&self, backend: &str) {
        println!("Organizing content with {}…", bold(backend));
        if !self.spinner_enabled {
            return;
        }
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}  {elapsed}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]),
        );
        bar.set_message(format!("waiting for {backend}"));
        bar.enable_steady_tick(Duration::from_millis(80));
        if let Ok(mut slot) = self.spinner.lock() {
            *slot = Some(bar);
        }
    }

    fn on_model_fallback(&self, failed_backend: &str, error: &str) {
        self.stop_spinner();
        println!("  {} {failed_backend} failed: {}", yellow("⚠"), dim(error));
    }

    fn on_model_complete(&self, backend: &str, reply_len: usize) {
        self.stop_spinner();
        println!(
            "  {} {backend} replied  {}",
            green("✓"),
            dim(&format!("{reply_len} chars"))
        );
    }

    fn on_output_written(&self, path: &Path, sections: usize) {
        println!(
            "{} Magazine generated: {}  {}",
            green("✔"),
            bold(&path.display().to_string()),
            dim(&format!("{sections} sections"))
        );
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Local model (ollama), professional theme, PDF output
  magazine report.pdf minutes.docx poster.png

  # Hosted model with local fallback, sports theme
  magazine --api-key sk-or-... --theme sports results.txt -o sports.pdf

  # Styled HTML instead of PDF
  magazine notes.html -o issue.html

  # PDF through an external HTML renderer
  magazine --engine markup --renderer weasyprint notes.txt -o issue.pdf

SUPPORTED INPUTS:
  .pdf  .docx .doc  .png .jpg .jpeg .bmp .tiff  .html  .txt

ENVIRONMENT VARIABLES:
  OPENROUTER_API_KEY   Hosted backend credential (enables hosted → local fallback)
  OLLAMA_MODEL         Local model name (default: tinyllama)
  MAGAZINE_THEME       Default theme
  MAGAZINE_OUTPUT      Default output path
  PDFIUM_LIB_PATH      Path to libpdfium (file or directory) for PDF inputs
  RUST_LOG             Log filter override
"#;

/// Turn documents into a themed magazine with an LLM editor.
#[derive(Parser, Debug)]
#[command(
    name = "magazine",
    version,
    about = "Turn documents into a themed magazine (PDF or HTML) with an LLM editor",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Input files: pdf, docx/doc, png/jpg/jpeg/bmp/tiff, html, txt.
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Output path; `.pdf` or `.html` selects the format.
    #[arg(short, long, env = "MAGAZINE_OUTPUT", default_value = "magazine.pdf")]
    output: PathBuf,

    /// Hosted backend credential. Without it only the local backend is used.
    #[arg(long, env = "OPENROUTER_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Visual theme.
    #[arg(short, long, env = "MAGAZINE_THEME", value_enum, default_value = "professional")]
    theme: ThemeArg,

    /// How `.pdf` output is produced.
    #[arg(long, env = "MAGAZINE_ENGINE", value_enum, default_value = "native")]
    engine: EngineArg,

    /// Markup-to-PDF command for `--engine markup` (default: weasyprint or wkhtmltopdf).
    #[arg(long, env = "MAGAZINE_RENDERER")]
    renderer: Option<String>,

    /// Local (ollama) model.
    #[arg(long, env = "OLLAMA_MODEL", default_value = edgequake_magazine::config::DEFAULT_LOCAL_MODEL)]
    local_model: String,

    /// Hosted model identifier.
    #[arg(long, env = "MAGAZINE_HOSTED_MODEL", default_value = edgequake_magazine::config::DEFAULT_HOSTED_MODEL)]
    hosted_model: String,

    /// Per-backend model call timeout in seconds.
    #[arg(long, env = "MAGAZINE_API_TIMEOUT", default_value_t = 120)]
    api_timeout: u64,

    /// Print the section map as JSON instead of the organised text.
    #[arg(long, env = "MAGAZINE_JSON")]
    json: bool,

    /// Disable the spinner.
    #[arg(long, env = "MAGAZINE_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "MAGAZINE_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "MAGAZINE_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum ThemeArg {
    Professional,
    Modern,
    Academic,
    Sports,
}

impl From<ThemeArg> for Theme {
    fn from(v: ThemeArg) -> Self {
        match v {
            ThemeArg::Professional => Theme::Professional,
            ThemeArg::Modern => Theme::Modern,
            ThemeArg::Academic => Theme::Academic,
            ThemeArg::Sports => Theme::Sports,
        }
    }
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum EngineArg {
    Native,
    Markup,
}

impl From<EngineArg> for PdfEngine {
    fn from(v: EngineArg) -> Self {
        match v {
            EngineArg::Native => PdfEngine::Native,
            EngineArg::Markup => PdfEngine::Markup,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Progress lines go to stdout; library logs to stderr stay at warn
    // unless asked for.
    let filter = if cli.quiet {
        "error"
    } else if cli.verbose {
        "debug"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Reject the output path before any work ───────────────────────────
    OutputFormat::from_path(&cli.output).with_context(|| {
        format!(
            "Unsupported output '{}': use a .pdf or .html extension",
            cli.output.display()
        )
    })?;

    // ── Build config ─────────────────────────────────────────────────────
    let progress_cb: Option<ProgressCallback> = if cli.quiet {
        None
    } else {
        let cb = CliProgressCallback::new(!cli.no_progress && !cli.json);
        Some(cb as Arc<dyn GenerationProgressCallback>)
    };
    let config = build_config(&cli, progress_cb)?;

    // ── Run ──────────────────────────────────────────────────────────────
    let output = generate(&cli.files, &cli.output, &config)
        .await
        .context("Magazine generation failed")?;

    if cli.json {
        let json = serde_json::to_string_pretty(&output.sections)
            .context("Failed to serialise sections")?;
        println!("{json}");
    } else if !cli.quiet {
        println!();
        println!("{}", bold("Organized content:"));
        println!("{}", output.reply.trim_end());
        println!();
        println!(
            "{}",
            dim(&format!(
                "{}/{} files · {} sections · {} via {} · {}ms total",
                output.stats.files_parsed,
                output.stats.files_total,
                output.stats.sections,
                output.theme,
                output.backend,
                output.stats.total_duration_ms,
            ))
        );
    }

    Ok(())
}

/// Map CLI args to `MagazineConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<MagazineConfig> {
    let mut builder = MagazineConfig::builder()
        .theme(cli.theme.into())
        .pdf_engine(cli.engine.into())
        .local_model(&cli.local_model)
        .hosted_model(&cli.hosted_model)
        .api_timeout_secs(cli.api_timeout);

    if let Some(ref key) = cli.api_key {
        builder = builder.api_key(key);
    }
    if let Some(ref renderer) = cli.renderer {
        builder = builder.markup_renderer(renderer);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_defaults() {
        let cli = Cli::try_parse_from(["magazine", "a.txt"]).unwrap();
        assert_eq!(cli.output, PathBuf::from("magazine.pdf"));
        let config = build_config(&cli, None).unwrap();
        assert_eq!(config.theme, Theme::Professional);
        assert_eq!(config.pdf_engine, PdfEngine::Native);
    }

    #[test]
    fn cli_requires_files() {
        assert!(Cli::try_parse_from(["magazine"]).is_err());
    }

    #[test]
    fn cli_maps_flags() {
        let cli = Cli::try_parse_from([
            "magazine",
            "a.txt",
            "b.pdf",
            "--theme",
            "sports",
            "--api-key",
            "sk-test",
            "--engine",
            "markup",
            "--renderer",
            "wkhtmltopdf",
            "-o",
            "out.html",
        ])
        .unwrap();
        assert_eq!(cli.files.len(), 2);
        let config = build_config(&cli, None).unwrap();
        assert_eq!(config.theme, Theme::Sports);
        assert_eq!(config.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.pdf_engine, PdfEngine::Markup);
        assert_eq!(config.markup_renderer.as_deref(), Some("wkhtmltopdf"));
    }

    #[test]
    fn cli_rejects_unknown_theme() {
        assert!(Cli::try_parse_from(["magazine", "a.txt", "--theme", "retro"]).is_err());
    }
}
