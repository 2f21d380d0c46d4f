//! Configuration types for magazine generation.
//!
//! All generation behaviour is controlled through [`MagazineConfig`], built
//! via its [`MagazineConfigBuilder`]. One struct holds the theme, the model
//! backend policy and the rendering engine, so a run can be reproduced from
//! its config alone.

use crate::error::MagazineError;
use crate::pipeline::llm::ModelBackend;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

/// Default hosted chat-completions endpoint (OpenRouter).
pub const DEFAULT_HOSTED_URL: &str = "https://openrouter.ai/api/v1/chat/completions";

/// Default hosted model.
pub const DEFAULT_HOSTED_MODEL: &str = "microsoft/wizardlm-2-8x22b";

/// Default local (ollama) model.
pub const DEFAULT_LOCAL_MODEL: &str = "tinyllama";

/// Configuration for a magazine generation run.
///
/// Built via [`MagazineConfig::builder()`] or using
/// [`MagazineConfig::default()`].
///
/// # Example
/// ```rust
/// use edgequake_magazine::{MagazineConfig, Theme};
///
/// let config = MagazineConfig::builder()
///     .theme(Theme::Sports)
///     .local_model("llama3.2")
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct MagazineConfig {
    /// Visual theme. Default: [`Theme::Professional`].
    pub theme: Theme,

    /// Bearer credential for the hosted backend.
    ///
    /// When set, the hosted backend is tried first and the local backend is
    /// the fallback. When `None`, only the local backend is used.
    pub api_key: Option<String>,

    /// Hosted chat-completions endpoint.
    pub hosted_url: String,

    /// Model identifier sent to the hosted backend.
    pub hosted_model: String,

    /// Model identifier for the local ollama backend.
    pub local_model: String,

    /// Maximum tokens the model may generate. Default: 1000.
    pub max_tokens: usize,

    /// Per-call timeout for a model backend, in seconds. Default: 120.
    pub api_timeout_secs: u64,

    /// Extra attempts per backend before moving to the next one. Default: 0.
    ///
    /// The fallback from hosted to local is the primary recovery path; raise
    /// this only for flaky networks.
    pub max_retries: u32,

    /// Initial retry delay in milliseconds (doubles per attempt). Default: 500.
    pub retry_backoff_ms: u64,

    /// Pre-constructed backends, tried in order. Takes precedence over the
    /// `api_key` policy.
    pub backends: Option<Vec<Arc<dyn ModelBackend>>>,

    /// How `.pdf` output is produced. Default: [`PdfEngine::Native`].
    pub pdf_engine: PdfEngine,

    /// Command used by [`PdfEngine::Markup`]. If `None`, the first of
    /// `weasyprint` / `wkhtmltopdf` found on `PATH` is used.
    pub markup_renderer: Option<String>,

    /// Cover title used when the model reply carries no `"Title"` entry.
    pub default_title: String,

    /// Name printed in the cover byline and the markup footer.
    pub publisher: String,

    /// Optional progress callback.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for MagazineConfig {
    fn default() -> Self {
        Self {
            theme: Theme::default(),
            api_key: None,
            hosted_url: DEFAULT_HOSTED_URL.to_string(),
            hosted_model: DEFAULT_HOSTED_MODEL.to_string(),
            local_model: DEFAULT_LOCAL_MODEL.to_string(),
            max_tokens: 1000,
            api_timeout_secs: 120,
            max_retries: 0,
            retry_backoff_ms: 500,
            backends: None,
            pdf_engine: PdfEngine::default(),
            markup_renderer: None,
            default_title: "College Magazine".to_string(),
            publisher: "Your Organization".to_string(),
            progress_callback: None,
        }
    }
}

impl fmt::Debug for MagazineConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MagazineConfig")
            .field("theme", &self.theme)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("hosted_url", &self.hosted_url)
            .field("hosted_model", &self.hosted_model)
            .field("local_model", &self.local_model)
            .field("max_tokens", &self.max_tokens)
            .field("api_timeout_secs", &self.api_timeout_secs)
            .field("max_retries", &self.max_retries)
            .field(
                "backends",
                &self
                    .backends
                    .as_ref()
                    .map(|b| b.iter().map(|b| b.name().to_string()).collect::<Vec<_>>()),
            )
            .field("pdf_engine", &self.pdf_engine)
            .field("markup_renderer", &self.markup_renderer)
            .field("default_title", &self.default_title)
            .field("publisher", &self.publisher)
            .finish()
    }
}

impl MagazineConfig {
    /// Create a new builder for `MagazineConfig`.
    pub fn builder() -> MagazineConfigBuilder {
        MagazineConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`MagazineConfig`].
#[derive(Debug)]
pub struct MagazineConfigBuilder {
    config: MagazineConfig,
}

impl MagazineConfigBuilder {
    pub fn theme(mut self, theme: Theme) -> Self {
        self.config.theme = theme;
        self
    }

    /// Set the hosted credential. Empty strings are treated as "not set".
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        let key = key.into();
        self.config.api_key = if key.trim().is_empty() { None } else { Some(key) };
        self
    }

    pub fn hosted_url(mut self, url: impl Into<String>) -> Self {
        self.config.hosted_url = url.into();
        self
    }

    pub fn hosted_model(mut self, model: impl Into<String>) -> Self {
        self.config.hosted_model = model.into();
        self
    }

    pub fn local_model(mut self, model: impl Into<String>) -> Self {
        self.config.local_model = model.into();
        self
    }

    pub fn max_tokens(mut self, n: usize) -> Self {
        self.config.max_tokens = n;
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = secs;
        self
    }

    pub fn max_retries(mut self, n: u32) -> Self {
        self.config.max_retries = n;
        self
    }

    pub fn retry_backoff_ms(mut self, ms: u64) -> Self {
        self.config.retry_backoff_ms = ms;
        self
    }

    /// Replace the credential policy with an explicit, ordered backend list.
    pub fn backends(mut self, backends: Vec<Arc<dyn ModelBackend>>) -> Self {
        self.config.backends = Some(backends);
        self
    }

    pub fn pdf_engine(mut self, engine: PdfEngine) -> Self {
        self.config.pdf_engine = engine;
        self
    }

    pub fn markup_renderer(mut self, command: impl Into<String>) -> Self {
        self.config.markup_renderer = Some(command.into());
        self
    }

    pub fn default_title(mut self, title: impl Into<String>) -> Self {
        self.config.default_title = title.into();
        self
    }

    pub fn publisher(mut self, publisher: impl Into<String>) -> Self {
        self.config.publisher = publisher.into();
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<MagazineConfig, MagazineError> {
        let c = &self.config;
        if c.hosted_model.trim().is_empty() || c.local_model.trim().is_empty() {
            return Err(MagazineError::InvalidConfig(
                "Model names must not be empty".into(),
            ));
        }
        if c.api_timeout_secs == 0 {
            return Err(MagazineError::InvalidConfig(
                "API timeout must be ≥ 1 second".into(),
            ));
        }
        if c.max_tokens == 0 {
            return Err(MagazineError::InvalidConfig(
                "max_tokens must be ≥ 1".into(),
            ));
        }
        if matches!(c.backends, Some(ref b) if b.is_empty()) {
            return Err(MagazineError::InvalidConfig(
                "Backend list must not be empty".into(),
            ));
        }
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// Visual theme of the generated magazine.
///
/// Each variant selects a fixed bundle of colours, fonts and decorative
/// glyphs; see [`crate::render::theme::ThemeStyle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// Business-like blues and reds. (default)
    #[default]
    Professional,
    /// Vibrant purples and pinks.
    Modern,
    /// Scholarly teal and navy, serif headings in markup.
    Academic,
    /// Energetic reds and oranges, upper-case headings in markup.
    Sports,
}

impl Theme {
    /// Every theme, in declaration order.
    pub const ALL: [Theme; 4] = [
        Theme::Professional,
        Theme::Modern,
        Theme::Academic,
        Theme::Sports,
    ];

    /// Lower-case identifier used on the command line.
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Professional => "professional",
            Theme::Modern => "modern",
            Theme::Academic => "academic",
            Theme::Sports => "sports",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = MagazineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Theme::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                MagazineError::InvalidConfig(format!(
                    "Unknown theme '{s}' (expected professional, modern, academic or sports)"
                ))
            })
    }
}

/// How paginated (`.pdf`) output is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PdfEngine {
    /// Lay out pages directly (borders, header and footer bands, page breaks). (default)
    #[default]
    Native,
    /// Render the styled markup and hand it to an external markup-to-PDF tool.
    Markup,
}

/// Target format, chosen purely by the output path's extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    /// `.pdf` — paginated structured output.
    Pdf,
    /// `.html` — single self-contained styled markup document.
    Html,
}

impl OutputFormat {
    /// Resolve the output format from a path; anything other than `.pdf` or
    /// `.html` is rejected.
    pub fn from_path(path: &Path) -> Result<Self, MagazineError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "pdf" => Ok(OutputFormat::Pdf),
            "html" => Ok(OutputFormat::Html),
            _ => Err(MagazineError::UnsupportedFormat {
                path: path.to_path_buf(),
                extension: if ext.is_empty() {
                    String::from("(none)")
                } else {
                    format!(".{ext}")
                },
            }),
        }
    }
}
