//! Model interaction: send the prompt to an ordered list of backends.
//!
//! The module is intentionally thin — all prompt engineering lives in
//! [`crate::prompts`] so it can change without touching the fallback or
//! retry logic here.
//!
//! ## Backends
//!
//! * [`HostedBackend`] — OpenAI-style chat-completions endpoint (OpenRouter by
//!   default) authenticated with a bearer credential.
//! * [`LocalBackend`] — an ollama model driven through the edgequake-llm
//!   provider factory; needs no credential.
//!
//! ## Fallback Strategy
//!
//! [`BackendChain`] tries backends in priority order and returns the first
//! reply. Each attempt is bounded by the configured timeout. With
//! `max_retries > 0` a backend is retried with exponential backoff
//! (`retry_backoff_ms * 2^(retry - 1)`, saturating) before the chain moves
//! on. Only when every backend failed does the chain surface
//! [`MagazineError::ModelBackendFailed`], listing one message per backend.

use crate::config::MagazineConfig;
use crate::error::{BackendError, MagazineError};
use crate::progress::ProgressCallback;
use async_trait::async_trait;
use edgequake_llm::{ChatMessage, CompletionOptions, LLMProvider, ProviderFactory};
use serde_json::json;
use std::sync::Arc;
use std::time::Instant;
use tokio::time::{sleep, timeout, Duration};
use tracing::{debug, info, warn};

/// A language-model backend: prompt in, free-form text out.
#[async_trait]
pub trait ModelBackend: Send + Sync {
    /// Short identifier used in logs and error messages.
    fn name(&self) -> &str;

    async fn generate(&self, prompt: &str) -> Result<String, BackendError>;
}

// ── Hosted backend ───────────────────────────────────────────────────────────

/// Chat-completions backend requiring a bearer credential.
pub struct HostedBackend {
    client: reqwest::Client,
    url: String,
    api_key: String,
    model: String,
    max_tokens: usize,
}

impl HostedBackend {
    pub const NAME: &'static str = "openrouter";

    pub fn new(
        url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        max_tokens: usize,
    ) -> Result<Self, MagazineError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| MagazineError::InvalidConfig(format!("HTTP client: {e}")))?;
        Ok(Self {
            client,
            url: url.into(),
            api_key: api_key.into(),
            model: model.into(),
            max_tokens,
        })
    }

    fn request_body(&self, prompt: &str) -> serde_json::Value {
        json!({
            "model": self.model,
            "messages": [{"role": "user", "content": prompt}],
            "max_tokens": self.max_tokens,
        })
    }
}

#[async_trait]
impl ModelBackend for HostedBackend {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn generate(&self, prompt: &str) -> Result<String, BackendError> {
        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&self.request_body(prompt))
            .send()
            .await
            .map_err(|e| BackendError::new(Self::NAME, format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(BackendError::new(
                Self::NAME,
                format!("API error: HTTP {}", status.as_u16()),
            ));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| BackendError::new(Self::NAME, format!("invalid response body: {e}")))?;

        reply_content(&body).ok_or_else(|| {
            BackendError::new(Self::NAME, "response has no choices[0].message.content")
        })
    }
}

/// `choices[0].message.content` of a chat-completions response.
fn reply_content(body: &serde_json::Value) -> Option<String> {
    body["choices"][0]["message"]["content"]
        .as_str()
        .map(str::to_string)
}

// ── Local backend ────────────────────────────────────────────────────────────

/// Local ollama backend.
pub struct LocalBackend {
    model: String,
    max_tokens: usize,
    provider: Option<Arc<dyn LLMProvider>>,
}

impl LocalBackend {
    pub const NAME: &'static str = "ollama";

    /// The provider is created on first use, so a missing ollama server
    /// surfaces as a backend failure rather than a config error.
    pub fn new(model: impl Into<String>, max_tokens: usize) -> Self {
        Self {
            model: model.into(),
            max_tokens,
            provider: None,
        }
    }

    /// Use a pre-built edgequake-llm provider instead of the ollama factory.
    pub fn with_provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    fn provider(&self) -> Result<Arc<dyn LLMProvider>, BackendError> {
        if let Some(ref provider) = self.provider {
            return Ok(Arc::clone(provider));
        }
        ProviderFactory::create_llm_provider(Self::NAME, &self.model)
            .map_err(|e| BackendError::new(Self::NAME, format!("provider unavailable: {e}")))
    }

    fn build_options(&self) -> CompletionOptions {
        CompletionOptions {
            max_tokens: Some(self.max_tokens),
            ..Default::default()
        }
    }
}

#[async_trait]
impl ModelBackend for LocalBackend {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn generate(&self, prompt: &str) -> Result<String, BackendError> {
        let provider = self.provider()?;
        let messages = vec![ChatMessage::user(prompt)];
        let options = self.build_options();

        let response = provider
            .chat(&messages, Some(&options))
            .await
            .map_err(|e| BackendError::new(Self::NAME, format!("{e}")))?;

        debug!(
            "ollama/{}: {} input tokens, {} output tokens",
            self.model, response.prompt_tokens, response.completion_tokens
        );
        Ok(response.content)
    }
}

// ── Chain ────────────────────────────────────────────────────────────────────

/// Successful chain result.
#[derive(Debug, Clone)]
pub struct ChainReply {
    pub backend: String,
    pub reply: String,
    /// Backends tried, including the one that answered.
    pub backends_tried: usize,
    pub duration_ms: u64,
}

/// Ordered fallback over model backends.
pub struct BackendChain {
    backends: Vec<Arc<dyn ModelBackend>>,
    timeout: Duration,
    max_retries: u32,
    retry_backoff_ms: u64,
}

impl BackendChain {
    pub fn new(backends: Vec<Arc<dyn ModelBackend>>) -> Self {
        Self {
            backends,
            timeout: Duration::from_secs(120),
            max_retries: 0,
            retry_backoff_ms: 500,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_retries(mut self, max_retries: u32, retry_backoff_ms: u64) -> Self {
        self.max_retries = max_retries;
        self.retry_backoff_ms = retry_backoff_ms;
        self
    }

    /// Build the chain from a config.
    ///
    /// Explicit `backends` win. Otherwise: hosted then local when a
    /// credential is set, local alone when it is not.
    pub fn from_config(config: &MagazineConfig) -> Result<Self, MagazineError> {
        let backends: Vec<Arc<dyn ModelBackend>> = match (&config.backends, &config.api_key) {
            (Some(explicit), _) => explicit.clone(),
            (None, Some(key)) => {
                let hosted: Arc<dyn ModelBackend> = Arc::new(HostedBackend::new(
                    &config.hosted_url,
                    key,
                    &config.hosted_model,
                    config.max_tokens,
                )?);
                let local: Arc<dyn ModelBackend> =
                    Arc::new(LocalBackend::new(&config.local_model, config.max_tokens));
                vec![hosted, local]
            }
            (None, None) => vec![Arc::new(LocalBackend::new(
                &config.local_model,
                config.max_tokens,
            ))],
        };

        if backends.is_empty() {
            return Err(MagazineError::InvalidConfig(
                "No model backend configured".into(),
            ));
        }

        Ok(Self::new(backends)
            .with_timeout(Duration::from_secs(config.api_timeout_secs))
            .with_retries(config.max_retries, config.retry_backoff_ms))
    }

    pub fn names(&self) -> Vec<&str> {
        self.backends.iter().map(|b| b.name()).collect()
    }

    /// Ask each backend in order; return the first reply.
    pub async fn generate(
        &self,
        prompt: &str,
        progress: Option<&ProgressCallback>,
    ) -> Result<ChainReply, MagazineError> {
        let start = Instant::now();
        let mut failures: Vec<String> = Vec::with_capacity(self.backends.len());

        for (idx, backend) in self.backends.iter().enumerate() {
            let name = backend.name();
            info!("Calling model backend '{}'", name);
            if let Some(cb) = progress {
                cb.on_model_start(name);
            }

            match self.attempt(backend.as_ref(), prompt).await {
                Ok(reply) => {
                    if let Some(cb) = progress {
                        cb.on_model_complete(name, reply.len());
                    }
                    return Ok(ChainReply {
                        backend: name.to_string(),
                        reply,
                        backends_tried: idx + 1,
                        duration_ms: start.elapsed().as_millis() as u64,
                    });
                }
                Err(e) => {
                    let msg = e.to_string();
                    if idx + 1 < self.backends.len() {
                        warn!("{} failed, falling back to next backend", msg);
                        if let Some(cb) = progress {
                            cb.on_model_fallback(name, &e.detail);
                        }
                    } else {
                        warn!("{} failed", msg);
                    }
                    failures.push(msg);
                }
            }
        }

        Err(MagazineError::ModelBackendFailed { attempts: failures })
    }

    /// Delay before retry number `retry` (1-based), saturating at `u64::MAX`.
    fn backoff_ms(&self, retry: u32) -> u64 {
        self.retry_backoff_ms
            .saturating_mul(2u64.saturating_pow(retry.saturating_sub(1)))
    }

    /// One backend, with timeout and optional retries.
    async fn attempt(&self, backend: &dyn ModelBackend, prompt: &str) -> Result<String, BackendError> {
        let mut last_err: Option<BackendError> = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let backoff = self.backoff_ms(attempt);
                warn!(
                    "{}: retry {}/{} after {}ms",
                    backend.name(),
                    attempt,
                    self.max_retries,
                    backoff
                );
                sleep(Duration::from_millis(backoff)).await;
            }

            let result = match timeout(self.timeout, backend.generate(prompt)).await {
                Ok(result) => result,
                Err(_) => Err(BackendError::new(
                    backend.name(),
                    format!("timed out after {}s", self.timeout.as_secs_f32()),
                )),
            };

            match result {
                Ok(reply) => return Ok(reply),
                Err(e) => {
                    debug!("{}: attempt {} failed — {}", backend.name(), attempt + 1, e);
                    last_err = Some(e);
                }
            }
        }

        Err(last_err.unwrap_or_else(|| BackendError::new(backend.name(), "Unknown error")))
    }
}
