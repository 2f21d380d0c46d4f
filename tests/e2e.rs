//! End-to-end tests for edgequake-magazine.
//!
//! Most tests drive the full pipeline (extract → prompt → backend chain →
//! clean-up → sections → render → write) against scripted in-process
//! backends, so they need no network, no pdfium and no tesseract.
//!
//! The live test at the bottom talks to a local ollama and is gated behind
//! the `E2E_ENABLED` environment variable:
//!   E2E_ENABLED=1 cargo test --test e2e -- --nocapture

use async_trait::async_trait;
use edgequake_magazine::pipeline::sections::strip_bullet;
use edgequake_magazine::render::{html::render_html, pdf};
use edgequake_magazine::{
    generate, generate_sync, parse_sections, render_options, BackendError, ContentType, FileError,
    GenerationProgressCallback, MagazineConfig, MagazineError, ModelBackend, OutputFormat,
    RenderOptions, SectionMap, Theme,
};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

// ── Test helpers ─────────────────────────────────────────────────────────────

/// Replies with a fixed text (or fails) and records every prompt it saw.
struct Canned {
    name: &'static str,
    reply: Option<&'static str>,
    prompts: Mutex<Vec<String>>,
}

impl Canned {
    fn ok(name: &'static str, reply: &'static str) -> Arc<Self> {
        Arc::new(Self {
            name,
            reply: Some(reply),
            prompts: Mutex::new(Vec::new()),
        })
    }

    fn failing(name: &'static str) -> Arc<Self> {
        Arc::new(Self {
            name,
            reply: None,
            prompts: Mutex::new(Vec::new()),
        })
    }

    fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl ModelBackend for Canned {
    fn name(&self) -> &str {
        self.name
    }

    async fn generate(&self, prompt: &str) -> Result<String, BackendError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        match self.reply {
            Some(r) => Ok(r.to_string()),
            None => Err(BackendError::new(self.name, "API error: HTTP 503")),
        }
    }
}

fn config_with(backends: Vec<Arc<dyn ModelBackend>>, theme: Theme) -> MagazineConfig {
    MagazineConfig::builder()
        .theme(theme)
        .backends(backends)
        .build()
        .unwrap()
}

fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let p = dir.join(name);
    std::fs::write(&p, contents).unwrap();
    p
}

fn today_label() -> String {
    chrono::Local::now().date_naive().format("%B %d, %Y").to_string()
}

const SPORTS_REPLY: &str = "**Campus Chronicle**\n\
**Sports Highlights**\n\
* Football team won the inter-college tournament\n\
- Gold medal in the 100m sprint\n\
**Event Overview**\n\
Annual sports day held on March 3.\n\
1. Opening ceremony\n\
**Academic Excellence**\n\
2) Top CGPA award\n\
**Conclusion**\n\
A memorable season for every athlete.";

// ── §8 scenarios ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn txt_and_unsupported_file_completes_with_text_only() {
    let dir = tempfile::tempdir().unwrap();
    let txt = write(
        dir.path(),
        "notes.txt",
        "The football tournament final drew a big crowd.",
    );
    let xyz = write(dir.path(), "data.xyz", "SECRET-PAYLOAD");
    let out = dir.path().join("issue.html");

    let backend = Canned::ok("mock", SPORTS_REPLY);
    let config = config_with(vec![backend.clone() as Arc<dyn ModelBackend>], Theme::Sports);

    let output = generate(&[txt.clone(), xyz.clone()], &out, &config)
        .await
        .unwrap();

    assert_eq!(output.stats.files_total, 2);
    assert_eq!(output.stats.files_parsed, 1);
    assert_eq!(output.stats.files_skipped, 1);
    assert!(output.files[0].is_ok());
    assert!(matches!(
        output.files[1].error,
        Some(FileError::Unsupported { ref extension, .. }) if extension == ".xyz"
    ));

    let prompts = backend.prompts();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("content from files: notes.txt, data.xyz\n"));
    assert!(prompts[0].contains("--- Content from notes.txt ---"));
    assert!(!prompts[0].contains("--- Content from data.xyz ---"));
    assert!(prompts[0].contains("football tournament"));
    assert!(!prompts[0].contains("SECRET-PAYLOAD"));
    assert!(output.content_types.contains(&ContentType::Sports));

    let html = std::fs::read_to_string(&out).unwrap();
    assert!(html.contains("Campus Chronicle"));
}

#[tokio::test]
async fn sports_pdf_has_dated_footers_and_ordered_contents() {
    let dir = tempfile::tempdir().unwrap();
    let txt = write(dir.path(), "results.txt", "Championship results and medal table.");
    let out = dir.path().join("report.pdf");

    let config = config_with(
        vec![Canned::ok("mock", SPORTS_REPLY) as Arc<dyn ModelBackend>],
        Theme::Sports,
    );
    let output = generate(&[txt], &out, &config).await.unwrap();
    assert_eq!(output.format, OutputFormat::Pdf);

    let bytes = std::fs::read(&out).unwrap();
    assert!(bytes.starts_with(b"%PDF-"));
    let doc = lopdf::Document::load_mem(&bytes).unwrap();
    assert_eq!(Some(doc.get_pages().len()), output.stats.pages);

    let layout = pdf::layout(&output.sections, &render_options(&config));
    let footer = format!("Generated on {}", today_label());
    for page in &layout.pages {
        assert!(
            page.texts().any(|t| t == footer),
            "page {} lacks the dated footer",
            page.number
        );
    }

    let toc: Vec<&str> = layout.pages[1].texts().collect();
    let expected = [
        "Sports Highlights",
        "Event Overview",
        "Academic Excellence",
        "Conclusion",
    ];
    let positions: Vec<usize> = expected
        .iter()
        .map(|s| toc.iter().position(|t| t == s).unwrap())
        .collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]));
    assert!(!toc.contains(&"Campus Chronicle"));
}

#[test]
fn scenario_title_and_event_overview() {
    let map = parse_sections(
        "**My Magazine**\n**Event Overview**\n* Held on May 1\n- 200 attendees\nGreat turnout overall.",
    );
    let entries: Vec<(&str, &[String])> = map.iter().collect();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].0, "Title");
    assert_eq!(entries[0].1, ["My Magazine"]);
    assert_eq!(entries[1].0, "Event Overview");
    assert_eq!(
        entries[1].1,
        ["* Held on May 1", "- 200 attendees", "Great turnout overall."]
    );
}

#[test]
fn scenario_plain_text_falls_back_to_introduction() {
    let map = parse_sections("the first line of text\n\nsecond line here\nand a third one");
    let entries: Vec<(&str, &[String])> = map.iter().collect();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].0, "Introduction");
    assert_eq!(
        entries[0].1,
        ["the first line of text", "second line here", "and a third one"]
    );
}

// ── Markup round trip ────────────────────────────────────────────────────────

static HEADER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"<h3 class="section-header">(.*?)</h3>"#).unwrap());
static LINE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?m)^(?:<div class="(?:achievement|event-details)">|<p>)(.*?)(?:</div>|</p>)$"#)
        .unwrap()
});

fn unescape(s: &str) -> String {
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

/// Visible section titles and line texts, in document order.
fn visible_sections(html: &str) -> Vec<(String, Vec<String>)> {
    let body = html.split(r#"<div class="footer">"#).next().unwrap();
    body.split(r#"<div class="content-section">"#)
        .skip(1)
        .map(|block| {
            let title = unescape(&HEADER_RE.captures(block).unwrap()[1]);
            let lines = LINE_RE
                .captures_iter(block)
                .map(|l| unescape(&l[1]))
                .collect();
            (title, lines)
        })
        .collect()
}

/// A line's text with list styling removed: the bullet glyph the renderer
/// adds, or the marker the model wrote.
fn visible_text(line: &str) -> &str {
    let line = line.strip_prefix("• ").unwrap_or(line);
    strip_bullet(line)
}

fn assert_round_trip(map: &SectionMap) {
    let html = render_html(map, &RenderOptions::new(Theme::Modern));
    let seen = visible_sections(&html);
    let expected: Vec<(&str, &[String])> = map.sections().collect();

    assert_eq!(seen.len(), expected.len());
    for ((title, lines), (exp_title, exp_lines)) in seen.iter().zip(expected) {
        assert_eq!(title, exp_title);
        assert_eq!(lines.len(), exp_lines.len(), "section {title}");
        for (got, want) in lines.iter().zip(exp_lines) {
            assert_eq!(visible_text(got), visible_text(want), "section {title}");
        }
    }
}

#[test]
fn markup_round_trip_preserves_titles_and_lines() {
    assert_round_trip(&parse_sections(SPORTS_REPLY));
    assert_round_trip(&parse_sections(
        "**Q&A <Night>**\nWho said \"it's fine\"?\n* Tom & Jerry\n**Numbers**\n3. Third\n9) Ninth",
    ));
    assert_round_trip(&parse_sections("SPORTS\nwe won\nResearch Output\ntwo papers"));
}

// ── Backend chain through the pipeline ───────────────────────────────────────

#[tokio::test]
async fn hosted_failure_falls_back_to_local() {
    let dir = tempfile::tempdir().unwrap();
    let txt = write(dir.path(), "a.txt", "Cultural festival with music and dance.");
    let out = dir.path().join("fallback.html");

    let hosted = Canned::failing("hosted-mock");
    let local = Canned::ok("local-mock", "**Festival Gazette**\n**Performances**\n- Dance");
    let config = config_with(
        vec![
            hosted.clone() as Arc<dyn ModelBackend>,
            local.clone() as Arc<dyn ModelBackend>,
        ],
        Theme::Modern,
    );

    let output = generate(&[txt], &out, &config).await.unwrap();
    assert_eq!(output.backend, "local-mock");
    assert_eq!(output.stats.backends_tried, 2);
    assert_eq!(hosted.prompts().len(), 1);
    assert_eq!(local.prompts(), hosted.prompts());
    assert_eq!(output.sections.title(), Some("Festival Gazette"));
}

#[tokio::test]
async fn all_backends_failing_is_fatal_and_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let txt = write(dir.path(), "a.txt", "Some text.");
    let out = dir.path().join("never.pdf");

    let config = config_with(
        vec![
            Canned::failing("hosted-mock") as Arc<dyn ModelBackend>,
            Canned::failing("local-mock") as Arc<dyn ModelBackend>,
        ],
        Theme::Professional,
    );

    let err = generate(&[txt], &out, &config).await.unwrap_err();
    match err {
        MagazineError::ModelBackendFailed { attempts } => {
            assert_eq!(attempts.len(), 2);
            assert!(attempts[0].contains("hosted-mock"));
            assert!(attempts[1].contains("local-mock"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(!out.exists());
}

#[tokio::test]
async fn unsupported_output_extension_calls_no_backend() {
    let dir = tempfile::tempdir().unwrap();
    let txt = write(dir.path(), "a.txt", "Some text.");
    let out = dir.path().join("issue.docx");

    let backend = Canned::ok("mock", SPORTS_REPLY);
    let config = config_with(vec![backend.clone() as Arc<dyn ModelBackend>], Theme::Sports);

    let err = generate(&[txt], &out, &config).await.unwrap_err();
    assert!(matches!(err, MagazineError::UnsupportedFormat { .. }));
    assert!(backend.prompts().is_empty());
    assert!(!out.exists());
}

#[tokio::test]
async fn missing_input_is_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let txt = write(dir.path(), "present.txt", "Seminar and workshop schedule.");
    let missing = dir.path().join("absent.txt");
    let out = dir.path().join("issue.html");

    let config = config_with(
        vec![Canned::ok("mock", SPORTS_REPLY) as Arc<dyn ModelBackend>],
        Theme::Academic,
    );
    let output = generate(&[missing, txt], &out, &config).await.unwrap();

    assert!(matches!(output.files[0].error, Some(FileError::Missing { .. })));
    assert!(output.files[1].is_ok());
    assert_eq!(output.content_types, vec![ContentType::Events]);
    assert!(out.exists());
}

#[tokio::test]
async fn markdown_style_reply_is_cleaned_before_parsing() {
    let dir = tempfile::tempdir().unwrap();
    let txt = write(dir.path(), "a.txt", "Research publications this year.");
    let out = dir.path().join("clean.html");

    let config = config_with(
        vec![Canned::ok(
            "mock",
            "```markdown\n# Research Journal\n\n## Publications\n- Two papers\n```",
        ) as Arc<dyn ModelBackend>],
        Theme::Academic,
    );
    let output = generate(&[txt], &out, &config).await.unwrap();

    assert_eq!(output.sections.title(), Some("Research Journal"));
    assert_eq!(
        output.sections.get("Publications"),
        Some(&["- Two papers".to_string()][..])
    );
    assert!(!output.reply.contains("```"));
}

// ── Progress events ──────────────────────────────────────────────────────────

#[derive(Default)]
struct Recorder {
    events: Mutex<Vec<String>>,
}

impl GenerationProgressCallback for Recorder {
    fn on_generation_start(&self, total_files: usize) {
        self.events.lock().unwrap().push(format!("start:{total_files}"));
    }
    fn on_file_parsed(&self, path: &Path, _chars: usize) {
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        self.events.lock().unwrap().push(format!("parsed:{name}"));
    }
    fn on_file_skipped(&self, path: &Path, _reason: &str) {
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        self.events.lock().unwrap().push(format!("skipped:{name}"));
    }
    fn on_model_fallback(&self, failed_backend: &str, _error: &str) {
        self.events.lock().unwrap().push(format!("fallback:{failed_backend}"));
    }
    fn on_model_complete(&self, backend: &str, _reply_len: usize) {
        self.events.lock().unwrap().push(format!("complete:{backend}"));
    }
    fn on_output_written(&self, _path: &Path, sections: usize) {
        self.events.lock().unwrap().push(format!("written:{sections}"));
    }
}

#[tokio::test]
async fn progress_events_arrive_in_pipeline_order() {
    let dir = tempfile::tempdir().unwrap();
    let txt = write(dir.path(), "a.txt", "Text.");
    let bad = write(dir.path(), "b.xyz", "Text.");
    let out = dir.path().join("issue.html");

    let recorder = Arc::new(Recorder::default());
    let config = MagazineConfig::builder()
        .backends(vec![
            Canned::failing("hosted-mock") as Arc<dyn ModelBackend>,
            Canned::ok("local-mock", SPORTS_REPLY) as Arc<dyn ModelBackend>,
        ])
        .progress_callback(recorder.clone() as Arc<dyn GenerationProgressCallback>)
        .build()
        .unwrap();

    generate(&[txt, bad], &out, &config).await.unwrap();

    assert_eq!(
        *recorder.events.lock().unwrap(),
        vec![
            "start:2",
            "parsed:a.txt",
            "skipped:b.xyz",
            "fallback:hosted-mock",
            "complete:local-mock",
            "written:4",
        ]
    );
}

#[test]
fn generate_sync_writes_output() {
    let dir = tempfile::tempdir().unwrap();
    let txt = write(dir.path(), "a.txt", "Text.");
    let out = dir.path().join("sync.pdf");
    let config = config_with(
        vec![Canned::ok("mock", SPORTS_REPLY) as Arc<dyn ModelBackend>],
        Theme::Professional,
    );

    let output = generate_sync(&[txt], &out, &config).unwrap();
    assert_eq!(output.stats.sections, 4);
    assert!(std::fs::read(&out).unwrap().starts_with(b"%PDF-"));
}

// ── Live backend (gated) ─────────────────────────────────────────────────────

#[tokio::test]
async fn live_local_backend_produces_magazine() {
    if std::env::var("E2E_ENABLED").is_err() {
        println!("SKIP — set E2E_ENABLED=1 to run e2e tests");
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    let txt = write(
        dir.path(),
        "news.txt",
        "Our college won the inter-university football championship. \
         The cultural festival featured music and dance performances. \
         Three students received research scholarships.",
    );
    let out = dir.path().join("live.html");

    let mut builder = MagazineConfig::builder().theme(Theme::Modern);
    if let Ok(model) = std::env::var("OLLAMA_MODEL") {
        builder = builder.local_model(model);
    }
    let config = builder.build().unwrap();

    let output = generate(&[txt], &out, &config).await.unwrap();
    println!("{}", output.reply);
    assert_eq!(output.backend, "ollama");
    assert!(!output.sections.is_empty());
    assert!(std::fs::read_to_string(&out).unwrap().contains("Table of Contents"));
}
