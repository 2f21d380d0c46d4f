//! Post-processing: deterministic clean-up of the model's reply.
//!
//! The section parser expects headers as stand-alone `**Header**` lines.
//! Models mostly comply, but small local models in particular wrap the whole
//! reply in a code fence, answer with Markdown `#` headings, or open with a
//! `TITLE: ...` line. These rules rewrite such replies into the shape the
//! parser understands without touching the content itself.
//!
//! ## Rule Order
//!
//! Fences are stripped and line endings normalised first so the heading
//! rules see clean, line-oriented input; the final newline pass runs last.

use once_cell::sync::Lazy;
use regex::Regex;

/// Apply all clean-up rules to the raw model reply.
///
/// Rules (applied in order):
/// 1. Strip an outer code fence
/// 2. Normalise line endings (CRLF / CR → LF)
/// 3. Strip invisible Unicode (zero-width spaces, BOM, soft hyphens)
/// 4. Trim trailing whitespace per line
/// 5. Rewrite a leading `TITLE: X` line as `**X**`
/// 6. Rewrite ATX headings (`#` … `######`) as `**X**`
/// 7. Collapse 3+ consecutive blank lines down to 2
/// 8. Ensure the text ends with exactly one newline
pub fn clean_reply(input: &str) -> String {
    let s = strip_code_fence(input);
    let s = normalise_line_endings(&s);
    let s = remove_invisible_chars(&s);
    let s = trim_trailing_whitespace(&s);
    let s = rewrite_title_line(&s);
    let s = rewrite_atx_headings(&s);
    let s = collapse_blank_lines(&s);
    ensure_final_newline(&s)
}

// ── Rule 1: Strip outer code fence ──────────────────────────────────────────

static RE_OUTER_FENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)^```(?:markdown|md|text|plaintext)?\r?\n(.*)\r?\n```\s*$").unwrap()
});

fn strip_code_fence(input: &str) -> String {
    if let Some(caps) = RE_OUTER_FENCE.captures(input.trim()) {
        caps[1].to_string()
    } else {
        input.to_string()
    }
}

// ── Rule 2: Normalise line endings ───────────────────────────────────────────

fn normalise_line_endings(input: &str) -> String {
    input.replace("\r\n", "\n").replace('\r', "\n")
}

// ── Rule 3: Remove invisible Unicode characters ─────────────────────────────

fn remove_invisible_chars(input: &str) -> String {
    input.replace(
        [
            '\u{200B}', '\u{FEFF}', '\u{00AD}', '\u{200C}', '\u{200D}', '\u{2060}',
        ],
        "",
    )
}

// ── Rule 4: Trim trailing whitespace per line ────────────────────────────────

fn trim_trailing_whitespace(input: &str) -> String {
    input
        .lines()
        .map(|line| line.trim_end())
        .collect::<Vec<_>>()
        .join("\n")
}

// ── Rule 5: leading TITLE: line ──────────────────────────────────────────────

// Only the first non-blank line; `Title:` further down is content.
static RE_TITLE_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\A((?:[ \t]*\n)*)[ \t]*title[ \t]*:[ \t]*(.+)").unwrap()
});

fn rewrite_title_line(input: &str) -> String {
    RE_TITLE_LINE
        .replace(input, |caps: &regex::Captures<'_>| {
            let blanks = &caps[1];
            format!("{blanks}{}", as_header(&caps[2], &caps[0][blanks.len()..]))
        })
        .to_string()
}

// ── Rule 6: ATX headings ─────────────────────────────────────────────────────

static RE_ATX_HEADING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^[ \t]{0,3}#{1,6}[ \t]+(.+?)(?:[ \t]+#+)?[ \t]*$").unwrap());

fn rewrite_atx_headings(input: &str) -> String {
    RE_ATX_HEADING
        .replace_all(input, |caps: &regex::Captures<'_>| as_header(&caps[1], &caps[0]))
        .to_string()
}

/// Wrap `text` as a `**text**` header line; an empty text leaves `original`.
fn as_header(text: &str, original: &str) -> String {
    let text = text.trim().trim_matches('*').trim();
    if text.is_empty() {
        original.to_string()
    } else {
        format!("**{text}**")
    }
}

// ── Rule 7: Collapse excessive blank lines ───────────────────────────────────

static RE_BLANK_LINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{4,}").unwrap());

fn collapse_blank_lines(input: &str) -> String {
    RE_BLANK_LINES.replace_all(input, "\n\n\n").to_string()
}

// ── Rule 8: Ensure text ends with single newline ─────────────────────────────

fn ensure_final_newline(input: &str) -> String {
    let trimmed = input.trim_end();
    if trimmed.is_empty() {
        String::from("\n")
    } else {
        format!("{}\n", trimmed)
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
