//! Section parsing: turn the model's free-form reply into an ordered
//! section map.
//!
//! ## Primary pass
//!
//! ```text
//! **Campus Magazine**        ─▶ "Title" (first header, periodical keyword)
//! **Event Overview**         ─▶ opens section "Event Overview"
//! * Held on May 1            ─▶ list line, kept verbatim
//! Great turnout overall.     ─▶ plain line, kept verbatim
//! ```
//!
//! Lines before the first section header are dropped, and a section is only
//! committed once it has at least one content line.
//!
//! ## Fallback pass
//!
//! When the primary pass yields nothing (no `**Header**` lines at all, or
//! only empty sections), the reply is re-scanned: short upper-case or
//! title-case lines become headers and everything else lands in the current
//! section, starting with `"Introduction"`.

use serde::ser::{Serialize, SerializeMap, Serializer};

/// Reserved key holding the magazine's display title.
pub const TITLE_KEY: &str = "Title";

/// Initial section name of the fallback pass.
pub const FALLBACK_SECTION: &str = "Introduction";

/// Case-folded keywords that mark the first header as the magazine title.
pub const PERIODICAL_KEYWORDS: &[&str] = &["magazine", "journal", "chronicle", "gazette", "bulletin"];

/// Marker wrapped around header lines on both sides.
const HEADER_MARKER: &str = "**";

/// Fallback headers must be shorter than this many characters.
const FALLBACK_HEADER_MAX_CHARS: usize = 50;

/// Ordered mapping from section title to content lines.
///
/// Key order is first-insertion order. Re-inserting an existing title
/// replaces its lines but keeps its position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SectionMap {
    entries: Vec<(String, Vec<String>)>,
}

impl SectionMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a section.
    pub fn insert(&mut self, title: impl Into<String>, lines: Vec<String>) {
        let title = title.into();
        match self.entries.iter_mut().find(|(t, _)| *t == title) {
            Some((_, existing)) => *existing = lines,
            None => self.entries.push((title, lines)),
        }
    }

    pub fn get(&self, title: &str) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|(t, _)| t == title)
            .map(|(_, lines)| lines.as_slice())
    }

    /// The `"Title"` entry's display text, if the reply named the magazine.
    pub fn title(&self) -> Option<&str> {
        self.get(TITLE_KEY)
            .and_then(|lines| lines.first())
            .map(String::as_str)
    }

    /// Every entry, `"Title"` included, in map order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(t, lines)| (t.as_str(), lines.as_slice()))
    }

    /// Renderable sections: every entry except `"Title"`, in map order.
    pub fn sections(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.iter().filter(|(t, _)| *t != TITLE_KEY)
    }

    pub fn titles(&self) -> Vec<&str> {
        self.entries.iter().map(|(t, _)| t.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for SectionMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (title, lines) in &self.entries {
            map.serialize_entry(title, lines)?;
        }
        map.end()
    }
}

// ── Line classification ──────────────────────────────────────────────────────

/// How a content line is classified. Derived from the text alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// Starts with `"* "`, `"- "` or `"• "`.
    Bullet,
    /// A digit followed by `". "` or `") "`.
    Numbered,
    Plain,
}

impl LineKind {
    pub fn is_list(self) -> bool {
        !matches!(self, LineKind::Plain)
    }
}

const BULLET_PREFIXES: [&str; 3] = ["* ", "- ", "• "];

pub fn classify_line(line: &str) -> LineKind {
    if BULLET_PREFIXES.iter().any(|p| line.starts_with(p)) {
        return LineKind::Bullet;
    }
    let mut chars = line.chars();
    if let (Some(d), Some(p), Some(' ')) = (chars.next(), chars.next(), chars.next()) {
        if d.is_ascii_digit() && (p == '.' || p == ')') {
            return LineKind::Numbered;
        }
    }
    LineKind::Plain
}

/// Remove leading bullet glyphs, spaces and dashes from a bullet line.
pub fn strip_bullet(line: &str) -> &str {
    line.trim_start_matches(['*', ' ', '-', '•']).trim()
}

fn is_header_line(line: &str) -> bool {
    line.len() >= 2 * HEADER_MARKER.len()
        && line.starts_with(HEADER_MARKER)
        && line.ends_with(HEADER_MARKER)
}

fn header_text(line: &str) -> &str {
    line.trim_matches('*')
}

fn is_periodical_title(text: &str) -> bool {
    let folded = text.to_lowercase();
    PERIODICAL_KEYWORDS.iter().any(|k| folded.contains(k))
}

// ── Parsing ──────────────────────────────────────────────────────────────────

/// Parse a model reply into a [`SectionMap`].
///
/// Never fails. Returns an empty map only when the reply has no non-empty
/// line.
pub fn parse_sections(reply: &str) -> SectionMap {
    let sections = parse_marked(reply);
    if sections.is_empty() {
        tracing::debug!("No marked sections found, using fallback parser");
        parse_fallback(reply)
    } else {
        sections
    }
}

fn parse_marked(reply: &str) -> SectionMap {
    let mut sections = SectionMap::new();
    let mut current: Option<String> = None;
    let mut content: Vec<String> = Vec::new();
    let mut seen_header = false;

    for line in reply.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if is_header_line(line) {
            let text = header_text(line);
            let first = !seen_header;
            seen_header = true;

            if first && is_periodical_title(text) {
                sections.insert(TITLE_KEY, vec![text.to_string()]);
                continue;
            }

            if let Some(title) = current.take() {
                if !content.is_empty() {
                    sections.insert(title, std::mem::take(&mut content));
                }
            }
            content.clear();
            current = Some(text.to_string());
            continue;
        }

        if current.is_some() {
            content.push(line.to_string());
        }
    }

    if let Some(title) = current {
        if !content.is_empty() {
            sections.insert(title, content);
        }
    }

    sections
}

fn parse_fallback(reply: &str) -> SectionMap {
    let mut sections = SectionMap::new();
    let mut current = FALLBACK_SECTION.to_string();
    let mut content: Vec<String> = Vec::new();

    for line in reply.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if line.chars().count() < FALLBACK_HEADER_MAX_CHARS
            && (is_upper_case(line) || is_title_case(line))
        {
            if !content.is_empty() {
                sections.insert(current, std::mem::take(&mut content));
            }
            current = line.to_string();
            continue;
        }
        content.push(line.to_string());
    }

    if !content.is_empty() {
        sections.insert(current, content);
    }

    // Header-only input: keep every line rather than return nothing.
    if sections.is_empty() {
        let all: Vec<String> = reply
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(String::from)
            .collect();
        if !all.is_empty() {
            sections.insert(FALLBACK_SECTION, all);
        }
    }

    sections
}

/// At least one cased character, and no lower-case ones.
fn is_upper_case(s: &str) -> bool {
    let mut cased = false;
    for c in s.chars() {
        if c.is_lowercase() {
            return false;
        }
        if c.is_uppercase() {
            cased = true;
        }
    }
    cased
}

/// At least one cased character; upper-case letters only start words and
/// lower-case letters only continue them.
fn is_title_case(s: &str) -> bool {
    let mut cased = false;
    let mut prev_cased = false;
    for c in s.chars() {
        if c.is_uppercase() {
            if prev_cased {
                return false;
            }
            prev_cased = true;
            cased = true;
        } else if c.is_lowercase() {
            if !prev_cased {
                return false;
            }
            prev_cased = true;
            cased = true;
        } else {
            prev_cased = false;
        }
    }
    cased
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn title_and_event_overview() {
        let map = parse_sections(
            "**My Magazine**\n**Event Overview**\n* Held on May 1\n- 200 attendees\nGreat turnout overall.",
        );
        assert_eq!(map.titles(), vec!["Title", "Event Overview"]);
        assert_eq!(map.get("Title").unwrap(), lines(&["My Magazine"]).as_slice());
        assert_eq!(
            map.get("Event Overview").unwrap(),
            lines(&["* Held on May 1", "- 200 attendees", "Great turnout overall."]).as_slice()
        );
        assert_eq!(map.title(), Some("My Magazine"));
    }

    #[test]
    fn fallback_to_introduction() {
        let reply = "the fair opened on monday.\n\nstudents showed robots.\nprizes went to three teams.";
        let map = parse_sections(reply);
        assert_eq!(map.titles(), vec!["Introduction"]);
        assert_eq!(
            map.get("Introduction").unwrap(),
            lines(&[
                "the fair opened on monday.",
                "students showed robots.",
                "prizes went to three teams."
            ])
            .as_slice()
        );
    }

    #[test]
    fn first_header_without_keyword_is_a_section() {
        let map = parse_sections("**Highlights**\nA great year.\n**Sports Magazine**\nMore.");
        assert_eq!(map.titles(), vec!["Highlights", "Sports Magazine"]);
        assert!(map.title().is_none());
    }

    #[test]
    fn only_the_first_header_can_be_the_title() {
        let map = parse_sections("**Notes**\n**The Weekly Gazette**\nline");
        assert_eq!(map.titles(), vec!["The Weekly Gazette"]);
    }

    #[test]
    fn title_keyword_is_case_insensitive() {
        let map = parse_sections("**CAMPUS CHRONICLE**\n**News**\nx");
        assert_eq!(map.title(), Some("CAMPUS CHRONICLE"));
    }

    #[test]
    fn content_before_first_header_is_dropped() {
        let map = parse_sections("Here is your magazine:\n**Results**\n1. Gold\n2) Silver");
        assert_eq!(map.titles(), vec!["Results"]);
        assert_eq!(map.get("Results").unwrap(), lines(&["1. Gold", "2) Silver"]).as_slice());
    }

    #[test]
    fn empty_sections_are_not_committed() {
        let map = parse_sections("**Empty**\n**Full**\ncontent");
        assert_eq!(map.titles(), vec!["Full"]);
    }

    #[test]
    fn header_needs_markers_on_both_sides() {
        let map = parse_sections("**Open\n**Real**\n**bold** start of a sentence\nnot bold**");
        assert_eq!(map.titles(), vec!["Real"]);
        assert_eq!(
            map.get("Real").unwrap(),
            lines(&["**bold** start of a sentence", "not bold**"]).as_slice()
        );
    }

    #[test]
    fn short_marker_lines_are_not_headers() {
        assert!(!is_header_line("**"));
        assert!(!is_header_line("***"));
        assert!(is_header_line("****"));
    }

    #[test]
    fn header_text_is_not_normalised() {
        let map = parse_sections("**  Spaced  Out **\nbody");
        assert_eq!(map.titles(), vec!["  Spaced  Out "]);
    }

    #[test]
    fn repeated_header_keeps_first_position() {
        let map = parse_sections("**A**\none\n**B**\ntwo\n**A**\nthree");
        assert_eq!(map.titles(), vec!["A", "B"]);
        assert_eq!(map.get("A").unwrap(), lines(&["three"]).as_slice());
    }

    #[test]
    fn fallback_uses_short_upper_and_title_case_headers() {
        let reply = "Opening remarks from the principal were well received.\nSPORTS DAY\nwe won the relay.\nCultural Night\nthe choir sang.";
        let map = parse_sections(reply);
        assert_eq!(map.titles(), vec!["Introduction", "SPORTS DAY", "Cultural Night"]);
        assert_eq!(map.get("SPORTS DAY").unwrap(), lines(&["we won the relay."]).as_slice());
    }

    #[test]
    fn fallback_long_upper_line_is_content() {
        let long = "THIS LINE IS DEFINITELY MUCH LONGER THAN FIFTY CHARACTERS";
        let map = parse_sections(long);
        assert_eq!(map.get("Introduction").unwrap(), lines(&[long]).as_slice());
    }

    #[test]
    fn header_only_fallback_keeps_lines_under_introduction() {
        let map = parse_sections("ONE\nTwo Words");
        assert_eq!(map.titles(), vec!["Introduction"]);
        assert_eq!(map.get("Introduction").unwrap(), lines(&["ONE", "Two Words"]).as_slice());
    }

    #[test]
    fn blank_input_is_empty() {
        assert!(parse_sections("").is_empty());
        assert!(parse_sections("   \n\n").is_empty());
    }

    #[test]
    fn non_empty_input_yields_non_empty_map() {
        for reply in [
            "x",
            "**Only Header**\nbody",
            "plain text line",
            "**Magazine Weekly**\nsome words",
        ] {
            assert!(!parse_sections(reply).is_empty(), "empty for {reply:?}");
        }
    }

    #[test]
    fn case_predicates() {
        assert!(is_upper_case("AWARDS 2024"));
        assert!(!is_upper_case("2024"));
        assert!(!is_upper_case("Awards"));
        assert!(is_title_case("Event Overview"));
        assert!(is_title_case("Results 2024: Part One"));
        assert!(!is_title_case("Event overview"));
        assert!(!is_title_case("McDonald"));
        assert!(!is_title_case("123"));
    }

    #[test]
    fn classify_lines() {
        assert_eq!(classify_line("* item"), LineKind::Bullet);
        assert_eq!(classify_line("- item"), LineKind::Bullet);
        assert_eq!(classify_line("• item"), LineKind::Bullet);
        assert_eq!(classify_line("1. first"), LineKind::Numbered);
        assert_eq!(classify_line("7) seventh"), LineKind::Numbered);
        assert_eq!(classify_line("10. tenth"), LineKind::Plain);
        assert_eq!(classify_line("*bold*"), LineKind::Plain);
        assert_eq!(classify_line("-dash"), LineKind::Plain);
        assert_eq!(classify_line("1."), LineKind::Plain);
        assert_eq!(classify_line(""), LineKind::Plain);
        assert!(LineKind::Numbered.is_list());
        assert!(!LineKind::Plain.is_list());
    }

    #[test]
    fn classification_is_stable() {
        let corpus = ["* a", "plain", "3) c", "• d", "- e"];
        let first: Vec<_> = corpus.iter().map(|l| classify_line(l)).collect();
        let reversed: Vec<_> = corpus.iter().rev().map(|l| classify_line(l)).collect();
        let again: Vec<_> = corpus.iter().map(|l| classify_line(l)).collect();
        assert_eq!(first, again);
        assert_eq!(first, reversed.into_iter().rev().collect::<Vec<_>>());
    }

    #[test]
    fn strip_bullet_removes_glyph_prefix() {
        assert_eq!(strip_bullet("* Gold medal"), "Gold medal");
        assert_eq!(strip_bullet("- - nested"), "nested");
        assert_eq!(strip_bullet("• Relay team"), "Relay team");
    }

    #[test]
    fn serialises_in_map_order() {
        let mut map = SectionMap::new();
        map.insert("Zeta", vec!["z".into()]);
        map.insert("Alpha", vec!["a".into()]);
        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, r#"{"Zeta":["z"],"Alpha":["a"]}"#);
    }

    #[test]
    fn sections_skip_title() {
        let map = parse_sections("**The Bulletin**\n**One**\na\n**Two**\nb");
        let names: Vec<_> = map.sections().map(|(t, _)| t).collect();
        assert_eq!(names, vec!["One", "Two"]);
        assert_eq!(map.len(), 3);
    }
}
