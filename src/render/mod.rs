//! Rendering: section map + theme → finished document.
//!
//! Two formats share the rules in this module:
//!
//! * [`pdf`] — native paginated layout (borders, header and footer bands,
//!   forced page breaks) serialised with lopdf.
//! * [`html`] — one self-contained styled document.
//!
//! [`markup`] derives a PDF from the [`html`] output through an external
//! converter. Neither renderer fails for a well-formed section map; only the
//! external conversion can.

pub mod html;
pub mod markup;
pub mod pdf;
pub mod theme;

use crate::config::Theme;
use crate::pipeline::sections::{classify_line, strip_bullet, LineKind, SectionMap};
use chrono::{Local, NaiveDate};
use std::borrow::Cow;

/// Subtitle printed under the cover title.
pub const SUBTITLE: &str = "Events & Achievements";

/// Fixed label in every page's header band.
pub const HEADER_LABEL: &str = "College Magazine";

/// Sections that always start on a fresh page in paginated output.
pub const PAGE_BREAK_SECTIONS: &[&str] = &["Event Overview", "Academic Excellence"];

/// Section whose plain lines get the event-detail treatment (case-insensitive).
pub const EVENT_SECTION: &str = "event overview";

/// Inputs every renderer needs besides the section map.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub theme: Theme,
    /// Date printed on the cover and in footers.
    pub date: NaiveDate,
    /// Cover title when the map has no `"Title"` entry.
    pub default_title: String,
    pub publisher: String,
}

impl RenderOptions {
    /// Options for `theme`, dated today.
    pub fn new(theme: Theme) -> Self {
        Self {
            theme,
            date: Local::now().date_naive(),
            default_title: HEADER_LABEL.to_string(),
            publisher: "Your Organization".to_string(),
        }
    }

    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = date;
        self
    }

    /// "Month Day, Year", e.g. `May 01, 2024`.
    pub fn date_label(&self) -> String {
        self.date.format("%B %d, %Y").to_string()
    }

    pub fn cover_title<'a>(&'a self, sections: &'a SectionMap) -> &'a str {
        sections.title().unwrap_or(&self.default_title)
    }
}

/// Visual treatment of one content line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStyle {
    ListItem,
    EventDetail,
    Paragraph,
}

/// A content line ready to draw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyledLine<'a> {
    pub style: LineStyle,
    pub text: Cow<'a, str>,
}

/// Pick the treatment for `line` inside section `section_title`.
///
/// Bullet lines lose their marker and gain a `•`; numbered lines stay
/// verbatim.
pub fn style_line<'a>(section_title: &str, line: &'a str) -> StyledLine<'a> {
    match classify_line(line) {
        LineKind::Bullet => StyledLine {
            style: LineStyle::ListItem,
            text: Cow::Owned(format!("• {}", strip_bullet(line))),
        },
        LineKind::Numbered => StyledLine {
            style: LineStyle::ListItem,
            text: Cow::Borrowed(line),
        },
        LineKind::Plain if section_title.to_lowercase() == EVENT_SECTION => StyledLine {
            style: LineStyle::EventDetail,
            text: Cow::Borrowed(line),
        },
        LineKind::Plain => StyledLine {
            style: LineStyle::Paragraph,
            text: Cow::Borrowed(line),
        },
    }
}

/// Table-of-contents rows: every non-Title section with its page number,
/// counting from 2.
pub fn toc_entries(sections: &SectionMap) -> Vec<(&str, usize)> {
    sections
        .sections()
        .enumerate()
        .map(|(i, (title, _))| (title, i + 2))
        .collect()
}

pub fn breaks_page_before(section_title: &str) -> bool {
    PAGE_BREAK_SECTIONS.contains(&section_title)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::sections::parse_sections;

    #[test]
    fn line_styles() {
        let s = style_line("Results", "* Gold medal");
        assert_eq!(s.style, LineStyle::ListItem);
        assert_eq!(s.text, "• Gold medal");

        let s = style_line("Results", "2) Silver");
        assert_eq!(s.style, LineStyle::ListItem);
        assert_eq!(s.text, "2) Silver");

        assert_eq!(style_line("EVENT OVERVIEW", "Held in the hall").style, LineStyle::EventDetail);
        assert_eq!(style_line("Event Overview", "- 200 attendees").style, LineStyle::ListItem);
        assert_eq!(style_line("Highlights", "Held in the hall").style, LineStyle::Paragraph);
    }

    #[test]
    fn toc_numbers_start_at_two_and_skip_title() {
        let map = parse_sections("**Spring Gazette**\n**A**\na\n**B**\nb\n**C**\nc");
        assert_eq!(toc_entries(&map), vec![("A", 2), ("B", 3), ("C", 4)]);
    }

    #[test]
    fn cover_title_falls_back_to_default() {
        let opts = RenderOptions::new(Theme::Modern);
        let untitled = parse_sections("**A**\na");
        assert_eq!(opts.cover_title(&untitled), "College Magazine");
        let titled = parse_sections("**The Journal**\n**A**\na");
        assert_eq!(opts.cover_title(&titled), "The Journal");
    }

    #[test]
    fn date_label_format() {
        let opts = RenderOptions::new(Theme::Professional)
            .with_date(NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
        assert_eq!(opts.date_label(), "May 01, 2024");
    }

    #[test]
    fn page_break_titles_are_exact() {
        assert!(breaks_page_before("Event Overview"));
        assert!(breaks_page_before("Academic Excellence"));
        assert!(!breaks_page_before("event overview"));
        assert!(!breaks_page_before("Highlights"));
    }
}
