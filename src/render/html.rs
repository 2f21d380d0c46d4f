//! Styled markup output: one self-contained HTML document.
//!
//! Layout mirrors the paginated output — cover block, contents table, one
//! block per section, footer — without page geometry. Every piece of model
//! text is HTML-escaped.

use super::{style_line, toc_entries, LineStyle, RenderOptions, SUBTITLE};
use crate::pipeline::sections::SectionMap;
use std::fmt::Write;

/// Ornament used on the cover and in the footer.
const ORNAMENT: &str = "✦ ✦ ✦";

/// Escape text for element content and attribute values.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Render `sections` as a styled HTML document.
pub fn render_html(sections: &SectionMap, opts: &RenderOptions) -> String {
    let style = opts.theme.style();
    let date = escape(&opts.date_label());
    let publisher = escape(&opts.publisher);
    let title = escape(opts.cover_title(sections));

    let mut html = String::with_capacity(8 * 1024);

    let _ = write!(
        html,
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{title}</title>
<style>
{base}
{theme_css}
.cover-page {{ text-align: center; padding: 60px 20px; min-height: 500px; display: flex; flex-direction: column; justify-content: center; background: linear-gradient(135deg, {g0} 0%, {g1} 100%); color: {cover_text}; border-radius: {radius}px; }}
.cover-page .title, .cover-page .subtitle {{ color: {cover_text}; -webkit-text-fill-color: {cover_text}; }}
.tagline {{ font-size: 1.4em; font-weight: bold; margin-top: 20px; }}
</style>
</head>
<body>
<div class="magazine-container">
<div class="cover-page">
<h1 class="title">{title}</h1>
<h2 class="subtitle">{subtitle}</h2>
<div class="decorative">{ornament}</div>
<p class="pub-info">Published by: {publisher}</p>
<p class="pub-date">Generated on: {date}</p>
<p class="tagline">{tagline}</p>
</div>
<div class="toc">
<h3>Table of Contents</h3>
<table>
"#,
        base = BASE_CSS,
        theme_css = style.css.trim(),
        g0 = style.cover_gradient.0,
        g1 = style.cover_gradient.1,
        cover_text = style.cover_text_color,
        radius = style.cover_radius_px,
        subtitle = escape(SUBTITLE),
        ornament = ORNAMENT,
        tagline = escape(&style.decorated_tagline()),
    );

    for (section, page) in toc_entries(sections) {
        let _ = writeln!(html, "<tr><td>{}</td><td>{}</td></tr>", escape(section), page);
    }
    html.push_str("</table>\n</div>\n");

    for (section, lines) in sections.sections() {
        let _ = writeln!(
            html,
            r#"<div class="content-section"><h3 class="section-header">{}</h3>"#,
            escape(section)
        );
        for line in lines {
            let styled = style_line(section, line);
            let text = escape(&styled.text);
            let _ = match styled.style {
                LineStyle::ListItem => writeln!(html, r#"<div class="achievement">{text}</div>"#),
                LineStyle::EventDetail => {
                    writeln!(html, r#"<div class="event-details">{text}</div>"#)
                }
                LineStyle::Paragraph => writeln!(html, "<p>{text}</p>"),
            };
        }
        html.push_str("</div>\n");
    }

    let _ = write!(
        html,
        r#"<div class="footer">
<p>Generated on: {date}</p>
<p>Published by: {publisher}</p>
<div class="decorative">{ORNAMENT}</div>
</div>
</div>
</body>
</html>
"#
    );

    html
}

const BASE_CSS: &str = r#"body { font-family: 'Segoe UI', Tahoma, Geneva, Verdana, sans-serif; max-width: 900px; margin: 0 auto; padding: 20px; line-height: 1.6; background: linear-gradient(135deg, #f5f7fa 0%, #c3cfe2 100%); }
.magazine-container { background: white; padding: 50px; border-radius: 15px; box-shadow: 0 10px 30px rgba(0,0,0,0.1); position: relative; overflow: hidden; }
.magazine-container::before { content: ''; position: absolute; top: 0; left: 0; right: 0; height: 5px; background: linear-gradient(90deg, #667eea 0%, #764ba2 100%); }
.toc { background: #f8f9fa; padding: 20px; border-radius: 10px; margin: 20px 0; }
.toc table { width: 100%; border-collapse: collapse; }
.toc td { padding: 8px; border-bottom: 1px solid #dee2e6; }
.toc td:last-child { text-align: right; font-weight: bold; color: #dc2626; }
.content-section { margin-bottom: 40px; padding: 20px; background: #fafbfc; border-radius: 8px; border-left: 4px solid #667eea; }
.footer { text-align: center; color: #6c757d; font-size: 0.9em; border-top: 2px solid #dee2e6; background: linear-gradient(135deg, #f5f7fa 0%, #c3cfe2 100%); margin: 40px -50px -50px -50px; padding: 30px 50px; }
@media print { body { background: white; } .magazine-container { box-shadow: none; } }"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Theme;
    use crate::pipeline::sections::parse_sections;
    use chrono::NaiveDate;

    fn opts(theme: Theme) -> RenderOptions {
        RenderOptions::new(theme).with_date(NaiveDate::from_ymd_opt(2024, 5, 1).unwrap())
    }

    #[test]
    fn escapes_model_text() {
        assert_eq!(escape(r#"<b>"A" & 'B'</b>"#), "&lt;b&gt;&quot;A&quot; &amp; &#39;B&#39;&lt;/b&gt;");
        let map = parse_sections("**Q&A <Live>**\n<script>alert(1)</script>");
        let html = render_html(&map, &opts(Theme::Professional));
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains("Q&amp;A &lt;Live&gt;"));
    }

    #[test]
    fn structure_and_treatments() {
        let map = parse_sections(
            "**My Magazine**\n**Event Overview**\n* Held on May 1\n- 200 attendees\nGreat turnout overall.\n**Results**\n1. Gold\nA close race.",
        );
        let html = render_html(&map, &opts(Theme::Sports));

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains(r#"<h1 class="title">My Magazine</h1>"#));
        assert!(html.contains("Generated on: May 01, 2024"));
        assert!(html.contains("<tr><td>Event Overview</td><td>2</td></tr>"));
        assert!(html.contains("<tr><td>Results</td><td>3</td></tr>"));
        assert!(html.contains(r#"<div class="achievement">• Held on May 1</div>"#));
        assert!(html.contains(r#"<div class="event-details">Great turnout overall.</div>"#));
        assert!(html.contains(r#"<div class="achievement">1. Gold</div>"#));
        assert!(html.contains("<p>A close race.</p>"));
        assert!(html.contains("🏆 Champions Celebrate 🏆"));
        assert!(html.contains("#43e97b"));
        assert!(!html.contains(r#"<h3 class="section-header">Title</h3>"#));
    }

    #[test]
    fn untitled_map_uses_default_title() {
        let map = parse_sections("plain words only");
        let html = render_html(&map, &opts(Theme::Academic));
        assert!(html.contains(r#"<h1 class="title">College Magazine</h1>"#));
        assert!(html.contains(r#"<h3 class="section-header">Introduction</h3>"#));
        assert!(html.contains("Times New Roman"));
    }

    #[test]
    fn empty_map_still_renders() {
        let html = render_html(&SectionMap::new(), &opts(Theme::Modern));
        assert!(html.contains("Table of Contents"));
        assert!(html.trim_end().ends_with("</html>"));
    }
}
