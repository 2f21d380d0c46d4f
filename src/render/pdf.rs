//! Native paginated output.
//!
//! Rendering happens in two steps:
//!
//! 1. [`layout`] flows the cover, the contents table and every section onto
//!    US-Letter pages and returns a [`Layout`]: plain data, one list of
//!    [`DrawOp`]s per page, including the per-page decorations.
//! 2. [`serialize`] writes that layout as a PDF with lopdf, using the base-14
//!    Helvetica fonts in WinAnsi encoding (no font embedding).
//!
//! ## Page geometry
//!
//! ```text
//!  ┌──────────── 8.5in ────────────┐
//!  │ ▓▓ header band (label) ▓▓▓▓▓  │  ← 10.2in .. 10.5in
//!  │ ┌─ outer / inner border ─┐    │
//!  │ │  frame: 1in side       │    │
//!  │ │  margins, 1.2in top,   │    │
//!  │ │  1in bottom            │    │
//!  │ └────────────────────────┘    │
//!  │ ▓▓ footer band (date, page) ▓ │  ← 0.2in .. 0.5in
//!  └───────────────────────────────┘
//! ```
//!
//! A forced break on a page that has no content yet is a no-op, so breaks
//! after the contents table and before "Event Overview" never leave a blank
//! page behind.

use super::theme::{EmblemShape, ThemeStyle};
use super::{breaks_page_before, style_line, toc_entries, LineStyle, RenderOptions, HEADER_LABEL, SUBTITLE};
use crate::error::MagazineError;
use crate::pipeline::sections::SectionMap;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream, StringFormat};

const INCH: f32 = 72.0;

pub const PAGE_WIDTH: f32 = 8.5 * INCH;
pub const PAGE_HEIGHT: f32 = 11.0 * INCH;

const MARGIN_SIDE: f32 = INCH;
const MARGIN_TOP: f32 = 1.2 * INCH;
const MARGIN_BOTTOM: f32 = INCH;

const FRAME_LEFT: f32 = MARGIN_SIDE;
const FRAME_WIDTH: f32 = PAGE_WIDTH - 2.0 * MARGIN_SIDE;
const FRAME_TOP: f32 = PAGE_HEIGHT - MARGIN_TOP;
const FRAME_BOTTOM: f32 = MARGIN_BOTTOM;

/// Line height as a multiple of the font size.
const LEADING: f32 = 1.2;
/// Baseline offset from the top of a line box, as a multiple of the font size.
const BASELINE: f32 = 0.85;

const BODY_SIZE: f32 = 11.0;
const TOC_TITLE_WIDTH: f32 = 4.0 * INCH;
const TOC_PAGE_WIDTH: f32 = INCH;
const TOC_FONT_SIZE: f32 = 12.0;
const TOC_PAD_X: f32 = 12.0;
const TOC_PAD_Y: f32 = 8.0;
/// A contents row never wraps past this; the rest of the title is elided.
const TOC_MAX_LINES: usize = 3;

// ── Layout model ─────────────────────────────────────────────────────────────

/// RGB colour with components in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgb(pub f32, pub f32, pub f32);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0.0, 0.0, 0.0);

    /// Parse `#rrggbb`; malformed components read as 0.
    pub fn hex(code: &str) -> Self {
        let code = code.trim_start_matches('#');
        let channel = |i: usize| {
            code.get(i..i + 2)
                .and_then(|c| u8::from_str_radix(c, 16).ok())
                .unwrap_or(0) as f32
                / 255.0
        };
        Rgb(channel(0), channel(2), channel(4))
    }
}

/// Base-14 font used for a text run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Font {
    Regular,
    Bold,
}

impl Font {
    fn resource(self) -> &'static str {
        match self {
            Font::Regular => "F1",
            Font::Bold => "F2",
        }
    }
}

/// One drawing instruction, in PDF user space (points, origin bottom-left).
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Text {
        x: f32,
        y: f32,
        font: Font,
        size: f32,
        color: Rgb,
        text: String,
    },
    Rect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        fill: Option<Rgb>,
        stroke: Option<(Rgb, f32)>,
    },
    Circle {
        cx: f32,
        cy: f32,
        r: f32,
        fill: Rgb,
    },
    Polygon {
        points: Vec<(f32, f32)>,
        fill: Rgb,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    /// 1-based.
    pub number: usize,
    pub ops: Vec<DrawOp>,
}

impl Page {
    /// Text runs on the page, in drawing order.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    pub pages: Vec<Page>,
}

impl Layout {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}

// ── Text metrics ─────────────────────────────────────────────────────────────

/// Helvetica advance widths (1/1000 em) for ASCII 32..=126.
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '../
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // 0..9
    278, 278, 584, 584, 584, 556, 1015, // :..@
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, // A..M
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, // N..Z
    278, 278, 278, 469, 556, 333, // [..`
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, // a..m
    556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, // n..z
    334, 260, 334, 584, // {..~
];

/// Helvetica-Bold advance widths (1/1000 em) for ASCII 32..=126.
const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278, // ' '../
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // 0..9
    333, 333, 584, 584, 584, 611, 975, // :..@
    722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, // A..M
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, // N..Z
    333, 278, 333, 584, 556, 333, // [..`
    556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, // a..m
    611, 611, 611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, // n..z
    389, 280, 389, 584, // {..~
];

/// Map a character to its WinAnsiEncoding byte; `?` when it has none.
pub fn win_ansi(c: char) -> u8 {
    match c {
        ' '..='~' => c as u8,
        '\t' => b' ',
        '\u{a0}'..='\u{ff}' => c as u32 as u8,
        '€' => 0x80,
        '‚' => 0x82,
        'ƒ' => 0x83,
        '„' => 0x84,
        '…' => 0x85,
        '†' => 0x86,
        '‡' => 0x87,
        'ˆ' => 0x88,
        '‰' => 0x89,
        'Š' => 0x8a,
        '‹' => 0x8b,
        'Œ' => 0x8c,
        'Ž' => 0x8e,
        '‘' => 0x91,
        '’' => 0x92,
        '“' => 0x93,
        '”' => 0x94,
        '•' => 0x95,
        '–' => 0x96,
        '—' => 0x97,
        '˜' => 0x98,
        '™' => 0x99,
        'š' => 0x9a,
        '›' => 0x9b,
        'œ' => 0x9c,
        'ž' => 0x9e,
        'Ÿ' => 0x9f,
        _ => b'?',
    }
}

pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars().map(win_ansi).collect()
}

fn glyph_width(byte: u8, font: Font) -> u16 {
    let table = match font {
        Font::Regular => &HELVETICA_WIDTHS,
        Font::Bold => &HELVETICA_BOLD_WIDTHS,
    };
    match byte {
        32..=126 => table[(byte - 32) as usize],
        0x95 => 350,
        0x85 | 0x97 | 0x99 | 0x89 => 1000,
        0x91 | 0x92 | 0x82 => match font {
            Font::Regular => 222,
            Font::Bold => 278,
        },
        0x93 | 0x94 | 0x84 => match font {
            Font::Regular => 333,
            Font::Bold => 500,
        },
        _ => 556,
    }
}

/// Width of `text` in points.
pub fn text_width(text: &str, font: Font, size: f32) -> f32 {
    let units: u32 = text
        .chars()
        .map(|c| glyph_width(win_ansi(c), font) as u32)
        .sum();
    units as f32 * size / 1000.0
}

/// Greedy word wrap. Words wider than `max_width` are split by character.
pub fn wrap(text: &str, font: Font, size: f32, max_width: f32) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{current} {word}")
        };
        if text_width(&candidate, font, size) <= max_width {
            current = candidate;
            continue;
        }
        if !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if text_width(word, font, size) <= max_width {
            current = word.to_string();
        } else {
            for c in word.chars() {
                current.push(c);
                if text_width(&current, font, size) > max_width && current.chars().count() > 1 {
                    current.pop();
                    lines.push(std::mem::take(&mut current));
                    current.push(c);
                }
            }
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Keep at most `max_lines` of `lines`, ending the last kept one with `…`.
fn clamp_lines(mut lines: Vec<String>, max_lines: usize, font: Font, size: f32, max_width: f32) -> Vec<String> {
    if lines.len() <= max_lines {
        return lines;
    }
    lines.truncate(max_lines.max(1));
    if let Some(last) = lines.last_mut() {
        while !last.is_empty() && text_width(&format!("{last}…"), font, size) > max_width {
            last.pop();
        }
        last.push('…');
    }
    lines
}

// ── Composition ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Align {
    Left,
    Center,
}

#[derive(Debug, Clone, Copy)]
struct ParaStyle {
    font: Font,
    size: f32,
    color: Rgb,
    align: Align,
    indent: f32,
    padding: f32,
    background: Option<Rgb>,
    space_after: f32,
}

impl ParaStyle {
    fn body(size: f32) -> Self {
        Self {
            font: Font::Regular,
            size,
            color: Rgb::BLACK,
            align: Align::Left,
            indent: 0.0,
            padding: 0.0,
            background: None,
            space_after: 6.0,
        }
    }

    fn centered(font: Font, size: f32, color: Rgb) -> Self {
        Self {
            font,
            color,
            align: Align::Center,
            space_after: 0.0,
            ..Self::body(size)
        }
    }

    fn heading(style: &ThemeStyle) -> Self {
        Self {
            font: Font::Bold,
            color: Rgb::hex(style.section_color),
            space_after: 15.0,
            ..Self::body(style.section_size)
        }
    }

    fn for_line(line: LineStyle, style: &ThemeStyle) -> Self {
        match line {
            LineStyle::ListItem => Self {
                color: Rgb::hex(style.achievement_color),
                indent: 30.0,
                padding: 4.0,
                background: Some(Rgb::hex(style.achievement_background)),
                space_after: 4.0,
                ..Self::body(style.achievement_size)
            },
            LineStyle::EventDetail => Self {
                color: Rgb::hex(style.event_color),
                indent: 20.0,
                padding: 4.0,
                background: Some(Rgb::hex(style.event_background)),
                ..Self::body(style.event_size)
            },
            LineStyle::Paragraph => Self::body(BODY_SIZE),
        }
    }

    fn leading(&self) -> f32 {
        self.size * LEADING
    }
}

/// Flows blocks onto pages.
struct Composer {
    pages: Vec<Vec<DrawOp>>,
    current: Vec<DrawOp>,
    /// Top of the next line box.
    y: f32,
}

impl Composer {
    fn new() -> Self {
        Self {
            pages: Vec::new(),
            current: Vec::new(),
            y: FRAME_TOP,
        }
    }

    /// Close the current page. No-op on a page without content.
    fn page_break(&mut self) {
        if !self.current.is_empty() {
            self.pages.push(std::mem::take(&mut self.current));
        }
        self.y = FRAME_TOP;
    }

    /// Start a new page unless `height` still fits.
    fn ensure(&mut self, height: f32) {
        if self.y - height < FRAME_BOTTOM {
            self.page_break();
        }
    }

    fn space(&mut self, height: f32) {
        self.y -= height;
        if self.y < FRAME_BOTTOM {
            self.page_break();
        }
    }

    fn paragraph(&mut self, text: &str, p: &ParaStyle) {
        let leading = p.leading();
        let text_room = FRAME_WIDTH - p.indent - 2.0 * p.padding;

        for line in wrap(text, p.font, p.size, text_room) {
            self.ensure(leading);
            let top = self.y;
            if let Some(bg) = p.background {
                self.current.push(DrawOp::Rect {
                    x: FRAME_LEFT + p.indent,
                    y: top - leading,
                    width: FRAME_WIDTH - p.indent,
                    height: leading,
                    fill: Some(bg),
                    stroke: None,
                });
            }
            let x = match p.align {
                Align::Left => FRAME_LEFT + p.indent + p.padding,
                Align::Center => {
                    FRAME_LEFT + (FRAME_WIDTH - text_width(&line, p.font, p.size)) / 2.0
                }
            };
            self.current.push(DrawOp::Text {
                x,
                y: top - p.size * BASELINE,
                font: p.font,
                size: p.size,
                color: p.color,
                text: line,
            });
            self.y -= leading;
        }
        self.space(p.space_after);
    }

    /// Three diamonds, centred, standing in for the cover ornament.
    fn ornament(&mut self, size: f32, color: Rgb) {
        let height = size * LEADING;
        self.ensure(height);
        let cy = self.y - height / 2.0;
        let half = size * 0.3;
        let centre = FRAME_LEFT + FRAME_WIDTH / 2.0;
        for dx in [-size * 1.25, 0.0, size * 1.25] {
            let cx = centre + dx;
            self.current.push(DrawOp::Polygon {
                points: vec![(cx, cy + half), (cx + half * 0.6, cy), (cx, cy - half), (cx - half * 0.6, cy)],
                fill: color,
            });
        }
        self.y -= height;
    }

    fn toc_table(&mut self, entries: &[(&str, usize)]) {
        let x0 = FRAME_LEFT + (FRAME_WIDTH - TOC_TITLE_WIDTH - TOC_PAGE_WIDTH) / 2.0;
        let leading = TOC_FONT_SIZE * LEADING;
        let grid = Some((Rgb::hex("#e5e7eb"), 0.5));
        let text_color = Rgb::hex("#1f2937");
        let page_color = Rgb::hex("#dc2626");

        for (i, (title, page)) in entries.iter().enumerate() {
            let room = TOC_TITLE_WIDTH - 2.0 * TOC_PAD_X;
            let lines = wrap(title, Font::Regular, TOC_FONT_SIZE, room);
            let lines = clamp_lines(lines, TOC_MAX_LINES, Font::Regular, TOC_FONT_SIZE, room);
            let row_height = lines.len().max(1) as f32 * leading + 2.0 * TOC_PAD_Y;
            self.ensure(row_height);

            let top = self.y;
            let fill = Some(Rgb::hex(if i % 2 == 0 { "#fef3c7" } else { "#f8fafc" }));
            self.current.push(DrawOp::Rect {
                x: x0,
                y: top - row_height,
                width: TOC_TITLE_WIDTH,
                height: row_height,
                fill,
                stroke: grid,
            });
            self.current.push(DrawOp::Rect {
                x: x0 + TOC_TITLE_WIDTH,
                y: top - row_height,
                width: TOC_PAGE_WIDTH,
                height: row_height,
                fill,
                stroke: grid,
            });

            for (j, line) in lines.into_iter().enumerate() {
                self.current.push(DrawOp::Text {
                    x: x0 + TOC_PAD_X,
                    y: top - TOC_PAD_Y - j as f32 * leading - TOC_FONT_SIZE * BASELINE,
                    font: Font::Regular,
                    size: TOC_FONT_SIZE,
                    color: text_color,
                    text: line,
                });
            }

            let number = page.to_string();
            let width = text_width(&number, Font::Bold, TOC_FONT_SIZE);
            self.current.push(DrawOp::Text {
                x: x0 + TOC_TITLE_WIDTH + TOC_PAGE_WIDTH - TOC_PAD_X - width,
                y: top - TOC_PAD_Y - TOC_FONT_SIZE * BASELINE,
                font: Font::Bold,
                size: TOC_FONT_SIZE,
                color: page_color,
                text: number,
            });

            self.y -= row_height;
        }
    }

    fn finish(mut self) -> Vec<Vec<DrawOp>> {
        self.page_break();
        self.pages
    }
}

/// Lay the magazine out onto pages.
pub fn layout(sections: &SectionMap, opts: &RenderOptions) -> Layout {
    let style = opts.theme.style();
    let date = opts.date_label();
    let mut c = Composer::new();

    // Cover
    c.paragraph(
        opts.cover_title(sections),
        &ParaStyle {
            space_after: 30.0,
            ..ParaStyle::centered(Font::Bold, style.title_size, Rgb::hex(style.title_color))
        },
    );
    c.space(30.0);
    c.paragraph(SUBTITLE, &ParaStyle::centered(Font::Bold, 14.0, Rgb::BLACK));
    c.space(50.0);
    c.ornament(24.0, Rgb::hex("#f59e0b"));
    c.space(30.0);
    let muted = Rgb::hex("#6b7280");
    c.paragraph(
        &format!("Published by: {}", opts.publisher),
        &ParaStyle::centered(Font::Regular, 12.0, muted),
    );
    c.paragraph(
        &format!("Generated on: {date}"),
        &ParaStyle::centered(Font::Regular, 12.0, muted),
    );
    c.space(30.0);
    c.paragraph(
        style.tagline,
        &ParaStyle::centered(Font::Bold, 18.0, Rgb::hex(style.tagline_color)),
    );
    c.space(20.0);
    c.paragraph("• • •", &ParaStyle::centered(Font::Regular, 16.0, Rgb::hex("#e5e7eb")));
    c.page_break();

    // Contents
    c.paragraph("Table of Contents", &ParaStyle::heading(style));
    c.space(20.0);
    c.toc_table(&toc_entries(sections));
    c.page_break();

    // Sections
    for (title, lines) in sections.sections() {
        if breaks_page_before(title) {
            c.page_break();
        }
        let heading = ParaStyle::heading(style);
        // Keep the heading with its first line.
        let first_line = lines
            .first()
            .map(|l| ParaStyle::for_line(style_line(title, l).style, style).leading())
            .unwrap_or(0.0);
        c.ensure(heading.leading() + heading.space_after + first_line);
        c.paragraph(title, &heading);

        for line in lines {
            let styled = style_line(title, line);
            c.paragraph(&styled.text, &ParaStyle::for_line(styled.style, style));
        }
    }

    let pages = c
        .finish()
        .into_iter()
        .enumerate()
        .map(|(i, content)| {
            let number = i + 1;
            let mut ops = decorations(number, &date, style);
            ops.extend(content);
            Page { number, ops }
        })
        .collect();

    Layout { pages }
}

/// Border, header band and footer band drawn under every page's content.
fn decorations(page: usize, date: &str, style: &ThemeStyle) -> Vec<DrawOp> {
    let band = Rgb::hex("#f8fafc");
    let accent = Rgb::hex("#dc2626");
    let mut ops = vec![
        DrawOp::Rect {
            x: 0.7 * INCH,
            y: 0.7 * INCH,
            width: 6.6 * INCH,
            height: 9.6 * INCH,
            fill: None,
            stroke: Some((Rgb::hex(style.border_outer), 1.0)),
        },
        DrawOp::Rect {
            x: 0.8 * INCH,
            y: 0.8 * INCH,
            width: 6.4 * INCH,
            height: 9.4 * INCH,
            fill: None,
            stroke: Some((Rgb::hex(style.border_inner), 0.3)),
        },
        DrawOp::Rect {
            x: 0.7 * INCH,
            y: 10.2 * INCH,
            width: 6.6 * INCH,
            height: 0.3 * INCH,
            fill: Some(band),
            stroke: None,
        },
        DrawOp::Text {
            x: INCH,
            y: 10.4 * INCH,
            font: Font::Bold,
            size: 10.0,
            color: Rgb::hex("#1e40af"),
            text: HEADER_LABEL.to_string(),
        },
        DrawOp::Circle {
            cx: 0.9 * INCH,
            cy: 10.3 * INCH,
            r: 0.05 * INCH,
            fill: accent,
        },
        DrawOp::Circle {
            cx: 7.1 * INCH,
            cy: 10.3 * INCH,
            r: 0.05 * INCH,
            fill: accent,
        },
        DrawOp::Rect {
            x: 0.7 * INCH,
            y: 0.2 * INCH,
            width: 6.6 * INCH,
            height: 0.3 * INCH,
            fill: Some(band),
            stroke: None,
        },
        DrawOp::Text {
            x: INCH,
            y: 0.35 * INCH,
            font: Font::Regular,
            size: 8.0,
            color: Rgb::hex("#6b7280"),
            text: format!("Generated on {date}"),
        },
    ];

    let label = format!("Page {page}");
    ops.push(DrawOp::Text {
        x: 7.0 * INCH - text_width(&label, Font::Bold, 10.0),
        y: 0.35 * INCH,
        font: Font::Bold,
        size: 10.0,
        color: accent,
        text: label,
    });

    if let Some(emblem) = style.emblem {
        ops.extend(emblem_ops(emblem.shape, Rgb::hex(emblem.color), 6.3 * INCH + 6.0, 10.4 * INCH + 3.5));
    }
    ops
}

fn emblem_ops(shape: EmblemShape, fill: Rgb, cx: f32, cy: f32) -> Vec<DrawOp> {
    match shape {
        EmblemShape::Star => {
            let points = (0..10)
                .map(|i| {
                    let r = if i % 2 == 0 { 6.0 } else { 2.5 };
                    let angle = std::f32::consts::FRAC_PI_2 + i as f32 * std::f32::consts::PI / 5.0;
                    (cx + r * angle.cos(), cy + r * angle.sin())
                })
                .collect();
            vec![DrawOp::Polygon { points, fill }]
        }
        EmblemShape::Book => vec![
            DrawOp::Rect {
                x: cx - 6.0,
                y: cy - 4.0,
                width: 5.5,
                height: 8.0,
                fill: Some(fill),
                stroke: None,
            },
            DrawOp::Rect {
                x: cx + 0.5,
                y: cy - 4.0,
                width: 5.5,
                height: 8.0,
                fill: Some(fill),
                stroke: None,
            },
        ],
        EmblemShape::Rocket => vec![
            DrawOp::Polygon {
                points: vec![
                    (cx - 2.0, cy - 5.0),
                    (cx + 2.0, cy - 5.0),
                    (cx + 2.0, cy + 2.0),
                    (cx, cy + 6.0),
                    (cx - 2.0, cy + 2.0),
                ],
                fill,
            },
            DrawOp::Polygon {
                points: vec![(cx - 2.0, cy - 5.0), (cx - 4.5, cy - 6.5), (cx - 2.0, cy - 1.0)],
                fill,
            },
            DrawOp::Polygon {
                points: vec![(cx + 2.0, cy - 5.0), (cx + 4.5, cy - 6.5), (cx + 2.0, cy - 1.0)],
                fill,
            },
        ],
    }
}

// ── Serialisation ────────────────────────────────────────────────────────────

fn real(v: f32) -> Object {
    Object::Real(v)
}

fn set_fill(ops: &mut Vec<Operation>, c: Rgb) {
    ops.push(Operation::new("rg", vec![real(c.0), real(c.1), real(c.2)]));
}

fn draw_op_content(op: &DrawOp, out: &mut Vec<Operation>) {
    out.push(Operation::new("q", vec![]));
    match op {
        DrawOp::Text {
            x,
            y,
            font,
            size,
            color,
            text,
        } => {
            set_fill(out, *color);
            out.push(Operation::new("BT", vec![]));
            out.push(Operation::new(
                "Tf",
                vec![Object::Name(font.resource().as_bytes().to_vec()), real(*size)],
            ));
            out.push(Operation::new("Td", vec![real(*x), real(*y)]));
            out.push(Operation::new(
                "Tj",
                vec![Object::String(encode_win_ansi(text), StringFormat::Hexadecimal)],
            ));
            out.push(Operation::new("ET", vec![]));
        }
        DrawOp::Rect {
            x,
            y,
            width,
            height,
            fill,
            stroke,
        } => {
            if let Some(f) = fill {
                set_fill(out, *f);
            }
            if let Some((s, w)) = stroke {
                out.push(Operation::new("RG", vec![real(s.0), real(s.1), real(s.2)]));
                out.push(Operation::new("w", vec![real(*w)]));
            }
            out.push(Operation::new(
                "re",
                vec![real(*x), real(*y), real(*width), real(*height)],
            ));
            let paint = match (fill.is_some(), stroke.is_some()) {
                (true, true) => "B",
                (true, false) => "f",
                (false, true) => "S",
                (false, false) => "n",
            };
            out.push(Operation::new(paint, vec![]));
        }
        DrawOp::Circle { cx, cy, r, fill } => {
            // Four Bézier quadrants.
            const K: f32 = 0.552_284_8;
            let (cx, cy, r) = (*cx, *cy, *r);
            let k = K * r;
            set_fill(out, *fill);
            out.push(Operation::new("m", vec![real(cx + r), real(cy)]));
            for [x1, y1, x2, y2, x3, y3] in [
                [cx + r, cy + k, cx + k, cy + r, cx, cy + r],
                [cx - k, cy + r, cx - r, cy + k, cx - r, cy],
                [cx - r, cy - k, cx - k, cy - r, cx, cy - r],
                [cx + k, cy - r, cx + r, cy - k, cx + r, cy],
            ] {
                out.push(Operation::new(
                    "c",
                    vec![real(x1), real(y1), real(x2), real(y2), real(x3), real(y3)],
                ));
            }
            out.push(Operation::new("h", vec![]));
            out.push(Operation::new("f", vec![]));
        }
        DrawOp::Polygon { points, fill } => {
            if let Some(((x0, y0), rest)) = points.split_first() {
                set_fill(out, *fill);
                out.push(Operation::new("m", vec![real(*x0), real(*y0)]));
                for (x, y) in rest {
                    out.push(Operation::new("l", vec![real(*x), real(*y)]));
                }
                out.push(Operation::new("h", vec![]));
                out.push(Operation::new("f", vec![]));
            }
        }
    }
    out.push(Operation::new("Q", vec![]));
}

/// Write `layout` as PDF bytes.
pub fn serialize(layout: &Layout, title: &str) -> Result<Vec<u8>, MagazineError> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let regular_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let bold_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica-Bold",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            Font::Regular.resource() => regular_id,
            Font::Bold.resource() => bold_id,
        },
    });

    let mut kids: Vec<Object> = Vec::with_capacity(layout.pages.len());
    for page in &layout.pages {
        let mut operations = Vec::new();
        for op in &page.ops {
            draw_op_content(op, &mut operations);
        }
        let content = Content { operations }
            .encode()
            .map_err(|e| MagazineError::Internal(format!("PDF content encoding: {e}")))?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, content));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![Object::Integer(0), Object::Integer(0), real(PAGE_WIDTH), real(PAGE_HEIGHT)],
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    let info_id = doc.add_object(dictionary! {
        "Title" => Object::String(encode_win_ansi(title), StringFormat::Literal),
        "Producer" => Object::string_literal("edgequake-magazine"),
    });
    doc.trailer.set("Root", catalog_id);
    doc.trailer.set("Info", info_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)
        .map_err(|e| MagazineError::Internal(format!("PDF serialisation: {e}")))?;
    Ok(bytes)
}

/// Lay out and serialise in one step; returns the bytes and the page count.
pub fn render_pdf(sections: &SectionMap, opts: &RenderOptions) -> Result<(Vec<u8>, usize), MagazineError> {
    let layout = layout(sections, opts);
    let bytes = serialize(&layout, opts.cover_title(sections))?;
    Ok((bytes, layout.page_count()))
}
