//! Per-theme visual constants.
//!
//! Pure lookup data: one [`ThemeStyle`] row per [`Theme`] in [`THEME_STYLES`].
//! The native PDF layout reads the colour and size fields; the markup
//! renderer embeds [`ThemeStyle::css`] and the cover gradient.

use crate::config::Theme;

/// Decorative shape drawn in the page header band of the native PDF.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmblemShape {
    Star,
    Book,
    Rocket,
}

/// Theme emblem: shape and fill colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Emblem {
    pub shape: EmblemShape,
    pub color: &'static str,
}

/// Visual constants of one theme. Colours are `#rrggbb`.
#[derive(Debug, Clone, Copy)]
pub struct ThemeStyle {
    pub theme: Theme,

    pub title_color: &'static str,
    pub title_size: f32,

    pub section_color: &'static str,
    pub section_size: f32,

    pub event_color: &'static str,
    pub event_background: &'static str,
    pub event_size: f32,

    pub achievement_color: &'static str,
    pub achievement_background: &'static str,
    pub achievement_size: f32,

    /// Cover tagline text, without glyphs.
    pub tagline: &'static str,
    /// Pictograph placed either side of the tagline in markup output.
    pub tagline_glyph: &'static str,
    pub tagline_color: &'static str,

    pub emblem: Option<Emblem>,

    pub border_outer: &'static str,
    pub border_inner: &'static str,

    /// Cover block gradient stops and text colour (markup output).
    pub cover_gradient: (&'static str, &'static str),
    pub cover_text_color: &'static str,
    pub cover_radius_px: u32,

    /// Theme-specific CSS rules for `.title`, `.subtitle`, `.section-header`,
    /// `.event-details` and `.achievement`.
    pub css: &'static str,
}

impl ThemeStyle {
    /// `"🏆 Champions Celebrate 🏆"`.
    pub fn decorated_tagline(&self) -> String {
        format!("{0} {1} {0}", self.tagline_glyph, self.tagline)
    }
}

pub static THEME_STYLES: [ThemeStyle; 4] = [
    ThemeStyle {
        theme: Theme::Professional,
        title_color: "#1e40af",
        title_size: 28.0,
        section_color: "#dc2626",
        section_size: 18.0,
        event_color: "#059669",
        event_background: "#ecfdf5",
        event_size: 12.0,
        achievement_color: "#7c3aed",
        achievement_background: "#f3e8ff",
        achievement_size: 11.0,
        tagline: "Professional Excellence",
        tagline_glyph: "🌟",
        tagline_color: "#1e40af",
        emblem: None,
        border_outer: "#667eea",
        border_inner: "#f59e0b",
        cover_gradient: ("#667eea", "#764ba2"),
        cover_text_color: "white",
        cover_radius_px: 10,
        css: PROFESSIONAL_CSS,
    },
    ThemeStyle {
        theme: Theme::Modern,
        title_color: "#7c3aed",
        title_size: 30.0,
        section_color: "#ec4899",
        section_size: 20.0,
        event_color: "#059669",
        event_background: "#d1fae5",
        event_size: 11.0,
        achievement_color: "#dc2626",
        achievement_background: "#fee2e2",
        achievement_size: 10.0,
        tagline: "Innovation & Achievement",
        tagline_glyph: "🚀",
        tagline_color: "#7c3aed",
        emblem: Some(Emblem {
            shape: EmblemShape::Rocket,
            color: "#7c3aed",
        }),
        border_outer: "#7c3aed",
        border_inner: "#ec4899",
        cover_gradient: ("#f093fb", "#f5576c"),
        cover_text_color: "white",
        cover_radius_px: 15,
        css: MODERN_CSS,
    },
    ThemeStyle {
        theme: Theme::Academic,
        title_color: "#0f766e",
        title_size: 26.0,
        section_color: "#1e40af",
        section_size: 18.0,
        event_color: "#7c2d12",
        event_background: "#fef3c7",
        event_size: 11.0,
        achievement_color: "#7c3aed",
        achievement_background: "#e9d5ff",
        achievement_size: 10.0,
        tagline: "Excellence in Education",
        tagline_glyph: "📚",
        tagline_color: "#059669",
        emblem: Some(Emblem {
            shape: EmblemShape::Book,
            color: "#059669",
        }),
        border_outer: "#0f766e",
        border_inner: "#1e40af",
        cover_gradient: ("#4facfe", "#00f2fe"),
        cover_text_color: "white",
        cover_radius_px: 10,
        css: ACADEMIC_CSS,
    },
    ThemeStyle {
        theme: Theme::Sports,
        title_color: "#dc2626",
        title_size: 30.0,
        section_color: "#ea580c",
        section_size: 20.0,
        event_color: "#0f766e",
        event_background: "#ecfdf5",
        event_size: 11.0,
        achievement_color: "#7c3aed",
        achievement_background: "#f3e8ff",
        achievement_size: 10.0,
        tagline: "Champions Celebrate",
        tagline_glyph: "🏆",
        tagline_color: "#dc2626",
        emblem: Some(Emblem {
            shape: EmblemShape::Star,
            color: "#f59e0b",
        }),
        border_outer: "#dc2626",
        border_inner: "#ea580c",
        cover_gradient: ("#43e97b", "#38f9d7"),
        cover_text_color: "#2c3e50",
        cover_radius_px: 15,
        css: SPORTS_CSS,
    },
];

impl Theme {
    /// Visual constants for this theme.
    pub fn style(self) -> &'static ThemeStyle {
        THEME_STYLES
            .iter()
            .find(|s| s.theme == self)
            .unwrap_or(&THEME_STYLES[0])
    }
}

// ── Markup style rules ───────────────────────────────────────────────────────

const PROFESSIONAL_CSS: &str = r#"
.title { text-align: center; color: #1a365d; font-size: 2.8em; margin-bottom: 10px; font-weight: bold; }
.subtitle { text-align: center; color: #4a5568; font-size: 1.3em; margin-bottom: 30px; }
.section-header { color: #c53030; font-size: 1.6em; border-bottom: 3px solid #c53030; padding-bottom: 8px; margin-top: 35px; margin-bottom: 18px; font-weight: bold; }
.event-details { margin-left: 20px; background-color: #f7fafc; padding: 12px; border-left: 4px solid #3182ce; border-radius: 4px; }
.achievement { margin-left: 30px; background-color: #f0fff4; padding: 10px; margin-bottom: 6px; border-left: 4px solid #38a169; border-radius: 4px; }
"#;

const MODERN_CSS: &str = r#"
.title { text-align: center; background: linear-gradient(45deg, #2E86AB, #A23B72); -webkit-background-clip: text; -webkit-text-fill-color: transparent; font-size: 3em; margin-bottom: 10px; font-weight: bold; }
.subtitle { text-align: center; color: #F18F01; font-size: 1.4em; margin-bottom: 30px; }
.section-header { color: #A23B72; font-size: 1.7em; border-bottom: 3px solid #F18F01; padding-bottom: 8px; margin-top: 35px; margin-bottom: 18px; font-weight: bold; }
.event-details { margin-left: 20px; background: linear-gradient(90deg, #FFF8DC, #F0E68C); padding: 12px; border-left: 4px solid #F18F01; border-radius: 8px; }
.achievement { margin-left: 30px; background: linear-gradient(90deg, #E6F3FF, #B3D9FF); padding: 10px; margin-bottom: 6px; border-left: 4px solid #2E86AB; border-radius: 8px; }
"#;

const ACADEMIC_CSS: &str = r#"
.title { text-align: center; color: #1e40af; font-size: 2.6em; margin-bottom: 10px; font-weight: bold; font-family: 'Times New Roman', serif; }
.subtitle { text-align: center; color: #3730a3; font-size: 1.2em; margin-bottom: 30px; font-style: italic; }
.section-header { color: #1e40af; font-size: 1.5em; border-bottom: 2px solid #3b82f6; padding-bottom: 6px; margin-top: 32px; margin-bottom: 16px; font-weight: bold; font-family: 'Times New Roman', serif; }
.event-details { margin-left: 20px; background-color: #eff6ff; padding: 12px; border-left: 4px solid #3b82f6; border-radius: 4px; font-family: 'Times New Roman', serif; }
.achievement { margin-left: 30px; background-color: #f0f9ff; padding: 10px; margin-bottom: 6px; border-left: 4px solid #0ea5e9; border-radius: 4px; font-family: 'Times New Roman', serif; }
"#;

const SPORTS_CSS: &str = r#"
.title { text-align: center; background: linear-gradient(45deg, #dc2626, #ea580c); -webkit-background-clip: text; -webkit-text-fill-color: transparent; font-size: 3.2em; margin-bottom: 10px; font-weight: bold; text-transform: uppercase; }
.subtitle { text-align: center; color: #f59e0b; font-size: 1.5em; margin-bottom: 30px; text-transform: uppercase; font-weight: bold; }
.section-header { color: #dc2626; font-size: 1.8em; border-bottom: 4px solid #f59e0b; padding-bottom: 10px; margin-top: 38px; margin-bottom: 20px; font-weight: bold; text-transform: uppercase; }
.event-details { margin-left: 20px; background: linear-gradient(90deg, #fef3c7, #fde68a); padding: 14px; border-left: 5px solid #f59e0b; border-radius: 8px; font-weight: bold; }
.achievement { margin-left: 30px; background: linear-gradient(90deg, #dcfce7, #bbf7d0); padding: 12px; margin-bottom: 8px; border-left: 5px solid #16a34a; border-radius: 8px; font-weight: bold; }
"#;
