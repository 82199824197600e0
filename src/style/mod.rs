//! # Style System
//!
//! Theme and decoration values that flow through layout untouched. Layout
//! reads them (a font size changes a text height) but never computes them.
//!
//! Text styles follow a two-step model: [`TextStyle`] has every field
//! optional so styles can be layered with [`TextStyle::merge`], and
//! [`TextStyle::resolve`] fills the gaps with defaults to give a
//! [`ResolvedTextStyle`] the text widget can measure with.
//!
//! The theme is shared read-only down the tree. Wrapper widgets that change
//! it build a new [`ThemeData`] and hand that to their subtree; nothing is
//! mutated in place.

use serde::{Deserialize, Serialize};

/// An RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f64, // 0.0 - 1.0
    pub g: f64,
    pub b: f64,
    #[serde(default = "opaque")]
    pub a: f64,
}

fn opaque() -> f64 {
    1.0
}

impl Color {
    pub const BLACK: Color = Color {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 1.0,
    };
    pub const WHITE: Color = Color {
        r: 1.0,
        g: 1.0,
        b: 1.0,
        a: 1.0,
    };
    pub const GREY: Color = Color {
        r: 0.6,
        g: 0.6,
        b: 0.6,
        a: 1.0,
    };
    pub const TRANSPARENT: Color = Color {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 0.0,
    };

    pub fn rgb(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub fn hex(hex: &str) -> Self {
        let hex = hex.trim_start_matches('#');
        let (r, g, b) = match hex.len() {
            3 => {
                let r = u8::from_str_radix(&hex[0..1].repeat(2), 16).unwrap_or(0);
                let g = u8::from_str_radix(&hex[1..2].repeat(2), 16).unwrap_or(0);
                let b = u8::from_str_radix(&hex[2..3].repeat(2), 16).unwrap_or(0);
                (r, g, b)
            }
            6 => {
                let r = u8::from_str_radix(&hex[0..2], 16).unwrap_or(0);
                let g = u8::from_str_radix(&hex[2..4], 16).unwrap_or(0);
                let b = u8::from_str_radix(&hex[4..6], 16).unwrap_or(0);
                (r, g, b)
            }
            _ => (0, 0, 0),
        };
        Self {
            r: r as f64 / 255.0,
            g: g as f64 / 255.0,
            b: b as f64 / 255.0,
            a: 1.0,
        }
    }

    pub fn is_transparent(&self) -> bool {
        self.a <= 0.0
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::BLACK
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FontWeight {
    #[default]
    Normal,
    Bold,
}

impl FontWeight {
    /// CSS-style numeric weight.
    pub fn value(self) -> u32 {
        match self {
            FontWeight::Normal => 400,
            FontWeight::Bold => 700,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FontStyle {
    #[default]
    Normal,
    Italic,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextAlign {
    /// Left in LTR, right in RTL.
    #[default]
    Start,
    End,
    Left,
    Right,
    Center,
    /// Painted like `Start`; inter-word stretching is not implemented.
    Justify,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextDecoration {
    #[default]
    None,
    Underline,
    LineThrough,
}

/// A layered text style: unset fields inherit from whatever it is merged
/// onto.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextStyle {
    pub color: Option<Color>,
    pub font_family: Option<String>,
    pub font_size: Option<f64>,
    pub font_weight: Option<FontWeight>,
    pub font_style: Option<FontStyle>,
    /// Line height as a multiplier of the font size.
    pub line_spacing: Option<f64>,
    pub letter_spacing: Option<f64>,
    pub decoration: Option<TextDecoration>,
}

impl TextStyle {
    pub fn size(font_size: f64) -> Self {
        Self {
            font_size: Some(font_size),
            ..Default::default()
        }
    }

    pub fn bold(mut self) -> Self {
        self.font_weight = Some(FontWeight::Bold);
        self
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }

    /// Layer `other` on top of `self`: fields set in `other` win.
    pub fn merge(&self, other: &TextStyle) -> TextStyle {
        TextStyle {
            color: other.color.or(self.color),
            font_family: other.font_family.clone().or_else(|| self.font_family.clone()),
            font_size: other.font_size.or(self.font_size),
            font_weight: other.font_weight.or(self.font_weight),
            font_style: other.font_style.or(self.font_style),
            line_spacing: other.line_spacing.or(self.line_spacing),
            letter_spacing: other.letter_spacing.or(self.letter_spacing),
            decoration: other.decoration.or(self.decoration),
        }
    }

    /// Fill every unset field with the engine defaults.
    pub fn resolve(&self) -> ResolvedTextStyle {
        ResolvedTextStyle {
            color: self.color.unwrap_or(Color::BLACK),
            font_family: self
                .font_family
                .clone()
                .unwrap_or_else(|| "Helvetica".to_string()),
            font_size: self.font_size.unwrap_or(12.0),
            font_weight: self.font_weight.unwrap_or_default(),
            font_style: self.font_style.unwrap_or_default(),
            line_spacing: self.line_spacing.unwrap_or(1.2),
            letter_spacing: self.letter_spacing.unwrap_or(0.0),
            decoration: self.decoration.unwrap_or_default(),
        }
    }
}

/// Text style with every value concrete.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedTextStyle {
    pub color: Color,
    pub font_family: String,
    pub font_size: f64,
    pub font_weight: FontWeight,
    pub font_style: FontStyle,
    pub line_spacing: f64,
    pub letter_spacing: f64,
    pub decoration: TextDecoration,
}

impl ResolvedTextStyle {
    pub fn line_height(&self) -> f64 {
        self.font_size * self.line_spacing
    }

    pub fn is_italic(&self) -> bool {
        self.font_style == FontStyle::Italic
    }
}

/// Cascading read-only style data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ThemeData {
    pub default_text_style: TextStyle,
    pub table_header: TextStyle,
    pub table_cell: TextStyle,
    pub chart_color: Color,
}

impl Default for ThemeData {
    fn default() -> Self {
        let base = TextStyle {
            color: Some(Color::BLACK),
            font_family: Some("Helvetica".to_string()),
            font_size: Some(12.0),
            font_weight: Some(FontWeight::Normal),
            font_style: Some(FontStyle::Normal),
            line_spacing: Some(1.2),
            letter_spacing: Some(0.0),
            decoration: Some(TextDecoration::None),
        };
        Self {
            default_text_style: base,
            table_header: TextStyle::size(10.0).bold(),
            table_cell: TextStyle::size(10.0),
            chart_color: Color::rgb(0.25, 0.45, 0.75),
        }
    }
}

impl ThemeData {
    /// A copy of this theme with the default text style layered over.
    pub fn with_text_style(&self, style: &TextStyle) -> ThemeData {
        ThemeData {
            default_text_style: self.default_text_style.merge(style),
            ..self.clone()
        }
    }
}

// ── Decoration ─────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BorderSide {
    pub width: f64,
    pub color: Color,
}

impl BorderSide {
    pub const NONE: BorderSide = BorderSide {
        width: 0.0,
        color: Color::TRANSPARENT,
    };

    pub fn new(width: f64, color: Color) -> Self {
        Self { width, color }
    }

    pub fn is_visible(&self) -> bool {
        self.width > 0.0 && !self.color.is_transparent()
    }
}

impl Default for BorderSide {
    fn default() -> Self {
        BorderSide::new(1.0, Color::BLACK)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Border {
    pub top: BorderSide,
    pub right: BorderSide,
    pub bottom: BorderSide,
    pub left: BorderSide,
}

impl Border {
    pub fn all(width: f64, color: Color) -> Self {
        let side = BorderSide::new(width, color);
        Self {
            top: side,
            right: side,
            bottom: side,
            left: side,
        }
    }

    pub fn is_uniform(&self) -> bool {
        self.top == self.right && self.right == self.bottom && self.bottom == self.left
    }
}

/// An offset fill behind the box. Blur is not rendered.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoxShadow {
    pub color: Color,
    pub offset_x: f64,
    pub offset_y: f64,
    #[serde(default)]
    pub spread: f64,
}

/// Paint-only box styling. Never affects layout size.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BoxDecoration {
    pub color: Option<Color>,
    pub border: Option<Border>,
    pub border_radius: f64,
    pub box_shadow: Vec<BoxShadow>,
}

impl BoxDecoration {
    pub fn filled(color: Color) -> Self {
        Self {
            color: Some(color),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.color.is_none() && self.border.is_none() && self.box_shadow.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_colors() {
        let c = Color::hex("#ff0000");
        assert!((c.r - 1.0).abs() < 1e-9 && c.g == 0.0);
        let short = Color::hex("0f0");
        assert!((short.g - 1.0).abs() < 1e-9);
        assert_eq!(Color::hex("nope"), Color::BLACK);
    }

    #[test]
    fn merge_prefers_the_overlay() {
        let base = TextStyle::size(12.0).with_color(Color::BLACK);
        let over = TextStyle::size(20.0).bold();
        let merged = base.merge(&over);
        assert_eq!(merged.font_size, Some(20.0));
        assert_eq!(merged.color, Some(Color::BLACK));
        assert_eq!(merged.font_weight, Some(FontWeight::Bold));
    }

    #[test]
    fn resolve_fills_defaults() {
        let r = TextStyle::default().resolve();
        assert_eq!(r.font_family, "Helvetica");
        assert_eq!(r.font_size, 12.0);
        assert!((r.line_height() - 14.4).abs() < 1e-9);
    }

    #[test]
    fn theme_copies_are_independent() {
        let theme = ThemeData::default();
        let bigger = theme.with_text_style(&TextStyle::size(30.0));
        assert_eq!(theme.default_text_style.font_size, Some(12.0));
        assert_eq!(bigger.default_text_style.font_size, Some(30.0));
        assert_eq!(bigger.table_header, theme.table_header);
    }
}
